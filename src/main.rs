//! confluence-md - Convert Confluence storage format to Markdown
//!
//! This is the main entry point for the CLI application.

use std::process;

fn main() {
  process::exit(confluence_md::cli::run());
}
