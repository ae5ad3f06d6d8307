//! CLI subcommand handlers.
//!
//! Each handler reports progress on stderr and returns the process exit code,
//! keeping `cli::run` a thin dispatcher.

pub mod html;
pub mod page;

use crate::cli::Cli;
use crate::markdown::ConvertOptions;

/// Conversion options selected on the command line.
pub(crate) fn convert_options(cli: &Cli) -> ConvertOptions {
  ConvertOptions {
    image_folder: cli.output.image_folder.trim().trim_end_matches('/').to_string(),
    include_frontmatter: !cli.output.no_frontmatter,
  }
}
