//! Command-line interface definitions for confluence-md.
//!
//! The CLI converts storage-format content that is already on disk (a raw
//! fragment or a saved REST page response). Fetching from a live site is left
//! to other tools.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use url::Url;

use crate::color::ColorScheme;
use crate::commands::html::handle_html_command;
use crate::commands::page::handle_page_command;

/// confluence-md - Convert Confluence storage format to Markdown
#[derive(Debug, Parser)]
#[command(
  name = "confluence-md",
  version,
  about = "Convert Confluence storage format to Markdown",
  long_about = "Converts Confluence storage-format XHTML into Markdown.\n\
                Handles macros, tables, images, page links and frontmatter metadata.",
  styles = get_clap_styles()
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,

  /// Output options
  #[command(flatten)]
  pub output: OutputOptions,

  /// Source options
  #[command(flatten)]
  pub source: SourceOptions,

  /// Page tree options
  #[command(flatten)]
  pub page: PageOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Convert a storage-format fragment and print the Markdown body
  Html {
    /// File to read, or `-` for stdin
    #[arg(value_name = "FILE", default_value = "-")]
    input: String,
  },

  /// Convert a saved REST page response into a Markdown document
  Page {
    /// JSON body of `GET /wiki/rest/api/content/{id}?expand=body.storage,...`
    #[arg(value_name = "PAGE_JSON")]
    input: PathBuf,
  },
}

/// Normalize a URL by adding https:// if no scheme is present
pub fn normalize_url(url: &str) -> Result<String, String> {
  let trimmed = url.trim();

  let parsed = match Url::parse(trimmed) {
    Ok(parsed) => parsed,
    Err(_) => {
      let with_https = format!("https://{trimmed}");
      Url::parse(&with_https).map_err(|e| format!("Invalid URL: {e}"))?
    }
  };

  let mut url_str = parsed.to_string();
  if url_str.ends_with('/') && url_str.len() > 1 {
    url_str.pop();
  }

  Ok(url_str)
}

/// Output options
#[derive(Debug, Parser)]
pub struct OutputOptions {
  /// Output file for `html`, output directory for `page`
  #[arg(short, long, value_name = "PATH")]
  pub output: Option<PathBuf>,

  /// Omit the YAML frontmatter block
  #[arg(long)]
  pub no_frontmatter: bool,

  /// Folder image links point into, relative to the document
  #[arg(long, default_value = "assets", value_name = "DIR")]
  pub image_folder: String,
}

/// Source options
#[derive(Debug, Parser)]
pub struct SourceOptions {
  /// Confluence base URL used for page and attachment links
  #[arg(long, env = "CONFLUENCE_URL", value_name = "URL", value_parser = normalize_url)]
  pub base_url: Option<String>,

  /// Directory holding the page's attachment files, looked up by filename
  #[arg(long, value_name = "DIR")]
  pub attachments_dir: Option<PathBuf>,

  /// Copy referenced images next to the written document
  #[arg(long, requires = "attachments_dir")]
  pub download_images: bool,
}

/// Page tree options
#[derive(Debug, Parser)]
pub struct PageOptions {
  /// Convert child pages too, read from `<id>.json` files beside the input
  #[arg(short = 'r', long, alias = "recursive")]
  pub children: bool,

  /// Maximum depth when converting children
  #[arg(long, value_name = "N", requires = "children")]
  pub max_depth: Option<usize>,
}

/// Behavior options
#[derive(Debug, Parser)]
pub struct BehaviorOptions {
  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

impl Cli {
  /// Parse CLI arguments from the environment
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Validate CLI arguments
  ///
  /// Returns an error if the CLI configuration is invalid.
  pub fn validate(&self) -> Result<(), String> {
    if self.output.image_folder.trim().is_empty() {
      return Err("--image-folder cannot be empty".to_string());
    }

    if let Command::Html { .. } = self.command
      && self.source.download_images
    {
      return Err("--download-images only applies to the page command".to_string());
    }

    if let Command::Html { .. } = self.command
      && self.page.children
    {
      return Err("--children only applies to the page command".to_string());
    }

    Ok(())
  }
}

/// Parse CLI arguments, initialize shared services, and dispatch to the chosen
/// command. Returns the process exit code.
pub fn run() -> i32 {
  let cli = Cli::parse_args();

  init_tracing(&cli.behavior);

  let colors = ColorScheme::new(cli.behavior.color);

  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    return 4; // Invalid arguments exit code
  }

  match &cli.command {
    Command::Html { input } => handle_html_command(input, &cli, &colors),
    Command::Page { input } => handle_page_command(input, &cli, &colors),
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}
