use std::fs;
use std::io::{self, Read};

use anyhow::Context;

use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::commands::convert_options;
use crate::markdown::Converter;

/// Handle `confluence-md html`.
pub(crate) fn handle_html_command(input: &str, cli: &Cli, colors: &ColorScheme) -> i32 {
  match convert_fragment(input, cli) {
    Ok(Some(path)) => {
      if !cli.behavior.quiet {
        eprintln!("{} Wrote {}", colors.success("✓"), colors.path(path));
      }
      0
    }
    Ok(None) => 0,
    Err(e) => {
      eprintln!("{} {}", colors.error("✗"), colors.error("Failed to convert content"));
      eprintln!("  {}: {e:#}", colors.emphasis("Error"));
      1
    }
  }
}

/// Converts the fragment and returns the output file, if one was written.
fn convert_fragment(input: &str, cli: &Cli) -> anyhow::Result<Option<String>> {
  let html = read_input(input)?;
  let converter = Converter::new(convert_options(cli));
  let markdown = converter.convert_html(&html);

  match &cli.output.output {
    Some(path) => {
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
      }
      fs::write(path, format!("{markdown}\n")).with_context(|| format!("Failed to write {}", path.display()))?;
      Ok(Some(path.display().to_string()))
    }
    None => {
      println!("{markdown}");
      Ok(None)
    }
  }
}

fn read_input(input: &str) -> anyhow::Result<String> {
  if input == "-" {
    let mut buffer = String::new();
    io::stdin()
      .read_to_string(&mut buffer)
      .context("Failed to read storage format from stdin")?;
    Ok(buffer)
  } else {
    fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
  }
}
