use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use tracing::debug;

use crate::attachments::AttachmentService;
use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::commands::convert_options;
use crate::confluence::{ApiPage, DirectoryDownloader, DirectoryPageStore, Page, get_page_tree, load_page_file};
use crate::images::download_images;
use crate::markdown::Converter;
use crate::writer::write_document;

/// Handle `confluence-md page`.
pub(crate) fn handle_page_command(input: &Path, cli: &Cli, colors: &ColorScheme) -> i32 {
  if !cli.behavior.quiet {
    eprintln!("{} {}", colors.info("→"), colors.info("Converting page"));
    eprintln!("  {}: {}", colors.emphasis("Source"), colors.path(input.display()));
  }

  match convert_page_file(input, cli, colors) {
    Ok(paths) => {
      if !cli.behavior.quiet {
        eprintln!();
        for path in &paths {
          eprintln!("{} Wrote {}", colors.success("✓"), colors.path(path.display()));
        }
      }
      0
    }
    Err(e) => {
      eprintln!("{} {}", colors.error("✗"), colors.error("Failed to convert page"));
      eprintln!("  {}: {e:#}", colors.emphasis("Error"));
      1
    }
  }
}

fn convert_page_file(input: &Path, cli: &Cli, colors: &ColorScheme) -> anyhow::Result<Vec<PathBuf>> {
  let api_page = load_page_file(input)?;
  let base_url = resolve_base_url(cli.source.base_url.as_deref(), &api_page)?;
  let root = Page::from(api_page);
  debug!("Loaded page {} ({}) from {}", root.id, root.title, input.display());

  if !cli.behavior.quiet {
    eprintln!("  {}: {}", colors.emphasis("Title"), colors.emphasis(&root.title));
    eprintln!("  {}: {}", colors.emphasis("Page ID"), colors.number(&root.id));
    eprintln!("  {}: {}", colors.emphasis("Base URL"), colors.link(&base_url));
  }

  let pages = if cli.page.children {
    let dir = input.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let store = DirectoryPageStore::new(dir).with_file(root.id.clone(), input);
    let tree = get_page_tree(&store, &root.id, cli.page.max_depth)?;
    let pages: Vec<Page> = tree.pages().into_iter().cloned().collect();
    if !cli.behavior.quiet {
      eprintln!("  {}: {}", colors.emphasis("Pages"), colors.number(pages.len()));
    }
    pages
  } else {
    vec![root]
  };

  let options = convert_options(cli);
  let include_frontmatter = options.include_frontmatter;
  let downloader = cli
    .source
    .attachments_dir
    .as_ref()
    .map(|dir| DirectoryDownloader::new(base_url.clone(), dir.clone()));

  let mut converter = Converter::new(options);
  if let Some(downloader) = &downloader {
    converter = converter.with_resolver(Box::new(AttachmentService::new(downloader.clone())));
  }

  let output_dir = cli.output.output.clone().unwrap_or_else(|| PathBuf::from("."));
  let mut written = Vec::with_capacity(pages.len());

  for page in &pages {
    let mut document = converter
      .convert_page(page, &base_url)
      .with_context(|| format!("Failed to convert page {}", page.id))?;

    if cli.source.download_images
      && let Some(downloader) = &downloader
    {
      let count = download_images(&mut document, downloader, &output_dir)?;
      if !cli.behavior.quiet && count > 0 {
        eprintln!(
          "  {} Copied {} {} for {}",
          colors.success("✓"),
          colors.number(count),
          if count == 1 { "image" } else { "images" },
          colors.emphasis(&page.title)
        );
      }
    }

    written.push(write_document(&document, &output_dir, include_frontmatter)?);
  }

  Ok(written)
}

/// Site root for building links.
///
/// An explicit `--base-url` wins. Otherwise the `_links.base` of the saved
/// response is used without its `/wiki` context path.
fn resolve_base_url(explicit: Option<&str>, page: &ApiPage) -> anyhow::Result<String> {
  if let Some(base) = explicit {
    return Ok(base.to_string());
  }

  match page.links.base.as_deref() {
    Some(base) if !base.trim().is_empty() => {
      let base = base.trim().trim_end_matches('/');
      Ok(base.strip_suffix("/wiki").unwrap_or(base).to_string())
    }
    _ => bail!("--base-url is required when the page JSON has no _links.base"),
  }
}
