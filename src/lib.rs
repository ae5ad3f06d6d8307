//! Confluence storage format to Markdown conversion.
//!
//! The [`markdown::Converter`] turns storage-format XHTML into Markdown and
//! whole pages into [`document::MarkdownDocument`]s. Remote access is kept
//! behind the collaborator traits in [`confluence`]; [`images`] and [`writer`]
//! finish a document on disk.

pub mod attachments;
pub mod cli;
pub mod color;
pub mod commands;
pub mod confluence;
pub mod document;
pub mod error;
pub mod images;
pub mod markdown;
pub mod writer;
