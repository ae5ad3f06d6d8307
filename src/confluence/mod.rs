//! Confluence data model, collaborator traits, URL helpers and page-tree
//! traversal, plus page and attachment sources backed by local directories.

pub mod api;
pub mod local;
pub mod models;
pub mod tree;
pub mod url;

pub use api::{AttachmentDownloader, PageFetcher};
pub use local::{DirectoryDownloader, DirectoryPageStore, load_page_file};
pub use models::{ApiPage, Attachment, Label, Page, User};
pub use tree::{PageTree, get_page_tree};
