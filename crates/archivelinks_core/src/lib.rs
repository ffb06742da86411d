//! Archivelinks core: pure data model and source parsing helpers.
mod markdown;
mod model;
mod source;

pub use markdown::extract_markdown_links;
pub use model::{ArchiveResult, Outcome, RunSummary};
pub use source::{thread_json_url, SourceUrlError};
