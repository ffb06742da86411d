//! Archivelinks engine: concurrent archival dispatch and the IO collaborators
//! behind it.
mod archiver;
mod cancel;
mod collect;
mod discovery;
mod dispatcher;
pub mod handoff;
mod types;

pub use archiver::{ArchiveSettings, ArchiveTodaySubmitter, Archiver, DEFAULT_ARCHIVE_URL};
pub use cancel::{CancelCause, CancelContext};
pub use collect::{collect, CollectError};
pub use discovery::{DiscoverySettings, LinkSource, RedditLinkSource, DEFAULT_REDDIT_URL};
pub use dispatcher::Dispatcher;
pub use handoff::{HandoffReceiver, HandoffSender};
pub use types::{ArchiveError, ArchiveServiceError, DiscoveryError, FailureKind, Phase};

pub use archivelinks_core::{ArchiveResult, Outcome, RunSummary};
