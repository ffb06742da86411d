use archivelinks_engine::{ArchiveServiceError, CollectError, DiscoveryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("set up archiver: {0}")]
    ArchiverSetup(#[source] ArchiveServiceError),
    #[error("set up link discovery: {0}")]
    DiscoverySetup(#[source] DiscoveryError),
    #[error("get links from post: {0}")]
    Discovery(#[source] DiscoveryError),
    #[error(transparent)]
    Collect(#[from] CollectError),
}
