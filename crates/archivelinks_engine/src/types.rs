use std::fmt;

use archivelinks_core::SourceUrlError;
use thiserror::Error;

use crate::CancelCause;

/// Which step of a submission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Archive,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Parse => write!(f, "parse"),
            Phase::Archive => write!(f, "archive"),
        }
    }
}

/// A failure outcome for one submitted link.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{link} -> parse: {source}")]
    Parse {
        link: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{link} -> archive: {source}")]
    Archive {
        link: String,
        #[source]
        source: ArchiveServiceError,
    },
}

impl ArchiveError {
    pub fn link(&self) -> &str {
        match self {
            ArchiveError::Parse { link, .. } | ArchiveError::Archive { link, .. } => link,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            ArchiveError::Parse { .. } => Phase::Parse,
            ArchiveError::Archive { .. } => Phase::Archive,
        }
    }
}

/// Error returned by an [`Archiver`](crate::Archiver).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ArchiveServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ArchiveServiceError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn cancelled(cause: CancelCause) -> Self {
        Self::new(FailureKind::Cancelled, cause.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    HttpStatus(u16),
    Timeout,
    Network,
    Rejected,
    NoLocation,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Rejected => write!(f, "rejected by archive service"),
            FailureKind::NoLocation => write!(f, "no archived location in response"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Failure to turn a source identifier into a list of links. Fatal to a run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("could not determine necessary info from source URL: {0}")]
    Source(#[from] SourceUrlError),
    #[error("create client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("get: {0}")]
    Request(#[source] reqwest::Error),
    #[error("get: http status {0}")]
    HttpStatus(u16),
    #[error("read: {0}")]
    Read(#[source] reqwest::Error),
    #[error("unmarshal: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("post listing has no {0}")]
    MissingData(&'static str),
    #[error("{0}")]
    Cancelled(CancelCause),
}
