use std::sync::{Arc, OnceLock};

use archive_logging::{archive_debug, archive_trace, archive_warn};
use url::Url;

use crate::handoff::{self, HandoffReceiver, HandoffSender};
use crate::{ArchiveError, ArchiveResult, Archiver, CancelContext};

struct Streams {
    result_tx: HandoffSender<ArchiveResult>,
    results: HandoffReceiver<ArchiveResult>,
    error_tx: HandoffSender<ArchiveError>,
    errors: HandoffReceiver<ArchiveError>,
}

impl Streams {
    fn new() -> Self {
        let (result_tx, results) = handoff::channel();
        let (error_tx, errors) = handoff::channel();
        Self {
            result_tx,
            results,
            error_tx,
            errors,
        }
    }
}

/// Fans submitted links out to one archiving task each and funnels their
/// outcomes into a results stream and an errors stream.
///
/// Both streams are rendezvous channels created on first use. Every
/// submission yields exactly one item on one of them, unless the submission's
/// [`CancelContext`] fires before the item is handed over, in which case the
/// item is dropped.
pub struct Dispatcher {
    archiver: Arc<dyn Archiver>,
    streams: OnceLock<Streams>,
}

impl Dispatcher {
    pub fn new(archiver: Arc<dyn Archiver>) -> Self {
        Self {
            archiver,
            streams: OnceLock::new(),
        }
    }

    /// Starts archiving `link` in the background and returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, ctx: &CancelContext, link: impl Into<String>) {
        let link = link.into();
        let streams = self.streams();
        let worker = Worker {
            archiver: Arc::clone(&self.archiver),
            ctx: ctx.clone(),
            results: streams.result_tx.clone(),
            errors: streams.error_tx.clone(),
        };
        archive_trace!("submit link={}", link);
        tokio::spawn(worker.run(link));
    }

    pub fn results(&self) -> &HandoffReceiver<ArchiveResult> {
        &self.streams().results
    }

    pub fn errors(&self) -> &HandoffReceiver<ArchiveError> {
        &self.streams().errors
    }

    fn streams(&self) -> &Streams {
        self.streams.get_or_init(Streams::new)
    }
}

struct Worker {
    archiver: Arc<dyn Archiver>,
    ctx: CancelContext,
    results: HandoffSender<ArchiveResult>,
    errors: HandoffSender<ArchiveError>,
}

impl Worker {
    async fn run(self, link: String) {
        let url = match Url::parse(&link) {
            Ok(url) => url,
            Err(source) => {
                let err = ArchiveError::Parse { link, source };
                self.deliver(&self.errors, err).await;
                return;
            }
        };

        match self.archiver.archive(&url, &self.ctx).await {
            Ok(archived) => {
                archive_debug!("archived link={} location={}", link, archived);
                let result = ArchiveResult::new(link, archived);
                self.deliver(&self.results, result).await;
            }
            Err(source) => {
                archive_debug!("archive failed link={} err={}", link, source);
                let err = ArchiveError::Archive { link, source };
                self.deliver(&self.errors, err).await;
            }
        }
    }

    async fn deliver<T: Send>(&self, stream: &HandoffSender<T>, outcome: T) {
        tokio::select! {
            biased;
            cause = self.ctx.cancelled() => {
                archive_debug!("dropping undelivered outcome: {}", cause);
            }
            sent = stream.send(outcome) => {
                if sent.is_err() {
                    archive_warn!("outcome stream closed; dropping outcome");
                }
            }
        }
    }
}
