use archive_logging::{archive_info, archive_warn};
use archivelinks_core::{Outcome, RunSummary};
use thiserror::Error;

use crate::{CancelCause, CancelContext, Dispatcher};

#[derive(Debug, Error)]
pub enum CollectError {
    /// The context fired first. `partial` holds what arrived before that;
    /// outcomes still in flight are gone.
    #[error("{cause}")]
    Cancelled {
        cause: CancelCause,
        partial: RunSummary,
    },
    #[error("outcome streams closed after {received} of {expected} outcomes")]
    Closed { received: usize, expected: usize },
}

/// Drains `expected` outcomes from `dispatcher`, in completion order, handing
/// each to `on_outcome` as it arrives.
///
/// A failed link is recorded and collection goes on. Cancellation ends the
/// loop at once. With `expected == 0` neither stream is touched.
pub async fn collect<F>(
    dispatcher: &Dispatcher,
    ctx: &CancelContext,
    expected: usize,
    mut on_outcome: F,
) -> Result<RunSummary, CollectError>
where
    F: FnMut(&Outcome),
{
    let mut summary = RunSummary::new(expected);
    while !summary.is_complete() {
        let outcome = tokio::select! {
            biased;
            cause = ctx.cancelled() => {
                archive_warn!(
                    "collection cancelled ({}) after {} of {} outcomes",
                    cause,
                    summary.received(),
                    expected
                );
                return Err(CollectError::Cancelled { cause, partial: summary });
            }
            result = dispatcher.results().recv() => result.map(Outcome::Archived),
            err = dispatcher.errors().recv() => err.map(|err| Outcome::Failed(err.to_string())),
        };

        let Some(outcome) = outcome else {
            return Err(CollectError::Closed {
                received: summary.received(),
                expected,
            });
        };
        on_outcome(&outcome);
        summary.record(outcome);
    }

    archive_info!(
        "collected {} outcomes: {} archived, {} failed",
        summary.received(),
        summary.archived.len(),
        summary.failures.len()
    );
    Ok(summary)
}
