use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use archive_logging::archive_debug;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Why a run was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelCause {
    /// Operator interrupt (Ctrl-C).
    Interrupted,
    DeadlineExceeded,
    /// Cancelled programmatically without a more specific reason.
    Requested,
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelCause::Interrupted => write!(f, "interrupted"),
            CancelCause::DeadlineExceeded => write!(f, "deadline exceeded"),
            CancelCause::Requested => write!(f, "cancelled"),
        }
    }
}

/// Shared cancellation signal carrying the cause of the first cancellation.
///
/// Clones observe the same signal. Cancelling is idempotent and the first
/// cause recorded is the one every observer sees.
#[derive(Debug, Clone, Default)]
pub struct CancelContext {
    token: CancellationToken,
    cause: Arc<OnceLock<CancelCause>>,
}

impl CancelContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self, cause: CancelCause) {
        if self.cause.set(cause).is_ok() {
            archive_debug!("cancel context fired: {}", cause);
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The recorded cause, once cancelled.
    pub fn cause(&self) -> Option<CancelCause> {
        if self.is_cancelled() {
            Some(self.recorded_cause())
        } else {
            None
        }
    }

    /// Resolves once the context is cancelled, yielding the cause.
    pub async fn cancelled(&self) -> CancelCause {
        self.token.cancelled().await;
        self.recorded_cause()
    }

    /// Cancels with [`CancelCause::DeadlineExceeded`] after `after` elapses,
    /// unless something else cancels first.
    pub fn cancel_after(&self, after: Duration) -> JoinHandle<()> {
        let ctx = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = ctx.token.cancelled() => {}
                _ = tokio::time::sleep(after) => ctx.cancel(CancelCause::DeadlineExceeded),
            }
        })
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    fn recorded_cause(&self) -> CancelCause {
        // The cause is set before the token fires; `Requested` only covers a
        // token cancelled directly through `token()`.
        self.cause.get().copied().unwrap_or(CancelCause::Requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_cause_wins() {
        let ctx = CancelContext::new();
        assert_eq!(ctx.cause(), None);

        ctx.cancel(CancelCause::Interrupted);
        ctx.cancel(CancelCause::DeadlineExceeded);

        assert!(ctx.is_cancelled());
        assert_eq!(ctx.cause(), Some(CancelCause::Interrupted));
        assert_eq!(ctx.cancelled().await, CancelCause::Interrupted);
    }

    #[tokio::test]
    async fn clones_share_the_signal() {
        let ctx = CancelContext::new();
        let observer = ctx.clone();
        let waiter = tokio::spawn(async move { observer.cancelled().await });

        ctx.cancel(CancelCause::Requested);
        assert_eq!(waiter.await.unwrap(), CancelCause::Requested);
    }

    #[tokio::test]
    async fn deadline_cancels_with_its_cause() {
        let ctx = CancelContext::new();
        ctx.cancel_after(Duration::from_millis(10));
        assert_eq!(ctx.cancelled().await, CancelCause::DeadlineExceeded);
    }

    #[tokio::test]
    async fn earlier_cancel_disarms_the_deadline() {
        let ctx = CancelContext::new();
        let timer = ctx.cancel_after(Duration::from_millis(20));
        ctx.cancel(CancelCause::Interrupted);
        timer.await.unwrap();
        assert_eq!(ctx.cause(), Some(CancelCause::Interrupted));
    }

    #[test]
    fn direct_token_cancel_reports_requested() {
        let ctx = CancelContext::new();
        ctx.token().cancel();
        assert_eq!(ctx.cause(), Some(CancelCause::Requested));
    }
}
