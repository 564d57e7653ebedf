//! Bounded waits for steps a human completes in the visible browser window,
//! like approving a 2FA prompt or dismissing a phone verification screen.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::error::SessionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The probe reported the step done.
    Completed,
    /// The ceiling elapsed without the probe succeeding.
    CeilingReached,
    /// The cancellation token fired.
    Cancelled,
}

/// Polls a completion probe at a fixed interval up to a hard ceiling,
/// reporting progress along the way. Never blocks indefinitely.
#[derive(Debug, Clone, Copy)]
pub struct ManualWait {
    pub poll: Duration,
    pub ceiling: Duration,
    pub progress_every: Duration,
}

impl Default for ManualWait {
    fn default() -> Self {
        Self {
            poll: Duration::from_secs(5),
            ceiling: Duration::from_secs(300),
            progress_every: Duration::from_secs(60),
        }
    }
}

impl ManualWait {
    pub async fn run<F, Fut, P>(
        &self,
        what: &str,
        cancel: &CancellationToken,
        mut is_done: F,
        mut on_progress: P,
    ) -> SessionResult<WaitOutcome>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SessionResult<bool>>,
        P: FnMut(Duration),
    {
        let started = tokio::time::Instant::now();
        let mut last_progress = started;

        loop {
            if cancel.is_cancelled() {
                tracing::info!(what, "manual wait cancelled");
                return Ok(WaitOutcome::Cancelled);
            }
            if is_done().await? {
                tracing::info!(what, waited = ?started.elapsed(), "manual step completed");
                return Ok(WaitOutcome::Completed);
            }

            let elapsed = started.elapsed();
            if elapsed >= self.ceiling {
                tracing::warn!(what, ceiling = ?self.ceiling, "manual wait hit ceiling");
                return Ok(WaitOutcome::CeilingReached);
            }
            if last_progress.elapsed() >= self.progress_every {
                last_progress = tokio::time::Instant::now();
                on_progress(elapsed);
            }

            tokio::select! {
                _ = cancel.cancelled() => return Ok(WaitOutcome::Cancelled),
                _ = tokio::time::sleep(self.poll) => {}
            }
        }
    }
}
