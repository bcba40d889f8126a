//! Sleeps that end early on shutdown

use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::SwapError;

/// A wait with a fixed deadline.
///
/// The deadline is fixed at construction, so waiting again after an
/// interrupted wait resumes toward the same point in time.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledDelay {
    deadline: Instant,
}

impl ScheduledDelay {
    pub fn new(duration: Duration) -> Self {
        Self {
            deadline: Instant::now() + duration,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_elapsed(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Wait for the deadline, or return `Cancelled` as soon as `cancel` fires.
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<(), SwapError> {
        if cancel.is_cancelled() {
            return Err(SwapError::Cancelled);
        }
        tokio::select! {
            _ = cancel.cancelled() => Err(SwapError::Cancelled),
            _ = sleep_until(self.deadline) => Ok(()),
        }
    }
}

/// Sleep for `duration` unless cancelled first.
pub async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<(), SwapError> {
    ScheduledDelay::new(duration).wait(cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_delay_completes() {
        let cancel = CancellationToken::new();
        assert!(pause(Duration::ZERO, &cancel).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_long_sleep() {
        let cancel = CancellationToken::new();
        let delay = ScheduledDelay::new(Duration::from_secs(24 * 60 * 60));

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let result = delay.wait(&cancel).await;
        assert!(matches!(result, Err(SwapError::Cancelled)));
        assert!(!delay.is_elapsed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_keeps_deadline() {
        let delay = ScheduledDelay::new(Duration::from_secs(60));

        let interrupted = CancellationToken::new();
        interrupted.cancel();
        assert!(delay.wait(&interrupted).await.is_err());

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(delay.remaining() <= Duration::from_secs(30));

        let fresh = CancellationToken::new();
        assert!(delay.wait(&fresh).await.is_ok());
        assert!(delay.is_elapsed());
    }

    #[tokio::test]
    async fn test_already_cancelled_returns_immediately() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = pause(Duration::from_secs(3600), &cancel).await;
        assert!(matches!(result, Err(SwapError::Cancelled)));
    }
}
