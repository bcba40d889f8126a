use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use super::swap::execute_swap;
use crate::chain::ChainClient;
use crate::delay::pause;
use crate::error::{ErrorKind, SwapError};
use crate::session::WalletSession;
use crate::tokens::Token;

/// Run `op` up to `max_attempts` times with a fixed `delay` between attempts.
///
/// `Ok(Some(_))` on success, `Ok(None)` once the operation is abandoned
/// (invalid amount, or attempts exhausted). The only error is `Cancelled`.
pub async fn retry_swap<F, Fut, T>(
    mut op: F,
    max_attempts: u32,
    delay: Duration,
    cancel: &CancellationToken,
) -> Result<Option<T>, SwapError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, SwapError>>,
{
    for attempt in 1..=max_attempts {
        let result = tokio::select! {
            _ = cancel.cancelled() => return Err(SwapError::Cancelled),
            result = op(attempt) => result,
        };

        let err = match result {
            Ok(value) => return Ok(Some(value)),
            Err(err) => err,
        };

        match err.kind() {
            ErrorKind::Cancelled => return Err(err),
            ErrorKind::InvalidAmount => {
                error!(
                    attempt,
                    max_attempts,
                    "Swap aborted on attempt {}/{}: {}",
                    attempt,
                    max_attempts,
                    err
                );
                return Ok(None);
            }
            ErrorKind::OnChain | ErrorKind::Transport => {
                if attempt == max_attempts {
                    warn!(attempt, max_attempts, "Attempt {}/{} failed: {}", attempt, max_attempts, err);
                    error!("Swap failed after {} attempts", max_attempts);
                    return Ok(None);
                }
                warn!(
                    attempt,
                    max_attempts,
                    "Attempt {}/{} failed: {}. Retrying in {}s...",
                    attempt,
                    max_attempts,
                    err,
                    delay.as_secs()
                );
                pause(delay, cancel).await?;
            }
        }
    }
    Ok(None)
}

/// Swap with retries. True only if a swap was confirmed within the budget.
pub async fn execute_swap_with_retry<C: ChainClient>(
    session: &WalletSession<C>,
    token_in: &Token,
    token_out: &Token,
    amount: &str,
    max_attempts: u32,
) -> Result<bool, SwapError> {
    let outcome = retry_swap(
        |_| execute_swap(session, token_in, token_out, amount),
        max_attempts,
        session.settings().delays.retry,
        session.cancel_token(),
    )
    .await?;
    Ok(outcome.is_some())
}
