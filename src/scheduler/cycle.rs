use tracing::{info, warn};

use crate::chain::ChainClient;
use crate::error::SwapError;
use crate::execution::{execute_swap_with_retry, swap_back_amount};
use crate::session::WalletSession;
use crate::tokens::Token;

/// Forward leg goes `from` -> `to`, the swap back goes `to` -> `from`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPair {
    pub from: Token,
    pub to: Token,
}

/// What happened to one wallet's cycles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletReport {
    pub cycles: u32,
    pub forward_ok: u32,
    pub reverse_ok: u32,
    pub reverse_failed: u32,
    /// Forward failed, or no swappable balance to send back
    pub reverse_skipped: u32,
}

/// Run `repeats` forward + swap-back cycles for one wallet.
///
/// Failed legs are absorbed by the retry loop. Any error returned here
/// (a balance read that failed, or cancellation) ends this wallet's cycles.
pub async fn run_wallet_cycles<C: ChainClient>(
    session: &WalletSession<C>,
    pair: &SwapPair,
    amount: &str,
    repeats: u32,
) -> Result<WalletReport, SwapError> {
    let settings = session.settings();
    let max_attempts = settings.max_attempts;
    let mut report = WalletReport::default();

    for cycle in 1..=repeats {
        info!(wallet = %session.short_address(), "--- Swap cycle {}/{} ---", cycle, repeats);

        let forward_ok =
            execute_swap_with_retry(session, &pair.from, &pair.to, amount, max_attempts).await?;

        if forward_ok {
            report.forward_ok += 1;

            info!(
                "Waiting {}s before swapping back...",
                settings.delays.swap_back.as_secs()
            );
            session.pause(settings.delays.swap_back).await?;

            match swap_back_amount(session, &pair.to).await? {
                Some(back_amount) => {
                    let reverse_ok = execute_swap_with_retry(
                        session,
                        &pair.to,
                        &pair.from,
                        &back_amount,
                        max_attempts,
                    )
                    .await?;
                    if reverse_ok {
                        report.reverse_ok += 1;
                    } else {
                        report.reverse_failed += 1;
                    }
                }
                None => {
                    warn!("No swappable {} balance. Skipping swap back.", pair.to);
                    report.reverse_skipped += 1;
                }
            }
        } else {
            warn!(
                "Skipping swap back because the initial swap from {} failed.",
                pair.from
            );
            report.reverse_skipped += 1;
        }

        report.cycles += 1;

        if cycle < repeats {
            info!(
                "Waiting {}s before the next cycle...",
                settings.delays.inter_cycle.as_secs()
            );
            session.pause(settings.delays.inter_cycle).await?;
        }
    }

    info!(wallet = %session.short_address(), "All cycles for wallet finished");
    Ok(report)
}
