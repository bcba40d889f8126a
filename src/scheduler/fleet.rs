use eyre::{eyre, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::cycle::{run_wallet_cycles, SwapPair, WalletReport};
use crate::chain::ClientFactory;
use crate::config::{SwapSettings, Wallet};
use crate::delay::{pause, ScheduledDelay};
use crate::error::SwapError;
use crate::session::WalletSession;
use crate::tokens::{find_token, TokenCatalog};

/// What every wallet does each round
#[derive(Debug, Clone)]
pub struct FleetPlan {
    pub from_symbol: String,
    pub to_symbol: String,
    pub amount: String,
    pub repeats: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetState {
    Running,
    Sleeping(Duration),
}

impl FleetState {
    /// Where the scheduler goes once a round has ended
    pub fn after_round(round: &Result<RoundReport>, settings: &SwapSettings) -> Self {
        match round {
            Ok(_) => FleetState::Sleeping(settings.delays.daily),
            Err(_) => FleetState::Sleeping(settings.delays.error_backoff),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReport {
    pub wallets_completed: usize,
    pub wallets_failed: usize,
}

/// Runs the plan across all wallets, one at a time, once per day.
pub struct FleetScheduler<F, K> {
    factory: F,
    catalog: K,
    wallets: Vec<Wallet>,
    plan: FleetPlan,
    settings: Arc<SwapSettings>,
    cancel: CancellationToken,
}

impl<F: ClientFactory, K: TokenCatalog> FleetScheduler<F, K> {
    pub fn new(
        factory: F,
        catalog: K,
        wallets: Vec<Wallet>,
        plan: FleetPlan,
        settings: SwapSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            factory,
            catalog,
            wallets,
            plan,
            settings: Arc::new(settings),
            cancel,
        }
    }

    /// Fetch the catalog and look up both symbols of the plan
    pub async fn resolve_pair(&self) -> Result<SwapPair> {
        let tokens = self.catalog.fetch_tokens().await?;

        let lookup = |symbol: &str| {
            find_token(&tokens, symbol)
                .cloned()
                .ok_or_else(|| eyre!("Token {} not found in catalog", symbol))
        };

        Ok(SwapPair {
            from: lookup(&self.plan.from_symbol)?,
            to: lookup(&self.plan.to_symbol)?,
        })
    }

    async fn run_wallet(&self, wallet: &Wallet, pair: &SwapPair) -> Result<WalletReport, SwapError> {
        let client = self.factory.connect(wallet).await?;
        let session = WalletSession::new(client, Arc::clone(&self.settings), self.cancel.clone());
        run_wallet_cycles(&session, pair, &self.plan.amount, self.plan.repeats).await
    }

    /// One pass over every wallet.
    ///
    /// A wallet that fails is logged and counted; the next wallet still runs.
    /// Errors out only if the pair cannot be resolved or shutdown was requested.
    pub async fn run_round(&self) -> Result<RoundReport> {
        info!(
            "Starting round: {} {} → {} x{} over {} wallet(s)",
            self.plan.amount,
            self.plan.from_symbol,
            self.plan.to_symbol,
            self.plan.repeats,
            self.wallets.len()
        );

        let pair = self.resolve_pair().await?;
        let mut report = RoundReport::default();

        for (index, wallet) in self.wallets.iter().enumerate() {
            info!(
                "--- Processing wallet {}/{}: {} ---",
                index + 1,
                self.wallets.len(),
                wallet.short_address()
            );

            match self.run_wallet(wallet, &pair).await {
                Ok(wallet_report) => {
                    info!(
                        wallet = %wallet.short_address(),
                        cycles = wallet_report.cycles,
                        forward_ok = wallet_report.forward_ok,
                        reverse_ok = wallet_report.reverse_ok,
                        "Wallet done"
                    );
                    report.wallets_completed += 1;
                }
                Err(SwapError::Cancelled) => return Err(SwapError::Cancelled.into()),
                Err(e) => {
                    error!("Swap flow failed for wallet {}: {}", wallet.address(), e);
                    report.wallets_failed += 1;
                }
            }

            info!(
                "Waiting {}s before next wallet...",
                self.settings.delays.inter_wallet.as_secs()
            );
            pause(self.settings.delays.inter_wallet, &self.cancel).await?;
        }

        Ok(report)
    }

    /// Round, sleep, repeat until cancelled.
    pub async fn run_forever(&self) -> Result<()> {
        let mut state = FleetState::Running;

        loop {
            if self.cancel.is_cancelled() {
                info!("Scheduler stopped");
                return Ok(());
            }

            state = match state {
                FleetState::Running => {
                    let round = self.run_round().await;
                    if self.cancel.is_cancelled() {
                        continue;
                    }
                    match &round {
                        Ok(report) => info!(
                            completed = report.wallets_completed,
                            failed = report.wallets_failed,
                            "Round finished. Sleeping {}h...",
                            self.settings.delays.daily.as_secs() / 3600
                        ),
                        Err(e) => warn!(
                            "Round failed: {}. Retrying in {}s...",
                            e,
                            self.settings.delays.error_backoff.as_secs()
                        ),
                    }
                    FleetState::after_round(&round, &self.settings)
                }
                FleetState::Sleeping(duration) => {
                    if ScheduledDelay::new(duration).wait(&self.cancel).await.is_err() {
                        continue;
                    }
                    FleetState::Running
                }
            };
        }
    }
}
