use alloy::primitives::Address;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::chain::ChainClient;
use crate::config::{short_address, SwapSettings};
use crate::delay::pause;
use crate::error::SwapError;

/// Everything one wallet needs for a round: its client, the shared swap
/// settings and the shutdown signal. Built per wallet, dropped after its cycles.
pub struct WalletSession<C> {
    client: C,
    settings: Arc<SwapSettings>,
    cancel: CancellationToken,
}

impl<C: ChainClient> WalletSession<C> {
    pub fn new(client: C, settings: Arc<SwapSettings>, cancel: CancellationToken) -> Self {
        Self {
            client,
            settings,
            cancel,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn settings(&self) -> &SwapSettings {
        &self.settings
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn address(&self) -> Address {
        self.client.address()
    }

    pub fn short_address(&self) -> String {
        short_address(self.address())
    }

    /// Err(Cancelled) once shutdown was requested
    pub fn ensure_active(&self) -> Result<(), SwapError> {
        if self.cancel.is_cancelled() {
            Err(SwapError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub async fn pause(&self, duration: Duration) -> Result<(), SwapError> {
        pause(duration, &self.cancel).await
    }
}
