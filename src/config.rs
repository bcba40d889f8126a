//! Neura Swap Bot Configuration

use alloy::primitives::{address, Address};
use alloy::signers::local::PrivateKeySigner;
use eyre::{eyre, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_RPC_URL: &str = "https://testnet.rpc.neuraprotocol.io/";
pub const DEFAULT_TOKEN_CATALOG_URL: &str =
    "https://api.goldsky.com/api/public/project_cmc8t6vh6mqlg01w19r2g15a7/subgraphs/analytics/1.0.1/gn";
pub const EXPLORER_TX_URL: &str = "https://testnet.neuraprotocol.io/tx/";

/// Contracts the bot talks to on Neura testnet
pub mod contracts {
    use super::*;

    pub const SWAP_ROUTER: Address = address!("5AeFBA317BAba46EAF98Fd6f381d07673bcA6467");
    pub const WANKR: Address = address!("bd833b6ecc30caeabf81db18bb0f1e00c6997e7a");
}

/// Catalog symbols with special meaning
pub mod symbols {
    /// Wrapped native token as listed by the catalog
    pub const WRAPPED_NATIVE: &str = "WANKR";
    /// Synthetic alias meaning "pay with the native asset"
    pub const NATIVE: &str = "ANKR";
}

/// Native asset precision (wei)
pub const NATIVE_DECIMALS: u8 = 18;

/// Native amount kept back when swapping the native asset back, in whole ANKR
pub const GAS_RESERVE: &str = "0.005";

/// Swaps go out with a fixed limit; eth_estimateGas is unreliable for the multicall shape
pub const DEFAULT_SWAP_GAS_LIMIT: u64 = 600_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Swap deadline, relative to wall clock (milliseconds)
pub const SWAP_DEADLINE_MS: i64 = 20 * 60 * 1000;

pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_RECEIPT_POLL_MS: u64 = 1_000;
pub const CATALOG_TIMEOUT_SECS: u64 = 30;

const PRIVATE_KEY_PREFIX: &str = "PRIVATE_KEY_";

/// Pauses between operations
#[derive(Debug, Clone)]
pub struct Delays {
    /// Between failed attempts of the same swap
    pub retry: Duration,
    /// Between a successful forward swap and the swap back
    pub swap_back: Duration,
    pub inter_cycle: Duration,
    pub inter_wallet: Duration,
    /// After a completed round
    pub daily: Duration,
    /// After a round that failed before finishing
    pub error_backoff: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            retry: Duration::from_secs(10),
            swap_back: Duration::from_secs(10),
            inter_cycle: Duration::from_secs(10),
            inter_wallet: Duration::from_secs(10),
            daily: Duration::from_secs(24 * 60 * 60),
            error_backoff: Duration::from_secs(60 * 60),
        }
    }
}

impl Delays {
    /// No waiting at all. Used by tests.
    pub fn none() -> Self {
        Self {
            retry: Duration::ZERO,
            swap_back: Duration::ZERO,
            inter_cycle: Duration::ZERO,
            inter_wallet: Duration::ZERO,
            daily: Duration::ZERO,
            error_backoff: Duration::ZERO,
        }
    }
}

/// Per-swap knobs shared by every wallet session
#[derive(Debug, Clone)]
pub struct SwapSettings {
    pub router: Address,
    pub wrapped_native: Address,
    pub swap_gas_limit: u64,
    pub max_attempts: u32,
    pub delays: Delays,
}

impl Default for SwapSettings {
    fn default() -> Self {
        Self {
            router: contracts::SWAP_ROUTER,
            wrapped_native: contracts::WANKR,
            swap_gas_limit: DEFAULT_SWAP_GAS_LIMIT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delays: Delays::default(),
        }
    }
}

/// Main configuration for the swap bot
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub rpc_url: String,
    pub catalog_url: String,
    pub receipt_timeout: Duration,
    pub receipt_poll_interval: Duration,
    pub swap: SwapSettings,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        let rpc_url = env::var("NEURA_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());
        let catalog_url = env::var("TOKEN_CATALOG_URL")
            .unwrap_or_else(|_| DEFAULT_TOKEN_CATALOG_URL.to_string());

        let swap = SwapSettings {
            swap_gas_limit: env_or("SWAP_GAS_LIMIT", DEFAULT_SWAP_GAS_LIMIT)?,
            max_attempts: env_or("SWAP_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            ..SwapSettings::default()
        };
        if swap.max_attempts == 0 {
            return Err(eyre!("SWAP_MAX_ATTEMPTS must be at least 1"));
        }

        Ok(Self {
            rpc_url,
            catalog_url,
            receipt_timeout: Duration::from_secs(env_or(
                "RECEIPT_TIMEOUT_SECS",
                DEFAULT_RECEIPT_TIMEOUT_SECS,
            )?),
            receipt_poll_interval: Duration::from_millis(env_or(
                "RECEIPT_POLL_MS",
                DEFAULT_RECEIPT_POLL_MS,
            )?),
            swap,
        })
    }

    pub fn log_config(&self) {
        tracing::info!(
            rpc = %self.rpc_url,
            router = %self.swap.router,
            swap_gas_limit = self.swap.swap_gas_limit,
            max_attempts = self.swap.max_attempts,
            "Configuration loaded"
        );
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| eyre!("{} has an invalid value: {:?}", key, raw)),
        _ => Ok(default),
    }
}

/// A configured wallet. The key itself never leaves the signer.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    pub fn from_private_key(key: &str) -> Result<Self> {
        let signer = PrivateKeySigner::from_str(key.trim())
            .map_err(|_| eyre!("invalid private key (value withheld)"))?;
        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// `0x1234abcd…` for log lines
    pub fn short_address(&self) -> String {
        short_address(self.address())
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet").field("address", &self.address()).finish()
    }
}

pub fn short_address(address: Address) -> String {
    let full = address.to_checksum(None);
    format!("{}…", &full[..10])
}

/// Loads every non-empty `PRIVATE_KEY_*` variable, ordered by variable name.
pub fn load_wallets() -> Result<Vec<Wallet>> {
    wallets_from_vars(env::vars())
}

fn wallets_from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Vec<Wallet>> {
    let mut keys: Vec<(String, String)> = vars
        .into_iter()
        .filter(|(name, value)| name.starts_with(PRIVATE_KEY_PREFIX) && !value.trim().is_empty())
        .collect();
    keys.sort_by(|a, b| a.0.cmp(&b.0));

    keys.iter()
        .map(|(name, value)| {
            Wallet::from_private_key(value).map_err(|e| eyre!("{}: {}", name, e))
        })
        .collect()
}
