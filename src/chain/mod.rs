//! Chain client boundary
//!
//! Everything that touches the node goes through [`ChainClient`]. The engine
//! only ever holds one client per wallet, bound to that wallet's key.

pub mod rpc;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use crate::error::SwapError;

pub use rpc::{RpcChainClient, RpcClientFactory};

/// A fully specified transaction, ready to be signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPlan {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub nonce: u64,
    pub gas_price: u128,
    /// None until estimated or fixed
    pub gas_limit: Option<u64>,
}

impl TransactionPlan {
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

/// Final status of a mined transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptOutcome {
    pub tx_hash: TxHash,
    pub success: bool,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Wallet this client signs for
    fn address(&self) -> Address;

    async fn nonce(&self) -> Result<u64, SwapError>;

    async fn gas_price(&self) -> Result<u128, SwapError>;

    async fn native_balance(&self) -> Result<U256, SwapError>;

    async fn token_balance(&self, token: Address) -> Result<U256, SwapError>;

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256, SwapError>;

    async fn estimate_gas(&self, plan: &TransactionPlan) -> Result<u64, SwapError>;

    /// Sign the plan and submit it raw. Returns once the node accepted it.
    async fn submit(&self, plan: &TransactionPlan) -> Result<TxHash, SwapError>;

    /// Block until the transaction is mined.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ReceiptOutcome, SwapError>;
}

/// Builds a fresh client for each wallet in a round
#[async_trait]
pub trait ClientFactory: Send + Sync {
    type Client: ChainClient;

    async fn connect(&self, wallet: &crate::config::Wallet) -> Result<Self::Client, SwapError>;
}
