//! In-memory chain used by the engine tests

use alloy::primitives::{address, keccak256, Address, TxHash, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::chain::{ChainClient, ClientFactory, ReceiptOutcome, TransactionPlan};
use crate::config::{contracts, Delays, SwapSettings, Wallet};
use crate::error::SwapError;
use crate::execution::encoding::IERC20;
use crate::session::WalletSession;
use crate::tokens::Token;
use alloy::sol_types::SolCall;

pub const WALLET: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const USDT: Address = address!("1111111111111111111111111111111111111111");

pub fn usdt() -> Token {
    Token {
        address: USDT,
        symbol: "USDT".to_string(),
        decimals: 6,
    }
}

pub fn ankr() -> Token {
    Token {
        address: contracts::WANKR,
        symbol: "ANKR".to_string(),
        decimals: 18,
    }
}

pub fn wankr() -> Token {
    Token {
        address: contracts::WANKR,
        symbol: "WANKR".to_string(),
        decimals: 18,
    }
}

pub fn test_settings() -> Arc<SwapSettings> {
    Arc::new(SwapSettings {
        delays: Delays::none(),
        ..SwapSettings::default()
    })
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub nonce: u64,
    pub gas_price: u128,
    pub native_balance: U256,
    pub token_balances: HashMap<Address, U256>,
    /// keyed by token; spender is always the router in these tests
    pub allowances: HashMap<Address, U256>,
    pub approval_gas: u64,
    pub submitted: Vec<TransactionPlan>,
    receipts: HashMap<TxHash, bool>,
    /// Next N nonce() calls fail with an rpc error
    pub nonce_failures: u32,
    /// Next N swap receipts come back reverted
    pub swap_reverts: u32,
    pub approval_reverts: u32,
    /// Every balance read fails
    pub balance_errors: bool,
    /// Cancel this token when the first transaction is submitted
    pub cancel_on_submit: Option<CancellationToken>,
}

/// Cloneable handle; all clones share one state
#[derive(Debug, Clone)]
pub struct FakeChain {
    address: Address,
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeChain {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            state: Arc::new(Mutex::new(FakeState {
                gas_price: 1_000_000_000,
                approval_gas: 46_000,
                ..FakeState::default()
            })),
        }
    }

    pub fn with_allowance(self, token: Address, amount: U256) -> Self {
        self.state.lock().allowances.insert(token, amount);
        self
    }

    pub fn with_token_balance(self, token: Address, amount: U256) -> Self {
        self.state.lock().token_balances.insert(token, amount);
        self
    }

    pub fn with_native_balance(self, amount: U256) -> Self {
        self.state.lock().native_balance = amount;
        self
    }

    pub fn with_nonce(self, nonce: u64) -> Self {
        self.state.lock().nonce = nonce;
        self
    }

    pub fn submitted(&self) -> Vec<TransactionPlan> {
        self.state.lock().submitted.clone()
    }

    pub fn session(&self) -> WalletSession<FakeChain> {
        WalletSession::new(self.clone(), test_settings(), CancellationToken::new())
    }
}

fn is_approval(plan: &TransactionPlan) -> bool {
    plan.data.starts_with(&IERC20::approveCall::SELECTOR)
}

#[async_trait]
impl ChainClient for FakeChain {
    fn address(&self) -> Address {
        self.address
    }

    async fn nonce(&self) -> Result<u64, SwapError> {
        let mut state = self.state.lock();
        if state.nonce_failures > 0 {
            state.nonce_failures -= 1;
            return Err(SwapError::Rpc("connection reset".into()));
        }
        Ok(state.nonce)
    }

    async fn gas_price(&self) -> Result<u128, SwapError> {
        Ok(self.state.lock().gas_price)
    }

    async fn native_balance(&self) -> Result<U256, SwapError> {
        let state = self.state.lock();
        if state.balance_errors {
            return Err(SwapError::Rpc("balance unavailable".into()));
        }
        Ok(state.native_balance)
    }

    async fn token_balance(&self, token: Address) -> Result<U256, SwapError> {
        let state = self.state.lock();
        if state.balance_errors {
            return Err(SwapError::Rpc("balance unavailable".into()));
        }
        Ok(state.token_balances.get(&token).copied().unwrap_or_default())
    }

    async fn allowance(&self, token: Address, _spender: Address) -> Result<U256, SwapError> {
        Ok(self.state.lock().allowances.get(&token).copied().unwrap_or_default())
    }

    async fn estimate_gas(&self, _plan: &TransactionPlan) -> Result<u64, SwapError> {
        Ok(self.state.lock().approval_gas)
    }

    async fn submit(&self, plan: &TransactionPlan) -> Result<TxHash, SwapError> {
        let mut state = self.state.lock();
        if plan.nonce != state.nonce {
            return Err(SwapError::Rpc(format!(
                "nonce too low/high: got {}, expected {}",
                plan.nonce, state.nonce
            )));
        }

        let index = state.submitted.len() as u64;
        let tx_hash = keccak256(index.to_be_bytes());

        let success = if is_approval(plan) {
            if state.approval_reverts > 0 {
                state.approval_reverts -= 1;
                false
            } else {
                state.allowances.insert(plan.to, U256::MAX);
                true
            }
        } else if state.swap_reverts > 0 {
            state.swap_reverts -= 1;
            false
        } else {
            true
        };

        state.nonce += 1;
        state.receipts.insert(tx_hash, success);
        state.submitted.push(plan.clone());

        if let Some(cancel) = state.cancel_on_submit.take() {
            cancel.cancel();
        }
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ReceiptOutcome, SwapError> {
        let state = self.state.lock();
        let success = state
            .receipts
            .get(&tx_hash)
            .copied()
            .ok_or_else(|| SwapError::Rpc("unknown transaction".into()))?;
        Ok(ReceiptOutcome { tx_hash, success })
    }
}

/// Hands out pre-built fake clients by wallet address
#[derive(Default)]
pub struct FakeFactory {
    pub chains: HashMap<Address, FakeChain>,
    pub connect_log: Mutex<Vec<Address>>,
}

impl FakeFactory {
    pub fn add(&mut self, chain: FakeChain) {
        self.chains.insert(chain.address(), chain);
    }
}

#[async_trait]
impl ClientFactory for FakeFactory {
    type Client = FakeChain;

    async fn connect(&self, wallet: &Wallet) -> Result<FakeChain, SwapError> {
        self.connect_log.lock().push(wallet.address());
        self.chains
            .get(&wallet.address())
            .cloned()
            .ok_or_else(|| SwapError::Rpc("node unreachable".into()))
    }
}
