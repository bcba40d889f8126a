use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{interval, timeout};
use tracing::debug;

use super::{ChainClient, ClientFactory, ReceiptOutcome, TransactionPlan};
use crate::config::{BotConfig, Wallet};
use crate::error::SwapError;
use crate::execution::encoding::{encode_allowance, encode_balance_of, IERC20};

/// HTTP JSON-RPC client bound to one wallet
pub struct RpcChainClient {
    provider: DynProvider,
    wallet: EthereumWallet,
    address: Address,
    chain_id: u64,
    receipt_timeout: Duration,
    receipt_poll_interval: Duration,
}

impl RpcChainClient {
    pub async fn connect(
        rpc_url: &str,
        wallet: &Wallet,
        receipt_timeout: Duration,
        receipt_poll_interval: Duration,
    ) -> Result<Self, SwapError> {
        let url: reqwest::Url = rpc_url
            .parse()
            .map_err(|e| SwapError::Rpc(format!("bad rpc url {}: {}", rpc_url, e)))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        let chain_id = provider.get_chain_id().await?;
        debug!(chain_id, wallet = %wallet.address(), "RPC client connected");

        Ok(Self {
            provider,
            wallet: EthereumWallet::from(wallet.signer().clone()),
            address: wallet.address(),
            chain_id,
            receipt_timeout,
            receipt_poll_interval,
        })
    }

    fn request(&self, plan: &TransactionPlan) -> TransactionRequest {
        let tx = TransactionRequest::default()
            .from(plan.from)
            .to(plan.to)
            .value(plan.value)
            .input(TransactionInput::new(plan.data.clone()))
            .nonce(plan.nonce)
            .with_gas_price(plan.gas_price)
            .with_chain_id(self.chain_id);

        match plan.gas_limit {
            Some(limit) => tx.gas_limit(limit),
            None => tx,
        }
    }

    async fn view(&self, to: Address, data: Bytes) -> Result<Bytes, SwapError> {
        let tx = TransactionRequest::default()
            .to(to)
            .input(TransactionInput::new(data));
        Ok(self.provider.call(tx).await?)
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    fn address(&self) -> Address {
        self.address
    }

    async fn nonce(&self) -> Result<u64, SwapError> {
        Ok(self.provider.get_transaction_count(self.address).await?)
    }

    async fn gas_price(&self) -> Result<u128, SwapError> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn native_balance(&self) -> Result<U256, SwapError> {
        Ok(self.provider.get_balance(self.address).await?)
    }

    async fn token_balance(&self, token: Address) -> Result<U256, SwapError> {
        let result = self.view(token, encode_balance_of(self.address)).await?;
        Ok(IERC20::balanceOfCall::abi_decode_returns(&result)?)
    }

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256, SwapError> {
        let result = self.view(token, encode_allowance(self.address, spender)).await?;
        Ok(IERC20::allowanceCall::abi_decode_returns(&result)?)
    }

    async fn estimate_gas(&self, plan: &TransactionPlan) -> Result<u64, SwapError> {
        Ok(self.provider.estimate_gas(self.request(plan)).await?)
    }

    async fn submit(&self, plan: &TransactionPlan) -> Result<TxHash, SwapError> {
        if plan.gas_limit.is_none() {
            return Err(SwapError::Signing("transaction has no gas limit".into()));
        }

        let envelope = self
            .request(plan)
            .build(&self.wallet)
            .await
            .map_err(|e| SwapError::Signing(e.to_string()))?;
        let raw = envelope.encoded_2718();

        let pending = self.provider.send_raw_transaction(&raw).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<ReceiptOutcome, SwapError> {
        let mut poll_interval = interval(self.receipt_poll_interval);

        let receipt = timeout(self.receipt_timeout, async {
            loop {
                poll_interval.tick().await;
                if let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? {
                    return Ok::<_, SwapError>(receipt);
                }
            }
        })
        .await
        .map_err(|_| SwapError::ReceiptTimeout {
            tx: tx_hash,
            secs: self.receipt_timeout.as_secs(),
        })??;

        Ok(ReceiptOutcome {
            tx_hash: receipt.transaction_hash,
            success: receipt.status(),
        })
    }
}

/// Connects an [`RpcChainClient`] per wallet
pub struct RpcClientFactory {
    rpc_url: String,
    receipt_timeout: Duration,
    receipt_poll_interval: Duration,
}

impl RpcClientFactory {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            rpc_url: config.rpc_url.clone(),
            receipt_timeout: config.receipt_timeout,
            receipt_poll_interval: config.receipt_poll_interval,
        }
    }
}

#[async_trait]
impl ClientFactory for RpcClientFactory {
    type Client = RpcChainClient;

    async fn connect(&self, wallet: &Wallet) -> Result<RpcChainClient, SwapError> {
        RpcChainClient::connect(
            &self.rpc_url,
            wallet,
            self.receipt_timeout,
            self.receipt_poll_interval,
        )
        .await
    }
}
