use alloy::primitives::{TxHash, U256};
use tracing::info;

use super::encoding::{encode_approve, encode_inner_swap, encode_multicall};
use crate::chain::{ChainClient, TransactionPlan};
use crate::config::{EXPLORER_TX_URL, SWAP_DEADLINE_MS};
use crate::error::SwapError;
use crate::session::WalletSession;
use crate::tokens::Token;
use crate::units::amount_to_base_units;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub tx_hash: TxHash,
    /// Set when an approval had to be sent first
    pub approval_tx: Option<TxHash>,
    pub amount_in: U256,
}

/// Router deadline: now + 20 minutes, in milliseconds
fn swap_deadline_ms() -> u64 {
    (chrono::Utc::now().timestamp_millis() + SWAP_DEADLINE_MS) as u64
}

/// Make sure the router may spend `required` of `token`.
///
/// Sends `approve(router, MAX)` with `nonce` when the current allowance is short
/// and waits for it to be mined. Returns the approval hash if one was sent.
async fn ensure_approval<C: ChainClient>(
    session: &WalletSession<C>,
    token: &Token,
    required: U256,
    nonce: u64,
    gas_price: u128,
) -> Result<Option<TxHash>, SwapError> {
    let client = session.client();
    let router = session.settings().router;

    let allowance = client.allowance(token.address, router).await?;
    if allowance >= required {
        info!(token = %token, "Allowance already sufficient");
        return Ok(None);
    }

    info!(token = %token, "Approving router to spend {}...", token);

    let plan = TransactionPlan {
        from: session.address(),
        to: token.address,
        data: encode_approve(router, U256::MAX),
        value: U256::ZERO,
        nonce,
        gas_price,
        gas_limit: None,
    };
    let gas_limit = client.estimate_gas(&plan).await?;
    let plan = plan.with_gas_limit(gas_limit);

    session.ensure_active()?;
    let tx_hash = client.submit(&plan).await?;
    let receipt = client.wait_for_receipt(tx_hash).await?;

    if !receipt.success {
        return Err(SwapError::ApprovalFailed { tx: tx_hash });
    }

    info!(tx = %tx_hash, "Approval successful");
    Ok(Some(tx_hash))
}

/// Execute one swap `token_in` -> `token_out` through the router multicall.
///
/// The nonce is read once. If an approval goes out first, the swap uses the
/// next nonce without asking the node again; this assumes nothing else sends
/// from this wallet while the swap runs.
pub async fn execute_swap<C: ChainClient>(
    session: &WalletSession<C>,
    token_in: &Token,
    token_out: &Token,
    amount: &str,
) -> Result<SwapOutcome, SwapError> {
    let amount_in = amount_to_base_units(amount, token_in.decimals)?;
    let client = session.client();
    let settings = session.settings();
    let wallet_address = session.address();

    info!(
        wallet = %session.short_address(),
        "Swapping {} {} → {}...",
        amount.trim(),
        token_in,
        token_out
    );

    let mut nonce = client.nonce().await?;
    let gas_price = client.gas_price().await?;

    let approval_tx = if token_in.is_native() {
        None
    } else {
        ensure_approval(session, token_in, amount_in, nonce, gas_price).await?
    };
    if approval_tx.is_some() {
        nonce += 1;
    }

    // The router only knows the wrapped form of the native asset
    let router_token_in = if token_in.is_native() {
        settings.wrapped_native
    } else {
        token_in.address
    };

    let inner = encode_inner_swap(
        router_token_in,
        token_out.address,
        swap_deadline_ms(),
        amount_in,
        wallet_address,
    );
    let data = encode_multicall(vec![inner]);
    let value = if token_in.is_native() {
        amount_in
    } else {
        U256::ZERO
    };

    let plan = TransactionPlan {
        from: wallet_address,
        to: settings.router,
        data,
        value,
        nonce,
        gas_price,
        gas_limit: Some(settings.swap_gas_limit),
    };

    info!("Sending swap transaction...");
    session.ensure_active()?;
    let tx_hash = client.submit(&plan).await?;
    info!(tx = %tx_hash, "Swap tx sent, waiting for receipt");

    let receipt = client.wait_for_receipt(tx_hash).await?;
    if !receipt.success {
        return Err(SwapError::SwapFailed { tx: tx_hash });
    }

    info!("Swap successful: {}{}", EXPLORER_TX_URL, receipt.tx_hash);

    Ok(SwapOutcome {
        tx_hash,
        approval_tx,
        amount_in,
    })
}
