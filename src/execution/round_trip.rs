use alloy::primitives::U256;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::chain::ChainClient;
use crate::config::{GAS_RESERVE, NATIVE_DECIMALS};
use crate::error::SwapError;
use crate::session::WalletSession;
use crate::tokens::Token;
use crate::units::{format_amount, to_base_units};

/// Native wei kept back for gas when swapping the native asset back
pub fn gas_reserve_wei() -> U256 {
    rust_decimal::Decimal::from_str(GAS_RESERVE)
        .ok()
        .and_then(|reserve| to_base_units(reserve, NATIVE_DECIMALS))
        .unwrap_or_default()
}

/// Render a nonzero swap-back balance, warning when it cannot be expressed
fn render_balance(balance: U256, token: &Token, decimals: u8) -> Option<String> {
    let rendered = format_amount(balance, decimals);
    if rendered.is_none() {
        warn!(
            token = %token,
            %balance,
            "{} balance exceeds amount precision. Skipping swap back.",
            token
        );
    }
    rendered
}

/// How much of `token` to swap back: the whole balance, minus the gas reserve
/// for the native asset. None when there is nothing (safe) to swap.
pub async fn swap_back_amount<C: ChainClient>(
    session: &WalletSession<C>,
    token: &Token,
) -> Result<Option<String>, SwapError> {
    let client = session.client();

    if token.is_native() {
        let balance = client.native_balance().await?;
        let reserve = gas_reserve_wei();
        debug!(%balance, %reserve, "Native balance for swap back");

        if balance <= reserve {
            return Ok(None);
        }
        return Ok(render_balance(balance - reserve, token, NATIVE_DECIMALS));
    }

    let balance = client.token_balance(token.address).await?;
    debug!(%balance, token = %token, "Token balance for swap back");

    if balance.is_zero() {
        return Ok(None);
    }
    Ok(render_balance(balance, token, token.decimals))
}
