use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::{SolCall, SolValue};

// The two contracts the bot talks to
sol! {
    #[derive(Debug)]
    interface ISwapRouter {
        function multicall(bytes[] data) external payable returns (bytes[] results);
    }

    #[derive(Debug)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}

/// Selector of the router's inner swap instruction
pub const INNER_SWAP_SELECTOR: [u8; 4] = [0x16, 0x79, 0xc7, 0x92];

/// Minimum output. The router does no slippage check.
const MIN_AMOUNT_OUT: u64 = 0;
/// Signature parity placeholder expected by the instruction
const SIG_V: u64 = 27;
const EXTRA_DATA: u64 = 0;

/// selector + 8 static words
pub const INNER_SWAP_LEN: usize = 4 + 8 * 32;

/// Encode the inner swap instruction:
/// `(tokenIn, tokenOut, 0, recipient, deadline, amountIn, 27, 0)`
pub fn encode_inner_swap(
    token_in: Address,
    token_out: Address,
    deadline_ms: u64,
    amount_in: U256,
    recipient: Address,
) -> Bytes {
    let params = (
        token_in,
        token_out,
        U256::from(MIN_AMOUNT_OUT),
        recipient,
        U256::from(deadline_ms),
        amount_in,
        U256::from(SIG_V),
        U256::from(EXTRA_DATA),
    )
        .abi_encode_params();

    let mut calldata = Vec::with_capacity(INNER_SWAP_LEN);
    calldata.extend_from_slice(&INNER_SWAP_SELECTOR);
    calldata.extend_from_slice(&params);
    Bytes::from(calldata)
}

/// Wrap inner calls into `multicall(bytes[])`
pub fn encode_multicall(calls: Vec<Bytes>) -> Bytes {
    Bytes::from(ISwapRouter::multicallCall { data: calls }.abi_encode())
}

pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    Bytes::from(IERC20::approveCall { spender, amount }.abi_encode())
}

pub fn encode_balance_of(account: Address) -> Bytes {
    Bytes::from(IERC20::balanceOfCall { account }.abi_encode())
}

pub fn encode_allowance(owner: Address, spender: Address) -> Bytes {
    Bytes::from(IERC20::allowanceCall { owner, spender }.abi_encode())
}
