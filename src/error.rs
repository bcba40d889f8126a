use alloy::primitives::TxHash;
use thiserror::Error;

/// How the retry loop treats an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input. Retrying cannot help.
    InvalidAmount,
    /// Transaction mined with a failed status
    OnChain,
    /// Node, network, signing or receipt-wait trouble
    Transport,
    Cancelled,
}

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("invalid or zero amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("approval transaction failed on-chain: {tx}")]
    ApprovalFailed { tx: TxHash },

    #[error("swap transaction failed on-chain: {tx}")]
    SwapFailed { tx: TxHash },

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("no receipt for {tx} after {secs}s")]
    ReceiptTimeout { tx: TxHash, secs: u64 },

    #[error("cancelled")]
    Cancelled,
}

impl SwapError {
    pub fn invalid_amount(amount: &str, reason: impl Into<String>) -> Self {
        SwapError::InvalidAmount {
            amount: amount.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SwapError::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            SwapError::ApprovalFailed { .. } | SwapError::SwapFailed { .. } => ErrorKind::OnChain,
            SwapError::Rpc(_) | SwapError::Signing(_) | SwapError::ReceiptTimeout { .. } => {
                ErrorKind::Transport
            }
            SwapError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::OnChain | ErrorKind::Transport)
    }
}

impl From<alloy::transports::TransportError> for SwapError {
    fn from(err: alloy::transports::TransportError) -> Self {
        SwapError::Rpc(err.to_string())
    }
}

impl From<alloy::sol_types::Error> for SwapError {
    fn from(err: alloy::sol_types::Error) -> Self {
        SwapError::Rpc(format!("undecodable call result: {}", err))
    }
}
