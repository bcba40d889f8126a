pub mod encoding;
pub mod retry;
pub mod round_trip;
pub mod swap;

pub use retry::{execute_swap_with_retry, retry_swap};
pub use round_trip::swap_back_amount;
pub use swap::{execute_swap, SwapOutcome};
