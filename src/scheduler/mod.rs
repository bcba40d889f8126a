pub mod cycle;
pub mod fleet;

pub use cycle::{run_wallet_cycles, SwapPair, WalletReport};
pub use fleet::{FleetPlan, FleetScheduler, FleetState, RoundReport};
