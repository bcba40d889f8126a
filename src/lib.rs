//! Neura testnet swap bot
//!
//! Swaps a token pair back and forth through the Neura swap router for every
//! configured wallet, once per day.

pub mod chain;
pub mod config;
pub mod delay;
pub mod error;
pub mod execution;
pub mod scheduler;
pub mod session;
pub mod tokens;
pub mod units;

#[cfg(test)]
mod testing;
