//! pump-bundler - create a pump.fun token and bundle the first buys
//!
//! This library exposes the launch pipeline and its collaborators so the
//! CLI and integration tests share one implementation.

pub mod clients;
pub mod compat;
pub mod config;
pub mod launch;
pub mod metrics;
pub mod observability;
pub mod structured_logging;
pub mod types;
pub mod wallet;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use launch::{BundleError, Orchestrator, RunResult};
pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
