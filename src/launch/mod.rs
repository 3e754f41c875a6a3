//! Create-and-buy launch pipeline
//!
//! The pipeline is split into focused modules:
//! - **errors**: fatal, whole-batch and per-index error tiers
//! - **instructions**: ordered `create` + `buy` instruction specs
//! - **planner**: two-phase batch split
//! - **signing**: signer-set resolution and slot-wise signing
//! - **output**: signed transactions, outcomes and the run result
//! - **orchestrator**: the two-phase state machine
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pump_bundler::clients::{PumpIpfsPublisher, PumpPortalClient};
//! use pump_bundler::launch::{LaunchRequest, Orchestrator, TradeParams};
//! use pump_bundler::wallet::KeypairStore;
//!
//! # async fn example(store: KeypairStore, request: LaunchRequest) -> anyhow::Result<()> {
//! let timeout = std::time::Duration::from_secs(30);
//! let orchestrator = Orchestrator::new(
//!     Arc::new(PumpPortalClient::new("https://pumpportal.fun/api/trade-local", timeout)?),
//!     Arc::new(PumpIpfsPublisher::new("https://pump.fun/api/ipfs", timeout)?),
//!     TradeParams::default(),
//!     5,
//! )?;
//!
//! let result = orchestrator.launch(&store, &request).await?;
//! for signature in result.signatures() {
//!     println!("{signature}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub use errors::{AssemblyError, BundleError, SigningError};

mod instructions;
mod orchestrator;
mod output;
mod planner;
mod signing;

pub use instructions::{build_instruction_specs, CreateMetadata, InstructionSpec, TradeParams};
pub use orchestrator::{LaunchRequest, Orchestrator};
pub use output::{
    Phase, ReportEntry, RunReport, RunResult, RunStatus, SignedTransaction, SigningOutcome,
    UnsignedTransaction,
};
pub use planner::{plan_batches, Batch};
pub use signing::SigningCoordinator;
