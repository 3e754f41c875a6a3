//! Error taxonomy for a create-and-buy launch
//!
//! Three tiers, each with its own propagation rule:
//! - [`BundleError`]: fatal. Returned as `Err` before (or instead of) any
//!   network round trip; no partial [`RunResult`](super::RunResult) exists.
//! - [`AssemblyError`]: whole-batch failure of the assembly service. Stops
//!   forward progress but everything already signed is kept.
//! - [`SigningError`]: local to one index of one batch, recorded inline.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Fatal errors that abort a run with no result
#[derive(Error, Debug)]
pub enum BundleError {
    /// Malformed input to the instruction builder or planner
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid batch-size configuration
    #[error("Capacity error: {0}")]
    Capacity(String),

    /// Metadata publication failed; no token can be created without it
    #[error("Metadata publish failed: {0}")]
    Metadata(String),

    /// Keypair file or secret could not be loaded
    #[error("Keypair error: {0}")]
    Keypair(String),

    /// Invalid runtime configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BundleError {
    /// Get the error category for metrics and observability
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Capacity(_) => "capacity",
            Self::Metadata(_) => "metadata",
            Self::Keypair(_) => "keypair",
            Self::Configuration(_) => "config",
        }
    }

    /// Whether the error was raised before any network call
    pub fn is_pre_network(&self) -> bool {
        !matches!(self, Self::Metadata(_))
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub fn capacity(reason: impl Into<String>) -> Self {
        Self::Capacity(reason.into())
    }
}

/// Whole-batch failure reported by a transaction assembler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// The service answered with a non-success status
    #[error("Assembly service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS or timeout failure
    #[error("Assembly transport error: {0}")]
    Transport(String),

    /// The body was not a JSON array of base-58 strings
    #[error("Invalid assembly response: {0}")]
    InvalidResponse(String),

    /// The service returned a different number of transactions than requested
    #[error("Assembly response length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl AssemblyError {
    pub fn category(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Transport(_) => "transport",
            Self::InvalidResponse(_) => "response",
            Self::LengthMismatch { .. } => "length",
        }
    }
}

/// Per-index signing failure; does not affect sibling indices
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// A designated signer is not held by the keypair store
    #[error("Missing signing identity: {pubkey}")]
    MissingIdentity { pubkey: Pubkey },

    /// The unsigned blob is not a valid versioned transaction
    #[error("Failed to decode unsigned transaction: {0}")]
    Decode(String),

    /// The message requires a signer set other than the one the instruction designates
    #[error("Unexpected signer set: expected {expected:?}, message requires {actual:?}")]
    UnexpectedSigners {
        expected: Vec<Pubkey>,
        actual: Vec<Pubkey>,
    },

    /// The signed transaction could not be serialized
    #[error("Failed to encode signed transaction: {0}")]
    Encode(String),

    /// No unsigned transaction was supplied for this index
    #[error("No unsigned transaction for batch index {index}")]
    MissingTransaction { index: usize },
}

impl SigningError {
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingIdentity { .. } => "missing_identity",
            Self::Decode(_) => "decode",
            Self::UnexpectedSigners { .. } => "signer_set",
            Self::Encode(_) => "encode",
            Self::MissingTransaction { .. } => "missing_transaction",
        }
    }
}
