//! Run outputs: transactions, per-index outcomes and the aggregate result

use crate::launch::errors::{AssemblyError, SigningError};
use crate::types::ActionKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::fmt;

/// Serialized transaction returned by the assembly service, not yet signed
#[derive(Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    bytes: Vec<u8>,
}

impl UnsignedTransaction {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Decode the base-58 form used on the wire
    pub fn from_base58(encoded: &str) -> Result<Self, bs58::decode::Error> {
        bs58::decode(encoded).into_vec().map(Self::from_bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for UnsignedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnsignedTransaction({} bytes)", self.bytes.len())
    }
}

/// Fully signed transaction ready for broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    bytes: Vec<u8>,
    signature: Signature,
    signers: Vec<Pubkey>,
}

impl SignedTransaction {
    pub fn new(bytes: Vec<u8>, signature: Signature, signers: Vec<Pubkey>) -> Self {
        Self {
            bytes,
            signature,
            signers,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Base-58 encoded serialized transaction
    pub fn encoded(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    /// Primary signature (slot 0)
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Identities that signed, in the order signatures were applied
    pub fn signers(&self) -> &[Pubkey] {
        &self.signers
    }
}

/// Orchestration state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Start,
    Phase1Assemble,
    Phase1Sign,
    Phase2Assemble,
    Phase2Sign,
    Done,
}

impl Phase {
    /// Assemble state for the batch at `batch_index`
    pub fn assemble(batch_index: usize) -> Self {
        if batch_index == 0 {
            Phase::Phase1Assemble
        } else {
            Phase::Phase2Assemble
        }
    }

    /// Sign state for the batch at `batch_index`
    pub fn sign(batch_index: usize) -> Self {
        if batch_index == 0 {
            Phase::Phase1Sign
        } else {
            Phase::Phase2Sign
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Phase1Assemble => "phase1_assemble",
            Phase::Phase1Sign => "phase1_sign",
            Phase::Phase2Assemble => "phase2_assemble",
            Phase::Phase2Sign => "phase2_sign",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every batch was assembled and went through signing
    Done,
    /// An assembly call failed; later phases were not attempted
    Failed { phase: Phase, error: AssemblyError },
}

/// Result of signing one index of one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningOutcome {
    pub batch_index: usize,
    pub index: usize,
    pub kind: ActionKind,
    /// Primary signer of the instruction (creator for `create`, buyer for `buy`)
    pub signer: Pubkey,
    pub result: Result<SignedTransaction, SigningError>,
}

impl SigningOutcome {
    pub fn is_signed(&self) -> bool {
        self.result.is_ok()
    }

    pub fn signed(&self) -> Option<&SignedTransaction> {
        self.result.as_ref().ok()
    }
}

/// Aggregate outcome of a launch run
#[derive(Debug, Clone)]
pub struct RunResult {
    pub run_id: String,
    pub mint: Pubkey,
    pub started_at: DateTime<Utc>,
    pub status: RunStatus,
    pub outcomes: Vec<SigningOutcome>,
}

impl RunResult {
    /// Phase the run ended in
    pub fn terminal_phase(&self) -> Phase {
        match &self.status {
            RunStatus::Done => Phase::Done,
            RunStatus::Failed { phase, .. } => *phase,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Done && self.outcomes.iter().all(SigningOutcome::is_signed)
    }

    /// Signed transactions in submission order
    pub fn signed(&self) -> impl Iterator<Item = (&SigningOutcome, &SignedTransaction)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.signed().map(|tx| (outcome, tx)))
    }

    pub fn signed_count(&self) -> usize {
        self.signed().count()
    }

    /// Signed transaction whose primary signer is `signer`
    pub fn signed_for(&self, signer: &Pubkey) -> Option<&SignedTransaction> {
        self.signed()
            .find(|(outcome, _)| outcome.signer == *signer)
            .map(|(_, tx)| tx)
    }

    /// Outcomes that failed locally during signing
    pub fn signing_failures(&self) -> impl Iterator<Item = (&SigningOutcome, &SigningError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err().map(|e| (outcome, e)))
    }

    /// Base-58 primary signatures of every signed transaction
    pub fn signatures(&self) -> Vec<String> {
        self.signed().map(|(_, tx)| tx.signature().to_string()).collect()
    }

    /// Base-58 serialized transactions in submission order
    pub fn encoded_transactions(&self) -> Vec<String> {
        self.signed().map(|(_, tx)| tx.encoded()).collect()
    }

    /// Serializable summary for CLI output
    pub fn report(&self) -> RunReport {
        RunReport {
            run_id: self.run_id.clone(),
            mint: self.mint.to_string(),
            started_at: self.started_at,
            terminal_phase: self.terminal_phase(),
            error: match &self.status {
                RunStatus::Done => None,
                RunStatus::Failed { error, .. } => Some(error.to_string()),
            },
            entries: self
                .outcomes
                .iter()
                .map(|outcome| ReportEntry {
                    batch: outcome.batch_index,
                    index: outcome.index,
                    action: outcome.kind,
                    signer: outcome.signer.to_string(),
                    signature: outcome.signed().map(|tx| tx.signature().to_string()),
                    transaction: outcome.signed().map(SignedTransaction::encoded),
                    error: outcome.result.as_ref().err().map(ToString::to_string),
                })
                .collect(),
        }
    }
}

/// JSON view of a [`RunResult`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: String,
    pub mint: String,
    pub started_at: DateTime<Utc>,
    pub terminal_phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub entries: Vec<ReportEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub batch: usize,
    pub index: usize,
    pub action: ActionKind,
    pub signer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
