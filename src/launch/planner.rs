//! Two-phase batch planning
//!
//! The first batch carries the `create` spec plus as many buys as fit in
//! `max_batch_size`. Every remaining buy goes into a second batch that is
//! submitted only after the first one has been assembled and signed, since
//! those buys are only valid once the token exists.

use crate::launch::errors::BundleError;
use crate::launch::instructions::InstructionSpec;
use solana_sdk::pubkey::Pubkey;

/// Ordered group of specs submitted in one assembly request
///
/// Response index `i` of the assembly service corresponds to `specs()[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    index: usize,
    specs: Vec<InstructionSpec>,
}

impl Batch {
    pub fn new(index: usize, specs: Vec<InstructionSpec>) -> Self {
        Self { index, specs }
    }

    /// Zero-based position of this batch in the plan
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn specs(&self) -> &[InstructionSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Primary signer of every spec, in batch order
    pub fn signers(&self) -> Vec<Pubkey> {
        self.specs.iter().map(|s| s.signer).collect()
    }
}

/// Split the instruction list into the phase-one and phase-two batches
///
/// Returns one batch when everything fits, two otherwise. Never returns an
/// empty batch, never splits or reorders specs.
///
/// # Errors
///
/// - `BundleError::Capacity` if `max_batch_size < 1`
/// - `BundleError::Validation` if the list is empty or does not start with
///   its only `create` spec
pub fn plan_batches(
    instructions: Vec<InstructionSpec>,
    max_batch_size: usize,
) -> Result<Vec<Batch>, BundleError> {
    if max_batch_size < 1 {
        return Err(BundleError::capacity(format!(
            "max batch size must be at least 1, got {}",
            max_batch_size
        )));
    }
    match instructions.first() {
        None => return Err(BundleError::validation("no instructions to plan")),
        Some(first) if !first.is_create() => {
            return Err(BundleError::validation(
                "the create instruction must be first",
            ))
        }
        Some(_) => {}
    }
    if instructions.iter().skip(1).any(InstructionSpec::is_create) {
        return Err(BundleError::validation(
            "exactly one create instruction is allowed per run",
        ));
    }

    let mut first = instructions;
    let rest = if first.len() > max_batch_size {
        first.split_off(max_batch_size)
    } else {
        Vec::new()
    };

    let mut batches = Vec::with_capacity(2);
    batches.push(Batch::new(0, first));
    if !rest.is_empty() {
        batches.push(Batch::new(1, rest));
    }
    Ok(batches)
}
