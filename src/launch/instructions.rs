//! Instruction spec planning
//!
//! Turns a published token request plus the buyer wallets into the ordered
//! list of specs submitted to the assembly service: one `create` first,
//! then one `buy` per wallet in caller order.

use crate::launch::errors::BundleError;
use crate::types::{ActionKind, Pool, TokenRequest};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashSet;

/// Per-instruction trade parameters shared by a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeParams {
    /// Slippage tolerance in percent
    pub slippage: u32,
    /// Priority fee (SOL) for the first transaction of the bundle
    pub create_priority_fee: f64,
    /// Priority fee (SOL) for follow-up buys
    pub buy_priority_fee: f64,
    pub pool: Pool,
    pub denominated_in_sol: bool,
}

impl Default for TradeParams {
    fn default() -> Self {
        Self {
            slippage: 10,
            create_priority_fee: 0.0001,
            buy_priority_fee: 0.00005,
            pool: Pool::Pump,
            denominated_in_sol: false,
        }
    }
}

/// Published metadata carried by the `create` spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMetadata {
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

/// One action requested from the assembly service
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionSpec {
    pub kind: ActionKind,
    /// Wallet that pays for and signs this action
    pub signer: Pubkey,
    /// Mint of the token being created and bought
    pub mint: Pubkey,
    pub amount: f64,
    pub denominated_in_sol: bool,
    pub slippage: u32,
    pub priority_fee: f64,
    pub pool: Pool,
    /// Present only on the `create` spec
    pub token_metadata: Option<CreateMetadata>,
}

impl InstructionSpec {
    pub fn is_create(&self) -> bool {
        self.kind == ActionKind::Create
    }

    /// Identities that must sign the assembled transaction, in signing order
    ///
    /// The chain requires the mint signature before the creator's on a
    /// create transaction.
    pub fn required_signers(&self) -> Vec<Pubkey> {
        match self.kind {
            ActionKind::Create => vec![self.mint, self.signer],
            ActionKind::Buy => vec![self.signer],
        }
    }
}

/// Build the ordered instruction specs for a launch
///
/// # Errors
///
/// Returns `BundleError::Validation` if:
/// - `buyers` is empty
/// - `buy_amount` is not a positive finite number
/// - the request carries no published metadata URI
/// - a buyer is listed twice or doubles as the creator or mint
pub fn build_instruction_specs(
    request: &TokenRequest,
    creator: &Pubkey,
    mint: &Pubkey,
    buyers: &[Pubkey],
    buy_amount: f64,
    params: &TradeParams,
) -> Result<Vec<InstructionSpec>, BundleError> {
    if buyers.is_empty() {
        return Err(BundleError::validation("at least one buyer wallet is required"));
    }
    if !buy_amount.is_finite() || buy_amount <= 0.0 {
        return Err(BundleError::validation(format!(
            "buy amount must be positive, got {}",
            buy_amount
        )));
    }
    let uri = request
        .uri()
        .ok_or_else(|| BundleError::validation("token request has no published metadata URI"))?;

    let mut seen: HashSet<Pubkey> = HashSet::with_capacity(buyers.len() + 2);
    seen.insert(*creator);
    seen.insert(*mint);
    for buyer in buyers {
        if !seen.insert(*buyer) {
            return Err(BundleError::validation(format!(
                "wallet {} appears more than once in the run",
                buyer
            )));
        }
    }

    let mut specs = Vec::with_capacity(buyers.len() + 1);
    specs.push(InstructionSpec {
        kind: ActionKind::Create,
        signer: *creator,
        mint: *mint,
        amount: buy_amount,
        denominated_in_sol: params.denominated_in_sol,
        slippage: params.slippage,
        priority_fee: params.create_priority_fee,
        pool: params.pool,
        token_metadata: Some(CreateMetadata {
            name: request.metadata.name.clone(),
            symbol: request.metadata.symbol.clone(),
            uri: uri.to_string(),
        }),
    });

    specs.extend(buyers.iter().map(|buyer| InstructionSpec {
        kind: ActionKind::Buy,
        signer: *buyer,
        mint: *mint,
        amount: buy_amount,
        denominated_in_sol: params.denominated_in_sol,
        slippage: params.slippage,
        priority_fee: params.buy_priority_fee,
        pool: params.pool,
        token_metadata: None,
    }));

    Ok(specs)
}
