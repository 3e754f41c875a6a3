//! Keypair store for a launch run
//!
//! Holds the creator, the freshly generated mint and every buyer wallet.
//! Key material never leaves this struct: `Debug` prints public keys only
//! and decoded secrets are wiped from intermediate buffers.

use crate::config::WalletConfig;
use crate::launch::BundleError;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::{collections::HashSet, fmt, path::Path};
use zeroize::Zeroizing;

/// Read-only set of signing identities for one run
pub struct KeypairStore {
    creator: Keypair,
    mint: Keypair,
    buyers: Vec<Keypair>,
}

impl KeypairStore {
    /// Create a store with a newly generated mint keypair
    pub fn new(creator: Keypair, buyers: Vec<Keypair>) -> Result<Self, BundleError> {
        Self::with_mint(creator, Keypair::new(), buyers)
    }

    /// Create a store with an explicit mint keypair (vanity mints, tests)
    pub fn with_mint(
        creator: Keypair,
        mint: Keypair,
        buyers: Vec<Keypair>,
    ) -> Result<Self, BundleError> {
        let mut seen = HashSet::with_capacity(buyers.len() + 2);
        seen.insert(creator.pubkey());
        if !seen.insert(mint.pubkey()) {
            return Err(BundleError::validation(
                "mint keypair must differ from the creator",
            ));
        }
        for buyer in &buyers {
            if !seen.insert(buyer.pubkey()) {
                return Err(BundleError::validation(format!(
                    "wallet {} appears more than once",
                    buyer.pubkey()
                )));
            }
        }

        Ok(Self {
            creator,
            mint,
            buyers,
        })
    }

    /// Load creator and buyer wallets described by the config
    pub fn from_config(config: &WalletConfig) -> Result<Self, BundleError> {
        let creator = load_keypair_file(&config.creator_keypair_path)?;

        let mut buyers = Vec::with_capacity(config.buyer_keypair_paths.len());
        for path in &config.buyer_keypair_paths {
            buyers.push(load_keypair_file(path)?);
        }
        for secret in &config.buyer_secrets {
            buyers.push(keypair_from_base58(secret)?);
        }

        let mint = match &config.mint_keypair_path {
            Some(path) => load_keypair_file(path)?,
            None => Keypair::new(),
        };

        Self::with_mint(creator, mint, buyers)
    }

    pub fn creator(&self) -> &Keypair {
        &self.creator
    }

    pub fn mint(&self) -> &Keypair {
        &self.mint
    }

    pub fn buyers(&self) -> &[Keypair] {
        &self.buyers
    }

    /// Buyer public keys in the order they were supplied
    pub fn buyer_pubkeys(&self) -> Vec<Pubkey> {
        self.buyers.iter().map(Signer::pubkey).collect()
    }

    /// Look up the keypair for a public identity
    pub fn get(&self, pubkey: &Pubkey) -> Option<&Keypair> {
        if self.creator.pubkey() == *pubkey {
            return Some(&self.creator);
        }
        if self.mint.pubkey() == *pubkey {
            return Some(&self.mint);
        }
        self.buyers.iter().find(|kp| kp.pubkey() == *pubkey)
    }

    pub fn contains(&self, pubkey: &Pubkey) -> bool {
        self.get(pubkey).is_some()
    }

    /// Total number of identities held
    pub fn len(&self) -> usize {
        self.buyers.len() + 2
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Debug for KeypairStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeypairStore")
            .field("creator", &self.creator.pubkey())
            .field("mint", &self.mint.pubkey())
            .field("buyers", &self.buyer_pubkeys())
            .finish()
    }
}

/// Load a keypair from a Solana CLI JSON file or a raw 64-byte file
pub fn load_keypair_file(path: impl AsRef<Path>) -> Result<Keypair, BundleError> {
    let path = path.as_ref();
    let raw = Zeroizing::new(std::fs::read(path).map_err(|e| {
        BundleError::Keypair(format!(
            "Failed to read keypair file {}: {}",
            path.display(),
            e
        ))
    })?);

    if raw.len() == 64 {
        return keypair_from_bytes(&raw, &path.display().to_string());
    }

    let json: Zeroizing<Vec<u8>> = Zeroizing::new(serde_json::from_slice(&raw).map_err(|e| {
        BundleError::Keypair(format!(
            "Failed to parse keypair JSON {}: {}",
            path.display(),
            e
        ))
    })?);
    keypair_from_bytes(&json, &path.display().to_string())
}

/// Decode a base-58 encoded 64-byte secret key
pub fn keypair_from_base58(secret: &str) -> Result<Keypair, BundleError> {
    let bytes = Zeroizing::new(
        bs58::decode(secret.trim())
            .into_vec()
            .map_err(|e| BundleError::Keypair(format!("Invalid base-58 secret: {}", e)))?,
    );
    keypair_from_bytes(&bytes, "base-58 secret")
}

fn keypair_from_bytes(bytes: &[u8], source: &str) -> Result<Keypair, BundleError> {
    if bytes.len() != 64 {
        return Err(BundleError::Keypair(format!(
            "Invalid keypair length in {}: expected 64 bytes, got {}",
            source,
            bytes.len()
        )));
    }
    if bytes.iter().all(|&b| b == 0) {
        return Err(BundleError::Keypair(format!(
            "Invalid keypair in {}: all-zero key rejected",
            source
        )));
    }
    Keypair::try_from(bytes)
        .map_err(|e| BundleError::Keypair(format!("Invalid keypair bytes in {}: {}", source, e)))
}
