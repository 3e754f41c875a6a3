//! Test Utilities Module
//!
//! Mock collaborators and transaction fixtures for deterministic launch
//! tests. Only compiled when running tests or when the `test_utils` feature
//! is enabled.

#![cfg(any(test, feature = "test_utils"))]

use async_trait::async_trait;
use solana_sdk::{
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::VersionedTransaction,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use crate::clients::{MetadataPublisher, TransactionAssembler};
use crate::launch::{AssemblyError, Batch, BundleError, InstructionSpec, UnsignedTransaction};
use crate::types::{ActionKind, ImageUpload, SocialLinks, TokenMetadata};
use crate::wallet::KeypairStore;

/// Build an unsigned v0 transaction requiring exactly `signers` (first pays)
pub fn unsigned_for_signers(signers: &[Pubkey]) -> UnsignedTransaction {
    let payer = signers[0];
    let mut accounts: Vec<AccountMeta> = signers.iter().map(|s| AccountMeta::new(*s, true)).collect();
    accounts.push(AccountMeta::new_readonly(Pubkey::new_unique(), false));

    let ix = Instruction::new_with_bytes(Pubkey::new_unique(), &[0x66, 0x06], accounts);
    let message = v0::Message::try_compile(&payer, &[ix], &[], Hash::new_unique())
        .expect("test message compiles");
    let tx = VersionedTransaction {
        signatures: vec![Signature::default(); signers.len()],
        message: VersionedMessage::V0(message),
    };
    UnsignedTransaction::from_bytes(bincode::serialize(&tx).expect("test tx serializes"))
}

/// Build the unsigned transaction the assembly service would return for `spec`
pub fn unsigned_for_spec(spec: &InstructionSpec) -> UnsignedTransaction {
    match spec.kind {
        ActionKind::Create => unsigned_for_signers(&[spec.signer, spec.mint]),
        ActionKind::Buy => unsigned_for_signers(&[spec.signer]),
    }
}

/// Keypair store with `buyers` fresh wallets
pub fn test_store(buyers: usize) -> KeypairStore {
    KeypairStore::new(Keypair::new(), (0..buyers).map(|_| Keypair::new()).collect())
        .expect("fresh keypairs are distinct")
}

pub fn sample_metadata() -> TokenMetadata {
    TokenMetadata {
        name: "Bundle Test".to_string(),
        symbol: "BNDL".to_string(),
        description: "created by the launch test-suite".to_string(),
        socials: SocialLinks {
            twitter: Some("https://x.com/bundle".to_string()),
            telegram: None,
            website: None,
        },
    }
}

pub fn sample_image() -> ImageUpload {
    ImageUpload::new("logo.png", "image/png", vec![0x89, b'P', b'N', b'G'])
}

/// Scripted response of one assembly call
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Well-formed unsigned transactions for every spec
    Ok,
    /// Whole-batch failure
    Fail(AssemblyError),
    /// Drop the last transaction of the response
    Short,
}

/// Assembler that fabricates transactions and records every request
#[derive(Debug, Default)]
pub struct MockAssembler {
    script: Mutex<Vec<MockResponse>>,
    calls: Mutex<Vec<Vec<InstructionSpec>>>,
}

impl MockAssembler {
    /// Succeeds on every call
    pub fn new_success() -> Self {
        Self::default()
    }

    /// Answers calls in order from `script`; succeeds once it runs out
    pub fn scripted(script: Vec<MockResponse>) -> Self {
        Self {
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails the `call`-th request (0-based) with an HTTP 500
    pub fn failing_on(call: usize) -> Self {
        let mut script = vec![MockResponse::Ok; call];
        script.push(MockResponse::Fail(AssemblyError::Status {
            status: 500,
            body: "internal error".to_string(),
        }));
        Self::scripted(script)
    }

    /// Specs received by each call, in call order
    pub fn calls(&self) -> Vec<Vec<InstructionSpec>> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl TransactionAssembler for MockAssembler {
    async fn assemble(&self, batch: &Batch) -> Result<Vec<UnsignedTransaction>, AssemblyError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(batch.specs().to_vec());

        let response = {
            let mut script = self.script.lock().expect("script lock");
            if script.is_empty() {
                MockResponse::Ok
            } else {
                script.remove(0)
            }
        };

        let mut txs: Vec<UnsignedTransaction> =
            batch.specs().iter().map(unsigned_for_spec).collect();
        match response {
            MockResponse::Ok => Ok(txs),
            MockResponse::Fail(e) => Err(e),
            MockResponse::Short => {
                txs.pop();
                Ok(txs)
            }
        }
    }
}

/// Publisher returning a fixed URI, or failing
#[derive(Debug)]
pub struct MockPublisher {
    uri: Option<String>,
    calls: AtomicUsize,
}

impl MockPublisher {
    pub fn new_success(uri: &str) -> Self {
        Self {
            uri: Some(uri.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn new_failure() -> Self {
        Self {
            uri: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataPublisher for MockPublisher {
    async fn publish(
        &self,
        _image: &ImageUpload,
        _metadata: &TokenMetadata,
    ) -> Result<String, BundleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.uri
            .clone()
            .ok_or_else(|| BundleError::Metadata("mock publisher configured to fail".to_string()))
    }
}
