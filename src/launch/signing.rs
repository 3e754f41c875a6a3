//! Signing coordinator
//!
//! Pairs every unsigned transaction with the instruction at the same batch index,
//! resolves that spec's signer set from the keypair store and writes each
//! signature into the slot the message reserves for it.

use crate::compat;
use crate::launch::errors::SigningError;
use crate::launch::instructions::InstructionSpec;
use crate::launch::output::{SignedTransaction, SigningOutcome, UnsignedTransaction};
use crate::launch::planner::Batch;
use crate::wallet::KeypairStore;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::VersionedTransaction,
};
use tracing::{debug, warn};

/// Applies signatures for one run using a read-only keypair store
pub struct SigningCoordinator<'a> {
    store: &'a KeypairStore,
}

impl<'a> SigningCoordinator<'a> {
    pub fn new(store: &'a KeypairStore) -> Self {
        Self { store }
    }

    /// Sign every transaction of a batch, index by index
    ///
    /// `unsigned[i]` is always signed for `batch.specs()[i]`. A failure at
    /// one index is recorded in its outcome and does not stop the others.
    /// A spec with no transaction at its index gets `MissingTransaction`;
    /// surplus transactions are ignored.
    pub fn sign_batch(
        &self,
        batch: &Batch,
        unsigned: &[UnsignedTransaction],
    ) -> Vec<SigningOutcome> {
        if unsigned.len() != batch.len() {
            warn!(
                batch = batch.index(),
                expected = batch.len(),
                actual = unsigned.len(),
                "Transaction count does not match batch"
            );
        }

        batch
            .specs()
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let result = match unsigned.get(index) {
                    Some(tx) => self.sign(spec, tx),
                    None => Err(SigningError::MissingTransaction { index }),
                };
                match &result {
                    Ok(signed) => debug!(
                        batch = batch.index(),
                        index,
                        action = %spec.kind,
                        signer = %spec.signer,
                        signature = %signed.signature(),
                        "Transaction signed"
                    ),
                    Err(e) => warn!(
                        batch = batch.index(),
                        index,
                        action = %spec.kind,
                        signer = %spec.signer,
                        error = %e,
                        "Signing failed"
                    ),
                }
                SigningOutcome {
                    batch_index: batch.index(),
                    index,
                    kind: spec.kind,
                    signer: spec.signer,
                    result,
                }
            })
            .collect()
    }

    /// Sign a single unsigned transaction for its originating spec
    ///
    /// # Errors
    ///
    /// - `MissingIdentity` if a designated signer is not in the store
    /// - `Decode` if the blob is not a versioned transaction, or its header
    ///   claims more signers than it has account keys
    /// - `UnexpectedSigners` if the message requires any other signer set
    /// - `Encode` if the signed transaction cannot be serialized
    pub fn sign(
        &self,
        spec: &InstructionSpec,
        unsigned: &UnsignedTransaction,
    ) -> Result<SignedTransaction, SigningError> {
        let signer_order = spec.required_signers();
        let keypairs = self.resolve(&signer_order)?;

        let mut tx: VersionedTransaction = bincode::deserialize(unsigned.as_bytes())
            .map_err(|e| SigningError::Decode(e.to_string()))?;
        if !compat::header_is_consistent(&tx.message) {
            let header = compat::message_header(&tx.message);
            return Err(SigningError::Decode(format!(
                "header requires {} signatures but message has {} static keys",
                header.num_required_signatures,
                compat::static_account_keys(&tx.message).len()
            )));
        }

        let message_signers = compat::required_signers(&tx.message);
        let same_set = message_signers.len() == signer_order.len()
            && signer_order.iter().all(|pk| message_signers.contains(pk));
        if !same_set {
            return Err(SigningError::UnexpectedSigners {
                expected: signer_order,
                actual: message_signers.to_vec(),
            });
        }

        tx.signatures
            .resize(message_signers.len(), Signature::default());
        let message_bytes = tx.message.serialize();

        for keypair in keypairs {
            let pubkey = keypair.pubkey();
            let slot = compat::signer_slot(&tx.message, &pubkey).ok_or_else(|| {
                SigningError::UnexpectedSigners {
                    expected: signer_order.clone(),
                    actual: compat::required_signers(&tx.message).to_vec(),
                }
            })?;
            tx.signatures[slot] = keypair.sign_message(&message_bytes);
        }

        let primary = tx.signatures[0];
        let bytes = bincode::serialize(&tx).map_err(|e| SigningError::Encode(e.to_string()))?;
        Ok(SignedTransaction::new(bytes, primary, signer_order))
    }

    fn resolve(&self, signers: &[Pubkey]) -> Result<Vec<&'a Keypair>, SigningError> {
        signers
            .iter()
            .map(|pubkey| {
                self.store
                    .get(pubkey)
                    .ok_or(SigningError::MissingIdentity { pubkey: *pubkey })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{unsigned_for_signers, unsigned_for_spec};
    use crate::types::{ActionKind, Pool};
    use solana_sdk::{
        hash::Hash,
        instruction::{AccountMeta, Instruction},
        message::{Message, VersionedMessage},
    };

    fn spec(kind: ActionKind, signer: Pubkey, mint: Pubkey) -> InstructionSpec {
        InstructionSpec {
            kind,
            signer,
            mint,
            amount: 1.0,
            denominated_in_sol: false,
            slippage: 10,
            priority_fee: 0.0,
            pool: Pool::Pump,
            token_metadata: None,
        }
    }

    fn decode(signed: &SignedTransaction) -> VersionedTransaction {
        bincode::deserialize(signed.as_bytes()).unwrap()
    }

    #[test]
    fn test_create_signed_by_mint_and_creator() {
        let store = KeypairStore::new(Keypair::new(), vec![Keypair::new()]).unwrap();
        let create = spec(ActionKind::Create, store.creator().pubkey(), store.mint().pubkey());
        let coordinator = SigningCoordinator::new(&store);

        let signed = coordinator.sign(&create, &unsigned_for_spec(&create)).unwrap();
        let tx = decode(&signed);

        assert_eq!(
            signed.signers(),
            &[store.mint().pubkey(), store.creator().pubkey()]
        );
        assert!(tx.verify_with_results().iter().all(|ok| *ok));
        assert_eq!(tx.signatures.len(), 2);
        assert_eq!(*signed.signature(), tx.signatures[0]);
        // creator pays, so holds slot 0
        assert_eq!(compat::required_signers(&tx.message)[0], store.creator().pubkey());
    }

    #[test]
    fn test_buy_signed_by_buyer_only() {
        let buyer = Keypair::new();
        let buyer_key = buyer.pubkey();
        let store = KeypairStore::new(Keypair::new(), vec![buyer]).unwrap();
        let buy = spec(ActionKind::Buy, buyer_key, store.mint().pubkey());

        let signed = SigningCoordinator::new(&store)
            .sign(&buy, &unsigned_for_spec(&buy))
            .unwrap();
        let tx = decode(&signed);

        assert_eq!(signed.signers(), &[buyer_key]);
        assert_eq!(compat::required_signers(&tx.message), &[buyer_key]);
        assert!(tx.verify_with_results().iter().all(|ok| *ok));
    }

    #[test]
    fn test_resigning_is_deterministic() {
        let buyer = Keypair::new();
        let buyer_key = buyer.pubkey();
        let store = KeypairStore::new(Keypair::new(), vec![buyer]).unwrap();
        let buy = spec(ActionKind::Buy, buyer_key, store.mint().pubkey());
        let unsigned = unsigned_for_spec(&buy);
        let coordinator = SigningCoordinator::new(&store);

        let first = coordinator.sign(&buy, &unsigned).unwrap();
        let second = coordinator.sign(&buy, &unsigned).unwrap();
        assert_eq!(first.signature(), second.signature());
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_missing_identity_is_local_to_index() {
        let buyer = Keypair::new();
        let buyer_key = buyer.pubkey();
        let store = KeypairStore::new(Keypair::new(), vec![buyer]).unwrap();
        let stranger = Pubkey::new_unique();
        let mint = store.mint().pubkey();

        let specs = vec![
            spec(ActionKind::Buy, stranger, mint),
            spec(ActionKind::Buy, buyer_key, mint),
        ];
        let unsigned: Vec<_> = specs.iter().map(unsigned_for_spec).collect();
        let batch = Batch::new(1, specs);

        let outcomes = SigningCoordinator::new(&store).sign_batch(&batch, &unsigned);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes[0].result,
            Err(SigningError::MissingIdentity { pubkey: stranger })
        );
        assert!(outcomes[1].is_signed());
        assert_eq!(outcomes[1].index, 1);
        assert_eq!(outcomes[1].batch_index, 1);
    }

    #[test]
    fn test_signatures_follow_batch_index_not_position_guess() {
        let a = Keypair::new();
        let b = Keypair::new();
        let (a_key, b_key) = (a.pubkey(), b.pubkey());
        let store = KeypairStore::new(Keypair::new(), vec![a, b]).unwrap();
        let mint = store.mint().pubkey();

        // service answers in batch order: [b, a]
        let specs = vec![
            spec(ActionKind::Buy, b_key, mint),
            spec(ActionKind::Buy, a_key, mint),
        ];
        let unsigned: Vec<_> = specs.iter().map(unsigned_for_spec).collect();
        let outcomes = SigningCoordinator::new(&store).sign_batch(&Batch::new(0, specs), &unsigned);

        assert_eq!(outcomes[0].signed().unwrap().signers(), &[b_key]);
        assert_eq!(outcomes[1].signed().unwrap().signers(), &[a_key]);
    }

    #[test]
    fn test_unexpected_signer_set_rejected() {
        let buyer = Keypair::new();
        let buyer_key = buyer.pubkey();
        let store = KeypairStore::new(Keypair::new(), vec![buyer]).unwrap();
        let buy = spec(ActionKind::Buy, buyer_key, store.mint().pubkey());
        let extra = Pubkey::new_unique();

        let unsigned = unsigned_for_signers(&[buyer_key, extra]);
        let err = SigningCoordinator::new(&store).sign(&buy, &unsigned).unwrap_err();
        assert!(matches!(err, SigningError::UnexpectedSigners { .. }));
    }

    #[test]
    fn test_garbage_blob_is_decode_error() {
        let buyer = Keypair::new();
        let buyer_key = buyer.pubkey();
        let store = KeypairStore::new(Keypair::new(), vec![buyer]).unwrap();
        let buy = spec(ActionKind::Buy, buyer_key, store.mint().pubkey());

        let err = SigningCoordinator::new(&store)
            .sign(&buy, &UnsignedTransaction::from_bytes(vec![0xff; 3]))
            .unwrap_err();
        assert!(matches!(err, SigningError::Decode(_)));
    }

    #[test]
    fn test_header_overclaiming_signers_is_decode_error() {
        let buyer = Keypair::new();
        let buyer_key = buyer.pubkey();
        let store = KeypairStore::new(Keypair::new(), vec![buyer]).unwrap();
        let buy = spec(ActionKind::Buy, buyer_key, store.mint().pubkey());

        let mut tx: VersionedTransaction =
            bincode::deserialize(unsigned_for_spec(&buy).as_bytes()).unwrap();
        if let VersionedMessage::V0(message) = &mut tx.message {
            message.header.num_required_signatures = 9;
            message.account_keys.truncate(1);
        }
        let unsigned = UnsignedTransaction::from_bytes(bincode::serialize(&tx).unwrap());

        let err = SigningCoordinator::new(&store).sign(&buy, &unsigned).unwrap_err();
        assert!(matches!(err, SigningError::Decode(_)));
    }

    #[test]
    fn test_short_transaction_list_marks_missing_indices() {
        let a = Keypair::new();
        let b = Keypair::new();
        let (a_key, b_key) = (a.pubkey(), b.pubkey());
        let store = KeypairStore::new(Keypair::new(), vec![a, b]).unwrap();
        let mint = store.mint().pubkey();

        let specs = vec![
            spec(ActionKind::Buy, a_key, mint),
            spec(ActionKind::Buy, b_key, mint),
        ];
        let unsigned = vec![unsigned_for_spec(&specs[0])];
        let outcomes = SigningCoordinator::new(&store).sign_batch(&Batch::new(1, specs), &unsigned);

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_signed());
        assert_eq!(outcomes[1].signer, b_key);
        assert_eq!(
            outcomes[1].result,
            Err(SigningError::MissingTransaction { index: 1 })
        );
    }

    #[test]
    fn test_legacy_create_signed_into_matching_slots() {
        let store = KeypairStore::new(Keypair::new(), vec![Keypair::new()]).unwrap();
        let creator = store.creator().pubkey();
        let mint = store.mint().pubkey();
        let create = spec(ActionKind::Create, creator, mint);

        let ix = Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[0x18],
            vec![
                AccountMeta::new(mint, true),
                AccountMeta::new(creator, true),
                AccountMeta::new_readonly(Pubkey::new_unique(), false),
            ],
        );
        let mut message = Message::new(&[ix], Some(&creator));
        message.recent_blockhash = Hash::new_unique();
        let tx = VersionedTransaction {
            signatures: vec![Signature::default(); 2],
            message: VersionedMessage::Legacy(message),
        };
        let unsigned = UnsignedTransaction::from_bytes(bincode::serialize(&tx).unwrap());

        let signed = SigningCoordinator::new(&store).sign(&create, &unsigned).unwrap();
        let tx = decode(&signed);

        assert!(matches!(tx.message, VersionedMessage::Legacy(_)));
        assert_eq!(compat::required_signers(&tx.message), &[creator, mint]);
        assert!(tx.verify_with_results().iter().all(|ok| *ok));
        assert_eq!(signed.signers(), &[mint, creator]);
        assert_eq!(*signed.signature(), tx.signatures[0]);
    }
}
