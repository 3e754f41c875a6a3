//! Two-phase orchestration scenarios
//!
//! Covers the run-level guarantees: phase ordering, partial success after a
//! phase 2 failure, whole-run aborts, and signer sets of every outcome.

use std::sync::Arc;

use solana_sdk::{pubkey::Pubkey, signature::Signer, transaction::VersionedTransaction};

use crate::compat;
use crate::launch::{
    AssemblyError, Batch, BundleError, InstructionSpec, LaunchRequest, Orchestrator, Phase,
    RunStatus, SigningError, TradeParams,
};
use crate::observability::RunContext;
use crate::test_utils::{
    sample_image, sample_metadata, test_store, MockAssembler, MockPublisher, MockResponse,
};
use crate::types::{ActionKind, TokenRequest};

const URI: &str = "https://ipfs.io/ipfs/QmBundleTest";

fn request(buy_amount: f64) -> LaunchRequest {
    LaunchRequest {
        metadata: sample_metadata(),
        image: sample_image(),
        buy_amount,
    }
}

fn orchestrator(assembler: &Arc<MockAssembler>, max_batch_size: usize) -> Orchestrator {
    Orchestrator::new(
        assembler.clone(),
        Arc::new(MockPublisher::new_success(URI)),
        TradeParams::default(),
        max_batch_size,
    )
    .unwrap()
}

fn signers_of(specs: &[InstructionSpec]) -> Vec<Pubkey> {
    specs.iter().map(|s| s.signer).collect()
}

#[tokio::test]
async fn test_four_buyers_fit_in_phase_one() {
    let store = test_store(4);
    let assembler = Arc::new(MockAssembler::new_success());

    let result = orchestrator(&assembler, 5)
        .launch(&store, &request(1_000.0))
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Done);
    assert_eq!(result.terminal_phase(), Phase::Done);
    assert_eq!(result.signed_count(), 5);
    assert!(result.is_complete());
    assert_eq!(result.mint, store.mint().pubkey());
    // nothing left for a second request
    assert_eq!(assembler.call_count(), 1);

    let calls = assembler.calls();
    assert_eq!(calls[0][0].kind, ActionKind::Create);
    assert_eq!(&signers_of(&calls[0])[1..], store.buyer_pubkeys().as_slice());
}

#[tokio::test]
async fn test_both_phases_succeed_in_wallet_order() {
    let store = test_store(6);
    let buyers = store.buyer_pubkeys();
    let assembler = Arc::new(MockAssembler::new_success());

    let result = orchestrator(&assembler, 5)
        .launch(&store, &request(1_000.0))
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Done);
    assert_eq!(result.signed_count(), 7);
    assert_eq!(result.signatures().len(), 7);

    let calls = assembler.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].len(), 5);
    assert_eq!(signers_of(&calls[1]), buyers[4..].to_vec());
    assert!(calls[1].iter().all(|s| s.kind == ActionKind::Buy));

    for buyer in &buyers {
        assert!(result.signed_for(buyer).is_some(), "buyer {buyer} not signed");
    }
}

#[tokio::test]
async fn test_phase_two_failure_keeps_phase_one() {
    let store = test_store(6);
    let buyers = store.buyer_pubkeys();
    let assembler = Arc::new(MockAssembler::failing_on(1));

    let result = orchestrator(&assembler, 5)
        .launch(&store, &request(1_000.0))
        .await
        .unwrap();

    assert_eq!(result.terminal_phase(), Phase::Phase2Assemble);
    assert!(matches!(
        result.status,
        RunStatus::Failed {
            error: AssemblyError::Status { status: 500, .. },
            ..
        }
    ));
    assert_eq!(result.signed_count(), 5);
    assert!(result.signed_for(&store.creator().pubkey()).is_some());
    for buyer in &buyers[..4] {
        assert!(result.signed_for(buyer).is_some());
    }
    for buyer in &buyers[4..] {
        assert!(result.signed_for(buyer).is_none());
        assert!(result.outcomes.iter().all(|o| o.signer != *buyer));
    }
    assert_eq!(assembler.call_count(), 2);
}

#[tokio::test]
async fn test_phase_one_failure_never_starts_phase_two() {
    for buyers in [1usize, 4, 6, 11] {
        for max in [1usize, 2, 5] {
            let store = test_store(buyers);
            let assembler = Arc::new(MockAssembler::failing_on(0));

            let result = orchestrator(&assembler, max)
                .launch(&store, &request(10.0))
                .await
                .unwrap();

            assert_eq!(assembler.call_count(), 1, "buyers={buyers} max={max}");
            assert_eq!(result.terminal_phase(), Phase::Phase1Assemble);
            assert!(result.outcomes.is_empty());
            assert_eq!(result.signed_count(), 0);
        }
    }
}

#[tokio::test]
async fn test_short_response_is_whole_batch_failure() {
    let store = test_store(2);
    let assembler = Arc::new(MockAssembler::scripted(vec![MockResponse::Short]));

    let result = orchestrator(&assembler, 5)
        .launch(&store, &request(10.0))
        .await
        .unwrap();

    assert_eq!(
        result.status,
        RunStatus::Failed {
            phase: Phase::Phase1Assemble,
            error: AssemblyError::LengthMismatch {
                expected: 3,
                actual: 2
            },
        }
    );
    assert!(result.outcomes.is_empty());
}

#[tokio::test]
async fn test_every_outcome_has_exact_signer_set() {
    let store = test_store(7);
    let assembler = Arc::new(MockAssembler::new_success());

    let result = orchestrator(&assembler, 3)
        .launch(&store, &request(10.0))
        .await
        .unwrap();

    assert_eq!(result.signed_count(), 8);
    for (outcome, signed) in result.signed() {
        let tx: VersionedTransaction = bincode::deserialize(signed.as_bytes()).unwrap();
        assert!(tx.verify_with_results().iter().all(|ok| *ok));

        let mut required = compat::required_signers(&tx.message).to_vec();
        required.sort();
        let mut expected = match outcome.kind {
            ActionKind::Create => {
                assert_eq!(
                    signed.signers(),
                    &[store.mint().pubkey(), store.creator().pubkey()]
                );
                vec![store.mint().pubkey(), store.creator().pubkey()]
            }
            ActionKind::Buy => {
                assert_eq!(signed.signers(), &[outcome.signer]);
                vec![outcome.signer]
            }
        };
        expected.sort();
        assert_eq!(required, expected);
        assert_eq!(*signed.signature(), tx.signatures[0]);
    }
}

#[tokio::test]
async fn test_metadata_failure_aborts_before_assembly() {
    let store = test_store(3);
    let assembler = Arc::new(MockAssembler::new_success());
    let publisher = Arc::new(MockPublisher::new_failure());
    let orchestrator = Orchestrator::new(
        assembler.clone(),
        publisher.clone(),
        TradeParams::default(),
        5,
    )
    .unwrap();

    let err = orchestrator
        .launch(&store, &request(10.0))
        .await
        .unwrap_err();

    assert!(matches!(err, BundleError::Metadata(_)));
    assert_eq!(publisher.call_count(), 1);
    assert_eq!(assembler.call_count(), 0);
}

#[tokio::test]
async fn test_validation_error_is_fatal_and_pre_network() {
    let store = test_store(3);
    let assembler = Arc::new(MockAssembler::new_success());

    let err = orchestrator(&assembler, 5)
        .launch(&store, &request(0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, BundleError::Validation(_)));

    let unpublished = TokenRequest::unpublished(sample_metadata());
    let err = orchestrator(&assembler, 5)
        .launch_published(&store, &unpublished, 10.0)
        .await
        .unwrap_err();
    assert!(matches!(err, BundleError::Validation(_)));
    assert_eq!(assembler.call_count(), 0);
}

#[test]
fn test_zero_batch_size_rejected_up_front() {
    let result = Orchestrator::new(
        Arc::new(MockAssembler::new_success()),
        Arc::new(MockPublisher::new_success(URI)),
        TradeParams::default(),
        0,
    );
    assert!(matches!(result, Err(BundleError::Capacity(_))));
}

#[tokio::test]
async fn test_missing_identity_does_not_abort_siblings() {
    let store = test_store(2);
    let buyers = store.buyer_pubkeys();
    let stranger = Pubkey::new_unique();
    let assembler = Arc::new(MockAssembler::new_success());
    let orchestrator = orchestrator(&assembler, 5);

    let token = TokenRequest::published(sample_metadata(), URI);
    let mut specs = crate::launch::build_instruction_specs(
        &token,
        &store.creator().pubkey(),
        &store.mint().pubkey(),
        &[buyers[0], stranger, buyers[1]],
        10.0,
        &TradeParams::default(),
    )
    .unwrap();
    let phase_two = specs.split_off(2);
    let batches = vec![Batch::new(0, specs), Batch::new(1, phase_two)];

    let result = orchestrator
        .execute(&RunContext::new(), &store, &batches)
        .await;

    assert_eq!(result.status, RunStatus::Done);
    assert_eq!(result.outcomes.len(), 4);
    assert_eq!(result.signed_count(), 3);

    let failures: Vec<_> = result.signing_failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0.batch_index, 1);
    assert_eq!(failures[0].0.index, 0);
    assert_eq!(
        failures[0].1,
        &SigningError::MissingIdentity { pubkey: stranger }
    );
    assert!(result.signed_for(&buyers[1]).is_some());
    assert!(!result.is_complete());
}

#[tokio::test]
async fn test_create_priority_fee_tier_reaches_assembler() {
    let store = test_store(2);
    let assembler = Arc::new(MockAssembler::new_success());
    let params = TradeParams {
        create_priority_fee: 0.001,
        buy_priority_fee: 0.0002,
        ..TradeParams::default()
    };
    let orchestrator = Orchestrator::new(
        assembler.clone(),
        Arc::new(MockPublisher::new_success(URI)),
        params,
        5,
    )
    .unwrap();

    orchestrator.launch(&store, &request(10.0)).await.unwrap();

    let calls = assembler.calls();
    assert_eq!(calls[0][0].priority_fee, 0.001);
    assert!(calls[0][1..].iter().all(|s| s.priority_fee == 0.0002));
    assert_eq!(
        calls[0][0].token_metadata.as_ref().map(|m| m.uri.as_str()),
        Some(URI)
    );
}
