//! Two-phase launch orchestration
//!
//! ```text
//! Start → Phase1Assemble → Phase1Sign → Phase2Assemble → Phase2Sign → Done
//!              │                              │
//!              └── Failed(Phase1Assemble)     └── Failed(Phase2Assemble)
//! ```
//!
//! Phases run strictly one after the other: phase 2 buys are only valid once
//! the phase 1 create has landed. A phase 1 assembly failure ends the run with
//! nothing signed; a phase 2 failure keeps every phase 1 outcome.

use crate::clients::{MetadataPublisher, TransactionAssembler};
use crate::launch::errors::{AssemblyError, BundleError};
use crate::launch::instructions::{build_instruction_specs, TradeParams};
use crate::launch::output::{Phase, RunResult, RunStatus, SigningOutcome};
use crate::launch::planner::{plan_batches, Batch};
use crate::launch::signing::SigningCoordinator;
use crate::metrics::{metrics, Timer};
use crate::observability::RunContext;
use crate::structured_logging::LaunchLogger;
use crate::types::{ImageUpload, TokenMetadata, TokenRequest};
use crate::wallet::KeypairStore;
use solana_sdk::signature::Signer;
use std::sync::Arc;
use tracing::Instrument;

/// Everything needed to launch a token, before metadata is published
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub metadata: TokenMetadata,
    pub image: ImageUpload,
    /// Amount each wallet buys (the creator's initial buy included)
    pub buy_amount: f64,
}

/// Sequences publish → build → plan → (assemble → sign) per phase
pub struct Orchestrator {
    assembler: Arc<dyn TransactionAssembler>,
    publisher: Arc<dyn MetadataPublisher>,
    params: TradeParams,
    max_batch_size: usize,
}

impl Orchestrator {
    /// # Errors
    ///
    /// `BundleError::Capacity` if `max_batch_size < 1`
    pub fn new(
        assembler: Arc<dyn TransactionAssembler>,
        publisher: Arc<dyn MetadataPublisher>,
        params: TradeParams,
        max_batch_size: usize,
    ) -> Result<Self, BundleError> {
        if max_batch_size < 1 {
            return Err(BundleError::capacity(format!(
                "max batch size must be at least 1, got {}",
                max_batch_size
            )));
        }
        Ok(Self {
            assembler,
            publisher,
            params,
            max_batch_size,
        })
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Publish metadata, then run both phases
    ///
    /// `store` must be fresh for this run: its mint keypair becomes the token.
    ///
    /// # Errors
    ///
    /// Fatal errors only (metadata publication, validation, capacity).
    /// Assembly failures are reported inside the returned [`RunResult`].
    pub async fn launch(
        &self,
        store: &KeypairStore,
        request: &LaunchRequest,
    ) -> Result<RunResult, BundleError> {
        let ctx = RunContext::new();
        let logger = LaunchLogger::new(ctx.run_id.as_str());
        metrics().runs_total.inc();

        let timer = Timer::new();
        let published = self
            .publisher
            .publish(&request.image, &request.metadata)
            .instrument(ctx.run_span())
            .await;
        timer.observe_duration(&metrics().metadata_latency);

        let uri = match published {
            Ok(uri) => uri,
            Err(e) => {
                logger.error(&e.to_string());
                metrics().runs_aborted.inc();
                return Err(e);
            }
        };

        let token = TokenRequest::published(request.metadata.clone(), uri);
        self.run(&ctx, store, &token, request.buy_amount).await
    }

    /// Run both phases for a token whose metadata is already published
    pub async fn launch_published(
        &self,
        store: &KeypairStore,
        token: &TokenRequest,
        buy_amount: f64,
    ) -> Result<RunResult, BundleError> {
        let ctx = RunContext::new();
        metrics().runs_total.inc();
        self.run(&ctx, store, token, buy_amount).await
    }

    async fn run(
        &self,
        ctx: &RunContext,
        store: &KeypairStore,
        token: &TokenRequest,
        buy_amount: f64,
    ) -> Result<RunResult, BundleError> {
        let planned = build_instruction_specs(
            token,
            &store.creator().pubkey(),
            &store.mint().pubkey(),
            &store.buyer_pubkeys(),
            buy_amount,
            &self.params,
        )
        .and_then(|specs| plan_batches(specs, self.max_batch_size));

        let batches = match planned {
            Ok(batches) => batches,
            Err(e) => {
                metrics().runs_aborted.inc();
                return Err(e);
            }
        };

        LaunchLogger::new(ctx.run_id.as_str()).log_run_planned(
            &store.mint().pubkey(),
            store.buyers().len(),
            batches.len(),
        );

        Ok(self.execute(ctx, store, &batches).await)
    }

    /// Drive the state machine over already planned batches
    ///
    /// Batch 0 is phase 1; any later batch is treated as phase 2. Never
    /// fails: assembly failures become a `Failed` terminal status.
    pub async fn execute(
        &self,
        ctx: &RunContext,
        store: &KeypairStore,
        batches: &[Batch],
    ) -> RunResult {
        let logger = LaunchLogger::new(ctx.run_id.as_str());
        let coordinator = SigningCoordinator::new(store);
        let mut outcomes: Vec<SigningOutcome> = Vec::new();
        let mut status = RunStatus::Done;

        for batch in batches {
            let phase = Phase::assemble(batch.index());
            let span = ctx.phase_span(phase, batch.len());
            logger.log_phase_start(phase, batch.len());

            let timer = Timer::new();
            let assembled = self
                .assembler
                .assemble(batch)
                .instrument(span.clone())
                .await
                .and_then(|unsigned| {
                    if unsigned.len() == batch.len() {
                        Ok(unsigned)
                    } else {
                        Err(AssemblyError::LengthMismatch {
                            expected: batch.len(),
                            actual: unsigned.len(),
                        })
                    }
                });
            timer.observe_duration(&metrics().assembly_latency);

            let unsigned = match assembled {
                Ok(unsigned) => unsigned,
                Err(error) => {
                    logger.log_assembly_failure(phase, &error, timer.elapsed_ms());
                    metrics()
                        .assembly_failures
                        .with_label_values(&[phase.as_str(), error.category()])
                        .inc();
                    status = RunStatus::Failed { phase, error };
                    break;
                }
            };

            let phase = Phase::sign(batch.index());
            let signed = span.in_scope(|| coordinator.sign_batch(batch, &unsigned));
            let ok = signed.iter().filter(|o| o.is_signed()).count();
            let failed = signed.len() - ok;
            metrics().transactions_signed.inc_by(ok as u64);
            metrics().signing_errors.inc_by(failed as u64);
            logger.log_phase_signed(phase, ok, failed);

            outcomes.extend(signed);
        }

        match &status {
            RunStatus::Done => metrics().runs_completed.inc(),
            RunStatus::Failed {
                phase: Phase::Phase1Assemble,
                ..
            } => metrics().runs_aborted.inc(),
            RunStatus::Failed { .. } => metrics().runs_partial.inc(),
        }

        let result = RunResult {
            run_id: ctx.run_id.to_string(),
            mint: store.mint().pubkey(),
            started_at: ctx.started_at,
            status,
            outcomes,
        };
        logger.log_run_finished(&result, ctx.elapsed_ms());
        result
    }
}
