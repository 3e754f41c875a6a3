//! Structured logging for launch runs

use crate::launch::{AssemblyError, Phase, RunResult};
use solana_sdk::pubkey::Pubkey;

/// Structured logger for orchestration events of one run
#[derive(Debug, Clone)]
pub struct LaunchLogger {
    run_id: String,
}

impl LaunchLogger {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
        }
    }

    pub fn log_run_planned(&self, mint: &Pubkey, buyers: usize, batches: usize) {
        tracing::info!(
            run_id = %self.run_id,
            mint = %mint,
            buyers = %buyers,
            batches = %batches,
            "Launch planned"
        );
    }

    pub fn log_phase_start(&self, phase: Phase, batch_size: usize) {
        tracing::info!(
            run_id = %self.run_id,
            phase = %phase,
            batch_size = %batch_size,
            "Phase started"
        );
    }

    pub fn log_assembly_failure(&self, phase: Phase, error: &AssemblyError, latency_ms: u64) {
        tracing::warn!(
            run_id = %self.run_id,
            phase = %phase,
            category = error.category(),
            error = %error,
            latency_ms = %latency_ms,
            "Assembly failed, halting run"
        );
    }

    pub fn log_phase_signed(&self, phase: Phase, signed: usize, failed: usize) {
        tracing::info!(
            run_id = %self.run_id,
            phase = %phase,
            signed = %signed,
            failed = %failed,
            "Phase signed"
        );
    }

    pub fn log_run_finished(&self, result: &RunResult, elapsed_ms: i64) {
        tracing::info!(
            run_id = %self.run_id,
            elapsed_ms = %elapsed_ms,
            mint = %result.mint,
            terminal_phase = %result.terminal_phase(),
            signed = %result.signed_count(),
            total = %result.outcomes.len(),
            "Launch finished"
        );
    }

    pub fn error(&self, message: &str) {
        tracing::error!(
            run_id = %self.run_id,
            message = %message,
            "Error"
        );
    }
}
