//! Metrics collection and export module

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Instant;

/// Launch metrics
pub struct Metrics {
    registry: Registry,

    // Counters
    pub runs_total: IntCounter,
    pub runs_completed: IntCounter,
    pub runs_partial: IntCounter,
    pub runs_aborted: IntCounter,
    pub transactions_signed: IntCounter,
    pub signing_errors: IntCounter,
    pub assembly_failures: IntCounterVec,

    // Histograms
    pub assembly_latency: Histogram,
    pub metadata_latency: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let runs_total = IntCounter::with_opts(Opts::new(
            "launch_runs_total",
            "Total number of launch runs started",
        ))?;

        let runs_completed = IntCounter::with_opts(Opts::new(
            "launch_runs_completed",
            "Runs where every phase was assembled",
        ))?;

        let runs_partial = IntCounter::with_opts(Opts::new(
            "launch_runs_partial",
            "Runs stopped by an assembly failure after phase 1",
        ))?;

        let runs_aborted = IntCounter::with_opts(Opts::new(
            "launch_runs_aborted",
            "Runs aborted by a fatal error or phase 1 failure",
        ))?;

        let transactions_signed = IntCounter::with_opts(Opts::new(
            "launch_transactions_signed",
            "Transactions signed across all runs",
        ))?;

        let signing_errors = IntCounter::with_opts(Opts::new(
            "launch_signing_errors",
            "Per-index signing failures",
        ))?;

        let assembly_failures = IntCounterVec::new(
            Opts::new("launch_assembly_failures", "Whole-batch assembly failures"),
            &["phase", "category"],
        )?;

        let assembly_latency = Histogram::with_opts(
            HistogramOpts::new("launch_assembly_latency_seconds", "Assembly request latency")
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0]),
        )?;

        let metadata_latency = Histogram::with_opts(
            HistogramOpts::new("launch_metadata_latency_seconds", "Metadata upload latency")
                .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        )?;

        // Register all metrics
        registry.register(Box::new(runs_total.clone()))?;
        registry.register(Box::new(runs_completed.clone()))?;
        registry.register(Box::new(runs_partial.clone()))?;
        registry.register(Box::new(runs_aborted.clone()))?;
        registry.register(Box::new(transactions_signed.clone()))?;
        registry.register(Box::new(signing_errors.clone()))?;
        registry.register(Box::new(assembly_failures.clone()))?;
        registry.register(Box::new(assembly_latency.clone()))?;
        registry.register(Box::new(metadata_latency.clone()))?;

        Ok(Self {
            registry,
            runs_total,
            runs_completed,
            runs_partial,
            runs_aborted,
            transactions_signed,
            signing_errors,
            assembly_failures,
            assembly_latency,
            metadata_latency,
        })
    }

    /// Get the registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

/// Global metrics instance
pub fn metrics() -> &'static Metrics {
    static METRICS: once_cell::sync::Lazy<Metrics> =
        once_cell::sync::Lazy::new(|| Metrics::new().expect("Failed to initialize metrics"));
    &METRICS
}

/// Timer helper for measuring operation duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn observe_duration(&self, histogram: &Histogram) {
        histogram.observe(self.start.elapsed().as_secs_f64());
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
