//! Run correlation for tracing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::Span;
use uuid::Uuid;

use crate::launch::Phase;

/// Correlation ID shared by every log line of one launch run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Tracing context for a single run
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: RunId::new(),
            started_at: Utc::now(),
        }
    }

    /// Root span for the whole run
    pub fn run_span(&self) -> Span {
        tracing::info_span!("launch", run_id = %self.run_id)
    }

    /// Child span for one phase of the state machine
    pub fn phase_span(&self, phase: Phase, batch_size: usize) -> Span {
        tracing::info_span!(
            "phase",
            run_id = %self.run_id,
            phase = %phase,
            batch_size
        )
    }

    /// Milliseconds since the run started
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        let a = RunContext::new();
        let b = RunContext::new();
        assert_ne!(a.run_id, b.run_id);
        assert_eq!(a.run_id.as_str().len(), 36);
        assert!(a.elapsed_ms() >= 0);
    }

    #[test]
    fn test_run_id_display() {
        let id = RunId::from("abc");
        assert_eq!(id.to_string(), "abc");
    }
}
