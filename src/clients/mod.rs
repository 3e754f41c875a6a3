//! Remote collaborators of a launch
//!
//! Both services are modeled as traits so the orchestrator never depends on
//! HTTP directly:
//! - **metadata**: image + descriptive fields → content-addressed URI
//! - **assembly**: batch of instruction specs → unsigned transactions

pub mod assembly;
pub mod metadata;

pub use assembly::{PumpPortalClient, TradeLocalRequest, TransactionAssembler};
pub use metadata::{MetadataPublisher, PumpIpfsPublisher};

use std::time::Duration;

/// Build the shared HTTP client used by both collaborators
pub(crate) fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("pump-bundler/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Keep error bodies short enough for a log line
pub(crate) fn truncate_body(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut cut = max;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}
