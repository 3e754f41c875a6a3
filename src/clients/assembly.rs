//! Transaction assembly over the PumpPortal `trade-local` API
//!
//! The service takes a JSON array of trade requests and answers with a JSON
//! array of base-58 unsigned transactions in the same order. Anything else
//! is a failure of the whole batch.

use crate::clients::{http_client, truncate_body};
use crate::config::ApiConfig;
use crate::launch::{AssemblyError, Batch, BundleError, InstructionSpec, UnsignedTransaction};
use crate::types::{ActionKind, Pool};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Turns a batch of specs into one unsigned transaction per spec
#[async_trait]
pub trait TransactionAssembler: Send + Sync {
    /// Result length and order must match `batch`
    async fn assemble(&self, batch: &Batch) -> Result<Vec<UnsignedTransaction>, AssemblyError>;
}

/// Token metadata object on the `create` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeLocalMetadata {
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

/// Wire form of one instruction spec
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeLocalRequest {
    pub public_key: String,
    pub action: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_metadata: Option<TradeLocalMetadata>,
    pub mint: String,
    /// Sent as the string `"true"`/`"false"`, as the API expects
    pub denominated_in_sol: String,
    pub amount: f64,
    pub slippage: u32,
    pub priority_fee: f64,
    pub pool: Pool,
}

impl From<&InstructionSpec> for TradeLocalRequest {
    fn from(spec: &InstructionSpec) -> Self {
        Self {
            public_key: spec.signer.to_string(),
            action: spec.kind,
            token_metadata: spec.token_metadata.as_ref().map(|m| TradeLocalMetadata {
                name: m.name.clone(),
                symbol: m.symbol.clone(),
                uri: m.uri.clone(),
            }),
            mint: spec.mint.to_string(),
            denominated_in_sol: spec.denominated_in_sol.to_string(),
            amount: spec.amount,
            slippage: spec.slippage,
            priority_fee: spec.priority_fee,
            pool: spec.pool,
        }
    }
}

/// HTTP client for `POST /api/trade-local`
#[derive(Debug, Clone)]
pub struct PumpPortalClient {
    http: reqwest::Client,
    url: String,
}

impl PumpPortalClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, BundleError> {
        let http = http_client(timeout)
            .map_err(|e| BundleError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, BundleError> {
        Self::new(
            config.trade_local_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TransactionAssembler for PumpPortalClient {
    async fn assemble(&self, batch: &Batch) -> Result<Vec<UnsignedTransaction>, AssemblyError> {
        let payload: Vec<TradeLocalRequest> =
            batch.specs().iter().map(TradeLocalRequest::from).collect();

        debug!(
            url = %self.url,
            batch = batch.index(),
            size = payload.len(),
            "Requesting unsigned transactions"
        );

        let resp = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AssemblyError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, batch = batch.index(), "PumpPortal API error");
            return Err(AssemblyError::Status {
                status: status.as_u16(),
                body: truncate_body(body, 512),
            });
        }

        let encoded: Vec<String> = resp
            .json()
            .await
            .map_err(|e| AssemblyError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        decode_response(batch.len(), &encoded)
    }
}

/// Validate length and base-58 decode every entry of a response
pub fn decode_response(
    expected: usize,
    encoded: &[String],
) -> Result<Vec<UnsignedTransaction>, AssemblyError> {
    if encoded.len() != expected {
        return Err(AssemblyError::LengthMismatch {
            expected,
            actual: encoded.len(),
        });
    }
    encoded
        .iter()
        .enumerate()
        .map(|(i, tx)| {
            UnsignedTransaction::from_base58(tx).map_err(|e| {
                AssemblyError::InvalidResponse(format!("entry {} is not base-58: {}", i, e))
            })
        })
        .collect()
}
