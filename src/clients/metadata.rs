//! Metadata publication over the pump.fun IPFS endpoint

use crate::clients::{http_client, truncate_body};
use crate::config::ApiConfig;
use crate::launch::BundleError;
use crate::types::{ImageUpload, TokenMetadata};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

/// Publishes token metadata and returns its content-addressed URI
#[async_trait]
pub trait MetadataPublisher: Send + Sync {
    async fn publish(
        &self,
        image: &ImageUpload,
        metadata: &TokenMetadata,
    ) -> Result<String, BundleError>;
}

#[derive(Debug, Deserialize)]
struct IpfsResponse {
    #[serde(rename = "metadataUri")]
    metadata_uri: Option<String>,
}

/// Multipart uploader for `POST /api/ipfs`
#[derive(Debug, Clone)]
pub struct PumpIpfsPublisher {
    http: reqwest::Client,
    url: String,
}

impl PumpIpfsPublisher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, BundleError> {
        let http = http_client(timeout)
            .map_err(|e| BundleError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, BundleError> {
        Self::new(config.ipfs_url.clone(), Duration::from_secs(config.timeout_secs))
    }

    fn form(image: &ImageUpload, metadata: &TokenMetadata) -> Result<Form, BundleError> {
        let file = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| BundleError::Metadata(format!("invalid image MIME type: {}", e)))?;

        let socials = &metadata.socials;
        Ok(Form::new()
            .part("file", file)
            .text("name", metadata.name.clone())
            .text("symbol", metadata.symbol.clone())
            .text("description", metadata.description.clone())
            .text("twitter", socials.twitter.clone().unwrap_or_default())
            .text("telegram", socials.telegram.clone().unwrap_or_default())
            .text("website", socials.website.clone().unwrap_or_default())
            .text("showName", "true"))
    }
}

#[async_trait]
impl MetadataPublisher for PumpIpfsPublisher {
    async fn publish(
        &self,
        image: &ImageUpload,
        metadata: &TokenMetadata,
    ) -> Result<String, BundleError> {
        let form = Self::form(image, metadata)?;

        let resp = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BundleError::Metadata(format!("request error: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, "IPFS upload rejected");
            return Err(BundleError::Metadata(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate_body(body, 512)
            )));
        }

        let parsed: IpfsResponse = resp
            .json()
            .await
            .map_err(|e| BundleError::Metadata(format!("JSON parse error: {}", e)))?;

        let uri = parsed
            .metadata_uri
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| BundleError::Metadata("response has no metadataUri".to_string()))?;

        info!(symbol = %metadata.symbol, uri = %uri, "Metadata published");
        Ok(uri)
    }
}
