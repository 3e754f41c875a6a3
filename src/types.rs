//! Shared domain types for a token launch

use serde::{Deserialize, Serialize};
use std::fmt;

/// Liquidity pool targeted by trade-local requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    /// pump.fun bonding curve
    #[default]
    Pump,
    /// Raydium AMM (after migration)
    Raydium,
    /// Let the assembly service pick the pool
    Auto,
}

impl Pool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pool::Pump => "pump",
            Pool::Raydium => "raydium",
            Pool::Auto => "auto",
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of action a single instruction spec asks the assembly service for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Buy,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Buy => "buy",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional social links published alongside the token metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Descriptive fields of the token to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub socials: SocialLinks,
}

/// Image bytes uploaded together with the metadata
#[derive(Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Guess the MIME type from the file extension, defaulting to PNG
    pub fn mime_for_path(path: &str) -> &'static str {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            "image/jpeg"
        } else if lower.ends_with(".gif") {
            "image/gif"
        } else if lower.ends_with(".webp") {
            "image/webp"
        } else {
            "image/png"
        }
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Token creation request: metadata plus the URI returned by the publisher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub metadata: TokenMetadata,
    pub metadata_uri: Option<String>,
}

impl TokenRequest {
    /// A request whose metadata has not been published yet
    pub fn unpublished(metadata: TokenMetadata) -> Self {
        Self {
            metadata,
            metadata_uri: None,
        }
    }

    pub fn published(metadata: TokenMetadata, uri: impl Into<String>) -> Self {
        Self {
            metadata,
            metadata_uri: Some(uri.into()),
        }
    }

    /// The metadata URI, if present and non-blank
    pub fn uri(&self) -> Option<&str> {
        self.metadata_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
    }
}
