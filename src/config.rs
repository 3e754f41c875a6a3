//! Configuration for the launch bundler
//!
//! Loaded from a TOML file, with `.env` support and a handful of
//! `PUMP_BUNDLER_*` environment overrides for secrets and endpoints.

use crate::launch::{BundleError, TradeParams};
use crate::types::Pool;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote service endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// Wallet configuration
    pub wallet: WalletConfig,

    /// Launch parameters
    #[serde(default)]
    pub launch: LaunchConfig,

    /// Logging output
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Metadata/IPFS upload endpoint
    #[serde(default = "default_ipfs_url")]
    pub ipfs_url: String,

    /// Transaction assembly (trade-local) endpoint
    #[serde(default = "default_trade_local_url")]
    pub trade_local_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to the token creator keypair
    pub creator_keypair_path: String,

    /// Optional pre-generated mint keypair; a fresh one is generated otherwise
    #[serde(default)]
    pub mint_keypair_path: Option<String>,

    /// Buyer keypair files, in buy order
    #[serde(default)]
    pub buyer_keypair_paths: Vec<String>,

    /// Buyer secrets as base-58 strings, appended after the files
    #[serde(default, skip_serializing)]
    pub buyer_secrets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Max instructions in the first assembly request (create included)
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Amount each wallet buys
    #[serde(default = "default_buy_amount")]
    pub buy_amount: f64,

    /// Whether `buy_amount` is in SOL rather than tokens
    #[serde(default)]
    pub denominated_in_sol: bool,

    /// Slippage tolerance in percent
    #[serde(default = "default_slippage")]
    pub slippage: u32,

    /// Priority fee (SOL) for the create transaction
    #[serde(default = "default_create_priority_fee")]
    pub create_priority_fee: f64,

    /// Priority fee (SOL) for follow-up buys
    #[serde(default = "default_buy_priority_fee")]
    pub buy_priority_fee: f64,

    #[serde(default)]
    pub pool: Pool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

// Default value functions
fn default_ipfs_url() -> String { "https://pump.fun/api/ipfs".to_string() }
fn default_trade_local_url() -> String { "https://pumpportal.fun/api/trade-local".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_max_batch_size() -> usize { 5 }
fn default_buy_amount() -> f64 { 1_000_000.0 }
fn default_slippage() -> u32 { 10 }
fn default_create_priority_fee() -> f64 { 0.0001 }
fn default_buy_priority_fee() -> f64 { 0.00005 }
fn default_log_filter() -> String { "pump_bundler=info,warn".to_string() }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            ipfs_url: default_ipfs_url(),
            trade_local_url: default_trade_local_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            buy_amount: default_buy_amount(),
            denominated_in_sol: false,
            slippage: default_slippage(),
            create_priority_fee: default_create_priority_fee(),
            buy_priority_fee: default_buy_priority_fee(),
            pool: Pool::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl LaunchConfig {
    /// Per-instruction trade parameters derived from this config
    pub fn trade_params(&self) -> TradeParams {
        TradeParams {
            slippage: self.slippage,
            create_priority_fee: self.create_priority_fee,
            buy_priority_fee: self.buy_priority_fee,
            pool: self.pool,
            denominated_in_sol: self.denominated_in_sol,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration with `.env` and environment variable overrides
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `PUMP_BUNDLER_*` overrides using the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PUMP_BUNDLER_IPFS_URL") {
            self.api.ipfs_url = url;
        }
        if let Some(url) = lookup("PUMP_BUNDLER_TRADE_LOCAL_URL") {
            self.api.trade_local_url = url;
        }
        if let Some(path) = lookup("PUMP_BUNDLER_CREATOR_KEYPAIR") {
            self.wallet.creator_keypair_path = path;
        }
        if let Some(secrets) = lookup("PUMP_BUNDLER_BUYER_SECRETS") {
            self.wallet.buyer_secrets.extend(
                secrets
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        }
        if let Some(raw) = lookup("PUMP_BUNDLER_MAX_BATCH_SIZE") {
            match raw.trim().parse() {
                Ok(size) => self.launch.max_batch_size = size,
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    keeping = self.launch.max_batch_size,
                    "Ignoring unparseable PUMP_BUNDLER_MAX_BATCH_SIZE"
                ),
            }
        }
    }

    /// Reject configurations that can never produce a valid run
    pub fn validate(&self) -> Result<(), BundleError> {
        if self.launch.max_batch_size < 1 {
            return Err(BundleError::capacity("max_batch_size must be at least 1"));
        }
        if !self.launch.buy_amount.is_finite() || self.launch.buy_amount <= 0.0 {
            return Err(BundleError::Configuration(
                "buy_amount must be a positive number".to_string(),
            ));
        }
        for (name, fee) in [
            ("create_priority_fee", self.launch.create_priority_fee),
            ("buy_priority_fee", self.launch.buy_priority_fee),
        ] {
            if !fee.is_finite() || fee < 0.0 {
                return Err(BundleError::Configuration(format!(
                    "{} must be a non-negative number",
                    name
                )));
            }
        }
        if self.launch.slippage > 100 {
            return Err(BundleError::Configuration(
                "slippage is a percentage and must not exceed 100".to_string(),
            ));
        }
        if self.api.ipfs_url.is_empty() || self.api.trade_local_url.is_empty() {
            return Err(BundleError::Configuration(
                "api endpoints must not be empty".to_string(),
            ));
        }
        if self.wallet.buyer_keypair_paths.is_empty() && self.wallet.buyer_secrets.is_empty() {
            return Err(BundleError::Configuration(
                "at least one buyer wallet is required".to_string(),
            ));
        }
        Ok(())
    }
}
