//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching launch.toml structure.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::jito::{endpoints, JitoConfig, TransactionEncoding};
use crate::adapters::pump_portal::DEFAULT_TRADE_LOCAL_URL;
use crate::application::VanityConfig;
use crate::domain::{
    AmountError, AmountPolicy, BalancePreflight, BundleBuilder, FeeTier, GroupPlannerConfig,
    PreflightError, Venue, FIRST_GROUP_BACKING_COUNT, MAX_BUNDLE_SIZE,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/launch.toml";
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Main configuration structure matching launch.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bundle: BundleSection,
    #[serde(default)]
    pub balance: BalanceSection,
    #[serde(default)]
    pub vanity: VanitySection,
    pub trade: TradeSection,
    #[serde(default)]
    pub endpoints: EndpointsSection,
    pub wallets: WalletsSection,
}

/// Group sizing and pacing
#[derive(Debug, Clone, Deserialize)]
pub struct BundleSection {
    /// Transactions per bundle (relay limit is 5)
    #[serde(default = "default_max_bundle_size")]
    pub max_bundle_size: usize,
    /// Backing wallets riding in the creator's bundle
    #[serde(default = "default_first_group_backing_count")]
    pub first_group_backing_count: usize,
    #[serde(default = "default_inter_group_delay_ms")]
    pub inter_group_delay_ms: u64,
}

impl Default for BundleSection {
    fn default() -> Self {
        Self {
            max_bundle_size: default_max_bundle_size(),
            first_group_backing_count: default_first_group_backing_count(),
            inter_group_delay_ms: default_inter_group_delay_ms(),
        }
    }
}

/// Preflight settings
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceSection {
    /// Reserve on top of the spend (network fee + rent minimum)
    #[serde(default = "default_buffer_sol")]
    pub buffer_sol: Decimal,
    /// Read balances recorded in the wallet store instead of querying RPC
    #[serde(default)]
    pub use_cached_balances: bool,
}

impl Default for BalanceSection {
    fn default() -> Self {
        Self {
            buffer_sol: default_buffer_sol(),
            use_cached_balances: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VanitySection {
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
}

impl Default for VanitySection {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            batch_size: default_batch_size(),
            progress_interval_ms: default_progress_interval_ms(),
        }
    }
}

/// Trade tiers and amount ranges
#[derive(Debug, Clone, Deserialize)]
pub struct TradeSection {
    /// Venue passed to the compiler: "pump", "raydium", "auto"
    #[serde(default = "default_pool")]
    pub pool: String,
    #[serde(default = "default_create_slippage_bps")]
    pub create_slippage_bps: u16,
    #[serde(default = "default_create_priority_fee_sol")]
    pub create_priority_fee_sol: Decimal,
    #[serde(default = "default_buy_slippage_bps")]
    pub buy_slippage_bps: u16,
    #[serde(default = "default_buy_priority_fee_sol")]
    pub buy_priority_fee_sol: Decimal,
    /// Lower bound of the per-wallet buy, in SOL
    pub min_buy_sol: Decimal,
    /// Upper bound of the per-wallet buy, in SOL
    pub max_buy_sol: Decimal,
    /// Share of holdings sold on exit, 1-100
    #[serde(default = "default_sell_percent")]
    pub sell_percent: u8,
}

/// Remote services
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsSection {
    #[serde(default = "default_compiler_url")]
    pub compiler_url: String,
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    /// "base58" or "base64"
    #[serde(default = "default_relay_encoding")]
    pub relay_encoding: String,
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default)]
    pub relay_api_token: Option<String>,
}

impl Default for EndpointsSection {
    fn default() -> Self {
        Self {
            compiler_url: default_compiler_url(),
            relay_url: default_relay_url(),
            relay_encoding: default_relay_encoding(),
            rpc_url: default_rpc_url(),
            relay_api_token: None,
        }
    }
}

impl EndpointsSection {
    /// Get RPC URL with environment variable override
    /// Checks SOLANA_RPC_URL env var first, falls back to config value
    pub fn get_rpc_url(&self) -> String {
        std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }

    /// Get relay token with environment variable fallback
    pub fn get_relay_api_token(&self) -> Option<String> {
        if let Some(ref token) = self.relay_api_token {
            if !token.is_empty() {
                return Some(token.clone());
            }
        }
        std::env::var("JITO_API_TOKEN").ok().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletsSection {
    /// JSON wallet export (creator + backing wallets)
    pub store_path: String,
}

impl WalletsSection {
    /// Store path with LAUNCH_WALLET_STORE override and `~` expanded
    pub fn get_store_path(&self) -> PathBuf {
        let raw = std::env::var("LAUNCH_WALLET_STORE").unwrap_or_else(|_| self.store_path.clone());
        PathBuf::from(shellexpand::tilde(&raw).into_owned())
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl From<AmountError> for ConfigError {
    fn from(err: AmountError) -> Self {
        ConfigError::ValidationError(err.to_string())
    }
}

impl From<PreflightError> for ConfigError {
    fn from(err: PreflightError) -> Self {
        ConfigError::ValidationError(err.to_string())
    }
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let expanded = shellexpand::tilde(&path.as_ref().to_string_lossy()).into_owned();
    let content = std::fs::read_to_string(expanded)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bundle.max_bundle_size == 0 || self.bundle.max_bundle_size > MAX_BUNDLE_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "max_bundle_size must be 1-{}, got {}",
                MAX_BUNDLE_SIZE, self.bundle.max_bundle_size
            )));
        }

        if self.bundle.first_group_backing_count >= self.bundle.max_bundle_size {
            return Err(ConfigError::ValidationError(format!(
                "first_group_backing_count must be < max_bundle_size, got {}",
                self.bundle.first_group_backing_count
            )));
        }

        if self.balance.buffer_sol.is_sign_negative() {
            return Err(ConfigError::ValidationError(format!(
                "buffer_sol must be >= 0, got {}",
                self.balance.buffer_sol
            )));
        }

        if self.vanity.max_workers == 0 {
            return Err(ConfigError::ValidationError(
                "max_workers must be > 0".to_string(),
            ));
        }

        if self.vanity.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "batch_size must be > 0".to_string(),
            ));
        }

        self.venue()?;
        self.amount_policy()?;
        AmountPolicy::percent(self.trade.sell_percent)?;
        self.relay_encoding()?;

        if self.trade.create_slippage_bps > 10_000 || self.trade.buy_slippage_bps > 10_000 {
            return Err(ConfigError::ValidationError(
                "slippage must be 0-10000 bps".to_string(),
            ));
        }

        if self.trade.create_priority_fee_sol.is_sign_negative()
            || self.trade.buy_priority_fee_sol.is_sign_negative()
        {
            return Err(ConfigError::ValidationError(
                "priority fees must be >= 0".to_string(),
            ));
        }

        if self.endpoints.compiler_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "compiler_url cannot be empty".to_string(),
            ));
        }

        if self.endpoints.relay_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "relay_url cannot be empty".to_string(),
            ));
        }

        if self.endpoints.rpc_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "rpc_url cannot be empty".to_string(),
            ));
        }

        if self.wallets.store_path.is_empty() {
            return Err(ConfigError::ValidationError(
                "store_path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn venue(&self) -> Result<Venue, ConfigError> {
        self.trade.pool.parse().map_err(ConfigError::ValidationError)
    }

    pub fn amount_policy(&self) -> Result<AmountPolicy, ConfigError> {
        Ok(AmountPolicy::uniform(self.trade.min_buy_sol, self.trade.max_buy_sol)?)
    }

    pub fn relay_encoding(&self) -> Result<TransactionEncoding, ConfigError> {
        self.endpoints
            .relay_encoding
            .parse()
            .map_err(ConfigError::ValidationError)
    }

    pub fn planner_config(&self) -> GroupPlannerConfig {
        GroupPlannerConfig {
            max_bundle_size: self.bundle.max_bundle_size,
            first_group_backing_count: self.bundle.first_group_backing_count,
        }
    }

    pub fn bundle_builder(&self) -> Result<BundleBuilder, ConfigError> {
        Ok(BundleBuilder::new(
            FeeTier::new(self.trade.create_slippage_bps, self.trade.create_priority_fee_sol),
            FeeTier::new(self.trade.buy_slippage_bps, self.trade.buy_priority_fee_sol),
            self.venue()?,
        ))
    }

    pub fn preflight(&self) -> Result<BalancePreflight, ConfigError> {
        Ok(BalancePreflight::with_buffer_sol(self.balance.buffer_sol)?)
    }

    pub fn inter_group_delay(&self) -> Duration {
        Duration::from_millis(self.bundle.inter_group_delay_ms)
    }

    pub fn vanity_config(&self) -> VanityConfig {
        VanityConfig {
            max_workers: self.vanity.max_workers,
            batch_size: self.vanity.batch_size,
        }
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.vanity.progress_interval_ms)
    }

    pub fn jito_config(&self) -> Result<JitoConfig, ConfigError> {
        let mut config = JitoConfig::default()
            .with_url(self.endpoints.relay_url.clone())
            .with_encoding(self.relay_encoding()?);
        if let Some(token) = self.endpoints.get_relay_api_token() {
            config = config.with_api_token(token);
        }
        Ok(config)
    }
}

fn default_max_bundle_size() -> usize {
    MAX_BUNDLE_SIZE
}

fn default_first_group_backing_count() -> usize {
    FIRST_GROUP_BACKING_COUNT
}

fn default_inter_group_delay_ms() -> u64 {
    100
}

fn default_buffer_sol() -> Decimal {
    dec!(0.01)
}

fn default_max_workers() -> usize {
    crate::application::MAX_WORKERS
}

fn default_batch_size() -> u64 {
    crate::application::SEARCH_BATCH_SIZE
}

fn default_progress_interval_ms() -> u64 {
    1_000
}

fn default_pool() -> String {
    "pump".to_string()
}

fn default_create_slippage_bps() -> u16 {
    1_000
}

fn default_create_priority_fee_sol() -> Decimal {
    dec!(0.0001)
}

fn default_buy_slippage_bps() -> u16 {
    5_000
}

fn default_buy_priority_fee_sol() -> Decimal {
    dec!(0.00005)
}

fn default_sell_percent() -> u8 {
    100
}

fn default_compiler_url() -> String {
    DEFAULT_TRADE_LOCAL_URL.to_string()
}

fn default_relay_url() -> String {
    endpoints::MAINNET_DEFAULT.to_string()
}

fn default_relay_encoding() -> String {
    TransactionEncoding::default().to_string()
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}
