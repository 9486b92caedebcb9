//! Token client configuration.
//!
//! A [`TokenConfig`] names the RPC endpoint, the legacy gas price used for every
//! write, the token contract the client binds to and the fixed gas limit of
//! each write operation.

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{path::Path, time::Duration};
use thiserror::Error;

/// Gas limit for `approve(address,uint256)`.
pub const APPROVE_GAS_LIMIT: u64 = 48_000;

/// Gas limit for `transfer(address,uint256)`.
pub const TRANSFER_GAS_LIMIT: u64 = 40_000;

/// Gas limit for `transferFrom(address,address,uint256)`.
pub const TRANSFER_FROM_GAS_LIMIT: u64 = 50_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    /// Config file is not valid TOML or has wrong field types
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Config parsed but a value is unusable
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Static gas limits per write operation.
///
/// These are conservative fixed estimates for a standard token, not measured
/// values. No gas estimation is done at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasLimits {
    pub approve: u64,
    pub transfer: u64,
    pub transfer_from: u64,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            approve: APPROVE_GAS_LIMIT,
            transfer: TRANSFER_GAS_LIMIT,
            transfer_from: TRANSFER_FROM_GAS_LIMIT,
        }
    }
}

/// Configuration for a single-token client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// JSON-RPC endpoint url
    pub rpc_url: String,

    /// Gas price in wei attached to every write, as a TOML integer or a
    /// decimal string for values past `i64::MAX`
    #[serde(
        serialize_with = "serialize_gas_price",
        deserialize_with = "deserialize_gas_price"
    )]
    pub gas_price: u128,

    /// Token contract address
    pub token_address: Address,

    /// Per-operation gas limits
    #[serde(default)]
    pub gas_limits: GasLimits,

    /// Upper bound on a single call or submission, unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_timeout_secs: Option<u64>,
}

impl TokenConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        contents.parse()
    }

    /// Check values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.rpc_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("rpc_url is empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "rpc_url must be an http(s) url, got {url}"
            )));
        }

        if self.token_address == Address::ZERO {
            return Err(ConfigError::Invalid("token_address is zero".to_string()));
        }

        let limits = &self.gas_limits;
        if limits.approve == 0 || limits.transfer == 0 || limits.transfer_from == 0 {
            return Err(ConfigError::Invalid("gas limits must be non-zero".to_string()));
        }

        if self.call_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("call_timeout_secs must be non-zero".to_string()));
        }

        Ok(())
    }

    /// Call timeout as a [`Duration`].
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }
}

impl std::str::FromStr for TokenConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }
}

fn serialize_gas_price<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn deserialize_gas_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(value) => Ok(value.into()),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Builder for configs assembled in code rather than loaded from a file.
#[derive(Debug, Clone)]
pub struct TokenConfigBuilder {
    config: TokenConfig,
}

impl TokenConfigBuilder {
    /// Start from the required fields with default gas limits and no timeout.
    pub fn new(rpc_url: impl Into<String>, gas_price: u128, token_address: Address) -> Self {
        Self {
            config: TokenConfig {
                rpc_url: rpc_url.into(),
                gas_price,
                token_address,
                gas_limits: GasLimits::default(),
                call_timeout_secs: None,
            },
        }
    }

    /// Override all gas limits.
    pub const fn gas_limits(mut self, limits: GasLimits) -> Self {
        self.config.gas_limits = limits;
        self
    }

    /// Override the `approve` gas limit.
    pub const fn approve_gas_limit(mut self, gas: u64) -> Self {
        self.config.gas_limits.approve = gas;
        self
    }

    /// Override the `transfer` gas limit.
    pub const fn transfer_gas_limit(mut self, gas: u64) -> Self {
        self.config.gas_limits.transfer = gas;
        self
    }

    /// Override the `transferFrom` gas limit.
    pub const fn transfer_from_gas_limit(mut self, gas: u64) -> Self {
        self.config.gas_limits.transfer_from = gas;
        self
    }

    /// Bound every call by `secs` seconds.
    pub const fn call_timeout_secs(mut self, secs: u64) -> Self {
        self.config.call_timeout_secs = Some(secs);
        self
    }

    /// Validate and build the config.
    pub fn build(self) -> Result<TokenConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
