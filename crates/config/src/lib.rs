//! Configuration types for the token client.
//!
//! This crate provides:
//! - The token client configuration and its TOML loader
//! - Default per-operation gas limits
//! - Validation and a builder for configs assembled in code

pub mod token;

pub use token::{
    ConfigError, GasLimits, TokenConfig, TokenConfigBuilder, APPROVE_GAS_LIMIT,
    TRANSFER_FROM_GAS_LIMIT, TRANSFER_GAS_LIMIT,
};
