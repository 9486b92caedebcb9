//! Client for a single ERC20 token contract.
//!
//! [`TokenClient`] is a thin layer over a [`TokenContract`] backend: it parses
//! caller-supplied addresses, attaches the fixed per-operation gas limit and
//! the configured gas price to writes, and classifies failures into
//! [`TokenError`]. [`Erc20Contract`] is the alloy-backed implementation that
//! talks to a node over JSON-RPC.
//!
//! Writes are submitted exactly once. There is no gas estimation, no retry and
//! no wait for a receipt; callers that need delivery guarantees poll for the
//! returned [`TransactionHandle`] themselves.

pub mod address;
pub mod contract;
mod error;
mod token_client;

#[cfg(test)]
pub(crate) mod test_utils;

use alloy_primitives::{Address, TxHash, U256};
use alloy_signer_local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use std::future::Future;

pub use address::{parse_address, to_checksum};
pub use contract::Erc20Contract;
pub use error::TokenError;
pub use token_client::{HttpTokenClient, Settings, TokenClient};

/// Gas parameters attached to a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOptions {
    /// Gas limit
    pub gas_limit: u64,
    /// Legacy gas price in wei
    pub gas_price: u128,
}

/// Reference to a submitted transaction.
///
/// Submission only; the transaction may still be dropped or revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHandle {
    /// Transaction hash reported by the node
    pub tx_hash: TxHash,
    /// Signer address
    pub from: Address,
    /// Nonce the transaction was signed with
    pub nonce: u64,
    /// Gas limit the transaction was signed with
    pub gas_limit: u64,
    /// Gas price the transaction was signed with
    pub gas_price: u128,
}

/// The six token contract operations the client uses.
pub trait TokenContract: Send + Sync {
    /// `balanceOf(owner)` at the latest block.
    fn balance_of(&self, owner: Address) -> impl Future<Output = eyre::Result<U256>> + Send;

    /// `allowance(owner, spender)` at the latest block.
    fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> impl Future<Output = eyre::Result<U256>> + Send;

    /// `totalSupply()` at the latest block.
    fn total_supply(&self) -> impl Future<Output = eyre::Result<U256>> + Send;

    /// Sign and submit `approve(spender, amount)`.
    fn approve(
        &self,
        signer: &PrivateKeySigner,
        spender: Address,
        amount: U256,
        opts: TxOptions,
    ) -> impl Future<Output = eyre::Result<TransactionHandle>> + Send;

    /// Sign and submit `transfer(to, amount)`.
    fn transfer(
        &self,
        signer: &PrivateKeySigner,
        to: Address,
        amount: U256,
        opts: TxOptions,
    ) -> impl Future<Output = eyre::Result<TransactionHandle>> + Send;

    /// Sign and submit `transferFrom(from, to, amount)`.
    fn transfer_from(
        &self,
        signer: &PrivateKeySigner,
        from: Address,
        to: Address,
        amount: U256,
        opts: TxOptions,
    ) -> impl Future<Output = eyre::Result<TransactionHandle>> + Send;
}
