//! RPC provider construction and local transaction signing.
//!
//! Signing happens here rather than through a wallet-filled provider so the
//! caller controls every field of the request: gas limit and gas price are
//! fixed by the caller, only nonce and chain id are taken from the node.

use alloy_consensus::TxEnvelope;
use alloy_network::{eip2718::Encodable2718, EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error connecting to the RPC endpoint
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// Convenience function to create an ethereum rpc provider from url.
///
/// No request is made; an unreachable endpoint only shows up on first use.
pub fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .trim()
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{rpc_url}: {e}")))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// Ask the node for its chain id, mapping failure to [`ClientError::Connection`].
pub async fn probe_chain_id<P: Provider>(provider: &P) -> Result<u64, ClientError> {
    provider
        .get_chain_id()
        .await
        .map_err(|e| ClientError::Connection(e.to_string()))
}

/// Parse a hex private key, with or without `0x` prefix.
pub fn parse_private_key(private_key: &str) -> Result<PrivateKeySigner, ClientError> {
    private_key
        .trim()
        .parse()
        .map_err(|e| ClientError::InvalidPrivateKey(format!("{e}")))
}

/// Fill sender, chain id and nonce on a transaction request.
///
/// The nonce is the sender's pending transaction count. Gas limit and gas
/// price must already be set: nothing is estimated here.
pub async fn fill_transaction<P>(
    mut tx: TransactionRequest,
    provider: &P,
    from: Address,
    chain_id: u64,
) -> eyre::Result<TransactionRequest>
where
    P: Provider,
{
    if tx.gas.is_none() {
        eyre::bail!("transaction has no gas limit");
    }
    if tx.gas_price.is_none() {
        eyre::bail!("transaction has no gas price");
    }

    if tx.from.is_none() {
        tx.from = Some(from);
    }

    if tx.chain_id.is_none() {
        tx.chain_id = Some(chain_id);
    }

    if tx.nonce.is_none() {
        let nonce = provider.get_transaction_count(from).pending().await?;
        tx.nonce = Some(nonce);
    }

    Ok(tx)
}

/// Sign a fully filled request with a local key.
///
/// Returns the EIP-2718 encoded envelope ready for `eth_sendRawTransaction`.
pub async fn sign_transaction(
    tx: TransactionRequest,
    signer: &PrivateKeySigner,
) -> eyre::Result<Bytes> {
    // Dropped at the end of this call; the key inside zeroizes on drop.
    let wallet = EthereumWallet::from(signer.clone());

    let tx_envelope: TxEnvelope = tx.build(&wallet).await.map_err(|e| eyre::eyre!("{}", e))?;

    let mut encoded = Vec::new();
    tx_envelope.encode_2718(&mut encoded);
    Ok(Bytes::from(encoded))
}
