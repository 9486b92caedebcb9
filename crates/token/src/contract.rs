//! Alloy-backed [`TokenContract`] implementation.

use crate::{TokenContract, TransactionHandle, TxOptions};
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::{BlockId, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use binding::token::IERC20::{self, IERC20Instance};
use eyre::Result;
use tracing::debug;

/// A deployed ERC20 contract reached through an RPC provider.
///
/// Reads are `eth_call`s against the latest block. Writes are signed locally
/// as legacy EIP-155 transactions and broadcast with `eth_sendRawTransaction`.
#[derive(Clone)]
pub struct Erc20Contract<P> {
    instance: IERC20Instance<P>,
    chain_id: u64,
}

impl<P> Erc20Contract<P>
where
    P: Provider + Clone,
{
    /// Bind to the token at `address`. `chain_id` is used for replay protection.
    pub fn new(address: Address, provider: P, chain_id: u64) -> Self {
        Self {
            instance: IERC20::new(address, provider),
            chain_id,
        }
    }

    /// Token contract address.
    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    /// Chain id transactions are signed for.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn send(
        &self,
        signer: &PrivateKeySigner,
        tx: TransactionRequest,
    ) -> Result<TransactionHandle> {
        let from = signer.address();
        let provider = self.instance.provider();

        let tx = client::fill_transaction(tx, provider, from, self.chain_id).await?;
        let nonce = tx.nonce.unwrap_or_default();
        let gas_limit = tx.gas.unwrap_or_default();
        let gas_price = tx.gas_price.unwrap_or_default();

        let raw = client::sign_transaction(tx, signer).await?;
        debug!(%from, nonce, bytes = raw.len(), "Broadcasting signed transaction");

        let pending = provider.send_raw_transaction(&raw).await?;

        Ok(TransactionHandle {
            tx_hash: *pending.tx_hash(),
            from,
            nonce,
            gas_limit,
            gas_price,
        })
    }

    /// Attach sender and gas parameters to the calldata request from the binding.
    fn request(
        &self,
        call: TransactionRequest,
        from: Address,
        opts: TxOptions,
    ) -> TransactionRequest {
        TransactionRequest {
            from: Some(from),
            gas: Some(opts.gas_limit),
            gas_price: Some(opts.gas_price),
            chain_id: Some(self.chain_id),
            ..call
        }
    }
}

impl<P> TokenContract for Erc20Contract<P>
where
    P: Provider + Clone,
{
    async fn balance_of(&self, owner: Address) -> Result<U256> {
        let balance = self
            .instance
            .balanceOf(owner)
            .block(BlockId::latest())
            .call()
            .await?;
        Ok(balance)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        let allowance = self
            .instance
            .allowance(owner, spender)
            .block(BlockId::latest())
            .call()
            .await?;
        Ok(allowance)
    }

    async fn total_supply(&self) -> Result<U256> {
        let supply = self
            .instance
            .totalSupply()
            .block(BlockId::latest())
            .call()
            .await?;
        Ok(supply)
    }

    async fn approve(
        &self,
        signer: &PrivateKeySigner,
        spender: Address,
        amount: U256,
        opts: TxOptions,
    ) -> Result<TransactionHandle> {
        let call = self.instance.approve(spender, amount).into_transaction_request();
        let tx = self.request(call, signer.address(), opts);
        self.send(signer, tx).await
    }

    async fn transfer(
        &self,
        signer: &PrivateKeySigner,
        to: Address,
        amount: U256,
        opts: TxOptions,
    ) -> Result<TransactionHandle> {
        let call = self.instance.transfer(to, amount).into_transaction_request();
        let tx = self.request(call, signer.address(), opts);
        self.send(signer, tx).await
    }

    async fn transfer_from(
        &self,
        signer: &PrivateKeySigner,
        from: Address,
        to: Address,
        amount: U256,
        opts: TxOptions,
    ) -> Result<TransactionHandle> {
        let call = self
            .instance
            .transferFrom(from, to, amount)
            .into_transaction_request();
        let tx = self.request(call, signer.address(), opts);
        self.send(signer, tx).await
    }
}
