//! In-memory token backend for unit tests.

use crate::{TokenContract, TransactionHandle, TxOptions};
use alloy_primitives::{address, Address, B256, U256};
use alloy_signer_local::PrivateKeySigner;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

pub const TOKEN: Address = address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1");

/// Anvil account 0.
pub fn dev_signer() -> PrivateKeySigner {
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
        .parse()
        .unwrap()
}

/// A write the mock accepted.
#[derive(Debug, Clone)]
pub struct Submission {
    pub method: &'static str,
    pub signer: Address,
    pub addresses: Vec<Address>,
    pub amount: U256,
    pub opts: TxOptions,
}

/// Token state that never changes on writes; writes are only recorded.
#[derive(Default)]
pub struct MockToken {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    supply: U256,
    delay: Option<Duration>,
    calls: AtomicUsize,
    submissions: Mutex<Vec<Submission>>,
    /// Fail every call while set
    pub fail: AtomicBool,
}

impl MockToken {
    pub fn with_balance(mut self, owner: Address, amount: U256) -> Self {
        self.balances.insert(owner, amount);
        self
    }

    pub fn with_allowance(mut self, owner: Address, spender: Address, amount: U256) -> Self {
        self.allowances.insert((owner, spender), amount);
        self
    }

    pub fn with_supply(mut self, supply: U256) -> Self {
        self.supply = supply;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of backend calls, reads and writes.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    async fn enter(&self) -> eyre::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            eyre::bail!("connection refused");
        }
        Ok(())
    }

    async fn record(
        &self,
        method: &'static str,
        signer: &PrivateKeySigner,
        addresses: Vec<Address>,
        amount: U256,
        opts: TxOptions,
    ) -> eyre::Result<TransactionHandle> {
        self.enter().await?;

        let mut submissions = self.submissions.lock().unwrap();
        let nonce = submissions.len() as u64;
        submissions.push(Submission {
            method,
            signer: signer.address(),
            addresses,
            amount,
            opts,
        });

        Ok(TransactionHandle {
            tx_hash: B256::with_last_byte(nonce as u8 + 1),
            from: signer.address(),
            nonce,
            gas_limit: opts.gas_limit,
            gas_price: opts.gas_price,
        })
    }
}

impl TokenContract for MockToken {
    async fn balance_of(&self, owner: Address) -> eyre::Result<U256> {
        self.enter().await?;
        Ok(self.balances.get(&owner).copied().unwrap_or_default())
    }

    async fn allowance(&self, owner: Address, spender: Address) -> eyre::Result<U256> {
        self.enter().await?;
        Ok(self
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn total_supply(&self) -> eyre::Result<U256> {
        self.enter().await?;
        Ok(self.supply)
    }

    async fn approve(
        &self,
        signer: &PrivateKeySigner,
        spender: Address,
        amount: U256,
        opts: TxOptions,
    ) -> eyre::Result<TransactionHandle> {
        self.record("approve", signer, vec![spender], amount, opts)
            .await
    }

    async fn transfer(
        &self,
        signer: &PrivateKeySigner,
        to: Address,
        amount: U256,
        opts: TxOptions,
    ) -> eyre::Result<TransactionHandle> {
        self.record("transfer", signer, vec![to], amount, opts).await
    }

    async fn transfer_from(
        &self,
        signer: &PrivateKeySigner,
        from: Address,
        to: Address,
        amount: U256,
        opts: TxOptions,
    ) -> eyre::Result<TransactionHandle> {
        self.record("transferFrom", signer, vec![from, to], amount, opts)
            .await
    }
}
