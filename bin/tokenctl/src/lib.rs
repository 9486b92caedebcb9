//! Command-line front end over [`token::TokenClient`].

pub mod metrics;

use crate::metrics::Metrics;
use alloy_primitives::U256;
use alloy_signer_local::PrivateKeySigner;
use clap::Subcommand;
use serde_json::json;
use std::{
    future::Future,
    time::{Duration, Instant},
};
use token::{TokenClient, TokenContract, TokenError, TransactionHandle};
use tracing::{info, warn};

/// One token operation.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Token balance of an account
    Balance { owner: String },

    /// Remaining allowance of spender over owner's tokens
    Allowance { owner: String, spender: String },

    /// Total token supply
    TotalSupply,

    /// Let spender move up to amount of the signer's tokens
    Approve { spender: String, amount: String },

    /// Send amount of the signer's tokens
    Transfer { to: String, amount: String },

    /// Move amount from one account to another using the signer's allowance
    TransferFrom {
        from: String,
        to: String,
        amount: String,
    },

    /// Poll balances and export them as metrics until interrupted
    Watch {
        /// Accounts to poll
        #[arg(required = true)]
        owners: Vec<String>,

        /// Seconds between polls
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: u64,
    },
}

impl Command {
    /// Contract method the command maps to.
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Balance { .. } | Self::Watch { .. } => "balanceOf",
            Self::Allowance { .. } => "allowance",
            Self::TotalSupply => "totalSupply",
            Self::Approve { .. } => "approve",
            Self::Transfer { .. } => "transfer",
            Self::TransferFrom { .. } => "transferFrom",
        }
    }

    /// Whether the command needs a signing key.
    pub const fn is_write(&self) -> bool {
        matches!(
            self,
            Self::Approve { .. } | Self::Transfer { .. } | Self::TransferFrom { .. }
        )
    }
}

/// Result of a single command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A read returned an amount
    Amount {
        method: &'static str,
        amount: U256,
    },
    /// A write was submitted
    Submitted {
        method: &'static str,
        handle: TransactionHandle,
    },
}

impl Outcome {
    /// Render for stdout, as a plain line or a JSON object.
    pub fn render(&self, as_json: bool) -> String {
        match (self, as_json) {
            (Self::Amount { amount, .. }, false) => amount.to_string(),
            (Self::Amount { method, amount }, true) => json!({
                "method": method,
                "amount": amount.to_string(),
            })
            .to_string(),
            (Self::Submitted { handle, .. }, false) => handle.tx_hash.to_string(),
            (Self::Submitted { method, handle }, true) => json!({
                "method": method,
                "tx_hash": handle.tx_hash,
                "from": handle.from,
                "nonce": handle.nonce,
                "gas_limit": handle.gas_limit,
                "gas_price": handle.gas_price.to_string(),
            })
            .to_string(),
        }
    }
}

/// Parse a token amount in base units, decimal or `0x` hex.
pub fn parse_amount(input: &str) -> eyre::Result<U256> {
    let input = input.trim();
    let amount = match input.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(input, 10),
    };

    amount.map_err(|e| eyre::eyre!("invalid amount {input:?}: {e}"))
}

/// Resolve the signing key for `command` without touching the node.
///
/// Writes need a key and fail here when it is missing or malformed. Reads
/// ignore any key given.
pub fn signing_key(
    command: &Command,
    raw: Option<&str>,
) -> eyre::Result<Option<PrivateKeySigner>> {
    let method = command.method();

    match (command.is_write(), raw) {
        (false, _) => Ok(None),
        (true, None) => {
            eyre::bail!("{method} needs a private key (--private-key or TOKENCTL_PRIVATE_KEY)")
        }
        (true, Some(raw)) => Ok(Some(client::parse_private_key(raw)?)),
    }
}

/// Run a one-shot command against the client.
///
/// Writes fail before any call when no key is given.
pub async fn execute<C>(
    client: &TokenClient<C>,
    command: &Command,
    key: Option<&PrivateKeySigner>,
    metrics: &Metrics,
) -> eyre::Result<Outcome>
where
    C: TokenContract,
{
    let method = command.method();

    let key = match (command.is_write(), key) {
        (true, None) => {
            eyre::bail!("{method} needs a private key (--private-key or TOKENCTL_PRIVATE_KEY)")
        }
        (_, key) => key,
    };

    let started = Instant::now();
    let result = dispatch(client, command, key).await;
    metrics.record_call(method, result.is_ok(), started.elapsed());

    result
}

async fn dispatch<C>(
    client: &TokenClient<C>,
    command: &Command,
    key: Option<&PrivateKeySigner>,
) -> eyre::Result<Outcome>
where
    C: TokenContract,
{
    let method = command.method();
    let amount = |amount| Ok::<_, eyre::Report>(Outcome::Amount { method, amount });
    let submitted = |handle| Ok::<_, eyre::Report>(Outcome::Submitted { method, handle });

    match (command, key) {
        (Command::Balance { owner }, _) => amount(client.balance_of(owner).await?),
        (Command::Allowance { owner, spender }, _) => {
            amount(client.allowance_of(owner, spender).await?)
        }
        (Command::TotalSupply, _) => amount(client.total_supply().await?),
        (Command::Approve { spender, amount: value }, Some(key)) => {
            let value = parse_amount(value)?;
            submitted(client.approve(key, spender, value).await?)
        }
        (Command::Transfer { to, amount: value }, Some(key)) => {
            let value = parse_amount(value)?;
            submitted(client.transfer(key, to, value).await?)
        }
        (
            Command::TransferFrom {
                from,
                to,
                amount: value,
            },
            Some(key),
        ) => {
            let value = parse_amount(value)?;
            submitted(client.transfer_from(key, from, to, value).await?)
        }
        (Command::Watch { .. }, _) => eyre::bail!("watch is not a one-shot command"),
        (_, None) => eyre::bail!("{method} needs a private key"),
    }
}

/// Query every owner's balance once, updating the balance gauges.
///
/// Failures are logged and returned alongside successes.
pub async fn poll_balances<C>(
    client: &TokenClient<C>,
    owners: &[String],
    metrics: &Metrics,
) -> Vec<(String, Result<U256, TokenError>)>
where
    C: TokenContract,
{
    let mut results = Vec::with_capacity(owners.len());

    for owner in owners {
        let started = Instant::now();
        let result = client.balance_of(owner).await;
        metrics.record_call("balanceOf", result.is_ok(), started.elapsed());

        match &result {
            Ok(balance) => {
                info!(%owner, %balance, "Token balance");
                metrics.set_balance(owner, u128::try_from(*balance).unwrap_or(u128::MAX));
            }
            Err(e) => warn!(%owner, error = %e, "Failed to query token balance"),
        }

        results.push((owner.clone(), result));
    }

    results
}

/// Poll balances every `period` until `shutdown` resolves.
///
/// `shutdown` is raced against the whole round, so it also cuts a slow poll
/// short. Returns the number of completed rounds.
pub async fn watch<C, F>(
    client: &TokenClient<C>,
    owners: &[String],
    period: Duration,
    metrics: &Metrics,
    shutdown: F,
) -> usize
where
    C: TokenContract,
    F: Future,
{
    tokio::pin!(shutdown);
    let mut interval = tokio::time::interval(period);
    let mut rounds = 0;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!(rounds, "Stopping balance watch");
                return rounds;
            }
            _ = async {
                interval.tick().await;
                poll_balances(client, owners, metrics).await;
            } => {
                rounds += 1;
            }
        }
    }
}
