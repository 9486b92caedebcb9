use crate::{
    address::parse_address, contract::Erc20Contract, TokenContract, TokenError,
    TransactionHandle, TxOptions,
};
use alloy_primitives::{Address, U256};
use alloy_provider::{DynProvider, Provider};
use alloy_signer_local::PrivateKeySigner;
use config::{GasLimits, TokenConfig};
use std::{future::Future, time::Duration};
use tracing::{debug, info, warn};

/// Client bound to the token contract over HTTP JSON-RPC.
pub type HttpTokenClient = TokenClient<Erc20Contract<DynProvider>>;

/// Immutable per-client settings applied to every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Legacy gas price in wei for every write
    pub gas_price: u128,
    /// Fixed gas limit per write operation
    pub gas_limits: GasLimits,
    /// Upper bound on a single call, unbounded when `None`
    pub call_timeout: Option<Duration>,
}

impl Settings {
    /// Default gas limits and no timeout.
    pub fn new(gas_price: u128) -> Self {
        Self {
            gas_price,
            gas_limits: GasLimits::default(),
            call_timeout: None,
        }
    }
}

impl From<&TokenConfig> for Settings {
    fn from(config: &TokenConfig) -> Self {
        Self {
            gas_price: config.gas_price,
            gas_limits: config.gas_limits,
            call_timeout: config.call_timeout(),
        }
    }
}

/// Thin client over one token contract.
///
/// Every method is a single request/response round trip. The client keeps no
/// state between calls beyond its settings, so it can be shared across tasks
/// and stays usable after any error. Dropping a returned future cancels the
/// request in flight.
///
/// Concurrent writes signed by the same key are not serialized: each fetches
/// the pending nonce independently and they may collide.
pub struct TokenClient<C> {
    contract: C,
    settings: Settings,
}

impl HttpTokenClient {
    /// Connect to `endpoint` and bind to the token at `token_address`.
    ///
    /// Probes the node for its chain id, which every write is signed for.
    pub async fn connect(
        endpoint: &str,
        gas_price: u128,
        token_address: &str,
    ) -> Result<Self, TokenError> {
        let provider = client::create_provider(endpoint)
            .map_err(|e| TokenError::Connection(e.to_string()))?
            .erased();
        let token = parse_address(token_address).map_err(|e| TokenError::Binding(e.to_string()))?;

        Self::bind(provider, token, Settings::new(gas_price)).await
    }

    /// Connect using a loaded config, honoring its gas limits and timeout.
    ///
    /// The config is validated first, so a hand-built one is held to the same
    /// rules as a loaded file. A zero token address is a binding error; any
    /// other invalid value is a connection error.
    pub async fn from_config(config: &TokenConfig) -> Result<Self, TokenError> {
        let provider = client::create_provider(&config.rpc_url)
            .map_err(|e| TokenError::Connection(e.to_string()))?
            .erased();
        if config.token_address == Address::ZERO {
            return Err(TokenError::Binding("token address is zero".to_string()));
        }
        config
            .validate()
            .map_err(|e| TokenError::Connection(e.to_string()))?;

        Self::bind(provider, config.token_address, Settings::from(config)).await
    }

    async fn bind(
        provider: DynProvider,
        token: Address,
        settings: Settings,
    ) -> Result<Self, TokenError> {
        let probe = async {
            client::probe_chain_id(&provider)
                .await
                .map_err(eyre::Report::from)
        };
        let chain_id = bounded(settings.call_timeout, probe)
            .await
            .map_err(|e| TokenError::Connection(format!("{e:#}")))?;

        info!(%token, chain_id, "Token client connected");

        Ok(Self::new(Erc20Contract::new(token, provider, chain_id), settings))
    }
}

impl<C> TokenClient<C>
where
    C: TokenContract,
{
    /// Wrap an existing contract backend.
    pub const fn new(contract: C, settings: Settings) -> Self {
        Self { contract, settings }
    }

    /// Contract backend.
    pub const fn contract(&self) -> &C {
        &self.contract
    }

    /// Settings applied to every call.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Token balance of `owner`.
    pub async fn balance_of(&self, owner: &str) -> Result<U256, TokenError> {
        let owner = parse_address(owner)?;
        debug!(%owner, "Querying balanceOf");

        self.read("balanceOf", self.contract.balance_of(owner)).await
    }

    /// Amount `spender` may still move out of `owner`'s balance.
    pub async fn allowance_of(&self, owner: &str, spender: &str) -> Result<U256, TokenError> {
        let owner = parse_address(owner)?;
        let spender = parse_address(spender)?;
        debug!(%owner, %spender, "Querying allowance");

        self.read("allowance", self.contract.allowance(owner, spender))
            .await
    }

    /// Total token supply.
    pub async fn total_supply(&self) -> Result<U256, TokenError> {
        debug!("Querying totalSupply");

        self.read("totalSupply", self.contract.total_supply()).await
    }

    /// Let `spender` move up to `amount` of the signer's tokens.
    pub async fn approve(
        &self,
        key: &PrivateKeySigner,
        spender: &str,
        amount: U256,
    ) -> Result<TransactionHandle, TokenError> {
        let spender = parse_address(spender)?;
        let opts = self.tx_options(self.settings.gas_limits.approve);
        debug!(from = %key.address(), %spender, %amount, "Submitting approve");

        self.submit("approve", self.contract.approve(key, spender, amount, opts))
            .await
    }

    /// Move `amount` of the signer's tokens to `to`.
    pub async fn transfer(
        &self,
        key: &PrivateKeySigner,
        to: &str,
        amount: U256,
    ) -> Result<TransactionHandle, TokenError> {
        let to = parse_address(to)?;
        let opts = self.tx_options(self.settings.gas_limits.transfer);
        debug!(from = %key.address(), %to, %amount, "Submitting transfer");

        self.submit("transfer", self.contract.transfer(key, to, amount, opts))
            .await
    }

    /// Move `amount` from `from` to `to` against the signer's allowance.
    pub async fn transfer_from(
        &self,
        key: &PrivateKeySigner,
        from: &str,
        to: &str,
        amount: U256,
    ) -> Result<TransactionHandle, TokenError> {
        let from = parse_address(from)?;
        let to = parse_address(to)?;
        let opts = self.tx_options(self.settings.gas_limits.transfer_from);
        debug!(signer = %key.address(), %from, %to, %amount, "Submitting transferFrom");

        self.submit(
            "transferFrom",
            self.contract.transfer_from(key, from, to, amount, opts),
        )
        .await
    }

    const fn tx_options(&self, gas_limit: u64) -> TxOptions {
        TxOptions {
            gas_limit,
            gas_price: self.settings.gas_price,
        }
    }

    async fn read(
        &self,
        method: &'static str,
        call: impl Future<Output = eyre::Result<U256>>,
    ) -> Result<U256, TokenError> {
        bounded(self.settings.call_timeout, call)
            .await
            .map_err(|e| {
                warn!(method, error = %e, "Token call failed");
                TokenError::RemoteCall {
                    method,
                    reason: format!("{e:#}"),
                }
            })
    }

    /// A timed out submission may still have reached the node.
    async fn submit(
        &self,
        method: &'static str,
        call: impl Future<Output = eyre::Result<TransactionHandle>>,
    ) -> Result<TransactionHandle, TokenError> {
        let handle = bounded(self.settings.call_timeout, call)
            .await
            .map_err(|e| {
                warn!(method, error = %e, "Token transaction submission failed");
                TokenError::Submission {
                    method,
                    reason: format!("{e:#}"),
                }
            })?;

        info!(
            method,
            tx_hash = %handle.tx_hash,
            from = %handle.from,
            nonce = handle.nonce,
            gas_limit = handle.gas_limit,
            "Transaction submitted"
        );

        Ok(handle)
    }
}

async fn bounded<T>(
    limit: Option<Duration>,
    call: impl Future<Output = eyre::Result<T>>,
) -> eyre::Result<T> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| eyre::eyre!("timed out after {limit:?}"))?,
        None => call.await,
    }
}
