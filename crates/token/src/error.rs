use thiserror::Error;

/// Errors surfaced by [`TokenClient`](crate::TokenClient).
///
/// Nothing is retried and no failure poisons the client: after any of these
/// the same client can be used again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Endpoint url is malformed or the node did not answer the chain id probe
    #[error("Connection error: {0}")]
    Connection(String),

    /// Token contract address given at construction is malformed
    #[error("Binding error: {0}")]
    Binding(String),

    /// Address argument is not 40 hex characters
    #[error("Invalid address {input:?}: {reason}")]
    Parse { input: String, reason: String },

    /// Read call failed, reverted, timed out or returned malformed data
    #[error("{method} call failed: {reason}")]
    RemoteCall { method: &'static str, reason: String },

    /// Write could not be signed or broadcast
    #[error("{method} submission failed: {reason}")]
    Submission { method: &'static str, reason: String },
}
