use solana_client::client_error::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to read keypair file '{0}': {1}")]
    KeypairError(String, String),
}

/// Failure to read sale or wallet state from the chain. The last known
/// status stays valid when one of these is returned.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("RPC request failed: {0}")]
    Rpc(#[from] ClientError),

    #[error("Malformed account {0}: {1}")]
    Deserialization(String, String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl FetchError {
    /// Network failures are worth retrying on the next trigger; a malformed
    /// account will not fix itself.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Rpc(_))
    }
}
