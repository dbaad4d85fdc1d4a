use thiserror::Error;

/// Error type for bridge runs.
///
/// Variants carry a human-readable message. The binary exits on
/// [`BridgeError::is_fatal`] errors; the runner skips a wallet on
/// [`BridgeError::is_wallet_config`] errors and fails it on the rest.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration-related errors (config file, env overrides).
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// The wallet entry's private key could not be parsed.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
    /// The wallet entry lacks a field the route needs.
    #[error("Missing wallet data: {0}")]
    MissingWalletData(String),
    /// Token balance is zero.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    /// Approval write reverted or could not be sent.
    #[error("Approval failed: {0}")]
    ApprovalFailed(String),
    /// Bridge `send` write reverted or could not be sent.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
    /// RPC read errors.
    #[error("Blockchain error: {0}")]
    BlockchainError(String),
    /// Transport-level HTTP errors.
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The GraphQL indexer answered with an error status or payload.
    #[error("Indexer error: {0}")]
    IndexerError(String),
    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// IO errors.
    #[error("IO error: {0}")]
    IoError(String),
    /// Nothing left to run with after wallet resolution.
    #[error("No valid wallets: {0}")]
    NoWallets(String),
}

impl BridgeError {
    /// Errors that should stop the whole process rather than a single wallet.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BridgeError::NoWallets(_))
    }

    /// Errors that only concern one wallet's configuration; the wallet is skipped.
    pub fn is_wallet_config(&self) -> bool {
        matches!(
            self,
            BridgeError::InvalidPrivateKey(_) | BridgeError::MissingWalletData(_)
        )
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BridgeError::SerializationError(err.to_string())
        } else {
            BridgeError::NetworkError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_config_error() {
        let err = BridgeError::ConfigError("bad rpc url".to_string());
        assert_eq!(format!("{}", err), "Configuration error: bad rpc url");
    }

    #[test]
    fn test_display_insufficient_funds() {
        let err = BridgeError::InsufficientFunds("0 USDC".to_string());
        assert_eq!(format!("{}", err), "Insufficient funds: 0 USDC");
    }

    #[test]
    fn test_classification() {
        assert!(BridgeError::NoWallets("none".into()).is_fatal());
        assert!(!BridgeError::TransactionFailed("revert".into()).is_fatal());
        assert!(!BridgeError::NetworkError("timeout".into()).is_wallet_config());
        assert!(BridgeError::InvalidPrivateKey("short".into()).is_wallet_config());
        assert!(!BridgeError::InsufficientFunds("0".into()).is_wallet_config());
    }

    #[test]
    fn test_from_serde_json() {
        let err: BridgeError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, BridgeError::SerializationError(_)));
    }
}
