use anyhow::{Context, Result};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::tools::async_support::PollPolicy;

/// Source chain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "NetworkConfig::default_name")]
    pub name: String,
    #[serde(default = "NetworkConfig::default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "NetworkConfig::default_chain_id")]
    pub chain_id: u64,
    /// Prefix for transaction links, the hash is appended.
    #[serde(default = "NetworkConfig::default_explorer_tx_url")]
    pub explorer_tx_url: String,
}

impl NetworkConfig {
    fn default_name() -> String { "Sepolia Testnet".to_string() }
    fn default_rpc_url() -> String { "https://rpc.sepolia.org".to_string() }
    fn default_chain_id() -> u64 { 11155111 }
    fn default_explorer_tx_url() -> String { "https://sepolia.etherscan.io/tx/".to_string() }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            rpc_url: Self::default_rpc_url(),
            chain_id: Self::default_chain_id(),
            explorer_tx_url: Self::default_explorer_tx_url(),
        }
    }
}

/// Token and bridge contract configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// ERC-20 token being bridged (USDC on Sepolia).
    #[serde(default = "BridgeConfig::default_token_address")]
    pub token_address: Address,
    #[serde(default = "BridgeConfig::default_token_symbol")]
    pub token_symbol: String,
    /// UCS03 zkgm contract, also the allowance spender.
    #[serde(default = "BridgeConfig::default_contract_address")]
    pub contract_address: Address,
    #[serde(default = "BridgeConfig::default_faucet_url")]
    pub faucet_url: String,
}

impl BridgeConfig {
    pub const USDC_SEPOLIA: &'static str = "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238";
    pub const UCS03_SEPOLIA: &'static str = "0x5FbE74A283f7954f10AA04C2eDf55578811aeb03";

    fn default_token_address() -> Address {
        Self::USDC_SEPOLIA.parse().unwrap_or_default()
    }
    fn default_token_symbol() -> String { "USDC".to_string() }
    fn default_contract_address() -> Address {
        Self::UCS03_SEPOLIA.parse().unwrap_or_default()
    }
    fn default_faucet_url() -> String { "https://faucet.circle.com".to_string() }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            token_address: Self::default_token_address(),
            token_symbol: Self::default_token_symbol(),
            contract_address: Self::default_contract_address(),
            faucet_url: Self::default_faucet_url(),
        }
    }
}

/// GraphQL indexer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    #[serde(default = "IndexerConfig::default_endpoint")]
    pub endpoint: String,
    /// Prefix for packet links, the packet hash is appended.
    #[serde(default = "IndexerConfig::default_explorer_packet_url")]
    pub explorer_packet_url: String,
    #[serde(default = "IndexerConfig::default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "IndexerConfig::default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "IndexerConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl IndexerConfig {
    fn default_endpoint() -> String { "https://graphql.union.build/v1/graphql".to_string() }
    fn default_explorer_packet_url() -> String {
        "https://app.union.build/explorer/transfers/".to_string()
    }
    fn default_max_attempts() -> u32 { 50 }
    fn default_interval_ms() -> u64 { 5000 }
    fn default_request_timeout_secs() -> u64 { 15 }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(self.max_attempts, Duration::from_millis(self.interval_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            explorer_packet_url: Self::default_explorer_packet_url(),
            max_attempts: Self::default_max_attempts(),
            interval_ms: Self::default_interval_ms(),
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }
}

/// Pauses after confirmed writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "TimingConfig::default_post_approve_delay_ms")]
    pub post_approve_delay_ms: u64,
    #[serde(default = "TimingConfig::default_post_send_delay_ms")]
    pub post_send_delay_ms: u64,
}

impl TimingConfig {
    fn default_post_approve_delay_ms() -> u64 { 3000 }
    fn default_post_send_delay_ms() -> u64 { 2000 }

    pub fn post_approve_delay(&self) -> Duration {
        Duration::from_millis(self.post_approve_delay_ms)
    }

    pub fn post_send_delay(&self) -> Duration {
        Duration::from_millis(self.post_send_delay_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            post_approve_delay_ms: Self::default_post_approve_delay_ms(),
            post_send_delay_ms: Self::default_post_send_delay_ms(),
        }
    }
}

/// Top-level configuration, read from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "AppConfig::default_wallet_file")]
    pub wallet_file: PathBuf,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

impl AppConfig {
    fn default_wallet_file() -> PathBuf { PathBuf::from("wallet.json") }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `CONFIG_PATH` or `./config.toml` is read
    /// when present and built-in defaults are used otherwise. Environment overrides are
    /// applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = std::env::var("CONFIG_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("config.toml"));
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    info!("No config file at {}, using defaults", path.display());
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded config from {} (RPC: {})", path.display(), config.network.rpc_url);
        Ok(config)
    }

    /// `SEPOLIA_RPC_URL`, `UNION_GRAPHQL_ENDPOINT` and `WALLET_FILE` win over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = non_empty_env("SEPOLIA_RPC_URL") {
            self.network.rpc_url = url;
        }
        if let Some(endpoint) = non_empty_env("UNION_GRAPHQL_ENDPOINT") {
            self.indexer.endpoint = endpoint;
        }
        if let Some(path) = non_empty_env("WALLET_FILE") {
            self.wallet_file = PathBuf::from(path);
        }
        if self.indexer.max_attempts == 0 {
            warn!("indexer.max_attempts is 0, packet hashes will never be polled");
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            wallet_file: Self::default_wallet_file(),
            network: NetworkConfig::default(),
            bridge: BridgeConfig::default(),
            indexer: IndexerConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn defaults_match_sepolia_deployment() {
        let config = AppConfig::default();
        assert_eq!(config.network.chain_id, 11155111);
        assert_eq!(config.bridge.token_address, BridgeConfig::USDC_SEPOLIA.parse().unwrap());
        assert_eq!(config.bridge.contract_address, BridgeConfig::UCS03_SEPOLIA.parse().unwrap());
        assert_eq!(config.indexer.max_attempts, 50);
        assert_eq!(config.indexer.interval_ms, 5000);
        assert_eq!(config.timing.post_send_delay(), Duration::from_secs(2));
        assert_eq!(config.timing.post_approve_delay(), Duration::from_secs(3));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
wallet_file = "keys/wallets.json"

[indexer]
max_attempts = 3
interval_ms = 10
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.wallet_file, PathBuf::from("keys/wallets.json"));
        assert_eq!(config.indexer.max_attempts, 3);
        assert_eq!(config.indexer.endpoint, "https://graphql.union.build/v1/graphql");
        assert_eq!(config.network.rpc_url, "https://rpc.sepolia.org");
        let policy = config.indexer.poll_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.interval, Duration::from_millis(10));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    #[serial]
    fn env_overrides_win() {
        std::env::set_var("SEPOLIA_RPC_URL", "http://127.0.0.1:8545");
        std::env::set_var("UNION_GRAPHQL_ENDPOINT", "http://127.0.0.1:9000/graphql");
        std::env::set_var("WALLET_FILE", "  ");

        let mut config = AppConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.network.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.indexer.endpoint, "http://127.0.0.1:9000/graphql");
        // blank values are ignored
        assert_eq!(config.wallet_file, PathBuf::from("wallet.json"));

        std::env::remove_var("SEPOLIA_RPC_URL");
        std::env::remove_var("UNION_GRAPHQL_ENDPOINT");
        std::env::remove_var("WALLET_FILE");
    }
}
