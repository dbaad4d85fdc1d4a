// src/core/wallet_info.rs
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{error, info};

use crate::core::errors::BridgeError;

/// One entry of the wallet file, exactly as written by the operator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub privatekey: Option<String>,
    #[serde(default, rename = "babylonAddress")]
    pub babylon_address: Option<String>,
}

impl WalletEntry {
    /// Name shown in prompts and logs; falls back to the 1-based position.
    pub fn display_name(&self, position: usize) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("wallet-{}", position),
        }
    }
}

/// `wallet.json`: `{ "wallets": [ ... ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletFile {
    #[serde(default)]
    pub wallets: Vec<WalletEntry>,
}

impl WalletFile {
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::ConfigError(format!("Failed to read wallet file {}: {}", path.display(), e))
        })?;
        let file = Self::from_json(&content)?;
        info!("Loaded {} wallet(s) from {}", file.wallets.len(), path.display());
        Ok(file)
    }

    pub fn from_json(content: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(content)
            .map_err(|e| BridgeError::ConfigError(format!("Invalid wallet file: {}", e)))
    }

    pub fn names(&self) -> Vec<String> {
        self.wallets.iter().enumerate().map(|(i, w)| w.display_name(i + 1)).collect()
    }
}

/// Which wallet file entries the operator picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletSelection {
    All,
    /// 1-based positions into the wallet file.
    Positions(Vec<usize>),
}

/// A wallet with a validated signing key.
///
/// The key stays behind [`SecretString`] and is only exposed while a signer is built.
#[derive(Debug, Clone)]
pub struct WalletRecord {
    pub name: String,
    pub address: Address,
    pub babylon_address: Option<String>,
    signing_key: SecretString,
}

impl WalletRecord {
    pub fn from_entry(entry: &WalletEntry, position: usize) -> Result<Self, BridgeError> {
        let name = entry.display_name(position);
        let key = entry
            .privatekey
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| BridgeError::MissingWalletData(format!("{} has no privatekey", name)))?;

        let signing_key = SecretString::new(key.to_string());
        let address = parse_signer(&signing_key)
            .map_err(|e| BridgeError::InvalidPrivateKey(format!("{}: {}", name, e)))?
            .address();

        let babylon_address = entry
            .babylon_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        Ok(Self { name, address, babylon_address, signing_key })
    }

    /// Build a chain-bound signer from the stored key.
    pub fn signer(&self, chain_id: u64) -> Result<LocalWallet, BridgeError> {
        parse_signer(&self.signing_key)
            .map(|w| w.with_chain_id(chain_id))
            .map_err(|e| BridgeError::InvalidPrivateKey(format!("{}: {}", self.name, e)))
    }
}

fn parse_signer(key: &SecretString) -> Result<LocalWallet, String> {
    LocalWallet::from_str(key.expose_secret()).map_err(|e| e.to_string())
}

/// Turn a selection into validated wallet records.
///
/// Entries with a missing or unparseable key are logged and skipped. Having
/// nothing left is the only fatal outcome.
pub fn resolve_wallets(
    file: &WalletFile,
    selection: &WalletSelection,
) -> Result<Vec<WalletRecord>, BridgeError> {
    let positions: Vec<usize> = match selection {
        WalletSelection::All => (1..=file.wallets.len()).collect(),
        WalletSelection::Positions(p) => p.clone(),
    };

    let mut records = Vec::with_capacity(positions.len());
    for position in positions {
        let Some(entry) = position.checked_sub(1).and_then(|i| file.wallets.get(i)) else {
            error!("Wallet #{} does not exist. Skipping.", position);
            continue;
        };
        match WalletRecord::from_entry(entry, position) {
            Ok(record) => records.push(record),
            Err(e) => {
                error!(wallet = %entry.display_name(position), "{}. Skipping.", e);
            }
        }
    }

    if records.is_empty() {
        return Err(BridgeError::NoWallets("no selected wallet has a usable private key".into()));
    }
    Ok(records)
}
