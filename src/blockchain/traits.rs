use async_trait::async_trait;
use ethers::types::{Address, U256};

use crate::{
    blockchain::bridge::TransactionDescriptor, core::errors::BridgeError,
    core::wallet_info::WalletRecord,
};

/// Chain access for one signing wallet.
///
/// Writes return only after the transaction has one confirmation.
#[async_trait]
pub trait BridgeChain: Send + Sync {
    /// Address of the signer behind this client.
    fn address(&self) -> Address;

    /// ERC-20 `balanceOf(self)`.
    async fn token_balance(&self, token: Address) -> Result<U256, BridgeError>;

    /// ERC-20 `allowance(self, spender)`.
    async fn token_allowance(&self, token: Address, spender: Address) -> Result<U256, BridgeError>;

    /// ERC-20 `approve(spender, MAX)`, returning the confirmed transaction hash.
    async fn approve_max(&self, token: Address, spender: Address) -> Result<String, BridgeError>;

    /// Bridge `send(...)`, returning the confirmed transaction hash.
    async fn send_packet(&self, tx: &TransactionDescriptor) -> Result<String, BridgeError>;
}

/// Builds a [`BridgeChain`] bound to a wallet's signer.
///
/// Connecting may touch the network, so a failure here concerns only the
/// wallet being connected.
#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn connect(&self, wallet: &WalletRecord) -> Result<Box<dyn BridgeChain>, BridgeError>;
}

/// Off-chain indexer correlating source transactions with packets.
#[async_trait]
pub trait PacketIndexer: Send + Sync {
    /// One lookup. `Ok(None)` means the indexer has not seen the transaction yet.
    async fn packet_hash(&self, tx_hash: &str) -> Result<Option<String>, BridgeError>;
}
