// src/blockchain/bridge/mod.rs

pub mod indexer;
pub mod instruction;
pub mod mock;
pub mod relay;
pub mod transfer;

use chrono::{DateTime, Utc};
use ethers::types::{Address, Bytes};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::abi::{derive_salt, timeout_timestamp_ns};
use crate::core::errors::BridgeError;
use crate::core::wallet_info::WalletRecord;

pub use indexer::GraphqlIndexer;
pub use relay::poll_packet_hash;
pub use transfer::{ensure_allowance, run_wallet, AllowanceCheck, TransferContext, WalletOutcome};

/// Supported bridge routes out of Sepolia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    SepoliaBabylon,
    SepoliaHolesky,
}

impl Route {
    /// Menu order; "all routes" runs them in this order.
    pub const ALL: [Route; 2] = [Route::SepoliaBabylon, Route::SepoliaHolesky];

    pub fn label(&self) -> &'static str {
        match self {
            Route::SepoliaBabylon => "Sepolia → Babylon",
            Route::SepoliaHolesky => "Sepolia → Holesky",
        }
    }

    /// Number shown in the route prompt.
    pub fn menu_key(&self) -> u32 {
        match self {
            Route::SepoliaBabylon => 1,
            Route::SepoliaHolesky => 2,
        }
    }

    pub fn from_menu_key(key: u32) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.menu_key() == key)
    }

    pub fn channel_id(&self) -> u32 {
        match self {
            Route::SepoliaBabylon => 7,
            Route::SepoliaHolesky => 8,
        }
    }

    /// Check that the wallet carries what this route needs.
    pub fn check_wallet(&self, wallet: &WalletRecord) -> Result<(), BridgeError> {
        match self {
            Route::SepoliaBabylon if wallet.babylon_address.is_none() => Err(
                BridgeError::MissingWalletData(format!("{} has no babylonAddress", wallet.name)),
            ),
            _ => Ok(()),
        }
    }

    /// Build the route's instruction for `wallet`.
    pub fn instruction(&self, wallet: &WalletRecord) -> Result<Instruction, BridgeError> {
        self.check_wallet(wallet)?;
        let operand = match self {
            Route::SepoliaHolesky => instruction::holesky_operand(&wallet.address)?,
            Route::SepoliaBabylon => {
                let recipient = wallet.babylon_address.as_deref().unwrap_or_default();
                instruction::babylon_operand(&wallet.address, recipient)?
            }
        };
        Ok(Instruction::fungible_asset_order(operand))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// UCS03 `Instruction { version, opcode, operand }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub version: u8,
    pub opcode: u8,
    pub operand: Bytes,
}

impl Instruction {
    pub fn fungible_asset_order(operand: Bytes) -> Self {
        Self {
            version: instruction::INSTRUCTION_VERSION,
            opcode: instruction::OP_FUNGIBLE_ASSET_ORDER,
            operand,
        }
    }
}

/// Arguments of one `send(channelId, timeoutHeight, timeoutTimestamp, salt, instruction)` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDescriptor {
    pub contract: Address,
    pub channel_id: u32,
    pub timeout_height: u64,
    pub timeout_timestamp: u64,
    pub salt: [u8; 32],
    pub instruction: Instruction,
}

impl TransactionDescriptor {
    /// Fresh descriptor for a submission at `now`.
    pub fn build(
        contract: Address,
        route: Route,
        wallet: &WalletRecord,
        instruction: Instruction,
        now: DateTime<Utc>,
    ) -> Self {
        let unix_seconds = now.timestamp().max(0) as u64;
        Self {
            contract,
            channel_id: route.channel_id(),
            timeout_height: 0,
            timeout_timestamp: timeout_timestamp_ns(now),
            salt: derive_salt(&wallet.address, unix_seconds),
            instruction,
        }
    }
}

/// Indexer-side fate of a submitted packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketStatus {
    /// The indexer correlated the transaction with this packet hash.
    Indexed { packet_hash: String },
    /// The poll budget ran out first; the packet may still show up later.
    Pending { attempts: u32 },
}

/// Submitted transaction hash and what the indexer said about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub tx_hash: String,
    pub status: PacketStatus,
}

impl Confirmation {
    pub fn packet_hash(&self) -> Option<&str> {
        match &self.status {
            PacketStatus::Indexed { packet_hash } => Some(packet_hash),
            PacketStatus::Pending { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::abi::TIMEOUT_WINDOW_NS;
    use crate::core::wallet_info::WalletEntry;
    use chrono::TimeZone;

    fn wallet(babylon: Option<&str>) -> WalletRecord {
        let entry = WalletEntry {
            name: Some("alice".into()),
            privatekey: Some(
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".into(),
            ),
            babylon_address: babylon.map(str::to_string),
        };
        WalletRecord::from_entry(&entry, 1).unwrap()
    }

    #[test]
    fn test_route_menu() {
        assert_eq!(Route::from_menu_key(1), Some(Route::SepoliaBabylon));
        assert_eq!(Route::from_menu_key(2), Some(Route::SepoliaHolesky));
        assert_eq!(Route::from_menu_key(3), None);
        assert_eq!(Route::SepoliaBabylon.channel_id(), 7);
        assert_eq!(Route::SepoliaHolesky.channel_id(), 8);
    }

    #[test]
    fn test_babylon_requires_recipient() {
        let err = Route::SepoliaBabylon.instruction(&wallet(None)).unwrap_err();
        assert!(err.is_wallet_config());
        assert!(Route::SepoliaHolesky.instruction(&wallet(None)).is_ok());
    }

    #[test]
    fn test_descriptor_build() {
        let w = wallet(None);
        let now = Utc.timestamp_millis_opt(1_746_000_000_500).unwrap();
        let instruction = Route::SepoliaHolesky.instruction(&w).unwrap();
        let contract = Address::repeat_byte(0x5f);
        let desc =
            TransactionDescriptor::build(contract, Route::SepoliaHolesky, &w, instruction, now);

        assert_eq!(desc.contract, contract);
        assert_eq!(desc.channel_id, 8);
        assert_eq!(desc.timeout_height, 0);
        assert_eq!(desc.timeout_timestamp, 1_746_000_000_500 * 1_000_000 + TIMEOUT_WINDOW_NS);
        assert_eq!(desc.salt, derive_salt(&w.address, 1_746_000_000));
        assert_eq!(desc.instruction.opcode, 2);
        assert_eq!(desc.instruction.version, 0);
    }

    #[test]
    fn test_confirmation_packet_hash() {
        let found = Confirmation {
            tx_hash: "0x01".into(),
            status: PacketStatus::Indexed { packet_hash: "0xdead".into() },
        };
        assert_eq!(found.packet_hash(), Some("0xdead"));
        let pending =
            Confirmation { tx_hash: "0x01".into(), status: PacketStatus::Pending { attempts: 50 } };
        assert_eq!(pending.packet_hash(), None);
    }
}
