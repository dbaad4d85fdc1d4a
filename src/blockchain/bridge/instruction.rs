// filepath: src/blockchain/bridge/instruction.rs
//! Pre-encoded UCS03 `FungibleAssetOrder` operands.
//!
//! The operands are opaque ABI blobs captured from the Union app. Only the
//! sender and recipient slots vary; everything else (token, amounts,
//! quote token, symbols) is fixed per route.

use ethers::types::{Address, Bytes};

use crate::core::errors::BridgeError;
use crate::utils::address_hex;

/// Instruction version understood by the zkgm contract.
pub const INSTRUCTION_VERSION: u8 = 0;
/// `OP_FUNGIBLE_ASSET_ORDER`
pub const OP_FUNGIBLE_ASSET_ORDER: u8 = 2;

/// Babylon recipients are bech32 `bbn1...` strings of exactly this many bytes;
/// the operand hard-codes the length prefix.
pub const BABYLON_ADDRESS_LEN: usize = 42;

const SENDER_SLOT: &str = "{sender}";
const RECIPIENT_SLOT: &str = "{recipient}";

const HOLESKY_OPERAND_TEMPLATE: &str = concat!(
    "0000000000000000000000000000000000000000000000000000000000000020",
    "0000000000000000000000000000000000000000000000000000000000000001",
    "0000000000000000000000000000000000000000000000000000000000000020",
    "0000000000000000000000000000000000000000000000000000000000000001",
    "0000000000000000000000000000000000000000000000000000000000000003",
    "0000000000000000000000000000000000000000000000000000000000000060",
    "00000000000000000000000000000000000000000000000000000000000002c0",
    "0000000000000000000000000000000000000000000000000000000000000140",
    "0000000000000000000000000000000000000000000000000000000000000180",
    "00000000000000000000000000000000000000000000000000000000000001c0",
    "0000000000000000000000000000000000000000000000000000000000000064",
    "0000000000000000000000000000000000000000000000000000000000000200",
    "0000000000000000000000000000000000000000000000000000000000000240",
    "0000000000000000000000000000000000000000000000000000000000000006",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000280",
    "0000000000000000000000000000000000000000000000000000000000000064",
    "0000000000000000000000000000000000000000000000000000000000000014",
    "{sender}",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "000000000000000000000014",
    "{sender}",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000141c7d4b196cb0c7b01d743fbc6116a902379c7238",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000045553444300000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000045553444300000000000000000000000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "00000000000000000000001457978bfe465ad9b1c0bf80f6c1539d300705ea50",
    "000000000000000000000000",
);

const BABYLON_OPERAND_TEMPLATE: &str = concat!(
    "0000000000000000000000000000000000000000000000000000000000000020",
    "0000000000000000000000000000000000000000000000000000000000000001",
    "0000000000000000000000000000000000000000000000000000000000000020",
    "0000000000000000000000000000000000000000000000000000000000000001",
    "0000000000000000000000000000000000000000000000000000000000000003",
    "0000000000000000000000000000000000000000000000000000000000000060",
    "0000000000000000000000000000000000000000000000000000000000000300",
    "0000000000000000000000000000000000000000000000000000000000000140",
    "0000000000000000000000000000000000000000000000000000000000000180",
    "00000000000000000000000000000000000000000000000000000000000001e0",
    "0000000000000000000000000000000000000000000000000000000000000064",
    "0000000000000000000000000000000000000000000000000000000000000220",
    "0000000000000000000000000000000000000000000000000000000000000260",
    "0000000000000000000000000000000000000000000000000000000000000006",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "00000000000000000000000000000000000000000000000000000000000002a0",
    "0000000000000000000000000000000000000000000000000000000000000064",
    "0000000000000000000000000000000000000000000000000000000000000014",
    "{sender}",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "00000000000000000000002a",
    "{recipient}",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "000000000000000000000000000000000000000000141c7d4b196cb0c7b01d74",
    "3fbc6116a902379c723800000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000455534443000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000000455534443000000000000",
    "0000000000000000000000000000000000000000000000000000000000000000",
    "0000000000000000000000000000000000000000003e62626e317a7372763233",
    "616b6b6778646e77756c3732736674677632786a74356b68736e743377776a68",
    "7030666668363833687a7035617135613068366e0000",
);

/// Operand for Sepolia -> Holesky: the sender receives on the other side.
pub fn holesky_operand(sender: &Address) -> Result<Bytes, BridgeError> {
    let sender_hex = address_hex(sender);
    decode_operand(&HOLESKY_OPERAND_TEMPLATE.replace(SENDER_SLOT, &sender_hex))
}

/// Operand for Sepolia -> Babylon, paying out to `recipient` (bech32).
pub fn babylon_operand(sender: &Address, recipient: &str) -> Result<Bytes, BridgeError> {
    if recipient.len() != BABYLON_ADDRESS_LEN || !recipient.starts_with("bbn1") {
        return Err(BridgeError::MissingWalletData(format!(
            "babylonAddress must be a {}-character bbn1 address, got {:?}",
            BABYLON_ADDRESS_LEN, recipient
        )));
    }
    let operand = BABYLON_OPERAND_TEMPLATE
        .replace(SENDER_SLOT, &address_hex(sender))
        .replace(RECIPIENT_SLOT, &hex::encode(recipient.as_bytes()));
    decode_operand(&operand)
}

fn decode_operand(hex_str: &str) -> Result<Bytes, BridgeError> {
    hex::decode(hex_str)
        .map(Bytes::from)
        .map_err(|e| BridgeError::ConfigError(format!("Malformed instruction operand: {}", e)))
}
