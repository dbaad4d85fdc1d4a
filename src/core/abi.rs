// src/core/abi.rs
use chrono::{DateTime, Utc};
use ethers::types::{Address, U256};
use sha3::{Digest, Keccak256};

/// Packet timeout window: one day in nanoseconds.
pub const TIMEOUT_WINDOW_NS: u64 = 86_400_000_000_000;

/// Encode a uint256 into a 32-byte big-endian ABI word.
pub fn abi_word_uint256(value: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

/// `abi.encodePacked(address, uint256)`: 20 address bytes followed by a 32-byte word.
pub fn encode_packed_address_uint256(address: &Address, value: U256) -> Vec<u8> {
    let mut out = Vec::with_capacity(20 + 32);
    out.extend_from_slice(address.as_bytes());
    out.extend_from_slice(&abi_word_uint256(value));
    out
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut keccak = Keccak256::new();
    keccak.update(data);
    keccak.finalize().into()
}

/// Per-submission salt: `keccak256(abi.encodePacked(sender, unixSeconds))`.
pub fn derive_salt(sender: &Address, unix_seconds: u64) -> [u8; 32] {
    keccak256(&encode_packed_address_uint256(sender, U256::from(unix_seconds)))
}

/// Timeout timestamp for a packet sent at `now`, in nanoseconds.
///
/// The clock is read at millisecond precision and scaled, so the result is
/// always a whole number of milliseconds.
pub fn timeout_timestamp_ns(now: DateTime<Utc>) -> u64 {
    let now_ns = (now.timestamp_millis().max(0) as u64).saturating_mul(1_000_000);
    now_ns.saturating_add(TIMEOUT_WINDOW_NS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sender() -> Address {
        "0x1111111111111111111111111111111111111111".parse().unwrap()
    }

    #[test]
    fn test_abi_word_uint256() {
        let word = abi_word_uint256(U256::from(42u64));
        assert!(word[..31].iter().all(|&b| b == 0));
        assert_eq!(word[31], 42);
        let max = abi_word_uint256(U256::MAX);
        assert!(max.iter().all(|&b| b == 0xff));
    }

    #[test]
    fn test_encode_packed_layout() {
        let packed = encode_packed_address_uint256(&sender(), U256::from(0x0102u64));
        assert_eq!(packed.len(), 52);
        assert!(packed[..20].iter().all(|&b| b == 0x11));
        assert!(packed[20..50].iter().all(|&b| b == 0));
        assert_eq!(&packed[50..], &[0x01, 0x02]);
    }

    #[test]
    fn test_keccak_known_vector() {
        // keccak256("") is a well known constant
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_derive_salt() {
        let salt = derive_salt(&sender(), 1_700_000_000);
        let expected = keccak256(&encode_packed_address_uint256(&sender(), U256::from(1_700_000_000u64)));
        assert_eq!(salt, expected);
        assert_ne!(salt, derive_salt(&sender(), 1_700_000_001));
        assert_ne!(salt, derive_salt(&Address::zero(), 1_700_000_000));
    }

    #[test]
    fn test_timeout_timestamp_is_one_day_ahead() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let timeout = timeout_timestamp_ns(now);
        assert_eq!(timeout, 1_700_000_000_123 * 1_000_000 + TIMEOUT_WINDOW_NS);
        assert_eq!(timeout % 1_000_000, 0);
    }
}
