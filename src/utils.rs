// src/utils.rs

/// Canonical `0x`-prefixed form of a transaction hash. Idempotent.
pub fn normalize_tx_hash(hash: &str) -> String {
    let trimmed = hash.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    format!("0x{}", body)
}

/// Append `id` to an explorer prefix, tolerating a missing trailing slash.
pub fn explorer_link(prefix: &str, id: &str) -> String {
    if prefix.ends_with('/') {
        format!("{}{}", prefix, id)
    } else {
        format!("{}/{}", prefix, id)
    }
}

/// Lower-case hex of an address without the `0x` prefix.
pub fn address_hex(address: &ethers::types::Address) -> String {
    hex::encode(address.as_bytes())
}
