//! tests/wallet_config_tests.rs
//!
//! Loading the wallet file and config from disk, then resolving the
//! operator's selection the way the binary does.

use pretty_assertions::assert_eq;
use serial_test::serial;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

use union_bridge_bot::cli::parse_wallet_selection;
use union_bridge_bot::core::config::AppConfig;
use union_bridge_bot::core::errors::BridgeError;
use union_bridge_bot::core::wallet_info::{resolve_wallets, WalletFile};

const ALICE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn write_wallets(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

#[test]
fn selection_skips_bad_keys_and_keeps_order() {
    let file = write_wallets(&format!(
        r#"{{"wallets": [
            {{"name": "broken", "privatekey": "not-a-key"}},
            {{"name": "alice", "privatekey": "{ALICE_KEY}"}},
            {{"name": "empty"}}
        ]}}"#
    ));
    let wallets = WalletFile::load(file.path()).unwrap();
    assert_eq!(wallets.names(), vec!["broken", "alice", "empty"]);

    let selection = parse_wallet_selection("3, 2, 1, 42", wallets.wallets.len());
    let records = resolve_wallets(&wallets, &selection).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "alice");
}

#[test]
fn nothing_usable_is_fatal() {
    let file = write_wallets(r#"{"wallets": [{"name": "broken", "privatekey": "0x12"}]}"#);
    let wallets = WalletFile::load(file.path()).unwrap();

    let err = resolve_wallets(&wallets, &parse_wallet_selection("0", 1)).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn malformed_wallet_file_is_config_error() {
    let file = write_wallets("{ wallets: ");
    let err = WalletFile::load(file.path()).unwrap_err();
    assert!(matches!(err, BridgeError::ConfigError(_)));

    let dir = TempDir::new().unwrap();
    let err = WalletFile::load(&dir.path().join("missing.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read wallet file"));
}

#[test]
#[serial]
fn config_path_env_is_used_without_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bridge.toml");
    std::fs::write(
        &path,
        r#"
wallet_file = "ops/wallets.json"

[timing]
post_send_delay_ms = 0
"#,
    )
    .unwrap();

    std::env::set_var("CONFIG_PATH", &path);
    let config = AppConfig::load(None);
    std::env::remove_var("CONFIG_PATH");

    let config = config.unwrap();
    assert_eq!(config.wallet_file, std::path::PathBuf::from("ops/wallets.json"));
    assert_eq!(config.timing.post_send_delay_ms, 0);
    assert_eq!(config.timing.post_approve_delay_ms, 3000);
}
