pub mod abi;
pub mod config;
pub mod errors;
pub mod wallet_info;

pub use config::AppConfig;
pub use errors::BridgeError;
pub use wallet_info::{WalletFile, WalletRecord, WalletSelection};
