pub mod bridge;
pub mod ethereum;
pub mod traits;

pub use bridge::{Confirmation, PacketStatus, Route, TransactionDescriptor};
pub use traits::{BridgeChain, ChainConnector, PacketIndexer};
