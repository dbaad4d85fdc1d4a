// filepath: src/blockchain/bridge/mock.rs
//! In-memory chain and indexer doubles for exercising runs without RPC or HTTP.

use async_trait::async_trait;
use ethers::types::{Address, U256};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::blockchain::bridge::TransactionDescriptor;
use crate::blockchain::traits::{BridgeChain, ChainConnector, PacketIndexer};
use crate::core::errors::BridgeError;
use crate::core::wallet_info::WalletRecord;

#[derive(Debug, Default)]
struct MockChainState {
    balance: U256,
    allowance: U256,
    fail_approve: bool,
    fail_send_at: Option<usize>,
    approvals: Vec<Address>,
    sends: Vec<TransactionDescriptor>,
}

/// Token + bridge contract for one wallet. Clones share state.
#[derive(Debug, Clone)]
pub struct MockChain {
    address: Address,
    state: Arc<Mutex<MockChainState>>,
}

impl MockChain {
    /// Funded wallet with no allowance yet.
    pub fn new(address: Address) -> Self {
        let state = MockChainState { balance: U256::from(1_000_000u64), ..Default::default() };
        Self { address, state: Arc::new(Mutex::new(state)) }
    }

    pub fn with_balance(self, balance: U256) -> Self {
        self.update(|s| s.balance = balance);
        self
    }

    pub fn with_allowance(self, allowance: U256) -> Self {
        self.update(|s| s.allowance = allowance);
        self
    }

    pub fn failing_approve(self) -> Self {
        self.update(|s| s.fail_approve = true);
        self
    }

    /// Make the `n`-th send (1-based) revert.
    pub fn failing_send_at(self, n: usize) -> Self {
        self.update(|s| s.fail_send_at = Some(n));
        self
    }

    /// Spenders approved so far.
    pub fn approvals(&self) -> Vec<Address> {
        self.read(|s| s.approvals.clone())
    }

    /// Successfully submitted descriptors.
    pub fn sends(&self) -> Vec<TransactionDescriptor> {
        self.read(|s| s.sends.clone())
    }

    /// Approvals plus sends.
    pub fn writes(&self) -> usize {
        self.read(|s| s.approvals.len() + s.sends.len())
    }

    fn update(&self, f: impl FnOnce(&mut MockChainState)) {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
    }

    fn read<T: Default>(&self, f: impl FnOnce(&MockChainState) -> T) -> T {
        self.state.lock().map(|s| f(&s)).unwrap_or_default()
    }
}

fn mock_hash(tag: u8, n: usize) -> String {
    format!("0x{:02x}{:062x}", tag, n)
}

#[async_trait]
impl BridgeChain for MockChain {
    fn address(&self) -> Address {
        self.address
    }

    async fn token_balance(&self, _token: Address) -> Result<U256, BridgeError> {
        Ok(self.read(|s| s.balance))
    }

    async fn token_allowance(&self, _token: Address, _spender: Address) -> Result<U256, BridgeError> {
        Ok(self.read(|s| s.allowance))
    }

    async fn approve_max(&self, _token: Address, spender: Address) -> Result<String, BridgeError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| BridgeError::ApprovalFailed("mock state poisoned".into()))?;
        if state.fail_approve {
            return Err(BridgeError::ApprovalFailed("execution reverted".into()));
        }
        state.approvals.push(spender);
        state.allowance = U256::MAX;
        Ok(mock_hash(0xa0, state.approvals.len()))
    }

    async fn send_packet(&self, tx: &TransactionDescriptor) -> Result<String, BridgeError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| BridgeError::TransactionFailed("mock state poisoned".into()))?;
        let attempt = state.sends.len() + 1;
        if state.fail_send_at == Some(attempt) {
            return Err(BridgeError::TransactionFailed("execution reverted".into()));
        }
        state.sends.push(tx.clone());
        Ok(mock_hash(0x5e, attempt))
    }
}

/// Hands out pre-registered [`MockChain`]s by wallet address.
#[derive(Debug, Default, Clone)]
pub struct MockConnector {
    chains: HashMap<Address, MockChain>,
    unreachable: Vec<Address>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, chain: MockChain) -> &mut Self {
        self.chains.insert(chain.address, chain);
        self
    }

    /// Connecting `address` fails as if the RPC were down.
    pub fn register_unreachable(&mut self, address: Address) -> &mut Self {
        self.unreachable.push(address);
        self
    }
}

#[async_trait]
impl ChainConnector for MockConnector {
    async fn connect(&self, wallet: &WalletRecord) -> Result<Box<dyn BridgeChain>, BridgeError> {
        if self.unreachable.contains(&wallet.address) {
            return Err(BridgeError::NetworkError("connection refused".into()));
        }
        self.chains
            .get(&wallet.address)
            .cloned()
            .map(|c| Box::new(c) as Box<dyn BridgeChain>)
            .ok_or_else(|| {
                BridgeError::MissingWalletData(format!("no mock chain for {:?}", wallet.address))
            })
    }
}

/// Replays canned indexer answers, then falls back to a fixed answer.
#[derive(Debug, Default)]
pub struct ScriptedIndexer {
    answers: Mutex<VecDeque<Result<Option<String>, BridgeError>>>,
    fallback: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedIndexer {
    pub fn new(answers: Vec<Result<Option<String>, BridgeError>>) -> Self {
        Self { answers: Mutex::new(answers.into()), ..Default::default() }
    }

    /// Every lookup finds `packet_hash`.
    pub fn always(packet_hash: &str) -> Self {
        Self { fallback: Some(packet_hash.to_string()), ..Default::default() }
    }

    /// Every hash queried so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PacketIndexer for ScriptedIndexer {
    async fn packet_hash(&self, tx_hash: &str) -> Result<Option<String>, BridgeError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(tx_hash.to_string());
        }
        let next = self.answers.lock().ok().and_then(|mut a| a.pop_front());
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::bridge::{Instruction, TransactionDescriptor};
    use ethers::types::Bytes;

    fn descriptor() -> TransactionDescriptor {
        TransactionDescriptor {
            contract: Address::repeat_byte(0x5f),
            channel_id: 8,
            timeout_height: 0,
            timeout_timestamp: 1,
            salt: [0u8; 32],
            instruction: Instruction::fungible_asset_order(Bytes::from(vec![0u8; 32])),
        }
    }

    #[tokio::test]
    async fn approve_sets_max_allowance() {
        let chain = MockChain::new(Address::repeat_byte(1));
        let spender = Address::repeat_byte(2);
        assert_eq!(chain.token_allowance(Address::zero(), spender).await.unwrap(), U256::zero());
        let hash = chain.approve_max(Address::zero(), spender).await.unwrap();
        assert_eq!(hash.len(), 66);
        assert_eq!(chain.token_allowance(Address::zero(), spender).await.unwrap(), U256::MAX);
        assert_eq!(chain.approvals(), vec![spender]);
    }

    #[tokio::test]
    async fn send_failure_is_not_recorded() {
        let chain = MockChain::new(Address::repeat_byte(1)).failing_send_at(2);
        assert!(chain.send_packet(&descriptor()).await.is_ok());
        assert!(chain.send_packet(&descriptor()).await.is_err());
        assert_eq!(chain.sends().len(), 1);
        assert_eq!(chain.writes(), 1);
    }

    #[tokio::test]
    async fn scripted_indexer_falls_back() {
        let indexer = ScriptedIndexer::new(vec![Ok(None)]);
        assert_eq!(indexer.packet_hash("0x1").await.unwrap(), None);
        assert_eq!(indexer.packet_hash("0x2").await.unwrap(), None);
        let indexer = ScriptedIndexer::always("0xdead");
        assert_eq!(indexer.packet_hash("0x1").await.unwrap().as_deref(), Some("0xdead"));
        assert_eq!(indexer.queries(), vec!["0x1"]);
    }
}
