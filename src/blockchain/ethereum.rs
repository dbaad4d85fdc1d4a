use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    prelude::{abigen, JsonRpcClient},
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, TransactionReceipt, H256, U256, U64},
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

use super::bridge::TransactionDescriptor;
use super::traits::{BridgeChain, ChainConnector};
use crate::core::config::NetworkConfig;
use crate::core::errors::BridgeError;
use crate::core::wallet_info::WalletRecord;

mod bindings {
    use super::abigen;

    abigen!(
        Erc20Token,
        r#"[
            function balanceOf(address account) external view returns (uint256)
            function allowance(address owner, address spender) external view returns (uint256)
            function approve(address spender, uint256 value) external returns (bool)
        ]"#
    );

    abigen!(
        Ucs03Zkgm,
        r#"[
            struct Instruction { uint8 version; uint8 opcode; bytes operand; }
            function send(uint32 channelId, uint64 timeoutHeight, uint64 timeoutTimestamp, bytes32 salt, Instruction calldata instruction) external
        ]"#
    );
}

use bindings::{Erc20Token, Ucs03Zkgm};

/// Hands out signer-bound clients sharing one RPC provider.
#[derive(Clone)]
pub struct EthereumConnector<P: JsonRpcClient + Clone = Http> {
    provider: Provider<P>,
    chain_id: u64,
}

impl EthereumConnector<Http> {
    /// Build a provider for the configured RPC. Nothing is sent until a wallet connects.
    pub fn new(network: &NetworkConfig) -> Result<Self, BridgeError> {
        let rpc_url_clean = network.rpc_url.trim();
        let parsed_url = reqwest::Url::parse(rpc_url_clean).map_err(|e| {
            BridgeError::ConfigError(format!(
                "Invalid RPC URL '{}': {}. Please check config.toml or SEPOLIA_RPC_URL.",
                rpc_url_clean, e
            ))
        })?;

        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(30));
        if let Ok(proxy) = std::env::var("HTTPS_PROXY").or_else(|_| std::env::var("HTTP_PROXY")) {
            if let Ok(p) = reqwest::Proxy::all(proxy) {
                builder = builder.proxy(p);
            }
        }
        let client = builder
            .build()
            .map_err(|e| BridgeError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

        info!("Using {} RPC: {}", network.name, parsed_url);
        let provider = Provider::new(Http::new_with_client(parsed_url, client));
        Ok(Self { provider, chain_id: network.chain_id })
    }
}

impl<P: JsonRpcClient + Clone> EthereumConnector<P> {
    /// Wrap an existing provider.
    pub fn new_with_provider(provider: Provider<P>, chain_id: u64) -> Self {
        Self { provider, chain_id }
    }

    /// Chain id the RPC is expected to serve.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Ask the RPC for its chain id and compare with the configured one.
    pub async fn verify_chain(&self) -> Result<(), BridgeError> {
        let served = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| BridgeError::NetworkError(format!("Failed to get chain ID: {}", e)))?
            .as_u64();
        if served != self.chain_id {
            return Err(BridgeError::ConfigError(format!(
                "RPC serves chain {} but {} is expected",
                served, self.chain_id
            )));
        }
        debug!(chain_id = served, "RPC chain verified");
        Ok(())
    }
}

#[async_trait]
impl<P> ChainConnector for EthereumConnector<P>
where
    P: JsonRpcClient + Clone + 'static,
{
    async fn connect(&self, wallet: &WalletRecord) -> Result<Box<dyn BridgeChain>, BridgeError> {
        let signer = wallet.signer(self.chain_id)?;
        self.verify_chain().await?;
        Ok(Box::new(EthereumClient::new(self.provider.clone(), signer)))
    }
}

/// A wallet's view of the source chain.
pub struct EthereumClient<P: JsonRpcClient = Http> {
    client: Arc<SignerMiddleware<Provider<P>, LocalWallet>>,
    address: Address,
}

impl<P: JsonRpcClient + 'static> EthereumClient<P> {
    pub fn new(provider: Provider<P>, signer: LocalWallet) -> Self {
        let address = signer.address();
        let client = Arc::new(SignerMiddleware::new(provider, signer));
        Self { client, address }
    }
}

fn tx_hash_hex(hash: &H256) -> String {
    format!("0x{}", hex::encode(hash.as_bytes()))
}

/// Require a mined, successful receipt.
fn check_receipt(
    receipt: Option<TransactionReceipt>,
    sent: H256,
) -> Result<TransactionReceipt, String> {
    let receipt = receipt.ok_or_else(|| format!("{} dropped before confirmation", tx_hash_hex(&sent)))?;
    if receipt.status != Some(U64::from(1)) {
        return Err(format!("{} reverted", tx_hash_hex(&receipt.transaction_hash)));
    }
    Ok(receipt)
}

#[async_trait]
impl<P> BridgeChain for EthereumClient<P>
where
    P: JsonRpcClient + 'static,
{
    fn address(&self) -> Address {
        self.address
    }

    async fn token_balance(&self, token: Address) -> Result<U256, BridgeError> {
        debug!(token = ?token, owner = ?self.address, "balanceOf");
        Erc20Token::new(token, self.client.clone())
            .balance_of(self.address)
            .call()
            .await
            .map_err(|e| BridgeError::BlockchainError(format!("balanceOf failed: {}", e)))
    }

    async fn token_allowance(&self, token: Address, spender: Address) -> Result<U256, BridgeError> {
        debug!(token = ?token, spender = ?spender, "allowance");
        Erc20Token::new(token, self.client.clone())
            .allowance(self.address, spender)
            .call()
            .await
            .map_err(|e| BridgeError::BlockchainError(format!("allowance failed: {}", e)))
    }

    async fn approve_max(&self, token: Address, spender: Address) -> Result<String, BridgeError> {
        let contract = Erc20Token::new(token, self.client.clone());
        let call = contract.approve(spender, U256::MAX);
        let pending = call
            .send()
            .await
            .map_err(|e| BridgeError::ApprovalFailed(e.to_string()))?;
        let sent = *pending;
        debug!(tx_hash = %tx_hash_hex(&sent), "approve sent, waiting for 1 confirmation");

        let receipt = pending
            .confirmations(1)
            .await
            .map_err(|e| BridgeError::ApprovalFailed(e.to_string()))?;
        let receipt = check_receipt(receipt, sent).map_err(BridgeError::ApprovalFailed)?;
        Ok(tx_hash_hex(&receipt.transaction_hash))
    }

    async fn send_packet(&self, tx: &TransactionDescriptor) -> Result<String, BridgeError> {
        let contract = Ucs03Zkgm::new(tx.contract, self.client.clone());
        let instruction = bindings::Instruction {
            version: tx.instruction.version,
            opcode: tx.instruction.opcode,
            operand: tx.instruction.operand.clone(),
        };
        let call = contract.send(
            tx.channel_id,
            tx.timeout_height,
            tx.timeout_timestamp,
            tx.salt,
            instruction,
        );
        let pending = call
            .send()
            .await
            .map_err(|e| BridgeError::TransactionFailed(e.to_string()))?;
        let sent = *pending;
        debug!(tx_hash = %tx_hash_hex(&sent), "send submitted, waiting for 1 confirmation");

        let receipt = pending
            .confirmations(1)
            .await
            .map_err(|e| BridgeError::TransactionFailed(e.to_string()))?;
        let receipt = check_receipt(receipt, sent).map_err(BridgeError::TransactionFailed)?;
        Ok(tx_hash_hex(&receipt.transaction_hash))
    }
}
