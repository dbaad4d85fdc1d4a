// filepath: src/blockchain/bridge/transfer.rs
use tracing::{error, info, warn};

use crate::blockchain::bridge::relay::poll_packet_hash;
use crate::blockchain::bridge::{Confirmation, PacketStatus, Route, TransactionDescriptor};
use crate::blockchain::traits::{BridgeChain, PacketIndexer};
use crate::core::config::AppConfig;
use crate::core::errors::BridgeError;
use crate::core::wallet_info::WalletRecord;
use crate::tools::async_support::Clock;
use crate::utils::{explorer_link, normalize_tx_hash};

/// Shared, read-only collaborators for one run.
#[derive(Clone, Copy)]
pub struct TransferContext<'a> {
    pub config: &'a AppConfig,
    pub indexer: &'a dyn PacketIndexer,
    pub clock: &'a dyn Clock,
}

/// Result of the balance/allowance pre-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowanceCheck {
    /// Funded and already approved.
    Ready,
    /// Funded; an unlimited approval was just confirmed.
    Approved { tx_hash: String },
    /// Zero token balance. Nothing was written.
    InsufficientBalance,
}

/// What happened to one wallet on one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletOutcome {
    Completed { confirmations: Vec<Confirmation>, approval: Option<String> },
    Skipped { reason: String },
    InsufficientFunds,
    /// Aborted mid-run. `confirmations` holds whatever went through before.
    Failed { confirmations: Vec<Confirmation>, error: String },
}

impl WalletOutcome {
    pub fn confirmations(&self) -> &[Confirmation] {
        match self {
            WalletOutcome::Completed { confirmations, .. }
            | WalletOutcome::Failed { confirmations, .. } => confirmations,
            _ => &[],
        }
    }

    /// Confirmed sends the indexer never correlated.
    pub fn pending(&self) -> usize {
        self.confirmations()
            .iter()
            .filter(|c| matches!(c.status, PacketStatus::Pending { .. }))
            .count()
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, WalletOutcome::Completed { .. })
    }
}

/// Make sure the bridge contract may pull the wallet's tokens.
///
/// Reads the balance first; an empty wallet stops here without touching the
/// allowance. A zero allowance is raised to `U256::MAX`, followed by the
/// post-approval settle delay.
pub async fn ensure_allowance(
    chain: &dyn BridgeChain,
    ctx: &TransferContext<'_>,
) -> Result<AllowanceCheck, BridgeError> {
    let bridge = &ctx.config.bridge;
    let owner = chain.address();

    let balance = chain.token_balance(bridge.token_address).await?;
    if balance.is_zero() {
        warn!(
            owner = ?owner,
            "No {} balance. Get test tokens at {}",
            bridge.token_symbol, bridge.faucet_url
        );
        return Ok(AllowanceCheck::InsufficientBalance);
    }
    info!(owner = ?owner, balance = %balance, "{} balance", bridge.token_symbol);

    let allowance = chain
        .token_allowance(bridge.token_address, bridge.contract_address)
        .await?;
    if !allowance.is_zero() {
        info!(owner = ?owner, "{} already approved", bridge.token_symbol);
        return Ok(AllowanceCheck::Ready);
    }

    info!(owner = ?owner, spender = ?bridge.contract_address, "Approving {}", bridge.token_symbol);
    let tx_hash = chain
        .approve_max(bridge.token_address, bridge.contract_address)
        .await?;
    info!(
        "Approval confirmed: {}",
        explorer_link(&ctx.config.network.explorer_tx_url, &tx_hash)
    );
    ctx.clock.sleep(ctx.config.timing.post_approve_delay()).await;

    Ok(AllowanceCheck::Approved { tx_hash })
}

/// Run `count` bridge transfers for one wallet on one route.
///
/// Any failure stops this wallet's remaining iterations; the caller moves on
/// to the next wallet.
pub async fn run_wallet(
    ctx: &TransferContext<'_>,
    chain: &dyn BridgeChain,
    wallet: &WalletRecord,
    route: Route,
    count: u32,
) -> WalletOutcome {
    let instruction = match route.instruction(wallet) {
        Ok(instruction) => instruction,
        Err(e) => {
            warn!(wallet = %wallet.name, route = %route, "Skipping wallet: {}", e);
            return WalletOutcome::Skipped { reason: e.to_string() };
        }
    };

    let approval = match ensure_allowance(chain, ctx).await {
        Ok(AllowanceCheck::Ready) => None,
        Ok(AllowanceCheck::Approved { tx_hash }) => Some(tx_hash),
        Ok(AllowanceCheck::InsufficientBalance) => return WalletOutcome::InsufficientFunds,
        Err(e) => {
            error!(wallet = %wallet.name, "Allowance check failed: {}", e);
            return WalletOutcome::Failed { confirmations: Vec::new(), error: e.to_string() };
        }
    };

    let mut confirmations = Vec::new();
    for n in 1..=count {
        let descriptor = TransactionDescriptor::build(
            ctx.config.bridge.contract_address,
            route,
            wallet,
            instruction.clone(),
            ctx.clock.now(),
        );

        info!(wallet = %wallet.name, route = %route, "Sending transaction {}/{}", n, count);
        let tx_hash = match chain.send_packet(&descriptor).await {
            Ok(hash) => normalize_tx_hash(&hash),
            Err(e) => {
                error!(wallet = %wallet.name, "Transaction {}/{} failed: {}", n, count, e);
                return WalletOutcome::Failed { confirmations, error: e.to_string() };
            }
        };
        info!(
            wallet = %wallet.name,
            "Transaction confirmed: {}",
            explorer_link(&ctx.config.network.explorer_tx_url, &tx_hash)
        );
        ctx.clock.sleep(ctx.config.timing.post_send_delay()).await;

        let confirmation =
            poll_packet_hash(ctx.indexer, ctx.clock, &tx_hash, &ctx.config.indexer.poll_policy())
                .await;
        match &confirmation.status {
            PacketStatus::Indexed { packet_hash } => info!(
                wallet = %wallet.name,
                "Packet: {}",
                explorer_link(&ctx.config.indexer.explorer_packet_url, packet_hash)
            ),
            PacketStatus::Pending { attempts } => warn!(
                wallet = %wallet.name,
                tx_hash = %tx_hash,
                "Confirmation pending after {} indexer attempts",
                attempts
            ),
        }
        confirmations.push(confirmation);
    }

    WalletOutcome::Completed { confirmations, approval }
}
