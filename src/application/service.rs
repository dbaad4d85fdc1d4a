//! Run orchestration: routes, then wallets, then transactions.

use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::blockchain::bridge::transfer::{run_wallet, TransferContext, WalletOutcome};
use crate::blockchain::bridge::Route;
use crate::blockchain::traits::{ChainConnector, PacketIndexer};
use crate::core::config::AppConfig;
use crate::core::wallet_info::WalletRecord;
use crate::tools::async_support::Clock;

/// Everything the operator chose for one run.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub wallets: Vec<WalletRecord>,
    pub transaction_count: u32,
    pub routes: Vec<Route>,
}

/// Outcome of one wallet on one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEntry {
    pub route: Route,
    pub wallet: String,
    pub outcome: WalletOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub entries: Vec<RunEntry>,
}

/// Counters over a [`RunReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub skipped: usize,
    pub insufficient_funds: usize,
    pub failed: usize,
    pub transactions: usize,
    pub pending: usize,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for entry in &self.entries {
            match &entry.outcome {
                WalletOutcome::Completed { .. } => summary.completed += 1,
                WalletOutcome::Skipped { .. } => summary.skipped += 1,
                WalletOutcome::InsufficientFunds => summary.insufficient_funds += 1,
                WalletOutcome::Failed { .. } => summary.failed += 1,
            }
            summary.transactions += entry.outcome.confirmations().len();
            summary.pending += entry.outcome.pending();
        }
        summary
    }

    pub fn for_route(&self, route: Route) -> impl Iterator<Item = &RunEntry> {
        self.entries.iter().filter(move |e| e.route == route)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} completed, {} skipped, {} without funds, {} failed; {} transactions ({} pending)",
            self.completed,
            self.skipped,
            self.insufficient_funds,
            self.failed,
            self.transactions,
            self.pending
        )
    }
}

/// Drives a [`RunPlan`] against injected chain, indexer and clock.
pub struct BridgeRunner {
    config: AppConfig,
    connector: Arc<dyn ChainConnector>,
    indexer: Arc<dyn PacketIndexer>,
    clock: Arc<dyn Clock>,
}

impl BridgeRunner {
    pub fn new(
        config: AppConfig,
        connector: Arc<dyn ChainConnector>,
        indexer: Arc<dyn PacketIndexer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { config, connector, indexer, clock }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run every route in plan order, each over every wallet in plan order.
    ///
    /// A wallet's failure, including an unreachable RPC, never stops the others.
    pub async fn run(&self, plan: &RunPlan) -> RunReport {
        let ctx = TransferContext {
            config: &self.config,
            indexer: self.indexer.as_ref(),
            clock: self.clock.as_ref(),
        };
        let mut report = RunReport::default();

        for &route in &plan.routes {
            info!(route = %route, channel = route.channel_id(), "Starting route");
            for wallet in &plan.wallets {
                info!(wallet = %wallet.name, address = ?wallet.address, route = %route, "Processing wallet");
                let outcome = match self.connector.connect(wallet).await {
                    Ok(chain) => {
                        run_wallet(&ctx, chain.as_ref(), wallet, route, plan.transaction_count).await
                    }
                    Err(e) if e.is_wallet_config() => {
                        warn!(wallet = %wallet.name, "Skipping wallet: {}", e);
                        WalletOutcome::Skipped { reason: e.to_string() }
                    }
                    Err(e) => {
                        error!(wallet = %wallet.name, "Could not connect: {}", e);
                        WalletOutcome::Failed { confirmations: Vec::new(), error: e.to_string() }
                    }
                };
                report.entries.push(RunEntry { route, wallet: wallet.name.clone(), outcome });
            }
            info!(route = %route, "Route finished");
        }

        report
    }
}
