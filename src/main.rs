// src/main.rs
//! Union bridge bot entry point.
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use union_bridge_bot::application::{BridgeRunner, RunPlan};
use union_bridge_bot::blockchain::bridge::GraphqlIndexer;
use union_bridge_bot::blockchain::ethereum::EthereumConnector;
use union_bridge_bot::cli::{
    parse_route_choice, parse_transaction_count, parse_wallet_selection, Cli, Prompter,
};
use union_bridge_bot::core::config::AppConfig;
use union_bridge_bot::core::wallet_info::{resolve_wallets, WalletFile};
use union_bridge_bot::tools::TokioClock;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    info!("Starting Union bridge bot v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = &cli.wallet_file {
        config.wallet_file = path.clone();
    }

    let wallet_file = match WalletFile::load(&config.wallet_file) {
        Ok(file) => file,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut prompter = Prompter::stdio();
    let selection = match &cli.wallets {
        Some(input) => parse_wallet_selection(input, wallet_file.wallets.len()),
        None => prompter.select_wallets(&wallet_file.names())?,
    };
    let wallets = match resolve_wallets(&wallet_file, &selection) {
        Ok(wallets) => wallets,
        Err(e) if e.is_fatal() => {
            error!("{}", e);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    let transaction_count = match &cli.count {
        Some(input) => parse_transaction_count(input),
        None => prompter.transaction_count()?,
    };
    let routes = match &cli.route {
        Some(input) => parse_route_choice(input),
        None => prompter.select_routes()?,
    };

    info!(
        "Running {} transaction(s) for {} wallet(s) on {} route(s)",
        transaction_count,
        wallets.len(),
        routes.len()
    );

    // Malformed URLs would fail every wallet; the RPC itself is first contacted per wallet.
    let (connector, indexer) =
        match (EthereumConnector::new(&config.network), GraphqlIndexer::new(&config.indexer)) {
            (Ok(connector), Ok(indexer)) => (connector, indexer),
            (Err(e), _) | (_, Err(e)) => {
                error!("{}", e);
                std::process::exit(1);
            }
        };
    let runner =
        BridgeRunner::new(config, Arc::new(connector), Arc::new(indexer), Arc::new(TokioClock));

    let report = runner.run(&RunPlan { wallets, transaction_count, routes }).await;
    info!("Done: {}", report.summary());

    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
