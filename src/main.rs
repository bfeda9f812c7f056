//! CLI driver for the candymint engine.
//!
//! `candymint status` refreshes and prints the derived view; `candymint mint`
//! runs one complete mint attempt and reports its classified outcome.

use anyhow::{bail, Context, Result};
use candymint::clock::{Clock, SystemClock};
use candymint::config::EngineConfig;
use candymint::engine::presentation::{
    explorer_token_url, format_price, NATIVE_DECIMALS, NATIVE_LABEL,
};
use candymint::gateway::{LedgerGateway, RpcGateway};
use candymint::signer::{KeypairSigner, TransactionSigner};
use candymint::{MintEngine, Outcome};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let command = std::env::args().nth(1).unwrap_or_else(|| "status".to_string());

    let config = EngineConfig::load("candymint.toml");
    let candy_machine_id: Pubkey = config
        .candy_machine_id
        .parse()
        .context("invalid candy_machine_id in configuration")?;

    let gateway: Arc<dyn LedgerGateway> = Arc::new(RpcGateway::new(config.rpc_url.clone()));
    let signer: Option<Arc<dyn TransactionSigner>> = if config.keypair_path.is_empty() {
        None
    } else {
        Some(Arc::new(KeypairSigner::from_file(&config.keypair_path)?))
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let cluster = config.cluster;
    let token_decimals = config.payment_token_decimals;
    let token_label = config.payment_token_label.clone();

    let engine = MintEngine::new(candy_machine_id, config, gateway, signer, clock);

    match command.as_str() {
        "status" => {
            let view = engine.refresh().await?;
            let presentation = engine.presentation_state().await;

            let (decimals, label) = if engine.uses_token_payment().await {
                (token_decimals, token_label.as_str())
            } else {
                (NATIVE_DECIMALS, NATIVE_LABEL)
            };

            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "view": view,
                    "presentation": presentation,
                }))?
            );
            println!("Price: {}", format_price(view.effective_price, decimals, label));

            if engine.buyer().is_some() {
                let balance = engine.wallet_balance().await?;
                println!(
                    "Wallet balance: {}",
                    format_price(balance, NATIVE_DECIMALS, NATIVE_LABEL)
                );
            }
        }
        "mint" => {
            engine.refresh().await?;
            info!("Starting mint attempt against {}", candy_machine_id);
            let outcome = engine.attempt_mint().await?;
            println!("{}", outcome.message());
            if let Outcome::Success { mint, .. } = &outcome {
                println!("View on explorer: {}", explorer_token_url(cluster, mint));
            }
        }
        other => bail!("unknown command: {other} (expected `status` or `mint`)"),
    }

    Ok(())
}
