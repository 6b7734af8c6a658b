use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use shared::domain::{NetworkConfig, WalletAdapter};
use tracing::info;
use wallet_session::SessionController;

mod actions;
mod config;
mod stub;

use config::load_settings;
use stub::{ScriptedSelectorFactory, ScriptedWallet, ScriptedWalletProvider};

#[derive(Parser, Debug)]
struct Args {
    /// Account the scripted wallet reports as signed in.
    #[arg(long, default_value = "alice.testnet")]
    account_id: String,
    /// Pretend the account already holds a storage registration with the
    /// wrapped-token contract.
    #[arg(long)]
    storage_registered: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = load_settings();

    let wallet = ScriptedWallet::new(args.account_id.as_str().into(), args.storage_registered);
    let provider = ScriptedWalletProvider::new();
    let factory = ScriptedSelectorFactory::new(Arc::clone(&wallet), Arc::clone(&provider));

    let network = NetworkConfig {
        network_id: settings.network_id.clone(),
        contract_id: settings.contract_id.clone(),
        wallets: vec![WalletAdapter {
            id: "sender".into(),
            icon_url: "assets/sender-icon.png".into(),
        }],
    };

    let controller = SessionController::new(network, provider);
    controller.initialize(&factory).await?;
    controller.connect().await?;

    // Give the accounts subscription a beat to adopt the session.
    tokio::time::sleep(Duration::from_millis(50)).await;
    info!(account_id = ?controller.account_id().await, "session established");

    actions::say_hi(&controller, &settings.contract_id).await?;
    let the_last_one = actions::who_said_hi(&controller, &settings.contract_id).await?;
    actions::transfer_near(&controller, &settings.receiver_id).await?;
    actions::storage_deposit(&controller, &settings.wnear_contract_id).await?;
    actions::swap_near(&controller, &settings.wnear_contract_id).await?;
    actions::transfer_wnear(&controller, &settings.wnear_contract_id, &settings.receiver_id)
        .await?;
    actions::multiple_actions(&controller, &settings.wnear_contract_id, &settings.receiver_id)
        .await?;
    actions::multiple_transactions(&controller, &settings.wnear_contract_id, &settings.receiver_id)
        .await?;

    info!(%the_last_one, "who is the last one that said hi");

    actions::sign_out(&controller).await?;
    controller.shutdown().await;
    Ok(())
}
