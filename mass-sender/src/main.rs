mod input;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use url::Url;
use ton_client_util::app_config::AppConfig;
use ton_contract::message::{WalletMessage, IGNORE_ERRORS, PAY_GAS_SEPARATELY};
use ton_contract::mnemonic::Mnemonic;
use ton_contract::send::WalletSender;
use ton_contract::wallet::WalletV4R2;
use ton_contract::TonContract;
use ton_liteserver_client::api::LiteServerApi;
use ton_types::address::Address;
use ton_types::coins::Coins;
use ton_types::message::InternalMessage;
use crate::input::Receiver;

const DEFAULT_CONFIG_URL: &str = "https://ton.org/global.config.json";
const EXPLORER_TX_URL: &str = "https://tonscan.org/tx/";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(long, default_value = "phrase.txt")]
    phrase: PathBuf,
    #[clap(long, default_value = "receiver.txt")]
    receivers: PathBuf,
    #[clap(long)]
    config_url: Option<Url>,
    #[clap(long)]
    config_path: Option<PathBuf>,
    #[clap(long, value_parser = humantime::parse_duration, default_value = "180s")]
    timeout: Duration,
    #[clap(long, default_value = "3000000")]
    min_balance: u128,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let api = connect(args.config_url, args.config_path).await
        .inspect_err(|error| tracing::error!(error = ?error, "Failed to connect to mainnet"))?;

    let words = input::read_phrase(&args.phrase).await
        .inspect_err(|error| tracing::error!(error = ?error, "Failed to read seed phrase from file"))?;

    let wallet = Mnemonic::from_words(&words, None)
        .and_then(|mnemonic| WalletV4R2::from_key(mnemonic.to_key_pair()))
        .inspect_err(|error| tracing::error!(error = ?error, "Failed to initialize wallet"))?;

    tracing::info!(address = %wallet.address(), "Wallet address");

    let sender = WalletSender::new(api.clone(), wallet);
    let balance = current_balance(&api, sender.address()).await
        .inspect_err(|error| tracing::error!(error = ?error, "{}", error))?;

    tracing::info!(balance = %balance, "Total balance of sender's wallet");

    println!("Note: This bot only sends to 4 addresses at the same time.");
    let receivers = input::read_receivers(&args.receivers).await
        .inspect_err(|error| tracing::error!(error = ?error, "Failed to read receivers from file"))?;

    if balance < Coins::from_nano(args.min_balance) {
        tracing::warn!(balance = %balance, "Not enough balance");

        return Ok(());
    }

    let messages: Vec<WalletMessage> = receivers.iter().map(to_wallet_message).collect();

    tracing::info!("Sending transaction and waiting for confirmation...");

    let tx_hash = sender.send_many_wait_tx_hash(&messages, args.timeout).await
        .inspect_err(|error| tracing::error!(error = ?error, "Transfer failed"))?;

    tracing::info!(
        hash = %STANDARD.encode(tx_hash),
        explorer_link = %format!("{}{}", EXPLORER_TX_URL, URL_SAFE.encode(tx_hash)),
        "Transaction sent"
    );

    for message in &messages {
        tracing::info!(
            address = %message.message.destination,
            amount = %message.message.value,
            "Transaction sent"
        );
    }

    match current_balance(&api, sender.address()).await {
        Ok(new_balance) => tracing::info!(new_balance = %new_balance, "New balance of sender's wallet after transactions"),
        Err(error) => tracing::error!(error = ?error, "Failed to get new balance after transactions"),
    }

    Ok(())
}

async fn connect(config_url: Option<Url>, config_path: Option<PathBuf>) -> anyhow::Result<LiteServerApi> {
    let default_url = Url::from_str(DEFAULT_CONFIG_URL)?;
    let config = AppConfig::from_env()?
        .merge(config_url, config_path)
        .load_ton_config(&default_url)
        .await?;

    LiteServerApi::connect(&config).await
}

#[derive(Debug, Error)]
enum BalanceError {
    #[error("Failed to get current masterchain info")]
    Head(#[source] anyhow::Error),
    #[error("Failed to get balance")]
    Account(#[source] anyhow::Error),
}

/// Balance at a fresh masterchain head, zero when the account doesn't exist.
async fn current_balance(api: &LiteServerApi, address: Address) -> Result<Coins, BalanceError> {
    let head = api.get_masterchain_info().await.map_err(BalanceError::Head)?;
    let account = TonContract::new(api.clone(), address)
        .account(&head.last)
        .await
        .map_err(|e| BalanceError::Account(e.into()))?;

    Ok(account.map(|account| account.balance).unwrap_or_default())
}

fn to_wallet_message(receiver: &Receiver) -> WalletMessage {
    WalletMessage::new(PAY_GAS_SEPARATELY | IGNORE_ERRORS, InternalMessage {
        ihr_disabled: true,
        bounce: receiver.address.bounceable,
        destination: receiver.address,
        value: receiver.amount,
        body: None,
    })
}
