mod input;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;
use ton_client_util::app_config::AppConfig;
use ton_contract::TonContract;
use ton_liteserver_client::api::LiteServerApi;
use ton_liteserver_client::tl::TonNodeBlockIdExt;
use ton_types::address::Address;

const DEFAULT_CONFIG_URL: &str = "https://tonutils.com/ls/free-mainnet-config.json";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(long, default_value = "address.txt")]
    input: PathBuf,
    #[clap(long)]
    config_url: Option<Url>,
    #[clap(long)]
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stdout)
        .init();

    let api = connect(args.config_url, args.config_path).await
        .inspect_err(|error| tracing::error!(error = ?error, "Failed to connect to mainnet"))?;

    let head = api.get_masterchain_info().await
        .inspect_err(|error| tracing::error!(error = ?error, "Failed to get current masterchain info"))?;

    mass_balance_check(&api, &head.last, &args.input).await
        .inspect_err(|error| tracing::error!(error = ?error, "Failed to do mass balance check"))?;

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

async fn mass_balance_check(api: &LiteServerApi, block: &TonNodeBlockIdExt, input: &Path) -> anyhow::Result<()> {
    let addresses = input::read_addresses(input).await?;

    tracing::info!("Checking balances...");

    for addr in addresses {
        let address = match Address::from_str(&addr) {
            Ok(address) => address,
            Err(error) => {
                tracing::error!(address = %addr, error = %error, "Failed to parse address");
                continue;
            }
        };

        let account = match TonContract::new(api.clone(), address).account(block).await {
            Ok(account) => account,
            Err(error) => {
                tracing::error!(address = %addr, error = %error, "Failed to get account");
                continue;
            }
        };

        let Some(account) = account else {
            tracing::error!(address = %addr, "Has no balance");
            continue;
        };

        tracing::info!("address = {}, balance = {}", addr, account.balance);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;
    use ton_liteserver_client::balance::Balance;
    use super::*;

    #[tokio::test]
    #[traced_test]
    async fn balance_check_continues_after_failures() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!("addresses-{}.txt", std::process::id()));
        tokio::fs::write(&path, "not an address\n\nEQCUBcmrecUdC4zaqlu3xNUemZRcaDFEN872A-zz1jouvJld\n0:9405c9ab79c51d0b8cdaaa5bb7c4d51e99945c6831443dcef603ecf3d63a2ebc\n").await?;
        let api = LiteServerApi::new(Balance::new(vec![]));
        let block = TonNodeBlockIdExt { workchain: -1, shard: i64::MIN, seqno: 1, root_hash: [0; 32], file_hash: [0; 32] };

        let result = mass_balance_check(&api, &block, &path).await;
        tokio::fs::remove_file(&path).await?;

        assert!(result.is_ok());
        assert!(logs_contain("Checking balances..."));
        assert!(logs_contain("Failed to parse address"));
        assert!(logs_contain("Failed to get account"));
        assert!(logs_contain("0:9405c9ab79c51d0b8cdaaa5bb7c4d51e99945c6831443dcef603ecf3d63a2ebc"));

        Ok(())
    }

    #[tokio::test]
    #[traced_test]
    async fn balance_check_fails_without_input() {
        let api = LiteServerApi::new(Balance::new(vec![]));
        let block = TonNodeBlockIdExt { workchain: -1, shard: i64::MIN, seqno: 1, root_hash: [0; 32], file_hash: [0; 32] };

        let result = mass_balance_check(&api, &block, Path::new("/nonexistent/address.txt")).await;

        assert!(result.is_err());
        assert!(!logs_contain("Checking balances..."));
    }

    #[test]
    fn args_defaults() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["balance-checker"])?;

        assert_eq!(args.input, PathBuf::from("address.txt"));
        assert_eq!(args.config_url, None);
        assert_eq!(args.config_path, None);

        Ok(())
    }

    #[test]
    fn default_config_url_is_valid() -> anyhow::Result<()> {
        let url = Url::from_str(DEFAULT_CONFIG_URL)?;

        assert_eq!(url.host_str(), Some("tonutils.com"));

        Ok(())
    }
}
