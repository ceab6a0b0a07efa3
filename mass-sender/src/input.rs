use std::path::Path;
use std::str::FromStr;
use anyhow::{anyhow, Context};
use ton_contract::wallet::WalletV4R2;
use ton_types::address::Address;
use ton_types::coins::Coins;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receiver {
    pub address: Address,
    pub amount: Coins,
}

/// Words of the first line, an empty file gives no words.
pub async fn read_phrase(path: impl AsRef<Path>) -> anyhow::Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await?;

    Ok(content.lines()
        .next()
        .map(|line| line.split_whitespace().map(ToOwned::to_owned).collect())
        .unwrap_or_default())
}

pub async fn read_receivers(path: impl AsRef<Path>) -> anyhow::Result<Vec<Receiver>> {
    let content = tokio::fs::read_to_string(path).await?;

    parse_receivers(&content)
}

/// `address,amount` lines. Other lines are skipped, a repeated address keeps its first
/// position and the last amount.
fn parse_receivers(content: &str) -> anyhow::Result<Vec<Receiver>> {
    let mut entries: Vec<(&str, &str)> = Vec::new();
    for line in content.lines() {
        let parts: Vec<&str> = line.split(',').collect();
        let [address, amount] = parts.as_slice() else {
            continue;
        };
        let (address, amount) = (address.trim(), amount.trim());

        match entries.iter_mut().find(|(a, _)| *a == address) {
            Some(entry) => entry.1 = amount,
            None => entries.push((address, amount)),
        }
    }

    if entries.len() > WalletV4R2::MAX_MESSAGES {
        return Err(anyhow!("{} receivers given, at most {} allowed", entries.len(), WalletV4R2::MAX_MESSAGES));
    }

    entries.into_iter()
        .map(|(address, amount)| Ok(Receiver {
            address: Address::from_str(address).with_context(|| format!("invalid receiver address {:?}", address))?,
            amount: Coins::from_str(amount).with_context(|| format!("invalid amount {:?} for {}", amount, address))?,
        }))
        .collect()
}
