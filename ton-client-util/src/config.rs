use std::fmt::{Display, Formatter};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::Path;
use anyhow::{anyhow, Context};
use base64::Engine;
use reqwest::IntoUrl;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
pub struct TonConfig {
    pub liteservers: Vec<LiteServer>,
    #[serde(flatten)]
    pub data: Value,
}

impl Display for TonConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            serde_json::to_string(self).map_err(|_| std::fmt::Error)?
        )
    }
}

#[derive(Deserialize, Serialize, Hash, Eq, PartialEq, Clone, Debug)]
pub struct LiteServerId {
    #[serde(rename = "@type")]
    pub r#type: String,
    pub key: String,
}

#[derive(Deserialize, Serialize, Hash, Eq, PartialEq, Clone, Debug)]
pub struct LiteServer {
    pub id: LiteServerId,
    pub ip: i32,
    pub port: u16,
}

impl LiteServer {
    pub fn id(&self) -> String {
        format!("{}:{}", self.id.r#type, self.id.key)
    }

    /// The ip is a signed big-endian IPv4 address.
    pub fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::from(self.ip as u32), self.port)
    }

    pub fn key(&self) -> anyhow::Result<[u8; 32]> {
        if self.id.r#type != "pub.ed25519" {
            return Err(anyhow!("unsupported key type: {}", self.id.r#type));
        }

        base64::engine::general_purpose::STANDARD
            .decode(&self.id.key)
            .context("liteserver key is not base64")?
            .as_slice()
            .try_into()
            .map_err(|_| anyhow!("liteserver key must be 32 bytes"))
    }
}

pub async fn load_ton_config(url: impl IntoUrl) -> anyhow::Result<TonConfig> {
    let config = reqwest::get(url).await?.error_for_status()?.text().await?;
    let config = serde_json::from_str(config.as_ref())?;

    Ok(config)
}

pub async fn read_ton_config(path: impl AsRef<Path>) -> anyhow::Result<TonConfig> {
    let config = tokio::fs::read_to_string(path).await?;
    let config = serde_json::from_str(config.as_ref())?;

    Ok(config)
}
