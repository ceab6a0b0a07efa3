use std::path::PathBuf;
use config::Config;
use serde::Deserialize;
use url::Url;
use crate::config::{load_ton_config, read_ton_config, TonConfig};

/// Environment overrides, read from `TON_CONFIG_URL` and `TON_CONFIG_PATH`.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    pub config_url: Option<Url>,
    pub config_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_source(config::Environment::with_prefix("TON").try_parsing(true))
    }

    fn from_source<S>(source: S) -> anyhow::Result<Self>
        where S: config::Source + Send + Sync + 'static
    {
        let config: AppConfig = Config::builder()
            .add_source(source)
            .build()
            .and_then(|c| c.try_deserialize())?;

        Ok(config)
    }

    /// Flags take precedence over the environment, the environment over `default_url`.
    pub fn merge(self, config_url: Option<Url>, config_path: Option<PathBuf>) -> Self {
        Self {
            config_url: config_url.or(self.config_url),
            config_path: config_path.or(self.config_path),
        }
    }

    /// A local file wins over any url.
    pub async fn load_ton_config(&self, default_url: &Url) -> anyhow::Result<TonConfig> {
        if let Some(path) = self.config_path.as_ref() {
            tracing::debug!(path = %path.display(), "reading ton config");

            return read_ton_config(path).await;
        }

        let url = self.config_url.as_ref().unwrap_or(default_url);
        tracing::debug!(url = %url, "loading ton config");

        load_ton_config(url.clone()).await
    }
}
