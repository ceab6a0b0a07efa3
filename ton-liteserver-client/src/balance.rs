use std::task::{Context, Poll};
use anyhow::anyhow;
use futures::future::join_all;
use rand::Rng;
use ton_client_util::config::TonConfig;
use tower::{Service, ServiceExt};
use crate::client::{Error, LiteServerClient, ResponseFuture};
use crate::make::MakeClient;
use crate::request::Requestable;

/// Pool of connected clients, each request goes to a random live one.
#[derive(Debug, Clone)]
pub struct Balance {
    clients: Vec<LiteServerClient>,
}

impl Balance {
    pub fn new(clients: Vec<LiteServerClient>) -> Self {
        Self { clients }
    }

    pub async fn connect(config: &TonConfig) -> anyhow::Result<Self> {
        Self::connect_with(config, MakeClient::default()).await
    }

    pub async fn connect_with(config: &TonConfig, make_client: MakeClient) -> anyhow::Result<Self> {
        let results = join_all(config.liteservers.iter().cloned().map(|liteserver| {
            let id = liteserver.id();
            let make_client = make_client.clone();

            async move { (id, make_client.oneshot(liteserver).await) }
        })).await;

        let mut clients = Vec::with_capacity(results.len());
        for (id, result) in results {
            match result {
                Ok(client) => clients.push(client),
                Err(error) => tracing::warn!(id = %id, error = ?error, "liteserver skipped"),
            }
        }

        if clients.is_empty() {
            return Err(anyhow!("no liteserver is reachable, {} configured", config.liteservers.len()));
        }
        tracing::debug!(connected = clients.len(), total = config.liteservers.len(), "liteservers connected");

        Ok(Self::new(clients))
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl<R> Service<R> for Balance where R: Requestable {
    type Response = R::Response;
    type Error = Error;
    type Future = ResponseFuture<R::Response>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        let before = self.clients.len();
        self.clients.retain(|client| !client.is_closed());
        if self.clients.len() < before {
            tracing::warn!(dropped = before - self.clients.len(), left = self.clients.len(), "closed liteserver clients dropped");
        }

        if self.clients.is_empty() {
            return Poll::Ready(Err(Error::NoAvailableClients));
        }

        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: R) -> Self::Future {
        if self.clients.is_empty() {
            return ResponseFuture::failed(Error::NoAvailableClients);
        }

        let index = rand::thread_rng().gen_range(0..self.clients.len());

        self.clients[index].call(req)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use tracing_test::traced_test;
    use crate::client::tests::{given_closed_client, given_silent_client};
    use crate::tl::{LiteServerGetMasterchainInfo, LiteServerGetTime};
    use super::*;

    #[tokio::test]
    #[traced_test]
    async fn empty_balance_is_not_ready() {
        let balance = Balance::new(vec![]);

        let result = balance.oneshot(LiteServerGetMasterchainInfo::default()).await;

        assert!(matches!(result, Err(Error::NoAvailableClients)));
    }

    #[tokio::test]
    #[traced_test]
    async fn closed_clients_are_dropped_on_ready() -> anyhow::Result<()> {
        let mut balance = Balance::new(vec![given_closed_client(), given_silent_client(), given_closed_client()]);

        ServiceExt::<LiteServerGetTime>::ready(&mut balance).await?;

        assert_eq!(balance.len(), 1);

        Ok(())
    }

    #[tokio::test]
    #[traced_test]
    async fn only_closed_clients_are_not_ready() {
        let mut balance = Balance::new(vec![given_closed_client()]);

        let result = ServiceExt::<LiteServerGetTime>::ready(&mut balance).await.map(|_| ());

        assert!(matches!(result, Err(Error::NoAvailableClients)));
        assert!(balance.is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn connect_without_liteservers_fails() {
        let config = TonConfig { liteservers: vec![], data: Value::Null };

        let result = Balance::connect(&config).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    #[traced_test]
    #[ignore]
    async fn balance_get_masterchain_info() -> anyhow::Result<()> {
        let config = ton_client_util::config::load_ton_config("https://ton.org/global.config.json").await?;
        let balance = Balance::connect(&config).await?;

        let response = balance.oneshot(LiteServerGetMasterchainInfo::default()).await?;

        assert_eq!(response.last.workchain, -1);

        Ok(())
    }
}
