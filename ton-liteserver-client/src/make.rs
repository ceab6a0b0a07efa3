use crate::client::LiteServerClient;
use anyhow::Context as _;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use ton_client_util::config::LiteServer;
use tower::Service;

const DEFAULT_ATTEMPTS: usize = 3;

/// Connects a [`LiteServerClient`] to a config entry, retrying with exponential backoff.
#[derive(Debug, Clone)]
pub struct MakeClient {
    attempts: usize,
}

impl Default for MakeClient {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS)
    }
}

impl MakeClient {
    pub fn new(attempts: usize) -> Self {
        Self { attempts: attempts.max(1) }
    }

    fn retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(self.attempts - 1)
    }
}

impl Service<LiteServer> for MakeClient {
    type Response = LiteServerClient;
    type Error = anyhow::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, liteserver: LiteServer) -> Self::Future {
        let strategy = self.retry_strategy();

        async move {
            let key = liteserver.key()?;
            let addr = liteserver.socket_addr();

            Retry::spawn(strategy, || async move {
                tracing::debug!(addr = %addr, "connecting to liteserver");

                LiteServerClient::connect(addr, &key).await
                    .inspect_err(|error| tracing::warn!(addr = %addr, error = ?error, "liteserver connection failed"))
            })
                .await
                .with_context(|| format!("cannot connect to liteserver {}", addr))
        }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use tower::ServiceExt;
    use tracing_test::traced_test;
    use ton_client_util::config::LiteServerId;
    use super::*;

    #[test]
    fn retry_strategy_is_bounded() {
        let make = MakeClient::new(4);

        let delays: Vec<_> = make.retry_strategy().collect();

        assert_eq!(delays.len(), 3);
        assert!(delays.iter().all(|d| *d <= Duration::from_secs(5)));
    }

    #[test]
    fn single_attempt_never_sleeps() {
        assert_eq!(MakeClient::new(0).retry_strategy().count(), 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn invalid_key_is_not_retried() {
        let liteserver = LiteServer {
            id: LiteServerId { r#type: "pub.ed25519".to_owned(), key: "AAAA".to_owned() },
            ip: 0,
            port: 1,
        };

        let result = MakeClient::new(5).oneshot(liteserver).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    #[traced_test]
    #[ignore]
    async fn make_provided_client() -> anyhow::Result<()> {
        let liteserver = LiteServer {
            id: LiteServerId { r#type: "pub.ed25519".to_owned(), key: "BYSVpL7aPk0kU5CtlsIae/8mf2B/NrBi7DKmepcjX6Q=".to_owned() },
            ip: 1091931623,
            port: 17728,
        };

        let client = MakeClient::default().oneshot(liteserver).await?;

        assert!(!client.is_closed());

        Ok(())
    }
}
