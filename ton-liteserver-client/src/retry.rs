use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Sleep};
use tower::retry::budget::{Budget, TpsBudget};
use tower::retry::Policy;
use tower::BoxError;
use crate::client::Error;

const BACKOFF: Duration = Duration::from_millis(100);

/// Retries transport failures and timeouts, a `liteServer.error` answer is final.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    budget: Arc<TpsBudget>,
    attempts_left: usize,
}

impl RetryPolicy {
    pub fn new(budget: TpsBudget, max_attempts: usize) -> Self {
        Self { budget: Arc::new(budget), attempts_left: max_attempts.saturating_sub(1) }
    }

    fn is_retryable(error: &BoxError) -> bool {
        !matches!(error.downcast_ref::<Error>(), Some(Error::LiteServerError(_)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(TpsBudget::new(Duration::from_secs(10), 10, 0.1), 5)
    }
}

impl<Req, Res> Policy<Req, Res, BoxError> for RetryPolicy where Req: Clone {
    type Future = Sleep;

    fn retry(&mut self, _: &mut Req, result: &mut Result<Res, BoxError>) -> Option<Self::Future> {
        match result {
            Ok(_) => {
                self.budget.deposit();

                None
            }
            Err(error) => {
                if !Self::is_retryable(error) || self.attempts_left == 0 {
                    return None;
                }

                if !self.budget.withdraw() {
                    tracing::debug!(error = ?error, "retry budget exhausted");

                    return None;
                }

                self.attempts_left -= 1;
                tracing::debug!(error = ?error, attempts_left = self.attempts_left, "retrying request");

                Some(sleep(BACKOFF))
            }
        }
    }

    fn clone_request(&mut self, req: &Req) -> Option<Req> {
        Some(req.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::{service_fn, ServiceBuilder, ServiceExt};
    use tower::retry::RetryLayer;
    use tracing_test::traced_test;
    use crate::tl::LiteServerError;
    use super::*;

    fn failing_service(calls: Arc<AtomicUsize>, error: fn() -> Error) -> impl tower::Service<u32, Response = u32, Error = BoxError> + Clone {
        service_fn(move |_: u32| {
            let calls = calls.clone();

            async move {
                calls.fetch_add(1, Ordering::SeqCst);

                Err::<u32, BoxError>(error().into())
            }
        })
    }

    #[tokio::test]
    #[traced_test]
    async fn retries_closed_channel_up_to_max_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = ServiceBuilder::new()
            .layer(RetryLayer::new(RetryPolicy::new(TpsBudget::new(Duration::from_secs(1), 100, 0.0), 3)))
            .service(failing_service(calls.clone(), || Error::ChannelClosed));

        let result = service.oneshot(1).await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    #[traced_test]
    async fn liteserver_error_is_final() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = ServiceBuilder::new()
            .layer(RetryLayer::new(RetryPolicy::default()))
            .service(failing_service(calls.clone(), || Error::LiteServerError(LiteServerError { code: 651, message: "not found".to_owned() })));

        let result = service.oneshot(1).await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn empty_budget_stops_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = ServiceBuilder::new()
            .layer(RetryLayer::new(RetryPolicy::new(TpsBudget::new(Duration::from_secs(1), 0, 0.0), 10)))
            .service(failing_service(calls.clone(), || Error::ChannelClosed));

        let result = service.oneshot(1).await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
