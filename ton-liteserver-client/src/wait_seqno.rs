use crate::request::Requestable;
use crate::tl::LiteServerWaitMasterchainSeqno;
use adnl_tcp::serializer::to_bytes_boxed;
use std::time::Duration;
use ton_client_util::service::timeout::ToTimeout;

/// The server holds the answer until it has seen masterchain block `seqno`.
#[derive(Debug, Clone)]
pub struct WaitSeqno<R> {
    prefix: LiteServerWaitMasterchainSeqno,
    request: R,
}

impl<R> WaitSeqno<R>
where
    R: Requestable,
{
    pub fn new(request: R, seqno: i32) -> Self {
        Self::with_timeout(request, seqno, Duration::from_secs(3))
    }

    pub fn with_timeout(request: R, seqno: i32, timeout: Duration) -> Self {
        Self {
            prefix: LiteServerWaitMasterchainSeqno {
                seqno,
                timeout_ms: timeout.as_millis() as i32,
            },
            request,
        }
    }
}

impl<R> Requestable for WaitSeqno<R>
where
    R: Requestable,
{
    type Response = R::Response;

    fn to_bytes_boxed(&self) -> Vec<u8> {
        let mut bytes = to_bytes_boxed(&self.prefix);
        bytes.extend(self.request.to_bytes_boxed());

        bytes
    }
}

impl<R> ToTimeout for WaitSeqno<R> {
    fn to_timeout(&self) -> Option<Duration> {
        Some(Duration::from_millis(self.prefix.timeout_ms as u64) + Duration::from_secs(7))
    }
}
