use std::time::Duration;
use anyhow::anyhow;
use tower::retry::Retry;
use tower::ServiceExt;
use ton_client_util::config::TonConfig;
use ton_client_util::service::timeout::{Timeout, ToTimeout};
use ton_types::address::Address;
use crate::balance::Balance;
use crate::request::Requestable;
use crate::retry::RetryPolicy;
use crate::tl::{Int256, LiteServerAccountId, LiteServerAccountState, LiteServerGetAccountState, LiteServerGetMasterchainInfo, LiteServerGetTime, LiteServerGetTransactions, LiteServerMasterchainInfo, LiteServerSendMessage, LiteServerTransactionList, TonNodeBlockIdExt};
use crate::wait_seqno::WaitSeqno;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Lite-server facade over a balanced pool with timeouts and retries.
#[derive(Clone)]
pub struct LiteServerApi {
    inner: Retry<RetryPolicy, Timeout<Balance>>,
}

impl LiteServerApi {
    pub fn new(balance: Balance) -> Self {
        Self::with_policy(balance, RetryPolicy::default())
    }

    pub fn with_policy(balance: Balance, policy: RetryPolicy) -> Self {
        Self { inner: Retry::new(policy, Timeout::new(balance, DEFAULT_TIMEOUT)) }
    }

    pub async fn connect(config: &TonConfig) -> anyhow::Result<Self> {
        Ok(Self::new(Balance::connect(config).await?))
    }

    pub async fn request<R>(&self, request: R) -> anyhow::Result<R::Response>
        where R: Requestable + ToTimeout + Clone + 'static
    {
        self.inner.clone()
            .oneshot(request)
            .await
            .map_err(|e| anyhow!(e))
    }

    pub async fn get_masterchain_info(&self) -> anyhow::Result<LiteServerMasterchainInfo> {
        self.request(LiteServerGetMasterchainInfo::default()).await
    }

    /// Resolves once a server has seen masterchain block `seqno`.
    pub async fn wait_masterchain_seqno(&self, seqno: i32, timeout: Duration) -> anyhow::Result<LiteServerMasterchainInfo> {
        self.request(WaitSeqno::with_timeout(LiteServerGetMasterchainInfo::default(), seqno, timeout)).await
    }

    pub async fn get_account_state(&self, block: &TonNodeBlockIdExt, address: &Address) -> anyhow::Result<LiteServerAccountState> {
        self.request(LiteServerGetAccountState {
            id: block.clone(),
            account: account_id(address),
        }).await
    }

    pub async fn send_message(&self, boc: Vec<u8>) -> anyhow::Result<i32> {
        let status = self.request(LiteServerSendMessage { body: boc }).await?;

        Ok(status.status)
    }

    /// Up to `count` transactions of `address`, newest first, starting from (`lt`, `hash`).
    pub async fn get_transactions(&self, address: &Address, lt: i64, hash: Int256, count: i32) -> anyhow::Result<LiteServerTransactionList> {
        self.request(LiteServerGetTransactions {
            count,
            account: account_id(address),
            lt,
            hash,
        }).await
    }

    pub async fn get_time(&self) -> anyhow::Result<i32> {
        Ok(self.request(LiteServerGetTime::default()).await?.now)
    }
}

fn account_id(address: &Address) -> LiteServerAccountId {
    LiteServerAccountId { workchain: address.workchain, id: address.hash }
}
