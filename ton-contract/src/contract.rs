use std::time::Duration;
use async_trait::async_trait;
use ton_liteserver_client::api::LiteServerApi;
use ton_liteserver_client::tl::TonNodeBlockIdExt;
use ton_types::account::Account;
use ton_types::address::Address;
use ton_types::cell::CellHash;
use ton_types::shard_account::ShardAccount;
use ton_types::transaction::Transaction;

use crate::TonContractError;

pub struct TonContract {
    address: Address,
    api: LiteServerApi,
}

impl TonContract {
    pub fn new(api: LiteServerApi, address: Address) -> Self {
        Self { api, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `None` when the account doesn't exist at `block`.
    pub async fn account(&self, block: &TonNodeBlockIdExt) -> Result<Option<Account>, TonContractError> {
        Ok(self.account_with_shard_state(block).await?.0)
    }

    /// The account together with its last transaction reference, read from the state proof.
    pub async fn account_with_shard_state(&self, block: &TonNodeBlockIdExt) -> Result<(Option<Account>, Option<ShardAccount>), TonContractError> {
        let state = self.api.get_account_state(block, &self.address).await?;

        let account = Account::from_boc(&state.state)?;
        let shard_account = if state.proof.is_empty() {
            None
        } else {
            ShardAccount::from_proof(&state.proof, &self.address)?
        };

        Ok((account, shard_account))
    }
}

/// Chain reads and writes a wallet needs to send a message and find its transaction.
#[async_trait]
pub trait WalletChain: Send + Sync {
    async fn head(&self) -> Result<TonNodeBlockIdExt, TonContractError>;

    /// Resolves once the masterchain reaches `seqno`.
    async fn wait_head(&self, seqno: i32, timeout: Duration) -> Result<TonNodeBlockIdExt, TonContractError>;

    async fn wallet_state(&self, block: &TonNodeBlockIdExt) -> Result<(Option<Account>, Option<ShardAccount>), TonContractError>;

    async fn send_boc(&self, boc: Vec<u8>) -> Result<(), TonContractError>;

    /// Up to `count` wallet transactions, newest first, starting at `lt`/`hash`.
    async fn transactions(&self, lt: u64, hash: CellHash, count: i32) -> Result<Vec<Transaction>, TonContractError>;
}

#[async_trait]
impl WalletChain for TonContract {
    async fn head(&self) -> Result<TonNodeBlockIdExt, TonContractError> {
        Ok(self.api.get_masterchain_info().await?.last)
    }

    async fn wait_head(&self, seqno: i32, timeout: Duration) -> Result<TonNodeBlockIdExt, TonContractError> {
        Ok(self.api.wait_masterchain_seqno(seqno, timeout).await?.last)
    }

    async fn wallet_state(&self, block: &TonNodeBlockIdExt) -> Result<(Option<Account>, Option<ShardAccount>), TonContractError> {
        self.account_with_shard_state(block).await
    }

    async fn send_boc(&self, boc: Vec<u8>) -> Result<(), TonContractError> {
        let status = self.api.send_message(boc).await?;
        tracing::trace!(status = status, "message accepted");

        Ok(())
    }

    async fn transactions(&self, lt: u64, hash: CellHash, count: i32) -> Result<Vec<Transaction>, TonContractError> {
        let list = self.api.get_transactions(&self.address, lt as i64, hash, count).await?;

        Ok(Transaction::list_from_boc(&list.transactions)?)
    }
}
