use std::time::{Duration, SystemTime, UNIX_EPOCH};
use anyhow::anyhow;
use ton_liteserver_client::api::LiteServerApi;
use ton_liteserver_client::tl::TonNodeBlockIdExt;
use ton_types::address::Address;
use ton_types::bag_of_cells::BagOfCells;
use ton_types::cell::CellHash;
use ton_types::shard_account::ShardAccount;
use ton_types::transaction::Transaction;
use crate::message::WalletMessage;
use crate::wallet::WalletV4R2;
use crate::{TonContract, TonContractError, WalletChain};

const TRANSACTIONS_PAGE: i32 = 16;
const WAIT_BLOCK_TIMEOUT: Duration = Duration::from_secs(10);
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, PartialEq, Eq)]
enum PageSearch {
    Found(CellHash),
    Exhausted,
    Next { lt: u64, hash: CellHash },
}

/// Walks a page of transactions, newest first, down to `until_lt` exclusive.
fn search_page(transactions: &[Transaction], until_lt: u64, message_hash: &CellHash) -> Result<PageSearch, TonContractError> {
    let Some(last) = transactions.last() else {
        return Ok(PageSearch::Exhausted);
    };

    for tx in transactions {
        if tx.lt <= until_lt {
            return Ok(PageSearch::Exhausted);
        }

        if tx.in_msg_hash().as_ref() == Some(message_hash) && tx.in_msg_is_external()? {
            return Ok(PageSearch::Found(tx.hash));
        }
    }

    if last.prev_trans_lt == 0 || last.prev_trans_lt <= until_lt {
        return Ok(PageSearch::Exhausted);
    }

    Ok(PageSearch::Next { lt: last.prev_trans_lt, hash: last.prev_trans_hash })
}

pub struct WalletSender<C = TonContract> {
    chain: C,
    wallet: WalletV4R2,
}

impl WalletSender<TonContract> {
    pub fn new(api: LiteServerApi, wallet: WalletV4R2) -> Self {
        Self::with_chain(TonContract::new(api, *wallet.address()), wallet)
    }
}

impl<C> WalletSender<C> where C: WalletChain {
    pub fn with_chain(chain: C, wallet: WalletV4R2) -> Self {
        Self { chain, wallet }
    }

    pub fn address(&self) -> Address {
        *self.wallet.address()
    }

    /// Sends all messages in one external message and waits for the wallet transaction
    /// that processed it. Returns the transaction hash.
    pub async fn send_many_wait_tx_hash(&self, messages: &[WalletMessage], timeout: Duration) -> Result<CellHash, TonContractError> {
        let head = self.chain.head().await?;
        let (account, shard_account) = self.chain.wallet_state(&head).await?;

        let (seqno, deployed) = match account.filter(|a| a.is_active()) {
            Some(account) => {
                let seqno = account.data_seqno()?
                    .ok_or_else(|| TonContractError::Wallet("wallet has no data".to_owned()))?;

                (seqno, true)
            },
            None => (0, false)
        };

        let valid_until = SystemTime::now().duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow!(e))?
            .saturating_add(timeout)
            .as_secs() as u32;

        let external = self.wallet.create_transfer(messages, seqno, valid_until, deployed)?;
        let message_hash = external.hash();
        let boc = BagOfCells::serialize(&external, true)?;

        tracing::debug!(seqno = seqno, deployed = deployed, message_hash = %hex::encode(message_hash), "sending external message");
        self.chain.send_boc(boc).await?;

        tokio::time::timeout(timeout, self.wait_transaction(head, shard_account, &message_hash))
            .await
            .map_err(|_| TonContractError::Timeout(timeout))?
    }

    async fn wait_transaction(&self, mut block: TonNodeBlockIdExt, mut known: Option<ShardAccount>, message_hash: &CellHash) -> Result<CellHash, TonContractError> {
        loop {
            let next = match self.chain.wait_head(block.seqno + 1, WAIT_BLOCK_TIMEOUT).await {
                Ok(next) => next,
                Err(error) => {
                    tracing::warn!(error = ?error, seqno = block.seqno + 1, "waiting for the next block failed");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                    continue;
                }
            };

            let current = match self.chain.wallet_state(&next).await {
                Ok((_, current)) => current,
                Err(error) => {
                    tracing::warn!(error = ?error, seqno = next.seqno, "cannot read wallet state");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                    continue;
                }
            };
            tracing::trace!(seqno = next.seqno, "block checked");
            block = next;

            let Some(current) = current else {
                continue;
            };
            if known.is_some_and(|known| known.last_trans_lt == current.last_trans_lt) {
                continue;
            }

            let until_lt = known.map(|known| known.last_trans_lt).unwrap_or(0);
            if let Some(hash) = self.find_transaction(current, until_lt, message_hash).await? {
                return Ok(hash);
            }

            known = Some(current);
        }
    }

    async fn find_transaction(&self, from: ShardAccount, until_lt: u64, message_hash: &CellHash) -> Result<Option<CellHash>, TonContractError> {
        let (mut lt, mut hash) = (from.last_trans_lt, from.last_trans_hash);

        loop {
            let transactions = self.chain.transactions(lt, hash, TRANSACTIONS_PAGE).await?;

            match search_page(&transactions, until_lt, message_hash)? {
                PageSearch::Found(hash) => return Ok(Some(hash)),
                PageSearch::Exhausted => return Ok(None),
                PageSearch::Next { lt: prev_lt, hash: prev_hash } => {
                    lt = prev_lt;
                    hash = prev_hash;
                }
            }
        }
    }
}
