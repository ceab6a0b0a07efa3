use std::time::Duration;
use thiserror::Error as ThisError;
use ton_types::TonTypesError;

#[derive(Debug, ThisError)]
pub enum TonContractError {
    #[error("invalid mnemonic: {0}")]
    Mnemonic(String),
    #[error("wallet: {0}")]
    Wallet(String),
    #[error("too many messages: {0}, at most {1} allowed")]
    TooManyMessages(usize, usize),
    #[error("transaction not found in {0:?}")]
    Timeout(Duration),
    #[error("TLB: {0}")]
    Types(#[from] TonTypesError),
    #[error(transparent)]
    Client(#[from] anyhow::Error),
}
