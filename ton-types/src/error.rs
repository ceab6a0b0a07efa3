use thiserror::Error;

#[derive(Debug, Error)]
pub enum TonTypesError {
    #[error("cell overflow: {0} bits")]
    CellOverflow(usize),
    #[error("too many references")]
    TooManyReferences,
    #[error("cell underflow: need {need} bits, {left} left")]
    CellUnderflow { need: usize, left: usize },
    #[error("no reference at index {0}")]
    NoReference(usize),
    #[error("invalid bag of cells: {0}")]
    InvalidBoc(String),
    #[error("crc32c mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Crc32cMismatch { expected: u32, actual: u32 },
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("unexpected tag {tag:#b} for {name}")]
    UnexpectedTag { name: &'static str, tag: u64 },
    #[error("pruned branch reached while reading {0}")]
    PrunedBranch(&'static str),
    #[error("key not found")]
    KeyNotFound,
    #[error("value {value} doesn't fit into {bits} bits")]
    ValueOverflow { value: u128, bits: usize },
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, TonTypesError>;
