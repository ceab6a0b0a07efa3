mod contract;
mod error;

pub use self::{contract::*, error::*};

pub mod message;
pub mod mnemonic;
pub mod send;
pub mod wallet;
