pub mod account;
pub mod address;
pub mod bag_of_cells;
pub mod builder;
pub mod cell;
pub mod coins;
mod error;
pub mod hashmap;
pub mod message;
pub mod shard_account;
pub mod slice;
pub mod transaction;

pub use self::error::*;
