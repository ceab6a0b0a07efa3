pub mod client;
mod codec;
mod crypto;
pub mod deserializer;
mod key;
pub mod packet;
pub mod ping;
pub mod serializer;
pub mod types;

pub use key::{Ed25519Key, Ed25519KeyId};
