use std::time::Duration;
use adnl_tcp::deserializer::Deserialize;
use adnl_tcp::serializer::{to_bytes_boxed, Serialize};
use adnl_tcp::types::{BareType, Functional};
use ton_client_util::service::timeout::ToTimeout;
use crate::tl::{LiteServerGetAccountState, LiteServerGetMasterchainInfo, LiteServerGetTime, LiteServerGetTransactions, LiteServerSendMessage};

pub trait Requestable: Send {
    type Response: BareType + Deserialize + Send + 'static;

    fn to_bytes_boxed(&self) -> Vec<u8>;
}

impl<T> Requestable for T
    where T : Functional + BareType + Serialize + Send,
        T::Result: BareType + Deserialize + Send + 'static
{
    type Response = T::Result;

    fn to_bytes_boxed(&self) -> Vec<u8> {
        to_bytes_boxed(self)
    }
}

impl ToTimeout for LiteServerGetMasterchainInfo {}
impl ToTimeout for LiteServerGetAccountState {}
impl ToTimeout for LiteServerGetTransactions {}
impl ToTimeout for LiteServerGetTime {}

impl ToTimeout for LiteServerSendMessage {
    fn to_timeout(&self) -> Option<Duration> {
        Some(Duration::from_secs(10))
    }
}
