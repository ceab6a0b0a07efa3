pub mod api;
pub mod balance;
pub mod client;
pub mod make;
pub mod request;
pub mod retry;
pub mod tl;
pub mod wait_seqno;
