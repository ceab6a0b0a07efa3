use ton_types::message::InternalMessage;

/// Sender pays transfer fees separately from the message value.
pub const PAY_GAS_SEPARATELY: u8 = 1;
/// Errors during the action phase are ignored.
pub const IGNORE_ERRORS: u8 = 2;
/// The account is destroyed when its balance reaches zero.
pub const DESTROY_IF_ZERO: u8 = 32;
/// The whole remaining balance is carried by the message.
pub const CARRY_ALL_REMAINING_BALANCE: u8 = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletMessage {
    pub mode: u8,
    pub message: InternalMessage,
}

impl WalletMessage {
    pub fn new(mode: u8, message: InternalMessage) -> Self {
        Self { mode, message }
    }
}
