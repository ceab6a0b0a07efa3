mod aes256ctr;

pub(crate) use aes256ctr::*;
