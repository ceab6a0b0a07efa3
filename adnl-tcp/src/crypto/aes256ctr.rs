use aes::cipher::generic_array::GenericArray;
use ctr::cipher::KeyIvInit;

pub(crate) type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// Handshake cipher: key is `shared[0..16] ‖ checksum[16..32]`, iv is `checksum[0..4] ‖ shared[20..32]`.
pub(crate) fn build_cipher(shared_key: &[u8; 32], checksum: &[u8; 32]) -> Aes256Ctr {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(&shared_key[..16]);
    key[16..].copy_from_slice(&checksum[16..]);

    let mut iv = [0u8; 16];
    iv[..4].copy_from_slice(&checksum[..4]);
    iv[4..].copy_from_slice(&shared_key[20..]);

    Aes256Ctr::new(GenericArray::from_slice(&key), GenericArray::from_slice(&iv))
}

/// Stream cipher of one direction, keyed by a 32 byte slice and a 16 byte iv of the session basis.
pub(crate) fn session_cipher(key: &[u8], iv: &[u8]) -> Aes256Ctr {
    Aes256Ctr::new(GenericArray::from_slice(key), GenericArray::from_slice(iv))
}
