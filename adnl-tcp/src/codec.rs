use anyhow::bail;
use ctr::cipher::StreamCipher;
use sha2::{Digest, Sha256};
use tokio_util::bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use crate::crypto::{session_cipher, Aes256Ctr};
use crate::packet::Packet;

/// Nonce and checksum.
const MIN_PACKET_LEN: usize = 64;

/// Frame: `u32 LE length ‖ nonce ‖ data ‖ sha256(nonce ‖ data)`, whole frame encrypted.
pub struct PacketCodec {
    cipher_recv: Aes256Ctr,
    cipher_send: Aes256Ctr,
    next_len: Option<usize>
}

impl Encoder<Packet> for PacketCodec {
    type Error = anyhow::Error;

    fn encode(&mut self, packet: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let buf_size = dst.len();
        let len = packet.len();
        dst.reserve(len + MIN_PACKET_LEN + 4);

        dst.put(&((len + MIN_PACKET_LEN) as u32).to_le_bytes()[..]);

        dst.put(&packet.nonce[..]);
        dst.put(&packet.data[..]);
        dst.put(&packet.checksum[..]);

        self.cipher_send.apply_keystream(&mut dst[buf_size .. ]);

        Ok(())
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = anyhow::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let length = match self.next_len.take() {
            Some(len) => { len }
            None => {
                if src.len() < 4 {
                    return Ok(None);
                }

                let mut length = src.split_to(4);
                self.cipher_recv.apply_keystream(&mut length);

                u32::from_le_bytes([ length[0], length[1], length[2], length[3] ]) as usize
            }
        };

        if length < MIN_PACKET_LEN {
            bail!("small ADNL packet: {}", length);
        }

        if src.len() < length {
            src.reserve(length - src.len());
            self.next_len.replace(length);

            return Ok(None);
        }

        let mut data = src.split_to(length);
        self.cipher_recv.apply_keystream(&mut data);
        let sha256: [u8; 32] = Sha256::digest(&data[..length - 32]).into();
        if sha256 != data[length - 32..] {
            bail!("incorrect checksum for ADNL packet");
        }

        let packet = Packet {
            nonce: data[0 .. 32].try_into()?,
            data: data[32 .. length - 32].to_vec(),
            checksum: data[length - 32 .. length].try_into()?
        };

        src.reserve(MIN_PACKET_LEN + 4);

        Ok(Some(packet))
    }
}

impl PacketCodec {
    /// Client side of a session basis: receives with `[0..32]`/`[64..80]`, sends with `[32..64]`/`[80..96]`.
    pub fn from_bytes_as_client(bytes: &[u8; 160]) -> Self {
        let cipher_recv = session_cipher(&bytes[0..32], &bytes[64 .. 80]);
        let cipher_send = session_cipher(&bytes[32..64], &bytes[80 .. 96]);

        Self { cipher_recv, cipher_send, next_len: None }
    }

    #[cfg(test)]
    fn from_bytes_as_server(bytes: &[u8; 160]) -> Self {
        let cipher_recv = session_cipher(&bytes[32..64], &bytes[80 .. 96]);
        let cipher_send = session_cipher(&bytes[0..32], &bytes[64 .. 80]);

        Self { cipher_recv, cipher_send, next_len: None }
    }
}
