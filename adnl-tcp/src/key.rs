use std::fmt::{Debug, Formatter};
use std::ops::Mul;
use anyhow::bail;
use ed25519_dalek::hazmat::ExpandedSecretKey;
use ed25519_dalek::{SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

/// `pub.ed25519 key:int256`
#[derive(Eq, PartialEq)]
pub struct Ed25519KeyId([u8; 32]);

impl Ed25519KeyId {
    const KEY_TYPE: u32 = 0x4813b4c6;

    pub fn from_public_key_bytes(public_key: &[u8; 32]) -> Self {
        Self(Sha256::default()
            .chain_update(Self::KEY_TYPE.to_le_bytes())
            .chain_update(public_key.as_slice())
            .finalize()
            .into())
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl Debug for Ed25519KeyId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

pub struct Ed25519Key {
    id: Ed25519KeyId,
    pub_key: VerifyingKey,
    exp_key: Option<ExpandedSecretKey>
}

impl Ed25519Key {
    pub fn from_public_key_bytes(public_key: &[u8; 32]) -> anyhow::Result<Self> {
        let key_id = Ed25519KeyId::from_public_key_bytes(public_key);

        Ok(Self {
            id: key_id,
            pub_key: VerifyingKey::from_bytes(public_key)?,
            exp_key: None
        })
    }

    /// Ephemeral key for a single connection.
    pub fn generate() -> Self {
        let private_key = SigningKey::generate(&mut rand::thread_rng());
        let public_key = private_key.verifying_key();
        let key_id = Ed25519KeyId::from_public_key_bytes(public_key.as_bytes());
        let exp_key: ExpandedSecretKey = private_key.as_bytes().into();

        Self {
            id: key_id,
            pub_key: public_key,
            exp_key: Some(exp_key)
        }
    }

    pub fn id(&self) -> &Ed25519KeyId {
        &self.id
    }

    pub fn public_key(&self) -> &VerifyingKey {
        &self.pub_key
    }

    /// x25519 over the Montgomery form of the peer key.
    pub fn shared_key(&self, other: &Ed25519Key) -> anyhow::Result<[u8; 32]> {
        let Some(exp_key) = self.exp_key.as_ref() else {
            bail!("No expanded secret key");
        };

        Ok(other.pub_key.to_montgomery().mul(exp_key.scalar).to_bytes())
    }
}
