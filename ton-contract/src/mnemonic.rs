use ed25519_dalek::SigningKey;
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use crate::TonContractError;

pub const WORDS_COUNT: usize = 24;

const BASIC_SEED_SALT: &[u8] = b"TON seed version";
const BASIC_SEED_ROUNDS: u32 = 390;
const DEFAULT_SEED_SALT: &[u8] = b"TON default seed";
const DEFAULT_SEED_ROUNDS: u32 = 100_000;

/// TON wallet seed phrase. Words are not checked against a wordlist.
#[derive(Clone)]
pub struct Mnemonic {
    entropy: [u8; 64],
}

impl Mnemonic {
    pub fn from_words<I, S>(words: I, password: Option<&str>) -> Result<Self, TonContractError>
        where I: IntoIterator<Item = S>, S: AsRef<str>
    {
        let words: Vec<String> = words.into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        if words.len() != WORDS_COUNT {
            return Err(TonContractError::Mnemonic(format!("expected {} words, got {}", WORDS_COUNT, words.len())));
        }

        let password = password.unwrap_or_default();
        let entropy = Self::entropy(&words.join(" "), password)?;

        if password.is_empty() && !Self::is_basic_seed(&entropy) {
            return Err(TonContractError::Mnemonic("not a basic seed".to_owned()));
        }

        Ok(Self { entropy })
    }

    fn entropy(phrase: &str, password: &str) -> Result<[u8; 64], TonContractError> {
        let mut mac = Hmac::<Sha512>::new_from_slice(phrase.as_bytes())
            .map_err(|e| TonContractError::Mnemonic(e.to_string()))?;
        mac.update(password.as_bytes());

        let mut entropy = [0u8; 64];
        entropy.copy_from_slice(&mac.finalize().into_bytes());

        Ok(entropy)
    }

    fn is_basic_seed(entropy: &[u8; 64]) -> bool {
        let mut seed = [0u8; 64];
        pbkdf2_hmac::<Sha512>(entropy, BASIC_SEED_SALT, BASIC_SEED_ROUNDS, &mut seed);

        seed[0] == 0
    }

    pub fn to_key_pair(&self) -> SigningKey {
        let mut seed = [0u8; 64];
        pbkdf2_hmac::<Sha512>(&self.entropy, DEFAULT_SEED_SALT, DEFAULT_SEED_ROUNDS, &mut seed);

        let mut secret = [0u8; 32];
        secret.copy_from_slice(&seed[..32]);

        SigningKey::from_bytes(&secret)
    }
}

impl std::fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Mnemonic(..)")
    }
}
