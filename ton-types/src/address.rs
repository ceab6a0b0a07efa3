use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use base64::Engine;
use crc::Crc;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use crate::error::TonTypesError;

const CRC16: Crc<u16> = Crc::<u16>::new(&crc::CRC_16_XMODEM);

const BOUNCEABLE: u8 = 0x11;
const NON_BOUNCEABLE: u8 = 0x51;
const TESTNET: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub workchain: i32,
    pub hash: [u8; 32],
    pub bounceable: bool,
    pub testnet: bool,
}

impl Address {
    /// Bounceable mainnet address.
    pub fn new(workchain: i32, hash: [u8; 32]) -> Self {
        Self { workchain, hash, bounceable: true, testnet: false }
    }

    pub fn bounceable(&self) -> Self {
        Self { bounceable: true, ..*self }
    }

    pub fn non_bounceable(&self) -> Self {
        Self { bounceable: false, ..*self }
    }

    pub fn to_raw_string(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    pub fn to_flagged_bytes(&self) -> Option<[u8; 36]> {
        let workchain = i8::try_from(self.workchain).ok()?;

        let mut buf = [0u8; 36];
        buf[0] = if self.bounceable { BOUNCEABLE } else { NON_BOUNCEABLE } | if self.testnet { TESTNET } else { 0 };
        buf[1] = workchain as u8;
        buf[2..34].copy_from_slice(&self.hash);
        let crc16 = CRC16.checksum(&buf[..34]);
        buf[34..].copy_from_slice(&crc16.to_be_bytes());

        Some(buf)
    }

    pub fn to_flagged_string(&self) -> String {
        match self.to_flagged_bytes() {
            Some(bytes) => base64::engine::general_purpose::URL_SAFE.encode(bytes),
            None => self.to_raw_string()
        }
    }

    fn from_flagged_bytes(s: &str, data: &[u8]) -> Result<Self, TonTypesError> {
        let [flags, workchain, hash @ .., crc_hi, crc_lo] = data else {
            return Err(TonTypesError::InvalidAddress(s.to_owned()));
        };
        if hash.len() != 32 {
            return Err(TonTypesError::InvalidAddress(format!("invalid address length, expected 36 got {} bytes: {}", data.len(), s)));
        }

        let crc16 = CRC16.checksum(&data[..34]);
        if crc16.to_be_bytes() != [*crc_hi, *crc_lo] {
            return Err(TonTypesError::InvalidAddress(format!("crc16 mismatch: {}", s)));
        }

        let testnet = flags & TESTNET != 0;
        let bounceable = match flags & !TESTNET {
            BOUNCEABLE => true,
            NON_BOUNCEABLE => false,
            _ => return Err(TonTypesError::InvalidAddress(format!("unknown flags {:#04x}: {}", flags, s)))
        };

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(hash);

        Ok(Self { workchain: *workchain as i8 as i32, hash: bytes, bounceable, testnet })
    }
}

impl FromStr for Address {
    type Err = TonTypesError;

    /// Accepts raw `wc:hex` and user-friendly base64 (standard or url-safe) forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((workchain, hex_bytes)) = s.split_once(':') {
            let workchain = workchain.parse()
                .map_err(|_| TonTypesError::InvalidAddress(s.to_owned()))?;
            let mut bytes = [0u8; 32];
            hex::decode_to_slice(hex_bytes, &mut bytes)
                .map_err(|_| TonTypesError::InvalidAddress(s.to_owned()))?;

            return Ok(Self::new(workchain, bytes));
        }

        if s.len() != 48 {
            return Err(TonTypesError::InvalidAddress(s.to_owned()));
        }

        // convert url safe to standard
        let standard = s.replace('-', "+").replace('_', "/");
        let data = base64::engine::general_purpose::STANDARD.decode(standard)
            .map_err(|_| TonTypesError::InvalidAddress(s.to_owned()))?;

        Self::from_flagged_bytes(s, &data)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_flagged_string())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de>
    {
        let s = String::deserialize(deserializer)?;

        FromStr::from_str(&s)
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "a3935861f79daf59a13d6d182e1640210c02f98e3df18fda74b8f5ab141abf18";

    #[test]
    fn address_from_bounceable() -> anyhow::Result<()> {
        let address = Address::from_str("EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEMS")?;

        assert_eq!(address.workchain, 0);
        assert_eq!(hex::encode(address.hash), HASH);
        assert!(address.bounceable);
        assert!(!address.testnet);

        Ok(())
    }

    #[test]
    fn address_from_non_bounceable() -> anyhow::Result<()> {
        let address = Address::from_str("UQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GB7X")?;

        assert!(!address.bounceable);
        assert_eq!(address.to_string(), "UQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GB7X");
        assert_eq!(address.bounceable().to_string(), "EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEMS");

        Ok(())
    }

    #[test]
    fn address_from_standard_base64() -> anyhow::Result<()> {
        let address = Address::from_str("EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq/GEMS")?;

        assert_eq!(address.to_string(), "EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEMS");

        Ok(())
    }

    #[test]
    fn address_testnet_flags() -> anyhow::Result<()> {
        let address = Address::from_str("0QCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GKVd")?;

        assert!(address.testnet);
        assert!(!address.bounceable);
        assert_eq!(address.bounceable().to_string(), "kQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GPiY");

        Ok(())
    }

    #[test]
    fn address_from_raw() -> anyhow::Result<()> {
        let address = Address::from_str("-1:3333333333333333333333333333333333333333333333333333333333333333")?;

        assert_eq!(address.workchain, -1);
        assert!(address.bounceable);
        assert_eq!(address.to_string(), "Ef8zMzMzMzMzMzMzMzMzMzMzMzMzMzMzMzMzMzMzMzMzM0vF");
        assert_eq!(address.to_raw_string(), "-1:3333333333333333333333333333333333333333333333333333333333333333");

        Ok(())
    }

    #[test]
    fn address_bad_crc() {
        let address = Address::from_str("EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEMT");

        assert!(address.is_err());
    }

    #[test]
    fn address_garbage() {
        for input in ["", "hello", "0:zz", "0:a393", "EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEM"] {
            assert!(Address::from_str(input).is_err(), "{:?} must be rejected", input);
        }
    }

    #[test]
    fn address_serde() -> anyhow::Result<()> {
        let address: Address = serde_json::from_str("\"UQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GB7X\"")?;

        assert_eq!(serde_json::to_string(&address)?, "\"UQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GB7X\"");

        Ok(())
    }
}
