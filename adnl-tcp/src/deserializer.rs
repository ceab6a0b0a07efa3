use std::string::FromUtf8Error;
use thiserror::Error;
use crate::types::{BareType, Bytes, Int256};

#[derive(Error, Debug)]
pub enum DeserializerError {
    #[error("Unexpected end of input: need {need} bytes, {left} left")]
    UnexpectedEof { need: usize, left: usize },
    #[error("Unexpected constructor number: {0:#010x}")]
    UnexpectedConstructorNumber(u32),
    #[error("Input is not empty: {0} bytes left")]
    TrailingBytes(usize),
    #[error("Invalid bytes length prefix: {0:#04x}")]
    InvalidLengthPrefix(u8),
    #[error(transparent)]
    InvalidString(#[from] FromUtf8Error),
}

pub trait Deserialize where Self: Sized {
    fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError>;
}

pub struct Deserializer<'de> {
    input: &'de [u8]
}

impl<'de> Deserializer<'de> {
    pub fn from_bytes(input: &'de [u8]) -> Self {
        Deserializer { input }
    }

    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    fn take(&mut self, n: usize) -> Result<&'de [u8], DeserializerError> {
        if self.input.len() < n {
            return Err(DeserializerError::UnexpectedEof { need: n, left: self.input.len() });
        }
        let (head, tail) = self.input.split_at(n);
        self.input = tail;

        Ok(head)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DeserializerError> {
        let mut result = [0u8; N];
        result.copy_from_slice(self.take(N)?);

        Ok(result)
    }

    pub fn peek_constructor_number(&self) -> Result<u32, DeserializerError> {
        let Some(bytes) = self.input.get(..4) else {
            return Err(DeserializerError::UnexpectedEof { need: 4, left: self.input.len() });
        };

        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn parse_constructor_number(&mut self) -> Result<u32, DeserializerError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn verify_constructor_number(&mut self, expected: u32) -> Result<(), DeserializerError> {
        let constructor_number = self.parse_constructor_number()?;
        if constructor_number != expected {
            return Err(DeserializerError::UnexpectedConstructorNumber(constructor_number));
        }

        Ok(())
    }

    pub fn parse_i31(&mut self) -> Result<i32, DeserializerError> {
        Ok(self.parse_i32()? & 0x7fffffff)
    }

    pub fn parse_i32(&mut self) -> Result<i32, DeserializerError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn parse_i64(&mut self) -> Result<i64, DeserializerError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn parse_i256(&mut self) -> Result<Int256, DeserializerError> {
        self.take_array()
    }

    pub fn parse_bytes(&mut self) -> Result<Bytes, DeserializerError> {
        let first = self.take(1)?[0];
        let (prefix, len) = match first {
            0..=253 => (1, first as usize),
            254 => {
                let [a, b, c] = self.take_array()?;

                (4, u32::from_le_bytes([a, b, c, 0]) as usize)
            },
            _ => return Err(DeserializerError::InvalidLengthPrefix(first)),
        };

        let result = self.take(len)?.to_vec();
        let padding = (4 - (prefix + len) % 4) % 4;
        self.take(padding)?;

        Ok(result)
    }

    pub fn parse_string(&mut self) -> Result<String, DeserializerError> {
        let bytes = self.parse_bytes()?;

        Ok(String::from_utf8(bytes)?)
    }

    fn finish(self) -> Result<(), DeserializerError> {
        if self.input.is_empty() {
            Ok(())
        } else {
            Err(DeserializerError::TrailingBytes(self.input.len()))
        }
    }
}

pub fn from_bytes<T>(bytes: &[u8]) -> Result<T, DeserializerError>
    where T: Deserialize
{
    let mut deserializer = Deserializer::from_bytes(bytes);
    let t = T::deserialize(&mut deserializer)?;
    deserializer.finish()?;

    Ok(t)
}

/// Verifies the constructor number before reading the bare value.
pub fn from_bytes_boxed<T>(bytes: &[u8]) -> Result<T, DeserializerError>
    where T: BareType + Deserialize
{
    let mut deserializer = Deserializer::from_bytes(bytes);
    deserializer.verify_constructor_number(T::CONSTRUCTOR_NUMBER)?;
    let t = T::deserialize(&mut deserializer)?;
    deserializer.finish()?;

    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct CurrentTime {
        now: i32
    }

    impl BareType for CurrentTime {
        const CONSTRUCTOR_NUMBER: u32 = 0xe953000d;
    }

    impl Deserialize for CurrentTime {
        fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError> {
            Ok(Self { now: de.parse_i32()? })
        }
    }

    #[test]
    fn deserialize_bytes_length255() -> anyhow::Result<()> {
        let mut buf = vec![254, 255, 0, 0];
        buf.append(&mut vec![1; 255]);
        buf.append(&mut vec![0; 1]);
        let mut deserializer = Deserializer::from_bytes(&buf);

        let value = deserializer.parse_bytes()?;

        assert_eq!(value, vec![1; 255]);
        assert_eq!(deserializer.remaining(), 0);

        Ok(())
    }

    #[test]
    fn deserialize_bytes_short() -> anyhow::Result<()> {
        let buf = vec![3, 0xcc, 0xdd, 0xee, 0, 0, 0, 0];
        let mut deserializer = Deserializer::from_bytes(&buf);

        assert_eq!(deserializer.parse_bytes()?, vec![0xcc, 0xdd, 0xee]);
        assert_eq!(deserializer.parse_bytes()?, Vec::<u8>::new());

        Ok(())
    }

    #[test]
    fn deserialize_truncated_bytes() {
        let buf = vec![10, 1, 2, 3];
        let mut deserializer = Deserializer::from_bytes(&buf);

        let result = deserializer.parse_bytes();

        assert!(matches!(result, Err(DeserializerError::UnexpectedEof { need: 10, left: 3 })));
    }

    #[test]
    fn deserialize_bytes_rejects_ff_prefix() {
        let buf = vec![0xff, 1, 0, 0, 0xaa, 0, 0, 0];
        let mut deserializer = Deserializer::from_bytes(&buf);

        let result = deserializer.parse_bytes();

        assert!(matches!(result, Err(DeserializerError::InvalidLengthPrefix(0xff))));
    }

    #[test]
    fn deserialize_boxed() -> anyhow::Result<()> {
        let value: CurrentTime = from_bytes_boxed(&[0x0d, 0x00, 0x53, 0xe9, 0x10, 0x00, 0x00, 0x00])?;

        assert_eq!(value, CurrentTime { now: 16 });

        Ok(())
    }

    #[test]
    fn deserialize_boxed_wrong_constructor() {
        let result = from_bytes_boxed::<CurrentTime>(&[0x00, 0x00, 0x53, 0xe9, 0x10, 0x00, 0x00, 0x00]);

        assert!(matches!(result, Err(DeserializerError::UnexpectedConstructorNumber(0xe9530000))));
    }

    #[test]
    fn deserialize_trailing_bytes() {
        let result = from_bytes_boxed::<CurrentTime>(&[0x0d, 0x00, 0x53, 0xe9, 0x10, 0x00, 0x00, 0x00, 0x01]);

        assert!(matches!(result, Err(DeserializerError::TrailingBytes(1))));
    }

    #[test]
    fn deserialize_vector() -> anyhow::Result<()> {
        let value: Vec<CurrentTime> = from_bytes(&[2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0])?;

        assert_eq!(value, vec![CurrentTime { now: 1 }, CurrentTime { now: 2 }]);

        Ok(())
    }
}
