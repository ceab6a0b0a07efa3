use bytes::BufMut;
use crate::types::{BareType, Int256};

pub trait Serialize {
    fn serialize(&self, se: &mut Serializer);
}

#[derive(Debug, Default)]
pub struct Serializer {
    output: Vec<u8>,
}

impl Serializer {
    pub fn reserve(&mut self, additional: usize) {
        self.output.reserve(additional)
    }

    pub fn write_constructor_number(&mut self, crc32: u32) {
        self.output.put_u32_le(crc32)
    }

    pub fn write_i31(&mut self, val: i32) {
        self.output.put_i32_le(val & 0x7fffffff)
    }

    pub fn write_i32(&mut self, val: i32) {
        self.output.put_i32_le(val)
    }

    pub fn write_i64(&mut self, val: i64) {
        self.output.put_i64_le(val)
    }

    pub fn write_i256(&mut self, val: &Int256) {
        self.output.put_slice(val)
    }

    pub fn write_string(&mut self, val: &str) {
        self.write_bytes(val.as_bytes())
    }

    /// Short form up to 253 bytes, long form is `0xfe` and a 3 byte LE length. Padded to 4 bytes.
    pub fn write_bytes(&mut self, val: &[u8]) {
        let prefix = if val.len() <= 253 { 1 } else { 4 };
        let padding = (4 - (prefix + val.len()) % 4) % 4;
        self.output.reserve(prefix + val.len() + padding);

        if prefix == 1 {
            self.output.put_u8(val.len() as u8);
        } else {
            self.output.put_u8(254);
            self.output.put_slice(&(val.len() as u32).to_le_bytes()[..3]);
        }
        self.output.put_slice(val);
        self.output.put_bytes(0, padding);
    }
}

pub fn to_bytes<T>(value: &T) -> Vec<u8>
    where T: Serialize
{
    let mut serializer = Serializer::default();
    value.serialize(&mut serializer);

    serializer.output
}

/// Constructor number followed by the bare value.
pub fn to_bytes_boxed<T>(value: &T) -> Vec<u8>
    where T: BareType + Serialize
{
    let mut serializer = Serializer::default();
    serializer.write_constructor_number(T::CONSTRUCTOR_NUMBER);
    value.serialize(&mut serializer);

    serializer.output
}
