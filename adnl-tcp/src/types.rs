use crate::deserializer::{Deserialize, Deserializer, DeserializerError};
use crate::serializer::{Serialize, Serializer};

/// TL function, `Result` is the boxed type it evaluates to.
pub trait Functional {
    type Result;
}

/// TL constructor. The number is the crc32 of the schema line and goes on the wire as u32 LE.
pub trait BareType where Self: Sized {
    const CONSTRUCTOR_NUMBER: u32;
}

pub type Int = i32;
pub type Long = i64;
pub type Int256 = [u8; 32];
pub type Bytes = Vec<u8>;
pub type Vector<T> = Vec<T>;

impl<T> Serialize for Vector<T> where T: Serialize {
    fn serialize(&self, se: &mut Serializer) {
        se.write_i31(self.len() as i32);
        for val in self {
            val.serialize(se)
        }
    }
}

impl<T> Deserialize for Vector<T> where T: Deserialize {
    fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError> {
        let len = de.parse_i31()? as usize;
        // every TL value takes at least 4 bytes
        let mut buf = Vec::with_capacity(len.min(de.remaining() / 4));
        for _ in 0 .. len {
            buf.push(T::deserialize(de)?)
        }

        Ok(buf)
    }
}
