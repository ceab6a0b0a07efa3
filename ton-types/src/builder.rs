use std::sync::Arc;
use bitvec::prelude::{BitSlice, BitVec, Msb0};
use bitvec::view::BitView;
use crate::address::Address;
use crate::cell::{Cell, CellRef, MAX_BITS, MAX_REFS};
use crate::coins::Coins;
use crate::error::{Result, TonTypesError};

#[derive(Debug, Default, Clone)]
pub struct CellBuilder {
    bits: BitVec<u8, Msb0>,
    refs: Vec<CellRef>,
}

impl CellBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_bits(&self, n: usize) -> Result<()> {
        if self.bits.len() + n > MAX_BITS {
            return Err(TonTypesError::CellOverflow(self.bits.len() + n));
        }

        Ok(())
    }

    pub fn bits_left(&self) -> usize {
        MAX_BITS - self.bits.len()
    }

    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self> {
        self.ensure_bits(1)?;
        self.bits.push(bit);

        Ok(self)
    }

    pub fn store_uint(&mut self, bits: usize, value: u64) -> Result<&mut Self> {
        if bits > 64 || (bits < 64 && value >> bits != 0) {
            return Err(TonTypesError::ValueOverflow { value: value as u128, bits });
        }
        self.ensure_bits(bits)?;

        let bytes = value.to_be_bytes();
        self.bits.extend_from_bitslice(&bytes.view_bits::<Msb0>()[64 - bits..]);

        Ok(self)
    }

    pub fn store_u8(&mut self, value: u8) -> Result<&mut Self> {
        self.store_uint(8, value as u64)
    }

    pub fn store_u32(&mut self, value: u32) -> Result<&mut Self> {
        self.store_uint(32, value as u64)
    }

    pub fn store_u64(&mut self, value: u64) -> Result<&mut Self> {
        self.store_uint(64, value)
    }

    pub fn store_i8(&mut self, value: i8) -> Result<&mut Self> {
        self.store_uint(8, value as u8 as u64)
    }

    pub fn store_bits(&mut self, bits: &BitSlice<u8, Msb0>) -> Result<&mut Self> {
        self.ensure_bits(bits.len())?;
        self.bits.extend_from_bitslice(bits);

        Ok(self)
    }

    pub fn store_slice(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.store_bits(bytes.view_bits::<Msb0>())
    }

    /// `VarUInteger n` with a length prefix of `len_bits` bits.
    pub fn store_var_uint(&mut self, len_bits: usize, value: u128) -> Result<&mut Self> {
        let len = (128 - value.leading_zeros() as usize).div_ceil(8);
        if len >= 1 << len_bits {
            return Err(TonTypesError::ValueOverflow { value, bits: (1 << len_bits) * 8 - 8 });
        }

        self.store_uint(len_bits, len as u64)?;
        let bytes = value.to_be_bytes();
        self.store_slice(&bytes[16 - len..])
    }

    pub fn store_coins(&mut self, coins: Coins) -> Result<&mut Self> {
        self.store_var_uint(4, coins.nano())
    }

    /// `addr_none$00` for `None`, otherwise `addr_std$10` without anycast.
    pub fn store_address(&mut self, address: Option<&Address>) -> Result<&mut Self> {
        let Some(address) = address else {
            return self.store_uint(2, 0);
        };

        let workchain = i8::try_from(address.workchain)
            .map_err(|_| TonTypesError::InvalidAddress(format!("workchain {} doesn't fit addr_std", address.workchain)))?;

        self.store_uint(2, 0b10)?
            .store_bit(false)?
            .store_i8(workchain)?
            .store_slice(&address.hash)
    }

    pub fn store_reference(&mut self, cell: CellRef) -> Result<&mut Self> {
        if self.refs.len() >= MAX_REFS {
            return Err(TonTypesError::TooManyReferences);
        }
        self.refs.push(cell);

        Ok(self)
    }

    pub fn store_maybe_reference(&mut self, cell: Option<CellRef>) -> Result<&mut Self> {
        match cell {
            Some(cell) => self.store_bit(true)?.store_reference(cell),
            None => self.store_bit(false)
        }
    }

    pub fn build(&self) -> Result<Cell> {
        let mut bits = self.bits.clone();
        let bit_len = bits.len();
        bits.set_uninitialized(false);

        Cell::new(bits.into_vec(), bit_len, self.refs.clone(), false, 0)
    }

    pub fn build_ref(&self) -> Result<CellRef> {
        Ok(Arc::new(self.build()?))
    }
}
