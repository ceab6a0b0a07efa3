use bitvec::prelude::{BitSlice, Msb0};
use bitvec::view::BitView;
use crate::address::Address;
use crate::cell::{Cell, CellRef};
use crate::coins::Coins;
use crate::error::{Result, TonTypesError};

/// Sequential reader over the bits and references of a cell.
#[derive(Debug, Clone)]
pub struct CellSlice<'a> {
    cell: &'a Cell,
    bits: &'a BitSlice<u8, Msb0>,
    bit_pos: usize,
    ref_pos: usize,
}

impl<'a> CellSlice<'a> {
    pub fn new(cell: &'a Cell) -> Self {
        let bits = &cell.data().view_bits::<Msb0>()[..cell.bit_len()];

        Self { cell, bits, bit_pos: 0, ref_pos: 0 }
    }

    pub fn cell(&self) -> &'a Cell {
        self.cell
    }

    pub fn remaining_bits(&self) -> usize {
        self.bits.len() - self.bit_pos
    }

    pub fn remaining_refs(&self) -> usize {
        self.cell.references().len() - self.ref_pos
    }

    fn take(&mut self, n: usize) -> Result<&'a BitSlice<u8, Msb0>> {
        let left = self.remaining_bits();
        if n > left {
            return Err(TonTypesError::CellUnderflow { need: n, left });
        }

        let bits = &self.bits[self.bit_pos..self.bit_pos + n];
        self.bit_pos += n;

        Ok(bits)
    }

    pub fn skip_bits(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    pub fn load_bit(&mut self) -> Result<bool> {
        Ok(self.take(1)?[0])
    }

    pub fn load_uint(&mut self, bits: usize) -> Result<u64> {
        if bits > 64 {
            return Err(TonTypesError::ValueOverflow { value: 0, bits });
        }

        Ok(self.take(bits)?
            .iter()
            .fold(0u64, |acc, bit| (acc << 1) | *bit as u64))
    }

    pub fn load_u8(&mut self) -> Result<u8> {
        Ok(self.load_uint(8)? as u8)
    }

    pub fn load_u16(&mut self) -> Result<u16> {
        Ok(self.load_uint(16)? as u16)
    }

    pub fn load_u32(&mut self) -> Result<u32> {
        Ok(self.load_uint(32)? as u32)
    }

    pub fn load_u64(&mut self) -> Result<u64> {
        self.load_uint(64)
    }

    pub fn load_i8(&mut self) -> Result<i8> {
        Ok(self.load_u8()? as i8)
    }

    pub fn load_i32(&mut self) -> Result<i32> {
        Ok(self.load_u32()? as i32)
    }

    /// Loads `n` bits into bytes, the last byte is padded with zeros.
    pub fn load_bits(&mut self, n: usize) -> Result<Vec<u8>> {
        let bits = self.take(n)?;
        let mut bytes = vec![0u8; n.div_ceil(8)];
        bytes.view_bits_mut::<Msb0>()[..n].copy_from_bitslice(bits);

        Ok(bytes)
    }

    pub fn load_u256(&mut self) -> Result<[u8; 32]> {
        let mut bytes = [0u8; 32];
        bytes.view_bits_mut::<Msb0>().copy_from_bitslice(self.take(256)?);

        Ok(bytes)
    }

    /// `VarUInteger n` with a length prefix of `len_bits` bits.
    pub fn load_var_uint(&mut self, len_bits: usize) -> Result<u128> {
        let len = self.load_uint(len_bits)? as usize;
        if len > 16 {
            return Err(TonTypesError::ValueOverflow { value: len as u128, bits: 128 });
        }

        Ok(self.take(len * 8)?
            .iter()
            .fold(0u128, |acc, bit| (acc << 1) | *bit as u128))
    }

    pub fn load_coins(&mut self) -> Result<Coins> {
        Ok(Coins::from_nano(self.load_var_uint(4)?))
    }

    /// `CurrencyCollection`, extra currencies are skipped.
    pub fn load_currency_collection(&mut self) -> Result<Coins> {
        let grams = self.load_coins()?;
        let _ = self.load_maybe_reference()?;

        Ok(grams)
    }

    /// `HashmapE` or `Maybe ^X`: returns the referenced root if present.
    pub fn load_maybe_reference(&mut self) -> Result<Option<&'a CellRef>> {
        if self.load_bit()? {
            Ok(Some(self.load_reference()?))
        } else {
            Ok(None)
        }
    }

    pub fn load_reference(&mut self) -> Result<&'a CellRef> {
        let cell = self.cell.reference(self.ref_pos)?;
        self.ref_pos += 1;

        Ok(cell)
    }

    /// `MsgAddress`: `None` for `addr_none` and `addr_extern`.
    pub fn load_address(&mut self) -> Result<Option<Address>> {
        match self.load_uint(2)? {
            0b00 => Ok(None),
            0b01 => {
                let len = self.load_uint(9)? as usize;
                self.skip_bits(len)?;

                Ok(None)
            }
            0b10 => {
                self.skip_anycast()?;
                let workchain = self.load_i8()? as i32;
                let hash = self.load_u256()?;

                Ok(Some(Address::new(workchain, hash)))
            }
            _ => {
                self.skip_anycast()?;
                let len = self.load_uint(9)? as usize;
                let workchain = self.load_i32()?;
                if len != 256 {
                    return Err(TonTypesError::InvalidAddress(format!("addr_var with {} bits", len)));
                }
                let hash = self.load_u256()?;

                Ok(Some(Address::new(workchain, hash)))
            }
        }
    }

    fn skip_anycast(&mut self) -> Result<()> {
        if self.load_bit()? {
            // depth:(#<= 30) rewrite_pfx:(bits depth)
            let depth = self.load_uint(5)? as usize;
            self.skip_bits(depth)?;
        }

        Ok(())
    }
}
