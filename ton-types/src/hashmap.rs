use bitvec::prelude::{BitSlice, BitVec, Msb0};
use crate::cell::{CellRef, CellType};
use crate::error::{Result, TonTypesError};
use crate::slice::CellSlice;

/// Bits needed for `#<= m`.
const fn len_bits(m: usize) -> usize {
    (usize::BITS - m.leading_zeros()) as usize
}

/// `HmLabel ~n m`.
pub(crate) fn load_label(slice: &mut CellSlice, m: usize) -> Result<BitVec<u8, Msb0>> {
    let mut label = BitVec::new();

    if !slice.load_bit()? {
        // hml_short$0 len:(Unary ~n) s:(n * Bit)
        let mut n = 0;
        while slice.load_bit()? {
            n += 1;
        }
        for _ in 0..n {
            label.push(slice.load_bit()?);
        }
    } else if !slice.load_bit()? {
        // hml_long$10 n:(#<= m) s:(n * Bit)
        let n = slice.load_uint(len_bits(m))? as usize;
        for _ in 0..n {
            label.push(slice.load_bit()?);
        }
    } else {
        // hml_same$11 v:Bit n:(#<= m)
        let v = slice.load_bit()?;
        let n = slice.load_uint(len_bits(m))? as usize;
        label.resize(n, v);
    }

    if label.len() > m {
        return Err(TonTypesError::UnexpectedTag { name: "HmLabel", tag: label.len() as u64 });
    }

    Ok(label)
}

/// Looks up `key` in a non-empty `HashmapAug n X Y` and returns the slice
/// positioned at the value, right after `extra:Y` skipped by `skip_extra`.
pub fn hashmap_aug_get<'a, F>(root: &'a CellRef, key: &BitSlice<u8, Msb0>, skip_extra: F) -> Result<CellSlice<'a>>
    where F: Fn(&mut CellSlice<'a>) -> Result<()>
{
    let mut cell = root;
    let mut key = key;

    loop {
        if cell.cell_type() == CellType::PrunedBranch {
            return Err(TonTypesError::PrunedBranch("hashmap"));
        }

        let mut slice = cell.parser();
        let label = load_label(&mut slice, key.len())?;
        if !key.starts_with(label.as_bitslice()) {
            return Err(TonTypesError::KeyNotFound);
        }
        key = &key[label.len()..];

        if key.is_empty() {
            // ahmn_leaf#_ extra:Y value:X
            skip_extra(&mut slice)?;

            return Ok(slice);
        }

        // ahmn_fork#_ left:^ right:^ extra:Y
        let branch = key[0] as usize;
        key = &key[1..];
        cell = cell.reference(branch)?;
    }
}

#[cfg(test)]
mod tests {
    use bitvec::view::BitView;
    use crate::builder::CellBuilder;
    use super::*;

    fn skip_extra(slice: &mut CellSlice) -> Result<()> {
        slice.skip_bits(4)
    }

    fn given_dictionary() -> anyhow::Result<CellRef> {
        // key 0b0000_0001: hml_long, n = 7
        let left = CellBuilder::new()
            .store_uint(2, 0b10)?
            .store_uint(3, 7)?
            .store_uint(7, 0b000_0001)?
            .store_uint(4, 1)?
            .store_u8(0xaa)?
            .build_ref()?;
        // key 0b1000_0000: hml_same, v = 0, n = 7
        let right = CellBuilder::new()
            .store_uint(2, 0b11)?
            .store_bit(false)?
            .store_uint(3, 7)?
            .store_uint(4, 2)?
            .store_u8(0xbb)?
            .build_ref()?;
        // empty hml_short label
        let root = CellBuilder::new()
            .store_uint(2, 0b00)?
            .store_reference(left)?
            .store_reference(right)?
            .store_uint(4, 3)?
            .build_ref()?;

        Ok(root)
    }

    #[test]
    fn hashmap_aug_get_left() -> anyhow::Result<()> {
        let root = given_dictionary()?;

        let mut value = hashmap_aug_get(&root, [0b0000_0001u8].view_bits::<Msb0>(), skip_extra)?;

        assert_eq!(value.load_u8()?, 0xaa);

        Ok(())
    }

    #[test]
    fn hashmap_aug_get_right() -> anyhow::Result<()> {
        let root = given_dictionary()?;

        let mut value = hashmap_aug_get(&root, [0b1000_0000u8].view_bits::<Msb0>(), skip_extra)?;

        assert_eq!(value.load_u8()?, 0xbb);

        Ok(())
    }

    #[test]
    fn hashmap_aug_get_missing() -> anyhow::Result<()> {
        let root = given_dictionary()?;

        let result = hashmap_aug_get(&root, [0b0000_0010u8].view_bits::<Msb0>(), skip_extra);

        assert!(matches!(result, Err(TonTypesError::KeyNotFound)));

        Ok(())
    }

    #[test]
    fn hm_label_short() -> anyhow::Result<()> {
        let cell = CellBuilder::new().store_uint(8, 0b0_110_101_0)?.build()?;
        let mut slice = cell.parser();

        let label = load_label(&mut slice, 32)?;

        assert_eq!(label.as_bitslice(), &[0b1010_0000u8].view_bits::<Msb0>()[..2]);

        Ok(())
    }

    #[test]
    fn hm_label_same() -> anyhow::Result<()> {
        // m = 32 needs 6 bits for the length
        let cell = CellBuilder::new().store_uint(9, 0b11_1_001000)?.build()?;
        let mut slice = cell.parser();

        let label = load_label(&mut slice, 32)?;

        assert_eq!(label.len(), 8);
        assert!(label.all());

        Ok(())
    }
}
