use std::collections::HashMap;
use std::sync::Arc;
use base64::Engine;
use crc::Crc;
use crate::cell::{Cell, CellHash, CellRef};
use crate::error::{Result, TonTypesError};

const MAGIC: u32 = 0xb5ee9c72;
const CRC32C: Crc<u32> = Crc::<u32>::new(&crc::CRC_32_ISCSI);

/// `serialized_boc#b5ee9c72`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagOfCells {
    pub roots: Vec<CellRef>,
}

struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.input.len() - self.pos < n {
            return Err(TonTypesError::InvalidBoc(format!("unexpected end of data at {}, need {} bytes", self.pos, n)));
        }
        let bytes = &self.input[self.pos..self.pos + n];
        self.pos += n;

        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn sized(&mut self, size: usize) -> Result<usize> {
        Ok(self.take(size)?
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | *b as usize))
    }
}

struct RawCell {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<usize>,
    exotic: bool,
    level_mask: u8,
}

impl BagOfCells {
    pub fn single_root(&self) -> Result<&CellRef> {
        match self.roots.as_slice() {
            [root] => Ok(root),
            roots => Err(TonTypesError::InvalidBoc(format!("expected single root, got {}", roots.len())))
        }
    }

    pub fn parse(input: &[u8]) -> Result<Self> {
        let mut reader = Reader { input, pos: 0 };

        let magic = u32::from_be_bytes(reader.take(4)?.try_into().map_err(|_| TonTypesError::InvalidBoc("magic".to_owned()))?);
        if magic != MAGIC {
            return Err(TonTypesError::InvalidBoc(format!("unexpected magic {:#010x}", magic)));
        }

        // has_idx:(## 1) has_crc32c:(## 1) has_cache_bits:(## 1) flags:(## 2) size:(## 3)
        let flags_and_size = reader.u8()?;
        let has_idx = flags_and_size & 0b1000_0000 > 0;
        let has_crc32c = flags_and_size & 0b0100_0000 > 0;
        let size = (flags_and_size & 0b0000_0111) as usize;
        if size == 0 || size > 4 {
            return Err(TonTypesError::InvalidBoc(format!("invalid ref size {}", size)));
        }
        let off_bytes = reader.u8()? as usize;
        if off_bytes == 0 || off_bytes > 8 {
            return Err(TonTypesError::InvalidBoc(format!("invalid offset size {}", off_bytes)));
        }

        let cells_count = reader.sized(size)?;
        let roots_count = reader.sized(size)?;
        let absent = reader.sized(size)?;
        let tot_cells_size = reader.sized(off_bytes)?;
        if roots_count + absent > cells_count {
            return Err(TonTypesError::InvalidBoc(format!("{} roots and {} absent of {} cells", roots_count, absent, cells_count)));
        }

        let root_list = (0..roots_count)
            .map(|_| reader.sized(size))
            .collect::<Result<Vec<_>>>()?;
        if has_idx {
            reader.take(cells_count * off_bytes)?;
        }

        let cells_start = reader.pos;
        let mut raw_cells = Vec::with_capacity(cells_count);
        for _ in 0..cells_count {
            raw_cells.push(Self::parse_cell(&mut reader, size)?);
        }
        if reader.pos - cells_start != tot_cells_size {
            return Err(TonTypesError::InvalidBoc(format!("cells take {} bytes, declared {}", reader.pos - cells_start, tot_cells_size)));
        }

        if has_crc32c {
            let actual = CRC32C.checksum(&input[..reader.pos]);
            let expected = u32::from_le_bytes(reader.take(4)?.try_into().map_err(|_| TonTypesError::InvalidBoc("crc32c".to_owned()))?);
            if expected != actual {
                return Err(TonTypesError::Crc32cMismatch { expected, actual });
            }
        }

        // references always point forward, so build from the tail
        let mut cells: Vec<Option<CellRef>> = vec![None; cells_count];
        for (index, raw) in raw_cells.into_iter().enumerate().rev() {
            let refs = raw.refs.iter()
                .map(|&r| {
                    if r <= index {
                        return Err(TonTypesError::InvalidBoc(format!("cell {} refers back to {}", index, r)));
                    }
                    cells.get(r)
                        .and_then(|c| c.clone())
                        .ok_or_else(|| TonTypesError::InvalidBoc(format!("cell {} refers to missing {}", index, r)))
                })
                .collect::<Result<Vec<_>>>()?;

            let cell = Cell::new(raw.data, raw.bit_len, refs, raw.exotic, raw.level_mask)?;
            cells[index] = Some(Arc::new(cell));
        }

        let roots = root_list.into_iter()
            .map(|i| cells.get(i)
                .and_then(|c| c.clone())
                .ok_or_else(|| TonTypesError::InvalidBoc(format!("root {} out of range", i))))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { roots })
    }

    fn parse_cell(reader: &mut Reader, size: usize) -> Result<RawCell> {
        let refs_descriptor = reader.u8()?;
        let bits_descriptor = reader.u8()?;

        let refs_count = (refs_descriptor & 0b0000_0111) as usize;
        let exotic = refs_descriptor & 0b0000_1000 > 0;
        let with_hashes = refs_descriptor & 0b0001_0000 > 0;
        let level_mask = refs_descriptor >> 5;
        if refs_count > 4 {
            return Err(TonTypesError::InvalidBoc(format!("{} references", refs_count)));
        }

        if with_hashes {
            let hashes = level_mask.count_ones() as usize + 1;
            reader.take(hashes * (32 + 2))?;
        }

        // bits_descriptor is the number of 4-bit groups in content
        let len = bits_descriptor.div_ceil(2) as usize;
        let mut data = reader.take(len)?.to_vec();

        let bit_len = if bits_descriptor % 2 > 0 {
            // the last byte ends with the completion tag, clear it
            let Some(last) = data.last_mut().filter(|b| **b != 0) else {
                return Err(TonTypesError::InvalidBoc("missing completion tag".to_owned()));
            };
            let tag = last.trailing_zeros() as usize;
            *last &= !(1u8 << tag);

            len * 8 - tag - 1
        } else {
            len * 8
        };
        data.truncate(bit_len.div_ceil(8));

        let refs = (0..refs_count)
            .map(|_| reader.sized(size))
            .collect::<Result<Vec<_>>>()?;

        Ok(RawCell { data, bit_len, refs, exotic, level_mask })
    }

    pub fn parse_base64(input: &str) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(input)?;

        Self::parse(&bytes)
    }

    /// Serializes a single root without index.
    pub fn serialize(root: &CellRef, with_crc32c: bool) -> Result<Vec<u8>> {
        let cells = Self::topological_order(root);
        let indexes: HashMap<CellHash, usize> = cells.iter()
            .enumerate()
            .map(|(i, c)| (c.hash(), i))
            .collect();

        let size = bytes_for(cells.len());
        let mut cell_data = Vec::new();
        for cell in &cells {
            let data = cell.padded_data();
            cell_data.push(cell.refs_descriptor());
            cell_data.push(cell.bits_descriptor());
            cell_data.extend_from_slice(&data);
            for r in cell.references() {
                let index = indexes.get(&r.hash())
                    .ok_or_else(|| TonTypesError::InvalidBoc("unindexed reference".to_owned()))?;
                cell_data.extend_from_slice(&index.to_be_bytes()[std::mem::size_of::<usize>() - size..]);
            }
        }
        let off_bytes = bytes_for(cell_data.len());

        let put_sized = |out: &mut Vec<u8>, value: usize, size: usize| {
            out.extend_from_slice(&value.to_be_bytes()[std::mem::size_of::<usize>() - size..]);
        };

        let mut out = Vec::with_capacity(cell_data.len() + 32);
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.push(if with_crc32c { 0b0100_0000 } else { 0 } | size as u8);
        out.push(off_bytes as u8);
        put_sized(&mut out, cells.len(), size);
        put_sized(&mut out, 1, size);
        put_sized(&mut out, 0, size);
        put_sized(&mut out, cell_data.len(), off_bytes);
        put_sized(&mut out, 0, size);
        out.extend_from_slice(&cell_data);

        if with_crc32c {
            let crc32c = CRC32C.checksum(&out);
            out.extend_from_slice(&crc32c.to_le_bytes());
        }

        Ok(out)
    }

    pub fn serialize_base64(root: &CellRef) -> Result<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(Self::serialize(root, true)?))
    }

    /// Parents before children, every distinct cell once.
    fn topological_order(root: &CellRef) -> Vec<CellRef> {
        fn visit(cell: &CellRef, seen: &mut HashMap<CellHash, ()>, post_order: &mut Vec<CellRef>) {
            if seen.insert(cell.hash(), ()).is_some() {
                return;
            }
            for r in cell.references() {
                visit(r, seen, post_order);
            }
            post_order.push(cell.clone());
        }

        let mut seen = HashMap::new();
        let mut post_order = Vec::new();
        visit(root, &mut seen, &mut post_order);
        post_order.reverse();

        post_order
    }
}

fn bytes_for(value: usize) -> usize {
    let bits = usize::BITS - value.leading_zeros();

    (bits as usize).div_ceil(8).max(1)
}

#[cfg(test)]
mod tests {
    use crate::builder::CellBuilder;
    use crate::cell::CellType;
    use super::*;

    #[test]
    fn boc_deserialize_example_test() -> anyhow::Result<()> {
        let bytes = hex::decode("b5ee9c7201010301000e000201c002010101ff0200060aaaaa")?;

        let boc = BagOfCells::parse(&bytes)?;
        let root = boc.single_root()?;

        assert_eq!(root.bit_len(), 1);
        assert_eq!(root.data(), &[0x80]);
        assert_eq!(root.references().len(), 2);
        assert_eq!(root.reference(0)?.data(), &[0x0a, 0xaa, 0xaa]);
        assert_eq!(root.reference(0)?.bit_len(), 24);
        assert_eq!(root.reference(1)?.bit_len(), 7);
        assert_eq!(root.reference(1)?.data(), &[0xfe]);
        assert_eq!(root.depth(), 2);

        Ok(())
    }

    #[test]
    fn boc_wallet_code_hash() -> anyhow::Result<()> {
        let boc = BagOfCells::parse_base64(WALLET_CODE)?;

        let root = boc.single_root()?;

        assert_eq!(hex::encode(root.hash()), "feb5ff6820e2ff0d9483e7e0d62c817d846789fb4ae580c878866d959dabd5c0");
        assert_eq!(root.depth(), 7);

        Ok(())
    }

    #[test]
    fn boc_crc32c_mismatch() -> anyhow::Result<()> {
        let mut bytes = base64::engine::general_purpose::STANDARD.decode(WALLET_CODE)?;
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;

        let result = BagOfCells::parse(&bytes);

        assert!(matches!(result, Err(TonTypesError::Crc32cMismatch { .. })));

        Ok(())
    }

    #[test]
    fn boc_serialize_matches_reference() -> anyhow::Result<()> {
        let shared = CellBuilder::new().store_u32(0xdeadbeef)?.build_ref()?;
        let left = CellBuilder::new().store_uint(3, 5)?.store_reference(shared.clone())?.build_ref()?;
        let root = CellBuilder::new()
            .store_u8(1)?
            .store_reference(left)?
            .store_reference(shared)?
            .build_ref()?;

        let bytes = BagOfCells::serialize(&root, true)?;

        assert_eq!(hex::encode(&bytes), "b5ee9c7241010301000f0002020101020101b0020008deadbeefda3c404f");

        Ok(())
    }

    #[test]
    fn boc_serialize_then_parse_keeps_hash() -> anyhow::Result<()> {
        let root = BagOfCells::parse_base64(WALLET_CODE)?.single_root()?.clone();

        let bytes = BagOfCells::serialize(&root, false)?;
        let parsed = BagOfCells::parse(&bytes)?;

        assert_eq!(parsed.single_root()?.hash(), root.hash());

        Ok(())
    }

    #[test]
    fn boc_with_exotic_cells() -> anyhow::Result<()> {
        // merkle proof over a pruned branch
        let bytes = hex::decode(PROOF_BOC)?;

        let boc = BagOfCells::parse(&bytes)?;
        let root = boc.single_root()?;

        assert_eq!(root.cell_type(), CellType::MerkleProof);
        assert_eq!(root.reference(0)?.cell_type(), CellType::Ordinary);
        assert_eq!(root.reference(0)?.reference(0)?.cell_type(), CellType::PrunedBranch);
        assert_eq!(root.reference(0)?.reference(0)?.level_mask(), 1);

        Ok(())
    }

    #[test]
    fn boc_rejects_wrong_magic() {
        let result = BagOfCells::parse(&hex::decode("b5ee9c7301010301000e000201c002010101ff0200060aaaaa").unwrap_or_default());

        assert!(matches!(result, Err(TonTypesError::InvalidBoc(_))));
    }

    #[test]
    fn boc_rejects_truncated() {
        let result = BagOfCells::parse(&hex::decode("b5ee9c7201010301000e000201c002010101ff0200060aaa").unwrap_or_default());

        assert!(result.is_err());
    }

    const WALLET_CODE: &str = "te6cckECFAEAAtQAART/APSkE/S88sgLAQIBIAIDAgFIBAUE+PKDCNcYINMf0x/THwL4I7vyZO1E0NMf0x/T//QE0VFDuvKhUVG68qIF+QFUEGT5EPKj+AAkpMjLH1JAyx9SMMv/UhD0AMntVPgPAdMHIcAAn2xRkyDXSpbTB9QC+wDoMOAhwAHjACHAAuMAAcADkTDjDQOkyMsfEssfy/8QERITAubQAdDTAyFxsJJfBOAi10nBIJJfBOAC0x8hghBwbHVnvSKCEGRzdHK9sJJfBeAD+kAwIPpEAcjKB8v/ydDtRNCBAUDXIfQEMFyBAQj0Cm+hMbOSXwfgBdM/yCWCEHBsdWe6kjgw4w0DghBkc3RyupJfBuMNBgcCASAICQB4AfoA9AQw+CdvIjBQCqEhvvLgUIIQcGx1Z4MesXCAGFAEywUmzxZY+gIZ9ADLaRfLH1Jgyz8gyYBA+wAGAIpQBIEBCPRZMO1E0IEBQNcgyAHPFvQAye1UAXKwjiOCEGRzdHKDHrFwgBhQBcsFUAPPFiP6AhPLassfyz/JgED7AJJfA+ICASAKCwBZvSQrb2omhAgKBrkPoCGEcNQICEekk30pkQzmkD6f+YN4EoAbeBAUiYcVnzGEAgFYDA0AEbjJftRNDXCx+AA9sp37UTQgQFA1yH0BDACyMoHy//J0AGBAQj0Cm+hMYAIBIA4PABmtznaiaEAga5Drhf/AABmvHfaiaEAQa5DrhY/AAG7SB/oA1NQi+QAFyMoHFcv/ydB3dIAYyMsFywIizxZQBfoCFMtrEszMyXP7AMhAFIEBCPRR8qcCAHCBAQjXGPoA0z/IVCBHgQEI9FHyp4IQbm90ZXB0gBjIywXLAlAGzxZQBPoCFMtqEssfyz/Jc/sAAgBsgQEI1xj6ANM/MFIkgQEI9Fnyp4IQZHN0cnB0gBjIywXLAlAFzxZQA/oCE8tqyx8Syz/Jc/sAAAr0AMntVGliJeU=";
    const PROOF_BOC: &str = "b5ee9c7201010301005000094603a1fce4363854ff888cff4b8e7875d600c2682390412a8cf79b37d0b11148b0fa0006012102ab02284801012d711642b726b04401627ca9fbac32f5c8530fb1903cc4db02258717921a48810005";
}
