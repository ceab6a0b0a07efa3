use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use sha2::{Digest, Sha256};
use crate::error::{Result, TonTypesError};
use crate::slice::CellSlice;

pub const MAX_BITS: usize = 1023;
pub const MAX_REFS: usize = 4;

pub type CellRef = Arc<Cell>;
pub type CellHash = [u8; 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    Ordinary,
    PrunedBranch,
    LibraryReference,
    MerkleProof,
    MerkleUpdate,
}

impl CellType {
    fn from_exotic_tag(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Self::PrunedBranch),
            2 => Ok(Self::LibraryReference),
            3 => Ok(Self::MerkleProof),
            4 => Ok(Self::MerkleUpdate),
            _ => Err(TonTypesError::UnexpectedTag { name: "exotic cell", tag: tag as u64 })
        }
    }

    pub fn is_exotic(&self) -> bool {
        !matches!(self, CellType::Ordinary)
    }
}

/// Immutable cell. Representation hash and depth are computed once, at construction.
///
/// Hashes of cells with a non-zero level are computed from the stored descriptor
/// as if they were level zero, which is enough to address them inside a bag of cells.
#[derive(PartialEq, Eq)]
pub struct Cell {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<CellRef>,
    cell_type: CellType,
    level_mask: u8,
    hash: CellHash,
    depth: u16,
}

impl Cell {
    pub fn new(data: Vec<u8>, bit_len: usize, refs: Vec<CellRef>, exotic: bool, level_mask: u8) -> Result<Self> {
        if bit_len > MAX_BITS {
            return Err(TonTypesError::CellOverflow(bit_len));
        }
        if refs.len() > MAX_REFS {
            return Err(TonTypesError::TooManyReferences);
        }
        if data.len() != bit_len.div_ceil(8) {
            return Err(TonTypesError::InvalidBoc(format!("{} bytes of data for {} bits", data.len(), bit_len)));
        }

        let cell_type = if exotic {
            let Some(tag) = data.first() else {
                return Err(TonTypesError::InvalidBoc("exotic cell without type".to_owned()));
            };

            CellType::from_exotic_tag(*tag)?
        } else {
            CellType::Ordinary
        };

        let depth = refs.iter()
            .map(|r| r.depth + 1)
            .max()
            .unwrap_or(0);

        let mut cell = Self { data, bit_len, refs, cell_type, level_mask, hash: [0; 32], depth };
        cell.hash = cell.compute_hash();

        Ok(cell)
    }

    pub fn empty() -> Self {
        Self {
            data: vec![],
            bit_len: 0,
            refs: vec![],
            cell_type: CellType::Ordinary,
            level_mask: 0,
            hash: Sha256::digest([0u8, 0u8]).into(),
            depth: 0,
        }
    }

    fn compute_hash(&self) -> CellHash {
        let mut hasher = Sha256::new();
        hasher.update([self.refs_descriptor(), self.bits_descriptor()]);
        hasher.update(self.padded_data());
        for r in &self.refs {
            hasher.update(r.depth.to_be_bytes());
        }
        for r in &self.refs {
            hasher.update(r.hash);
        }

        hasher.finalize().into()
    }

    pub(crate) fn refs_descriptor(&self) -> u8 {
        self.refs.len() as u8 + if self.cell_type.is_exotic() { 8 } else { 0 } + self.level_mask * 32
    }

    pub(crate) fn bits_descriptor(&self) -> u8 {
        (self.bit_len / 8 + self.bit_len.div_ceil(8)) as u8
    }

    /// Data with the completion tag appended when the bit length is not byte-aligned.
    pub(crate) fn padded_data(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        let rem = self.bit_len % 8;
        if rem > 0 {
            if let Some(last) = data.last_mut() {
                *last |= 0x80 >> rem;
            }
        }

        data
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn references(&self) -> &[CellRef] {
        &self.refs
    }

    pub fn reference(&self, index: usize) -> Result<&CellRef> {
        self.refs.get(index).ok_or(TonTypesError::NoReference(index))
    }

    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    pub fn is_exotic(&self) -> bool {
        self.cell_type.is_exotic()
    }

    pub fn level_mask(&self) -> u8 {
        self.level_mask
    }

    pub fn hash(&self) -> CellHash {
        self.hash
    }

    pub fn depth(&self) -> u16 {
        self.depth
    }

    pub fn parser(&self) -> CellSlice<'_> {
        CellSlice::new(self)
    }
}

impl Debug for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("type", &self.cell_type)
            .field("data", &hex::encode(&self.data))
            .field("bits", &self.bit_len)
            .field("refs", &self.refs.len())
            .field("hash", &hex::encode(self.hash))
            .finish()
    }
}
