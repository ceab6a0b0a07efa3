use bitvec::prelude::Msb0;
use bitvec::view::BitView;
use crate::address::Address;
use crate::bag_of_cells::BagOfCells;
use crate::cell::{CellRef, CellType};
use crate::error::{Result, TonTypesError};
use crate::hashmap::hashmap_aug_get;
use crate::slice::CellSlice;

const SHARD_STATE_UNSPLIT: u64 = 0x9023afe2;

/// `account_descr$_ account:^Account last_trans_hash:bits256 last_trans_lt:uint64`,
/// the account cell itself is usually pruned in proofs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardAccount {
    pub last_trans_hash: [u8; 32],
    pub last_trans_lt: u64,
}

impl ShardAccount {
    /// Reads the account descriptor from the state proof of `liteServer.accountState`,
    /// the second root of the proof bag of cells. Proofs are navigated, not verified.
    pub fn from_proof(proof: &[u8], address: &Address) -> Result<Option<Self>> {
        let boc = BagOfCells::parse(proof)?;
        let Some(state_proof) = boc.roots.get(1) else {
            return Err(TonTypesError::InvalidBoc(format!("expected 2 roots in account proof, got {}", boc.roots.len())));
        };

        Self::from_state_proof(state_proof, address)
    }

    pub fn from_state_proof(proof: &CellRef, address: &Address) -> Result<Option<Self>> {
        if proof.cell_type() != CellType::MerkleProof {
            return Err(TonTypesError::UnexpectedTag { name: "MerkleProof", tag: proof.data().first().copied().unwrap_or_default() as u64 });
        }

        let state = proof.reference(0)?;
        if state.cell_type() == CellType::PrunedBranch {
            return Err(TonTypesError::PrunedBranch("shard state"));
        }
        let tag = state.parser().load_u32()? as u64;
        if tag != SHARD_STATE_UNSPLIT {
            return Err(TonTypesError::UnexpectedTag { name: "ShardStateUnsplit", tag });
        }

        // out_msg_queue_info:^OutMsgQueueInfo ... accounts:^ShardAccounts
        let accounts = state.reference(1)?;
        let mut slice = accounts.parser();
        // ahme_empty$0 | ahme_root$1 root:^(HashmapAug 256 ShardAccount DepthBalanceInfo)
        let Some(root) = slice.load_maybe_reference()? else {
            return Ok(None);
        };

        let mut value = match hashmap_aug_get(root, address.hash.view_bits::<Msb0>(), skip_depth_balance_info) {
            Ok(value) => value,
            Err(TonTypesError::KeyNotFound) => return Ok(None),
            Err(e) => return Err(e)
        };

        value.load_reference()?;
        let last_trans_hash = value.load_u256()?;
        let last_trans_lt = value.load_u64()?;

        Ok(Some(Self { last_trans_hash, last_trans_lt }))
    }
}

/// `depth_balance$_ split_depth:(#<= 30) balance:CurrencyCollection`
fn skip_depth_balance_info(slice: &mut CellSlice) -> Result<()> {
    slice.skip_bits(5)?;
    slice.load_currency_collection()?;

    Ok(())
}
