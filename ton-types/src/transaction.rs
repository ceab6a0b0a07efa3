use crate::bag_of_cells::BagOfCells;
use crate::cell::{CellHash, CellRef, CellType};
use crate::coins::Coins;
use crate::error::{Result, TonTypesError};

const TRANSACTION_TAG: u64 = 0b0111;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub hash: CellHash,
    pub account_addr: [u8; 32],
    pub lt: u64,
    pub prev_trans_hash: [u8; 32],
    pub prev_trans_lt: u64,
    pub now: u32,
    pub outmsg_cnt: u16,
    pub in_msg: Option<CellRef>,
    pub total_fees: Coins,
}

impl Transaction {
    pub fn from_cell(cell: &CellRef) -> Result<Self> {
        if cell.cell_type() == CellType::PrunedBranch {
            return Err(TonTypesError::PrunedBranch("transaction"));
        }

        let mut slice = cell.parser();
        let tag = slice.load_uint(4)?;
        if tag != TRANSACTION_TAG {
            return Err(TonTypesError::UnexpectedTag { name: "Transaction", tag });
        }

        let account_addr = slice.load_u256()?;
        let lt = slice.load_u64()?;
        let prev_trans_hash = slice.load_u256()?;
        let prev_trans_lt = slice.load_u64()?;
        let now = slice.load_u32()?;
        let outmsg_cnt = slice.load_uint(15)? as u16;
        // orig_status:AccountStatus end_status:AccountStatus
        slice.skip_bits(4)?;

        // ^[ in_msg:(Maybe ^(Message Any)) out_msgs:(HashmapE 15 ^(Message Any)) ]
        let messages = slice.load_reference()?;
        let in_msg = messages.parser().load_maybe_reference()?.cloned();

        let total_fees = slice.load_currency_collection()?;

        Ok(Self {
            hash: cell.hash(),
            account_addr,
            lt,
            prev_trans_hash,
            prev_trans_lt,
            now,
            outmsg_cnt,
            in_msg,
            total_fees,
        })
    }

    /// Transactions of `liteServer.transactionList`, one root per transaction.
    pub fn list_from_boc(bytes: &[u8]) -> Result<Vec<Self>> {
        if bytes.is_empty() {
            return Ok(vec![]);
        }

        BagOfCells::parse(bytes)?
            .roots
            .iter()
            .map(Self::from_cell)
            .collect()
    }

    pub fn in_msg_hash(&self) -> Option<CellHash> {
        self.in_msg.as_ref().map(|msg| msg.hash())
    }

    /// `ext_in_msg_info$10`
    pub fn in_msg_is_external(&self) -> Result<bool> {
        match &self.in_msg {
            Some(msg) => Ok(msg.parser().load_uint(2)? == 0b10),
            None => Ok(false)
        }
    }
}
