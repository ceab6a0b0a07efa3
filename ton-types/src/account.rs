use crate::address::Address;
use crate::bag_of_cells::BagOfCells;
use crate::cell::{Cell, CellRef, CellType};
use crate::coins::Coins;
use crate::error::{Result, TonTypesError};
use crate::slice::CellSlice;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountState {
    Uninit,
    Active {
        code: Option<CellRef>,
        data: Option<CellRef>,
    },
    Frozen {
        state_hash: [u8; 32],
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub last_paid: u32,
    pub last_trans_lt: u64,
    pub balance: Coins,
    pub state: AccountState,
}

impl Account {
    /// `None` for empty state and `account_none$0`.
    pub fn from_boc(bytes: &[u8]) -> Result<Option<Self>> {
        if bytes.is_empty() {
            return Ok(None);
        }

        let boc = BagOfCells::parse(bytes)?;

        Self::from_cell(boc.single_root()?)
    }

    pub fn from_cell(cell: &Cell) -> Result<Option<Self>> {
        if cell.cell_type() == CellType::PrunedBranch {
            return Err(TonTypesError::PrunedBranch("account"));
        }

        let mut slice = cell.parser();

        // account_none$0
        if !slice.load_bit()? {
            return Ok(None);
        }

        // account$1 addr:MsgAddressInt storage_stat:StorageInfo storage:AccountStorage
        let address = slice.load_address()?
            .ok_or_else(|| TonTypesError::InvalidAddress("account without address".to_owned()))?;
        let last_paid = Self::skip_storage_info(&mut slice)?;

        // account_storage$_ last_trans_lt:uint64 balance:CurrencyCollection state:AccountState
        let last_trans_lt = slice.load_u64()?;
        let balance = slice.load_currency_collection()?;
        let state = Self::load_state(&mut slice)?;

        Ok(Some(Self { address, last_paid, last_trans_lt, balance, state }))
    }

    /// Skips `StorageInfo` and returns `last_paid`.
    fn skip_storage_info(slice: &mut CellSlice) -> Result<u32> {
        // storage_used$_ cells:(VarUInteger 7) bits:(VarUInteger 7)
        slice.load_var_uint(3)?;
        slice.load_var_uint(3)?;

        // storage_extra_none$000 | storage_extra_info$001 dict_hash:uint256
        match slice.load_uint(3)? {
            0b000 => {},
            0b001 => slice.skip_bits(256)?,
            tag => return Err(TonTypesError::UnexpectedTag { name: "StorageExtraInfo", tag })
        }

        let last_paid = slice.load_u32()?;
        // due_payment:(Maybe Grams)
        if slice.load_bit()? {
            slice.load_coins()?;
        }

        Ok(last_paid)
    }

    fn load_state(slice: &mut CellSlice) -> Result<AccountState> {
        if slice.load_bit()? {
            // account_active$1 _:StateInit
            // fixed_prefix_length:(Maybe (## 5)) special:(Maybe TickTock)
            if slice.load_bit()? {
                slice.skip_bits(5)?;
            }
            if slice.load_bit()? {
                slice.skip_bits(2)?;
            }
            let code = slice.load_maybe_reference()?.cloned();
            let data = slice.load_maybe_reference()?.cloned();

            Ok(AccountState::Active { code, data })
        } else if slice.load_bit()? {
            // account_frozen$01 state_hash:bits256
            Ok(AccountState::Frozen { state_hash: slice.load_u256()? })
        } else {
            // account_uninit$00
            Ok(AccountState::Uninit)
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, AccountState::Active { .. })
    }

    /// First 32 bits of the data cell of an active account, the seqno of standard wallets.
    pub fn data_seqno(&self) -> Result<Option<u32>> {
        match &self.state {
            AccountState::Active { data: Some(data), .. } => Ok(Some(data.parser().load_u32()?)),
            _ => Ok(None)
        }
    }
}
