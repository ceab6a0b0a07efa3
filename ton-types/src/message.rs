use crate::address::Address;
use crate::builder::CellBuilder;
use crate::cell::CellRef;
use crate::coins::Coins;
use crate::error::Result;

/// `_ fixed_prefix_length:(Maybe (## 5)) special:(Maybe TickTock) code:(Maybe ^Cell) data:(Maybe ^Cell) library:(HashmapE 256 SimpleLib)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateInit {
    pub code: Option<CellRef>,
    pub data: Option<CellRef>,
}

impl StateInit {
    pub fn to_cell(&self) -> Result<CellRef> {
        CellBuilder::new()
            .store_bit(false)?
            .store_bit(false)?
            .store_maybe_reference(self.code.clone())?
            .store_maybe_reference(self.data.clone())?
            .store_bit(false)?
            .build_ref()
    }

    /// Address of a contract deployed with this state in `workchain`.
    pub fn address(&self, workchain: i32) -> Result<Address> {
        Ok(Address::new(workchain, self.to_cell()?.hash()))
    }
}

/// `int_msg_info$0` from `addr_none`, lt and timestamps are filled in by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalMessage {
    pub ihr_disabled: bool,
    pub bounce: bool,
    pub destination: Address,
    pub value: Coins,
    pub body: Option<CellRef>,
}

impl InternalMessage {
    pub fn to_cell(&self) -> Result<CellRef> {
        let mut builder = CellBuilder::new();
        builder
            .store_bit(false)?
            .store_bit(self.ihr_disabled)?
            .store_bit(self.bounce)?
            // bounced
            .store_bit(false)?
            .store_address(None)?
            .store_address(Some(&self.destination))?
            .store_coins(self.value)?
            // other:ExtraCurrencyCollection
            .store_bit(false)?
            // ihr_fee fwd_fee
            .store_coins(Coins::ZERO)?
            .store_coins(Coins::ZERO)?
            // created_lt created_at
            .store_u64(0)?
            .store_u32(0)?
            // init:(Maybe (Either StateInit ^StateInit))
            .store_bit(false)?;

        // body:(Either X ^X)
        match &self.body {
            Some(body) => builder.store_bit(true)?.store_reference(body.clone())?,
            None => builder.store_bit(false)?
        };

        builder.build_ref()
    }
}

/// `ext_in_msg_info$10` from `addr_none` with the body always stored as a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalInMessage {
    pub destination: Address,
    pub state_init: Option<StateInit>,
    pub body: CellRef,
}

impl ExternalInMessage {
    pub fn to_cell(&self) -> Result<CellRef> {
        let mut builder = CellBuilder::new();
        builder
            .store_uint(2, 0b10)?
            .store_address(None)?
            .store_address(Some(&self.destination))?
            // import_fee
            .store_coins(Coins::ZERO)?;

        match &self.state_init {
            Some(state_init) => builder
                .store_bit(true)?
                .store_bit(true)?
                .store_reference(state_init.to_cell()?)?,
            None => builder.store_bit(false)?
        };

        builder
            .store_bit(true)?
            .store_reference(self.body.clone())?
            .build_ref()
    }
}
