use ed25519_dalek::{Signer, SigningKey};
use ton_types::address::Address;
use ton_types::bag_of_cells::BagOfCells;
use ton_types::builder::CellBuilder;
use ton_types::cell::CellRef;
use ton_types::message::{ExternalInMessage, StateInit};
use crate::message::WalletMessage;
use crate::TonContractError;

const WALLET_V4R2_CODE: &str = "te6cckECFAEAAtQAART/APSkE/S88sgLAQIBIAIDAgFIBAUE+PKDCNcYINMf0x/THwL4I7vyZO1E0NMf0x/T//QE0VFDuvKhUVG68qIF+QFUEGT5EPKj+AAkpMjLH1JAyx9SMMv/UhD0AMntVPgPAdMHIcAAn2xRkyDXSpbTB9QC+wDoMOAhwAHjACHAAuMAAcADkTDjDQOkyMsfEssfy/8QERITAubQAdDTAyFxsJJfBOAi10nBIJJfBOAC0x8hghBwbHVnvSKCEGRzdHK9sJJfBeAD+kAwIPpEAcjKB8v/ydDtRNCBAUDXIfQEMFyBAQj0Cm+hMbOSXwfgBdM/yCWCEHBsdWe6kjgw4w0DghBkc3RyupJfBuMNBgcCASAICQB4AfoA9AQw+CdvIjBQCqEhvvLgUIIQcGx1Z4MesXCAGFAEywUmzxZY+gIZ9ADLaRfLH1Jgyz8gyYBA+wAGAIpQBIEBCPRZMO1E0IEBQNcgyAHPFvQAye1UAXKwjiOCEGRzdHKDHrFwgBhQBcsFUAPPFiP6AhPLassfyz/JgED7AJJfA+ICASAKCwBZvSQrb2omhAgKBrkPoCGEcNQICEekk30pkQzmkD6f+YN4EoAbeBAUiYcVnzGEAgFYDA0AEbjJftRNDXCx+AA9sp37UTQgQFA1yH0BDACyMoHy//J0AGBAQj0Cm+hMYAIBIA4PABmtznaiaEAga5Drhf/AABmvHfaiaEAQa5DrhY/AAG7SB/oA1NQi+QAFyMoHFcv/ydB3dIAYyMsFywIizxZQBfoCFMtrEszMyXP7AMhAFIEBCPRR8qcCAHCBAQjXGPoA0z/IVCBHgQEI9FHyp4IQbm90ZXB0gBjIywXLAlAGzxZQBPoCFMtqEssfyz/Jc/sAAgBsgQEI1xj6ANM/MFIkgQEI9Fnyp4IQZHN0cnB0gBjIywXLAlAFzxZQA/oCE8tqyx8Syz/Jc/sAAAr0AMntVGliJeU=";

pub const DEFAULT_WALLET_ID: u32 = 698983191;

/// Standard wallet v4 revision 2 in the basechain.
#[derive(Debug, Clone)]
pub struct WalletV4R2 {
    signing_key: SigningKey,
    wallet_id: u32,
    state_init: StateInit,
    address: Address,
}

impl WalletV4R2 {
    pub const MAX_MESSAGES: usize = 4;

    pub fn from_key(signing_key: SigningKey) -> Result<Self, TonContractError> {
        Self::with_wallet_id(signing_key, DEFAULT_WALLET_ID)
    }

    pub fn with_wallet_id(signing_key: SigningKey, wallet_id: u32) -> Result<Self, TonContractError> {
        let code = BagOfCells::parse_base64(WALLET_V4R2_CODE)?.single_root()?.clone();

        let data = CellBuilder::new()
            .store_u32(0)?
            .store_u32(wallet_id)?
            .store_slice(signing_key.verifying_key().as_bytes())?
            // plugins:(HashmapE 256 Unit)
            .store_bit(false)?
            .build_ref()?;

        let state_init = StateInit { code: Some(code), data: Some(data) };
        let address = state_init.address(0)?;

        Ok(Self { signing_key, wallet_id, state_init, address })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn state_init(&self) -> &StateInit {
        &self.state_init
    }

    /// Signed external message, carrying the state init when the wallet is not deployed.
    pub fn create_transfer(&self, messages: &[WalletMessage], seqno: u32, valid_until: u32, deployed: bool) -> Result<CellRef, TonContractError> {
        if messages.len() > Self::MAX_MESSAGES {
            return Err(TonContractError::TooManyMessages(messages.len(), Self::MAX_MESSAGES));
        }

        let messages = messages.iter()
            .map(|m| Ok((m.mode, m.message.to_cell()?)))
            .collect::<Result<Vec<_>, TonContractError>>()?;

        let unsigned = self.store_body(CellBuilder::new(), &messages, seqno, valid_until)?.build()?;
        let signature = self.signing_key.sign(&unsigned.hash());

        let mut builder = CellBuilder::new();
        builder.store_slice(&signature.to_bytes())?;
        let body = self.store_body(builder, &messages, seqno, valid_until)?.build_ref()?;

        let message = ExternalInMessage {
            destination: self.address,
            state_init: (!deployed).then(|| self.state_init.clone()),
            body,
        };

        Ok(message.to_cell()?)
    }

    fn store_body(&self, mut builder: CellBuilder, messages: &[(u8, CellRef)], seqno: u32, valid_until: u32) -> Result<CellBuilder, TonContractError> {
        builder
            .store_u32(self.wallet_id)?
            .store_u32(valid_until)?
            .store_u32(seqno)?
            // op: simple send
            .store_u8(0)?;

        for (mode, message) in messages {
            builder.store_u8(*mode)?.store_reference(message.clone())?;
        }

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use ton_types::coins::Coins;
    use ton_types::message::InternalMessage;
    use crate::message::{IGNORE_ERRORS, PAY_GAS_SEPARATELY};
    use crate::mnemonic::Mnemonic;
    use crate::mnemonic::tests::PHRASE;
    use super::*;

    fn given_wallet() -> anyhow::Result<WalletV4R2> {
        let key = Mnemonic::from_words(PHRASE.split_whitespace(), None)?.to_key_pair();

        Ok(WalletV4R2::from_key(key)?)
    }

    fn given_message(bounce: bool, nano: u128) -> anyhow::Result<WalletMessage> {
        Ok(WalletMessage::new(PAY_GAS_SEPARATELY | IGNORE_ERRORS, InternalMessage {
            ihr_disabled: true,
            bounce,
            destination: Address::from_str("EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEMS")?,
            value: Coins::from_nano(nano),
            body: None,
        }))
    }

    #[test]
    fn wallet_code_hash() -> anyhow::Result<()> {
        let wallet = given_wallet()?;

        let code = wallet.state_init().code.as_ref().ok_or(anyhow::anyhow!("no code"))?;

        assert_eq!(hex::encode(code.hash()), "feb5ff6820e2ff0d9483e7e0d62c817d846789fb4ae580c878866d959dabd5c0");

        Ok(())
    }

    #[test]
    fn wallet_address_from_mnemonic() -> anyhow::Result<()> {
        let wallet = given_wallet()?;

        assert_eq!(wallet.address().to_raw_string(), "0:9405c9ab79c51d0b8cdaaa5bb7c4d51e99945c68314437cef603ecf3d63a2ebc");
        assert_eq!(wallet.address().to_string(), "EQCUBcmrecUdC4zaqlu3xNUemZRcaDFEN872A-zz1jouvJld");

        Ok(())
    }

    #[test]
    fn create_transfer_with_deploy() -> anyhow::Result<()> {
        let wallet = given_wallet()?;
        let messages = [given_message(true, 1_000_000_000)?, given_message(false, 5_000_000)?];

        let external = wallet.create_transfer(&messages, 0, 1_700_000_000, false)?;

        let body = external.reference(1)?;
        assert_eq!(hex::encode(&body.data()[..64]), "f5ff2b32fa82dc9a12653110112a8a2bf5a7b292085492386b0ea5efbd7e75a81494a25e7b9fb85dd114e2fa0b985956d0591bd0fe9b19e0c961c01b4a492305");
        assert_eq!(hex::encode(body.hash()), "1001945aed8906108006499c907c2b04a9b7d05eb48feb5b89dfa221b24239cd");
        assert_eq!(hex::encode(external.hash()), "ea69e72e3e925497bb93460dd61ee3a67fc58499ac0dc2b083ce0315671be87b");

        Ok(())
    }

    #[test]
    fn create_transfer_deployed() -> anyhow::Result<()> {
        let wallet = given_wallet()?;

        let external = wallet.create_transfer(&[given_message(true, 1_000_000_000)?], 5, 1_700_000_000, true)?;

        assert_eq!(external.references().len(), 1);
        assert_eq!(hex::encode(external.hash()), "59bb959d140798f37e180157a7188540d8b027cc3c1db0a8e09b4aefab728962");

        Ok(())
    }

    #[test]
    fn create_transfer_too_many_messages() -> anyhow::Result<()> {
        let wallet = given_wallet()?;
        let messages = vec![given_message(true, 1)?; 5];

        let result = wallet.create_transfer(&messages, 0, 0, true);

        assert!(matches!(result, Err(TonContractError::TooManyMessages(5, 4))));

        Ok(())
    }
}
