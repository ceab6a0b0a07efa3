use std::fmt::{Display, Formatter};
use adnl_tcp::deserializer::{Deserialize, Deserializer, DeserializerError};
use adnl_tcp::serializer::{Serialize, Serializer};
pub use adnl_tcp::types::*;

macro_rules! bare_type {
    ($name:ident, $constructor_number:literal) => {
        impl BareType for $name {
            const CONSTRUCTOR_NUMBER: u32 = $constructor_number;
        }
    };
}

/// `adnl.message.query query_id:int256 query:bytes = adnl.Message`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdnlMessageQuery {
    pub query_id: Int256,
    pub query: Bytes,
}

bare_type!(AdnlMessageQuery, 0xb48bf97a);

impl Serialize for AdnlMessageQuery {
    fn serialize(&self, se: &mut Serializer) {
        se.write_i256(&self.query_id);
        se.write_bytes(&self.query);
    }
}

impl Deserialize for AdnlMessageQuery {
    fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError> {
        Ok(Self { query_id: de.parse_i256()?, query: de.parse_bytes()? })
    }
}

/// `adnl.message.answer query_id:int256 answer:bytes = adnl.Message`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdnlMessageAnswer {
    pub query_id: Int256,
    pub answer: Bytes,
}

bare_type!(AdnlMessageAnswer, 0x0fac8416);

impl Deserialize for AdnlMessageAnswer {
    fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError> {
        Ok(Self { query_id: de.parse_i256()?, answer: de.parse_bytes()? })
    }
}

/// `liteServer.query data:bytes = Object`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteServerQuery {
    pub data: Bytes,
}

bare_type!(LiteServerQuery, 0x798c06df);

impl Serialize for LiteServerQuery {
    fn serialize(&self, se: &mut Serializer) {
        se.write_bytes(&self.data);
    }
}

/// `liteServer.waitMasterchainSeqno seqno:int timeout_ms:int = Object`, a prefix for another query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteServerWaitMasterchainSeqno {
    pub seqno: Int,
    pub timeout_ms: Int,
}

bare_type!(LiteServerWaitMasterchainSeqno, 0xbaeab892);

impl Serialize for LiteServerWaitMasterchainSeqno {
    fn serialize(&self, se: &mut Serializer) {
        se.write_i32(self.seqno);
        se.write_i32(self.timeout_ms);
    }
}

/// `liteServer.error code:int message:string = liteServer.Error`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteServerError {
    pub code: Int,
    pub message: String,
}

bare_type!(LiteServerError, 0xbba9e148);

impl Deserialize for LiteServerError {
    fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError> {
        Ok(Self { code: de.parse_i32()?, message: de.parse_string()? })
    }
}

impl Display for LiteServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error code: {}, message: {:?}", self.code, self.message)
    }
}

impl std::error::Error for LiteServerError {}

/// `tonNode.blockIdExt workchain:int shard:long seqno:int root_hash:int256 file_hash:int256`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TonNodeBlockIdExt {
    pub workchain: Int,
    pub shard: Long,
    pub seqno: Int,
    pub root_hash: Int256,
    pub file_hash: Int256,
}

impl Serialize for TonNodeBlockIdExt {
    fn serialize(&self, se: &mut Serializer) {
        se.write_i32(self.workchain);
        se.write_i64(self.shard);
        se.write_i32(self.seqno);
        se.write_i256(&self.root_hash);
        se.write_i256(&self.file_hash);
    }
}

impl Deserialize for TonNodeBlockIdExt {
    fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError> {
        Ok(Self {
            workchain: de.parse_i32()?,
            shard: de.parse_i64()?,
            seqno: de.parse_i32()?,
            root_hash: de.parse_i256()?,
            file_hash: de.parse_i256()?,
        })
    }
}

/// `tonNode.zeroStateIdExt workchain:int root_hash:int256 file_hash:int256`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TonNodeZeroStateIdExt {
    pub workchain: Int,
    pub root_hash: Int256,
    pub file_hash: Int256,
}

impl Deserialize for TonNodeZeroStateIdExt {
    fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError> {
        Ok(Self {
            workchain: de.parse_i32()?,
            root_hash: de.parse_i256()?,
            file_hash: de.parse_i256()?,
        })
    }
}

/// `liteServer.accountId workchain:int id:int256`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteServerAccountId {
    pub workchain: Int,
    pub id: Int256,
}

impl Serialize for LiteServerAccountId {
    fn serialize(&self, se: &mut Serializer) {
        se.write_i32(self.workchain);
        se.write_i256(&self.id);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiteServerGetMasterchainInfo {}

bare_type!(LiteServerGetMasterchainInfo, 0x89b5e62e);

impl Functional for LiteServerGetMasterchainInfo {
    type Result = LiteServerMasterchainInfo;
}

impl Serialize for LiteServerGetMasterchainInfo {
    fn serialize(&self, _: &mut Serializer) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteServerMasterchainInfo {
    pub last: TonNodeBlockIdExt,
    pub state_root_hash: Int256,
    pub init: TonNodeZeroStateIdExt,
}

bare_type!(LiteServerMasterchainInfo, 0x85832881);

impl Deserialize for LiteServerMasterchainInfo {
    fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError> {
        Ok(Self {
            last: TonNodeBlockIdExt::deserialize(de)?,
            state_root_hash: de.parse_i256()?,
            init: TonNodeZeroStateIdExt::deserialize(de)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteServerGetAccountState {
    pub id: TonNodeBlockIdExt,
    pub account: LiteServerAccountId,
}

bare_type!(LiteServerGetAccountState, 0x6b890e25);

impl Functional for LiteServerGetAccountState {
    type Result = LiteServerAccountState;
}

impl Serialize for LiteServerGetAccountState {
    fn serialize(&self, se: &mut Serializer) {
        self.id.serialize(se);
        self.account.serialize(se);
    }
}

/// `state` is a bag of cells with the `Account`, empty for unknown accounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteServerAccountState {
    pub id: TonNodeBlockIdExt,
    pub shardblk: TonNodeBlockIdExt,
    pub shard_proof: Bytes,
    pub proof: Bytes,
    pub state: Bytes,
}

bare_type!(LiteServerAccountState, 0x7079c751);

impl Deserialize for LiteServerAccountState {
    fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError> {
        Ok(Self {
            id: TonNodeBlockIdExt::deserialize(de)?,
            shardblk: TonNodeBlockIdExt::deserialize(de)?,
            shard_proof: de.parse_bytes()?,
            proof: de.parse_bytes()?,
            state: de.parse_bytes()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteServerSendMessage {
    pub body: Bytes,
}

bare_type!(LiteServerSendMessage, 0x690ad482);

impl Functional for LiteServerSendMessage {
    type Result = LiteServerSendMsgStatus;
}

impl Serialize for LiteServerSendMessage {
    fn serialize(&self, se: &mut Serializer) {
        se.write_bytes(&self.body);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteServerSendMsgStatus {
    pub status: Int,
}

bare_type!(LiteServerSendMsgStatus, 0x3950e597);

impl Deserialize for LiteServerSendMsgStatus {
    fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError> {
        Ok(Self { status: de.parse_i32()? })
    }
}

/// Transactions of `account` starting from (`lt`, `hash`) and going back in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteServerGetTransactions {
    pub count: Int,
    pub account: LiteServerAccountId,
    pub lt: Long,
    pub hash: Int256,
}

bare_type!(LiteServerGetTransactions, 0x1c40e7a1);

impl Functional for LiteServerGetTransactions {
    type Result = LiteServerTransactionList;
}

impl Serialize for LiteServerGetTransactions {
    fn serialize(&self, se: &mut Serializer) {
        se.write_i31(self.count);
        self.account.serialize(se);
        se.write_i64(self.lt);
        se.write_i256(&self.hash);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteServerTransactionList {
    pub ids: Vector<TonNodeBlockIdExt>,
    pub transactions: Bytes,
}

bare_type!(LiteServerTransactionList, 0x6f26c60b);

impl Deserialize for LiteServerTransactionList {
    fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError> {
        Ok(Self {
            ids: Vector::<TonNodeBlockIdExt>::deserialize(de)?,
            transactions: de.parse_bytes()?,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiteServerGetTime {}

bare_type!(LiteServerGetTime, 0x16ad5a34);

impl Functional for LiteServerGetTime {
    type Result = LiteServerCurrentTime;
}

impl Serialize for LiteServerGetTime {
    fn serialize(&self, _: &mut Serializer) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteServerCurrentTime {
    pub now: Int,
}

bare_type!(LiteServerCurrentTime, 0xe953000d);

impl Deserialize for LiteServerCurrentTime {
    fn deserialize(de: &mut Deserializer) -> Result<Self, DeserializerError> {
        Ok(Self { now: de.parse_i32()? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adnl_tcp::deserializer::from_bytes_boxed;
    use adnl_tcp::serializer::to_bytes_boxed;

    fn int256(s: &str) -> anyhow::Result<Int256> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;

        Ok(bytes)
    }

    #[test]
    fn serialize_adnl_query_test() -> anyhow::Result<()> {
        let query = AdnlMessageQuery {
            query_id: int256("77c1545b96fa136b8e01cc08338bec47e8a43215492dda6d4d7e286382bb00c4")?,
            query: hex::decode("df068c79042ee6b589000000")?,
        };

        let bytes = to_bytes_boxed(&query);

        assert_eq!(bytes, hex::decode("7af98bb477c1545b96fa136b8e01cc08338bec47e8a43215492dda6d4d7e286382bb00c40cdf068c79042ee6b589000000000000")?);

        Ok(())
    }

    #[test]
    fn serialize_liteserver_query_test() -> anyhow::Result<()> {
        let query = LiteServerQuery {
            data: hex::decode("2ee6b589")?,
        };

        let bytes = to_bytes_boxed(&query);

        assert_eq!(bytes, hex::decode("df068c79042ee6b589000000")?);

        Ok(())
    }

    #[test]
    fn serialize_get_masterchain_info_test() -> anyhow::Result<()> {
        let bytes = to_bytes_boxed(&LiteServerGetMasterchainInfo::default());

        assert_eq!(bytes, hex::decode("2ee6b589")?);

        Ok(())
    }

    #[test]
    fn deserialize_masterchain_info_test() -> anyhow::Result<()> {
        let bytes = hex::decode("81288385ffffffff000000000000008027405801e585a47bd5978f6a4fb2b56aa2082ec9deac33aaae19e78241b97522e1fb43d4876851b60521311853f59c002d46b0bd80054af4bce340787a00bd04e01235178b4d3b38b06bb484015faf9821c3ba1c609a25b74f30e1e585b8c8e820ef0976ffffffff17a3a92992aabea785a7a090985a265cd31f323d849da51239737e321fb055695e994fcf4d425c0a6ce6a792594b7173205f740a39cd56f537defd28b48a0f6e")?;

        let masterchain_info = from_bytes_boxed::<LiteServerMasterchainInfo>(&bytes)?;

        assert_eq!(
            masterchain_info,
            LiteServerMasterchainInfo {
                last: TonNodeBlockIdExt {
                    workchain: -1,
                    shard: i64::MIN,
                    seqno: 0x01584027,
                    root_hash: int256("e585a47bd5978f6a4fb2b56aa2082ec9deac33aaae19e78241b97522e1fb43d4")?,
                    file_hash: int256("876851b60521311853f59c002d46b0bd80054af4bce340787a00bd04e0123517")?,
                },
                state_root_hash: int256("8b4d3b38b06bb484015faf9821c3ba1c609a25b74f30e1e585b8c8e820ef0976")?,
                init: TonNodeZeroStateIdExt {
                    workchain: -1,
                    root_hash: int256("17a3a92992aabea785a7a090985a265cd31f323d849da51239737e321fb05569")?,
                    file_hash: int256("5e994fcf4d425c0a6ce6a792594b7173205f740a39cd56f537defd28b48a0f6e")?,
                },
            }
        );

        Ok(())
    }

    #[test]
    fn serialize_get_transactions_test() -> anyhow::Result<()> {
        let request = LiteServerGetTransactions {
            count: 16,
            account: LiteServerAccountId { workchain: 0, id: [0x11; 32] },
            lt: 0x0102030405060708,
            hash: [0x22; 32],
        };

        let bytes = to_bytes_boxed(&request);

        assert_eq!(bytes.len(), 4 + 4 + 4 + 32 + 8 + 32);
        assert_eq!(bytes[..8], [0xa1, 0xe7, 0x40, 0x1c, 0x10, 0x00, 0x00, 0x00]);
        assert_eq!(bytes[44..52], [0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);

        Ok(())
    }

    #[test]
    fn deserialize_liteserver_error_test() -> anyhow::Result<()> {
        let mut bytes = hex::decode("48e1a9bb70feffff")?;
        bytes.push(35);
        bytes.extend_from_slice(b"unsupported getMasterchainInfo mode");

        let error = from_bytes_boxed::<LiteServerError>(&bytes)?;

        assert_eq!(error.code, -400);
        assert_eq!(error.to_string(), "Error code: -400, message: \"unsupported getMasterchainInfo mode\"");

        Ok(())
    }

    #[test]
    fn deserialize_transaction_list_test() -> anyhow::Result<()> {
        let mut bytes = hex::decode("0bc6266f01000000")?;
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&i64::MIN.to_le_bytes());
        bytes.extend_from_slice(&7i32.to_le_bytes());
        bytes.extend_from_slice(&[0xaa; 32]);
        bytes.extend_from_slice(&[0xbb; 32]);
        bytes.extend_from_slice(&[2, 0xb5, 0xee, 0]);

        let list = from_bytes_boxed::<LiteServerTransactionList>(&bytes)?;

        assert_eq!(list.ids.len(), 1);
        assert_eq!(list.ids[0].seqno, 7);
        assert_eq!(list.transactions, vec![0xb5, 0xee]);

        Ok(())
    }
}
