use serde::{Deserialize, Serialize};

use crate::{
    errors::CodecError,
    json::prefix_hex,
    ser::{Bounds, Packable, Packer, Prefix, Unpacker},
    transaction::SignedTransaction,
};

pub const TAGGED_DATA_PAYLOAD_KIND: u8 = 0;
pub const SIGNED_TRANSACTION_PAYLOAD_KIND: u8 = 1;
pub const CANDIDACY_ANNOUNCEMENT_PAYLOAD_KIND: u8 = 2;

pub const TAGGED_DATA_TAG_BOUNDS: Bounds = Bounds::new(Prefix::U8, 0, 64);
pub const TAGGED_DATA_DATA_BOUNDS: Bounds = Bounds::new(Prefix::U32, 0, 8192);

/// Arbitrary data with an optional indexation tag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedDataPayload {
    #[serde(default, with = "prefix_hex", skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<u8>,
    #[serde(default, with = "prefix_hex", skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
}

/// A validator announcing its candidacy for the next committee.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidacyAnnouncementPayload {}

tagged_union! {
    pub enum Payload as "Payload" {
        TaggedData(TaggedDataPayload) = 0,
        SignedTransaction(Box<SignedTransaction>) = 1,
        CandidacyAnnouncement(CandidacyAnnouncementPayload) = 2,
    }
}

impl From<SignedTransaction> for Payload {
    fn from(tx: SignedTransaction) -> Self {
        Self::SignedTransaction(Box::new(tx))
    }
}

impl Packable for TaggedDataPayload {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.prefixed_bytes(TAGGED_DATA_TAG_BOUNDS, &self.tag, "TaggedDataPayload")?;
        p.prefixed_bytes(TAGGED_DATA_DATA_BOUNDS, &self.data, "TaggedDataPayload")
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            tag: u.prefixed_bytes(TAGGED_DATA_TAG_BOUNDS, "TaggedDataPayload")?.to_vec(),
            data: u.prefixed_bytes(TAGGED_DATA_DATA_BOUNDS, "TaggedDataPayload")?.to_vec(),
        })
    }
}

impl Packable for CandidacyAnnouncementPayload {
    fn pack(&self, _p: &mut Packer) -> Result<(), CodecError> {
        Ok(())
    }

    fn unpack(_u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::{decode, encode};

    #[test]
    fn tagged_data_layout() {
        let p = Payload::TaggedData(TaggedDataPayload { tag: b"hi".to_vec(), data: vec![1, 2, 3] });
        let bytes = encode(&p).unwrap();
        assert_eq!(bytes, vec![0, 2, b'h', b'i', 3, 0, 0, 0, 1, 2, 3]);
        assert_eq!(decode::<Payload>(&bytes).unwrap(), p);
    }

    #[test]
    fn tagged_data_limits() {
        let long_tag = TaggedDataPayload { tag: vec![0; 65], data: vec![] };
        assert!(matches!(encode(&long_tag), Err(CodecError::SchemaViolation { .. })));
        let long_data = TaggedDataPayload { tag: vec![], data: vec![0; 8193] };
        assert!(encode(&long_data).is_err());
        let empty = TaggedDataPayload::default();
        assert_eq!(encode(&empty).unwrap(), vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn candidacy_is_just_the_type_byte() {
        let p = Payload::CandidacyAnnouncement(CandidacyAnnouncementPayload {});
        assert_eq!(encode(&p).unwrap(), vec![2]);
        assert_eq!(serde_json::to_value(&p).unwrap(), serde_json::json!({"type": 2}));
    }
}
