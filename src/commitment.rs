use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{
    errors::CodecError,
    hashers,
    params::ProtocolParameters,
    ser::{Packable, Packer, Unpacker},
    types::{CommitmentId, Identifier, SlotIndex},
};

/// Summary of a finished slot, chained to its predecessor.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commitment {
    pub protocol_version: u8,
    pub slot: SlotIndex,
    pub previous_commitment_id: CommitmentId,
    pub roots_id: Identifier,
    #[serde_as(as = "DisplayFromStr")]
    pub cumulative_weight: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub reference_mana_cost: u64,
}

impl Commitment {
    pub fn id(&self) -> Result<CommitmentId, CodecError> {
        hashers::commitment_id(self)
    }
}

impl Packable for Commitment {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u8(self.protocol_version);
        p.u32(self.slot);
        self.previous_commitment_id.pack(p)?;
        self.roots_id.pack(p)?;
        p.u64(self.cumulative_weight);
        p.u64(self.reference_mana_cost);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            protocol_version: u.u8()?,
            slot: u.u32()?,
            previous_commitment_id: CommitmentId::unpack(u)?,
            roots_id: Identifier::unpack(u)?,
            cumulative_weight: u.u64()?,
            reference_mana_cost: u.u64()?,
        })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        const TY: &str = "Commitment";
        if self.protocol_version != params.version {
            return Err(CodecError::schema(TY, format!("protocol version {} does not match {}", self.protocol_version, params.version)));
        }
        if self.slot > 0 && self.previous_commitment_id.slot() >= self.slot {
            return Err(CodecError::schema(TY, "previous commitment must belong to an earlier slot"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ser::{decode, encode};

    fn sample() -> Commitment {
        Commitment {
            protocol_version: 3,
            slot: 10,
            previous_commitment_id: CommitmentId::from_parts(&Identifier([0; 32]), 9),
            roots_id: Identifier([0xab; 32]),
            cumulative_weight: 100,
            reference_mana_cost: 6000,
        }
    }

    #[test]
    fn layout_is_93_bytes() {
        let bytes = encode(&sample()).unwrap();
        assert_eq!(bytes.len(), 1 + 4 + 36 + 32 + 8 + 8);
        assert_eq!(decode::<Commitment>(&bytes).unwrap(), sample());
    }

    #[test]
    fn id_carries_slot() {
        let id = sample().id().unwrap();
        assert_eq!(id.slot(), 10);
        assert_eq!(id.identifier(), Identifier::of(&encode(&sample()).unwrap()));
    }

    #[test]
    fn validation() {
        let params = ProtocolParameters::default();
        assert!(sample().validate(&params).is_ok());
        let c = Commitment { protocol_version: 2, ..sample() };
        assert!(c.validate(&params).is_err());
        let c = Commitment { previous_commitment_id: CommitmentId::from_parts(&Identifier([0; 32]), 10), ..sample() };
        assert!(c.validate(&params).is_err());
    }

    #[test]
    fn json_shape() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["protocolVersion"], 3);
        assert_eq!(v["slot"], 10);
        assert_eq!(v["cumulativeWeight"], "100");
        assert_eq!(v["referenceManaCost"], "6000");
        assert_eq!(v["rootsId"].as_str().unwrap().len(), 66);
    }
}
