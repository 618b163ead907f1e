use ed25519_dalek::SigningKey;
use nova_primitives::blake2b_256;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{
    errors::CodecError,
    hashers,
    params::ProtocolParameters,
    payload::Payload,
    ser::{encode, ensure_strictly_sorted, Bounds, Packable, Packer, Prefix, Unpacker},
    signature::{Ed25519Signature, Signature},
    types::{AccountId, BlockId, CommitmentId, Identifier, SlotIndex},
};

const BASIC_STRONG: Bounds = Bounds::new(Prefix::U8, 1, 8);
const BASIC_OTHER: Bounds = Bounds::new(Prefix::U8, 0, 8);
const VALIDATION_STRONG: Bounds = Bounds::new(Prefix::U8, 1, 50);
const VALIDATION_OTHER: Bounds = Bounds::new(Prefix::U8, 0, 50);

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub protocol_version: u8,
    #[serde_as(as = "DisplayFromStr")]
    pub network_id: u64,
    /// Nanoseconds since the Unix epoch.
    #[serde_as(as = "DisplayFromStr")]
    pub issuing_time: u64,
    pub slot_commitment_id: CommitmentId,
    pub latest_finalized_slot: SlotIndex,
    pub issuer_id: AccountId,
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicBlockBody {
    pub strong_parents: Vec<BlockId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weak_parents: Vec<BlockId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shallow_like_parents: Vec<BlockId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    #[serde_as(as = "DisplayFromStr")]
    pub max_burned_mana: u64,
}

/// Body issued by committee members; carries no payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationBlockBody {
    pub strong_parents: Vec<BlockId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weak_parents: Vec<BlockId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shallow_like_parents: Vec<BlockId>,
    pub highest_supported_version: u8,
    pub protocol_parameters_hash: Identifier,
}

tagged_union! {
    pub enum BlockBody as "BlockBody" {
        Basic(BasicBlockBody) = 0,
        Validation(ValidationBlockBody) = 1,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub body: BlockBody,
    pub signature: Signature,
}

impl BlockBody {
    #[must_use]
    pub fn strong_parents(&self) -> &[BlockId] {
        match self {
            Self::Basic(b) => &b.strong_parents,
            Self::Validation(b) => &b.strong_parents,
        }
    }
}

impl Block {
    /// Signs `H(header) || H(body)` with `key` and assembles the block.
    pub fn sign(header: BlockHeader, body: BlockBody, key: &SigningKey) -> Result<Self, CodecError> {
        let msg = signing_message(&header, &body)?;
        let signature = Signature::Ed25519(Ed25519Signature::sign(key, &msg));
        Ok(Self { header, body, signature })
    }

    pub fn signing_message(&self) -> Result<[u8; 64], CodecError> {
        signing_message(&self.header, &self.body)
    }

    pub fn verify_signature(&self) -> Result<(), CodecError> {
        self.signature.verify(&self.signing_message()?)
    }

    pub fn id(&self, params: &ProtocolParameters) -> Result<BlockId, CodecError> {
        hashers::block_id(self, params)
    }

    #[must_use]
    pub fn slot(&self, params: &ProtocolParameters) -> SlotIndex {
        params.slot_from_time(self.header.issuing_time)
    }
}

fn signing_message(header: &BlockHeader, body: &BlockBody) -> Result<[u8; 64], CodecError> {
    let mut msg = [0u8; 64];
    msg[..32].copy_from_slice(&blake2b_256(&[&encode(header)?]));
    msg[32..].copy_from_slice(&blake2b_256(&[&encode(body)?]));
    Ok(msg)
}

struct Parents<'a> {
    strong: &'a [BlockId],
    weak: &'a [BlockId],
    shallow_like: &'a [BlockId],
}

impl Parents<'_> {
    fn validate(&self, ty: &'static str) -> Result<(), CodecError> {
        ensure_strictly_sorted(self.strong.iter(), ty, "strong parents")?;
        ensure_strictly_sorted(self.weak.iter(), ty, "weak parents")?;
        ensure_strictly_sorted(self.shallow_like.iter(), ty, "shallow like parents")?;
        if self.weak.iter().any(|w| self.strong.contains(w) || self.shallow_like.contains(w)) {
            return Err(CodecError::schema(ty, "weak parents must be disjoint from strong and shallow like parents"));
        }
        Ok(())
    }
}

impl Packable for BlockHeader {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u8(self.protocol_version);
        p.u64(self.network_id);
        p.u64(self.issuing_time);
        self.slot_commitment_id.pack(p)?;
        p.u32(self.latest_finalized_slot);
        self.issuer_id.pack(p)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            protocol_version: u.u8()?,
            network_id: u.u64()?,
            issuing_time: u.u64()?,
            slot_commitment_id: CommitmentId::unpack(u)?,
            latest_finalized_slot: u.u32()?,
            issuer_id: AccountId::unpack(u)?,
        })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        const TY: &str = "BlockHeader";
        if self.protocol_version != params.version {
            return Err(CodecError::schema(TY, format!("protocol version {} does not match {}", self.protocol_version, params.version)));
        }
        if self.network_id != params.network_id() {
            return Err(CodecError::schema(TY, format!("network id {} does not match {}", self.network_id, params.network_id())));
        }
        Ok(())
    }
}

impl Packable for BasicBlockBody {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        const TY: &str = "BasicBlockBody";
        p.list(BASIC_STRONG, &self.strong_parents, TY)?;
        p.list(BASIC_OTHER, &self.weak_parents, TY)?;
        p.list(BASIC_OTHER, &self.shallow_like_parents, TY)?;
        p.optional(self.payload.as_ref(), TY)?;
        p.u64(self.max_burned_mana);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        const TY: &str = "BasicBlockBody";
        Ok(Self {
            strong_parents: u.list(BASIC_STRONG, TY)?,
            weak_parents: u.list(BASIC_OTHER, TY)?,
            shallow_like_parents: u.list(BASIC_OTHER, TY)?,
            payload: u.optional(TY)?,
            max_burned_mana: u.u64()?,
        })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        Parents { strong: &self.strong_parents, weak: &self.weak_parents, shallow_like: &self.shallow_like_parents }
            .validate("BasicBlockBody")?;
        if let Some(payload) = &self.payload {
            payload.validate(params)?;
        }
        Ok(())
    }
}

impl Packable for ValidationBlockBody {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        const TY: &str = "ValidationBlockBody";
        p.list(VALIDATION_STRONG, &self.strong_parents, TY)?;
        p.list(VALIDATION_OTHER, &self.weak_parents, TY)?;
        p.list(VALIDATION_OTHER, &self.shallow_like_parents, TY)?;
        p.u8(self.highest_supported_version);
        self.protocol_parameters_hash.pack(p)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        const TY: &str = "ValidationBlockBody";
        Ok(Self {
            strong_parents: u.list(VALIDATION_STRONG, TY)?,
            weak_parents: u.list(VALIDATION_OTHER, TY)?,
            shallow_like_parents: u.list(VALIDATION_OTHER, TY)?,
            highest_supported_version: u.u8()?,
            protocol_parameters_hash: Identifier::unpack(u)?,
        })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        const TY: &str = "ValidationBlockBody";
        Parents { strong: &self.strong_parents, weak: &self.weak_parents, shallow_like: &self.shallow_like_parents }
            .validate(TY)?;
        if self.highest_supported_version < params.version {
            return Err(CodecError::schema(TY, "highest supported version below the protocol version"));
        }
        Ok(())
    }
}

impl Packable for Block {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        self.header.pack(p)?;
        self.body.pack(p)?;
        self.signature.pack(p)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { header: BlockHeader::unpack(u)?, body: BlockBody::unpack(u)?, signature: Signature::unpack(u)? })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        self.header.validate(params)?;
        self.body.validate(params)
    }
}
