use primitive_types::U256;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{
    address::{Address, ACCOUNT_ADDRESS_KIND, ANCHOR_ADDRESS_KIND, ED25519_ADDRESS_KIND, MULTI_ADDRESS_KIND, NFT_ADDRESS_KIND, RESTRICTED_ADDRESS_KIND},
    errors::CodecError,
    json::{prefix_hex, u256_dec},
    params::ProtocolParameters,
    ser::{ensure_strictly_sorted, encode, Bounds, Packable, Packer, Prefix, Unpacker},
    types::{EpochIndex, SlotIndex, TokenId},
};

pub const SENDER_FEATURE_KIND: u8 = 0;
pub const ISSUER_FEATURE_KIND: u8 = 1;
pub const METADATA_FEATURE_KIND: u8 = 2;
pub const TAG_FEATURE_KIND: u8 = 3;
pub const NATIVE_TOKEN_FEATURE_KIND: u8 = 4;
pub const BLOCK_ISSUER_FEATURE_KIND: u8 = 5;
pub const STAKING_FEATURE_KIND: u8 = 6;

pub const METADATA_BOUNDS: Bounds = Bounds::new(Prefix::U16, 1, 8192);
pub const TAG_BOUNDS: Bounds = Bounds::new(Prefix::U8, 1, 255);
const BLOCK_ISSUER_KEYS: Bounds = Bounds::new(Prefix::U8, 1, 128);

const SENDER_ADDRESS: &[u8] = &[
    ED25519_ADDRESS_KIND,
    ACCOUNT_ADDRESS_KIND,
    NFT_ADDRESS_KIND,
    ANCHOR_ADDRESS_KIND,
    MULTI_ADDRESS_KIND,
    RESTRICTED_ADDRESS_KIND,
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderFeature {
    pub address: Address,
}

/// Immutable record of the address that minted the output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerFeature {
    pub address: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFeature {
    #[serde(with = "prefix_hex")]
    pub data: Vec<u8>,
}

/// Indexation tag; nodes may build lookups over it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFeature {
    #[serde(with = "prefix_hex")]
    pub tag: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeTokenFeature {
    pub id: TokenId,
    #[serde(with = "u256_dec")]
    pub amount: U256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ed25519PublicKeyBlockIssuerKey {
    #[serde(with = "prefix_hex")]
    pub public_key: [u8; 32],
}

/// Key of an implicit account, known only by its hash until first use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ed25519PublicKeyHashBlockIssuerKey {
    #[serde(with = "prefix_hex")]
    pub pub_key_hash: [u8; 32],
}

tagged_union! {
    pub enum BlockIssuerKey as "BlockIssuerKey" {
        Ed25519PublicKey(Ed25519PublicKeyBlockIssuerKey) = 0,
        Ed25519PublicKeyHash(Ed25519PublicKeyHashBlockIssuerKey) = 1,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockIssuerFeature {
    pub expiry_slot: SlotIndex,
    pub block_issuer_keys: Vec<BlockIssuerKey>,
}

/// Locks `staked_amount` for validation between `start_epoch` and `end_epoch`.
/// An `end_epoch` of zero means open-ended.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingFeature {
    #[serde_as(as = "DisplayFromStr")]
    pub staked_amount: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub fixed_cost: u64,
    pub start_epoch: EpochIndex,
    pub end_epoch: EpochIndex,
}

tagged_union! {
    pub enum Feature as "Feature" {
        Sender(SenderFeature) = 0,
        Issuer(IssuerFeature) = 1,
        Metadata(MetadataFeature) = 2,
        Tag(TagFeature) = 3,
        NativeToken(NativeTokenFeature) = 4,
        BlockIssuer(BlockIssuerFeature) = 5,
        Staking(StakingFeature) = 6,
    }
}

impl Packable for SenderFeature {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.kinded(&self.address, SENDER_ADDRESS, "SenderFeature")
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { address: u.kinded(SENDER_ADDRESS, "SenderFeature")? })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        self.address.validate(params)
    }
}

impl Packable for IssuerFeature {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.kinded(&self.address, SENDER_ADDRESS, "IssuerFeature")
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { address: u.kinded(SENDER_ADDRESS, "IssuerFeature")? })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        self.address.validate(params)
    }
}

impl Packable for MetadataFeature {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.prefixed_bytes(METADATA_BOUNDS, &self.data, "MetadataFeature")
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { data: u.prefixed_bytes(METADATA_BOUNDS, "MetadataFeature")?.to_vec() })
    }
}

impl Packable for TagFeature {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.prefixed_bytes(TAG_BOUNDS, &self.tag, "TagFeature")
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { tag: u.prefixed_bytes(TAG_BOUNDS, "TagFeature")?.to_vec() })
    }
}

impl Packable for NativeTokenFeature {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        self.id.pack(p)?;
        self.amount.pack(p)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { id: TokenId::unpack(u)?, amount: U256::unpack(u)? })
    }

    fn validate(&self, _params: &ProtocolParameters) -> Result<(), CodecError> {
        if self.amount.is_zero() {
            return Err(CodecError::schema("NativeTokenFeature", "amount must be positive"));
        }
        Ok(())
    }
}

impl Packable for Ed25519PublicKeyBlockIssuerKey {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.bytes(&self.public_key);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { public_key: u.array()? })
    }
}

impl Packable for Ed25519PublicKeyHashBlockIssuerKey {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.bytes(&self.pub_key_hash);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { pub_key_hash: u.array()? })
    }
}

impl Packable for BlockIssuerFeature {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u32(self.expiry_slot);
        p.list(BLOCK_ISSUER_KEYS, &self.block_issuer_keys, "BlockIssuerFeature")
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { expiry_slot: u.u32()?, block_issuer_keys: u.list(BLOCK_ISSUER_KEYS, "BlockIssuerFeature")? })
    }

    fn validate(&self, _params: &ProtocolParameters) -> Result<(), CodecError> {
        let keys = self.block_issuer_keys.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
        ensure_strictly_sorted(keys, "BlockIssuerFeature", "block issuer keys")
    }
}

impl Packable for StakingFeature {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u64(self.staked_amount);
        p.u64(self.fixed_cost);
        p.u32(self.start_epoch);
        p.u32(self.end_epoch);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { staked_amount: u.u64()?, fixed_cost: u.u64()?, start_epoch: u.u32()?, end_epoch: u.u32()? })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        if self.end_epoch != 0 && self.start_epoch > self.end_epoch {
            return Err(CodecError::schema("StakingFeature", "start epoch after end epoch"));
        }
        if self.staked_amount > params.token_supply {
            return Err(CodecError::schema("StakingFeature", "staked amount exceeds token supply"));
        }
        Ok(())
    }
}
