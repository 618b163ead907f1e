use nova_primitives::blake2b_256;
use serde::{Deserialize, Serialize};

use crate::{
    capabilities::AddressCapabilities,
    errors::CodecError,
    json::prefix_hex,
    params::ProtocolParameters,
    ser::{ensure_strictly_sorted, Bounds, Kinded, Packable, Packer, Prefix, Unpacker},
    types::{AccountId, AnchorId, Identifier, NftId},
};

pub const ED25519_ADDRESS_KIND: u8 = 0;
pub const ACCOUNT_ADDRESS_KIND: u8 = 8;
pub const NFT_ADDRESS_KIND: u8 = 16;
pub const ANCHOR_ADDRESS_KIND: u8 = 24;
pub const IMPLICIT_ACCOUNT_CREATION_ADDRESS_KIND: u8 = 32;
pub const MULTI_ADDRESS_KIND: u8 = 40;
pub const RESTRICTED_ADDRESS_KIND: u8 = 48;

const WEIGHTED_ADDRESSES: Bounds = Bounds::new(Prefix::U8, 1, 10);
const MULTI_INNER_KINDS: &[u8] = &[ED25519_ADDRESS_KIND, ACCOUNT_ADDRESS_KIND, NFT_ADDRESS_KIND];
const RESTRICTED_INNER_KINDS: &[u8] = &[
    ED25519_ADDRESS_KIND,
    ACCOUNT_ADDRESS_KIND,
    NFT_ADDRESS_KIND,
    ANCHOR_ADDRESS_KIND,
    MULTI_ADDRESS_KIND,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ed25519Address {
    #[serde(with = "prefix_hex")]
    pub pub_key_hash: [u8; 32],
}

impl Ed25519Address {
    /// `BLAKE2b-256(public key)`.
    #[must_use]
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        Self { pub_key_hash: blake2b_256(&[public_key]) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAddress {
    pub account_id: AccountId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftAddress {
    pub nft_id: NftId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorAddress {
    pub anchor_id: AnchorId,
}

/// Address that turns a basic output into an implicit account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplicitAccountCreationAddress {
    #[serde(with = "prefix_hex")]
    pub pub_key_hash: [u8; 32],
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedAddress {
    pub address: Address,
    pub weight: u8,
}

/// `threshold`-of-`Σ weight` composite address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiAddress {
    pub addresses: Vec<WeightedAddress>,
    pub threshold: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictedAddress {
    pub address: Box<Address>,
    #[serde(default, skip_serializing_if = "AddressCapabilities::is_empty")]
    pub capabilities: AddressCapabilities,
}

tagged_union! {
    pub enum Address as "Address" {
        Ed25519(Ed25519Address) = 0,
        Account(AccountAddress) = 8,
        Nft(NftAddress) = 16,
        Anchor(AnchorAddress) = 24,
        ImplicitAccountCreation(ImplicitAccountCreationAddress) = 32,
        Multi(MultiAddress) = 40,
        Restricted(RestrictedAddress) = 48,
    }
}

impl Address {
    #[must_use]
    pub fn ed25519_from_public_key(public_key: &[u8; 32]) -> Self {
        Self::Ed25519(Ed25519Address::from_public_key(public_key))
    }

    /// The address that actually has to unlock, looking through a restriction.
    #[must_use]
    pub fn underlying(&self) -> &Self {
        match self {
            Self::Restricted(r) => r.address.underlying(),
            other => other,
        }
    }
}

macro_rules! impl_id_address {
    ($($t:ty => $field:ident),+ $(,)?) => {$(
        impl Packable for $t {
            fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
                self.$field.pack(p)
            }

            fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
                Ok(Self { $field: Packable::unpack(u)? })
            }
        }
    )+};
}
impl_id_address!(
    Ed25519Address => pub_key_hash,
    AccountAddress => account_id,
    NftAddress => nft_id,
    AnchorAddress => anchor_id,
    ImplicitAccountCreationAddress => pub_key_hash,
);

impl From<AccountId> for AccountAddress {
    fn from(account_id: AccountId) -> Self {
        Self { account_id }
    }
}

impl From<NftId> for NftAddress {
    fn from(nft_id: NftId) -> Self {
        Self { nft_id }
    }
}

impl From<AnchorId> for AnchorAddress {
    fn from(anchor_id: AnchorId) -> Self {
        Self { anchor_id }
    }
}

impl Kinded for WeightedAddress {
    fn kind(&self) -> u8 {
        self.address.kind()
    }
}

impl Packable for WeightedAddress {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        self.address.pack(p)?;
        p.u8(self.weight);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { address: Address::unpack(u)?, weight: u.u8()? })
    }
}

impl MultiAddress {
    /// `H(encode(multi address))`, type byte included. Bech32 renders this
    /// hash behind the multi address type instead of the full address.
    pub fn reference(&self) -> Result<Identifier, CodecError> {
        let mut p = Packer::new();
        p.u8(MULTI_ADDRESS_KIND);
        self.pack(&mut p)?;
        Ok(Identifier(blake2b_256(&[&p.into_bytes()])))
    }

    pub fn cumulative_weight(&self) -> u32 {
        self.addresses.iter().map(|a| u32::from(a.weight)).sum()
    }
}

impl Packable for MultiAddress {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.kinded_list(WEIGHTED_ADDRESSES, &self.addresses, MULTI_INNER_KINDS, "MultiAddress")?;
        p.u16(self.threshold);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            addresses: u.kinded_list(WEIGHTED_ADDRESSES, MULTI_INNER_KINDS, "MultiAddress")?,
            threshold: u.u16()?,
        })
    }

    fn validate(&self, _params: &ProtocolParameters) -> Result<(), CodecError> {
        const TY: &str = "MultiAddress";
        if self.addresses.iter().any(|a| a.weight == 0) {
            return Err(CodecError::schema(TY, "weights must be at least 1"));
        }
        let total = self.cumulative_weight();
        if self.threshold == 0 || u32::from(self.threshold) > total {
            return Err(CodecError::schema(TY, format!("threshold {} outside [1, {total}]", self.threshold)));
        }
        let keys = self
            .addresses
            .iter()
            .map(|a| crate::ser::encode(&a.address))
            .collect::<Result<Vec<_>, _>>()?;
        ensure_strictly_sorted(keys, TY, "addresses")
    }
}

impl Packable for RestrictedAddress {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.kinded(&*self.address, RESTRICTED_INNER_KINDS, "RestrictedAddress")?;
        self.capabilities.pack(p)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            address: Box::new(u.kinded(RESTRICTED_INNER_KINDS, "RestrictedAddress")?),
            capabilities: AddressCapabilities::unpack(u)?,
        })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        self.address.validate(params)?;
        self.capabilities.validate(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::AddressCapabilityFlag;
    use crate::ser::{decode, encode};

    fn ed(b: u8) -> Address {
        Address::Ed25519(Ed25519Address { pub_key_hash: [b; 32] })
    }

    fn multi() -> MultiAddress {
        MultiAddress {
            addresses: vec![
                WeightedAddress { address: ed(1), weight: 1 },
                WeightedAddress { address: ed(2), weight: 1 },
                WeightedAddress { address: Address::Account(AccountId([3; 32]).into()), weight: 2 },
            ],
            threshold: 2,
        }
    }

    #[test]
    fn simple_address_layout() {
        let bytes = encode(&ed(0xaa)).unwrap();
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[0], 0);
        let account = encode(&Address::Account(AccountId([1; 32]).into())).unwrap();
        assert_eq!(account[0], 8);
        assert!(matches!(decode::<Address>(&[9; 33]), Err(CodecError::MalformedEncoding { .. })));
    }

    #[test]
    fn multi_address_round_trip_and_reference() {
        let m = multi();
        let bytes = encode(&Address::Multi(m.clone())).unwrap();
        assert_eq!(bytes[0], 40);
        assert_eq!(bytes[1], 3);
        assert_eq!(&bytes[bytes.len() - 2..], &[2, 0]);
        assert_eq!(decode::<Address>(&bytes).unwrap(), Address::Multi(m.clone()));
        assert_eq!(m.reference().unwrap(), Identifier::of(&bytes));
        assert!(m.validate(&ProtocolParameters::default()).is_ok());
    }

    #[test]
    fn multi_address_rejects_nested_multi() {
        let nested = MultiAddress {
            addresses: vec![WeightedAddress { address: Address::Multi(multi()), weight: 1 }],
            threshold: 1,
        };
        assert!(matches!(encode(&nested), Err(CodecError::SchemaViolation { .. })));

        let mut bytes = encode(&Address::Multi(multi())).unwrap();
        // turn the first inner Ed25519 address into an anchor address
        bytes[2] = ANCHOR_ADDRESS_KIND;
        assert!(matches!(decode::<Address>(&bytes), Err(CodecError::MalformedEncoding { .. })));
    }

    #[test]
    fn multi_address_validation() {
        let params = ProtocolParameters::default();
        let mut m = multi();
        m.threshold = 5;
        assert!(matches!(m.validate(&params), Err(CodecError::SchemaViolation { .. })));
        let mut m = multi();
        m.addresses.swap(0, 1);
        assert!(m.validate(&params).is_err());
        let mut m = multi();
        m.addresses[0].weight = 0;
        assert!(m.validate(&params).is_err());
    }

    #[test]
    fn restricted_address_json() {
        let r = Address::Restricted(RestrictedAddress {
            address: Box::new(ed(7)),
            capabilities: AddressCapabilities::none().with(AddressCapabilityFlag::NativeTokens),
        });
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["type"], 48);
        assert_eq!(v["address"]["type"], 0);
        assert_eq!(v["capabilities"], "0x01");
        assert_eq!(serde_json::from_value::<Address>(v).unwrap(), r);

        let plain = Address::Restricted(RestrictedAddress {
            address: Box::new(ed(7)),
            capabilities: AddressCapabilities::none(),
        });
        let v = serde_json::to_value(&plain).unwrap();
        assert!(v.get("capabilities").is_none());
        let bytes = encode(&plain).unwrap();
        assert_eq!(bytes.len(), 1 + 33 + 1);
        assert_eq!(plain.underlying(), &ed(7));
    }

    #[test]
    fn restricted_address_cannot_wrap_restricted() {
        let inner = Address::Restricted(RestrictedAddress {
            address: Box::new(ed(1)),
            capabilities: AddressCapabilities::none(),
        });
        let outer = RestrictedAddress { address: Box::new(inner), capabilities: AddressCapabilities::none() };
        assert!(matches!(encode(&outer), Err(CodecError::SchemaViolation { .. })));
    }
}
