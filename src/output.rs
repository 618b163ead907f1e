//! Ledger outputs.
//!
//! Every output carries its fixed fields first, then `u8`-counted lists of
//! unlock conditions, features and (where the type has them) immutable
//! features. Which kinds each list admits is fixed per output type; a list
//! must be sorted by kind with no repeats.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{
    address::{Address, ACCOUNT_ADDRESS_KIND},
    errors::CodecError,
    feature::{
        Feature, BLOCK_ISSUER_FEATURE_KIND, ISSUER_FEATURE_KIND, METADATA_FEATURE_KIND, NATIVE_TOKEN_FEATURE_KIND,
        SENDER_FEATURE_KIND, STAKING_FEATURE_KIND, TAG_FEATURE_KIND,
    },
    json::{prefix_hex, u256_dec},
    params::ProtocolParameters,
    ser::{Bounds, Kinded, Packable, Packer, Prefix, Unpacker},
    types::{AccountId, AnchorId, DelegationId, EpochIndex, NftId},
    unlock_condition::{
        UnlockCondition, ADDRESS_UNLOCK_CONDITION_KIND, EXPIRATION_UNLOCK_CONDITION_KIND,
        GOVERNOR_UNLOCK_CONDITION_KIND, IMMUTABLE_ACCOUNT_UNLOCK_CONDITION_KIND,
        STATE_CONTROLLER_UNLOCK_CONDITION_KIND, STORAGE_DEPOSIT_RETURN_UNLOCK_CONDITION_KIND,
        TIMELOCK_UNLOCK_CONDITION_KIND,
    },
};

pub const BASIC_OUTPUT_KIND: u8 = 0;
pub const ACCOUNT_OUTPUT_KIND: u8 = 1;
pub const ANCHOR_OUTPUT_KIND: u8 = 2;
pub const FOUNDRY_OUTPUT_KIND: u8 = 3;
pub const NFT_OUTPUT_KIND: u8 = 4;
pub const DELEGATION_OUTPUT_KIND: u8 = 5;

pub const STATE_METADATA_BOUNDS: Bounds = Bounds::new(Prefix::U16, 0, 8192);

/// Admissible kinds and count bounds of one per-output list.
struct Slot {
    bounds: Bounds,
    kinds: &'static [u8],
    required: &'static [u8],
    ty: &'static str,
}

impl Slot {
    const fn new(max: usize, kinds: &'static [u8], required: &'static [u8], ty: &'static str) -> Self {
        Self { bounds: Bounds::new(Prefix::U8, required.len(), max), kinds, required, ty }
    }

    fn pack<T: Packable + Kinded>(&self, p: &mut Packer, items: &[T]) -> Result<(), CodecError> {
        p.kinded_list(self.bounds, items, self.kinds, self.ty)
    }

    fn unpack<T: Packable + Kinded>(&self, u: &mut Unpacker<'_>) -> Result<Vec<T>, CodecError> {
        u.kinded_list(self.bounds, self.kinds, self.ty)
    }

    fn validate<T: Packable + Kinded>(&self, items: &[T], params: &ProtocolParameters) -> Result<(), CodecError> {
        crate::ser::ensure_strictly_sorted(items.iter().map(Kinded::kind), self.ty, "entries")?;
        if let Some(missing) = self.required.iter().find(|k| !items.iter().any(|i| i.kind() == **k)) {
            return Err(CodecError::schema(self.ty, format!("required type {missing} missing")));
        }
        items.iter().try_for_each(|i| i.validate(params))
    }
}

const ADDRESS_ONLY: &[u8] = &[ADDRESS_UNLOCK_CONDITION_KIND];
const SPENDABLE_CONDITIONS: &[u8] = &[
    ADDRESS_UNLOCK_CONDITION_KIND,
    STORAGE_DEPOSIT_RETURN_UNLOCK_CONDITION_KIND,
    TIMELOCK_UNLOCK_CONDITION_KIND,
    EXPIRATION_UNLOCK_CONDITION_KIND,
];
const ANCHOR_CONDITIONS: &[u8] = &[STATE_CONTROLLER_UNLOCK_CONDITION_KIND, GOVERNOR_UNLOCK_CONDITION_KIND];
const FOUNDRY_CONDITIONS: &[u8] = &[IMMUTABLE_ACCOUNT_UNLOCK_CONDITION_KIND];
const ISSUER_METADATA: &[u8] = &[ISSUER_FEATURE_KIND, METADATA_FEATURE_KIND];

const BASIC_UC: Slot = Slot::new(4, SPENDABLE_CONDITIONS, ADDRESS_ONLY, "BasicOutput.unlockConditions");
const BASIC_FEATURES: Slot = Slot::new(
    4,
    &[SENDER_FEATURE_KIND, METADATA_FEATURE_KIND, TAG_FEATURE_KIND, NATIVE_TOKEN_FEATURE_KIND],
    &[],
    "BasicOutput.features",
);

const ACCOUNT_UC: Slot = Slot::new(1, ADDRESS_ONLY, ADDRESS_ONLY, "AccountOutput.unlockConditions");
const ACCOUNT_FEATURES: Slot = Slot::new(
    4,
    &[SENDER_FEATURE_KIND, METADATA_FEATURE_KIND, BLOCK_ISSUER_FEATURE_KIND, STAKING_FEATURE_KIND],
    &[],
    "AccountOutput.features",
);
const ACCOUNT_IMMUTABLE: Slot = Slot::new(2, ISSUER_METADATA, &[], "AccountOutput.immutableFeatures");

const ANCHOR_UC: Slot = Slot::new(2, ANCHOR_CONDITIONS, ANCHOR_CONDITIONS, "AnchorOutput.unlockConditions");
const ANCHOR_FEATURES: Slot =
    Slot::new(2, &[SENDER_FEATURE_KIND, METADATA_FEATURE_KIND], &[], "AnchorOutput.features");
const ANCHOR_IMMUTABLE: Slot = Slot::new(2, ISSUER_METADATA, &[], "AnchorOutput.immutableFeatures");

const FOUNDRY_UC: Slot = Slot::new(1, FOUNDRY_CONDITIONS, FOUNDRY_CONDITIONS, "FoundryOutput.unlockConditions");
const FOUNDRY_FEATURES: Slot =
    Slot::new(2, &[METADATA_FEATURE_KIND, NATIVE_TOKEN_FEATURE_KIND], &[], "FoundryOutput.features");
const FOUNDRY_IMMUTABLE: Slot = Slot::new(1, &[METADATA_FEATURE_KIND], &[], "FoundryOutput.immutableFeatures");

const NFT_UC: Slot = Slot::new(4, SPENDABLE_CONDITIONS, ADDRESS_ONLY, "NftOutput.unlockConditions");
const NFT_FEATURES: Slot = Slot::new(
    3,
    &[SENDER_FEATURE_KIND, METADATA_FEATURE_KIND, TAG_FEATURE_KIND],
    &[],
    "NftOutput.features",
);
const NFT_IMMUTABLE: Slot = Slot::new(2, ISSUER_METADATA, &[], "NftOutput.immutableFeatures");

const DELEGATION_UC: Slot = Slot::new(1, ADDRESS_ONLY, ADDRESS_ONLY, "DelegationOutput.unlockConditions");

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicOutput {
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub mana: u64,
    pub unlock_conditions: Vec<UnlockCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<Feature>,
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOutput {
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub mana: u64,
    pub account_id: AccountId,
    pub foundry_counter: u32,
    pub unlock_conditions: Vec<UnlockCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub immutable_features: Vec<Feature>,
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorOutput {
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub mana: u64,
    pub anchor_id: AnchorId,
    pub state_index: u32,
    #[serde(default, with = "prefix_hex", skip_serializing_if = "Vec::is_empty")]
    pub state_metadata: Vec<u8>,
    pub unlock_conditions: Vec<UnlockCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub immutable_features: Vec<Feature>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleTokenScheme {
    #[serde(with = "u256_dec")]
    pub minted_tokens: U256,
    #[serde(with = "u256_dec")]
    pub melted_tokens: U256,
    #[serde(with = "u256_dec")]
    pub maximum_supply: U256,
}

impl SimpleTokenScheme {
    /// Tokens currently in circulation, `None` if more were melted than minted.
    #[must_use]
    pub fn circulating_supply(&self) -> Option<U256> {
        self.minted_tokens.checked_sub(self.melted_tokens)
    }
}

tagged_union! {
    pub enum TokenScheme as "TokenScheme" {
        Simple(SimpleTokenScheme) = 0,
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundryOutput {
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u64,
    pub serial_number: u32,
    pub token_scheme: TokenScheme,
    pub unlock_conditions: Vec<UnlockCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub immutable_features: Vec<Feature>,
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftOutput {
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub mana: u64,
    pub nft_id: NftId,
    pub unlock_conditions: Vec<UnlockCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub immutable_features: Vec<Feature>,
}

/// Delegates `delegated_amount` to the validator account for an epoch range.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationOutput {
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub delegated_amount: u64,
    pub delegation_id: DelegationId,
    pub validator_address: Address,
    pub start_epoch: EpochIndex,
    pub end_epoch: EpochIndex,
    pub unlock_conditions: Vec<UnlockCondition>,
}

tagged_union! {
    pub enum Output as "Output" {
        Basic(BasicOutput) = 0,
        Account(AccountOutput) = 1,
        Anchor(AnchorOutput) = 2,
        Foundry(FoundryOutput) = 3,
        Nft(NftOutput) = 4,
        Delegation(DelegationOutput) = 5,
    }
}

impl Output {
    #[must_use]
    pub const fn amount(&self) -> u64 {
        match self {
            Self::Basic(o) => o.amount,
            Self::Account(o) => o.amount,
            Self::Anchor(o) => o.amount,
            Self::Foundry(o) => o.amount,
            Self::Nft(o) => o.amount,
            Self::Delegation(o) => o.amount,
        }
    }

    /// Stored mana; foundries and delegations hold none.
    #[must_use]
    pub const fn mana(&self) -> u64 {
        match self {
            Self::Basic(o) => o.mana,
            Self::Account(o) => o.mana,
            Self::Anchor(o) => o.mana,
            Self::Nft(o) => o.mana,
            Self::Foundry(_) | Self::Delegation(_) => 0,
        }
    }

    #[must_use]
    pub fn unlock_conditions(&self) -> &[UnlockCondition] {
        match self {
            Self::Basic(o) => &o.unlock_conditions,
            Self::Account(o) => &o.unlock_conditions,
            Self::Anchor(o) => &o.unlock_conditions,
            Self::Foundry(o) => &o.unlock_conditions,
            Self::Nft(o) => &o.unlock_conditions,
            Self::Delegation(o) => &o.unlock_conditions,
        }
    }

    #[must_use]
    pub fn features(&self) -> &[Feature] {
        match self {
            Self::Basic(o) => &o.features,
            Self::Account(o) => &o.features,
            Self::Anchor(o) => &o.features,
            Self::Foundry(o) => &o.features,
            Self::Nft(o) => &o.features,
            Self::Delegation(_) => &[],
        }
    }

    #[must_use]
    pub fn immutable_features(&self) -> &[Feature] {
        match self {
            Self::Account(o) => &o.immutable_features,
            Self::Anchor(o) => &o.immutable_features,
            Self::Foundry(o) => &o.immutable_features,
            Self::Nft(o) => &o.immutable_features,
            Self::Basic(_) | Self::Delegation(_) => &[],
        }
    }

    /// Mutable and immutable features together.
    pub fn all_features(&self) -> impl Iterator<Item = &Feature> {
        self.features().iter().chain(self.immutable_features())
    }
}

fn check_amounts(ty: &'static str, amount: u64, mana: u64, params: &ProtocolParameters) -> Result<(), CodecError> {
    if amount > params.token_supply {
        return Err(CodecError::schema(ty, format!("amount {amount} exceeds token supply")));
    }
    if mana > params.max_mana() {
        return Err(CodecError::schema(ty, format!("mana {mana} exceeds the representable maximum")));
    }
    Ok(())
}

impl Packable for BasicOutput {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u64(self.amount);
        p.u64(self.mana);
        BASIC_UC.pack(p, &self.unlock_conditions)?;
        BASIC_FEATURES.pack(p, &self.features)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: u.u64()?,
            mana: u.u64()?,
            unlock_conditions: BASIC_UC.unpack(u)?,
            features: BASIC_FEATURES.unpack(u)?,
        })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        check_amounts("BasicOutput", self.amount, self.mana, params)?;
        BASIC_UC.validate(&self.unlock_conditions, params)?;
        BASIC_FEATURES.validate(&self.features, params)
    }
}

impl Packable for AccountOutput {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u64(self.amount);
        p.u64(self.mana);
        self.account_id.pack(p)?;
        p.u32(self.foundry_counter);
        ACCOUNT_UC.pack(p, &self.unlock_conditions)?;
        ACCOUNT_FEATURES.pack(p, &self.features)?;
        ACCOUNT_IMMUTABLE.pack(p, &self.immutable_features)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: u.u64()?,
            mana: u.u64()?,
            account_id: AccountId::unpack(u)?,
            foundry_counter: u.u32()?,
            unlock_conditions: ACCOUNT_UC.unpack(u)?,
            features: ACCOUNT_FEATURES.unpack(u)?,
            immutable_features: ACCOUNT_IMMUTABLE.unpack(u)?,
        })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        check_amounts("AccountOutput", self.amount, self.mana, params)?;
        ACCOUNT_UC.validate(&self.unlock_conditions, params)?;
        ACCOUNT_FEATURES.validate(&self.features, params)?;
        ACCOUNT_IMMUTABLE.validate(&self.immutable_features, params)
    }
}

impl Packable for AnchorOutput {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u64(self.amount);
        p.u64(self.mana);
        self.anchor_id.pack(p)?;
        p.u32(self.state_index);
        p.prefixed_bytes(STATE_METADATA_BOUNDS, &self.state_metadata, "AnchorOutput")?;
        ANCHOR_UC.pack(p, &self.unlock_conditions)?;
        ANCHOR_FEATURES.pack(p, &self.features)?;
        ANCHOR_IMMUTABLE.pack(p, &self.immutable_features)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: u.u64()?,
            mana: u.u64()?,
            anchor_id: AnchorId::unpack(u)?,
            state_index: u.u32()?,
            state_metadata: u.prefixed_bytes(STATE_METADATA_BOUNDS, "AnchorOutput")?.to_vec(),
            unlock_conditions: ANCHOR_UC.unpack(u)?,
            features: ANCHOR_FEATURES.unpack(u)?,
            immutable_features: ANCHOR_IMMUTABLE.unpack(u)?,
        })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        check_amounts("AnchorOutput", self.amount, self.mana, params)?;
        ANCHOR_UC.validate(&self.unlock_conditions, params)?;
        ANCHOR_FEATURES.validate(&self.features, params)?;
        ANCHOR_IMMUTABLE.validate(&self.immutable_features, params)
    }
}

impl Packable for SimpleTokenScheme {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        self.minted_tokens.pack(p)?;
        self.melted_tokens.pack(p)?;
        self.maximum_supply.pack(p)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { minted_tokens: U256::unpack(u)?, melted_tokens: U256::unpack(u)?, maximum_supply: U256::unpack(u)? })
    }

    fn validate(&self, _params: &ProtocolParameters) -> Result<(), CodecError> {
        const TY: &str = "SimpleTokenScheme";
        if self.maximum_supply.is_zero() {
            return Err(CodecError::schema(TY, "maximum supply must be positive"));
        }
        match self.circulating_supply() {
            Some(c) if c <= self.maximum_supply => Ok(()),
            Some(_) => Err(CodecError::schema(TY, "circulating supply exceeds maximum supply")),
            None => Err(CodecError::schema(TY, "melted tokens exceed minted tokens")),
        }
    }
}

impl Packable for FoundryOutput {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u64(self.amount);
        p.u32(self.serial_number);
        self.token_scheme.pack(p)?;
        FOUNDRY_UC.pack(p, &self.unlock_conditions)?;
        FOUNDRY_FEATURES.pack(p, &self.features)?;
        FOUNDRY_IMMUTABLE.pack(p, &self.immutable_features)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: u.u64()?,
            serial_number: u.u32()?,
            token_scheme: TokenScheme::unpack(u)?,
            unlock_conditions: FOUNDRY_UC.unpack(u)?,
            features: FOUNDRY_FEATURES.unpack(u)?,
            immutable_features: FOUNDRY_IMMUTABLE.unpack(u)?,
        })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        check_amounts("FoundryOutput", self.amount, 0, params)?;
        self.token_scheme.validate(params)?;
        FOUNDRY_UC.validate(&self.unlock_conditions, params)?;
        FOUNDRY_FEATURES.validate(&self.features, params)?;
        FOUNDRY_IMMUTABLE.validate(&self.immutable_features, params)
    }
}

impl Packable for NftOutput {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u64(self.amount);
        p.u64(self.mana);
        self.nft_id.pack(p)?;
        NFT_UC.pack(p, &self.unlock_conditions)?;
        NFT_FEATURES.pack(p, &self.features)?;
        NFT_IMMUTABLE.pack(p, &self.immutable_features)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: u.u64()?,
            mana: u.u64()?,
            nft_id: NftId::unpack(u)?,
            unlock_conditions: NFT_UC.unpack(u)?,
            features: NFT_FEATURES.unpack(u)?,
            immutable_features: NFT_IMMUTABLE.unpack(u)?,
        })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        check_amounts("NftOutput", self.amount, self.mana, params)?;
        NFT_UC.validate(&self.unlock_conditions, params)?;
        NFT_FEATURES.validate(&self.features, params)?;
        NFT_IMMUTABLE.validate(&self.immutable_features, params)
    }
}

impl Packable for DelegationOutput {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u64(self.amount);
        p.u64(self.delegated_amount);
        self.delegation_id.pack(p)?;
        p.kinded(&self.validator_address, &[ACCOUNT_ADDRESS_KIND], "DelegationOutput")?;
        p.u32(self.start_epoch);
        p.u32(self.end_epoch);
        DELEGATION_UC.pack(p, &self.unlock_conditions)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: u.u64()?,
            delegated_amount: u.u64()?,
            delegation_id: DelegationId::unpack(u)?,
            validator_address: u.kinded(&[ACCOUNT_ADDRESS_KIND], "DelegationOutput")?,
            start_epoch: u.u32()?,
            end_epoch: u.u32()?,
            unlock_conditions: DELEGATION_UC.unpack(u)?,
        })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        const TY: &str = "DelegationOutput";
        check_amounts(TY, self.amount, 0, params)?;
        if self.delegated_amount > params.token_supply {
            return Err(CodecError::schema(TY, "delegated amount exceeds token supply"));
        }
        if self.end_epoch != 0 && self.start_epoch > self.end_epoch {
            return Err(CodecError::schema(TY, "start epoch after end epoch"));
        }
        DELEGATION_UC.validate(&self.unlock_conditions, params)
    }
}
