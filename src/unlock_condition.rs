use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{
    address::{
        Address, ACCOUNT_ADDRESS_KIND, ANCHOR_ADDRESS_KIND, ED25519_ADDRESS_KIND, IMPLICIT_ACCOUNT_CREATION_ADDRESS_KIND,
        MULTI_ADDRESS_KIND, NFT_ADDRESS_KIND, RESTRICTED_ADDRESS_KIND,
    },
    errors::CodecError,
    params::ProtocolParameters,
    ser::{Packable, Packer, Unpacker},
    types::SlotIndex,
};

pub const ADDRESS_UNLOCK_CONDITION_KIND: u8 = 0;
pub const STORAGE_DEPOSIT_RETURN_UNLOCK_CONDITION_KIND: u8 = 1;
pub const TIMELOCK_UNLOCK_CONDITION_KIND: u8 = 2;
pub const EXPIRATION_UNLOCK_CONDITION_KIND: u8 = 3;
pub const STATE_CONTROLLER_UNLOCK_CONDITION_KIND: u8 = 4;
pub const GOVERNOR_UNLOCK_CONDITION_KIND: u8 = 5;
pub const IMMUTABLE_ACCOUNT_UNLOCK_CONDITION_KIND: u8 = 6;

const ANY_ADDRESS: &[u8] = &[
    ED25519_ADDRESS_KIND,
    ACCOUNT_ADDRESS_KIND,
    NFT_ADDRESS_KIND,
    ANCHOR_ADDRESS_KIND,
    IMPLICIT_ACCOUNT_CREATION_ADDRESS_KIND,
    MULTI_ADDRESS_KIND,
    RESTRICTED_ADDRESS_KIND,
];
// Implicit account creation addresses only ever own funds directly.
const RETURN_ADDRESS: &[u8] = &[
    ED25519_ADDRESS_KIND,
    ACCOUNT_ADDRESS_KIND,
    NFT_ADDRESS_KIND,
    ANCHOR_ADDRESS_KIND,
    MULTI_ADDRESS_KIND,
    RESTRICTED_ADDRESS_KIND,
];
const ACCOUNT_ONLY: &[u8] = &[ACCOUNT_ADDRESS_KIND];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressUnlockCondition {
    pub address: Address,
}

/// The receiver must return `amount` to `return_address` when consuming.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageDepositReturnUnlockCondition {
    pub return_address: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelockUnlockCondition {
    pub slot: SlotIndex,
}

/// After `slot`, only `return_address` may unlock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationUnlockCondition {
    pub return_address: Address,
    pub slot: SlotIndex,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateControllerAddressUnlockCondition {
    pub address: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorAddressUnlockCondition {
    pub address: Address,
}

/// Foundries are permanently bound to the account that created them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImmutableAccountAddressUnlockCondition {
    pub address: Address,
}

tagged_union! {
    pub enum UnlockCondition as "UnlockCondition" {
        Address(AddressUnlockCondition) = 0,
        StorageDepositReturn(StorageDepositReturnUnlockCondition) = 1,
        Timelock(TimelockUnlockCondition) = 2,
        Expiration(ExpirationUnlockCondition) = 3,
        StateControllerAddress(StateControllerAddressUnlockCondition) = 4,
        GovernorAddress(GovernorAddressUnlockCondition) = 5,
        ImmutableAccountAddress(ImmutableAccountAddressUnlockCondition) = 6,
    }
}

macro_rules! impl_address_condition {
    ($($t:ty => $allowed:expr),+ $(,)?) => {$(
        impl Packable for $t {
            fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
                p.kinded(&self.address, $allowed, stringify!($t))
            }

            fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
                Ok(Self { address: u.kinded($allowed, stringify!($t))? })
            }

            fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
                self.address.validate(params)
            }
        }
    )+};
}
impl_address_condition!(
    AddressUnlockCondition => ANY_ADDRESS,
    StateControllerAddressUnlockCondition => RETURN_ADDRESS,
    GovernorAddressUnlockCondition => RETURN_ADDRESS,
    ImmutableAccountAddressUnlockCondition => ACCOUNT_ONLY,
);

impl Packable for StorageDepositReturnUnlockCondition {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.kinded(&self.return_address, RETURN_ADDRESS, "StorageDepositReturnUnlockCondition")?;
        p.u64(self.amount);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            return_address: u.kinded(RETURN_ADDRESS, "StorageDepositReturnUnlockCondition")?,
            amount: u.u64()?,
        })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        if self.amount > params.token_supply {
            return Err(CodecError::schema("StorageDepositReturnUnlockCondition", "amount exceeds token supply"));
        }
        self.return_address.validate(params)
    }
}

impl Packable for TimelockUnlockCondition {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u32(self.slot);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { slot: u.u32()? })
    }
}

impl Packable for ExpirationUnlockCondition {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.kinded(&self.return_address, RETURN_ADDRESS, "ExpirationUnlockCondition")?;
        p.u32(self.slot);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { return_address: u.kinded(RETURN_ADDRESS, "ExpirationUnlockCondition")?, slot: u.u32()? })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        self.return_address.validate(params)
    }
}
