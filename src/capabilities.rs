//! Capability bitmasks carried by restricted addresses and transactions.
//!
//! Bit `n` lives in byte `n / 8` at position `n % 8`. The canonical form has
//! no trailing zero byte, so "no capabilities" is the empty byte string.

use core::{fmt, marker::PhantomData};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    errors::CodecError,
    json::prefix_hex,
    params::ProtocolParameters,
    ser::{Bounds, Packable, Packer, Prefix, Unpacker},
};

/// A family of capability flags with a fixed encoded width.
pub trait CapabilityFlag: Copy + 'static {
    const NAME: &'static str;
    const MAX_BYTES: usize;
    const ALL: &'static [Self];

    fn bit(self) -> usize;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressCapabilityFlag {
    NativeTokens,
    Mana,
    Timelock,
    Expiration,
    StorageDepositReturn,
    AccountOutputs,
    AnchorOutputs,
    NftOutputs,
    DelegationOutputs,
}

impl CapabilityFlag for AddressCapabilityFlag {
    const NAME: &'static str = "AddressCapabilities";
    const MAX_BYTES: usize = 2;
    const ALL: &'static [Self] = &[
        Self::NativeTokens,
        Self::Mana,
        Self::Timelock,
        Self::Expiration,
        Self::StorageDepositReturn,
        Self::AccountOutputs,
        Self::AnchorOutputs,
        Self::NftOutputs,
        Self::DelegationOutputs,
    ];

    fn bit(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionCapabilityFlag {
    BurnNativeTokens,
    BurnMana,
    DestroyAccountOutputs,
    DestroyAnchorOutputs,
    DestroyFoundryOutputs,
    DestroyNftOutputs,
}

impl CapabilityFlag for TransactionCapabilityFlag {
    const NAME: &'static str = "TransactionCapabilities";
    const MAX_BYTES: usize = 1;
    const ALL: &'static [Self] = &[
        Self::BurnNativeTokens,
        Self::BurnMana,
        Self::DestroyAccountOutputs,
        Self::DestroyAnchorOutputs,
        Self::DestroyFoundryOutputs,
        Self::DestroyNftOutputs,
    ];

    fn bit(self) -> usize {
        self as usize
    }
}

pub struct Capabilities<F> {
    bytes: Vec<u8>,
    _flag: PhantomData<F>,
}

pub type AddressCapabilities = Capabilities<AddressCapabilityFlag>;
pub type TransactionCapabilities = Capabilities<TransactionCapabilityFlag>;

impl<F: CapabilityFlag> Capabilities<F> {
    const fn bounds() -> Bounds {
        Bounds::new(Prefix::U8, 0, F::MAX_BYTES)
    }

    #[must_use]
    pub const fn none() -> Self {
        Self { bytes: Vec::new(), _flag: PhantomData }
    }

    #[must_use]
    pub fn all() -> Self {
        F::ALL.iter().fold(Self::none(), |c, f| c.with(*f))
    }

    /// Raw bytes as they appear on the wire. May be non-canonical if the
    /// value was decoded from such bytes.
    #[must_use]
    pub fn from_raw(bytes: Vec<u8>) -> Self {
        Self { bytes, _flag: PhantomData }
    }

    #[must_use]
    pub fn with(mut self, flag: F) -> Self {
        let (byte, bit) = (flag.bit() / 8, flag.bit() % 8);
        if self.bytes.len() <= byte {
            self.bytes.resize(byte + 1, 0);
        }
        self.bytes[byte] |= 1 << bit;
        self
    }

    #[must_use]
    pub fn has(&self, flag: F) -> bool {
        let (byte, bit) = (flag.bit() / 8, flag.bit() % 8);
        self.bytes.get(byte).is_some_and(|b| b & (1 << bit) != 0)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.bytes.last() != Some(&0)
    }
}

impl<F> Clone for Capabilities<F> {
    fn clone(&self) -> Self {
        Self { bytes: self.bytes.clone(), _flag: PhantomData }
    }
}

impl<F> PartialEq for Capabilities<F> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl<F> Eq for Capabilities<F> {}

impl<F: CapabilityFlag> Default for Capabilities<F> {
    fn default() -> Self {
        Self::none()
    }
}

impl<F: CapabilityFlag> fmt::Debug for Capabilities<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", F::NAME, prefix_hex::encode(&self.bytes))
    }
}

impl<F: CapabilityFlag> Packable for Capabilities<F> {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.prefixed_bytes(Self::bounds(), &self.bytes, F::NAME)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self::from_raw(u.prefixed_bytes(Self::bounds(), F::NAME)?.to_vec()))
    }

    fn validate(&self, _params: &ProtocolParameters) -> Result<(), CodecError> {
        if !self.is_canonical() {
            return Err(CodecError::schema(F::NAME, "trailing zero byte"));
        }
        let known = Self::all();
        let unknown = self
            .bytes
            .iter()
            .enumerate()
            .any(|(i, b)| b & !known.bytes.get(i).copied().unwrap_or(0) != 0);
        if unknown {
            return Err(CodecError::schema(F::NAME, "unknown capability bit set"));
        }
        Ok(())
    }
}

impl<F> Serialize for Capabilities<F> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        prefix_hex::serialize(&self.bytes, s)
    }
}

impl<'de, F> Deserialize<'de> for Capabilities<F> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        prefix_hex::deserialize(d).map(|bytes| Self { bytes, _flag: PhantomData })
    }
}
