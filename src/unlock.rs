use serde::{Deserialize, Serialize};

use crate::{
    errors::CodecError,
    params::ProtocolParameters,
    ser::{Bounds, Kinded, Packable, Packer, Prefix, Unpacker},
    signature::Signature,
};

pub const SIGNATURE_UNLOCK_KIND: u8 = 0;
pub const REFERENCE_UNLOCK_KIND: u8 = 1;
pub const ACCOUNT_UNLOCK_KIND: u8 = 2;
pub const ANCHOR_UNLOCK_KIND: u8 = 3;
pub const NFT_UNLOCK_KIND: u8 = 4;
pub const MULTI_UNLOCK_KIND: u8 = 5;
pub const EMPTY_UNLOCK_KIND: u8 = 6;

const MULTI_UNLOCKS: Bounds = Bounds::new(Prefix::U8, 1, 10);
const MULTI_INNER_KINDS: &[u8] = &[
    SIGNATURE_UNLOCK_KIND,
    REFERENCE_UNLOCK_KIND,
    ACCOUNT_UNLOCK_KIND,
    ANCHOR_UNLOCK_KIND,
    NFT_UNLOCK_KIND,
    EMPTY_UNLOCK_KIND,
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureUnlock {
    pub signature: Signature,
}

/// Unlock that points at an earlier unlock by position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceUnlock {
    pub reference: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUnlock {
    pub reference: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorUnlock {
    pub reference: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftUnlock {
    pub reference: u16,
}

/// One unlock per address of a multi address, in address order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiUnlock {
    pub unlocks: Vec<Unlock>,
}

/// Placeholder for multi-address members that do not sign.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyUnlock {}

tagged_union! {
    pub enum Unlock as "Unlock" {
        Signature(SignatureUnlock) = 0,
        Reference(ReferenceUnlock) = 1,
        Account(AccountUnlock) = 2,
        Anchor(AnchorUnlock) = 3,
        Nft(NftUnlock) = 4,
        Multi(MultiUnlock) = 5,
        Empty(EmptyUnlock) = 6,
    }
}

impl Unlock {
    /// Number of signature checks this unlock triggers.
    #[must_use]
    pub fn signature_count(&self) -> usize {
        match self {
            Self::Signature(_) => 1,
            Self::Multi(m) => m.unlocks.iter().map(Self::signature_count).sum(),
            _ => 0,
        }
    }

    const fn reference(&self) -> Option<u16> {
        match self {
            Self::Reference(ReferenceUnlock { reference })
            | Self::Account(AccountUnlock { reference })
            | Self::Anchor(AnchorUnlock { reference })
            | Self::Nft(NftUnlock { reference }) => Some(*reference),
            _ => None,
        }
    }
}

impl Packable for SignatureUnlock {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        self.signature.pack(p)
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { signature: Signature::unpack(u)? })
    }
}

macro_rules! impl_reference_unlock {
    ($($t:ty),+) => {$(
        impl Packable for $t {
            fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
                p.u16(self.reference);
                Ok(())
            }

            fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
                Ok(Self { reference: u.u16()? })
            }
        }
    )+};
}
impl_reference_unlock!(ReferenceUnlock, AccountUnlock, AnchorUnlock, NftUnlock);

impl Packable for MultiUnlock {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.kinded_list(MULTI_UNLOCKS, &self.unlocks, MULTI_INNER_KINDS, "MultiUnlock")
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { unlocks: u.kinded_list(MULTI_UNLOCKS, MULTI_INNER_KINDS, "MultiUnlock")? })
    }
}

impl Packable for EmptyUnlock {
    fn pack(&self, _p: &mut Packer) -> Result<(), CodecError> {
        Ok(())
    }

    fn unpack(_u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {})
    }
}

/// Checks the positional rules of an unlock list: every reference points
/// strictly backwards, a plain reference lands on a signature unlock, and no
/// signature appears twice.
pub fn validate_unlocks(unlocks: &[Unlock], params: &ProtocolParameters) -> Result<(), CodecError> {
    const TY: &str = "Unlocks";
    let mut seen_signatures: Vec<&Signature> = Vec::new();
    for (index, unlock) in unlocks.iter().enumerate() {
        unlock.validate(params)?;
        if let Some(reference) = unlock.reference() {
            let target = usize::from(reference);
            if target >= index {
                return Err(CodecError::schema(TY, format!("unlock {index} references {target}, which is not earlier")));
            }
            if unlock.kind() == REFERENCE_UNLOCK_KIND && unlocks[target].kind() != SIGNATURE_UNLOCK_KIND {
                return Err(CodecError::schema(TY, format!("reference unlock {index} must point to a signature unlock")));
            }
        }
        if let Unlock::Signature(s) = unlock {
            if seen_signatures.contains(&&s.signature) {
                return Err(CodecError::schema(TY, format!("signature unlock {index} is a duplicate")));
            }
            seen_signatures.push(&s.signature);
        }
    }
    Ok(())
}
