use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::{
    address::Ed25519Address,
    errors::CodecError,
    json::prefix_hex,
    ser::{Packable, Packer, Unpacker},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ed25519Signature {
    #[serde(with = "prefix_hex")]
    pub public_key: [u8; 32],
    #[serde(with = "prefix_hex")]
    pub signature: [u8; 64],
}

impl Ed25519Signature {
    #[must_use]
    pub fn sign(key: &SigningKey, msg: &[u8]) -> Self {
        Self { public_key: key.verifying_key().to_bytes(), signature: key.sign(msg).to_bytes() }
    }

    /// Strict Ed25519 verification of `msg`.
    pub fn verify(&self, msg: &[u8]) -> Result<(), CodecError> {
        let vk = VerifyingKey::from_bytes(&self.public_key).map_err(|_| CodecError::InvalidSignature)?;
        let sig = ed25519_dalek::Signature::from_bytes(&self.signature);
        vk.verify_strict(msg, &sig).map_err(|_| CodecError::InvalidSignature)
    }

    /// The address this key controls.
    #[must_use]
    pub fn address(&self) -> Ed25519Address {
        Ed25519Address::from_public_key(&self.public_key)
    }
}

impl Packable for Ed25519Signature {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.bytes(&self.public_key);
        p.bytes(&self.signature);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { public_key: u.array()?, signature: u.array()? })
    }
}

tagged_union! {
    pub enum Signature as "Signature" {
        Ed25519(Ed25519Signature) = 0,
    }
}

impl Signature {
    pub fn verify(&self, msg: &[u8]) -> Result<(), CodecError> {
        match self {
            Self::Ed25519(s) => s.verify(msg),
        }
    }
}
