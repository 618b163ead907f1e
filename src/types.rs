use nova_primitives::{
    blake2b_256,
    constants::{HASH_LEN, OUTPUT_ID_LEN, SLOT_IDENTIFIER_LEN},
};

use crate::{errors::CodecError, ser::encode, ser::le16, ser::le32};

pub type SlotIndex = u32;
pub type EpochIndex = u32;

fixed_bytes!(
    /// BLAKE2b-256 digest used as a content identifier.
    Identifier,
    HASH_LEN
);
fixed_bytes!(AccountId, HASH_LEN);
fixed_bytes!(NftId, HASH_LEN);
fixed_bytes!(AnchorId, HASH_LEN);
fixed_bytes!(DelegationId, HASH_LEN);
fixed_bytes!(
    /// `H(H(header) || H(body) || signature) || slot`.
    BlockId,
    SLOT_IDENTIFIER_LEN
);
fixed_bytes!(
    /// `H(commitment) || slot`.
    CommitmentId,
    SLOT_IDENTIFIER_LEN
);
fixed_bytes!(
    /// `H(transaction commitment || output commitment) || creation slot`.
    TransactionId,
    SLOT_IDENTIFIER_LEN
);
fixed_bytes!(
    /// `TransactionId || output index`.
    OutputId,
    OUTPUT_ID_LEN
);
fixed_bytes!(
    /// Foundry identifier, also the native token id:
    /// `account address (33) || serial number || token scheme type`.
    TokenId,
    OUTPUT_ID_LEN
);

pub type FoundryId = TokenId;

impl Identifier {
    /// `BLAKE2b-256(bytes)`.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(blake2b_256(&[bytes]))
    }
}

// Slot-suffixed identifiers share one layout.
macro_rules! impl_slot_identifier {
    ($($t:ty),+) => {$(
        impl $t {
            #[must_use]
            pub fn from_parts(id: &Identifier, slot: SlotIndex) -> Self {
                let mut out = [0u8; SLOT_IDENTIFIER_LEN];
                out[..HASH_LEN].copy_from_slice(&id.0);
                out[HASH_LEN..].copy_from_slice(&le32(slot));
                Self(out)
            }

            #[must_use]
            pub fn identifier(&self) -> Identifier {
                let mut id = [0u8; HASH_LEN];
                id.copy_from_slice(&self.0[..HASH_LEN]);
                Identifier(id)
            }

            #[must_use]
            pub fn slot(&self) -> SlotIndex {
                let mut b = [0u8; 4];
                b.copy_from_slice(&self.0[HASH_LEN..]);
                SlotIndex::from_le_bytes(b)
            }
        }
    )+};
}
impl_slot_identifier!(BlockId, CommitmentId, TransactionId);

impl OutputId {
    #[must_use]
    pub fn new_from(transaction_id: &TransactionId, index: u16) -> Self {
        let mut out = [0u8; OUTPUT_ID_LEN];
        out[..SLOT_IDENTIFIER_LEN].copy_from_slice(&transaction_id.0);
        out[SLOT_IDENTIFIER_LEN..].copy_from_slice(&le16(index));
        Self(out)
    }

    #[must_use]
    pub fn transaction_id(&self) -> TransactionId {
        let mut id = [0u8; SLOT_IDENTIFIER_LEN];
        id.copy_from_slice(&self.0[..SLOT_IDENTIFIER_LEN]);
        TransactionId(id)
    }

    #[must_use]
    pub fn index(&self) -> u16 {
        u16::from_le_bytes([self.0[SLOT_IDENTIFIER_LEN], self.0[SLOT_IDENTIFIER_LEN + 1]])
    }
}

// Chain ids of freshly created outputs are the hash of the creating output id.
macro_rules! impl_chain_id {
    ($($t:ty),+) => {$(
        impl $t {
            #[must_use]
            pub fn from_output_id(output_id: &OutputId) -> Self {
                Self(blake2b_256(&[&output_id.0]))
            }

            #[must_use]
            pub fn is_null(&self) -> bool {
                self.0 == [0u8; HASH_LEN]
            }
        }
    )+};
}
impl_chain_id!(AccountId, NftId, AnchorId, DelegationId);

impl TokenId {
    /// Foundry id for `serial` under the controlling account.
    pub fn build(account: &crate::address::AccountAddress, serial: u32, token_scheme_kind: u8) -> Result<Self, CodecError> {
        let address = encode(&crate::address::Address::Account(*account))?;
        let mut out = [0u8; OUTPUT_ID_LEN];
        out[..address.len()].copy_from_slice(&address);
        out[address.len()..address.len() + 4].copy_from_slice(&le32(serial));
        out[OUTPUT_ID_LEN - 1] = token_scheme_kind;
        Ok(Self(out))
    }
}
