use std::collections::HashSet;

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{
    capabilities::TransactionCapabilities,
    errors::CodecError,
    hashers,
    input::{Allotment, ContextInput, Input},
    output::Output,
    params::ProtocolParameters,
    payload::{Payload, TAGGED_DATA_PAYLOAD_KIND},
    ser::{encode, ensure_strictly_sorted, Bounds, Kinded, Packable, Packer, Prefix, Unpacker},
    signature::{Ed25519Signature, Signature},
    types::{OutputId, SlotIndex, TransactionId},
    unlock::{validate_unlocks, ReferenceUnlock, SignatureUnlock, Unlock},
};

pub const MAX_INPUTS: usize = 128;
pub const MAX_OUTPUTS: usize = 128;

const CONTEXT_INPUTS: Bounds = Bounds::new(Prefix::U16, 0, 128);
const INPUTS: Bounds = Bounds::new(Prefix::U16, 1, MAX_INPUTS);
const ALLOTMENTS: Bounds = Bounds::new(Prefix::U16, 0, 128);
const OUTPUTS: Bounds = Bounds::new(Prefix::U16, 1, MAX_OUTPUTS);
const UNLOCKS: Bounds = Bounds::new(Prefix::U16, 1, MAX_INPUTS);

/// Unsigned transaction. Serialized without a type byte; it only ever
/// travels inside a [`SignedTransaction`].
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde_as(as = "DisplayFromStr")]
    pub network_id: u64,
    pub creation_slot: SlotIndex,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_inputs: Vec<ContextInput>,
    pub inputs: Vec<Input>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allotments: Vec<Allotment>,
    #[serde(default, skip_serializing_if = "TransactionCapabilities::is_empty")]
    pub capabilities: TransactionCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    pub outputs: Vec<Output>,
}

impl Transaction {
    /// Everything except the outputs: the part committed to by
    /// [`hashers::transaction_commitment`].
    pub(crate) fn pack_essence(&self, p: &mut Packer) -> Result<(), CodecError> {
        const TY: &str = "Transaction";
        p.u64(self.network_id);
        p.u32(self.creation_slot);
        p.list(CONTEXT_INPUTS, &self.context_inputs, TY)?;
        p.list(INPUTS, &self.inputs, TY)?;
        p.list(ALLOTMENTS, &self.allotments, TY)?;
        self.capabilities.pack(p)?;
        if let Some(payload) = &self.payload {
            if payload.kind() != TAGGED_DATA_PAYLOAD_KIND {
                return Err(CodecError::schema(TY, format!("payload type {} not allowed", payload.kind())));
            }
        }
        p.optional(self.payload.as_ref(), TY)
    }

    pub fn id(&self) -> Result<TransactionId, CodecError> {
        hashers::transaction_id(self)
    }

    /// Message every signature unlock signs: the hash part of the id.
    pub fn signing_message(&self) -> Result<[u8; 32], CodecError> {
        Ok(self.id()?.identifier().0)
    }

    pub fn output_id(&self, index: u16) -> Result<OutputId, CodecError> {
        if usize::from(index) >= self.outputs.len() {
            return Err(CodecError::IndexOutOfRange { index: usize::from(index), len: self.outputs.len() });
        }
        Ok(OutputId::new_from(&self.id()?, index))
    }

    pub fn has_capability(&self, flag: crate::capabilities::TransactionCapabilityFlag) -> bool {
        self.capabilities.has(flag)
    }
}

impl Packable for Transaction {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        self.pack_essence(p)?;
        p.list(OUTPUTS, &self.outputs, "Transaction")
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        const TY: &str = "Transaction";
        let network_id = u.u64()?;
        let creation_slot = u.u32()?;
        let context_inputs = u.list(CONTEXT_INPUTS, TY)?;
        let inputs = u.list(INPUTS, TY)?;
        let allotments = u.list(ALLOTMENTS, TY)?;
        let capabilities = TransactionCapabilities::unpack(u)?;
        let payload: Option<Payload> = u.optional(TY)?;
        if let Some(payload) = &payload {
            if payload.kind() != TAGGED_DATA_PAYLOAD_KIND {
                return Err(CodecError::malformed(TY, format!("payload type {} not allowed", payload.kind())));
            }
        }
        let outputs = u.list(OUTPUTS, TY)?;
        Ok(Self { network_id, creation_slot, context_inputs, inputs, allotments, capabilities, payload, outputs })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        const TY: &str = "Transaction";
        if self.network_id != params.network_id() {
            return Err(CodecError::schema(TY, format!("network id {} does not match {}", self.network_id, params.network_id())));
        }
        let context_keys = self.context_inputs.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
        ensure_strictly_sorted(context_keys, TY, "context inputs")?;
        let commitments = self.context_inputs.iter().filter(|c| matches!(c, ContextInput::Commitment(_))).count();
        if commitments > 1 {
            return Err(CodecError::schema(TY, "at most one commitment input"));
        }
        for c in &self.context_inputs {
            if let ContextInput::Reward(r) = c {
                if usize::from(r.index) >= self.inputs.len() {
                    return Err(CodecError::schema(TY, format!("reward input references missing input {}", r.index)));
                }
            }
        }

        let mut seen = HashSet::with_capacity(self.inputs.len());
        if !self.inputs.iter().all(|i| seen.insert(i.output_id())) {
            return Err(CodecError::schema(TY, "inputs must be unique"));
        }

        ensure_strictly_sorted(self.allotments.iter().map(|a| a.account_id), TY, "allotments")?;
        self.allotments.iter().try_for_each(|a| a.validate(params))?;
        self.capabilities.validate(params)?;
        if let Some(payload) = &self.payload {
            payload.validate(params)?;
        }

        let mut total: u64 = 0;
        for output in &self.outputs {
            output.validate(params)?;
            total = total
                .checked_add(output.amount())
                .filter(|t| *t <= params.token_supply)
                .ok_or_else(|| CodecError::schema(TY, "sum of output amounts exceeds token supply"))?;
        }
        Ok(())
    }
}

/// A transaction together with the unlocks that authorize its inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub unlocks: Vec<Unlock>,
}

impl SignedTransaction {
    /// Unlock input `i` with `keys[i]`. The first use of a key produces a
    /// signature unlock, later uses reference it.
    pub fn sign(transaction: Transaction, keys: &[SigningKey]) -> Result<Self, CodecError> {
        if keys.len() != transaction.inputs.len() {
            return Err(CodecError::schema(
                "SignedTransaction",
                format!("{} keys for {} inputs", keys.len(), transaction.inputs.len()),
            ));
        }
        let msg = transaction.signing_message()?;
        let mut first_use: Vec<([u8; 32], u16)> = Vec::new();
        let mut unlocks = Vec::with_capacity(keys.len());
        for (index, key) in keys.iter().enumerate() {
            let public_key = key.verifying_key().to_bytes();
            if let Some((_, at)) = first_use.iter().find(|(pk, _)| *pk == public_key) {
                unlocks.push(Unlock::Reference(ReferenceUnlock { reference: *at }));
                continue;
            }
            let at = u16::try_from(index).map_err(|_| CodecError::schema("SignedTransaction", "too many inputs"))?;
            first_use.push((public_key, at));
            unlocks.push(Unlock::Signature(SignatureUnlock {
                signature: Signature::Ed25519(Ed25519Signature::sign(key, &msg)),
            }));
        }
        Ok(Self { transaction, unlocks })
    }

    /// Checks every signature unlock, including those nested in multi unlocks.
    pub fn verify_signatures(&self) -> Result<(), CodecError> {
        fn walk(unlocks: &[Unlock], msg: &[u8]) -> Result<(), CodecError> {
            for unlock in unlocks {
                match unlock {
                    Unlock::Signature(s) => s.signature.verify(msg)?,
                    Unlock::Multi(m) => walk(&m.unlocks, msg)?,
                    _ => {}
                }
            }
            Ok(())
        }
        walk(&self.unlocks, &self.transaction.signing_message()?)
    }

    pub fn id(&self) -> Result<TransactionId, CodecError> {
        self.transaction.id()
    }
}

impl Packable for SignedTransaction {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        self.transaction.pack(p)?;
        p.list(UNLOCKS, &self.unlocks, "SignedTransaction")
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { transaction: Transaction::unpack(u)?, unlocks: u.list(UNLOCKS, "SignedTransaction")? })
    }

    fn validate(&self, params: &ProtocolParameters) -> Result<(), CodecError> {
        self.transaction.validate(params)?;
        if self.unlocks.len() != self.transaction.inputs.len() {
            return Err(CodecError::schema(
                "SignedTransaction",
                format!("{} unlocks for {} inputs", self.unlocks.len(), self.transaction.inputs.len()),
            ));
        }
        validate_unlocks(&self.unlocks, params)
    }
}
