use nova_primitives::Hash256;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    block::Block,
    commitment::Commitment,
    errors::CodecError,
    hashers,
    json,
    merkle::{self, MerkleProof},
    output::Output,
    params::ProtocolParameters,
    proof::OutputIdProof,
    score::{self, WorkScore},
    ser::{self, Packable},
    transaction::Transaction,
    types::{BlockId, CommitmentId, Identifier, TransactionId},
};

/// Codec entry point bound to one protocol parameter set.
///
/// Every method is a pure function of its arguments and the parameters held
/// here; several `Api` values with different parameters can be used side by
/// side.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Api {
    params: ProtocolParameters,
}

impl Api {
    #[must_use]
    pub const fn new(params: ProtocolParameters) -> Self {
        Self { params }
    }

    #[must_use]
    pub const fn params(&self) -> &ProtocolParameters {
        &self.params
    }

    pub fn encode<T: Packable>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        ser::encode(value)
    }

    /// Strict decode; every byte must be consumed.
    pub fn decode<T: Packable>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        ser::decode(bytes)
    }

    pub fn decode_prefix<T: Packable>(&self, bytes: &[u8]) -> Result<(T, usize), CodecError> {
        ser::decode_prefix(bytes)
    }

    /// Strict decode followed by [`Api::validate`].
    pub fn decode_validated<T: Packable>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        let value = self.decode(bytes)?;
        self.validate(&value)?;
        Ok(value)
    }

    pub fn validate<T: Packable>(&self, value: &T) -> Result<(), CodecError> {
        value.validate(&self.params)
    }

    /// Pretty-printed JSON, two-space indent.
    pub fn json_encode<T: Serialize>(&self, value: &T) -> Result<String, CodecError> {
        json::to_string_pretty(value)
    }

    pub fn json_encode_compact<T: Serialize>(&self, value: &T) -> Result<String, CodecError> {
        json::to_string(value)
    }

    /// Parses JSON and checks the result against the binary schema bounds,
    /// so anything returned here also encodes.
    pub fn json_decode<T: DeserializeOwned + Packable>(&self, text: &str) -> Result<T, CodecError> {
        let value: T = json::from_str(text)?;
        ser::encode(&value)?;
        Ok(value)
    }

    pub fn json_decode_validated<T: DeserializeOwned + Packable>(&self, text: &str) -> Result<T, CodecError> {
        let value: T = self.json_decode(text)?;
        self.validate(&value)?;
        Ok(value)
    }

    pub fn identifier_of<T: Packable>(&self, value: &T) -> Result<Identifier, CodecError> {
        hashers::identifier_of(value)
    }

    pub fn block_id(&self, block: &Block) -> Result<BlockId, CodecError> {
        hashers::block_id(block, &self.params)
    }

    pub fn commitment_id(&self, commitment: &Commitment) -> Result<CommitmentId, CodecError> {
        hashers::commitment_id(commitment)
    }

    pub fn transaction_id(&self, tx: &Transaction) -> Result<TransactionId, CodecError> {
        hashers::transaction_id(tx)
    }

    pub fn protocol_parameters_hash(&self) -> Result<Identifier, CodecError> {
        self.params.hash()
    }

    pub fn build_output_id_proof(&self, tx: &Transaction, index: u16) -> Result<OutputIdProof, CodecError> {
        OutputIdProof::build(tx, index)
    }

    #[must_use]
    pub fn verify_proof(&self, proof: &MerkleProof, leaf: &[u8], root: &Hash256) -> bool {
        merkle::verify(proof, leaf, root)
    }

    pub fn work_score<T: WorkScore>(&self, value: &T) -> Result<u32, CodecError> {
        value.work_score(&self.params.work_score_parameters)
    }

    pub fn storage_score(&self, output: &Output) -> Result<u64, CodecError> {
        score::storage_score(output, &self.params.storage_score_parameters)
    }

    pub fn min_deposit(&self, output: &Output) -> Result<u64, CodecError> {
        score::min_deposit(output, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Identifier;

    fn assert_send_sync<T: Send + Sync + Clone>() {}

    #[test]
    fn api_is_shareable() {
        assert_send_sync::<Api>();
    }

    #[test]
    fn json_decode_runs_schema_bounds() {
        let api = Api::default();
        // a tag of 65 bytes parses as JSON but cannot be encoded
        let text = format!(r#"{{"type":0,"tag":"0x{}"}}"#, "00".repeat(65));
        assert!(matches!(
            api.json_decode::<crate::payload::Payload>(&text),
            Err(CodecError::SchemaViolation { .. })
        ));
        assert!(matches!(
            api.json_decode::<crate::payload::Payload>("{\"type\":"),
            Err(CodecError::MalformedEncoding { .. })
        ));
        assert!(matches!(
            api.json_decode::<crate::payload::Payload>(r#"{"type":9}"#),
            Err(CodecError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn parameter_sets_coexist() {
        let a = Api::default();
        let b = Api::new(ProtocolParameters::default().with_network("elsewhere", "els"));
        assert_ne!(a.protocol_parameters_hash().unwrap(), b.protocol_parameters_hash().unwrap());
        let commitment = Commitment {
            protocol_version: 3,
            slot: 1,
            previous_commitment_id: CommitmentId([0; 36]),
            roots_id: Identifier([0; 32]),
            cumulative_weight: 0,
            reference_mana_cost: 1,
        };
        assert_eq!(a.commitment_id(&commitment).unwrap(), b.commitment_id(&commitment).unwrap());
    }
}
