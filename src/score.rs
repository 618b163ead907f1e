//! Work score (processing cost) and storage score (ledger footprint).

use crate::{
    block::{Block, BlockBody},
    errors::CodecError,
    feature::Feature,
    output::Output,
    params::{ProtocolParameters, StorageScoreParameters, WorkScoreParameters},
    payload::Payload,
    ser::encode,
    transaction::{SignedTransaction, Transaction},
    unlock::Unlock,
};

/// Output id, block id and slot index kept next to every stored output.
const OUTPUT_METADATA_BYTES: u64 = 38 + 36 + 4;

fn overflow() -> CodecError {
    CodecError::schema("WorkScore", "score overflows")
}

fn mul(a: u32, n: usize) -> Result<u32, CodecError> {
    u32::try_from(n).ok().and_then(|n| a.checked_mul(n)).ok_or_else(overflow)
}

fn sum(scores: impl IntoIterator<Item = Result<u32, CodecError>>) -> Result<u32, CodecError> {
    scores.into_iter().try_fold(0u32, |acc, s| acc.checked_add(s?).ok_or_else(overflow))
}

pub trait WorkScore {
    fn work_score(&self, params: &WorkScoreParameters) -> Result<u32, CodecError>;
}

impl WorkScore for Block {
    fn work_score(&self, params: &WorkScoreParameters) -> Result<u32, CodecError> {
        params.block.checked_add(self.body.work_score(params)?).ok_or_else(overflow)
    }
}

impl WorkScore for BlockBody {
    fn work_score(&self, params: &WorkScoreParameters) -> Result<u32, CodecError> {
        match self {
            Self::Basic(b) => b.payload.as_ref().map_or(Ok(0), |p| p.work_score(params)),
            Self::Validation(_) => Ok(0),
        }
    }
}

impl WorkScore for Payload {
    fn work_score(&self, params: &WorkScoreParameters) -> Result<u32, CodecError> {
        match self {
            Self::TaggedData(_) => mul(params.data_byte, encode(self)?.len()),
            Self::SignedTransaction(tx) => {
                let size = mul(params.data_byte, encode(self)?.len())?;
                size.checked_add(tx.work_score(params)?).ok_or_else(overflow)
            }
            Self::CandidacyAnnouncement(_) => Ok(0),
        }
    }
}

impl WorkScore for SignedTransaction {
    /// Transaction plus signature checks; the byte size is charged by the
    /// enclosing payload.
    fn work_score(&self, params: &WorkScoreParameters) -> Result<u32, CodecError> {
        let signatures: usize = self.unlocks.iter().map(Unlock::signature_count).sum();
        sum([self.transaction.work_score(params), mul(params.signature_ed25519, signatures)])
    }
}

impl WorkScore for Transaction {
    fn work_score(&self, params: &WorkScoreParameters) -> Result<u32, CodecError> {
        sum([
            mul(params.input, self.inputs.len()),
            mul(params.context_input, self.context_inputs.len()),
            mul(params.allotment, self.allotments.len()),
            sum(self.outputs.iter().map(|o| o.work_score(params))),
        ])
    }
}

impl WorkScore for Output {
    fn work_score(&self, params: &WorkScoreParameters) -> Result<u32, CodecError> {
        sum(std::iter::once(Ok(params.output)).chain(self.all_features().map(|f| {
            Ok(match f {
                Feature::NativeToken(_) => params.native_token,
                Feature::Staking(_) => params.staking,
                Feature::BlockIssuer(_) => params.block_issuer,
                _ => 0,
            })
        })))
    }
}

/// Storage score of `output` under `params`.
pub fn storage_score(output: &Output, params: &StorageScoreParameters) -> Result<u64, CodecError> {
    let overflow = || CodecError::schema("StorageScore", "score overflows");
    let factor = u64::from(params.factor_data);
    let size = u64::try_from(encode(output)?.len()).map_err(|_| overflow())?;
    let mut score = params
        .offset_output_overhead
        .checked_add(factor * OUTPUT_METADATA_BYTES)
        .and_then(|s| s.checked_add(factor.checked_mul(size)?))
        .ok_or_else(overflow)?;
    for feature in output.all_features() {
        let extra = match feature {
            Feature::BlockIssuer(b) => {
                let keys = u64::try_from(b.block_issuer_keys.len()).map_err(|_| overflow())?;
                params.offset_ed25519_block_issuer_key.checked_mul(keys).ok_or_else(overflow)?
            }
            Feature::Staking(_) => params.offset_staking_feature,
            _ => 0,
        };
        score = score.checked_add(extra).ok_or_else(overflow)?;
    }
    if matches!(output, Output::Delegation(_)) {
        score = score.checked_add(params.offset_delegation).ok_or_else(overflow)?;
    }
    Ok(score)
}

/// Minimum base token amount `output` must hold.
pub fn min_deposit(output: &Output, params: &ProtocolParameters) -> Result<u64, CodecError> {
    let storage = &params.storage_score_parameters;
    storage
        .storage_cost
        .checked_mul(storage_score(output, storage)?)
        .ok_or_else(|| CodecError::schema("StorageScore", "deposit overflows"))
}
