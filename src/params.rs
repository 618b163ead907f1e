//! Protocol parameters (type 0, version 3).
//!
//! The parameter set is the codec's runtime configuration: it carries the
//! network identity, the slot clock, the score tables and the limits used by
//! [`Packable::validate`](crate::ser::Packable::validate).

use nova_primitives::{blake2b_256, u64_from_le};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{
    errors::CodecError,
    ser::{encode, Bounds, Packable, Packer, Prefix, Unpacker},
    types::{EpochIndex, Identifier, SlotIndex},
};

const NAME_BOUNDS: Bounds = Bounds::new(Prefix::U8, 1, 255);
const HRP_BOUNDS: Bounds = Bounds::new(Prefix::U8, 1, 83);
const DECAY_FACTORS_BOUNDS: Bounds = Bounds::new(Prefix::U16, 0, u16::MAX as usize);

const NANOS_PER_SECOND: u64 = 1_000_000_000;

pub const PROTOCOL_PARAMETERS_KIND: u8 = 0;
pub const PROTOCOL_VERSION: u8 = 3;
pub const DEFAULT_NETWORK_NAME: &str = "TestJungle";
pub const DEFAULT_BECH32_HRP: &str = "tgl";
pub const DEFAULT_GENESIS_UNIX_TIMESTAMP: u64 = 1_695_275_822;
pub const DEFAULT_TOKEN_SUPPLY: u64 = 2_779_530_283_277_761;

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageScoreParameters {
    #[serde_as(as = "DisplayFromStr")]
    pub storage_cost: u64,
    pub factor_data: u8,
    #[serde_as(as = "DisplayFromStr")]
    pub offset_output_overhead: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub offset_ed25519_block_issuer_key: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub offset_staking_feature: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub offset_delegation: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkScoreParameters {
    pub data_byte: u32,
    pub block: u32,
    pub input: u32,
    pub context_input: u32,
    pub output: u32,
    pub native_token: u32,
    pub staking: u32,
    pub block_issuer: u32,
    pub allotment: u32,
    pub signature_ed25519: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManaParameters {
    pub bits_count: u8,
    pub generation_rate: u8,
    pub generation_rate_exponent: u8,
    pub decay_factors: Vec<u32>,
    pub decay_factors_exponent: u8,
    pub decay_factor_epochs_sum: u32,
    pub decay_factor_epochs_sum_exponent: u8,
    pub annual_decay_factor_percentage: u8,
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CongestionControlParameters {
    #[serde_as(as = "DisplayFromStr")]
    pub min_reference_mana_cost: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub increase: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub decrease: u64,
    pub increase_threshold: u32,
    pub decrease_threshold: u32,
    pub scheduler_rate: u32,
    pub max_buffer_size: u32,
    pub max_validation_buffer_size: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSignalingParameters {
    pub window_size: u8,
    pub window_target_ratio: u8,
    pub activation_offset: u8,
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsParameters {
    pub profit_margin_exponent: u8,
    pub bootstrapping_duration: EpochIndex,
    #[serde_as(as = "DisplayFromStr")]
    pub mana_share_coefficient: u64,
    pub decay_balancing_constant_exponent: u8,
    #[serde_as(as = "DisplayFromStr")]
    pub decay_balancing_constant: u64,
    pub pool_coefficient_exponent: u8,
}

/// Full parameter set. JSON carries `"type": 0` ahead of the fields.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct ProtocolParameters {
    pub version: u8,
    pub network_name: String,
    #[serde(rename = "bech32Hrp")]
    pub bech32_hrp: String,
    pub storage_score_parameters: StorageScoreParameters,
    pub work_score_parameters: WorkScoreParameters,
    pub mana_parameters: ManaParameters,
    #[serde_as(as = "DisplayFromStr")]
    pub token_supply: u64,
    pub genesis_slot: SlotIndex,
    #[serde_as(as = "DisplayFromStr")]
    pub genesis_unix_timestamp: u64,
    pub slot_duration_in_seconds: u8,
    pub slots_per_epoch_exponent: u8,
    pub staking_unbonding_period: EpochIndex,
    pub validation_blocks_per_slot: u8,
    pub punishment_epochs: EpochIndex,
    pub liveness_threshold_lower_bound: u16,
    pub liveness_threshold_upper_bound: u16,
    pub min_committable_age: SlotIndex,
    pub max_committable_age: SlotIndex,
    pub epoch_nearing_threshold: SlotIndex,
    pub congestion_control_parameters: CongestionControlParameters,
    pub version_signaling_parameters: VersionSignalingParameters,
    pub rewards_parameters: RewardsParameters,
    pub target_committee_size: u8,
    pub chain_switching_threshold: u8,
}

impl Default for ProtocolParameters {
    /// The "TestJungle" (`tgl`) parameter set used by the vector generator.
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            network_name: DEFAULT_NETWORK_NAME.to_owned(),
            bech32_hrp: DEFAULT_BECH32_HRP.to_owned(),
            storage_score_parameters: StorageScoreParameters::default(),
            work_score_parameters: WorkScoreParameters { block: 1, ..WorkScoreParameters::default() },
            mana_parameters: ManaParameters {
                bits_count: 63,
                generation_rate: 1,
                generation_rate_exponent: 17,
                decay_factors: vec![10, 20],
                decay_factors_exponent: 32,
                decay_factor_epochs_sum: 2_420_916_375,
                decay_factor_epochs_sum_exponent: 21,
                annual_decay_factor_percentage: 70,
            },
            token_supply: DEFAULT_TOKEN_SUPPLY,
            genesis_slot: 0,
            genesis_unix_timestamp: DEFAULT_GENESIS_UNIX_TIMESTAMP,
            slot_duration_in_seconds: 10,
            slots_per_epoch_exponent: 13,
            staking_unbonding_period: 10,
            validation_blocks_per_slot: 10,
            punishment_epochs: 10,
            liveness_threshold_lower_bound: 15,
            liveness_threshold_upper_bound: 30,
            min_committable_age: 10,
            max_committable_age: 20,
            epoch_nearing_threshold: 60,
            congestion_control_parameters: CongestionControlParameters {
                min_reference_mana_cost: 1,
                increase: 0,
                decrease: 0,
                increase_threshold: 800_000,
                decrease_threshold: 500_000,
                scheduler_rate: 100_000,
                max_buffer_size: 1000,
                max_validation_buffer_size: 100,
            },
            version_signaling_parameters: VersionSignalingParameters {
                window_size: 7,
                window_target_ratio: 5,
                activation_offset: 7,
            },
            rewards_parameters: RewardsParameters {
                profit_margin_exponent: 8,
                bootstrapping_duration: 1079,
                mana_share_coefficient: 2,
                decay_balancing_constant_exponent: 8,
                decay_balancing_constant: 1,
                pool_coefficient_exponent: 11,
            },
            target_committee_size: 32,
            chain_switching_threshold: 3,
        }
    }
}

impl ProtocolParameters {
    #[must_use]
    pub fn with_network(mut self, name: impl Into<String>, bech32_hrp: impl Into<String>) -> Self {
        self.network_name = name.into();
        self.bech32_hrp = bech32_hrp.into();
        self
    }

    #[must_use]
    pub const fn with_time_provider(
        mut self,
        genesis_slot: SlotIndex,
        genesis_unix_timestamp: u64,
        slot_duration_in_seconds: u8,
        slots_per_epoch_exponent: u8,
    ) -> Self {
        self.genesis_slot = genesis_slot;
        self.genesis_unix_timestamp = genesis_unix_timestamp;
        self.slot_duration_in_seconds = slot_duration_in_seconds;
        self.slots_per_epoch_exponent = slots_per_epoch_exponent;
        self
    }

    #[must_use]
    pub fn with_mana(mut self, mana: ManaParameters) -> Self {
        self.mana_parameters = mana;
        self
    }

    #[must_use]
    pub const fn with_supply(mut self, token_supply: u64, storage: StorageScoreParameters) -> Self {
        self.token_supply = token_supply;
        self.storage_score_parameters = storage;
        self
    }

    #[must_use]
    pub const fn with_work_score(mut self, work: WorkScoreParameters) -> Self {
        self.work_score_parameters = work;
        self
    }

    #[must_use]
    pub const fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// First eight bytes of `H(network name)`, little-endian.
    #[must_use]
    pub fn network_id(&self) -> u64 {
        network_id_of(&self.network_name)
    }

    /// `H(encode(self))`.
    pub fn hash(&self) -> Result<Identifier, CodecError> {
        Ok(Identifier(blake2b_256(&[&encode(self)?])))
    }

    /// Slot containing the instant `issuing_time` (nanoseconds since the
    /// Unix epoch). Instants before genesis map to the genesis slot.
    #[must_use]
    pub fn slot_from_time(&self, issuing_time: u64) -> SlotIndex {
        let genesis = self.genesis_unix_timestamp.saturating_mul(NANOS_PER_SECOND);
        if issuing_time < genesis {
            return self.genesis_slot;
        }
        let elapsed = issuing_time - genesis;
        let duration = u64::from(self.slot_duration_in_seconds.max(1)) * NANOS_PER_SECOND;
        let offset = SlotIndex::try_from(elapsed / duration).unwrap_or(SlotIndex::MAX);
        self.genesis_slot.saturating_add(offset).saturating_add(1)
    }

    /// Start of `slot` in nanoseconds since the Unix epoch.
    #[must_use]
    pub fn slot_start_time(&self, slot: SlotIndex) -> u64 {
        let genesis = self.genesis_unix_timestamp.saturating_mul(NANOS_PER_SECOND);
        if slot <= self.genesis_slot {
            return genesis;
        }
        let duration = u64::from(self.slot_duration_in_seconds) * NANOS_PER_SECOND;
        genesis.saturating_add(u64::from(slot - self.genesis_slot - 1).saturating_mul(duration))
    }

    #[must_use]
    pub const fn epoch_from_slot(&self, slot: SlotIndex) -> EpochIndex {
        if slot < self.genesis_slot {
            return 0;
        }
        // exponents of 32 and above leave every slot in epoch 0
        match (slot - self.genesis_slot).checked_shr(self.slots_per_epoch_exponent as u32) {
            Some(epoch) => epoch,
            None => 0,
        }
    }

    /// Largest representable mana value.
    #[must_use]
    pub fn max_mana(&self) -> u64 {
        match self.mana_parameters.bits_count {
            0 => 0,
            b if b >= 64 => u64::MAX,
            b => (1u64 << b) - 1,
        }
    }
}

/// Network id for an arbitrary network name.
#[must_use]
pub fn network_id_of(name: &str) -> u64 {
    let h = blake2b_256(&[name.as_bytes()]);
    u64_from_le(&h[..8])
}

fn pack_str(p: &mut Packer, bounds: Bounds, s: &str, ty: &'static str) -> Result<(), CodecError> {
    p.prefixed_bytes(bounds, s.as_bytes(), ty)
}

fn unpack_str(u: &mut Unpacker<'_>, bounds: Bounds, ty: &'static str) -> Result<String, CodecError> {
    let raw = u.prefixed_bytes(bounds, ty)?;
    String::from_utf8(raw.to_vec()).map_err(|e| CodecError::malformed(ty, e.to_string()))
}

impl Packable for StorageScoreParameters {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u64(self.storage_cost);
        p.u8(self.factor_data);
        p.u64(self.offset_output_overhead);
        p.u64(self.offset_ed25519_block_issuer_key);
        p.u64(self.offset_staking_feature);
        p.u64(self.offset_delegation);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            storage_cost: u.u64()?,
            factor_data: u.u8()?,
            offset_output_overhead: u.u64()?,
            offset_ed25519_block_issuer_key: u.u64()?,
            offset_staking_feature: u.u64()?,
            offset_delegation: u.u64()?,
        })
    }
}

impl Packable for WorkScoreParameters {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        for w in [
            self.data_byte,
            self.block,
            self.input,
            self.context_input,
            self.output,
            self.native_token,
            self.staking,
            self.block_issuer,
            self.allotment,
            self.signature_ed25519,
        ] {
            p.u32(w);
        }
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            data_byte: u.u32()?,
            block: u.u32()?,
            input: u.u32()?,
            context_input: u.u32()?,
            output: u.u32()?,
            native_token: u.u32()?,
            staking: u.u32()?,
            block_issuer: u.u32()?,
            allotment: u.u32()?,
            signature_ed25519: u.u32()?,
        })
    }
}

impl Packable for ManaParameters {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u8(self.bits_count);
        p.u8(self.generation_rate);
        p.u8(self.generation_rate_exponent);
        p.list(DECAY_FACTORS_BOUNDS, &self.decay_factors, "ManaParameters")?;
        p.u8(self.decay_factors_exponent);
        p.u32(self.decay_factor_epochs_sum);
        p.u8(self.decay_factor_epochs_sum_exponent);
        p.u8(self.annual_decay_factor_percentage);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            bits_count: u.u8()?,
            generation_rate: u.u8()?,
            generation_rate_exponent: u.u8()?,
            decay_factors: u.list(DECAY_FACTORS_BOUNDS, "ManaParameters")?,
            decay_factors_exponent: u.u8()?,
            decay_factor_epochs_sum: u.u32()?,
            decay_factor_epochs_sum_exponent: u.u8()?,
            annual_decay_factor_percentage: u.u8()?,
        })
    }
}

impl Packable for CongestionControlParameters {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u64(self.min_reference_mana_cost);
        p.u64(self.increase);
        p.u64(self.decrease);
        p.u32(self.increase_threshold);
        p.u32(self.decrease_threshold);
        p.u32(self.scheduler_rate);
        p.u32(self.max_buffer_size);
        p.u32(self.max_validation_buffer_size);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            min_reference_mana_cost: u.u64()?,
            increase: u.u64()?,
            decrease: u.u64()?,
            increase_threshold: u.u32()?,
            decrease_threshold: u.u32()?,
            scheduler_rate: u.u32()?,
            max_buffer_size: u.u32()?,
            max_validation_buffer_size: u.u32()?,
        })
    }
}

impl Packable for VersionSignalingParameters {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u8(self.window_size);
        p.u8(self.window_target_ratio);
        p.u8(self.activation_offset);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self { window_size: u.u8()?, window_target_ratio: u.u8()?, activation_offset: u.u8()? })
    }
}

impl Packable for RewardsParameters {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        p.u8(self.profit_margin_exponent);
        p.u32(self.bootstrapping_duration);
        p.u64(self.mana_share_coefficient);
        p.u8(self.decay_balancing_constant_exponent);
        p.u64(self.decay_balancing_constant);
        p.u8(self.pool_coefficient_exponent);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            profit_margin_exponent: u.u8()?,
            bootstrapping_duration: u.u32()?,
            mana_share_coefficient: u.u64()?,
            decay_balancing_constant_exponent: u.u8()?,
            decay_balancing_constant: u.u64()?,
            pool_coefficient_exponent: u.u8()?,
        })
    }
}

impl Packable for ProtocolParameters {
    fn pack(&self, p: &mut Packer) -> Result<(), CodecError> {
        const TY: &str = "ProtocolParameters";
        p.u8(PROTOCOL_PARAMETERS_KIND);
        p.u8(self.version);
        pack_str(p, NAME_BOUNDS, &self.network_name, TY)?;
        pack_str(p, HRP_BOUNDS, &self.bech32_hrp, TY)?;
        self.storage_score_parameters.pack(p)?;
        self.work_score_parameters.pack(p)?;
        self.mana_parameters.pack(p)?;
        p.u64(self.token_supply);
        p.u32(self.genesis_slot);
        p.u64(self.genesis_unix_timestamp);
        p.u8(self.slot_duration_in_seconds);
        p.u8(self.slots_per_epoch_exponent);
        p.u32(self.staking_unbonding_period);
        p.u8(self.validation_blocks_per_slot);
        p.u32(self.punishment_epochs);
        p.u16(self.liveness_threshold_lower_bound);
        p.u16(self.liveness_threshold_upper_bound);
        p.u32(self.min_committable_age);
        p.u32(self.max_committable_age);
        p.u32(self.epoch_nearing_threshold);
        self.congestion_control_parameters.pack(p)?;
        self.version_signaling_parameters.pack(p)?;
        self.rewards_parameters.pack(p)?;
        p.u8(self.target_committee_size);
        p.u8(self.chain_switching_threshold);
        Ok(())
    }

    fn unpack(u: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        const TY: &str = "ProtocolParameters";
        let kind = u.u8()?;
        if kind != PROTOCOL_PARAMETERS_KIND {
            return Err(CodecError::unknown_kind(TY, kind));
        }
        Ok(Self {
            version: u.u8()?,
            network_name: unpack_str(u, NAME_BOUNDS, TY)?,
            bech32_hrp: unpack_str(u, HRP_BOUNDS, TY)?,
            storage_score_parameters: StorageScoreParameters::unpack(u)?,
            work_score_parameters: WorkScoreParameters::unpack(u)?,
            mana_parameters: ManaParameters::unpack(u)?,
            token_supply: u.u64()?,
            genesis_slot: u.u32()?,
            genesis_unix_timestamp: u.u64()?,
            slot_duration_in_seconds: u.u8()?,
            slots_per_epoch_exponent: u.u8()?,
            staking_unbonding_period: u.u32()?,
            validation_blocks_per_slot: u.u8()?,
            punishment_epochs: u.u32()?,
            liveness_threshold_lower_bound: u.u16()?,
            liveness_threshold_upper_bound: u.u16()?,
            min_committable_age: u.u32()?,
            max_committable_age: u.u32()?,
            epoch_nearing_threshold: u.u32()?,
            congestion_control_parameters: CongestionControlParameters::unpack(u)?,
            version_signaling_parameters: VersionSignalingParameters::unpack(u)?,
            rewards_parameters: RewardsParameters::unpack(u)?,
            target_committee_size: u.u8()?,
            chain_switching_threshold: u.u8()?,
        })
    }

    fn validate(&self, _params: &Self) -> Result<(), CodecError> {
        const TY: &str = "ProtocolParameters";
        if self.slot_duration_in_seconds == 0 {
            return Err(CodecError::schema(TY, "slot duration must be positive"));
        }
        if self.slots_per_epoch_exponent >= 32 {
            return Err(CodecError::schema(TY, "slots per epoch exponent must be below 32"));
        }
        if self.mana_parameters.bits_count == 0 || self.mana_parameters.bits_count > 64 {
            return Err(CodecError::schema(TY, "mana bits count must be in [1, 64]"));
        }
        if self.liveness_threshold_lower_bound > self.liveness_threshold_upper_bound {
            return Err(CodecError::schema(TY, "liveness lower bound exceeds upper bound"));
        }
        if self.min_committable_age > self.max_committable_age {
            return Err(CodecError::schema(TY, "min committable age exceeds max committable age"));
        }
        Ok(())
    }
}

struct Fields<'a>(&'a ProtocolParameters);

impl Serialize for Fields<'_> {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        ProtocolParameters::serialize(self.0, s)
    }
}

impl Serialize for ProtocolParameters {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        crate::json::Tagged { kind: PROTOCOL_PARAMETERS_KIND, inner: &Fields(self) }.serialize(s)
    }
}

impl<'de> Deserialize<'de> for ProtocolParameters {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;
        let value = serde_json::Value::deserialize(d)?;
        match crate::json::kind_of(&value).map_err(D::Error::custom)? {
            PROTOCOL_PARAMETERS_KIND => Self::deserialize(value).map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("unknown protocol parameters type {other}"))),
        }
    }
}
