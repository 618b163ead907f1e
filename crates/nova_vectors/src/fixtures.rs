//! Fixtures behind each supported test vector.
//!
//! Randomness comes from a caller-supplied `ChaCha20Rng`, so a fixed seed
//! reproduces the same vectors byte for byte.

use anyhow::{bail, Context, Result};
use ed25519_dalek::SigningKey;
use nova_codec::{
    address::{
        AccountAddress, Address, Ed25519Address, MultiAddress, NftAddress, RestrictedAddress, WeightedAddress,
    },
    block::{BasicBlockBody, ValidationBlockBody},
    capabilities::{AddressCapabilities, AddressCapabilityFlag, TransactionCapabilities, TransactionCapabilityFlag},
    feature::{Feature, MetadataFeature, NativeTokenFeature},
    input::{Allotment, BlockIssuanceCreditInput, CommitmentInput, ContextInput, Input, RewardInput, UtxoInput},
    output::{AccountOutput, BasicOutput},
    payload::TaggedDataPayload,
    unlock_condition::{AddressUnlockCondition, UnlockCondition},
    AccountId, Api, Block, BlockBody, BlockHeader, BlockId, Commitment, CommitmentId, Identifier, NftId, Output,
    Payload, SignedTransaction, TokenId, Transaction, TransactionId,
};
use primitive_types::U256;
use rand_chacha::ChaCha20Rng;
use rand_core::RngCore;
use tracing::debug;

use crate::{address_text, print::Report};

/// Objects the generator knows, in the order `--list` prints them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorObject {
    ProtocolParameters,
    Commitment,
    Transaction,
    TransactionBasicBlock,
    TaggedDataBasicBlock,
    ValidationBlock,
    MultiAddress,
    OutputIdProof,
    RestrictedAddress,
}

impl VectorObject {
    pub const ALL: [Self; 9] = [
        Self::ProtocolParameters,
        Self::Commitment,
        Self::Transaction,
        Self::TransactionBasicBlock,
        Self::TaggedDataBasicBlock,
        Self::ValidationBlock,
        Self::MultiAddress,
        Self::OutputIdProof,
        Self::RestrictedAddress,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ProtocolParameters => "Protocol Parameters",
            Self::Commitment => "Commitment",
            Self::Transaction => "Transaction",
            Self::TransactionBasicBlock => "Transaction Basic Block",
            Self::TaggedDataBasicBlock => "TaggedData Basic Block",
            Self::ValidationBlock => "Validation Block",
            Self::MultiAddress => "Multi Address",
            Self::OutputIdProof => "Output ID Proof",
            Self::RestrictedAddress => "Restricted Address",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.name() == name)
    }
}

/// Usage text listing every supported object.
#[must_use]
pub fn usage() -> String {
    let mut out = String::from("Usage: nova-vectors \"[object name]\"\nSupported object:\n");
    for o in VectorObject::ALL {
        out.push_str(&format!("\t - {}\n", o.name()));
    }
    out
}

pub fn generate(object: VectorObject, api: &Api, rng: &mut ChaCha20Rng) -> Result<Report> {
    let mut report = Report::new();
    match object {
        VectorObject::ProtocolParameters => protocol_parameters(api, &mut report)?,
        VectorObject::Commitment => commitment(api, rng, &mut report)?,
        VectorObject::Transaction => transaction(api, rng, &mut report)?,
        VectorObject::TransactionBasicBlock => transaction_block(api, rng, &mut report)?,
        VectorObject::TaggedDataBasicBlock => tagged_data_block(api, rng, &mut report)?,
        VectorObject::ValidationBlock => validation_block(api, rng, &mut report)?,
        VectorObject::MultiAddress => multi_address(api, &mut report)?,
        VectorObject::OutputIdProof => output_id_proofs(api, rng, &mut report)?,
        VectorObject::RestrictedAddress => restricted_addresses(api, rng, &mut report)?,
    }
    Ok(report)
}

fn rand_bytes<const N: usize>(rng: &mut ChaCha20Rng) -> [u8; N] {
    let mut out = [0u8; N];
    rng.fill_bytes(&mut out);
    out
}

fn rand_identifier(rng: &mut ChaCha20Rng) -> Identifier {
    Identifier(rand_bytes(rng))
}

fn rand_slot(rng: &mut ChaCha20Rng) -> u32 {
    rng.next_u32() % 10_000
}

fn rand_commitment_id(rng: &mut ChaCha20Rng) -> CommitmentId {
    let id = rand_identifier(rng);
    CommitmentId::from_parts(&id, rand_slot(rng))
}

fn rand_utxo_input(rng: &mut ChaCha20Rng) -> Input {
    let id = rand_identifier(rng);
    Input::Utxo(UtxoInput {
        transaction_id: TransactionId::from_parts(&id, rand_slot(rng)),
        transaction_output_index: 0,
    })
}

fn rand_ed25519_address(rng: &mut ChaCha20Rng) -> Address {
    Address::Ed25519(Ed25519Address { pub_key_hash: rand_bytes(rng) })
}

fn address_condition(address: Address) -> Vec<UnlockCondition> {
    vec![UnlockCondition::Address(AddressUnlockCondition { address })]
}

/// `count` distinct block ids, ascending.
fn rand_parents(rng: &mut ChaCha20Rng, count: usize) -> Vec<BlockId> {
    let mut parents: Vec<BlockId> = (0..count)
        .map(|_| {
            let id = rand_identifier(rng);
            BlockId::from_parts(&id, rand_slot(rng))
        })
        .collect();
    parents.sort();
    parents.dedup();
    parents
}

fn rand_allotments(rng: &mut ChaCha20Rng, count: usize) -> Vec<Allotment> {
    let mut allotments: Vec<Allotment> = (0..count)
        .map(|_| Allotment { account_id: AccountId(rand_bytes(rng)), mana: rng.next_u64() % 10_000 + 1 })
        .collect();
    allotments.sort_by_key(|a| a.account_id);
    allotments.dedup_by_key(|a| a.account_id);
    allotments
}

fn basic_output(amount: u64, address: Address) -> Output {
    Output::Basic(BasicOutput { amount, mana: 0, unlock_conditions: address_condition(address), features: vec![] })
}

/// Header issued twelve seconds after genesis, as the block fixtures use.
fn block_header(api: &Api, rng: &mut ChaCha20Rng) -> Result<BlockHeader> {
    let params = api.params();
    let issuing_time = params
        .genesis_unix_timestamp
        .checked_add(12)
        .and_then(|secs| secs.checked_mul(1_000_000_000))
        .with_context(|| format!("genesis timestamp {} overflows nanoseconds", params.genesis_unix_timestamp))?;
    Ok(BlockHeader {
        protocol_version: params.version,
        network_id: params.network_id(),
        issuing_time,
        slot_commitment_id: rand_commitment_id(rng),
        latest_finalized_slot: rand_slot(rng),
        issuer_id: AccountId(rand_bytes(rng)),
    })
}

fn print_block(api: &Api, report: &mut Report, block: &Block) -> Result<()> {
    let id = api.block_id(block)?;
    debug!(slot = id.slot(), "block assembled");
    report.vector(api, "Block", block, &id.to_hex())?;
    report.line(&format!("Block Work Score: {}\n", api.work_score(block)?));
    Ok(())
}

fn protocol_parameters(api: &Api, report: &mut Report) -> Result<()> {
    let hash = api.protocol_parameters_hash()?;
    report.vector(api, "Protocol Parameters", api.params(), &hash.to_hex())?;
    Ok(())
}

fn commitment(api: &Api, rng: &mut ChaCha20Rng, report: &mut Report) -> Result<()> {
    let commitment = Commitment {
        protocol_version: api.params().version,
        slot: 18,
        previous_commitment_id: rand_commitment_id(rng),
        roots_id: rand_identifier(rng),
        cumulative_weight: 89,
        reference_mana_cost: 144,
    };
    let id = api.commitment_id(&commitment)?;
    report.vector(api, "Slot Commitment", &commitment, &id.to_hex())?;
    Ok(())
}

/// Two inputs unlocked by one key, a basic and an account output, every
/// context input type, two allotments and the burn-native-tokens capability.
pub fn signed_transaction_fixture(api: &Api, rng: &mut ChaCha20Rng) -> Result<SignedTransaction> {
    let key = SigningKey::generate(rng);
    let address = Address::ed25519_from_public_key(&key.verifying_key().to_bytes());

    let token = NativeTokenFeature {
        id: TokenId(rand_bytes(rng)),
        amount: U256::from(rng.next_u64() % 1_000_000 + 1),
    };
    let basic = Output::Basic(BasicOutput {
        amount: 100_000,
        mana: 0,
        unlock_conditions: address_condition(address.clone()),
        features: vec![Feature::NativeToken(token)],
    });
    let account = Output::Account(AccountOutput {
        amount: 100_000,
        mana: 5000,
        account_id: AccountId([0; 32]),
        foundry_counter: 0,
        unlock_conditions: address_condition(address),
        features: vec![Feature::Metadata(MetadataFeature { data: b"hello world".to_vec() })],
        immutable_features: vec![],
    });

    let commitment_input = CommitmentInput { commitment_id: CommitmentId::from_parts(&rand_identifier(rng), 85) };
    let tx = Transaction {
        network_id: api.params().network_id(),
        creation_slot: 1 << 20,
        context_inputs: vec![
            ContextInput::Commitment(commitment_input),
            ContextInput::BlockIssuanceCredit(BlockIssuanceCreditInput { account_id: AccountId(rand_bytes(rng)) }),
            ContextInput::Reward(RewardInput { index: 0 }),
        ],
        inputs: vec![rand_utxo_input(rng), rand_utxo_input(rng)],
        allotments: rand_allotments(rng, 2),
        capabilities: TransactionCapabilities::none().with(TransactionCapabilityFlag::BurnNativeTokens),
        payload: None,
        outputs: vec![basic, account],
    };
    Ok(SignedTransaction::sign(tx, &[key.clone(), key])?)
}

fn transaction(api: &Api, rng: &mut ChaCha20Rng, report: &mut Report) -> Result<()> {
    let signed = signed_transaction_fixture(api, rng)?;
    api.validate(&signed).context("transaction fixture is invalid")?;
    let id = api.transaction_id(&signed.transaction)?;
    report.vector(api, "Transaction", &signed, &id.to_hex())?;
    for (i, output) in signed.transaction.outputs.iter().enumerate() {
        report.line(&format!(
            "Output {i}: storage score {}, minimum deposit {}",
            api.storage_score(output)?,
            api.min_deposit(output)?
        ));
    }
    report.line("");
    Ok(())
}

/// Random transaction with two inputs, two outputs and one allotment.
fn small_signed_transaction(api: &Api, rng: &mut ChaCha20Rng) -> Result<SignedTransaction> {
    let keys = [SigningKey::generate(rng), SigningKey::generate(rng)];
    let tx = Transaction {
        network_id: api.params().network_id(),
        creation_slot: rand_slot(rng),
        context_inputs: vec![],
        inputs: vec![rand_utxo_input(rng), rand_utxo_input(rng)],
        allotments: rand_allotments(rng, 1),
        capabilities: TransactionCapabilities::none(),
        payload: None,
        outputs: vec![
            basic_output(rng.next_u64() % 1_000_000_000 + 1, rand_ed25519_address(rng)),
            basic_output(rng.next_u64() % 1_000_000_000 + 1, rand_ed25519_address(rng)),
        ],
    };
    Ok(SignedTransaction::sign(tx, &keys)?)
}

fn transaction_block(api: &Api, rng: &mut ChaCha20Rng, report: &mut Report) -> Result<()> {
    let payload = Payload::from(small_signed_transaction(api, rng)?);
    let header = block_header(api, rng)?;
    let body = BlockBody::Basic(BasicBlockBody {
        strong_parents: rand_parents(rng, 3),
        weak_parents: vec![],
        shallow_like_parents: rand_parents(rng, 1),
        payload: Some(payload),
        max_burned_mana: rng.next_u64() % 1000,
    });
    let block = Block::sign(header, body, &SigningKey::generate(rng))?;
    print_block(api, report, &block)
}

fn tagged_data_block(api: &Api, rng: &mut ChaCha20Rng, report: &mut Report) -> Result<()> {
    let mut tag = vec![0u8; (rng.next_u32() % 64) as usize];
    rng.fill_bytes(&mut tag);
    let mut data = vec![0u8; (rng.next_u32() % 256) as usize];
    rng.fill_bytes(&mut data);

    let header = block_header(api, rng)?;
    let body = BlockBody::Basic(BasicBlockBody {
        strong_parents: rand_parents(rng, 2),
        weak_parents: rand_parents(rng, 1),
        shallow_like_parents: vec![],
        payload: Some(Payload::TaggedData(TaggedDataPayload { tag, data })),
        max_burned_mana: rng.next_u64() % 1000,
    });
    let block = Block::sign(header, body, &SigningKey::generate(rng))?;
    print_block(api, report, &block)
}

fn validation_block(api: &Api, rng: &mut ChaCha20Rng, report: &mut Report) -> Result<()> {
    let header = block_header(api, rng)?;
    let body = BlockBody::Validation(ValidationBlockBody {
        strong_parents: rand_parents(rng, 4),
        weak_parents: vec![],
        shallow_like_parents: vec![],
        highest_supported_version: api.params().version,
        protocol_parameters_hash: api.protocol_parameters_hash()?,
    });
    let block = Block::sign(header, body, &SigningKey::generate(rng))?;
    print_block(api, report, &block)
}

/// Fixed five-member multi address, threshold 2.
#[must_use]
pub fn multi_address_fixture() -> MultiAddress {
    const TAIL: [u8; 31] = [
        0xfd, 0xfc, 0x07, 0x21, 0x82, 0x65, 0x4f, 0x16, 0x3f, 0x5f, 0x0f, 0x9a, 0x62, 0x1d, 0x72, 0x95, 0x66, 0xc7,
        0x4d, 0x10, 0x03, 0x7c, 0x4d, 0x7b, 0xbb, 0x04, 0x07, 0xd1, 0xe2, 0xc6, 0x49,
    ];
    let bytes = |first: u8| {
        let mut b = [0u8; 32];
        b[0] = first;
        b[1..].copy_from_slice(&TAIL);
        b
    };
    let weighted = |address, weight| WeightedAddress { address, weight };
    MultiAddress {
        addresses: vec![
            weighted(Address::Ed25519(Ed25519Address { pub_key_hash: bytes(0x52) }), 1),
            weighted(Address::Ed25519(Ed25519Address { pub_key_hash: bytes(0x53) }), 1),
            weighted(Address::Ed25519(Ed25519Address { pub_key_hash: bytes(0x54) }), 1),
            weighted(Address::Account(AccountAddress { account_id: AccountId(bytes(0x55)) }), 2),
            weighted(Address::Nft(NftAddress { nft_id: NftId(bytes(0x56)) }), 3),
        ],
        threshold: 2,
    }
}

fn multi_address(api: &Api, report: &mut Report) -> Result<()> {
    let multi = multi_address_fixture();
    let reference = multi.reference()?;
    let bech32 = address_text::multi_reference(&api.params().bech32_hrp, &multi)?;
    let address = Address::Multi(multi);
    api.validate(&address)?;
    report.json(api, "Multi Address", &address)?;
    report.binary(api, "Multi Address", &address)?;
    report.line(&format!("Multi Address Reference:\n\n```\n{}\n```\n", reference.to_hex()));
    report.line(&format!("Multi Address Reference (bech32):\n\n```\n{bech32}\n```\n"));
    Ok(())
}

fn proof_transaction(api: &Api, rng: &mut ChaCha20Rng, input: &Input, outputs: usize) -> Transaction {
    Transaction {
        network_id: api.params().network_id(),
        creation_slot: rand_slot(rng),
        context_inputs: vec![],
        inputs: vec![input.clone()],
        allotments: vec![],
        capabilities: TransactionCapabilities::none(),
        payload: None,
        outputs: (0..outputs).map(|_| basic_output(1_000_000, rand_ed25519_address(rng))).collect(),
    }
}

fn output_id_proofs(api: &Api, rng: &mut ChaCha20Rng, report: &mut Report) -> Result<()> {
    let input = rand_utxo_input(rng);
    let cases: [(&str, &str, usize, &[u16]); 3] = [
        ("SINGLE OUTPUT", "Transaction (1 Output)", 1, &[0]),
        ("5 OUTPUTS", "Transaction (5 Outputs)", 5, &[2]),
        ("32 OUTPUTS", "Transaction (32 Outputs)", 32, &[0, 28]),
    ];
    for (title, tx_name, outputs, indices) in cases {
        let tx = proof_transaction(api, rng, &input, outputs);
        report.heading(title);
        report.binary(api, tx_name, &tx)?;
        for &index in indices {
            let proof = api.build_output_id_proof(&tx, index)?;
            let output = &tx.outputs[usize::from(index)];
            if proof.output_id(output)? != tx.output_id(index)? {
                bail!("proof for output {index} does not reproduce its id");
            }
            let name = format!("Output ID Proof (Output Index {index})");
            report.json(api, &name, &proof)?;
            report.binary(api, &name, &proof)?;
        }
    }
    Ok(())
}

fn restricted_addresses(api: &Api, rng: &mut ChaCha20Rng, report: &mut Report) -> Result<()> {
    let public_key: [u8; 32] = hex::decode("6f1581709bb7b1ef030d210db18e3b0ba1c776fba65d8cdaad05415142d189f8")?
        .try_into()
        .map_err(|_| anyhow::anyhow!("fixture key is not 32 bytes"))?;
    let named = [
        ("Ed25519 Address", Address::ed25519_from_public_key(&public_key)),
        ("Account Address", Address::Account(AccountAddress { account_id: AccountId(rand_bytes(rng)) })),
        ("NFT Address", Address::Nft(NftAddress { nft_id: NftId(rand_bytes(rng)) })),
    ];
    let capabilities = [
        ("Every Capability Disallowed", AddressCapabilities::none()),
        ("Every Capability Allowed", AddressCapabilities::all()),
        ("Can receive Native Tokens", AddressCapabilities::none().with(AddressCapabilityFlag::NativeTokens)),
    ];
    for (name, address) in named {
        print_address(api, report, name, "Plain", &address)?;
        for (info, caps) in &capabilities {
            let restricted = Address::Restricted(RestrictedAddress {
                address: Box::new(address.clone()),
                capabilities: caps.clone(),
            });
            print_address(api, report, &format!("Restricted {name}"), info, &restricted)?;
        }
    }
    Ok(())
}

fn print_address(api: &Api, report: &mut Report, name: &str, info: &str, address: &Address) -> Result<()> {
    api.validate(address)?;
    let bytes = api.encode(address)?;
    report.line(&format!("- **{name} ({info})**"));
    report.line(&format!(
        "  - Hex-encoded binary serialization ({} bytes): `0x{}`",
        bytes.len(),
        hex::encode(&bytes)
    ));
    let bech32 = address_text::address(api, &api.params().bech32_hrp, address)?;
    report.line(&format!("  - Bech32 string: `{bech32}`"));
    Ok(())
}
