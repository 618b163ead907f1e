//! Rejection paths: each malformed or invalid input must fail with the
//! expected error kind.

use ed25519_dalek::SigningKey;
use nova_codec::{
    address::{AccountAddress, Address, Ed25519Address, MultiAddress, WeightedAddress},
    capabilities::TransactionCapabilities,
    feature::{Feature, MetadataFeature, SenderFeature, TagFeature},
    input::{Input, UtxoInput},
    output::{BasicOutput, DelegationOutput},
    payload::TaggedDataPayload,
    transaction::SignedTransaction,
    unlock::{ReferenceUnlock, Unlock},
    unlock_condition::{AddressUnlockCondition, ImmutableAccountAddressUnlockCondition, UnlockCondition},
    AccountId, Api, CodecError, DelegationId, Identifier, Output, Payload, Transaction, TransactionId,
};

fn ed(b: u8) -> Address {
    Address::ed25519_from_public_key(&[b; 32])
}

fn basic(amount: u64, features: Vec<Feature>) -> Output {
    Output::Basic(BasicOutput {
        amount,
        mana: 0,
        unlock_conditions: vec![UnlockCondition::Address(AddressUnlockCondition { address: ed(1) })],
        features,
    })
}

fn utxo(b: u8, index: u16) -> Input {
    Input::Utxo(UtxoInput {
        transaction_id: TransactionId::from_parts(&Identifier([b; 32]), 1),
        transaction_output_index: index,
    })
}

fn tx(inputs: Vec<Input>, outputs: Vec<Output>) -> Transaction {
    Transaction {
        network_id: Api::default().params().network_id(),
        creation_slot: 3,
        context_inputs: vec![],
        inputs,
        allotments: vec![],
        capabilities: TransactionCapabilities::none(),
        payload: None,
        outputs,
    }
}

#[test]
fn truncated_input_is_reported() {
    let api = Api::default();
    let bytes = api.encode(&basic(10, vec![])).unwrap();
    let err = api.decode::<Output>(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, CodecError::TruncatedInput { .. }));
    assert!(matches!(api.decode::<Output>(&[]), Err(CodecError::TruncatedInput { needed: 1, remaining: 0 })));
}

#[test]
fn trailing_bytes_are_rejected_by_strict_decode() {
    let api = Api::default();
    let mut bytes = api.encode(&basic(10, vec![])).unwrap();
    let len = bytes.len();
    bytes.push(0);
    assert_eq!(api.decode::<Output>(&bytes), Err(CodecError::TrailingData(1)));
    let (value, used) = api.decode_prefix::<Output>(&bytes).unwrap();
    assert_eq!(used, len);
    assert_eq!(value, basic(10, vec![]));
}

#[test]
fn unknown_discriminants_are_malformed() {
    let api = Api::default();
    assert!(matches!(api.decode::<Output>(&[9]), Err(CodecError::MalformedEncoding { .. })));
    assert!(matches!(api.decode::<Address>(&[7]), Err(CodecError::MalformedEncoding { .. })));
    assert!(matches!(api.decode::<Payload>(&[3]), Err(CodecError::MalformedEncoding { .. })));
}

#[test]
fn length_prefix_out_of_bounds_is_malformed() {
    let api = Api::default();
    // tagged data with a 65-byte tag
    let mut bytes = vec![0u8, 65];
    bytes.extend_from_slice(&[1; 65]);
    bytes.extend_from_slice(&0u32.to_le_bytes());
    assert!(matches!(api.decode::<Payload>(&bytes), Err(CodecError::MalformedEncoding { .. })));

    let too_long = Payload::TaggedData(TaggedDataPayload { tag: vec![1; 65], data: vec![] });
    assert!(matches!(api.encode(&too_long), Err(CodecError::SchemaViolation { .. })));
}

#[test]
fn features_must_be_sorted_and_unique() {
    let api = Api::default();
    let unsorted = basic(
        10,
        vec![
            Feature::Tag(TagFeature { tag: vec![1] }),
            Feature::Sender(SenderFeature { address: ed(2) }),
        ],
    );
    assert!(api.encode(&unsorted).is_ok());
    assert!(matches!(api.validate(&unsorted), Err(CodecError::SchemaViolation { .. })));

    let duplicated = basic(
        10,
        vec![
            Feature::Metadata(MetadataFeature { data: vec![1] }),
            Feature::Metadata(MetadataFeature { data: vec![2] }),
        ],
    );
    assert!(matches!(api.validate(&duplicated), Err(CodecError::SchemaViolation { .. })));
}

#[test]
fn disallowed_union_member_is_rejected() {
    let api = Api::default();
    // foundries only: an immutable account condition on a basic output
    let out = Output::Basic(BasicOutput {
        amount: 1,
        mana: 0,
        unlock_conditions: vec![
            UnlockCondition::Address(AddressUnlockCondition { address: ed(1) }),
            UnlockCondition::ImmutableAccountAddress(ImmutableAccountAddressUnlockCondition {
                address: Address::Account(AccountAddress { account_id: AccountId([1; 32]) }),
            }),
        ],
        features: vec![],
    });
    assert!(matches!(api.encode(&out), Err(CodecError::SchemaViolation { .. })));
}

#[test]
fn delegation_validator_must_be_an_account() {
    let api = Api::default();
    let out = Output::Delegation(DelegationOutput {
        amount: 1,
        delegated_amount: 1,
        delegation_id: DelegationId([0; 32]),
        validator_address: ed(4),
        start_epoch: 1,
        end_epoch: 0,
        unlock_conditions: vec![UnlockCondition::Address(AddressUnlockCondition { address: ed(1) })],
    });
    assert!(matches!(api.encode(&out), Err(CodecError::SchemaViolation { .. })));
}

#[test]
fn multi_address_threshold_bounds() {
    let api = Api::default();
    let raw = |b: u8| Address::Ed25519(Ed25519Address { pub_key_hash: [b; 32] });
    let multi = |threshold| {
        Address::Multi(MultiAddress {
            addresses: vec![
                WeightedAddress { address: raw(1), weight: 1 },
                WeightedAddress { address: raw(2), weight: 2 },
            ],
            threshold,
        })
    };
    assert!(api.validate(&multi(3)).is_ok());
    assert!(matches!(api.validate(&multi(4)), Err(CodecError::SchemaViolation { .. })));
    assert!(matches!(api.validate(&multi(0)), Err(CodecError::SchemaViolation { .. })));
}

#[test]
fn transaction_rules() {
    let api = Api::default();
    let dup = tx(vec![utxo(1, 0), utxo(1, 0)], vec![basic(5, vec![])]);
    assert!(matches!(api.validate(&dup), Err(CodecError::SchemaViolation { .. })));

    let mut foreign = tx(vec![utxo(1, 0)], vec![basic(5, vec![])]);
    foreign.network_id ^= 1;
    assert!(matches!(api.validate(&foreign), Err(CodecError::SchemaViolation { .. })));

    let supply = api.params().token_supply;
    let inflated = tx(vec![utxo(1, 0)], vec![basic(supply, vec![]), basic(1, vec![])]);
    assert!(matches!(api.validate(&inflated), Err(CodecError::SchemaViolation { .. })));

    let fine = tx(vec![utxo(1, 0), utxo(1, 1)], vec![basic(5, vec![])]);
    assert!(api.validate(&fine).is_ok());
}

#[test]
fn signatures_and_unlocks() {
    let api = Api::default();
    let key = SigningKey::from_bytes(&[7; 32]);
    let t = tx(vec![utxo(1, 0), utxo(2, 0)], vec![basic(5, vec![])]);
    let signed = SignedTransaction::sign(t.clone(), &[key.clone(), key.clone()]).unwrap();
    assert!(matches!(signed.unlocks[1], Unlock::Reference(ReferenceUnlock { reference: 0 })));
    assert!(signed.verify_signatures().is_ok());
    assert!(api.validate(&signed).is_ok());

    let mut tampered = signed.clone();
    tampered.transaction.creation_slot += 1;
    assert_eq!(tampered.verify_signatures(), Err(CodecError::InvalidSignature));

    let mut forward = signed.clone();
    forward.unlocks.swap(0, 1);
    assert!(matches!(api.validate(&forward), Err(CodecError::SchemaViolation { .. })));

    let mut short = signed;
    short.unlocks.pop();
    assert!(matches!(api.validate(&short), Err(CodecError::SchemaViolation { .. })));

    assert!(matches!(SignedTransaction::sign(t, &[key]), Err(CodecError::SchemaViolation { .. })));
}

#[test]
fn output_index_out_of_range() {
    let api = Api::default();
    let t = tx(vec![utxo(1, 0)], vec![basic(5, vec![])]);
    assert_eq!(t.output_id(1), Err(CodecError::IndexOutOfRange { index: 1, len: 1 }));
    assert_eq!(
        api.build_output_id_proof(&t, 3).unwrap_err(),
        CodecError::IndexOutOfRange { index: 3, len: 1 }
    );
}

#[test]
fn json_errors_are_classified() {
    let api = Api::default();
    assert!(matches!(api.json_decode::<Output>("{"), Err(CodecError::MalformedEncoding { .. })));
    assert!(matches!(api.json_decode::<Output>(r#"{"type":0}"#), Err(CodecError::SchemaViolation { .. })));
    assert!(matches!(
        api.json_decode::<Output>(r#"{"type":0,"amount":10,"mana":"0","unlockConditions":[]}"#),
        Err(CodecError::SchemaViolation { .. })
    ));
    assert!(matches!(
        api.json_decode::<Identifier>("\"0x1234\""),
        Err(CodecError::SchemaViolation { .. })
    ));
}

#[test]
fn proof_decode_rejects_deep_nesting() {
    let api = Api::default();
    let bytes = vec![0u8; 64];
    assert!(matches!(
        api.decode::<nova_codec::MerkleProof>(&bytes),
        Err(CodecError::MalformedEncoding { .. })
    ));
}
