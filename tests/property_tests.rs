//! Property-based tests for the codec

use std::fmt::Debug;

use nova_codec::{
    address::{AccountAddress, Address, AnchorAddress, Ed25519Address, NftAddress},
    block::{BasicBlockBody, ValidationBlockBody},
    capabilities::{TransactionCapabilities, TransactionCapabilityFlag},
    feature::{
        BlockIssuerFeature, BlockIssuerKey, Ed25519PublicKeyBlockIssuerKey, Feature, IssuerFeature, MetadataFeature,
        SenderFeature, StakingFeature, TagFeature,
    },
    input::{Allotment, CommitmentInput, ContextInput, Input, UtxoInput},
    merkle,
    output::{
        AccountOutput, AnchorOutput, BasicOutput, DelegationOutput, FoundryOutput, NftOutput, SimpleTokenScheme,
        TokenScheme,
    },
    payload::{CandidacyAnnouncementPayload, TaggedDataPayload},
    signature::{Ed25519Signature, Signature},
    unlock::{
        AccountUnlock, AnchorUnlock, EmptyUnlock, MultiUnlock, NftUnlock, ReferenceUnlock, SignatureUnlock, Unlock,
    },
    unlock_condition::{
        AddressUnlockCondition, ExpirationUnlockCondition, GovernorAddressUnlockCondition,
        ImmutableAccountAddressUnlockCondition, StateControllerAddressUnlockCondition, TimelockUnlockCondition,
        UnlockCondition,
    },
    AccountId, AnchorId, Api, Block, BlockBody, BlockHeader, BlockId, CodecError, Commitment, CommitmentId,
    DelegationId, Identifier, MerkleProof, NftId, Output, OutputIdProof, Packable, Payload, ProtocolParameters,
    SignedTransaction, Transaction, TransactionId,
};
use nova_primitives::merkle_root;
use proptest::{prelude::*, test_runner::TestCaseError};
use serde::{de::DeserializeOwned, Serialize};

fn commitment_strategy() -> impl Strategy<Value = Commitment> {
    (
        any::<u32>(),
        prop::array::uniform32(any::<u8>()),
        any::<u32>(),
        prop::array::uniform32(any::<u8>()),
        any::<u64>(),
        any::<u64>(),
    )
        .prop_map(|(slot, prev, prev_slot, roots, weight, rmc)| Commitment {
            protocol_version: 3,
            slot,
            previous_commitment_id: CommitmentId::from_parts(&Identifier(prev), prev_slot),
            roots_id: Identifier(roots),
            cumulative_weight: weight,
            reference_mana_cost: rmc,
        })
}

fn basic_output_strategy() -> impl Strategy<Value = Output> {
    (
        any::<u64>(),
        any::<u64>(),
        prop::array::uniform32(any::<u8>()),
        prop::option::of(any::<u32>()),
        prop::option::of(prop::collection::vec(any::<u8>(), 1..64)),
        prop::option::of(prop::collection::vec(any::<u8>(), 1..32)),
    )
        .prop_map(|(amount, mana, key_hash, timelock, metadata, tag)| {
            let mut unlock_conditions = vec![UnlockCondition::Address(AddressUnlockCondition {
                address: Address::Ed25519(Ed25519Address { pub_key_hash: key_hash }),
            })];
            if let Some(slot) = timelock {
                unlock_conditions.push(UnlockCondition::Timelock(TimelockUnlockCondition { slot }));
            }
            let mut features = Vec::new();
            if let Some(data) = metadata {
                features.push(Feature::Metadata(MetadataFeature { data }));
            }
            if let Some(tag) = tag {
                features.push(Feature::Tag(TagFeature { tag }));
            }
            Output::Basic(BasicOutput { amount, mana, unlock_conditions, features })
        })
}

fn payload_strategy() -> impl Strategy<Value = Payload> {
    (prop::collection::vec(any::<u8>(), 0..=64), prop::collection::vec(any::<u8>(), 0..512))
        .prop_map(|(tag, data)| Payload::TaggedData(TaggedDataPayload { tag, data }))
}

proptest! {
    #[test]
    fn commitment_binary_round_trip(c in commitment_strategy()) {
        let api = Api::default();
        let bytes = api.encode(&c).unwrap();
        prop_assert_eq!(bytes.len(), 93);
        prop_assert_eq!(api.decode::<Commitment>(&bytes).unwrap(), c);
    }

    #[test]
    fn output_binary_and_json_round_trip(out in basic_output_strategy()) {
        let api = Api::default();
        let bytes = api.encode(&out).unwrap();
        prop_assert_eq!(&api.decode::<Output>(&bytes).unwrap(), &out);

        let text = api.json_encode(&out).unwrap();
        prop_assert_eq!(api.json_decode::<Output>(&text).unwrap(), out);
    }

    #[test]
    fn dropping_the_last_byte_truncates(out in basic_output_strategy()) {
        let api = Api::default();
        let bytes = api.encode(&out).unwrap();
        let err = api.decode::<Output>(&bytes[..bytes.len() - 1]).unwrap_err();
        prop_assert!(matches!(err, CodecError::TruncatedInput { .. }), "got {err:?}");
    }

    #[test]
    fn appended_byte_is_trailing_data(p in payload_strategy(), extra in any::<u8>()) {
        let api = Api::default();
        let mut bytes = api.encode(&p).unwrap();
        bytes.push(extra);
        prop_assert_eq!(api.decode::<Payload>(&bytes), Err(CodecError::TrailingData(1)));
    }

    #[test]
    fn identifiers_are_deterministic(c in commitment_strategy()) {
        let api = Api::default();
        let a = api.commitment_id(&c).unwrap();
        let b = api.commitment_id(&c).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(a.slot(), c.slot);
    }

    #[test]
    fn merkle_proofs_verify(
        leaves in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 1..40),
        pick in any::<prop::sample::Index>(),
    ) {
        let index = pick.index(leaves.len());
        let root = merkle_root(&leaves);
        let proof = MerkleProof::build(&leaves, index).unwrap();
        prop_assert!(merkle::verify(&proof, &leaves[index], &root));

        let api = Api::default();
        let bytes = api.encode(&proof).unwrap();
        let decoded: MerkleProof = api.decode(&bytes).unwrap();
        prop_assert_eq!(decoded.hash(), root);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let api = Api::default();
        let _ = api.decode::<Output>(&bytes);
        let _ = api.decode::<Payload>(&bytes);
        let _ = api.decode::<MerkleProof>(&bytes);
        let _ = api.decode::<nova_codec::Block>(&bytes);
    }
}

/// Binary and JSON round trips, cross-format equivalence, truncation and
/// trailing-data behaviour for one value.
fn check_codec<T>(value: &T) -> Result<(), TestCaseError>
where
    T: Packable + Serialize + DeserializeOwned + PartialEq + Debug,
{
    let api = Api::default();
    let bytes = api.encode(value).unwrap();
    prop_assert_eq!(&api.decode::<T>(&bytes).unwrap(), value);

    let text = api.json_encode(value).unwrap();
    let from_json: T = api.json_decode(&text).unwrap();
    prop_assert_eq!(&from_json, value);
    prop_assert_eq!(api.encode(&from_json).unwrap(), bytes.clone());

    let err = api.decode::<T>(&bytes[..bytes.len() - 1]).unwrap_err();
    prop_assert!(matches!(err, CodecError::TruncatedInput { .. }), "got {err:?}");

    let mut longer = bytes;
    longer.push(0);
    prop_assert_eq!(api.decode::<T>(&longer), Err(CodecError::TrailingData(1)));
    Ok(())
}

fn id32() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

fn block_id() -> impl Strategy<Value = BlockId> {
    (id32(), any::<u32>()).prop_map(|(id, slot)| BlockId::from_parts(&Identifier(id), slot))
}

fn simple_address() -> impl Strategy<Value = Address> {
    prop_oneof![
        id32().prop_map(|h| Address::Ed25519(Ed25519Address { pub_key_hash: h })),
        id32().prop_map(|a| Address::Account(AccountAddress { account_id: AccountId(a) })),
        id32().prop_map(|n| Address::Nft(NftAddress { nft_id: NftId(n) })),
        id32().prop_map(|a| Address::Anchor(AnchorAddress { anchor_id: AnchorId(a) })),
    ]
}

fn account_address() -> impl Strategy<Value = Address> {
    id32().prop_map(|a| Address::Account(AccountAddress { account_id: AccountId(a) }))
}

fn metadata() -> impl Strategy<Value = Option<Feature>> {
    prop::option::of(
        prop::collection::vec(any::<u8>(), 1..48).prop_map(|data| Feature::Metadata(MetadataFeature { data })),
    )
}

fn issuer() -> impl Strategy<Value = Option<Feature>> {
    prop::option::of(simple_address().prop_map(|address| Feature::Issuer(IssuerFeature { address })))
}

fn account_output() -> impl Strategy<Value = Output> {
    (
        (any::<u64>(), any::<u64>(), id32(), any::<u32>()),
        simple_address(),
        prop::option::of(simple_address()),
        metadata(),
        prop::option::of((any::<u32>(), prop::collection::vec(id32(), 1..4))),
        prop::option::of((any::<u64>(), any::<u64>(), any::<u32>(), any::<u32>())),
        issuer(),
    )
        .prop_map(|((amount, mana, id, foundry_counter), owner, sender, meta, issuer_keys, staking, issuer)| {
            let mut features = Vec::new();
            features.extend(sender.map(|address| Feature::Sender(SenderFeature { address })));
            features.extend(meta);
            features.extend(issuer_keys.map(|(expiry_slot, keys)| {
                Feature::BlockIssuer(BlockIssuerFeature {
                    expiry_slot,
                    block_issuer_keys: keys
                        .into_iter()
                        .map(|public_key| {
                            BlockIssuerKey::Ed25519PublicKey(Ed25519PublicKeyBlockIssuerKey { public_key })
                        })
                        .collect(),
                })
            }));
            features.extend(staking.map(|(staked_amount, fixed_cost, start_epoch, end_epoch)| {
                Feature::Staking(StakingFeature { staked_amount, fixed_cost, start_epoch, end_epoch })
            }));
            Output::Account(AccountOutput {
                amount,
                mana,
                account_id: AccountId(id),
                foundry_counter,
                unlock_conditions: vec![UnlockCondition::Address(AddressUnlockCondition { address: owner })],
                features,
                immutable_features: issuer.into_iter().collect(),
            })
        })
}

fn anchor_output() -> impl Strategy<Value = Output> {
    (
        (any::<u64>(), any::<u64>(), id32(), any::<u32>()),
        prop::collection::vec(any::<u8>(), 0..64),
        simple_address(),
        simple_address(),
        metadata(),
        issuer(),
    )
        .prop_map(|((amount, mana, id, state_index), state_metadata, controller, governor, meta, issuer)| {
            Output::Anchor(AnchorOutput {
                amount,
                mana,
                anchor_id: AnchorId(id),
                state_index,
                state_metadata,
                unlock_conditions: vec![
                    UnlockCondition::StateControllerAddress(StateControllerAddressUnlockCondition {
                        address: controller,
                    }),
                    UnlockCondition::GovernorAddress(GovernorAddressUnlockCondition { address: governor }),
                ],
                features: meta.into_iter().collect(),
                immutable_features: issuer.into_iter().collect(),
            })
        })
}

fn foundry_output() -> impl Strategy<Value = Output> {
    (any::<u64>(), any::<u32>(), any::<u64>(), any::<u64>(), any::<u64>(), account_address(), metadata())
        .prop_map(|(amount, serial_number, minted, melted, max, owner, meta)| {
            Output::Foundry(FoundryOutput {
                amount,
                serial_number,
                token_scheme: TokenScheme::Simple(SimpleTokenScheme {
                    minted_tokens: minted.into(),
                    melted_tokens: melted.into(),
                    maximum_supply: max.into(),
                }),
                unlock_conditions: vec![UnlockCondition::ImmutableAccountAddress(
                    ImmutableAccountAddressUnlockCondition { address: owner },
                )],
                features: vec![],
                immutable_features: meta.into_iter().collect(),
            })
        })
}

fn nft_output() -> impl Strategy<Value = Output> {
    (
        (any::<u64>(), any::<u64>(), id32()),
        simple_address(),
        prop::option::of(any::<u32>()),
        prop::option::of((simple_address(), any::<u32>())),
        prop::option::of(prop::collection::vec(any::<u8>(), 1..16)),
        issuer(),
    )
        .prop_map(|((amount, mana, id), owner, timelock, expiration, tag, issuer)| {
            let mut unlock_conditions = vec![UnlockCondition::Address(AddressUnlockCondition { address: owner })];
            unlock_conditions.extend(timelock.map(|slot| UnlockCondition::Timelock(TimelockUnlockCondition { slot })));
            unlock_conditions.extend(expiration.map(|(return_address, slot)| {
                UnlockCondition::Expiration(ExpirationUnlockCondition { return_address, slot })
            }));
            Output::Nft(NftOutput {
                amount,
                mana,
                nft_id: NftId(id),
                unlock_conditions,
                features: tag.map(|tag| Feature::Tag(TagFeature { tag })).into_iter().collect(),
                immutable_features: issuer.into_iter().collect(),
            })
        })
}

fn delegation_output() -> impl Strategy<Value = Output> {
    ((any::<u64>(), any::<u64>(), id32()), account_address(), any::<u32>(), any::<u32>(), simple_address()).prop_map(
        |((amount, delegated_amount, id), validator_address, start_epoch, end_epoch, owner)| {
            Output::Delegation(DelegationOutput {
                amount,
                delegated_amount,
                delegation_id: DelegationId(id),
                validator_address,
                start_epoch,
                end_epoch,
                unlock_conditions: vec![UnlockCondition::Address(AddressUnlockCondition { address: owner })],
            })
        },
    )
}

fn any_output() -> impl Strategy<Value = Output> {
    prop_oneof![
        basic_output_strategy(),
        account_output(),
        anchor_output(),
        foundry_output(),
        nft_output(),
        delegation_output(),
    ]
}

fn leaf_unlock() -> impl Strategy<Value = Unlock> {
    prop_oneof![
        (id32(), prop::collection::vec(any::<u8>(), 64)).prop_map(|(public_key, sig)| {
            let mut signature = [0u8; 64];
            signature.copy_from_slice(&sig);
            let signature = Signature::Ed25519(Ed25519Signature { public_key, signature });
            Unlock::Signature(SignatureUnlock { signature })
        }),
        any::<u16>().prop_map(|reference| Unlock::Reference(ReferenceUnlock { reference })),
        any::<u16>().prop_map(|reference| Unlock::Account(AccountUnlock { reference })),
        any::<u16>().prop_map(|reference| Unlock::Anchor(AnchorUnlock { reference })),
        any::<u16>().prop_map(|reference| Unlock::Nft(NftUnlock { reference })),
        Just(Unlock::Empty(EmptyUnlock {})),
    ]
}

fn unlock() -> impl Strategy<Value = Unlock> {
    prop_oneof![
        3 => leaf_unlock(),
        1 => prop::collection::vec(leaf_unlock(), 1..=10).prop_map(|unlocks| Unlock::Multi(MultiUnlock { unlocks })),
    ]
}

fn utxo_input() -> impl Strategy<Value = Input> {
    (id32(), any::<u32>(), any::<u16>()).prop_map(|(id, slot, index)| {
        Input::Utxo(UtxoInput {
            transaction_id: TransactionId::from_parts(&Identifier(id), slot),
            transaction_output_index: index,
        })
    })
}

fn signed_transaction() -> impl Strategy<Value = SignedTransaction> {
    (
        (any::<u64>(), any::<u32>()),
        prop::option::of((id32(), any::<u32>())),
        prop::collection::vec(utxo_input(), 1..4),
        prop::collection::vec((id32(), any::<u64>()), 0..3),
        any::<bool>(),
        prop::option::of(payload_strategy()),
        prop::collection::vec(any_output(), 1..4),
        prop::collection::vec(unlock(), 1..4),
    )
        .prop_map(|((network_id, creation_slot), commitment, inputs, allotments, burn, payload, outputs, unlocks)| {
            let capabilities = if burn {
                TransactionCapabilities::none().with(TransactionCapabilityFlag::BurnNativeTokens)
            } else {
                TransactionCapabilities::none()
            };
            SignedTransaction {
                transaction: Transaction {
                    network_id,
                    creation_slot,
                    context_inputs: commitment
                        .map(|(id, slot)| {
                            ContextInput::Commitment(CommitmentInput {
                                commitment_id: CommitmentId::from_parts(&Identifier(id), slot),
                            })
                        })
                        .into_iter()
                        .collect(),
                    inputs,
                    allotments: allotments
                        .into_iter()
                        .map(|(id, mana)| Allotment { account_id: AccountId(id), mana })
                        .collect(),
                    capabilities,
                    payload,
                    outputs,
                },
                unlocks,
            }
        })
}

fn block_header() -> impl Strategy<Value = BlockHeader> {
    (any::<u8>(), any::<u64>(), any::<u64>(), (id32(), any::<u32>()), any::<u32>(), id32()).prop_map(
        |(protocol_version, network_id, issuing_time, (commitment, slot), latest_finalized_slot, issuer)| BlockHeader {
            protocol_version,
            network_id,
            issuing_time,
            slot_commitment_id: CommitmentId::from_parts(&Identifier(commitment), slot),
            latest_finalized_slot,
            issuer_id: AccountId(issuer),
        },
    )
}

fn block_body() -> impl Strategy<Value = BlockBody> {
    let payload = prop_oneof![
        payload_strategy(),
        signed_transaction().prop_map(Payload::from),
        Just(Payload::CandidacyAnnouncement(CandidacyAnnouncementPayload {})),
    ];
    prop_oneof![
        (
            prop::collection::vec(block_id(), 1..=8),
            prop::collection::vec(block_id(), 0..=2),
            prop::collection::vec(block_id(), 0..=2),
            prop::option::of(payload),
            any::<u64>(),
        )
            .prop_map(|(strong_parents, weak_parents, shallow_like_parents, payload, max_burned_mana)| {
                BlockBody::Basic(BasicBlockBody {
                    strong_parents,
                    weak_parents,
                    shallow_like_parents,
                    payload,
                    max_burned_mana,
                })
            }),
        (
            prop::collection::vec(block_id(), 1..=12),
            prop::collection::vec(block_id(), 0..=2),
            any::<u8>(),
            id32(),
        )
            .prop_map(|(strong_parents, weak_parents, highest_supported_version, hash)| {
                BlockBody::Validation(ValidationBlockBody {
                    strong_parents,
                    weak_parents,
                    shallow_like_parents: vec![],
                    highest_supported_version,
                    protocol_parameters_hash: Identifier(hash),
                })
            }),
    ]
}

fn block() -> impl Strategy<Value = Block> {
    (block_header(), block_body(), id32(), prop::collection::vec(any::<u8>(), 64)).prop_map(
        |(header, body, public_key, sig)| {
            let mut signature = [0u8; 64];
            signature.copy_from_slice(&sig);
            Block { header, body, signature: Signature::Ed25519(Ed25519Signature { public_key, signature }) }
        },
    )
}

fn protocol_parameters() -> impl Strategy<Value = ProtocolParameters> {
    (
        "[A-Za-z][A-Za-z0-9 ]{0,31}",
        "[a-z]{1,8}",
        (any::<u64>(), any::<u64>()),
        (1u8..=60, 0u8..32),
        prop::collection::vec(any::<u32>(), 0..16),
        (any::<u32>(), any::<u8>()),
    )
        .prop_map(|(name, hrp, (supply, genesis), (duration, exponent), decay_factors, (unbonding, committee))| {
            let mut params = ProtocolParameters::default()
                .with_network(name, hrp)
                .with_time_provider(0, genesis, duration, exponent);
            params.token_supply = supply;
            params.mana_parameters.decay_factors = decay_factors;
            params.staking_unbonding_period = unbonding;
            params.target_committee_size = committee;
            params
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_output_kind_round_trips(out in any_output()) {
        check_codec(&out)?;
    }

    #[test]
    fn unlocks_round_trip(u in unlock()) {
        check_codec(&u)?;
    }

    #[test]
    fn signed_transactions_round_trip(tx in signed_transaction()) {
        check_codec(&tx)?;
        check_codec(&Payload::from(tx))?;
    }

    #[test]
    fn blocks_round_trip(b in block()) {
        check_codec(&b)?;
        let api = Api::default();
        let id = api.block_id(&b).unwrap();
        prop_assert_eq!(id.slot(), api.params().slot_from_time(b.header.issuing_time));
    }

    #[test]
    fn protocol_parameters_round_trip(params in protocol_parameters()) {
        check_codec(&params)?;
    }

    #[test]
    fn output_id_proofs_round_trip(
        outputs in prop::collection::vec(any_output(), 1..24),
        input in utxo_input(),
        pick in any::<prop::sample::Index>(),
    ) {
        let api = Api::default();
        let tx = Transaction {
            network_id: api.params().network_id(),
            creation_slot: 7,
            context_inputs: vec![],
            inputs: vec![input],
            allotments: vec![],
            capabilities: TransactionCapabilities::none(),
            payload: None,
            outputs,
        };
        let index = u16::try_from(pick.index(tx.outputs.len())).unwrap();
        let proof: OutputIdProof = api.build_output_id_proof(&tx, index).unwrap();
        check_codec(&proof)?;
        prop_assert_eq!(proof.output_id(&tx.outputs[usize::from(index)]).unwrap(), tx.output_id(index).unwrap());
    }
}
