//! Conformance checks: recompute the generator's vectors from their printed
//! encodings.

use nova_codec::{address::Address, Api, Block, SignedTransaction};
use nova_primitives::blake2b_256;
use nova_vectors::fixtures::{generate, multi_address_fixture, signed_transaction_fixture, VectorObject};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

fn fenced_after<'a>(text: &'a str, heading: &str) -> &'a str {
    let rest = &text[text.find(heading).expect("heading")..];
    let body = &rest[rest.find("```").expect("fence")..];
    let body = &body[body.find('\n').expect("newline") + 1..];
    body[..body.find("```").expect("closing fence")].trim()
}

fn hex_bytes(s: &str) -> Vec<u8> {
    hex::decode(s.trim_start_matches("0x")).expect("hex")
}

#[test]
fn transaction_vector_recomputes() {
    let api = Api::default();
    let mut rng = ChaCha20Rng::seed_from_u64(2024);
    let text = generate(VectorObject::Transaction, &api, &mut rng).expect("vector").into_string();

    let bytes = hex_bytes(fenced_after(&text, "Transaction (binary-encoded):"));
    let tx: SignedTransaction = api.decode_validated(&bytes).expect("decode");
    tx.verify_signatures().expect("signatures");
    let from_json: SignedTransaction = api.json_decode(fenced_after(&text, "Transaction (json-encoded):")).expect("json");
    assert_eq!(from_json, tx);
    assert_eq!(api.transaction_id(&tx.transaction).expect("id").to_hex(), fenced_after(&text, "Transaction ID:"));

    // the generator builds the same fixture from the same stream
    let mut rng = ChaCha20Rng::seed_from_u64(2024);
    assert_eq!(signed_transaction_fixture(&api, &mut rng).expect("fixture"), tx);
}

#[test]
fn block_vectors_recompute() {
    let api = Api::default();
    for object in [VectorObject::TransactionBasicBlock, VectorObject::TaggedDataBasicBlock, VectorObject::ValidationBlock] {
        let mut rng = ChaCha20Rng::seed_from_u64(77);
        let text = generate(object, &api, &mut rng).expect("vector").into_string();
        let bytes = hex_bytes(fenced_after(&text, "Block (binary-encoded):"));
        let block: Block = api.decode_validated(&bytes).expect("decode");
        block.verify_signature().expect("signature");
        assert_eq!(api.block_id(&block).expect("id").to_hex(), fenced_after(&text, "Block ID:"));
        assert_eq!(block.slot(api.params()), 2);
        assert_eq!(api.encode(&block).expect("encode"), bytes);
    }
}

#[test]
fn multi_address_reference_is_hash_of_kind_and_bytes() {
    let api = Api::default();
    let multi = multi_address_fixture();
    let address = Address::Multi(multi.clone());
    let encoded = api.encode(&address).expect("encode");
    assert_eq!(encoded[0], 40);
    assert_eq!(multi.reference().expect("reference").0, blake2b_256(&[&encoded]));

    let mut rng = ChaCha20Rng::seed_from_u64(0);
    let text = generate(VectorObject::MultiAddress, &api, &mut rng).expect("vector").into_string();
    assert_eq!(fenced_after(&text, "Multi Address Reference:"), multi.reference().expect("reference").to_hex());
}

#[test]
fn parameters_loaded_from_json_match_defaults() {
    let api = Api::default();
    let path = std::env::temp_dir().join(format!("nova-params-{}.json", std::process::id()));
    std::fs::write(&path, api.json_encode(api.params()).expect("json")).expect("write");
    let loaded = nova_vectors::load_api(Some(&path)).expect("load");
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, api);
}
