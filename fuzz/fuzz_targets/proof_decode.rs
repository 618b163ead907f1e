#![no_main]

use libfuzzer_sys::fuzz_target;
use nova_codec::{Api, OutputIdProof};

fuzz_target!(|data: &[u8]| {
    let api = Api::default();
    if let Ok(proof) = api.decode::<OutputIdProof>(data) {
        assert_eq!(api.encode(&proof).expect("decoded proof encodes"), data);
        let _ = proof.transaction_id();
        let _ = proof.output_commitment_proof.siblings();
    }
});
