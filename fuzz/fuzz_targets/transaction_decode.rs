#![no_main]

use libfuzzer_sys::fuzz_target;
use nova_codec::{Api, SignedTransaction};

fuzz_target!(|data: &[u8]| {
    let api = Api::default();
    if let Ok(tx) = api.decode::<SignedTransaction>(data) {
        assert_eq!(api.encode(&tx).expect("decoded transaction encodes"), data);
        if api.validate(&tx).is_ok() {
            let _ = tx.verify_signatures();
        }
        let _ = api.work_score(&tx);
    }
});
