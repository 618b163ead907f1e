#![no_main]

use libfuzzer_sys::fuzz_target;
use nova_codec::{Api, Block};

fuzz_target!(|data: &[u8]| {
    let api = Api::default();
    if let Ok(block) = api.decode::<Block>(data) {
        // anything that decodes must re-encode to the same bytes
        let bytes = api.encode(&block).expect("decoded block encodes");
        assert_eq!(bytes, data);
        let _ = api.validate(&block);
        let _ = api.block_id(&block);
    }
});
