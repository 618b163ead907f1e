#![no_main]

use libfuzzer_sys::fuzz_target;
use nova_codec::{Api, Block, Output};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else { return };
    let api = Api::default();
    if let Ok(output) = api.json_decode::<Output>(text) {
        let bytes = api.encode(&output).expect("checked at decode");
        assert_eq!(api.decode::<Output>(&bytes).expect("round trip"), output);
    }
    let _ = api.json_decode::<Block>(text);
});
