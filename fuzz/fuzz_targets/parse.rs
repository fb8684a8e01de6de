#![no_main]

use ccs_data::{ParseOptions, StaticData};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let options = ParseOptions {
        verify_checksum: false,
        ..ParseOptions::default()
    };
    if let Ok(tree) = StaticData::parse_with(data, &options) {
        // Re-encoding a decoded tree must not panic either.
        let _ = tree.to_bytes();
    }
});
