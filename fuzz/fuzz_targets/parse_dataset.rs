#![no_main]

use libfuzzer_sys::fuzz_target;
use tracemap_core::Dataset;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(dataset) = Dataset::from_json_str(text) {
        let _ = dataset.tag_types();
        let _ = dataset.derive_links();
    }
});
