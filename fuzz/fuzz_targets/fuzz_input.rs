// SPDX-License-Identifier: PMPL-1.0

#![no_main]

use libfuzzer_sys::fuzz_target;

use larder::catalog::ItemName;
use larder::engine::extract_json_array;
use larder::forecast::parse_rows;
use larder::recognize::parse_detections;

// Model output is untrusted free text; none of these may panic on it.
fuzz_target!(|data: &str| {
    let _ = ItemName::normalize(data);
    let _ = extract_json_array(data);
    let _ = parse_detections(data);
    let _ = parse_rows(data);
});
