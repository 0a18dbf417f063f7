#![no_main]

use libfuzzer_sys::fuzz_target;
use refactor_core::query::parse_captures;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    let output = String::from_utf8_lossy(data);
    let captures = parse_captures(&output, Path::new("fuzz.rs"));

    for pair in captures.windows(2) {
        let (a, b) = (&pair[0].location, &pair[1].location);
        assert!((a.line, a.column) <= (b.line, b.column));
    }
});
