//! Fuzz target: `decode_hex`
//!
//! Arbitrary strings must either decode into at most `MAX_RAW_BYTES`
//! bytes or be rejected; never panic.
//!
//! cargo fuzz run fuzz_raw_hex

#![no_main]

use ccu::rf::hex::{MAX_RAW_BYTES, decode_hex};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(bytes) = decode_hex(s) {
        assert!(bytes.len() <= MAX_RAW_BYTES);
        let digits = s.chars().filter(|c| !c.is_whitespace()).count();
        assert_eq!(digits, bytes.len() * 2);
    }
});
