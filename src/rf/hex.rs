//! Hex-string decoding for the raw passthrough.

use heapless::Vec;

use crate::error::LinkError;

/// Largest raw payload the passthrough accepts in one call.
pub const MAX_RAW_BYTES: usize = 64;

/// Decode `"AA FE 00 02"` / `"aafe0002"` into bytes.
///
/// Whitespace is ignored anywhere.  An odd digit count or any non-hex
/// character is rejected as a whole; nothing is partially decoded.
pub fn decode_hex(s: &str) -> Result<Vec<u8, MAX_RAW_BYTES>, LinkError> {
    let mut out = Vec::new();
    let mut high: Option<u8> = None;

    for c in s.chars().filter(|c| !c.is_whitespace()) {
        let nibble = c.to_digit(16).ok_or(LinkError::InvalidHex)? as u8;
        match high.take() {
            None => high = Some(nibble),
            Some(h) => out
                .push((h << 4) | nibble)
                .map_err(|_| LinkError::PayloadTooLong)?,
        }
    }

    if high.is_some() {
        return Err(LinkError::InvalidHex);
    }
    Ok(out)
}
