//! Base64URL segment codec per RFC 4648
//!
//! Wire segments carry no `=` padding. Encoding always strips padding;
//! decoding re-pads the input to a multiple of four characters before
//! handing it to the standard decoder, so both padded and stripped inputs
//! round-trip. A length of 1 (mod 4) is not a valid base64 length and
//! always fails.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::error::{Error, Result};

/// Encode bytes as an unpadded base64url segment
pub fn encode_segment(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Decode a base64url segment, accepting stripped or intact padding
pub fn decode_segment(input: &str) -> Result<Vec<u8>> {
    let padded;
    let normalized = match input.len() % 4 {
        2 => {
            padded = format!("{input}==");
            padded.as_str()
        }
        3 => {
            padded = format!("{input}=");
            padded.as_str()
        }
        // Remainder 0 needs nothing; remainder 1 is rejected by the decoder.
        _ => input,
    };

    URL_SAFE
        .decode(normalized)
        .map_err(|e| Error::InvalidBase64(e.to_string()))
}
