//! Fixed-width hex encoding of attestation type and source identifiers.
//!
//! Identifiers such as `"Web2Json"` or `"PublicWeb2"` travel as `bytes32`.
//! Each UTF-16 code unit is written as lowercase hex with no padding of its
//! own, and the concatenation is right-padded with `'0'` up to 64 characters.
//! Inputs that already exceed 64 hex characters are returned as is, there is
//! no truncation or validation.

use itertools::Itertools;

/// Width of an encoded identifier in hex characters (32 bytes).
pub const IDENTIFIER_HEX_WIDTH: usize = 64;

/// Encode an identifier without the `0x` prefix.
pub fn encode_identifier(data: &str) -> String {
    let hex = data.encode_utf16().map(|unit| format!("{unit:x}")).join("");
    format!("{hex:0<IDENTIFIER_HEX_WIDTH$}")
}

/// Encode an identifier as a `0x`-prefixed hex string.
pub fn to_utf8_hex_string(data: &str) -> String {
    format!("0x{}", encode_identifier(data))
}
