//! Page codec: pure conversions between raw page bytes and typed fields
//!
//! A tag page is always exactly 4 bytes. Names are UTF-8, NUL-padded to
//! their layout width. Stats are unsigned 16-bit little-endian. Nothing in
//! this module touches the transport.

use crate::error::{Error, Result};

/// Sentinel returned when name bytes do not decode as UTF-8.
///
/// A bad name never fails a full read; the rest of the record is still
/// valid and the companion application shows the sentinel.
pub const NAME_SENTINEL: &str = "Unknown";

/// Decode a name from its pages: concatenate in page order, strip trailing
/// NULs, decode UTF-8. Invalid UTF-8 degrades to [`NAME_SENTINEL`].
pub fn decode_name(pages: &[[u8; 4]]) -> String {
    let mut bytes: Vec<u8> = Vec::with_capacity(pages.len() * 4);
    for page in pages {
        bytes.extend_from_slice(page);
    }
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    match String::from_utf8(bytes) {
        Ok(name) => name,
        Err(_) => NAME_SENTINEL.to_string(),
    }
}

/// Combine two bytes into a stat value: `lo + hi * 256`.
#[inline]
pub fn decode_stat(lo: u8, hi: u8) -> u16 {
    u16::from_le_bytes([lo, hi])
}

/// Encode a stat value as 2 little-endian bytes.
///
/// Fails with [`Error::Range`] outside [0, 65535].
pub fn encode_stat(value: i64) -> Result<[u8; 2]> {
    if !(0..=65535).contains(&value) {
        return Err(Error::Range { value });
    }
    Ok((value as u16).to_le_bytes())
}

/// Encode a name: UTF-8 bytes, NUL-padded to `width` or truncated to it.
///
/// Truncation may split a multi-byte character; the decode side then yields
/// the sentinel. Accepted limitation, matching the card format.
pub fn encode_name(value: &str, width: usize) -> Vec<u8> {
    let mut bytes = value.as_bytes().to_vec();
    bytes.truncate(width);
    bytes.resize(width, 0);
    bytes
}

/// Build a 4-byte page payload: zero-pad short input, reject anything longer.
pub fn page_payload(bytes: &[u8]) -> Result<[u8; 4]> {
    if bytes.len() > 4 {
        return Err(Error::Format(format!(
            "page payload is {} bytes, maximum is 4",
            bytes.len()
        )));
    }
    let mut page = [0u8; 4];
    page[..bytes.len()].copy_from_slice(bytes);
    Ok(page)
}

/// Uppercase hex, space-separated ("01 A2 FF 00") — inventory block form.
pub fn hex_spaced(bytes: &[u8]) -> String {
    join_hex(bytes, ' ')
}

/// Uppercase hex, colon-separated ("01:A2:FF:00") — card identifier form,
/// matching the database key format.
pub fn hex_colon(bytes: &[u8]) -> String {
    join_hex(bytes, ':')
}

fn join_hex(bytes: &[u8], sep: char) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.push_str(&format!("{:02X}", b));
    }
    out
}
