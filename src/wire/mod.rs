//! L-SNMPvS wire primitives.
//!
//! Every field on the wire is ASCII text terminated by a single NUL byte.
//! Structured items (timestamps, IIDs, values) are a one-character tag field,
//! a count field, then that many part fields.
//!
//! This module provides the field-level [`Decoder`] and [`EncodeBuf`]; the
//! frame grammar itself lives in [`crate::message`].

mod decode;
mod encode;

pub use decode::Decoder;
pub use encode::EncodeBuf;

use crate::error::DecodeErrorKind;

/// Field terminator.
pub const NUL: u8 = 0x00;

/// Protocol tag that opens every frame (followed by a NUL).
pub const MAGIC: &[u8] = b"kdk847ufh84jg87g";

/// Single-character item tags.
pub mod tag {
    /// Message timestamp.
    pub const TIMESTAMP: u8 = b'T';
    /// IID entry.
    pub const IID: u8 = b'D';
    /// Integer value.
    pub const INTEGER: u8 = b'I';
    /// Timestamp value (5 or 7 parts).
    pub const TIMESTAMP_VALUE: u8 = b'T';
    /// Text value.
    pub const TEXT: u8 = b'S';
}

/// Parse a field of one or more ASCII digits.
pub(crate) fn parse_unsigned(field: &[u8]) -> Result<u64, DecodeErrorKind> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return Err(DecodeErrorKind::NotNumeric);
    }
    field.iter().try_fold(0u64, |acc, &b| {
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(u64::from(b - b'0')))
            .ok_or(DecodeErrorKind::NumberOverflow)
    })
}

/// Parse a field of ASCII digits with an optional leading `-`.
pub(crate) fn parse_signed(field: &[u8]) -> Result<i64, DecodeErrorKind> {
    let (negative, digits) = match field.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, field),
    };
    let magnitude = parse_unsigned(digits)?;
    if negative {
        // i64::MIN has no positive counterpart
        0i64.checked_sub_unsigned(magnitude)
            .ok_or(DecodeErrorKind::NumberOverflow)
    } else {
        i64::try_from(magnitude).map_err(|_| DecodeErrorKind::NumberOverflow)
    }
}

/// Returns `true` if the text is a non-empty run of ASCII digits.
pub(crate) fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
