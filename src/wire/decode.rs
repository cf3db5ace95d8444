//! Field decoding.
//!
//! Zero-copy decoding using `Bytes`: fields are returned as slices of the
//! original frame.

use bytes::Bytes;

use super::{NUL, parse_signed, parse_unsigned};
use crate::error::{DecodeErrorKind, Error, Result};

/// Decoder that reads NUL-terminated fields from a byte buffer.
pub struct Decoder {
    data: Bytes,
    offset: usize,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self { data, offset: 0 }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Get the current offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    fn fail(&self, offset: usize, kind: DecodeErrorKind) -> Box<Error> {
        tracing::debug!(target: "lsnmpvs::codec", { lsnmp.offset = offset, kind = %kind }, "decode error");
        Error::decode(offset, kind)
    }

    /// Read one field, consuming its terminator.
    pub fn read_field(&mut self) -> Result<Bytes> {
        let rest = &self.data[self.offset..];
        let Some(len) = rest.iter().position(|&b| b == NUL) else {
            return Err(self.fail(self.offset, DecodeErrorKind::Unterminated));
        };
        let field = self.data.slice(self.offset..self.offset + len);
        self.offset += len + 1;
        Ok(field)
    }

    /// Read a field and require it to be the single character `expected`.
    pub fn expect_tag(&mut self, expected: u8) -> Result<()> {
        let start = self.offset;
        let field = self.read_field()?;
        if field.as_ref() != [expected] {
            return Err(self.fail(start, DecodeErrorKind::UnexpectedTag { expected }));
        }
        Ok(())
    }

    /// Read an unsigned decimal field.
    pub fn read_unsigned(&mut self) -> Result<u64> {
        let start = self.offset;
        let field = self.read_field()?;
        parse_unsigned(&field).map_err(|kind| self.fail(start, kind))
    }

    /// Read a count field.
    pub fn read_count(&mut self) -> Result<usize> {
        let start = self.offset;
        let count = self.read_unsigned()?;
        usize::try_from(count).map_err(|_| self.fail(start, DecodeErrorKind::NumberOverflow))
    }

    /// Read a signed decimal field.
    pub fn read_signed(&mut self) -> Result<i64> {
        let start = self.offset;
        let field = self.read_field()?;
        parse_signed(&field).map_err(|kind| self.fail(start, kind))
    }

    /// Read a field of ASCII digits, keeping it as text.
    pub fn read_digits(&mut self) -> Result<String> {
        let start = self.offset;
        let field = self.read_field()?;
        if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
            return Err(self.fail(start, DecodeErrorKind::NotNumeric));
        }
        Ok(field.iter().map(|&b| b as char).collect())
    }

    /// Read a UTF-8 text field.
    pub fn read_text(&mut self) -> Result<String> {
        let start = self.offset;
        let field = self.read_field()?;
        String::from_utf8(field.to_vec()).map_err(|_| self.fail(start, DecodeErrorKind::InvalidUtf8))
    }

    /// Fail with `kind` at `offset`, logging the detail.
    pub fn error_at(&self, offset: usize, kind: DecodeErrorKind) -> Box<Error> {
        self.fail(offset, kind)
    }

    /// Get remaining data as a slice.
    pub fn remaining_slice(&self) -> &[u8] {
        &self.data[self.offset..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_fields() {
        let mut dec = Decoder::from_slice(b"ab\0\0c\0");
        assert_eq!(&dec.read_field().unwrap()[..], b"ab");
        assert_eq!(&dec.read_field().unwrap()[..], b"");
        assert_eq!(&dec.read_field().unwrap()[..], b"c");
        assert!(dec.is_empty());
    }

    #[test]
    fn test_unterminated_field() {
        let mut dec = Decoder::from_slice(b"1\x002");
        assert_eq!(dec.read_count().unwrap(), 1);
        let err = dec.read_count().unwrap_err();
        assert!(matches!(
            *err,
            Error::Decoding {
                offset: 2,
                kind: DecodeErrorKind::Unterminated
            }
        ));
    }

    #[test]
    fn test_expect_tag() {
        let mut dec = Decoder::from_slice(b"D\0DD\0");
        dec.expect_tag(b'D').unwrap();
        let err = dec.expect_tag(b'D').unwrap_err();
        assert!(matches!(
            *err,
            Error::Decoding {
                offset: 2,
                kind: DecodeErrorKind::UnexpectedTag { expected: b'D' }
            }
        ));
    }

    #[test]
    fn test_numbers() {
        let mut dec = Decoder::from_slice(b"12\0-7\0x\0");
        assert_eq!(dec.read_unsigned().unwrap(), 12);
        assert_eq!(dec.read_signed().unwrap(), -7);
        let err = dec.read_signed().unwrap_err();
        assert_eq!(err.code(), 1);
    }

    #[test]
    fn test_read_digits_keeps_leading_zeros() {
        let mut dec = Decoder::from_slice(b"007\0");
        assert_eq!(dec.read_digits().unwrap(), "007");
    }

    #[test]
    fn test_read_text_rejects_invalid_utf8() {
        let mut dec = Decoder::from_slice(b"\xff\xfe\0");
        let err = dec.read_text().unwrap_err();
        assert!(matches!(
            *err,
            Error::Decoding {
                kind: DecodeErrorKind::InvalidUtf8,
                ..
            }
        ));
    }
}
