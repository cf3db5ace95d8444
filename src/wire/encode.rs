//! Field encoding.

use bytes::{BufMut, Bytes, BytesMut};

use super::NUL;

/// Buffer that appends NUL-terminated fields.
pub struct EncodeBuf {
    buf: BytesMut,
}

impl EncodeBuf {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    /// Create an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append a field and its terminator.
    pub fn push_field(&mut self, field: &[u8]) {
        self.buf.put_slice(field);
        self.buf.put_u8(NUL);
    }

    /// Append a single-character tag field.
    pub fn push_tag(&mut self, tag: u8) {
        self.push_field(&[tag]);
    }

    /// Append a decimal count field.
    pub fn push_count(&mut self, count: usize) {
        self.push_field(count.to_string().as_bytes());
    }

    /// Append a signed decimal field.
    pub fn push_integer(&mut self, value: i64) {
        self.push_field(value.to_string().as_bytes());
    }

    /// Append a text field.
    pub fn push_str(&mut self, text: &str) {
        self.push_field(text.as_bytes());
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish encoding and return the frame.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}
