//! Message type and message id.

use std::fmt;

use crate::error::{DecodeErrorKind, Error, Result};

/// Length of every message id.
pub const MESSAGE_ID_LEN: usize = 16;

/// The four message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// `G`: read request.
    Get,
    /// `S`: write request.
    Set,
    /// `R`: response.
    Response,
    /// `N`: unsolicited notification.
    Notification,
}

impl MessageType {
    /// Wire character.
    pub fn as_byte(self) -> u8 {
        match self {
            MessageType::Get => b'G',
            MessageType::Set => b'S',
            MessageType::Response => b'R',
            MessageType::Notification => b'N',
        }
    }

    /// Parse the wire field.
    pub fn from_field(field: &[u8]) -> Option<Self> {
        match field {
            b"G" => Some(MessageType::Get),
            b"S" => Some(MessageType::Set),
            b"R" => Some(MessageType::Response),
            b"N" => Some(MessageType::Notification),
            _ => None,
        }
    }

    /// Requests carry a calendar date; responses and notifications an uptime.
    pub fn is_request(self) -> bool {
        matches!(self, MessageType::Get | MessageType::Set)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte() as char)
    }
}

/// Sixteen-character ASCII message id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId([u8; MESSAGE_ID_LEN]);

impl MessageId {
    /// Sentinel id used when answering a frame that could not be decoded.
    pub const INVALID: MessageId = MessageId(*b"INVALIDMESSAGEID");

    /// Validate and wrap an id.
    ///
    /// ```
    /// use lsnmpvs::MessageId;
    ///
    /// assert!(MessageId::new("0123456789abcdef").is_ok());
    /// assert!(MessageId::new("short").is_err());
    /// ```
    pub fn new(id: &str) -> Result<Self> {
        Self::from_bytes(id.as_bytes())
            .map_err(|kind| Error::decode(0, kind))
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, DecodeErrorKind> {
        if !bytes.iter().all(|b| b.is_ascii() && *b != 0) {
            return Err(DecodeErrorKind::MessageIdNotAscii);
        }
        <[u8; MESSAGE_ID_LEN]>::try_from(bytes)
            .map(MessageId)
            .map_err(|_| DecodeErrorKind::MessageIdLength {
                actual: bytes.len(),
            })
    }

    /// Fresh random id: 16 lowercase hex digits.
    pub fn random() -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        let mut id = [b'0'; MESSAGE_ID_LEN];
        for (slot, b) in id.iter_mut().zip(hex.bytes()) {
            *slot = b;
        }
        MessageId(id)
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        // construction guarantees ASCII
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.as_str())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageId {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_valid_and_distinct() {
        let a = MessageId::random();
        let b = MessageId::random();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), MESSAGE_ID_LEN);
        assert!(a.as_str().bytes().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_id_validation() {
        assert_eq!(
            MessageId::from_bytes(b"abc"),
            Err(DecodeErrorKind::MessageIdLength { actual: 3 })
        );
        assert_eq!(
            MessageId::from_bytes("é123456789abcde".as_bytes()),
            Err(DecodeErrorKind::MessageIdNotAscii)
        );
        assert_eq!(MessageId::INVALID.as_str(), "INVALIDMESSAGEID");
    }

    #[test]
    fn test_message_type_field() {
        for t in [
            MessageType::Get,
            MessageType::Set,
            MessageType::Response,
            MessageType::Notification,
        ] {
            assert_eq!(MessageType::from_field(&[t.as_byte()]), Some(t));
        }
        assert_eq!(MessageType::from_field(b"X"), None);
        assert_eq!(MessageType::from_field(b"GG"), None);
    }
}
