//! Detailed decode failure kinds.
//!
//! These ride along inside [`Error::Decoding`](super::Error::Decoding) and are
//! logged at the failure site; the wire only ever sees code 1.

/// Why a frame failed to decode (or would fail to decode, when raised by the
/// encoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// A field is missing its NUL terminator.
    Unterminated,
    /// Expected a specific single-character field tag.
    UnexpectedTag { expected: u8 },
    /// Field is not a decimal number.
    NotNumeric,
    /// Number does not fit the target integer type.
    NumberOverflow,
    /// Timestamp has the wrong number of parts for the message type.
    TimestampParts { expected: usize, actual: usize },
    /// Timestamp kind does not match the message type.
    TimestampKind,
    /// Date parts do not form a valid calendar date and time.
    InvalidDate,
    /// Message id must be exactly 16 ASCII characters.
    MessageIdLength { actual: usize },
    /// Message id is not ASCII.
    MessageIdNotAscii,
    /// Value has the wrong number of parts for its type.
    ValueParts { tag: u8, actual: usize },
    /// Text value is not valid UTF-8.
    InvalidUtf8,
    /// Text value contains a NUL byte.
    EmbeddedNul,
    /// Get request carries values.
    ValuesNotAllowed { count: usize },
    /// Get or Set request carries errors.
    ErrorsNotAllowed { count: usize },
    /// Bytes left after the error list.
    TrailingData { remaining: usize },
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unterminated => write!(f, "field not NUL-terminated"),
            Self::UnexpectedTag { expected } => {
                write!(f, "expected field tag {:?}", *expected as char)
            }
            Self::NotNumeric => write!(f, "field is not numeric"),
            Self::NumberOverflow => write!(f, "number out of range"),
            Self::TimestampParts { expected, actual } => {
                write!(f, "timestamp needs {} parts, got {}", expected, actual)
            }
            Self::TimestampKind => write!(f, "timestamp kind does not match message type"),
            Self::InvalidDate => write!(f, "invalid date"),
            Self::MessageIdLength { actual } => {
                write!(f, "message id must be 16 characters, got {}", actual)
            }
            Self::MessageIdNotAscii => write!(f, "message id is not ASCII"),
            Self::ValueParts { tag, actual } => {
                write!(f, "value of type {:?} cannot have {} parts", *tag as char, actual)
            }
            Self::InvalidUtf8 => write!(f, "text is not valid UTF-8"),
            Self::EmbeddedNul => write!(f, "text contains NUL"),
            Self::ValuesNotAllowed { count } => {
                write!(f, "get request carries {} values", count)
            }
            Self::ErrorsNotAllowed { count } => write!(f, "request carries {} errors", count),
            Self::TrailingData { remaining } => {
                write!(f, "{} bytes after the error list", remaining)
            }
        }
    }
}
