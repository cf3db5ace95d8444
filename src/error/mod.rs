//! Error types for lsnmpvs.
//!
//! This module provides:
//!
//! - [`Error`] - The main error type, one variant per protocol error kind plus
//!   the I/O and configuration failures of the agent and manager
//! - [`IidErrorKind`] - Why an IID was rejected
//! - [`UnsupportedKind`] - Why a value was rejected by a MIB field
//!
//! Every error maps onto the numeric code carried in a Response error list via
//! [`Error::code`].
//!
//! # Error Handling
//!
//! Errors are boxed for efficiency: `Result<T> = Result<T, Box<Error>>`.
//!
//! ```rust
//! use lsnmpvs::{Error, Message, Result};
//!
//! fn describe(result: Result<Message>) -> u32 {
//!     match result {
//!         Ok(_) => 0,
//!         Err(e) => match &*e {
//!             Error::InvalidTag => {
//!                 println!("not an L-SNMPvS frame");
//!                 e.code()
//!             }
//!             _ => e.code(),
//!         },
//!     }
//! }
//!
//! assert_eq!(describe(Message::decode(b"garbage")), 2);
//! ```

pub(crate) mod internal;

use std::net::SocketAddr;
use std::time::Duration;

use crate::iid::Group;

pub use internal::DecodeErrorKind;

/// Result type alias using the library's boxed Error type.
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Reason an IID was rejected, either while parsing or while resolving it
/// against the MIB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IidErrorKind {
    /// Component count outside 2..=4.
    Shape { len: usize },
    /// A component is not an integer.
    NonInteger,
    /// Structure must be a positive integer.
    Structure(i64),
    /// Object must be zero or positive.
    Object(i64),
    /// Table indexes must be zero or positive.
    NegativeIndex(i64),
    /// Structure does not name an object group.
    UnknownStructure(u32),
    /// Object is outside the group's field table.
    UnknownObject { group: Group, object: u32 },
    /// The group is scalar and takes no indexes.
    UnexpectedIndex { group: Group },
    /// The operation requires exactly one row index.
    RowIndexRequired,
    /// A row index outside 1..=len.
    RowOutOfRange { row: u32, len: usize },
    /// A range that is not `1 <= lo <= hi <= len`.
    RangeOutOfBounds { lo: u32, hi: u32, len: usize },
}

impl std::fmt::Display for IidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shape { len } => {
                write!(f, "IID must contain between 2 and 4 integers, got {}", len)
            }
            Self::NonInteger => write!(f, "all IID parts must be integers"),
            Self::Structure(s) => write!(f, "structure must be a positive integer, got {}", s),
            Self::Object(o) => write!(f, "object must be 0 or positive, got {}", o),
            Self::NegativeIndex(i) => write!(f, "index must be 0 or positive, got {}", i),
            Self::UnknownStructure(s) => write!(f, "unknown structure {}", s),
            Self::UnknownObject { group, object } => {
                write!(f, "object {} does not exist in {}", object, group)
            }
            Self::UnexpectedIndex { group } => write!(f, "{} does not take indexes", group),
            Self::RowIndexRequired => write!(f, "exactly one row index is required"),
            Self::RowOutOfRange { row, len } => {
                write!(f, "row {} outside table of {} rows", row, len)
            }
            Self::RangeOutOfBounds { lo, hi, len } => {
                write!(f, "range [{}, {}] outside table of {} rows", lo, hi, len)
            }
        }
    }
}

/// Reason a value was refused by a MIB field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedKind {
    /// The addressed field cannot be written.
    ReadOnly { group: Group, object: u32 },
    /// Value outside the field's declared bounds.
    OutOfBounds { value: i64, min: i64, max: i64 },
    /// Beacon rate must not be negative.
    NegativeRate(i64),
    /// Text that does not pass the date validator.
    InvalidDate(Box<str>),
    /// Reset only accepts 0 or 1.
    InvalidReset(i64),
}

impl std::fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadOnly { group, object } => {
                write!(f, "object {} of {} is not writable", object, group)
            }
            Self::OutOfBounds { value, min, max } => {
                write!(f, "value {} outside [{}, {}]", value, min, max)
            }
            Self::NegativeRate(v) => write!(f, "beacon rate must not be negative, got {}", v),
            Self::InvalidDate(s) => write!(f, "invalid date {:?}", s),
            Self::InvalidReset(v) => write!(f, "reset accepts 0 or 1, got {}", v),
        }
    }
}

/// The main error type for all lsnmpvs operations.
///
/// The first nine variants mirror the protocol error taxonomy one to one; the
/// remaining ones only occur on the agent/manager side and are reported on the
/// wire as a generic decoding failure (code 1).
///
/// # Common Patterns
///
/// ```
/// use lsnmpvs::Error;
///
/// fn is_frame_error(error: &Error) -> bool {
///     matches!(
///         error,
///         Error::Decoding { .. } | Error::InvalidTag | Error::UnknownMessageType { .. }
///     )
/// }
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Malformed frame (generic fallback, code 1).
    #[error("malformed message at offset {offset}: {kind}")]
    Decoding { offset: usize, kind: DecodeErrorKind },

    /// Frame does not start with the protocol tag (code 2).
    #[error("invalid message tag")]
    InvalidTag,

    /// Message type is not one of G, S, R, N (code 3).
    #[error("unknown message type {found:?}")]
    UnknownMessageType { found: Box<str> },

    /// Message id already processed (code 4).
    #[error("duplicate message {message_id}")]
    DuplicateMessage { message_id: Box<str> },

    /// IID malformed or not present in the MIB (code 5).
    #[error("invalid IID: {kind}")]
    InvalidIid { kind: IidErrorKind },

    /// Value of the wrong type (code 6).
    #[error("invalid value type: expected {expected}, got {found}")]
    InvalidValueType {
        expected: &'static str,
        found: Box<str>,
    },

    /// Value refused by the addressed field (code 7).
    #[error("unsupported value: {kind}")]
    UnsupportedValue { kind: UnsupportedKind },

    /// Set request whose value count differs from its IID count (code 8).
    #[error("value count {values} does not match IID count {iids}")]
    IidValueMismatch { iids: usize, values: usize },

    /// Table addressed while it has no rows (code 9).
    #[error("no devices registered in {group}")]
    NoDevicesRegistered { group: Group },

    /// Socket failure.
    #[error("network error on {target}: {source}")]
    Network {
        target: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// No matching response before the deadline.
    #[error("timeout after {elapsed:?} waiting for {target}")]
    Timeout { target: SocketAddr, elapsed: Duration },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(Box<str>),
}

impl Error {
    /// Box this error (convenience for constructing boxed errors).
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Create a decoding error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Box<Self> {
        Self::Decoding { offset, kind }.boxed()
    }

    /// Create an IID error.
    pub fn invalid_iid(kind: IidErrorKind) -> Box<Self> {
        Self::InvalidIid { kind }.boxed()
    }

    /// Create an unsupported-value error.
    pub fn unsupported(kind: UnsupportedKind) -> Box<Self> {
        Self::UnsupportedValue { kind }.boxed()
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<Box<str>>) -> Box<Self> {
        Self::Config(msg.into()).boxed()
    }

    /// Numeric code carried in a Response error list.
    ///
    /// ```
    /// use lsnmpvs::Error;
    ///
    /// assert_eq!(Error::InvalidTag.code(), 2);
    /// assert_eq!(Error::IidValueMismatch { iids: 2, values: 1 }.code(), 8);
    /// ```
    pub fn code(&self) -> u32 {
        match self {
            Self::Decoding { .. } => 1,
            Self::InvalidTag => 2,
            Self::UnknownMessageType { .. } => 3,
            Self::DuplicateMessage { .. } => 4,
            Self::InvalidIid { .. } => 5,
            Self::InvalidValueType { .. } => 6,
            Self::UnsupportedValue { .. } => 7,
            Self::IidValueMismatch { .. } => 8,
            Self::NoDevicesRegistered { .. } => 9,
            Self::Network { .. } | Self::Timeout { .. } | Self::Config(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_size_budget() {
        assert!(
            std::mem::size_of::<Error>() <= 80,
            "Error size {} exceeds 80-byte budget",
            std::mem::size_of::<Error>()
        );

        // Result<(), Box<Error>> should be pointer-sized (8 bytes on 64-bit).
        assert_eq!(
            std::mem::size_of::<Result<()>>(),
            std::mem::size_of::<*const ()>(),
            "Result<()> should be pointer-sized"
        );
    }

    #[test]
    fn codes_follow_taxonomy() {
        let cases: Vec<(Error, u32)> = vec![
            (
                Error::Decoding {
                    offset: 0,
                    kind: DecodeErrorKind::TrailingData { remaining: 1 },
                },
                1,
            ),
            (Error::InvalidTag, 2),
            (Error::UnknownMessageType { found: "X".into() }, 3),
            (Error::DuplicateMessage { message_id: "x".into() }, 4),
            (Error::InvalidIid { kind: IidErrorKind::NonInteger }, 5),
            (
                Error::InvalidValueType {
                    expected: "integer",
                    found: "text".into(),
                },
                6,
            ),
            (
                Error::UnsupportedValue {
                    kind: UnsupportedKind::InvalidReset(2),
                },
                7,
            ),
            (Error::IidValueMismatch { iids: 1, values: 0 }, 8),
            (Error::NoDevicesRegistered { group: Group::Sensors }, 9),
            (Error::Config("bad".into()), 1),
        ];

        for (error, code) in cases {
            assert_eq!(error.code(), code, "{}", error);
        }
    }

    #[test]
    fn display_includes_kind() {
        let err = Error::InvalidIid {
            kind: IidErrorKind::Shape { len: 5 },
        };
        assert_eq!(
            err.to_string(),
            "invalid IID: IID must contain between 2 and 4 integers, got 5"
        );
    }
}
