//! L-SNMPvS value type.
//!
//! The [`Value`] enum is a closed sum over the three types the protocol can
//! carry. On the wire each value is a type tag, a part count and that many
//! NUL-terminated parts.

use std::fmt;

use crate::error::{DecodeErrorKind, Error, Result};
use crate::timestamp::{DATE_PARTS, DateStamp, Timestamp, UPTIME_PARTS, UptimeStamp};
use crate::wire::{Decoder, EncodeBuf, tag};

/// L-SNMPvS value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Signed integer, one part.
    Integer(i64),

    /// UTF-8 text, one part. Never contains NUL.
    Text(String),

    /// Date (7 parts) or uptime (5 parts).
    Timestamp(Timestamp),
}

impl Value {
    /// Wire tag for this value.
    pub fn tag(&self) -> u8 {
        match self {
            Value::Integer(_) => tag::INTEGER,
            Value::Text(_) => tag::TEXT,
            Value::Timestamp(_) => tag::TIMESTAMP_VALUE,
        }
    }

    /// Short name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Text(_) => "text",
            Value::Timestamp(Timestamp::Date(_)) => "date",
            Value::Timestamp(Timestamp::Uptime(_)) => "uptime",
        }
    }

    /// Try to get as an integer.
    ///
    /// Accepts [`Value::Integer`] and [`Value::Text`] holding a decimal
    /// integer (surrounding whitespace allowed).
    ///
    /// # Examples
    ///
    /// ```
    /// use lsnmpvs::Value;
    ///
    /// assert_eq!(Value::Integer(45).as_integer(), Some(45));
    /// assert_eq!(Value::from("-3").as_integer(), Some(-3));
    /// assert_eq!(Value::from("fast").as_integer(), None);
    /// ```
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Timestamp(_) => None,
        }
    }

    /// Like [`as_integer`](Self::as_integer), failing with an invalid value
    /// type error.
    pub fn require_integer(&self) -> Result<i64> {
        self.as_integer().ok_or_else(|| {
            Error::InvalidValueType {
                expected: "integer",
                found: self.type_name().into(),
            }
            .boxed()
        })
    }

    /// Try to get as text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as a timestamp.
    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            Value::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    /// Wire parts, in order.
    pub fn parts(&self) -> Vec<String> {
        match self {
            Value::Integer(v) => vec![v.to_string()],
            Value::Text(s) => vec![s.clone()],
            Value::Timestamp(t) => t.parts(),
        }
    }

    /// Encode to the buffer.
    pub(crate) fn encode(&self, buf: &mut EncodeBuf) -> Result<()> {
        buf.push_tag(self.tag());
        match self {
            Value::Integer(v) => {
                buf.push_count(1);
                buf.push_integer(*v);
            }
            Value::Text(s) => {
                if s.as_bytes().contains(&crate::wire::NUL) {
                    return Err(Error::decode(buf.len(), DecodeErrorKind::EmbeddedNul));
                }
                buf.push_count(1);
                buf.push_str(s);
            }
            Value::Timestamp(t) => {
                let parts = t.parts();
                buf.push_count(parts.len());
                for part in &parts {
                    buf.push_str(part);
                }
            }
        }
        Ok(())
    }

    /// Decode one value.
    pub(crate) fn decode(decoder: &mut Decoder) -> Result<Self> {
        let start = decoder.offset();
        let type_field = decoder.read_field()?;
        let value_tag = match type_field.as_ref() {
            [t @ (tag::INTEGER | tag::TEXT | tag::TIMESTAMP_VALUE)] => *t,
            other => {
                let found = String::from_utf8_lossy(other);
                tracing::debug!(target: "lsnmpvs::codec", { lsnmp.offset = start, found = %found }, "unknown value type");
                return Err(Error::InvalidValueType {
                    expected: "one of I, T, S",
                    found: found.into(),
                }
                .boxed());
            }
        };

        let count_offset = decoder.offset();
        let count = decoder.read_count()?;

        match value_tag {
            tag::INTEGER => {
                if count != 1 {
                    return Err(decoder.error_at(
                        count_offset,
                        DecodeErrorKind::ValueParts {
                            tag: value_tag,
                            actual: count,
                        },
                    ));
                }
                Ok(Value::Integer(decoder.read_signed()?))
            }
            tag::TEXT => {
                if count != 1 {
                    return Err(decoder.error_at(
                        count_offset,
                        DecodeErrorKind::ValueParts {
                            tag: value_tag,
                            actual: count,
                        },
                    ));
                }
                Ok(Value::Text(decoder.read_text()?))
            }
            _ => {
                if count != DATE_PARTS && count != UPTIME_PARTS {
                    return Err(decoder.error_at(
                        count_offset,
                        DecodeErrorKind::ValueParts {
                            tag: value_tag,
                            actual: count,
                        },
                    ));
                }
                Ok(Value::Timestamp(read_timestamp_parts(decoder, count)?))
            }
        }
    }
}

/// Read `count` (5 or 7) numeric parts and build a timestamp.
///
/// The caller has already validated `count`.
pub(crate) fn read_timestamp_parts(decoder: &mut Decoder, count: usize) -> Result<Timestamp> {
    let start = decoder.offset();
    let mut parts = Vec::with_capacity(count);
    for _ in 0..count {
        parts.push(decoder.read_digits()?);
    }

    if count == DATE_PARTS {
        return DateStamp::from_parts(&parts)
            .map(Timestamp::Date)
            .ok_or_else(|| decoder.error_at(start, DecodeErrorKind::InvalidDate));
    }

    let mut fields = [0u64; UPTIME_PARTS];
    for (field, part) in fields.iter_mut().zip(&parts) {
        *field = crate::wire::parse_unsigned(part.as_bytes())
            .map_err(|kind| decoder.error_at(start, kind))?;
    }
    let [days, hours, minutes, seconds, milliseconds] = fields;
    Ok(Timestamp::Uptime(UptimeStamp {
        days,
        hours,
        minutes,
        seconds,
        milliseconds,
    }))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Timestamp(t) => write!(f, "{}", t),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Timestamp> for Value {
    fn from(t: Timestamp) -> Self {
        Value::Timestamp(t)
    }
}

impl From<DateStamp> for Value {
    fn from(d: DateStamp) -> Self {
        Value::Timestamp(Timestamp::Date(d))
    }
}

impl From<UptimeStamp> for Value {
    fn from(u: UptimeStamp) -> Self {
        Value::Timestamp(Timestamp::Uptime(u))
    }
}
