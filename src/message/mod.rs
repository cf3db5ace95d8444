//! L-SNMPvS messages.
//!
//! A [`Message`] is one datagram: the protocol tag, a type, a timestamp, a
//! message id and three aligned lists (IIDs, values, error codes).
//!
//! # Message Types
//!
//! - `G` / `S` - requests, stamped with the manager's calendar date
//! - `R` / `N` - responses and notifications, stamped with the agent's uptime
//!
//! Decoding is strict: the first violated rule aborts the whole message and
//! is reported as an [`Error`] whose [`code`](Error::code) is sent back to
//! the peer.

mod id;

pub use id::{MESSAGE_ID_LEN, MessageId, MessageType};

use bytes::Bytes;

use crate::error::{DecodeErrorKind, Error, Result};
use crate::iid::RawIid;
use crate::timestamp::{DATE_PARTS, DateStamp, Timestamp, UPTIME_PARTS, UptimeStamp};
use crate::value::{Value, read_timestamp_parts};
use crate::wire::{Decoder, EncodeBuf, MAGIC, NUL, tag};

/// Decoded L-SNMPvS message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub msg_type: MessageType,
    /// Date for requests, uptime for responses and notifications.
    pub timestamp: Timestamp,
    pub message_id: MessageId,
    pub iids: Vec<RawIid>,
    pub values: Vec<Value>,
    /// Error codes; 0 means success.
    pub errors: Vec<u32>,
}

impl Message {
    /// Build a get request.
    pub fn get(message_id: MessageId, date: DateStamp, iids: Vec<RawIid>) -> Self {
        Self {
            msg_type: MessageType::Get,
            timestamp: Timestamp::Date(date),
            message_id,
            iids,
            values: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Build a set request from `(iid, value)` pairs.
    pub fn set(message_id: MessageId, date: DateStamp, bindings: Vec<(RawIid, Value)>) -> Self {
        let (iids, values) = bindings.into_iter().unzip();
        Self {
            msg_type: MessageType::Set,
            timestamp: Timestamp::Date(date),
            message_id,
            iids,
            values,
            errors: Vec::new(),
        }
    }

    /// Build a response.
    pub fn response(
        message_id: MessageId,
        uptime: UptimeStamp,
        iids: Vec<RawIid>,
        values: Vec<Value>,
        errors: Vec<u32>,
    ) -> Self {
        Self {
            msg_type: MessageType::Response,
            timestamp: Timestamp::Uptime(uptime),
            message_id,
            iids,
            values,
            errors,
        }
    }

    /// Build a notification.
    pub fn notification(
        message_id: MessageId,
        uptime: UptimeStamp,
        iids: Vec<RawIid>,
        values: Vec<Value>,
        errors: Vec<u32>,
    ) -> Self {
        Self {
            msg_type: MessageType::Notification,
            ..Self::response(message_id, uptime, iids, values, errors)
        }
    }

    /// Decode a message from a byte slice (copies the data).
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::decode_bytes(Bytes::copy_from_slice(data))
    }

    /// Decode a message from bytes.
    ///
    /// Rules are checked in frame order; the first one violated is returned.
    pub fn decode_bytes(data: Bytes) -> Result<Self> {
        if !data.starts_with(MAGIC) || data.get(MAGIC.len()) != Some(&NUL) {
            tracing::debug!(target: "lsnmpvs::codec", { lsnmp.offset = 0usize }, "missing protocol tag");
            return Err(Error::InvalidTag.boxed());
        }
        let mut decoder = Decoder::new(data);
        decoder.read_field()?;

        let type_offset = decoder.offset();
        let type_field = decoder.read_field()?;
        let Some(msg_type) = MessageType::from_field(&type_field) else {
            let found = String::from_utf8_lossy(&type_field);
            tracing::debug!(target: "lsnmpvs::codec", { lsnmp.offset = type_offset, found = %found }, "unknown message type");
            return Err(Error::UnknownMessageType {
                found: found.into(),
            }
            .boxed());
        };

        let timestamp = decode_timestamp(&mut decoder, msg_type)?;

        let id_offset = decoder.offset();
        let id_field = decoder.read_field()?;
        let message_id =
            MessageId::from_bytes(&id_field).map_err(|kind| decoder.error_at(id_offset, kind))?;

        let iid_count = decoder.read_count()?;
        let mut iids = Vec::new();
        for _ in 0..iid_count {
            iids.push(RawIid::decode(&mut decoder)?);
        }

        let values_offset = decoder.offset();
        let value_count = decoder.read_count()?;
        match msg_type {
            MessageType::Get if value_count != 0 => {
                return Err(decoder.error_at(
                    values_offset,
                    DecodeErrorKind::ValuesNotAllowed { count: value_count },
                ));
            }
            MessageType::Set if value_count != iid_count => {
                tracing::debug!(target: "lsnmpvs::codec", { lsnmp.offset = values_offset, iids = iid_count, values = value_count }, "value count mismatch");
                return Err(Error::IidValueMismatch {
                    iids: iid_count,
                    values: value_count,
                }
                .boxed());
            }
            _ => {}
        }
        let mut values = Vec::new();
        for _ in 0..value_count {
            values.push(Value::decode(&mut decoder)?);
        }

        let errors_offset = decoder.offset();
        let error_count = decoder.read_count()?;
        if msg_type.is_request() && error_count != 0 {
            return Err(decoder.error_at(
                errors_offset,
                DecodeErrorKind::ErrorsNotAllowed { count: error_count },
            ));
        }
        let mut errors = Vec::new();
        for _ in 0..error_count {
            let code_offset = decoder.offset();
            let code = decoder.read_unsigned()?;
            let code = u32::try_from(code)
                .map_err(|_| decoder.error_at(code_offset, DecodeErrorKind::NumberOverflow))?;
            errors.push(code);
        }

        if !decoder.is_empty() {
            return Err(decoder.error_at(
                decoder.offset(),
                DecodeErrorKind::TrailingData {
                    remaining: decoder.remaining(),
                },
            ));
        }

        Ok(Self {
            msg_type,
            timestamp,
            message_id,
            iids,
            values,
            errors,
        })
    }

    /// Encode to bytes.
    ///
    /// Fails instead of producing a frame that [`decode`](Self::decode) would
    /// reject.
    pub fn encode(&self) -> Result<Bytes> {
        self.check_lists()?;

        let mut buf = EncodeBuf::with_capacity(64 + 16 * (self.iids.len() + self.values.len()));
        buf.push_field(MAGIC);
        buf.push_tag(self.msg_type.as_byte());

        buf.push_tag(tag::TIMESTAMP);
        let parts = self.timestamp.parts();
        buf.push_count(parts.len());
        for part in &parts {
            buf.push_str(part);
        }

        buf.push_field(self.message_id.as_bytes());

        buf.push_count(self.iids.len());
        for iid in &self.iids {
            iid.encode(&mut buf)?;
        }

        buf.push_count(self.values.len());
        for value in &self.values {
            value.encode(&mut buf)?;
        }

        buf.push_count(self.errors.len());
        for code in &self.errors {
            buf.push_count(*code as usize);
        }

        Ok(buf.finish())
    }

    fn check_lists(&self) -> Result<()> {
        let date_expected = self.msg_type.is_request();
        if matches!(self.timestamp, Timestamp::Date(_)) != date_expected {
            return Err(Error::decode(0, DecodeErrorKind::TimestampKind));
        }
        match self.msg_type {
            MessageType::Get if !self.values.is_empty() => Err(Error::decode(
                0,
                DecodeErrorKind::ValuesNotAllowed {
                    count: self.values.len(),
                },
            )),
            MessageType::Set if self.values.len() != self.iids.len() => {
                Err(Error::IidValueMismatch {
                    iids: self.iids.len(),
                    values: self.values.len(),
                }
                .boxed())
            }
            MessageType::Get | MessageType::Set if !self.errors.is_empty() => Err(Error::decode(
                0,
                DecodeErrorKind::ErrorsNotAllowed {
                    count: self.errors.len(),
                },
            )),
            _ => Ok(()),
        }
    }
}

fn decode_timestamp(decoder: &mut Decoder, msg_type: MessageType) -> Result<Timestamp> {
    decoder.expect_tag(tag::TIMESTAMP)?;
    let count_offset = decoder.offset();
    let count = decoder.read_count()?;
    let expected = if msg_type.is_request() {
        DATE_PARTS
    } else {
        UPTIME_PARTS
    };
    if count != expected {
        return Err(decoder.error_at(
            count_offset,
            DecodeErrorKind::TimestampParts {
                expected,
                actual: count,
            },
        ));
    }
    read_timestamp_parts(decoder, count)
}
