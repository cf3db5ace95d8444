//! Request dispatch: decode, resolve every IID against the MIB, encode the
//! response.
//!
//! Everything here is synchronous; the agent calls it with the MIB lock held
//! so one datagram is fully handled before the next.

use std::collections::{HashSet, VecDeque};
use std::net::SocketAddr;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::iid::RawIid;
use crate::message::{Message, MessageId, MessageType};
use crate::mib::Mib;
use crate::value::Value;

/// Value placed in a response slot whose IID failed.
const FALLBACK_VALUE: Value = Value::Integer(0);

/// Bounded memory of recently seen request ids.
#[derive(Debug)]
pub(crate) struct DedupWindow {
    capacity: usize,
    order: VecDeque<MessageId>,
    seen: HashSet<MessageId>,
}

impl DedupWindow {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity.min(4096)),
            seen: HashSet::with_capacity(capacity.min(4096)),
        }
    }

    /// Record `id`, returning `false` if it was already in the window.
    pub(crate) fn insert(&mut self, id: MessageId) -> bool {
        if self.capacity == 0 {
            return true;
        }
        if !self.seen.insert(id) {
            return false;
        }
        self.order.push_back(id);
        if self.order.len() > self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.seen.remove(&oldest);
        }
        true
    }
}

/// Turns request datagrams into response messages.
#[derive(Debug)]
pub struct Dispatcher {
    dedup: DedupWindow,
}

impl Dispatcher {
    /// Create a dispatcher remembering the last `dedup_window` request ids.
    /// A window of 0 disables duplicate detection.
    pub fn new(dedup_window: usize) -> Self {
        Self {
            dedup: DedupWindow::new(dedup_window),
        }
    }

    /// Handle one datagram, returning the encoded response if one is due.
    pub fn handle_datagram(&mut self, mib: &mut Mib, data: Bytes, source: SocketAddr) -> Option<Bytes> {
        let response = self.respond(mib, Message::decode_bytes(data), source)?;
        match response.encode() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::error!(target: "lsnmpvs::agent", { lsnmp.source = %source, lsnmp.message_id = %response.message_id, error = %e }, "failed to encode response");
                debug_assert!(false, "response failed to encode: {e}");
                None
            }
        }
    }

    /// Build the response to a decoded (or undecodable) request.
    ///
    /// Returns `None` for responses and notifications, which are never
    /// answered.
    pub fn respond(&mut self, mib: &mut Mib, request: Result<Message>, source: SocketAddr) -> Option<Message> {
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(target: "lsnmpvs::agent", { lsnmp.source = %source, error = %e }, "rejecting undecodable message");
                return Some(error_response(mib, MessageId::INVALID, &e));
            }
        };

        if !request.msg_type.is_request() {
            tracing::debug!(target: "lsnmpvs::agent", { lsnmp.source = %source, msg_type = %request.msg_type }, "ignoring inbound {}", request.msg_type);
            return None;
        }

        if !self.dedup.insert(request.message_id) {
            tracing::debug!(target: "lsnmpvs::agent", { lsnmp.source = %source, lsnmp.message_id = %request.message_id }, "duplicate message");
            let err = Error::DuplicateMessage {
                message_id: request.message_id.as_str().into(),
            };
            return Some(error_response(mib, request.message_id, &err));
        }

        tracing::debug!(target: "lsnmpvs::agent", { lsnmp.source = %source, lsnmp.message_id = %request.message_id, msg_type = %request.msg_type, iids = request.iids.len() }, "request");

        let (values, errors): (Vec<Value>, Vec<u32>) = match request.msg_type {
            MessageType::Set => request
                .iids
                .iter()
                .zip(&request.values)
                .map(|(iid, value)| slot(set_one(mib, iid, value)))
                .unzip(),
            _ => request
                .iids
                .iter()
                .map(|iid| slot(mib.get_raw(iid).map(|v| v.into_wire())))
                .unzip(),
        };

        Some(Message::response(
            request.message_id,
            mib.uptime(),
            request.iids,
            values,
            errors,
        ))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(super::DEFAULT_DEDUP_WINDOW)
    }
}

/// Write, then read back what the field now holds.
fn set_one(mib: &mut Mib, iid: &RawIid, value: &Value) -> Result<Value> {
    mib.set_raw(iid, value)?;
    Ok(mib
        .get_raw(iid)
        .map(|v| v.into_wire())
        .unwrap_or_else(|_| value.clone()))
}

fn slot(result: Result<Value>) -> (Value, u32) {
    match result {
        Ok(value) => (value, 0),
        Err(e) => (FALLBACK_VALUE, e.code()),
    }
}

fn error_response(mib: &Mib, message_id: MessageId, error: &Error) -> Message {
    Message::response(message_id, mib.uptime(), Vec::new(), Vec::new(), vec![error.code()])
}
