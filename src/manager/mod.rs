//! Minimal L-SNMPvS manager.
//!
//! Sends one get or set request at a time and waits for the response carrying
//! the same message id. There is no retransmission; a lost datagram surfaces
//! as [`Error::Timeout`].
//!
//! # Example
//!
//! ```rust,no_run
//! use lsnmpvs::{Manager, iid};
//! use std::time::Duration;
//!
//! # async fn example() -> lsnmpvs::Result<()> {
//! let manager = Manager::connect("127.0.0.1:16100")
//!     .await?
//!     .timeout(Duration::from_secs(2));
//!
//! let response = manager.get(&[iid![1, 1], iid![2, 3, 0, 0]]).await?;
//! for (value, code) in response.values.iter().zip(&response.errors) {
//!     println!("{} (error {})", value, code);
//! }
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::iid::RawIid;
use crate::message::{Message, MessageId, MessageType};
use crate::timestamp::{Clock, DateStamp, SystemClock};
use crate::util::{bind_ephemeral_udp_socket, resolve_addr};
use crate::value::Value;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_DATAGRAM: usize = 65_507;

/// Request/response client for one agent.
pub struct Manager {
    socket: UdpSocket,
    target: SocketAddr,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl Manager {
    /// Resolve `target` and bind an ephemeral socket of the same family.
    pub async fn connect(target: impl Into<String>) -> Result<Self> {
        let target = resolve_addr(&target.into()).await?;
        let socket = bind_ephemeral_udp_socket(target)
            .await
            .map_err(|e| Error::Network { target, source: e })?;
        tracing::debug!(target: "lsnmpvs::manager", { lsnmp.target = %target }, "manager ready");
        Ok(Self {
            socket,
            target,
            timeout: DEFAULT_TIMEOUT,
            clock: Arc::new(SystemClock),
        })
    }

    /// Set the per-request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Clock used to stamp requests.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Send a get request for `iids`.
    pub async fn get(&self, iids: &[RawIid]) -> Result<Message> {
        let request = Message::get(MessageId::random(), self.now(), iids.to_vec());
        self.request(request).await
    }

    /// Send a set request writing each value to its IID.
    pub async fn set(&self, bindings: &[(RawIid, Value)]) -> Result<Message> {
        let request = Message::set(MessageId::random(), self.now(), bindings.to_vec());
        self.request(request).await
    }

    fn now(&self) -> DateStamp {
        DateStamp::now(self.clock.as_ref())
    }

    async fn request(&self, request: Message) -> Result<Message> {
        let bytes = request.encode()?;
        let start = Instant::now();
        self.socket
            .send_to(&bytes, self.target)
            .await
            .map_err(|e| Error::Network {
                target: self.target,
                source: e,
            })?;
        tracing::debug!(target: "lsnmpvs::manager", { lsnmp.target = %self.target, lsnmp.message_id = %request.message_id, msg_type = %request.msg_type }, "request sent");

        // a timeout past the monotonic clock's range waits forever
        let Some(deadline) = start.checked_add(self.timeout) else {
            return self.await_response(request.message_id).await;
        };
        match tokio::time::timeout_at(deadline, self.await_response(request.message_id)).await {
            Ok(result) => result,
            Err(_) => {
                let elapsed = start.elapsed();
                tracing::debug!(target: "lsnmpvs::manager", { lsnmp.target = %self.target, lsnmp.message_id = %request.message_id, ?elapsed }, "request timed out");
                Err(Error::Timeout {
                    target: self.target,
                    elapsed,
                }
                .boxed())
            }
        }
    }

    /// Read datagrams until the response to `id` arrives.
    async fn await_response(&self, id: MessageId) -> Result<Message> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let (len, source) = self
                .socket
                .recv_from(&mut buf)
                .await
                .map_err(|e| Error::Network {
                    target: self.target,
                    source: e,
                })?;
            if source != self.target {
                tracing::trace!(target: "lsnmpvs::manager", { lsnmp.source = %source }, "ignoring datagram from unexpected peer");
                continue;
            }
            match Message::decode(&buf[..len]) {
                Ok(message) if message.msg_type == MessageType::Response && message.message_id == id => {
                    return Ok(message);
                }
                Ok(message) => {
                    tracing::trace!(target: "lsnmpvs::manager", { lsnmp.message_id = %message.message_id, msg_type = %message.msg_type }, "ignoring unrelated message");
                }
                Err(e) => {
                    tracing::debug!(target: "lsnmpvs::manager", { lsnmp.source = %source, error = %e }, "ignoring undecodable datagram");
                }
            }
        }
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("target", &self.target)
            .field("timeout", &self.timeout)
            .finish()
    }
}
