//! L-SNMPvS agent.
//!
//! The agent owns a [`Mib`], listens on a UDP socket and answers get and set
//! requests. When a manager address is configured it also sends a beacon
//! notification every `beaconRate` seconds, and applications can push their
//! own notifications with [`Agent::send_notification`].
//!
//! # Example
//!
//! ```rust,no_run
//! use lsnmpvs::agent::Agent;
//! use lsnmpvs::device::RecordSpec;
//!
//! # async fn example() -> Result<(), Box<lsnmpvs::Error>> {
//! let agent = Agent::builder()
//!     .bind("127.0.0.1:16100")
//!     .manager("127.0.0.1:16200")
//!     .device_id("greenhouse-1")
//!     .sensor(RecordSpec::new("t1", "temperature", -10, 45)?)
//!     .actuator(RecordSpec::new("v1", "valve", 0, 100)?)
//!     .build()
//!     .await?;
//!
//! agent.run().await
//! # }
//! ```

mod request;

pub use request::Dispatcher;

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::device::RecordSpec;
use crate::error::{Error, Result};
use crate::iid::{Iid, RawIid};
use crate::message::{Message, MessageId};
use crate::mib::{DEFAULT_BEACON_RATE, Mib, field};
use crate::timestamp::{Clock, SystemClock};
use crate::util::{bind_udp_socket, resolve_addr};
use crate::value::Value;

/// Default agent address.
pub const DEFAULT_BIND: &str = "127.0.0.1:16100";

/// Default number of request ids remembered for duplicate detection.
pub const DEFAULT_DEDUP_WINDOW: usize = 1024;

/// Largest datagram the agent reads.
const MAX_DATAGRAM: usize = 65_507;

/// Device fields carried by every beacon.
const BEACON_FIELDS: [u32; 4] = [
    field::ID,
    field::DATE_AND_TIME,
    field::UP_TIME,
    field::OPERATIONAL_STATUS,
];

/// Builder for [`Agent`].
///
/// Defaults:
/// - Bind address: `127.0.0.1:16100`
/// - No manager (no beacons, notifications are dropped)
/// - Device id `lsnmpvs-agent`, type `generic`
/// - Beacon rate: 30 seconds
/// - Duplicate window: 1024 request ids
/// - System clock, entropy-seeded sampling
pub struct AgentBuilder {
    bind_addr: String,
    manager: Option<String>,
    device_id: String,
    device_type: String,
    beacon_rate: i64,
    sensors: Vec<RecordSpec>,
    actuators: Vec<RecordSpec>,
    clock: Option<Arc<dyn Clock>>,
    seed: Option<u64>,
    dedup_window: usize,
    cancel: Option<CancellationToken>,
}

impl AgentBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            manager: None,
            device_id: "lsnmpvs-agent".to_string(),
            device_type: "generic".to_string(),
            beacon_rate: DEFAULT_BEACON_RATE,
            sensors: Vec::new(),
            actuators: Vec::new(),
            clock: None,
            seed: None,
            dedup_window: DEFAULT_DEDUP_WINDOW,
            cancel: None,
        }
    }

    /// Set the UDP bind address. Use port 0 for an ephemeral port.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Set the manager address that receives beacons and notifications.
    pub fn manager(mut self, addr: impl Into<String>) -> Self {
        self.manager = Some(addr.into());
        self
    }

    pub fn device_id(mut self, id: impl Into<String>) -> Self {
        self.device_id = id.into();
        self
    }

    pub fn device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = device_type.into();
        self
    }

    /// Seconds between beacons; 0 disables them.
    pub fn beacon_rate(mut self, seconds: i64) -> Self {
        self.beacon_rate = seconds;
        self
    }

    /// Register a sensor.
    pub fn sensor(mut self, spec: RecordSpec) -> Self {
        self.sensors.push(spec);
        self
    }

    /// Register an actuator.
    pub fn actuator(mut self, spec: RecordSpec) -> Self {
        self.actuators.push(spec);
        self
    }

    /// Use a custom clock for every time-derived MIB value.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Seed sensor sampling for reproducible values.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of request ids remembered for duplicate detection; 0 disables
    /// it.
    pub fn dedup_window(mut self, size: usize) -> Self {
        self.dedup_window = size;
        self
    }

    /// Set a cancellation token for graceful shutdown.
    ///
    /// If not set, the agent creates its own token accessible via
    /// `Agent::cancel()`.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build the MIB and bind the socket.
    ///
    /// Fails with a configuration error on duplicate record ids, invalid
    /// record bounds or an unresolvable address.
    pub async fn build(self) -> Result<Agent> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let mut mib = Mib::new(self.device_id, self.device_type, clock)?
            .with_beacon_rate(self.beacon_rate)?;
        if let Some(seed) = self.seed {
            mib = mib.with_seed(seed);
        }
        for spec in self.sensors {
            mib.register_sensor(spec)?;
        }
        for spec in self.actuators {
            mib.register_actuator(spec)?;
        }

        let bind_addr = resolve_addr(&self.bind_addr).await?;
        let manager = match &self.manager {
            Some(addr) => Some(resolve_addr(addr).await?),
            None => None,
        };

        let socket = bind_udp_socket(bind_addr)
            .await
            .map_err(|e| Error::Network {
                target: bind_addr,
                source: e,
            })?;
        let local_addr = socket.local_addr().map_err(|e| Error::Network {
            target: bind_addr,
            source: e,
        })?;

        tracing::info!(target: "lsnmpvs::agent", { lsnmp.local_addr = %local_addr, sensors = mib.sensors().len(), actuators = mib.actuators().len() }, "agent bound");

        Ok(Agent {
            inner: Arc::new(AgentInner {
                socket,
                local_addr,
                manager,
                state: Mutex::new(AgentState {
                    mib,
                    dispatcher: Dispatcher::new(self.dedup_window),
                }),
                cancel: self.cancel.unwrap_or_default(),
            }),
        })
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// State guarded by one lock: a datagram is resolved against the MIB and
/// recorded in the duplicate window as a single step.
struct AgentState {
    mib: Mib,
    dispatcher: Dispatcher,
}

struct AgentInner {
    socket: UdpSocket,
    local_addr: SocketAddr,
    manager: Option<SocketAddr>,
    state: Mutex<AgentState>,
    cancel: CancellationToken,
}

/// L-SNMPvS agent.
///
/// Cheap to clone; clones share the socket and the MIB.
#[derive(Clone)]
pub struct Agent {
    inner: Arc<AgentInner>,
}

impl Agent {
    /// Create a builder for configuring the agent.
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Get the local address the agent is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    /// Manager address, if configured.
    pub fn manager(&self) -> Option<SocketAddr> {
        self.inner.manager
    }

    /// Get the cancellation token for this agent.
    ///
    /// Call `token.cancel()` to initiate graceful shutdown.
    pub fn cancel(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Run `f` with exclusive access to the MIB.
    pub async fn with_mib<R>(&self, f: impl FnOnce(&mut Mib) -> R) -> R {
        let mut state = self.inner.state.lock().await;
        f(&mut state.mib)
    }

    /// Run the agent until the cancellation token fires.
    ///
    /// Datagrams are handled one at a time, each to completion. Beacons are
    /// scheduled from the current beacon rate, so a write to it takes effect
    /// on the next tick.
    #[instrument(skip(self), err, fields(lsnmp.local_addr = %self.local_addr()))]
    pub async fn run(&self) -> Result<()> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let mut last_beacon = Instant::now();

        loop {
            let deadline = self.beacon_deadline(last_beacon).await;

            tokio::select! {
                _ = self.inner.cancel.cancelled() => {
                    tracing::info!(target: "lsnmpvs::agent", "agent shutdown requested");
                    return Ok(());
                }
                result = self.inner.socket.recv_from(&mut buf) => {
                    let (len, source) = result.map_err(|e| Error::Network {
                        target: self.inner.local_addr,
                        source: e,
                    })?;
                    let data = Bytes::copy_from_slice(&buf[..len]);
                    if let Some(reply) = self.handle_datagram(data, source).await
                        && let Err(e) = self.inner.socket.send_to(&reply, source).await
                    {
                        tracing::warn!(target: "lsnmpvs::agent", { lsnmp.source = %source, error = %e }, "failed to send response");
                    }
                }
                _ = sleep_until(deadline) => {
                    last_beacon = Instant::now();
                    if let Err(e) = self.send_beacon().await {
                        tracing::warn!(target: "lsnmpvs::agent", { error = %e }, "failed to send beacon");
                    }
                }
            }
        }
    }

    /// Handle one datagram with the MIB locked.
    async fn handle_datagram(&self, data: Bytes, source: SocketAddr) -> Option<Bytes> {
        let mut state = self.inner.state.lock().await;
        let AgentState { mib, dispatcher } = &mut *state;
        dispatcher.handle_datagram(mib, data, source)
    }

    async fn beacon_deadline(&self, last_beacon: Instant) -> Option<Instant> {
        self.inner.manager?;
        let rate = self.with_mib(|mib| mib.beacon_rate()).await;
        let rate = u64::try_from(rate).ok().filter(|&r| r > 0)?;
        // a rate past the monotonic clock's range never fires
        last_beacon.checked_add(std::time::Duration::from_secs(rate))
    }

    /// Send the periodic beacon: device id, date, uptime and operational
    /// status.
    pub async fn send_beacon(&self) -> Result<()> {
        let (iids, values): (Vec<RawIid>, Vec<Value>) = self
            .with_mib(|mib| {
                BEACON_FIELDS
                    .iter()
                    .filter_map(|&object| {
                        let iid = Iid::scalar(1, object);
                        let value = mib.get_value_by_iid(&iid).ok()?.into_wire();
                        Some((iid.to_raw(), value))
                    })
                    .unzip()
            })
            .await;
        let errors = vec![0; iids.len()];
        self.send_notification(iids, values, errors).await
    }

    /// Send a notification to the manager with a fresh message id and the
    /// current uptime. Does nothing when no manager is configured.
    pub async fn send_notification(
        &self,
        iids: Vec<RawIid>,
        values: Vec<Value>,
        errors: Vec<u32>,
    ) -> Result<()> {
        let Some(manager) = self.inner.manager else {
            return Ok(());
        };
        let uptime = self.with_mib(|mib| mib.uptime()).await;
        let message = Message::notification(MessageId::random(), uptime, iids, values, errors);
        let bytes = message.encode()?;
        self.inner
            .socket
            .send_to(&bytes, manager)
            .await
            .map_err(|e| Error::Network {
                target: manager,
                source: e,
            })?;
        tracing::debug!(target: "lsnmpvs::agent", { lsnmp.target = %manager, lsnmp.message_id = %message.message_id }, "notification sent");
        Ok(())
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
