//! In-process agent for testing.
//!
//! Wraps the library's Agent with automatic lifecycle management.
//! Agents bind to ephemeral localhost ports and shut down cleanly on drop.

use crate::common::fixtures;

use lsnmpvs::device::RecordSpec;
use lsnmpvs::mib::Mib;
use lsnmpvs::timestamp::ManualClock;
use lsnmpvs::{Agent, Manager};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// An in-process agent for testing.
///
/// Automatically starts on creation and stops on drop.
///
/// # Example
///
/// ```ignore
/// let agent = TestAgent::new().await;
/// let manager = agent.manager().await;
/// let response = manager.get(&[iid![1, 1]]).await?;
/// ```
pub struct TestAgent {
    agent: Agent,
    clock: Arc<ManualClock>,
    cancel: CancellationToken,
    _task: JoinHandle<()>,
}

impl TestAgent {
    /// Agent with the fixture sensors and actuators.
    pub async fn new() -> Self {
        Self::builder().build().await
    }

    pub fn builder() -> TestAgentBuilder {
        TestAgentBuilder::default()
    }

    /// Get the agent's listening address.
    pub fn addr(&self) -> SocketAddr {
        self.agent.local_addr()
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Run `f` against the live MIB.
    pub async fn with_mib<R>(&self, f: impl FnOnce(&mut Mib) -> R) -> R {
        self.agent.with_mib(f).await
    }

    /// A manager pointed at this agent with a short timeout.
    pub async fn manager(&self) -> Manager {
        Manager::connect(self.addr().to_string())
            .await
            .expect("failed to connect manager")
            .timeout(Duration::from_secs(2))
    }

    /// Explicitly stop the agent.
    ///
    /// Called automatically on drop, but can be called early if needed.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TestAgent {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Builder for [`TestAgent`] variations.
pub struct TestAgentBuilder {
    sensors: Vec<RecordSpec>,
    actuators: Vec<RecordSpec>,
    manager: Option<SocketAddr>,
    beacon_rate: i64,
    dedup_window: usize,
}

impl Default for TestAgentBuilder {
    fn default() -> Self {
        Self {
            sensors: fixtures::sensor_specs(),
            actuators: fixtures::actuator_specs(),
            manager: None,
            beacon_rate: 0,
            dedup_window: 64,
        }
    }
}

impl TestAgentBuilder {
    /// Start with empty sensor and actuator tables.
    pub fn empty(mut self) -> Self {
        self.sensors.clear();
        self.actuators.clear();
        self
    }

    pub fn manager(mut self, addr: SocketAddr) -> Self {
        self.manager = Some(addr);
        self
    }

    pub fn beacon_rate(mut self, seconds: i64) -> Self {
        self.beacon_rate = seconds;
        self
    }

    pub fn dedup_window(mut self, size: usize) -> Self {
        self.dedup_window = size;
        self
    }

    pub async fn build(self) -> TestAgent {
        let clock = fixtures::manual_clock();
        let cancel = CancellationToken::new();

        let mut builder = Agent::builder()
            .bind("127.0.0.1:0")
            .device_id(fixtures::DEVICE_ID)
            .device_type(fixtures::DEVICE_TYPE)
            .beacon_rate(self.beacon_rate)
            .dedup_window(self.dedup_window)
            .clock(clock.clone())
            .seed(42)
            .cancel(cancel.clone());
        if let Some(manager) = self.manager {
            builder = builder.manager(manager.to_string());
        }
        for spec in self.sensors {
            builder = builder.sensor(spec);
        }
        for spec in self.actuators {
            builder = builder.actuator(spec);
        }

        let agent = builder.build().await.expect("failed to build test agent");

        let runner = agent.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = runner.run().await {
                eprintln!("TestAgent error: {}", e);
            }
        });

        TestAgent {
            agent,
            clock,
            cancel,
            _task: task,
        }
    }
}
