//! # lsnmpvs
//!
//! Async implementation of L-SNMPvS, a lightweight SNMP-like management
//! protocol for simulated devices.
//!
//! ## Features
//!
//! - NUL-delimited ASCII wire format with strict, ordered decode checks
//! - A device MIB: scalar device group, sensor table, actuator table
//! - IID addressing with row, row-count, all-rows and range selectors
//! - Async agent with duplicate detection and periodic beacons
//! - Minimal async manager for get and set requests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lsnmpvs::{Agent, Manager, Value, iid};
//! use lsnmpvs::device::RecordSpec;
//!
//! #[tokio::main]
//! async fn main() -> lsnmpvs::Result<()> {
//!     let agent = Agent::builder()
//!         .bind("127.0.0.1:16100")
//!         .actuator(RecordSpec::new("fan", "pwm", 0, 100)?)
//!         .build()
//!         .await?;
//!     let running = agent.clone();
//!     tokio::spawn(async move { running.run().await });
//!
//!     let manager = Manager::connect("127.0.0.1:16100").await?;
//!     let response = manager.set(&[(iid![3, 3, 1], Value::Integer(40))]).await?;
//!     assert_eq!(response.errors, vec![0]);
//!
//!     agent.cancel().cancel();
//!     Ok(())
//! }
//! ```
//!
//! ## Codec
//!
//! ```
//! use lsnmpvs::{Message, MessageId, iid};
//! use lsnmpvs::timestamp::DateStamp;
//!
//! let date = DateStamp::new(7, 6, 2025, 12, 0, 0, 0).unwrap();
//! let request = Message::get(MessageId::new("ABCDEFGHIJKLMNOP").unwrap(), date, vec![iid![1, 1]]);
//! let bytes = request.encode().unwrap();
//! assert_eq!(Message::decode(&bytes).unwrap(), request);
//! ```

pub mod agent;
pub mod device;
pub mod error;
pub mod iid;
pub mod manager;
pub mod message;
pub mod mib;
pub mod timestamp;
pub mod value;
pub mod wire;

pub(crate) mod util;

#[cfg(feature = "cli")]
pub mod cli;

// Re-exports for convenience
pub use agent::{Agent, AgentBuilder};
pub use error::{DecodeErrorKind, Error, IidErrorKind, Result, UnsupportedKind};
pub use iid::{Iid, RawIid};
pub use manager::Manager;
pub use message::{Message, MessageId, MessageType};
pub use mib::Mib;
pub use value::Value;
