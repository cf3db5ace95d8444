//! Shared test infrastructure for lsnmpvs.
//!
//! Provides TestAgent (in-process agent), fixtures, and raw-socket peers.

// Allow dead code and unused imports since not all test files use all utilities
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod agent;
pub mod faulty;
pub mod fixtures;

pub use agent::{TestAgent, TestAgentBuilder};
pub use faulty::{RawPeer, SilentPeer};
pub use fixtures::{
    DEVICE_ID, DEVICE_TYPE, actuator_specs, fixture_date, manual_clock, message_id, sensor_specs,
    test_mib,
};
