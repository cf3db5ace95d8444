//! Standard test fixtures: a small greenhouse device.

use lsnmpvs::MessageId;
use lsnmpvs::device::RecordSpec;
use lsnmpvs::mib::Mib;
use lsnmpvs::timestamp::{DateStamp, ManualClock};
use std::sync::Arc;

pub const DEVICE_ID: &str = "greenhouse-1";
pub const DEVICE_TYPE: &str = "controller";

/// Two sensors:
/// - `temp-1` temperature in [-10, 45]
/// - `hum-1` humidity in [0, 100]
pub fn sensor_specs() -> Vec<RecordSpec> {
    vec![
        RecordSpec::new("temp-1", "temperature", -10, 45).unwrap(),
        RecordSpec::new("hum-1", "humidity", 0, 100).unwrap(),
    ]
}

/// Two actuators:
/// - `valve-1` in [0, 100]
/// - `fan-1` in [0, 3]
pub fn actuator_specs() -> Vec<RecordSpec> {
    vec![
        RecordSpec::new("valve-1", "valve", 0, 100).unwrap(),
        RecordSpec::new("fan-1", "fan", 0, 3).unwrap(),
    ]
}

/// 07:06:2025 12:00:00.000, the manual clock's starting date.
pub fn fixture_date() -> DateStamp {
    DateStamp::new(7, 6, 2025, 12, 0, 0, 0).unwrap()
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::default())
}

/// A MIB with the fixture device, sensors and actuators.
pub fn test_mib(clock: Arc<ManualClock>) -> Mib {
    let mut mib = Mib::new(DEVICE_ID, DEVICE_TYPE, clock).unwrap().with_seed(42);
    for spec in sensor_specs() {
        mib.register_sensor(spec).unwrap();
    }
    for spec in actuator_specs() {
        mib.register_actuator(spec).unwrap();
    }
    mib
}

/// A fixed, valid message id derived from `n`.
pub fn message_id(n: u32) -> MessageId {
    MessageId::new(&format!("test{:012}", n)).unwrap()
}
