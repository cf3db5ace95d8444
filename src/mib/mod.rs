//! Management information base and IID resolution.
//!
//! [`Mib`] owns the device scalars, the sensor table and the actuator table,
//! and resolves IIDs against them:
//!
//! | structure | group     | writable                                   |
//! |-----------|-----------|--------------------------------------------|
//! | 1         | device    | beaconRate (3), dateAndTime (6), reset (10) |
//! | 2         | sensors   | nothing                                    |
//! | 3         | actuators | status (3), one row at a time              |
//!
//! Object 0 of every group reads back the group's field count.
//!
//! # Example
//!
//! ```
//! use lsnmpvs::mib::{Mib, MibValue, SetOutcome};
//! use lsnmpvs::device::RecordSpec;
//! use lsnmpvs::iid::Iid;
//! use lsnmpvs::timestamp::ManualClock;
//! use lsnmpvs::Value;
//! use std::sync::Arc;
//!
//! let mut mib = Mib::new("dev-1", "gateway", Arc::new(ManualClock::default())).unwrap();
//! mib.register_actuator(RecordSpec::new("fan", "pwm", 0, 100).unwrap()).unwrap();
//!
//! let status = Iid::parse("3.3.1").unwrap();
//! assert_eq!(mib.set_value_by_iid(&status, &Value::Integer(40)).unwrap(), SetOutcome::Updated);
//! assert_eq!(mib.get_value_by_iid(&status).unwrap(), MibValue::Single(Value::Integer(40)));
//! ```

mod device;
mod table;

pub use device::{DEVICE_FIELDS, DeviceState, OperationalStatus, field};

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::device::{Actuator, RecordSpec, Registry, Sensor};
use crate::error::{Error, IidErrorKind, Result, UnsupportedKind};
use crate::iid::{Group, Iid, RawIid, TableIndex};
use crate::timestamp::{Clock, DateStamp, UptimeStamp};
use crate::value::Value;

use table::{ACTUATOR_COLUMNS, ACTUATOR_STATUS, ReadCtx, SENSOR_COLUMNS};

/// Default beacon period in seconds.
pub const DEFAULT_BEACON_RATE: i64 = 30;

/// Result of a read: one value, or a column when a table index selects
/// several rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MibValue {
    Single(Value),
    Column(Vec<Value>),
}

impl MibValue {
    /// Convert to the single value carried in a response.
    ///
    /// A column becomes one text value: every element in wire form, joined
    /// by `,`.
    ///
    /// ```
    /// use lsnmpvs::mib::MibValue;
    /// use lsnmpvs::Value;
    ///
    /// let column = MibValue::Column(vec![Value::Integer(3), Value::Integer(9)]);
    /// assert_eq!(column.into_wire(), Value::from("3,9"));
    /// ```
    pub fn into_wire(self) -> Value {
        match self {
            MibValue::Single(v) => v,
            MibValue::Column(values) => Value::Text(
                values
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        }
    }

    /// The single value, if this is not a column.
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            MibValue::Single(v) => Some(v),
            MibValue::Column(_) => None,
        }
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// State changed.
    Updated,
    /// Value accepted but nothing changed.
    NoChange,
}

/// The agent's management information base.
pub struct Mib {
    device: DeviceState,
    sensors: Registry<Sensor>,
    actuators: Registry<Actuator>,
    clock: Arc<dyn Clock>,
    rng: StdRng,
}

impl Mib {
    /// Create an empty MIB for a device.
    pub fn new(
        device_id: impl Into<String>,
        device_type: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let device_id = device_id.into();
        let device_type = device_type.into();
        if device_id.is_empty() {
            return Err(Error::config("device id must not be empty"));
        }
        if device_id.contains('\0') || device_type.contains('\0') {
            return Err(Error::config("device id and type must not contain NUL"));
        }
        let device = DeviceState::new(device_id, device_type, DEFAULT_BEACON_RATE, clock.as_ref());
        Ok(Self {
            device,
            sensors: Registry::new(),
            actuators: Registry::new(),
            clock,
            rng: StdRng::from_entropy(),
        })
    }

    /// Reseed the sampling generator for reproducible sensor values.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Set the beacon period directly (configuration, not a protocol write).
    pub fn with_beacon_rate(mut self, rate: i64) -> Result<Self> {
        if rate < 0 {
            return Err(Error::config(format!("beacon rate must not be negative, got {}", rate)));
        }
        self.device
            .write(field::BEACON_RATE, &Value::Integer(rate), self.clock.as_ref())?;
        Ok(self)
    }

    /// Register a sensor, failing on a duplicate id.
    pub fn register_sensor(&mut self, spec: RecordSpec) -> Result<()> {
        spec.validate()?;
        let now = DateStamp::now(self.clock.as_ref());
        self.sensors.register(Sensor::new(spec, now))
    }

    /// Register an actuator, failing on a duplicate id.
    pub fn register_actuator(&mut self, spec: RecordSpec) -> Result<()> {
        spec.validate()?;
        let now = DateStamp::now(self.clock.as_ref());
        self.actuators.register(Actuator::new(spec, now))
    }

    pub fn device(&self) -> &DeviceState {
        &self.device
    }

    pub fn sensors(&self) -> &Registry<Sensor> {
        &self.sensors
    }

    pub fn actuators(&self) -> &Registry<Actuator> {
        &self.actuators
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Device uptime now.
    pub fn uptime(&self) -> UptimeStamp {
        self.device.uptime(self.clock.as_ref())
    }

    /// Seconds between beacons; 0 disables them.
    pub fn beacon_rate(&self) -> i64 {
        self.device.beacon_rate()
    }

    /// Change the operational status (agent-side, not a protocol write).
    pub fn set_operational_status(&mut self, status: OperationalStatus) {
        self.device
            .set_operational_status(status, self.clock.as_ref());
    }

    /// Read the field addressed by `iid`.
    pub fn get_value_by_iid(&mut self, iid: &Iid) -> Result<MibValue> {
        match group_of(iid)? {
            Group::Device => {
                let value = self.device.read(
                    iid.object(),
                    self.sensors.len(),
                    self.actuators.len(),
                    self.clock.as_ref(),
                )?;
                if iid.index() != TableIndex::First {
                    return Err(Error::invalid_iid(IidErrorKind::UnexpectedIndex {
                        group: Group::Device,
                    }));
                }
                Ok(MibValue::Single(value))
            }
            Group::Sensors => {
                let mut ctx = ReadCtx {
                    rng: &mut self.rng,
                    now: DateStamp::now(self.clock.as_ref()),
                };
                table::read(&mut self.sensors, SENSOR_COLUMNS, Group::Sensors, iid, &mut ctx)
            }
            Group::Actuators => {
                let mut ctx = ReadCtx {
                    rng: &mut self.rng,
                    now: DateStamp::now(self.clock.as_ref()),
                };
                table::read(
                    &mut self.actuators,
                    ACTUATOR_COLUMNS,
                    Group::Actuators,
                    iid,
                    &mut ctx,
                )
            }
        }
    }

    /// Write `value` to the field addressed by `iid`.
    ///
    /// A failed write leaves the MIB unchanged.
    pub fn set_value_by_iid(&mut self, iid: &Iid, value: &Value) -> Result<SetOutcome> {
        let outcome = match group_of(iid)? {
            Group::Device => self.set_device(iid, value)?,
            Group::Sensors => {
                return Err(Error::unsupported(UnsupportedKind::ReadOnly {
                    group: Group::Sensors,
                    object: iid.object(),
                }));
            }
            Group::Actuators => self.set_actuator(iid, value)?,
        };
        tracing::debug!(target: "lsnmpvs::mib", { lsnmp.iid = %iid, value = %value, ?outcome }, "set applied");
        Ok(outcome)
    }

    /// Parse a wire IID and read it.
    pub fn get_raw(&mut self, raw: &RawIid) -> Result<MibValue> {
        self.get_value_by_iid(&Iid::try_from(raw)?)
    }

    /// Parse a wire IID and write it.
    pub fn set_raw(&mut self, raw: &RawIid, value: &Value) -> Result<SetOutcome> {
        self.set_value_by_iid(&Iid::try_from(raw)?, value)
    }

    fn set_device(&mut self, iid: &Iid, value: &Value) -> Result<SetOutcome> {
        if iid.object() > DEVICE_FIELDS {
            return Err(Error::invalid_iid(IidErrorKind::UnknownObject {
                group: Group::Device,
                object: iid.object(),
            }));
        }
        if iid.index() != TableIndex::First {
            return Err(Error::invalid_iid(IidErrorKind::UnexpectedIndex {
                group: Group::Device,
            }));
        }
        self.device.write(iid.object(), value, self.clock.as_ref())
    }

    fn set_actuator(&mut self, iid: &Iid, value: &Value) -> Result<SetOutcome> {
        table::column(ACTUATOR_COLUMNS, Group::Actuators, iid.object())?;
        if iid.object() != ACTUATOR_STATUS {
            return Err(Error::unsupported(UnsupportedKind::ReadOnly {
                group: Group::Actuators,
                object: iid.object(),
            }));
        }
        let TableIndex::Row(row) = iid.index() else {
            return Err(Error::invalid_iid(IidErrorKind::RowIndexRequired));
        };
        if self.actuators.is_empty() {
            return Err(Error::NoDevicesRegistered {
                group: Group::Actuators,
            }
            .boxed());
        }
        let len = self.actuators.len();
        let now = DateStamp::now(self.clock.as_ref());
        let actuator = self
            .actuators
            .row_mut(row)
            .ok_or_else(|| Error::invalid_iid(IidErrorKind::RowOutOfRange { row, len }))?;
        let target = value.require_integer()?;
        actuator.configure_value(target, now)?;
        self.device.touch(self.clock.as_ref());
        Ok(SetOutcome::Updated)
    }
}

fn group_of(iid: &Iid) -> Result<Group> {
    iid.group().ok_or_else(|| {
        Error::invalid_iid(IidErrorKind::UnknownStructure(iid.structure()))
    })
}

impl std::fmt::Debug for Mib {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mib")
            .field("device", &self.device)
            .field("sensors", &self.sensors.len())
            .field("actuators", &self.actuators.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::ManualClock;
    use std::time::Duration;

    fn mib(clock: Arc<ManualClock>) -> Mib {
        Mib::new("dev-1", "gateway", clock).unwrap().with_seed(42)
    }

    fn get(mib: &mut Mib, iid: &str) -> Result<MibValue> {
        mib.get_value_by_iid(&Iid::parse(iid).unwrap())
    }

    fn set(mib: &mut Mib, iid: &str, value: impl Into<Value>) -> Result<SetOutcome> {
        mib.set_value_by_iid(&Iid::parse(iid).unwrap(), &value.into())
    }

    fn single(v: Result<MibValue>) -> Value {
        match v.unwrap() {
            MibValue::Single(v) => v,
            other => panic!("expected single value, got {other:?}"),
        }
    }

    #[test]
    fn test_device_scalars() {
        let clock = Arc::new(ManualClock::default());
        let mut mib = mib(clock);
        mib.register_sensor(RecordSpec::new("s1", "temp", 0, 10).unwrap())
            .unwrap();

        assert_eq!(single(get(&mut mib, "1.0")), Value::Integer(10));
        assert_eq!(single(get(&mut mib, "1.1")), Value::from("dev-1"));
        assert_eq!(single(get(&mut mib, "1.2")), Value::from("gateway"));
        assert_eq!(single(get(&mut mib, "1.3")), Value::Integer(30));
        assert_eq!(single(get(&mut mib, "1.4")), Value::Integer(1));
        assert_eq!(single(get(&mut mib, "1.5")), Value::Integer(0));
        assert_eq!(single(get(&mut mib, "1.9")), Value::Integer(1));
        assert_eq!(single(get(&mut mib, "1.10")), Value::Integer(0));
    }

    #[test]
    fn test_device_rejects_indexes_and_unknown_objects() {
        let mut mib = mib(Arc::new(ManualClock::default()));
        assert_eq!(get(&mut mib, "1.1.1").unwrap_err().code(), 5);
        assert_eq!(get(&mut mib, "1.11").unwrap_err().code(), 5);
        assert_eq!(get(&mut mib, "4.1").unwrap_err().code(), 5);
        assert_eq!(set(&mut mib, "1.3.1", 5).unwrap_err().code(), 5);
    }

    #[test]
    fn test_beacon_rate_write() {
        let mut mib = mib(Arc::new(ManualClock::default()));
        assert_eq!(set(&mut mib, "1.3", 45).unwrap(), SetOutcome::Updated);
        assert_eq!(single(get(&mut mib, "1.3")), Value::Integer(45));
        assert_eq!(set(&mut mib, "1.3", 45).unwrap(), SetOutcome::NoChange);
        assert_eq!(set(&mut mib, "1.3", "60").unwrap(), SetOutcome::Updated);
        assert_eq!(set(&mut mib, "1.3", -1).unwrap_err().code(), 7);
        assert_eq!(set(&mut mib, "1.3", "often").unwrap_err().code(), 6);
        assert_eq!(mib.beacon_rate(), 60);
    }

    #[test]
    fn test_write_bumps_last_time_updated() {
        let clock = Arc::new(ManualClock::default());
        let mut mib = mib(clock.clone());
        let before = single(get(&mut mib, "1.8"));
        clock.advance(Duration::from_secs(5));
        set(&mut mib, "1.3", 10).unwrap();
        let after = single(get(&mut mib, "1.8"));
        assert_ne!(before, after);
        assert_eq!(after.to_string(), "07:06:2025:12:00:05:000");
    }

    #[test]
    fn test_reset() {
        let clock = Arc::new(ManualClock::default());
        let mut mib = mib(clock.clone());
        clock.advance(Duration::from_secs(3_600));

        assert_eq!(set(&mut mib, "1.10", 1).unwrap(), SetOutcome::Updated);
        assert_eq!(single(get(&mut mib, "1.10")), Value::Integer(0));
        assert_eq!(
            single(get(&mut mib, "1.7")),
            Value::from(UptimeStamp::default())
        );
        assert_eq!(set(&mut mib, "1.10", 0).unwrap(), SetOutcome::NoChange);
        assert_eq!(set(&mut mib, "1.10", 2).unwrap_err().code(), 7);
    }

    #[test]
    fn test_sensor_table_reads() {
        let mut mib = mib(Arc::new(ManualClock::default()));
        for i in 1..=3 {
            mib.register_sensor(RecordSpec::new(format!("s{i}"), "temp", 0, 100).unwrap())
                .unwrap();
        }

        assert_eq!(single(get(&mut mib, "2.0")), Value::Integer(7));
        assert_eq!(single(get(&mut mib, "2.1")), Value::from("s1"));
        assert_eq!(single(get(&mut mib, "2.1.0")), Value::Integer(3));
        assert_eq!(single(get(&mut mib, "2.1.2")), Value::from("s2"));
        assert_eq!(
            get(&mut mib, "2.1.0.0").unwrap(),
            MibValue::Column(vec!["s1".into(), "s2".into(), "s3".into()])
        );
        assert_eq!(
            get(&mut mib, "2.1.2.3").unwrap(),
            MibValue::Column(vec!["s2".into(), "s3".into()])
        );
        match get(&mut mib, "2.3.0.0").unwrap() {
            MibValue::Column(values) => assert_eq!(values.len(), 3),
            other => panic!("expected column, got {other:?}"),
        }
    }

    #[test]
    fn test_sensor_index_errors() {
        let mut mib = mib(Arc::new(ManualClock::default()));
        mib.register_sensor(RecordSpec::new("s1", "temp", 0, 100).unwrap())
            .unwrap();

        for iid in ["2.1.2", "2.1.0.2", "2.1.2.1", "2.1.1.2", "2.8", "2.8.1"] {
            assert_eq!(get(&mut mib, iid).unwrap_err().code(), 5, "{}", iid);
        }
    }

    #[test]
    fn test_rejected_read_does_not_resample() {
        let clock = Arc::new(ManualClock::default());
        let mut mib = mib(clock.clone());
        mib.register_sensor(RecordSpec::new("s1", "temp", 0, 100).unwrap())
            .unwrap();
        clock.advance(Duration::from_secs(1));

        assert!(get(&mut mib, "2.3.5").is_err());
        let sensor = mib.sensors().row(1).unwrap();
        assert_eq!(sensor.value(), 0);
        assert_eq!(sensor.last_sampling_time().to_string(), "07:06:2025:12:00:00:000");
    }

    #[test]
    fn test_sensor_value_resamples() {
        let clock = Arc::new(ManualClock::default());
        let mut mib = mib(clock.clone());
        mib.register_sensor(RecordSpec::new("s1", "temp", 10, 20).unwrap())
            .unwrap();
        clock.advance(Duration::from_secs(2));

        let value = single(get(&mut mib, "2.3.1")).as_integer().unwrap();
        assert!((10..=20).contains(&value));
        assert_eq!(
            single(get(&mut mib, "2.6.1")),
            Value::Integer((value - 10) * 100 / 10)
        );
        assert_eq!(
            single(get(&mut mib, "2.7.1")).to_string(),
            "07:06:2025:12:00:02:000"
        );
    }

    #[test]
    fn test_empty_tables() {
        let mut mib = mib(Arc::new(ManualClock::default()));
        for iid in ["2.1", "2.1.0", "2.3.1", "2.1.0.0", "3.3.1"] {
            assert_eq!(get(&mut mib, iid).unwrap_err().code(), 9, "{}", iid);
        }
        assert_eq!(single(get(&mut mib, "2.0")), Value::Integer(7));
        assert_eq!(set(&mut mib, "3.3.1", 1).unwrap_err().code(), 9);
    }

    #[test]
    fn test_sensors_are_read_only() {
        let mut mib = mib(Arc::new(ManualClock::default()));
        mib.register_sensor(RecordSpec::new("s1", "temp", 0, 100).unwrap())
            .unwrap();
        for iid in ["2.3.1", "2.1", "2.0", "2.99"] {
            assert_eq!(set(&mut mib, iid, 5).unwrap_err().code(), 7, "{}", iid);
        }
    }

    #[test]
    fn test_actuator_writes() {
        let clock = Arc::new(ManualClock::default());
        let mut mib = mib(clock.clone());
        mib.register_actuator(RecordSpec::new("a1", "valve", 10, 20).unwrap())
            .unwrap();
        clock.advance(Duration::from_secs(1));

        assert_eq!(set(&mut mib, "3.3.1", 25).unwrap_err().code(), 7);
        assert_eq!(single(get(&mut mib, "3.3.1")), Value::Integer(0));

        assert_eq!(set(&mut mib, "3.3.1", 15).unwrap(), SetOutcome::Updated);
        assert_eq!(single(get(&mut mib, "3.3.1")), Value::Integer(15));
        assert_eq!(
            single(get(&mut mib, "3.6.1")).to_string(),
            "07:06:2025:12:00:01:000"
        );
        assert_eq!(
            single(get(&mut mib, "1.8")).to_string(),
            "07:06:2025:12:00:01:000"
        );
    }

    #[test]
    fn test_actuator_write_order() {
        let mut mib = mib(Arc::new(ManualClock::default()));
        mib.register_actuator(RecordSpec::new("a1", "valve", 0, 10).unwrap())
            .unwrap();

        assert_eq!(set(&mut mib, "3.9.1", 1).unwrap_err().code(), 5);
        assert_eq!(set(&mut mib, "3.4.1", 1).unwrap_err().code(), 7);
        assert_eq!(set(&mut mib, "3.3", 1).unwrap_err().code(), 5);
        assert_eq!(set(&mut mib, "3.3.0", 1).unwrap_err().code(), 5);
        assert_eq!(set(&mut mib, "3.3.0.0", 1).unwrap_err().code(), 5);
        assert_eq!(set(&mut mib, "3.3.2", 1).unwrap_err().code(), 5);
        assert_eq!(set(&mut mib, "3.3.1", "high").unwrap_err().code(), 6);
        assert_eq!(set(&mut mib, "3.3.1", "7").unwrap(), SetOutcome::Updated);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut mib = mib(Arc::new(ManualClock::default()));
        let spec = RecordSpec::new("x", "t", 0, 1).unwrap();
        mib.register_sensor(spec.clone()).unwrap();
        assert!(mib.register_sensor(spec.clone()).is_err());
        mib.register_actuator(spec).unwrap();
        assert_eq!(mib.sensors().len(), 1);
        assert_eq!(mib.actuators().len(), 1);
    }
}
