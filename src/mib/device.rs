//! Device group (structure 1): scalar fields describing the agent itself.

use std::fmt;
use std::time::Instant;

use crate::error::{Error, IidErrorKind, Result, UnsupportedKind};
use crate::iid::Group;
use crate::timestamp::{Clock, DateStamp, Timestamp, UptimeStamp};
use crate::value::Value;

use super::SetOutcome;

/// Number of device fields (objects 1..=10).
pub const DEVICE_FIELDS: u32 = 10;

/// Device object numbers.
pub mod field {
    pub const FIELD_COUNT: u32 = 0;
    pub const ID: u32 = 1;
    pub const TYPE: u32 = 2;
    pub const BEACON_RATE: u32 = 3;
    pub const N_SENSORS: u32 = 4;
    pub const N_ACTUATORS: u32 = 5;
    pub const DATE_AND_TIME: u32 = 6;
    pub const UP_TIME: u32 = 7;
    pub const LAST_TIME_UPDATED: u32 = 8;
    pub const OPERATIONAL_STATUS: u32 = 9;
    pub const RESET: u32 = 10;
}

/// Device operational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationalStatus {
    Standby,
    #[default]
    Normal,
    Error,
}

impl OperationalStatus {
    pub fn as_i64(self) -> i64 {
        match self {
            OperationalStatus::Standby => 0,
            OperationalStatus::Normal => 1,
            OperationalStatus::Error => 2,
        }
    }
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationalStatus::Standby => write!(f, "standby"),
            OperationalStatus::Normal => write!(f, "normal"),
            OperationalStatus::Error => write!(f, "error"),
        }
    }
}

/// Reset flag transition: armed by a write of 1, applied and cleared in the
/// same call, so it always reads back as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ResetFlag {
    #[default]
    Idle,
    Armed,
}

/// Scalar device state.
///
/// Uptime is never stored: it is derived from `started` on every read. The
/// device clock is a date anchored at an instant and runs from there.
#[derive(Debug, Clone)]
pub struct DeviceState {
    id: String,
    device_type: String,
    beacon_rate: i64,
    started: Instant,
    date_anchor: (DateStamp, Instant),
    last_time_updated: DateStamp,
    operational_status: OperationalStatus,
    reset: ResetFlag,
}

impl DeviceState {
    pub(crate) fn new(id: String, device_type: String, beacon_rate: i64, clock: &dyn Clock) -> Self {
        let now = clock.now();
        let date = DateStamp::now(clock);
        Self {
            id,
            device_type,
            beacon_rate,
            started: now,
            date_anchor: (date, now),
            last_time_updated: date,
            operational_status: OperationalStatus::Normal,
            reset: ResetFlag::Idle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    /// Seconds between beacons; 0 disables them.
    pub fn beacon_rate(&self) -> i64 {
        self.beacon_rate
    }

    pub fn operational_status(&self) -> OperationalStatus {
        self.operational_status
    }

    pub(crate) fn set_operational_status(&mut self, status: OperationalStatus, clock: &dyn Clock) {
        if self.operational_status != status {
            self.operational_status = status;
            self.touch(clock);
        }
    }

    pub fn uptime(&self, clock: &dyn Clock) -> UptimeStamp {
        UptimeStamp::since(self.started, clock)
    }

    /// Current device date: the anchored date plus time elapsed since.
    pub fn date_and_time(&self, clock: &dyn Clock) -> DateStamp {
        let (date, at) = self.date_anchor;
        date.advanced(clock.now().saturating_duration_since(at))
    }

    pub fn last_time_updated(&self) -> DateStamp {
        self.last_time_updated
    }

    pub(crate) fn touch(&mut self, clock: &dyn Clock) {
        self.last_time_updated = self.date_and_time(clock);
    }

    pub(crate) fn read(
        &self,
        object: u32,
        sensors: usize,
        actuators: usize,
        clock: &dyn Clock,
    ) -> Result<Value> {
        Ok(match object {
            field::FIELD_COUNT => Value::Integer(i64::from(DEVICE_FIELDS)),
            field::ID => Value::Text(self.id.clone()),
            field::TYPE => Value::Text(self.device_type.clone()),
            field::BEACON_RATE => Value::Integer(self.beacon_rate),
            field::N_SENSORS => Value::Integer(sensors as i64),
            field::N_ACTUATORS => Value::Integer(actuators as i64),
            field::DATE_AND_TIME => Value::from(self.date_and_time(clock)),
            field::UP_TIME => Value::from(self.uptime(clock)),
            field::LAST_TIME_UPDATED => Value::from(self.last_time_updated),
            field::OPERATIONAL_STATUS => Value::Integer(self.operational_status.as_i64()),
            field::RESET => Value::Integer(match self.reset {
                ResetFlag::Idle => 0,
                ResetFlag::Armed => 1,
            }),
            _ => return Err(unknown_object(object)),
        })
    }

    pub(crate) fn write(&mut self, object: u32, value: &Value, clock: &dyn Clock) -> Result<SetOutcome> {
        match object {
            field::BEACON_RATE => {
                let rate = value.require_integer()?;
                if rate < 0 {
                    return Err(Error::unsupported(UnsupportedKind::NegativeRate(rate)));
                }
                if rate == self.beacon_rate {
                    return Ok(SetOutcome::NoChange);
                }
                self.beacon_rate = rate;
                self.touch(clock);
                Ok(SetOutcome::Updated)
            }
            field::DATE_AND_TIME => {
                let date = match value {
                    Value::Timestamp(Timestamp::Date(date)) => *date,
                    Value::Text(text) => DateStamp::parse(text).ok_or_else(|| {
                        Error::unsupported(UnsupportedKind::InvalidDate(text.as_str().into()))
                    })?,
                    other => {
                        return Err(Error::InvalidValueType {
                            expected: "date",
                            found: other.type_name().into(),
                        }
                        .boxed());
                    }
                };
                self.date_anchor = (date, clock.now());
                self.last_time_updated = date;
                Ok(SetOutcome::Updated)
            }
            field::RESET => match value.require_integer()? {
                0 => Ok(SetOutcome::NoChange),
                1 => {
                    self.reset = ResetFlag::Armed;
                    self.apply_reset(clock);
                    Ok(SetOutcome::Updated)
                }
                other => Err(Error::unsupported(UnsupportedKind::InvalidReset(other))),
            },
            0..=DEVICE_FIELDS => Err(Error::unsupported(UnsupportedKind::ReadOnly {
                group: Group::Device,
                object,
            })),
            _ => Err(unknown_object(object)),
        }
    }

    fn apply_reset(&mut self, clock: &dyn Clock) {
        if self.reset != ResetFlag::Armed {
            return;
        }
        let now = clock.now();
        let date = DateStamp::now(clock);
        self.started = now;
        self.date_anchor = (date, now);
        self.last_time_updated = date;
        self.reset = ResetFlag::Idle;
        tracing::info!(target: "lsnmpvs::mib", { lsnmp.device = %self.id }, "device reset");
    }
}

fn unknown_object(object: u32) -> Box<Error> {
    Error::invalid_iid(IidErrorKind::UnknownObject {
        group: Group::Device,
        object,
    })
}
