//! Actuator record.

use super::{Record, RecordSpec};
use crate::error::{Error, Result, UnsupportedKind};
use crate::timestamp::DateStamp;

/// An actuator whose status can be set within `[min, max]`.
#[derive(Debug, Clone)]
pub struct Actuator {
    id: String,
    actuator_type: String,
    min: i64,
    max: i64,
    status: i64,
    last_control_time: DateStamp,
}

impl Actuator {
    /// Create an actuator registered at `now` with status 0.
    pub fn new(spec: RecordSpec, now: DateStamp) -> Self {
        Self {
            id: spec.id,
            actuator_type: spec.kind,
            min: spec.min,
            max: spec.max,
            status: 0,
            last_control_time: now,
        }
    }

    /// Set the status, failing without side effects if `value` is out of
    /// bounds.
    pub fn configure_value(&mut self, value: i64, now: DateStamp) -> Result<()> {
        if value < self.min || value > self.max {
            return Err(Error::unsupported(UnsupportedKind::OutOfBounds {
                value,
                min: self.min,
                max: self.max,
            }));
        }
        self.status = value;
        self.last_control_time = now;
        Ok(())
    }

    pub fn actuator_type(&self) -> &str {
        &self.actuator_type
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn status(&self) -> i64 {
        self.status
    }

    pub fn last_control_time(&self) -> DateStamp {
        self.last_control_time
    }
}

impl Record for Actuator {
    const KIND: &'static str = "actuator";

    fn id(&self) -> &str {
        &self.id
    }
}
