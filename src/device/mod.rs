//! Simulated device records.
//!
//! - [`Sensor`] - read-only, resamples its value on every read
//! - [`Actuator`] - writable status within `[min, max]`
//! - [`Registry`] - ordered, id-unique collection of either

mod actuator;
mod registry;
mod sensor;

pub use actuator::Actuator;
pub use registry::{Record, Registry};
pub use sensor::Sensor;

use std::str::FromStr;

use crate::error::{Error, Result};

/// Configuration of a sensor or actuator: `id:type:min:max`.
///
/// ```
/// use lsnmpvs::device::RecordSpec;
///
/// let spec: RecordSpec = "temp-1:temperature:-20:50".parse().unwrap();
/// assert_eq!(spec.id, "temp-1");
/// assert_eq!(spec.min, -20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSpec {
    pub id: String,
    pub kind: String,
    pub min: i64,
    pub max: i64,
}

impl RecordSpec {
    /// Create a spec, failing if `min > max` or the id is empty.
    pub fn new(id: impl Into<String>, kind: impl Into<String>, min: i64, max: i64) -> Result<Self> {
        let spec = Self {
            id: id.into(),
            kind: kind.into(),
            min,
            max,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::config("record id must not be empty"));
        }
        if self.id.contains('\0') || self.kind.contains('\0') {
            return Err(Error::config(format!("record {:?} contains NUL", self.id)));
        }
        if self.min > self.max {
            return Err(Error::config(format!(
                "record {}: min {} greater than max {}",
                self.id, self.min, self.max
            )));
        }
        Ok(())
    }
}

impl FromStr for RecordSpec {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        // negative bounds keep their sign, so split from the right
        let mut parts = s.rsplitn(3, ':');
        let (Some(max), Some(min), Some(head)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::config(format!("expected id:type:min:max, got {:?}", s)));
        };
        let Some((id, kind)) = head.split_once(':') else {
            return Err(Error::config(format!("expected id:type:min:max, got {:?}", s)));
        };
        let bound = |v: &str| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| Error::config(format!("invalid bound {:?} in {:?}", v, s)))
        };
        Self::new(id, kind, bound(min)?, bound(max)?)
    }
}
