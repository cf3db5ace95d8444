//! Sensor record.

use rand::Rng;

use super::{Record, RecordSpec};
use crate::timestamp::DateStamp;

/// A sensor producing values uniformly distributed in `[min, max]`.
#[derive(Debug, Clone)]
pub struct Sensor {
    id: String,
    sensor_type: String,
    min: i64,
    max: i64,
    value: i64,
    last_sampling_time: DateStamp,
}

impl Sensor {
    /// Create a sensor registered at `now`. Its value starts at `min`.
    pub fn new(spec: RecordSpec, now: DateStamp) -> Self {
        Self {
            id: spec.id,
            sensor_type: spec.kind,
            min: spec.min,
            max: spec.max,
            value: spec.min,
            last_sampling_time: now,
        }
    }

    /// Take a new sample and return it.
    pub fn read_value<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateStamp) -> i64 {
        self.value = rng.gen_range(self.min..=self.max);
        self.last_sampling_time = now;
        self.value
    }

    pub fn sensor_type(&self) -> &str {
        &self.sensor_type
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Last sampled value.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Last sampled value as a whole percentage of the range.
    pub fn status(&self) -> i64 {
        percent_of_range(self.value, self.min, self.max)
    }

    pub fn last_sampling_time(&self) -> DateStamp {
        self.last_sampling_time
    }
}

impl Record for Sensor {
    const KIND: &'static str = "sensor";

    fn id(&self) -> &str {
        &self.id
    }
}

fn percent_of_range(value: i64, min: i64, max: i64) -> i64 {
    if max == min {
        return 0;
    }
    let scaled = (i128::from(value) - i128::from(min)) * 100;
    scaled.div_euclid(i128::from(max) - i128::from(min)) as i64
}
