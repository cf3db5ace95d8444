//! Timestamps and clocks.
//!
//! The protocol carries two timestamp shapes:
//!
//! - [`DateStamp`]: calendar date and time, 7 parts
//!   `day:month:year:hour:minute:second:millisecond`
//! - [`UptimeStamp`]: elapsed time, 5 parts
//!   `days:hours:minutes:seconds:milliseconds`
//!
//! Time-derived values are always computed from a [`Clock`] handed in by the
//! caller, never from a hidden global, so tests can drive time with
//! [`ManualClock`].

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};

use crate::wire::is_digits;

/// Number of parts in a date timestamp.
pub const DATE_PARTS: usize = 7;

/// Number of parts in an uptime timestamp.
pub const UPTIME_PARTS: usize = 5;

/// Calendar date and time with millisecond precision.
///
/// Always a valid date: every constructor validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateStamp {
    day: u8,
    month: u8,
    year: u16,
    hour: u8,
    minute: u8,
    second: u8,
    millisecond: u16,
}

impl DateStamp {
    /// Earliest representable date, 01:01:0001:00:00:00:000.
    pub const MIN: Self = Self {
        day: 1,
        month: 1,
        year: 1,
        hour: 0,
        minute: 0,
        second: 0,
        millisecond: 0,
    };

    /// Latest representable date, 31:12:9999:23:59:59:999.
    pub const MAX: Self = Self {
        day: 31,
        month: 12,
        year: 9999,
        hour: 23,
        minute: 59,
        second: 59,
        millisecond: 999,
    };

    /// Create a date, returning `None` if the fields do not form a valid
    /// calendar date and time.
    ///
    /// # Examples
    ///
    /// ```
    /// use lsnmpvs::timestamp::DateStamp;
    ///
    /// assert!(DateStamp::new(29, 2, 2024, 12, 0, 0, 0).is_some());
    /// assert!(DateStamp::new(29, 2, 2025, 12, 0, 0, 0).is_none());
    /// assert!(DateStamp::new(1, 1, 2025, 24, 0, 0, 0).is_none());
    /// ```
    pub fn new(
        day: u8,
        month: u8,
        year: u16,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
    ) -> Option<Self> {
        if year == 0 || hour > 23 || minute > 59 || second > 59 || millisecond > 999 {
            return None;
        }
        NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))?;
        Some(Self {
            day,
            month,
            year,
            hour,
            minute,
            second,
            millisecond,
        })
    }

    /// Convert from a chrono date-time, truncating to milliseconds.
    ///
    /// Date-times outside years 1..=9999 saturate to the nearest end of that
    /// range.
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        if dt.year() > 9999 {
            return Self::MAX;
        }
        if dt.year() < 1 {
            return Self::MIN;
        }
        Self {
            day: dt.day() as u8,
            month: dt.month() as u8,
            year: dt.year() as u16,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            // leap seconds are reported in the nanosecond field
            second: dt.second() as u8,
            millisecond: (dt.nanosecond() / 1_000_000).min(999) as u16,
        }
    }

    /// Current date from `clock`.
    pub fn now(clock: &dyn Clock) -> Self {
        Self::from_naive(clock.local_now())
    }

    /// Convert to a chrono date-time.
    pub fn to_naive(&self) -> NaiveDateTime {
        // fields were validated on construction
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|d| {
            d.and_hms_milli_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
                u32::from(self.millisecond),
            )
        })
        .unwrap_or_default()
    }

    /// This date moved forward by `d`, saturating at the calendar's end.
    pub fn advanced(&self, d: Duration) -> Self {
        let start = self.to_naive();
        let moved = TimeDelta::from_std(d)
            .ok()
            .and_then(|delta| start.checked_add_signed(delta))
            .unwrap_or(start);
        Self::from_naive(moved)
    }

    /// Parse `day:month:year:hour:minute:second:millisecond`.
    ///
    /// Day, month, hour, minute and second take one or two digits, the year
    /// exactly four and the millisecond exactly three.
    ///
    /// # Examples
    ///
    /// ```
    /// use lsnmpvs::timestamp::DateStamp;
    ///
    /// let date = DateStamp::parse("07:06:2025:14:30:15:123").unwrap();
    /// assert_eq!(date.year(), 2025);
    /// assert_eq!(date.to_string(), "07:06:2025:14:30:15:123");
    ///
    /// assert!(DateStamp::parse("31:02:2025:14:30:15:123").is_none());
    /// assert!(DateStamp::parse("07:06:2025:14:30:15:12").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        Self::from_parts(&parts)
    }

    /// Build from the seven wire parts.
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Option<Self> {
        let [day, month, year, hour, minute, second, millisecond] = parts else {
            return None;
        };
        let short = |p: &S| -> Option<u8> {
            let p = p.as_ref();
            (is_digits(p) && p.len() <= 2).then(|| p.parse().ok())?
        };
        let exact = |p: &S, width: usize| -> Option<u16> {
            let p = p.as_ref();
            (is_digits(p) && p.len() == width).then(|| p.parse().ok())?
        };
        Self::new(
            short(day)?,
            short(month)?,
            exact(year, 4)?,
            short(hour)?,
            short(minute)?,
            short(second)?,
            exact(millisecond, 3)?,
        )
    }

    /// The seven wire parts.
    pub fn parts(&self) -> Vec<String> {
        vec![
            format!("{:02}", self.day),
            format!("{:02}", self.month),
            format!("{:04}", self.year),
            format!("{:02}", self.hour),
            format!("{:02}", self.minute),
            format!("{:02}", self.second),
            format!("{:03}", self.millisecond),
        ]
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn millisecond(&self) -> u16 {
        self.millisecond
    }
}

impl fmt::Display for DateStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts().join(":"))
    }
}

/// Returns `true` if `s` is a valid `day:month:year:hour:minute:second:millisecond`
/// date with a three-digit millisecond.
pub fn validate_date_format(s: &str) -> bool {
    DateStamp::parse(s).is_some()
}

/// Elapsed time split into days, hours, minutes, seconds and milliseconds.
///
/// Values decoded from the wire are only required to be numeric, so the
/// fields are not normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UptimeStamp {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub milliseconds: u64,
}

impl UptimeStamp {
    /// Split a duration.
    ///
    /// ```
    /// use lsnmpvs::timestamp::UptimeStamp;
    /// use std::time::Duration;
    ///
    /// let up = UptimeStamp::from_duration(Duration::from_millis(93_784_456));
    /// assert_eq!(up.to_string(), "1:02:03:04:456");
    /// ```
    pub fn from_duration(d: Duration) -> Self {
        let secs = d.as_secs();
        Self {
            days: secs / 86_400,
            hours: (secs % 86_400) / 3_600,
            minutes: (secs % 3_600) / 60,
            seconds: secs % 60,
            milliseconds: u64::from(d.subsec_millis()),
        }
    }

    /// Time elapsed on `clock` since `start`.
    pub fn since(start: Instant, clock: &dyn Clock) -> Self {
        Self::from_duration(clock.now().saturating_duration_since(start))
    }

    /// Total duration represented.
    pub fn as_duration(&self) -> Duration {
        let secs = self
            .days
            .saturating_mul(86_400)
            .saturating_add(self.hours.saturating_mul(3_600))
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds);
        Duration::from_secs(secs).saturating_add(Duration::from_millis(self.milliseconds))
    }

    /// The five wire parts.
    pub fn parts(&self) -> Vec<String> {
        vec![
            self.days.to_string(),
            format!("{:02}", self.hours),
            format!("{:02}", self.minutes),
            format!("{:02}", self.seconds),
            format!("{:03}", self.milliseconds),
        ]
    }
}

impl fmt::Display for UptimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts().join(":"))
    }
}

/// Either timestamp shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    /// 7-part calendar date.
    Date(DateStamp),
    /// 5-part elapsed time.
    Uptime(UptimeStamp),
}

impl Timestamp {
    /// Number of wire parts.
    pub fn part_count(&self) -> usize {
        match self {
            Timestamp::Date(_) => DATE_PARTS,
            Timestamp::Uptime(_) => UPTIME_PARTS,
        }
    }

    /// The wire parts.
    pub fn parts(&self) -> Vec<String> {
        match self {
            Timestamp::Date(d) => d.parts(),
            Timestamp::Uptime(u) => u.parts(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Date(d) => d.fmt(f),
            Timestamp::Uptime(u) => u.fmt(f),
        }
    }
}

impl From<DateStamp> for Timestamp {
    fn from(d: DateStamp) -> Self {
        Timestamp::Date(d)
    }
}

impl From<UptimeStamp> for Timestamp {
    fn from(u: UptimeStamp) -> Self {
        Timestamp::Uptime(u)
    }
}

/// Source of time for everything the MIB derives from time.
pub trait Clock: Send + Sync {
    /// Monotonic instant, used for uptime.
    fn now(&self) -> Instant;

    /// Local calendar time, used for dates.
    fn local_now(&self) -> NaiveDateTime;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock that only moves when told to.
///
/// ```
/// use lsnmpvs::timestamp::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::default();
/// let start = clock.now();
/// clock.advance(Duration::from_secs(90));
/// assert_eq!(clock.now() - start, Duration::from_secs(90));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

#[derive(Debug)]
struct ManualState {
    instant: Instant,
    local: NaiveDateTime,
}

impl ManualClock {
    /// Start at the given local time.
    pub fn new(local: NaiveDateTime) -> Self {
        Self {
            state: Mutex::new(ManualState {
                instant: Instant::now(),
                local,
            }),
        }
    }

    /// Move both the monotonic and the calendar time forward.
    pub fn advance(&self, d: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.instant += d;
        if let Ok(delta) = TimeDelta::from_std(d) {
            state.local = state.local.checked_add_signed(delta).unwrap_or(state.local);
        }
    }

    /// Replace the calendar time, leaving the monotonic time alone.
    pub fn set_local(&self, local: NaiveDateTime) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .local = local;
    }
}

impl Default for ManualClock {
    /// Starts at 2025-06-07 12:00:00.000.
    fn default() -> Self {
        let local = NaiveDate::from_ymd_opt(2025, 6, 7)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap_or_default();
        Self::new(local)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .instant
    }

    fn local_now(&self) -> NaiveDateTime {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .local
    }
}
