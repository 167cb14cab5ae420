//! Time sources and wall-clock sampling.
//!
//! Faces never count ticks; every refresh samples the authoritative clock
//! again, so independent faces may drift in when they tick but never in what
//! they show.

use chrono::{DateTime, FixedOffset, Local, TimeDelta, Timelike, Utc};
use std::sync::Mutex;

/// Supplies the current instant, tagged with the host's local UTC offset.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Reads the operating system clock and local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A manually controlled clock for deterministic runs.
#[derive(Debug)]
pub struct FixedTimeSource {
    now: Mutex<DateTime<FixedOffset>>,
}

impl FixedTimeSource {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// An hour, minute and second as shown on a clock face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl WallTime {
    pub fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self { hour, minute, second }
    }

    /// Minutes elapsed since midnight, 0 through 1439.
    pub fn minute_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

/// Samples the wall time a face should display.
///
/// With a fixed `gmt_offset` (hours, fractional allowed) the instant is shifted
/// by that offset and its UTC fields are used. Without one, or when the shift
/// cannot be represented, the local fields of `now` are used.
pub fn wall_time(now: DateTime<FixedOffset>, gmt_offset: Option<f64>) -> WallTime {
    match gmt_offset.and_then(|hours| shift(now, hours)) {
        Some(shifted) => WallTime::new(shifted.hour(), shifted.minute(), shifted.second()),
        None => WallTime::new(now.hour(), now.minute(), now.second()),
    }
}

fn shift(now: DateTime<FixedOffset>, hours: f64) -> Option<DateTime<Utc>> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let delta = TimeDelta::try_milliseconds(millis as i64)?;
    now.with_timezone(&Utc).checked_add_signed(delta)
}
