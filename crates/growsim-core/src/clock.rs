//! In-game calendar.
//!
//! Simulated time is a float number of hours since the configured epoch.
//! The calendar derives hour-of-day (which drives light schedules), the day
//! index, and whether a tick opens a new day (which resets the daily light
//! integral). It never reads the wall clock.

use chrono::{NaiveDateTime, TimeDelta, Timelike};

/// Hours in a simulated day.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Format of the configured epoch.
const EPOCH_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// The epoch string could not be parsed.
    #[error("invalid epoch {value:?}: {reason}")]
    InvalidEpoch {
        /// The configured value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// Simulated time cannot be mapped onto the calendar.
    #[error("simulated time {hours} h is outside the calendar range")]
    OutOfRange {
        /// The offending time.
        hours: f64,
    },
}

/// Maps simulated hours onto a calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimClock {
    epoch: NaiveDateTime,
}

impl SimClock {
    /// Build a clock from an epoch like `2025-01-01T00:00:00`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidEpoch`] if the string does not parse.
    pub fn new(epoch: &str) -> Result<Self, ClockError> {
        let epoch = NaiveDateTime::parse_from_str(epoch, EPOCH_FORMAT).map_err(|err| {
            ClockError::InvalidEpoch {
                value: epoch.to_owned(),
                reason: err.to_string(),
            }
        })?;
        Ok(Self { epoch })
    }

    /// The configured epoch.
    pub const fn epoch(&self) -> NaiveDateTime {
        self.epoch
    }

    /// Calendar timestamp of `sim_time_hours`, to the second.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::OutOfRange`] for negative, non-finite, or
    /// unrepresentable times.
    pub fn timestamp(&self, sim_time_hours: f64) -> Result<NaiveDateTime, ClockError> {
        let out_of_range = ClockError::OutOfRange {
            hours: sim_time_hours,
        };
        if !sim_time_hours.is_finite() || sim_time_hours < 0.0 || sim_time_hours > 1.0e9 {
            return Err(out_of_range);
        }
        // Bounded above, so the rounded value fits in i64.
        #[allow(clippy::cast_possible_truncation)]
        let seconds = (sim_time_hours * 3600.0).round() as i64;
        let delta = TimeDelta::try_seconds(seconds).ok_or_else(|| out_of_range.clone())?;
        self.epoch.checked_add_signed(delta).ok_or(out_of_range)
    }

    /// Hours elapsed since the last calendar midnight.
    fn hours_into_day(&self, sim_time_hours: f64) -> f64 {
        let offset = f64::from(self.epoch.hour()) + f64::from(self.epoch.minute()) / 60.0;
        (sim_time_hours + offset).rem_euclid(HOURS_PER_DAY)
    }

    /// Whole hour of day in `0..24`.
    pub fn hour_of_day(&self, sim_time_hours: f64) -> u32 {
        let hour = self.hours_into_day(sim_time_hours).floor();
        // rem_euclid keeps this in [0, 24).
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let hour = hour as u32;
        hour.min(23)
    }

    /// Zero-based simulated day index, counted from the epoch.
    pub fn day_index(sim_time_hours: f64) -> u64 {
        let day = (sim_time_hours.max(0.0) / HOURS_PER_DAY).floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let day = day as u64;
        day
    }

    /// Whether a tick of `tick_hours` starting at `sim_time_hours` crosses
    /// into a new calendar day at its start.
    pub fn is_day_start(&self, sim_time_hours: f64, tick_hours: f64) -> bool {
        let into_day = self.hours_into_day(sim_time_hours);
        into_day < 1e-9 || into_day + 1e-9 < tick_hours
    }

    /// Advance a tick counter.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] at `u64::MAX`.
    pub fn next_tick(tick: u64) -> Result<u64, ClockError> {
        tick.checked_add(1).ok_or(ClockError::TickOverflow)
    }
}
