//! Temporal Features
//!
//! Period of day, high-season flag and schedule deviation derived from the
//! scheduled and actual departure timestamps.

use crate::error::FeatureError;
use crate::record::FlightRecord;
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Timestamp layout used by every date column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Minutes of deviation above which a flight counts as delayed
pub const DELAY_THRESHOLD_MINUTES: f64 = 15.0;

const fn secs(hour: u32, minute: u32) -> u32 {
    hour * 3600 + minute * 60
}

// Open intervals, seconds from midnight.
const MORNING: (u32, u32) = (secs(5, 0), secs(11, 59));
const AFTERNOON: (u32, u32) = (secs(12, 0), secs(18, 59));
const EVENING: (u32, u32) = (secs(19, 0), secs(23, 59));
const EARLY_HOURS: (u32, u32) = (secs(0, 0), secs(4, 59));

// Closed intervals of (month, day).
const HIGH_SEASON: [((u32, u32), (u32, u32)); 4] = [
    ((12, 15), (12, 31)),
    ((1, 1), (3, 3)),
    ((7, 15), (7, 31)),
    ((9, 11), (9, 30)),
];

/// Coarse bucket of the scheduled departure time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodOfDay {
    Morning,
    Afternoon,
    Night,
}

impl PeriodOfDay {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodOfDay::Morning => "morning",
            PeriodOfDay::Afternoon => "afternoon",
            PeriodOfDay::Night => "night",
        }
    }
}

/// Parse a `YYYY-MM-DD HH:MM:SS` timestamp
pub fn parse_timestamp(ts: &str) -> Result<NaiveDateTime, FeatureError> {
    NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).map_err(|e| {
        FeatureError::MalformedTimestamp {
            input: ts.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Bucket a timestamp into morning, afternoon or night.
///
/// Bounds are exclusive on both ends, so times such as exactly `05:00:00`
/// or anything between `11:59:00` and `12:00:00` match no bucket and fail
/// with [`FeatureError::BoundaryTime`].
pub fn period_of_day(ts: &str) -> Result<PeriodOfDay, FeatureError> {
    let t = parse_timestamp(ts)?.time().num_seconds_from_midnight();
    let within = |(lo, hi): (u32, u32)| t > lo && t < hi;

    if within(MORNING) {
        Ok(PeriodOfDay::Morning)
    } else if within(AFTERNOON) {
        Ok(PeriodOfDay::Afternoon)
    } else if within(EVENING) || within(EARLY_HOURS) {
        Ok(PeriodOfDay::Night)
    } else {
        Err(FeatureError::BoundaryTime {
            input: ts.to_string(),
        })
    }
}

/// 1 if the date falls in a high-season window of its own year, else 0
pub fn is_high_season(ts: &str) -> Result<u8, FeatureError> {
    let date = parse_timestamp(ts)?.date();
    let md = (date.month(), date.day());

    let high = HIGH_SEASON
        .iter()
        .any(|&(start, end)| md >= start && md <= end);

    Ok(u8::from(high))
}

/// Signed minutes from `scheduled` to `actual`; negative when early
pub fn schedule_deviation_minutes(scheduled: &str, actual: &str) -> Result<f64, FeatureError> {
    let scheduled = parse_timestamp(scheduled)?;
    let actual = parse_timestamp(actual)?;
    Ok((actual - scheduled).num_seconds() as f64 / 60.0)
}

/// Per-record temporal features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// `None` when built without a period, see [`DerivedFeatures::without_period`]
    pub period_of_day: Option<PeriodOfDay>,
    /// High-season flag (0/1)
    pub high_season: u8,
    /// Minutes between scheduled and actual departure
    pub min_diff: f64,
}

impl DerivedFeatures {
    /// Derive temporal features for one record.
    ///
    /// Fails on a malformed timestamp and on a scheduled time that falls in
    /// no period-of-day bucket.
    pub fn extract(record: &FlightRecord) -> Result<Self, FeatureError> {
        let period = period_of_day(&record.scheduled_datetime)?;
        Ok(Self {
            period_of_day: Some(period),
            ..Self::without_period(record)?
        })
    }

    /// Derive the high-season flag and deviation, leaving `period_of_day` unset
    pub fn without_period(record: &FlightRecord) -> Result<Self, FeatureError> {
        Ok(Self {
            period_of_day: None,
            high_season: is_high_season(&record.scheduled_datetime)?,
            min_diff: schedule_deviation_minutes(
                &record.scheduled_datetime,
                &record.actual_datetime,
            )?,
        })
    }

    /// Binary delay label: 1 iff the deviation is strictly above 15 minutes
    pub fn delay_label(&self) -> u8 {
        u8::from(self.min_diff > DELAY_THRESHOLD_MINUTES)
    }
}
