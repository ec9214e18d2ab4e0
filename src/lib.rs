//! # Coast Treks Core Library
//!
//! Feasibility engine for multi-day hikes on the tide-restricted Olympic Coast.
//! Given a section, a direction and a range of dates it answers: which
//! combinations of campsites can be walked, and at what times of day each
//! leg is safe to start.
//!
//! ## Data Flow
//!
//! 1. **Trail registry** ([`trail`]): static waypoint and restriction tables,
//!    re-expressed for the direction of travel
//! 2. **Tide pipeline** ([`tide_data`], [`cache`], [`solar`]): one day of NOAA
//!    predictions at 6-minute cadence, tagged with daylight, cached per day
//! 3. **Passability** ([`analyzer`]): departure windows for a single leg
//! 4. **Campsites** ([`campsites`]): campsite combinations within daily
//!    distance bounds
//! 5. **Itineraries** ([`routes`]): chains the legs of each combination over
//!    consecutive days and keeps only fully feasible ones
//!
//! [`leg_chart`] reuses steps 2 and 3 to describe a single leg for plotting.
//!
//! ## Core Types
//!
//! - [`TideSample`]: one predicted tide height with its daylight flag
//! - [`TideSeries`]: a full calendar day of samples

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod analyzer;
pub mod cache;
pub mod campsites;
pub mod config;
pub mod error;
pub mod leg_chart;
pub mod routes;
pub mod solar;
pub mod tide_data;
pub mod trail;

#[cfg(test)]
mod tests;

pub use error::TrekError;

/// A single predicted tide height at a local (station) time.
///
/// Timestamps carry no offset: they are in the station's local standard or
/// daylight time, exactly as NOAA reports them with `time_zone=lst_ldt`.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use coast_treks::TideSample;
///
/// let noon = NaiveDate::from_ymd_opt(2024, 4, 13)
///     .unwrap()
///     .and_hms_opt(12, 0, 0)
///     .unwrap();
/// let sample = TideSample { timestamp: noon, height_ft: 3.2, is_light: true };
/// assert!(sample.is_light);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideSample {
    /// Local wall-clock time of the prediction
    pub timestamp: NaiveDateTime,
    /// Predicted height in feet above MLLW
    pub height_ft: f64,
    /// True between sunrise and sunset (inclusive) at the reference location
    pub is_light: bool,
}

/// One calendar day of tide predictions.
///
/// NOAA predictions come at a 6-minute cadence, so a complete day holds
/// 240 samples in chronological order. A series is immutable once built and
/// is what the tide cache stores per day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideSeries {
    /// Calendar day the samples belong to
    pub date: NaiveDate,
    /// Samples in ascending timestamp order
    pub samples: Vec<TideSample>,
}

impl TideSeries {
    /// Samples taken between sunrise and sunset.
    pub fn daylight(&self) -> impl Iterator<Item = &TideSample> {
        self.samples.iter().filter(|s| s.is_light)
    }
}
