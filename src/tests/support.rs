//! Synthetic tide days and an in-memory [`TideSource`].

use crate::error::{Result, TrekError};
use crate::tide_data::TideSource;
use crate::{TideSample, TideSeries};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Mutex;

/// Local wall-clock time on `day`.
pub(crate) fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0).unwrap()
}

/// A full day at NOAA's 6-minute cadence.
///
/// Samples from `light_from` to `light_until` (inclusive, as `(hour, minute)`)
/// are daylight; heights come from `height`.
pub(crate) fn synthetic_day(
    day: NaiveDate,
    light_from: (u32, u32),
    light_until: (u32, u32),
    height: impl Fn(NaiveDateTime) -> f64,
) -> TideSeries {
    let sunrise = at(day, light_from.0, light_from.1);
    let sunset = at(day, light_until.0, light_until.1);
    let samples = (0..240)
        .map(|i| {
            let timestamp = at(day, 0, 0) + Duration::minutes(6 * i);
            TideSample {
                timestamp,
                height_ft: height(timestamp),
                is_light: sunrise <= timestamp && timestamp <= sunset,
            }
        })
        .collect();
    TideSeries { date: day, samples }
}

/// Serves pre-built days and records every request.
///
/// A day that was not supplied fails like an upstream outage, so tests can
/// prove that a code path never asks for it.
#[derive(Default)]
pub(crate) struct FixedTides {
    days: HashMap<NaiveDate, TideSeries>,
    requests: Mutex<Vec<NaiveDate>>,
}

impl FixedTides {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_day(mut self, series: TideSeries) -> Self {
        self.days.insert(series.date, series);
        self
    }

    /// Days requested so far, in call order.
    pub(crate) fn requested(&self) -> Vec<NaiveDate> {
        self.requests.lock().unwrap().clone()
    }
}

impl TideSource for FixedTides {
    fn tide_series(&self, day: NaiveDate) -> Result<TideSeries> {
        self.requests.lock().unwrap().push(day);
        self.days
            .get(&day)
            .cloned()
            .ok_or_else(|| TrekError::upstream(format!("no tide predictions for {day}")))
    }
}
