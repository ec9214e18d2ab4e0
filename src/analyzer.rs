//! # Passability Analysis
//!
//! Finds the times of day at which one leg can be walked without being caught
//! by the tide.
//!
//! The walker is modelled as moving at constant speed, so elapsed time maps
//! linearly onto distance. For each candidate departure (every daylight tide
//! sample) the analyzer walks the daylight samples between departure and
//! arrival, works out which restriction zones the walker is inside at each of
//! those instants, and checks the predicted height against them. Consecutive
//! passable departures are merged into [`PassabilityWindow`]s.
//!
//! An instant inside several zones at once (zone boundaries touch in the
//! tables) must satisfy the lowest restriction, unless every one of those
//! zones has a headland bypass.

use crate::error::{Result, TrekError};
use crate::tide_data::TideSource;
use crate::trail::{RestrictionZone, Trail, Waypoint};
use crate::TideSample;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

/// A maximal run of departure times for which the whole leg stays passable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassabilityWindow {
    pub first_possible_start: NaiveDateTime,
    pub last_possible_start: NaiveDateTime,
    pub first_possible_end: NaiveDateTime,
    pub last_possible_end: NaiveDateTime,
    pub start_location: String,
    pub end_location: String,
    /// Calendar day of `first_possible_start`
    pub date: NaiveDate,
}

/// Walking speed and the safety margin kept below each restriction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pace {
    pub speed_mph: f64,
    pub min_buffer_ft: f64,
}

impl Pace {
    pub fn new(speed_mph: f64, min_buffer_ft: f64) -> Self {
        Pace {
            speed_mph,
            min_buffer_ft,
        }
    }

    pub(crate) fn validate_speed(&self) -> Result<()> {
        if self.speed_mph.is_finite() && self.speed_mph > 0.0 {
            Ok(())
        } else {
            Err(TrekError::invalid("The hiking speed must be a positive number"))
        }
    }

    pub(crate) fn validate_buffer(&self) -> Result<()> {
        if self.min_buffer_ft.is_finite() && self.min_buffer_ft >= 0.0 {
            Ok(())
        } else {
            Err(TrekError::invalid("The minimum buffer must not be negative"))
        }
    }

    /// Time needed to cover `miles`, to the nearest microsecond.
    ///
    /// `None` when the walk is too slow for the result to fit in a [`Duration`].
    pub fn travel_time(&self, miles: f64) -> Option<Duration> {
        let micros = (miles / self.speed_mph * 3_600_000_000.0).round();
        if micros.is_finite() && micros.abs() < i64::MAX as f64 {
            Some(Duration::microseconds(micros as i64))
        } else {
            None
        }
    }
}

/// Departure windows for walking `start` → `end` on `day`.
///
/// Both names must be waypoints of `trail`, with `start` strictly before `end`
/// in its direction of travel. Returns an empty list when no departure works.
pub fn analyze_leg<S: TideSource + ?Sized>(
    source: &S,
    trail: &Trail,
    start: &str,
    end: &str,
    day: NaiveDate,
    pace: Pace,
) -> Result<Vec<PassabilityWindow>> {
    pace.validate_speed()?;
    let stretch = trail.stretch(start, end)?;

    let series = source.tide_series(day)?;
    let daylight: Vec<TideSample> = series.daylight().copied().collect();

    let windows = passability_windows(&daylight, stretch, &trail.restrictions, pace);
    debug!(
        "{start} -> {end} on {day}: {} window(s) at {} mph",
        windows.len(),
        pace.speed_mph
    );
    Ok(windows)
}

/// Pure core of [`analyze_leg`] over an already-filtered daylight series.
pub(crate) fn passability_windows(
    daylight: &[TideSample],
    stretch: &[Waypoint],
    restrictions: &[RestrictionZone],
    pace: Pace,
) -> Vec<PassabilityWindow> {
    let (Some(first), Some(last)) = (stretch.first(), stretch.last()) else {
        return Vec::new();
    };
    let Some(last_sample) = daylight.last() else {
        return Vec::new();
    };

    // A leg that cannot be timed cannot end before the last sample either
    let Some(travel) = pace.travel_time(last.distance_miles - first.distance_miles) else {
        return Vec::new();
    };
    let zones = zone_timings(
        restrictions,
        first.distance_miles,
        last.distance_miles,
        pace.speed_mph,
    );

    let mut windows = Vec::new();
    // (departure, arrival) of the first and latest passable start in the run
    let mut run: Option<(Trip, Trip)> = None;

    for (index, departure) in daylight.iter().enumerate() {
        let arrival = match departure.timestamp.checked_add_signed(travel) {
            Some(arrival) if arrival <= last_sample.timestamp => arrival,
            _ => continue,
        };

        let passable = daylight[index..]
            .iter()
            .take_while(|sample| sample.timestamp <= arrival)
            .all(|sample| {
                let elapsed = (sample.timestamp - departure.timestamp).num_minutes() as f64 / 60.0;
                instant_passable(&zones, elapsed, sample.height_ft, pace.min_buffer_ft)
            });

        let trip = (departure.timestamp, arrival);
        if passable {
            run = Some((run.map_or(trip, |(earliest, _)| earliest), trip));
        } else if let Some((earliest, latest)) = run.take() {
            windows.push(window(earliest, latest, first.name, last.name));
        }
    }
    if let Some((earliest, latest)) = run {
        windows.push(window(earliest, latest, first.name, last.name));
    }
    windows
}

type Trip = (NaiveDateTime, NaiveDateTime);

fn window(
    (first_start, first_end): Trip,
    (last_start, last_end): Trip,
    start_location: &str,
    end_location: &str,
) -> PassabilityWindow {
    PassabilityWindow {
        first_possible_start: first_start,
        last_possible_start: last_start,
        first_possible_end: first_end,
        last_possible_end: last_end,
        start_location: start_location.to_string(),
        end_location: end_location.to_string(),
        date: first_start.date(),
    }
}

/// Elapsed hours at which the walker is inside a zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ZoneTiming {
    enter_hours: f64,
    exit_hours: f64,
    restriction_ft: f64,
    headland_alternative: bool,
}

impl ZoneTiming {
    fn contains(&self, elapsed_hours: f64) -> bool {
        self.enter_hours <= elapsed_hours && elapsed_hours <= self.exit_hours
    }
}

fn zone_timings(
    restrictions: &[RestrictionZone],
    first_miles: f64,
    last_miles: f64,
    speed_mph: f64,
) -> Vec<ZoneTiming> {
    restrictions
        .iter()
        .filter(|zone| zone.overlaps(first_miles, last_miles))
        .map(|zone| ZoneTiming {
            enter_hours: (zone.start_miles - first_miles) / speed_mph,
            exit_hours: (zone.end_miles - first_miles) / speed_mph,
            restriction_ft: zone.restriction_ft,
            headland_alternative: zone.headland_alternative,
        })
        .collect()
}

/// Whether the walker is safe `elapsed_hours` into the leg at `height_ft`.
pub(crate) fn instant_passable(
    zones: &[ZoneTiming],
    elapsed_hours: f64,
    height_ft: f64,
    min_buffer_ft: f64,
) -> bool {
    let mut active = zones.iter().filter(|zone| zone.contains(elapsed_hours)).peekable();
    if active.peek().is_none() {
        return true;
    }

    let (lowest, all_bypassable) = active.fold((f64::INFINITY, true), |(lowest, bypass), zone| {
        (
            lowest.min(zone.restriction_ft),
            bypass && zone.headland_alternative,
        )
    });
    height_ft + min_buffer_ft < lowest || all_bypassable
}
