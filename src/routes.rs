//! # Itinerary Assembly
//!
//! Combines campsite search with per-leg passability to answer the top-level
//! question: which multi-day trips can be walked between two dates, and when
//! should each day's leg start.
//!
//! A trip from `start_date` to `end_date` spends one night per day in between,
//! so it has `nights + 1` legs and leg `i` is walked on `start_date + i`. A
//! combination is kept only when every one of its legs has at least one
//! passability window; evaluation of a combination stops at its first
//! infeasible day, so later days are never fetched for it.

use crate::analyzer::{analyze_leg, Pace, PassabilityWindow};
use crate::campsites::enumerate_campsite_combinations;
use crate::error::{Result, TrekError};
use crate::tide_data::TideSource;
use crate::trail::{Direction, Section, Trail};
use chrono::{Days, NaiveDate, NaiveDateTime};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Arguments of a route search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub section: Section,
    pub direction: Direction,
    pub min_daily_distance: f64,
    pub max_daily_distance: f64,
    /// Walking speed in miles per hour
    pub speed: f64,
    /// Required clearance below each restriction, in feet
    pub min_buffer: f64,
}

impl RouteRequest {
    /// A north-bound request with the usual coast defaults: 3 to 10 miles a
    /// day at 1 mph, keeping 2 ft below every restriction.
    pub fn new(section: Section, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        RouteRequest {
            start_date,
            end_date,
            section,
            direction: Direction::North,
            min_daily_distance: 3.0,
            max_daily_distance: 10.0,
            speed: 1.0,
            min_buffer: 2.0,
        }
    }

    fn pace(&self) -> Pace {
        Pace::new(self.speed, self.min_buffer)
    }

    fn validate(&self) -> Result<()> {
        if self.max_daily_distance < self.min_daily_distance {
            return Err(TrekError::invalid(
                "The maximum daily distance is less than the minimum daily distance",
            ));
        }
        self.pace().validate_speed()?;
        if self.end_date <= self.start_date {
            return Err(TrekError::invalid("`end_date` must be after `start_date`"));
        }
        self.pace().validate_buffer()
    }
}

/// One leg window of one feasible trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItineraryRow {
    /// Index of the campsite combination; rows of one trip share it
    pub campsite_combination: usize,
    pub date: NaiveDate,
    pub start_location: String,
    pub end_location: String,
    pub first_possible_start: NaiveDateTime,
    pub last_possible_start: NaiveDateTime,
    pub first_possible_end: NaiveDateTime,
    pub last_possible_end: NaiveDateTime,
}

impl ItineraryRow {
    fn new(campsite_combination: usize, window: PassabilityWindow) -> Self {
        ItineraryRow {
            campsite_combination,
            date: window.date,
            start_location: window.start_location,
            end_location: window.end_location,
            first_possible_start: window.first_possible_start,
            last_possible_start: window.last_possible_start,
            first_possible_end: window.first_possible_end,
            last_possible_end: window.last_possible_end,
        }
    }
}

/// All feasible trips for `request`, sorted by combination then date.
///
/// Arguments are validated before any tide data is requested. An empty result
/// means no trip works; only invalid arguments and tide service failures are
/// errors.
pub fn calc_routes<S: TideSource + ?Sized>(
    source: &S,
    request: &RouteRequest,
) -> Result<Vec<ItineraryRow>> {
    request.validate()?;

    let trail = Trail::new(request.section, request.direction);
    let nights = (request.end_date - request.start_date).num_days();
    let combinations = enumerate_campsite_combinations(
        &trail.waypoints,
        nights,
        request.min_daily_distance,
        request.max_daily_distance,
    )?;
    let Some((start, end)) = trail.trailheads() else {
        return Ok(Vec::new());
    };
    info!(
        "{} {}-bound, {} night(s): {} campsite combination(s) to check",
        request.section,
        request.direction,
        nights,
        combinations.len()
    );

    let mut rows = Vec::new();
    'combinations: for (index, campsites) in combinations.iter().enumerate() {
        let stops: Vec<&str> = std::iter::once(start.name)
            .chain(campsites.iter().copied())
            .chain(std::iter::once(end.name))
            .collect();

        let mut trip = Vec::new();
        for (offset, leg) in stops.windows(2).enumerate() {
            let day = request
                .start_date
                .checked_add_days(Days::new(offset as u64))
                .ok_or_else(|| TrekError::invalid("trip runs past the supported date range"))?;
            let windows = analyze_leg(source, &trail, leg[0], leg[1], day, request.pace())?;
            if windows.is_empty() {
                debug!("combination {index} blocked on {day} ({} -> {})", leg[0], leg[1]);
                continue 'combinations;
            }
            trip.extend(windows.into_iter().map(|w| ItineraryRow::new(index, w)));
        }
        rows.extend(trip);
    }

    rows.sort_by_key(|row| (row.campsite_combination, row.date));
    info!("{} itinerary row(s) found", rows.len());
    Ok(rows)
}
