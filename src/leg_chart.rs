//! # Single-Leg Chart Data
//!
//! Everything needed to draw one leg against the tide: where the walker is at
//! each moment, which restriction zones are crossed and when, the tide curve
//! for the whole walk (which may span several days at slow speeds), the dark
//! hours, and the departure windows for the starting day.
//!
//! Only the start and end names are given. The section is the one that holds
//! both names and the direction follows from their order in it. The output is
//! a serializable description; drawing it is left to the caller.

use crate::analyzer::{analyze_leg, Pace, PassabilityWindow};
use crate::error::{Result, TrekError};
use crate::tide_data::TideSource;
use crate::trail::{self, Direction, Section, Trail};
use crate::TideSample;
use chrono::{Days, Duration, NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

/// Slack kept on both sides of the walk so the tide curve reaches its edges
const TIDE_MARGIN_MINUTES: i64 = 6;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegChartRequest {
    pub start_location: String,
    pub end_location: String,
    pub start_time: NaiveDateTime,
    pub speed: f64,
    pub min_buffer: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegChart {
    pub section: Section,
    pub direction: Direction,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Total leg length in miles
    pub distance_miles: f64,
    pub waypoints: Vec<ChartWaypoint>,
    pub restrictions: Vec<ChartRestriction>,
    pub tides: Vec<ChartTide>,
    pub night_ranges: Vec<NightRange>,
    pub height_range: HeightRange,
    /// Departure windows on the starting day
    pub windows: Vec<PassabilityWindow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartWaypoint {
    pub name: &'static str,
    /// Miles from the start of the leg
    pub offset_miles: f64,
    pub reached_at: NaiveDateTime,
    pub is_campsite: bool,
}

/// A restriction zone clipped to the leg.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartRestriction {
    pub restriction_ft: f64,
    pub headland_alternative: bool,
    pub start_offset_miles: f64,
    pub end_offset_miles: f64,
    pub enter_at: NaiveDateTime,
    pub exit_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartTide {
    pub timestamp: NaiveDateTime,
    pub height_ft: f64,
    pub is_light: bool,
    /// Miles walked at this instant (negative before departure)
    pub walked_miles: f64,
}

/// First and last sample of a stretch of darkness.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NightRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HeightRange {
    pub min_ft: f64,
    pub max_ft: f64,
}

pub fn leg_chart<S: TideSource + ?Sized>(
    source: &S,
    request: &LegChartRequest,
) -> Result<LegChart> {
    let pace = Pace::new(request.speed, request.min_buffer);
    pace.validate_speed()?;
    pace.validate_buffer()?;
    let (start, end) = (request.start_location.as_str(), request.end_location.as_str());
    if start == end {
        return Err(TrekError::invalid("start and end locations must be different"));
    }

    let (section, direction) = locate(start, end)?;
    let trail = Trail::new(section, direction);
    let stretch = trail.stretch(start, end)?;
    let (Some(first), Some(last)) = (stretch.first(), stretch.last()) else {
        return Err(TrekError::invalid("empty leg"));
    };
    let (first_miles, last_miles) = (first.distance_miles, last.distance_miles);
    let start_time = request.start_time;
    let at_offset = |miles: f64| {
        pace.travel_time(miles)
            .and_then(|travel| start_time.checked_add_signed(travel))
            .ok_or_else(|| TrekError::invalid("The leg would end outside the supported time range"))
    };
    let end_time = at_offset(last_miles - first_miles)?;

    let waypoints = stretch
        .iter()
        .map(|w| {
            Ok(ChartWaypoint {
                name: w.name,
                offset_miles: w.distance_miles - first_miles,
                reached_at: at_offset(w.distance_miles - first_miles)?,
                is_campsite: w.is_campsite,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let restrictions: Vec<ChartRestriction> = trail
        .restrictions
        .iter()
        .filter(|zone| zone.overlaps(first_miles, last_miles))
        .map(|zone| {
            let start_offset = zone.start_miles.max(first_miles) - first_miles;
            let end_offset = zone.end_miles.min(last_miles) - first_miles;
            Ok(ChartRestriction {
                restriction_ft: zone.restriction_ft,
                headland_alternative: zone.headland_alternative,
                start_offset_miles: start_offset,
                end_offset_miles: end_offset,
                enter_at: at_offset(start_offset)?,
                exit_at: at_offset(end_offset)?,
            })
        })
        .collect::<Result<_>>()?;

    let samples = samples_between(source, start_time, end_time)?;
    let tides: Vec<ChartTide> = samples
        .iter()
        .map(|s| ChartTide {
            timestamp: s.timestamp,
            height_ft: s.height_ft,
            is_light: s.is_light,
            walked_miles: (s.timestamp - start_time).num_seconds() as f64 * request.speed / 3600.0,
        })
        .collect();

    let windows = analyze_leg(source, &trail, start, end, start_time.date(), pace)?;
    debug!(
        "chart {start} -> {end}: {} tide samples, {} zone(s)",
        tides.len(),
        restrictions.len()
    );

    Ok(LegChart {
        section,
        direction,
        start_time,
        end_time,
        distance_miles: last_miles - first_miles,
        waypoints,
        night_ranges: night_ranges(&samples),
        height_range: height_range(&samples, &restrictions),
        restrictions,
        tides,
        windows,
    })
}

/// Section holding both names, and the direction that walks start -> end.
fn locate(start: &str, end: &str) -> Result<(Section, Direction)> {
    let start_sections = trail::sections_containing(start);
    let end_sections = trail::sections_containing(end);
    match (start_sections.is_empty(), end_sections.is_empty()) {
        (true, true) => return Err(TrekError::invalid("Invalid start and end locations")),
        (true, false) => return Err(TrekError::invalid("Invalid start location")),
        (false, true) => return Err(TrekError::invalid("Invalid end location")),
        (false, false) => {}
    }

    let section = start_sections
        .into_iter()
        .find(|section| end_sections.contains(section))
        .ok_or_else(|| {
            TrekError::invalid("The start location and end location must be in the same section")
        })?;

    let northbound = Trail::new(section, Direction::North);
    let position = |name: &str| northbound.find(name).map(|w| w.id);
    let direction = if position(start) < position(end) {
        Direction::North
    } else {
        Direction::South
    };
    Ok((section, direction))
}

/// Samples strictly within the margin around `[start, end]`, across days.
fn samples_between<S: TideSource + ?Sized>(
    source: &S,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<TideSample>> {
    let margin = Duration::minutes(TIDE_MARGIN_MINUTES);
    let (lower, upper) = (start - margin, end + margin);

    let mut samples = Vec::new();
    for day in days_between(start.date(), end.date()) {
        let series = source.tide_series(day)?;
        samples.extend(
            series
                .samples
                .into_iter()
                .filter(|s| lower < s.timestamp && s.timestamp < upper),
        );
    }
    Ok(samples)
}

fn days_between(first: NaiveDate, last: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(first), |day| day.checked_add_days(Days::new(1)))
        .take_while(move |day| *day <= last)
}

fn night_ranges(samples: &[TideSample]) -> Vec<NightRange> {
    samples
        .chunk_by(|a, b| a.is_light == b.is_light)
        .filter(|run| run.len() >= 2 && !run[0].is_light)
        .map(|run| NightRange {
            start: run[0].timestamp,
            end: run[run.len() - 1].timestamp,
        })
        .collect()
}

fn height_range(samples: &[TideSample], restrictions: &[ChartRestriction]) -> HeightRange {
    let tide_min = samples.iter().map(|s| s.height_ft).fold(f64::INFINITY, f64::min);
    let tide_max = samples.iter().map(|s| s.height_ft).fold(f64::NEG_INFINITY, f64::max);
    if restrictions.is_empty() {
        return HeightRange {
            min_ft: tide_min,
            max_ft: tide_max,
        };
    }
    let limit_min = restrictions.iter().map(|r| r.restriction_ft).fold(f64::INFINITY, f64::min);
    let limit_max = restrictions
        .iter()
        .map(|r| r.restriction_ft)
        .fold(f64::NEG_INFINITY, f64::max);
    HeightRange {
        min_ft: tide_min.min(limit_min).floor(),
        max_ft: tide_max.max(limit_max).ceil(),
    }
}
