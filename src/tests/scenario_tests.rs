//! Oil City to Mosquito Creek on 2022-09-09, from a stored datagetter payload.
//!
//! `fixtures/tides-2022-09-09.json` is a hand-built payload in NOAA's
//! datagetter format (240 samples at 6-minute cadence, heights in feet). The
//! curve is synthetic: a low tide just after 07:00 and an evening low that only
//! opens the leg for the last departure still arriving in daylight.
//! `tests/noaa_live.rs` runs the same leg against the live service.

use super::support::{at, FixedTides};
use crate::analyzer::{analyze_leg, Pace, PassabilityWindow};
use crate::solar::Observer;
use crate::tide_data::{build_series, parse_predictions};
use crate::trail::{Direction, Section, Trail};
use crate::TideSeries;
use chrono::NaiveDate;

const PAYLOAD: &str = include_str!("fixtures/tides-2022-09-09.json");

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 9, 9).unwrap()
}

fn series() -> TideSeries {
    let predictions = parse_predictions(PAYLOAD).unwrap();
    build_series(&Observer::la_push(), day(), predictions).unwrap()
}

fn oil_city_to_mosquito_creek(pace: Pace) -> Vec<PassabilityWindow> {
    let tides = FixedTides::new().with_day(series());
    let trail = Trail::new(Section::South, Direction::North);
    analyze_leg(&tides, &trail, "Oil City", "Mosquito Creek", day(), pace).unwrap()
}

/// Test the payload decodes to a full day with La Push daylight.
///
/// Sunrise is 06:48 and sunset 19:42, so the first daylight sample is 06:54
/// and the last is 19:42.
#[test]
fn payload_is_a_full_daylight_tagged_day() {
    let series = series();
    assert_eq!(series.samples.len(), 240);
    assert!(series.samples.iter().all(|s| s.timestamp.date() == day()));

    let daylight: Vec<_> = series.daylight().map(|s| s.timestamp).collect();
    assert_eq!(daylight.first(), Some(&at(day(), 6, 54)));
    assert_eq!(daylight.last(), Some(&at(day(), 19, 42)));
}

/// Test the two departure windows at 2 mph with no buffer.
///
/// 6.1 miles take 3h03m. The afternoon window is a single departure, the
/// last one that arrives by the final daylight sample.
#[test]
fn two_windows_at_walking_pace() {
    let windows = oil_city_to_mosquito_creek(Pace::new(2.0, 0.0));
    assert_eq!(
        windows,
        vec![
            PassabilityWindow {
                first_possible_start: at(day(), 6, 54),
                last_possible_start: at(day(), 7, 54),
                first_possible_end: at(day(), 9, 57),
                last_possible_end: at(day(), 10, 57),
                start_location: "Oil City".to_string(),
                end_location: "Mosquito Creek".to_string(),
                date: day(),
            },
            PassabilityWindow {
                first_possible_start: at(day(), 16, 36),
                last_possible_start: at(day(), 16, 36),
                first_possible_end: at(day(), 19, 39),
                last_possible_end: at(day(), 19, 39),
                start_location: "Oil City".to_string(),
                end_location: "Mosquito Creek".to_string(),
                date: day(),
            },
        ]
    );
}

/// Test a one-foot buffer narrows the morning and closes the afternoon.
#[test]
fn buffer_narrows_the_windows() {
    let windows = oil_city_to_mosquito_creek(Pace::new(2.0, 1.0));
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].first_possible_start, at(day(), 6, 54));
    assert_eq!(windows[0].last_possible_start, at(day(), 7, 6));
}

/// Test slower paces find nothing.
///
/// At 1 mph the morning low would need a departure before sunrise, and the
/// afternoon walk no longer ends in daylight.
#[test]
fn slow_paces_find_no_window() {
    assert!(oil_city_to_mosquito_creek(Pace::new(1.0, 0.0)).is_empty());
    assert!(oil_city_to_mosquito_creek(Pace::new(0.01, 0.0)).is_empty());
}
