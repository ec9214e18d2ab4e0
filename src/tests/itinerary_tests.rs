//! End-to-end route searches over synthetic tides.

use super::support::{at, synthetic_day, FixedTides};
use crate::cache::MemoryCache;
use crate::error::Result;
use crate::routes::{calc_routes, ItineraryRow, RouteRequest};
use crate::solar::Observer;
use crate::tide_data::{Prediction, TideFetcher, TideProvider};
use crate::trail::{Direction, Section, Trail};
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn april(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
}

fn low_water(day: NaiveDate) -> crate::TideSeries {
    synthetic_day(day, (7, 0), (19, 0), |_| -3.0)
}

fn high_water(day: NaiveDate) -> crate::TideSeries {
    synthetic_day(day, (7, 0), (19, 0), |_| 8.0)
}

fn by_combination(rows: &[ItineraryRow]) -> BTreeMap<usize, Vec<&ItineraryRow>> {
    let mut grouped: BTreeMap<usize, Vec<&ItineraryRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.campsite_combination).or_default().push(row);
    }
    grouped
}

/// Test a two-night south coast trip in fair conditions.
///
/// Three campsite combinations fit the 3-10 mile budget and every leg is
/// walkable all day, so each combination contributes one window per leg.
#[test]
fn fair_weather_trip_keeps_every_combination() {
    let tides = FixedTides::new()
        .with_day(low_water(april(13)))
        .with_day(low_water(april(14)))
        .with_day(low_water(april(15)));
    let request = RouteRequest::new(Section::South, april(13), april(15));

    let rows = calc_routes(&tides, &request).unwrap();
    assert_eq!(rows.len(), 9);

    let grouped = by_combination(&rows);
    assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);

    let trail = Trail::new(Section::South, Direction::North);
    let (first, last) = trail.trailheads().unwrap();
    for legs in grouped.values() {
        let dates: Vec<NaiveDate> = legs.iter().map(|row| row.date).collect();
        assert_eq!(dates, vec![april(13), april(14), april(15)]);

        assert_eq!(legs[0].start_location, first.name);
        assert_eq!(legs[legs.len() - 1].end_location, last.name);
        for pair in legs.windows(2) {
            assert_eq!(pair[0].end_location, pair[1].start_location);
        }
    }

    let first_stops: BTreeSet<&str> = rows
        .iter()
        .filter(|row| row.date == april(14))
        .map(|row| row.start_location.as_str())
        .collect();
    assert_eq!(first_stops, BTreeSet::from(["Mosquito Creek"]));
}

/// Test that a blocked second day removes only the combinations it blocks.
///
/// At 8 ft the stretch past Scott Creek's approach is closed, while the
/// Toleak Point and Strawberry Point legs cross no restriction at all.
#[test]
fn blocked_day_drops_only_affected_combinations() {
    let tides = FixedTides::new()
        .with_day(low_water(april(13)))
        .with_day(high_water(april(14)))
        .with_day(low_water(april(15)));
    let request = RouteRequest::new(Section::South, april(13), april(15));

    let rows = calc_routes(&tides, &request).unwrap();
    let grouped = by_combination(&rows);
    assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|row| row.end_location != "Scott Creek"));
}

/// Test that an infeasible first day stops the search early.
///
/// Only the first day has tide data; asking for any later day would fail
/// with an upstream error, so an empty result proves no later leg was tried.
#[test]
fn infeasible_first_day_short_circuits() {
    let tides = FixedTides::new().with_day(high_water(april(13)));
    let request = RouteRequest::new(Section::South, april(13), april(15));

    let rows = calc_routes(&tides, &request).unwrap();
    assert!(rows.is_empty());
    assert!(tides.requested().iter().all(|day| *day == april(13)));
}

/// Test that upstream failures surface instead of producing partial routes.
#[test]
fn missing_tide_day_is_an_error() {
    let tides = FixedTides::new().with_day(low_water(april(13)));
    let request = RouteRequest::new(Section::South, april(13), april(15));

    let err = calc_routes(&tides, &request).unwrap_err();
    assert!(!err.is_invalid_input());
}

/// Test a speed too slow to time any leg yields no trips instead of failing.
#[test]
fn crawling_pace_finds_no_trips() {
    let tides = FixedTides::new().with_day(low_water(april(13)));
    let mut request = RouteRequest::new(Section::South, april(13), april(15));
    request.speed = 1e-12;

    let rows = calc_routes(&tides, &request).unwrap();
    assert!(rows.is_empty());
    assert!(tides.requested().iter().all(|day| *day == april(13)));
}

/// Test rows are ordered by combination, then date.
#[test]
fn rows_are_sorted() {
    let tides = FixedTides::new()
        .with_day(low_water(april(13)))
        .with_day(low_water(april(14)))
        .with_day(low_water(april(15)));
    let mut request = RouteRequest::new(Section::South, april(13), april(15));
    request.direction = Direction::South;

    let rows = calc_routes(&tides, &request).unwrap();
    assert!(!rows.is_empty());
    assert!(rows
        .windows(2)
        .all(|pair| (pair[0].campsite_combination, pair[0].date)
            <= (pair[1].campsite_combination, pair[1].date)));
    assert_eq!(rows[0].start_location, "La Push Road");
}

/// Flat low water for any requested day, counting upstream calls.
struct CalmSea {
    calls: Arc<AtomicUsize>,
}

impl TideFetcher for CalmSea {
    fn fetch_predictions(&self, day: NaiveDate) -> Result<Vec<Prediction>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..240)
            .map(|i| Prediction {
                timestamp: at(day, 0, 0) + Duration::minutes(6 * i),
                height_ft: -1.0,
            })
            .collect())
    }
}

/// Test the provider wiring: every combination shares one fetch per day.
#[test]
fn provider_fetches_each_day_once_per_search() {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = TideProvider::new(
        CalmSea {
            calls: Arc::clone(&calls),
        },
        MemoryCache::new(),
        Observer::la_push(),
    );
    let request = RouteRequest::new(Section::South, april(13), april(15));

    let rows = calc_routes(&provider, &request).unwrap();
    assert_eq!(rows.len(), 9);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    // A repeated search is served entirely from the cache
    assert_eq!(calc_routes(&provider, &request).unwrap(), rows);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}
