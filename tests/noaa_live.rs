//! Checks against the live NOAA service.
//!
//! These hit the network and are ignored by default:
//! `cargo test --test noaa_live -- --ignored`

use chrono::{NaiveDate, NaiveDateTime};
use coast_treks::analyzer::{analyze_leg, Pace};
use coast_treks::cache::MemoryCache;
use coast_treks::config::Config;
use coast_treks::tide_data::{NoaaClient, TideProvider, TideSource};
use coast_treks::trail::{Direction, Section, Trail};

fn provider() -> TideProvider {
    let config = Config::default();
    let client = NoaaClient::new(config.station.clone()).unwrap();
    TideProvider::new(client, MemoryCache::new(), config.observer().unwrap())
}

fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0).unwrap()
}

#[test]
#[ignore = "requires network access to NOAA"]
fn full_day_of_predictions() {
    let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let series = provider().tide_series(day).unwrap();
    assert_eq!(series.samples.len(), 240);
    assert!(series.samples.iter().all(|s| s.timestamp.date() == day));
    assert!(series.samples.iter().any(|s| s.is_light));
    assert!(series.samples.iter().any(|s| !s.is_light));
}

#[test]
#[ignore = "requires network access to NOAA"]
fn oil_city_to_mosquito_creek_windows() {
    let day = NaiveDate::from_ymd_opt(2022, 9, 9).unwrap();
    let provider = provider();
    let trail = Trail::new(Section::South, Direction::North);
    let leg = |speed: f64| {
        analyze_leg(
            &provider,
            &trail,
            "Oil City",
            "Mosquito Creek",
            day,
            Pace::new(speed, 0.0),
        )
        .unwrap()
    };

    let windows = leg(2.0);
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].first_possible_start, at(day, 6, 54));
    assert_eq!(windows[0].last_possible_start, at(day, 7, 54));
    assert_eq!(windows[1].first_possible_start, at(day, 16, 36));
    assert_eq!(windows[1].last_possible_start, at(day, 16, 36));

    assert!(leg(1.0).is_empty());
    assert!(leg(0.01).is_empty());
}
