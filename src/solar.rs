//! # Sunrise and Sunset
//!
//! Low-cost solar ephemeris used to flag tide samples as daylight or dark.
//! Hikers only start or walk tidal stretches between sunrise and sunset, so
//! every sample fetched from NOAA is tagged once per day with `is_light`.
//!
//! ## Algorithm
//!
//! The NOAA solar calculator equations (as used by the `astral` family of
//! libraries):
//! 1. Julian century of the calendar date at 0h UT
//! 2. Apparent solar longitude, obliquity correction, declination
//! 3. Equation of time (minutes)
//! 4. Hour angle for a zenith of 90° + solar radius + refraction
//! 5. One refinement pass using the first estimate of the event time
//!
//! The result is converted to the observer's civil time zone and returned as a
//! naive local timestamp, matching the `lst_ldt` clock NOAA uses for predictions.

use crate::error::{Result, TrekError};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use std::f64::consts::PI;

/// Apparent radius of the solar disc in degrees.
const SUN_APPARENT_RADIUS: f64 = 32.0 / (60.0 * 2.0);

/// Fixed point on Earth for which daylight is computed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observer {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Tz,
}

impl Observer {
    /// La Push, WA: the reference point for every Olympic Coast section.
    pub fn la_push() -> Self {
        Observer {
            latitude: 47.9053,
            longitude: -124.626,
            timezone: chrono_tz::America::Los_Angeles,
        }
    }
}

/// Local sunrise and sunset for one calendar day.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunTimes {
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
}

impl SunTimes {
    /// Daylight test, inclusive at both ends.
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.sunrise <= timestamp && timestamp <= self.sunset
    }
}

#[derive(Clone, Copy, PartialEq)]
enum SunEvent {
    Rising,
    Setting,
}

/// Compute local sunrise and sunset at `observer` on `date`.
pub fn sun_times(observer: &Observer, date: NaiveDate) -> Result<SunTimes> {
    Ok(SunTimes {
        sunrise: local_event(observer, date, SunEvent::Rising)?,
        sunset: local_event(observer, date, SunEvent::Setting)?,
    })
}

/// Flag each timestamp as daylight (`true`) or dark.
///
/// Sun times are computed once, from the date of the timestamps, so every
/// timestamp must fall on the same calendar day. An empty slice yields an
/// empty result.
pub fn is_light(observer: &Observer, timestamps: &[NaiveDateTime]) -> Result<Vec<bool>> {
    let Some(first) = timestamps.first() else {
        return Ok(Vec::new());
    };
    let date = first.date();
    if timestamps.iter().any(|ts| ts.date() != date) {
        return Err(TrekError::invalid(
            "all timestamps must fall on the same day",
        ));
    }

    let sun = sun_times(observer, date)?;
    Ok(timestamps.iter().map(|&ts| sun.contains(ts)).collect())
}

/// Event time in local civil time, re-solved from the adjacent day when the
/// UTC solution lands on a different local date.
fn local_event(observer: &Observer, date: NaiveDate, event: SunEvent) -> Result<NaiveDateTime> {
    let utc = time_of_transit(observer, date, event)?;
    let local = utc.with_timezone(&observer.timezone).naive_local();
    if local.date() == date {
        return Ok(local);
    }

    let neighbour = if local.date() < date {
        date.succ_opt()
    } else {
        date.pred_opt()
    }
    .ok_or_else(|| TrekError::invalid(format!("date {date} is out of range")))?;
    let utc = time_of_transit(observer, neighbour, event)?;
    Ok(utc.with_timezone(&observer.timezone).naive_local())
}

fn time_of_transit(observer: &Observer, date: NaiveDate, event: SunEvent) -> Result<DateTime<Utc>> {
    let zenith = 90.0 + SUN_APPARENT_RADIUS;
    let zenith = zenith + refraction_at_zenith(zenith);

    let jd = julian_day(date);
    let mut minutes_utc = solar_event_minutes(observer, jd_to_jcentury(jd), zenith, event)?;
    let refined = jd_to_jcentury(jd + minutes_utc / 1440.0);
    minutes_utc = solar_event_minutes(observer, refined, zenith, event)?;

    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    Ok(midnight + Duration::microseconds((minutes_utc * 60_000_000.0).round() as i64))
}

/// Minutes after 0h UT at which the sun crosses `zenith`.
fn solar_event_minutes(observer: &Observer, jc: f64, zenith: f64, event: SunEvent) -> Result<f64> {
    let declination = sun_declination(jc);
    let hour_angle = hour_angle(observer.latitude, declination, zenith, event)?;
    let delta = -observer.longitude - hour_angle.to_degrees();
    Ok(720.0 + 4.0 * delta - equation_of_time(jc))
}

fn julian_day(date: NaiveDate) -> f64 {
    use chrono::Datelike;

    let (mut year, mut month) = (date.year(), date.month() as i32);
    if month <= 2 {
        year -= 1;
        month += 12;
    }
    let a = (f64::from(year) / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * f64::from(year + 4716)).floor()
        + (30.6001 * f64::from(month + 1)).floor()
        + f64::from(date.day())
        + b
        - 1524.5
}

fn jd_to_jcentury(jd: f64) -> f64 {
    (jd - 2_451_545.0) / 36_525.0
}

fn geom_mean_long_sun(jc: f64) -> f64 {
    (280.46646 + jc * (36000.76983 + 0.0003032 * jc)).rem_euclid(360.0)
}

fn geom_mean_anomaly_sun(jc: f64) -> f64 {
    357.52911 + jc * (35999.05029 - 0.0001537 * jc)
}

fn eccentricity_earth_orbit(jc: f64) -> f64 {
    0.016708634 - jc * (0.000042037 + 0.0000001267 * jc)
}

fn sun_eq_of_center(jc: f64) -> f64 {
    let m = geom_mean_anomaly_sun(jc).to_radians();
    m.sin() * (1.914602 - jc * (0.004817 + 0.000014 * jc))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * jc)
        + (3.0 * m).sin() * 0.000289
}

fn sun_apparent_long(jc: f64) -> f64 {
    let true_long = geom_mean_long_sun(jc) + sun_eq_of_center(jc);
    let omega = 125.04 - 1934.136 * jc;
    true_long - 0.00569 - 0.00478 * omega.to_radians().sin()
}

fn obliquity_correction(jc: f64) -> f64 {
    let seconds = 21.448 - jc * (46.815 + jc * (0.00059 - jc * 0.001813));
    let mean_obliquity = 23.0 + (26.0 + seconds / 60.0) / 60.0;
    let omega = 125.04 - 1934.136 * jc;
    mean_obliquity + 0.00256 * omega.to_radians().cos()
}

fn sun_declination(jc: f64) -> f64 {
    let e = obliquity_correction(jc).to_radians();
    let lambda = sun_apparent_long(jc).to_radians();
    (e.sin() * lambda.sin()).asin().to_degrees()
}

/// Equation of time in minutes.
fn equation_of_time(jc: f64) -> f64 {
    let l0 = geom_mean_long_sun(jc).to_radians();
    let e = eccentricity_earth_orbit(jc);
    let m = geom_mean_anomaly_sun(jc).to_radians();
    let y = (obliquity_correction(jc).to_radians() / 2.0).tan().powi(2);

    let etime = y * (2.0 * l0).sin() - 2.0 * e * m.sin()
        + 4.0 * e * y * m.sin() * (2.0 * l0).cos()
        - 0.5 * y * y * (4.0 * l0).sin()
        - 1.25 * e * e * (2.0 * m).sin();
    etime.to_degrees() * 4.0
}

/// Hour angle in radians; negative for sunset.
fn hour_angle(latitude: f64, declination: f64, zenith: f64, event: SunEvent) -> Result<f64> {
    let lat = latitude.to_radians();
    let dec = declination.to_radians();
    let cos_h = (zenith.to_radians().cos() - lat.sin() * dec.sin()) / (lat.cos() * dec.cos());
    if !(-1.0..=1.0).contains(&cos_h) {
        return Err(TrekError::invalid(
            "the sun does not rise or set at this location on this date",
        ));
    }
    let h = cos_h.acos();
    Ok(if event == SunEvent::Rising { h } else { -h })
}

/// Atmospheric refraction in degrees for a body at `zenith`.
fn refraction_at_zenith(zenith: f64) -> f64 {
    let elevation = 90.0 - zenith;
    if elevation >= 85.0 {
        return 0.0;
    }
    let te = (elevation * PI / 180.0).tan();
    let arcseconds = if elevation > 5.0 {
        58.1 / te - 0.07 / te.powi(3) + 0.000086 / te.powi(5)
    } else if elevation > -0.575 {
        let inner = 103.4 + elevation * (-12.79 + elevation * 0.711);
        1735.0 + elevation * (-518.2 + elevation * inner)
    } else {
        -20.774 / te
    };
    arcseconds / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: (i32, u32, u32), hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
    }

    #[test]
    fn empty_input_yields_empty_flags() {
        assert!(is_light(&Observer::la_push(), &[]).unwrap().is_empty());
    }

    #[test]
    fn timestamps_must_share_a_day() {
        let stamps = [
            at((2024, 1, 15), 8, 3),
            at((2024, 1, 16), 8, 4),
            at((2024, 1, 16), 8, 5),
        ];
        let err = is_light(&Observer::la_push(), &stamps).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn winter_sunrise_falls_between_minutes() {
        // Sunrise at La Push on 2024-01-15 is a little after 08:03 PST
        let stamps = [
            at((2024, 1, 15), 8, 3),
            at((2024, 1, 15), 8, 4),
            at((2024, 1, 15), 8, 5),
        ];
        let flags = is_light(&Observer::la_push(), &stamps).unwrap();
        assert_eq!(flags, vec![false, true, true]);
    }

    #[test]
    fn daylight_saving_is_applied() {
        // 2022-09-09 is in PDT; sunrise ~06:48, sunset ~19:42
        let date = NaiveDate::from_ymd_opt(2022, 9, 9).unwrap();
        let sun = sun_times(&Observer::la_push(), date).unwrap();
        assert_eq!(sun.sunrise.date(), date);
        assert_eq!(sun.sunset.date(), date);
        assert!(!sun.contains(at((2022, 9, 9), 6, 48)));
        assert!(sun.contains(at((2022, 9, 9), 6, 49)));
        assert!(sun.contains(at((2022, 9, 9), 19, 42)));
        assert!(!sun.contains(at((2022, 9, 9), 19, 43)));
    }

    #[test]
    fn summer_days_are_longer_than_winter_days() {
        let observer = Observer::la_push();
        let june = sun_times(&observer, NaiveDate::from_ymd_opt(2024, 6, 21).unwrap()).unwrap();
        let solstice = NaiveDate::from_ymd_opt(2024, 12, 21).unwrap();
        let december = sun_times(&observer, solstice).unwrap();
        let june_len = june.sunset - june.sunrise;
        let december_len = december.sunset - december.sunrise;
        assert!(june_len > Duration::hours(15));
        assert!(december_len < Duration::hours(9));
    }

    #[test]
    fn refraction_near_horizon_is_about_half_a_degree() {
        let r = refraction_at_zenith(90.0 + SUN_APPARENT_RADIUS);
        assert!((r - 0.5224).abs() < 1e-3, "refraction {r}");
    }
}
