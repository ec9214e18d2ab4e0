//! # Trail Registry
//!
//! Static waypoint and tidal-restriction tables for the three Olympic Coast
//! sections, plus the direction transform that re-expresses them for a
//! south-bound hike.
//!
//! ## Distance Space
//!
//! The tables are written south to north: every distance is measured in miles
//! from the section's southern trailhead. For a south-bound hike distances are
//! flipped to `max - d`, the waypoint list is reversed, and each restriction
//! `(start, end)` becomes `(max - end, max - start)` before being re-sorted.
//! After the transform, distances always grow in the direction of travel.
//!
//! ## Identity
//!
//! Waypoint names are unique within a section and do not change with
//! direction. The `id` field is the position in the direction-adjusted list and
//! is only meaningful together with the direction that produced it.

use crate::error::{Result, TrekError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three fixed coastal segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Oil City to La Push Road (the south coast)
    South,
    /// Rialto Beach to the Ozette trailhead
    Middle,
    /// Ozette trailhead to Hatchery Road
    North,
}

impl Section {
    /// All sections in table order.
    pub const ALL: [Section; 3] = [Section::South, Section::Middle, Section::North];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::South => "south",
            Section::Middle => "middle",
            Section::North => "north",
        }
    }

    fn tables(self) -> (&'static [WaypointRecord], &'static [RestrictionZone]) {
        match self {
            Section::South => (SOUTH_WAYPOINTS, SOUTH_RESTRICTIONS),
            Section::Middle => (MIDDLE_WAYPOINTS, MIDDLE_RESTRICTIONS),
            Section::North => (NORTH_WAYPOINTS, NORTH_RESTRICTIONS),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = TrekError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "south" => Ok(Section::South),
            "middle" => Ok(Section::Middle),
            "north" => Ok(Section::North),
            _ => Err(TrekError::invalid(
                "`section` must be one of 'south', 'middle' or 'north'",
            )),
        }
    }
}

/// Direction of travel along a section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::North, Direction::South];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = TrekError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "north" => Ok(Direction::North),
            "south" => Ok(Direction::South),
            _ => Err(TrekError::invalid(
                "`direction` must be either 'north' or 'south'",
            )),
        }
    }
}

/// A named point along a section, in direction-adjusted distance space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Waypoint {
    /// Position in the direction-adjusted list (0 = starting trailhead)
    pub id: usize,
    pub name: &'static str,
    /// Miles from the starting trailhead in the direction of travel
    pub distance_miles: f64,
    pub is_campsite: bool,
    pub is_trailhead: bool,
}

/// A tide-controlled stretch of trail.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestrictionZone {
    /// Highest tide (feet, MLLW) at which the stretch can be walked
    pub restriction_ft: f64,
    pub start_miles: f64,
    pub end_miles: f64,
    /// An inland bypass exists, so the tide never blocks this stretch
    pub headland_alternative: bool,
}

impl RestrictionZone {
    /// True when the zone shares at least one point with `[from, to]`.
    pub fn overlaps(&self, from_miles: f64, to_miles: f64) -> bool {
        self.end_miles >= from_miles && self.start_miles <= to_miles
    }
}

/// Waypoints for a section in direction-adjusted order.
///
/// The first and last entries are always trailheads and distances are
/// non-decreasing.
pub fn waypoints(section: Section, direction: Direction) -> Vec<Waypoint> {
    let (records, _) = section.tables();
    let max_distance = section_length(records);

    let ordered: Vec<Waypoint> = match direction {
        Direction::North => records.iter().map(|r| r.to_waypoint(r.distance_miles)).collect(),
        Direction::South => records
            .iter()
            .rev()
            .map(|r| r.to_waypoint(max_distance - r.distance_miles))
            .collect(),
    };

    ordered
        .into_iter()
        .enumerate()
        .map(|(id, waypoint)| Waypoint { id, ..waypoint })
        .collect()
}

/// Restriction zones for a section, sorted by `start_miles` in the
/// direction-adjusted distance space.
pub fn restrictions(section: Section, direction: Direction) -> Vec<RestrictionZone> {
    let (records, zones) = section.tables();
    let mut zones: Vec<RestrictionZone> = match direction {
        Direction::North => zones.to_vec(),
        Direction::South => {
            let max_distance = section_length(records);
            zones
                .iter()
                .map(|zone| RestrictionZone {
                    start_miles: max_distance - zone.end_miles,
                    end_miles: max_distance - zone.start_miles,
                    ..*zone
                })
                .collect()
        }
    };
    zones.sort_by(|a, b| a.start_miles.total_cmp(&b.start_miles));
    zones
}

/// Sections whose tables contain a waypoint called `name`.
///
/// Trailheads shared by two sections (e.g. "Ozette Trailhead") appear in both.
pub fn sections_containing(name: &str) -> Vec<Section> {
    Section::ALL
        .into_iter()
        .filter(|section| section.tables().0.iter().any(|r| r.name == name))
        .collect()
}

/// Section tables resolved for one direction of travel.
#[derive(Clone, Debug)]
pub struct Trail {
    pub section: Section,
    pub direction: Direction,
    pub waypoints: Vec<Waypoint>,
    pub restrictions: Vec<RestrictionZone>,
}

impl Trail {
    pub fn new(section: Section, direction: Direction) -> Self {
        Trail {
            section,
            direction,
            waypoints: waypoints(section, direction),
            restrictions: restrictions(section, direction),
        }
    }

    /// Parse section and direction names and resolve the tables.
    pub fn load(section: &str, direction: &str) -> Result<Self> {
        Ok(Trail::new(section.parse()?, direction.parse()?))
    }

    pub fn find(&self, name: &str) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.name == name)
    }

    /// Waypoints from `start` to `end` inclusive, in travel order.
    ///
    /// Fails when either name is unknown or `start` does not come strictly
    /// before `end` in this direction.
    pub fn stretch(&self, start: &str, end: &str) -> Result<&[Waypoint]> {
        let start_id = self
            .find(start)
            .ok_or_else(|| TrekError::invalid(format!("unknown start location '{start}'")))?
            .id;
        let end_id = self
            .find(end)
            .ok_or_else(|| TrekError::invalid(format!("unknown end location '{end}'")))?
            .id;
        if start_id >= end_id {
            return Err(TrekError::invalid(format!(
                "'{start}' must come before '{end}' when hiking {}",
                self.direction
            )));
        }
        self.waypoints
            .get(start_id..=end_id)
            .ok_or_else(|| TrekError::invalid("waypoint range out of bounds"))
    }

    /// Starting and ending trailheads.
    pub fn trailheads(&self) -> Option<(&Waypoint, &Waypoint)> {
        Some((self.waypoints.first()?, self.waypoints.last()?))
    }
}

fn section_length(records: &[WaypointRecord]) -> f64 {
    records
        .iter()
        .map(|r| r.distance_miles)
        .fold(0.0, f64::max)
}

// -- Static tables --

#[derive(Clone, Copy, Debug)]
struct WaypointRecord {
    name: &'static str,
    distance_miles: f64,
    campsite: bool,
    trailhead: bool,
}

impl WaypointRecord {
    fn to_waypoint(self, distance_miles: f64) -> Waypoint {
        Waypoint {
            id: 0,
            name: self.name,
            distance_miles,
            is_campsite: self.campsite,
            is_trailhead: self.trailhead,
        }
    }
}

const fn trailhead(name: &'static str, distance_miles: f64) -> WaypointRecord {
    WaypointRecord {
        name,
        distance_miles,
        campsite: false,
        trailhead: true,
    }
}

const fn campsite(name: &'static str, distance_miles: f64) -> WaypointRecord {
    WaypointRecord {
        name,
        distance_miles,
        campsite: true,
        trailhead: false,
    }
}

const fn landmark(name: &'static str, distance_miles: f64) -> WaypointRecord {
    WaypointRecord {
        name,
        distance_miles,
        campsite: false,
        trailhead: false,
    }
}

const fn zone(
    restriction_ft: f64,
    start_miles: f64,
    end_miles: f64,
    headland: bool,
) -> RestrictionZone {
    RestrictionZone {
        restriction_ft,
        start_miles,
        end_miles,
        headland_alternative: headland,
    }
}

#[rustfmt::skip]
const SOUTH_WAYPOINTS: &[WaypointRecord] = &[
    trailhead("Oil City", 0.0),
    landmark("Headland trail north of Oil City", 0.6),
    landmark("Jefferson Cove", 2.6),
    campsite("Mosquito Creek", 6.1),
    landmark("Headland trail south of Goodman Creek", 8.3),
    landmark("Headland trail north of Goodman Creek", 9.8),
    campsite("Toleak Point", 10.7),
    campsite("Strawberry Point", 11.7),
    campsite("Scott Creek", 13.1),
    landmark("Headland trail north of Scotts Bluff", 13.4),
    landmark("Headland trail south of Taylor Point", 14.0),
    landmark("Headland trail on Strawberry Bay", 15.2),
    campsite("Third Beach", 15.6),
    trailhead("La Push Road", 17.0),
];

#[rustfmt::skip]
const SOUTH_RESTRICTIONS: &[RestrictionZone] = &[
    zone(5.0, 0.6, 0.8, false),
    zone(3.0, 1.4, 1.8, false),
    zone(2.0, 1.8, 2.2, false),
    zone(4.0, 12.5, 12.9, false),
    zone(1.0, 13.1, 13.4, true),
    zone(4.5, 14.0, 14.1, true),
];

#[rustfmt::skip]
const MIDDLE_WAYPOINTS: &[WaypointRecord] = &[
    trailhead("Rialto Beach", 0.0),
    landmark("Ellen Creek", 0.8),
    campsite("Hole-in-the-Wall", 1.4),
    campsite("Chilean Memorial", 3.7),
    landmark("Cape Johnson", 4.4),
    landmark("Headland trail south of Jagged Island", 6.6),
    landmark("Headland trail north of Jagged Island", 7.6),
    campsite("Cedar Creek", 8.8),
    campsite("Norwegian Memorial", 10.0),
    campsite("Yellow Banks", 15.1),
    campsite("South Sand Point", 16.6),
    campsite("Sand Point", 17.2),
    trailhead("Ozette Trailhead", 20.2),
];

#[rustfmt::skip]
const MIDDLE_RESTRICTIONS: &[RestrictionZone] = &[
    zone(5.0, 1.2, 1.6, true),
    zone(5.0, 2.3, 2.7, false),
    zone(4.0, 4.2, 4.6, false),
    zone(5.5, 5.0, 5.4, false),
    zone(4.0, 7.2, 7.8, true),
    zone(5.5, 8.8, 9.2, true),
    zone(6.0, 11.9, 12.3, false),
    zone(5.0, 14.9, 15.3, false),
];

#[rustfmt::skip]
const NORTH_WAYPOINTS: &[WaypointRecord] = &[
    trailhead("Ozette Trailhead", 0.0),
    campsite("Cape Alava", 3.3),
    landmark("Tskawahyah Island", 4.1),
    campsite("South Side of Ozette River", 5.6),
    campsite("North Side of Ozette River", 5.7),
    campsite("Seafield Creek", 7.7),
    landmark("Point of Arches", 11.3),
    campsite("Petroleum Creek", 12.3),
    landmark("Headland trail to Hatchery Road", 13.7),
    trailhead("Hatchery Road", 15.9),
];

#[rustfmt::skip]
const NORTH_RESTRICTIONS: &[RestrictionZone] = &[
    zone(5.0, 4.7, 5.1, false),
    zone(4.0, 5.1, 5.5, false),
    zone(6.0, 5.9, 6.3, false),
    zone(5.5, 8.9, 9.2, false),
    zone(4.0, 9.2, 9.3, true),
    zone(6.0, 10.5, 10.9, false),
    zone(4.5, 11.2, 11.5, true),
];
