//! Campsite combinations that fit a daily distance budget.

use crate::error::{Result, TrekError};
use crate::trail::Waypoint;

/// Overnight stops for one candidate trip, in travel order.
pub type CampsiteCombination = Vec<&'static str>;

/// Every `nights`-sized choice of campsites, in trail order, whose daily
/// distances all fall within `[min_daily_distance, max_daily_distance]`.
///
/// `waypoints` must be a full direction-adjusted section: the first and last
/// entries are the trailheads the trip starts and ends at. Combinations are
/// produced in lexicographic order of campsite position.
pub fn enumerate_campsite_combinations(
    waypoints: &[Waypoint],
    nights: i64,
    min_daily_distance: f64,
    max_daily_distance: f64,
) -> Result<Vec<CampsiteCombination>> {
    if nights < 1 {
        return Err(TrekError::invalid("`nights` must be at least 1"));
    }
    if !(min_daily_distance > 0.0 && max_daily_distance > 0.0) {
        return Err(TrekError::invalid(
            "`min_daily_distance` and `max_daily_distance` must both be positive",
        ));
    }
    if min_daily_distance > max_daily_distance {
        return Err(TrekError::invalid(
            "`min_daily_distance` must not be greater than `max_daily_distance`",
        ));
    }
    let (Some(start), Some(end)) = (waypoints.first(), waypoints.last()) else {
        return Ok(Vec::new());
    };

    let campsites: Vec<&Waypoint> = waypoints.iter().filter(|w| w.is_campsite).collect();
    let Ok(size) = usize::try_from(nights) else {
        return Ok(Vec::new());
    };

    let within_budget = |from: f64, to: f64| {
        let gap = to - from;
        min_daily_distance <= gap && gap <= max_daily_distance
    };

    let valid = Combinations::new(campsites.len(), size)
        .filter(|indices| {
            let stops = std::iter::once(start.distance_miles)
                .chain(indices.iter().map(|&i| campsites[i].distance_miles))
                .chain(std::iter::once(end.distance_miles))
                .collect::<Vec<_>>();
            stops.windows(2).all(|pair| within_budget(pair[0], pair[1]))
        })
        .map(|indices| indices.iter().map(|&i| campsites[i].name).collect())
        .collect();
    Ok(valid)
}

/// Index combinations of `k` out of `n`, lexicographic.
struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Combinations {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        // Advance the rightmost index that still has room
        let k = self.indices.len();
        match (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(current)
    }
}
