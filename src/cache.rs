//! # Day-Keyed Tide Cache
//!
//! Tide predictions for a calendar day never change, so each day is fetched
//! from NOAA once and then served from a cache until its time-to-live runs
//! out (24 hours by default).
//!
//! The cache is an explicit dependency of [`TideProvider`](crate::tide_data::TideProvider):
//! the application constructs one at start-up and hands it over, and tests
//! can substitute an in-memory instance.
//!
//! ## Backends
//!
//! - [`MemoryCache`]: process-local map, used by tests and short-lived runs
//! - [`DiskCache`]: one JSON file per day under a cache directory
//!   (`~/.tide-cache` by default), so repeated CLI invocations share data
//!
//! Cache failures are never fatal. A corrupt or unreadable entry is a miss and
//! a failed write only costs a future re-fetch.

use crate::TideSeries;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use std::{fs, io};

/// Default entry lifetime (24 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(86_400);

/// Storage contract for per-day tide series.
pub trait TideCache: Send + Sync {
    /// Return the cached series for `day`, or `None` on a miss or expiry.
    fn get(&self, day: NaiveDate) -> Option<TideSeries>;

    /// Store `series` for `day`, valid for `ttl` from now.
    fn put(&self, day: NaiveDate, series: &TideSeries, ttl: Duration);
}

/// In-process cache backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<NaiveDate, MemoryEntry>>,
}

#[derive(Debug)]
struct MemoryEntry {
    stored_at: Instant,
    ttl: Duration,
    series: TideSeries,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TideCache for MemoryCache {
    fn get(&self, day: NaiveDate) -> Option<TideSeries> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&day) {
            Some(entry) if entry.stored_at.elapsed() < entry.ttl => Some(entry.series.clone()),
            Some(_) => {
                debug!("cached tides for {day} expired");
                entries.remove(&day);
                None
            }
            None => None,
        }
    }

    fn put(&self, day: NaiveDate, series: &TideSeries, ttl: Duration) {
        let entry = MemoryEntry {
            stored_at: Instant::now(),
            ttl,
            series: series.clone(),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(day, entry);
    }
}

/// Persistent cache storing one JSON document per day.
///
/// Each file holds the series together with its absolute expiry time, so the
/// lifetime survives process restarts. Writes go to a temporary file first
/// and are renamed into place.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct DiskEntry {
    expires_at: DateTime<Utc>,
    series: TideSeries,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DiskCache { dir: dir.into() }
    }

    /// `$HOME/.tide-cache`, or `./.tide-cache` when no home is set.
    pub fn default_dir() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tide-cache")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, day: NaiveDate) -> PathBuf {
        self.dir.join(format!("tides-{}.json", day.format("%Y-%m-%d")))
    }

    fn load(&self, day: NaiveDate) -> Result<DiskEntry, io::Error> {
        let data = fs::read(self.entry_path(day))?;
        let entry: DiskEntry = serde_json::from_slice(&data)?;
        Ok(entry)
    }

    fn store(&self, day: NaiveDate, entry: &DiskEntry) -> Result<(), io::Error> {
        fs::create_dir_all(&self.dir)?;
        let path = self.entry_path(day);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(entry)?)?;
        fs::rename(&tmp, &path)
    }
}

impl TideCache for DiskCache {
    fn get(&self, day: NaiveDate) -> Option<TideSeries> {
        match self.load(day) {
            Ok(entry) if entry.expires_at > Utc::now() => Some(entry.series),
            Ok(_) => {
                debug!("cached tides for {day} expired");
                None
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("ignoring unreadable tide cache entry for {day}: {err}");
                None
            }
        }
    }

    fn put(&self, day: NaiveDate, series: &TideSeries, ttl: Duration) {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let entry = DiskEntry {
            expires_at: Utc::now().checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            series: series.clone(),
        };
        if let Err(err) = self.store(day, &entry) {
            warn!("failed to write tide cache entry for {day}: {err}");
        }
    }
}
