//! # NOAA Tide Data Fetching and Caching
//!
//! This module turns one calendar day into a [`TideSeries`]: predicted heights
//! from NOAA's Tides and Currents data API, each tagged with a daylight flag.
//!
//! ## Data Source
//!
//! ### NOAA CO-OPS Data API
//! - **URL**: `https://api.tidesandcurrents.noaa.gov/api/prod/datagetter`
//! - **Station**: 9442396 (La Push, WA), configurable
//! - **Format**: JSON, `{"predictions": [{"t": "2024-04-13 00:00", "v": "5.123"}, ...]}`
//! - **Cadence**: 6 minutes, 240 samples per day, MLLW datum, feet,
//!   local standard/daylight time
//!
//! ### Pipeline
//! 1. **Cache**: return the cached series if one is still valid
//! 2. **Fetch**: one HTTP GET for the day ([`NoaaClient`])
//! 3. **Daylight**: sunrise/sunset at the reference location ([`crate::solar`])
//! 4. **Store**: cache the finished series for 24 hours
//!
//! ## Layering
//!
//! - [`TideFetcher`]: the raw upstream call, replaceable in tests
//! - [`TideSource`]: what the analyzer consumes, a finished day of samples
//! - [`TideProvider`]: the production `TideSource`, combining a fetcher, a
//!   [`TideCache`] and the daylight computation
//!
//! ## Error Handling
//!
//! Transport failures, non-success statuses and NOAA's embedded
//! `{"error": {"message": ...}}` payloads all surface as
//! [`TrekError::Upstream`]. Nothing here retries and nothing falls back to
//! synthetic data: a route computed from partial tides would be dangerous.

use crate::cache::{TideCache, DEFAULT_TTL};
use crate::config::StationConfig;
use crate::error::{Result, TrekError};
use crate::solar::{self, Observer};
use crate::{TideSample, TideSeries};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

/// A raw prediction as delivered by the upstream service.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    pub timestamp: NaiveDateTime,
    pub height_ft: f64,
}

/// Upstream boundary: predicted heights for one day at native cadence.
pub trait TideFetcher: Send + Sync {
    fn fetch_predictions(&self, day: NaiveDate) -> Result<Vec<Prediction>>;
}

/// A finished day of daylight-tagged samples.
pub trait TideSource {
    fn tide_series(&self, day: NaiveDate) -> Result<TideSeries>;
}

/// Wire format of the datagetter endpoint.
#[derive(Debug, Deserialize)]
struct NoaaResponse {
    predictions: Option<Vec<NoaaPrediction>>,
    error: Option<NoaaErrorBody>,
}

#[derive(Debug, Deserialize)]
struct NoaaPrediction {
    t: String,
    v: String,
}

#[derive(Debug, Deserialize)]
struct NoaaErrorBody {
    message: String,
}

/// Blocking NOAA client.
///
/// The HTTP call is async (`reqwest`), bridged to the synchronous
/// [`TideFetcher`] interface by blocking on a Tokio runtime. Inside an existing
/// multi-threaded runtime the caller's handle is used via `block_in_place`;
/// otherwise the client's own current-thread runtime drives the request.
pub struct NoaaClient {
    client: Client,
    station: StationConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for NoaaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoaaClient")
            .field("station", &self.station)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl NoaaClient {
    pub fn new(station: StationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(station.timeout_secs))
            .build()
            .map_err(|err| TrekError::upstream(format!("failed to build HTTP client: {err}")))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| TrekError::upstream(format!("failed to build Tokio runtime: {err}")))?;
        Ok(NoaaClient {
            client,
            station,
            runtime,
        })
    }

    async fn fetch_async(&self, day: NaiveDate) -> Result<Vec<Prediction>> {
        let date = day.format("%Y%m%d").to_string();
        let response = self
            .client
            .get(&self.station.base_url)
            .query(&[
                ("begin_date", date.as_str()),
                ("end_date", date.as_str()),
                ("product", "predictions"),
                ("datum", "MLLW"),
                ("units", "english"),
                ("time_zone", "lst_ldt"),
                ("station", self.station.id.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        parse_predictions(&body)
    }
}

impl TideFetcher for NoaaClient {
    fn fetch_predictions(&self, day: NaiveDate) -> Result<Vec<Prediction>> {
        info!(
            "fetching tide predictions for {day} from station {} ({})",
            self.station.id, self.station.name
        );
        let future = self.fetch_async(day);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

/// Decode a datagetter response body.
pub(crate) fn parse_predictions(body: &str) -> Result<Vec<Prediction>> {
    let response: NoaaResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(TrekError::upstream(error.message));
    }
    let rows = response
        .predictions
        .ok_or_else(|| TrekError::upstream("response contained no predictions"))?;

    rows.into_iter()
        .map(|row| {
            let timestamp = NaiveDateTime::parse_from_str(row.t.trim(), "%Y-%m-%d %H:%M")
                .map_err(|_| TrekError::upstream(format!("bad prediction time '{}'", row.t)))?;
            let height_ft = row
                .v
                .trim()
                .parse()
                .map_err(|_| TrekError::upstream(format!("bad prediction height '{}'", row.v)))?;
            Ok(Prediction {
                timestamp,
                height_ft,
            })
        })
        .collect()
}

/// Cached, daylight-tagged tide series per calendar day.
///
/// The provider owns its cache and fetcher; both are injected at
/// construction. Concurrent requests for the same uncached day are
/// serialized on a per-day lock, so only the first caller hits the network
/// and the rest are answered from the cache. A failed fetch is not cached.
pub struct TideProvider {
    fetcher: Box<dyn TideFetcher>,
    cache: Box<dyn TideCache>,
    observer: Observer,
    ttl: Duration,
    in_flight: Mutex<HashMap<NaiveDate, Arc<Mutex<()>>>>,
}

impl TideProvider {
    pub fn new(
        fetcher: impl TideFetcher + 'static,
        cache: impl TideCache + 'static,
        observer: Observer,
    ) -> Self {
        TideProvider {
            fetcher: Box::new(fetcher),
            cache: Box::new(cache),
            observer,
            ttl: DEFAULT_TTL,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Override the cache entry lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    fn day_lock(&self, day: NaiveDate) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(in_flight.entry(day).or_default())
    }

    /// Drop the day's lock once nobody else holds or waits on it.
    fn release_day(&self, day: NaiveDate, lock: Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one in `lock`
        let idle = in_flight
            .get(&day)
            .is_some_and(|entry| Arc::ptr_eq(entry, &lock) && Arc::strong_count(entry) == 2);
        if idle {
            in_flight.remove(&day);
        }
    }

    fn cached_or_fetched(&self, day: NaiveDate) -> Result<TideSeries> {
        // Another caller may have filled the cache while we waited
        if let Some(series) = self.cache.get(day) {
            debug!("tide cache filled by concurrent fetch for {day}");
            return Ok(series);
        }

        let series = self.fetch_series(day)?;
        self.cache.put(day, &series, self.ttl);
        Ok(series)
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn fetch_series(&self, day: NaiveDate) -> Result<TideSeries> {
        let predictions = self.fetcher.fetch_predictions(day)?;
        let series = build_series(&self.observer, day, predictions)?;
        debug!("built {} tide samples for {day}", series.samples.len());
        Ok(series)
    }
}

impl TideSource for TideProvider {
    fn tide_series(&self, day: NaiveDate) -> Result<TideSeries> {
        if let Some(series) = self.cache.get(day) {
            debug!("tide cache hit for {day}");
            return Ok(series);
        }

        let lock = self.day_lock(day);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.cached_or_fetched(day)
        };
        self.release_day(day, lock);
        result
    }
}

impl<S: TideSource + ?Sized> TideSource for &S {
    fn tide_series(&self, day: NaiveDate) -> Result<TideSeries> {
        (**self).tide_series(day)
    }
}

impl<S: TideSource + ?Sized> TideSource for Arc<S> {
    fn tide_series(&self, day: NaiveDate) -> Result<TideSeries> {
        (**self).tide_series(day)
    }
}

/// Keep the predictions that fall on `day`, in time order, and tag daylight.
pub fn build_series(
    observer: &Observer,
    day: NaiveDate,
    mut predictions: Vec<Prediction>,
) -> Result<TideSeries> {
    predictions.retain(|p| p.timestamp.date() == day);
    if predictions.is_empty() {
        return Err(TrekError::upstream(format!("no tide predictions for {day}")));
    }
    predictions.sort_by_key(|p| p.timestamp);

    let timestamps: Vec<NaiveDateTime> = predictions.iter().map(|p| p.timestamp).collect();
    let light = solar::is_light(observer, &timestamps)?;

    let samples = predictions
        .iter()
        .zip(light)
        .map(|(p, is_light)| TideSample {
            timestamp: p.timestamp,
            height_ft: p.height_ft,
            is_light,
        })
        .collect();
    Ok(TideSeries { date: day, samples })
}
