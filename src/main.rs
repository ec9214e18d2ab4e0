//! # Coast Treks Command Line
//!
//! Plans tide-safe multi-day hikes on the Olympic Coast and prints the result
//! as JSON on stdout. Log output goes to stderr (`RUST_LOG`, default `info`).
//!
//! ```text
//! coast-treks routes --section south --start-date 2024-04-13 --end-date 2024-04-15
//! coast-treks leg --from "Oil City" --to "Mosquito Creek" --start-time 2024-04-13T08:00:00
//! coast-treks tides --date 2024-04-13
//! ```
//!
//! Tide predictions are cached on disk per day, so repeated runs for the same
//! dates only contact NOAA once a day.

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use coast_treks::cache::DiskCache;
use coast_treks::config::{Config, CONFIG_FILE};
use coast_treks::leg_chart::{leg_chart, LegChartRequest};
use coast_treks::routes::{calc_routes, RouteRequest};
use coast_treks::tide_data::{NoaaClient, TideProvider, TideSource};
use coast_treks::trail::{Direction, Section};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Tide-aware itinerary planner for the Olympic Coast")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find every feasible trip between two dates
    Routes {
        /// south, middle or north
        #[arg(long)]
        section: Section,

        /// north or south
        #[arg(long, default_value = "north")]
        direction: Direction,

        /// First hiking day (YYYY-MM-DD)
        #[arg(long)]
        start_date: NaiveDate,

        /// Last hiking day (YYYY-MM-DD)
        #[arg(long)]
        end_date: NaiveDate,

        /// Minimum miles per day (defaults to config)
        #[arg(long)]
        min_daily_distance: Option<f64>,

        /// Maximum miles per day (defaults to config)
        #[arg(long)]
        max_daily_distance: Option<f64>,

        /// Walking speed in mph (defaults to config)
        #[arg(long)]
        speed: Option<f64>,

        /// Feet to keep below each restriction (defaults to config)
        #[arg(long)]
        min_buffer: Option<f64>,
    },

    /// Describe a single leg for charting
    Leg {
        /// Starting waypoint name
        #[arg(long)]
        from: String,

        /// Ending waypoint name
        #[arg(long)]
        to: String,

        /// Departure time (YYYY-MM-DDTHH:MM:SS, local)
        #[arg(long)]
        start_time: NaiveDateTime,

        #[arg(long)]
        speed: Option<f64>,

        #[arg(long)]
        min_buffer: Option<f64>,
    },

    /// Print one day of daylight-tagged tide predictions
    Tides {
        #[arg(long)]
        date: NaiveDate,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load_from_path(&cli.config);
    let provider = build_provider(&config)?;
    let defaults = &config.defaults;

    match cli.command {
        Command::Routes {
            section,
            direction,
            start_date,
            end_date,
            min_daily_distance,
            max_daily_distance,
            speed,
            min_buffer,
        } => {
            let request = RouteRequest {
                start_date,
                end_date,
                section,
                direction,
                min_daily_distance: min_daily_distance.unwrap_or(defaults.min_daily_distance),
                max_daily_distance: max_daily_distance.unwrap_or(defaults.max_daily_distance),
                speed: speed.unwrap_or(defaults.speed),
                min_buffer: min_buffer.unwrap_or(defaults.min_buffer),
            };
            let rows = calc_routes(&provider, &request).context("route search failed")?;
            print_json(&rows, cli.pretty)
        }
        Command::Leg {
            from,
            to,
            start_time,
            speed,
            min_buffer,
        } => {
            let request = LegChartRequest {
                start_location: from,
                end_location: to,
                start_time,
                speed: speed.unwrap_or(defaults.speed),
                min_buffer: min_buffer.unwrap_or(defaults.min_buffer),
            };
            let chart = leg_chart(&provider, &request).context("leg chart failed")?;
            print_json(&chart, cli.pretty)
        }
        Command::Tides { date } => {
            let series = provider
                .tide_series(date)
                .with_context(|| format!("could not load tides for {date}"))?;
            print_json(&series, cli.pretty)
        }
    }
}

fn build_provider(config: &Config) -> anyhow::Result<TideProvider> {
    let cache_dir = config.cache.dir.clone().unwrap_or_else(DiskCache::default_dir);
    info!("using tide cache at {}", cache_dir.display());

    let client = NoaaClient::new(config.station.clone()).context("failed to set up NOAA client")?;
    let observer = config.observer().context("invalid [location] configuration")?;
    Ok(TideProvider::new(client, DiskCache::new(cache_dir), observer).with_ttl(config.cache_ttl()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
