//! CLI entry point for the Kenya air-quality client.
//!
//! Lists OpenAQ monitoring stations and prints the latest readings for one,
//! either directly or through the same view-state holder a UI would use.

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use kenya_air::config::Config;
use kenya_air::output::{append_readings, readings_json};
use kenya_air::present::{
    aqi_category, format_value, pollutant_pretty_name, reading_time, station_coordinates,
    station_subtitle, station_title,
};
use kenya_air::{LatestResult, Location, ReadingResolver, StationBrowser, StationQuery, UiState};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "kenya_air")]
#[command(about = "Air-quality stations and latest readings from OpenAQ", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List monitoring stations for a country
    Stations {
        /// ISO country code
        #[arg(short, long, default_value = "KE")]
        country: String,

        /// Page size
        #[arg(short, long, default_value_t = 100)]
        limit: u32,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show the latest readings for a station
    Latest {
        /// OpenAQ location id
        #[arg(value_name = "STATION_ID")]
        station_id: i64,

        /// CSV file to append the readings to
        #[arg(long)]
        csv: Option<String>,

        /// Print readings as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Load stations and optionally open one, as an interactive client would
    Browse {
        /// ISO country code
        #[arg(short, long, default_value = "KE")]
        country: String,

        /// Station to open after the list is loaded
        #[arg(short, long)]
        station: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/kenya_air.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("kenya_air.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    info!(base_url = %config.base_url, style = %config.latest_style, "Configuration loaded");
    let resolver = ReadingResolver::new(config.build_client()?);

    match cli.command {
        Commands::Stations {
            country,
            limit,
            page,
        } => {
            let query = StationQuery {
                country,
                limit,
                page,
            };
            let stations = resolver.list_stations(&query).await?;
            print_stations(&stations);
        }
        Commands::Latest {
            station_id,
            csv,
            json,
        } => {
            let readings = resolver.resolve_latest(station_id).await?;

            if json {
                println!("{}", readings_json(&readings)?);
            } else {
                print_readings(&readings);
            }

            if let Some(path) = csv {
                let rows = append_readings(&path, station_id, &readings)?;
                info!(path = %path, rows, "Readings appended");
            }
        }
        Commands::Browse { country, station } => {
            let query = StationQuery {
                country,
                ..Default::default()
            };
            browse(StationBrowser::new(resolver, query), station).await;
        }
    }

    Ok(())
}

async fn browse<A: kenya_air::AirQualityApi>(browser: StationBrowser<A>, station: Option<i64>) {
    let state = browser.state();

    browser.load_stations().await;
    if let UiState::Error(message) = &*state.borrow() {
        println!("Error: {message}");
        return;
    }

    let stations = browser.stations().borrow().clone();
    println!("Kenya Air Quality Stations");
    print_stations(&stations);

    let Some(id) = station else {
        return;
    };
    let location = stations
        .into_iter()
        .find(|s| s.id == id)
        .unwrap_or_else(|| Location::from_id(id));

    browser.open_station(location).await;

    if let Some(selected) = browser.selected() {
        println!();
        println!("{}", station_title(&selected));
        let locality = selected
            .locality
            .clone()
            .or_else(|| selected.country.as_ref().and_then(|c| c.name.clone()))
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| "N/A".to_string());
        println!("{locality}");
    }

    if let UiState::Error(message) = &*state.borrow() {
        println!("Error: {message}");
        return;
    }
    print_readings(&browser.latest().borrow());
}

fn print_stations(stations: &[Location]) {
    for s in stations {
        println!("[{}] {}", s.id, station_title(s));
        println!("      {}", station_subtitle(s));
        if let Some(coords) = station_coordinates(s) {
            println!("      {coords}");
        }
    }
}

fn print_readings(readings: &[LatestResult]) {
    if readings.is_empty() {
        println!("No recent readings found.");
        return;
    }
    for r in readings {
        println!("{}", pollutant_pretty_name(r.parameter.as_deref()));
        println!("  {}", format_value(r.value, r.unit.as_deref()));
        if let Some(category) = aqi_category(r.parameter.as_deref(), r.value) {
            println!("  Air quality: {category}");
        }
        println!("  Time: {}", reading_time(r, &Local));
    }
}
