//! nightbloom - is the flower open right now?
//!
//! Usage:
//!   nightbloom                          # locate by IP, imperial units
//!   nightbloom --lat 41.39 --lon 2.17   # fixed location
//!   nightbloom -c nightbloom.yaml       # load config file
//!   nightbloom -f json                  # output as JSON (table, json, yaml)
//!   nightbloom --at 1718470800000       # evaluate at a fixed instant (unix ms)

use anyhow::{anyhow, Context, Result};
use argh::FromArgs;
use chrono::{DateTime, Utc};
use nightbloom::{Config, Coordinates, Locator, OpenWeatherClient, OutputFormat, PageState, Units};

#[derive(FromArgs)]
/// Night-blooming flower status from local sunrise, sunset and temperature
struct Args {
    /// path to the configuration file (optional, uses defaults with auto-discovery)
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// latitude in decimal degrees (requires --lon)
    #[argh(option)]
    lat: Option<f64>,

    /// longitude in decimal degrees (requires --lat)
    #[argh(option)]
    lon: Option<f64>,

    /// units: imperial, metric, standard (default: from config, else imperial)
    #[argh(option, short = 'u')]
    units: Option<Units>,

    /// output format: table, json, yaml (default: table)
    #[argh(option, short = 'f', default = "OutputFormat::Table")]
    format: OutputFormat,

    /// evaluate at this instant instead of now (unix milliseconds)
    #[argh(option)]
    at: Option<i64>,
}

fn resolve_now(at: Option<i64>) -> Result<DateTime<Utc>> {
    match at {
        Some(ms) => DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| anyhow!("--at {} is out of range", ms)),
        None => Ok(Utc::now()),
    }
}

fn resolve_coordinates(args: &Args, config: &Config) -> Result<Option<Coordinates>> {
    match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Ok(Some(Coordinates::new(lat, lon))),
        (None, None) => Ok(config.location),
        _ => Err(anyhow!("--lat and --lon must be given together")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    // Load configuration (or use defaults)
    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from '{}'", path))?,
        None => {
            log::info!("No config file specified, using defaults");
            Config::default()
        }
    };

    let now = resolve_now(args.at)?;
    let locator = Locator::new(resolve_coordinates(&args, &config)?);
    let units = args.units.unwrap_or(config.weather.units);
    let client = OpenWeatherClient::from_key_or_env(config.weather.api_key.as_deref(), units)?
        .with_base_url(config.weather.base_url.as_str());

    let Some(outcome) = nightbloom::run(&locator, &client, now, config.tint).await else {
        std::process::exit(1);
    };

    let page = PageState::from_cycle(&outcome.cycle).with_location(outcome.report.location);
    println!("{}", page.render(args.format)?);

    Ok(())
}
