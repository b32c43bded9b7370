//! One run: locate → fetch → derive.
//!
//! Upstream failures are logged and end the run; nothing is retried.

use chrono::{DateTime, Utc};

use crate::cycle::{DayCycle, TintRange};
use crate::location::LocationProvider;
use crate::weather::{WeatherReport, WeatherSource};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub report: WeatherReport,
    pub cycle: DayCycle,
}

pub async fn run<L, W>(
    locator: &L,
    weather: &W,
    now: DateTime<Utc>,
    tint: TintRange,
) -> Option<Outcome>
where
    L: LocationProvider,
    W: WeatherSource,
{
    let coords = match locator.locate().await {
        Ok(c) => c,
        Err(e) => {
            log::warn!("{}", e);
            return None;
        }
    };
    log::info!("Your current position is:");
    log::info!("Latitude: {}", coords.latitude);
    log::info!("Longitude: {}", coords.longitude);

    let report = match weather.current(coords).await {
        Ok(r) => r,
        Err(e) => {
            log::error!("Failed to fetch weather: {}", e);
            return None;
        }
    };

    let cycle = DayCycle::derive(now, &report, tint);
    log::info!("{}", cycle.phase.label());
    log::debug!(
        "bloom window {} .. {} ({})",
        cycle.bloom.start,
        cycle.bloom.end,
        cycle.flower
    );
    log::info!("redtint value {}", cycle.red());

    Some(Outcome { report, cycle })
}
