//! Night-blooming flower driven by local sunrise, sunset and temperature.
//!
//! Looks up the current weather for a location and derives:
//! - the time of day (before dawn, day, after dusk)
//! - whether the flower is open (9h after sunset, for 6h)
//! - a red tint from the temperature

pub mod app;
pub mod config;
pub mod cycle;
pub mod location;
pub mod page;
pub mod weather;

pub use app::{run, Outcome};
pub use config::{Config, ConfigError, WeatherConfig};
pub use cycle::{
    classify_phase, compute_bloom_window, flower_status, hours_to_ms, red_channel, tint_ratio,
    BloomWindow, DayCycle, DayPhase, FlowerStatus, TintRange,
};
pub use location::{
    Coordinates, FixedLocation, IpLocation, LocationError, LocationErrorCode, LocationProvider,
    Locator,
};
pub use page::{OutputFormat, PageState};
pub use weather::{OpenWeatherClient, Units, WeatherError, WeatherReport, WeatherSource};
