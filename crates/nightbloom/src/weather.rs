//! OpenWeather "current weather" client.
//!
//! One GET per run, no streaming, no retry. Only the fields the day cycle
//! needs are pulled out of the response: `main.temp`, `sys.sunrise` and
//! `sys.sunset` (Unix seconds).

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cycle::{hours_to_ms, BLOOM_DELAY_HOURS, BLOOM_LENGTH_HOURS};
use crate::location::Coordinates;

// ── Constants ───────────────────────────────────────────────────────

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Path of the current-weather endpoint.
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("OPENWEATHER_API_KEY not set and no api_key configured")]
    MissingApiKey,
}

pub type Result<T> = std::result::Result<T, WeatherError>;

// ── Units ───────────────────────────────────────────────────────────

/// Unit system requested from the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
            Units::Standard => "standard",
        }
    }
}

impl std::str::FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "imperial" => Ok(Units::Imperial),
            "metric" => Ok(Units::Metric),
            "standard" => Ok(Units::Standard),
            other => Err(format!(
                "unknown units '{}', expected imperial, metric or standard",
                other
            )),
        }
    }
}

// ── Report ──────────────────────────────────────────────────────────

/// The subset of a weather response the day cycle runs on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub temperature: f64,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Wire format of the parts of the response we read.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    main: MainSection,
    sys: SysSection,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MainSection {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct SysSection {
    sunrise: i64,
    sunset: i64,
}

/// Convert a Unix-seconds field, leaving room for the bloom window
/// arithmetic (a day back, bloom delay plus length forward).
fn from_unix_seconds(field: &str, secs: i64) -> Result<DateTime<Utc>> {
    secs.checked_mul(1000)
        .and_then(DateTime::from_timestamp_millis)
        .filter(|t| {
            t.checked_sub_signed(hours_to_ms(24)).is_some()
                && t
                    .checked_add_signed(hours_to_ms(BLOOM_DELAY_HOURS + BLOOM_LENGTH_HOURS))
                    .is_some()
        })
        .ok_or_else(|| WeatherError::Parse(format!("{} out of range: {}", field, secs)))
}

/// `cod` arrives as a string on errors and a number on success.
fn is_not_found(body: &Value) -> bool {
    match body.get("cod") {
        Some(Value::String(s)) => s == "404",
        Some(Value::Number(n)) => n.as_u64() == Some(404),
        _ => false,
    }
}

/// Turn a decoded response body into a report.
pub fn parse_report(body: Value) -> Result<WeatherReport> {
    if is_not_found(&body) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("not found")
            .to_string();
        return Err(WeatherError::Api {
            status: 404,
            message,
        });
    }

    let response: ApiResponse =
        serde_json::from_value(body).map_err(|e| WeatherError::Parse(e.to_string()))?;

    Ok(WeatherReport {
        temperature: response.main.temp,
        sunrise: from_unix_seconds("sys.sunrise", response.sys.sunrise)?,
        sunset: from_unix_seconds("sys.sunset", response.sys.sunset)?,
        location: response.name.filter(|n| !n.is_empty()),
    })
}

// ── Source trait ────────────────────────────────────────────────────

/// Anything that can produce the current weather for a location.
pub trait WeatherSource: Send + Sync {
    fn current(&self, coords: Coordinates) -> impl Future<Output = Result<WeatherReport>> + Send;
}

// ── Client ──────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    units: Units,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, units: Units) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            units,
        }
    }

    /// Use `api_key` if given, falling back to `OPENWEATHER_API_KEY`.
    pub fn from_key_or_env(api_key: Option<&str>, units: Units) -> Result<Self> {
        let key = match api_key {
            Some(k) if !k.is_empty() => k.to_string(),
            _ => std::env::var(API_KEY_ENV)
                .ok()
                .filter(|k| !k.is_empty())
                .ok_or(WeatherError::MissingApiKey)?,
        };
        Ok(Self::new(key, units))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, CURRENT_WEATHER_PATH)
    }

    fn query(&self, coords: Coordinates) -> [(&'static str, String); 4] {
        [
            ("lat", coords.latitude.to_string()),
            ("lon", coords.longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", self.units.as_str().to_string()),
        ]
    }
}

impl WeatherSource for OpenWeatherClient {
    async fn current(&self, coords: Coordinates) -> Result<WeatherReport> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&self.query(coords))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        log::debug!("weather response ({}): {}", status, text);

        let body: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) if status.is_success() => return Err(WeatherError::Parse(e.to_string())),
            Err(_) => {
                return Err(WeatherError::Api {
                    status: status.as_u16(),
                    message: text,
                })
            }
        };

        // A 404 body carries its own message; keep it over the raw text.
        if !status.is_success() && !is_not_found(&body) {
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        parse_report(body)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
