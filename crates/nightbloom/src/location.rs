//! Geolocation providers.
//!
//! A provider yields `{latitude, longitude}` or a coded error shaped like the
//! browser geolocation API's (`ERROR(<code>): <message>`). Two providers:
//! - `FixedLocation`: coordinates given on the command line or in config
//! - `IpLocation`: auto-discovery from the public IP address

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Default IP geolocation endpoint.
pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

// ── Errors ──────────────────────────────────────────────────────────

/// Failure reason codes, numbered as in the browser geolocation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum LocationErrorCode {
    PermissionDenied = 1,
    PositionUnavailable = 2,
    Timeout = 3,
}

impl LocationErrorCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

#[derive(Debug, thiserror::Error)]
#[error("ERROR({}): {message}", .code.as_u16())]
pub struct LocationError {
    pub code: LocationErrorCode,
    pub message: String,
}

impl LocationError {
    pub fn new(code: LocationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(LocationErrorCode::PositionUnavailable, message)
    }
}

impl From<reqwest::Error> for LocationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LocationError::new(LocationErrorCode::Timeout, err.to_string())
        } else {
            LocationError::unavailable(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, LocationError>;

// ── Provider trait ──────────────────────────────────────────────────

pub trait LocationProvider: Send + Sync {
    fn locate(&self) -> impl Future<Output = Result<Coordinates>> + Send;
}

// ── FixedLocation ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

impl LocationProvider for FixedLocation {
    async fn locate(&self) -> Result<Coordinates> {
        if self.0.is_valid() {
            Ok(self.0)
        } else {
            Err(LocationError::unavailable(format!(
                "coordinates out of range: ({}, {})",
                self.0.latitude, self.0.longitude
            )))
        }
    }
}

// ── IpLocation ──────────────────────────────────────────────────────

/// Response body of the IP lookup service.
#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
}

fn parse_ip_lookup(body: IpLookupResponse) -> Result<Coordinates> {
    if body.status != "success" {
        return Err(LocationError::unavailable(
            body.message
                .unwrap_or_else(|| format!("lookup status '{}'", body.status)),
        ));
    }
    match (body.lat, body.lon) {
        (Some(lat), Some(lon)) => {
            if let Some(city) = body.city.as_deref() {
                log::info!("Auto-discovered location: {}", city);
            }
            Ok(Coordinates::new(lat, lon))
        }
        _ => Err(LocationError::unavailable("lookup response missing lat/lon")),
    }
}

#[derive(Debug)]
pub struct IpLocation {
    client: reqwest::Client,
    url: String,
}

impl Default for IpLocation {
    fn default() -> Self {
        Self::new(DEFAULT_IP_LOOKUP_URL)
    }
}

impl IpLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl LocationProvider for IpLocation {
    async fn locate(&self) -> Result<Coordinates> {
        log::info!("Looking up location from IP address via {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LocationError::unavailable(format!(
                "IP lookup failed with status {}",
                status.as_u16()
            )));
        }
        let body: IpLookupResponse = response.json().await?;
        parse_ip_lookup(body)
    }
}

// ── Locator ─────────────────────────────────────────────────────────

/// Fixed coordinates when known, IP auto-discovery otherwise.
#[derive(Debug)]
pub enum Locator {
    Fixed(FixedLocation),
    Ip(IpLocation),
}

impl Locator {
    pub fn new(coords: Option<Coordinates>) -> Self {
        match coords {
            Some(c) => Locator::Fixed(FixedLocation(c)),
            None => Locator::Ip(IpLocation::default()),
        }
    }
}

impl LocationProvider for Locator {
    async fn locate(&self) -> Result<Coordinates> {
        match self {
            Locator::Fixed(f) => f.locate().await,
            Locator::Ip(ip) => ip.locate().await,
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
