//! Day-cycle derivation.
//!
//! Pure functions over `(now, sunrise, sunset, temperature)`:
//! - time-of-day classification
//! - bloom window (opens 9h after sunset, stays open 6h)
//! - flower open/closed status
//! - temperature → red tint ratio

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::weather::WeatherReport;

// ── Constants ───────────────────────────────────────────────────────

/// Hours between sunset and the flower opening.
pub const BLOOM_DELAY_HOURS: i64 = 9;

/// Hours the flower stays open.
pub const BLOOM_LENGTH_HOURS: i64 = 6;

/// Lower bound of the default tint range.
pub const DEFAULT_TINT_MIN: f64 = 20.0;

/// Upper bound of the default tint range.
pub const DEFAULT_TINT_MAX: f64 = 90.0;

/// Convert whole hours to a millisecond-precision duration.
pub fn hours_to_ms(hours: i64) -> Duration {
    Duration::milliseconds(hours * 60 * 60 * 1000)
}

// ── Day phase ───────────────────────────────────────────────────────

/// Where `now` sits relative to today's sunrise and sunset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPhase {
    BeforeDawn,
    Day,
    AfterDusk,
}

impl DayPhase {
    /// Value written to the page's `mode` data attribute.
    pub fn mode(&self) -> &'static str {
        match self {
            DayPhase::BeforeDawn => "beforedawn",
            DayPhase::Day => "day",
            DayPhase::AfterDusk => "afterdusk",
        }
    }

    /// Class added to the page body.
    pub fn css_class(&self) -> &'static str {
        match self {
            DayPhase::BeforeDawn => "before-dawn",
            DayPhase::Day => "day",
            DayPhase::AfterDusk => "after-dusk",
        }
    }

    /// Human-readable form used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            DayPhase::BeforeDawn => "before dawn",
            DayPhase::Day => "day",
            DayPhase::AfterDusk => "after dusk",
        }
    }
}

/// Classify `now` against sunrise and sunset.
///
/// Both comparisons against sunrise are strict, so `now == sunrise` falls
/// through to `AfterDusk`.
pub fn classify_phase(
    now: DateTime<Utc>,
    sunrise: DateTime<Utc>,
    sunset: DateTime<Utc>,
) -> DayPhase {
    if now < sunrise {
        DayPhase::BeforeDawn
    } else if now > sunrise && now < sunset {
        DayPhase::Day
    } else {
        DayPhase::AfterDusk
    }
}

// ── Bloom window ────────────────────────────────────────────────────

/// Half-open interval `[start, end)` during which the flower is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloomWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BloomWindow {
    /// Whether `now` falls inside `[start, end)`.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }
}

/// Bloom window anchored on `sunset`.
///
/// Before today's sunset the window of the previous night is used, which
/// reuses today's sunset shifted back a day.
pub fn compute_bloom_window(now: DateTime<Utc>, sunset: DateTime<Utc>) -> BloomWindow {
    let mut start = sunset + hours_to_ms(BLOOM_DELAY_HOURS);
    if now < sunset {
        start -= hours_to_ms(24);
    }
    BloomWindow {
        start,
        end: start + hours_to_ms(BLOOM_LENGTH_HOURS),
    }
}

// ── Flower status ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowerStatus {
    Open,
    Closed,
}

impl FlowerStatus {
    /// Value written to the page's `flower` data attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowerStatus::Open => "open",
            FlowerStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for FlowerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn flower_status(now: DateTime<Utc>, window: &BloomWindow) -> FlowerStatus {
    if window.contains(now) {
        FlowerStatus::Open
    } else {
        FlowerStatus::Closed
    }
}

// ── Tint ────────────────────────────────────────────────────────────

/// Temperature range mapped onto the tint ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TintRange {
    #[serde(default = "default_tint_min")]
    pub min: f64,
    #[serde(default = "default_tint_max")]
    pub max: f64,
}

fn default_tint_min() -> f64 {
    DEFAULT_TINT_MIN
}

fn default_tint_max() -> f64 {
    DEFAULT_TINT_MAX
}

impl Default for TintRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_TINT_MIN,
            max: DEFAULT_TINT_MAX,
        }
    }
}

/// Clamp `temp` into `[min, max]` and interpolate linearly onto `[0, 1]`.
///
/// NaN maps to 0.
pub fn tint_ratio(temp: f64, range: TintRange) -> f64 {
    if temp.is_nan() || temp <= range.min {
        return 0.0;
    }
    if temp >= range.max {
        return 1.0;
    }
    (temp - range.min) / (range.max - range.min)
}

/// Red channel value (0-255) for a tint ratio.
pub fn red_channel(ratio: f64) -> u8 {
    (ratio.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ── Aggregate ───────────────────────────────────────────────────────

/// Everything derived from one weather report at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCycle {
    pub now: DateTime<Utc>,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub temperature: f64,
    pub phase: DayPhase,
    pub bloom: BloomWindow,
    pub flower: FlowerStatus,
    pub tint: f64,
}

impl DayCycle {
    pub fn derive(now: DateTime<Utc>, report: &WeatherReport, range: TintRange) -> Self {
        let bloom = compute_bloom_window(now, report.sunset);
        Self {
            now,
            sunrise: report.sunrise,
            sunset: report.sunset,
            temperature: report.temperature,
            phase: classify_phase(now, report.sunrise, report.sunset),
            bloom,
            flower: flower_status(now, &bloom),
            tint: tint_ratio(report.temperature, range),
        }
    }

    pub fn red(&self) -> u8 {
        red_channel(self.tint)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
