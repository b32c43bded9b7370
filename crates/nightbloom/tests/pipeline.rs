//! End-to-end runs of the locate → fetch → derive pipeline with in-process
//! collaborators standing in for geolocation and the weather API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use nightbloom::location::Result as LocationResult;
use nightbloom::weather::Result as WeatherResult;
use nightbloom::{
    Coordinates, DayPhase, FixedLocation, FlowerStatus, LocationError, LocationErrorCode,
    LocationProvider, PageState, TintRange, WeatherError, WeatherReport, WeatherSource,
};

// ── Test collaborators ───────────────────────────────────────────────

struct DeniedLocation;

impl LocationProvider for DeniedLocation {
    async fn locate(&self) -> LocationResult<Coordinates> {
        Err(LocationError::new(
            LocationErrorCode::PermissionDenied,
            "User denied Geolocation",
        ))
    }
}

/// Returns a canned result and records the coordinates it was asked for.
struct StubWeather {
    report: Option<WeatherReport>,
    calls: AtomicUsize,
    last_coords: Mutex<Option<Coordinates>>,
}

impl StubWeather {
    fn ok(report: WeatherReport) -> Self {
        Self {
            report: Some(report),
            calls: AtomicUsize::new(0),
            last_coords: Mutex::new(None),
        }
    }

    fn not_found() -> Self {
        Self {
            report: None,
            calls: AtomicUsize::new(0),
            last_coords: Mutex::new(None),
        }
    }
}

impl WeatherSource for StubWeather {
    async fn current(&self, coords: Coordinates) -> WeatherResult<WeatherReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_coords.lock().unwrap() = Some(coords);
        self.report.clone().ok_or(WeatherError::Api {
            status: 404,
            message: "city not found".to_string(),
        })
    }
}

fn day(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, h, m, 0).unwrap()
}

fn report(temp: f64) -> WeatherReport {
    WeatherReport {
        temperature: temp,
        sunrise: day(6, 0),
        sunset: day(18, 0),
        location: Some("Testville".to_string()),
    }
}

fn here() -> FixedLocation {
    FixedLocation(Coordinates::new(41.39, 2.17))
}

// ── Tests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn morning_run_still_inside_last_nights_window() {
    let weather = StubWeather::ok(report(72.0));
    let outcome = nightbloom::run(&here(), &weather, day(8, 0), TintRange::default())
        .await
        .expect("pipeline should succeed");

    assert_eq!(outcome.cycle.phase, DayPhase::Day);
    assert_eq!(outcome.cycle.bloom.start, day(3, 0));
    assert_eq!(outcome.cycle.bloom.end, day(9, 0));
    assert_eq!(outcome.cycle.flower, FlowerStatus::Open);
    assert_eq!(outcome.cycle.red(), 189);
    assert_eq!(
        *weather.last_coords.lock().unwrap(),
        Some(Coordinates::new(41.39, 2.17))
    );
}

#[tokio::test]
async fn mid_morning_run_finds_flower_closed() {
    let weather = StubWeather::ok(report(72.0));
    let outcome = nightbloom::run(&here(), &weather, day(10, 0), TintRange::default())
        .await
        .unwrap();

    assert_eq!(outcome.cycle.phase, DayPhase::Day);
    assert_eq!(outcome.cycle.bloom.end, day(9, 0));
    assert_eq!(outcome.cycle.flower, FlowerStatus::Closed);
}

#[tokio::test]
async fn early_morning_run_finds_flower_open() {
    let weather = StubWeather::ok(report(10.0));
    let outcome = nightbloom::run(&here(), &weather, day(4, 15), TintRange::default())
        .await
        .unwrap();

    assert_eq!(outcome.cycle.phase, DayPhase::BeforeDawn);
    assert_eq!(outcome.cycle.flower, FlowerStatus::Open);
    assert_eq!(outcome.cycle.red(), 0);

    let page = PageState::from_cycle(&outcome.cycle);
    assert_eq!(page.mode, "beforedawn");
    assert_eq!(page.class, "before-dawn");
    assert_eq!(page.flower, "open");
    assert_eq!(page.red, 0);
}

#[tokio::test]
async fn evening_run_uses_tonights_window() {
    let weather = StubWeather::ok(report(95.0));
    let outcome = nightbloom::run(&here(), &weather, day(22, 0), TintRange::default())
        .await
        .unwrap();

    assert_eq!(outcome.cycle.phase, DayPhase::AfterDusk);
    assert_eq!(outcome.cycle.bloom.start, day(18, 0) + chrono::Duration::hours(9));
    assert_eq!(outcome.cycle.flower, FlowerStatus::Closed);
    assert_eq!(outcome.cycle.red(), 255);
}

#[tokio::test]
async fn location_failure_skips_weather_fetch() {
    let weather = StubWeather::ok(report(72.0));
    let outcome = nightbloom::run(&DeniedLocation, &weather, day(8, 0), TintRange::default()).await;

    assert!(outcome.is_none());
    assert_eq!(weather.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn weather_failure_is_not_retried() {
    let weather = StubWeather::not_found();
    let outcome = nightbloom::run(&here(), &weather, day(8, 0), TintRange::default()).await;

    assert!(outcome.is_none());
    assert_eq!(weather.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn out_of_range_fixed_location_fails() {
    let weather = StubWeather::ok(report(72.0));
    let bad = FixedLocation(Coordinates::new(0.0, 200.0));
    let outcome = nightbloom::run(&bad, &weather, day(8, 0), TintRange::default()).await;

    assert!(outcome.is_none());
    assert_eq!(weather.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn custom_tint_range_applies() {
    let weather = StubWeather::ok(report(15.0));
    let range = TintRange { min: 0.0, max: 30.0 };
    let outcome = nightbloom::run(&here(), &weather, day(12, 0), range)
        .await
        .unwrap();

    assert!((outcome.cycle.tint - 0.5).abs() < 1e-12);
    assert_eq!(outcome.cycle.red(), 128);
    assert_eq!(outcome.report.location.as_deref(), Some("Testville"));
}
