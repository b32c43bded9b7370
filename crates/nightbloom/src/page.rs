//! Page state derived from a day cycle.
//!
//! Holds what the browser version wrote into the document body: the `mode`
//! and `flower` data attributes, the body class, the text placeholders and
//! the `--red` custom property. Rendered as table, JSON or YAML.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::cycle::DayCycle;

/// Output format for `PageState::render`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(format!(
                "unknown format '{}', expected table, json or yaml",
                other
            )),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Short time-of-day, e.g. `8:05 PM`.
pub fn format_time<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    t.format("%-I:%M %p").to_string()
}

fn local_time(t: &DateTime<Utc>) -> String {
    format_time(&t.with_timezone(&Local))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageState {
    /// `data-mode` attribute
    pub mode: String,
    /// Body class
    pub class: String,
    /// `data-flower` attribute
    pub flower: String,
    /// `--red` custom property
    pub red: u8,
    pub now: String,
    pub dusk: String,
    pub daybreak: String,
    pub close: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl PageState {
    /// Fill every element, formatting times in the local timezone.
    pub fn from_cycle(cycle: &DayCycle) -> Self {
        Self::from_cycle_with(cycle, local_time)
    }

    /// Same as `from_cycle` with a caller-supplied time formatter.
    pub fn from_cycle_with(cycle: &DayCycle, fmt: impl Fn(&DateTime<Utc>) -> String) -> Self {
        Self {
            mode: cycle.phase.mode().to_string(),
            class: cycle.phase.css_class().to_string(),
            flower: cycle.flower.to_string(),
            red: cycle.red(),
            now: fmt(&cycle.now),
            dusk: fmt(&cycle.sunset),
            daybreak: fmt(&cycle.bloom.start),
            close: fmt(&cycle.bloom.end),
            status: cycle.flower.to_string(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, RenderError> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(self)?),
            OutputFormat::Table => Ok(self.render_table()),
        }
    }

    fn render_table(&self) -> String {
        let mut rows: Vec<(&str, String)> = Vec::new();
        if let Some(loc) = &self.location {
            rows.push(("location", loc.clone()));
        }
        rows.extend([
            ("now", self.now.clone()),
            ("mode", self.mode.clone()),
            ("class", self.class.clone()),
            ("dusk", self.dusk.clone()),
            ("daybreak", self.daybreak.clone()),
            ("close", self.close.clone()),
            ("flower", self.flower.clone()),
            ("--red", self.red.to_string()),
        ]);

        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        rows.iter()
            .map(|(k, v)| format!("{:<width$}  {}", k, v, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
