//! Run configuration: the target event, the time window and the column layout
//! of the exported questionnaire.
//!
//! Stored as a JSON object on disk. Every section is optional and falls back to
//! the defaults for the 2025-04-24 Mirotice event:
//! ```json
//! {
//!   "event": { "id": 1773, "origin_time": "2025-04-24T17:32:47.3Z" },
//!   "window_hours": 1.5,
//!   "columns": { "timestamp": "eqdatetime" }
//! }
//! ```

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::classify::categories::ObjectEffect;

/// Widest accepted half-window, one year.
pub const MAX_WINDOW_HOURS: f64 = 24.0 * 366.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub event: EventConfig,
    /// Half-width of the observation window around the origin time.
    pub window_hours: f64,
    /// Timezone naive spreadsheet timestamps are recorded in.
    pub source_timezone: String,
    /// Field delimiter of the exported sheet.
    pub delimiter: char,
    pub columns: ColumnConfig,
}

/// The seismic event the observations are matched against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub id: u32,
    pub origin_time: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub magnitude: f64,
}

/// Header names in the source sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub timestamp: String,
    pub lat: String,
    pub lon: String,
    pub location: String,
    pub felt_by: String,
    pub tremor: String,
    pub fear: String,
    pub damage: String,
    pub movement: Vec<MovementColumn>,
    pub sound: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovementColumn {
    pub column: String,
    pub effect: ObjectEffect,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            event: EventConfig::default(),
            window_hours: 1.5,
            source_timezone: "Europe/Prague".to_string(),
            delimiter: ',',
            columns: ColumnConfig::default(),
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            id: 1773,
            // 2025-04-24 17:32:47.3 UTC
            origin_time: Utc.timestamp_millis_opt(1_745_515_967_300).single().unwrap_or_default(),
            lat: 49.422,
            lon: 14.043,
            magnitude: 3.1,
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        let movement = [
            ("nabytektezky", ObjectEffect::HeavyFurniture),
            ("okna", ObjectEffect::Windows),
            ("dvere", ObjectEffect::Doors),
            ("zavespredmety", ObjectEffect::HangingItems),
            ("nadobi", ObjectEffect::Dishes),
            ("malepredmety", ObjectEffect::SmallObjects),
            ("kapalina", ObjectEffect::Liquid),
        ]
        .into_iter()
        .map(|(column, effect)| MovementColumn {
            column: column.to_string(),
            effect,
        })
        .collect();

        Self {
            timestamp: "eqdatetime".to_string(),
            lat: "lat".to_string(),
            lon: "lon".to_string(),
            location: "pozorovaniodkud".to_string(),
            felt_by: "kolikpozorvenku".to_string(),
            tremor: "popispohybu".to_string(),
            fear: "reakcepanika".to_string(),
            damage: "poskozomitka".to_string(),
            movement,
            sound: ["zvukhrmeni", "zvukduneni", "zvukrany", "zvukjiny"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.window_hours.is_finite() || self.window_hours < 0.0 {
            return Err(anyhow!("window_hours must be a non-negative number"));
        }
        if self.window_hours > MAX_WINDOW_HOURS {
            return Err(anyhow!(
                "window_hours {} exceeds the maximum of {}",
                self.window_hours,
                MAX_WINDOW_HOURS
            ));
        }
        if !self.delimiter.is_ascii() {
            return Err(anyhow!("delimiter must be a single ASCII character"));
        }
        self.timezone()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.source_timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("unknown timezone {:?}: {}", self.source_timezone, e))
    }

    /// Half-window as a duration, clamped to `[0, MAX_WINDOW_HOURS]`.
    pub fn window(&self) -> chrono::Duration {
        let hours = if self.window_hours.is_finite() {
            self.window_hours.clamp(0.0, MAX_WINDOW_HOURS)
        } else {
            0.0
        };
        chrono::Duration::milliseconds((hours * 3_600_000.0).round() as i64)
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}
