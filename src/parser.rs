//! Reader for the exported observation sheet.
//!
//! Rows without a usable timestamp or coordinates are dropped here and never
//! reach classification.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::borrow::Cow;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::classify::categories::ObjectEffect;
use crate::config::{AnalysisConfig, ColumnConfig};
use crate::observation::Observation;

/// Day-first civil formats seen in questionnaire exports.
const NAIVE_FORMATS: &[&str] = &[
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
    "%d. %m. %Y %H:%M:%S",
    "%d. %m. %Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Which configured columns the sheet actually has.
#[derive(Debug, Default, Serialize)]
pub struct ColumnPresence {
    pub present: Vec<String>,
    pub missing_required: Vec<String>,
    pub missing_optional: Vec<String>,
}

impl ColumnPresence {
    pub fn check(headers: &StringRecord, columns: &ColumnConfig) -> Self {
        let mut presence = ColumnPresence::default();
        let has = |name: &str| headers.iter().any(|h| h == name);

        for name in [&columns.timestamp, &columns.lat, &columns.lon] {
            if has(name) {
                presence.present.push(name.clone());
            } else {
                presence.missing_required.push(name.clone());
            }
        }

        let optional = [
            &columns.location,
            &columns.felt_by,
            &columns.tremor,
            &columns.fear,
            &columns.damage,
        ]
        .into_iter()
        .chain(columns.movement.iter().map(|m| &m.column))
        .chain(columns.sound.iter());

        for name in optional {
            if has(name) {
                presence.present.push(name.clone());
            } else {
                presence.missing_optional.push(name.clone());
            }
        }

        presence
    }
}

/// Header positions of the configured columns.
#[derive(Debug)]
struct ColumnLayout {
    timestamp: usize,
    lat: usize,
    lon: usize,
    location: Option<usize>,
    felt_by: Option<usize>,
    tremor: Option<usize>,
    fear: Option<usize>,
    damage: Option<usize>,
    movement: Vec<(ObjectEffect, usize)>,
    sound: Vec<(String, usize)>,
}

impl ColumnLayout {
    fn resolve(headers: &StringRecord, columns: &ColumnConfig) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            find(name).ok_or_else(|| anyhow!("required column {:?} not found in sheet", name))
        };

        Ok(Self {
            timestamp: required(&columns.timestamp)?,
            lat: required(&columns.lat)?,
            lon: required(&columns.lon)?,
            location: find(&columns.location),
            felt_by: find(&columns.felt_by),
            tremor: find(&columns.tremor),
            fear: find(&columns.fear),
            damage: find(&columns.damage),
            movement: columns
                .movement
                .iter()
                .filter_map(|m| find(&m.column).map(|i| (m.effect, i)))
                .collect(),
            sound: columns
                .sound
                .iter()
                .filter_map(|name| find(name).map(|i| (name.clone(), i)))
                .collect(),
        })
    }
}

/// Row funnel of one load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub invalid_timestamp: usize,
    pub invalid_coordinates: usize,
    /// Rows with cells that were not valid UTF-8, decoded lossily.
    pub lossy_rows: usize,
    pub kept: usize,
}

#[derive(Debug)]
pub struct ParsedSheet {
    pub observations: Vec<Observation>,
    pub columns: ColumnPresence,
    pub report: LoadReport,
}

/// Parses a timestamp cell into UTC.
///
/// RFC 3339 values keep their offset. Naive values are read day-first and
/// localized in `tz`; ambiguous times take the earlier instant and
/// non-existent ones are rejected.
pub fn parse_timestamp(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses a coordinate cell, accepting either decimal separator.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn valid_position(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Reads and cleans observations from delimited text.
pub fn read_observations<R: Read>(reader: R, config: &AnalysisConfig) -> Result<ParsedSheet> {
    let tz = config.timezone()?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(config.delimiter_byte())
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("reading sheet header")?.clone();
    let columns = ColumnPresence::check(&headers, &config.columns);
    let layout = ColumnLayout::resolve(&headers, &config.columns)?;

    let mut report = LoadReport::default();
    let mut observations = Vec::new();

    // Cells that are not valid UTF-8 are decoded lossily, never fatal.
    for (i, result) in rdr.byte_records().enumerate() {
        let record = result.with_context(|| format!("reading sheet row {}", i + 1))?;
        report.loaded += 1;
        let row = i + 1;
        let fields: Vec<Cow<'_, str>> = record.iter().map(String::from_utf8_lossy).collect();
        if fields.iter().any(|f| matches!(f, Cow::Owned(_))) {
            debug!(row, "Row is not valid UTF-8, decoded lossily");
            report.lossy_rows += 1;
        }
        let cell = |idx: usize| fields.get(idx).map_or("", |f| &**f);
        let optional = |idx: Option<usize>| idx.map(|i| cell(i).to_string());

        let Some(observed_at) = parse_timestamp(cell(layout.timestamp), tz) else {
            debug!(row, value = cell(layout.timestamp), "Dropping row with invalid timestamp");
            report.invalid_timestamp += 1;
            continue;
        };

        let position = parse_coordinate(cell(layout.lat))
            .zip(parse_coordinate(cell(layout.lon)))
            .filter(|&(lat, lon)| valid_position(lat, lon));
        let Some((lat, lon)) = position else {
            debug!(row, lat = cell(layout.lat), lon = cell(layout.lon), "Dropping row with invalid coordinates");
            report.invalid_coordinates += 1;
            continue;
        };

        observations.push(Observation {
            row,
            observed_at,
            lat,
            lon,
            location: optional(layout.location),
            felt_by: optional(layout.felt_by),
            tremor: optional(layout.tremor),
            fear: optional(layout.fear),
            damage: optional(layout.damage),
            movement: layout
                .movement
                .iter()
                .map(|&(effect, idx)| (effect, cell(idx).to_string()))
                .collect(),
            sound: layout
                .sound
                .iter()
                .map(|(name, idx)| (name.clone(), cell(*idx).to_string()))
                .collect(),
        });
    }

    report.kept = observations.len();
    Ok(ParsedSheet {
        observations,
        columns,
        report,
    })
}

/// Opens `path` and reads it with [`read_observations`].
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_observations(path: &Path, config: &AnalysisConfig) -> Result<ParsedSheet> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening observation sheet {}", path.display()))?;
    let sheet = read_observations(file, config)?;

    info!(
        loaded = sheet.report.loaded,
        invalid_timestamp = sheet.report.invalid_timestamp,
        invalid_coordinates = sheet.report.invalid_coordinates,
        lossy_rows = sheet.report.lossy_rows,
        kept = sheet.report.kept,
        "Observation sheet loaded"
    );
    for name in &sheet.columns.missing_optional {
        info!(column = %name, "Optional column not in sheet, dimension will be unspecified");
    }

    Ok(sheet)
}

/// Reads only the header row of `path`.
pub fn read_headers(path: &Path, config: &AnalysisConfig) -> Result<StringRecord> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(config.delimiter_byte())
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("opening observation sheet {}", path.display()))?;
    Ok(rdr.headers()?.clone())
}
