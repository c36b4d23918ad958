//! Output artifacts handed to map and chart renderers.
//!
//! Supports JSON summaries, the classified table as CSV and
//! GeoJSON layers for observation points and isoseismal hulls.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue, Value};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::classify::boundary::IsoseismalRegion;
use crate::classify::intensity::IntensityLabel;
use crate::config::EventConfig;
use crate::observation::ClassifiedObservation;
use crate::stats::EventSummary;

/// One row of the classified table.
#[derive(Debug, Serialize)]
pub struct ClassifiedRecord {
    pub row: usize,
    pub observed_at: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub location: &'static str,
    pub felt_by: &'static str,
    pub tremor: String,
    pub fear: bool,
    pub damage: &'static str,
    pub object_movement: bool,
    pub sound_heard: bool,
    pub intensity: IntensityLabel,
    pub intensity_rank: u32,
    pub intensity_color: &'static str,
    pub rule: Option<usize>,
}

impl From<&ClassifiedObservation> for ClassifiedRecord {
    fn from(c: &ClassifiedObservation) -> Self {
        ClassifiedRecord {
            row: c.observation.row,
            observed_at: c.observation.observed_at,
            lat: c.observation.lat,
            lon: c.observation.lon,
            location: c.categories.location.label(),
            felt_by: c.categories.felt_by.label(),
            tremor: c.categories.tremor.label(),
            fear: c.categories.fear,
            damage: c.categories.damage.label(),
            object_movement: c.categories.object_movement(),
            sound_heard: c.categories.sound_heard,
            intensity: c.intensity,
            intensity_rank: c.intensity.rank(),
            intensity_color: c.intensity.color(),
            rule: c.rule,
        }
    }
}

/// Logs the summary as pretty-printed JSON.
pub fn print_json(summary: &EventSummary) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Writes the classified table to a CSV file, replacing any previous one.
pub fn write_classified(path: &Path, rows: &[ClassifiedObservation]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing classified table");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    for row in rows {
        writer.serialize(ClassifiedRecord::from(row))?;
    }
    writer.flush()?;

    Ok(())
}

pub fn write_summary(path: &Path, summary: &EventSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Point layer: every observation plus the epicenter.
pub fn observations_geojson(rows: &[ClassifiedObservation], event: &EventConfig) -> GeoJson {
    let mut features: Vec<Feature> = rows
        .iter()
        .map(|c| {
            let mut props = JsonObject::new();
            props.insert("kind".into(), "observation".into());
            props.insert("row".into(), c.observation.row.into());
            props.insert(
                "observed_at".into(),
                c.observation.observed_at.to_rfc3339().into(),
            );
            props.insert("intensity".into(), c.intensity.name().into());
            props.insert("rank".into(), c.intensity.rank().into());
            props.insert("color".into(), c.intensity.color().into());
            feature(
                Value::Point(vec![c.observation.lon, c.observation.lat]),
                props,
            )
        })
        .collect();

    let mut props = JsonObject::new();
    props.insert("kind".into(), "epicenter".into());
    props.insert("event_id".into(), event.id.into());
    props.insert("magnitude".into(), JsonValue::from(event.magnitude));
    props.insert("origin_time".into(), event.origin_time.to_rfc3339().into());
    features.push(feature(Value::Point(vec![event.lon, event.lat]), props));

    collection(features)
}

/// Polygon layer, one feature per region in drawing order.
pub fn isoseismals_geojson(regions: &[IsoseismalRegion]) -> GeoJson {
    let features = regions
        .iter()
        .map(|region| {
            let ring: Vec<Vec<f64>> = region
                .polygon
                .exterior()
                .coords()
                .map(|c| vec![c.x, c.y])
                .collect();

            let mut props = JsonObject::new();
            props.insert("intensity".into(), region.label.name().into());
            props.insert("rank".into(), region.label.rank().into());
            props.insert("color".into(), region.label.color().into());
            props.insert("points".into(), region.points.into());
            feature(Value::Polygon(vec![ring]), props)
        })
        .collect();

    collection(features)
}

pub fn write_geojson(path: &Path, geojson: &GeoJson) -> Result<()> {
    fs::write(path, geojson.to_string()).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
