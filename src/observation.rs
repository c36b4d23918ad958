//! In-memory observation records.

use chrono::{DateTime, Utc};

use crate::classify::categories::{Categories, ObjectEffect};
use crate::classify::intensity::IntensityLabel;

/// One cleaned questionnaire response.
///
/// Timestamp and coordinates are always valid; every other field holds the raw
/// cell text, or `None` when the column is absent from the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// 1-based data row in the source file.
    pub row: usize,
    pub observed_at: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub location: Option<String>,
    pub felt_by: Option<String>,
    pub tremor: Option<String>,
    pub fear: Option<String>,
    pub damage: Option<String>,
    /// Object-movement cells for the movement columns present in the sheet.
    pub movement: Vec<(ObjectEffect, String)>,
    /// Sound cells keyed by column name.
    pub sound: Vec<(String, String)>,
}

/// An observation with its derived categories and intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedObservation {
    pub observation: Observation,
    pub categories: Categories,
    pub intensity: IntensityLabel,
    /// 1-based rule number that produced `intensity`, `None` when unclassified.
    pub rule: Option<usize>,
}

impl ClassifiedObservation {
    pub fn lon_lat(&self) -> (f64, f64) {
        (self.observation.lon, self.observation.lat)
    }
}

#[cfg(test)]
impl Observation {
    pub(crate) fn sample() -> Self {
        use chrono::TimeZone;

        Observation {
            row: 1,
            observed_at: Utc.with_ymd_and_hms(2025, 4, 24, 17, 35, 0).unwrap(),
            lat: 49.4,
            lon: 14.0,
            location: None,
            felt_by: None,
            tremor: None,
            fear: None,
            damage: None,
            movement: Vec::new(),
            sound: Vec::new(),
        }
    }
}
