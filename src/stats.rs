use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::classify::categories::fear_label;
use crate::classify::intensity::IntensityLabel;
use crate::observation::ClassifiedObservation;
use crate::parser::LoadReport;
use crate::window::EventWindow;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub count: usize,
    pub percent: f64,
}

/// Counts per category value, sorted by value name.
pub type Breakdown = BTreeMap<String, CategoryCount>;

#[derive(Debug, Default, Serialize)]
pub struct EventSummary {
    pub generated_at: DateTime<Utc>,
    pub event_id: u32,
    pub window: Option<EventWindow>,

    // row funnel
    pub loaded: usize,
    pub invalid_timestamp: usize,
    pub invalid_coordinates: usize,
    pub lossy_rows: usize,
    pub in_window: usize,

    // categorical dimensions
    pub location: Breakdown,
    pub felt_by: Breakdown,
    pub tremor: Breakdown,
    pub fear: Breakdown,
    pub damage: Breakdown,
    pub object_movement: Breakdown,
    pub sound: Breakdown,

    /// Rows reporting each individual movement effect.
    pub movement_effects: Breakdown,
    /// Ranked intensity distribution, keyed "<rank> <name>".
    pub intensity: Breakdown,
}

impl EventSummary {
    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn from_rows(rows: &[ClassifiedObservation]) -> Self {
        let total = rows.len();
        let yes_no = |b: bool, yes: &str, no: &str| if b { yes.to_string() } else { no.to_string() };

        let mut effects: BTreeMap<String, usize> = BTreeMap::new();
        for row in rows {
            for effect in row.categories.effects.iter() {
                *effects.entry(effect.to_string()).or_default() += 1;
            }
        }

        EventSummary {
            generated_at: Utc::now(),
            in_window: total,
            location: tally(rows, |r| r.categories.location.label().to_string()),
            felt_by: tally(rows, |r| r.categories.felt_by.label().to_string()),
            tremor: tally(rows, |r| r.categories.tremor.label()),
            fear: tally(rows, |r| fear_label(r.categories.fear).to_string()),
            damage: tally(rows, |r| r.categories.damage.label().to_string()),
            object_movement: tally(rows, |r| {
                yes_no(r.categories.object_movement(), "Objects moved", "No movement")
            }),
            sound: tally(rows, |r| yes_no(r.categories.sound_heard, "Sound heard", "No sound")),
            movement_effects: with_percent(effects, total),
            intensity: tally(rows, |r| intensity_key(r.intensity)),
            ..Default::default()
        }
    }

    pub fn with_load_report(mut self, report: &LoadReport) -> Self {
        self.loaded = report.loaded;
        self.invalid_timestamp = report.invalid_timestamp;
        self.invalid_coordinates = report.invalid_coordinates;
        self.lossy_rows = report.lossy_rows;
        self
    }

    pub fn with_event(mut self, event_id: u32, window: EventWindow) -> Self {
        self.event_id = event_id;
        self.window = Some(window);
        self
    }

    pub fn intensity_count(&self, label: IntensityLabel) -> usize {
        self.intensity
            .get(&intensity_key(label))
            .map_or(0, |c| c.count)
    }

    /// Logs every breakdown, one event per category value.
    pub fn log(&self) {
        info!(
            event_id = self.event_id,
            loaded = self.loaded,
            invalid_timestamp = self.invalid_timestamp,
            invalid_coordinates = self.invalid_coordinates,
            lossy_rows = self.lossy_rows,
            in_window = self.in_window,
            "Observation funnel"
        );

        let sections: [(&str, &Breakdown); 9] = [
            ("location", &self.location),
            ("felt_by", &self.felt_by),
            ("tremor", &self.tremor),
            ("fear", &self.fear),
            ("damage", &self.damage),
            ("object_movement", &self.object_movement),
            ("movement_effect", &self.movement_effects),
            ("sound", &self.sound),
            ("intensity", &self.intensity),
        ];
        for (dimension, breakdown) in sections {
            for (value, c) in breakdown {
                info!(
                    dimension,
                    value = %value,
                    count = c.count,
                    percent = c.percent,
                    "Category"
                );
            }
        }
    }
}

fn intensity_key(label: IntensityLabel) -> String {
    format!("{} {}", label.rank(), label.name())
}

fn tally<F>(rows: &[ClassifiedObservation], key: F) -> Breakdown
where
    F: Fn(&ClassifiedObservation) -> String,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(key(row)).or_default() += 1;
    }
    with_percent(counts, rows.len())
}

fn with_percent(counts: BTreeMap<String, usize>, total: usize) -> Breakdown {
    counts
        .into_iter()
        .map(|(k, count)| {
            (
                k,
                CategoryCount {
                    count,
                    percent: EventSummary::pct(count, total),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::categories::ObjectEffect;
    use crate::classify::classify_observation;
    use crate::observation::Observation;

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(EventSummary::pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(EventSummary::pct(50, 100), 50.0);
        assert_eq!(EventSummary::pct(1, 4), 25.0);
    }

    #[test]
    fn test_from_rows_empty() {
        let summary = EventSummary::from_rows(&[]);
        assert_eq!(summary.in_window, 0);
        assert!(summary.location.is_empty());
    }

    #[test]
    fn test_from_rows_counts() {
        let rows: Vec<_> = [
            ("budova", "nepocítěno", "ano"),
            ("budova", "silné otřesy", "ano"),
            ("venku", "nepocítěno", ""),
            ("venku", "nepocítěno", "ne"),
        ]
        .into_iter()
        .map(|(location, tremor, dishes)| {
            classify_observation(Observation {
                location: Some(location.into()),
                tremor: Some(tremor.into()),
                movement: vec![(ObjectEffect::Dishes, dishes.into())],
                ..Observation::sample()
            })
        })
        .collect();

        let summary = EventSummary::from_rows(&rows);

        assert_eq!(summary.in_window, 4);
        assert_eq!(summary.location["Indoors"].count, 2);
        assert_eq!(summary.location["Indoors"].percent, 50.0);
        assert_eq!(summary.tremor["nepocítěno"].count, 3);
        assert_eq!(summary.object_movement["Objects moved"].count, 2);
        assert_eq!(summary.movement_effects[&ObjectEffect::Dishes.to_string()].count, 2);
        assert!(!summary.movement_effects.contains_key(&ObjectEffect::Windows.to_string()));
        // dishes alone do not lift a not-felt answer
        assert_eq!(summary.intensity_count(IntensityLabel::NotFelt), 3);
        assert_eq!(summary.intensity_count(IntensityLabel::Strong), 1);
    }

    #[test]
    fn test_with_load_report() {
        let report = LoadReport {
            loaded: 10,
            invalid_timestamp: 2,
            invalid_coordinates: 1,
            lossy_rows: 3,
            kept: 7,
        };
        let summary = EventSummary::default().with_load_report(&report);
        assert_eq!(summary.loaded, 10);
        assert_eq!(summary.invalid_timestamp, 2);
        assert_eq!(summary.lossy_rows, 3);
    }
}
