//! Time window around the event origin.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::observation::Observation;

/// Closed interval `[origin - tolerance, origin + tolerance]`, saturating at
/// the representable date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl EventWindow {
    pub fn around(origin: DateTime<Utc>, tolerance: Duration) -> Self {
        Self {
            start: origin
                .checked_sub_signed(tolerance)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: origin
                .checked_add_signed(tolerance)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn filter(&self, observations: Vec<Observation>) -> Vec<Observation> {
        observations
            .into_iter()
            .filter(|o| self.contains(o.observed_at))
            .collect()
    }
}
