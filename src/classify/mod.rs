//! Observation classification and isoseismal boundaries.
//!
//! Raw rows are normalized into [`categories::Categories`], rated by the
//! [`estimator`] rule cascade, and the rated table is turned into nested
//! convex hulls by [`boundary`].

pub mod boundary;
pub mod categories;
pub mod estimator;
pub mod intensity;

use crate::observation::{ClassifiedObservation, Observation};
use categories::Categories;

pub fn classify_observation(observation: Observation) -> ClassifiedObservation {
    let categories = Categories::from_observation(&observation);
    let (intensity, rule) = estimator::classify(&categories);
    ClassifiedObservation {
        observation,
        categories,
        intensity,
        rule,
    }
}

#[tracing::instrument(skip_all, fields(rows = observations.len()))]
pub fn classify_all(observations: Vec<Observation>) -> Vec<ClassifiedObservation> {
    observations.into_iter().map(classify_observation).collect()
}
