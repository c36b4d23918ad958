//! Isoseismal regions: one convex hull per intensity threshold.

use geo::{Area, ConvexHull, Coord, LineString, MultiPoint, Point, Polygon};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::classify::intensity::IntensityLabel;
use crate::observation::ClassifiedObservation;

/// Hulls below this area (square degrees) are treated as collinear.
const MIN_HULL_AREA: f64 = 1e-12;

/// Why a threshold produced no region.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundaryError {
    #[error("only {distinct} distinct points at or above {label}, need 3")]
    InsufficientPoints {
        label: IntensityLabel,
        distinct: usize,
    },
    #[error("points at or above {label} are collinear or coincident")]
    Degenerate { label: IntensityLabel },
}

/// Convex hull of every observation at or above `label`.
#[derive(Debug, Clone, PartialEq)]
pub struct IsoseismalRegion {
    pub label: IntensityLabel,
    /// Number of distinct points the hull was built from.
    pub points: usize,
    pub polygon: Polygon<f64>,
}

/// Regions in ascending rank plus the thresholds that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryEstimate {
    pub regions: Vec<IsoseismalRegion>,
    pub skipped: Vec<BoundaryError>,
}

/// Distinct (lon, lat) pairs of real-labelled rows with rank >= `threshold`.
pub fn threshold_points(rows: &[ClassifiedObservation], threshold: u32) -> BTreeSet<(u64, u64)> {
    rows.iter()
        .filter(|r| r.intensity.is_real() && r.intensity.rank() >= threshold)
        .map(|r| {
            let (lon, lat) = r.lon_lat();
            (lon.to_bits(), lat.to_bits())
        })
        .collect()
}

/// Computes one hull per label present in `rows`, lowest rank first.
///
/// Failures are per-label: a skipped threshold never stops the others.
#[tracing::instrument(skip_all, fields(rows = rows.len()))]
pub fn estimate_boundaries(rows: &[ClassifiedObservation]) -> BoundaryEstimate {
    let mut estimate = BoundaryEstimate::default();

    for label in IntensityLabel::REAL {
        if !rows.iter().any(|r| r.intensity == label) {
            continue;
        }

        match hull_for(rows, label) {
            Ok(region) => {
                debug!(label = %label, points = region.points, "Isoseismal hull computed");
                estimate.regions.push(region);
            }
            Err(e) => {
                warn!(label = %label, reason = %e, "Skipping isoseismal region");
                estimate.skipped.push(e);
            }
        }
    }

    estimate
}

fn hull_for(
    rows: &[ClassifiedObservation],
    label: IntensityLabel,
) -> Result<IsoseismalRegion, BoundaryError> {
    let distinct = threshold_points(rows, label.rank());
    if distinct.len() < 3 {
        return Err(BoundaryError::InsufficientPoints {
            label,
            distinct: distinct.len(),
        });
    }

    let points: Vec<Point<f64>> = distinct
        .iter()
        .map(|&(lon, lat)| Point::new(f64::from_bits(lon), f64::from_bits(lat)))
        .collect();
    let hull = MultiPoint::new(points).convex_hull();

    if hull.unsigned_area() <= MIN_HULL_AREA {
        return Err(BoundaryError::Degenerate { label });
    }

    Ok(IsoseismalRegion {
        label,
        points: distinct.len(),
        polygon: canonical(hull),
    })
}

/// Rotates the exterior ring to start at its lowest (lon, lat) vertex.
fn canonical(polygon: Polygon<f64>) -> Polygon<f64> {
    let (exterior, _) = polygon.into_inner();
    let mut coords: Vec<Coord<f64>> = exterior.0;
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }

    let start = coords
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)))
        .map(|(i, _)| i)
        .unwrap_or(0);
    coords.rotate_left(start);

    // Polygon::new closes the ring
    Polygon::new(LineString::from(coords), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::categories::Categories;
    use crate::observation::Observation;
    use proptest::prelude::*;

    fn row(lon: f64, lat: f64, intensity: IntensityLabel) -> ClassifiedObservation {
        let observation = Observation {
            lon,
            lat,
            ..Observation::sample()
        };
        ClassifiedObservation {
            categories: Categories::from_observation(&observation),
            observation,
            intensity,
            rule: None,
        }
    }

    fn table() -> Vec<ClassifiedObservation> {
        vec![
            row(14.0, 49.0, IntensityLabel::Weak),
            row(14.6, 49.1, IntensityLabel::Weak),
            row(14.3, 49.7, IntensityLabel::Weak),
            row(14.1, 49.3, IntensityLabel::Strong),
            row(14.4, 49.4, IntensityLabel::Strong),
        ]
    }

    #[test]
    fn test_insufficient_high_rank_points_skipped() {
        let estimate = estimate_boundaries(&table());

        assert_eq!(estimate.regions.len(), 1);
        assert_eq!(estimate.regions[0].label, IntensityLabel::Weak);
        assert_eq!(estimate.regions[0].points, 5);
        assert_eq!(
            estimate.skipped,
            vec![BoundaryError::InsufficientPoints {
                label: IntensityLabel::Strong,
                distinct: 2
            }]
        );
    }

    #[test]
    fn test_unclassified_rows_excluded() {
        let mut rows = table();
        rows.push(row(20.0, 55.0, IntensityLabel::Unclassified));
        rows.push(row(21.0, 56.0, IntensityLabel::Unclassified));

        let with_noise = estimate_boundaries(&rows);
        let without = estimate_boundaries(&table());
        assert_eq!(with_noise, without);
    }

    #[test]
    fn test_regions_in_ascending_rank() {
        let mut rows = table();
        rows.push(row(14.2, 49.6, IntensityLabel::Strong));
        rows.push(row(13.5, 48.5, IntensityLabel::NotFelt));

        let estimate = estimate_boundaries(&rows);
        let labels: Vec<_> = estimate.regions.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![IntensityLabel::NotFelt, IntensityLabel::Weak, IntensityLabel::Strong]
        );
        assert!(estimate.skipped.is_empty());
    }

    #[test]
    fn test_collinear_points_degenerate() {
        let rows = vec![
            row(14.0, 49.0, IntensityLabel::Weak),
            row(14.1, 49.1, IntensityLabel::Weak),
            row(14.2, 49.2, IntensityLabel::Weak),
        ];
        let estimate = estimate_boundaries(&rows);
        assert!(estimate.regions.is_empty());
        assert_eq!(
            estimate.skipped,
            vec![BoundaryError::Degenerate {
                label: IntensityLabel::Weak
            }]
        );
    }

    #[test]
    fn test_coincident_points_count_once() {
        let rows = vec![
            row(14.0, 49.0, IntensityLabel::Weak),
            row(14.0, 49.0, IntensityLabel::Weak),
            row(14.0, 49.0, IntensityLabel::Weak),
            row(14.5, 49.5, IntensityLabel::Weak),
        ];
        let estimate = estimate_boundaries(&rows);
        assert!(matches!(
            estimate.skipped.as_slice(),
            [BoundaryError::InsufficientPoints { distinct: 2, .. }]
        ));
    }

    #[test]
    fn test_ring_is_closed_and_canonical() {
        let estimate = estimate_boundaries(&table());
        let ring = estimate.regions[0].polygon.exterior();
        assert!(ring.is_closed());
        assert_eq!(ring.0.first(), Some(&Coord { x: 14.0, y: 49.0 }));
    }

    #[test]
    fn test_row_order_does_not_change_hulls() {
        let mut reversed = table();
        reversed.reverse();
        assert_eq!(estimate_boundaries(&reversed), estimate_boundaries(&table()));
    }

    fn arb_rows() -> impl Strategy<Value = Vec<ClassifiedObservation>> {
        let labels = [
            IntensityLabel::NotFelt,
            IntensityLabel::RarelyFelt,
            IntensityLabel::Weak,
            IntensityLabel::SignificantlyObserved,
            IntensityLabel::Strong,
            IntensityLabel::MildlyDestructive,
            IntensityLabel::Unclassified,
        ];
        proptest::collection::vec((0u8..20, 0u8..20, 0..labels.len()), 0..40).prop_map(
            move |cells| {
                cells
                    .into_iter()
                    .map(|(x, y, l)| {
                        row(14.0 + f64::from(x) * 0.05, 49.0 + f64::from(y) * 0.05, labels[l])
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn test_threshold_points_monotone(rows in arb_rows()) {
            for pair in IntensityLabel::REAL.windows(2) {
                let lower = threshold_points(&rows, pair[0].rank());
                let higher = threshold_points(&rows, pair[1].rank());
                prop_assert!(higher.is_subset(&lower));
            }
        }

        #[test]
        fn test_boundaries_are_repeatable(rows in arb_rows()) {
            let first = estimate_boundaries(&rows);
            prop_assert_eq!(&first, &estimate_boundaries(&rows));

            let ranks: Vec<u32> = first.regions.iter().map(|r| r.label.rank()).collect();
            prop_assert!(ranks.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(first.regions.iter().all(|r| r.points >= 3 && r.polygon.exterior().is_closed()));
        }
    }

    #[test]
    fn test_threshold_points_nested() {
        let mut rows = table();
        rows.push(row(13.5, 48.5, IntensityLabel::NotFelt));
        for pair in IntensityLabel::REAL.windows(2) {
            let lower = threshold_points(&rows, pair[0].rank());
            let higher = threshold_points(&rows, pair[1].rank());
            assert!(higher.is_subset(&lower));
        }
    }
}
