use macroseis_rater::classify::boundary::BoundaryError;
use macroseis_rater::classify::intensity::IntensityLabel;
use macroseis_rater::config::AnalysisConfig;
use macroseis_rater::pipeline::{analyze_file, run};
use std::fs;
use std::path::Path;

const SHEET: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/mirotice_sample.csv");

#[test]
fn test_full_pipeline() {
    let analysis = analyze_file(Path::new(SHEET), &AnalysisConfig::default())
        .expect("Failed to analyze sheet");

    assert_eq!(analysis.summary.loaded, 13);
    assert_eq!(analysis.summary.invalid_timestamp, 1);
    assert_eq!(analysis.summary.invalid_coordinates, 1);
    assert_eq!(analysis.rows.len(), 10);

    let labels: Vec<_> = analysis.rows.iter().map(|r| r.intensity).collect();
    assert_eq!(
        labels,
        vec![
            IntensityLabel::MildlyDestructive,
            IntensityLabel::MildlyDestructive,
            IntensityLabel::Strong,
            IntensityLabel::SignificantlyObserved,
            IntensityLabel::Weak,
            IntensityLabel::Weak,
            IntensityLabel::Weak,
            IntensityLabel::NotFelt,
            IntensityLabel::NotFelt,
            IntensityLabel::Unclassified,
        ]
    );

    let summary = &analysis.summary;
    assert_eq!(summary.intensity_count(IntensityLabel::Weak), 3);
    assert_eq!(summary.sound["Sound heard"].count, 3);
    assert_eq!(summary.location["Indoors"].count, 8);

    let regions: Vec<_> = analysis.boundaries.regions.iter().map(|r| r.label).collect();
    assert_eq!(
        regions,
        vec![
            IntensityLabel::NotFelt,
            IntensityLabel::Weak,
            IntensityLabel::SignificantlyObserved,
            IntensityLabel::Strong,
        ]
    );
    assert_eq!(
        analysis.boundaries.skipped,
        vec![BoundaryError::InsufficientPoints {
            label: IntensityLabel::MildlyDestructive,
            distinct: 2,
        }]
    );
}

#[test]
fn test_run_writes_artifacts() {
    let dir = std::env::temp_dir().join("macroseis_rater_it_output");
    let _ = fs::remove_dir_all(&dir);

    let analysis = run(Path::new(SHEET), &AnalysisConfig::default(), &dir)
        .expect("run failed")
        .expect("window should not be empty");
    assert_eq!(analysis.rows.len(), 10);

    for name in [
        "classified.csv",
        "summary.json",
        "observations.geojson",
        "isoseismals.geojson",
    ] {
        assert!(dir.join(name).exists(), "{name} missing");
    }

    let csv = fs::read_to_string(dir.join("classified.csv")).unwrap();
    assert_eq!(csv.lines().count(), 11);

    let isoseismals: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("isoseismals.geojson")).unwrap())
            .unwrap();
    assert_eq!(isoseismals["features"].as_array().map(Vec::len), Some(4));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_empty_window_writes_nothing() {
    let mut config = AnalysisConfig::default();
    config.event.origin_time = "2024-01-01T00:00:00Z".parse().unwrap();
    let dir = std::env::temp_dir().join("macroseis_rater_it_empty");
    let _ = fs::remove_dir_all(&dir);

    let result = run(Path::new(SHEET), &config, &dir).unwrap();
    assert!(result.is_none());
    assert!(!dir.exists());
}
