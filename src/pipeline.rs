//! End-to-end run: load, clean, window, classify, bound, write.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::classify::boundary::{BoundaryEstimate, estimate_boundaries};
use crate::classify::classify_all;
use crate::config::AnalysisConfig;
use crate::observation::ClassifiedObservation;
use crate::output::{
    isoseismals_geojson, observations_geojson, write_classified, write_geojson, write_summary,
};
use crate::parser::{ParsedSheet, load_observations};
use crate::stats::EventSummary;
use crate::window::EventWindow;

/// Everything one run derives from the sheet.
#[derive(Debug)]
pub struct EventAnalysis {
    pub window: EventWindow,
    pub rows: Vec<ClassifiedObservation>,
    pub boundaries: BoundaryEstimate,
    pub summary: EventSummary,
}

/// Runs the in-memory stages on an already parsed sheet.
pub fn analyze_sheet(sheet: ParsedSheet, config: &AnalysisConfig) -> EventAnalysis {
    let window = EventWindow::around(config.event.origin_time, config.window());
    let in_window = window.filter(sheet.observations);

    info!(
        event_id = config.event.id,
        start = %window.start,
        end = %window.end,
        observations = in_window.len(),
        "Observations in event window"
    );

    let rows = classify_all(in_window);
    let boundaries = estimate_boundaries(&rows);
    let summary = EventSummary::from_rows(&rows)
        .with_load_report(&sheet.report)
        .with_event(config.event.id, window);

    EventAnalysis {
        window,
        rows,
        boundaries,
        summary,
    }
}

/// Loads `source` and runs every in-memory stage.
pub fn analyze_file(source: &Path, config: &AnalysisConfig) -> Result<EventAnalysis> {
    let sheet = load_observations(source, config)?;
    Ok(analyze_sheet(sheet, config))
}

/// Writes the run's artifacts into `output_dir`, creating it if needed.
#[tracing::instrument(skip_all, fields(output_dir = %output_dir.display()))]
pub fn write_artifacts(
    analysis: &EventAnalysis,
    config: &AnalysisConfig,
    output_dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    write_classified(&output_dir.join("classified.csv"), &analysis.rows)?;
    write_summary(&output_dir.join("summary.json"), &analysis.summary)?;
    write_geojson(
        &output_dir.join("observations.geojson"),
        &observations_geojson(&analysis.rows, &config.event),
    )?;
    write_geojson(
        &output_dir.join("isoseismals.geojson"),
        &isoseismals_geojson(&analysis.boundaries.regions),
    )?;

    info!(
        rows = analysis.rows.len(),
        regions = analysis.boundaries.regions.len(),
        skipped_regions = analysis.boundaries.skipped.len(),
        "Artifacts written"
    );
    Ok(())
}

/// Full run. Returns `Ok(None)` when no observation falls in the window.
#[tracing::instrument(skip_all, fields(source = %source.display()))]
pub fn run(source: &Path, config: &AnalysisConfig, output_dir: &Path) -> Result<Option<EventAnalysis>> {
    let analysis = analyze_file(source, config)?;
    analysis.summary.log();

    if analysis.rows.is_empty() {
        warn!("No observations in the event window, nothing to write");
        return Ok(None);
    }

    write_artifacts(&analysis, config, output_dir)?;
    Ok(Some(analysis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::intensity::IntensityLabel;
    use crate::parser::read_observations;

    const SHEET: &str = "\
eqdatetime,lat,lon,pozorovaniodkud,kolikpozorvenku,popispohybu,reakcepanika,poskozomitka,nadobi
24.04.2025 19:33,49.40,14.00,budova,většina ano,silné otřesy,1,,ano
24.04.2025 19:40,49.45,14.10,budova,pouze vy,slabé chvění,0,,
24.04.2025 19:50,49.30,14.20,venku,,nepocítěno,,,
24.04.2025 20:05,49.60,13.90,budova,,,,bylo,
23.04.2025 10:00,49.50,14.00,budova,,nepocítěno,,,
";

    #[test]
    fn test_analyze_sheet_window_and_labels() {
        let config = AnalysisConfig::default();
        let sheet = read_observations(SHEET.as_bytes(), &config).unwrap();
        let analysis = analyze_sheet(sheet, &config);

        assert_eq!(analysis.summary.loaded, 5);
        assert_eq!(analysis.rows.len(), 4);

        let labels: Vec<_> = analysis.rows.iter().map(|r| r.intensity).collect();
        assert_eq!(
            labels,
            vec![
                IntensityLabel::MildlyDestructive,
                IntensityLabel::Weak,
                IntensityLabel::NotFelt,
                IntensityLabel::MildlyDestructive,
            ]
        );

        // not felt: 4 points, weak: 3, mildly destructive: 2 (skipped)
        let regions: Vec<_> = analysis.boundaries.regions.iter().map(|r| r.label).collect();
        assert_eq!(regions, vec![IntensityLabel::NotFelt, IntensityLabel::Weak]);
        assert_eq!(analysis.boundaries.skipped.len(), 1);
    }

    #[test]
    fn test_analyze_sheet_is_repeatable() {
        let config = AnalysisConfig::default();
        let first = analyze_sheet(read_observations(SHEET.as_bytes(), &config).unwrap(), &config);
        let second = analyze_sheet(read_observations(SHEET.as_bytes(), &config).unwrap(), &config);
        assert_eq!(first.rows, second.rows);
        assert_eq!(first.boundaries, second.boundaries);
    }
}
