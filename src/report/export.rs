//! JSON and CSV export of the analysis results

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::{AnalysisOptions, AnalysisTable, AttributeResult, BuildReport};

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (RFC 3339)
    pub timestamp: String,
    pub version: String,
    pub ballots_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slates_file: Option<String>,
    pub test: String,
    pub poly_degree: usize,
    /// Inverse L2 regularization strength; absent for an unpenalized fit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty_c: Option<f64>,
}

/// Complete results export
#[derive(Serialize)]
pub struct ResultsExport<'a> {
    pub metadata: RunMetadata,
    pub counts: &'a BuildReport,
    pub attributes: &'a [AttributeResult],
}

/// Input locations recorded in the export metadata
pub struct ExportParams<'a> {
    pub ballots_file: &'a Path,
    pub metadata_file: Option<&'a Path>,
    pub slates_file: Option<&'a Path>,
}

/// Write all results to a pretty-printed JSON file
pub fn export_results_json(
    results: &[AttributeResult],
    report: &BuildReport,
    options: &AnalysisOptions,
    params: &ExportParams,
    output_path: &Path,
) -> Result<()> {
    let export = ResultsExport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ballots_file: params.ballots_file.display().to_string(),
            metadata_file: params.metadata_file.map(|p| p.display().to_string()),
            slates_file: params.slates_file.map(|p| p.display().to_string()),
            test: options.test.to_string(),
            poly_degree: options.model.degree,
            penalty_c: options.model.penalty_c,
        },
        counts: report,
        attributes: results,
    };

    let json =
        serde_json::to_string_pretty(&export).context("Failed to serialize results to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write results to {}", output_path.display()))?;

    Ok(())
}

/// Write the joined, labelled analysis table as CSV
pub fn export_merged_csv(
    table: &AnalysisTable,
    options: &AnalysisOptions,
    output_path: &Path,
) -> Result<()> {
    let mut df = table
        .to_dataframe(&options.target)
        .context("Failed to build the merged table")?;

    let mut file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
    CsvWriter::new(&mut file)
        .finish(&mut df)
        .with_context(|| format!("Failed to write CSV file: {}", output_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{build_analysis_table, run_analysis, Attribute, BallotRecord, SlateClassifier};

    fn sample() -> (AnalysisTable, BuildReport) {
        let classifier = SlateClassifier::builtin().unwrap();
        let ballots = vec![
            BallotRecord::new("A", "North Star", None),
            BallotRecord::new("A", "Red Star", None),
            BallotRecord::new("B", "Aaron Berger", Some("Tom Julstrom")),
            BallotRecord::new("B", "Write-In", None),
        ];
        build_analysis_table(&ballots, &classifier, None, &[Attribute::ChapterSize]).unwrap()
    }

    #[test]
    fn test_json_export_contains_metadata_and_results() {
        let (table, report) = sample();
        let options = AnalysisOptions::default();
        let results = run_analysis(&table, &options);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let params = ExportParams {
            ballots_file: Path::new("ballots.csv"),
            metadata_file: None,
            slates_file: None,
        };
        export_results_json(&results, &report, &options, &params, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["metadata"]["test"], "welch");
        assert_eq!(value["metadata"]["poly_degree"], 1);
        assert_eq!(value["counts"]["excluded"], 1);
        assert_eq!(value["attributes"][0]["attribute"], "chapter_size");
        assert_eq!(value["attributes"][0]["test"]["outcome"], "insufficient_sample");
        assert_eq!(value["attributes"][0]["model"]["status"], "insufficient_data");
        assert_eq!(
            value["attributes"][0]["model"]["error"]["reason"],
            "too_few_observations"
        );
    }

    #[test]
    fn test_merged_csv_export() {
        let (table, _) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.csv");

        export_merged_csv(&table, &AnalysisOptions::default(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(
            header,
            "voter,chapter,slate,slate_category,slate_binary,chapter_size"
        );
        assert_eq!(contents.lines().count(), 4);
    }
}
