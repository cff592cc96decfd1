//! Integration tests for the full classify, join and analyze pipeline

use slate_stats::pipeline::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn load_ballots(path: &std::path::Path, layout: Layout) -> Vec<BallotRecord> {
    let mapping = ColumnMapping::for_layout(layout);
    let df = load_csv(path, 100).unwrap();
    read_ballots(&df, &mapping.ballots).unwrap().records
}

fn load_metadata(path: &std::path::Path, layout: Layout) -> (Vec<ChapterMetadata>, Vec<Attribute>) {
    let mapping = ColumnMapping::for_layout(layout);
    let df = load_csv(path, 100).unwrap();
    read_metadata(&df, &mapping.metadata).unwrap()
}

#[test]
fn test_small_election_end_to_end() {
    // Chapter A: one moderate, one left. Chapter B: a tie-break ballot that
    // resolves left, plus a write-in that is excluded but still sized.
    let classifier = SlateClassifier::builtin().unwrap();
    let ballots = vec![
        BallotRecord::new("A", "North Star", None),
        BallotRecord::new("A", "Red Star", None),
        BallotRecord::new("B", "Aaron Berger", Some("Tom Julstrom")),
        BallotRecord::new("B", "Write-In", None),
    ];

    let (table, report) =
        build_analysis_table(&ballots, &classifier, None, &[Attribute::ChapterSize]).unwrap();

    assert_eq!(report.excluded, 1);
    assert_eq!(report.retained, 3);
    assert_eq!(
        table.categories(),
        vec![Category::Moderate, Category::Left, Category::Left]
    );
    assert_eq!(
        table.values(Attribute::ChapterSize).unwrap(),
        vec![2.0, 2.0, 2.0],
        "Excluded ballots still count toward chapter size"
    );

    let results = run_analysis(&table, &AnalysisOptions::default());
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].test,
        TestOutcome::InsufficientSample {
            left: 2,
            moderate: 1
        }
    );
    assert!(matches!(
        results[0].model,
        ModelOutcome::InsufficientData {
            error: FitError::TooFewObservations { n: 3, .. }
        }
    ));
}

#[test]
fn test_chapter_size_analysis_without_metadata() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_legacy_ballots(temp_dir.path());
    let ballots = load_ballots(&path, Layout::Legacy);
    let classifier = SlateClassifier::builtin().unwrap();

    let (table, report) =
        build_analysis_table(&ballots, &classifier, None, &[Attribute::ChapterSize]).unwrap();

    assert_eq!(report.total_ballots, TOTAL_BALLOTS);
    assert_eq!(report.chapters, 4);
    assert_eq!(report.excluded, EXCLUDED);
    assert_eq!(report.left, LEFT);
    assert_eq!(report.moderate, MODERATE);
    assert_eq!(report.dropped(), 0);
    assert_eq!(table.chapter_sizes.get("Small"), Some(&5));

    let result = &run_analysis(&table, &AnalysisOptions::default())[0];

    // Category counts add up to the retained records
    assert_eq!(result.described_count(), report.retained);

    let left = result.stats_for(Category::Left).unwrap().stats.as_ref().unwrap();
    let moderate = result
        .stats_for(Category::Moderate)
        .unwrap()
        .stats
        .as_ref()
        .unwrap();
    assert!((left.mean - 145.0 / 14.0).abs() < 1e-12);
    assert!((moderate.mean - 92.0 / 13.0).abs() < 1e-12);
    assert_eq!(left.max, 12.0);
    assert_eq!(moderate.min, 3.0);

    let p = result.test.p_value().unwrap();
    assert!(p > 0.0 && p < 1.0);

    let fit = result.model.fit().expect("model should fit");
    assert!(fit.slope() > 0.0, "Left voters sit in larger chapters");
    assert_eq!(fit.events, LEFT);
    assert_eq!(fit.non_events, MODERATE);
}

#[test]
fn test_mann_whitney_with_ties_uses_normal_approximation() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_legacy_ballots(temp_dir.path());
    let ballots = load_ballots(&path, Layout::Legacy);
    let classifier = SlateClassifier::builtin().unwrap();
    let (table, _) =
        build_analysis_table(&ballots, &classifier, None, &[Attribute::ChapterSize]).unwrap();

    let options = AnalysisOptions {
        test: SignificanceTest::MannWhitney,
        ..Default::default()
    };
    let result = &run_analysis(&table, &options)[0];

    match &result.test {
        TestOutcome::Computed { method, df, .. } => {
            assert_eq!(*method, PValueMethod::Asymptotic);
            assert!(df.is_none());
        }
        other => panic!("Expected a computed test, got {:?}", other),
    }
}

#[test]
fn test_metadata_join_drops_and_counts() {
    let (_temp_dir, ballots_path, metadata_path) = legacy_fixture();
    let ballots = load_ballots(&ballots_path, Layout::Legacy);
    let (rows, available) = load_metadata(&metadata_path, Layout::Legacy);
    let classifier = SlateClassifier::builtin().unwrap();

    let mut attributes = vec![Attribute::ChapterSize];
    attributes.extend(available);

    let (table, report) =
        build_analysis_table(&ballots, &classifier, Some(rows.as_slice()), &attributes).unwrap();

    assert_eq!(report.excluded, 1);
    assert_eq!(report.unmatched_chapter, 3, "Tiny has no metadata row");
    assert_eq!(report.missing_value, 4, "Small lacks a median income");
    assert_eq!(report.duplicate_metadata, 1);
    assert_eq!(report.retained, 20);
    assert_eq!(report.left, 13);
    assert_eq!(report.moderate, 7);
    assert_eq!(
        report.excluded + report.dropped() + report.retained,
        report.total_ballots
    );

    // The first Mid row wins
    let mid_urbanization: Vec<f64> = table
        .records
        .iter()
        .zip(table.values(Attribute::Urbanization).unwrap())
        .filter(|(r, _)| r.chapter == "Mid")
        .map(|(_, v)| v)
        .collect();
    assert!(mid_urbanization.iter().all(|v| *v == 75.0));

    // Percentages arrive as fractions
    let shares = table.values(Attribute::PopulationShare).unwrap();
    assert!(shares.iter().all(|v| *v > 0.0 && *v < 0.02));

    let results = run_analysis(&table, &AnalysisOptions::default());
    assert_eq!(results.len(), 5);
    for result in &results {
        assert_eq!(result.described_count(), 20);
        assert!(result.model.fit().is_some(), "{} should fit", result.attribute);
    }
}

#[test]
fn test_chapter_size_only_still_joins_metadata() {
    let (_temp_dir, ballots_path, metadata_path) = legacy_fixture();
    let ballots = load_ballots(&ballots_path, Layout::Legacy);
    let (rows, _) = load_metadata(&metadata_path, Layout::Legacy);
    let classifier = SlateClassifier::builtin().unwrap();

    let (_, report) = build_analysis_table(
        &ballots,
        &classifier,
        Some(rows.as_slice()),
        &[Attribute::ChapterSize],
    )
    .unwrap();

    assert_eq!(report.unmatched_chapter, 3);
    assert_eq!(report.missing_value, 0, "Median income is not requested");
    assert_eq!(report.retained, 24);
}

#[test]
fn test_updated_layout_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let ballots_path = create_updated_ballots(temp_dir.path());
    let metadata_path = create_updated_metadata(temp_dir.path());

    let ballots = load_ballots(&ballots_path, Layout::Updated);
    let (rows, available) = load_metadata(&metadata_path, Layout::Updated);
    let classifier = SlateClassifier::builtin().unwrap();

    let (table, report) =
        build_analysis_table(&ballots, &classifier, Some(rows.as_slice()), &available).unwrap();

    assert_eq!(report.dropped(), 0);
    assert_eq!(report.retained, LEFT + MODERATE);
    assert_eq!(table.attributes, available);

    let df = table.to_dataframe(&TargetMapping::default()).unwrap();
    assert_eq!(df.height(), LEFT + MODERATE);
    assert!(df.column("population_share").is_ok());
    assert!(df.column("slate_binary").is_ok());
}

#[test]
fn test_metadata_attribute_requires_metadata() {
    let classifier = SlateClassifier::builtin().unwrap();
    let ballots = vec![BallotRecord::new("A", "Red Star", None)];

    let result = build_analysis_table(&ballots, &classifier, None, &[Attribute::Urbanization]);
    assert!(result.is_err());
}

#[test]
fn test_custom_slate_table() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("slates.json");
    std::fs::write(
        &path,
        r#"{ "moderate": ["Blue"], "left": ["Red"] }"#,
    )
    .unwrap();

    let table = SlateTable::from_path(&path).unwrap();
    let classifier = SlateClassifier::new(&table).unwrap();

    assert_eq!(classifier.classify("Red", None), Category::Left);
    assert_eq!(classifier.classify(" Blue ", None), Category::Moderate);
    assert_eq!(classifier.classify("Red Star", None), Category::Excluded);
    assert_eq!(classifier.tie_break_candidate(), None);
}
