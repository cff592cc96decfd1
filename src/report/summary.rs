//! Final run summary

use std::path::PathBuf;
use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use super::tables::ALPHA;
use crate::pipeline::{AttributeResult, BuildReport};

/// Summary of one analysis run
#[derive(Debug, Default)]
pub struct AnalysisSummary {
    pub report: BuildReport,
    pub attributes_analyzed: usize,
    pub significant: Vec<String>,
    pub models_fitted: usize,
    pub outputs: Vec<PathBuf>,
    pub elapsed: Duration,
}

impl AnalysisSummary {
    pub fn new(report: BuildReport) -> Self {
        Self {
            report,
            ..Default::default()
        }
    }

    pub fn add_results(&mut self, results: &[AttributeResult]) {
        self.attributes_analyzed = results.len();
        self.significant = results
            .iter()
            .filter(|r| r.test.is_significant(ALPHA))
            .map(|r| r.attribute.label().to_string())
            .collect();
        self.models_fitted = results.iter().filter(|r| r.model.fit().is_some()).count();
    }

    pub fn add_output(&mut self, path: PathBuf) {
        self.outputs.push(path);
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub fn build_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        let report = &self.report;
        table.add_row(vec![
            Cell::new("🗳️  Ballots"),
            Cell::new(report.total_ballots),
        ]);
        table.add_row(vec![Cell::new("🏘️  Chapters"), Cell::new(report.chapters)]);
        table.add_row(vec![
            Cell::new("🚫 Excluded (N/A)"),
            Cell::new(report.excluded).fg(if report.excluded == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);
        table.add_row(vec![
            Cell::new("🔗 Dropped (no metadata)"),
            Cell::new(report.unmatched_chapter).fg(if report.unmatched_chapter == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);
        table.add_row(vec![
            Cell::new("❓ Dropped (missing value)"),
            Cell::new(report.missing_value).fg(if report.missing_value == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);
        table.add_row(vec![
            Cell::new("✅ Analyzed"),
            Cell::new(format!(
                "{} ({} left, {} moderate)",
                report.retained, report.left, report.moderate
            ))
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("📈 Models fitted"),
            Cell::new(format!("{} / {}", self.models_fitted, self.attributes_analyzed)),
        ]);
        table.add_row(vec![
            Cell::new(format!("⭐ Significant (p < {})", ALPHA)),
            Cell::new(self.significant.len()).fg(if self.significant.is_empty() {
                Color::White
            } else {
                Color::Green
            }),
        ]);
        table.add_row(vec![
            Cell::new("⏱️  Elapsed"),
            Cell::new(format!("{:.2?}", self.elapsed)),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("ANALYSIS SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        // Indent the table
        for line in self.build_table().to_string().lines() {
            println!("    {}", line);
        }

        if !self.significant.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Significant differences").yellow(),
                style(format!("({})", self.significant.len())).dim()
            );
            for name in &self.significant {
                println!("        {} {}", style("•").dim(), name);
            }
        }

        if !self.outputs.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Files written").yellow(),
                style(format!("({})", self.outputs.len())).dim()
            );
            for path in &self.outputs {
                println!("        {} {}", style("•").dim(), path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{
        build_analysis_table, run_analysis, AnalysisOptions, Attribute, BallotRecord,
        SlateClassifier,
    };

    #[test]
    fn test_summary_collects_results() {
        let classifier = SlateClassifier::builtin().unwrap();
        let mut ballots = Vec::new();
        for (chapter, n, slate) in [("A", 8, "Red Star"), ("B", 2, "Groundwork"), ("C", 3, "Groundwork")] {
            for _ in 0..n {
                ballots.push(BallotRecord::new(chapter, slate, None));
            }
        }
        let (table, report) =
            build_analysis_table(&ballots, &classifier, None, &[Attribute::ChapterSize]).unwrap();
        let results = run_analysis(&table, &AnalysisOptions::default());

        let mut summary = AnalysisSummary::new(report);
        summary.add_results(&results);
        summary.add_output(PathBuf::from("chapter_size_by_slate_category.png"));

        assert_eq!(summary.attributes_analyzed, 1);
        // Left is constant at 8; moderate varies, so Welch still runs
        assert_eq!(summary.significant, vec!["Chapter Size".to_string()]);
        let rendered = summary.build_table().to_string();
        assert!(rendered.contains("13 (8 left, 5 moderate)"));
    }
}
