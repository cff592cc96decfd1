//! Console tables for the per-attribute results

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute as CellAttribute, Cell, Color, Table};

use crate::pipeline::{
    AttributeResult, BuildReport, Category, CategoryStats, ModelOutcome, TestOutcome,
};
use crate::pipeline::significance::SignificanceTest;

/// Significance level used to highlight p-values
pub const ALPHA: f64 = 0.05;

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(CellAttribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

/// Compact numeric formatting for table cells
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        "NaN".to_string()
    } else if value != 0.0 && (value.abs() >= 1e6 || value.abs() < 1e-3) {
        format!("{:.4e}", value)
    } else if value.abs() >= 1000.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.4}", value)
    }
}

fn format_p_value(p: f64) -> String {
    if p < 1e-4 {
        format!("{:.3e}", p)
    } else {
        format!("{:.4}", p)
    }
}

/// Descriptive statistics of one attribute, one row per category
pub fn descriptive_table(stats: &[CategoryStats]) -> Table {
    let mut table = new_table(&[
        "Category", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
    ]);

    for entry in stats {
        let mut row = vec![Cell::new(entry.category).add_attribute(CellAttribute::Bold)];
        match &entry.stats {
            Some(s) => {
                row.push(Cell::new(s.count));
                row.push(Cell::new(format_value(s.mean)));
                row.push(Cell::new(s.std.map(format_value).unwrap_or_else(|| "NaN".to_string())));
                for v in [s.min, s.q25, s.median, s.q75, s.max] {
                    row.push(Cell::new(format_value(v)));
                }
            }
            None => {
                row.push(Cell::new(0));
                row.extend((0..7).map(|_| Cell::new("-").fg(Color::DarkGrey)));
            }
        }
        table.add_row(row);
    }

    table
}

/// One row per attribute with the test statistic and p-value
pub fn significance_table(results: &[AttributeResult], test: SignificanceTest) -> Table {
    let mut table = new_table(&["Attribute", test.statistic_name(), "df", "p-value", "Result"]);

    for result in results {
        let name = Cell::new(result.attribute.label());
        let row = match &result.test {
            TestOutcome::Computed {
                statistic,
                p_value,
                df,
                ..
            } => {
                let significant = *p_value < ALPHA;
                vec![
                    name,
                    Cell::new(format_value(*statistic)),
                    Cell::new(df.map(format_value).unwrap_or_else(|| "-".to_string())),
                    Cell::new(format_p_value(*p_value)).fg(if significant {
                        Color::Green
                    } else {
                        Color::White
                    }),
                    if significant {
                        Cell::new(format!("significant (p < {})", ALPHA))
                            .fg(Color::Green)
                            .add_attribute(CellAttribute::Bold)
                    } else {
                        Cell::new("not significant").fg(Color::DarkGrey)
                    },
                ]
            }
            TestOutcome::InsufficientSample { left, moderate } => vec![
                name,
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(format!(
                    "insufficient sample ({} left, {} moderate)",
                    left, moderate
                ))
                .fg(Color::Yellow),
            ],
            TestOutcome::ZeroVariance => vec![
                name,
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("zero variance").fg(Color::Yellow),
            ],
        };
        table.add_row(row);
    }

    table
}

/// Fitted terms, intercept and odds ratios for every attribute
pub fn model_table(results: &[AttributeResult]) -> Table {
    let mut table = new_table(&["Attribute", "Term", "Coefficient", "Odds Ratio", "Notes"]);

    for result in results {
        let label = result.attribute.label();
        match &result.model {
            ModelOutcome::Fitted { fit, .. } => {
                let notes = if fit.converged {
                    format!("n = {}, {} iterations", fit.observations, fit.iterations)
                } else {
                    format!("did not converge after {} iterations", fit.iterations)
                };
                for term in &fit.terms {
                    let term_name = match term.power {
                        1 => "x".to_string(),
                        p => format!("x^{}", p),
                    };
                    table.add_row(vec![
                        Cell::new(label),
                        Cell::new(term_name),
                        Cell::new(format_value(term.coefficient)),
                        Cell::new(format_value(term.odds_ratio)).fg(if term.odds_ratio > 1.0 {
                            Color::Green
                        } else {
                            Color::Red
                        }),
                        Cell::new(&notes).fg(if fit.converged {
                            Color::DarkGrey
                        } else {
                            Color::Yellow
                        }),
                    ]);
                }
                table.add_row(vec![
                    Cell::new(label),
                    Cell::new("intercept"),
                    Cell::new(format_value(fit.intercept)),
                    Cell::new("-"),
                    Cell::new(format!("log-likelihood {:.3}", fit.log_likelihood))
                        .fg(Color::DarkGrey),
                ]);
            }
            ModelOutcome::InsufficientData { error } => {
                table.add_row(vec![
                    Cell::new(label),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new(format!("insufficient data: {}", error)).fg(Color::Yellow),
                ]);
            }
        }
    }

    table
}

/// Ballot counts per category
pub fn class_count_table(report: &BuildReport) -> Table {
    let mut table = new_table(&["Category", "Ballots", "Share"]);
    let classified = report.total_ballots.max(1) as f64;

    let rows = [
        (Category::Left, report.left, Color::Red),
        (Category::Moderate, report.moderate, Color::Blue),
        (Category::Excluded, report.excluded, Color::DarkGrey),
    ];
    for (category, count, color) in rows {
        table.add_row(vec![
            Cell::new(category).fg(color).add_attribute(CellAttribute::Bold),
            Cell::new(count),
            Cell::new(format!("{:.1}%", count as f64 / classified * 100.0)),
        ]);
    }

    if report.dropped() > 0 {
        table.add_row(vec![
            Cell::new("dropped (join)").fg(Color::Yellow),
            Cell::new(report.dropped()),
            Cell::new(format!(
                "{:.1}%",
                report.dropped() as f64 / classified * 100.0
            )),
        ]);
    }

    table
}
