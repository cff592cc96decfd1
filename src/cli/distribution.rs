//! Chapter-size distribution command

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Table};
use console::style;
use polars::prelude::DataFrame;

use crate::pipeline::{
    column_to_string_vec, count_by_chapter, describe, largest_chapters, load_csv, require_column,
    size_series,
};
use crate::plot::{create_cdf_plot, create_pdf_plot, CDF_FILE_NAME, PDF_FILE_NAME};
use crate::report::format_value;
use crate::utils::{create_spinner, finish_with_success, print_indented, print_success};

/// Largest chapters listed in the console summary
const TOP_CHAPTERS: usize = 10;

/// Ballots per chapter, counting every row with a non-empty chapter.
/// The voter column is not consulted, so rows without a voter id still count.
pub fn chapter_sizes_from_frame(df: &DataFrame, chapter_column: &str) -> Result<BTreeMap<String, usize>> {
    require_column(df, chapter_column, "ballots")?;
    let chapters = column_to_string_vec(df.column(chapter_column)?)?;
    let names: Vec<String> = chapters
        .into_iter()
        .flatten()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    Ok(count_by_chapter(names.iter().map(String::as_str)))
}

/// Load the ballots file, print a chapter-size summary and render the PDF and
/// CDF plots into `output_dir`
pub fn run_distribution(
    input: &Path,
    output_dir: &Path,
    chapter_column: &str,
    infer_schema_length: usize,
) -> Result<()> {
    println!(
        "\n {} Chapter size distribution",
        style("◆").cyan().bold()
    );
    println!("   Input:  {}", style(input.display()).dim());
    println!("   Output: {}", style(output_dir.display()).dim());
    println!();

    let spinner = create_spinner("Loading ballots...");
    let df = load_csv(input, infer_schema_length)?;
    let sizes = chapter_sizes_from_frame(&df, chapter_column)?;
    finish_with_success(
        &spinner,
        &format!("Loaded {} ballots from {} chapters", sizes.values().sum::<usize>(), sizes.len()),
    );

    if sizes.is_empty() {
        anyhow::bail!("No chapters found in column '{}'", chapter_column);
    }

    let series = size_series(&sizes);
    if let Some(stats) = describe(&series) {
        println!();
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Chapters").add_attribute(Attribute::Bold),
            Cell::new("mean").add_attribute(Attribute::Bold),
            Cell::new("std").add_attribute(Attribute::Bold),
            Cell::new("min").add_attribute(Attribute::Bold),
            Cell::new("median").add_attribute(Attribute::Bold),
            Cell::new("max").add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new(stats.count),
            Cell::new(format_value(stats.mean)),
            Cell::new(stats.std.map(format_value).unwrap_or_else(|| "NaN".to_string())),
            Cell::new(format_value(stats.min)),
            Cell::new(format_value(stats.median)),
            Cell::new(format_value(stats.max)),
        ]);
        print_indented(&table.to_string());
    }

    println!();
    let mut top = Table::new();
    top.load_preset(UTF8_FULL_CONDENSED);
    top.set_header(vec![
        Cell::new("Chapter").add_attribute(Attribute::Bold),
        Cell::new("Ballots").add_attribute(Attribute::Bold),
    ]);
    for (chapter, size) in largest_chapters(&sizes, TOP_CHAPTERS) {
        top.add_row(vec![Cell::new(chapter), Cell::new(size)]);
    }
    print_indented(&top.to_string());
    println!();

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let spinner = create_spinner("Rendering plots...");
    let pdf_path = output_dir.join(PDF_FILE_NAME);
    let cdf_path = output_dir.join(CDF_FILE_NAME);
    create_pdf_plot(&series, &pdf_path)
        .with_context(|| format!("Failed to render {}", pdf_path.display()))?;
    create_cdf_plot(&series, &cdf_path)
        .with_context(|| format!("Failed to render {}", cdf_path.display()))?;
    finish_with_success(&spinner, "Plots rendered");

    print_success(&format!("Saved {}", pdf_path.display()));
    print_success(&format!("Saved {}", cdf_path.display()));
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_chapter_sizes_from_frame_skips_empty_chapters() {
        let df = df! {
            "DSA Chapter" => [Some("A"), Some("A "), None, Some(""), Some("B")],
            "Voter" => [Some("1"), None, Some("3"), Some("4"), Some("5")],
        }
        .unwrap();

        let sizes = chapter_sizes_from_frame(&df, "DSA Chapter").unwrap();
        assert_eq!(sizes.get("A"), Some(&2), "Row without a voter id still counts");
        assert_eq!(sizes.get("B"), Some(&1));
        assert_eq!(sizes.len(), 2);
    }

    #[test]
    fn test_chapter_sizes_from_frame_requires_column() {
        let df = df! { "chapter" => ["A"] }.unwrap();
        assert!(chapter_sizes_from_frame(&df, "DSA Chapter").is_err());
    }
}
