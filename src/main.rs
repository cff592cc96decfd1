//! Slate-stats: slate voting analysis CLI
//!
//! Loads chapter ballots and optional chapter metadata, splits voters into
//! left and moderate slates and compares chapter attributes between them.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use slate_stats::cli::{run_distribution, Cli, Commands};
use slate_stats::pipeline::{
    build_analysis_table, load_csv, read_ballots, read_metadata, run_analysis, size_series,
    AnalysisOptions, AnalysisTable, Attribute, AttributeResult, Category, LogisticConfig,
    MetadataColumns, ModelOutcome, SlateClassifier, SlateTable,
};
use slate_stats::plot::{
    boxplot_path, create_category_boxplot, create_cdf_plot, create_pdf_plot,
    create_probability_curve_plot, curve_path, CDF_FILE_NAME, PDF_FILE_NAME,
};
use slate_stats::report::{
    class_count_table, descriptive_table, export_merged_csv, export_results_json, model_table,
    significance_table, AnalysisSummary, ExportParams,
};
use slate_stats::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_indented, print_info, print_section, print_step_header,
    print_step_time, print_success, print_warning, ConfigCard,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Distribution {
                input,
                output_dir,
                chapter_column,
                infer_schema_length,
            } => run_distribution(input, output_dir, chapter_column, *infer_schema_length),
        };
    }

    let run_start = Instant::now();

    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Ballots file is required. Use -i/--input to specify a file.")
    })?;
    let mapping = cli.column_mapping().map_err(anyhow::Error::msg)?;
    let test = cli.significance_test().map_err(anyhow::Error::msg)?;
    let requested = cli.requested_attributes().map_err(anyhow::Error::msg)?;

    let options = AnalysisOptions {
        test,
        model: LogisticConfig {
            degree: cli.poly_degree,
            penalty_c: cli.penalty(),
            ..Default::default()
        },
        curve_points: cli.curve_points,
        ..Default::default()
    };

    print_banner(env!("CARGO_PKG_VERSION"));

    let attribute_names: Vec<String> = match &requested {
        Some(list) => list.iter().map(|a| a.key().to_string()).collect(),
        None => vec!["auto".to_string()],
    };
    let test_name = test.to_string();
    print_config(&ConfigCard {
        ballots: input,
        metadata: cli.metadata.as_deref(),
        output_dir: &cli.output_dir,
        attributes: &attribute_names,
        test: &test_name,
        degree: options.model.degree,
        penalty_c: options.model.penalty_c,
    });

    // Step 1: Load ballots, metadata and the slate table
    print_step_header(1, "Load Data");
    let step_start = Instant::now();

    let spinner = create_spinner("Loading ballots...");
    let ballots_df = load_csv(input, cli.infer_schema_length)?;
    let ballots = read_ballots(&ballots_df, &mapping.ballots)?;
    finish_with_success(
        &spinner,
        &format!("Loaded {} ballots", ballots.records.len()),
    );
    if ballots.missing_chapter > 0 {
        print_warning(&format!(
            "{} ballot(s) without a chapter were skipped",
            ballots.missing_chapter
        ));
    }

    let metadata = match &cli.metadata {
        Some(path) => {
            let spinner = create_spinner("Loading chapter metadata...");
            let df = load_csv(path, cli.infer_schema_length)?;
            let (rows, available) = read_metadata(&df, &mapping.metadata)?;
            finish_with_success(
                &spinner,
                &format!("Loaded metadata for {} chapters", rows.len()),
            );
            Some((rows, available))
        }
        None => None,
    };

    let attributes = resolve_attributes(
        requested,
        metadata.as_ref().map(|(_, available)| available.as_slice()),
        &mapping.metadata,
    )?;
    print_info(&format!(
        "Attributes: {}",
        attributes
            .iter()
            .map(|a| a.label())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    let slate_table = match &cli.slates {
        Some(path) => SlateTable::from_path(path)?,
        None => SlateTable::builtin().context("Built-in slate table is invalid")?,
    };
    let classifier = SlateClassifier::new(&slate_table).context("Invalid slate table")?;
    let (left_slates, moderate_slates) = classifier.slate_counts();
    print_info(&format!(
        "Slate table: {} left, {} moderate{}",
        left_slates,
        moderate_slates,
        classifier
            .tie_break_candidate()
            .map(|c| format!(", tie-break on {}", c))
            .unwrap_or_default()
    ));
    print_step_time(step_start.elapsed());

    // Step 2: Classify ballots and join chapter metadata
    print_step_header(2, "Classify & Join");
    let step_start = Instant::now();

    let (table, report) = build_analysis_table(
        &ballots.records,
        &classifier,
        metadata.as_ref().map(|(rows, _)| rows.as_slice()),
        &attributes,
    )?;

    println!();
    print_indented(&class_count_table(&report).to_string());
    println!();
    print_count("chapters", report.chapters, Some("(sized over all ballots)"));
    if report.unmatched_chapter > 0 {
        print_count(
            "ballot(s) dropped",
            report.unmatched_chapter,
            Some("(chapter not in metadata)"),
        );
    }
    if report.missing_value > 0 {
        print_count(
            "ballot(s) dropped",
            report.missing_value,
            Some("(missing or unparseable metadata value)"),
        );
    }
    if report.duplicate_metadata > 0 {
        print_warning(&format!(
            "{} duplicate metadata row(s) ignored; the first row per chapter is used",
            report.duplicate_metadata
        ));
    }
    if table.is_empty() {
        print_warning("No ballots left to analyze");
    } else {
        print_success(&format!("{} ballots ready for analysis", table.len()));
    }
    print_step_time(step_start.elapsed());

    // Step 3: Descriptive statistics and significance tests
    print_step_header(3, "Descriptive Statistics & Tests");
    let step_start = Instant::now();

    let results = run_analysis(&table, &options);
    for result in &results {
        print_section(result.attribute.label());
        print_indented(&descriptive_table(&result.by_category).to_string());
    }
    print_section(options.test.title());
    print_indented(&significance_table(&results, options.test).to_string());
    print_step_time(step_start.elapsed());

    // Step 4: Logistic regression
    print_step_header(4, "Logistic Regression");
    let step_start = Instant::now();
    print_info(&format!(
        "P(left) modelled with degree {} polynomial{}",
        options.model.degree,
        match options.model.penalty_c {
            Some(c) => format!(", L2 penalty C = {}", c),
            None => ", no penalty".to_string(),
        }
    ));
    println!();
    print_indented(&model_table(&results).to_string());
    print_step_time(step_start.elapsed());

    let mut summary = AnalysisSummary::new(report.clone());
    summary.add_results(&results);

    // Step 5: Plots
    print_step_header(5, "Plots");
    let step_start = Instant::now();
    if cli.no_plots {
        print_info("Plot rendering skipped (--no-plots)");
    } else {
        let written = render_plots(&table, &results, &cli.output_dir)?;
        for path in written {
            summary.add_output(path);
        }
    }
    print_step_time(step_start.elapsed());

    // Step 6: Exports
    if cli.json.is_some() || cli.export_merged.is_some() {
        print_step_header(6, "Export Results");
        let step_start = Instant::now();

        if let Some(path) = &cli.json {
            let params = ExportParams {
                ballots_file: input,
                metadata_file: cli.metadata.as_deref(),
                slates_file: cli.slates.as_deref(),
            };
            export_results_json(&results, &report, &options, &params, path)?;
            print_success(&format!("Results saved to {}", path.display()));
            summary.add_output(path.clone());
        }

        if let Some(path) = &cli.export_merged {
            export_merged_csv(&table, &options, path)?;
            print_success(&format!("Merged table saved to {}", path.display()));
            summary.add_output(path.clone());
        }

        print_step_time(step_start.elapsed());
    }

    summary.set_elapsed(run_start.elapsed());
    summary.display();

    print_completion();

    Ok(())
}

/// Explicit attributes must be available; otherwise use chapter size plus
/// every metadata attribute found in the metadata file.
fn resolve_attributes(
    requested: Option<Vec<Attribute>>,
    available: Option<&[Attribute]>,
    columns: &MetadataColumns,
) -> Result<Vec<Attribute>> {
    match requested {
        Some(list) => {
            for attribute in &list {
                if !attribute.is_metadata() {
                    continue;
                }
                let Some(found) = available else {
                    anyhow::bail!(
                        "Attribute '{}' requires a chapter metadata file. Use -m/--metadata to specify one.",
                        attribute
                    );
                };
                if !found.contains(attribute) {
                    anyhow::bail!(
                        "Attribute '{}' needs column '{}' in the metadata file",
                        attribute,
                        attribute.metadata_column(columns).unwrap_or_default()
                    );
                }
            }
            Ok(list)
        }
        None => {
            let mut list = vec![Attribute::ChapterSize];
            list.extend(available.unwrap_or_default().iter().copied());
            Ok(list)
        }
    }
}

/// Render every chart and return the files written
fn render_plots(
    table: &AnalysisTable,
    results: &[AttributeResult],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let spinner = create_spinner("Rendering plots...");
    let mut written = Vec::new();

    for result in results {
        let groups: Vec<(Category, Vec<f64>)> = Category::ANALYZED
            .iter()
            .map(|&c| (c, table.values_for(result.attribute, c).unwrap_or_default()))
            .collect();
        if groups.iter().any(|(_, values)| !values.is_empty()) {
            let path = boxplot_path(output_dir, result.attribute);
            create_category_boxplot(&groups, result.attribute, &path)
                .with_context(|| format!("Failed to render {}", path.display()))?;
            written.push(path);
        }

        if let ModelOutcome::Fitted {
            curve,
            observations,
            ..
        } = &result.model
        {
            let path = curve_path(output_dir, result.attribute);
            create_probability_curve_plot(curve, observations, result.attribute, &path)
                .with_context(|| format!("Failed to render {}", path.display()))?;
            written.push(path);
        }
    }

    let sizes = size_series(&table.chapter_sizes);
    if !sizes.is_empty() {
        let pdf = output_dir.join(PDF_FILE_NAME);
        let cdf = output_dir.join(CDF_FILE_NAME);
        create_pdf_plot(&sizes, &pdf).with_context(|| format!("Failed to render {}", pdf.display()))?;
        create_cdf_plot(&sizes, &cdf).with_context(|| format!("Failed to render {}", cdf.display()))?;
        written.push(pdf);
        written.push(cdf);
    }

    if written.is_empty() {
        finish_with_warning(&spinner, "No data to plot");
    } else {
        finish_with_success(&spinner, &format!("Rendered {} plot(s)", written.len()));
        for path in &written {
            println!("      {} {}", style("•").dim(), path.display());
        }
    }

    Ok(written)
}
