//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::{Attribute, ColumnMapping, Layout, SignificanceTest};

/// Slate-stats - Compare chapter attributes between left and moderate slate voters
#[derive(Parser, Debug)]
#[command(name = "slate-stats")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Ballots CSV file (one row per voter)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Chapter metadata CSV file (population share, urbanization, income, population)
    #[arg(short, long)]
    pub metadata: Option<PathBuf>,

    /// Preset column names for the input files.
    /// Options: "legacy" (DSA Chapter, Voter, Slate, 2th; default) or
    /// "updated" (chapter, voter, slate, second_choice)
    #[arg(long, default_value = "legacy")]
    pub layout: String,

    /// Chapter column in the ballots file (overrides the layout preset)
    #[arg(long)]
    pub chapter_column: Option<String>,

    /// Voter id column in the ballots file (overrides the layout preset)
    #[arg(long)]
    pub voter_column: Option<String>,

    /// First-choice column in the ballots file (overrides the layout preset)
    #[arg(long)]
    pub slate_column: Option<String>,

    /// Second-choice column in the ballots file (overrides the layout preset)
    #[arg(long)]
    pub second_choice_column: Option<String>,

    /// Chapter key column in the metadata file (overrides the layout preset)
    #[arg(long)]
    pub metadata_chapter_column: Option<String>,

    /// Relative population column in the metadata file (values like "1.2%")
    #[arg(long)]
    pub population_share_column: Option<String>,

    /// Urbanization percentage column in the metadata file
    #[arg(long)]
    pub urbanization_column: Option<String>,

    /// Median income column in the metadata file
    #[arg(long)]
    pub median_income_column: Option<String>,

    /// Raw population column in the metadata file
    #[arg(long)]
    pub population_column: Option<String>,

    /// Attributes to analyze (comma-separated).
    /// Options: chapter_size, population_share, urbanization, median_income, population.
    /// Default: chapter_size plus every metadata attribute found in the metadata file.
    #[arg(long, value_delimiter = ',')]
    pub attributes: Vec<String>,

    /// Two-sample test between left and moderate voters.
    /// Options: "welch" (default) or "mann-whitney"
    #[arg(long, default_value = "welch")]
    pub test: String,

    /// Polynomial degree of the logistic model predictor (1 = linear, 2 adds the squared term)
    #[arg(long, default_value = "1", value_parser = validate_poly_degree)]
    pub poly_degree: usize,

    /// Inverse L2 regularization strength of the logistic model
    #[arg(long, default_value = "1.0", value_parser = validate_penalty_c)]
    pub penalty_c: f64,

    /// Fit the logistic model without regularization
    #[arg(long, default_value = "false")]
    pub no_penalty: bool,

    /// Number of points on the predicted probability curve
    #[arg(long, default_value = "300", value_parser = validate_curve_points)]
    pub curve_points: usize,

    /// Slate table JSON overriding the built-in candidate lists
    #[arg(long)]
    pub slates: Option<PathBuf>,

    /// Directory for the PNG plots
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Skip plot rendering
    #[arg(long, default_value = "false")]
    pub no_plots: bool,

    /// Write all results to this JSON file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write the joined and labelled analysis table to this CSV file
    #[arg(long)]
    pub export_merged: Option<PathBuf>,

    /// Number of rows to use for schema inference.
    /// Use 0 for a full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plot the chapter-size PDF and CDF from a ballots file
    Distribution {
        /// Ballots CSV file
        input: PathBuf,

        /// Directory for the PNG plots
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Chapter column in the ballots file
        #[arg(long, default_value = "DSA Chapter")]
        chapter_column: String,

        /// Number of rows to use for schema inference.
        /// Use 0 for a full table scan.
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },
}

impl Cli {
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// Layout preset with the individual column flags applied on top
    pub fn column_mapping(&self) -> Result<ColumnMapping, String> {
        let layout: Layout = self.layout.parse()?;
        let mut mapping = ColumnMapping::for_layout(layout);

        let overrides = [
            (&self.chapter_column, &mut mapping.ballots.chapter),
            (&self.voter_column, &mut mapping.ballots.voter),
            (&self.slate_column, &mut mapping.ballots.slate),
            (&self.second_choice_column, &mut mapping.ballots.second_choice),
            (&self.metadata_chapter_column, &mut mapping.metadata.chapter),
            (&self.population_share_column, &mut mapping.metadata.population_share),
            (&self.urbanization_column, &mut mapping.metadata.urbanization),
            (&self.median_income_column, &mut mapping.metadata.median_income),
            (&self.population_column, &mut mapping.metadata.population),
        ];
        for (flag, target) in overrides {
            if let Some(value) = flag {
                *target = value.clone();
            }
        }

        Ok(mapping)
    }

    pub fn significance_test(&self) -> Result<SignificanceTest, String> {
        self.test.parse()
    }

    /// Explicitly requested attributes, `None` when the default set applies
    pub fn requested_attributes(&self) -> Result<Option<Vec<Attribute>>, String> {
        if self.attributes.is_empty() {
            return Ok(None);
        }
        let mut parsed: Vec<Attribute> = Vec::with_capacity(self.attributes.len());
        for raw in &self.attributes {
            let attribute: Attribute = raw.parse()?;
            if !parsed.contains(&attribute) {
                parsed.push(attribute);
            }
        }
        Ok(Some(parsed))
    }

    /// Regularization strength, `None` with `--no-penalty`
    pub fn penalty(&self) -> Option<f64> {
        if self.no_penalty {
            None
        } else {
            Some(self.penalty_c)
        }
    }
}

/// Validator for poly_degree parameter
fn validate_poly_degree(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid integer", s))?;

    if !(1..=2).contains(&value) {
        Err(format!("poly_degree must be 1 or 2, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for penalty_c parameter
fn validate_penalty_c(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(value.is_finite() && value > 0.0) {
        Err(format!("penalty_c must be a positive number, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for curve_points parameter
fn validate_curve_points(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid integer", s))?;

    if value < 2 {
        Err(format!("curve_points must be at least 2, got {}", value))
    } else {
        Ok(value)
    }
}
