//! Dataset loader for the ballots and chapter metadata CSV files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use super::attribute::Attribute;
use super::columns::{BallotColumns, MetadataColumns};

/// One voter's ballot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallotRecord {
    pub voter: Option<String>,
    pub chapter: String,
    /// First-choice candidate or slate
    pub slate: Option<String>,
    pub second_choice: Option<String>,
}

impl BallotRecord {
    pub fn new(chapter: &str, slate: &str, second_choice: Option<&str>) -> Self {
        Self {
            voter: None,
            chapter: chapter.to_string(),
            slate: Some(slate.to_string()),
            second_choice: second_choice.map(|s| s.to_string()),
        }
    }
}

/// Ballots read from disk plus the rows that could not be attributed to a chapter
#[derive(Debug, Clone, Default)]
pub struct BallotSet {
    pub records: Vec<BallotRecord>,
    pub missing_chapter: usize,
}

/// One row of the chapter metadata file.
///
/// A value is `None` when its column is absent or the cell is empty or
/// unparseable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterMetadata {
    pub chapter: String,
    pub population_share: Option<f64>,
    pub urbanization: Option<f64>,
    pub median_income: Option<f64>,
    pub population: Option<f64>,
}

impl ChapterMetadata {
    pub fn value(&self, attribute: Attribute) -> Option<f64> {
        match attribute {
            Attribute::ChapterSize => None,
            Attribute::PopulationShare => self.population_share,
            Attribute::Urbanization => self.urbanization,
            Attribute::MedianIncome => self.median_income,
            Attribute::Population => self.population,
        }
    }

    fn set(&mut self, attribute: Attribute, value: Option<f64>) {
        match attribute {
            Attribute::ChapterSize => {}
            Attribute::PopulationShare => self.population_share = value,
            Attribute::Urbanization => self.urbanization = value,
            Attribute::MedianIncome => self.median_income = value,
            Attribute::Population => self.population = value,
        }
    }
}

/// Load a CSV file into a DataFrame
///
/// # Arguments
/// * `path` - CSV file with a header row
/// * `infer_schema_length` - Rows used for type inference, 0 for a full scan
pub fn load_csv(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(schema_length)
        .finish()
        .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        .collect()
        .with_context(|| format!("Failed to parse CSV file: {}", path.display()))?;

    Ok(df)
}

/// Column names of a loaded DataFrame
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

/// Fail with the list of available columns if `column` is missing
pub fn require_column(df: &DataFrame, column: &str, file_kind: &str) -> Result<()> {
    let names = column_names(df);
    if !names.iter().any(|n| n == column) {
        anyhow::bail!(
            "Column '{}' not found in {} file. Available columns: {:?}",
            column,
            file_kind,
            names
        );
    }
    Ok(())
}

/// Project the ballots DataFrame onto [`BallotRecord`]s.
///
/// The chapter and slate columns are required. Voter and second-choice
/// columns are optional: when absent every record carries `None`. Rows with an
/// empty chapter cannot be sized or joined and are counted in
/// [`BallotSet::missing_chapter`].
pub fn read_ballots(df: &DataFrame, columns: &BallotColumns) -> Result<BallotSet> {
    require_column(df, &columns.chapter, "ballots")?;
    require_column(df, &columns.slate, "ballots")?;

    let chapters = column_to_string_vec(df.column(&columns.chapter)?)?;
    let slates = column_to_string_vec(df.column(&columns.slate)?)?;
    let voters = optional_string_column(df, &columns.voter)?;
    let seconds = optional_string_column(df, &columns.second_choice)?;

    let mut set = BallotSet {
        records: Vec::with_capacity(df.height()),
        missing_chapter: 0,
    };

    for (i, chapter) in chapters.into_iter().enumerate() {
        let chapter = match chapter.map(|c| c.trim().to_string()) {
            Some(c) if !c.is_empty() => c,
            _ => {
                set.missing_chapter += 1;
                continue;
            }
        };

        set.records.push(BallotRecord {
            voter: voters.as_ref().and_then(|v| v[i].clone()),
            chapter,
            slate: slates[i].clone(),
            second_choice: seconds.as_ref().and_then(|v| v[i].clone()),
        });
    }

    Ok(set)
}

/// Project the metadata DataFrame onto [`ChapterMetadata`] rows.
///
/// Only the attribute columns present in the file are read; the rest stay
/// `None`. Returns the rows and the attributes whose columns were found.
pub fn read_metadata(
    df: &DataFrame,
    columns: &MetadataColumns,
) -> Result<(Vec<ChapterMetadata>, Vec<Attribute>)> {
    require_column(df, &columns.chapter, "metadata")?;

    let chapters = column_to_string_vec(df.column(&columns.chapter)?)?;
    let mut rows: Vec<ChapterMetadata> = chapters
        .into_iter()
        .map(|c| ChapterMetadata {
            chapter: c.map(|s| s.trim().to_string()).unwrap_or_default(),
            ..Default::default()
        })
        .collect();

    let mut available = Vec::new();
    for attribute in Attribute::ALL.into_iter().filter(|a| a.is_metadata()) {
        let Some(column) = attribute.metadata_column(columns) else {
            continue;
        };
        let Some(values) = optional_string_column(df, column)? else {
            continue;
        };

        for (row, raw) in rows.iter_mut().zip(values) {
            let parsed = raw.as_deref().and_then(|s| {
                if attribute.is_percentage() {
                    parse_percentage(s)
                } else {
                    parse_number(s)
                }
            });
            row.set(attribute, parsed);
        }
        available.push(attribute);
    }

    rows.retain(|r| !r.chapter.is_empty());
    Ok((rows, available))
}

/// Parse a percentage such as `"12.5%"` into a fraction (`0.125`).
///
/// The trailing `%` is optional; the value is always divided by 100.
pub fn parse_percentage(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v / 100.0)
}

/// Parse a plain number, ignoring currency signs, thousands separators and a
/// trailing `%`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn optional_string_column(df: &DataFrame, column: &str) -> Result<Option<Vec<Option<String>>>> {
    match df.column(column) {
        Ok(col) => Ok(Some(column_to_string_vec(col)?)),
        Err(_) => Ok(None),
    }
}

/// Convert a column to a Vec of Option<String>, whatever its inferred type
pub fn column_to_string_vec(col: &Column) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64)?;
            cast.u64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect()
        }
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}
