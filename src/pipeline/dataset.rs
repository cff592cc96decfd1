//! Classified, sized and joined analysis table

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use super::attribute::Attribute;
use super::chapters::chapter_sizes;
use super::classifier::{Category, SlateClassifier};
use super::loader::{BallotRecord, ChapterMetadata};
use super::target::{create_target_mask, TargetMapping};

/// A retained ballot with its category and attribute values
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub voter: Option<String>,
    pub chapter: String,
    pub slate: String,
    pub category: Category,
    pub chapter_size: usize,
    /// One value per attribute of the owning table, in the same order
    pub values: Vec<f64>,
}

/// Counts describing how the ballot set was reduced to the analysis table
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub total_ballots: usize,
    pub chapters: usize,
    pub excluded: usize,
    /// Ballots whose chapter has no metadata row
    pub unmatched_chapter: usize,
    /// Ballots whose chapter metadata is missing a requested value
    pub missing_value: usize,
    pub retained: usize,
    pub left: usize,
    pub moderate: usize,
    /// Metadata rows ignored because their chapter was already listed
    pub duplicate_metadata: usize,
}

impl BuildReport {
    pub fn dropped(&self) -> usize {
        self.unmatched_chapter + self.missing_value
    }
}

/// Records retained for analysis, with the attributes they carry
#[derive(Debug, Clone)]
pub struct AnalysisTable {
    pub attributes: Vec<Attribute>,
    pub records: Vec<AnalysisRecord>,
    pub chapter_sizes: BTreeMap<String, usize>,
}

/// Classify ballots, attach chapter sizes and join chapter metadata.
///
/// Chapter sizes are computed over every ballot before excluded ballots are
/// dropped. Ballots that cannot be joined, or whose metadata lacks a value for
/// one of the requested attributes, are dropped and counted in the report.
pub fn build_analysis_table(
    ballots: &[BallotRecord],
    classifier: &SlateClassifier,
    metadata: Option<&[ChapterMetadata]>,
    attributes: &[Attribute],
) -> Result<(AnalysisTable, BuildReport)> {
    if let Some(attribute) = attributes.iter().find(|a| a.is_metadata()) {
        if metadata.is_none() {
            anyhow::bail!(
                "Attribute '{}' requires a chapter metadata file. Use -m/--metadata to specify one.",
                attribute
            );
        }
    }

    let sizes = chapter_sizes(ballots);

    let mut report = BuildReport {
        total_ballots: ballots.len(),
        chapters: sizes.len(),
        ..Default::default()
    };

    let lookup: Option<HashMap<&str, &ChapterMetadata>> = metadata.map(|rows| {
        let mut map = HashMap::with_capacity(rows.len());
        for row in rows {
            if map.contains_key(row.chapter.as_str()) {
                report.duplicate_metadata += 1;
            } else {
                map.insert(row.chapter.as_str(), row);
            }
        }
        map
    });

    let mut records = Vec::with_capacity(ballots.len());

    'ballots: for ballot in ballots {
        let category = classifier.classify(
            ballot.slate.as_deref().unwrap_or_default(),
            ballot.second_choice.as_deref(),
        );
        if category.is_excluded() {
            report.excluded += 1;
            continue;
        }

        let chapter_size = sizes.get(&ballot.chapter).copied().unwrap_or(0);

        let meta = match &lookup {
            Some(map) => match map.get(ballot.chapter.as_str()) {
                Some(row) => Some(*row),
                None => {
                    report.unmatched_chapter += 1;
                    continue;
                }
            },
            None => None,
        };

        let mut values = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            let value = match attribute {
                Attribute::ChapterSize => Some(chapter_size as f64),
                other => meta.and_then(|m| m.value(*other)),
            };
            match value {
                Some(v) => values.push(v),
                None => {
                    report.missing_value += 1;
                    continue 'ballots;
                }
            }
        }

        match category {
            Category::Left => report.left += 1,
            Category::Moderate => report.moderate += 1,
            Category::Excluded => {}
        }

        records.push(AnalysisRecord {
            voter: ballot.voter.clone(),
            chapter: ballot.chapter.clone(),
            slate: ballot.slate.clone().unwrap_or_default(),
            category,
            chapter_size,
            values,
        });
    }

    report.retained = records.len();

    Ok((
        AnalysisTable {
            attributes: attributes.to_vec(),
            records,
            chapter_sizes: sizes,
        },
        report,
    ))
}

impl AnalysisTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn index_of(&self, attribute: Attribute) -> Option<usize> {
        self.attributes.iter().position(|a| *a == attribute)
    }

    /// All values of one attribute, in record order
    pub fn values(&self, attribute: Attribute) -> Option<Vec<f64>> {
        let idx = self.index_of(attribute)?;
        Some(self.records.iter().map(|r| r.values[idx]).collect())
    }

    /// Values of one attribute for a single category
    pub fn values_for(&self, attribute: Attribute, category: Category) -> Option<Vec<f64>> {
        let idx = self.index_of(attribute)?;
        Some(
            self.records
                .iter()
                .filter(|r| r.category == category)
                .map(|r| r.values[idx])
                .collect(),
        )
    }

    pub fn categories(&self) -> Vec<Category> {
        self.records.iter().map(|r| r.category).collect()
    }

    /// Predictor values paired with the binary target, skipping unmapped rows
    pub fn binary_target(
        &self,
        attribute: Attribute,
        mapping: &TargetMapping,
    ) -> Option<(Vec<f64>, Vec<u8>)> {
        let values = self.values(attribute)?;
        let mask = create_target_mask(&self.categories(), mapping);

        let (x, y) = values
            .into_iter()
            .zip(mask)
            .filter_map(|(v, label)| label.map(|l| (v, l)))
            .unzip();
        Some((x, y))
    }

    /// Materialize the table as a DataFrame for export
    pub fn to_dataframe(&self, mapping: &TargetMapping) -> PolarsResult<DataFrame> {
        let voters: Vec<Option<String>> = self.records.iter().map(|r| r.voter.clone()).collect();
        let chapters: Vec<String> = self.records.iter().map(|r| r.chapter.clone()).collect();
        let slates: Vec<String> = self.records.iter().map(|r| r.slate.clone()).collect();
        let categories: Vec<String> = self
            .records
            .iter()
            .map(|r| r.category.to_string())
            .collect();
        let binary: Vec<Option<i32>> = create_target_mask(&self.categories(), mapping)
            .into_iter()
            .map(|v| v.map(i32::from))
            .collect();

        let mut columns: Vec<Column> = vec![
            Column::new("voter".into(), voters),
            Column::new("chapter".into(), chapters),
            Column::new("slate".into(), slates),
            Column::new("slate_category".into(), categories),
            Column::new("slate_binary".into(), binary),
        ];

        for (idx, attribute) in self.attributes.iter().enumerate() {
            let values: Vec<f64> = self.records.iter().map(|r| r.values[idx]).collect();
            columns.push(Column::new(attribute.key().into(), values));
        }

        DataFrame::new(columns)
    }
}
