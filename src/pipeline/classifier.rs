//! Slate classification of ballots
//!
//! Maps a ballot's first choice (and, for the tie-break candidate, its second
//! choice) to a [`Category`]. The candidate lists are data, loaded from a JSON
//! slate table, so they can change without touching code.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Slate table shipped with the binary
const BUILTIN_SLATES: &str = include_str!("../../config/slates.json");

/// Category a ballot is assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Left,
    Moderate,
    /// Ballot is not part of the two-group comparison (printed as `N/A`)
    Excluded,
}

impl Category {
    /// Categories that take part in the analysis, in reporting order
    pub const ANALYZED: [Category; 2] = [Category::Left, Category::Moderate];

    pub fn is_excluded(self) -> bool {
        self == Category::Excluded
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Left => write!(f, "left"),
            Category::Moderate => write!(f, "moderate"),
            Category::Excluded => write!(f, "N/A"),
        }
    }
}

/// Second-choice rule for the one candidate whose voters split across slates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TieBreak {
    /// First-choice candidate resolved through the second choice
    pub candidate: String,
    /// Second choices that put the ballot in the left group
    #[serde(default)]
    pub left: Vec<String>,
    /// Second choices that put the ballot in the moderate group
    #[serde(default)]
    pub moderate: Vec<String>,
}

/// Candidate-name to category table, as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlateTable {
    #[serde(default)]
    pub moderate: Vec<String>,
    #[serde(default)]
    pub left: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_break: Option<TieBreak>,
}

/// Problems found while turning a [`SlateTable`] into a classifier
#[derive(Debug, Error)]
pub enum SlateTableError {
    #[error("Slate table is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Candidate '{name}' is listed as both left and moderate{context}")]
    Conflict { name: String, context: &'static str },

    #[error("Tie-break candidate '{0}' must not also appear in the first-choice slate lists")]
    TieBreakListed(String),

    #[error("Slate table contains an empty candidate name")]
    EmptyName,
}

impl SlateTable {
    /// Parse a slate table from JSON text
    pub fn from_json(json: &str) -> Result<Self, SlateTableError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The table compiled into the binary
    pub fn builtin() -> Result<Self, SlateTableError> {
        Self::from_json(BUILTIN_SLATES)
    }

    /// Load a slate table from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read slate table: {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Failed to parse slate table: {}", path.display()))
    }
}

/// Pure, total ballot classifier built from a [`SlateTable`]
#[derive(Debug, Clone)]
pub struct SlateClassifier {
    first_choice: HashMap<String, Category>,
    tie_break_candidate: Option<String>,
    second_choice: HashMap<String, Category>,
}

impl SlateClassifier {
    pub fn new(table: &SlateTable) -> Result<Self, SlateTableError> {
        let first_choice = build_lookup(&table.left, &table.moderate, "")?;

        let (tie_break_candidate, second_choice) = match &table.tie_break {
            Some(rule) => {
                let candidate = rule.candidate.trim();
                if candidate.is_empty() {
                    return Err(SlateTableError::EmptyName);
                }
                if first_choice.contains_key(candidate) {
                    return Err(SlateTableError::TieBreakListed(candidate.to_string()));
                }
                let lookup = build_lookup(&rule.left, &rule.moderate, " in the tie-break lists")?;
                (Some(candidate.to_string()), lookup)
            }
            None => (None, HashMap::new()),
        };

        Ok(Self {
            first_choice,
            tie_break_candidate,
            second_choice,
        })
    }

    /// Classifier over the built-in slate table
    pub fn builtin() -> Result<Self, SlateTableError> {
        Self::new(&SlateTable::builtin()?)
    }

    /// Categorize one ballot.
    ///
    /// Names are compared after trimming surrounding whitespace. Anything that
    /// is not configured resolves to [`Category::Excluded`].
    pub fn classify(&self, first_choice: &str, second_choice: Option<&str>) -> Category {
        let first = first_choice.trim();

        if self.tie_break_candidate.as_deref() == Some(first) {
            return second_choice
                .and_then(|s| self.second_choice.get(s.trim()).copied())
                .unwrap_or(Category::Excluded);
        }

        self.first_choice
            .get(first)
            .copied()
            .unwrap_or(Category::Excluded)
    }

    /// Number of first-choice names configured per category
    pub fn slate_counts(&self) -> (usize, usize) {
        let left = self
            .first_choice
            .values()
            .filter(|c| **c == Category::Left)
            .count();
        (left, self.first_choice.len() - left)
    }

    pub fn tie_break_candidate(&self) -> Option<&str> {
        self.tie_break_candidate.as_deref()
    }
}

fn build_lookup(
    left: &[String],
    moderate: &[String],
    context: &'static str,
) -> Result<HashMap<String, Category>, SlateTableError> {
    let mut lookup = HashMap::with_capacity(left.len() + moderate.len());

    for (names, category) in [(left, Category::Left), (moderate, Category::Moderate)] {
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                return Err(SlateTableError::EmptyName);
            }
            if let Some(existing) = lookup.insert(name.to_string(), category) {
                if existing != category {
                    return Err(SlateTableError::Conflict {
                        name: name.to_string(),
                        context,
                    });
                }
            }
        }
    }

    Ok(lookup)
}
