//! Numeric chapter attributes compared between slate categories

use serde::Serialize;

use super::columns::MetadataColumns;

/// A numeric attribute attached to every analyzed ballot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Ballots cast in the voter's chapter (derived, always available)
    ChapterSize,
    /// Chapter membership relative to local population, as a 0-1 fraction
    PopulationShare,
    /// Urbanization percentage of the chapter's area
    Urbanization,
    /// Median household income of the chapter's area
    MedianIncome,
    /// Raw population of the chapter's area
    Population,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::ChapterSize,
        Attribute::PopulationShare,
        Attribute::Urbanization,
        Attribute::MedianIncome,
        Attribute::Population,
    ];

    /// Snake-case key used on the command line, in exports and in file names
    pub fn key(self) -> &'static str {
        match self {
            Attribute::ChapterSize => "chapter_size",
            Attribute::PopulationShare => "population_share",
            Attribute::Urbanization => "urbanization",
            Attribute::MedianIncome => "median_income",
            Attribute::Population => "population",
        }
    }

    /// Human readable label for tables and plot axes
    pub fn label(self) -> &'static str {
        match self {
            Attribute::ChapterSize => "Chapter Size",
            Attribute::PopulationShare => "Chapter % of Population",
            Attribute::Urbanization => "Urbanization Percentage",
            Attribute::MedianIncome => "Median Income",
            Attribute::Population => "Population",
        }
    }

    /// Whether the value comes from the chapter metadata file
    pub fn is_metadata(self) -> bool {
        self != Attribute::ChapterSize
    }

    /// Values are percentages that must be scaled to a 0-1 fraction
    pub fn is_percentage(self) -> bool {
        self == Attribute::PopulationShare
    }

    /// Metadata column holding this attribute, if any
    pub fn metadata_column(self, columns: &MetadataColumns) -> Option<&str> {
        match self {
            Attribute::ChapterSize => None,
            Attribute::PopulationShare => Some(&columns.population_share),
            Attribute::Urbanization => Some(&columns.urbanization),
            Attribute::MedianIncome => Some(&columns.median_income),
            Attribute::Population => Some(&columns.population),
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Attribute::ALL
            .into_iter()
            .find(|a| a.key() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Attribute::ALL.iter().map(|a| a.key()).collect();
                format!("Unknown attribute: '{}'. Use one of: {}", s, known.join(", "))
            })
    }
}
