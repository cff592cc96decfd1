//! Column-name mapping for the ballots and chapter metadata files
//!
//! The exports this tool reads come in two observed layouts; both are
//! available as presets and every column can be overridden individually.

use serde::Serialize;

/// Known input file layouts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Layout {
    /// Raw vote export (`DSA Chapter`, `Voter`, `Slate`, `2th`) with a
    /// relative chapter size sheet keyed by `Chapter`
    #[default]
    Legacy,
    /// Cleaned export (`chapter`, `voter`, `slate`, `second_choice`) with a
    /// chapter info sheet keyed by `chapter`
    Updated,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Legacy => write!(f, "legacy"),
            Layout::Updated => write!(f, "updated"),
        }
    }
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(Layout::Legacy),
            "updated" => Ok(Layout::Updated),
            _ => Err(format!("Unknown layout: '{}'. Use 'legacy' or 'updated'.", s)),
        }
    }
}

/// Columns read from the ballots file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BallotColumns {
    pub chapter: String,
    pub voter: String,
    pub slate: String,
    pub second_choice: String,
}

/// Columns read from the chapter metadata file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataColumns {
    pub chapter: String,
    pub population_share: String,
    pub urbanization: String,
    pub median_income: String,
    pub population: String,
}

/// Full column mapping for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub ballots: BallotColumns,
    pub metadata: MetadataColumns,
}

impl ColumnMapping {
    pub fn for_layout(layout: Layout) -> Self {
        let metadata_common = |chapter: &str| MetadataColumns {
            chapter: chapter.to_string(),
            population_share: "% population (high)".to_string(),
            urbanization: "urbanization_percentage".to_string(),
            median_income: "median_income".to_string(),
            population: "population".to_string(),
        };

        match layout {
            Layout::Legacy => Self {
                ballots: BallotColumns {
                    chapter: "DSA Chapter".to_string(),
                    voter: "Voter".to_string(),
                    slate: "Slate".to_string(),
                    second_choice: "2th".to_string(),
                },
                metadata: metadata_common("Chapter"),
            },
            Layout::Updated => Self {
                ballots: BallotColumns {
                    chapter: "chapter".to_string(),
                    voter: "voter".to_string(),
                    slate: "slate".to_string(),
                    second_choice: "second_choice".to_string(),
                },
                metadata: metadata_common("chapter"),
            },
        }
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::for_layout(Layout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_presets() {
        let legacy = ColumnMapping::for_layout(Layout::Legacy);
        assert_eq!(legacy.ballots.chapter, "DSA Chapter");
        assert_eq!(legacy.ballots.second_choice, "2th");
        assert_eq!(legacy.metadata.chapter, "Chapter");

        let updated = ColumnMapping::for_layout(Layout::Updated);
        assert_eq!(updated.ballots.slate, "slate");
        assert_eq!(updated.ballots.second_choice, "second_choice");
        assert_eq!(updated.metadata.chapter, "chapter");
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("Updated".parse::<Layout>().unwrap(), Layout::Updated);
        assert!("modern".parse::<Layout>().is_err());
    }
}
