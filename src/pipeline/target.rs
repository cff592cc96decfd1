//! Binary target encoding for the logistic model
//!
//! The model predicts the event category (1) against the non-event category
//! (0). Any other category is left out of the fit.

use serde::{Deserialize, Serialize};

use super::classifier::Category;

/// Mapping configuration for converting categories to binary 0/1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMapping {
    /// Category that maps to 1 (event)
    pub event: Category,
    /// Category that maps to 0 (non-event)
    pub non_event: Category,
}

impl TargetMapping {
    pub fn new(event: Category, non_event: Category) -> Self {
        Self { event, non_event }
    }
}

impl Default for TargetMapping {
    /// `left` = 1, `moderate` = 0
    fn default() -> Self {
        Self::new(Category::Left, Category::Moderate)
    }
}

/// Create a binary target mask based on the mapping
///
/// Returns a Vec<Option<u8>> where:
/// - Some(1) for the event category
/// - Some(0) for the non-event category
/// - None for anything else (ignored by the model)
pub fn create_target_mask(categories: &[Category], mapping: &TargetMapping) -> Vec<Option<u8>> {
    categories
        .iter()
        .map(|c| {
            if *c == mapping.event {
                Some(1)
            } else if *c == mapping.non_event {
                Some(0)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping_is_left_vs_moderate() {
        let mapping = TargetMapping::default();
        assert_eq!(mapping.event, Category::Left);
        assert_eq!(mapping.non_event, Category::Moderate);
    }

    #[test]
    fn test_create_target_mask() {
        let categories = [
            Category::Moderate,
            Category::Left,
            Category::Excluded,
            Category::Left,
        ];
        let mask = create_target_mask(&categories, &TargetMapping::default());
        assert_eq!(mask, vec![Some(0), Some(1), None, Some(1)]);
    }

    #[test]
    fn test_swapped_mapping() {
        let mapping = TargetMapping::new(Category::Moderate, Category::Left);
        let mask = create_target_mask(&[Category::Left, Category::Moderate], &mapping);
        assert_eq!(mask, vec![Some(0), Some(1)]);
    }
}
