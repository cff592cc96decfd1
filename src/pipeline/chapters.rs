//! Chapter sizes derived from the full ballot set

use std::collections::BTreeMap;

use super::loader::BallotRecord;

/// Count ballots per chapter.
///
/// Must be called on the complete ballot set, before any category filtering,
/// so that a chapter's size reflects its total turnout.
pub fn chapter_sizes(ballots: &[BallotRecord]) -> BTreeMap<String, usize> {
    count_by_chapter(ballots.iter().map(|b| b.chapter.as_str()))
}

/// Count occurrences of each chapter name
pub fn count_by_chapter<'a, I>(chapters: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sizes = BTreeMap::new();
    for chapter in chapters {
        *sizes.entry(chapter.to_string()).or_insert(0) += 1;
    }
    sizes
}

/// Chapter sizes as a flat series, one value per chapter
pub fn size_series(sizes: &BTreeMap<String, usize>) -> Vec<f64> {
    sizes.values().map(|&n| n as f64).collect()
}

/// Largest chapters first, ties broken by name
pub fn largest_chapters(sizes: &BTreeMap<String, usize>, limit: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = sizes.iter().map(|(k, v)| (k.clone(), *v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_count_every_ballot() {
        let ballots = vec![
            BallotRecord::new("A", "North Star", None),
            BallotRecord::new("A", "Write-In", None),
            BallotRecord::new("B", "Aaron Berger", Some("Tom Julstrom")),
        ];

        let sizes = chapter_sizes(&ballots);
        assert_eq!(sizes.get("A"), Some(&2));
        assert_eq!(sizes.get("B"), Some(&1));
        assert_eq!(size_series(&sizes), vec![2.0, 1.0]);
    }

    #[test]
    fn test_largest_chapters_ordering() {
        let mut sizes = BTreeMap::new();
        sizes.insert("B".to_string(), 5);
        sizes.insert("A".to_string(), 5);
        sizes.insert("C".to_string(), 9);

        let top = largest_chapters(&sizes, 2);
        assert_eq!(top, vec![("C".to_string(), 9), ("A".to_string(), 5)]);
    }
}
