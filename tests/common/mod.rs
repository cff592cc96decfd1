//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Write `lines` to `dir/name`, one per line
pub fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

/// Ballot rows shared by both layouts, as (chapter, voter, slate, second choice).
///
/// Chapter sizes: Big 12, Mid 8, Small 5, Tiny 3, plus one row without a
/// chapter. Left voters sit mostly in the larger chapters.
///
/// | chapter | left | moderate | excluded |
/// |---------|------|----------|----------|
/// | Big     | 9    | 3        | 0        |
/// | Mid     | 4    | 4        | 0        |
/// | Small   | 1    | 3        | 1        |
/// | Tiny    | 0    | 3        | 0        |
pub fn ballot_rows() -> Vec<(&'static str, usize, &'static str, &'static str)> {
    let mut rows = Vec::new();
    let mut voter = 1;
    let mut push = |chapter: &'static str, n: usize, slate: &'static str, second: &'static str| {
        for _ in 0..n {
            rows.push((chapter, voter, slate, second));
            voter += 1;
        }
    };

    push("Big", 9, "Red Star", "");
    push("Big", 3, "North Star", "");
    push("Mid", 4, "Bread & Roses", "");
    push("Mid", 3, "Groundwork", "");
    push("Mid", 1, "Aaron Berger", "Cara Tobe");
    push("Small", 1, "Emerge", "");
    push("Small", 3, "Socialist Majority Caucus", "");
    push("Small", 1, "Write-In", "");
    push("Tiny", 3, "Groundwork", "");
    push("", 1, "Red Star", "");

    rows
}

pub const TOTAL_BALLOTS: usize = 28;
pub const EXCLUDED: usize = 1;
pub const LEFT: usize = 14;
pub const MODERATE: usize = 13;

fn ballot_lines(header: &str) -> Vec<String> {
    let mut lines = vec![header.to_string()];
    for (chapter, voter, slate, second) in ballot_rows() {
        lines.push(format!("{},{},{},{}", chapter, voter, slate, second));
    }
    lines
}

/// Ballots file with the legacy headers (`DSA Chapter,Voter,Slate,2th`)
pub fn create_legacy_ballots(dir: &Path) -> PathBuf {
    let lines = ballot_lines("DSA Chapter,Voter,Slate,2th");
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_csv(dir, "ballots.csv", &refs)
}

/// Ballots file with the updated headers (`chapter,voter,slate,second_choice`)
pub fn create_updated_ballots(dir: &Path) -> PathBuf {
    let lines = ballot_lines("chapter,voter,slate,second_choice");
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_csv(dir, "ballots_updated.csv", &refs)
}

/// Chapter metadata with the legacy `Chapter` key column.
///
/// Tiny has no row, Mid is listed twice and Small lacks a median income.
pub fn create_legacy_metadata(dir: &Path) -> PathBuf {
    write_csv(
        dir,
        "metadata.csv",
        &[
            "Chapter,% population (high),urbanization_percentage,median_income,population",
            "Big,1.5%,92.5,71000,2500000",
            "Mid,0.8%,75.0,58000,900000",
            "Mid,9.9%,10.0,10000,100",
            "Small,0.2%,40.0,,150000",
        ],
    )
}

/// Chapter metadata with the updated `chapter` key column
pub fn create_updated_metadata(dir: &Path) -> PathBuf {
    write_csv(
        dir,
        "metadata_updated.csv",
        &[
            "chapter,% population (high),urbanization_percentage,median_income,population",
            "Big,1.5%,92.5,71000,2500000",
            "Mid,0.8%,75.0,58000,900000",
            "Small,0.2%,40.0,52000,150000",
            "Tiny,0.1%,20.0,45000,60000",
        ],
    )
}

/// Temporary directory holding the legacy ballots and metadata files
pub fn legacy_fixture() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let ballots = create_legacy_ballots(temp_dir.path());
    let metadata = create_legacy_metadata(temp_dir.path());
    (temp_dir, ballots, metadata)
}
