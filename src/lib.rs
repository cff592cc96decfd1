//! Slate-stats: slate voting analysis library
//!
//! Classifies chapter ballots into left and moderate slates, joins chapter
//! metadata, and compares the two groups with descriptive statistics,
//! two-sample tests, logistic regression and plots.

pub mod cli;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod utils;
