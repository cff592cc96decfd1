//! PNG rendering of the analysis results
//!
//! Every chart is drawn with the plotters bitmap backend at a fixed
//! 1000x600 resolution and written to a fixed file name inside the output
//! directory.

pub mod boxplot;
pub mod curve;
pub mod distribution;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use boxplot::{box_summary, create_category_boxplot, BoxSummary};
pub use curve::create_probability_curve_plot;
pub use distribution::{create_cdf_plot, create_pdf_plot};

use crate::pipeline::Attribute;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save plot to file: {0}")]
    FileSave(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = core::result::Result<T, PlotError>;

pub(crate) const PLOT_SIZE: (u32, u32) = (1000, 600);
pub(crate) const CAPTION_FONT: (&str, u32) = ("sans-serif", 30);
pub(crate) const LABEL_FONT: (&str, u32) = ("sans-serif", 20);

pub const PDF_FILE_NAME: &str = "pdf_chapter_sizes.png";
pub const CDF_FILE_NAME: &str = "cdf_chapter_sizes.png";

/// `<attribute>_by_slate_category.png`
pub fn boxplot_path(output_dir: &Path, attribute: Attribute) -> PathBuf {
    output_dir.join(format!("{}_by_slate_category.png", attribute.key()))
}

/// `probability_left_by_<attribute>.png`
pub fn curve_path(output_dir: &Path, attribute: Attribute) -> PathBuf {
    output_dir.join(format!("probability_left_by_{}.png", attribute.key()))
}

/// Min and max of the values, padded by `fraction` of the span. A zero span
/// is widened to a unit interval around the value.
pub(crate) fn padded_range<I>(values: I, fraction: f64) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return None;
    }
    if max - min <= f64::EPSILON * max.abs().max(1.0) {
        return Some((min - 0.5, max + 0.5));
    }
    let pad = (max - min) * fraction;
    Some((min - pad, max + pad))
}

/// Axis tick formatting for an attribute's values
pub(crate) fn format_tick(attribute: Attribute, value: f64) -> String {
    if attribute.is_percentage() {
        format!("{:.1}%", value * 100.0)
    } else if value.abs() >= 1000.0 {
        format!("{:.0}", value)
    } else if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}
