//! Box plot of one attribute per slate category

use std::path::Path;

use plotters::prelude::*;

use super::{format_tick, padded_range, PlotError, Result, CAPTION_FONT, LABEL_FONT, PLOT_SIZE};
use crate::pipeline::stats::quantile_sorted;
use crate::pipeline::{Attribute, Category};

const BOX_HALF_WIDTH: f64 = 0.25;
const WHISKER_HALF_WIDTH: f64 = 0.1;

/// Five-number summary with Tukey whiskers
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 * IQR`
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5 * IQR`
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile_sorted(&sorted, 0.25);
    let median = quantile_sorted(&sorted, 0.5);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;

    let inside: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|v| (low_fence..=high_fence).contains(v))
        .collect();
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| !(low_fence..=high_fence).contains(v))
        .collect();

    Some(BoxSummary {
        q1,
        median,
        q3,
        lower_whisker: inside.first().copied().unwrap_or(q1),
        upper_whisker: inside.last().copied().unwrap_or(q3),
        outliers,
    })
}

fn category_color(category: Category) -> RGBColor {
    match category {
        Category::Left => RGBColor(214, 39, 40),
        Category::Moderate => RGBColor(31, 119, 180),
        Category::Excluded => RGBColor(127, 127, 127),
    }
}

/// Draw `<attribute> by Slate Category` with one box per group
pub fn create_category_boxplot(
    groups: &[(Category, Vec<f64>)],
    attribute: Attribute,
    output_path: &Path,
) -> Result<()> {
    let summaries: Vec<(usize, Category, BoxSummary)> = groups
        .iter()
        .enumerate()
        .filter_map(|(idx, (category, values))| {
            box_summary(values).map(|summary| (idx, *category, summary))
        })
        .collect();

    if summaries.is_empty() {
        return Err(PlotError::InvalidData(format!(
            "No values to plot for {}",
            attribute.label()
        )));
    }

    let (y_min, y_max) = padded_range(
        groups.iter().flat_map(|(_, values)| values.iter().copied()),
        0.05,
    )
    .ok_or_else(|| PlotError::InvalidData("Values must be finite".to_string()))?;

    let labels: Vec<String> = groups.iter().map(|(c, _)| c.to_string()).collect();
    let x_max = groups.len() as f64 - 0.5;

    let root = BitMapBackend::new(output_path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let title = format!("{} by Slate Category", attribute.label());
    let mut chart = ChartBuilder::on(&root)
        .caption(title, CAPTION_FONT)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(-0.5..x_max, y_min..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let x_formatter = |x: &f64| {
        let nearest = x.round();
        if (x - nearest).abs() < 1e-6 && nearest >= 0.0 {
            labels.get(nearest as usize).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };
    let y_formatter = |y: &f64| format_tick(attribute, *y);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len() * 2 + 1)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .x_desc("Slate Category")
        .y_desc(attribute.label())
        .label_style(LABEL_FONT)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for (idx, category, summary) in &summaries {
        let center = *idx as f64;
        let color = category_color(*category);
        let outline = BLACK.stroke_width(2);

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [
                    (center - BOX_HALF_WIDTH, summary.q1),
                    (center + BOX_HALF_WIDTH, summary.q3),
                ],
                color.mix(0.5).filled(),
            )))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [
                    (center - BOX_HALF_WIDTH, summary.q1),
                    (center + BOX_HALF_WIDTH, summary.q3),
                ],
                outline,
            )))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        let segments = vec![
            // Median
            vec![
                (center - BOX_HALF_WIDTH, summary.median),
                (center + BOX_HALF_WIDTH, summary.median),
            ],
            // Whisker stems
            vec![(center, summary.q3), (center, summary.upper_whisker)],
            vec![(center, summary.q1), (center, summary.lower_whisker)],
            // Whisker caps
            vec![
                (center - WHISKER_HALF_WIDTH, summary.upper_whisker),
                (center + WHISKER_HALF_WIDTH, summary.upper_whisker),
            ],
            vec![
                (center - WHISKER_HALF_WIDTH, summary.lower_whisker),
                (center + WHISKER_HALF_WIDTH, summary.lower_whisker),
            ],
        ];
        chart
            .draw_series(
                segments
                    .into_iter()
                    .map(|points| PathElement::new(points, outline)),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        chart
            .draw_series(
                summary
                    .outliers
                    .iter()
                    .map(|&v| Circle::new((center, v), 4, BLACK.stroke_width(1))),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}
