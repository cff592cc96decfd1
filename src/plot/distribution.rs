//! Chapter-size distribution charts

use std::path::Path;

use plotters::prelude::*;

use super::{padded_range, PlotError, Result, CAPTION_FONT, LABEL_FONT, PLOT_SIZE};
use crate::pipeline::density::{
    ecdf, histogram_density, smoothed_cdf, Bandwidth, Kde, DENSITY_POINTS, SMOOTHED_CDF_FACTOR,
    SMOOTHED_CDF_POINTS,
};

fn validate(sizes: &[f64]) -> Result<()> {
    if sizes.is_empty() {
        return Err(PlotError::InvalidData(
            "Chapter sizes cannot be empty".to_string(),
        ));
    }
    if sizes.iter().any(|v| !v.is_finite()) {
        return Err(PlotError::InvalidData(
            "Chapter sizes must be finite".to_string(),
        ));
    }
    Ok(())
}

/// Density histogram of chapter sizes with a Gaussian KDE line
pub fn create_pdf_plot(sizes: &[f64], output_path: &Path) -> Result<()> {
    validate(sizes)?;

    let bins = histogram_density(sizes);
    let kde_line = Kde::new(sizes, Bandwidth::Scott).map(|kde| {
        let start = bins.first().map(|b| b.start).unwrap_or(0.0);
        let end = bins.last().map(|b| b.end).unwrap_or(1.0);
        kde.curve(start, end, DENSITY_POINTS)
    });

    let (x_min, x_max) = padded_range(
        bins.iter().flat_map(|b| [b.start, b.end]),
        0.02,
    )
    .ok_or_else(|| PlotError::InvalidData("No histogram bins".to_string()))?;

    let y_top = bins
        .iter()
        .map(|b| b.density)
        .chain(kde_line.iter().flatten().map(|(_, d)| *d))
        .fold(0.0, f64::max)
        * 1.1;

    let root = BitMapBackend::new(output_path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Probability Density Function of Chapter Sizes", CAPTION_FONT)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, 0.0..y_top)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Chapter Size")
        .y_desc("Density")
        .y_label_formatter(&|y| format!("{:.4}", y))
        .label_style(LABEL_FONT)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let fill = RGBColor(31, 119, 180);
    chart
        .draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.density)], fill.mix(0.5).filled())
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    if let Some(line) = kde_line {
        chart
            .draw_series(LineSeries::new(line, fill.stroke_width(2)))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Empirical CDF points with the smoothed KDE CDF
pub fn create_cdf_plot(sizes: &[f64], output_path: &Path) -> Result<()> {
    validate(sizes)?;

    let points = ecdf(sizes);
    let smoothed = smoothed_cdf(sizes, SMOOTHED_CDF_FACTOR, SMOOTHED_CDF_POINTS);

    let (x_min, x_max) = padded_range(points.iter().map(|(x, _)| *x), 0.02)
        .ok_or_else(|| PlotError::InvalidData("No chapter sizes".to_string()))?;

    let root = BitMapBackend::new(output_path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Cumulative Distribution Function of Chapter Sizes", CAPTION_FONT)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, 0.0..1.05)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Chapter Size")
        .y_desc("CDF")
        .y_label_formatter(&|y| format!("{:.1}", y))
        .label_style(LABEL_FONT)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let empirical = RGBColor(255, 127, 14);
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, empirical.filled())),
        )
        .map_err(|e| PlotError::Drawing(e.to_string()))?
        .label("Empirical CDF")
        .legend(move |(x, y)| Circle::new((x + 10, y), 3, empirical.filled()));

    if let Some(line) = smoothed {
        chart
            .draw_series(LineSeries::new(line, BLUE.stroke_width(2)))
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label("Smoothed CDF (Adjusted KDE)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .label_font(LABEL_FONT)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}
