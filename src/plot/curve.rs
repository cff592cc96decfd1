//! Predicted probability of a left ballot against one attribute

use std::path::Path;

use plotters::prelude::*;

use super::{format_tick, padded_range, PlotError, Result, CAPTION_FONT, LABEL_FONT, PLOT_SIZE};
use crate::pipeline::logistic::CurvePoint;
use crate::pipeline::Attribute;

/// Draw the sigmoid curve with the observed 0/1 outcomes underneath
pub fn create_probability_curve_plot(
    curve: &[CurvePoint],
    observations: &[(f64, u8)],
    attribute: Attribute,
    output_path: &Path,
) -> Result<()> {
    if curve.len() < 2 {
        return Err(PlotError::InvalidData(
            "Probability curve needs at least two points".to_string(),
        ));
    }
    if curve
        .iter()
        .any(|p| !(0.0..=1.0).contains(&p.probability) || !p.x.is_finite())
    {
        return Err(PlotError::InvalidData(
            "Probabilities must lie in [0, 1]".to_string(),
        ));
    }

    let (x_min, x_max) = padded_range(curve.iter().map(|p| p.x), 0.02)
        .ok_or_else(|| PlotError::InvalidData("Curve has no finite points".to_string()))?;

    let root = BitMapBackend::new(output_path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let title = format!("Probability of Being Left by {}", attribute.label());
    let mut chart = ChartBuilder::on(&root)
        .caption(title, CAPTION_FONT)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, -0.05..1.05)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let x_formatter = |x: &f64| format_tick(attribute, *x);

    chart
        .configure_mesh()
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&|y| format!("{:.1}", y))
        .x_desc(attribute.label())
        .y_desc("Probability of Being Left")
        .label_style(LABEL_FONT)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(
            observations
                .iter()
                .map(|&(x, y)| Circle::new((x, f64::from(y)), 3, BLACK.mix(0.25).filled())),
        )
        .map_err(|e| PlotError::Drawing(e.to_string()))?
        .label("Observed")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, BLACK.mix(0.5).filled()));

    chart
        .draw_series(LineSeries::new(
            curve.iter().map(|p| (p.x, p.probability)),
            BLUE.stroke_width(3),
        ))
        .map_err(|e| PlotError::Drawing(e.to_string()))?
        .label("Sigmoid Curve")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(3)));

    chart
        .configure_series_labels()
        .label_font(LABEL_FONT)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.png");

        let single = vec![CurvePoint {
            x: 1.0,
            probability: 0.5,
        }];
        let result = create_probability_curve_plot(&single, &[], Attribute::ChapterSize, &path);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));

        let invalid = vec![
            CurvePoint {
                x: 1.0,
                probability: 0.5,
            },
            CurvePoint {
                x: 2.0,
                probability: 1.5,
            },
        ];
        let result = create_probability_curve_plot(&invalid, &[], Attribute::ChapterSize, &path);
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
        assert!(!path.exists());
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_curve_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probability_left_by_chapter_size.png");
        let curve: Vec<CurvePoint> = (0..300)
            .map(|i| {
                let x = i as f64 / 10.0;
                CurvePoint {
                    x,
                    probability: 1.0 / (1.0 + (x - 15.0).exp()),
                }
            })
            .collect();
        let observations = vec![(1.0, 1), (5.0, 1), (20.0, 0), (28.0, 0)];

        create_probability_curve_plot(&curve, &observations, Attribute::ChapterSize, &path)
            .unwrap();
        assert!(path.exists());
    }
}
