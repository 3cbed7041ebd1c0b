//! SVG chart rendering
//!
//! One chart shape covers the dashboard: labelled vertical bars, used for
//! time per activity, workload per clinician and the length-of-stay
//! distribution.

use std::path::Path;

use plotters::prelude::*;
use plotters_svg::SVGBackend;

use crate::error::{EhrBoardError, Result};

/// Render a labelled bar chart to an SVG file
pub fn bar_chart_svg(
    path: &Path,
    title: &str,
    y_label: &str,
    data: &[(String, f64)],
) -> Result<()> {
    if data.is_empty() {
        return Err(EhrBoardError::EmptyTable(format!(
            "nothing to chart for '{title}'"
        )));
    }
    let path_str = path
        .to_str()
        .ok_or_else(|| EhrBoardError::ChartError(format!("non-UTF8 path: {}", path.display())))?;

    let y_max = data
        .iter()
        .map(|(_, value)| *value)
        .fold(0.0f64, f64::max)
        .max(1.0)
        * 1.1;

    let root = SVGBackend::new(path_str, (900, 540)).into_drawing_area();
    root.fill(&WHITE).map_err(to_chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(80)
        .y_label_area_size(60)
        .build_cartesian_2d((0..data.len()).into_segmented(), 0.0..y_max)
        .map_err(to_chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc(y_label)
        .x_label_formatter(&|coord| match coord {
            SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) => data
                .get(*idx)
                .map(|(label, _)| label.clone())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .x_labels(data.len().min(20))
        .draw()
        .map_err(to_chart_error)?;

    chart
        .draw_series(data.iter().enumerate().map(|(idx, (_, value))| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(idx), 0.0),
                    (SegmentValue::Exact(idx + 1), *value),
                ],
                BLUE.mix(0.6).filled(),
            )
        }))
        .map_err(to_chart_error)?;

    root.present().map_err(to_chart_error)?;
    log::info!("Wrote chart '{title}' to {}", path.display());
    Ok(())
}

fn to_chart_error<E: std::fmt::Display>(error: E) -> EhrBoardError {
    EhrBoardError::ChartError(error.to_string())
}
