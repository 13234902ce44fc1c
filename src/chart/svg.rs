//! SVG line chart
//!
//! Draws a single-dataset line chart with `plotters`: translucent area fill,
//! zero-based value axis and the hour labels on the category axis.

use plotters::prelude::*;
use std::path::PathBuf;

use super::{ChartRenderer, ChartStyle, RenderError};
use crate::model::ChartSeries;

const Y_LABELS: usize = 5;
const MAX_X_LABELS: usize = 12;

const BACKGROUND: RGBColor = RGBColor(15, 23, 42);
const GRID_COLOR: RGBAColor = RGBAColor(255, 255, 255, 0.08);
const TICK_COLOR: RGBColor = RGBColor(148, 163, 184);
const FILL_OPACITY: f64 = 0.25;

/// A chart written to disk
#[derive(Debug, Clone)]
pub struct SvgChart {
    pub path: PathBuf,
    pub points: usize,
    pub document: String,
}

/// Writes each chart to a fixed path
///
/// The document is written next to the target and renamed over it, so readers
/// of the file never see a half-written chart.
pub struct SvgChartRenderer {
    path: PathBuf,
    style: ChartStyle,
}

impl SvgChartRenderer {
    pub fn new(path: impl Into<PathBuf>, style: ChartStyle) -> Self {
        Self {
            path: path.into(),
            style,
        }
    }
}

impl ChartRenderer for SvgChartRenderer {
    type Chart = SvgChart;

    fn create(&mut self, series: &ChartSeries) -> Result<SvgChart, RenderError> {
        let document = svg_document(series, &self.style)?;

        let staging = self.path.with_extension("svg.tmp");
        std::fs::write(&staging, &document)?;
        std::fs::rename(&staging, &self.path)?;

        Ok(SvgChart {
            path: self.path.clone(),
            points: series.len(),
            document,
        })
    }

    fn destroy(&mut self, chart: SvgChart) -> Result<(), RenderError> {
        // The next create overwrites the file in one rename
        tracing::trace!("Releasing chart at {:?}", chart.path);
        Ok(())
    }
}

/// Parse a `#rrggbb` colour
fn parse_hex_color(hex: &str) -> Result<RGBColor, RenderError> {
    let digits = hex.trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
    };

    match (digits.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => Ok(RGBColor(r, g, b)),
        _ => Err(RenderError::Invalid(format!("unsupported colour {:?}", hex))),
    }
}

fn draw_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(err.to_string())
}

/// Build the SVG document for `series`
pub fn svg_document(series: &ChartSeries, style: &ChartStyle) -> Result<String, RenderError> {
    if series.labels.len() != series.values.len() {
        return Err(RenderError::Invalid(format!(
            "{} labels for {} values",
            series.labels.len(),
            series.values.len()
        )));
    }
    if let Some(bad) = series.values.iter().find(|v| !v.is_finite()) {
        return Err(RenderError::Invalid(format!("non-finite value {}", bad)));
    }
    let stroke = parse_hex_color(&style.stroke)?;

    let mut document = String::new();
    {
        let root = SVGBackend::with_string(&mut document, (style.width, style.height))
            .into_drawing_area();
        root.fill(&BACKGROUND).map_err(draw_error)?;

        // One category per hour bucket; a lone point still gets a non-empty axis
        let last = series.len().saturating_sub(1).max(1);
        let y_max = (series.max_value() * 1.1).max(1.0);

        let mut chart = ChartBuilder::on(&root)
            .caption(
                &style.dataset_label,
                ("sans-serif", 16).into_font().color(&TICK_COLOR),
            )
            .margin(12)
            .x_label_area_size(30)
            .y_label_area_size(45)
            .build_cartesian_2d(0..last, 0.0..y_max)
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .bold_line_style(GRID_COLOR)
            .light_line_style(BACKGROUND)
            .x_labels(series.len().clamp(1, MAX_X_LABELS))
            .y_labels(Y_LABELS)
            .axis_style(TICK_COLOR)
            .label_style(("sans-serif", 12).into_font().color(&TICK_COLOR))
            .x_label_formatter(&|i: &usize| series.labels.get(*i).cloned().unwrap_or_default())
            .y_label_formatter(&|v: &f64| format!("{:.0}", v))
            .draw()
            .map_err(draw_error)?;

        if !series.is_empty() {
            let points: Vec<(usize, f64)> = series.values.iter().copied().enumerate().collect();
            let radius = style.point_radius.round().max(1.0) as u32;

            chart
                .draw_series(AreaSeries::new(
                    points.iter().copied(),
                    0.0,
                    stroke.mix(FILL_OPACITY),
                ))
                .map_err(draw_error)?;
            chart
                .draw_series(LineSeries::new(points.iter().copied(), stroke.stroke_width(2)))
                .map_err(draw_error)?;
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&point| Circle::new(point, radius, stroke.filled())),
                )
                .map_err(draw_error)?;
        }

        root.present().map_err(draw_error)?;
    }

    Ok(document)
}
