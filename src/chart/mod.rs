//! Chart rendering
//!
//! Controllers hand a [`ChartSeries`] to a [`ChartRenderer`] through a
//! [`ChartSlot`]. The slot owns at most one live chart and always tears the
//! previous chart down before building the next one, so a render is a full
//! replacement and never an incremental patch.
//!
//! Two renderers ship with the crate:
//! - [`SvgChartRenderer`]: draws a `plotters` line chart into an SVG file
//! - [`TerminalChartRenderer`]: draws a `ratatui` sparkline to any writer

mod svg;
mod terminal;

pub use svg::{svg_document, SvgChart, SvgChartRenderer};
pub use terminal::{sparkline_rows, TerminalChartRenderer, TextChart, SPARKLINE_ROWS};

use thiserror::Error;

use crate::model::ChartSeries;

/// Errors raised while building or tearing down a chart
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid series: {0}")]
    Invalid(String),

    #[error("Drawing failed: {0}")]
    Draw(String),
}

/// Something that can turn a series into a visible chart
pub trait ChartRenderer: Send {
    /// Handle to a rendered chart
    type Chart: Send;

    /// Build a new chart for `series`
    fn create(&mut self, series: &ChartSeries) -> Result<Self::Chart, RenderError>;

    /// Release a chart previously returned by `create`
    fn destroy(&mut self, chart: Self::Chart) -> Result<(), RenderError>;
}

/// Visual parameters shared by the renderers
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    /// Legend/tooltip name of the single dataset
    pub dataset_label: String,
    /// Line and point colour
    pub stroke: String,
    pub point_radius: f64,
}

impl ChartStyle {
    /// Rolling trend chart on the live view
    pub fn live(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            dataset_label: "Average vehicles".to_string(),
            stroke: "#38bdf8".to_string(),
            point_radius: 3.0,
        }
    }

    /// Day chart on the history view
    pub fn history(width: u32, height: u32) -> Self {
        Self {
            point_radius: 4.0,
            ..Self::live(width, height)
        }
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::live(800, 400)
    }
}

/// Single-owner holder for the chart a controller currently displays
pub struct ChartSlot<R: ChartRenderer> {
    renderer: R,
    current: Option<R::Chart>,
    renders: u64,
}

impl<R: ChartRenderer> ChartSlot<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            current: None,
            renders: 0,
        }
    }

    /// Replace whatever is displayed with a chart of `series`
    ///
    /// The previous chart is released first. If building the new chart fails
    /// the slot is left empty.
    pub fn replace(&mut self, series: &ChartSeries) -> Result<&R::Chart, RenderError> {
        self.release();

        let chart = self.renderer.create(series)?;
        self.renders += 1;
        tracing::debug!(points = series.len(), renders = self.renders, "Chart rendered");

        Ok(self.current.insert(chart))
    }

    /// Tear down the displayed chart, if any
    pub fn release(&mut self) {
        if let Some(previous) = self.current.take() {
            if let Err(e) = self.renderer.destroy(previous) {
                tracing::warn!("Failed to release chart: {}", e);
            }
        }
    }

    /// Chart currently on display
    pub fn current(&self) -> Option<&R::Chart> {
        self.current.as_ref()
    }

    /// Number of charts built so far
    pub fn render_count(&self) -> u64 {
        self.renders
    }
}

impl<R: ChartRenderer> Drop for ChartSlot<R> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingRenderer, RenderEvent};

    fn series(values: &[f64]) -> ChartSeries {
        ChartSeries {
            labels: values.iter().enumerate().map(|(i, _)| format!("{:02}:00", i)).collect(),
            values: values.to_vec(),
        }
    }

    #[test]
    fn test_replace_destroys_before_create() {
        let renderer = RecordingRenderer::default();
        let events = renderer.events();
        let mut slot = ChartSlot::new(renderer);

        slot.replace(&series(&[1.0, 2.0])).unwrap();
        slot.replace(&series(&[3.0])).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                RenderEvent::Created { id: 1, points: 2 },
                RenderEvent::Destroyed { id: 1 },
                RenderEvent::Created { id: 2, points: 1 },
            ]
        );
        assert_eq!(slot.current().map(|chart| chart.id), Some(2));
        assert_eq!(slot.render_count(), 2);
    }

    #[test]
    fn test_failed_create_leaves_slot_empty() {
        let renderer = RecordingRenderer::default();
        let fail = renderer.fail_next();
        let mut slot = ChartSlot::new(renderer);

        slot.replace(&series(&[1.0])).unwrap();
        fail.store(true, std::sync::atomic::Ordering::SeqCst);

        assert!(slot.replace(&series(&[2.0])).is_err());
        assert!(slot.current().is_none());
        assert_eq!(slot.render_count(), 1);
    }

    #[test]
    fn test_drop_releases_chart() {
        let renderer = RecordingRenderer::default();
        let events = renderer.events();

        {
            let mut slot = ChartSlot::new(renderer);
            slot.replace(&ChartSeries::empty()).unwrap();
        }

        assert_eq!(
            events.lock().unwrap().last(),
            Some(&RenderEvent::Destroyed { id: 1 })
        );
    }

    #[test]
    fn test_history_style_uses_larger_points() {
        let live = ChartStyle::live(640, 320);
        let history = ChartStyle::history(640, 320);

        assert_eq!(live.point_radius, 3.0);
        assert_eq!(history.point_radius, 4.0);
        assert_eq!(history.stroke, live.stroke);
        assert_eq!(history.width, 640);
    }
}
