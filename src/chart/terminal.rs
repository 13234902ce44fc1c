//! Terminal sparkline
//!
//! Draws the series with `ratatui`'s `Sparkline` into an off-screen buffer and
//! writes the buffer rows out as plain text.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::{Sparkline, Widget};
use std::io::Write;

use super::{ChartRenderer, ChartStyle, RenderError};
use crate::model::ChartSeries;

/// Height of the sparkline in terminal rows
pub const SPARKLINE_ROWS: u16 = 3;

/// Averages are fractional; the widget takes integers
const VALUE_SCALE: f64 = 100.0;

/// Lines written for one chart
#[derive(Debug, Clone, PartialEq)]
pub struct TextChart {
    pub lines: Vec<String>,
}

/// Draws charts as text to a writer (stdout in the binary)
pub struct TerminalChartRenderer<W: Write + Send> {
    out: W,
    style: ChartStyle,
}

impl<W: Write + Send> TerminalChartRenderer<W> {
    pub fn new(out: W, style: ChartStyle) -> Self {
        Self { out, style }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }
}

/// Render `values` one column each, top row first
///
/// Bars grow from zero, not from the series minimum.
pub fn sparkline_rows(values: &[f64], rows: u16) -> Vec<String> {
    if values.is_empty() || rows == 0 {
        return Vec::new();
    }

    let data: Vec<u64> = values
        .iter()
        .map(|v| (v.max(0.0) * VALUE_SCALE).round() as u64)
        .collect();
    let max = data.iter().copied().max().unwrap_or(0).max(1);

    let width = u16::try_from(data.len()).unwrap_or(u16::MAX);
    let area = Rect::new(0, 0, width, rows);
    let mut buffer = Buffer::empty(area);
    Sparkline::default()
        .data(&data)
        .max(max)
        .render(area, &mut buffer);

    buffer
        .content
        .chunks(usize::from(width))
        .map(|row| row.iter().map(|cell| cell.symbol()).collect())
        .collect()
}

impl<W: Write + Send> ChartRenderer for TerminalChartRenderer<W> {
    type Chart = TextChart;

    fn create(&mut self, series: &ChartSeries) -> Result<TextChart, RenderError> {
        let mut lines = vec![format!("── {} ──", self.style.dataset_label)];

        match (series.labels.first(), series.labels.last()) {
            (Some(first), Some(last)) => {
                lines.extend(sparkline_rows(&series.values, SPARKLINE_ROWS));
                lines.push(format!(
                    "{} → {}  ({} points, peak {:.1})",
                    first,
                    last,
                    series.len(),
                    series.max_value()
                ));
            }
            _ => lines.push("(no data)".to_string()),
        }

        for line in &lines {
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()?;

        Ok(TextChart { lines })
    }

    fn destroy(&mut self, _chart: TextChart) -> Result<(), RenderError> {
        // Terminal output scrolls; nothing to take down
        Ok(())
    }
}
