//! # Occupancy Dashboard
//!
//! Client for an occupancy-monitoring backend: a live counter with a status
//! badge and trend chart, plus a day-by-day history of hourly averages.
//!
//! ## Modules
//!
//! - [`model`]: Wire types, chart series and count classification
//! - [`source`]: The backend seam and its HTTP implementation
//! - [`chart`]: Chart renderers and the single-owner chart slot
//! - [`controller`]: Live and history view controllers
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use occupancy_dashboard::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(HttpDataSource::new(HttpSourceConfig::default())?);
//!     let renderer = TerminalChartRenderer::new(std::io::stdout(), ChartStyle::default());
//!
//!     let live = Arc::new(LiveController::new(
//!         source,
//!         renderer,
//!         Arc::new(SystemClock),
//!         LiveSettings::default(),
//!     ));
//!
//!     live.refresh_once().await;
//!     println!("{} {:?}", live.panel().badge(), live.panel().count);
//!
//!     Ok(())
//! }
//! ```

pub mod chart;
pub mod clock;
pub mod config;
pub mod controller;
pub mod model;
pub mod source;

#[cfg(test)]
mod testing;

// Re-export top-level types for convenience
pub use model::{
    ChartSeries, HistoryPayload, HourlyAverage, OccupancyReading, StatusLevel, Thresholds, Tone,
};

pub use source::{DataSource, HttpDataSource, HttpSourceConfig, SourceError, SourceResult};

pub use chart::{
    ChartRenderer, ChartSlot, ChartStyle, RenderError, SvgChart, SvgChartRenderer,
    TerminalChartRenderer, TextChart,
};

pub use controller::{
    Caption, CaptionTone, HistoryController, HistoryPanel, LiveController, LivePanel,
    LiveSettings, PollHandle, RefreshOutcome,
};

pub use clock::{Clock, FixedClock, SystemClock};

pub use config::{Config, ConfigError, LoggingConfig};
