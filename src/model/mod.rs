//! Dashboard data model
//!
//! - **types**: Wire types from the backend and the derived `ChartSeries`
//! - **status**: Count → badge classification

pub mod status;
pub mod types;

pub use status::{StatusLevel, Thresholds, Tone, DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};
pub use types::{
    format_day_heading, format_iso_date, parse_local_timestamp, ChartSeries, HistoryPayload,
    HourlyAverage, OccupancyReading, HOUR_MINUTE_FORMAT,
};
pub(crate) use types::CurrentBody;
