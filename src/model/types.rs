//! Core data types for the occupancy dashboard
//!
//! This module defines the values that flow from the backend to the charts:
//! - `OccupancyReading`: A live snapshot of the occupancy count
//! - `HourlyAverage`: One aggregated hour bucket
//! - `HistoryPayload`: The two shapes `/stats/history` can answer with
//! - `ChartSeries`: Chart-ready labels and values derived from hour buckets

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Display format for hour labels and the "last updated" label
pub const HOUR_MINUTE_FORMAT: &str = "%H:%M";

/// Wire format of the `date` query parameter
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Long, human readable day heading (e.g. "Monday, 15 January 2024")
pub const DAY_HEADING_FORMAT: &str = "%A, %-d %B %Y";

/// A live occupancy snapshot from `/current`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OccupancyReading {
    /// Number of tracked entities currently present
    pub count: u64,
}

/// Raw `/current` body. The backend answers `{"count": null}` or `{}` before
/// the first detection has been stored; both read as zero.
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentBody {
    #[serde(default)]
    count: Option<u64>,
}

impl From<CurrentBody> for OccupancyReading {
    fn from(body: CurrentBody) -> Self {
        Self {
            count: body.count.unwrap_or(0),
        }
    }
}

/// One hour of aggregated occupancy
///
/// `hour_bucket` holds local wall-clock time. Timestamps that arrive with an
/// offset are converted to the local zone while parsing; naive timestamps are
/// taken as already local.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyAverage {
    #[serde(deserialize_with = "deserialize_local_timestamp")]
    pub hour_bucket: NaiveDateTime,
    pub avg_count: f64,
}

impl HourlyAverage {
    pub fn new(hour_bucket: NaiveDateTime, avg_count: f64) -> Self {
        Self {
            hour_bucket,
            avg_count,
        }
    }

    /// Label shown on the category axis, e.g. "14:00"
    pub fn label(&self) -> String {
        self.hour_bucket.format(HOUR_MINUTE_FORMAT).to_string()
    }
}

fn deserialize_local_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_local_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Parse an ISO timestamp into local wall-clock time.
pub fn parse_local_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.with_timezone(&Local).naive_local());
    }

    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|e| format!("invalid hour_bucket {:?}: {}", raw, e))
}

/// Body of `/stats/history`
///
/// The backend either returns the day's hour buckets or an object carrying an
/// error message for dates it cannot serve.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HistoryPayload {
    Series(Vec<HourlyAverage>),
    Rejected { error: String },
}

/// Chart-ready data: one label per value, in backend order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    /// A series with no points; rendering it clears the chart
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a series from hour buckets, keeping the order they arrived in
    pub fn from_averages(averages: &[HourlyAverage]) -> Self {
        let (labels, values) = averages
            .iter()
            .map(|average| (average.label(), average.avg_count))
            .unzip();

        Self { labels, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest value, or zero for an empty series
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

/// `YYYY-MM-DD`, as sent in the history query string
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Long day heading for the history view
pub fn format_day_heading(date: NaiveDate) -> String {
    date.format(DAY_HEADING_FORMAT).to_string()
}
