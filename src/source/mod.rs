//! Occupancy Data Sources
//!
//! The backend that counts vehicles and aggregates hour buckets is an external
//! collaborator. Controllers only see it through [`DataSource`]:
//!
//! - `GET /current` → `{ "count": 12 }`
//! - `GET /stats` → `[{ "hour_bucket": "...", "avg_count": 4.5 }, ...]`
//! - `GET /stats/history?date=YYYY-MM-DD` → the same list, or `{ "error": "..." }`

mod client;
mod error;

pub use client::{HttpDataSource, HttpSourceConfig};
pub use error::{SourceError, SourceResult};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::{HistoryPayload, HourlyAverage, OccupancyReading};

/// Common trait for everything that can feed the dashboard
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Latest live count
    async fn fetch_current(&self) -> SourceResult<OccupancyReading>;

    /// Recent hour buckets, ascending, over a window the backend chooses
    async fn fetch_recent_stats(&self) -> SourceResult<Vec<HourlyAverage>>;

    /// One calendar day of hour buckets, or the backend's refusal
    async fn fetch_history(&self, date: NaiveDate) -> SourceResult<HistoryPayload>;
}

#[async_trait]
impl<S: DataSource + ?Sized> DataSource for std::sync::Arc<S> {
    async fn fetch_current(&self) -> SourceResult<OccupancyReading> {
        (**self).fetch_current().await
    }

    async fn fetch_recent_stats(&self) -> SourceResult<Vec<HourlyAverage>> {
        (**self).fetch_recent_stats().await
    }

    async fn fetch_history(&self, date: NaiveDate) -> SourceResult<HistoryPayload> {
        (**self).fetch_history(date).await
    }
}
