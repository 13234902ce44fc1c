//! Scripted fakes shared by the unit tests

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::chart::{ChartRenderer, RenderError};
use crate::model::{ChartSeries, HistoryPayload, HourlyAverage, OccupancyReading};
use crate::source::{DataSource, SourceError, SourceResult};

/// One canned response, optionally held back until its gate is released
struct Scripted<T> {
    result: SourceResult<T>,
    gate: Option<oneshot::Receiver<()>>,
}

impl<T> Scripted<T> {
    async fn resolve(self) -> SourceResult<T> {
        if let Some(gate) = self.gate {
            let _ = gate.await;
        }
        self.result
    }
}

/// Answers each endpoint from a queue; an exhausted queue reads as an
/// unreachable backend
#[derive(Default)]
pub(crate) struct ScriptedSource {
    current: Mutex<VecDeque<Scripted<OccupancyReading>>>,
    stats: Mutex<VecDeque<Scripted<Vec<HourlyAverage>>>>,
    history: Mutex<VecDeque<Scripted<HistoryPayload>>>,
    history_dates: Mutex<Vec<NaiveDate>>,
}

fn push<T>(queue: &Mutex<VecDeque<Scripted<T>>>, result: SourceResult<T>) {
    queue.lock().unwrap().push_back(Scripted { result, gate: None });
}

fn push_gated<T>(queue: &Mutex<VecDeque<Scripted<T>>>, result: SourceResult<T>) -> oneshot::Sender<()> {
    let (release, gate) = oneshot::channel();
    queue.lock().unwrap().push_back(Scripted {
        result,
        gate: Some(gate),
    });
    release
}

fn next<T>(queue: &Mutex<VecDeque<Scripted<T>>>) -> Scripted<T> {
    queue.lock().unwrap().pop_front().unwrap_or(Scripted {
        result: Err(SourceError::Unavailable),
        gate: None,
    })
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_current(&self, result: SourceResult<OccupancyReading>) {
        push(&self.current, result);
    }

    pub fn push_current_gated(&self, result: SourceResult<OccupancyReading>) -> oneshot::Sender<()> {
        push_gated(&self.current, result)
    }

    pub fn push_stats(&self, result: SourceResult<Vec<HourlyAverage>>) {
        push(&self.stats, result);
    }

    pub fn push_stats_gated(&self, result: SourceResult<Vec<HourlyAverage>>) -> oneshot::Sender<()> {
        push_gated(&self.stats, result)
    }

    pub fn push_history(&self, result: SourceResult<HistoryPayload>) {
        push(&self.history, result);
    }

    pub fn push_history_gated(&self, result: SourceResult<HistoryPayload>) -> oneshot::Sender<()> {
        push_gated(&self.history, result)
    }

    /// Dates requested from `/stats/history`, in request order
    pub fn history_dates(&self) -> Vec<NaiveDate> {
        self.history_dates.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn fetch_current(&self) -> SourceResult<OccupancyReading> {
        let scripted = next(&self.current);
        scripted.resolve().await
    }

    async fn fetch_recent_stats(&self) -> SourceResult<Vec<HourlyAverage>> {
        let scripted = next(&self.stats);
        scripted.resolve().await
    }

    async fn fetch_history(&self, date: NaiveDate) -> SourceResult<HistoryPayload> {
        self.history_dates.lock().unwrap().push(date);
        let scripted = next(&self.history);
        scripted.resolve().await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RenderEvent {
    Created { id: u64, points: usize },
    Destroyed { id: u64 },
}

#[derive(Debug)]
pub(crate) struct RecordedChart {
    pub id: u64,
}

/// Renderer that remembers every call
#[derive(Default)]
pub(crate) struct RecordingRenderer {
    events: Arc<Mutex<Vec<RenderEvent>>>,
    rendered: Arc<Mutex<Vec<ChartSeries>>>,
    fail: Arc<AtomicBool>,
    next_id: u64,
}

impl RecordingRenderer {
    pub fn events(&self) -> Arc<Mutex<Vec<RenderEvent>>> {
        Arc::clone(&self.events)
    }

    /// Every series handed to `create`, in order
    pub fn rendered(&self) -> Arc<Mutex<Vec<ChartSeries>>> {
        Arc::clone(&self.rendered)
    }

    /// Set to make the next `create` fail
    pub fn fail_next(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail)
    }
}

impl ChartRenderer for RecordingRenderer {
    type Chart = RecordedChart;

    fn create(&mut self, series: &ChartSeries) -> Result<RecordedChart, RenderError> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(RenderError::Invalid("scripted failure".to_string()));
        }

        self.next_id += 1;
        self.events.lock().unwrap().push(RenderEvent::Created {
            id: self.next_id,
            points: series.len(),
        });
        self.rendered.lock().unwrap().push(series.clone());

        Ok(RecordedChart { id: self.next_id })
    }

    fn destroy(&mut self, chart: RecordedChart) -> Result<(), RenderError> {
        self.events
            .lock()
            .unwrap()
            .push(RenderEvent::Destroyed { id: chart.id });
        Ok(())
    }
}

/// Hour bucket on 2024-01-15 at `hour`:00
pub(crate) fn hour(hour: u32, avg_count: f64) -> HourlyAverage {
    let bucket = NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap();
    HourlyAverage::new(bucket, avg_count)
}

pub(crate) fn reading(count: u64) -> OccupancyReading {
    OccupancyReading { count }
}
