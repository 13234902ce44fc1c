//! History View Controller
//!
//! Browses hourly averages one calendar day at a time. The view opens on
//! yesterday, since today's buckets are still being aggregated. Moving back is
//! always allowed; moving forward stops at today.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use super::{AppliedMark, RefreshOutcome, RequestSequence, Ticket};
use crate::chart::{ChartRenderer, ChartSlot};
use crate::clock::Clock;
use crate::model::{format_day_heading, ChartSeries, HistoryPayload};
use crate::source::DataSource;

/// Whether the "next day" control is enabled for `selected`
///
/// Compares calendar dates only; any time of day on `today` counts as today.
pub fn can_go_forward(selected: NaiveDate, today: NaiveDate) -> bool {
    selected < today
}

/// Colour of the caption under the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionTone {
    /// Neutral description of what is shown
    Info,
    /// Valid answer, but nothing to show
    Warning,
    Error,
}

/// Informational line describing the chart's data or its absence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub text: String,
    pub tone: CaptionTone,
}

impl Caption {
    fn samples(count: usize) -> Self {
        Self {
            text: format!("Showing {} hourly averages", count),
            tone: CaptionTone::Info,
        }
    }

    fn no_data() -> Self {
        Self {
            text: "No data available for the selected day.".to_string(),
            tone: CaptionTone::Warning,
        }
    }

    fn rejected(message: &str) -> Self {
        Self {
            text: format!("Error: {}", message),
            tone: CaptionTone::Error,
        }
    }

    fn load_failed() -> Self {
        Self {
            text: "Failed to load data.".to_string(),
            tone: CaptionTone::Error,
        }
    }
}

/// What the history view shows
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPanel {
    pub selected_date: NaiveDate,
    /// Long localized date, e.g. "Monday, 15 January 2024"
    pub heading: String,
    /// `None` until the first load completes
    pub caption: Option<Caption>,
    pub can_go_forward: bool,
    /// Points on the chart currently displayed
    pub chart_points: usize,
}

struct HistoryState<R: ChartRenderer> {
    selected_date: NaiveDate,
    mark: AppliedMark,
    chart: ChartSlot<R>,
}

/// Drives the history view
pub struct HistoryController<S, R: ChartRenderer> {
    source: S,
    clock: Arc<dyn Clock>,
    sequence: RequestSequence,
    state: Mutex<HistoryState<R>>,
    panel: watch::Sender<HistoryPanel>,
}

impl<S: DataSource, R: ChartRenderer> HistoryController<S, R> {
    /// Open the view on yesterday
    pub fn new(source: S, renderer: R, clock: Arc<dyn Clock>) -> Self {
        let today = clock.today();
        let yesterday = today.pred_opt().unwrap_or(today);
        Self::starting_at(source, renderer, clock, yesterday)
    }

    /// Open the view on a specific day
    pub fn starting_at(source: S, renderer: R, clock: Arc<dyn Clock>, date: NaiveDate) -> Self {
        let (panel, _) = watch::channel(HistoryPanel {
            selected_date: date,
            heading: format_day_heading(date),
            caption: None,
            can_go_forward: can_go_forward(date, clock.today()),
            chart_points: 0,
        });

        Self {
            source,
            clock,
            sequence: RequestSequence::new(),
            state: Mutex::new(HistoryState {
                selected_date: date,
                mark: AppliedMark::default(),
                chart: ChartSlot::new(renderer),
            }),
            panel,
        }
    }

    pub async fn selected_date(&self) -> NaiveDate {
        self.state.lock().await.selected_date
    }

    /// Snapshot of the panel
    pub fn panel(&self) -> HistoryPanel {
        self.panel.borrow().clone()
    }

    /// Receive every panel change
    pub fn subscribe(&self) -> watch::Receiver<HistoryPanel> {
        self.panel.subscribe()
    }

    /// Run `f` against the chart currently on display
    pub async fn with_chart<T>(&self, f: impl FnOnce(Option<&R::Chart>) -> T) -> T {
        let state = self.state.lock().await;
        f(state.chart.current())
    }

    /// Step one day back and reload
    pub async fn prev_day(&self) -> RefreshOutcome {
        match self.dispatch(|date| date.pred_opt()).await {
            Some((ticket, date)) => self.complete(ticket, date).await,
            // Only reachable at NaiveDate::MIN
            None => RefreshOutcome::Failed,
        }
    }

    /// Step one day forward and reload
    ///
    /// Returns `None` without touching the view while the selected day is
    /// today or later.
    pub async fn next_day(&self) -> Option<RefreshOutcome> {
        let today = self.clock.today();
        let (ticket, date) = self
            .dispatch(|date| {
                if can_go_forward(date, today) {
                    date.succ_opt()
                } else {
                    None
                }
            })
            .await?;

        Some(self.complete(ticket, date).await)
    }

    /// Select `date` and load its hour buckets
    pub async fn load_data_for_date(&self, date: NaiveDate) -> RefreshOutcome {
        match self.dispatch(|_| Some(date)).await {
            Some((ticket, date)) => self.complete(ticket, date).await,
            None => RefreshOutcome::Failed,
        }
    }

    /// Reload the selected day
    pub async fn reload(&self) -> RefreshOutcome {
        match self.dispatch(Some).await {
            Some((ticket, date)) => self.complete(ticket, date).await,
            None => RefreshOutcome::Failed,
        }
    }

    /// Move the selection and take a ticket in one step, so tickets follow
    /// the order in which the selection changed.
    async fn dispatch(
        &self,
        step: impl FnOnce(NaiveDate) -> Option<NaiveDate>,
    ) -> Option<(Ticket, NaiveDate)> {
        let mut state = self.state.lock().await;
        let date = step(state.selected_date)?;

        state.selected_date = date;
        let ticket = self.sequence.issue();
        let forward = can_go_forward(date, self.clock.today());

        self.panel.send_modify(|panel| {
            panel.selected_date = date;
            panel.heading = format_day_heading(date);
            panel.can_go_forward = forward;
        });

        Some((ticket, date))
    }

    async fn complete(&self, ticket: Ticket, date: NaiveDate) -> RefreshOutcome {
        let result = self.source.fetch_history(date).await;

        let mut state = self.state.lock().await;
        if !state.mark.admit(ticket) {
            tracing::debug!(%date, ticket = ticket.value(), "Dropping stale history response");
            return RefreshOutcome::Stale;
        }

        let (series, caption, outcome) = match result {
            Ok(HistoryPayload::Rejected { error }) => {
                tracing::warn!(%date, "Backend rejected history request: {}", error);
                (ChartSeries::empty(), Caption::rejected(&error), RefreshOutcome::Rejected)
            }
            Ok(HistoryPayload::Series(averages)) if averages.is_empty() => {
                (ChartSeries::empty(), Caption::no_data(), RefreshOutcome::Empty)
            }
            Ok(HistoryPayload::Series(averages)) => (
                ChartSeries::from_averages(&averages),
                Caption::samples(averages.len()),
                RefreshOutcome::Applied,
            ),
            Err(e) => {
                tracing::error!(%date, "Error fetching history data: {}", e);
                (ChartSeries::empty(), Caption::load_failed(), RefreshOutcome::Failed)
            }
        };

        // An empty series still goes through the renderer so the previous
        // day's chart is cleared
        let chart_points = match state.chart.replace(&series) {
            Ok(_) => series.len(),
            Err(e) => {
                tracing::warn!(%date, "Failed to render history chart: {}", e);
                0
            }
        };

        let forward = can_go_forward(state.selected_date, self.clock.today());
        self.panel.send_modify(|panel| {
            panel.caption = Some(caption);
            panel.can_go_forward = forward;
            panel.chart_points = chart_points;
        });

        outcome
    }
}
