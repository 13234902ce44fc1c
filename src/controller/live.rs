//! Live View Controller
//!
//! Keeps an always-current snapshot (counter, badge, "last updated") and a
//! rolling trend chart. The snapshot and the chart refresh on two independent
//! timers; the trend timer runs at a fixed multiple of the snapshot timer.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{AppliedMark, RefreshOutcome, RequestSequence};
use crate::chart::{ChartRenderer, ChartSlot};
use crate::clock::Clock;
use crate::model::{ChartSeries, StatusLevel, Thresholds, HOUR_MINUTE_FORMAT};
use crate::source::DataSource;

/// Polling and classification settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveSettings {
    /// Interval of the `/current` timer
    pub refresh_interval: Duration,
    /// The `/stats` timer fires every `refresh_interval * trend_multiplier`
    pub trend_multiplier: u32,
    pub thresholds: Thresholds,
}

impl LiveSettings {
    pub fn trend_interval(&self) -> Duration {
        self.refresh_interval * self.trend_multiplier.max(1)
    }
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            trend_multiplier: 2,
            thresholds: Thresholds::default(),
        }
    }
}

/// What the live view shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LivePanel {
    /// Last successfully fetched count; `None` until the first answer
    pub count: Option<u64>,
    /// Badge state; `None` while loading
    pub status: Option<StatusLevel>,
    /// Local "HH:MM" of the last successful count refresh
    pub last_updated: Option<String>,
    /// Points on the trend chart currently displayed
    pub trend_points: Option<usize>,
}

impl LivePanel {
    /// Badge text, including the loading state
    pub fn badge(&self) -> &'static str {
        self.status.map(|status| status.label()).unwrap_or("Loading…")
    }
}

struct LiveState<R: ChartRenderer> {
    current_mark: AppliedMark,
    trend_mark: AppliedMark,
    chart: ChartSlot<R>,
}

/// Drives the live view
pub struct LiveController<S, R: ChartRenderer> {
    source: S,
    clock: Arc<dyn Clock>,
    settings: LiveSettings,
    current_seq: RequestSequence,
    trend_seq: RequestSequence,
    state: Mutex<LiveState<R>>,
    panel: watch::Sender<LivePanel>,
}

impl<S: DataSource, R: ChartRenderer> LiveController<S, R> {
    pub fn new(source: S, renderer: R, clock: Arc<dyn Clock>, settings: LiveSettings) -> Self {
        let (panel, _) = watch::channel(LivePanel::default());

        Self {
            source,
            clock,
            settings,
            current_seq: RequestSequence::new(),
            trend_seq: RequestSequence::new(),
            state: Mutex::new(LiveState {
                current_mark: AppliedMark::default(),
                trend_mark: AppliedMark::default(),
                chart: ChartSlot::new(renderer),
            }),
            panel,
        }
    }

    pub fn settings(&self) -> &LiveSettings {
        &self.settings
    }

    /// Snapshot of the panel
    pub fn panel(&self) -> LivePanel {
        self.panel.borrow().clone()
    }

    /// Receive every panel change
    pub fn subscribe(&self) -> watch::Receiver<LivePanel> {
        self.panel.subscribe()
    }

    /// Run `f` against the chart currently on display
    pub async fn with_chart<T>(&self, f: impl FnOnce(Option<&R::Chart>) -> T) -> T {
        let state = self.state.lock().await;
        f(state.chart.current())
    }

    /// Fetch the live count and update counter, badge and timestamp
    ///
    /// A failed fetch switches the badge to the error state whatever the
    /// last known count was; the next timer tick is the retry.
    pub async fn refresh_current(&self) -> RefreshOutcome {
        let ticket = self.current_seq.issue();
        let result = self.source.fetch_current().await;

        let mut state = self.state.lock().await;
        if !state.current_mark.admit(ticket) {
            tracing::debug!(ticket = ticket.value(), "Dropping stale /current response");
            return RefreshOutcome::Stale;
        }

        match result {
            Ok(reading) => {
                let status = self.settings.thresholds.classify(reading.count);
                let stamp = self.clock.now().format(HOUR_MINUTE_FORMAT).to_string();
                tracing::debug!(count = reading.count, %status, "Live count updated");

                self.panel.send_modify(|panel| {
                    panel.count = Some(reading.count);
                    panel.status = Some(status);
                    panel.last_updated = Some(stamp);
                });
                RefreshOutcome::Applied
            }
            Err(e) => {
                tracing::error!("Error fetching current data: {}", e);
                self.panel
                    .send_modify(|panel| panel.status = Some(StatusLevel::Error));
                RefreshOutcome::Failed
            }
        }
    }

    /// Fetch recent hour buckets and redraw the trend chart
    ///
    /// On failure the previous chart stays on display.
    pub async fn refresh_trend(&self) -> RefreshOutcome {
        let ticket = self.trend_seq.issue();
        let result = self.source.fetch_recent_stats().await;

        let mut state = self.state.lock().await;
        if state.trend_mark.is_stale(ticket) {
            tracing::debug!(ticket = ticket.value(), "Dropping stale /stats response");
            return RefreshOutcome::Stale;
        }

        let averages = match result {
            Ok(averages) => averages,
            Err(e) => {
                tracing::error!("Error fetching stats: {}", e);
                return RefreshOutcome::Failed;
            }
        };

        state.trend_mark.record(ticket);
        let series = ChartSeries::from_averages(&averages);

        if let Err(e) = state.chart.replace(&series) {
            tracing::warn!("Failed to render trend chart: {}", e);
            self.panel.send_modify(|panel| panel.trend_points = None);
            return RefreshOutcome::Failed;
        }

        self.panel
            .send_modify(|panel| panel.trend_points = Some(series.len()));
        RefreshOutcome::Applied
    }

    /// One refresh of each channel, concurrently
    pub async fn refresh_once(&self) -> (RefreshOutcome, RefreshOutcome) {
        tokio::join!(self.refresh_current(), self.refresh_trend())
    }
}

impl<S, R> LiveController<S, R>
where
    S: DataSource + 'static,
    R: ChartRenderer + 'static,
{
    /// Start both timers
    ///
    /// The first tick of each timer fires immediately. Every tick dispatches its
    /// refresh as a separate task, so a slow response never delays the next
    /// tick.
    pub fn start(self: Arc<Self>) -> PollHandle {
        let current = spawn_ticker(self.settings.refresh_interval, {
            let controller = Arc::clone(&self);
            move || {
                let controller = Arc::clone(&controller);
                tokio::spawn(async move {
                    controller.refresh_current().await;
                });
            }
        });

        let trend = spawn_ticker(self.settings.trend_interval(), {
            let controller = Arc::clone(&self);
            move || {
                let controller = Arc::clone(&controller);
                tokio::spawn(async move {
                    controller.refresh_trend().await;
                });
            }
        });

        tracing::info!(
            "Live view polling every {:?} (trend every {:?})",
            self.settings.refresh_interval,
            self.settings.trend_interval()
        );

        PollHandle { current, trend }
    }
}

fn spawn_ticker<F>(period: Duration, mut on_tick: F) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            on_tick();
        }
    })
}

/// Running timers of a live view
pub struct PollHandle {
    current: JoinHandle<()>,
    trend: JoinHandle<()>,
}

impl PollHandle {
    /// Stop both timers. Refreshes already dispatched still complete.
    pub fn stop(self) {
        self.current.abort();
        self.trend.abort();
    }
}
