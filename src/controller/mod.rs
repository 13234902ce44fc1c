//! View Controllers
//!
//! Two independent controllers drive the dashboard:
//!
//! - **LiveController**: polls `/current` and `/stats` on two timers and keeps
//!   the counter, badge and trend chart up to date
//! - **HistoryController**: browses one calendar day at a time
//!
//! ## Data Flow
//!
//! ```text
//! timer / navigation → fetch → parse → ChartSeries → ChartSlot → renderer
//!                                    ↘ panel (watch channel) → front end
//! ```
//!
//! Every failure is handled inside the controller: it is logged, reflected in
//! the panel, and never returned to the caller.

mod history;
mod live;
mod sequence;

pub use history::{can_go_forward, Caption, CaptionTone, HistoryController, HistoryPanel};
pub use live::{LiveController, LivePanel, LiveSettings, PollHandle};
pub use sequence::{AppliedMark, RequestSequence, Ticket};

/// What a refresh did to the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Fresh data is on display
    Applied,
    /// The backend had nothing for the request; an empty chart is shown
    Empty,
    /// The backend refused the request with an error message
    Rejected,
    /// Transport or parse failure
    Failed,
    /// A newer response had already been applied; this one was dropped
    Stale,
}
