//! Periodic and final integration reports.
//!
//! The periodic reporter is fire-and-forget: it only reads the tracker when
//! the interval fires. Stopping (or dropping) the handle aborts the task.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::audit::UsageTracker;

pub struct ReportTimer {
    handle: Option<JoinHandle<()>>,
}

impl ReportTimer {
    pub fn stop(&mut self) {
        if let Some(h) = self.handle.take() {
            h.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Drop for ReportTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Log the integration report every `interval`. Must be called inside a tokio runtime.
pub fn spawn_periodic_report(tracker: Arc<UsageTracker>, interval: Duration) -> ReportTimer {
    if !tracker.is_enabled() {
        return ReportTimer { handle: None };
    }

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately; skip it so the first report covers a full interval.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            tracker.log_report("interval");
        }
    });

    ReportTimer { handle: Some(handle) }
}

/// Final report on shutdown.
pub fn log_final_report(tracker: &UsageTracker) {
    tracker.log_report("shutdown");
}
