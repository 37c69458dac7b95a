//! Auto-refresh scheduling.
//!
//! The manifest is re-checked on a fixed period and whenever the page
//! becomes visible again after being hidden. [`RefreshTimer::tick`] waits for
//! whichever comes first; the caller then runs
//! [`App::refresh`](super::App::refresh).

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Interval,
    VisibilityRegained,
}

/// Reports page visibility changes to a [`RefreshTimer`].
#[derive(Debug, Clone)]
pub struct VisibilityHandle(watch::Sender<bool>);

impl VisibilityHandle {
    pub fn set_visible(&self, visible: bool) {
        self.0.send_replace(visible);
    }
}

#[derive(Debug)]
pub struct RefreshTimer {
    interval: Interval,
    visibility: watch::Receiver<bool>,
    was_visible: bool,
}

impl RefreshTimer {
    /// The first interval tick fires one full `period` from now.
    pub fn new(period: Duration) -> (Self, VisibilityHandle) {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let (tx, rx) = watch::channel(true);
        let timer = Self {
            interval,
            visibility: rx,
            was_visible: true,
        };
        (timer, VisibilityHandle(tx))
    }

    /// Wait for the next reason to refresh.
    pub async fn tick(&mut self) -> RefreshTrigger {
        loop {
            tokio::select! {
                _ = self.interval.tick() => return RefreshTrigger::Interval,
                changed = self.visibility.changed() => {
                    if changed.is_err() {
                        // Handle dropped; only the interval remains
                        self.interval.tick().await;
                        return RefreshTrigger::Interval;
                    }
                    let visible = *self.visibility.borrow_and_update();
                    let regained = visible && !self.was_visible;
                    self.was_visible = visible;
                    if regained {
                        return RefreshTrigger::VisibilityRegained;
                    }
                }
            }
        }
    }
}
