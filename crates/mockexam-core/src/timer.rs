//! Countdown timer.
//!
//! `Clock` is the pure remaining-time record kept inside the session.
//! `Countdown` is the ticker task that produces one tick per second; every
//! start opens a new epoch and ticks from an older epoch are ignored, so a
//! tick already queued when the countdown stops can never decrement the clock.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Interval between two ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Remaining time of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    duration_secs: u32,
    remaining_secs: u32,
    urgent_threshold_secs: u32,
}

impl Clock {
    pub fn new(duration_secs: u32, urgent_threshold_secs: u32) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            urgent_threshold_secs,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// Seconds consumed so far.
    pub fn elapsed_secs(&self) -> u32 {
        self.duration_secs - self.remaining_secs
    }

    /// Within the trailing urgent window, and not yet expired.
    pub fn is_urgent(&self) -> bool {
        self.remaining_secs > 0 && self.remaining_secs <= self.urgent_threshold_secs
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Remove one second. Saturates at zero.
    pub fn tick(&mut self) -> u32 {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.remaining_secs
    }

    /// Back to the full duration.
    pub fn reset(&mut self) {
        self.remaining_secs = self.duration_secs;
    }
}

/// Background ticker feeding epoch-stamped ticks into the engine.
#[derive(Debug, Default)]
pub struct Countdown {
    epoch: u64,
    ticker: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking every second and return the new epoch.
    ///
    /// Any previous ticker is stopped first. Missed ticks are delayed rather
    /// than delivered in a burst. Must be called inside a tokio runtime.
    pub fn start(&mut self, ticks: UnboundedSender<u64>) -> u64 {
        self.stop();
        let epoch = self.epoch;

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(epoch).is_err() {
                    break;
                }
            }
        }));
        tracing::debug!(epoch, "countdown started");
        epoch
    }

    /// Stop ticking. Idempotent; safe to call whether or not it is running.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            tracing::debug!(epoch = self.epoch, "countdown stopped");
        }
        // Close the current epoch so already-queued ticks are ignored.
        self.epoch += 1;
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Epoch that live ticks carry.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether a tick stamped with `epoch` should be applied.
    pub fn accepts(&self, epoch: u64) -> bool {
        self.is_running() && epoch == self.epoch
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

/// Format seconds as zero-padded `HH:MM:SS`.
pub fn format_hms(secs: u32) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{h:02}:{m:02}:{s:02}")
}
