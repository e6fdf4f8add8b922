//! Cancellable periodic ticks for presentational refreshes.
//!
//! A [`Ticker`] calls its callback once per period with the current instant
//! and nothing else. It owns no progression state: anything shown from a
//! tick (the clock, a study session's elapsed time) is recomputed from a
//! stored start instant and the instant passed in, so missed or late ticks
//! never cause drift.
//!
//! Dropping a ticker stops it. No tick runs after [`Ticker::cancel`] returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default refresh period for clock and elapsed-time displays.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Shared between the handle and the spawned loop.
#[derive(Debug, Default)]
struct TickerState {
    /// Set once by [`Ticker::cancel`].
    cancelled: AtomicBool,
    /// Wakes the loop out of its sleep on cancel.
    cancel_notify: Notify,
    /// Completed callbacks.
    ticks: AtomicU64,
}

/// Handle to a spawned periodic task.
#[derive(Debug)]
pub struct Ticker {
    /// Loop state.
    state: Arc<TickerState>,
    /// The spawned loop.
    handle: Option<JoinHandle<()>>,
    /// Configured period.
    period: Duration,
}

impl Ticker {
    /// Spawn a ticker on the current tokio runtime.
    ///
    /// The first tick fires one `period` after spawning. Ticks that fall
    /// behind are skipped rather than replayed.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(DateTime<Utc>) + Send + 'static,
    {
        let state = Arc::new(TickerState::default());
        let loop_state = Arc::clone(&state);

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now()
                .checked_add(period)
                .unwrap_or_else(tokio::time::Instant::now);
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    () = loop_state.cancel_notify.notified() => break,
                }
                if loop_state.cancelled.load(Ordering::Acquire) {
                    break;
                }
                on_tick(Utc::now());
                loop_state.ticks.fetch_add(1, Ordering::AcqRel);
            }
            tracing::trace!("ticker stopped");
        });

        Self {
            state,
            handle: Some(handle),
            period,
        }
    }

    /// The configured period.
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// How many ticks have run.
    pub fn ticks(&self) -> u64 {
        self.state.ticks.load(Ordering::Acquire)
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Whether the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the ticker and wait for the loop to exit.
    pub async fn cancel(mut self) {
        self.signal_cancel();
        if let Some(handle) = self.handle.take() {
            // A tick in progress runs to completion before the loop exits.
            let _ = handle.await;
        }
    }

    /// Flag cancellation and wake the loop.
    fn signal_cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
        self.state.cancel_notify.notify_one();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.signal_cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let seen = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&seen);
        let ticker = Ticker::spawn(Duration::from_millis(100), move |_| {
            counter.fetch_add(1, Ordering::AcqRel);
        });

        tokio::time::sleep(Duration::from_millis(350)).await;
        let observed = seen.load(Ordering::Acquire);
        assert_eq!(observed, 3);
        assert_eq!(ticker.ticks(), 3);
        ticker.cancel().await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_ticks_after_cancel() {
        let seen = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&seen);
        let ticker = Ticker::spawn(Duration::from_millis(50), move |_| {
            counter.fetch_add(1, Ordering::AcqRel);
        });

        tokio::time::sleep(Duration::from_millis(120)).await;
        ticker.cancel().await;
        let at_cancel = seen.load(Ordering::Acquire);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(seen.load(Ordering::Acquire), at_cancel);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_stops_the_loop() {
        let seen = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&seen);
        {
            let _ticker = Ticker::spawn(Duration::from_millis(50), move |_| {
                counter.fetch_add(1, Ordering::AcqRel);
            });
            tokio::time::sleep(Duration::from_millis(60)).await;
        }
        let at_drop = seen.load(Ordering::Acquire);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(seen.load(Ordering::Acquire), at_drop);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_receives_current_instant() {
        let stamps: Arc<Mutex<Vec<DateTime<Utc>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stamps);
        let before = Utc::now();
        let ticker = Ticker::spawn(Duration::from_millis(10), move |now| {
            if let Ok(mut guard) = sink.lock() {
                guard.push(now);
            }
        });
        tokio::time::sleep(Duration::from_millis(25)).await;
        ticker.cancel().await;

        let stamps = stamps.lock().map(|g| g.clone()).unwrap_or_default();
        assert!(!stamps.is_empty());
        assert!(stamps.iter().all(|t| *t >= before));
    }
}
