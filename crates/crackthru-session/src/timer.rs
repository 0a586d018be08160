//! Fixed-interval timer that drives the silent session refresh.
//!
//! The timer only runs while somebody is logged in. When paused,
//! [`RefreshTimer::wait_for_tick`] pends forever, so a refresh loop built
//! on `tokio::select!` simply stops issuing requests:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         _ = state_rx.changed() => { /* pause or resume */ }
//!         _ = timer.wait_for_tick() => { manager.refresh().await; }
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

/// Fixed-interval refresh timer. Starts paused.
#[derive(Debug)]
pub struct RefreshTimer {
    interval: Duration,
    /// Random extra delay (0..jitter) applied on every resume.
    jitter: Duration,
    next_tick: Instant,
    tick_count: u64,
    paused: bool,
}

impl RefreshTimer {
    /// Creates a paused timer.
    pub fn new(interval: Duration, jitter: Duration) -> Self {
        debug!(interval_secs = interval.as_secs_f64(), "refresh timer created");
        Self {
            interval,
            jitter,
            next_tick: Instant::now() + interval,
            tick_count: 0,
            paused: true,
        }
    }

    /// Waits until the next refresh is due and returns the tick number
    /// (starting at 1).
    ///
    /// While paused this future never completes on its own; `select!`
    /// keeps servicing its other branches.
    pub async fn wait_for_tick(&mut self) -> u64 {
        if self.paused {
            std::future::pending::<()>().await;
        }

        time::sleep_until(self.next_tick).await;

        let now = Instant::now();
        let late_by = now.saturating_duration_since(self.next_tick);
        if late_by > self.interval {
            // The machine slept (laptop lid closed). One refresh is
            // enough; don't fire a burst for every missed interval.
            warn!(
                late_secs = late_by.as_secs_f64(),
                "refresh tick overdue, skipping missed intervals"
            );
        }

        self.tick_count += 1;
        self.next_tick = now + self.interval;
        trace!(tick = self.tick_count, "refresh tick fired");
        self.tick_count
    }

    /// Stops the timer. Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "refresh timer paused");
        }
    }

    /// Starts the timer. The first tick is one full interval (plus
    /// jitter) from now. Idempotent: resuming a running timer does not
    /// push its deadline back.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            let jitter = self.sample_jitter();
            self.next_tick = Instant::now() + self.interval + jitter;
            debug!(tick = self.tick_count, "refresh timer resumed");
        }
    }

    /// Jitter is sampled in whole milliseconds; anything under 1 ms is none.
    fn sample_jitter(&self) -> Duration {
        let bound_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        if bound_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..bound_ms))
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> RefreshTimer {
        RefreshTimer::new(Duration::from_secs(60), Duration::ZERO)
    }

    #[test]
    fn test_new_timer_starts_paused() {
        let t = timer();
        assert!(t.is_paused());
        assert_eq!(t.tick_count(), 0);
        assert_eq!(t.interval(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_tick_fires_after_interval() {
        let mut t = timer();
        t.resume();
        let start = Instant::now();

        let tick = t.wait_for_tick().await;

        assert_eq!(tick, 1);
        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_timer_never_fires() {
        let mut t = timer();
        let result =
            time::timeout(Duration::from_secs(3600), t.wait_for_tick()).await;
        assert!(result.is_err(), "paused timer must not tick");
        assert_eq!(t.tick_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_is_idempotent() {
        let mut t = timer();
        t.resume();
        time::advance(Duration::from_secs(30)).await;
        // A second resume must not push the deadline back by 30 s.
        t.resume();
        let start = Instant::now();

        t.wait_for_tick().await;

        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_then_resume_restarts_interval() {
        let mut t = timer();
        t.resume();
        t.wait_for_tick().await;
        t.pause();
        t.pause();
        assert!(t.is_paused());

        time::advance(Duration::from_secs(45)).await;
        t.resume();
        let start = Instant::now();
        let tick = t.wait_for_tick().await;

        assert_eq!(tick, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_jitter_delays_first_tick_within_bound() {
        let mut t = RefreshTimer::new(Duration::from_secs(10), Duration::from_secs(2));
        t.resume();
        let start = Instant::now();
        t.wait_for_tick().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_millisecond_jitter_adds_no_delay() {
        let mut t = RefreshTimer::new(Duration::from_secs(60), Duration::from_micros(500));
        t.resume();
        let start = Instant::now();

        t.wait_for_tick().await;

        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }
}
