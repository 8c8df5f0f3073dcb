//! Once-per-second tick source.
//!
//! Ticks are scheduled against fixed deadlines (`start + n * period`) rather
//! than by chaining sleeps, so handler latency never accumulates into drift.
//! If the runtime falls behind (e.g. the host was suspended) the missed ticks
//! are delivered back to back.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
pub struct Ticker {
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin ticking on `runtime`, replacing any previous tick task.
    ///
    /// The first tick lands one full period after this call. The task ends
    /// when `on_tick` returns `ControlFlow::Break` or [`stop`](Self::stop)
    /// is called.
    pub fn start<F>(&mut self, runtime: &Handle, mut on_tick: F)
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        self.stop();
        let task = runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                interval.tick().await;
                if on_tick().is_break() {
                    break;
                }
            }
        });
        self.task = Some(task);
    }

    /// Cancel the tick task. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting_ticker(count: &Arc<AtomicU32>, limit: u32) -> Ticker {
        let mut ticker = Ticker::new();
        let count = Arc::clone(count);
        ticker.start(&Handle::current(), move || {
            let n = count.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= limit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        ticker
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second() {
        let count = Arc::new(AtomicU32::new(0));
        let _ticker = counting_ticker(&count, u32::MAX);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(count.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_halts_ticks() {
        let count = Arc::new(AtomicU32::new(0));
        let mut ticker = counting_ticker(&count, u32::MAX);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        ticker.stop();
        ticker.stop();
        assert!(!ticker.is_active());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn break_ends_task() {
        let count = Arc::new(AtomicU32::new(0));
        let ticker = counting_ticker(&count, 3);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!ticker.is_active());
    }
}
