//! Periodic tick scheduling.
//!
//! A `Scheduler` fires a callback every `interval`, first fire one full
//! interval after scheduling. `cancel` is synchronous: once it returns, the
//! callback of that handle never runs again.
//!
//! Two implementations:
//! - `ThreadScheduler`: one worker thread per timer, paced against a `Clock`.
//! - `ManualScheduler`: deterministic, fires only when `advance` is called.
use crossbeam_channel as xch;
use softstart_traits::clock::{Clock, ManualClock};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

/// What the timer should do after a callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Callback driven by a scheduler.
pub type TickFn = Box<dyn FnMut() -> TickControl + Send + 'static>;

pub trait Scheduler {
    type Handle;

    fn schedule_periodic(&mut self, interval: Duration, tick: TickFn) -> Self::Handle;
    fn cancel(&mut self, handle: Self::Handle);
}

// ── Thread-backed scheduler ──────────────────────────────────────────────────

/// Spawns one thread per scheduled timer.
///
/// Deadlines are `epoch + n * interval`, so a slow callback delays only the
/// next fire and does not accumulate drift.
#[derive(Debug, Clone, Default)]
pub struct ThreadScheduler<C> {
    clock: C,
}

impl<C> ThreadScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

/// Live timer thread. Dropping the handle stops and joins the thread.
pub struct TimerHandle {
    stop_tx: xch::Sender<()>,
    join_handle: Option<JoinHandle<()>>,
}

impl core::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("running", &self.is_running())
            .finish()
    }
}

impl TimerHandle {
    /// Whether the worker thread is still alive.
    pub fn is_running(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    fn stop(&mut self) {
        // Worker may already be gone (callback returned Stop); ignore.
        let _ = self.stop_tx.try_send(());
        if let Some(handle) = self.join_handle.take() {
            if handle.thread().id() == std::thread::current().id() {
                // Dropped from inside its own callback; the loop exits on
                // the stop message after the callback returns.
                return;
            }
            match handle.join() {
                Ok(()) => tracing::trace!("timer thread joined"),
                Err(e) => tracing::warn!(?e, "timer thread panicked"),
            }
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<C: Clock + Clone + Send + 'static> Scheduler for ThreadScheduler<C> {
    type Handle = TimerHandle;

    fn schedule_periodic(&mut self, interval: Duration, mut tick: TickFn) -> TimerHandle {
        let (stop_tx, stop_rx) = xch::bounded::<()>(1);
        let clock = self.clock.clone();

        let join_handle = std::thread::spawn(move || {
            let mut deadline = clock.now() + interval;
            loop {
                let wait = deadline.saturating_duration_since(clock.now());
                match stop_rx.recv_timeout(wait) {
                    Err(xch::RecvTimeoutError::Timeout) => {}
                    Ok(()) => {
                        tracing::debug!("timer cancelled");
                        break;
                    }
                    Err(xch::RecvTimeoutError::Disconnected) => break,
                }

                if tick() == TickControl::Stop {
                    tracing::trace!("timer finished");
                    break;
                }

                deadline += interval;
                let now = clock.now();
                if deadline < now {
                    tracing::trace!(
                        late_ms = now.saturating_duration_since(deadline).as_millis() as u64,
                        "tick overran its interval"
                    );
                    deadline = now;
                }
            }
        });

        TimerHandle {
            stop_tx,
            join_handle: Some(join_handle),
        }
    }

    fn cancel(&mut self, mut handle: TimerHandle) {
        handle.stop();
    }
}

// ── Deterministic scheduler ──────────────────────────────────────────────────

struct ManualTimer {
    id: u64,
    interval: Duration,
    due: Duration,
    tick: TickFn,
}

#[derive(Default)]
struct ManualInner {
    next_id: u64,
    timers: Vec<ManualTimer>,
}

/// Identifies a timer on a `ManualScheduler`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualHandle(u64);

/// Scheduler that only fires when told to.
///
/// Clones share timers and clock, so a test can keep one clone and hand the
/// other to the code under test. Callbacks run on the thread calling
/// `advance`, in deadline order.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
    clock: ManualClock,
}

impl core::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.clock.elapsed())
            .field("pending", &self.pending())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: ManualClock) -> Self {
        Self {
            inner: Arc::default(),
            clock,
        }
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live timers.
    pub fn pending(&self) -> usize {
        self.lock().timers.len()
    }

    /// Clock time of the earliest pending fire.
    pub fn next_due(&self) -> Option<Duration> {
        self.lock().timers.iter().map(|t| t.due).min()
    }

    /// Move the clock forward by `d`, firing every callback that falls due.
    /// Returns the number of callbacks run.
    pub fn advance(&self, d: Duration) -> usize {
        let end = self.clock.elapsed().saturating_add(d);
        let mut fired = 0;
        loop {
            let mut timer = {
                let mut inner = self.lock();
                let next = inner
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= end)
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(i, _)| i);
                match next {
                    Some(i) => inner.timers.remove(i),
                    None => break,
                }
            };
            self.clock.set_offset(timer.due);
            fired += 1;
            if (timer.tick)() == TickControl::Continue {
                timer.due = timer.due.saturating_add(timer.interval);
                self.lock().timers.push(timer);
            }
        }
        self.clock.set_offset(end);
        fired
    }

    /// Fire timers in order until none remain or `max_fires` is reached.
    pub fn run_until_idle(&self, max_fires: usize) -> usize {
        let mut fired = 0;
        while fired < max_fires {
            let Some(due) = self.next_due() else { break };
            fired += self.advance(due.saturating_sub(self.clock.elapsed()));
        }
        fired
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn schedule_periodic(&mut self, interval: Duration, tick: TickFn) -> ManualHandle {
        let interval = interval.max(Duration::from_nanos(1));
        let due = self.clock.elapsed().saturating_add(interval);
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.timers.push(ManualTimer {
            id,
            interval,
            due,
            tick,
        });
        ManualHandle(id)
    }

    fn cancel(&mut self, handle: ManualHandle) {
        self.lock().timers.retain(|t| t.id != handle.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use softstart_traits::MonotonicClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(stop_after: Option<usize>) -> (Arc<AtomicUsize>, TickFn) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let tick: TickFn = Box::new(move || {
            let n = c.fetch_add(1, Ordering::SeqCst) + 1;
            match stop_after {
                Some(limit) if n >= limit => TickControl::Stop,
                _ => TickControl::Continue,
            }
        });
        (count, tick)
    }

    #[test]
    fn manual_first_fire_after_one_interval() {
        let mut s = ManualScheduler::new();
        let (count, tick) = counter(None);
        s.schedule_periodic(Duration::from_millis(100), tick);

        assert_eq!(s.advance(Duration::ZERO), 0);
        assert_eq!(s.advance(Duration::from_millis(99)), 0);
        assert_eq!(s.advance(Duration::from_millis(1)), 1);
        assert_eq!(s.advance(Duration::from_millis(350)), 3);
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn manual_cancel_stops_fires() {
        let mut s = ManualScheduler::new();
        let (count, tick) = counter(None);
        let h = s.schedule_periodic(Duration::from_millis(10), tick);
        s.advance(Duration::from_millis(30));
        s.cancel(h);
        assert_eq!(s.pending(), 0);
        assert_eq!(s.advance(Duration::from_secs(1)), 0);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn manual_stop_removes_timer() {
        let mut s = ManualScheduler::new();
        let (count, tick) = counter(Some(5));
        s.schedule_periodic(Duration::from_millis(10), tick);
        assert_eq!(s.run_until_idle(100), 5);
        assert_eq!(s.pending(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 5);
        assert_eq!(s.clock().elapsed(), Duration::from_millis(50));
    }

    #[test]
    fn run_until_idle_respects_cap() {
        let mut s = ManualScheduler::new();
        let (_count, tick) = counter(None);
        s.schedule_periodic(Duration::from_millis(1), tick);
        assert_eq!(s.run_until_idle(7), 7);
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn thread_scheduler_fires_and_cancels() {
        let mut s = ThreadScheduler::new(MonotonicClock::new());
        let (count, tick) = counter(None);
        let h = s.schedule_periodic(Duration::from_millis(5), tick);
        std::thread::sleep(Duration::from_millis(60));
        s.cancel(h);
        let after_cancel = count.load(Ordering::SeqCst);
        assert!(after_cancel >= 1, "expected at least one fire");
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
    }

    #[test]
    fn thread_scheduler_no_fire_before_first_interval() {
        let mut s = ThreadScheduler::new(MonotonicClock::new());
        let (count, tick) = counter(None);
        let h = s.schedule_periodic(Duration::from_secs(10), tick);
        std::thread::sleep(Duration::from_millis(20));
        s.cancel(h);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn thread_timer_exits_on_stop() {
        let mut s = ThreadScheduler::new(MonotonicClock::new());
        let (count, tick) = counter(Some(2));
        let h = s.schedule_periodic(Duration::from_millis(2), tick);
        let start = std::time::Instant::now();
        while h.is_running() && start.elapsed() < Duration::from_secs(2) {
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(!h.is_running());
        assert_eq!(count.load(Ordering::SeqCst), 2);
        s.cancel(h);
    }
}
