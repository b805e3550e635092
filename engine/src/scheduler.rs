//! Virtual-time timers.
//!
//! `TimerQueue` never looks at the wall clock: callers move time forward with `poll` /
//! `advance_to`. Headful apps feed it frame deltas, tests feed it whatever they like, and both
//! see exactly the same firing order.

use std::time::Duration;

/// Repeating timers never fire more often than this, so a zero interval can't spin forever.
pub const MIN_REPEAT_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A timer that came due. `at` is the virtual time it was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<E> {
    pub handle: TimerHandle,
    pub event: E,
    pub at: Duration,
}

/// Timer capability consumed by event-driven game logic.
///
/// Events are plain values rather than callbacks: the owner of the scheduler dispatches them,
/// which keeps ownership of the mutable state in one place.
pub trait Scheduler<E> {
    fn now(&self) -> Duration;

    fn schedule_once(&mut self, delay: Duration, event: E) -> TimerHandle;
    fn schedule_repeating(&mut self, interval: Duration, event: E) -> TimerHandle;

    /// Returns `false` if the handle was not pending (already fired, cancelled, or unknown).
    fn cancel(&mut self, handle: TimerHandle) -> bool;
    fn is_pending(&self, handle: TimerHandle) -> bool;

    /// Pops the earliest timer due at or before `deadline`, moving `now` to its due time.
    ///
    /// Repeating timers are re-armed before being returned. Call this in a loop and dispatch each
    /// event before asking for the next one, so handlers can cancel later timers.
    fn poll(&mut self, deadline: Duration) -> Option<Fired<E>>;

    /// Moves `now` forward to `deadline` without firing anything. Never moves backwards.
    fn advance_to(&mut self, deadline: Duration);
}

#[derive(Debug, Clone)]
struct Timer<E> {
    handle: TimerHandle,
    due: Duration,
    interval: Option<Duration>,
    event: E,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            timers: Vec::new(),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Due time of the earliest pending timer, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    fn insert(&mut self, due: Duration, interval: Option<Duration>, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            handle,
            due,
            interval,
            event,
        });
        handle
    }

    fn earliest_index(&self) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .min_by_key(|(_, t)| (t.due, t.handle))
            .map(|(i, _)| i)
    }
}

impl<E: Clone> Scheduler<E> for TimerQueue<E> {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_once(&mut self, delay: Duration, event: E) -> TimerHandle {
        let due = self.now.saturating_add(delay);
        self.insert(due, None, event)
    }

    fn schedule_repeating(&mut self, interval: Duration, event: E) -> TimerHandle {
        let interval = interval.max(MIN_REPEAT_INTERVAL);
        let due = self.now.saturating_add(interval);
        self.insert(due, Some(interval), event)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    fn poll(&mut self, deadline: Duration) -> Option<Fired<E>> {
        let index = self.earliest_index()?;
        let due = self.timers[index].due;
        if due > deadline {
            return None;
        }
        self.now = self.now.max(due);

        let fired = match self.timers[index].interval {
            Some(interval) => {
                let timer = &mut self.timers[index];
                timer.due = due.saturating_add(interval);
                Fired {
                    handle: timer.handle,
                    event: timer.event.clone(),
                    at: due,
                }
            }
            None => {
                let timer = self.timers.swap_remove(index);
                Fired {
                    handle: timer.handle,
                    event: timer.event,
                    at: due,
                }
            }
        };
        Some(fired)
    }

    fn advance_to(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn drain(q: &mut TimerQueue<&'static str>, deadline: Duration) -> Vec<(&'static str, u64)> {
        let mut out = Vec::new();
        while let Some(f) = q.poll(deadline) {
            out.push((f.event, f.at.as_millis() as u64));
        }
        q.advance_to(deadline);
        out
    }

    #[test]
    fn once_fires_at_due_time_and_only_once() {
        let mut q = TimerQueue::new();
        let h = q.schedule_once(ms(100), "once");
        assert!(q.is_pending(h));

        assert!(drain(&mut q, ms(99)).is_empty());
        assert_eq!(drain(&mut q, ms(100)), vec![("once", 100)]);
        assert!(!q.is_pending(h));
        assert!(drain(&mut q, ms(1_000)).is_empty());
    }

    #[test]
    fn repeating_fires_every_interval_until_cancelled() {
        let mut q = TimerQueue::new();
        let h = q.schedule_repeating(ms(70), "tick");

        let fired = drain(&mut q, ms(210));
        assert_eq!(fired, vec![("tick", 70), ("tick", 140), ("tick", 210)]);
        assert!(q.is_pending(h));

        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        assert!(drain(&mut q, ms(1_000)).is_empty());
    }

    #[test]
    fn timers_fire_in_time_order_across_kinds() {
        let mut q = TimerQueue::new();
        q.schedule_once(ms(100), "stop");
        q.schedule_repeating(ms(40), "tick");

        let fired = drain(&mut q, ms(130));
        assert_eq!(fired, vec![("tick", 40), ("tick", 80), ("stop", 100), ("tick", 120)]);
    }

    #[test]
    fn equal_due_times_fire_in_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule_once(ms(50), "first");
        q.schedule_once(ms(50), "second");
        q.schedule_once(ms(50), "third");
        let fired: Vec<_> = drain(&mut q, ms(50)).into_iter().map(|(e, _)| e).collect();
        assert_eq!(fired, vec!["first", "second", "third"]);
    }

    #[test]
    fn handler_can_cancel_timer_that_would_fire_later_in_same_step() {
        let mut q = TimerQueue::new();
        let tick = q.schedule_repeating(ms(70), "tick");
        q.schedule_once(ms(100), "stop");

        let mut seen = Vec::new();
        while let Some(f) = q.poll(ms(200)) {
            seen.push(f.event);
            if f.event == "stop" {
                q.cancel(tick);
            }
        }
        assert_eq!(seen, vec!["tick", "stop"]);
    }

    #[test]
    fn now_tracks_fired_timers_then_deadline() {
        let mut q = TimerQueue::new();
        q.schedule_once(ms(30), "a");
        let f = q.poll(ms(100)).expect("timer should be due");
        assert_eq!(f.at, ms(30));
        assert_eq!(q.now(), ms(30));

        q.advance_to(ms(100));
        assert_eq!(q.now(), ms(100));
        q.advance_to(ms(10));
        assert_eq!(q.now(), ms(100), "time never moves backwards");

        // Delays are relative to the current virtual time.
        q.schedule_once(ms(5), "b");
        assert_eq!(q.next_due(), Some(ms(105)));
    }

    #[test]
    fn zero_interval_repeat_is_clamped() {
        let mut q = TimerQueue::new();
        q.schedule_repeating(Duration::ZERO, "spin");
        let fired = drain(&mut q, ms(3));
        assert_eq!(fired.len(), 3);
    }

    #[test]
    fn cancel_unknown_handle_is_a_noop() {
        let mut q: TimerQueue<&'static str> = TimerQueue::new();
        let h = q.schedule_once(ms(1), "x");
        q.clear();
        assert!(!q.cancel(h));
        assert!(q.is_empty());
    }
}
