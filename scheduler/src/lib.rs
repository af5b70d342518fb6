#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Single-threaded cooperative event loop driven by a virtual clock.
//!
//! Work is never executed by the loop itself. Owners schedule typed payloads
//! as one-shot timers, repeating timers, or display-frame callbacks, then
//! drain due firings in chronological order with [`EventLoop::pop_due`] and
//! dispatch them. Handlers may schedule further tasks while draining; those
//! fire within the same advance when they fall due before the horizon.
//! Ties are broken by scheduling order so replays are deterministic.

use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

/// Cancellable reference to a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Firing recurrence of a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cadence {
    Once,
    Repeating(Duration),
}

#[derive(Debug)]
struct Scheduled<T> {
    handle: TaskHandle,
    cadence: Cadence,
    payload: T,
}

/// Task that fell due while draining the loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fired<T> {
    /// Handle the task was scheduled under.
    pub handle: TaskHandle,
    /// Virtual time at which the task fired.
    pub at: Duration,
    /// Payload supplied when the task was scheduled.
    pub payload: T,
}

type SlotKey = (Duration, u64);

/// Cooperative scheduler owning every timer and frame callback of a stage.
#[derive(Debug)]
pub struct EventLoop<T> {
    now: Duration,
    frame_period: Duration,
    next_handle: u64,
    next_sequence: u64,
    queue: BTreeMap<SlotKey, Scheduled<T>>,
    slots: HashMap<TaskHandle, SlotKey>,
}

impl<T: Clone> EventLoop<T> {
    /// Creates an empty loop at virtual time zero.
    ///
    /// A zero `frame_period` is clamped to one microsecond so frame callbacks
    /// always make progress.
    #[must_use]
    pub fn new(frame_period: Duration) -> Self {
        let frame_period = if frame_period.is_zero() {
            Duration::from_micros(1)
        } else {
            frame_period
        };
        Self {
            now: Duration::ZERO,
            frame_period,
            next_handle: 0,
            next_sequence: 0,
            queue: BTreeMap::new(),
            slots: HashMap::new(),
        }
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Interval between display frames.
    #[must_use]
    pub const fn frame_period(&self) -> Duration {
        self.frame_period
    }

    /// Number of tasks waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Reports whether the handle still refers to a scheduled task.
    #[must_use]
    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.slots.contains_key(&handle)
    }

    /// Schedules `payload` to fire once after `delay`.
    pub fn schedule_once(&mut self, delay: Duration, payload: T) -> TaskHandle {
        let due = self.now.saturating_add(delay);
        self.insert(due, Cadence::Once, payload)
    }

    /// Schedules `payload` to fire every `period`, starting one period from now.
    ///
    /// A zero period is clamped to one frame so the loop cannot spin.
    pub fn schedule_repeating(&mut self, period: Duration, payload: T) -> TaskHandle {
        let period = if period.is_zero() {
            self.frame_period
        } else {
            period
        };
        let due = self.now.saturating_add(period);
        self.insert(due, Cadence::Repeating(period), payload)
    }

    /// Schedules `payload` for the next display frame strictly after now.
    pub fn request_frame(&mut self, payload: T) -> TaskHandle {
        let due = self.next_frame();
        self.insert(due, Cadence::Once, payload)
    }

    /// Schedules `payload` for the next display frame, or `deadline` if that
    /// comes first. Deadlines in the past fire immediately.
    pub fn request_frame_until(&mut self, deadline: Duration, payload: T) -> TaskHandle {
        let due = self.next_frame().min(deadline.max(self.now));
        self.insert(due, Cadence::Once, payload)
    }

    /// Cancels a scheduled task. Returns `false` when the handle is stale.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.slots.remove(&handle) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => {
                log::trace!("ignoring cancel for stale task {}", handle.get());
                false
            }
        }
    }

    /// Virtual time `dt` after now, used as the horizon for [`Self::pop_due`].
    #[must_use]
    pub fn horizon_after(&self, dt: Duration) -> Duration {
        self.now.saturating_add(dt)
    }

    /// Removes and returns the earliest task due at or before `horizon`.
    ///
    /// The clock moves to the firing time. Repeating tasks are rescheduled
    /// one period later under the same handle before being returned.
    pub fn pop_due(&mut self, horizon: Duration) -> Option<Fired<T>> {
        let key = self.queue.keys().next().copied()?;
        if key.0 > horizon {
            return None;
        }

        let scheduled = self.queue.remove(&key)?;
        let _ = self.slots.remove(&scheduled.handle);
        self.now = self.now.max(key.0);

        if let Cadence::Repeating(period) = scheduled.cadence {
            let due = key.0.saturating_add(period);
            let sequence = self.bump_sequence();
            let slot = (due, sequence);
            let _ = self.slots.insert(scheduled.handle, slot);
            let _ = self.queue.insert(
                slot,
                Scheduled {
                    handle: scheduled.handle,
                    cadence: scheduled.cadence,
                    payload: scheduled.payload.clone(),
                },
            );
        }

        Some(Fired {
            handle: scheduled.handle,
            at: key.0,
            payload: scheduled.payload,
        })
    }

    /// Moves the clock to `horizon` once every due task has been drained.
    pub fn settle(&mut self, horizon: Duration) {
        debug_assert!(
            self.queue.keys().next().map_or(true, |key| key.0 > horizon),
            "settle called with due tasks outstanding"
        );
        self.now = self.now.max(horizon);
    }

    fn next_frame(&self) -> Duration {
        let period = self.frame_period.as_nanos();
        let now = self.now.as_nanos();
        let next = (now / period + 1) * period;
        Duration::from_nanos(u64::try_from(next).unwrap_or(u64::MAX))
    }

    fn insert(&mut self, due: Duration, cadence: Cadence, payload: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        let slot = (due, self.bump_sequence());
        let _ = self.slots.insert(handle, slot);
        let _ = self.queue.insert(
            slot,
            Scheduled {
                handle,
                cadence,
                payload,
            },
        );
        handle
    }

    fn bump_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        sequence
    }
}
