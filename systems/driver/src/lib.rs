#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Progress driver advancing a run from zero to the configured target.
//!
//! The driver owns the run's progress and phase and a single repeating timer
//! on the stage's event loop. It never touches presentation: every tick
//! reports the new progress and whether the target was crossed, and the
//! owner recomputes visuals and celebrates accordingly.

use terraform_core::{DriverConfig, Percent, RunPhase};
use terraform_scheduler::{EventLoop, TaskHandle};

/// Result of asking the driver to begin a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// A run began; the visuals for `progress` should be applied.
    Started {
        /// Progress at the start of the run, always zero.
        progress: Percent,
    },
    /// A run was already in flight, so nothing changed.
    AlreadyAnimating,
}

/// Result of a single timer tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Progress after the tick.
    pub progress: Percent,
    /// Whether this tick is the one on which progress first reached the target.
    pub reached_target: bool,
    /// Whether the run finished and the driver returned to idle.
    pub finished: bool,
}

/// Timer-driven state machine owning the run's progress.
#[derive(Debug)]
pub struct ProgressDriver {
    config: DriverConfig,
    progress: Percent,
    phase: RunPhase,
    timer: Option<TaskHandle>,
}

impl ProgressDriver {
    /// Creates an idle driver using the supplied configuration.
    #[must_use]
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            progress: Percent::ZERO,
            phase: RunPhase::Idle,
            timer: None,
        }
    }

    /// Configuration the driver was built with.
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Progress of the current or most recent run.
    #[must_use]
    pub const fn progress(&self) -> Percent {
        self.progress
    }

    /// Current phase of the state machine.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Reports whether a run is in flight.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.phase == RunPhase::Animating
    }

    /// Handle of the repeating tick task while a run is in flight.
    #[must_use]
    pub const fn timer(&self) -> Option<TaskHandle> {
        self.timer
    }

    /// Begins a run, scheduling `tick` on the event loop at the configured interval.
    ///
    /// Calls while a run is in flight are ignored so timers never overlap.
    pub fn start<T: Clone>(&mut self, events: &mut EventLoop<T>, tick: T) -> StartOutcome {
        if self.is_animating() {
            return StartOutcome::AlreadyAnimating;
        }

        self.progress = Percent::ZERO;
        self.phase = RunPhase::Animating;
        self.timer = Some(events.schedule_repeating(self.config.interval(), tick));
        log::debug!(
            "terraforming run started towards {} every {:?}",
            self.config.target,
            self.config.interval()
        );

        StartOutcome::Started {
            progress: self.progress,
        }
    }

    /// Advances progress by one step. Returns `None` when no run is in flight.
    ///
    /// The final step is clamped so progress lands exactly on the target; that
    /// tick reports the crossing, cancels the timer and returns to idle.
    pub fn tick<T: Clone>(&mut self, events: &mut EventLoop<T>) -> Option<TickOutcome> {
        if !self.is_animating() {
            return None;
        }

        let target = self.config.target;
        let previous = self.progress;
        self.progress = previous.advance_towards(self.config.step, target);
        let reached_target = previous < target && self.progress >= target;

        let finished = self.progress >= target;
        if finished {
            if let Some(timer) = self.timer.take() {
                let _ = events.cancel(timer);
            }
            self.phase = RunPhase::Idle;
        }

        Some(TickOutcome {
            progress: self.progress,
            reached_target,
            finished,
        })
    }
}
