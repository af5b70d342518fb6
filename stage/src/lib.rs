#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative animation state for the terraforming progress indicator.
//!
//! The [`Stage`] is the animation context: it owns the event loop, the
//! progress driver, the particle burst effect and every decoration. Adapters
//! mutate it only through [`apply`] and observe it only through [`query`].

mod sound;

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use terraform_core::{
    Command, ConfigError, Control, Event, ParticleId, RippleId, ScreenPoint, SoundCue,
    TerraformConfig, Viewport,
};
use terraform_scheduler::{EventLoop, TaskHandle};
use terraform_system_burst::{BurstEffect, ParticleStep};
use terraform_system_driver::{ProgressDriver, StartOutcome};
use terraform_system_starfield::Star;
use terraform_system_tilt::TiltTracker;

pub use sound::{LoggingSoundEffects, SoundEffects};

const STARFIELD_SEED_SALT: u64 = 0x5a17_f1e1_d000_0100;

/// Work items scheduled on the stage's event loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    Autostart,
    ProgressTick,
    ParticleFrame(ParticleId),
    PulseEnd,
    RippleEnd(RippleId),
}

/// Expanding ring shown where the planet was clicked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ripple {
    /// Identifier of the ripple.
    pub id: RippleId,
    /// Centre relative to the planet's top-left corner.
    pub at: ScreenPoint,
    /// Virtual time at which the ripple spawned.
    pub spawned_at: Duration,
    /// Time until the ripple disappears.
    pub duration: Duration,
}

impl Ripple {
    /// Fraction of the ripple animation completed at `now`, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.spawned_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// Represents the complete animation context.
#[derive(Debug)]
pub struct Stage {
    config: TerraformConfig,
    viewport: Viewport,
    events: EventLoop<Task>,
    driver: ProgressDriver,
    burst: BurstEffect,
    stars: Vec<Star>,
    tilt: TiltTracker,
    pulse: Option<TaskHandle>,
    ripples: BTreeMap<RippleId, (Ripple, TaskHandle)>,
    next_ripple: u32,
    sound: Box<dyn SoundEffects>,
}

impl Stage {
    /// Creates a stage that reports sound cues through the log.
    ///
    /// # Errors
    ///
    /// Returns the first problem [`TerraformConfig::validate`] finds.
    pub fn new(config: TerraformConfig) -> Result<Self, ConfigError> {
        Self::with_sound_effects(config, Box::new(LoggingSoundEffects))
    }

    /// Creates a stage that forwards sound cues to `sound`.
    ///
    /// # Errors
    ///
    /// Returns the first problem [`TerraformConfig::validate`] finds.
    pub fn with_sound_effects(
        config: TerraformConfig,
        sound: Box<dyn SoundEffects>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let stage_config = config.stage;
        let mut events = EventLoop::new(stage_config.frame_period());
        if let Some(delay_ms) = stage_config.autostart_delay_ms {
            let _ = events.schedule_once(Duration::from_millis(delay_ms), Task::Autostart);
        }

        Ok(Self {
            viewport: stage_config.viewport,
            events,
            driver: ProgressDriver::new(config.driver),
            burst: BurstEffect::new(&config.burst, stage_config.seed),
            stars: terraform_system_starfield::generate(
                stage_config.star_count,
                stage_config.seed ^ STARFIELD_SEED_SALT,
            ),
            tilt: TiltTracker::default(),
            pulse: None,
            ripples: BTreeMap::new(),
            next_ripple: 0,
            sound,
            config,
        })
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });
        let horizon = self.events.horizon_after(dt);
        while let Some(fired) = self.events.pop_due(horizon) {
            self.dispatch(fired.payload, out_events);
        }
        self.events.settle(horizon);
    }

    fn dispatch(&mut self, task: Task, out_events: &mut Vec<Event>) {
        match task {
            Task::Autostart => {
                let _ = self.start_run(out_events);
            }
            Task::ProgressTick => {
                let Some(outcome) = self.driver.tick(&mut self.events) else {
                    return;
                };
                out_events.push(Event::ProgressChanged {
                    progress: outcome.progress,
                });
                if outcome.reached_target {
                    out_events.push(Event::TargetReached {
                        progress: outcome.progress,
                    });
                    self.celebrate(out_events);
                }
                if outcome.finished {
                    log::info!("terraforming reached {}", outcome.progress);
                    out_events.push(Event::RunFinished);
                }
            }
            Task::ParticleFrame(particle) => {
                let step = self
                    .burst
                    .advance(particle, &mut self.events, Task::ParticleFrame);
                if step == ParticleStep::Retired {
                    out_events.push(Event::ParticleRetired { particle });
                }
            }
            Task::PulseEnd => {
                self.pulse = None;
                out_events.push(Event::PulseEnded);
            }
            Task::RippleEnd(ripple) => {
                if self.ripples.remove(&ripple).is_some() {
                    out_events.push(Event::RippleExpired { ripple });
                }
            }
        }
    }

    fn activate(&mut self, control: Control, at: Option<ScreenPoint>, out_events: &mut Vec<Event>) {
        if self.driver.is_animating() {
            log::debug!("ignoring {control:?} activation while animating");
            out_events.push(Event::ActivationIgnored { control });
            return;
        }

        match control {
            Control::Planet => {
                if let Some(at) = at {
                    self.spawn_ripple(at, out_events);
                }
                let _ = self.start_run(out_events);
                self.spawn_burst(self.config.burst.activation_count, out_events);
            }
            Control::Reset => {
                let _ = self.start_run(out_events);
            }
        }
    }

    fn start_run(&mut self, out_events: &mut Vec<Event>) -> bool {
        match self.driver.start(&mut self.events, Task::ProgressTick) {
            StartOutcome::Started { progress } => {
                log::info!(
                    "terraforming started towards {}",
                    self.driver.config().target
                );
                out_events.push(Event::RunStarted);
                out_events.push(Event::ProgressChanged { progress });
                true
            }
            StartOutcome::AlreadyAnimating => false,
        }
    }

    fn celebrate(&mut self, out_events: &mut Vec<Event>) {
        self.spawn_burst(self.config.burst.celebration_count, out_events);

        if let Some(previous) = self.pulse.take() {
            let _ = self.events.cancel(previous);
        }
        let pulse = Duration::from_millis(self.config.stage.pulse_ms);
        self.pulse = Some(self.events.schedule_once(pulse, Task::PulseEnd));
        out_events.push(Event::PulseStarted);

        self.sound.play(SoundCue::Success);
        out_events.push(Event::SoundRequested {
            cue: SoundCue::Success,
        });
    }

    fn spawn_burst(&mut self, count: usize, out_events: &mut Vec<Event>) {
        if count == 0 {
            return;
        }
        let center = self.viewport.center();
        let mut spawned = Vec::with_capacity(count);
        self.burst.burst(
            Vec2::new(center.x, center.y),
            count,
            &mut self.events,
            Task::ParticleFrame,
            &mut spawned,
        );
        out_events.push(Event::BurstSpawned {
            count: spawned.len(),
        });
    }

    fn spawn_ripple(&mut self, at: ScreenPoint, out_events: &mut Vec<Event>) {
        let id = RippleId::new(self.next_ripple);
        self.next_ripple = self.next_ripple.wrapping_add(1);
        let duration = Duration::from_millis(self.config.stage.ripple_ms);
        let ripple = Ripple {
            id,
            at,
            spawned_at: self.events.now(),
            duration,
        };
        let task = self.events.schedule_once(duration, Task::RippleEnd(id));
        let _ = self.ripples.insert(id, (ripple, task));
        out_events.push(Event::RippleSpawned { ripple: id, at });
    }
}

/// Applies the provided command to the stage, mutating state deterministically.
pub fn apply(stage: &mut Stage, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Advance { dt } => stage.advance(dt, out_events),
        Command::Activate { control, at } => stage.activate(control, at, out_events),
        Command::PointerMoved { position } => {
            let _ = stage
                .tilt
                .pointer_moved(position, stage.viewport, stage.driver.phase());
        }
        Command::PointerLeft => {
            let _ = stage.tilt.pointer_left();
        }
        Command::Resize { viewport } => {
            stage.viewport = viewport;
        }
    }
}

/// Query functions that provide read-only access to the stage.
pub mod query {
    use std::time::Duration;

    use super::{Ripple, Stage};
    use terraform_core::{
        Percent, RunPhase, TerraformConfig, Viewport, VisualParameters, WELCOME_BANNER,
    };
    use terraform_system_burst::Particle;
    use terraform_system_starfield::Star;
    use terraform_system_tilt::Tilt;

    /// Retrieves the welcome banner that adapters may display.
    #[must_use]
    pub fn welcome_banner(_stage: &Stage) -> &'static str {
        WELCOME_BANNER
    }

    /// Configuration the stage was built with.
    #[must_use]
    pub fn config(stage: &Stage) -> &TerraformConfig {
        &stage.config
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(stage: &Stage) -> Duration {
        stage.events.now()
    }

    /// Current surface dimensions.
    #[must_use]
    pub fn viewport(stage: &Stage) -> Viewport {
        stage.viewport
    }

    /// Whether a run is in flight.
    #[must_use]
    pub fn phase(stage: &Stage) -> RunPhase {
        stage.driver.phase()
    }

    /// Progress of the current or most recent run.
    #[must_use]
    pub fn progress(stage: &Stage) -> Percent {
        stage.driver.progress()
    }

    /// Presentation parameters for the current progress, derived on demand.
    #[must_use]
    pub fn visuals(stage: &Stage) -> VisualParameters {
        terraform_system_mapper::map_progress(
            stage.driver.progress(),
            stage.config.stage.cloud_count,
        )
    }

    /// Live burst particles in identifier order.
    pub fn particles(stage: &Stage) -> impl Iterator<Item = &Particle> {
        stage.burst.particles()
    }

    /// Number of live burst particles.
    #[must_use]
    pub fn live_particles(stage: &Stage) -> usize {
        stage.burst.live_count()
    }

    /// Number of retired particles waiting in the pool.
    #[must_use]
    pub fn pooled_particles(stage: &Stage) -> usize {
        stage.burst.pool().available()
    }

    /// Number of particle records ever allocated.
    #[must_use]
    pub fn allocated_particles(stage: &Stage) -> usize {
        stage.burst.pool().created()
    }

    /// Background stars.
    #[must_use]
    pub fn stars(stage: &Stage) -> &[Star] {
        &stage.stars
    }

    /// Current container tilt.
    #[must_use]
    pub fn tilt(stage: &Stage) -> Tilt {
        stage.tilt.tilt()
    }

    /// Whether the completion pulse is visible.
    #[must_use]
    pub fn pulse_active(stage: &Stage) -> bool {
        stage.pulse.is_some()
    }

    /// Active click ripples in spawn order.
    pub fn ripples(stage: &Stage) -> impl Iterator<Item = &Ripple> {
        stage.ripples.values().map(|(ripple, _)| ripple)
    }

    /// Number of tasks waiting on the event loop.
    #[must_use]
    pub fn pending_tasks(stage: &Stage) -> usize {
        stage.events.pending()
    }

    /// Whether the driver currently owns a repeating tick task.
    #[must_use]
    pub fn ticking(stage: &Stage) -> bool {
        stage
            .driver
            .timer()
            .is_some_and(|timer| stage.events.is_scheduled(timer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terraform_core::{RunPhase, StageConfig, WELCOME_BANNER};

    fn quiet_config() -> TerraformConfig {
        TerraformConfig {
            stage: StageConfig {
                autostart_delay_ms: None,
                ..StageConfig::default()
            },
            ..TerraformConfig::default()
        }
    }

    #[test]
    fn new_stage_is_idle_with_generated_starfield() {
        let stage = Stage::new(quiet_config()).expect("valid config");

        assert_eq!(query::phase(&stage), RunPhase::Idle);
        assert_eq!(query::stars(&stage).len(), 100);
        assert_eq!(query::pending_tasks(&stage), 0);
        assert_eq!(query::welcome_banner(&stage), WELCOME_BANNER);
    }

    #[test]
    fn autostart_is_scheduled_when_configured() {
        let stage = Stage::new(TerraformConfig::default()).expect("valid config");
        assert_eq!(query::pending_tasks(&stage), 1);
    }

    #[test]
    fn ripple_progress_clamps_to_unit_range() {
        let ripple = Ripple {
            id: RippleId::new(0),
            at: ScreenPoint::new(0.0, 0.0),
            spawned_at: Duration::from_millis(100),
            duration: Duration::from_millis(1_000),
        };

        assert_eq!(ripple.progress(Duration::ZERO), 0.0);
        assert!((ripple.progress(Duration::from_millis(600)) - 0.5).abs() < 1e-4);
        assert_eq!(ripple.progress(Duration::from_secs(5)), 1.0);
    }
}
