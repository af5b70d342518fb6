//! Window-less driver that advances the stage at the display frame rate.

use std::time::Duration;

use anyhow::{bail, Result};
use terraform_core::{Command, Event, RunPhase, TerraformConfig};
use terraform_stage::{apply, query, Stage};

/// Tally of what happened during a headless session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct HeadlessSummary {
    pub(crate) frames: u64,
    pub(crate) runs_started: u32,
    pub(crate) targets_reached: u32,
    pub(crate) particles_spawned: usize,
    pub(crate) particles_retired: usize,
    pub(crate) ignored_activations: u32,
}

impl HeadlessSummary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::RunStarted => self.runs_started += 1,
            Event::TargetReached { .. } => self.targets_reached += 1,
            Event::BurstSpawned { count } => self.particles_spawned += count,
            Event::ParticleRetired { .. } => self.particles_retired += 1,
            Event::ActivationIgnored { .. } => self.ignored_activations += 1,
            _ => {}
        }
    }
}

/// Advances `stage` one frame period at a time until `duration` has elapsed.
pub(crate) fn run(stage: &mut Stage, duration: Duration) -> HeadlessSummary {
    let frame = query::config(stage).stage.frame_period();
    let mut summary = HeadlessSummary::default();
    let mut remaining = duration;
    let mut events = Vec::new();

    while !remaining.is_zero() {
        let dt = frame.min(remaining);
        remaining -= dt;
        summary.frames += 1;

        apply(stage, Command::Advance { dt }, &mut events);
        for event in events.drain(..) {
            log_event(stage, &event);
            summary.record(&event);
        }
    }

    log::info!(
        "headless session ended at {:?} after {} frame(s): {} run(s), {} ignored activation(s), {} target(s) reached, {} particle(s) spawned, {} retired, phase {:?}",
        query::now(stage),
        summary.frames,
        summary.runs_started,
        summary.ignored_activations,
        summary.targets_reached,
        summary.particles_spawned,
        summary.particles_retired,
        query::phase(stage),
    );
    summary
}

/// Virtual time an autostarted run needs to reach its target, or `None` without autostart.
pub(crate) fn autostart_completion(config: &TerraformConfig) -> Option<Duration> {
    let delay = Duration::from_millis(config.stage.autostart_delay_ms?);
    let driver = config.driver;
    let target = u32::from(driver.target.get());
    let step = u32::from(driver.step);
    let ticks = (target + step - 1) / step;
    Some(delay + driver.interval() * ticks)
}

/// Fails when the session was long enough for the autostarted run to finish but it never did.
pub(crate) fn verify(
    summary: &HeadlessSummary,
    config: &TerraformConfig,
    duration: Duration,
) -> Result<()> {
    match autostart_completion(config) {
        Some(needed) if needed <= duration && summary.targets_reached == 0 => bail!(
            "autostarted run did not reach {} within {:?} (needs {:?}, {} run(s) started)",
            config.driver.target,
            duration,
            needed,
            summary.runs_started,
        ),
        _ => Ok(()),
    }
}

fn log_event(stage: &Stage, event: &Event) {
    match event {
        Event::TimeAdvanced { .. } | Event::ParticleRetired { .. } => {
            log::trace!("{event:?}");
        }
        Event::ProgressChanged { progress } if query::phase(stage) == RunPhase::Animating => {
            log::debug!("progress {progress}");
        }
        _ => log::debug!("{event:?}"),
    }
}
