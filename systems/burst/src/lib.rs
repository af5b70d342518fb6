#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Particle burst effect with pooled particle records.
//!
//! A burst spawns particles on a ring around a centre point and gives each
//! one its own frame task on the stage's event loop. Every frame moves the
//! particle by its velocity and fades it linearly; when the lifetime elapses
//! the particle is detached and handed back to the [`ParticlePool`].

mod pool;

use std::{collections::BTreeMap, f32::consts::TAU, time::Duration};

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};
use terraform_core::{BurstConfig, ParticleId, UniformRange};
use terraform_scheduler::{EventLoop, TaskHandle};

pub use pool::{Particle, ParticlePool};

const ROTATION_PERIOD_MS: f32 = 100.0;

/// Outcome of advancing a single particle by one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleStep {
    /// The particle moved and another frame was requested.
    Moved,
    /// The particle's lifetime elapsed; it was detached and pooled.
    Retired,
    /// The identifier no longer refers to a live particle.
    Unknown,
}

#[derive(Debug)]
struct Samplers {
    angle: Uniform<f32>,
    radius: Uniform<f32>,
    size: Uniform<f32>,
    hue: Uniform<f32>,
    opacity: Uniform<f32>,
    speed: Uniform<f32>,
    rotation: Uniform<f32>,
    lifetime_ms: Uniform<f32>,
}

impl Samplers {
    fn from_config(config: &BurstConfig) -> Self {
        let symmetric = |bound: f32| Uniform::new_inclusive(-bound.abs(), bound.abs());
        Self {
            angle: Uniform::new(0.0, TAU),
            radius: inclusive(config.ring_radius),
            size: inclusive(config.size),
            hue: inclusive(config.hue),
            opacity: inclusive(config.opacity),
            speed: symmetric(config.max_speed),
            rotation: symmetric(config.max_rotation_speed),
            lifetime_ms: inclusive(config.lifetime_ms),
        }
    }
}

fn inclusive(range: UniformRange) -> Uniform<f32> {
    Uniform::new_inclusive(range.min, range.max.max(range.min))
}

#[derive(Debug)]
struct LiveParticle {
    particle: Particle,
    task: TaskHandle,
}

/// Spawns, animates and recycles burst particles.
#[derive(Debug)]
pub struct BurstEffect {
    samplers: Samplers,
    rng: ChaCha8Rng,
    pool: ParticlePool,
    live: BTreeMap<ParticleId, LiveParticle>,
    next_id: u32,
}

impl BurstEffect {
    /// Creates a burst effect sampling from `config` with a seeded generator.
    #[must_use]
    pub fn new(config: &BurstConfig, seed: u64) -> Self {
        Self {
            samplers: Samplers::from_config(config),
            rng: ChaCha8Rng::seed_from_u64(seed),
            pool: ParticlePool::new(),
            live: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Spawns `count` particles around `center`, scheduling one frame task each.
    ///
    /// `frame_task` builds the event loop payload that must be routed back to
    /// [`Self::advance`] for the given particle. Identifiers of the spawned
    /// particles are appended to `out`.
    pub fn burst<T, F>(
        &mut self,
        center: Vec2,
        count: usize,
        events: &mut EventLoop<T>,
        frame_task: F,
        out: &mut Vec<ParticleId>,
    ) where
        T: Clone,
        F: Fn(ParticleId) -> T,
    {
        let now = events.now();
        for _ in 0..count {
            let particle = self.spawn(center, now);
            let id = particle.id;
            let task = events.request_frame_until(particle.expires_at(), frame_task(id));
            let _ = self.live.insert(id, LiveParticle { particle, task });
            out.push(id);
        }
        log::trace!("burst spawned {count} particles, {} live", self.live.len());
    }

    /// Advances the particle by one frame at the loop's current time.
    pub fn advance<T, F>(
        &mut self,
        id: ParticleId,
        events: &mut EventLoop<T>,
        frame_task: F,
    ) -> ParticleStep
    where
        T: Clone,
        F: Fn(ParticleId) -> T,
    {
        let now = events.now();
        let Some(live) = self.live.get_mut(&id) else {
            return ParticleStep::Unknown;
        };

        let particle = &mut live.particle;
        let elapsed = now.saturating_sub(particle.born_at);
        if elapsed >= particle.lifetime {
            if let Some(mut retired) = self.live.remove(&id) {
                let _ = events.cancel(retired.task);
                retired.particle.opacity = 0.0;
                self.pool.release(retired.particle);
            }
            return ParticleStep::Retired;
        }

        let progress = elapsed.as_secs_f32() / particle.lifetime.as_secs_f32();
        particle.position += particle.velocity;
        particle.rotation_degrees =
            particle.rotation_speed * elapsed.as_secs_f32() * 1_000.0 / ROTATION_PERIOD_MS;
        particle.opacity = particle.initial_opacity * (1.0 - progress);
        live.task = events.request_frame_until(particle.expires_at(), frame_task(id));

        ParticleStep::Moved
    }

    /// Looks up a live particle.
    #[must_use]
    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.live.get(&id).map(|live| &live.particle)
    }

    /// Iterator over live particles in identifier order.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.live.values().map(|live| &live.particle)
    }

    /// Number of particles currently visible.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Pool holding retired particles.
    #[must_use]
    pub const fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    fn spawn(&mut self, center: Vec2, now: Duration) -> Particle {
        let mut particle = self.pool.acquire();
        let samplers = &self.samplers;
        let rng = &mut self.rng;

        let angle = samplers.angle.sample(rng);
        let distance = samplers.radius.sample(rng);
        let size = samplers.size.sample(rng);
        let hue = samplers.hue.sample(rng);
        let opacity = samplers.opacity.sample(rng);
        let velocity = Vec2::new(samplers.speed.sample(rng), samplers.speed.sample(rng));
        let rotation_speed = samplers.rotation.sample(rng);
        let lifetime_ms = samplers.lifetime_ms.sample(rng);

        particle.id = ParticleId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        particle.position = center + Vec2::new(angle.cos(), angle.sin()) * distance;
        particle.velocity = velocity;
        particle.size = size;
        particle.hue = hue;
        particle.initial_opacity = opacity;
        particle.opacity = opacity;
        particle.rotation_speed = rotation_speed;
        particle.rotation_degrees = 0.0;
        particle.born_at = now;
        particle.lifetime = Duration::from_secs_f32(lifetime_ms / 1_000.0);
        particle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_particles_sit_on_the_configured_ring() {
        let config = BurstConfig::default();
        let mut effect = BurstEffect::new(&config, 7);
        let mut events: EventLoop<ParticleId> = EventLoop::new(Duration::from_millis(16));
        let center = Vec2::new(480.0, 480.0);
        let mut spawned = Vec::new();

        effect.burst(center, 40, &mut events, |id| id, &mut spawned);

        for particle in effect.particles() {
            let distance = particle.position.distance(center);
            assert!((149.9..=200.1).contains(&distance), "distance {distance}");
            assert!((2.0..=6.0).contains(&particle.size));
            assert!((180.0..=220.0).contains(&particle.hue));
            assert!(particle.velocity.x.abs() <= 1.5 && particle.velocity.y.abs() <= 1.5);
            assert!(particle.lifetime >= Duration::from_millis(499));
            assert!(particle.lifetime <= Duration::from_millis(2_001));
        }
    }

    #[test]
    fn advancing_unknown_particle_reports_unknown() {
        let mut effect = BurstEffect::new(&BurstConfig::default(), 1);
        let mut events: EventLoop<ParticleId> = EventLoop::new(Duration::from_millis(16));

        let step = effect.advance(ParticleId::new(99), &mut events, |id| id);
        assert_eq!(step, ParticleStep::Unknown);
        assert_eq!(events.pending(), 0);
    }
}
