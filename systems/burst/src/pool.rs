//! Free list recycling particle records between bursts.

use glam::Vec2;
use std::time::Duration;
use terraform_core::ParticleId;

/// Short-lived glowing particle spawned by a burst.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Identifier of the particle while it is live.
    pub id: ParticleId,
    /// Screen-space position of the particle's top-left corner.
    pub position: Vec2,
    /// Displacement applied on every display frame.
    pub velocity: Vec2,
    /// Diameter in pixels.
    pub size: f32,
    /// Hue of the particle's fill and glow, in degrees.
    pub hue: f32,
    /// Opacity at spawn.
    pub initial_opacity: f32,
    /// Current opacity, falling linearly to zero over the lifetime.
    pub opacity: f32,
    /// Rotation rate in degrees per 100 ms.
    pub rotation_speed: f32,
    /// Current rotation in degrees.
    pub rotation_degrees: f32,
    /// Virtual time at which the particle was spawned.
    pub born_at: Duration,
    /// Time the particle stays visible.
    pub lifetime: Duration,
}

impl Particle {
    fn blank() -> Self {
        Self {
            id: ParticleId::new(0),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: 0.0,
            hue: 0.0,
            initial_opacity: 0.0,
            opacity: 0.0,
            rotation_speed: 0.0,
            rotation_degrees: 0.0,
            born_at: Duration::ZERO,
            lifetime: Duration::ZERO,
        }
    }

    /// Virtual time at which the particle expires.
    #[must_use]
    pub fn expires_at(&self) -> Duration {
        self.born_at.saturating_add(self.lifetime)
    }
}

/// Unbounded free list with acquire-or-create semantics.
#[derive(Debug, Default)]
pub struct ParticlePool {
    free: Vec<Particle>,
    created: usize,
}

impl ParticlePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a recycled particle, allocating a fresh one only when the pool is empty.
    pub fn acquire(&mut self) -> Particle {
        match self.free.pop() {
            Some(particle) => particle,
            None => {
                self.created += 1;
                Particle::blank()
            }
        }
    }

    /// Returns a particle to the pool for later reuse.
    pub fn release(&mut self, particle: Particle) {
        self.free.push(particle);
    }

    /// Number of particles waiting for reuse.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Number of particles ever allocated by the pool.
    #[must_use]
    pub fn created(&self) -> usize {
        self.created
    }
}
