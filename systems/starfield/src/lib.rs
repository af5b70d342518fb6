#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic generator for the decorative twinkling starfield.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Uniform};

/// Star placed on the background, positioned relative to the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    /// Horizontal position as a fraction of the viewport width.
    pub x: f32,
    /// Vertical position as a fraction of the viewport height.
    pub y: f32,
    /// Diameter in pixels.
    pub size: f32,
    /// Resting opacity.
    pub opacity: f32,
    /// Duration of one twinkle half-cycle.
    pub twinkle_period: Duration,
}

impl Star {
    /// Opacity after `elapsed` of twinkling, alternating between 0.3 and 1.0.
    #[must_use]
    pub fn twinkle_opacity(&self, elapsed: Duration) -> f32 {
        let period = self.twinkle_period.as_secs_f32();
        if period <= f32::EPSILON {
            return self.opacity;
        }
        let cycles = elapsed.as_secs_f32() / period;
        let phase = cycles.fract();
        let rising = (cycles as u64) % 2 == 0;
        let t = if rising { phase } else { 1.0 - phase };
        TWINKLE_MIN + (TWINKLE_MAX - TWINKLE_MIN) * t
    }
}

const TWINKLE_MIN: f32 = 0.3;
const TWINKLE_MAX: f32 = 1.0;

/// Generates `count` stars from `seed`; identical inputs yield identical skies.
#[must_use]
pub fn generate(count: usize, seed: u64) -> Vec<Star> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let position = Uniform::new(0.0_f32, 1.0);
    let size = Uniform::new(1.0_f32, 3.0);
    let opacity = Uniform::new(0.3_f32, 1.0);
    let twinkle_seconds = Uniform::new(3.0_f32, 8.0);

    (0..count)
        .map(|_| Star {
            size: size.sample(&mut rng),
            y: position.sample(&mut rng),
            x: position.sample(&mut rng),
            opacity: opacity.sample(&mut rng),
            twinkle_period: Duration::from_secs_f32(twinkle_seconds.sample(&mut rng)),
        })
        .collect()
}
