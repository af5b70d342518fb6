use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use terraform_core::{BurstConfig, ParticleId};
use terraform_scheduler::EventLoop;
use terraform_system_burst::{BurstEffect, ParticleStep};

const FRAME: Duration = Duration::from_micros(16_667);
const CENTER: Vec2 = Vec2::new(480.0, 480.0);

#[derive(Default)]
struct Ledger {
    frames: BTreeMap<ParticleId, u32>,
    retired_at: BTreeMap<ParticleId, Duration>,
}

fn run_for(
    effect: &mut BurstEffect,
    events: &mut EventLoop<ParticleId>,
    dt: Duration,
    ledger: &mut Ledger,
) {
    let horizon = events.horizon_after(dt);
    while let Some(fired) = events.pop_due(horizon) {
        match effect.advance(fired.payload, events, |id| id) {
            ParticleStep::Moved => {
                *ledger.frames.entry(fired.payload).or_default() += 1;
            }
            ParticleStep::Retired => {
                let _ = ledger.retired_at.insert(fired.payload, fired.at);
            }
            ParticleStep::Unknown => panic!("stale frame task for {:?}", fired.payload),
        }
    }
    events.settle(horizon);
}

#[test]
fn burst_spawns_exactly_the_requested_particles() {
    let mut effect = BurstEffect::new(&BurstConfig::default(), 0x5eed);
    let mut events = EventLoop::new(FRAME);
    let mut spawned = Vec::new();

    effect.burst(CENTER, 150, &mut events, |id| id, &mut spawned);

    assert_eq!(spawned.len(), 150);
    assert_eq!(effect.live_count(), 150);
    assert_eq!(events.pending(), 150, "one frame task per particle");
    assert_eq!(effect.pool().created(), 150);
}

#[test]
fn every_particle_fades_out_and_returns_to_the_pool_at_its_lifetime() {
    let mut effect = BurstEffect::new(&BurstConfig::default(), 0x5eed);
    let mut events = EventLoop::new(FRAME);
    let mut spawned = Vec::new();
    effect.burst(CENTER, 150, &mut events, |id| id, &mut spawned);

    let lifetimes: BTreeMap<ParticleId, Duration> = effect
        .particles()
        .map(|particle| (particle.id, particle.expires_at()))
        .collect();

    let mut ledger = Ledger::default();
    run_for(&mut effect, &mut events, Duration::from_millis(1_000), &mut ledger);

    for particle in effect.particles() {
        assert!(particle.opacity < particle.initial_opacity);
        assert!(particle.opacity > 0.0);
    }

    run_for(&mut effect, &mut events, Duration::from_millis(1_500), &mut ledger);

    assert_eq!(effect.live_count(), 0);
    assert_eq!(events.pending(), 0);
    assert_eq!(effect.pool().available(), 150);
    assert_eq!(ledger.retired_at.len(), 150);
    for (id, retired_at) in &ledger.retired_at {
        assert_eq!(Some(retired_at), lifetimes.get(id), "particle {id:?} retired late");
        assert!(ledger.frames.get(id).copied().unwrap_or(0) > 0);
    }
}

#[test]
fn opacity_falls_linearly_towards_zero() {
    let mut effect = BurstEffect::new(&BurstConfig::default(), 3);
    let mut events = EventLoop::new(FRAME);
    let mut spawned = Vec::new();
    effect.burst(CENTER, 1, &mut events, |id| id, &mut spawned);

    let id = spawned[0];
    let (initial, lifetime) = {
        let particle = effect.particle(id).expect("particle is live");
        (particle.initial_opacity, particle.lifetime)
    };

    let mut ledger = Ledger::default();
    let mut previous = initial;
    while effect.particle(id).is_some() {
        run_for(&mut effect, &mut events, FRAME, &mut ledger);
        if let Some(particle) = effect.particle(id) {
            let elapsed = events.now().saturating_sub(particle.born_at);
            let expected = initial * (1.0 - elapsed.as_secs_f32() / lifetime.as_secs_f32());
            assert!(particle.opacity <= previous);
            assert!((particle.opacity - expected).abs() < 0.05);
            previous = particle.opacity;
        }
    }

    assert_eq!(ledger.retired_at.get(&id), Some(&(lifetime)));
}

#[test]
fn repeated_bursts_reuse_pooled_particles() {
    let mut effect = BurstEffect::new(&BurstConfig::default(), 11);
    let mut events = EventLoop::new(FRAME);
    let mut ledger = Ledger::default();

    for _ in 0..4 {
        let mut spawned = Vec::new();
        effect.burst(CENTER, 30, &mut events, |id| id, &mut spawned);
        run_for(&mut effect, &mut events, Duration::from_secs(3), &mut ledger);
    }

    assert_eq!(effect.pool().created(), 30, "later bursts must recycle");
    assert_eq!(effect.pool().available(), 30);
    assert_eq!(ledger.retired_at.len(), 120);
}

#[test]
fn seeded_bursts_replay_identically() {
    let snapshot = |seed: u64| {
        let mut effect = BurstEffect::new(&BurstConfig::default(), seed);
        let mut events = EventLoop::new(FRAME);
        let mut spawned = Vec::new();
        effect.burst(CENTER, 20, &mut events, |id| id, &mut spawned);
        let mut ledger = Ledger::default();
        run_for(&mut effect, &mut events, Duration::from_millis(250), &mut ledger);
        effect
            .particles()
            .map(|particle| (particle.id, particle.position, particle.opacity))
            .collect::<Vec<_>>()
    };

    assert_eq!(snapshot(42), snapshot(42));
    assert_ne!(snapshot(42), snapshot(43));
}
