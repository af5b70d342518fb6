//! Translation between the stage and the rendering contract.

use std::{f32::consts::TAU, time::Duration};

use anyhow::Result;
use glam::Vec2;
use terraform_core::{Command, Control, RunPhase, ScreenPoint, Viewport};
use terraform_rendering::{
    CloudPresentation, Color, FrameInput, OceanPresentation, ParticlePresentation,
    PlanetPresentation, PlanetState, RipplePresentation, Scene, StarPresentation,
    TiltPresentation, WavePresentation, OCEAN_BASE,
};
use terraform_stage::{query, Stage};

const PLANET_RADIUS_FRACTION: f32 = 0.3;
const CLOUD_ORBIT: f32 = 0.55;
const CLOUD_SCALE: f32 = 0.16;
const CLOUD_DRIFT_PER_SECOND: f32 = 0.02;
const GOLDEN_ANGLE: f32 = 2.399_963;

/// Planet sized and centred for the given viewport.
pub(crate) fn planet_for(viewport: Viewport) -> Result<PlanetPresentation> {
    let center = viewport.center();
    let radius = viewport.width.min(viewport.height) * PLANET_RADIUS_FRACTION;
    Ok(PlanetPresentation::new(Vec2::new(center.x, center.y), radius)?)
}

/// Converts one frame of adapter input into stage commands, in application order.
pub(crate) fn commands_for(dt: Duration, input: &FrameInput) -> Vec<Command> {
    let mut commands = Vec::new();

    if let Some(size) = input.resized {
        commands.push(Command::Resize {
            viewport: Viewport::new(size.x, size.y),
        });
    }
    if let Some(pointer) = input.pointer {
        commands.push(Command::PointerMoved {
            position: ScreenPoint::new(pointer.x, pointer.y),
        });
    }
    if input.pointer_left {
        commands.push(Command::PointerLeft);
    }
    if let Some(at) = input.planet_clicked {
        commands.push(Command::Activate {
            control: Control::Planet,
            at: Some(ScreenPoint::new(at.x, at.y)),
        });
    }
    if input.reset_pressed {
        commands.push(Command::Activate {
            control: Control::Reset,
            at: None,
        });
    }
    commands.push(Command::Advance { dt });

    commands
}

/// Rewrites `scene` from the stage's current state.
pub(crate) fn populate_scene(stage: &Stage, scene: &mut Scene) -> Result<()> {
    let viewport = query::viewport(stage);
    scene.planet = planet_for(viewport)?;

    let visuals = query::visuals(stage);
    scene.ocean = OceanPresentation {
        color: OCEAN_BASE
            .hue_rotate(visuals.ocean_filter.hue_rotate_degrees)
            .saturate(visuals.ocean_filter.saturate),
        fill: visuals.ocean_fill,
    };

    let layer_count = visuals.wave_speeds.layers().len() as f32;
    scene.waves = visuals
        .wave_speeds
        .layers()
        .iter()
        .enumerate()
        .map(|(layer, period)| WavePresentation {
            period: *period,
            phase: layer as f32 / layer_count,
        })
        .collect();
    scene.atmosphere_opacity = visuals.atmosphere_opacity;

    let now = query::now(stage);
    let drift = now.as_secs_f32() * CLOUD_DRIFT_PER_SECOND * TAU;
    scene.clouds = visuals
        .cloud_opacities
        .iter()
        .enumerate()
        .map(|(index, opacity)| {
            let angle = index as f32 * GOLDEN_ANGLE + drift;
            CloudPresentation {
                offset: Vec2::new(angle.cos(), angle.sin()) * CLOUD_ORBIT,
                scale: CLOUD_SCALE,
                opacity: *opacity,
            }
        })
        .collect();

    scene.particles = query::particles(stage)
        .map(|particle| ParticlePresentation {
            position: particle.position,
            size: particle.size,
            color: Color::from_hsl(particle.hue, 100.0, 70.0, particle.opacity),
            rotation_degrees: particle.rotation_degrees,
        })
        .collect();

    scene.stars = query::stars(stage)
        .iter()
        .map(|star| StarPresentation {
            position: Vec2::new(star.x, star.y),
            size: star.size,
            opacity: star.twinkle_opacity(now),
        })
        .collect();

    let origin = scene.planet.origin();
    scene.ripples = query::ripples(stage)
        .map(|ripple| RipplePresentation {
            center: origin + Vec2::new(ripple.at.x, ripple.at.y),
            progress: ripple.progress(now),
        })
        .collect();

    scene.state = if query::pulse_active(stage) {
        PlanetState::Celebrating
    } else if query::phase(stage) == RunPhase::Animating {
        PlanetState::Loading
    } else {
        PlanetState::Resting
    };

    let tilt = query::tilt(stage);
    scene.tilt = TiltPresentation {
        rotate_x_degrees: tilt.rotate_x_degrees,
        rotate_y_degrees: tilt.rotate_y_degrees,
        lift: tilt.lift,
    };
    scene.label = visuals.label();

    Ok(())
}
