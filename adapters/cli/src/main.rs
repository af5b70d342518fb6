#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the terraforming progress indicator.

mod config;
mod headless;
mod scene;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use terraform_core::Event;
use terraform_rendering::{Color, Presentation, RenderingBackend, Scene};
use terraform_rendering_macroquad::MacroquadBackend;
use terraform_stage::{apply, query, Stage};

const WINDOW_TITLE: &str = "Terraforming";

/// Animated planet-terraforming progress indicator.
#[derive(Debug, Parser)]
#[command(name = "terraform", version, about)]
struct CliArgs {
    /// Run the animation without opening a window and log what happens.
    #[arg(long)]
    headless: bool,

    /// Virtual time simulated in headless mode, in milliseconds.
    #[arg(long, default_value_t = 5_000)]
    duration_ms: u64,

    /// TOML file overriding the default tuning.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed for particle and starfield generation.
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the run that starts on its own shortly after launch.
    #[arg(long)]
    no_autostart: bool,

    /// Synchronise presentation with the display refresh rate.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    vsync: bool,
}

/// Entry point for the terraforming command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let mut config = config::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.stage.seed = seed;
    }
    if args.no_autostart {
        config.stage.autostart_delay_ms = None;
    }

    let mut stage = Stage::new(config).context("invalid configuration")?;
    log::info!("{}", query::welcome_banner(&stage));

    if args.headless {
        let duration = Duration::from_millis(args.duration_ms);
        let summary = headless::run(&mut stage, duration);
        return headless::verify(&summary, query::config(&stage), duration);
    }

    run_windowed(stage, args.vsync)
}

fn run_windowed(mut stage: Stage, vsync: bool) -> Result<()> {
    let viewport = query::viewport(&stage);
    let mut initial = Scene::new(scene::planet_for(viewport)?);
    scene::populate_scene(&stage, &mut initial)?;
    let presentation = Presentation::new(WINDOW_TITLE, Color::from_rgb_u8(6, 10, 26), initial)
        .with_window_size(Vec2::new(viewport.width, viewport.height));

    let mut events = Vec::new();
    MacroquadBackend::new()
        .with_vsync(vsync)
        .run(presentation, move |dt, input, scene| {
            for command in scene::commands_for(dt, &input) {
                apply(&mut stage, command, &mut events);
            }
            for event in events.drain(..) {
                if !matches!(
                    event,
                    Event::TimeAdvanced { .. } | Event::ParticleRetired { .. }
                ) {
                    log::debug!("{event:?}");
                }
            }
            if let Err(error) = scene::populate_scene(&stage, scene) {
                log::error!("failed to update scene: {error:#}");
            }
        })
        .context("rendering backend failed")
}
