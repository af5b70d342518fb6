#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the terraforming indicator.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature, so sound cues stay a logging hook.
//!
//! The reset control and progress readout use Macroquad's immediate-mode UI.
//! All UI-specific calls live inside the local `ui` module.

mod ui;

use self::ui::{draw_control_panel_ui, ControlPanelUiContext, ControlPanelUiResult};
use anyhow::Result;
use glam::Vec2;
use macroquad::math::Vec2 as MacroquadVec2;
use macroquad::{
    color::WHITE,
    input::{is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton},
};
use std::{f32::consts::TAU, time::Duration};
use terraform_rendering::{Color, FrameInput, PlanetState, Presentation, RenderingBackend, Scene};

const LAND_COLOR: Color = Color::from_rgb_u8(92, 74, 58);
const CONTROL_PANEL_BACKGROUND: Color = Color::new(0.04, 0.07, 0.14, 0.85);
const CONTROL_PANEL_SIZE: Vec2 = Vec2::new(300.0, 150.0);
const CONTROL_PANEL_MARGIN: f32 = 16.0;
const ATMOSPHERE_THICKNESS: f32 = 14.0;
const WAVE_AMPLITUDE: f32 = 4.0;
const WAVE_SEGMENTS: usize = 48;
const TILT_OFFSET_PER_DEGREE: f32 = 2.0;

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlInputState {
    reset_latched: bool,
}

impl ControlInputState {
    /// Returns whether the UI requested a reset and clears the latch so the
    /// action fires only once.
    pub fn take_reset(&mut self) -> bool {
        let latched = self.reset_latched;
        self.reset_latched = false;
        latched
    }

    /// Records that the reset button was pressed this frame.
    pub fn register_reset(&mut self) {
        self.reset_latched = true;
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the render loop.
    quit_requested: bool,
    /// `R` restarts the terraforming run.
    reset_pressed: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            reset_pressed: is_key_pressed(KeyCode::R),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Presentation {
            window_title,
            clear_color,
            scene,
            window_size,
        } = presentation;

        let (window_width, window_height) = window_dimensions(window_size);
        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = self.swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut control_input = ControlInputState::default();
            let mut observer = PointerObserver::default();
            let mut elapsed = Duration::ZERO;

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                elapsed = elapsed.saturating_add(frame_dt);

                let (cursor_x, cursor_y) = mouse_position();
                let observation = Observation {
                    screen,
                    cursor: Vec2::new(cursor_x, cursor_y),
                    clicked: is_mouse_button_pressed(MouseButton::Left),
                    reset_pressed: control_input.take_reset() || keyboard.reset_pressed,
                    over_control_panel: control_panel_bounds(screen)
                        .contains(Vec2::new(cursor_x, cursor_y)),
                };
                let frame_input = observer.observe(&scene, observation);

                update_scene(frame_dt, frame_input, &mut scene);

                draw_stars(&scene, screen);
                draw_planet(&scene, elapsed);
                draw_ripples(&scene);
                draw_particles(&scene);

                let bounds = control_panel_bounds(screen);
                let mut control_panel_ui = macroquad::ui::root_ui();
                let ControlPanelUiResult { reset_pressed } = draw_control_panel_ui(
                    &mut control_panel_ui,
                    ControlPanelUiContext {
                        origin: MacroquadVec2::new(bounds.origin.x, bounds.origin.y),
                        size: MacroquadVec2::new(bounds.size.x, bounds.size.y),
                        background: to_macroquad_color(CONTROL_PANEL_BACKGROUND),
                        label: scene.label.as_str(),
                        loading: scene.state == PlanetState::Loading,
                    },
                );
                if reset_pressed {
                    control_input.register_reset();
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Bounds {
    origin: Vec2,
    size: Vec2,
}

impl Bounds {
    fn contains(&self, point: Vec2) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }
}

fn control_panel_bounds(screen: Vec2) -> Bounds {
    let size = CONTROL_PANEL_SIZE.min(screen);
    Bounds {
        origin: Vec2::new(
            CONTROL_PANEL_MARGIN.min(screen.x - size.x).max(0.0),
            (screen.y - size.y - CONTROL_PANEL_MARGIN).max(0.0),
        ),
        size,
    }
}

/// Raw per-frame observations gathered from macroquad.
#[derive(Clone, Copy, Debug)]
struct Observation {
    screen: Vec2,
    cursor: Vec2,
    clicked: bool,
    reset_pressed: bool,
    over_control_panel: bool,
}

/// Converts raw observations into edge-triggered frame input.
#[derive(Debug, Default)]
struct PointerObserver {
    last_screen: Option<Vec2>,
    pointer_inside: bool,
}

impl PointerObserver {
    fn observe(&mut self, scene: &Scene, observation: Observation) -> FrameInput {
        let mut input = FrameInput {
            reset_pressed: observation.reset_pressed,
            ..FrameInput::default()
        };

        if self.last_screen != Some(observation.screen) {
            input.resized = Some(observation.screen);
            self.last_screen = Some(observation.screen);
        }

        let inside = observation.cursor.x >= 0.0
            && observation.cursor.y >= 0.0
            && observation.cursor.x < observation.screen.x
            && observation.cursor.y < observation.screen.y;
        if inside {
            input.pointer = Some(observation.cursor);
        } else if self.pointer_inside {
            input.pointer_left = true;
        }
        self.pointer_inside = inside;

        if observation.clicked
            && !observation.over_control_panel
            && scene.planet.contains(observation.cursor)
        {
            input.planet_clicked = Some(scene.planet.to_local(observation.cursor));
        }

        input
    }
}

fn window_dimensions(size: Vec2) -> (i32, i32) {
    let dimension = |length: f32| length.round().max(1.0) as i32;
    (dimension(size.x), dimension(size.y))
}

fn tilted_center(scene: &Scene) -> Vec2 {
    scene.lifted_center()
        + Vec2::new(
            -scene.tilt.rotate_y_degrees,
            -scene.tilt.rotate_x_degrees,
        ) * TILT_OFFSET_PER_DEGREE
}

fn draw_stars(scene: &Scene, screen: Vec2) {
    for star in &scene.stars {
        let position = star.position * screen;
        macroquad::shapes::draw_circle(
            position.x,
            position.y,
            star.size * 0.5,
            to_macroquad_color(Color::new(1.0, 1.0, 1.0, star.opacity)),
        );
    }
}

fn draw_planet(scene: &Scene, elapsed: Duration) {
    let center = tilted_center(scene);
    let radius = scene.planet.radius;

    if scene.atmosphere_opacity > 0.0 {
        let glow = Color::from_rgb_u8(120, 200, 255).with_alpha(scene.atmosphere_opacity);
        macroquad::shapes::draw_circle_lines(
            center.x,
            center.y,
            radius + ATMOSPHERE_THICKNESS * 0.5,
            ATMOSPHERE_THICKNESS,
            to_macroquad_color(glow),
        );
    }

    macroquad::shapes::draw_circle(center.x, center.y, radius, to_macroquad_color(LAND_COLOR));
    draw_ocean(scene, center);
    draw_waves(scene, center, elapsed);
    draw_clouds(scene, center);

    if scene.state == PlanetState::Celebrating {
        macroquad::shapes::draw_circle_lines(
            center.x,
            center.y,
            radius + ATMOSPHERE_THICKNESS * 1.5,
            4.0,
            to_macroquad_color(Color::from_rgb_u8(170, 240, 255).with_alpha(0.8)),
        );
    }
}

fn draw_ocean(scene: &Scene, center: Vec2) {
    let radius = scene.planet.radius;
    let waterline = center.y + radius - 2.0 * radius * scene.ocean.fill.clamp(0.0, 1.0);
    let color = to_macroquad_color(scene.ocean.color);

    let mut y = waterline.floor();
    let bottom = center.y + radius;
    while y < bottom {
        if let Some(half_width) = chord_half_width(radius, y + 0.5 - center.y) {
            macroquad::shapes::draw_rectangle(
                center.x - half_width,
                y,
                half_width * 2.0,
                1.0,
                color,
            );
        }
        y += 1.0;
    }
}

fn draw_waves(scene: &Scene, center: Vec2, elapsed: Duration) {
    if scene.ocean.fill <= 0.0 {
        return;
    }
    let radius = scene.planet.radius;
    let waterline = center.y + radius - 2.0 * radius * scene.ocean.fill.clamp(0.0, 1.0);
    let Some(half_width) = chord_half_width(radius, waterline - center.y) else {
        return;
    };

    for (layer, wave) in scene.waves.iter().enumerate() {
        let period = wave.period.as_secs_f32();
        let phase = if period > f32::EPSILON {
            (wave.phase + elapsed.as_secs_f32() / period).fract()
        } else {
            wave.phase
        };
        let color = scene
            .ocean
            .color
            .lighten(0.25 + 0.15 * layer as f32)
            .with_alpha(0.35);
        let points = wave_points(center.x - half_width, half_width * 2.0, waterline, phase, layer);
        for segment in points.windows(2) {
            macroquad::shapes::draw_line(
                segment[0].x,
                segment[0].y,
                segment[1].x,
                segment[1].y,
                2.0,
                to_macroquad_color(color),
            );
        }
    }
}

fn wave_points(left: f32, width: f32, waterline: f32, phase: f32, layer: usize) -> Vec<Vec2> {
    let offset = layer as f32 * 0.33;
    (0..=WAVE_SEGMENTS)
        .map(|segment| {
            let t = segment as f32 / WAVE_SEGMENTS as f32;
            let angle = (t * 2.0 + phase + offset) * TAU;
            Vec2::new(
                left + width * t,
                waterline + angle.sin() * WAVE_AMPLITUDE - layer as f32 * 2.0,
            )
        })
        .collect()
}

fn chord_half_width(radius: f32, offset_from_center: f32) -> Option<f32> {
    let squared = radius * radius - offset_from_center * offset_from_center;
    (squared > 0.0).then(|| squared.sqrt())
}

fn draw_clouds(scene: &Scene, center: Vec2) {
    let radius = scene.planet.radius;
    for cloud in &scene.clouds {
        let position = center + cloud.offset * radius;
        macroquad::shapes::draw_circle(
            position.x,
            position.y,
            cloud.scale * radius,
            to_macroquad_color(Color::new(1.0, 1.0, 1.0, cloud.opacity)),
        );
    }
}

fn draw_ripples(scene: &Scene) {
    let tilt_offset = tilted_center(scene) - scene.planet.center;
    for ripple in &scene.ripples {
        let center = ripple.center + tilt_offset;
        let fade = 1.0 - ripple.progress.clamp(0.0, 1.0);
        macroquad::shapes::draw_circle_lines(
            center.x,
            center.y,
            4.0 + ripple.progress * scene.planet.radius * 0.5,
            2.0,
            macroquad::color::Color::new(WHITE.r, WHITE.g, WHITE.b, fade * 0.8),
        );
    }
}

fn draw_particles(scene: &Scene) {
    for particle in &scene.particles {
        macroquad::shapes::draw_poly(
            particle.position.x,
            particle.position.y,
            4,
            particle.size * 0.5,
            particle.rotation_degrees,
            to_macroquad_color(particle.color),
        );
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
