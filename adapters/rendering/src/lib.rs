#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for terraforming adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates a color from hue in degrees and saturation/lightness percentages.
    #[must_use]
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        let hue = hue.rem_euclid(360.0) / 60.0;
        let saturation = (saturation / 100.0).clamp(0.0, 1.0);
        let lightness = (lightness / 100.0).clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let secondary = chroma * (1.0 - (hue % 2.0 - 1.0).abs());
        let (red, green, blue) = match hue as u32 {
            0 => (chroma, secondary, 0.0),
            1 => (secondary, chroma, 0.0),
            2 => (0.0, chroma, secondary),
            3 => (0.0, secondary, chroma),
            4 => (secondary, 0.0, chroma),
            _ => (chroma, 0.0, secondary),
        };
        let offset = lightness - chroma / 2.0;

        Self::new(red + offset, green + offset, blue + offset, alpha)
    }

    /// Returns the same color with a replaced alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha,
        }
    }

    /// Rotates the hue by `degrees` using the luminance-preserving filter matrix.
    #[must_use]
    pub fn hue_rotate(self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.transform([
            [
                0.213 + 0.787 * cos - 0.213 * sin,
                0.715 - 0.715 * cos - 0.715 * sin,
                0.072 - 0.072 * cos + 0.928 * sin,
            ],
            [
                0.213 - 0.213 * cos + 0.143 * sin,
                0.715 + 0.285 * cos + 0.140 * sin,
                0.072 - 0.072 * cos - 0.283 * sin,
            ],
            [
                0.213 - 0.213 * cos - 0.787 * sin,
                0.715 - 0.715 * cos + 0.715 * sin,
                0.072 + 0.928 * cos + 0.072 * sin,
            ],
        ])
    }

    /// Scales saturation by `amount`; `1.0` leaves the color unchanged.
    #[must_use]
    pub fn saturate(self, amount: f32) -> Self {
        let s = amount.max(0.0);
        self.transform([
            [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
        ])
    }

    fn transform(self, matrix: [[f32; 3]; 3]) -> Self {
        let channels = [self.red, self.green, self.blue];
        let apply = |row: [f32; 3]| {
            (row[0] * channels[0] + row[1] * channels[1] + row[2] * channels[2]).clamp(0.0, 1.0)
        };
        Self {
            red: apply(matrix[0]),
            green: apply(matrix[1]),
            blue: apply(matrix[2]),
            alpha: self.alpha,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

/// Ocean colour before the progress filter is applied.
pub const OCEAN_BASE: Color = Color::from_rgb_u8(26, 110, 170);

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Pointer position in screen space, when the pointer is over the window.
    pub pointer: Option<Vec2>,
    /// Whether the pointer left the window on this frame.
    pub pointer_left: bool,
    /// Click position relative to the planet's top-left corner, when the planet was clicked.
    pub planet_clicked: Option<Vec2>,
    /// Whether the reset control was pressed on this frame.
    pub reset_pressed: bool,
    /// New window dimensions when the window was resized on this frame.
    pub resized: Option<Vec2>,
}

/// Circular planet body positioned in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetPresentation {
    /// Centre of the planet in screen space.
    pub center: Vec2,
    /// Radius of the planet in pixels.
    pub radius: f32,
}

impl PlanetPresentation {
    /// Creates a planet descriptor, rejecting non-positive radii.
    pub fn new(center: Vec2, radius: f32) -> Result<Self, RenderingError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(RenderingError::InvalidPlanetRadius { radius });
        }
        Ok(Self { center, radius })
    }

    /// Top-left corner of the planet's bounding square.
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.center - Vec2::splat(self.radius)
    }

    /// Reports whether `point` lies on the planet disc.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }

    /// Converts a screen-space point into coordinates relative to [`Self::origin`].
    #[must_use]
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        point - self.origin()
    }

    /// Screen-space height of the ocean surface for a fill fraction.
    #[must_use]
    pub fn waterline(&self, fill: f32) -> f32 {
        self.center.y + self.radius - 2.0 * self.radius * fill.clamp(0.0, 1.0)
    }
}

/// Ocean layer drawn inside the planet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OceanPresentation {
    /// Filtered ocean color.
    pub color: Color,
    /// Fraction of the planet height covered by water.
    pub fill: f32,
}

/// Animated wave band along the ocean surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WavePresentation {
    /// Time taken by the wave to traverse the planet once.
    pub period: Duration,
    /// Current horizontal offset as a fraction of the period, in `0.0..1.0`.
    pub phase: f32,
}

/// Cloud layer floating over the planet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudPresentation {
    /// Offset from the planet centre, expressed as a fraction of the radius.
    pub offset: Vec2,
    /// Cloud radius expressed as a fraction of the planet radius.
    pub scale: f32,
    /// Current opacity.
    pub opacity: f32,
}

/// Burst particle snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticlePresentation {
    /// Screen-space position.
    pub position: Vec2,
    /// Diameter in pixels.
    pub size: f32,
    /// Fill color including the current opacity.
    pub color: Color,
    /// Rotation in degrees.
    pub rotation_degrees: f32,
}

/// Background star snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarPresentation {
    /// Position as fractions of the window dimensions.
    pub position: Vec2,
    /// Diameter in pixels.
    pub size: f32,
    /// Current opacity.
    pub opacity: f32,
}

/// Expanding click ripple.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RipplePresentation {
    /// Screen-space centre.
    pub center: Vec2,
    /// Fraction of the ripple animation completed.
    pub progress: f32,
}

/// Visual state of the planet body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlanetState {
    /// No run in flight.
    #[default]
    Resting,
    /// A run is in flight.
    Loading,
    /// The completion pulse is visible.
    Celebrating,
}

/// Container rotation derived from the pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TiltPresentation {
    /// Rotation around the horizontal axis, in degrees.
    pub rotate_x_degrees: f32,
    /// Rotation around the vertical axis, in degrees.
    pub rotate_y_degrees: f32,
    /// Vertical offset in pixels.
    pub lift: f32,
}

/// Scene description combining the planet, its layers and every decoration.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Planet body.
    pub planet: PlanetPresentation,
    /// Ocean layer.
    pub ocean: OceanPresentation,
    /// Wave bands from back to front.
    pub waves: Vec<WavePresentation>,
    /// Opacity of the atmosphere glow.
    pub atmosphere_opacity: f32,
    /// Cloud layers in reveal order.
    pub clouds: Vec<CloudPresentation>,
    /// Live burst particles.
    pub particles: Vec<ParticlePresentation>,
    /// Background stars.
    pub stars: Vec<StarPresentation>,
    /// Active click ripples.
    pub ripples: Vec<RipplePresentation>,
    /// Visual state of the planet.
    pub state: PlanetState,
    /// Container tilt.
    pub tilt: TiltPresentation,
    /// Progress readout.
    pub label: String,
}

impl Scene {
    /// Creates an empty scene around the provided planet.
    #[must_use]
    pub fn new(planet: PlanetPresentation) -> Self {
        Self {
            planet,
            ocean: OceanPresentation {
                color: Color::from_rgb_u8(0, 0, 0),
                fill: 0.0,
            },
            waves: Vec::new(),
            atmosphere_opacity: 0.0,
            clouds: Vec::new(),
            particles: Vec::new(),
            stars: Vec::new(),
            ripples: Vec::new(),
            state: PlanetState::default(),
            tilt: TiltPresentation::default(),
            label: String::new(),
        }
    }

    /// Screen-space planet centre after applying the container tilt.
    #[must_use]
    pub fn lifted_center(&self) -> Vec2 {
        self.planet.center + Vec2::new(0.0, self.tilt.lift)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
    /// Size the window is opened at, in logical pixels.
    pub window_size: Vec2,
}

impl Presentation {
    /// Window size used unless [`Presentation::with_window_size`] overrides it.
    pub const DEFAULT_WINDOW_SIZE: Vec2 = Vec2::new(960.0, 960.0);

    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
            window_size: Self::DEFAULT_WINDOW_SIZE,
        }
    }

    /// Opens the window at `size` instead of the default.
    #[must_use]
    pub fn with_window_size(mut self, size: Vec2) -> Self {
        self.window_size = size;
        self
    }
}

/// Rendering backend capable of presenting terraforming scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and rewrites the scene before it is
    /// rendered. The backend never reads animation state back from the scene
    /// other than to draw it.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The planet radius must be a positive finite number.
    InvalidPlanetRadius {
        /// Provided radius that failed validation.
        radius: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlanetRadius { radius } => {
                write!(f, "planet radius must be positive (received {radius})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(left: Color, right: Color) -> bool {
        (left.red - right.red).abs() < 1e-3
            && (left.green - right.green).abs() < 1e-3
            && (left.blue - right.blue).abs() < 1e-3
            && (left.alpha - right.alpha).abs() < 1e-3
    }

    #[test]
    fn hsl_primaries_convert_to_rgb() {
        assert!(close(
            Color::from_hsl(0.0, 100.0, 50.0, 1.0),
            Color::new(1.0, 0.0, 0.0, 1.0)
        ));
        assert!(close(
            Color::from_hsl(120.0, 100.0, 50.0, 1.0),
            Color::new(0.0, 1.0, 0.0, 1.0)
        ));
        assert!(close(
            Color::from_hsl(240.0, 100.0, 25.0, 0.5),
            Color::new(0.0, 0.0, 0.5, 0.5)
        ));
    }

    #[test]
    fn hsl_hue_wraps_around() {
        assert!(close(
            Color::from_hsl(-60.0, 100.0, 50.0, 1.0),
            Color::from_hsl(300.0, 100.0, 50.0, 1.0)
        ));
    }

    #[test]
    fn neutral_filters_leave_color_unchanged() {
        assert!(close(OCEAN_BASE.hue_rotate(0.0), OCEAN_BASE));
        assert!(close(OCEAN_BASE.saturate(1.0), OCEAN_BASE));
    }

    #[test]
    fn zero_saturation_produces_grey() {
        let grey = OCEAN_BASE.saturate(0.0);
        assert!((grey.red - grey.green).abs() < 1e-5);
        assert!((grey.green - grey.blue).abs() < 1e-5);
    }

    #[test]
    fn stronger_saturation_widens_channel_spread() {
        let spread = |color: Color| color.blue - color.red;
        assert!(spread(OCEAN_BASE.saturate(2.0)) > spread(OCEAN_BASE));
    }

    #[test]
    fn planet_creation_rejects_non_positive_radius_without_panicking() {
        let error = PlanetPresentation::new(Vec2::ZERO, 0.0)
            .expect_err("zero radius must be rejected");

        assert_eq!(error, RenderingError::InvalidPlanetRadius { radius: 0.0 });
        assert_eq!(
            error.to_string(),
            "planet radius must be positive (received 0)"
        );
    }

    #[test]
    fn planet_hit_testing_and_local_coordinates() {
        let planet = PlanetPresentation::new(Vec2::new(200.0, 150.0), 100.0).expect("valid planet");

        assert!(planet.contains(Vec2::new(250.0, 150.0)));
        assert!(!planet.contains(Vec2::new(110.0, 60.0)));
        assert_eq!(planet.to_local(Vec2::new(200.0, 150.0)), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn waterline_rises_with_fill() {
        let planet = PlanetPresentation::new(Vec2::new(0.0, 0.0), 50.0).expect("valid planet");

        assert_eq!(planet.waterline(0.0), 50.0);
        assert_eq!(planet.waterline(0.5), 0.0);
        assert_eq!(planet.waterline(1.0), -50.0);
        assert_eq!(planet.waterline(3.0), -50.0);
    }

    #[test]
    fn lifted_center_applies_tilt_lift() {
        let planet = PlanetPresentation::new(Vec2::new(10.0, 10.0), 5.0).expect("valid planet");
        let mut scene = Scene::new(planet);
        scene.tilt.lift = -5.0;

        assert_eq!(scene.lifted_center(), Vec2::new(10.0, 5.0));
    }

    #[test]
    fn presentation_window_size_can_follow_the_viewport() {
        let planet = PlanetPresentation::new(Vec2::new(640.0, 360.0), 216.0).expect("valid planet");
        let presentation = Presentation::new(
            "Terraforming",
            Color::new(0.0, 0.0, 0.0, 1.0),
            Scene::new(planet),
        );
        assert_eq!(presentation.window_size, Presentation::DEFAULT_WINDOW_SIZE);

        let presentation = presentation.with_window_size(Vec2::new(1280.0, 720.0));
        assert_eq!(presentation.window_size, Vec2::new(1280.0, 720.0));
    }
}
