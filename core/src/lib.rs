#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the terraforming progress engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative stage, and the pure systems. Adapters submit [`Command`]
//! values describing input and elapsed time, the stage executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what changed. Derived presentation data such as
//! [`VisualParameters`] is computed fresh from progress and never stored.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Terraforming sequence online.";

/// Number of wave layers animated across the ocean surface.
pub const WAVE_LAYER_COUNT: usize = 3;

/// Progress percentage constrained to the inclusive range `0..=100`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percent(u8);

impl Percent {
    /// Zero percent.
    pub const ZERO: Self = Self(0);

    /// One hundred percent.
    pub const FULL: Self = Self(100);

    /// Creates a new percentage, saturating values above one hundred.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value > 100 {
            Self(100)
        } else {
            Self(value)
        }
    }

    /// Retrieves the integral percentage.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Percentage expressed as a fraction in `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        f32::from(self.0) / 100.0
    }

    /// Adds `step` points, never exceeding `ceiling`.
    #[must_use]
    pub fn advance_towards(self, step: u8, ceiling: Percent) -> Self {
        let next = self.0.saturating_add(step);
        Self::new(next.min(ceiling.0))
    }
}

impl TryFrom<u8> for Percent {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 100 {
            return Err(ConfigError::PercentOutOfRange { value });
        }
        Ok(Self(value))
    }
}

impl From<Percent> for u8 {
    fn from(percent: Percent) -> Self {
        percent.0
    }
}

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Describes whether a terraforming run is currently in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// No run is active; activations start a new one.
    #[default]
    Idle,
    /// A run is advancing; activations are ignored.
    Animating,
}

/// Interactive controls exposed by the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    /// The planet itself; starts a run with a ripple and a small burst.
    Planet,
    /// The reset button; starts a run without extra effects.
    Reset,
}

/// Named sound cues forwarded to the sound hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Played once the target progress is reached.
    Success,
}

impl SoundCue {
    /// Stable name of the cue.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Success => "success",
        }
    }
}

/// Point expressed in screen-space pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// Horizontal offset from the left edge.
    pub x: f32,
    /// Vertical offset from the top edge.
    pub y: f32,
}

impl ScreenPoint {
    /// Creates a new screen point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Dimensions of the visible surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width of the surface.
    pub width: f32,
    /// Height of the surface.
    pub height: f32,
}

impl Viewport {
    /// Creates a new viewport descriptor.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Centre of the viewport.
    #[must_use]
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(960.0, 960.0)
    }
}

/// Unique identifier assigned to a live particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(u32);

impl ParticleId {
    /// Creates a new particle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a click ripple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RippleId(u32);

impl RippleId {
    /// Creates a new ripple identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands that express all permissible stage mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the virtual clock, firing every task that falls due.
    Advance {
        /// Duration of wall time that elapsed since the previous advance.
        dt: Duration,
    },
    /// Reports that the user activated one of the page controls.
    Activate {
        /// Control that was activated.
        control: Control,
        /// Activation point relative to the planet's top-left corner, if known.
        at: Option<ScreenPoint>,
    },
    /// Reports the latest pointer position in screen space.
    PointerMoved {
        /// Pointer location.
        position: ScreenPoint,
    },
    /// Reports that the pointer left the surface.
    PointerLeft,
    /// Reports that the visible surface changed size.
    Resize {
        /// New surface dimensions.
        viewport: Viewport,
    },
}

/// Events broadcast by the stage after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the virtual clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed.
        dt: Duration,
    },
    /// Announces that a new run began from zero progress.
    RunStarted,
    /// Reports the progress value applied to the visuals.
    ProgressChanged {
        /// Progress after the update.
        progress: Percent,
    },
    /// Announces the single tick on which progress reached the target.
    TargetReached {
        /// Progress at the crossing tick.
        progress: Percent,
    },
    /// Announces that the driver stopped ticking and returned to idle.
    RunFinished,
    /// Reports that an activation arrived while a run was in flight.
    ActivationIgnored {
        /// Control that was activated.
        control: Control,
    },
    /// Confirms that a batch of particles was spawned.
    BurstSpawned {
        /// Number of particles spawned in the batch.
        count: usize,
    },
    /// Confirms that a particle expired and returned to the pool.
    ParticleRetired {
        /// Identifier of the retired particle.
        particle: ParticleId,
    },
    /// Announces that the completion pulse became visible.
    PulseStarted,
    /// Announces that the completion pulse faded.
    PulseEnded,
    /// Confirms that a click ripple was spawned.
    RippleSpawned {
        /// Identifier assigned to the ripple.
        ripple: RippleId,
        /// Ripple centre relative to the planet.
        at: ScreenPoint,
    },
    /// Confirms that a click ripple finished.
    RippleExpired {
        /// Identifier of the expired ripple.
        ripple: RippleId,
    },
    /// Requests that the sound hook play a named cue.
    SoundRequested {
        /// Cue to play.
        cue: SoundCue,
    },
}

/// Colour filter layered over the fixed ocean base colour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OceanFilter {
    /// Hue rotation applied to the base colour, in degrees.
    pub hue_rotate_degrees: f32,
    /// Saturation multiplier applied to the base colour.
    pub saturate: f32,
}

/// Animation periods of the three ocean wave layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveSpeeds {
    layers: [Duration; WAVE_LAYER_COUNT],
}

impl WaveSpeeds {
    /// Creates the wave tiers from explicit layer periods.
    #[must_use]
    pub const fn new(layers: [Duration; WAVE_LAYER_COUNT]) -> Self {
        Self { layers }
    }

    /// Period of the slowest, primary wave layer.
    #[must_use]
    pub const fn primary(&self) -> Duration {
        self.layers[0]
    }

    /// Periods of every layer, front to back.
    #[must_use]
    pub const fn layers(&self) -> &[Duration; WAVE_LAYER_COUNT] {
        &self.layers
    }
}

/// Presentation parameters derived from a progress percentage.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualParameters {
    /// Progress the parameters were derived from.
    pub progress: Percent,
    /// Conceptual ocean hue in degrees.
    pub hue: f32,
    /// Conceptual ocean saturation in percent.
    pub saturation: f32,
    /// Conceptual ocean lightness in percent.
    pub lightness: f32,
    /// Filter applied over the ocean's base colour.
    pub ocean_filter: OceanFilter,
    /// Fraction of the planet covered by water, `0.0..=1.0`.
    pub ocean_fill: f32,
    /// Wave animation periods.
    pub wave_speeds: WaveSpeeds,
    /// Opacity of the atmosphere glow.
    pub atmosphere_opacity: f32,
    /// Opacity of each cloud layer, indexed by reveal order.
    pub cloud_opacities: Vec<f32>,
}

impl VisualParameters {
    /// Text shown in the progress readout.
    #[must_use]
    pub fn label(&self) -> String {
        self.progress.to_string()
    }
}

/// Inclusive-exclusive uniform sampling range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    /// Lower bound of the range.
    pub min: f32,
    /// Upper bound of the range.
    pub max: f32,
}

impl UniformRange {
    /// Creates a new range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ConfigError::InvalidRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Tuning of the progress driver's timer loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Progress at which the run completes and celebrates.
    pub target: Percent,
    /// Percentage points added on every tick.
    pub step: u8,
    /// Milliseconds between successive ticks.
    pub interval_ms: u64,
}

impl DriverConfig {
    /// Interval between ticks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Checks the configuration for values that would stall or skip the run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target == Percent::ZERO {
            return Err(ConfigError::ZeroTarget);
        }
        if self.step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            target: Percent::new(70),
            step: 1,
            interval_ms: 10,
        }
    }
}

/// Sampling ranges applied to freshly spawned burst particles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Distance from the burst centre at which particles appear.
    pub ring_radius: UniformRange,
    /// Particle diameter in pixels.
    pub size: UniformRange,
    /// Particle hue in degrees.
    pub hue: UniformRange,
    /// Opacity at spawn.
    pub opacity: UniformRange,
    /// Absolute bound of the per-axis velocity, in pixels per frame.
    pub max_speed: f32,
    /// Absolute bound of the rotation speed, in degrees per 100 ms.
    pub max_rotation_speed: f32,
    /// Particle lifetime in milliseconds.
    pub lifetime_ms: UniformRange,
    /// Particles spawned when the target is reached.
    pub celebration_count: usize,
    /// Particles spawned when the planet is clicked.
    pub activation_count: usize,
}

impl BurstConfig {
    /// Checks every sampling range for inverted or non-finite bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ring_radius.validate("ring_radius")?;
        self.size.validate("size")?;
        self.hue.validate("hue")?;
        self.opacity.validate("opacity")?;
        self.lifetime_ms.validate("lifetime_ms")?;
        if self.lifetime_ms.min <= 0.0 {
            return Err(ConfigError::InvalidRange {
                field: "lifetime_ms",
                min: self.lifetime_ms.min,
                max: self.lifetime_ms.max,
            });
        }
        if !self.max_speed.is_finite() || self.max_speed < 0.0 {
            return Err(ConfigError::InvalidRange {
                field: "max_speed",
                min: -self.max_speed,
                max: self.max_speed,
            });
        }
        if !self.max_rotation_speed.is_finite() || self.max_rotation_speed < 0.0 {
            return Err(ConfigError::InvalidRange {
                field: "max_rotation_speed",
                min: -self.max_rotation_speed,
                max: self.max_rotation_speed,
            });
        }
        Ok(())
    }
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            ring_radius: UniformRange::new(150.0, 200.0),
            size: UniformRange::new(2.0, 6.0),
            hue: UniformRange::new(180.0, 220.0),
            opacity: UniformRange::new(0.5, 1.0),
            max_speed: 1.5,
            max_rotation_speed: 1.0,
            lifetime_ms: UniformRange::new(500.0, 2_000.0),
            celebration_count: 150,
            activation_count: 30,
        }
    }
}

/// Stage-level tuning: surface, decorations and transient effects.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Initial surface dimensions.
    pub viewport: Viewport,
    /// Number of cloud layers revealed as progress grows.
    pub cloud_count: usize,
    /// Number of background stars.
    pub star_count: usize,
    /// Delay before the first run starts on its own; `None` disables it.
    pub autostart_delay_ms: Option<u64>,
    /// Duration of the completion pulse.
    pub pulse_ms: u64,
    /// Duration of a click ripple.
    pub ripple_ms: u64,
    /// Display refresh period in microseconds.
    pub frame_period_us: u64,
    /// Seed for every random draw made by the stage.
    pub seed: u64,
}

impl StageConfig {
    /// Display refresh period.
    #[must_use]
    pub const fn frame_period(&self) -> Duration {
        Duration::from_micros(self.frame_period_us)
    }

    /// Checks the configuration for values the event loop cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_period_us == 0 {
            return Err(ConfigError::ZeroFramePeriod);
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(ConfigError::EmptyViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        Ok(())
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            cloud_count: 5,
            star_count: 100,
            autostart_delay_ms: Some(500),
            pulse_ms: 1_000,
            ripple_ms: 1_000,
            frame_period_us: 16_667,
            seed: 0x7e44_af04_2025_0320,
        }
    }
}

/// Complete tuning surface of the experience, as stored in a config file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerraformConfig {
    /// Stage-level tuning.
    pub stage: StageConfig,
    /// Progress driver tuning.
    pub driver: DriverConfig,
    /// Particle burst tuning.
    pub burst: BurstConfig,
}

impl TerraformConfig {
    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stage.validate()?;
        self.driver.validate()?;
        self.burst.validate()
    }
}

/// Reasons a configuration is rejected before the stage is built.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A percentage exceeded one hundred.
    #[error("percentage must be at most 100 (received {value})")]
    PercentOutOfRange {
        /// Rejected value.
        value: u8,
    },
    /// The target progress was zero, so no tick could ever run.
    #[error("target progress must be positive")]
    ZeroTarget,
    /// The step was zero, so progress would never advance.
    #[error("progress step must be positive")]
    ZeroStep,
    /// The tick interval was zero.
    #[error("tick interval must be positive")]
    ZeroInterval,
    /// The frame period was zero.
    #[error("frame period must be positive")]
    ZeroFramePeriod,
    /// The viewport had no area.
    #[error("viewport must have a positive area (received {width}x{height})")]
    EmptyViewport {
        /// Rejected width.
        width: f32,
        /// Rejected height.
        height: f32,
    },
    /// A sampling range was inverted or non-finite.
    #[error("range `{field}` is invalid ({min}..{max})")]
    InvalidRange {
        /// Name of the offending field.
        field: &'static str,
        /// Lower bound supplied.
        min: f32,
        /// Upper bound supplied.
        max: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_saturates_at_one_hundred() {
        assert_eq!(Percent::new(250).get(), 100);
        assert_eq!(Percent::new(42).get(), 42);
    }

    #[test]
    fn percent_advance_never_passes_ceiling() {
        let ceiling = Percent::new(70);
        assert_eq!(Percent::new(68).advance_towards(5, ceiling), ceiling);
        assert_eq!(Percent::new(10).advance_towards(1, ceiling).get(), 11);
        assert_eq!(Percent::new(99).advance_towards(u8::MAX, Percent::FULL), Percent::FULL);
    }

    #[test]
    fn percent_rejects_out_of_range_on_deserialize() {
        #[derive(Deserialize)]
        struct Holder {
            value: Percent,
        }

        let accepted: Holder = toml::from_str("value = 70").expect("in range");
        assert_eq!(accepted.value.get(), 70);
        assert!(toml::from_str::<Holder>("value = 140").is_err());
    }

    #[test]
    fn percent_displays_as_label() {
        assert_eq!(Percent::new(70).to_string(), "70%");
    }

    #[test]
    fn default_driver_config_matches_page_timing() {
        let config = DriverConfig::default();
        assert_eq!(config.target.get(), 70);
        assert_eq!(config.step, 1);
        assert_eq!(config.interval(), Duration::from_millis(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn driver_config_rejects_stalling_values() {
        let zero_step = DriverConfig {
            step: 0,
            ..DriverConfig::default()
        };
        assert_eq!(zero_step.validate(), Err(ConfigError::ZeroStep));

        let zero_target = DriverConfig {
            target: Percent::ZERO,
            ..DriverConfig::default()
        };
        assert_eq!(zero_target.validate(), Err(ConfigError::ZeroTarget));

        let zero_interval = DriverConfig {
            interval_ms: 0,
            ..DriverConfig::default()
        };
        assert_eq!(zero_interval.validate(), Err(ConfigError::ZeroInterval));
    }

    #[test]
    fn burst_config_rejects_inverted_ranges() {
        let config = BurstConfig {
            size: UniformRange::new(6.0, 2.0),
            ..BurstConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { field: "size", .. })
        ));
        assert!(BurstConfig::default().validate().is_ok());
    }

    #[test]
    fn stage_config_rejects_zero_frame_period() {
        let config = StageConfig {
            frame_period_us: 0,
            ..StageConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroFramePeriod));
        assert!(StageConfig::default().validate().is_ok());
    }

    #[test]
    fn sound_cue_names_are_stable() {
        assert_eq!(SoundCue::Success.name(), "success");
    }
}
