#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure mapping from terraforming progress to presentation parameters.

use std::time::Duration;

use terraform_core::{OceanFilter, Percent, VisualParameters, WaveSpeeds, WAVE_LAYER_COUNT};

const BASE_HUE: f32 = 190.0;
const HUE_SPAN: f32 = 10.0;
const BASE_SATURATION: f32 = 70.0;
const SATURATION_SPAN: f32 = 30.0;
const BASE_LIGHTNESS: f32 = 40.0;
const LIGHTNESS_SPAN: f32 = 10.0;

const HUE_ROTATE_OFFSET: f32 = -5.0;

const SLOWEST_WAVE_SECONDS: f32 = 13.0;
const FASTEST_WAVE_SECONDS: f32 = 5.0;
const WAVE_LAYER_FACTORS: [f32; WAVE_LAYER_COUNT] = [1.0, 0.6, 0.8];

const BASE_ATMOSPHERE: f32 = 0.4;
const ATMOSPHERE_SPAN: f32 = 0.4;

const CLOUD_REVEAL_STRIDE: u32 = 20;
const CLOUD_VISIBLE: f32 = 0.7;
const CLOUD_HIDDEN: f32 = 0.1;

/// Derives every visual parameter for `percent` across `cloud_count` cloud layers.
#[must_use]
pub fn map_progress(percent: Percent, cloud_count: usize) -> VisualParameters {
    let fraction = percent.fraction();

    VisualParameters {
        progress: percent,
        hue: BASE_HUE + fraction * HUE_SPAN,
        saturation: BASE_SATURATION + fraction * SATURATION_SPAN,
        lightness: BASE_LIGHTNESS + fraction * LIGHTNESS_SPAN,
        ocean_filter: ocean_filter(fraction),
        ocean_fill: fraction,
        wave_speeds: wave_speeds(percent),
        atmosphere_opacity: BASE_ATMOSPHERE + fraction * ATMOSPHERE_SPAN,
        cloud_opacities: (0..cloud_count)
            .map(|index| cloud_opacity(percent, index))
            .collect(),
    }
}

fn ocean_filter(fraction: f32) -> OceanFilter {
    OceanFilter {
        hue_rotate_degrees: fraction * HUE_SPAN + HUE_ROTATE_OFFSET,
        saturate: 1.0 + fraction,
    }
}

/// Wave periods shrink by one second per ten points, bottoming out at five
/// seconds; the back layers run at fixed ratios of the primary layer.
fn wave_speeds(percent: Percent) -> WaveSpeeds {
    let primary =
        (SLOWEST_WAVE_SECONDS - f32::from(percent.get()) / 10.0).max(FASTEST_WAVE_SECONDS);
    WaveSpeeds::new(WAVE_LAYER_FACTORS.map(|factor| Duration::from_secs_f32(primary * factor)))
}

fn cloud_opacity(percent: Percent, index: usize) -> f32 {
    let threshold = u32::try_from(index)
        .unwrap_or(u32::MAX)
        .saturating_mul(CLOUD_REVEAL_STRIDE);
    if u32::from(percent.get()) > threshold {
        CLOUD_VISIBLE
    } else {
        CLOUD_HIDDEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f32, expected: f32) -> bool {
        (actual - expected).abs() < 1e-4
    }

    #[test]
    fn zero_progress_matches_initial_page_state() {
        let parameters = map_progress(Percent::ZERO, 5);

        assert!(close(parameters.hue, 190.0));
        assert!(close(parameters.saturation, 70.0));
        assert!(close(parameters.lightness, 40.0));
        assert!(close(parameters.ocean_filter.hue_rotate_degrees, -5.0));
        assert!(close(parameters.ocean_filter.saturate, 1.0));
        assert!(close(parameters.atmosphere_opacity, 0.4));
        assert!(close(parameters.wave_speeds.primary().as_secs_f32(), 13.0));
        assert_eq!(parameters.cloud_opacities, vec![CLOUD_HIDDEN; 5]);
        assert_eq!(parameters.label(), "0%");
    }

    #[test]
    fn wave_layers_keep_fixed_ratios() {
        let parameters = map_progress(Percent::new(30), 0);
        let layers = parameters.wave_speeds.layers();

        assert!(close(layers[0].as_secs_f32(), 10.0));
        assert!(close(layers[1].as_secs_f32(), 6.0));
        assert!(close(layers[2].as_secs_f32(), 8.0));
    }

    #[test]
    fn wave_speed_bottoms_out_at_five_seconds() {
        assert!(close(
            map_progress(Percent::new(80), 0)
                .wave_speeds
                .primary()
                .as_secs_f32(),
            5.0
        ));
        assert!(close(
            map_progress(Percent::FULL, 0)
                .wave_speeds
                .primary()
                .as_secs_f32(),
            5.0
        ));
    }

    #[test]
    fn clouds_reveal_at_twenty_point_strides() {
        let opacities = map_progress(Percent::new(40), 5).cloud_opacities;
        assert_eq!(
            opacities,
            vec![CLOUD_VISIBLE, CLOUD_VISIBLE, CLOUD_HIDDEN, CLOUD_HIDDEN, CLOUD_HIDDEN]
        );

        let opacities = map_progress(Percent::new(41), 5).cloud_opacities;
        assert_eq!(opacities[2], CLOUD_VISIBLE);
        assert_eq!(opacities[3], CLOUD_HIDDEN);
    }

    #[test]
    fn full_progress_reaches_upper_bounds() {
        let parameters = map_progress(Percent::FULL, 1);

        assert!(close(parameters.hue, 200.0));
        assert!(close(parameters.saturation, 100.0));
        assert!(close(parameters.lightness, 50.0));
        assert!(close(parameters.atmosphere_opacity, 0.8));
        assert!(close(parameters.ocean_filter.hue_rotate_degrees, 5.0));
        assert!(close(parameters.ocean_filter.saturate, 2.0));
        assert!(close(parameters.ocean_fill, 1.0));
    }
}
