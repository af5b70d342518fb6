use terraform_core::Percent;
use terraform_system_mapper::map_progress;

const CLOUDS: usize = 5;

fn all_percentages() -> impl Iterator<Item = Percent> {
    (0..=100).map(Percent::new)
}

#[test]
fn wave_speed_never_drops_below_five_seconds() {
    for percent in all_percentages() {
        let primary = map_progress(percent, CLOUDS).wave_speeds.primary();
        assert!(
            primary.as_secs_f32() >= 5.0 - 1e-4,
            "wave speed {primary:?} at {percent}"
        );
    }
}

#[test]
fn atmosphere_and_saturation_are_non_decreasing() {
    let mut previous = map_progress(Percent::ZERO, CLOUDS);
    for percent in all_percentages().skip(1) {
        let current = map_progress(percent, CLOUDS);
        assert!(current.atmosphere_opacity >= previous.atmosphere_opacity);
        assert!(current.saturation >= previous.saturation);
        assert!(current.ocean_fill >= previous.ocean_fill);
        previous = current;
    }
}

#[test]
fn visible_cloud_count_never_shrinks() {
    let visible = |percent: Percent| {
        map_progress(percent, CLOUDS)
            .cloud_opacities
            .iter()
            .filter(|opacity| **opacity > 0.5)
            .count()
    };

    let mut previous = visible(Percent::ZERO);
    for percent in all_percentages() {
        let current = visible(percent);
        assert!(current >= previous, "cloud reveal regressed at {percent}");
        previous = current;
    }
    assert_eq!(visible(Percent::FULL), CLOUDS);
}

#[test]
fn mapping_is_deterministic() {
    for percent in all_percentages() {
        assert_eq!(map_progress(percent, CLOUDS), map_progress(percent, CLOUDS));
    }
}
