//! Integration tests for derive macros.
//!
//! These tests verify that `#[derive(ConfigOptions)]` and `#[derive(PresetName)]`
//! generate correct code by using the derived implementations from outside
//! the crate.

use wavesphere::config::{ConfigOptions, OptionKind, OptionOutcome, OptionValue, PresetName};

// ============================================================================
// ConfigOptions Derive Tests
// ============================================================================

#[derive(ConfigOptions, Debug, Clone, PartialEq)]
struct Knobs {
    #[option(min = 0.5, max = 5.0)]
    radius: f32,
    #[option(min = -1.0)]
    bias: f32,
    wave_speed: f32,
    #[option(name = "spin")]
    auto_rotate: bool,
    #[option(skip)]
    seed: u64,
}

impl Default for Knobs {
    fn default() -> Self {
        Self {
            radius: 1.5,
            bias: 0.0,
            wave_speed: 0.25,
            auto_rotate: true,
            seed: 7,
        }
    }
}

#[test]
fn test_option_table_order_and_names() {
    let names: Vec<_> = Knobs::OPTIONS.iter().map(|spec| spec.name).collect();
    assert_eq!(names, vec!["radius", "bias", "waveSpeed", "spin"]);
}

#[test]
fn test_option_limits() {
    let radius = Knobs::option_spec("radius").unwrap();
    assert_eq!(radius.kind, OptionKind::Number);
    assert_eq!(radius.min, Some(0.5));
    assert_eq!(radius.max, Some(5.0));

    let bias = Knobs::option_spec("bias").unwrap();
    assert_eq!(bias.min, Some(-1.0));
    assert_eq!(bias.max, None);

    let spin = Knobs::option_spec("spin").unwrap();
    assert_eq!(spin.kind, OptionKind::Bool);
    assert!(Knobs::option_spec("seed").is_none());
    assert!(Knobs::option_spec("auto_rotate").is_none());
}

#[test]
fn test_set_option_applies_and_clamps() {
    let mut knobs = Knobs::default();

    assert_eq!(
        knobs.set_option("radius", OptionValue::Number(2.0)),
        OptionOutcome::Applied
    );
    assert_eq!(knobs.radius, 2.0);

    assert_eq!(
        knobs.set_option("radius", OptionValue::Number(9.0)),
        OptionOutcome::Clamped {
            requested: 9.0,
            applied: 5.0
        }
    );
    assert_eq!(knobs.radius, 5.0);

    assert_eq!(
        knobs.set_option("bias", OptionValue::Number(-3.0)),
        OptionOutcome::Clamped {
            requested: -3.0,
            applied: -1.0
        }
    );
    assert_eq!(
        knobs.set_option("waveSpeed", OptionValue::Number(1000.0)),
        OptionOutcome::Applied
    );
    assert_eq!(knobs.wave_speed, 1000.0);
}

#[test]
fn test_set_option_rejects_wrong_kind_and_unknown() {
    let mut knobs = Knobs::default();
    let before = knobs.clone();

    assert_eq!(
        knobs.set_option("radius", OptionValue::Bool(true)),
        OptionOutcome::TypeMismatch
    );
    assert_eq!(
        knobs.set_option("spin", OptionValue::Number(1.0)),
        OptionOutcome::TypeMismatch
    );
    assert_eq!(
        knobs.set_option("radius", OptionValue::Number(f32::NAN)),
        OptionOutcome::TypeMismatch
    );
    assert_eq!(
        knobs.set_option("seed", OptionValue::Number(1.0)),
        OptionOutcome::Unknown
    );
    assert_eq!(knobs, before);
    assert_eq!(knobs.seed, 7);
}

#[test]
fn test_get_option_reads_back() {
    let mut knobs = Knobs::default();
    knobs.set_option("spin", OptionValue::Bool(false));
    assert_eq!(knobs.get_option("spin"), Some(OptionValue::Bool(false)));
    assert_eq!(knobs.get_option("radius"), Some(OptionValue::Number(1.5)));
    assert_eq!(knobs.get_option("nope"), None);
}

#[test]
fn test_clamp_to_limits_reports_moved_fields() {
    let mut knobs = Knobs {
        radius: 0.1,
        bias: -10.0,
        ..Default::default()
    };
    let moved = knobs.clamp_to_limits();
    assert_eq!(moved, vec!["radius", "bias"]);
    assert_eq!(knobs.radius, 0.5);
    assert_eq!(knobs.bias, -1.0);
    assert!(knobs.clamp_to_limits().is_empty());
}

// ============================================================================
// PresetName Derive Tests
// ============================================================================

#[derive(PresetName, Debug, Clone, Copy, PartialEq)]
enum Mood {
    Calm,
    HighEnergy,
    #[preset(name = "still")]
    Frozen,
}

#[test]
fn test_preset_names() {
    assert_eq!(Mood::Calm.name(), "calm");
    assert_eq!(Mood::HighEnergy.name(), "high_energy");
    assert_eq!(Mood::Frozen.name(), "still");
    assert_eq!(Mood::HighEnergy.to_string(), "high_energy");
}

#[test]
fn test_preset_lookup() {
    assert_eq!(Mood::from_name("calm"), Some(Mood::Calm));
    assert_eq!(Mood::from_name("HIGH_ENERGY"), Some(Mood::HighEnergy));
    assert_eq!(Mood::from_name("still"), Some(Mood::Frozen));
    assert_eq!(Mood::from_name("frozen"), None);
    assert_eq!(Mood::from_name(""), None);
}

#[test]
fn test_preset_all() {
    assert_eq!(Mood::ALL, &[Mood::Calm, Mood::HighEnergy, Mood::Frozen]);
    for mood in Mood::ALL {
        assert_eq!(Mood::from_name(mood.name()), Some(*mood));
    }
}
