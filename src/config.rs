//! Sphere configuration: named options, limits and presets.
//!
//! [`SphereConfig`] is the flat option set a host passes when creating a
//! [`WaveSphere`](crate::WaveSphere). It can be built three ways:
//!
//! - in code, with the `with_*` builder methods,
//! - from a flat JSON object with [`SphereConfig::from_options`],
//! - from a query string with [`SphereConfig::from_params`].
//!
//! Every numeric option has documented limits. Out-of-range values are
//! clamped, unknown keys are logged and reported back in a [`ConfigReport`];
//! neither is an error. Only contradictions that clamping cannot fix (such as
//! `minZoom >= maxZoom`) fail with a [`ConfigError`].
//!
//! ```ignore
//! use serde_json::json;
//! use wavesphere::config::SphereConfig;
//!
//! let (config, report) = SphereConfig::from_options(&json!({
//!     "preset": "calm",
//!     "radius": 9.0,       // clamped to 5.0
//!     "sparkle": true,     // unknown, reported
//! }))?;
//! assert_eq!(config.radius, 5.0);
//! assert_eq!(report.unknown_keys, vec!["sparkle"]);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ensure_range, ConfigError};
use crate::gradient::GradientPreset;
use crate::sampler::SamplerConfig;
use crate::wave::{WaveFieldConfig, WaveSource, REFERENCE_RADIUS};

pub use wavesphere_derive::{ConfigOptions, PresetName};

/// Kind of value an option accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Number,
    Bool,
}

/// One entry of an option table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: OptionKind,
    pub min: Option<f32>,
    pub max: Option<f32>,
}

/// A value assigned to an option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionValue {
    Number(f32),
    Bool(bool),
}

impl OptionValue {
    /// Convert a JSON scalar. Strings, arrays, objects and `null` yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(OptionValue::Bool(*flag)),
            Value::Number(n) => n.as_f64().map(|v| OptionValue::Number(v as f32)),
            _ => None,
        }
    }
}

/// Result of assigning one option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionOutcome {
    Applied,
    Clamped { requested: f32, applied: f32 },
    Unknown,
    TypeMismatch,
}

/// Name-keyed access to a flat configuration struct.
///
/// Implemented with `#[derive(ConfigOptions)]`.
pub trait ConfigOptions {
    /// Every option, in declaration order.
    const OPTIONS: &'static [OptionSpec];

    /// Assign `value` to `key`, clamping numbers to the option's limits.
    fn set_option(&mut self, key: &str, value: OptionValue) -> OptionOutcome;

    fn get_option(&self, key: &str) -> Option<OptionValue>;

    /// Clamp every numeric option in place. Returns the names that changed.
    fn clamp_to_limits(&mut self) -> Vec<&'static str>;

    fn option_spec(key: &str) -> Option<&'static OptionSpec> {
        Self::OPTIONS.iter().find(|spec| spec.name == key)
    }
}

/// Clamp `value` to optional bounds.
#[inline]
pub fn clamp_limits(value: f32, min: Option<f32>, max: Option<f32>) -> f32 {
    let mut v = value;
    if let Some(lo) = min {
        v = v.max(lo);
    }
    if let Some(hi) = max {
        v = v.min(hi);
    }
    v
}

/// What happened to the keys of an option object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigReport {
    /// Keys that match no option. Ignored.
    pub unknown_keys: Vec<String>,
    /// Keys whose value had the wrong type. Ignored.
    pub type_mismatches: Vec<String>,
    /// `(key, requested, applied)` for values moved into range.
    pub clamped: Vec<(String, f32, f32)>,
}

impl ConfigReport {
    /// `true` when every key was applied as given.
    pub fn is_clean(&self) -> bool {
        self.unknown_keys.is_empty() && self.type_mismatches.is_empty() && self.clamped.is_empty()
    }

    fn record(&mut self, key: &str, outcome: OptionOutcome) {
        match outcome {
            OptionOutcome::Applied => {}
            OptionOutcome::Clamped { requested, applied } => {
                tracing::warn!(key, requested, applied, "option value out of range, clamped");
                self.clamped.push((key.to_string(), requested, applied));
            }
            OptionOutcome::Unknown => {
                tracing::warn!(key, "unknown configuration option ignored");
                self.unknown_keys.push(key.to_string());
            }
            OptionOutcome::TypeMismatch => {
                tracing::warn!(key, "configuration option has the wrong type, ignored");
                self.type_mismatches.push(key.to_string());
            }
        }
    }
}

/// Named starting points for a [`SphereConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PresetName)]
pub enum SpherePreset {
    Default,
    /// Slow, gentle waves.
    Calm,
    /// Fast, tall waves.
    Energetic,
    Large,
    Small,
    /// No auto-rotation.
    Static,
    /// Smaller points, fewer ripples, pixel ratio 1.
    Performance,
    /// Larger points, more ripples, pixel ratio 2.
    Quality,
}

impl SpherePreset {
    /// Look up a preset by name, failing on unknown names.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        Self::from_name(name).ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
    }

    pub fn config(&self) -> SphereConfig {
        let base = SphereConfig::default();
        match self {
            SpherePreset::Default => base,
            SpherePreset::Calm => SphereConfig {
                wave_speed: 0.15,
                wave_amplitude: 0.4,
                wave_max_amplitude: 1.0,
                wave_cycle: 8.0,
                auto_rotate_speed: 0.0003,
                ..base
            },
            SpherePreset::Energetic => SphereConfig {
                wave_speed: 0.4,
                wave_amplitude: 1.2,
                wave_max_amplitude: 3.0,
                wave_cycle: 2.0,
                wave_frequency: 8.0,
                auto_rotate_speed: 0.0015,
                ..base
            },
            SpherePreset::Large => SphereConfig {
                radius: 2.0,
                camera_distance: 5.0,
                point_base_size: 8.0,
                wave_amplitude: 1.0,
                wave_max_amplitude: 2.5,
                ..base
            },
            SpherePreset::Small => SphereConfig {
                radius: 1.0,
                camera_distance: 2.5,
                point_base_size: 4.0,
                wave_amplitude: 0.6,
                wave_max_amplitude: 1.5,
                ..base
            },
            SpherePreset::Static => SphereConfig {
                auto_rotate: false,
                wave_speed: 0.2,
                wave_cycle: 6.0,
                ..base
            },
            SpherePreset::Performance => SphereConfig {
                point_base_size: 4.0,
                wave_frequency: 4.0,
                pixel_ratio: 1.0,
                ..base
            },
            SpherePreset::Quality => SphereConfig {
                point_base_size: 8.0,
                wave_frequency: 10.0,
                pixel_ratio: 2.0,
                ..base
            },
        }
    }
}

/// Query-string names accepted by [`SphereConfig::from_params`].
const PARAM_KEYS: &[(&str, &str)] = &[
    ("sphere-radius", "radius"),
    ("sphere-auto-rotate", "autoRotate"),
    ("sphere-auto-rotate-speed", "autoRotateSpeed"),
    ("sphere-camera-distance", "cameraDistance"),
    ("sphere-wave-speed", "waveSpeed"),
    ("sphere-wave-amplitude", "waveAmplitude"),
    ("sphere-wave-frequency", "waveFrequency"),
];

/// Flat option set for a wave sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ConfigOptions)]
#[serde(rename_all = "camelCase", default)]
pub struct SphereConfig {
    #[option(min = 0.5, max = 5.0)]
    pub radius: f32,
    #[option(min = 1.0, max = 20.0)]
    pub point_base_size: f32,

    /// Wave lengths and heights are given for a sphere of radius 1.5 and
    /// scale with `radius`.
    #[option(min = 1.0, max = 20.0)]
    pub wave_frequency: f32,
    #[option(min = 0.1, max = 1.0)]
    pub wave_speed: f32,
    #[option(min = 0.1, max = 1.0)]
    pub wave_thickness: f32,
    #[option(min = 0.1, max = 2.0)]
    pub wave_amplitude: f32,
    #[option(min = 0.5, max = 5.0)]
    pub wave_max_amplitude: f32,
    #[option(min = 1.0, max = 20.0)]
    pub wave_cycle: f32,
    #[option(min = 0.5, max = 3.0)]
    pub wave_form: f32,

    pub auto_rotate: bool,
    #[option(min = 0.0001, max = 0.01)]
    pub auto_rotate_speed: f32,

    #[option(min = 1.0, max = 20.0)]
    pub camera_distance: f32,
    #[option(min = 0.5, max = 10.0)]
    pub min_zoom: f32,
    #[option(min = 5.0, max = 50.0)]
    pub max_zoom: f32,

    pub enable_controls: bool,
    #[option(min = 0.01, max = 0.5)]
    pub damping: f32,
    /// Device pixel ratio used for resolution-dependent sizes.
    #[option(min = 0.5, max = 2.0)]
    pub pixel_ratio: f32,

    #[option(skip)]
    pub seed: u64,
    #[option(skip)]
    pub gradient: GradientPreset,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            radius: 1.5,
            point_base_size: 6.0,
            wave_frequency: 6.0,
            wave_speed: 0.25,
            wave_thickness: 0.5,
            wave_amplitude: 0.8,
            wave_max_amplitude: 2.2,
            wave_cycle: 4.0,
            wave_form: 1.0,
            auto_rotate: true,
            auto_rotate_speed: 0.0008,
            camera_distance: 3.5,
            min_zoom: 2.0,
            max_zoom: 15.0,
            enable_controls: true,
            damping: 0.1,
            pixel_ratio: 1.0,
            seed: 0,
            gradient: GradientPreset::Eclipse,
        }
    }
}

impl SphereConfig {
    /// Build from a flat JSON object of named options.
    ///
    /// A `"preset"` key selects the starting preset; every other key is
    /// applied on top of it.
    pub fn from_options(options: &Value) -> Result<(Self, ConfigReport), ConfigError> {
        let Value::Object(map) = options else {
            return Err(ConfigError::NotAnObject(json_kind(options).to_string()));
        };

        let mut config = match map.get("preset") {
            Some(Value::String(name)) => SpherePreset::parse(name)?.config(),
            _ => SphereConfig::default(),
        };

        let mut report = ConfigReport::default();
        for (key, value) in map {
            if key == "preset" {
                if !value.is_string() {
                    report.record(key, OptionOutcome::TypeMismatch);
                }
                continue;
            }
            if value.is_null() {
                tracing::debug!(key = key.as_str(), "null option left at its default");
                continue;
            }
            let outcome = match OptionValue::from_json(value) {
                Some(v) => config.set_option(key, v),
                None if Self::option_spec(key).is_none() => OptionOutcome::Unknown,
                None => OptionOutcome::TypeMismatch,
            };
            report.record(key, outcome);
        }

        config.finish()?;
        Ok((config, report))
    }

    /// Build from a query string such as `sphere-radius=2&sphere-wave-speed=0.5`.
    ///
    /// A `sphere-preset` parameter wins over everything else. Parameters
    /// without the `sphere-` prefix are not ours and are skipped silently.
    pub fn from_params(query: &str) -> Result<(Self, ConfigReport), ConfigError> {
        let pairs: Vec<(&str, &str)> = query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .collect();

        if let Some((_, name)) = pairs.iter().find(|(key, _)| *key == "sphere-preset") {
            return Ok((SpherePreset::parse(name)?.config(), ConfigReport::default()));
        }

        let mut config = SphereConfig::default();
        let mut report = ConfigReport::default();
        for (param, raw) in pairs {
            let Some(&(_, key)) = PARAM_KEYS.iter().find(|(name, _)| *name == param) else {
                if param.starts_with("sphere-") {
                    report.record(param, OptionOutcome::Unknown);
                }
                continue;
            };
            let value = match Self::option_spec(key).map(|spec| spec.kind) {
                Some(OptionKind::Bool) => Some(OptionValue::Bool(raw == "true")),
                _ => raw.parse::<f32>().ok().map(OptionValue::Number),
            };
            let outcome = match value {
                Some(v) => config.set_option(key, v),
                None => OptionOutcome::TypeMismatch,
            };
            report.record(key, outcome);
        }

        config.finish()?;
        Ok((config, report))
    }

    /// Clamp every option to its limits and check cross-field constraints.
    ///
    /// Returns the names of options that had to be clamped.
    pub fn validated(mut self) -> Result<(Self, Vec<&'static str>), ConfigError> {
        for spec in Self::OPTIONS {
            if let Some(OptionValue::Number(v)) = self.get_option(spec.name) {
                if !v.is_finite() {
                    return Err(ConfigError::NonPositive {
                        name: spec.name,
                        value: v,
                    });
                }
            }
        }
        let moved = self.clamp_to_limits();
        for name in &moved {
            tracing::warn!(option = *name, "option value out of range, clamped");
        }
        self.finish()?;
        Ok((self, moved))
    }

    fn finish(&mut self) -> Result<(), ConfigError> {
        ensure_range("zoom", self.min_zoom, self.max_zoom, false)?;
        let distance = self.camera_distance.clamp(self.min_zoom, self.max_zoom);
        if distance != self.camera_distance {
            tracing::warn!(
                requested = self.camera_distance,
                applied = distance,
                "camera distance outside zoom range, clamped"
            );
            self.camera_distance = distance;
        }
        Ok(())
    }

    // ========== Builder ==========

    pub fn with_preset(self, preset: SpherePreset) -> Self {
        SphereConfig {
            seed: self.seed,
            gradient: self.gradient,
            ..preset.config()
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_point_size(mut self, size: f32) -> Self {
        self.point_base_size = size;
        self
    }

    pub fn with_wave_speed(mut self, speed: f32) -> Self {
        self.wave_speed = speed;
        self
    }

    pub fn with_wave_amplitude(mut self, base: f32, max: f32) -> Self {
        self.wave_amplitude = base;
        self.wave_max_amplitude = max;
        self
    }

    pub fn with_wave_frequency(mut self, frequency: f32) -> Self {
        self.wave_frequency = frequency;
        self
    }

    pub fn with_wave_thickness(mut self, thickness: f32) -> Self {
        self.wave_thickness = thickness;
        self
    }

    pub fn with_wave_cycle(mut self, cycle: f32) -> Self {
        self.wave_cycle = cycle;
        self
    }

    pub fn with_camera_distance(mut self, distance: f32) -> Self {
        self.camera_distance = distance;
        self
    }

    pub fn with_zoom_range(mut self, min: f32, max: f32) -> Self {
        self.min_zoom = min;
        self.max_zoom = max;
        self
    }

    /// Enable or disable auto-rotation, optionally changing its speed.
    pub fn with_auto_rotate(mut self, enabled: bool, speed: Option<f32>) -> Self {
        self.auto_rotate = enabled;
        if let Some(speed) = speed {
            self.auto_rotate_speed = speed;
        }
        self
    }

    pub fn with_controls(mut self, enabled: bool) -> Self {
        self.enable_controls = enabled;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_pixel_ratio(mut self, ratio: f32) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_gradient(mut self, gradient: GradientPreset) -> Self {
        self.gradient = gradient;
        self
    }

    // ========== Derived configs ==========

    /// Ring template shared by both wave sources.
    pub fn wave_source(&self) -> WaveSource {
        WaveSource::default()
            .with_speed(self.wave_speed)
            .with_thickness(self.wave_thickness)
            .with_amplitude(self.wave_amplitude, self.wave_max_amplitude)
            .with_frequency(self.wave_frequency)
            .with_cycle_period(self.wave_cycle)
            .with_form(self.wave_form)
    }

    /// Two-source wave field laid out at [`REFERENCE_RADIUS`] and scaled to
    /// the configured radius, so rings reach the surface at every size.
    pub fn wave_config(&self) -> WaveFieldConfig {
        WaveFieldConfig::default()
            .with_ring(self.wave_source())
            .scaled(self.radius / REFERENCE_RADIUS)
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig::default()
            .with_radius(self.radius)
            .with_base_size(self.point_base_size)
            .with_seed(self.seed)
            .with_gradient(self.gradient.gradient())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
