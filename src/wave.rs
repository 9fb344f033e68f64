//! Expanding ring waves over a sphere surface.
//!
//! A [`WaveField`] combines any number of [`WaveSource`]s with a low-amplitude
//! noise drift and returns one clamped scalar displacement per point and time.
//!
//! Each source emits a spherical shell whose radius grows linearly with time
//! and restarts every `cycle_period` seconds. Shells grow taller as they
//! approach the *clash point* (where two competing fronts meet), then fade out
//! instead of passing through each other.
//!
//! ```ignore
//! use wavesphere::wave::{WaveField, WaveFieldConfig};
//!
//! let field = WaveField::new(WaveFieldConfig::default(), 0)?;
//! let d = field.displacement(Vec3::new(0.0, 0.0, 1.5), 2.0);
//! assert!((-0.05..=0.10).contains(&d));
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ensure_range, ConfigError};
use crate::math::smoothstep;
use crate::noise::{FractalParams, NoiseField};

/// Sphere radius the default field is laid out for.
pub const REFERENCE_RADIUS: f32 = 1.5;

/// One expanding ring emitter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveSource {
    pub origin: Vec3,
    /// Ring growth in units per second.
    pub speed: f32,
    /// Half-width of the ring band.
    pub thickness: f32,
    pub base_amplitude: f32,
    /// Amplitude reached at the clash point.
    pub max_amplitude: f32,
    pub frequency: f32,
    /// Seconds before the ring restarts from its origin.
    pub cycle_period: f32,
    /// Shape exponent applied to `|sin|`.
    pub form: f32,
}

impl Default for WaveSource {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            speed: 0.25,
            thickness: 0.5,
            base_amplitude: 0.8,
            max_amplitude: 2.2,
            frequency: 6.0,
            cycle_period: 4.0,
            form: 1.0,
        }
    }
}

impl WaveSource {
    /// A source at `origin` with default ring parameters.
    pub fn new(origin: Vec3) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn with_amplitude(mut self, base: f32, max: f32) -> Self {
        self.base_amplitude = base;
        self.max_amplitude = max;
        self
    }

    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_cycle_period(mut self, cycle_period: f32) -> Self {
        self.cycle_period = cycle_period;
        self
    }

    pub fn with_form(mut self, form: f32) -> Self {
        self.form = form;
        self
    }

    /// The same ring in a space `factor` times larger: lengths and heights
    /// scale up, spatial frequency down. Timing is unchanged.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            origin: self.origin * factor,
            speed: self.speed * factor,
            thickness: self.thickness * factor,
            base_amplitude: self.base_amplitude * factor,
            max_amplitude: self.max_amplitude * factor,
            frequency: self.frequency / factor,
            ..self
        }
    }

    /// Ring radius at time `t`.
    #[inline]
    pub fn radius_at(&self, t: f32) -> f32 {
        t.rem_euclid(self.cycle_period) * self.speed
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cycle_period.is_finite() && self.cycle_period > 0.0) {
            return Err(ConfigError::CyclePeriod(self.cycle_period));
        }
        ensure_positive("wave thickness", self.thickness)?;
        ensure_positive("wave form", self.form)?;
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(ConfigError::NonPositive {
                name: "wave speed",
                value: self.speed,
            });
        }
        for (name, value) in [
            ("wave origin", self.origin.length()),
            ("wave frequency", self.frequency),
            ("wave amplitude", self.base_amplitude),
            ("wave max amplitude", self.max_amplitude),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}

/// Noise drift added on top of the ring waves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftParams {
    pub amplitude: f32,
    /// Spatial frequency of the noise lookup.
    pub scale: f32,
    /// Offset per second applied to the noise lookup point.
    pub velocity: Vec3,
    pub octaves: u32,
}

impl Default for DriftParams {
    fn default() -> Self {
        Self {
            amplitude: 0.014,
            scale: 2.0,
            velocity: Vec3::new(0.8, 0.6, 0.4),
            octaves: 2,
        }
    }
}

/// Full description of a wave field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveFieldConfig {
    pub sources: Vec<WaveSource>,
    /// Clash radius used when fewer than two sources compete.
    pub solo_clash_radius: f32,
    /// Per-source contribution above which it counts toward interference.
    pub interference_threshold: f32,
    pub interference_gain: f32,
    /// Points farther than this from the center get `outer_factor` applied.
    pub outer_threshold: Option<f32>,
    pub outer_factor: f32,
    pub drift: DriftParams,
    pub min_displacement: f32,
    pub max_displacement: f32,
}

impl Default for WaveFieldConfig {
    /// Two competing sources on opposite sides of the sphere.
    fn default() -> Self {
        Self {
            sources: vec![
                WaveSource::new(Vec3::new(0.707, 0.707, 0.5)),
                WaveSource::new(Vec3::new(-0.707, -0.707, 0.65)),
            ],
            solo_clash_radius: 1.0,
            interference_threshold: 0.01,
            interference_gain: 1.5,
            outer_threshold: Some(1.4),
            outer_factor: -0.2,
            drift: DriftParams::default(),
            min_displacement: -0.05,
            max_displacement: 0.10,
        }
    }
}

impl WaveFieldConfig {
    /// A field with no ring sources, only drift.
    pub fn drift_only() -> Self {
        Self {
            sources: Vec::new(),
            ..Self::default()
        }
    }

    pub fn with_sources(mut self, sources: Vec<WaveSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Apply the same ring parameters to every source, keeping origins.
    pub fn with_ring(mut self, template: WaveSource) -> Self {
        for source in &mut self.sources {
            *source = WaveSource {
                origin: source.origin,
                ..template
            };
        }
        self
    }

    pub fn with_outer_threshold(mut self, threshold: Option<f32>) -> Self {
        self.outer_threshold = threshold;
        self
    }

    pub fn with_drift(mut self, drift: DriftParams) -> Self {
        self.drift = drift;
        self
    }

    pub fn with_clamp(mut self, min: f32, max: f32) -> Self {
        self.min_displacement = min;
        self.max_displacement = max;
        self
    }

    /// Uniformly rescale the field, e.g. from [`REFERENCE_RADIUS`] to another
    /// sphere radius. The result at `p * factor` is `factor` times the
    /// original displacement at `p`.
    pub fn scaled(mut self, factor: f32) -> Self {
        for source in &mut self.sources {
            *source = source.scaled(factor);
        }
        self.solo_clash_radius *= factor;
        self.interference_threshold *= factor;
        self.outer_threshold = self.outer_threshold.map(|threshold| threshold * factor);
        self.drift.amplitude *= factor;
        self.drift.scale /= factor;
        self.min_displacement *= factor;
        self.max_displacement *= factor;
        self
    }
}

/// Scalar displacement field: ring waves plus noise drift, clamped.
#[derive(Debug, Clone)]
pub struct WaveField {
    config: WaveFieldConfig,
    clash_point: f32,
    noise: NoiseField,
}

impl WaveField {
    /// Validate `config` and build the field. `seed` drives the drift noise.
    pub fn new(config: WaveFieldConfig, seed: u32) -> Result<Self, ConfigError> {
        for source in &config.sources {
            source.validate()?;
        }
        ensure_range(
            "displacement clamp",
            config.min_displacement,
            config.max_displacement,
            true,
        )?;
        if let Some(threshold) = config.outer_threshold {
            ensure_positive("outer threshold", threshold)?;
        }
        for (name, value) in [
            ("interference threshold", config.interference_threshold),
            ("interference gain", config.interference_gain),
            ("outer factor", config.outer_factor),
            ("drift amplitude", config.drift.amplitude),
            ("drift scale", config.drift.scale),
            ("drift velocity", config.drift.velocity.length()),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        let clash_point = clash_point(&config.sources, config.solo_clash_radius);
        ensure_positive("clash point", clash_point)?;

        Ok(Self {
            config,
            clash_point,
            noise: NoiseField::new(seed),
        })
    }

    pub fn config(&self) -> &WaveFieldConfig {
        &self.config
    }

    pub fn sources(&self) -> &[WaveSource] {
        &self.config.sources
    }

    /// Radius at which competing fronts meet.
    pub fn clash_point(&self) -> f32 {
        self.clash_point
    }

    /// Clamp range applied by [`displacement`](Self::displacement).
    pub fn clamp_range(&self) -> (f32, f32) {
        (self.config.min_displacement, self.config.max_displacement)
    }

    /// Total displacement at `point` and time `t`, always inside [`clamp_range`](Self::clamp_range).
    pub fn displacement(&self, point: Vec3, t: f32) -> f32 {
        let total = self.ring_displacement(point, t) + self.drift(point, t);
        if total.is_nan() {
            return 0.0f32.clamp(self.config.min_displacement, self.config.max_displacement);
        }
        total.clamp(self.config.min_displacement, self.config.max_displacement)
    }

    /// Ring term only: summed sources, interference and outer attenuation. Unclamped.
    pub fn ring_displacement(&self, point: Vec3, t: f32) -> f32 {
        let mut total = 0.0;
        let mut strong = 0usize;
        for source in &self.config.sources {
            let contribution = self.source_contribution(source, point, t);
            if contribution.abs() > self.config.interference_threshold {
                strong += 1;
            }
            total += contribution;
        }

        if strong >= 2 {
            total *= self.config.interference_gain;
        }

        if let Some(threshold) = self.config.outer_threshold {
            if point.length() > threshold {
                total *= self.config.outer_factor;
            }
        }
        total
    }

    /// Drift term only.
    pub fn drift(&self, point: Vec3, t: f32) -> f32 {
        let drift = &self.config.drift;
        if drift.amplitude == 0.0 {
            return 0.0;
        }
        let lookup = point * drift.scale + drift.velocity * t;
        drift.amplitude
            * self
                .noise
                .fractal_noise(lookup, FractalParams::with_octaves(drift.octaves))
    }

    fn source_contribution(&self, source: &WaveSource, point: Vec3, t: f32) -> f32 {
        let wave_radius = source.radius_at(t);
        let clash = self.clash_point;
        let max_radius = clash + source.thickness * 0.5;

        // A ring that has not left its origin yet contributes nothing.
        if wave_radius <= 0.0 || wave_radius >= max_radius {
            return 0.0;
        }

        let ring_distance = (point.distance(source.origin) - wave_radius).abs();
        if ring_distance >= source.thickness {
            return 0.0;
        }

        let progress = wave_radius / clash;
        let growth =
            source.base_amplitude + (source.max_amplitude - source.base_amplitude) * progress * progress;

        let fade = if wave_radius > clash * 0.95 {
            1.0 - smoothstep(clash * 0.95, max_radius, wave_radius)
        } else {
            1.0
        };

        let intensity = (1.0 - ring_distance / source.thickness) * fade;
        let shape = (ring_distance * source.frequency).sin().abs().powf(source.form);
        shape * intensity * growth
    }
}

/// Half the smallest distance between any two source origins.
fn clash_point(sources: &[WaveSource], solo_radius: f32) -> f32 {
    let mut closest: Option<f32> = None;
    for (i, a) in sources.iter().enumerate() {
        for b in &sources[i + 1..] {
            let d = a.origin.distance(b.origin);
            closest = Some(closest.map_or(d, |c| c.min(d)));
        }
    }
    closest.map_or(solo_radius, |d| d * 0.5)
}
