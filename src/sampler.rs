//! Per-frame displacement of a sphere point cloud.
//!
//! [`DisplacementSampler`] owns the undisplaced [`SamplePoint`]s and a buffer of
//! [`DisplacedPoint`]s that is overwritten in place on every
//! [`update`](DisplacementSampler::update). For each point it computes:
//!
//! 1. the displaced position along the base normal,
//! 2. a perturbed normal from central differences in the tangent plane,
//! 3. the rim factor and its gradient color,
//! 4. an edge fade and a distance-compensated point size.
//!
//! The camera position passed to `update` must be in the sphere's local frame.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ensure_range, ConfigError};
use crate::gradient::ColorGradient;
use crate::math::{smoothstep, tangent_frame};
use crate::tessellation::{SamplePoint, Tessellation};
use crate::wave::WaveField;

/// Shape, shading and sizing parameters for a [`DisplacementSampler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    pub radius: f32,
    pub tessellation: Tessellation,
    /// Seed for per-point jitter.
    pub seed: u64,
    pub deform_min: f32,
    pub deform_max: f32,
    /// Tangent step for the normal estimate.
    pub epsilon: f32,
    pub normal_strength: f32,
    pub edge_floor: f32,
    /// Fold depth below which points are dimmed further.
    pub fold_threshold: f32,
    pub base_size: f32,
    pub screen_scale: f32,
    /// Camera distance at which points have their nominal size.
    pub reference_distance: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub gradient: ColorGradient,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            radius: 1.5,
            tessellation: Tessellation::WAVE_SPHERE,
            seed: 0,
            deform_min: -0.35,
            deform_max: 0.35,
            epsilon: 0.01,
            normal_strength: 0.3,
            edge_floor: 0.7,
            fold_threshold: -0.15,
            base_size: 6.0,
            screen_scale: 6.0,
            reference_distance: 3.5,
            size_min: 1.0,
            size_max: 12.0,
            gradient: ColorGradient::default(),
        }
    }
}

impl SamplerConfig {
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_tessellation(mut self, tessellation: Tessellation) -> Self {
        self.tessellation = tessellation;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_base_size(mut self, base_size: f32) -> Self {
        self.base_size = base_size;
        self
    }

    pub fn with_reference_distance(mut self, distance: f32) -> Self {
        self.reference_distance = distance;
        self
    }

    pub fn with_gradient(mut self, gradient: ColorGradient) -> Self {
        self.gradient = gradient;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("radius", self.radius)?;
        ensure_positive("normal epsilon", self.epsilon)?;
        ensure_positive("reference distance", self.reference_distance)?;
        ensure_positive("base point size", self.base_size)?;
        ensure_positive("screen scale", self.screen_scale)?;
        ensure_range("deformation", self.deform_min, self.deform_max, true)?;
        ensure_range("point size", self.size_min, self.size_max, true)?;
        for (name, value) in [
            ("normal strength", self.normal_strength),
            ("edge floor", self.edge_floor),
            ("fold threshold", self.fold_threshold),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}

/// One displaced point. Valid until the next `update`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplacedPoint {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
    /// Rim factor, `1 - |dot(normal, view_dir)|`.
    pub color_intensity: f32,
    pub edge_fade: f32,
    pub point_size: f32,
    /// Raw wave displacement at the base position.
    pub fold_depth: f32,
    /// `|position| / radius`.
    pub radial_distance: f32,
}

/// GPU vertex for a displaced point.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    /// xyz position, w point size.
    pub position_size: [f32; 4],
    /// rgb color, a edge fade.
    pub color_fade: [f32; 4],
}

impl From<&DisplacedPoint> for PointVertex {
    fn from(p: &DisplacedPoint) -> Self {
        Self {
            position_size: [p.position.x, p.position.y, p.position.z, p.point_size],
            color_fade: [p.color.x, p.color.y, p.color.z, p.edge_fade],
        }
    }
}

/// Displaces a fixed point set through a [`WaveField`] once per frame.
#[derive(Debug)]
pub struct DisplacementSampler {
    config: SamplerConfig,
    field: WaveField,
    samples: Vec<SamplePoint>,
    points: Vec<DisplacedPoint>,
}

impl DisplacementSampler {
    /// Validate the config and generate the point set.
    pub fn new(config: SamplerConfig, field: WaveField) -> Result<Self, ConfigError> {
        config.validate()?;
        let samples = config.tessellation.generate(config.radius, config.seed)?;
        let points = vec![DisplacedPoint::default(); samples.len()];
        Ok(Self {
            config,
            field,
            samples,
            points,
        })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }

    pub fn samples(&self) -> &[SamplePoint] {
        &self.samples
    }

    /// Displaced points from the last `update`.
    pub fn points(&self) -> &[DisplacedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop all sample storage. Later updates are no-ops.
    pub fn release(&mut self) {
        self.samples = Vec::new();
        self.points = Vec::new();
    }

    /// Shape displacement of a single base point at time `t`.
    pub fn shape_at(&self, base: Vec3, t: f32) -> f32 {
        shape_displacement(&self.config, &self.field, base, t).0
    }

    /// Recompute every displaced point for time `t`.
    pub fn update(&mut self, t: f32, camera_position: Vec3) {
        let camera_distance = camera_position.length();
        let zoom_scale = (camera_distance / self.config.reference_distance).sqrt();
        let cfg = &self.config;
        let field = &self.field;
        let eps = cfg.epsilon;

        for (sample, out) in self.samples.iter().zip(self.points.iter_mut()) {
            let base = sample.base_position;
            let n = base.normalize_or_zero();
            let (shape, fold) = shape_displacement(cfg, field, base, t);
            let position = base + n * shape;

            let (t1, t2) = tangent_frame(n);
            let probe = |q: Vec3| shape_displacement(cfg, field, q, t).0;
            let g1 = (probe(base + t1 * eps) - probe(base - t1 * eps)) / (2.0 * eps);
            let g2 = (probe(base + t2 * eps) - probe(base - t2 * eps)) / (2.0 * eps);
            let mut normal = (n - (t1 * g1 + t2 * g2) * cfg.normal_strength).normalize_or_zero();
            if normal == Vec3::ZERO {
                normal = n;
            }

            let view_dir = (camera_position - position).normalize_or_zero();
            let rim = 1.0 - normal.dot(view_dir).abs();
            let color = cfg.gradient.color_for(smoothstep(0.0, 1.0, rim));

            let mut edge_fade = cfg.edge_floor.max(smoothstep(0.1, 0.9, n.dot(view_dir).abs()));
            if fold < cfg.fold_threshold {
                edge_fade *= (1.0 + fold * 1.5).max(0.6);
            }

            let jitter = 0.95 + sample.random_seed * 0.1;
            let point_size = (cfg.base_size * cfg.screen_scale * zoom_scale * jitter)
                .clamp(cfg.size_min, cfg.size_max);

            *out = DisplacedPoint {
                position,
                normal,
                color,
                color_intensity: rim,
                edge_fade,
                point_size,
                fold_depth: fold,
                radial_distance: position.length() / cfg.radius,
            };
        }
    }

    /// Write the current points as GPU vertices, reusing `out`'s allocation.
    pub fn export_vertices(&self, out: &mut Vec<PointVertex>) {
        out.clear();
        out.extend(self.points.iter().map(PointVertex::from));
    }
}

/// Clamped shape displacement and the raw wave value at `base`.
#[inline]
fn shape_displacement(config: &SamplerConfig, field: &WaveField, base: Vec3, t: f32) -> (f32, f32) {
    let wave = field.displacement(base, t);
    let shape = (config.radius - base.length() + wave).clamp(config.deform_min, config.deform_max);
    (shape, wave)
}
