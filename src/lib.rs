//! # wavesphere - procedural wave spheres and orbiting planets
//!
//! Point-cloud spheres whose surface is pushed around by expanding ring waves,
//! shaded with a rim-lit color gradient, plus a small solar-system scene with
//! orbiting planets. Everything is CPU-side and deterministic; presentation is
//! handed to a [`FrameSink`] once per frame.
//!
//! ## Quick Start
//!
//! ```ignore
//! use wavesphere::prelude::*;
//!
//! let (mut sphere, report) = WaveSphere::create(&serde_json::json!({
//!     "radius": 1.5,
//!     "waveSpeed": 0.25,
//!     "waveCycle": 4.0,
//! }))?;
//! assert!(report.is_clean());
//!
//! sphere.on_resize(1280, 720);
//! sphere.start();
//! let mut sink = RecordingSink::new();
//! sphere.on_frame(0.0, &mut sink);
//! ```
//!
//! ## Pipeline
//!
//! Each frame flows leaf to root:
//!
//! ```text
//! SceneClock -> AnimationLoop -> DisplacementSampler -> WaveField -> NoiseField
//!                             \-> OrbitModel / PlanetAnimator
//!                                   ColorGradient (per-point shading)
//!                             -> FrameSink
//! ```
//!
//! - [`noise::NoiseField`] - seeded gradient noise with fractal octaves.
//! - [`wave::WaveField`] - ring waves, interference, outer inversion, drift,
//!   clamped to a fixed range.
//! - [`sampler::DisplacementSampler`] - displaced positions, normals, rim
//!   color, edge fade and point sizes for every sample point.
//! - [`gradient::ColorGradient`] - cumulative smoothstep color bands.
//! - [`orbit::OrbitModel`] - closed-form inclined elliptical orbits.
//! - [`animation::AnimationLoop`] - running/stopped/disposed state machine.
//!
//! ## Configuration
//!
//! [`SphereConfig`] is a plain struct with builder methods. It can also be
//! filled from a flat JSON object or a `sphere-*` query string; unknown keys
//! are reported, out-of-range values are clamped. Named presets live in
//! [`SpherePreset`].
//!
//! ## Features
//!
//! - `gpu` (default): [`gpu::GpuSink`], an offscreen wgpu presenter.

extern crate self as wavesphere;

pub mod animation;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod gradient;
pub mod input;
pub mod math;
pub mod noise;
pub mod orbit;
pub mod sampler;
pub mod solar;
pub mod sphere;
pub mod tessellation;
pub mod time;
pub mod wave;

pub use animation::{Animate, AnimationLoop, FrameScheduler, LoopState, ManualScheduler};
pub use camera::{InteractionState, OrbitCamera, SmoothZoom, ZoomController};
pub use config::{ConfigOptions, ConfigReport, OptionOutcome, OptionValue, PresetName, SphereConfig, SpherePreset};
pub use error::{ConfigError, GpuError, PresentError, SphereError};
pub use frame::{BodyInstance, Frame, FrameSink, FrameState, FrameTime, NullSink, PresentOutcome, RecordingSink};
pub use glam::{Vec2, Vec3};
pub use gradient::{ColorGradient, GradientBand, GradientPreset};
pub use input::{InputAction, InputAdapter, ZoomCommand};
pub use noise::{FractalParams, NoiseField};
pub use orbit::{Orbit, OrbitBody, OrbitModel, TiltAxes};
pub use sampler::{DisplacedPoint, DisplacementSampler, PointVertex, SamplerConfig};
pub use solar::{GalaxyCamera, PlanetAnimator, PlanetSpec, SolarSystem, StarField, Sun};
pub use sphere::{SphereRegistry, WaveSphere};
pub use tessellation::{SamplePoint, Tessellation};
pub use time::SceneClock;
pub use wave::{DriftParams, WaveField, WaveFieldConfig, WaveSource, REFERENCE_RADIUS};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use wavesphere::prelude::*;
/// ```
pub mod prelude {
    pub use crate::animation::{Animate, AnimationLoop, LoopState, ManualScheduler};
    pub use crate::config::{SphereConfig, SpherePreset};
    pub use crate::error::{ConfigError, SphereError};
    pub use crate::frame::{Frame, FrameSink, NullSink, PresentOutcome, RecordingSink};
    pub use crate::gradient::{ColorGradient, GradientPreset};
    pub use crate::input::{InputAction, InputAdapter};
    pub use crate::orbit::{Orbit, OrbitModel};
    pub use crate::solar::SolarSystem;
    pub use crate::sphere::{SphereRegistry, WaveSphere};
    pub use crate::wave::{WaveFieldConfig, WaveSource};
    pub use crate::{Vec2, Vec3};
    #[cfg(feature = "gpu")]
    pub use crate::gpu::GpuSink;
}
