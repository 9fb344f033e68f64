//! The embeddable wave sphere.
//!
//! [`WaveSphere`] is the handle an application holds: it is built from
//! options, owns the displacement sampler, camera, zoom and interaction state,
//! and runs them through an [`AnimationLoop`]. The host supplies the frame
//! signal and a [`FrameSink`]:
//!
//! ```ignore
//! let (mut sphere, report) = WaveSphere::create(&json!({ "radius": 2.0 }))?;
//! sphere.on_resize(1280, 720);
//! sphere.start();
//!
//! // On every display frame:
//! sphere.on_frame(now_secs, &mut sink);
//!
//! sphere.dispose();
//! ```

use std::collections::BTreeMap;

use glam::{Mat4, Vec3};
use serde_json::Value;

use crate::animation::{Animate, AnimationLoop, FrameScheduler, LoopState, ManualScheduler};
use crate::camera::{InteractionState, OrbitCamera, ZoomController};
use crate::config::{ConfigOptions, ConfigReport, OptionOutcome, OptionValue, SphereConfig};
use crate::error::SphereError;
use crate::frame::{Frame, FrameSink, FrameState, FrameTime};
use crate::input::{InputAction, ZoomCommand};
use crate::sampler::{DisplacedPoint, DisplacementSampler};
use crate::wave::WaveField;

/// Distance factor of one keyboard zoom step.
const ZOOM_STEP: f32 = 0.8;

/// Sampler, camera and input state advanced by the loop.
#[derive(Debug)]
pub struct SphereScene {
    sampler: DisplacementSampler,
    camera: OrbitCamera,
    zoom: ZoomController,
    interaction: InteractionState,
}

impl SphereScene {
    fn new(config: &SphereConfig) -> Result<Self, SphereError> {
        let field = WaveField::new(config.wave_config(), config.seed as u32)?;
        let sampler = DisplacementSampler::new(config.sampler_config(), field)?;
        let zoom = ZoomController::new(config.camera_distance, config.min_zoom, config.max_zoom)?;

        let interaction = InteractionState::default()
            .with_damping(config.damping)
            .with_auto_rotate(config.auto_rotate, Some(config.auto_rotate_speed))
            .with_controls(config.enable_controls);

        Ok(Self {
            sampler,
            camera: OrbitCamera::new(zoom.distance()),
            zoom,
            interaction,
        })
    }

    pub fn sampler(&self) -> &DisplacementSampler {
        &self.sampler
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Fold queued wheel input and damping into the camera.
    fn step_controls(&mut self, now: f64, dt: f32) {
        self.zoom.update(now);
        let wheel = self.interaction.take_zoom_delta();
        if wheel != 0.0 {
            self.zoom.zoom_to(self.zoom.target() + wheel, false);
        }
        self.interaction.update(dt);
        self.camera.distance = self.zoom.distance();
    }
}

impl Animate for SphereScene {
    fn tick(&mut self, time: FrameTime) -> Frame<'_> {
        self.step_controls(time.now, time.delta);

        let rotation = self.interaction.rotation();
        let camera_position = self.camera.position();
        // the sampler shades in the sphere's own frame
        self.sampler
            .update(time.elapsed, rotation.inverse() * camera_position);

        Frame {
            state: FrameState {
                time,
                camera_position,
                camera_distance: self.camera.distance,
            },
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            model: Mat4::from_quat(rotation),
            points: self.sampler.points(),
            bodies: &[],
        }
    }
}

/// A live wave sphere.
#[derive(Debug)]
pub struct WaveSphere<S: FrameScheduler = ManualScheduler> {
    config: SphereConfig,
    scene: SphereScene,
    animation: AnimationLoop<S>,
    viewport: (u32, u32),
    resolution: (u32, u32),
}

impl WaveSphere<ManualScheduler> {
    /// Build from a flat JSON options object.
    ///
    /// Unknown keys, wrong types and clamped values are logged and returned in
    /// the report; only invalid combinations fail.
    pub fn create(options: &Value) -> Result<(Self, ConfigReport), SphereError> {
        let (config, report) = SphereConfig::from_options(options)?;
        Ok((Self::with_config(config)?, report))
    }

    pub fn with_config(config: SphereConfig) -> Result<Self, SphereError> {
        Self::with_scheduler(config, ManualScheduler::new())
    }
}

impl<S: FrameScheduler> WaveSphere<S> {
    /// Build with a host scheduler. Out-of-range values are clamped.
    pub fn with_scheduler(config: SphereConfig, scheduler: S) -> Result<Self, SphereError> {
        let (config, _) = config.validated()?;
        let scene = SphereScene::new(&config)?;
        tracing::debug!(
            points = scene.sampler.len(),
            radius = config.radius,
            "wave sphere created"
        );
        Ok(Self {
            config,
            scene,
            animation: AnimationLoop::new(scheduler),
            viewport: (0, 0),
            resolution: (0, 0),
        })
    }

    pub fn config(&self) -> &SphereConfig {
        &self.config
    }

    pub fn scene(&self) -> &SphereScene {
        &self.scene
    }

    pub fn points(&self) -> &[DisplacedPoint] {
        self.scene.sampler.points()
    }

    pub fn animation(&self) -> &AnimationLoop<S> {
        &self.animation
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        self.animation.scheduler_mut()
    }

    pub fn state(&self) -> LoopState {
        self.animation.state()
    }

    // ========== Lifecycle ==========

    pub fn start(&mut self) {
        self.animation.start();
    }

    pub fn stop(&mut self) {
        self.animation.stop();
    }

    /// Stop for good and release all point storage. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.animation.dispose() {
            self.scene.sampler.release();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.animation.is_disposed()
    }

    /// Run one frame at host time `now` (seconds) and hand it to `sink`.
    pub fn on_frame<K: FrameSink + ?Sized>(&mut self, now: f64, sink: &mut K) -> LoopState {
        let was_disposed = self.animation.is_disposed();
        let state = self.animation.on_frame(now, &mut self.scene, sink);
        if state == LoopState::Disposed && !was_disposed {
            self.scene.sampler.release();
        }
        state
    }

    // ========== Zoom ==========

    pub fn zoom_to(&mut self, distance: f32, smooth: bool) {
        self.scene.zoom.zoom_to(distance, smooth);
        self.sync_camera();
    }

    pub fn zoom_in(&mut self, factor: f32, smooth: bool) {
        self.scene.zoom.zoom_in(factor, smooth);
        self.sync_camera();
    }

    pub fn zoom_out(&mut self, factor: f32, smooth: bool) {
        self.scene.zoom.zoom_out(factor, smooth);
        self.sync_camera();
    }

    pub fn reset_zoom(&mut self, smooth: bool) {
        self.scene.zoom.reset(smooth);
        self.sync_camera();
    }

    /// `1.0` is fully zoomed in, `0.0` fully out.
    pub fn zoom_level(&self) -> f32 {
        self.scene.zoom.level()
    }

    pub fn set_zoom_level(&mut self, level: f32, smooth: bool) {
        self.scene.zoom.set_level(level, smooth);
        self.sync_camera();
    }

    /// Advance a smooth zoom outside the loop (the loop does this itself).
    pub fn update_zoom(&mut self, now: f64) {
        self.scene.zoom.update(now);
        self.sync_camera();
    }

    pub fn camera_distance(&self) -> f32 {
        self.scene.zoom.distance()
    }

    pub fn camera_position(&self) -> Vec3 {
        self.scene.camera.position()
    }

    fn sync_camera(&mut self) {
        self.scene.camera.distance = self.scene.zoom.distance();
    }

    // ========== Host events ==========

    /// New viewport size in logical pixels. Zero sizes are ignored.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        self.scene.camera.resize(width, height);
        self.update_resolution();
    }

    /// Change the pixel-ratio scale, clamped to the option limits.
    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        match self.config.set_option("pixelRatio", OptionValue::Number(ratio)) {
            OptionOutcome::Clamped { requested, applied } => {
                tracing::warn!(requested, applied, "pixel ratio out of range, clamped");
            }
            OptionOutcome::TypeMismatch => return,
            _ => {}
        }
        self.update_resolution();
    }

    fn update_resolution(&mut self) {
        let (w, h) = self.viewport;
        let ratio = self.config.pixel_ratio;
        self.resolution = (
            ((w as f32 * ratio).round() as u32).max(1),
            ((h as f32 * ratio).round() as u32).max(1),
        );
        if w > 0 {
            tracing::debug!(width = w, height = h, ratio, "viewport resized");
        }
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Render-target size: viewport times pixel ratio.
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.scene.interaction
    }

    pub fn interaction_mut(&mut self) -> &mut InteractionState {
        &mut self.scene.interaction
    }

    /// Apply a discrete action from the input adapter.
    pub fn handle_input(&mut self, action: InputAction) {
        match action {
            InputAction::Resized { width, height } => self.on_resize(width, height),
            InputAction::ScaleFactorChanged(factor) => self.set_pixel_ratio(factor as f32),
            InputAction::Zoom(ZoomCommand::In) => self.zoom_in(ZOOM_STEP, true),
            InputAction::Zoom(ZoomCommand::Out) => self.zoom_out(1.0 / ZOOM_STEP, true),
            InputAction::Zoom(ZoomCommand::Reset) => self.reset_zoom(true),
        }
    }

    /// An offscreen GPU presenter sized to the current resolution.
    #[cfg(feature = "gpu")]
    pub fn gpu_sink(&self) -> Result<crate::gpu::GpuSink, SphereError> {
        let (w, h) = self.resolution;
        Ok(crate::gpu::GpuSink::new(w.max(1), h.max(1))?)
    }
}

/// Live spheres by id, owned by the embedding application.
#[derive(Debug)]
pub struct SphereRegistry<S: FrameScheduler = ManualScheduler> {
    spheres: BTreeMap<String, WaveSphere<S>>,
}

impl<S: FrameScheduler> Default for SphereRegistry<S> {
    fn default() -> Self {
        Self {
            spheres: BTreeMap::new(),
        }
    }
}

impl<S: FrameScheduler> SphereRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sphere` under `id`. A sphere already there is disposed.
    pub fn insert(&mut self, id: impl Into<String>, sphere: WaveSphere<S>) {
        let id = id.into();
        if let Some(mut previous) = self.spheres.insert(id.clone(), sphere) {
            tracing::debug!(id = id.as_str(), "replacing registered sphere");
            previous.dispose();
        }
    }

    pub fn get(&self, id: &str) -> Option<&WaveSphere<S>> {
        self.spheres.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut WaveSphere<S>> {
        self.spheres.get_mut(id)
    }

    /// Unregister and dispose. Returns the disposed handle.
    pub fn remove(&mut self, id: &str) -> Option<WaveSphere<S>> {
        let mut sphere = self.spheres.remove(id)?;
        sphere.dispose();
        Some(sphere)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.spheres.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Dispose and drop every sphere.
    pub fn clear(&mut self) {
        for sphere in self.spheres.values_mut() {
            sphere.dispose();
        }
        self.spheres.clear();
    }
}
