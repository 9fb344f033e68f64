//! Camera, zoom and rotation state.
//!
//! - [`OrbitCamera`] - yaw/pitch/distance camera around a target point.
//! - [`ZoomController`] - clamped camera distance with optional eased
//!   transitions.
//! - [`SmoothZoom`] - exponential approach to a target distance, used by the
//!   solar-system scene.
//! - [`InteractionState`] - damped model rotation driven by drags and
//!   auto-rotation.
//!
//! None of these listen to events. The host (or [`InputAdapter`](crate::input::InputAdapter))
//! writes into them and the animation loop reads them once per tick.

use glam::{Mat4, Quat, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::error::{ensure_positive, ensure_range, ConfigError};
use crate::math::ease_out_cubic;

/// Orbit camera around a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
}

impl OrbitCamera {
    /// Camera on +Z looking at the origin.
    pub fn new(distance: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance,
            target: Vec3::ZERO,
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            aspect: 1.0,
        }
    }

    /// Camera whose offset from the target points along `direction`.
    pub fn looking_from(direction: Vec3, distance: f32) -> Self {
        let dir = direction.normalize_or_zero();
        let mut camera = Self::new(distance);
        camera.pitch = dir.y.clamp(-1.0, 1.0).asin();
        camera.yaw = dir.x.atan2(dir.z);
        camera
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov_degrees = fov_degrees;
        self
    }

    /// World position of the camera.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Update the aspect ratio. Zero-sized surfaces keep the previous aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(3.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ZoomTransition {
    from: f32,
    to: f32,
    /// Host time of the first update after the request.
    started: Option<f64>,
}

/// Camera distance clamped to `[min, max]`, with optional eased transitions.
///
/// Level `1.0` is fully zoomed in (`min`), `0.0` fully out (`max`).
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomController {
    distance: f32,
    default_distance: f32,
    min: f32,
    max: f32,
    /// Seconds per smooth transition.
    duration: f32,
    transition: Option<ZoomTransition>,
}

impl ZoomController {
    pub const DEFAULT_DURATION: f32 = 0.5;

    /// `default_distance` is clamped into `[min, max]`.
    pub fn new(default_distance: f32, min: f32, max: f32) -> Result<Self, ConfigError> {
        ensure_positive("min zoom", min)?;
        ensure_range("zoom", min, max, false)?;
        ensure_positive("camera distance", default_distance)?;
        let default_distance = default_distance.clamp(min, max);
        Ok(Self {
            distance: default_distance,
            default_distance,
            min,
            max,
            duration: Self::DEFAULT_DURATION,
            transition: None,
        })
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    /// Current camera distance.
    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Where the camera is heading (the current distance when idle).
    pub fn target(&self) -> f32 {
        self.transition.map_or(self.distance, |t| t.to)
    }

    pub fn default_distance(&self) -> f32 {
        self.default_distance
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Move to `distance`, clamped to the zoom range.
    pub fn zoom_to(&mut self, distance: f32, smooth: bool) {
        if distance.is_nan() {
            return;
        }
        let target = distance.clamp(self.min, self.max);
        if smooth && self.duration > 0.0 && target != self.distance {
            self.transition = Some(ZoomTransition {
                from: self.distance,
                to: target,
                started: None,
            });
        } else {
            self.transition = None;
            self.distance = target;
        }
    }

    /// Multiply the current distance by `factor` (below 1 moves closer).
    pub fn zoom_in(&mut self, factor: f32, smooth: bool) {
        self.zoom_to(self.distance * factor, smooth);
    }

    /// Multiply the current distance by `factor` (above 1 moves away).
    pub fn zoom_out(&mut self, factor: f32, smooth: bool) {
        self.zoom_to(self.distance * factor, smooth);
    }

    pub fn reset(&mut self, smooth: bool) {
        self.zoom_to(self.default_distance, smooth);
    }

    /// Normalized zoom level in `[0, 1]`, `1` meaning closest.
    pub fn level(&self) -> f32 {
        let range = self.max - self.min;
        (1.0 - (self.distance - self.min) / range).clamp(0.0, 1.0)
    }

    /// Zoom to a normalized level. Values outside `[0, 1]` are clamped.
    pub fn set_level(&mut self, level: f32, smooth: bool) {
        if level.is_nan() {
            return;
        }
        let level = level.clamp(0.0, 1.0);
        self.zoom_to(self.max - level * (self.max - self.min), smooth);
    }

    /// Advance a running transition to host time `now` (seconds).
    pub fn update(&mut self, now: f64) {
        let Some(mut transition) = self.transition else {
            return;
        };
        let started = *transition.started.get_or_insert(now);
        let progress = ((now - started) as f32 / self.duration).clamp(0.0, 1.0);
        let eased = ease_out_cubic(progress);
        self.distance = transition.from + (transition.to - transition.from) * eased;

        if progress >= 1.0 {
            self.distance = transition.to;
            self.transition = None;
        } else {
            self.transition = Some(transition);
        }
    }
}

/// Exponential approach to a target distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothZoom {
    pub current: f32,
    pub target: f32,
    pub min: f32,
    pub max: f32,
    /// Fraction of the remaining gap closed per tick.
    pub smoothing: f32,
}

impl SmoothZoom {
    pub fn new(current: f32, min: f32, max: f32) -> Self {
        let current = current.clamp(min, max);
        Self {
            current,
            target: current,
            min,
            max,
            smoothing: 0.5,
        }
    }

    /// Shift the target by `delta`, clamped to the range.
    pub fn nudge(&mut self, delta: f32) {
        self.target = (self.target + delta).clamp(self.min, self.max);
    }

    /// Returns `true` when the distance changed.
    pub fn update(&mut self) -> bool {
        let gap = self.target - self.current;
        if gap.abs() > 0.01 {
            self.current += gap * self.smoothing;
            true
        } else {
            false
        }
    }
}

/// Frame rate at which `damping` and `auto_rotate_speed` are nominal.
pub const REFERENCE_FPS: f32 = 60.0;

/// Damped model rotation.
///
/// `x` is the tilt about the horizontal axis, `y` the spin about the vertical.
/// Damping and auto-rotation are expressed per frame at [`REFERENCE_FPS`] and
/// rescaled by the real frame delta in [`update`](Self::update).
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    pub target_rotation: Vec2,
    pub current_rotation: Vec2,
    pub dragging: bool,
    /// Fraction of the remaining rotation applied per reference frame.
    pub damping: f32,
    pub auto_rotate: bool,
    /// Radians added to the target spin per reference frame while idle.
    pub auto_rotate_speed: f32,
    pub enabled: bool,
    /// Radians per pixel of drag.
    pub drag_sensitivity: f32,
    /// Distance units per wheel delta unit.
    pub wheel_sensitivity: f32,
    zoom_delta: f32,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            target_rotation: Vec2::ZERO,
            current_rotation: Vec2::ZERO,
            dragging: false,
            damping: 0.1,
            auto_rotate: true,
            auto_rotate_speed: 0.0008,
            enabled: true,
            drag_sensitivity: 0.01,
            wheel_sensitivity: 0.001,
            zoom_delta: 0.0,
        }
    }
}

impl InteractionState {
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Toggle auto-rotation; `speed` replaces the current speed when given.
    pub fn with_auto_rotate(mut self, enabled: bool, speed: Option<f32>) -> Self {
        self.auto_rotate = enabled;
        if let Some(speed) = speed {
            self.auto_rotate_speed = speed;
        }
        self
    }

    pub fn with_controls(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn begin_drag(&mut self) {
        if self.enabled {
            self.dragging = true;
        }
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Apply a pointer movement in pixels. Ignored unless dragging.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        if !self.enabled || !self.dragging {
            return;
        }
        self.target_rotation.y += dx * self.drag_sensitivity;
        self.target_rotation.x =
            (self.target_rotation.x + dy * self.drag_sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Queue a wheel movement. Positive `delta_y` moves the camera away.
    pub fn scroll(&mut self, delta_y: f32) {
        if self.enabled && delta_y.is_finite() {
            self.zoom_delta += delta_y * self.wheel_sensitivity;
        }
    }

    /// Queued zoom change in distance units, cleared on read.
    pub fn take_zoom_delta(&mut self) -> f32 {
        std::mem::take(&mut self.zoom_delta)
    }

    /// Advance by `dt` seconds: damping, then auto-rotation if idle.
    ///
    /// Two half steps land where one full step does, so the motion does not
    /// depend on the frame rate.
    pub fn update(&mut self, dt: f32) {
        let frames = if dt.is_finite() { (dt * REFERENCE_FPS).max(0.0) } else { 0.0 };
        if frames == 0.0 {
            return;
        }
        let follow = 1.0 - (1.0 - self.damping.clamp(0.0, 1.0)).powf(frames);
        self.current_rotation += (self.target_rotation - self.current_rotation) * follow;
        if self.auto_rotate && !self.dragging {
            self.target_rotation.y += self.auto_rotate_speed * frames;
        }
    }

    /// Current rotation as a quaternion (tilt, then spin).
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_x(self.current_rotation.x) * Quat::from_rotation_y(self.current_rotation.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / REFERENCE_FPS;

    #[test]
    fn test_camera_position() {
        let camera = OrbitCamera::new(3.5);
        assert!((camera.position() - Vec3::new(0.0, 0.0, 3.5)).length() < 1e-6);

        let from = Vec3::new(0.0, 3.0, 15.0);
        let camera = OrbitCamera::looking_from(from, from.length());
        assert!((camera.position() - from).length() < 1e-4);
    }

    #[test]
    fn test_camera_resize() {
        let mut camera = OrbitCamera::default();
        camera.resize(1920, 1080);
        assert!((camera.aspect() - 16.0 / 9.0).abs() < 1e-6);
        camera.resize(0, 1080);
        assert!((camera.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_sequence() {
        let mut zoom = ZoomController::new(3.5, 2.0, 15.0).unwrap();
        zoom.zoom_in(0.8, false);
        assert!((zoom.distance() - 2.8).abs() < 1e-6);
        zoom.zoom_in(0.5, false);
        assert_eq!(zoom.distance(), 2.0);
        zoom.reset(false);
        assert_eq!(zoom.distance(), 3.5);
    }

    #[test]
    fn test_zoom_level_clamped() {
        let mut zoom = ZoomController::new(3.5, 2.0, 15.0).unwrap();
        for level in [-3.0, -0.1, 0.0, 0.25, 1.0, 1.7, 40.0] {
            zoom.set_level(level, false);
            let d = zoom.distance();
            assert!((2.0..=15.0).contains(&d));
            let expected = level.clamp(0.0, 1.0);
            assert!((zoom.level() - expected).abs() < 1e-5);
        }
        zoom.set_level(1.0, false);
        assert_eq!(zoom.distance(), 2.0);
        zoom.set_level(0.0, false);
        assert_eq!(zoom.distance(), 15.0);
    }

    #[test]
    fn test_smooth_zoom_eases() {
        let mut zoom = ZoomController::new(10.0, 2.0, 15.0).unwrap();
        zoom.zoom_to(4.0, true);
        assert_eq!(zoom.distance(), 10.0);
        assert_eq!(zoom.target(), 4.0);

        zoom.update(1.0);
        assert_eq!(zoom.distance(), 10.0);
        zoom.update(1.25);
        // ease-out: past the midpoint at half time
        assert!(zoom.distance() < 7.0);
        zoom.update(1.5);
        assert_eq!(zoom.distance(), 4.0);
        assert!(!zoom.is_animating());
    }

    #[test]
    fn test_zoom_rejects_bad_range() {
        assert!(ZoomController::new(3.5, 15.0, 2.0).is_err());
        assert!(ZoomController::new(3.5, 5.0, 5.0).is_err());
        assert!(ZoomController::new(3.5, 0.0, 5.0).is_err());
    }

    #[test]
    fn test_smooth_zoom_exponential() {
        let mut zoom = SmoothZoom::new(15.0, 5.0, 30.0);
        zoom.nudge(-100.0);
        assert_eq!(zoom.target, 5.0);
        assert!(zoom.update());
        assert_eq!(zoom.current, 10.0);
        for _ in 0..20 {
            zoom.update();
        }
        assert!((zoom.current - 5.0).abs() <= 0.01);
        assert!(!zoom.update());
    }

    #[test]
    fn test_interaction_damping() {
        let mut state = InteractionState::default().with_auto_rotate(false, None);
        state.begin_drag();
        state.drag(100.0, 0.0);
        assert!((state.target_rotation.y - 1.0).abs() < 1e-6);
        state.update(FRAME);
        assert!((state.current_rotation.y - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_interaction_independent_of_frame_rate() {
        let mut at_60 = InteractionState::default();
        let mut at_120 = InteractionState::default();
        for state in [&mut at_60, &mut at_120] {
            state.target_rotation = Vec2::new(0.5, 1.0);
        }

        for _ in 0..60 {
            at_60.update(FRAME);
            at_120.update(FRAME / 2.0);
            at_120.update(FRAME / 2.0);
        }
        assert!((at_60.current_rotation - at_120.current_rotation).length() < 1e-4);
        assert!((at_60.target_rotation.y - at_120.target_rotation.y).abs() < 1e-5);
        // one second of idle spin at the default speed
        assert!((at_60.target_rotation.y - (1.0 + 60.0 * 0.0008)).abs() < 1e-5);
    }

    #[test]
    fn test_interaction_ignores_empty_step() {
        let mut state = InteractionState::default();
        state.target_rotation = Vec2::new(0.0, 1.0);
        state.update(0.0);
        state.update(-1.0);
        state.update(f32::NAN);
        assert_eq!(state.current_rotation, Vec2::ZERO);
        assert_eq!(state.target_rotation.y, 1.0);
    }

    #[test]
    fn test_interaction_builders() {
        let state = InteractionState::default()
            .with_damping(0.3)
            .with_auto_rotate(false, Some(0.002))
            .with_controls(false);
        assert_eq!(state.damping, 0.3);
        assert!(!state.auto_rotate);
        assert_eq!(state.auto_rotate_speed, 0.002);
        assert!(!state.enabled);

        let kept = InteractionState::default().with_auto_rotate(true, None);
        assert_eq!(kept.auto_rotate_speed, 0.0008);
    }

    #[test]
    fn test_interaction_pitch_clamped() {
        let mut state = InteractionState::default();
        state.begin_drag();
        state.drag(0.0, 10_000.0);
        assert_eq!(state.target_rotation.x, FRAC_PI_2);
        state.drag(0.0, -50_000.0);
        assert_eq!(state.target_rotation.x, -FRAC_PI_2);
    }

    #[test]
    fn test_auto_rotate_only_when_idle() {
        let mut state = InteractionState::default();
        state.update(FRAME);
        assert!((state.target_rotation.y - 0.0008).abs() < 1e-7);
        let spun = state.target_rotation.y;
        state.begin_drag();
        state.update(FRAME);
        assert_eq!(state.target_rotation.y, spun);
    }

    #[test]
    fn test_disabled_controls_ignore_input() {
        let mut state = InteractionState::default().with_controls(false);
        state.begin_drag();
        state.drag(50.0, 50.0);
        state.scroll(500.0);
        assert_eq!(state.target_rotation, Vec2::ZERO);
        assert_eq!(state.take_zoom_delta(), 0.0);
    }

    #[test]
    fn test_scroll_accumulates() {
        let mut state = InteractionState::default();
        state.scroll(100.0);
        state.scroll(50.0);
        assert!((state.take_zoom_delta() - 0.15).abs() < 1e-6);
        assert_eq!(state.take_zoom_delta(), 0.0);
    }
}
