//! The orbiting-planets scene.
//!
//! A [`SolarSystem`] coordinates four kinds of animated objects every tick:
//!
//! - a background [`StarField`] that slowly rotates and twinkles,
//! - the [`Sun`], an eclipse-shaded displacement sphere scaled up,
//! - the orbit rings of an [`OrbitModel`],
//! - eight planets, each a [`PlanetAnimator`] parked on an orbit.
//!
//! The scene has its own zoom-only [`GalaxyCamera`]; drag rotation is not
//! used here.

use std::f32::consts::PI;

use glam::{Mat4, Quat, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::animation::Animate;
use crate::camera::{OrbitCamera, SmoothZoom};
use crate::error::{ensure_positive, ConfigError};
use crate::frame::{BodyInstance, Frame, FrameState, FrameTime};
use crate::orbit::{OrbitBody, OrbitModel};
use crate::sampler::{DisplacedPoint, DisplacementSampler, SamplerConfig};
use crate::tessellation::Tessellation;
use crate::wave::{WaveField, WaveFieldConfig};

/// Segments per orbit ring.
pub const ORBIT_SEGMENTS: usize = 128;

/// Orbit ring line color (#546074).
pub const ORBIT_COLOR: Vec3 = Vec3::new(0.329, 0.376, 0.455);

// ============================================================================
// Star field
// ============================================================================

/// One background star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub color: Vec3,
    pub size: f32,
    /// Twinkle phase offset in radians.
    pub phase: f32,
}

/// Shell of stars around the scene.
#[derive(Debug, Clone)]
pub struct StarField {
    stars: Vec<Star>,
    radius: f32,
    time: f32,
}

impl StarField {
    /// Radians per second of the whole-field spin.
    pub const ROTATION_SPEED: f32 = 0.01;
    /// Twinkle angular frequency.
    pub const TWINKLE_SPEED: f32 = 2.0;

    /// `count` stars between `0.5·radius` and `radius` from the origin.
    pub fn new(count: usize, radius: f32, seed: u64) -> Result<Self, ConfigError> {
        ensure_positive("star field radius", radius)?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let stars = (0..count).map(|_| random_star(&mut rng, radius)).collect();
        Ok(Self {
            stars,
            radius,
            time: 0.0,
        })
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn update(&mut self, time: f32) {
        self.time = time;
    }

    /// Current spin about Y.
    pub fn rotation_y(&self) -> f32 {
        self.time * Self::ROTATION_SPEED
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.rotation_y())
    }

    /// Brightness multiplier in `[0.7, 1.0]` for star `index`.
    pub fn twinkle(&self, index: usize) -> f32 {
        self.stars.get(index).map_or(1.0, |star| {
            0.85 + 0.15 * (self.time * Self::TWINKLE_SPEED + star.phase).sin()
        })
    }

    pub fn release(&mut self) {
        self.stars = Vec::new();
    }
}

fn random_star(rng: &mut SmallRng, radius: f32) -> Star {
    let theta = rng.gen::<f32>() * 2.0 * PI;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    let distance = radius * (0.5 + rng.gen::<f32>() * 0.5);
    let position = Vec3::new(
        distance * phi.sin() * theta.cos(),
        distance * phi.sin() * theta.sin(),
        distance * phi.cos(),
    );

    // white to blue-white
    let intensity = 0.5 + rng.gen::<f32>() * 0.5;
    let color = Vec3::new(
        intensity * (0.9 + rng.gen::<f32>() * 0.1),
        intensity * (0.9 + rng.gen::<f32>() * 0.1),
        intensity,
    );

    let class = rng.gen::<f32>();
    let (spread, floor) = if class < 0.6 {
        (3.0, 1.0)
    } else if class < 0.85 {
        (4.0, 1.0)
    } else if class < 0.95 {
        (6.0, 2.0)
    } else {
        (8.0, 3.0)
    };
    let size = rng.gen::<f32>() * spread + floor;

    Star {
        position,
        color,
        size,
        phase: rng.gen::<f32>() * 2.0 * PI,
    }
}

// ============================================================================
// Sun
// ============================================================================

/// The eclipse sphere, sampled at its native radius and drawn scaled.
#[derive(Debug)]
pub struct Sun {
    sampler: DisplacementSampler,
    scale: f32,
}

impl Sun {
    /// Radius the eclipse sphere is sampled at.
    pub const NATIVE_RADIUS: f32 = 1.5;

    pub fn new(target_radius: f32, seed: u64) -> Result<Self, ConfigError> {
        ensure_positive("sun radius", target_radius)?;
        let config = SamplerConfig::default()
            .with_radius(Self::NATIVE_RADIUS)
            .with_tessellation(Tessellation::ECLIPSE)
            .with_seed(seed);
        let field = WaveField::new(WaveFieldConfig::default(), seed as u32)?;
        Ok(Self {
            sampler: DisplacementSampler::new(config, field)?,
            scale: target_radius / Self::NATIVE_RADIUS,
        })
    }

    /// Uniform scale from sampled to drawn size.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(self.scale))
    }

    /// Refresh the point cloud. `camera_position` is in world space.
    pub fn update(&mut self, time: f32, camera_position: Vec3) {
        self.sampler.update(time, camera_position / self.scale);
    }

    pub fn points(&self) -> &[DisplacedPoint] {
        self.sampler.points()
    }

    pub fn sampler(&self) -> &DisplacementSampler {
        &self.sampler
    }

    pub fn release(&mut self) {
        self.sampler.release();
    }
}

// ============================================================================
// Planets
// ============================================================================

/// Static description of one planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetSpec {
    pub id: String,
    pub name: String,
    pub orbit_index: usize,
    /// Fixed position on the orbit, radians.
    pub angle: f32,
    pub color: Vec3,
    /// Base render radius.
    pub size: f32,
    pub breathing_speed: f32,
    /// Self-spin in radians per second.
    pub spin_speed: f32,
    pub spin_axis: Vec3,
}

impl PlanetSpec {
    #[allow(clippy::too_many_arguments)]
    fn new(
        number: usize,
        name: &str,
        orbit_index: usize,
        angle: f32,
        color: u32,
        size: f32,
        breathing_speed: f32,
        spin_per_frame: f32,
        spin_axis: Vec3,
    ) -> Self {
        Self {
            id: format!("planet{number}"),
            name: name.to_string(),
            orbit_index,
            angle,
            color: hex_color(color),
            size,
            breathing_speed,
            // authored as radians per 60 Hz frame
            spin_speed: spin_per_frame * 60.0,
            spin_axis,
        }
    }

    /// Two planets per orbit, half a turn apart.
    pub fn solar_default() -> Vec<Self> {
        vec![
            Self::new(1, "Alpha", 0, 0.0, 0xB9B9B9, 0.4, 0.3, 0.005, Vec3::new(0.0, 1.0, 0.2)),
            Self::new(2, "Beta", 0, PI, 0xB9B9B9, 0.42, 0.35, 0.004, Vec3::new(0.1, 1.0, 0.0)),
            Self::new(3, "Gamma", 1, 0.0, 0x00C5C5, 0.5, 0.4, 0.006, Vec3::new(0.0, 1.0, 0.3)),
            Self::new(4, "Delta", 1, PI, 0x00C5C5, 0.48, 0.38, 0.0055, Vec3::new(0.2, 1.0, 0.1)),
            Self::new(5, "Epsilon", 2, 0.0, 0xCE7F01, 0.55, 0.45, 0.007, Vec3::new(0.1, 1.0, 0.2)),
            Self::new(6, "Zeta", 2, PI, 0xCE7F01, 0.52, 0.42, 0.0065, Vec3::new(0.0, 1.0, 0.15)),
            Self::new(7, "Eta", 3, 0.0, 0x00C77F, 0.6, 0.5, 0.008, Vec3::new(0.15, 1.0, 0.25)),
            Self::new(8, "Theta", 3, PI, 0x00C77F, 0.58, 0.48, 0.0075, Vec3::new(0.05, 1.0, 0.3)),
        ]
    }
}

fn hex_color(rgb: u32) -> Vec3 {
    let channel = |shift: u32| ((rgb >> shift) & 0xFF) as f32 / 255.0;
    Vec3::new(channel(16), channel(8), channel(0))
}

/// Per-planet animation state.
#[derive(Debug, Clone)]
pub struct PlanetAnimator {
    spec: PlanetSpec,
    body: OrbitBody,
    axis: Vec3,
    orientation: Quat,
    scale: f32,
}

impl PlanetAnimator {
    pub fn new(spec: PlanetSpec) -> Self {
        let axis = spec.spin_axis.try_normalize().unwrap_or(Vec3::Y);
        let body = OrbitBody::new(spec.orbit_index, spec.angle);
        Self {
            spec,
            body,
            axis,
            orientation: Quat::IDENTITY,
            scale: 1.0,
        }
    }

    pub fn spec(&self) -> &PlanetSpec {
        &self.spec
    }

    pub fn body(&self) -> &OrbitBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut OrbitBody {
        &mut self.body
    }

    pub fn position(&self) -> Vec3 {
        self.body.world_position
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Breathing times distance factor.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn update(&mut self, time: f32, delta: f32, orbits: &OrbitModel, camera_position: Vec3) {
        self.body.advance(delta);
        self.body.place(orbits);

        let spin = Quat::from_axis_angle(self.axis, self.spec.spin_speed * delta);
        self.orientation = (spin * self.orientation).normalize();

        let distance = camera_position.distance(self.body.world_position);
        let distance_factor = if distance > 0.0 {
            (10.0 / distance).clamp(0.5, 1.5)
        } else {
            1.5
        };
        let breathing = 1.0 + 0.05 * (time * self.spec.breathing_speed).sin();
        self.scale = distance_factor * breathing;
    }

    pub fn instance(&self) -> BodyInstance {
        BodyInstance {
            position: self.body.world_position,
            orientation: self.orientation,
            scale: self.spec.size * self.scale,
            color: self.spec.color,
        }
    }
}

// ============================================================================
// Camera
// ============================================================================

/// Zoom-only camera looking at the sun from above the orbital plane.
#[derive(Debug, Clone)]
pub struct GalaxyCamera {
    pub zoom: SmoothZoom,
    camera: OrbitCamera,
    /// Distance scale per wheel delta unit.
    pub wheel_speed: f32,
    /// Distance scale per pixel of pinch spread.
    pub pinch_speed: f32,
}

impl GalaxyCamera {
    /// Camera offset at the reference zoom.
    pub const BASE_POSITION: Vec3 = Vec3::new(0.0, 3.0, 15.0);
    pub const REFERENCE_ZOOM: f32 = 15.0;

    pub fn new() -> Self {
        let zoom = SmoothZoom::new(Self::REFERENCE_ZOOM, 5.0, 30.0);
        let mut camera = Self {
            zoom,
            camera: OrbitCamera::looking_from(Self::BASE_POSITION, Self::BASE_POSITION.length())
                .with_fov(60.0),
            wheel_speed: 0.001,
            pinch_speed: 0.01,
        };
        camera.sync();
        camera
    }

    /// Scrolling down (positive `delta_y`) moves closer.
    pub fn wheel(&mut self, delta_y: f32) {
        self.zoom.nudge(-delta_y * self.wheel_speed);
    }

    /// Spreading two fingers apart by `spread` pixels moves closer.
    pub fn pinch(&mut self, spread: f32) {
        self.zoom.nudge(-spread * self.pinch_speed);
    }

    pub fn update(&mut self) {
        if self.zoom.update() {
            self.sync();
        }
    }

    fn sync(&mut self) {
        let factor = self.zoom.current / Self::REFERENCE_ZOOM;
        self.camera.distance = Self::BASE_POSITION.length() * factor;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    pub fn position(&self) -> Vec3 {
        self.camera.position()
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }
}

impl Default for GalaxyCamera {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Scene
// ============================================================================

/// Stars, sun, orbit rings and planets advanced together.
#[derive(Debug)]
pub struct SolarSystem {
    time: f32,
    star_field: StarField,
    sun: Sun,
    orbits: OrbitModel,
    orbit_paths: Vec<Vec<Vec3>>,
    planets: Vec<PlanetAnimator>,
    instances: Vec<BodyInstance>,
    pub camera: GalaxyCamera,
}

impl SolarSystem {
    pub const STAR_COUNT: usize = 5000;
    pub const STAR_RADIUS: f32 = 100.0;
    pub const SUN_RADIUS: f32 = 4.5;

    /// The default eight-planet layout.
    pub fn new(seed: u64) -> Result<Self, ConfigError> {
        Self::with_layout(OrbitModel::solar_default(), PlanetSpec::solar_default(), seed)
    }

    /// Custom orbits and planets. Every planet must name an existing orbit.
    pub fn with_layout(
        orbits: OrbitModel,
        planets: Vec<PlanetSpec>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if let Some(bad) = planets.iter().find(|p| p.orbit_index >= orbits.len()) {
            return Err(ConfigError::UnknownOrbit {
                index: bad.orbit_index,
                count: orbits.len(),
            });
        }

        let orbit_paths = (0..orbits.len())
            .filter_map(|i| orbits.path(i, ORBIT_SEGMENTS))
            .collect();
        let mut planets: Vec<PlanetAnimator> = planets.into_iter().map(PlanetAnimator::new).collect();
        for planet in &mut planets {
            planet.body_mut().place(&orbits);
        }

        tracing::debug!(
            orbits = orbits.len(),
            planets = planets.len(),
            "solar system created"
        );

        Ok(Self {
            time: 0.0,
            star_field: StarField::new(Self::STAR_COUNT, Self::STAR_RADIUS, seed)?,
            sun: Sun::new(Self::SUN_RADIUS, seed)?,
            orbits,
            orbit_paths,
            instances: Vec::with_capacity(planets.len()),
            planets,
            camera: GalaxyCamera::new(),
        })
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn star_field(&self) -> &StarField {
        &self.star_field
    }

    pub fn sun(&self) -> &Sun {
        &self.sun
    }

    pub fn orbits(&self) -> &OrbitModel {
        &self.orbits
    }

    /// Closed ring polylines, one per orbit.
    pub fn orbit_paths(&self) -> &[Vec<Vec3>] {
        &self.orbit_paths
    }

    pub fn planets(&self) -> &[PlanetAnimator] {
        &self.planets
    }

    pub fn planet(&self, id: &str) -> Option<&PlanetAnimator> {
        self.planets.iter().find(|p| p.spec().id == id)
    }

    pub fn bodies(&self) -> &[BodyInstance] {
        &self.instances
    }

    /// Advance every component by `delta` seconds as seen from `camera_position`.
    pub fn update(&mut self, delta: f32, camera_position: Vec3) {
        self.time += delta;
        let time = self.time;

        self.star_field.update(time);
        self.sun.update(time, camera_position);

        self.instances.clear();
        for planet in &mut self.planets {
            planet.update(time, delta, &self.orbits, camera_position);
            self.instances.push(planet.instance());
        }
    }

    /// Drop all retained geometry.
    pub fn release(&mut self) {
        self.star_field.release();
        self.sun.release();
        self.orbit_paths = Vec::new();
        self.planets = Vec::new();
        self.instances = Vec::new();
    }
}

impl Animate for SolarSystem {
    fn tick(&mut self, time: FrameTime) -> Frame<'_> {
        self.camera.update();
        let camera_position = self.camera.position();
        self.update(time.delta, camera_position);

        let camera = self.camera.camera();
        Frame {
            state: FrameState {
                time,
                camera_position,
                camera_distance: camera.distance,
            },
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            model: self.sun.model_matrix(),
            points: self.sun.points(),
            bodies: &self.instances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::Orbit;

    #[test]
    fn test_star_field_shell() {
        let field = StarField::new(2000, 100.0, 7).unwrap();
        assert_eq!(field.len(), 2000);
        for star in field.stars() {
            let r = star.position.length();
            assert!((49.99..=100.01).contains(&r), "radius {r}");
            assert!(star.color.z >= star.color.x && star.color.z >= star.color.y);
            assert!((1.0..=11.0).contains(&star.size));
        }
        let big = field.stars().iter().filter(|s| s.size > 8.0).count();
        assert!(big < 200, "{big} oversized stars");
    }

    #[test]
    fn test_star_field_motion() {
        let mut field = StarField::new(10, 100.0, 1).unwrap();
        field.update(100.0);
        assert!((field.rotation_y() - 1.0).abs() < 1e-6);
        for i in 0..field.len() {
            let t = field.twinkle(i);
            assert!((0.7..=1.0).contains(&t));
        }
        assert!(StarField::new(10, 0.0, 1).is_err());
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(0xFF0000), Vec3::X);
        let c = hex_color(0x00C5C5);
        assert!((c.y - 197.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_planet_layout() {
        let system = SolarSystem::with_layout(
            OrbitModel::solar_default(),
            PlanetSpec::solar_default(),
            0,
        )
        .unwrap();
        assert_eq!(system.planets().len(), 8);
        assert_eq!(system.orbit_paths().len(), 4);

        // partners sit on opposite sides of their orbit
        let a = system.planet("planet3").unwrap().position();
        let b = system.planet("planet4").unwrap().position();
        assert!((a + b).length() < 1e-3);
        assert!((a.length() - 8.0).abs() < 1e-3);
    }

    #[test]
    fn test_unknown_orbit_rejected() {
        let mut planets = PlanetSpec::solar_default();
        planets[0].orbit_index = 9;
        let err = SolarSystem::with_layout(OrbitModel::solar_default(), planets, 0).unwrap_err();
        assert_eq!(err, ConfigError::UnknownOrbit { index: 9, count: 4 });
    }

    #[test]
    fn test_planet_animation() {
        let orbits = OrbitModel::new(vec![Orbit::circular(5.0)]).unwrap();
        let spec = PlanetSpec::solar_default().remove(0);
        let mut planet = PlanetAnimator::new(spec);

        // far camera: distance factor floors at 0.5
        planet.update(0.0, 0.016, &orbits, Vec3::new(0.0, 0.0, 100.0));
        assert!((planet.scale() - 0.5).abs() < 1e-6);

        // near camera: capped at 1.5, breathing within 5%
        planet.update(1.0, 0.016, &orbits, Vec3::new(5.0, 1.0, 0.0));
        assert!(planet.scale() <= 1.5 * 1.05 + 1e-6);
        assert!(planet.scale() >= 1.5 * 0.95 - 1e-6);
        assert!(planet.orientation() != Quat::IDENTITY);
        assert!((planet.position() - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_galaxy_zoom() {
        let mut camera = GalaxyCamera::new();
        let start = camera.position();
        assert!((start - GalaxyCamera::BASE_POSITION).length() < 1e-3);

        camera.wheel(10_000.0);
        assert_eq!(camera.zoom.target, 5.0);
        for _ in 0..20 {
            camera.update();
        }
        assert!(camera.position().length() < start.length() * 0.5);
    }

    #[test]
    fn test_system_update() {
        let mut system = SolarSystem::new(3).unwrap();
        assert_eq!(system.sun().points().len(), system.sun().sampler().len());
        system.update(0.5, system.camera.position());
        assert!((system.time() - 0.5).abs() < 1e-6);
        assert_eq!(system.bodies().len(), 8);
        assert!((system.star_field().rotation_y() - 0.005).abs() < 1e-6);

        system.release();
        assert!(system.sun().points().is_empty());
        assert!(system.bodies().is_empty());
    }
}
