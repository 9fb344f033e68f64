//! Closed-form orbit positions.
//!
//! An [`Orbit`] is an ellipse in its local XZ plane, tilted into world space
//! by an inclination spread over weighted X/Y/Z rotation axes. Positions are a
//! pure function of `(orbit index, angle)`; bodies that move hold their own
//! angle and advance it each tick.
//!
//! ```ignore
//! let model = OrbitModel::solar_default();
//! let p = model.position_at_angle(1, std::f32::consts::FRAC_PI_2);
//! ```

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ConfigError};

/// Axis weights for an orbit's inclination.
///
/// The inclination angle is applied as `Rx(x·inc)·Ry(y·inc)·Rz(z·inc)`, so
/// `(0, 0, 1)` tilts purely about Z and `(0.7, 0, 0.3)` mixes X and Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiltAxes(pub Vec3);

impl TiltAxes {
    pub const FLAT: Self = Self(Vec3::ZERO);
    pub const X: Self = Self(Vec3::X);
    pub const Z: Self = Self(Vec3::Z);

    pub fn rotation(&self, inclination_radians: f32) -> Quat {
        let w = self.0 * inclination_radians;
        Quat::from_rotation_x(w.x) * Quat::from_rotation_y(w.y) * Quat::from_rotation_z(w.z)
    }
}

impl Default for TiltAxes {
    fn default() -> Self {
        Self::FLAT
    }
}

/// One orbit's static geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orbit {
    /// Semi-major axis.
    pub radius: f32,
    /// Semi-minor / semi-major, in `(0, 1]`. `1` is a circle.
    pub elliptical_ratio: f32,
    pub inclination_degrees: f32,
    pub tilt: TiltAxes,
}

impl Orbit {
    pub fn circular(radius: f32) -> Self {
        Self {
            radius,
            elliptical_ratio: 1.0,
            inclination_degrees: 0.0,
            tilt: TiltAxes::FLAT,
        }
    }

    pub fn with_ratio(mut self, ratio: f32) -> Self {
        self.elliptical_ratio = ratio;
        self
    }

    pub fn inclined(mut self, degrees: f32, tilt: TiltAxes) -> Self {
        self.inclination_degrees = degrees;
        self.tilt = tilt;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("orbit radius", self.radius)?;
        let ratio = self.elliptical_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigError::EllipticalRatio(ratio));
        }
        Ok(())
    }
}

/// Validated orbits with their inclination rotations precomputed.
#[derive(Debug, Clone)]
pub struct OrbitModel {
    orbits: Vec<Orbit>,
    rotations: Vec<Quat>,
}

impl OrbitModel {
    pub fn new(orbits: Vec<Orbit>) -> Result<Self, ConfigError> {
        for orbit in &orbits {
            orbit.validate()?;
        }
        Ok(Self::from_valid(orbits))
    }

    fn from_valid(orbits: Vec<Orbit>) -> Self {
        let rotations = orbits
            .iter()
            .map(|o| o.tilt.rotation(o.inclination_degrees.to_radians()))
            .collect();
        Self { orbits, rotations }
    }

    /// The four-ring layout used by the solar scene.
    pub fn solar_default() -> Self {
        let orbits = vec![
            Orbit::circular(5.0),
            Orbit::circular(8.0).inclined(-162.171, TiltAxes::Z),
            Orbit::circular(11.0).inclined(14.37, TiltAxes::X),
            Orbit::circular(14.0).inclined(45.0, TiltAxes(Vec3::new(0.7, 0.0, 0.3))),
        ];
        Self::from_valid(orbits)
    }

    pub fn orbits(&self) -> &[Orbit] {
        &self.orbits
    }

    pub fn len(&self) -> usize {
        self.orbits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbits.is_empty()
    }

    /// World position on orbit `index` at `angle` radians.
    ///
    /// Returns `None` for an unknown orbit.
    pub fn position_at_angle(&self, index: usize, angle: f32) -> Option<Vec3> {
        let orbit = self.orbits.get(index)?;
        let rotation = self.rotations[index];
        let local = Vec3::new(
            angle.cos() * orbit.radius,
            0.0,
            angle.sin() * orbit.radius * orbit.elliptical_ratio,
        );
        Some(rotation * local)
    }

    /// `segments + 1` points tracing the closed orbit, first == last.
    pub fn path(&self, index: usize, segments: usize) -> Option<Vec<Vec3>> {
        if index >= self.orbits.len() {
            return None;
        }
        let segments = segments.max(3);
        (0..=segments)
            .map(|i| self.position_at_angle(index, i as f32 / segments as f32 * TAU))
            .collect()
    }
}

/// A body riding one orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitBody {
    pub orbit_index: usize,
    /// Current angle in `[0, 2π)`.
    pub angle: f32,
    /// Radians per second. Zero keeps the body parked.
    pub angular_speed: f32,
    pub world_position: Vec3,
}

impl OrbitBody {
    pub fn new(orbit_index: usize, angle: f32) -> Self {
        Self {
            orbit_index,
            angle: angle.rem_euclid(TAU),
            angular_speed: 0.0,
            world_position: Vec3::ZERO,
        }
    }

    pub fn with_angular_speed(mut self, speed: f32) -> Self {
        self.angular_speed = speed;
        self
    }

    pub fn advance(&mut self, dt: f32) {
        if self.angular_speed != 0.0 {
            self.angle = (self.angle + self.angular_speed * dt).rem_euclid(TAU);
        }
    }

    /// Recompute `world_position` from the current angle.
    pub fn place(&mut self, model: &OrbitModel) {
        if let Some(p) = model.position_at_angle(self.orbit_index, self.angle) {
            self.world_position = p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_orbit_closure() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..50 {
            let orbit = Orbit::circular(rng.gen_range(0.5..20.0))
                .with_ratio(rng.gen_range(0.1..=1.0))
                .inclined(
                    rng.gen_range(-180.0..180.0),
                    TiltAxes(Vec3::new(rng.gen(), rng.gen(), rng.gen())),
                );
            let model = OrbitModel::new(vec![orbit]).unwrap();
            let angle = rng.gen_range(-10.0..10.0);
            let a = model.position_at_angle(0, angle).unwrap();
            let b = model.position_at_angle(0, angle + TAU).unwrap();
            assert!(a.distance(b) < 1e-3 * orbit.radius, "{a} vs {b}");
        }
    }

    #[test]
    fn test_circle_degeneracy() {
        let model = OrbitModel::new(vec![Orbit::circular(8.0)]).unwrap();
        for i in 0..64 {
            let p = model.position_at_angle(0, i as f32 * 0.1).unwrap();
            assert!((p.length() - 8.0).abs() < 1e-4);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn test_ellipse_axes() {
        let model = OrbitModel::new(vec![Orbit::circular(10.0).with_ratio(0.5)]).unwrap();
        let x = model.position_at_angle(0, 0.0).unwrap();
        let z = model.position_at_angle(0, TAU / 4.0).unwrap();
        assert!((x - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);
        assert!((z - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_inclination_keeps_radius() {
        let model = OrbitModel::solar_default();
        for (index, orbit) in model.orbits().iter().enumerate() {
            let p = model.position_at_angle(index, 1.234).unwrap();
            assert!((p.length() - orbit.radius).abs() < 1e-3);
        }
        // 45 degrees of mostly-X tilt lifts the quarter point off the plane
        let p = model.position_at_angle(3, TAU / 4.0).unwrap();
        assert!(p.y.abs() > 1.0);
    }

    #[test]
    fn test_rejects_bad_orbits() {
        assert_eq!(
            OrbitModel::new(vec![Orbit::circular(5.0).with_ratio(0.0)]).unwrap_err(),
            ConfigError::EllipticalRatio(0.0)
        );
        assert!(OrbitModel::new(vec![Orbit::circular(5.0).with_ratio(1.5)]).is_err());
        assert!(OrbitModel::new(vec![Orbit::circular(-1.0)]).is_err());
        assert!(OrbitModel::solar_default().position_at_angle(4, 0.0).is_none());
    }

    #[test]
    fn test_path_is_closed() {
        let model = OrbitModel::solar_default();
        let path = model.path(2, 128).unwrap();
        assert_eq!(path.len(), 129);
        assert!(path[0].distance(path[128]) < 1e-3);
        assert!(model.path(9, 16).is_none());
    }

    #[test]
    fn test_body_advance_wraps() {
        let model = OrbitModel::solar_default();
        let mut body = OrbitBody::new(0, 6.0).with_angular_speed(1.0);
        body.advance(1.0);
        assert!(body.angle >= 0.0 && body.angle < TAU);
        assert!((body.angle - (7.0 - TAU)).abs() < 1e-5);
        body.place(&model);
        assert!((body.world_position.length() - 5.0).abs() < 1e-4);

        let mut parked = OrbitBody::new(1, std::f32::consts::PI);
        parked.advance(10.0);
        assert_eq!(parked.angle, std::f32::consts::PI);
    }
}
