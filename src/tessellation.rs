//! Deterministic sphere point sets.
//!
//! Two layouts are supported:
//!
//! - [`Tessellation::Hexagonal`] - latitude rows whose point count follows the
//!   row circumference, with every other row shifted half a step so points
//!   pack like a honeycomb. Each pole is a single point.
//! - [`Tessellation::Uv`] - a plain latitude/longitude grid.
//!
//! Every point also gets a random seed in `[0, 1)` from a seeded `SmallRng`, so
//! the same layout and seed always produce the same cloud.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::error::{ensure_positive, ConfigError};

/// One point of the undisplaced shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub base_position: Vec3,
    /// Per-point jitter source in `[0, 1)`.
    pub random_seed: f32,
}

/// Point layout on the sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tessellation {
    /// Honeycomb rows. `lat_rows + 1` rows from pole to pole, roughly
    /// `points_per_circle` points around the equator.
    Hexagonal { lat_rows: u32, points_per_circle: u32 },
    /// `(lat_rows + 1) × lon_count` grid.
    Uv { lat_rows: u32, lon_count: u32 },
}

impl Tessellation {
    /// The wave sphere layout: 240 rows, 360 points around the equator.
    pub const WAVE_SPHERE: Tessellation = Tessellation::Hexagonal {
        lat_rows: 240,
        points_per_circle: 360,
    };

    /// The eclipse sphere layout: 180 × 180 grid.
    pub const ECLIPSE: Tessellation = Tessellation::Uv {
        lat_rows: 180,
        lon_count: 180,
    };

    /// Generate points on a sphere of `radius`.
    pub fn generate(&self, radius: f32, seed: u64) -> Result<Vec<SamplePoint>, ConfigError> {
        ensure_positive("radius", radius)?;
        let positions = match *self {
            Tessellation::Hexagonal {
                lat_rows,
                points_per_circle,
            } => hexagonal_positions(radius, lat_rows.max(1), points_per_circle.max(3)),
            Tessellation::Uv { lat_rows, lon_count } => {
                uv_positions(radius, lat_rows.max(1), lon_count.max(3))
            }
        };

        let mut rng = SmallRng::seed_from_u64(seed);
        Ok(positions
            .into_iter()
            .map(|base_position| SamplePoint {
                base_position,
                random_seed: rng.gen::<f32>(),
            })
            .collect())
    }
}

impl Default for Tessellation {
    fn default() -> Self {
        Self::WAVE_SPHERE
    }
}

#[inline]
fn spherical(radius: f32, theta: f32, phi: f32) -> Vec3 {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Vec3::new(
        radius * sin_theta * cos_phi,
        radius * cos_theta,
        radius * sin_theta * sin_phi,
    )
}

fn hexagonal_positions(radius: f32, lat_rows: u32, points_per_circle: u32) -> Vec<Vec3> {
    let row_height = PI / lat_rows as f32;
    let target_spacing = TAU * radius / points_per_circle as f32;
    let mut points = Vec::new();

    for lat in 0..=lat_rows {
        if lat == 0 || lat == lat_rows {
            points.push(Vec3::Y * if lat == 0 { radius } else { -radius });
            continue;
        }
        let theta = lat as f32 * row_height;
        let circumference = TAU * radius * theta.sin();
        let lon_count = ((circumference / target_spacing).round() as u32).max(3);
        let offset = if lat % 2 == 1 {
            PI / lon_count as f32
        } else {
            0.0
        };

        for lon in 0..lon_count {
            let phi = lon as f32 / lon_count as f32 * TAU + offset;
            points.push(spherical(radius, theta, phi));
        }
    }
    points
}

/// Full grid, pole rows included, so the row/column indexing stays regular.
fn uv_positions(radius: f32, lat_rows: u32, lon_count: u32) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(((lat_rows + 1) * lon_count) as usize);
    for lat in 0..=lat_rows {
        let theta = lat as f32 / lat_rows as f32 * PI;
        for lon in 0..lon_count {
            let phi = lon as f32 / lon_count as f32 * TAU;
            points.push(spherical(radius, theta, phi));
        }
    }
    points
}
