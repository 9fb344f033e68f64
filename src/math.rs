//! Small scalar helpers shared by the wave, sampler and gradient code.

use glam::Vec3;

/// Hermite interpolation between `edge0` and `edge1`, clamped to `[0, 1]`.
///
/// Matches the shading-language built-in, including the reversed-edge case
/// (`edge0 > edge1`) which yields a falling curve.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let span = edge1 - edge0;
    if span == 0.0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / span).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear blend of two colors.
#[inline]
pub fn mix(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Ease-out cubic: fast start, gentle landing.
#[inline]
pub fn ease_out_cubic(progress: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Two unit tangents spanning the plane orthogonal to `normal`.
///
/// Uses the world up axis, falling back to X near the poles.
pub fn tangent_frame(normal: Vec3) -> (Vec3, Vec3) {
    let mut t1 = normal.cross(Vec3::Y);
    if t1.length() < 0.01 {
        t1 = normal.cross(Vec3::X);
    }
    let t1 = t1.normalize_or_zero();
    let t2 = normal.cross(t1).normalize_or_zero();
    (t1, t2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
        assert!((smoothstep(1.0, 0.0, 0.25) - 0.84375).abs() < 1e-6);
    }

    #[test]
    fn test_ease_out_cubic() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
        assert_eq!(ease_out_cubic(3.0), 1.0);
    }

    #[test]
    fn test_tangent_frame_orthonormal() {
        for n in [Vec3::X, Vec3::Y, Vec3::NEG_Y, Vec3::new(0.3, 0.8, -0.5).normalize()] {
            let (t1, t2) = tangent_frame(n);
            assert!((t1.length() - 1.0).abs() < 1e-5);
            assert!((t2.length() - 1.0).abs() < 1e-5);
            assert!(t1.dot(n).abs() < 1e-5);
            assert!(t2.dot(n).abs() < 1e-5);
            assert!(t1.dot(t2).abs() < 1e-5);
        }
    }
}
