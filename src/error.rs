//! Error types for wavesphere.
//!
//! Construction-time problems (bad configuration, a missing GPU) are the only
//! failures this crate reports. Per-frame computation is total and never
//! returns an error.

/// Invalid construction parameters.
///
/// Raised synchronously by constructors; never produced during a frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A radius, thickness or similar length was zero, negative or not finite.
    #[error("{name} must be a positive finite number, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    /// A wave cycle period was zero or negative.
    #[error("wave cycle period must be positive, got {0}")]
    CyclePeriod(f32),

    /// The lower bound of a range is not below its upper bound.
    #[error("{name} range is inverted: min {min} must be below max {max}")]
    InvertedRange { name: &'static str, min: f32, max: f32 },

    /// An orbit's semi-minor/semi-major ratio was outside `(0, 1]`.
    #[error("elliptical ratio must lie in (0, 1], got {0}")]
    EllipticalRatio(f32),

    /// Gradient bands were out of order or malformed.
    #[error("gradient band {index} is invalid: {reason}")]
    GradientBand { index: usize, reason: &'static str },

    /// A body referenced an orbit that does not exist.
    #[error("orbit index {index} is out of range ({count} orbits configured)")]
    UnknownOrbit { index: usize, count: usize },

    /// The option object passed to construction was not a flat JSON object.
    #[error("options must be a JSON object, got {0}")]
    NotAnObject(String),

    /// A named preset does not exist.
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
}

/// Errors raised while acquiring the GPU used to present point buffers.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    /// Failed to create GPU device.
    #[cfg(feature = "gpu")]
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors returned when creating a [`WaveSphere`](crate::WaveSphere).
#[derive(Debug, thiserror::Error)]
pub enum SphereError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The rendering surface could not be created or attached.
    #[error("rendering runtime unavailable: {0}")]
    RuntimeUnavailable(#[from] GpuError),
}

/// Errors reported by a [`FrameSink`](crate::frame::FrameSink) while presenting.
///
/// The animation loop logs these and carries on with the next frame.
#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    /// The presentation target went away (window closed, context lost).
    #[error("presentation target lost")]
    TargetLost,

    /// Anything else the sink wants to report.
    #[error("present failed: {0}")]
    Other(String),
}

/// Check that `value` is finite and strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

/// Check that `min < max` (or `min <= max` when `allow_equal`).
pub(crate) fn ensure_range(
    name: &'static str,
    min: f32,
    max: f32,
    allow_equal: bool,
) -> Result<(), ConfigError> {
    let ordered = if allow_equal { min <= max } else { min < max };
    if min.is_finite() && max.is_finite() && ordered {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { name, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("radius", 1.5).is_ok());
        assert_eq!(
            ensure_positive("radius", 0.0),
            Err(ConfigError::NonPositive { name: "radius", value: 0.0 })
        );
        assert!(ensure_positive("radius", f32::NAN).is_err());
        assert!(ensure_positive("radius", f32::INFINITY).is_err());
    }

    #[test]
    fn test_ensure_range() {
        assert!(ensure_range("zoom", 2.0, 15.0, false).is_ok());
        assert!(ensure_range("zoom", 2.0, 2.0, false).is_err());
        assert!(ensure_range("clamp", 2.0, 2.0, true).is_ok());
        assert!(ensure_range("zoom", 3.0, 2.0, true).is_err());
    }

    #[test]
    fn test_sphere_error_wraps_config() {
        let err: SphereError = ConfigError::CyclePeriod(0.0).into();
        assert!(matches!(err, SphereError::Config(ConfigError::CyclePeriod(_))));
        assert_eq!(err.to_string(), "wave cycle period must be positive, got 0");
    }
}
