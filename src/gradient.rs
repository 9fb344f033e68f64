//! Cumulative band gradients for rim coloring.
//!
//! A [`ColorGradient`] starts from a base color and blends toward each band's
//! color in turn, using the *running* color as the blend source. Band order is
//! part of the look: reordering bands changes the result.
//!
//! # Presets
//!
//! | Preset | Look |
//! |--------|------|
//! | [`GradientPreset::Eclipse`] | near-black core, violet → red → gold rim |
//! | [`GradientPreset::Corona`] | eclipse ramp finished with a pale glow |
//! | [`GradientPreset::Fire`] | dark red → orange → yellow |
//! | [`GradientPreset::Ice`] | white → blue |
//! | [`GradientPreset::Ocean`] | deep blue → cyan |
//! | [`GradientPreset::Magma`] | black → purple → pale yellow |

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::math::{mix, smoothstep};

/// One step of the ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientBand {
    /// The band only applies once `t` exceeds this.
    pub low: f32,
    /// Blend weight reaches `strength` at this value.
    pub high: f32,
    pub color: Vec3,
    /// Maximum blend weight, in `[0, 1]`.
    pub strength: f32,
}

impl GradientBand {
    pub const fn new(low: f32, high: f32, color: Vec3, strength: f32) -> Self {
        Self {
            low,
            high,
            color,
            strength,
        }
    }
}

/// Built-in gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GradientPreset {
    #[default]
    Eclipse,
    Corona,
    Fire,
    Ice,
    Ocean,
    Magma,
}

impl GradientPreset {
    /// Five evenly spaced stops for the palette-style presets.
    fn stops(&self) -> Option<[Vec3; 5]> {
        match self {
            GradientPreset::Eclipse | GradientPreset::Corona => None,
            GradientPreset::Fire => Some([
                Vec3::new(0.1, 0.0, 0.0),  // Dark red
                Vec3::new(0.5, 0.0, 0.0),  // Red
                Vec3::new(1.0, 0.3, 0.0),  // Orange
                Vec3::new(1.0, 0.7, 0.0),  // Amber
                Vec3::new(1.0, 1.0, 0.4),  // Yellow
            ]),
            GradientPreset::Ice => Some([
                Vec3::new(1.0, 1.0, 1.0), // White
                Vec3::new(0.8, 0.9, 1.0), // Light blue
                Vec3::new(0.4, 0.7, 1.0),
                Vec3::new(0.2, 0.4, 0.9),
                Vec3::new(0.1, 0.2, 0.6), // Deep blue
            ]),
            GradientPreset::Ocean => Some([
                Vec3::new(0.0, 0.05, 0.15), // Deep blue
                Vec3::new(0.0, 0.2, 0.4),
                Vec3::new(0.0, 0.4, 0.6),
                Vec3::new(0.2, 0.6, 0.8),
                Vec3::new(0.6, 0.9, 1.0), // Cyan
            ]),
            GradientPreset::Magma => Some([
                Vec3::new(0.001, 0.0, 0.014),   // Black
                Vec3::new(0.329, 0.071, 0.435), // Purple
                Vec3::new(0.716, 0.215, 0.475), // Pink
                Vec3::new(0.994, 0.541, 0.380), // Orange
                Vec3::new(0.987, 0.991, 0.749), // Light yellow
            ]),
        }
    }

    /// Build the gradient for this preset.
    pub fn gradient(&self) -> ColorGradient {
        if let Some(stops) = self.stops() {
            return ColorGradient::from_stops(&stops);
        }

        let mut bands = ECLIPSE_BANDS.to_vec();
        if *self == GradientPreset::Corona {
            bands.push(GradientBand::new(0.97, 1.0, Vec3::new(1.0, 1.0, 0.5), 0.6));
        }
        ColorGradient {
            base: ECLIPSE_CORE,
            bands,
        }
    }
}

const ECLIPSE_CORE: Vec3 = Vec3::new(0.078, 0.098, 0.086);

const ECLIPSE_BANDS: [GradientBand; 8] = [
    GradientBand::new(0.0, 0.25, Vec3::new(0.12, 0.0, 0.30), 1.0), // Deep violet
    GradientBand::new(0.20, 0.35, Vec3::new(0.35, 0.0, 0.7), 0.9), // Purple
    GradientBand::new(0.50, 0.65, Vec3::new(0.6, 0.0, 0.6), 0.95), // Magenta
    GradientBand::new(0.60, 0.72, Vec3::new(0.85, 0.15, 0.45), 0.9), // Pink
    GradientBand::new(0.70, 0.80, Vec3::new(1.0, 0.1, 0.2), 0.95), // Red
    GradientBand::new(0.80, 0.90, Vec3::new(1.0, 0.4, 0.0), 0.85), // Orange
    GradientBand::new(0.88, 0.95, Vec3::new(1.0, 0.8, 0.2), 0.9),  // Golden
    GradientBand::new(0.95, 1.0, Vec3::new(1.0, 0.9, 0.4), 1.0),   // Bright gold
];

/// Ordered band gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GradientParts")]
pub struct ColorGradient {
    base: Vec3,
    bands: Vec<GradientBand>,
}

/// Unchecked serialized form, validated through [`ColorGradient::new`].
#[derive(Deserialize)]
struct GradientParts {
    base: Vec3,
    bands: Vec<GradientBand>,
}

impl TryFrom<GradientParts> for ColorGradient {
    type Error = ConfigError;

    fn try_from(parts: GradientParts) -> Result<Self, Self::Error> {
        Self::new(parts.base, parts.bands)
    }
}

impl Default for ColorGradient {
    fn default() -> Self {
        GradientPreset::Eclipse.gradient()
    }
}

impl ColorGradient {
    /// Validate bands and build a gradient.
    ///
    /// Bands must be sorted by `low`, each with `low < high` and
    /// `strength` in `[0, 1]`.
    pub fn new(base: Vec3, bands: Vec<GradientBand>) -> Result<Self, ConfigError> {
        let mut previous_low = f32::NEG_INFINITY;
        for (index, band) in bands.iter().enumerate() {
            if !(band.low.is_finite() && band.high.is_finite()) || !band.color.is_finite() {
                return Err(ConfigError::GradientBand {
                    index,
                    reason: "thresholds and color must be finite",
                });
            }
            if band.low >= band.high {
                return Err(ConfigError::GradientBand {
                    index,
                    reason: "low threshold must be below high threshold",
                });
            }
            if !(0.0..=1.0).contains(&band.strength) {
                return Err(ConfigError::GradientBand {
                    index,
                    reason: "strength must lie in [0, 1]",
                });
            }
            if band.low < previous_low {
                return Err(ConfigError::GradientBand {
                    index,
                    reason: "bands must be sorted by low threshold",
                });
            }
            previous_low = band.low;
        }
        Ok(Self { base, bands })
    }

    /// Evenly spaced full-strength bands, one per stop after the first.
    pub fn from_stops(stops: &[Vec3]) -> Self {
        let Some((&base, rest)) = stops.split_first() else {
            return Self {
                base: Vec3::ZERO,
                bands: Vec::new(),
            };
        };
        let step = 1.0 / rest.len().max(1) as f32;
        let bands = rest
            .iter()
            .enumerate()
            .map(|(i, &color)| GradientBand::new(i as f32 * step, (i + 1) as f32 * step, color, 1.0))
            .collect();
        Self { base, bands }
    }

    pub fn base(&self) -> Vec3 {
        self.base
    }

    pub fn bands(&self) -> &[GradientBand] {
        &self.bands
    }

    /// Color at `t`. Callers clamp `t`; values outside `[0, 1]` are not clamped here.
    pub fn color_for(&self, t: f32) -> Vec3 {
        let mut color = self.base;
        for band in &self.bands {
            if t > band.low {
                let weight = smoothstep(band.low, band.high, t) * band.strength;
                color = mix(color, band.color, weight);
            }
        }
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESETS: [GradientPreset; 6] = [
        GradientPreset::Eclipse,
        GradientPreset::Corona,
        GradientPreset::Fire,
        GradientPreset::Ice,
        GradientPreset::Ocean,
        GradientPreset::Magma,
    ];

    #[test]
    fn test_endpoints() {
        let eclipse = GradientPreset::Eclipse.gradient();
        assert_eq!(eclipse.color_for(0.0), ECLIPSE_CORE);
        assert!((eclipse.color_for(1.0) - Vec3::new(1.0, 0.9, 0.4)).length() < 1e-5);

        let fire = GradientPreset::Fire.gradient();
        assert_eq!(fire.color_for(0.0), Vec3::new(0.1, 0.0, 0.0));
        assert!((fire.color_for(1.0) - Vec3::new(1.0, 1.0, 0.4)).length() < 1e-5);
    }

    #[test]
    fn test_continuous() {
        for preset in PRESETS {
            let gradient = preset.gradient();
            let mut previous = gradient.color_for(0.0);
            for i in 1..=10_000 {
                let color = gradient.color_for(i as f32 / 10_000.0);
                assert!(
                    (color - previous).length() < 0.01,
                    "{preset:?} jumps at t = {}",
                    i as f32 / 10_000.0
                );
                previous = color;
            }
        }
    }

    #[test]
    fn test_order_matters() {
        let a = GradientBand::new(0.0, 0.5, Vec3::X, 0.5);
        let b = GradientBand::new(0.0, 0.5, Vec3::Y, 0.5);
        let ab = ColorGradient::new(Vec3::ZERO, vec![a, b]).unwrap();
        let ba = ColorGradient::new(Vec3::ZERO, vec![b, a]).unwrap();
        assert_ne!(ab.color_for(0.6), ba.color_for(0.6));
    }

    #[test]
    fn test_rejects_bad_bands() {
        let unsorted = vec![
            GradientBand::new(0.5, 0.6, Vec3::X, 1.0),
            GradientBand::new(0.1, 0.2, Vec3::Y, 1.0),
        ];
        assert_eq!(
            ColorGradient::new(Vec3::ZERO, unsorted),
            Err(ConfigError::GradientBand {
                index: 1,
                reason: "bands must be sorted by low threshold"
            })
        );

        let inverted = vec![GradientBand::new(0.6, 0.5, Vec3::X, 1.0)];
        assert!(ColorGradient::new(Vec3::ZERO, inverted).is_err());

        let strong = vec![GradientBand::new(0.1, 0.5, Vec3::X, 1.5)];
        assert!(ColorGradient::new(Vec3::ZERO, strong).is_err());
    }

    #[test]
    fn test_presets_validate() {
        for preset in PRESETS {
            let g = preset.gradient();
            assert!(ColorGradient::new(g.base(), g.bands().to_vec()).is_ok());
        }
    }

    #[test]
    fn test_deserialize_validates_bands() {
        let json = serde_json::to_value(GradientPreset::Fire.gradient()).unwrap();
        let back: ColorGradient = serde_json::from_value(json).unwrap();
        assert_eq!(back, GradientPreset::Fire.gradient());

        let band = |low: f32, strength: f32| {
            serde_json::json!({ "low": low, "high": low + 0.1, "color": [1.0, 0.0, 0.0], "strength": strength })
        };
        let unsorted = serde_json::json!({ "base": [0.0, 0.0, 0.0], "bands": [band(0.5, 1.0), band(0.1, 1.0)] });
        let err = serde_json::from_value::<ColorGradient>(unsorted).unwrap_err();
        assert!(err.to_string().contains("sorted"), "{err}");

        let too_strong = serde_json::json!({ "base": [0.0, 0.0, 0.0], "bands": [band(0.1, 2.0)] });
        assert!(serde_json::from_value::<ColorGradient>(too_strong).is_err());
    }
}
