use snafu::prelude::*;

use crate::{InvalidConfigSnafu, SegmentError};

pub const DEFAULT_SUPERPIXELS: u32 = 15;
pub const DEFAULT_COMPACTNESS: f32 = 1.0;
// Total |dx| + |dy| over all centroids, in pixels
pub const DEFAULT_CONVERGENCE_THRESHOLD: f32 = 10.0;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// The space in which color distances (and seeding gradients) are measured.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ColorSpace {
    /// Raw 8-bit sRGB channels.
    #[default]
    Rgb,
    /// Oklab, scaled by 255 to keep the compactness weight on a similar scale.
    Oklab,
}

/// What to do with a centroid that ends up with no member pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum EmptyClusterPolicy {
    /// Keep the centroid at its previous position and color.
    #[default]
    Retain,
    /// Remove the centroid, shrinking the superpixel count.
    Drop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Approximate number of superpixels (K).
    pub superpixels: u32,
    /// Compactness weight (m). The spatial term is scaled by `m / S`.
    pub compactness: f32,
    /// The loop stops once the total centroid displacement drops below this.
    pub convergence_threshold: f32,
    pub max_iterations: usize,
    pub color_space: ColorSpace,
    pub empty_clusters: EmptyClusterPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            superpixels: DEFAULT_SUPERPIXELS,
            compactness: DEFAULT_COMPACTNESS,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            color_space: ColorSpace::default(),
            empty_clusters: EmptyClusterPolicy::default(),
        }
    }
}

impl Config {
    pub fn with_superpixels(self, superpixels: u32) -> Self {
        Self {
            superpixels,
            ..self
        }
    }

    pub fn with_compactness(self, compactness: f32) -> Self {
        Self {
            compactness,
            ..self
        }
    }

    pub fn with_convergence_threshold(self, convergence_threshold: f32) -> Self {
        Self {
            convergence_threshold,
            ..self
        }
    }

    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    pub fn with_color_space(self, color_space: ColorSpace) -> Self {
        Self {
            color_space,
            ..self
        }
    }

    pub fn with_empty_clusters(self, empty_clusters: EmptyClusterPolicy) -> Self {
        Self {
            empty_clusters,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), SegmentError> {
        ensure!(
            self.superpixels > 0,
            InvalidConfigSnafu {
                reason: "superpixel count must be positive"
            }
        );
        ensure!(
            self.compactness.is_finite() && self.compactness > 0.0,
            InvalidConfigSnafu {
                reason: "compactness must be a positive finite number"
            }
        );
        ensure!(
            self.convergence_threshold.is_finite() && self.convergence_threshold >= 0.0,
            InvalidConfigSnafu {
                reason: "convergence threshold must be a non-negative finite number"
            }
        );
        ensure!(
            self.max_iterations > 0,
            InvalidConfigSnafu {
                reason: "max iterations must be positive"
            }
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.superpixels, 15);
        assert_eq!(config.color_space, ColorSpace::Rgb);
        assert_eq!(config.empty_clusters, EmptyClusterPolicy::Retain);
    }

    #[test]
    fn builders_override_single_fields() {
        let config = Config::default()
            .with_superpixels(200)
            .with_compactness(10.0)
            .with_max_iterations(5);
        assert_eq!(config.superpixels, 200);
        assert_eq!(config.compactness, 10.0);
        assert_eq!(config.max_iterations, 5);
        assert_eq!(
            config.convergence_threshold,
            DEFAULT_CONVERGENCE_THRESHOLD
        );
    }

    #[test]
    fn rejects_zero_superpixels() {
        let err = Config::default().with_superpixels(0).validate().unwrap_err();
        assert!(err.to_string().contains("superpixel count"));
    }

    #[test]
    fn rejects_bad_compactness() {
        for m in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let result = Config::default().with_compactness(m).validate();
            assert!(result.is_err(), "compactness {m} should be rejected");
        }
    }

    #[test]
    fn rejects_negative_threshold() {
        let result = Config::default()
            .with_convergence_threshold(-1.0)
            .validate();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_iterations() {
        let result = Config::default().with_max_iterations(0).validate();
        assert!(result.is_err());
    }
}
