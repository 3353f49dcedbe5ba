//! Tunable parameters for cloud detection.
use crate::error::{AnalysisError, Result};

/// Window length and polynomial degree of the Savitzky-Golay smoother.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Smoothing {
    /// Number of gates in the fitting window.
    pub window: usize,
    /// Degree of the local polynomial, must be less than `window`.
    pub degree: usize,
}

impl Smoothing {
    /// Create a new smoothing description.
    #[inline]
    pub fn new(window: usize, degree: usize) -> Self {
        Smoothing { window, degree }
    }

    /// Shrink the window to fit a sequence of `len` gates.
    ///
    /// Windows longer than the sequence become the whole sequence with degree one less than its
    /// length, so the fit stays well posed on thin candidate layers.
    #[inline]
    pub fn clamped_to(self, len: usize) -> Self {
        if len > self.window {
            self
        } else {
            Smoothing {
                window: len,
                degree: len.saturating_sub(1),
            }
        }
    }
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing {
            window: 5,
            degree: 3,
        }
    }
}

/// Parameters for detecting cloud layers in backscatter profiles.
///
/// # Examples
///
/// ```rust
/// use cloud_layers::CloudDetectionConfig;
///
/// let cfg = CloudDetectionConfig::default()
///     .with_smoothing(7, 3)
///     .with_gradient_thresholds(0.5, 0.4)
///     .with_remove_below(3);
///
/// assert!(cfg.validate().is_ok());
/// assert!(cfg.with_smoothing(4, 3).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudDetectionConfig {
    /// Smoothing window and polynomial degree.
    pub smoothing: Smoothing,
    /// Floor on the smoothed backscatter, m⁻¹ sr⁻¹
    pub bsc_thres: f64,
    /// Minimum vertical gradient of log backscatter for a cloud base.
    pub vg_thres_base: f64,
    /// Minimum vertical gradient of log backscatter (looking down) for a cloud top. Also used
    /// when searching for a missing top during refinement.
    pub vg_thres_top: f64,
    /// Number of gates near the instrument that are never considered cloudy.
    pub remove_below: usize,
    /// Whether to fill in the cloud base and top height fields.
    pub compute_heights: bool,
}

impl Default for CloudDetectionConfig {
    fn default() -> Self {
        CloudDetectionConfig {
            smoothing: Smoothing::default(),
            bsc_thres: 1.0e-8,
            vg_thres_base: 0.3,
            vg_thres_top: 0.3,
            remove_below: 0,
            compute_heights: true,
        }
    }
}

impl CloudDetectionConfig {
    /// Builder method for the smoothing window and degree.
    #[inline]
    pub fn with_smoothing(self, window: usize, degree: usize) -> Self {
        CloudDetectionConfig {
            smoothing: Smoothing::new(window, degree),
            ..self
        }
    }

    /// Builder method for the backscatter floor.
    #[inline]
    pub fn with_backscatter_threshold(self, bsc_thres: f64) -> Self {
        CloudDetectionConfig { bsc_thres, ..self }
    }

    /// Builder method for the base and top gradient thresholds.
    #[inline]
    pub fn with_gradient_thresholds(self, vg_thres_base: f64, vg_thres_top: f64) -> Self {
        CloudDetectionConfig {
            vg_thres_base,
            vg_thres_top,
            ..self
        }
    }

    /// Builder method for the number of gates to ignore near the instrument.
    #[inline]
    pub fn with_remove_below(self, remove_below: usize) -> Self {
        CloudDetectionConfig {
            remove_below,
            ..self
        }
    }

    /// Builder method to turn the height fields on or off.
    #[inline]
    pub fn with_heights(self, compute_heights: bool) -> Self {
        CloudDetectionConfig {
            compute_heights,
            ..self
        }
    }

    /// Check the parameters make sense together.
    pub fn validate(&self) -> Result<()> {
        let Smoothing { window, degree } = self.smoothing;

        if window % 2 == 0 || window <= degree {
            return Err(AnalysisError::InvalidInput);
        }

        if !self.bsc_thres.is_finite() || self.bsc_thres <= 0.0 {
            return Err(AnalysisError::InvalidInput);
        }

        if !self.vg_thres_base.is_finite() || !self.vg_thres_top.is_finite() {
            return Err(AnalysisError::InvalidInput);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamped_to() {
        let smoothing = Smoothing::default();
        assert_eq!(smoothing.clamped_to(6), Smoothing::new(5, 3));
        assert_eq!(smoothing.clamped_to(5), Smoothing::new(5, 4));
        assert_eq!(smoothing.clamped_to(4), Smoothing::new(4, 3));
        assert_eq!(smoothing.clamped_to(2), Smoothing::new(2, 1));
        assert_eq!(smoothing.clamped_to(1), Smoothing::new(1, 0));
    }

    #[test]
    fn test_validate() {
        let cfg = CloudDetectionConfig::default();
        assert!(cfg.validate().is_ok());

        assert_eq!(
            cfg.with_smoothing(5, 5).validate(),
            Err(AnalysisError::InvalidInput)
        );
        assert_eq!(
            cfg.with_backscatter_threshold(0.0).validate(),
            Err(AnalysisError::InvalidInput)
        );
        assert_eq!(
            cfg.with_gradient_thresholds(std::f64::NAN, 0.3).validate(),
            Err(AnalysisError::InvalidInput)
        );
    }
}
