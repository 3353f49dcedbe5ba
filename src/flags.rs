//! Per gate quality flags and NaN masking of flagged data.
//!
//! The cloud detector works on backscatter where untrustworthy gates are already missing. These
//! functions compute the flags from plain thresholds and blank out the flagged gates.
use crate::error::{AnalysisError, Result};
use itertools::izip;
use strum_macros::Display;

/// Quality of a single value.
///
/// The numeric values match the flag values written to product files. Higher is worse, so
/// combining flags is just taking the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum QualityFlag {
    /// Nothing wrong with the value.
    Good = 0,
    /// Value outside its physically valid range.
    Invalid = 1,
    /// Signal to noise ratio too low.
    LowSnr = 2,
    /// Estimated error too high.
    HighError = 4,
}

impl Default for QualityFlag {
    fn default() -> Self {
        QualityFlag::Good
    }
}

impl From<QualityFlag> for u8 {
    fn from(flag: QualityFlag) -> u8 {
        flag as u8
    }
}

/// Thresholds used by `flag_variable`. Infinite bounds disable the corresponding check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlagThresholds {
    /// Smallest valid value.
    pub min_value: f64,
    /// Largest valid value.
    pub max_value: f64,
    /// Largest acceptable error estimate.
    pub max_error: f64,
    /// Smallest acceptable signal to noise ratio.
    pub min_snr: f64,
}

impl Default for FlagThresholds {
    fn default() -> Self {
        FlagThresholds {
            min_value: std::f64::NEG_INFINITY,
            max_value: std::f64::INFINITY,
            max_error: std::f64::INFINITY,
            min_snr: 1.0,
        }
    }
}

/// Flag every value of a variable.
///
/// The checks run in the order range, signal to noise ratio, error, and a failed check replaces
/// whatever flag an earlier check set. Missing values never fail the range check, they are
/// expected to be handled as missing downstream. The SNR and error checks only run when the
/// corresponding sequence is given.
///
/// # Examples
///
/// ```rust
/// use cloud_layers::{flag_variable, FlagThresholds, QualityFlag};
///
/// let values = [1.0, 50.0, 2.0, 3.0];
/// let snr = [5.0, 5.0, 0.5, 0.5];
/// let errors = [0.1, 0.1, 0.1, 9.0];
///
/// let thresholds = FlagThresholds {
///     max_value: 10.0,
///     max_error: 1.0,
///     ..FlagThresholds::default()
/// };
///
/// let flags = flag_variable(&values, Some(&errors[..]), Some(&snr[..]), &thresholds).unwrap();
/// assert_eq!(
///     flags,
///     vec![QualityFlag::Good, QualityFlag::Invalid, QualityFlag::LowSnr, QualityFlag::HighError]
/// );
/// ```
pub fn flag_variable(
    values: &[f64],
    errors: Option<&[f64]>,
    snr: Option<&[f64]>,
    thresholds: &FlagThresholds,
) -> Result<Vec<QualityFlag>> {
    let n = values.len();
    if errors.map(|e| e.len() != n).unwrap_or(false) || snr.map(|s| s.len() != n).unwrap_or(false)
    {
        return Err(AnalysisError::MismatchedDimensions);
    }

    let mut flags = vec![QualityFlag::Good; n];

    let FlagThresholds {
        min_value,
        max_value,
        max_error,
        min_snr,
    } = *thresholds;

    if min_value > std::f64::NEG_INFINITY || max_value < std::f64::INFINITY {
        for (flag, &v) in flags.iter_mut().zip(values) {
            if v < min_value || v > max_value {
                *flag = QualityFlag::Invalid;
            }
        }
    }

    if let Some(snr) = snr {
        for (flag, &s) in flags.iter_mut().zip(snr) {
            if s < min_snr {
                *flag = QualityFlag::LowSnr;
            }
        }
    }

    if let Some(errors) = errors {
        for (flag, &e) in flags.iter_mut().zip(errors) {
            if e > max_error {
                *flag = QualityFlag::HighError;
            }
        }
    }

    Ok(flags)
}

/// Combine the flags of two variables that are used together, e.g. the two wind components.
pub fn combine_flags(a: &[QualityFlag], b: &[QualityFlag]) -> Result<Vec<QualityFlag>> {
    if a.len() != b.len() {
        return Err(AnalysisError::MismatchedDimensions);
    }

    Ok(a.iter().zip(b).map(|(&a, &b)| a.max(b)).collect())
}

/// Copy `values`, replacing every value that is not flagged `Good` with NaN.
pub fn mask_flagged(values: &[f64], flags: &[QualityFlag]) -> Result<Vec<f64>> {
    if values.len() != flags.len() {
        return Err(AnalysisError::MismatchedDimensions);
    }

    Ok(izip!(values, flags)
        .map(|(&v, &flag)| {
            if flag == QualityFlag::Good {
                v
            } else {
                std::f64::NAN
            }
        })
        .collect())
}
