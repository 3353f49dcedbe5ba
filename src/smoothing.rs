//! Savitzky-Golay smoothing of log-backscatter profiles.
//!
//! Every output point is the value (or derivative) at that point of a least squares polynomial
//! fitted to the window of gates around it. Near the ends of the sequence the window is clamped
//! inside the data and the same fitted polynomial is evaluated off center, so the output has the
//! same length as the input. Missing (NaN) values spread to every output whose window
//! contains them.
use crate::{
    config::Smoothing,
    error::{AnalysisError, Result},
};

/// A smoothed profile and its vertical gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct Smoothed {
    /// The smoothed signal.
    pub signal: Vec<f64>,
    /// First derivative of the smoothed signal, per gate.
    pub gradient: Vec<f64>,
}

/// Smooth a profile and calculate its vertical gradient.
///
/// The gradient is the first derivative filter applied to the smoothed signal with the same
/// window and degree.
///
/// # Examples
///
/// ```rust
/// use cloud_layers::{savgol, Smoothing};
///
/// let line: Vec<f64> = (0..10).map(|i| 2.0 * i as f64 + 1.0).collect();
/// let smoothed = savgol(&line, Smoothing::new(5, 3)).unwrap();
///
/// for (s, x) in smoothed.signal.iter().zip(&line) {
///     assert!((s - x).abs() < 1.0e-9);
/// }
/// for g in &smoothed.gradient {
///     assert!((g - 2.0).abs() < 1.0e-9);
/// }
/// ```
pub fn savgol(x: &[f64], smoothing: Smoothing) -> Result<Smoothed> {
    let signal = savgol_filter(x, smoothing, 0)?;
    let gradient = savgol_filter(&signal, smoothing, 1)?;

    Ok(Smoothed { signal, gradient })
}

/// Apply a Savitzky-Golay filter, returning the smoothed values (`deriv == 0`) or a derivative.
///
/// Fails with `InvalidInput` if the window is not longer than the degree and with
/// `NotEnoughData` if the window is longer than the sequence. A derivative order higher than
/// the degree is identically zero.
pub fn savgol_filter(x: &[f64], smoothing: Smoothing, deriv: usize) -> Result<Vec<f64>> {
    let Smoothing { window, degree } = smoothing;
    let n = x.len();

    if window == 0 || window <= degree {
        return Err(AnalysisError::InvalidInput);
    }
    if window > n {
        return Err(AnalysisError::NotEnoughData);
    }

    if deriv > degree {
        return Ok(vec![0.0; n]);
    }

    // One set of weights for every position a point can take inside its window.
    let weights: Vec<Vec<f64>> = (0..window)
        .map(|pos| fit_weights(window, degree, pos, deriv))
        .collect::<Result<_>>()?;

    let half = window / 2;
    let filtered: Vec<f64> = (0..n)
        .map(|i| {
            let start = i.saturating_sub(half).min(n - window);
            x[start..(start + window)]
                .iter()
                .zip(&weights[i - start])
                .map(|(v, w)| v * w)
                .sum::<f64>()
        })
        .collect();

    Ok(filtered)
}

// Weights that evaluate derivative `deriv` at `pos` of the degree `degree` least squares fit to
// `window` equally spaced points.
fn fit_weights(window: usize, degree: usize, pos: usize, deriv: usize) -> Result<Vec<f64>> {
    let num_coeffs = degree + 1;

    // Vandermonde matrix, centered on the evaluation point so coefficient k is the kth
    // derivative over k!.
    let vander: Vec<Vec<f64>> = (0..window)
        .map(|j| {
            let t = j as f64 - pos as f64;
            let mut power = 1.0;
            (0..num_coeffs)
                .map(|_| {
                    let val = power;
                    power *= t;
                    val
                })
                .collect()
        })
        .collect();

    let normal: Vec<Vec<f64>> = (0..num_coeffs)
        .map(|r| {
            (0..num_coeffs)
                .map(|c| vander.iter().map(|row| row[r] * row[c]).sum::<f64>())
                .collect()
        })
        .collect();

    let mut unit = vec![0.0; num_coeffs];
    unit[deriv] = 1.0;
    let z = solve_linear(normal, unit).ok_or(AnalysisError::InvalidInput)?;

    let factorial: f64 = (1..=deriv).map(|k| k as f64).product();

    Ok(vander
        .iter()
        .map(|row| row.iter().zip(&z).map(|(a, b)| a * b).sum::<f64>() * factorial)
        .collect())
}

// Gaussian elimination with partial pivoting. None if the system is singular.
fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot = ((col + 1)..n).fold(col, |best, r| {
            if a[r][col].abs() > a[best][col].abs() {
                r
            } else {
                best
            }
        });

        if a[pivot][col] == 0.0 || !a[pivot][col].is_finite() {
            return None;
        }

        a.swap(col, pivot);
        b.swap(col, pivot);

        for r in (col + 1)..n {
            let factor = a[r][col] / a[col][col];
            for c in col..n {
                a[r][c] -= factor * a[col][c];
            }
            b[r] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for r in (0..n).rev() {
        let tail: f64 = ((r + 1)..n).map(|c| a[r][c] * x[c]).sum();
        x[r] = (b[r] - tail) / a[r][r];
    }

    Some(x)
}
