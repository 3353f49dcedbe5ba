//! Pair every cloud base with a top, or throw the base away.
//!
//! The base and top detectors run independently, so a profile can come out of edge detection
//! with a base that has no top above it. For each such base the part of the profile between it
//! and the next base up is searched again for the strongest top-like gradient maximum. If there
//! is one strong enough it becomes the top of the layer, otherwise the base is cleared.
use crate::{
    config::Smoothing,
    error::{AnalysisError, Result},
    smoothing::{savgol, Smoothed},
};
use itertools::Itertools;
use log::info;

/// A base cleared by `refine_cloud_detection` because no top could be found for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscardedBase {
    /// Gate index of the base in the full profile.
    pub gate: usize,
    /// Strongest usable gradient found above the base, if there was any at all.
    pub max_gradient: Option<f64>,
}

// Outcome of searching one window for a top.
enum TopSearch {
    // Offset of the top from the start of the window.
    Found(usize),
    NotFound(Option<f64>),
}

/// Make sure every cloud base in a profile has a matching cloud top.
///
/// `base` and `top` are full length indicators aligned with `bsc`, they are corrected in place.
/// Bases are only ever removed and at most one top is added per base. The bases that were
/// removed are returned in increasing altitude order.
///
/// `smoothing` is the nominal smoothing, it is shrunk to fit windows that are too short for it.
/// A window with fewer than three gates has no interior gate that could hold a top.
pub fn refine_cloud_detection(
    bsc: &[f64],
    base: &mut [u8],
    top: &mut [u8],
    smoothing: Smoothing,
    bsc_thres: f64,
    vg_thres: f64,
) -> Result<Vec<DiscardedBase>> {
    if base.len() != bsc.len() || top.len() != bsc.len() {
        return Err(AnalysisError::MismatchedDimensions);
    }

    // Positions are fixed up front, bases cleared below still bound the windows of the others.
    let bases: Vec<usize> = base.iter().positions(|&b| b > 0).collect();
    let mut discarded = vec![];

    for (k, &start) in bases.iter().enumerate() {
        // Up to the next base, the highest base searches to the end of the profile.
        let end = bases.get(k + 1).copied().unwrap_or(bsc.len());

        if top[(start + 1)..end].iter().any(|&t| t > 0) {
            continue;
        }

        match find_top(&bsc[start..end], smoothing, bsc_thres, vg_thres)? {
            TopSearch::Found(offset) => top[start + offset] = 1,
            TopSearch::NotFound(max_gradient) => {
                base[start] = 0;
                info!(
                    target: "refine",
                    "no cloud top found in gates {}..{} above base at gate {}, removing the base",
                    start,
                    end,
                    start
                );
                discarded.push(DiscardedBase {
                    gate: start,
                    max_gradient,
                });
            }
        }
    }

    Ok(discarded)
}

fn find_top(
    bsc: &[f64],
    smoothing: Smoothing,
    bsc_thres: f64,
    vg_thres: f64,
) -> Result<TopSearch> {
    let len = bsc.len();
    if len < 3 {
        return Ok(TopSearch::NotFound(None));
    }

    // Upside down, so a top looks like a base.
    let x: Vec<f64> = bsc.iter().rev().map(|b| b.ln()).collect();
    let Smoothed {
        signal,
        mut gradient,
    } = savgol(&x, smoothing.clamped_to(len))?;

    // NaN marks a gradient sample that can not be a top.
    let floor = bsc_thres.ln();
    for p in 1..(len - 1) {
        if signal[p + 1] < floor {
            gradient[p] = std::f64::NAN;
        }
    }

    let snapshot = gradient.clone();
    for (p, (&before, &y, &after)) in snapshot.iter().tuple_windows().enumerate() {
        if !(after - y < 0.0 && before - y < 0.0) {
            gradient[p + 1] = std::f64::NAN;
        }
    }

    let best = gradient[1..(len - 1)]
        .iter()
        .enumerate()
        .filter(|(_, y)| !y.is_nan())
        .fold(None, |best: Option<(usize, f64)>, (p, &y)| match best {
            Some((_, best_y)) if best_y >= y => best,
            _ => Some((p + 1, y)),
        });

    Ok(match best {
        Some((p, y)) if y >= vg_thres => TopSearch::Found(len - 1 - p),
        Some((_, y)) => TopSearch::NotFound(Some(y)),
        None => TopSearch::NotFound(None),
    })
}
