//! Detect cloud edges from the vertical gradient of smoothed log-backscatter.
//!
//! A cloud base shows up as a sharp increase in backscatter going up, a cloud top as a sharp
//! increase going down. Both are found by the same scan, for tops the profile is turned upside
//! down before smoothing and the result is turned back afterwards.
//!
//! Indicators only cover the interior gates of the profile. The first and last gate can never be
//! a local maximum of the gradient, so they are left out instead of being reported as zero.
use crate::{
    config::Smoothing,
    error::{AnalysisError, Result},
    grid::Grid,
    smoothing::{savgol, Smoothed},
};
use itertools::{izip, Itertools};
use metfor::Meters;
use optional::{none, some, Optioned};
use strum_macros::{Display, EnumString};

/// Which edge of a cloud layer to look for.
///
/// # Examples
///
/// ```rust
/// use cloud_layers::{AnalysisError, EdgeKind};
///
/// assert_eq!("base".parse::<EdgeKind>().unwrap(), EdgeKind::Base);
/// assert_eq!(EdgeKind::Top.to_string(), "top");
///
/// let bad: Result<EdgeKind, AnalysisError> = "middle".parse::<EdgeKind>().map_err(Into::into);
/// assert_eq!(bad, Err(AnalysisError::InvalidEdgeKind));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EdgeKind {
    /// Bottom of a layer, scanning up from the instrument.
    Base,
    /// Top of a layer, scanning down from the top of the profile.
    Top,
}

/// Flag the cloud edges in a backscatter profile.
///
/// The returned indicator has one entry per interior gate (`bsc.len() - 2` entries), 1 where an
/// edge was found. Interior gate `i` is flagged when, in scan order, the gradient at `i` is a
/// strict local maximum, exceeds `vg_thres`, and the smoothed backscatter at the gate *before*
/// `i` exceeds `bsc_thres`.
///
/// Non-positive and missing backscatter values never produce an edge near them.
pub fn detect_cloud_edge(
    bsc: &[f64],
    smoothing: Smoothing,
    bsc_thres: f64,
    vg_thres: f64,
    kind: EdgeKind,
) -> Result<Vec<u8>> {
    let mut x: Vec<f64> = bsc.iter().map(|b| b.ln()).collect();
    if kind == EdgeKind::Top {
        x.reverse();
    }

    let Smoothed { signal, gradient } = savgol(&x, smoothing)?;
    let floor = bsc_thres.ln();

    let mut edges: Vec<u8> = gradient
        .iter()
        .tuple_windows::<(_, _, _)>()
        .zip(&signal)
        .map(|((&before, &y, &after), &xf_before)| {
            let is_edge =
                after - y < 0.0 && before - y < 0.0 && y > vg_thres && xf_before > floor;
            is_edge as u8
        })
        .collect();

    if kind == EdgeKind::Top {
        edges.reverse();
    }

    Ok(edges)
}

/// Same as `detect_cloud_edge`, but also return the altitude of every flagged interior gate.
pub fn detect_cloud_edge_heights(
    bsc: &[f64],
    altitude: &[Meters],
    smoothing: Smoothing,
    bsc_thres: f64,
    vg_thres: f64,
    kind: EdgeKind,
) -> Result<(Vec<u8>, Vec<Optioned<Meters>>)> {
    if altitude.len() != bsc.len() {
        return Err(AnalysisError::MismatchedDimensions);
    }

    let edges = detect_cloud_edge(bsc, smoothing, bsc_thres, vg_thres, kind)?;
    let heights = izip!(&edges, altitude.iter().skip(1))
        .map(|(&flag, &alt)| if flag > 0 { some(alt) } else { none() })
        .collect();

    Ok((edges, heights))
}

/// Run `detect_cloud_edge` on every row of a `time × range` grid.
///
/// The result has two fewer columns than the input.
pub fn detect_cloud_edges(
    bsc: &Grid<f64>,
    smoothing: Smoothing,
    bsc_thres: f64,
    vg_thres: f64,
    kind: EdgeKind,
) -> Result<Grid<u8>> {
    let num_cols = bsc.num_cols().saturating_sub(2);
    let mut data = Vec::with_capacity(bsc.num_rows() * num_cols);

    for row in bsc.rows() {
        data.extend(detect_cloud_edge(row, smoothing, bsc_thres, vg_thres, kind)?);
    }

    Grid::from_vec(bsc.num_rows(), num_cols, data)
}

/// Copy an interior indicator into a full length row, the boundary gates are left at zero.
pub(crate) fn embed_interior(interior: &[u8], full_row: &mut [u8]) {
    debug_assert_eq!(interior.len() + 2, full_row.len());

    let n = full_row.len();
    full_row[0] = 0;
    full_row[n - 1] = 0;
    full_row[1..(n - 1)].copy_from_slice(interior);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_data::{altitude_grid, thin_cloud_profile, uniform_profile};

    fn flagged(edges: &[u8]) -> Vec<usize> {
        // Convert interior positions to gate numbers.
        edges
            .iter()
            .enumerate()
            .filter(|(_, &e)| e > 0)
            .map(|(i, _)| i + 1)
            .collect()
    }

    #[test]
    fn test_thin_cloud_edges() {
        let bsc = thin_cloud_profile();
        let smoothing = Smoothing::default();

        let base = detect_cloud_edge(&bsc, smoothing, 1.0e-8, 0.5, EdgeKind::Base).unwrap();
        assert_eq!(base.len(), bsc.len() - 2);
        assert_eq!(flagged(&base), vec![20]);

        let top = detect_cloud_edge(&bsc, smoothing, 1.0e-8, 0.5, EdgeKind::Top).unwrap();
        assert_eq!(flagged(&top), vec![22]);
    }

    #[test]
    fn test_ringing_passes_low_threshold() {
        // The smoother overshoots on either side of a sharp layer. A low threshold lets the
        // overshoot through, the refinement step is what cleans it up.
        let bsc = thin_cloud_profile();
        let smoothing = Smoothing::default();

        let base = detect_cloud_edge(&bsc, smoothing, 1.0e-8, 0.3, EdgeKind::Base).unwrap();
        assert_eq!(flagged(&base), vec![20, 25]);

        let top = detect_cloud_edge(&bsc, smoothing, 1.0e-8, 0.3, EdgeKind::Top).unwrap();
        assert_eq!(flagged(&top), vec![17, 22]);
    }

    #[test]
    fn test_no_edges_in_uniform_profile() {
        let bsc = uniform_profile(1.0e-8);
        for kind in [EdgeKind::Base, EdgeKind::Top].iter().copied() {
            let edges = detect_cloud_edge(&bsc, Smoothing::default(), 1.0e-8, 0.3, kind).unwrap();
            assert!(edges.iter().all(|&e| e == 0));
        }
    }

    #[test]
    fn test_missing_data_has_no_edges() {
        let bsc = vec![std::f64::NAN; 50];
        let edges =
            detect_cloud_edge(&bsc, Smoothing::default(), 1.0e-8, 0.3, EdgeKind::Base).unwrap();
        assert!(edges.iter().all(|&e| e == 0));
    }

    #[test]
    fn test_backscatter_floor() {
        // Same shape, but everything is below the floor.
        let bsc: Vec<f64> = thin_cloud_profile().iter().map(|b| b * 1.0e-6).collect();
        let edges =
            detect_cloud_edge(&bsc, Smoothing::default(), 1.0e-8, 0.5, EdgeKind::Base).unwrap();
        assert!(edges.iter().all(|&e| e == 0));
    }

    #[test]
    fn test_heights() {
        let bsc = thin_cloud_profile();
        let altitude = altitude_grid(bsc.len());
        let (edges, heights) = detect_cloud_edge_heights(
            &bsc,
            &altitude,
            Smoothing::default(),
            1.0e-8,
            0.5,
            EdgeKind::Base,
        )
        .unwrap();

        assert_eq!(edges.len(), heights.len());
        for (i, (e, h)) in edges.iter().zip(&heights).enumerate() {
            if *e > 0 {
                assert_eq!(h.unpack(), Meters(100.0 * (i + 1) as f64));
            } else {
                assert!(h.is_none());
            }
        }
        assert_eq!(heights[19].unpack(), Meters(2000.0));

        assert_eq!(
            detect_cloud_edge_heights(
                &bsc,
                &altitude[1..],
                Smoothing::default(),
                1.0e-8,
                0.5,
                EdgeKind::Base
            ),
            Err(AnalysisError::MismatchedDimensions)
        );
    }

    #[test]
    fn test_batched() {
        let rows = vec![thin_cloud_profile(), uniform_profile(1.0e-7)];
        let grid = Grid::from_rows(rows).unwrap();
        let edges =
            detect_cloud_edges(&grid, Smoothing::default(), 1.0e-8, 0.5, EdgeKind::Base).unwrap();

        assert_eq!(edges.shape(), (2, 48));
        assert_eq!(flagged(edges.row(0).unwrap()), vec![20]);
        assert!(flagged(edges.row(1).unwrap()).is_empty());
    }

    #[test]
    fn test_embed_interior() {
        let mut full = vec![9u8; 5];
        embed_interior(&[1, 0, 1], &mut full);
        assert_eq!(full, vec![0, 1, 0, 1, 0]);
    }
}
