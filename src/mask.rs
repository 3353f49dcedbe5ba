//! Build a per gate cloud mask from base and top indicators.
//!
//! Base and top indicators come in the interior layout produced by the edge detector, one entry
//! per gate excluding the first and last gate. The mask and the counts are full length.
use crate::{
    error::{AnalysisError, Result},
    grid::Grid,
};
use itertools::izip;

/// Cloud mask and running counts for a single profile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloudMaskRow {
    /// 1 where the gate is inside a cloud layer.
    pub cloud_mask: Vec<u8>,
    /// Number of tops at or above each gate.
    pub below_cloud_top: Vec<u32>,
    /// Number of bases at or below each gate.
    pub above_cloud_base: Vec<u32>,
}

/// Cloud mask and running counts for a time series of profiles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CloudMask {
    /// 1 where the gate is inside a cloud layer.
    pub cloud_mask: Grid<u8>,
    /// Number of tops at or above each gate.
    pub below_cloud_top: Grid<u32>,
    /// Number of bases at or below each gate.
    pub above_cloud_base: Grid<u32>,
}

/// Build the cloud mask for one profile from interior base and top indicators.
///
/// The profile is walked from the bottom up. A base opens a layer and the first top at or above
/// it closes the layer, every gate in between is in cloud. Further bases inside an open layer
/// belong to that layer. A top with no open layer below it, or a base never closed by a top, adds
/// nothing to the mask but still shows up in the running counts.
///
/// # Examples
///
/// ```rust
/// use cloud_layers::find_cloud_mask_row;
///
/// // Bases at gates 10 and 30, tops at 15 and 35 in a 50 gate profile.
/// let mut base = vec![0u8; 48];
/// let mut top = vec![0u8; 48];
/// base[9] = 1;
/// base[29] = 1;
/// top[14] = 1;
/// top[34] = 1;
///
/// let mask = find_cloud_mask_row(&base, &top).unwrap();
/// let cloudy: Vec<usize> = (0..50).filter(|&g| mask.cloud_mask[g] > 0).collect();
/// let expected: Vec<usize> = (10..=15).chain(30..=35).collect();
/// assert_eq!(cloudy, expected);
/// ```
pub fn find_cloud_mask_row(base: &[u8], top: &[u8]) -> Result<CloudMaskRow> {
    if base.len() != top.len() {
        return Err(AnalysisError::MismatchedDimensions);
    }

    let base = pad(base);
    let top = pad(top);

    let above_cloud_base = running_count(base.iter());
    let mut below_cloud_top = running_count(top.iter().rev());
    below_cloud_top.reverse();

    let mut cloud_mask = vec![0u8; base.len()];
    let mut layer_base: Option<usize> = None;
    for (g, (&b, &t)) in base.iter().zip(top.iter()).enumerate() {
        if b > 0 && layer_base.is_none() {
            layer_base = Some(g);
        }

        if t > 0 {
            if let Some(start) = layer_base.take() {
                cloud_mask[start..=g].iter_mut().for_each(|m| *m = 1);
            }
        }
    }

    Ok(CloudMaskRow {
        cloud_mask,
        below_cloud_top,
        above_cloud_base,
    })
}

/// Build the cloud mask for every profile of a `time × range` grid.
///
/// `template` is only used for its shape. `base` and `top` must have the same number of rows and
/// two fewer columns.
pub fn find_cloud_mask<T>(
    template: &Grid<T>,
    base: &Grid<u8>,
    top: &Grid<u8>,
) -> Result<CloudMask> {
    let (num_rows, num_cols) = template.shape();

    if base.shape() != top.shape()
        || base.num_rows() != num_rows
        || base.num_cols() + 2 != num_cols
    {
        return Err(AnalysisError::MismatchedDimensions);
    }

    let mut cloud_mask = Grid::filled(num_rows, num_cols, 0u8);
    let mut below_cloud_top = Grid::filled(num_rows, num_cols, 0u32);
    let mut above_cloud_base = Grid::filled(num_rows, num_cols, 0u32);

    let rows = izip!(
        base.rows(),
        top.rows(),
        cloud_mask.rows_mut(),
        below_cloud_top.rows_mut(),
        above_cloud_base.rows_mut()
    );
    for (base_row, top_row, mask_row, bct_row, acb_row) in rows {
        let row = find_cloud_mask_row(base_row, top_row)?;
        mask_row.copy_from_slice(&row.cloud_mask);
        bct_row.copy_from_slice(&row.below_cloud_top);
        acb_row.copy_from_slice(&row.above_cloud_base);
    }

    Ok(CloudMask {
        cloud_mask,
        below_cloud_top,
        above_cloud_base,
    })
}

fn pad(interior: &[u8]) -> Vec<u8> {
    let mut full = Vec::with_capacity(interior.len() + 2);
    full.push(0);
    full.extend_from_slice(interior);
    full.push(0);
    full
}

// Inclusive running count of flagged gates.
fn running_count<'a, I>(flags: I) -> Vec<u32>
where
    I: Iterator<Item = &'a u8>,
{
    flags
        .scan(0u32, |count, &f| {
            *count += u32::from(f > 0);
            Some(*count)
        })
        .collect()
}
