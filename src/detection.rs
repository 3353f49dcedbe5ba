//! Run the whole cloud detection on a dataset.
//!
//! Every profile goes through base detection, top detection and refinement on its own. The
//! cloud mask is built once all profiles are done. Profiles do not depend on each other, so
//! `detect_clouds_parallel` hands out disjoint groups of rows to worker threads and produces
//! exactly the same product as `detect_clouds`.
use crate::{
    config::CloudDetectionConfig,
    dataset::Dataset,
    edges::{detect_cloud_edge, embed_interior, EdgeKind},
    error::{AnalysisError, Result},
    grid::Grid,
    keys::CloudField,
    mask::{find_cloud_mask, CloudMask},
    refine::{refine_cloud_detection, DiscardedBase},
};
use itertools::izip;
use log::debug;
use metfor::{Meters, Quantity};
use optional::{none, some, Optioned};

/// A cloud base removed during refinement because no matching top was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscardedLayer {
    /// Row of the profile in the dataset.
    pub time_index: usize,
    /// Gate of the removed base.
    pub gate: usize,
    /// Altitude of the removed base.
    pub altitude: Meters,
    /// Strongest usable gradient found above the base, if any.
    pub max_gradient: Option<f64>,
}

/// Cloud layers found in a dataset, every field on the full `time × range` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudProduct {
    cloud_base: Grid<u8>,
    cloud_top: Grid<u8>,
    cloud_mask: Grid<u8>,
    below_cloud_top: Grid<u32>,
    above_cloud_base: Grid<u32>,
    cloud_base_height: Option<Grid<Optioned<Meters>>>,
    cloud_top_height: Option<Grid<Optioned<Meters>>>,
    discarded: Vec<DiscardedLayer>,
}

impl CloudProduct {
    /// 1 at every cloud base.
    #[inline]
    pub fn cloud_base(&self) -> &Grid<u8> {
        &self.cloud_base
    }

    /// 1 at every cloud top.
    #[inline]
    pub fn cloud_top(&self) -> &Grid<u8> {
        &self.cloud_top
    }

    /// 1 inside a cloud layer.
    #[inline]
    pub fn cloud_mask(&self) -> &Grid<u8> {
        &self.cloud_mask
    }

    /// Number of tops at or above each gate.
    #[inline]
    pub fn below_cloud_top(&self) -> &Grid<u32> {
        &self.below_cloud_top
    }

    /// Number of bases at or below each gate.
    #[inline]
    pub fn above_cloud_base(&self) -> &Grid<u32> {
        &self.above_cloud_base
    }

    /// Altitude of each cloud base, `None` if heights were not requested.
    #[inline]
    pub fn cloud_base_height(&self) -> Option<&Grid<Optioned<Meters>>> {
        self.cloud_base_height.as_ref()
    }

    /// Altitude of each cloud top, `None` if heights were not requested.
    #[inline]
    pub fn cloud_top_height(&self) -> Option<&Grid<Optioned<Meters>>> {
        self.cloud_top_height.as_ref()
    }

    /// Bases removed during refinement, in time then altitude order.
    #[inline]
    pub fn discarded(&self) -> &[DiscardedLayer] {
        &self.discarded
    }

    /// (times, gates)
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.cloud_mask.shape()
    }

    /// Get a single value of any field as a number, for writers that treat all fields alike.
    ///
    /// Missing if the indexes are out of range, if the field is a height that was not computed,
    /// or if there is no edge at that gate.
    pub fn value(&self, field: CloudField, time_index: usize, gate: usize) -> Optioned<f64> {
        use CloudField::*;

        fn count<T: Copy>(grid: &Grid<T>, t: usize, g: usize) -> Optioned<f64>
        where
            f64: From<T>,
        {
            grid.get(t, g)
                .map(|&v| some(f64::from(v)))
                .unwrap_or_else(none)
        }

        fn height(grid: Option<&Grid<Optioned<Meters>>>, t: usize, g: usize) -> Optioned<f64> {
            grid.and_then(|h| h.get(t, g))
                .map(|h| h.map_t(|z| z.unpack()))
                .unwrap_or_else(none)
        }

        match field {
            CloudMask => count(&self.cloud_mask, time_index, gate),
            CloudBase => count(&self.cloud_base, time_index, gate),
            CloudTop => count(&self.cloud_top, time_index, gate),
            BelowCloudTop => count(&self.below_cloud_top, time_index, gate),
            AboveCloudBase => count(&self.above_cloud_base, time_index, gate),
            CloudBaseHeight => height(self.cloud_base_height(), time_index, gate),
            CloudTopHeight => height(self.cloud_top_height(), time_index, gate),
        }
    }
}

/// Detect cloud layers in every profile of a dataset.
///
/// # Examples
///
/// ```rust
/// use cloud_layers::{detect_clouds, CloudDetectionConfig, Dataset, Grid};
/// use metfor::Meters;
///
/// let altitude: Vec<Meters> = (0..50).map(|i| Meters(100.0 * i as f64)).collect();
/// let mut profile = vec![1.0e-7; 50];
/// for b in &mut profile[20..23] {
///     *b = 1.0e-5;
/// }
///
/// let ds = Dataset::new()
///     .with_altitude_profile(altitude)
///     .with_backscatter(Grid::from_rows(vec![profile]).unwrap());
///
/// let cfg = CloudDetectionConfig::default().with_gradient_thresholds(0.5, 0.5);
/// let clouds = detect_clouds(&ds, &cfg).unwrap();
///
/// assert_eq!(clouds.cloud_base().get(0, 20), Some(&1));
/// assert_eq!(clouds.cloud_top().get(0, 22), Some(&1));
/// assert_eq!(clouds.cloud_mask().row(0).unwrap().iter().filter(|&&m| m > 0).count(), 3);
/// ```
pub fn detect_clouds(ds: &Dataset, cfg: &CloudDetectionConfig) -> Result<CloudProduct> {
    check_inputs(ds, cfg)?;

    let (num_rows, num_gates) = ds.backscatter().shape();
    let altitude = ds.altitude_profile();

    let mut base = Grid::filled(num_rows, num_gates, 0u8);
    let mut top = Grid::filled(num_rows, num_gates, 0u8);
    let mut discarded = vec![];

    let rows = izip!(ds.backscatter().rows(), base.rows_mut(), top.rows_mut());
    for (time_index, (bsc, base_row, top_row)) in rows.enumerate() {
        let removed = process_profile(bsc, base_row, top_row, cfg)?;
        discarded.extend(discarded_layers(time_index, removed, altitude));
    }

    build_product(ds, cfg, base, top, discarded)
}

/// Same as `detect_clouds`, but the profiles are split among `threads` worker threads. If
/// `threads` is `None` one thread per CPU is used.
pub fn detect_clouds_parallel(
    ds: &Dataset,
    cfg: &CloudDetectionConfig,
    threads: Option<usize>,
) -> Result<CloudProduct> {
    check_inputs(ds, cfg)?;

    let (num_rows, num_gates) = ds.backscatter().shape();
    let altitude = ds.altitude_profile();
    let cfg = *cfg;

    let num_threads = threads.unwrap_or_else(num_cpus::get).max(1);
    let rows_per_chunk = ((num_rows + num_threads - 1) / num_threads).max(1);
    let chunk_len = rows_per_chunk * num_gates;

    let mut base = Grid::filled(num_rows, num_gates, 0u8);
    let mut top = Grid::filled(num_rows, num_gates, 0u8);

    let discarded = std::thread::scope(|scope| -> Result<Vec<DiscardedLayer>> {
        let chunks = izip!(
            ds.backscatter().as_slice().chunks(chunk_len),
            base.as_mut_slice().chunks_mut(chunk_len),
            top.as_mut_slice().chunks_mut(chunk_len)
        );

        let mut handles = Vec::with_capacity(num_threads);
        for (chunk_index, (bsc, base, top)) in chunks.enumerate() {
            let first_row = chunk_index * rows_per_chunk;

            let jh = std::thread::Builder::new()
                .name(format!("cloud-rows-{}", chunk_index))
                .spawn_scoped(scope, move || -> Result<Vec<DiscardedLayer>> {
                    let mut discarded = vec![];

                    let rows = izip!(
                        bsc.chunks(num_gates),
                        base.chunks_mut(num_gates),
                        top.chunks_mut(num_gates)
                    );
                    for (i, (bsc, base_row, top_row)) in rows.enumerate() {
                        let removed = process_profile(bsc, base_row, top_row, &cfg)?;
                        discarded.extend(discarded_layers(first_row + i, removed, altitude));
                    }

                    Ok(discarded)
                })
                .map_err(|_| AnalysisError::WorkerFailed)?;

            handles.push(jh);
        }

        let mut discarded = vec![];
        for jh in handles {
            discarded.extend(jh.join().map_err(|_| AnalysisError::WorkerFailed)??);
        }

        Ok(discarded)
    })?;

    debug!("processed {} profiles on {} threads", num_rows, num_threads);

    build_product(ds, &cfg, base, top, discarded)
}

fn check_inputs(ds: &Dataset, cfg: &CloudDetectionConfig) -> Result<()> {
    cfg.validate()?;
    ds.validate()?;

    if ds.num_gates() < cfg.smoothing.window.max(3) {
        return Err(AnalysisError::NotEnoughData);
    }

    Ok(())
}

// Edge detection and refinement for one profile, writing into full length indicator rows.
fn process_profile(
    bsc: &[f64],
    base_row: &mut [u8],
    top_row: &mut [u8],
    cfg: &CloudDetectionConfig,
) -> Result<Vec<DiscardedBase>> {
    let CloudDetectionConfig {
        smoothing,
        bsc_thres,
        vg_thres_base,
        vg_thres_top,
        ..
    } = *cfg;

    let base = detect_cloud_edge(bsc, smoothing, bsc_thres, vg_thres_base, EdgeKind::Base)?;
    let top = detect_cloud_edge(bsc, smoothing, bsc_thres, vg_thres_top, EdgeKind::Top)?;

    embed_interior(&base, base_row);
    embed_interior(&top, top_row);

    refine_cloud_detection(bsc, base_row, top_row, smoothing, bsc_thres, vg_thres_top)
}

fn discarded_layers<'a>(
    time_index: usize,
    removed: Vec<DiscardedBase>,
    altitude: &'a [Meters],
) -> impl Iterator<Item = DiscardedLayer> + 'a {
    removed.into_iter().map(move |d| DiscardedLayer {
        time_index,
        gate: d.gate,
        altitude: altitude[d.gate],
        max_gradient: d.max_gradient,
    })
}

fn build_product(
    ds: &Dataset,
    cfg: &CloudDetectionConfig,
    mut base: Grid<u8>,
    mut top: Grid<u8>,
    discarded: Vec<DiscardedLayer>,
) -> Result<CloudProduct> {
    // Too close to the instrument to trust.
    let remove_below = cfg.remove_below.min(base.num_cols());
    for row in base.rows_mut().chain(top.rows_mut()) {
        row[..remove_below].iter_mut().for_each(|v| *v = 0);
    }

    let CloudMask {
        cloud_mask,
        below_cloud_top,
        above_cloud_base,
    } = find_cloud_mask(ds.backscatter(), &base.interior(), &top.interior())?;

    let (cloud_base_height, cloud_top_height) = if cfg.compute_heights {
        let altitude = ds.altitude_profile();
        (
            Some(edge_heights(&base, altitude)),
            Some(edge_heights(&top, altitude)),
        )
    } else {
        (None, None)
    };

    debug!(
        "cloud detection: {} profiles, {} bases, {} tops, {} bases discarded",
        base.num_rows(),
        count_flags(&base),
        count_flags(&top),
        discarded.len()
    );

    Ok(CloudProduct {
        cloud_base: base,
        cloud_top: top,
        cloud_mask,
        below_cloud_top,
        above_cloud_base,
        cloud_base_height,
        cloud_top_height,
        discarded,
    })
}

fn edge_heights(edges: &Grid<u8>, altitude: &[Meters]) -> Grid<Optioned<Meters>> {
    let mut heights = Grid::filled(edges.num_rows(), edges.num_cols(), none());

    for (edge_row, height_row) in edges.rows().zip(heights.rows_mut()) {
        for (&e, h, &z) in izip!(edge_row, height_row, altitude) {
            if e > 0 {
                *h = some(z);
            }
        }
    }

    heights
}

fn count_flags(grid: &Grid<u8>) -> usize {
    grid.as_slice().iter().filter(|&&v| v > 0).count()
}
