#![warn(missing_docs)]
//! Find cloud layers in lidar backscatter profiles.
//!
//! Cloud bases and tops are sharp local maxima of the vertical gradient of smoothed
//! log-backscatter, looking up for a base and looking down for a top. Bases without a matching
//! top are either paired with the strongest top below the next base or thrown out, and the
//! surviving edges are turned into a per gate cloud mask.
//!
//! The individual steps are available on their own:
//!
//! * `savgol` smooths a profile and calculates its gradient,
//! * `detect_cloud_edge` flags candidate bases or tops,
//! * `refine_cloud_detection` pairs bases with tops,
//! * `find_cloud_mask` builds the mask.
//!
//! `detect_clouds` and `detect_clouds_parallel` run all of them over a `Dataset`.

//
// API
//
pub use crate::{
    config::{CloudDetectionConfig, Smoothing},
    dataset::Dataset,
    detection::{detect_clouds, detect_clouds_parallel, CloudProduct, DiscardedLayer},
    edges::{detect_cloud_edge, detect_cloud_edge_heights, detect_cloud_edges, EdgeKind},
    error::{AnalysisError, Result},
    flags::{combine_flags, flag_variable, mask_flagged, FlagThresholds, QualityFlag},
    grid::Grid,
    keys::CloudField,
    mask::{find_cloud_mask, find_cloud_mask_row, CloudMask, CloudMaskRow},
    refine::{refine_cloud_detection, DiscardedBase},
    smoothing::{savgol, savgol_filter, Smoothed},
    station_info::StationInfo,
};

//
// Internal use only
//

// Modules
mod config;
mod dataset;
mod detection;
mod edges;
mod error;
mod flags;
mod grid;
mod keys;
mod mask;
mod refine;
mod smoothing;
mod station_info;
#[cfg(test)]
mod test_data;
