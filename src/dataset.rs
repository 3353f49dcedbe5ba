//! Data type and methods to store a time series of lidar backscatter profiles.

use crate::{
    error::{AnalysisError, Result},
    grid::Grid,
    station_info::StationInfo,
};
use chrono::NaiveDateTime;
use itertools::Itertools;
use metfor::Meters;

/// A time series of backscatter profiles sharing one altitude grid.
///
/// Backscatter is stored as a `time × range` grid in m⁻¹ sr⁻¹. Gates rejected by upstream
/// quality control are expected to be NaN. If valid times are not known the time vector is
/// left empty instead of being filled with made up values.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    // Description of the source of the data.
    source: Option<String>,

    // Station info
    station: StationInfo,

    // One per row of the backscatter grid
    valid_times: Vec<NaiveDateTime>,

    // Range coordinate, monotonically increasing
    altitude: Vec<Meters>,

    // time × range
    backscatter: Grid<f64>,
}

impl Dataset {
    /// Create a new dataset with default values. This is a proxy for default with a clearer name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cloud_layers::Dataset;
    ///
    /// let ds = Dataset::new();
    /// println!("{:?}", ds);
    /// ```
    #[inline]
    pub fn new() -> Self {
        Dataset::default()
    }

    /// Add a source description to this dataset.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cloud_layers::Dataset;
    ///
    /// let ds = Dataset::new().with_source_description("An empty dataset.".to_owned());
    /// assert_eq!(ds.source_description().unwrap(), "An empty dataset.");
    ///
    /// let ds = ds.with_source_description(None);
    /// assert!(ds.source_description().is_none());
    /// ```
    #[inline]
    pub fn with_source_description<S>(mut self, desc: S) -> Self
    where
        Option<String>: From<S>,
    {
        self.source = Option::from(desc);
        self
    }

    /// Retrieve a source description for this dataset.
    #[inline]
    pub fn source_description(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Builder function for setting the station info.
    #[inline]
    pub fn with_station_info(mut self, new_value: StationInfo) -> Self {
        self.station = new_value;
        self
    }

    /// Get the station info
    #[inline]
    pub fn station_info(&self) -> &StationInfo {
        &self.station
    }

    /// Builder method for the valid times, one per profile.
    #[inline]
    pub fn with_valid_times(mut self, times: Vec<NaiveDateTime>) -> Self {
        self.valid_times = times;
        self
    }

    /// Get the valid times.
    #[inline]
    pub fn valid_times(&self) -> &[NaiveDateTime] {
        &self.valid_times
    }

    /// Builder method for the altitude of each range gate.
    ///
    /// # Examples
    /// ```rust
    /// use cloud_layers::Dataset;
    /// use metfor::Meters;
    ///
    /// let altitude: Vec<Meters> = (0..50).map(|i| Meters(100.0 * i as f64)).collect();
    /// let ds = Dataset::new().with_altitude_profile(altitude);
    /// assert_eq!(ds.num_gates(), 50);
    /// ```
    #[inline]
    pub fn with_altitude_profile(mut self, altitude: Vec<Meters>) -> Self {
        self.altitude = altitude;
        self
    }

    /// Get the altitude profile.
    #[inline]
    pub fn altitude_profile(&self) -> &[Meters] {
        &self.altitude
    }

    /// Builder method for the backscatter grid.
    #[inline]
    pub fn with_backscatter(mut self, backscatter: Grid<f64>) -> Self {
        self.backscatter = backscatter;
        self
    }

    /// Get the backscatter grid.
    #[inline]
    pub fn backscatter(&self) -> &Grid<f64> {
        &self.backscatter
    }

    /// Get the backscatter profile at a time index.
    #[inline]
    pub fn backscatter_row(&self, time_index: usize) -> Option<&[f64]> {
        self.backscatter.row(time_index)
    }

    /// The number of profiles.
    #[inline]
    pub fn num_times(&self) -> usize {
        self.backscatter.num_rows()
    }

    /// The number of range gates, taken from the altitude coordinate.
    #[inline]
    pub fn num_gates(&self) -> usize {
        self.altitude.len()
    }

    /// Check that the pieces fit together.
    ///
    /// The altitude coordinate and at least one profile must be present, every profile must have
    /// one value per gate, valid times (if any) must match the number of profiles, and altitude
    /// must increase strictly.
    pub fn validate(&self) -> Result<()> {
        if self.altitude.is_empty() || self.backscatter.num_rows() == 0 {
            return Err(AnalysisError::MissingProfile);
        }

        if self.backscatter.num_cols() != self.altitude.len() {
            return Err(AnalysisError::MismatchedDimensions);
        }

        if !self.valid_times.is_empty() && self.valid_times.len() != self.backscatter.num_rows() {
            return Err(AnalysisError::MismatchedDimensions);
        }

        if self
            .altitude
            .iter()
            .tuple_windows::<(_, _)>()
            .any(|(below, above)| !(above > below))
        {
            return Err(AnalysisError::InvalidInput);
        }

        Ok(())
    }
}
