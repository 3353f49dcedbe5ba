use metfor::Meters;
use optional::Optioned;

/// Station information including location data and identification.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationInfo {
    /// WIGOS station identifier, eg 0-20000-0-06610
    wigos_id: Option<String>,
    /// Latitude and longitude.
    location: Option<(f64, f64)>,
    /// Elevation of the instrument above mean sea level.
    elevation: Optioned<Meters>,
}

impl StationInfo {
    /// Create a new object with default values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cloud_layers::StationInfo;
    ///
    /// assert!(StationInfo::new().wigos_id().is_none());
    /// assert!(StationInfo::new().location().is_none());
    /// assert!(StationInfo::new().elevation().is_none());
    ///
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a station identifier.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cloud_layers::StationInfo;
    ///
    /// let stn = StationInfo::new().with_wigos_id("0-20000-0-06610".to_owned());
    /// assert_eq!(stn.wigos_id(), Some("0-20000-0-06610"));
    ///
    /// let stn = stn.with_wigos_id(None);
    /// assert!(stn.wigos_id().is_none());
    /// ```
    #[inline]
    pub fn with_wigos_id<S>(mut self, id: S) -> Self
    where
        Option<String>: From<S>,
    {
        self.wigos_id = Option::from(id);
        self
    }

    /// Builder method to add a location.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cloud_layers::StationInfo;
    ///
    /// assert_eq!(
    ///     StationInfo::new().with_lat_lon((46.8, 6.9)).location().unwrap(), (46.8, 6.9));
    /// assert!(StationInfo::new().with_lat_lon(None).location().is_none());
    ///
    /// ```
    #[inline]
    pub fn with_lat_lon<T>(mut self, coords: T) -> Self
    where
        Option<(f64, f64)>: From<T>,
    {
        self.location = Option::from(coords);
        self
    }

    /// Builder method to add elevation.
    ///
    /// # Examples
    ///```rust
    /// use metfor::Meters;
    /// use cloud_layers::StationInfo;
    /// use optional::{some, none};
    ///
    /// let info = StationInfo::new().with_elevation(Meters(491.0));
    /// assert_eq!(info.elevation().unwrap(), Meters(491.0));
    /// let info = StationInfo::new().with_elevation(some(Meters(491.0)));
    /// assert!(info.elevation().is_some());
    /// let info = StationInfo::new().with_elevation(none::<Meters>());
    /// assert!(info.elevation().is_none());
    ///```
    #[inline]
    pub fn with_elevation<T>(mut self, elev: T) -> Self
    where
        Optioned<Meters>: From<T>,
    {
        self.elevation = Optioned::from(elev);
        self
    }

    /// WIGOS station identifier.
    #[inline]
    pub fn wigos_id(&self) -> Option<&str> {
        self.wigos_id.as_deref()
    }

    /// Latitude and longitude.
    #[inline]
    pub fn location(&self) -> Option<(f64, f64)> {
        self.location
    }

    /// Elevation of the instrument in meters.
    #[inline]
    pub fn elevation(&self) -> Optioned<Meters> {
        self.elevation
    }
}
