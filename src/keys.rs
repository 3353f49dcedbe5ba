//! Enums used as keys for the fields of a cloud product.
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Fields of a cloud product, named the way downstream writers expect them.
///
/// # Examples
///
/// ```rust
/// use cloud_layers::CloudField;
/// use strum::IntoEnumIterator;
///
/// let names: Vec<&'static str> = CloudField::iter().map(|f| f.into()).collect();
/// assert_eq!(names[0], "cloud_mask");
/// assert_eq!(CloudField::CloudBaseHeight.to_string(), "cloud_base_height");
/// assert_eq!("below_cloud_top".parse::<CloudField>().unwrap(), CloudField::BelowCloudTop);
/// assert!(CloudField::CloudTopHeight.is_height());
/// assert!(!CloudField::CloudMask.is_height());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr, Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum CloudField {
    /// 1 inside a cloud layer, 0 elsewhere.
    CloudMask,
    /// 1 at a cloud base.
    CloudBase,
    /// 1 at a cloud top.
    CloudTop,
    /// Number of cloud tops at or above the gate.
    BelowCloudTop,
    /// Number of cloud bases at or below the gate.
    AboveCloudBase,
    /// Altitude of a cloud base (m), missing elsewhere.
    CloudBaseHeight,
    /// Altitude of a cloud top (m), missing elsewhere.
    CloudTopHeight,
}

impl CloudField {
    /// Whether the field holds altitudes rather than indicators or counts.
    #[inline]
    pub fn is_height(self) -> bool {
        matches!(self, CloudField::CloudBaseHeight | CloudField::CloudTopHeight)
    }
}
