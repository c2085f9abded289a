//! Geographic query primitives.

use crate::{TrackerError, error::Result};
use serde::{Deserialize, Serialize};

/// A rectangle in WGS84 degrees used to scope a state-vector query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn new(lon_min: f64, lat_min: f64, lon_max: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
        }
    }

    /// Check that the box is well-formed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidArgument`] if any coordinate is not
    /// finite or out of range, or if a minimum exceeds its maximum.
    pub fn validate(&self) -> Result<()> {
        let coords = [
            ("lon_min", self.lon_min, 180.0),
            ("lat_min", self.lat_min, 90.0),
            ("lon_max", self.lon_max, 180.0),
            ("lat_max", self.lat_max, 90.0),
        ];
        for (name, value, limit) in coords {
            if !value.is_finite() || value.abs() > limit {
                return Err(TrackerError::InvalidArgument(format!(
                    "{name} must be within [-{limit}, {limit}], got {value}"
                )));
            }
        }
        if self.lon_min > self.lon_max {
            return Err(TrackerError::InvalidArgument(format!(
                "lon_min ({}) is greater than lon_max ({})",
                self.lon_min, self.lon_max
            )));
        }
        if self.lat_min > self.lat_max {
            return Err(TrackerError::InvalidArgument(format!(
                "lat_min ({}) is greater than lat_max ({})",
                self.lat_min, self.lat_max
            )));
        }
        Ok(())
    }

    /// Query parameters in the order the states endpoint documents them.
    #[must_use]
    pub fn query_params(&self) -> [(&'static str, String); 4] {
        [
            ("lomin", self.lon_min.to_string()),
            ("lamin", self.lat_min.to_string()),
            ("lomax", self.lon_max.to_string()),
            ("lamax", self.lat_max.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_box() {
        assert!(BoundingBox::new(-10.0, 35.0, 20.0, 60.0).validate().is_ok());
    }

    #[test]
    fn test_degenerate_box_is_valid() {
        assert!(BoundingBox::new(5.0, 5.0, 5.0, 5.0).validate().is_ok());
    }

    #[test]
    fn test_lon_order_rejected() {
        let err = BoundingBox::new(20.0, 35.0, -10.0, 60.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidArgument(ref m) if m.contains("lon_min")));
    }

    #[test]
    fn test_lat_order_rejected() {
        let err = BoundingBox::new(-10.0, 60.0, 20.0, 35.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidArgument(ref m) if m.contains("lat_min")));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(BoundingBox::new(-190.0, 0.0, 0.0, 1.0).validate().is_err());
        assert!(BoundingBox::new(0.0, 0.0, 1.0, 91.0).validate().is_err());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_query_params_order() {
        let params = BoundingBox::new(-10.0, 35.0, 20.0, 60.0).query_params();
        let keys: Vec<_> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["lomin", "lamin", "lomax", "lamax"]);
        assert_eq!(params[0].1, "-10");
        assert_eq!(params[3].1, "60");
    }
}
