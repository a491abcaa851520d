use std::fmt;

/// A latitude/longitude pair, as handed to the driver.
///
/// Built once by the parser or the live provider and never mutated; only the
/// two numbers are persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLong {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLong {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for LatLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}
