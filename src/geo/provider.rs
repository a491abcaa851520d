use std::time::Duration;

use crate::models::LatLong;

/// A position report from a live provider.
///
/// A report may carry no location at all, and a present location may still be
/// flagged unknown when the provider has the device but no usable fix yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub location: Option<LatLong>,
    pub is_unknown: bool,
}

/// A live location source (OS location service, gpsd, ...).
pub trait LocationProvider {
    /// Start the provider, blocking until it reports ready or `timeout`
    /// elapses. Returns whether it reported ready.
    fn start(&mut self, timeout: Duration) -> bool;

    /// The current position, if the provider has produced one.
    fn position(&mut self) -> Option<Position>;
}
