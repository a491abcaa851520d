use std::thread;
use std::time::Duration;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::LatLong;

pub mod gpsd;
mod provider;

pub use provider::{LocationProvider, Position};

// http://stackoverflow.com/questions/3518504/regular-expression-for-matching-latitude-longitude-coordinates
static LAT_LONG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([-+]?\d{1,2}(\.\d+)?),\s*([-+]?\d{1,3}(\.\d+)?)$").unwrap());

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("invalid coordinate format: '{input}'. Expected 'latitude,longitude' (e.g. '51.5074,-0.1278')")]
    InvalidFormat { input: String },

    #[error("could not parse '{part}' in '{input}' as a number")]
    NumericParse {
        input: String,
        part: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("value '{part}' in '{input}' is outside the representable range")]
    Overflow { input: String, part: String },

    #[error("location unavailable: {reason}")]
    LocationUnavailable { reason: &'static str },
}

/// Whether `lat_long` is a well-formed "latitude,longitude" string.
///
/// Syntactic check only: latitude allows 1-2 integer digits, longitude 1-3,
/// both with an optional sign and decimal fraction. "99,200" passes even
/// though 99 degrees is not a real latitude.
pub fn is_valid(lat_long: &str) -> bool {
    if lat_long.trim().is_empty() {
        return false;
    }

    LAT_LONG_RE.is_match(lat_long)
}

/// Parse a "latitude,longitude" string into a [`LatLong`].
pub fn parse_lat_long(lat_long: &str) -> Result<LatLong, GeoError> {
    if !is_valid(lat_long) {
        return Err(GeoError::InvalidFormat {
            input: lat_long.to_string(),
        });
    }

    // The pattern already guarantees a single comma; keep the check so a
    // pattern change cannot silently feed three parts through.
    let splits: Vec<&str> = lat_long.split(',').collect();
    if splits.len() != 2 {
        return Err(GeoError::InvalidFormat {
            input: lat_long.to_string(),
        });
    }

    Ok(LatLong {
        latitude: parse_part(lat_long, splits[0])?,
        longitude: parse_part(lat_long, splits[1])?,
    })
}

fn parse_part(input: &str, part: &str) -> Result<f64, GeoError> {
    let trimmed = part.trim();

    let value: f64 = trimmed.parse().map_err(|source| GeoError::NumericParse {
        input: input.to_string(),
        part: trimmed.to_string(),
        source,
    })?;

    // f64 parsing saturates to infinity instead of erroring.
    if !value.is_finite() {
        return Err(GeoError::Overflow {
            input: input.to_string(),
            part: trimmed.to_string(),
        });
    }

    Ok(value)
}

/// How long the live query waits on the provider.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    /// How long `start` may block waiting for the provider to report ready.
    pub start_timeout: Duration,
    /// Extra delay between start and the position read. Providers can report
    /// ready before their first fix exists.
    pub settle_delay: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            start_timeout: Duration::from_millis(1000),
            settle_delay: Duration::from_millis(1000),
        }
    }
}

/// Query the provider's current location.
pub fn query_live_location<P: LocationProvider>(
    provider: &mut P,
    opts: QueryOptions,
) -> Result<LatLong, GeoError> {
    if !provider.start(opts.start_timeout) {
        debug!(
            "Provider did not report ready within {:?}",
            opts.start_timeout
        );
    }

    thread::sleep(opts.settle_delay);

    let position = provider.position().ok_or(GeoError::LocationUnavailable {
        reason: "the provider returned no position",
    })?;

    let location = position.location.ok_or(GeoError::LocationUnavailable {
        reason: "the position carries no location fix",
    })?;

    if position.is_unknown {
        return Err(GeoError::LocationUnavailable {
            reason: "the provider flagged the location as unknown",
        });
    }

    Ok(location)
}
