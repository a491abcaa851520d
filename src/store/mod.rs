use std::io;

use log::{debug, info};
use thiserror::Error;

use crate::models::LatLong;

pub mod discovery;
pub mod fs;

pub use discovery::CandidatePath;

use discovery::candidates;

/// Store value name the driver reads the latitude from.
pub const LATITUDE_PROPERTY: &str = "SENSOR_PROPERTY_LATITUDE";
/// Store value name the driver reads the longitude from.
pub const LONGITUDE_PROPERTY: &str = "SENSOR_PROPERTY_LONGITUDE";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("coordinate is not a finite number: latitude={latitude}, longitude={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("no driver parameter entry found. Searched: {}", searched.join(", "))]
    EntryNotFound { searched: Vec<String> },

    #[error("could not open '{path}' for writing. The entry may have vanished or you may lack permission")]
    OpenFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write coordinates to '{path}'")]
    WriteFailed {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Access to one parameter entry. Released when dropped.
pub trait StoreHandle {
    fn set_f64(&mut self, name: &str, value: f64) -> io::Result<()>;
    fn get_f64(&self, name: &str) -> io::Result<f64>;
}

/// Capability over the machine's parameter store.
///
/// `open_read` doubles as the existence probe during discovery; `open_write`
/// is only called on an entry discovery already found.
pub trait ParamStore {
    type Handle: StoreHandle;

    fn open_read(&self, path: &CandidatePath) -> io::Result<Self::Handle>;
    fn open_write(&self, path: &CandidatePath) -> io::Result<Self::Handle>;
}

type FailureHook = Box<dyn Fn(&StoreError)>;

/// The driver's parameter entry, addressed through discovery over a candidate
/// set.
pub struct DriverParams<S: ParamStore> {
    store: S,
    device_classes: Vec<String>,
    instance_ids: Vec<String>,
    on_write_failure: Option<FailureHook>,
}

impl<S: ParamStore> DriverParams<S> {
    pub fn new(store: S) -> Self {
        Self::with_candidates(
            store,
            discovery::default_device_classes(),
            discovery::default_instance_ids(),
        )
    }

    pub fn with_candidates(
        store: S,
        device_classes: Vec<String>,
        instance_ids: Vec<String>,
    ) -> Self {
        Self {
            store,
            device_classes,
            instance_ids,
            on_write_failure: None,
        }
    }

    /// Install a hook invoked with the error when a write fails. Development
    /// aid; nothing installs one in normal operation.
    pub fn on_write_failure(mut self, hook: impl Fn(&StoreError) + 'static) -> Self {
        self.on_write_failure = Some(Box::new(hook));
        self
    }

    /// First candidate whose entry exists, probing in candidate order.
    ///
    /// An unreadable candidate counts as missing, so a denied path does not
    /// end the search early.
    pub fn discover(&self) -> Option<CandidatePath> {
        for candidate in candidates(&self.device_classes, &self.instance_ids) {
            match self.store.open_read(&candidate) {
                Ok(_) => {
                    debug!("Found driver parameters at {}", candidate);
                    return Some(candidate);
                }
                Err(e) => {
                    debug!("Candidate {} skipped: {}", candidate, e);
                }
            }
        }

        None
    }

    /// Write the coordinate into the discovered parameter entry.
    pub fn set_lat_long(&self, lat_long: &LatLong) -> Result<(), StoreError> {
        if !lat_long.latitude.is_finite() || !lat_long.longitude.is_finite() {
            return Err(StoreError::InvalidCoordinate {
                latitude: lat_long.latitude,
                longitude: lat_long.longitude,
            });
        }

        let path = self.discover().ok_or_else(|| StoreError::EntryNotFound {
            searched: candidates(&self.device_classes, &self.instance_ids)
                .map(|c| c.key())
                .collect(),
        })?;

        let mut handle =
            self.store
                .open_write(&path)
                .map_err(|source| StoreError::OpenFailed {
                    path: path.key(),
                    source,
                })?;

        let written = handle
            .set_f64(LATITUDE_PROPERTY, lat_long.latitude)
            .and_then(|_| handle.set_f64(LONGITUDE_PROPERTY, lat_long.longitude))
            .map_err(|source| StoreError::WriteFailed {
                path: path.key(),
                source,
            });

        match written {
            Ok(()) => {
                info!("Set {} to {}", path, lat_long);
                Ok(())
            }
            Err(e) => {
                if let Some(hook) = &self.on_write_failure {
                    hook(&e);
                }
                Err(e)
            }
        }
    }
}
