//! Filesystem-backed parameter store.
//!
//! The driver's parameter tree is one directory per entry with one file per
//! named value, the same shape the kernel gives sysfs device attributes.

use std::fs;
use std::io;
use std::path::PathBuf;

use super::discovery::CandidatePath;
use super::{ParamStore, StoreHandle};

pub struct FsParamStore {
    root: PathBuf,
}

impl FsParamStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn entry_dir(&self, path: &CandidatePath) -> PathBuf {
        self.root.join(path.key())
    }
}

#[derive(Debug)]
pub struct FsHandle {
    dir: PathBuf,
    writable: bool,
}

impl StoreHandle for FsHandle {
    fn set_f64(&mut self, name: &str, value: f64) -> io::Result<()> {
        if !self.writable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "entry opened read-only",
            ));
        }

        // f64 Display is the shortest form that parses back to the same
        // value, so readers get the number back exactly.
        fs::write(self.dir.join(name), format!("{}\n", value))
    }

    fn get_f64(&self, name: &str) -> io::Result<f64> {
        let text = fs::read_to_string(self.dir.join(name))?;
        text.trim()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl ParamStore for FsParamStore {
    type Handle = FsHandle;

    fn open_read(&self, path: &CandidatePath) -> io::Result<FsHandle> {
        let dir = self.entry_dir(path);

        // Read the directory so a missing or unreadable entry errors here
        // rather than on the first value access.
        fs::read_dir(&dir)?;

        Ok(FsHandle {
            dir,
            writable: false,
        })
    }

    fn open_write(&self, path: &CandidatePath) -> io::Result<FsHandle> {
        let dir = self.entry_dir(path);

        let metadata = fs::metadata(&dir)?;
        if !metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "parameter entry is not a directory",
            ));
        }
        if metadata.permissions().readonly() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "parameter entry is read-only",
            ));
        }

        Ok(FsHandle {
            dir,
            writable: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LatLong;
    use crate::store::{DriverParams, LATITUDE_PROPERTY, LONGITUDE_PROPERTY};

    fn store_with_entry(candidate: &CandidatePath) -> (tempfile::TempDir, FsParamStore) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(candidate.key())).unwrap();
        let store = FsParamStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn probing_a_missing_entry_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsParamStore::new(dir.path());

        let err = store
            .open_read(&CandidatePath::new("SENSOR", "0000"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn written_values_read_back_exactly() {
        let candidate = CandidatePath::new("SENSOR", "0000");
        let (_dir, store) = store_with_entry(&candidate);

        let mut handle = store.open_write(&candidate).unwrap();
        handle.set_f64(LATITUDE_PROPERTY, 51.5074).unwrap();
        handle.set_f64(LONGITUDE_PROPERTY, -0.1278).unwrap();
        drop(handle);

        let handle = store.open_read(&candidate).unwrap();
        assert_eq!(handle.get_f64(LATITUDE_PROPERTY).unwrap(), 51.5074);
        assert_eq!(handle.get_f64(LONGITUDE_PROPERTY).unwrap(), -0.1278);
    }

    #[test]
    fn read_handles_reject_writes() {
        let candidate = CandidatePath::new("SENSOR", "0000");
        let (_dir, store) = store_with_entry(&candidate);

        let mut handle = store.open_read(&candidate).unwrap();
        let err = handle.set_f64(LATITUDE_PROPERTY, 1.0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn missing_value_is_not_found() {
        let candidate = CandidatePath::new("SENSOR", "0000");
        let (_dir, store) = store_with_entry(&candidate);

        let handle = store.open_read(&candidate).unwrap();
        let err = handle.get_f64(LATITUDE_PROPERTY).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn set_lat_long_round_trips_through_the_store() {
        let candidate = CandidatePath::new("UNKNOWN", "0000");
        let (dir, store) = store_with_entry(&candidate);

        DriverParams::new(store)
            .set_lat_long(&LatLong::new(35.6895, 139.6917))
            .unwrap();

        let reader = FsParamStore::new(dir.path());
        let handle = reader.open_read(&candidate).unwrap();
        assert_eq!(handle.get_f64(LATITUDE_PROPERTY).unwrap(), 35.6895);
        assert_eq!(handle.get_f64(LONGITUDE_PROPERTY).unwrap(), 139.6917);
    }
}
