pub mod coordinate;

pub use coordinate::LatLong;
