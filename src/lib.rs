pub mod config;

use anyhow::Context;
use log::{debug, error, info};

use crate::config::AppConfig;
use crate::geo::gpsd::GpsdProvider;
use crate::store::fs::FsParamStore;
use crate::store::DriverParams;

pub mod geo;
pub mod models;
pub mod store;

/// Where the coordinate to write comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A "latitude,longitude" string supplied by the caller.
    Text(String),
    /// The live location provider's current fix.
    LiveProvider,
}

pub fn run(source: Source, config: &AppConfig) -> anyhow::Result<()> {
    info!("Starting fakegps");

    match set_location(source, config) {
        Ok(()) => info!("Location updated"),
        Err(e) => {
            error!("Application error: {e:#}");
            // Print chain of error causes
            let mut cause = e.source();
            while let Some(c) = cause {
                error!("Caused by: {c}");
                cause = c.source();
            }
            return Err(e).context("Application failed to run");
        }
    }

    Ok(())
}

fn set_location(source: Source, config: &AppConfig) -> anyhow::Result<()> {
    let lat_long = match source {
        Source::Text(text) => geo::parse_lat_long(&text)?,
        Source::LiveProvider => {
            debug!(
                "Querying gpsd at {}:{}",
                config.provider.host, config.provider.port
            );
            let mut provider =
                GpsdProvider::new(config.provider.host.clone(), config.provider.port);
            geo::query_live_location(&mut provider, config.query_options())?
        }
    };

    debug!("Writing {} to the driver parameter store", lat_long);

    let store = FsParamStore::new(config.store.root.as_str());
    let params = DriverParams::with_candidates(
        store,
        config.store.device_classes.clone(),
        config.store.instance_ids.clone(),
    );

    params
        .set_lat_long(&lat_long)
        .context("Could not update the driver's location")?;

    Ok(())
}
