use clap::Parser;
use env_logger::{Builder, WriteStyle};
use log::error;

use fakegps::config::AppConfig;
use fakegps::Source;

/// Point the fake GPS driver at a location.
#[derive(Debug, Parser)]
#[command(name = "fakegps", version, about)]
struct Cli {
    /// Coordinate to write, as "latitude,longitude" (e.g. "51.5074,-0.1278")
    #[arg(
        value_name = "LATLONG",
        required_unless_present = "here",
        conflicts_with = "here"
    )]
    lat_long: Option<String>,

    /// Query the live location provider and write its current fix
    #[arg(long)]
    here: bool,

    /// Path to the configuration file
    #[arg(long, default_value = "config.ini")]
    config: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration first (without logging)
    let config = AppConfig::from_file(&cli.config).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        // Fall back to default configuration
        AppConfig::default()
    });

    // Initialise logger with a configured log level
    Builder::new()
        .filter_level(config.get_log_level())
        .write_style(WriteStyle::Always)
        .format_timestamp_secs()
        .init();

    let source = if cli.here {
        Source::LiveProvider
    } else {
        Source::Text(
            cli.lat_long
                .expect("LATLONG is required unless --here is given"),
        )
    };

    if let Err(e) = fakegps::run(source, &config) {
        error!("Application error: {}", e);
        return Err(e);
    }
    Ok(())
}
