use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

use super::provider::{LocationProvider, Position};
use crate::models::LatLong;

const WATCH_COMMAND: &str = "?WATCH={\"enable\":true,\"json\":true};\n";
const READ_TIMEOUT: Duration = Duration::from_millis(500);
// gpsd interleaves VERSION/DEVICES/SKY reports with TPV; don't scan forever.
const MAX_REPORTS: usize = 32;

/// gpsd time-position-velocity report, only the fields we read.
#[derive(Debug, Deserialize)]
struct TpvReport {
    class: String,
    #[serde(default)]
    mode: u8,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Live location fixes from a gpsd daemon over its JSON socket protocol.
pub struct GpsdProvider {
    host: String,
    port: u16,
    reader: Option<BufReader<TcpStream>>,
}

impl GpsdProvider {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            reader: None,
        }
    }

    fn connect(&self, timeout: Duration) -> io::Result<BufReader<TcpStream>> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "no address found for gpsd host")
            })?;

        let mut stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_read_timeout(Some(READ_TIMEOUT))?;
        stream.write_all(WATCH_COMMAND.as_bytes())?;

        Ok(BufReader::new(stream))
    }
}

impl LocationProvider for GpsdProvider {
    fn start(&mut self, timeout: Duration) -> bool {
        match self.connect(timeout) {
            Ok(reader) => {
                debug!("Connected to gpsd at {}:{}", self.host, self.port);
                self.reader = Some(reader);
                true
            }
            Err(e) => {
                warn!(
                    "Could not connect to gpsd at {}:{}: {}",
                    self.host, self.port, e
                );
                false
            }
        }
    }

    fn position(&mut self) -> Option<Position> {
        let reader = self.reader.as_mut()?;

        for _ in 0..MAX_REPORTS {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    debug!("gpsd read ended: {}", e);
                    return None;
                }
            }

            let report: TpvReport = match serde_json::from_str(&line) {
                Ok(report) => report,
                Err(_) => continue,
            };
            if report.class != "TPV" {
                continue;
            }

            let location = match (report.lat, report.lon) {
                (Some(latitude), Some(longitude)) => Some(LatLong::new(latitude, longitude)),
                _ => None,
            };

            // Mode 0/1 means gpsd sees the device but has no fix yet.
            return Some(Position {
                location,
                is_unknown: report.mode < 2,
            });
        }

        None
    }
}
