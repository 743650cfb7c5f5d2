//! GeoClue2 location over the system D-Bus.
//!
//! Each poll creates a client, asks for city-level accuracy, waits for the
//! first `Location` object, reads it and stops the client again. Polls are
//! rare (every 30 minutes at most), so nothing is kept between them.

use anyhow::{Context, Result};
use std::thread;
use std::time::{Duration, Instant};
use zbus::blocking::Connection;
use zbus::zvariant::OwnedObjectPath;

use super::{LocationFix, LocationProvider};
use crate::constants::{GEOCLUE_DESKTOP_ID, GEOCLUE_FIX_TIMEOUT_SECS};
use crate::geo::Coordinate;

/// GClueAccuracyLevel for city-level precision.
const ACCURACY_CITY: u32 = 4;

const LOCATION_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[zbus::proxy(
    interface = "org.freedesktop.GeoClue2.Manager",
    default_service = "org.freedesktop.GeoClue2",
    default_path = "/org/freedesktop/GeoClue2/Manager"
)]
trait GeoclueManager {
    fn get_client(&self) -> zbus::Result<OwnedObjectPath>;
}

#[zbus::proxy(
    interface = "org.freedesktop.GeoClue2.Client",
    default_service = "org.freedesktop.GeoClue2"
)]
trait GeoclueClient {
    fn start(&self) -> zbus::Result<()>;

    fn stop(&self) -> zbus::Result<()>;

    #[zbus(property)]
    fn location(&self) -> zbus::Result<OwnedObjectPath>;

    #[zbus(property)]
    fn set_desktop_id(&self, id: &str) -> zbus::Result<()>;

    #[zbus(property)]
    fn set_requested_accuracy_level(&self, level: u32) -> zbus::Result<()>;
}

#[zbus::proxy(
    interface = "org.freedesktop.GeoClue2.Location",
    default_service = "org.freedesktop.GeoClue2"
)]
trait GeoclueLocation {
    #[zbus(property)]
    fn latitude(&self) -> zbus::Result<f64>;

    #[zbus(property)]
    fn longitude(&self) -> zbus::Result<f64>;
}

/// Location provider backed by the GeoClue2 service.
#[derive(Debug)]
pub struct GeoclueProvider {
    timeout: Duration,
}

impl GeoclueProvider {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(GEOCLUE_FIX_TIMEOUT_SECS),
        }
    }

    fn request_fix(&self) -> Result<Coordinate> {
        let connection = Connection::system().context("Failed to connect to system D-Bus")?;

        let manager = GeoclueManagerProxyBlocking::new(&connection)
            .context("Failed to create GeoClue manager proxy")?;
        let client_path = manager
            .get_client()
            .context("GeoClue refused to create a client")?;

        let client = GeoclueClientProxyBlocking::builder(&connection)
            .path(client_path)?
            .build()
            .context("Failed to create GeoClue client proxy")?;

        client
            .set_desktop_id(GEOCLUE_DESKTOP_ID)
            .context("Failed to set GeoClue desktop id")?;
        client
            .set_requested_accuracy_level(ACCURACY_CITY)
            .context("Failed to set GeoClue accuracy level")?;
        client.start().context("Failed to start GeoClue client")?;

        let result = self.wait_for_location(&connection, &client);
        report_stop(client.stop());
        result
    }

    fn wait_for_location(
        &self,
        connection: &Connection,
        client: &GeoclueClientProxyBlocking<'_>,
    ) -> Result<Coordinate> {
        let deadline = Instant::now() + self.timeout;

        loop {
            let path = client
                .location()
                .context("Failed to read GeoClue location")?;

            // "/" means no fix yet
            if path.as_str() != "/" {
                let location = GeoclueLocationProxyBlocking::builder(connection)
                    .path(path)?
                    .build()
                    .context("Failed to create GeoClue location proxy")?;
                let latitude = location.latitude()?;
                let longitude = location.longitude()?;
                return Coordinate::new(latitude, longitude);
            }

            if Instant::now() >= deadline {
                anyhow::bail!(
                    "No location reported within {} seconds",
                    self.timeout.as_secs()
                );
            }
            thread::sleep(LOCATION_POLL_INTERVAL);
        }
    }
}

impl Default for GeoclueProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for GeoclueProvider {
    fn poll(&mut self) -> LocationFix {
        match self.request_fix() {
            Ok(coordinate) => LocationFix::Located(coordinate),
            Err(e) if is_access_denied(&e) => LocationFix::Denied,
            Err(e) => LocationFix::Unavailable(format!("{e:#}")),
        }
    }

    fn name(&self) -> &'static str {
        "geoclue"
    }
}

/// A client that fails to stop is reclaimed by GeoClue when the connection
/// closes, so this only logs. Returns whether the stop succeeded.
fn report_stop(result: zbus::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log_debug!("Failed to stop GeoClue client: {e}");
            false
        }
    }
}

/// GeoClue reports agent refusals as `AccessDenied` D-Bus errors.
fn is_access_denied(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<zbus::Error>()
            .map(|e| e.to_string().contains("AccessDenied"))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_stop() {
        assert!(report_stop(Ok(())));
        assert!(!report_stop(Err(zbus::Error::Failure(
            "client already stopped".to_string()
        ))));
    }

    #[test]
    fn test_access_denied_detection() {
        let denied = anyhow::Error::new(zbus::Error::Failure(
            "org.freedesktop.DBus.Error.AccessDenied: agent refused".to_string(),
        ))
        .context("Failed to start GeoClue client");
        assert!(is_access_denied(&denied));

        let offline = anyhow::anyhow!("No location reported within 10 seconds");
        assert!(!is_access_denied(&offline));
    }
}
