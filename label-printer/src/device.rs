//! Real-device discovery
//!
//! A [`DeviceScanner`] reports the label printers that are reachable right
//! now and delivers raw jobs to one of them. The server only sees this trait,
//! so other transports can be plugged in without touching resolution logic.

use crate::error::{PrintError, PrintResult};
use crate::printer::{NetworkPrinter, Printer};
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, instrument, warn};

/// A scanned, reachable label printer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Stable identifier used to select this device
    pub id: String,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    /// e.g. "0922:1001" for USB, "network" for raw TCP printers
    pub vendor_product_id: String,
}

impl DeviceInfo {
    /// Human readable name: manufacturer, product and serial, or the id
    pub fn display_name(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(m) = self.manufacturer.as_deref().filter(|s| !s.is_empty()) {
            parts.push(m.to_string());
        }
        if let Some(p) = self.product.as_deref().filter(|s| !s.is_empty()) {
            parts.push(p.to_string());
        }
        if let Some(sn) = self.serial_number.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("(S/N: {})", sn));
        }

        if parts.is_empty() {
            self.id.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// Discovery and delivery for real printers
#[async_trait]
pub trait DeviceScanner: Send + Sync {
    /// List reachable devices. An error means the scan itself failed.
    async fn scan(&self) -> PrintResult<Vec<DeviceInfo>>;

    /// Send an encoded job to a previously scanned device
    async fn send(&self, device: &DeviceInfo, data: &[u8]) -> PrintResult<()>;
}

/// Scanner over a fixed list of raw-TCP label printers
///
/// A configured printer counts as present only while it answers a
/// connection probe.
#[derive(Debug, Clone, Default)]
pub struct NetworkScanner {
    printers: Vec<NetworkPrinter>,
}

impl NetworkScanner {
    /// Build from `host:port` strings; unparseable entries are skipped
    pub fn from_addrs<I, S>(addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let printers = addrs
            .into_iter()
            .filter(|a| !a.as_ref().trim().is_empty())
            .filter_map(|a| match NetworkPrinter::from_addr(a.as_ref()) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(addr = a.as_ref(), error = %e, "Skipping network printer");
                    None
                }
            })
            .collect();

        Self { printers }
    }

    /// Number of configured printers (reachable or not)
    pub fn configured(&self) -> usize {
        self.printers.len()
    }
}

#[async_trait]
impl DeviceScanner for NetworkScanner {
    #[instrument(skip(self), fields(configured = self.printers.len()))]
    async fn scan(&self) -> PrintResult<Vec<DeviceInfo>> {
        if self.printers.is_empty() {
            return Err(PrintError::NoDevices(
                "no network label printers configured".to_string(),
            ));
        }

        let probes = join_all(self.printers.iter().map(|p| p.is_online())).await;

        let devices: Vec<DeviceInfo> = self
            .printers
            .iter()
            .zip(probes)
            .filter(|(_, online)| *online)
            .map(|(p, _)| DeviceInfo {
                id: p.addr().to_string(),
                manufacturer: None,
                product: Some(format!("Network label printer {}", p.addr())),
                serial_number: None,
                vendor_product_id: "network".to_string(),
            })
            .collect();

        debug!(online = devices.len(), "Network scan finished");
        Ok(devices)
    }

    async fn send(&self, device: &DeviceInfo, data: &[u8]) -> PrintResult<()> {
        let printer = self
            .printers
            .iter()
            .find(|p| p.addr() == device.id)
            .ok_or_else(|| PrintError::Offline(device.id.clone()))?;

        printer.print(data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(manufacturer: Option<&str>, product: Option<&str>, sn: Option<&str>) -> DeviceInfo {
        DeviceInfo {
            id: "Bus 001 Device 005: ID 0922:1001".to_string(),
            manufacturer: manufacturer.map(String::from),
            product: product.map(String::from),
            serial_number: sn.map(String::from),
            vendor_product_id: "0922:1001".to_string(),
        }
    }

    #[test]
    fn test_display_name_joins_parts() {
        let d = device(Some("DYMO"), Some("LabelManager PnP"), Some("123"));
        assert_eq!(d.display_name(), "DYMO LabelManager PnP (S/N: 123)");
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let d = device(None, None, None);
        assert_eq!(d.display_name(), "Bus 001 Device 005: ID 0922:1001");
    }

    #[test]
    fn test_from_addrs_skips_invalid() {
        let scanner =
            NetworkScanner::from_addrs(["127.0.0.1:9100", "", "bad host!", "printer.local:9100"]);
        assert_eq!(scanner.configured(), 2);
    }

    #[tokio::test]
    async fn test_scan_without_printers_fails() {
        let scanner = NetworkScanner::default();
        assert!(matches!(scanner.scan().await, Err(PrintError::NoDevices(_))));
    }

    #[tokio::test]
    async fn test_scan_reports_only_reachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let live = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            while listener.accept().await.is_ok() {}
        });

        // Port 1 on localhost is refused immediately
        let scanner = NetworkScanner::from_addrs([live.as_str(), "127.0.0.1:1"]);
        let devices = scanner.scan().await.unwrap();

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, live);
        assert_eq!(devices[0].vendor_product_id, "network");
    }
}
