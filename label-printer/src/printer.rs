//! Printer adapters for sending raster label data
//!
//! Supports:
//! - Network label printers (raw TCP, port 9100)

use crate::error::{PrintError, PrintResult};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

/// Default raw printing port
pub const DEFAULT_PORT: u16 = 9100;

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send a raw, already encoded print job to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;
}

/// Network label printer (raw TCP)
///
/// Most networked label and thermal printers accept raw jobs on port 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    /// `host:port`, resolved on every connect
    addr: String,
    port: u16,
    timeout: Duration,
    probe_timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer from host and port
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        Self::from_addr(&format!("{}:{}", host, port))
    }

    /// Create from an address string (e.g., "192.168.1.100:9100", "printer.local:9100")
    ///
    /// A bare IP or host name without port uses [`DEFAULT_PORT`]. Host names
    /// are resolved when connecting, so a printer whose DHCP lease changes is
    /// still found.
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let addr = addr.trim();
        let invalid = || PrintError::InvalidConfig(format!("Invalid address: {}", addr));

        let (target, port) = if let Ok(sa) = addr.parse::<SocketAddr>() {
            (sa.to_string(), sa.port())
        } else if let Ok(ip) = addr.parse::<IpAddr>() {
            (SocketAddr::new(ip, DEFAULT_PORT).to_string(), DEFAULT_PORT)
        } else {
            let (host, port) = match addr.rsplit_once(':') {
                Some((host, port)) => (host, port.parse::<u16>().map_err(|_| invalid())?),
                None => (addr, DEFAULT_PORT),
            };
            if !is_host_name(host) {
                return Err(invalid());
            }
            (format!("{}:{}", host, port), port)
        };

        Ok(Self {
            addr: target,
            port,
            timeout: Duration::from_secs(5),
            probe_timeout: Duration::from_millis(500),
        })
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout used by [`Printer::is_online`]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Get the printer address (`host:port`)
    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// DNS-style name: dot separated labels of ASCII letters, digits, `-` and `_`
fn is_host_name(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && label
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        })
}

impl Printer for NetworkPrinter {
    #[instrument(skip(data), fields(addr = %self.addr, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        info!("Connecting to label printer");

        let mut stream = tokio::time::timeout(self.timeout, TcpStream::connect(self.addr.as_str()))
            .await
            .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.addr)))?
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.addr, e)))?;

        stream.write_all(data).await.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write failed: {}", e),
            ))
        })?;

        stream.flush().await?;
        stream.shutdown().await?;

        info!("Label job sent");
        Ok(())
    }

    #[instrument(fields(addr = %self.addr))]
    async fn is_online(&self) -> bool {
        match tokio::time::timeout(self.probe_timeout, TcpStream::connect(self.addr.as_str())).await
        {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Label printer offline");
                false
            }
            Err(_) => {
                warn!("Label printer probe timeout");
                false
            }
        }
    }
}
