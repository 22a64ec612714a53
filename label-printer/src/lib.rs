//! # label-printer
//!
//! Label printer library - low-level output capabilities only.
//!
//! ## Scope
//!
//! This crate handles WHERE a rendered label goes:
//! - Device discovery behind the [`DeviceScanner`] trait
//! - Network printing (raw TCP, port 9100)
//! - Raster job encoding (`GS v 0`)
//! - Virtual printers that write labels to disk
//!
//! Deciding WHICH printer to use, rendering widgets and batch jobs stay in
//! application code (label-server).
//!
//! ## Example
//!
//! ```ignore
//! use label_printer::{encode_label, NetworkPrinter, Printer};
//!
//! let job = encode_label(&bitmap);
//! let printer = NetworkPrinter::new("192.168.1.100", 9100)?;
//! printer.print(&job).await?;
//! ```

mod device;
mod error;
mod printer;
mod raster;
mod virtual_printer;

// Re-exports
pub use device::{DeviceInfo, DeviceScanner, NetworkScanner};
pub use error::{PrintError, PrintResult};
pub use printer::{DEFAULT_PORT, NetworkPrinter, Printer};
pub use raster::{RasterBuilder, encode_label};
pub use virtual_printer::{
    OutputMode, VIRTUAL_PREFIX, VirtualPrinter, VirtualPrinterConfig, is_virtual_id,
    sanitize_name, virtual_id,
};

/// Re-exported so callers can name bitmap types without a direct dependency
pub use image::GrayImage;
