//! Virtual printer configuration sources

use label_printer::VirtualPrinterConfig;

use crate::core::config::load_virtual_printers;

/// Supplies the current virtual printer list
///
/// Called on every listing and resolution; implementations must not cache.
pub trait VirtualPrinterSource: Send + Sync {
    fn load(&self) -> Vec<VirtualPrinterConfig>;
}

/// Reads `VIRTUAL_PRINTERS` from the process environment each time
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvVirtualPrinters;

impl VirtualPrinterSource for EnvVirtualPrinters {
    fn load(&self) -> Vec<VirtualPrinterConfig> {
        load_virtual_printers()
    }
}

/// Fixed list, mostly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct StaticVirtualPrinters(pub Vec<VirtualPrinterConfig>);

impl VirtualPrinterSource for StaticVirtualPrinters {
    fn load(&self) -> Vec<VirtualPrinterConfig> {
        self.0.clone()
    }
}
