//! Printer resolution
//!
//! 打印机选择策略：
//!
//! | printer_id | 行为 |
//! |------------|------|
//! | `virtual:<name>` | 查找同 id 的虚拟打印机，找不到即报错 |
//! | 设备 id | 扫描真实设备并精确匹配，失败时报错，不回退 |
//! | 空 / 未提供 | 自动选择第一台真实设备，没有则回退到第一台虚拟打印机 |

use std::sync::Arc;

use label_printer::{
    DeviceInfo, DeviceScanner, PrintError, VirtualPrinter, VirtualPrinterConfig, encode_label,
    is_virtual_id,
};
use shared::models::{
    LabelSettings, PrintOutcome, PrinterDescriptor, VIRTUAL_VENDOR_PRODUCT_ID, WidgetDescriptor,
};
use tracing::{debug, info, instrument, warn};

use super::error::{DispatchError, DispatchResult};
use super::renderer::{LabelRenderer, encode_png};
use super::sources::VirtualPrinterSource;

/// Chooses a destination for a label and sends it there
#[derive(Clone)]
pub struct PrinterResolver {
    scanner: Arc<dyn DeviceScanner>,
    virtual_printers: Arc<dyn VirtualPrinterSource>,
    renderer: Arc<dyn LabelRenderer>,
}

impl std::fmt::Debug for PrinterResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrinterResolver").finish_non_exhaustive()
    }
}

impl PrinterResolver {
    pub fn new(
        scanner: Arc<dyn DeviceScanner>,
        virtual_printers: Arc<dyn VirtualPrinterSource>,
        renderer: Arc<dyn LabelRenderer>,
    ) -> Self {
        Self {
            scanner,
            virtual_printers,
            renderer,
        }
    }

    /// All reachable real devices followed by all configured virtual printers
    ///
    /// Never fails: a scan error counts as zero devices.
    pub async fn list(&self) -> Vec<PrinterDescriptor> {
        let devices = match self.scanner.scan().await {
            Ok(devices) => devices,
            Err(e) => {
                warn!(error = %e, "Printer scan failed, listing virtual printers only");
                Vec::new()
            }
        };

        let virtuals = self.virtual_printers.load();
        let mut printers = Vec::with_capacity(devices.len() + virtuals.len());

        printers.extend(devices.iter().map(|d| PrinterDescriptor {
            id: d.id.clone(),
            name: d.display_name(),
            vendor_product_id: d.vendor_product_id.clone(),
            serial_number: d.serial_number.clone(),
        }));
        printers.extend(virtuals.iter().map(|c| PrinterDescriptor {
            id: c.id(),
            name: format!("{} (Virtual)", c.name),
            vendor_product_id: VIRTUAL_VENDOR_PRODUCT_ID.to_string(),
            serial_number: None,
        }));

        printers
    }

    /// Resolve `printer_id` to a destination and dispatch one label to it
    #[instrument(skip(self, widgets, settings), fields(printer_id = printer_id.unwrap_or("auto")))]
    pub async fn resolve(
        &self,
        printer_id: Option<&str>,
        widgets: &[WidgetDescriptor],
        settings: &LabelSettings,
    ) -> DispatchResult<PrintOutcome> {
        let printer_id = printer_id.filter(|id| !id.is_empty());

        if let Some(id) = printer_id.filter(|id| is_virtual_id(id)) {
            let config = self
                .virtual_printers
                .load()
                .into_iter()
                .find(|c| c.id() == id)
                .ok_or_else(|| DispatchError::NotFound(id.to_string()))?;
            return self.print_virtual(&config, widgets, settings).await;
        }

        let scanned = self.scanner.scan().await;

        match printer_id {
            Some(id) => {
                let device = match scanned {
                    Ok(devices) => devices.into_iter().find(|d| d.id == id),
                    Err(e) => {
                        warn!(error = %e, "Printer scan failed");
                        None
                    }
                }
                .ok_or_else(|| DispatchError::Device(format!("Printer not found: {}", id)))?;

                self.print_device(&device, widgets, settings).await
            }
            None => {
                let first = match scanned {
                    Ok(devices) => devices.into_iter().next(),
                    Err(e) => {
                        debug!(error = %e, "No real printers, trying virtual fallback");
                        None
                    }
                };

                if let Some(device) = first {
                    return self.print_device(&device, widgets, settings).await;
                }

                let config = self
                    .virtual_printers
                    .load()
                    .into_iter()
                    .next()
                    .ok_or(DispatchError::NoPrintersAvailable)?;
                info!(printer_id = %config.id(), "Falling back to virtual printer");
                self.print_virtual(&config, widgets, settings).await
            }
        }
    }

    /// Preview bitmap as PNG bytes
    pub fn preview(
        &self,
        widgets: &[WidgetDescriptor],
        settings: &LabelSettings,
    ) -> DispatchResult<Vec<u8>> {
        let bitmap = self.renderer.render_preview(widgets, settings)?;
        Ok(encode_png(&bitmap)?)
    }

    async fn print_device(
        &self,
        device: &DeviceInfo,
        widgets: &[WidgetDescriptor],
        settings: &LabelSettings,
    ) -> DispatchResult<PrintOutcome> {
        let bitmap = self.renderer.render_payload(widgets, settings)?;
        let job = encode_label(&bitmap);

        self.scanner
            .send(device, &job)
            .await
            .map_err(|source| DispatchError::Transport {
                printer_id: device.id.clone(),
                source,
            })?;

        info!(printer_id = %device.id, bytes = job.len(), "Label sent to printer");
        Ok(PrintOutcome {
            printer_id: device.id.clone(),
            files: Vec::new(),
        })
    }

    async fn print_virtual(
        &self,
        config: &VirtualPrinterConfig,
        widgets: &[WidgetDescriptor],
        settings: &LabelSettings,
    ) -> DispatchResult<PrintOutcome> {
        let printer_id = config.id();
        let io_error = |source: PrintError| DispatchError::Io {
            printer_id: printer_id.clone(),
            source,
        };

        let printer = VirtualPrinter::from_config(config).map_err(io_error)?;
        let bitmap = self.renderer.render_preview(widgets, settings)?;
        let files = printer
            .save(&bitmap, widgets, settings)
            .await
            .map_err(io_error)?;

        Ok(PrintOutcome {
            printer_id: printer.id(),
            files: files
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        })
    }
}
