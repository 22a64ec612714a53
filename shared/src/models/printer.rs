//! Printer listing model

use serde::{Deserialize, Serialize};

/// Vendor/product marker reported for virtual printers
pub const VIRTUAL_VENDOR_PRODUCT_ID: &str = "virtual";

/// A printer as shown to clients (rebuilt on every listing, never stored)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrinterDescriptor {
    pub id: String,
    /// Display name
    pub name: String,
    pub vendor_product_id: String,
    pub serial_number: Option<String>,
}

impl PrinterDescriptor {
    pub fn is_virtual(&self) -> bool {
        self.vendor_product_id == VIRTUAL_VENDOR_PRODUCT_ID
    }
}

/// Where a single print ended up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrintOutcome {
    pub printer_id: String,
    /// Files written by a virtual printer (empty for real devices)
    #[serde(default)]
    pub files: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_wire_format() {
        let d = PrinterDescriptor {
            id: "virtual:Desk".into(),
            name: "Desk (Virtual)".into(),
            vendor_product_id: VIRTUAL_VENDOR_PRODUCT_ID.into(),
            serial_number: None,
        };
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["vendorProductId"], "virtual");
        assert!(v["serialNumber"].is_null());
        assert!(d.is_virtual());
    }
}
