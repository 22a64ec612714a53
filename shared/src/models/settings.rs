//! Label settings model

use serde::{Deserialize, Serialize};

use super::widget::Alignment;

/// Tape / ink colour
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LabelColor {
    White,
    Black,
    Yellow,
    Blue,
    Red,
    Green,
}

impl LabelColor {
    /// Approximate grey level used when rendering to a single-channel bitmap
    pub fn luma(&self) -> u8 {
        match self {
            Self::White => 255,
            Self::Yellow => 226,
            Self::Green => 150,
            Self::Red => 76,
            Self::Blue => 29,
            Self::Black => 0,
        }
    }
}

/// 允许的最大胶带宽度 (mm)
pub const MAX_TAPE_SIZE_MM: u32 = 64;
/// 允许的最大单侧边距 (px)
pub const MAX_MARGIN_PX: u32 = 2_000;
/// 允许的最大标签长度 (mm)
pub const MAX_LENGTH_MM: f32 = 2_000.0;

/// Settings shared by every widget on a label
///
/// 所有字段在请求中均可省略。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelSettings {
    /// Tape width in millimetres (6, 9, 12, 19)
    pub tape_size_mm: u32,
    /// Horizontal margin on each side, in pixels
    pub margin_px: u32,
    /// Minimum label length in millimetres (0 = fit content)
    pub min_length_mm: f32,
    pub justify: Alignment,
    pub foreground_color: LabelColor,
    pub background_color: LabelColor,
    /// Draw margin guides on the preview
    pub show_margins: bool,
    /// Printer selection: device id, `virtual:<name>`, or absent for auto-select
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printer_id: Option<String>,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            tape_size_mm: 12,
            margin_px: 56,
            min_length_mm: 0.0,
            justify: Alignment::Center,
            foreground_color: LabelColor::Black,
            background_color: LabelColor::White,
            show_margins: true,
            printer_id: None,
        }
    }
}

impl LabelSettings {
    /// The printer selection as given; only an empty string counts as absent
    pub fn printer_selection(&self) -> Option<&str> {
        self.printer_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Reject sizes no tape could carry
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(1..=MAX_TAPE_SIZE_MM).contains(&self.tape_size_mm) {
            return Err("tapeSizeMm must be between 1 and 64");
        }
        if self.margin_px > MAX_MARGIN_PX {
            return Err("marginPx must not exceed 2000");
        }
        if !(0.0..=MAX_LENGTH_MM).contains(&self.min_length_mm) {
            return Err("minLengthMm must be between 0 and 2000");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_uses_defaults() {
        let s: LabelSettings = serde_json::from_value(json!({})).unwrap();
        assert_eq!(s, LabelSettings::default());
        assert_eq!(s.tape_size_mm, 12);
        assert_eq!(s.justify, Alignment::Center);
        assert!(s.show_margins);
    }

    #[test]
    fn test_partial_settings() {
        let s: LabelSettings = serde_json::from_value(json!({
            "tapeSizeMm": 19,
            "minLengthMm": 40,
            "backgroundColor": "yellow",
            "printerId": "virtual:Desk"
        }))
        .unwrap();
        assert_eq!(s.tape_size_mm, 19);
        assert_eq!(s.min_length_mm, 40.0);
        assert_eq!(s.background_color, LabelColor::Yellow);
        assert_eq!(s.printer_selection(), Some("virtual:Desk"));
        assert_eq!(s.margin_px, 56);
    }

    #[test]
    fn test_empty_printer_id_means_auto_select() {
        let s: LabelSettings = serde_json::from_value(json!({"printerId": ""})).unwrap();
        assert_eq!(s.printer_selection(), None);

        let s: LabelSettings = serde_json::from_value(json!({"printerId": null})).unwrap();
        assert_eq!(s.printer_selection(), None);
    }

    #[test]
    fn test_printer_id_is_not_trimmed() {
        let s: LabelSettings = serde_json::from_value(json!({"printerId": " usb-1 "})).unwrap();
        assert_eq!(s.printer_selection(), Some(" usb-1 "));
    }

    #[test]
    fn test_validate_bounds() {
        assert!(LabelSettings::default().validate().is_ok());

        let s: LabelSettings = serde_json::from_value(json!({"marginPx": 4294967295u32})).unwrap();
        assert!(s.validate().is_err());

        for settings in [
            json!({"tapeSizeMm": 0}),
            json!({"tapeSizeMm": 65}),
            json!({"minLengthMm": -1}),
            json!({"minLengthMm": 1e30}),
        ] {
            let s: LabelSettings = serde_json::from_value(settings.clone()).unwrap();
            assert!(s.validate().is_err(), "{settings} should be rejected");
        }

        let s: LabelSettings =
            serde_json::from_value(json!({"tapeSizeMm": 64, "marginPx": 2000, "minLengthMm": 2000}))
                .unwrap();
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_luma_ordering() {
        assert!(LabelColor::White.luma() > LabelColor::Yellow.luma());
        assert_eq!(LabelColor::Black.luma(), 0);
    }
}
