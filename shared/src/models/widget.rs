//! Label widget model
//!
//! 前端编辑器中的每个组件都序列化为一个 `WidgetDescriptor`，
//! 通过 `type` 字段区分种类。

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Font face used by a text widget
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    Narrow,
}

/// Horizontal alignment (text lines and label justification)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Text widget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextWidget {
    #[serde(default)]
    pub id: String,
    /// Multi-line text, lines separated by `\n`
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub font_style: FontStyle,
    /// Font size as a percentage of the tape height
    #[serde(default = "default_font_scale")]
    pub font_scale: u32,
    #[serde(default)]
    pub frame_width_px: u32,
    #[serde(default)]
    pub align: Alignment,
}

fn default_font_scale() -> u32 {
    90
}

/// QR code widget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QrWidget {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
}

/// Barcode widget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeWidget {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
    /// Symbology name (code128, ean13, ...). Unknown names render as code128.
    #[serde(default = "default_barcode_type")]
    pub barcode_type: String,
    #[serde(default)]
    pub show_text: bool,
}

fn default_barcode_type() -> String {
    "code128".to_string()
}

/// Image widget, referencing a file inside the upload directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageWidget {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub filename: String,
}

/// A single label widget
///
/// Serialized as an object tagged by `type`. Kinds this server does not know
/// are kept as the raw JSON object and written back out unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetDescriptor {
    Text(TextWidget),
    Qr(QrWidget),
    Barcode(BarcodeWidget),
    Image(ImageWidget),
    /// 未知类型：保留原始 JSON，渲染时跳过
    Unknown(Value),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum KnownWidget {
    Text(TextWidget),
    Qr(QrWidget),
    Barcode(BarcodeWidget),
    Image(ImageWidget),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum KnownWidgetRef<'a> {
    Text(&'a TextWidget),
    Qr(&'a QrWidget),
    Barcode(&'a BarcodeWidget),
    Image(&'a ImageWidget),
}

const KNOWN_KINDS: [&str; 4] = ["text", "qr", "barcode", "image"];

impl Serialize for WidgetDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(w) => KnownWidgetRef::Text(w).serialize(serializer),
            Self::Qr(w) => KnownWidgetRef::Qr(w).serialize(serializer),
            Self::Barcode(w) => KnownWidgetRef::Barcode(w).serialize(serializer),
            Self::Image(w) => KnownWidgetRef::Image(w).serialize(serializer),
            Self::Unknown(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for WidgetDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let raw = Value::deserialize(deserializer)?;
        let kind = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?;

        if !KNOWN_KINDS.contains(&kind) {
            return Ok(Self::Unknown(raw));
        }
        let known = KnownWidget::deserialize(raw).map_err(D::Error::custom)?;
        Ok(match known {
            KnownWidget::Text(w) => Self::Text(w),
            KnownWidget::Qr(w) => Self::Qr(w),
            KnownWidget::Barcode(w) => Self::Barcode(w),
            KnownWidget::Image(w) => Self::Image(w),
        })
    }
}

impl WidgetDescriptor {
    /// Widget id, if the kind carries one
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Text(w) => Some(&w.id),
            Self::Qr(w) => Some(&w.id),
            Self::Barcode(w) => Some(&w.id),
            Self::Image(w) => Some(&w.id),
            Self::Unknown(raw) => raw.get("id").and_then(Value::as_str),
        }
    }

    /// The field that accepts `:name:` placeholders (`text` or `content`)
    pub fn template_field(&self) -> Option<&str> {
        match self {
            Self::Text(w) => Some(&w.text),
            Self::Qr(w) => Some(&w.content),
            Self::Barcode(w) => Some(&w.content),
            Self::Image(_) | Self::Unknown(_) => None,
        }
    }

    /// Mutable access to the placeholder-bearing field
    pub fn template_field_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Text(w) => Some(&mut w.text),
            Self::Qr(w) => Some(&mut w.content),
            Self::Barcode(w) => Some(&mut w.content),
            Self::Image(_) | Self::Unknown(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Qr(_) => "qr",
            Self::Barcode(_) => "barcode",
            Self::Image(_) => "image",
            Self::Unknown(_) => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_widget_defaults() {
        let w: WidgetDescriptor =
            serde_json::from_value(json!({"type": "text", "id": "t1", "text": "Hi"})).unwrap();
        match w {
            WidgetDescriptor::Text(t) => {
                assert_eq!(t.text, "Hi");
                assert_eq!(t.font_style, FontStyle::Regular);
                assert_eq!(t.font_scale, 90);
                assert_eq!(t.frame_width_px, 0);
                assert_eq!(t.align, Alignment::Left);
            }
            other => panic!("unexpected widget: {:?}", other),
        }
    }

    #[test]
    fn test_barcode_camel_case_fields() {
        let w: WidgetDescriptor = serde_json::from_value(json!({
            "type": "barcode",
            "id": "b1",
            "content": "123",
            "barcodeType": "ean13",
            "showText": true
        }))
        .unwrap();
        match w {
            WidgetDescriptor::Barcode(b) => {
                assert_eq!(b.barcode_type, "ean13");
                assert!(b.show_text);
            }
            other => panic!("unexpected widget: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_is_kept_verbatim() {
        let raw = json!({"type": "sparkles", "id": "x", "density": 3, "colors": ["red"]});
        let w: WidgetDescriptor = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(w, WidgetDescriptor::Unknown(raw.clone()));
        assert_eq!(w.kind(), "unknown");
        assert_eq!(w.id(), Some("x"));
        assert!(w.template_field().is_none());

        assert_eq!(serde_json::to_value(&w).unwrap(), raw);
    }

    #[test]
    fn test_missing_type_or_bad_known_kind_is_an_error() {
        assert!(serde_json::from_value::<WidgetDescriptor>(json!({"id": "x"})).is_err());
        assert!(serde_json::from_value::<WidgetDescriptor>(json!("text")).is_err());
        assert!(
            serde_json::from_value::<WidgetDescriptor>(json!({"type": "text", "fontScale": "big"}))
                .is_err()
        );
    }

    #[test]
    fn test_template_field_per_kind() {
        let qr = WidgetDescriptor::Qr(QrWidget {
            id: "q".into(),
            content: ":url:".into(),
        });
        assert_eq!(qr.template_field(), Some(":url:"));

        let img = WidgetDescriptor::Image(ImageWidget {
            id: "i".into(),
            filename: ":name:.png".into(),
        });
        assert!(img.template_field().is_none());
    }

    #[test]
    fn test_serialize_uses_type_tag() {
        let w = WidgetDescriptor::Qr(QrWidget {
            id: "q1".into(),
            content: "abc".into(),
        });
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["type"], "qr");
        assert_eq!(v["content"], "abc");
    }
}
