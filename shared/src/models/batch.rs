//! Print requests and the batch event protocol

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::settings::LabelSettings;
use super::widget::WidgetDescriptor;

/// One data row: placeholder name -> replacement text
pub type PrintRow = BTreeMap<String, String>;

/// `POST /api/print` and `POST /api/preview` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrintRequest {
    #[serde(default)]
    pub widgets: Vec<WidgetDescriptor>,
    #[serde(default)]
    pub settings: LabelSettings,
}

/// `POST /api/batch-print` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPrintRequest {
    #[serde(default)]
    pub widgets: Vec<WidgetDescriptor>,
    #[serde(default)]
    pub settings: LabelSettings,
    #[serde(default)]
    pub rows: Vec<PrintRow>,
    /// Copies per row (values below 1 are treated as 1)
    #[serde(default = "default_copies")]
    pub copies: i64,
    /// Seconds to wait between labels (negative or non-finite means 0)
    #[serde(default)]
    pub pause_time: f64,
}

fn default_copies() -> i64 {
    1
}

/// `POST /api/batch-print/cancel` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    #[serde(default)]
    pub job_id: String,
}

/// Registry view of a batch job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchJobStatus {
    pub job_id: String,
    pub cancelled: bool,
    pub done: bool,
}

/// Progress event streamed while a batch job runs
///
/// Serialized as one JSON object per line with an `event` discriminator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum BatchEvent {
    #[serde(rename_all = "camelCase")]
    Started { job_id: String, total: usize },
    Printing { index: usize, total: usize },
    Printed { index: usize, total: usize },
    /// `printed` = number of labels fully printed before stopping
    Cancelled { printed: usize },
    Error { index: usize, message: String },
    Done { total: usize },
}

impl BatchEvent {
    /// Whether this event ends the stream
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Cancelled { .. } | Self::Error { .. } | Self::Done { .. }
        )
    }
}
