//! Virtual printers
//!
//! A virtual printer writes labels to a directory instead of a device, so
//! multi-printer setups can be exercised without hardware.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::{PrintError, PrintResult};

/// Prefix of every virtual printer id
pub const VIRTUAL_PREFIX: &str = "virtual:";

/// What a virtual printer writes per label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Rendered preview PNG only
    #[default]
    Image,
    /// `{widgets, settings}` JSON record only
    Json,
    /// PNG and JSON sharing a base name
    Both,
}

impl OutputMode {
    pub fn writes_image(self) -> bool {
        matches!(self, Self::Image | Self::Both)
    }

    pub fn writes_json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

/// One configured virtual printer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualPrinterConfig {
    pub name: String,
    pub path: PathBuf,
    #[serde(default, rename = "output")]
    pub output_mode: OutputMode,
}

impl VirtualPrinterConfig {
    /// Routing id derived from the name
    pub fn id(&self) -> String {
        virtual_id(&self.name)
    }
}

/// Replace spaces with underscores and drop parentheses
///
/// Everything else (slashes, dots, unicode) is kept verbatim.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '(' && *c != ')')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// `virtual:` + sanitized name
pub fn virtual_id(name: &str) -> String {
    format!("{}{}", VIRTUAL_PREFIX, sanitize_name(name))
}

/// Whether a printer id selects a virtual printer
pub fn is_virtual_id(id: &str) -> bool {
    id.starts_with(VIRTUAL_PREFIX)
}

/// Filesystem sink standing in for a printer
#[derive(Debug, Clone)]
pub struct VirtualPrinter {
    name: String,
    output_path: PathBuf,
    output_mode: OutputMode,
}

impl VirtualPrinter {
    /// Create a virtual printer, making sure its output directory exists
    pub fn new(
        name: impl Into<String>,
        output_path: impl Into<PathBuf>,
        output_mode: OutputMode,
    ) -> PrintResult<Self> {
        let printer = Self {
            name: name.into(),
            output_path: output_path.into(),
            output_mode,
        };

        std::fs::create_dir_all(&printer.output_path).map_err(|source| {
            error!(path = %printer.output_path.display(), error = %source, "Failed to create output directory");
            PrintError::Output {
                path: printer.output_path.clone(),
                source,
            }
        })?;

        info!(
            printer = %printer.name,
            path = %printer.output_path.display(),
            "Virtual printer ready"
        );
        Ok(printer)
    }

    pub fn from_config(config: &VirtualPrinterConfig) -> PrintResult<Self> {
        Self::new(config.name.clone(), config.path.clone(), config.output_mode)
    }

    pub fn id(&self) -> String {
        virtual_id(&self.name)
    }

    pub fn display_name(&self) -> String {
        format!("{} (Virtual)", self.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Write one label according to the output mode
    ///
    /// Returns the written paths, image first. A failure part way through
    /// leaves already written files in place.
    #[instrument(skip(self, preview, widgets, settings), fields(printer = %self.name, mode = ?self.output_mode))]
    pub async fn save<W, S>(
        &self,
        preview: &GrayImage,
        widgets: &W,
        settings: &S,
    ) -> PrintResult<Vec<PathBuf>>
    where
        W: Serialize + ?Sized,
        S: Serialize + ?Sized,
    {
        let base = unique_base_name();
        let mut written = Vec::with_capacity(2);

        if self.output_mode.writes_image() {
            let mut png = Vec::new();
            preview.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
            let path = self.output_path.join(format!("{}.png", base));
            write_file(&path, &png).await?;
            written.push(path);
        }

        if self.output_mode.writes_json() {
            let record = serde_json::json!({
                "widgets": serde_json::to_value(widgets)?,
                "settings": serde_json::to_value(settings)?,
            });
            let bytes = serde_json::to_vec_pretty(&record)?;
            let path = self.output_path.join(format!("{}.json", base));
            write_file(&path, &bytes).await?;
            written.push(path);
        }

        Ok(written)
    }
}

/// `label_<YYYYmmdd_HHMMSS>_<8 hex>`
fn unique_base_name() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let simple = uuid::Uuid::new_v4().simple().to_string();
    format!("label_{}_{}", timestamp, &simple[..8])
}

async fn write_file(path: &Path, bytes: &[u8]) -> PrintResult<()> {
    match tokio::fs::write(path, bytes).await {
        Ok(()) => {
            info!(path = %path.display(), "Virtual printer saved label");
            Ok(())
        }
        Err(source) => {
            error!(path = %path.display(), error = %source, "Failed to save label");
            Err(PrintError::Output {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}
