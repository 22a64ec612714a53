//! Label renderer
//!
//! Turns a widget list into a single-channel bitmap. Two flavours exist:
//!
//! - **payload**: what is sent to a device (ink = black, paper = white)
//! - **preview**: the payload with tape/ink colours applied and, optionally,
//!   margin guides drawn in
//!
//! [`CanvasRenderer`] is a layout renderer: text lines are drawn as glyph
//! blocks rather than rasterised fonts.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageFormat, Luma};
use shared::models::{
    Alignment, BarcodeWidget, FontStyle, ImageWidget, LabelSettings, QrWidget, TextWidget,
    WidgetDescriptor,
};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::utils::{AppError, ErrorCode};

/// Printer head resolution (180 dpi)
pub const PIXELS_PER_MM: f32 = 7.09;

const INK: u8 = 0;
const PAPER: u8 = 255;
const GUIDE: u8 = 128;

/// Upper bound on any bitmap allocated while rendering (1 byte per pixel)
pub const MAX_CANVAS_PIXELS: u64 = 32 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No renderable widgets provided")]
    NothingToRender,

    #[error("Failed to load image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Label too large to render ({width}x{height} px)")]
    TooLarge { width: u64, height: u64 },

    #[error("Failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),
}

pub type RenderResult<T> = Result<T, RenderError>;

impl RenderError {
    /// Caused by the request content itself
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NothingToRender | Self::TooLarge { .. })
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::NothingToRender => AppError::new(ErrorCode::NothingToRender),
            RenderError::TooLarge { .. } => AppError::validation(err.to_string()),
            other => {
                tracing::error!(error = %other, "Label rendering failed");
                AppError::new(ErrorCode::RenderFailed)
            }
        }
    }
}

/// Widget-to-bitmap seam
pub trait LabelRenderer: Send + Sync {
    /// Bitmap shown to the user and written by virtual printers
    fn render_preview(
        &self,
        widgets: &[WidgetDescriptor],
        settings: &LabelSettings,
    ) -> RenderResult<GrayImage>;

    /// Bitmap sent to a real device
    fn render_payload(
        &self,
        widgets: &[WidgetDescriptor],
        settings: &LabelSettings,
    ) -> RenderResult<GrayImage>;
}

/// Encode a bitmap as PNG
pub fn encode_png(img: &GrayImage) -> RenderResult<Vec<u8>> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(RenderError::Encode)?;
    Ok(png)
}

/// Canvas height in pixels for a tape width
pub fn tape_height_px(tape_size_mm: u32) -> u32 {
    ((tape_size_mm.max(1) as f32) * PIXELS_PER_MM).round() as u32
}

/// Payload length in pixels for a minimum label length, without margins
pub fn min_payload_px(min_length_mm: f32, margin_px: u32) -> u32 {
    let px = min_length_mm.max(0.0) * PIXELS_PER_MM - (margin_px as f32) * 2.0;
    px.max(0.0).round() as u32
}

/// Width as `u32` when a `width` x `height` bitmap stays within [`MAX_CANVAS_PIXELS`]
fn canvas_width(width: u64, height: u32) -> RenderResult<u32> {
    let height = u64::from(height);
    match width.checked_mul(height) {
        Some(pixels) if pixels <= MAX_CANVAS_PIXELS => Ok(width as u32),
        _ => Err(RenderError::TooLarge { width, height }),
    }
}

/// Layout renderer backed by the `image` crate
#[derive(Debug, Clone)]
pub struct CanvasRenderer {
    upload_dir: PathBuf,
}

impl CanvasRenderer {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Render each widget into its own block; widgets producing nothing are skipped
    fn blocks(&self, widgets: &[WidgetDescriptor], height: u32) -> RenderResult<Vec<GrayImage>> {
        let mut blocks = Vec::with_capacity(widgets.len());
        for widget in widgets {
            let block = match widget {
                WidgetDescriptor::Text(w) => text_block(w, height)?,
                WidgetDescriptor::Qr(w) => qr_block(w, height),
                WidgetDescriptor::Barcode(w) => barcode_block(w, height)?,
                WidgetDescriptor::Image(w) => self.image_block(w, height)?,
                WidgetDescriptor::Unknown(_) => {
                    debug!("Skipping unknown widget");
                    None
                }
            };
            blocks.extend(block);
        }
        Ok(blocks)
    }

    fn image_block(&self, widget: &ImageWidget, height: u32) -> RenderResult<Option<GrayImage>> {
        if widget.filename.is_empty() {
            return Ok(None);
        }

        // Only bare file names inside the upload directory
        let bare = Path::new(&widget.filename)
            .file_name()
            .is_some_and(|n| n == widget.filename.as_str());
        if !bare {
            warn!(filename = %widget.filename, "Rejecting image path outside upload dir");
            return Ok(None);
        }

        let path = self.upload_dir.join(&widget.filename);
        if !path.is_file() {
            debug!(path = %path.display(), "Image widget file missing, skipping");
            return Ok(None);
        }

        let img = image::open(&path)
            .map_err(|source| RenderError::Image {
                path: path.clone(),
                source,
            })?
            .to_luma8();

        if img.width() == 0 || img.height() == 0 {
            return Ok(None);
        }

        let width = canvas_width(
            (u64::from(img.width()) * u64::from(height) / u64::from(img.height())).max(1),
            height,
        )?;
        Ok(Some(imageops::resize(&img, width, height, FilterType::Triangle)))
    }

    /// Combined content plus margins, ink on paper
    fn compose(&self, widgets: &[WidgetDescriptor], settings: &LabelSettings) -> RenderResult<GrayImage> {
        let height = tape_height_px(settings.tape_size_mm);
        canvas_width(1, height)?;
        let blocks = self.blocks(widgets, height)?;
        if blocks.is_empty() {
            return Err(RenderError::NothingToRender);
        }

        // u64 throughout; the final size is checked before allocating
        let gap = u64::from((height / 8).max(1));
        let content_width = blocks.iter().map(|b| u64::from(b.width())).sum::<u64>()
            + gap * (blocks.len() as u64 - 1);
        let payload_width = content_width.max(u64::from(min_payload_px(
            settings.min_length_mm,
            settings.margin_px,
        )));

        let offset = match settings.justify {
            Alignment::Left => 0,
            Alignment::Center => (payload_width - content_width) / 2,
            Alignment::Right => payload_width - content_width,
        };

        let margin = u64::from(settings.margin_px);
        let width = canvas_width(payload_width + margin * 2, height)?;
        let mut canvas = GrayImage::from_pixel(width, height, Luma([PAPER]));

        let mut x = (margin + offset) as i64;
        for block in &blocks {
            imageops::replace(&mut canvas, block, x, 0);
            x += (u64::from(block.width()) + gap) as i64;
        }

        Ok(canvas)
    }
}

impl LabelRenderer for CanvasRenderer {
    #[instrument(skip_all, fields(widgets = widgets.len()))]
    fn render_preview(
        &self,
        widgets: &[WidgetDescriptor],
        settings: &LabelSettings,
    ) -> RenderResult<GrayImage> {
        let mut canvas = self.compose(widgets, settings)?;

        let fg = settings.foreground_color.luma();
        let bg = settings.background_color.luma();
        for pixel in canvas.pixels_mut() {
            pixel.0[0] = if pixel.0[0] < 128 { fg } else { bg };
        }

        if settings.show_margins && settings.margin_px > 0 {
            let left = settings.margin_px.saturating_sub(1);
            let right = canvas.width().saturating_sub(settings.margin_px);
            dashed_vline(&mut canvas, left);
            dashed_vline(&mut canvas, right);
        }

        Ok(canvas)
    }

    #[instrument(skip_all, fields(widgets = widgets.len()))]
    fn render_payload(
        &self,
        widgets: &[WidgetDescriptor],
        settings: &LabelSettings,
    ) -> RenderResult<GrayImage> {
        self.compose(widgets, settings)
    }
}

// ========== Widget blocks ==========

fn text_block(widget: &TextWidget, height: u32) -> RenderResult<Option<GrayImage>> {
    if widget.text.is_empty() {
        return Ok(None);
    }

    let lines: Vec<&str> = widget.text.split('\n').collect();
    let frame = widget.frame_width_px.min(height / 2);
    let inner_height = height.saturating_sub(frame * 2).max(1);
    let scale = (widget.font_scale.clamp(1, 100) as f32) / 100.0;
    let line_height = ((inner_height as f32 * scale) / lines.len() as f32).max(1.0);

    let advance = match widget.font_style {
        FontStyle::Narrow => line_height * 0.45,
        FontStyle::Bold => line_height * 0.7,
        FontStyle::Regular | FontStyle::Italic => line_height * 0.6,
    }
    .max(1.0);
    let ink_ratio = match widget.font_style {
        FontStyle::Bold => 0.85,
        _ => 0.7,
    };

    let line_width = |line: &str| (line.chars().count() as f32 * advance).round() as u32;
    let text_width = lines.iter().map(|l| line_width(l)).max().unwrap_or(0).max(1);

    let width = canvas_width(u64::from(text_width) + u64::from(frame) * 2, height)?;
    let mut block = GrayImage::from_pixel(width, height, Luma([PAPER]));

    let top = frame as f32 + (inner_height as f32 - line_height * lines.len() as f32) / 2.0;
    for (row, line) in lines.iter().enumerate() {
        let lw = line_width(line);
        let start = frame
            + match widget.align {
                Alignment::Left => 0,
                Alignment::Center => (text_width - lw) / 2,
                Alignment::Right => text_width - lw,
            };
        let glyph_top = top + row as f32 * line_height + line_height * (1.0 - ink_ratio) / 2.0;
        let glyph_height = (line_height * ink_ratio).max(1.0) as u32;
        let glyph_width = (advance * 0.8).max(1.0) as u32;

        for (col, ch) in line.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let gx = start + (col as f32 * advance) as u32;
            fill_rect(&mut block, gx, glyph_top as u32, glyph_width, glyph_height, INK);
        }
    }

    if frame > 0 {
        fill_rect(&mut block, 0, 0, width, frame, INK);
        fill_rect(&mut block, 0, height.saturating_sub(frame), width, frame, INK);
        fill_rect(&mut block, 0, 0, frame, height, INK);
        fill_rect(&mut block, width.saturating_sub(frame), 0, frame, height, INK);
    }

    Ok(Some(block))
}

fn qr_block(widget: &QrWidget, height: u32) -> Option<GrayImage> {
    let content = widget.content.trim();
    if content.is_empty() {
        return None;
    }

    const MODULES: u32 = 21;
    let module = (height / MODULES).max(1);
    let side = module * MODULES;
    let mut block = GrayImage::from_pixel(side, height, Luma([PAPER]));
    let top = (height - side.min(height)) / 2;

    let bits = content_bits(content.as_bytes(), (MODULES * MODULES) as usize);
    for my in 0..MODULES {
        for mx in 0..MODULES {
            let dark = match finder_module(mx, my, MODULES) {
                Some(dark) => dark,
                None => bits[(my * MODULES + mx) as usize],
            };
            if dark {
                fill_rect(&mut block, mx * module, top + my * module, module, module, INK);
            }
        }
    }

    Some(block)
}

/// Finder patterns in three corners; `None` outside them
fn finder_module(x: u32, y: u32, size: u32) -> Option<bool> {
    let corners = [(0, 0), (size - 7, 0), (0, size - 7)];
    for (cx, cy) in corners {
        if x >= cx && x < cx + 7 && y >= cy && y < cy + 7 {
            let (dx, dy) = (x - cx, y - cy);
            let ring = dx.min(dy).min(6 - dx).min(6 - dy);
            return Some(ring != 1);
        }
    }
    None
}

fn barcode_block(widget: &BarcodeWidget, height: u32) -> RenderResult<Option<GrayImage>> {
    let content = widget.content.trim();
    if content.is_empty() {
        return Ok(None);
    }

    const MODULE: u32 = 2;
    // start guard, data, stop guard
    let mut pattern = vec![true, false, true, false];
    for byte in content.bytes() {
        for bit in (0..8).rev() {
            pattern.push((byte >> bit) & 1 == 1);
        }
        pattern.push(false);
    }
    pattern.extend([true, false, true, true]);

    let width = canvas_width(pattern.len() as u64 * u64::from(MODULE), height)?;
    let bar_height = if widget.show_text {
        (height * 3) / 4
    } else {
        height
    };
    let mut block = GrayImage::from_pixel(width, height, Luma([PAPER]));
    for (i, dark) in pattern.iter().enumerate() {
        if *dark {
            fill_rect(&mut block, i as u32 * MODULE, 0, MODULE, bar_height, INK);
        }
    }

    if widget.show_text {
        let text_height = height - bar_height;
        let glyph = (text_height as f32 * 0.6).max(1.0) as u32;
        let advance = (glyph as f32 * 0.8).max(1.0) as u32;
        let text_width = advance * content.chars().count() as u32;
        let start = width.saturating_sub(text_width) / 2;
        for (i, ch) in content.chars().enumerate() {
            if !ch.is_whitespace() {
                fill_rect(
                    &mut block,
                    start + i as u32 * advance,
                    bar_height + (text_height - glyph) / 2,
                    (advance * 3 / 4).max(1),
                    glyph,
                    INK,
                );
            }
        }
    }

    Ok(Some(block))
}

/// Deterministic bit pattern derived from content (FNV-1a driven xorshift)
fn content_bits(content: &[u8], count: usize) -> Vec<bool> {
    let mut state: u64 = 0xcbf2_9ce4_8422_2325;
    for b in content {
        state ^= *b as u64;
        state = state.wrapping_mul(0x0100_0000_01b3);
    }
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state & 1 == 1
        })
        .collect()
}

// ========== Drawing helpers ==========

fn fill_rect(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32, luma: u8) {
    let x_end = x.saturating_add(w).min(img.width());
    let y_end = y.saturating_add(h).min(img.height());
    for py in y.min(y_end)..y_end {
        for px in x.min(x_end)..x_end {
            img.put_pixel(px, py, Luma([luma]));
        }
    }
}

fn dashed_vline(img: &mut GrayImage, x: u32) {
    if x >= img.width() {
        return;
    }
    for y in (0..img.height()).filter(|y| (y / 3) % 2 == 0) {
        img.put_pixel(x, y, Luma([GUIDE]));
    }
}
