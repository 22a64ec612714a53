//! Raster job builder
//!
//! Encodes a rendered label bitmap as an ESC/POS raster job (`GS v 0`).
//! Label bitmaps are laid out with the tape length on the X axis, so they
//! are rotated before encoding to make the tape run along the feed direction.

use image::GrayImage;
use tracing::instrument;

/// Luma threshold below which a pixel is printed
const INK_THRESHOLD: u8 = 128;

/// Raster command builder
pub struct RasterBuilder {
    buf: Vec<u8>,
}

impl RasterBuilder {
    /// Create a new builder (emits printer initialisation)
    pub fn new() -> Self {
        let mut buf = Vec::with_capacity(8192);
        // ESC @ - initialize
        buf.extend_from_slice(&[0x1B, 0x40]);
        Self { buf }
    }

    /// Append a bitmap as it is, one raster row per image row
    pub fn bitmap(&mut self, img: &GrayImage) -> &mut Self {
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return self;
        }

        let x_bytes = w.div_ceil(8);

        // GS v 0 m xL xH yL yH
        self.buf.extend_from_slice(&[0x1D, 0x76, 0x30, 0x00]);
        self.buf.push(x_bytes as u8);
        self.buf.push((x_bytes >> 8) as u8);
        self.buf.push(h as u8);
        self.buf.push((h >> 8) as u8);

        for y in 0..h {
            for x_byte in 0..x_bytes {
                let mut byte = 0u8;
                for bit in 0..8 {
                    let x = x_byte * 8 + bit;
                    if x < w && img.get_pixel(x, y)[0] < INK_THRESHOLD {
                        byte |= 1 << (7 - bit);
                    }
                }
                self.buf.push(byte);
            }
        }

        self
    }

    /// Append a label bitmap, rotated so the tape length follows the feed
    pub fn label(&mut self, img: &GrayImage) -> &mut Self {
        let rotated = image::imageops::rotate90(img);
        self.bitmap(&rotated)
    }

    /// Feed n dot lines
    pub fn feed_dots(&mut self, dots: u8) -> &mut Self {
        // ESC J n
        self.buf.extend_from_slice(&[0x1B, 0x4A, dots]);
        self
    }

    /// Cut tape (full cut)
    pub fn cut(&mut self) -> &mut Self {
        // GS V 0
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x00]);
        self
    }

    /// Build the final byte buffer
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for RasterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a complete single-label job: init, raster, feed, cut
#[instrument(skip(img), fields(width = img.width(), height = img.height()))]
pub fn encode_label(img: &GrayImage) -> Vec<u8> {
    let mut b = RasterBuilder::new();
    b.label(img).feed_dots(24).cut();
    b.build()
}
