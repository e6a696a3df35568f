/// Rasterizer: executes a display list on an RGBA canvas and encodes PNG

use super::layout::GLYPH_SIZE;
use super::paint::{PaintCommand, Rgba};
use super::Screenshot;
use crate::{Error, Result};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

/// Fixed-size pixel surface. Drawing outside it is clipped.
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.image.get_pixel(x, y).0
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, rgba: Rgba) {
        let x0 = (x as i64).max(0);
        let y0 = (y as i64).max(0);
        let x1 = (x as i64 + width as i64).min(self.width() as i64);
        let y1 = (y as i64 + height as i64).min(self.height() as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let pixel = image::Rgba(rgba);
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px as u32, py as u32, pixel);
            }
        }
    }

    /// Draw text as glyph blocks on an 8px-per-scale grid, one row per line.
    /// Lowercase letters get a shorter block than capitals, digits and punctuation.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: u32, rgba: Rgba) {
        let scale = scale.max(1);
        let cell = (GLYPH_SIZE * scale) as i64;
        for (row, line) in text.lines().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let (top, rows) = if ch.is_lowercase() { (3, 4) } else { (1, 6) };
                let gx = x as i64 + col as i64 * cell + scale as i64;
                let gy = y as i64 + row as i64 * cell + (top * scale) as i64;
                if gx > i32::MAX as i64 || gy > i32::MAX as i64 {
                    return;
                }
                self.fill_rect(gx as i32, gy as i32, 6 * scale, rows * scale, rgba);
            }
        }
    }

    pub fn execute(&mut self, commands: &[PaintCommand]) {
        for cmd in commands {
            match cmd {
                PaintCommand::SolidRect { x, y, width, height, rgba } => {
                    self.fill_rect(*x, *y, *width, *height, *rgba)
                }
                PaintCommand::Text { x, y, text, scale, rgba } => self.draw_text(*x, *y, text, *scale, *rgba),
            }
        }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(self.image.as_raw(), self.width(), self.height(), ExtendedColorType::Rgba8)
            .map_err(|e| Error::EncodeError(format!("PNG encoding failed: {}", e)))?;
        Ok(out)
    }
}

/// Execute `commands` on a `width` x `height` canvas and encode it.
pub fn rasterize(width: u32, height: u32, commands: &[PaintCommand]) -> Result<Screenshot> {
    if width == 0 || height == 0 {
        return Err(Error::EncodeError(format!("cannot rasterize an empty {}x{} surface", width, height)));
    }
    let mut canvas = Canvas::new(width, height);
    canvas.execute(commands);
    Ok(Screenshot {
        width,
        height,
        png_data: canvas.encode_png()?,
    })
}
