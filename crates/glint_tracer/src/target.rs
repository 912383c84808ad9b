//! Render targets: where finished pixel rows end up.

use std::path::Path;

use glint_core::Color;

/// Destination for rendered pixels.
///
/// The tracer produces one complete row of colors at a time and hands it
/// over in order, top row first.
pub trait RenderTarget {
    /// Target dimensions in pixels as (width, height).
    fn size(&self) -> (u32, u32);

    /// Store one finished row. `colors` has exactly `width` entries.
    fn write_row(&mut self, row: u32, colors: &[Color]);
}

/// An in-memory RGB framebuffer target.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Color at (x, y), with y=0 the top row.
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Convert to 8-bit RGBA, clamping each channel to [0, 1].
    ///
    /// No gamma correction is applied; colors are stored linear.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.pixels.len() * 4);
        for c in &self.pixels {
            let c = c.clamp(Color::ZERO, Color::ONE);
            data.push((c.x * 255.0) as u8);
            data.push((c.y * 255.0) as u8);
            data.push((c.z * 255.0) as u8);
            data.push(255);
        }
        data
    }

    /// Write the framebuffer to a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> image::ImageResult<()> {
        let mut img = image::RgbaImage::new(self.width, self.height);
        let data = self.to_rgba();
        for (i, pixel) in img.pixels_mut().enumerate() {
            let o = i * 4;
            *pixel = image::Rgba([data[o], data[o + 1], data[o + 2], data[o + 3]]);
        }
        img.save(path)
    }
}

impl RenderTarget for FrameBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn write_row(&mut self, row: u32, colors: &[Color]) {
        debug_assert_eq!(colors.len(), self.width as usize);
        let start = (row * self.width) as usize;
        self.pixels[start..start + colors.len()].copy_from_slice(colors);
    }
}
