//! Clipped drawing primitives over an RGB image buffer.

use image::{Rgb, RgbImage};

use super::font::{glyph, text_width, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

pub type Color = Rgb<u8>;

pub const WHITE: Color = Rgb([255, 255, 255]);
pub const BLACK: Color = Rgb([0, 0, 0]);
pub const GRID: Color = Rgb([225, 225, 225]);
pub const AXIS: Color = Rgb([60, 60, 60]);

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self { image: RgbImage::from_pixel(width, height, background) }
    }

    pub fn width(&self) -> i32 {
        self.image.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.image.height() as i32
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub fn put(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return;
        }
        self.image.put_pixel(x as u32, y as u32, color);
    }

    /// Fill the rectangle spanning `(x0, y0)` to `(x1, y1)` inclusive.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let (left, right) = (x0.min(x1).max(0), x0.max(x1).min(self.width() - 1));
        let (top, bottom) = (y0.min(y1).max(0), y0.max(y1).min(self.height() - 1));
        for y in top..=bottom {
            for x in left..=right {
                self.image.put_pixel(x as u32, y as u32, color);
            }
        }
    }

    pub fn outline_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        self.hline(x0, x1, y0, color);
        self.hline(x0, x1, y1, color);
        self.vline(x0, y0, y1, color);
        self.vline(x1, y0, y1, color);
    }

    pub fn hline(&mut self, x0: i32, x1: i32, y: i32, color: Color) {
        for x in x0.min(x1)..=x0.max(x1) {
            self.put(x, y, color);
        }
    }

    pub fn vline(&mut self, x: i32, y0: i32, y1: i32, color: Color) {
        for y in y0.min(y1)..=y0.max(y1) {
            self.put(x, y, color);
        }
    }

    /// Diagonal hatching (`/`) inside a rectangle, one stroke every
    /// `spacing` pixels.
    pub fn hatch_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, spacing: i32, color: Color) {
        let (left, right) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (y0.min(y1), y0.max(y1));
        let spacing = spacing.max(2);
        for y in top..=bottom {
            for x in left..=right {
                if (x + y).rem_euclid(spacing) == 0 {
                    self.put(x, y, color);
                }
            }
        }
    }

    /// Draw `text` with its top edge at `y`, anchored at `x`.
    pub fn text(&mut self, x: i32, y: i32, text: &str, scale: u32, align: Align, color: Color) {
        let width = text_width(text, scale) as i32;
        let mut origin = match align {
            Align::Left => x,
            Align::Center => x - width / 2,
            Align::Right => x - width,
        };
        let scale = scale.max(1) as i32;

        for c in text.chars() {
            for (row, bits) in glyph(c).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let px = origin + col as i32 * scale;
                    let py = y + row as i32 * scale;
                    self.fill_rect(px, py, px + scale - 1, py + scale - 1, color);
                }
            }
            origin += GLYPH_ADVANCE as i32 * scale;
        }
    }

    pub fn text_height(scale: u32) -> i32 {
        (GLYPH_HEIGHT * scale.max(1)) as i32
    }
}

/// Blend `color` towards white; `amount` 0 keeps it, 1 gives white.
pub fn lighten(color: Color, amount: f32) -> Color {
    let amount = amount.clamp(0.0, 1.0);
    let Rgb([r, g, b]) = color;
    let mix = |channel: u8| (f32::from(channel) + (255.0 - f32::from(channel)) * amount) as u8;
    Rgb([mix(r), mix(g), mix(b)])
}
