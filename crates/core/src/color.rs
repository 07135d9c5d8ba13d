//! Color palette model
//!
//! The palette is a grid of square swatches. The top strip is a grayscale
//! ramp; the area below it is a hue/saturation/brightness ramp. Sampling and
//! rendering share one function, so a color picked at a point is exactly the
//! color of the swatch drawn under it.

use crate::annotation::Color;
use crate::error::{EditorError, EditorResult};
use kurbo::{Point, Rect};

const SATURATION_EXPONENT_TOP: f64 = 2.0;
const SATURATION_EXPONENT_BOTTOM: f64 = 1.3;

/// Color in hue/saturation/brightness form, each component in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsb {
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
}

impl Hsb {
    pub fn new(hue: f64, saturation: f64, brightness: f64) -> Self {
        Self { hue, saturation, brightness }
    }

    /// Convert to an opaque RGB color. Hue wraps, so 1.0 is red again.
    pub fn to_color(self) -> Color {
        let s = self.saturation.clamp(0.0, 1.0);
        let v = self.brightness.clamp(0.0, 1.0);
        let h6 = self.hue.rem_euclid(1.0) * 6.0;
        let c = v * s;
        let x = c * (1.0 - ((h6 % 2.0) - 1.0).abs());
        let m = v - c;
        let (r, g, b) = match h6 as i32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Color::rgb((r + m) as f32, (g + m) as f32, (b + m) as f32)
    }
}

/// One rendered palette cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    /// Cell rectangle, clipped to the palette bounds
    pub rect: Rect,
    pub color: Color,
}

/// Palette laid out over `bounds`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    bounds: Rect,
    cell_size: f64,
    gray_fraction: f64,
}

impl Palette {
    /// Lay out a palette; `cell_size` must be finite and positive and
    /// `gray_fraction` within 0..1
    pub fn new(bounds: Rect, cell_size: f64, gray_fraction: f64) -> EditorResult<Self> {
        if !(cell_size > 0.0) || !cell_size.is_finite() {
            return Err(EditorError::InvalidConfig {
                key: "palette_cell_size",
                reason: format!("must be finite and positive, got {cell_size}"),
            });
        }
        if !(0.0..1.0).contains(&gray_fraction) {
            return Err(EditorError::InvalidConfig {
                key: "palette_gray_fraction",
                reason: format!("must be within 0..1, got {gray_fraction}"),
            });
        }
        Ok(Self { bounds: bounds.abs(), cell_size, gray_fraction })
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Grayscale strip at the top
    pub fn gray_region(&self) -> Rect {
        let b = self.bounds;
        Rect::new(b.x0, b.y0, b.x1, b.y0 + b.height() * self.gray_fraction)
    }

    /// Hue/saturation/brightness area below the gray strip
    pub fn color_region(&self) -> Rect {
        let b = self.bounds;
        Rect::new(b.x0, self.gray_region().y1, b.x1, b.y1)
    }

    /// Origin of the cell containing `point`
    ///
    /// Points outside the palette are clamped to its edge first.
    pub fn cell_origin(&self, point: Point) -> Point {
        let b = self.bounds;
        let (columns, rows) = self.grid_size();
        let last_column = columns.saturating_sub(1) as f64;
        let last_row = rows.saturating_sub(1) as f64;
        let x = ((point.x.clamp(b.x0, b.x1) - b.x0) / self.cell_size).floor();
        let y = ((point.y.clamp(b.y0, b.y1) - b.y0) / self.cell_size).floor();
        Point::new(
            b.x0 + x.min(last_column) * self.cell_size,
            b.y0 + y.min(last_row) * self.cell_size,
        )
    }

    /// Number of (columns, rows) in the swatch grid
    pub fn grid_size(&self) -> (usize, usize) {
        let b = self.bounds;
        (
            (b.width() / self.cell_size).ceil() as usize,
            (b.height() / self.cell_size).ceil() as usize,
        )
    }

    /// Color of the swatch under `point`
    pub fn color_at(&self, point: Point) -> Color {
        let cell = self.cell_origin(point);
        if self.bounds.width() <= 0.0 || self.bounds.height() <= 0.0 {
            return Color::BLACK;
        }

        let hue = (cell.x - self.bounds.x0) / self.bounds.width();
        let region = self.color_region();
        if !region.contains(cell) {
            return Color::gray(hue as f32);
        }

        let height = region.height();
        let y = cell.y - region.y0;
        let upper = y < height / 2.0;
        let (saturation, brightness) = if upper {
            ((2.0 * y / height).powf(SATURATION_EXPONENT_TOP), 1.0)
        } else {
            let falloff = 2.0 * (height - y) / height;
            (falloff.powf(SATURATION_EXPONENT_BOTTOM), falloff)
        };

        Hsb::new(hue, saturation, brightness).to_color()
    }

    /// Discretized palette image, one swatch per cell, row by row
    pub fn render(&self) -> Vec<Swatch> {
        let b = self.bounds;
        let (columns, rows) = self.grid_size();

        let mut swatches = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            let y = b.y0 + row as f64 * self.cell_size;
            for column in 0..columns {
                let x = b.x0 + column as f64 * self.cell_size;
                let rect = Rect::new(x, y, x + self.cell_size, y + self.cell_size).intersect(b);
                swatches.push(Swatch { rect, color: self.color_at(Point::new(x, y)) });
            }
        }
        swatches
    }
}
