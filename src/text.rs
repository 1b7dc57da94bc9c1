//! Outlined text: every line is stamped in the outline colour at each offset of a
//! `(2w+1)²` square around its position, then drawn once more in the fill colour.
//! The halo is square-ish rather than a true stroke.

use image::{imageops, GrayImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::font::FontFace;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    /// Right ink edge ends at the anchor: the last inked column is `x - 1`.
    Right,
    /// Accepted for layout configs but rendered exactly like `Left`.
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub fill: [u8; 3],
    pub outline: [u8; 3],
    pub outline_width: u32,
    /// Added to the font size to get the distance between stacked lines.
    pub line_gap: u32,
    pub align: Align,
}

impl TextStyle {
    pub fn with_align(self, align: Align) -> Self {
        Self { align, ..self }
    }
}

/// Draw `lines` stacked downwards from `(x, y)`.
pub fn draw_text_with_outline<S: AsRef<str>>(
    canvas: &mut RgbaImage,
    (x, y): (i64, i64),
    lines: &[S],
    face: &FontFace<'_>,
    style: &TextStyle,
) {
    let stride = (face.size() + style.line_gap) as i64;
    let w = style.outline_width as i64;
    for (i, line) in lines.iter().enumerate() {
        let mask = face.rasterize(line.as_ref());
        if mask.width() == 0 {
            continue;
        }
        let line_y = y + i as i64 * stride;
        let line_x = match style.align {
            Align::Right => x - mask.width() as i64,
            Align::Left | Align::Center => x,
        };
        let halo = tinted(&mask, style.outline);
        for dx in -w..=w {
            for dy in -w..=w {
                if dx != 0 || dy != 0 {
                    imageops::overlay(canvas, &halo, line_x + dx, line_y + dy);
                }
            }
        }
        imageops::overlay(canvas, &tinted(&mask, style.fill), line_x, line_y);
    }
}

/// Solid `color` layer whose alpha is the mask coverage.
fn tinted(mask: &GrayImage, [r, g, b]: [u8; 3]) -> RgbaImage {
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        Rgba([r, g, b, mask.get_pixel(x, y).0[0]])
    })
}
