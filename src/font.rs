//! Font resources for card text.
//!
//! A TrueType/OpenType file is the primary source. When it cannot be read or
//! parsed the card still renders, using a built-in 5x7 bitmap face scaled up
//! to roughly the requested size.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::{imageops, GrayImage, Luma};
use log::{info, warn};

pub const GLYPH_W: u32 = 5;
pub const GLYPH_H: u32 = 7;

#[derive(Debug)]
pub enum LoadedFont {
    Primary { path: PathBuf, font: FontVec },
    Fallback { reason: String },
}

/// Load `path`, degrading to the bitmap face on any failure.
pub fn load_font(path: impl AsRef<Path>) -> LoadedFont {
    let path = path.as_ref();
    let loaded = fs::read(path)
        .map_err(|e| format!("read font {}: {e}", path.display()))
        .and_then(|bytes| {
            FontVec::try_from_vec(bytes).map_err(|e| format!("decode font {}: {e}", path.display()))
        });
    match loaded {
        Ok(font) => {
            info!("using font {}", path.display());
            LoadedFont::Primary {
                path: path.to_path_buf(),
                font,
            }
        }
        Err(reason) => {
            warn!("{reason}; falling back to built-in bitmap font");
            LoadedFont::Fallback { reason }
        }
    }
}

impl LoadedFont {
    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadedFont::Fallback { .. })
    }

    /// A face at `size_px` pixels.
    pub fn face(&self, size_px: u32) -> FontFace<'_> {
        match self {
            LoadedFont::Primary { font, .. } => FontFace::Outline {
                font,
                scale: PxScale::from(size_px as f32),
                size: size_px,
            },
            LoadedFont::Fallback { .. } => FontFace::Bitmap {
                scale: ((size_px + 4) / 8).max(1),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FontFace<'a> {
    Outline {
        font: &'a FontVec,
        scale: PxScale,
        size: u32,
    },
    /// Each font pixel becomes a `scale` x `scale` block.
    Bitmap { scale: u32 },
}

impl FontFace<'_> {
    /// Nominal pixel size; stacked lines advance by this plus a gap.
    pub fn size(&self) -> u32 {
        match *self {
            FontFace::Outline { size, .. } => size,
            FontFace::Bitmap { scale } => (GLYPH_H + 1) * scale,
        }
    }

    /// Coverage mask of one line of text, cropped to its inked columns.
    ///
    /// Row 0 is the top of the line box, so the mask can be placed directly at
    /// the line's (x, y). A line with no ink yields a zero-width mask.
    pub fn rasterize(&self, text: &str) -> GrayImage {
        let raw = match *self {
            FontFace::Outline { font, scale, .. } => rasterize_outline(font, scale, text),
            FontFace::Bitmap { scale } => rasterize_bitmap(scale, text),
        };
        trim_ink_columns(raw)
    }

    /// Inked width of `text` in pixels.
    pub fn text_width(&self, text: &str) -> u32 {
        self.rasterize(text).width()
    }
}

fn rasterize_outline(font: &FontVec, scale: PxScale, text: &str) -> GrayImage {
    let scaled = font.as_scaled(scale);
    let ascent = scaled.ascent();
    let height = (ascent - scaled.descent()).ceil().max(1.0) as u32;

    let mut caret = 0.0f32;
    let mut prev: Option<GlyphId> = None;
    let mut outlined = Vec::new();
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, ascent));
        caret += scaled.h_advance(id);
        prev = Some(id);
        if let Some(og) = font.outline_glyph(glyph) {
            outlined.push(og);
        }
    }
    if outlined.is_empty() {
        return GrayImage::new(0, height);
    }

    let min_x = outlined
        .iter()
        .map(|g| g.px_bounds().min.x)
        .fold(f32::MAX, f32::min)
        .floor();
    let max_x = outlined
        .iter()
        .map(|g| g.px_bounds().max.x)
        .fold(f32::MIN, f32::max)
        .ceil();
    let width = (max_x - min_x).max(0.0) as u32;
    let mut mask = GrayImage::new(width, height);
    for og in &outlined {
        let b = og.px_bounds();
        let ox = (b.min.x - min_x) as i64;
        let oy = b.min.y as i64;
        og.draw(|gx, gy, c| {
            let x = ox + gx as i64;
            let y = oy + gy as i64;
            if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                return;
            }
            let v = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
            let px = mask.get_pixel_mut(x as u32, y as u32);
            px.0[0] = px.0[0].saturating_add(v);
        });
    }
    mask
}

fn rasterize_bitmap(scale: u32, text: &str) -> GrayImage {
    let count = text.chars().count() as u32;
    let advance = (GLYPH_W + 1) * scale;
    let mut mask = GrayImage::new(count * advance, GLYPH_H * scale);
    for (i, ch) in text.chars().enumerate() {
        let rows = bitmap_glyph(ch);
        let ox = i as u32 * advance;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_W {
                if *bits & (1u8 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        mask.put_pixel(
                            ox + col * scale + sx,
                            row as u32 * scale + sy,
                            Luma([255]),
                        );
                    }
                }
            }
        }
    }
    mask
}

fn trim_ink_columns(mask: GrayImage) -> GrayImage {
    let (w, h) = mask.dimensions();
    let inked = |x: u32| (0..h).any(|y| mask.get_pixel(x, y).0[0] > 0);
    let Some(first) = (0..w).find(|&x| inked(x)) else {
        return GrayImage::new(0, h);
    };
    let last = (first..w).rev().find(|&x| inked(x)).unwrap_or(first);
    if first == 0 && last + 1 == w {
        return mask;
    }
    imageops::crop_imm(&mask, first, 0, last - first + 1, h).to_image()
}

/// Rows of a printable ASCII glyph, top first, bit 4 = leftmost column.
/// Anything outside the table renders as `?`.
pub fn bitmap_glyph(ch: char) -> &'static [u8; GLYPH_H as usize] {
    let idx = match ch {
        ' '..='~' => ch as usize - ' ' as usize,
        _ => '?' as usize - ' ' as usize,
    };
    &BITMAP_GLYPHS[idx]
}

#[rustfmt::skip]
static BITMAP_GLYPHS: [[u8; GLYPH_H as usize]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04], // '!'
    [0x0A, 0x0A, 0x0A, 0x00, 0x00, 0x00, 0x00], // '"'
    [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A], // '#'
    [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04], // '$'
    [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03], // '%'
    [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D], // '&'
    [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00], // "'"
    [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02], // '('
    [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08], // ')'
    [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00], // '*'
    [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00], // '+'
    [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08], // ','
    [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00], // '-'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C], // '.'
    [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00], // '/'
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // '0'
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // '1'
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // '2'
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // '3'
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // '4'
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // '5'
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // '6'
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // '7'
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // '8'
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // '9'
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00], // ':'
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x04, 0x08], // ';'
    [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02], // '<'
    [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00], // '='
    [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08], // '>'
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04], // '?'
    [0x0E, 0x11, 0x01, 0x0D, 0x15, 0x15, 0x0E], // '@'
    [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // 'A'
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // 'B'
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // 'C'
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // 'D'
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // 'E'
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // 'F'
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // 'G'
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // 'H'
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // 'I'
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // 'J'
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // 'K'
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // 'L'
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // 'M'
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // 'N'
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // 'O'
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // 'P'
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // 'Q'
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // 'R'
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // 'S'
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // 'T'
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // 'U'
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // 'V'
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // 'W'
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // 'X'
    [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04], // 'Y'
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // 'Z'
    [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E], // '['
    [0x00, 0x10, 0x08, 0x04, 0x02, 0x01, 0x00], // '\\'
    [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E], // ']'
    [0x04, 0x0A, 0x11, 0x00, 0x00, 0x00, 0x00], // '^'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F], // '_'
    [0x08, 0x04, 0x02, 0x00, 0x00, 0x00, 0x00], // '`'
    [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F], // 'a'
    [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x1E], // 'b'
    [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E], // 'c'
    [0x01, 0x01, 0x0D, 0x13, 0x11, 0x11, 0x0F], // 'd'
    [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E], // 'e'
    [0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08], // 'f'
    [0x00, 0x0F, 0x11, 0x11, 0x0F, 0x01, 0x0E], // 'g'
    [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x11], // 'h'
    [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E], // 'i'
    [0x02, 0x00, 0x06, 0x02, 0x02, 0x12, 0x0C], // 'j'
    [0x10, 0x10, 0x12, 0x14, 0x18, 0x14, 0x12], // 'k'
    [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // 'l'
    [0x00, 0x00, 0x1A, 0x15, 0x15, 0x11, 0x11], // 'm'
    [0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11], // 'n'
    [0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E], // 'o'
    [0x00, 0x00, 0x1E, 0x11, 0x1E, 0x10, 0x10], // 'p'
    [0x00, 0x00, 0x0D, 0x13, 0x0F, 0x01, 0x01], // 'q'
    [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10], // 'r'
    [0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E], // 's'
    [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06], // 't'
    [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0D], // 'u'
    [0x00, 0x00, 0x11, 0x11, 0x11, 0x0A, 0x04], // 'v'
    [0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0A], // 'w'
    [0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11], // 'x'
    [0x00, 0x00, 0x11, 0x11, 0x0F, 0x01, 0x0E], // 'y'
    [0x00, 0x00, 0x1F, 0x02, 0x04, 0x08, 0x1F], // 'z'
    [0x02, 0x04, 0x04, 0x08, 0x04, 0x04, 0x02], // '{'
    [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // '|'
    [0x08, 0x04, 0x04, 0x02, 0x04, 0x04, 0x08], // '}'
    [0x00, 0x00, 0x08, 0x15, 0x02, 0x00, 0x00], // '~'
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DEJAVU: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSans.ttf");

    #[test]
    fn missing_file_falls_back() {
        let font = load_font("fonts/definitely-not-here.ttf");
        assert!(font.is_fallback());
        match font {
            LoadedFont::Fallback { reason } => assert!(reason.contains("definitely-not-here.ttf")),
            LoadedFont::Primary { .. } => unreachable!(),
        }
    }

    #[test]
    fn undecodable_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a font").unwrap();
        let font = load_font(file.path());
        match font {
            LoadedFont::Fallback { reason } => assert!(reason.starts_with("decode font")),
            LoadedFont::Primary { .. } => panic!("garbage bytes parsed as a font"),
        }
    }

    #[test]
    fn bitmap_scale_tracks_requested_size() {
        let font = LoadedFont::Fallback { reason: String::new() };
        assert_eq!(font.face(74).size(), 72);
        assert_eq!(font.face(50).size(), 48);
        assert_eq!(font.face(30).size(), 32);
        assert_eq!(font.face(1).size(), 8);
    }

    #[test]
    fn every_printable_glyph_but_space_has_ink() {
        for ch in '!'..='~' {
            assert!(bitmap_glyph(ch).iter().any(|r| *r != 0), "glyph {ch:?} is blank");
            assert!(bitmap_glyph(ch).iter().all(|r| *r < 1 << GLYPH_W), "glyph {ch:?} too wide");
        }
        assert!(bitmap_glyph(' ').iter().all(|r| *r == 0));
        assert_eq!(bitmap_glyph('é'), bitmap_glyph('?'));
    }

    #[test]
    fn bitmap_mask_is_trimmed_to_ink() {
        let face = FontFace::Bitmap { scale: 3 };
        // 'I' occupies the middle three columns
        let mask = face.rasterize("I");
        assert_eq!(mask.dimensions(), (9, 21));
        assert_eq!(mask.get_pixel(0, 0).0[0], 255);
        // two glyphs: 5 + 1 spacing + 5 columns
        assert_eq!(face.text_width("HH"), (5 + 1 + 5) * 3);
        // leading and trailing blanks do not count
        assert_eq!(face.text_width("  HH  "), (5 + 1 + 5) * 3);
    }

    #[test]
    fn blank_text_has_no_width() {
        let face = FontFace::Bitmap { scale: 2 };
        assert_eq!(face.text_width(""), 0);
        assert_eq!(face.text_width("   "), 0);
        assert_eq!(face.rasterize("   ").height(), 14);
    }

    #[test]
    fn truetype_face_rasterizes_outlines() {
        let font = load_font(DEJAVU);
        assert!(!font.is_fallback());
        let face = font.face(40);
        assert_eq!(face.size(), 40);

        let mask = face.rasterize("Mono");
        let (w, h) = mask.dimensions();
        assert!(w > 40 && h >= 39, "mask {w}x{h}");
        let column_inked = |x: u32| (0..h).any(|y| mask.get_pixel(x, y).0[0] > 0);
        assert!(column_inked(0) && column_inked(w - 1));

        // every line shares one box; descenders stay inside it
        let j = face.rasterize("j");
        assert_eq!(j.height(), h);
        assert!((h * 3 / 4..h).any(|y| (0..j.width()).any(|x| j.get_pixel(x, y).0[0] > 0)));

        assert!(face.text_width("HH") > face.text_width("H"));
        assert_eq!(face.text_width(" "), 0);
    }
}
