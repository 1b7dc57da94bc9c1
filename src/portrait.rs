//! Circular player portrait with a solid ring.

use image::{imageops::FilterType, DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

/// Largest square centred in a `width` x `height` image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareCrop {
    pub left: u32,
    pub top: u32,
    pub side: u32,
}

pub fn center_square(width: u32, height: u32) -> SquareCrop {
    let side = width.min(height);
    SquareCrop {
        left: (width - side) / 2,
        top: (height - side) / 2,
        side,
    }
}

/// Crop the centred square out of `image` and resize it to `size` x `size`.
pub fn crop_center(image: &DynamicImage, size: u32) -> RgbaImage {
    let sq = center_square(image.width(), image.height());
    image
        .crop_imm(sq.left, sq.top, sq.side, sq.side)
        .resize_exact(size, size, FilterType::CatmullRom)
        .to_rgba8()
}

/// Binary disk inscribed in a `diameter` square: 255 inside, 0 outside.
pub fn circle_mask(diameter: u32) -> GrayImage {
    let r = diameter as f32 / 2.0;
    GrayImage::from_fn(diameter, diameter, |x, y| {
        let dx = x as f32 + 0.5 - r;
        let dy = y as f32 + 0.5 - r;
        Luma([if dx * dx + dy * dy <= r * r { 255 } else { 0 }])
    })
}

/// Mask a square `photo` into a circle surrounded by an `outline_width` ring.
///
/// The result is `photo.width() + 2 * outline_width` square; everything
/// outside the ring is fully transparent.
pub fn make_circle(photo: &RgbaImage, outline_width: u32, outline_color: [u8; 3]) -> RgbaImage {
    let d = photo.width().min(photo.height());
    let outer = d + 2 * outline_width;
    let [r, g, b] = outline_color;

    let ring_mask = circle_mask(outer);
    let mut out = RgbaImage::from_fn(outer, outer, |x, y| {
        if ring_mask.get_pixel(x, y).0[0] == 255 {
            Rgba([r, g, b, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    let photo_mask = circle_mask(d);
    for (x, y, m) in photo_mask.enumerate_pixels() {
        if m.0[0] == 255 {
            out.put_pixel(x + outline_width, y + outline_width, *photo.get_pixel(x, y));
        }
    }
    out
}

/// Full portrait step: centre-crop, resize to `diameter`, circle, ring.
pub fn circular_portrait(
    image: &DynamicImage,
    diameter: u32,
    outline_width: u32,
    outline_color: [u8; 3],
) -> RgbaImage {
    let mut square = crop_center(image, diameter);
    // photos with alpha would let the ring show through
    for px in square.pixels_mut() {
        px.0[3] = 255;
    }
    make_circle(&square, outline_width, outline_color)
}
