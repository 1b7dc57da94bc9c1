//! Loading and sizing of the raster layers that go onto a card.

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, Rgba, RgbaImage};
use log::debug;

use crate::config::{BottomSection, CardConfig, Rgb};
use crate::error::{CardError, Result};
use crate::portrait::circular_portrait;

pub fn open_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| CardError::AssetLoad {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

/// Open `path` and stretch it to exactly `width` x `height`.
pub fn load_resized(path: impl AsRef<Path>, width: u32, height: u32) -> Result<RgbaImage> {
    Ok(open_image(path)?
        .resize_exact(width, height, FilterType::CatmullRom)
        .to_rgba8())
}

/// Opaque horizontal gradient, `left` in column 0 and `right` in the last column.
pub fn horizontal_gradient(width: u32, height: u32, left: Rgb, right: Rgb) -> RgbaImage {
    let span = width.saturating_sub(1).max(1) as f32;
    let column: Vec<Rgba<u8>> = (0..width)
        .map(|x| {
            let t = x as f32 / span;
            let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
            Rgba([
                lerp(left[0], right[0]),
                lerp(left[1], right[1]),
                lerp(left[2], right[2]),
                255,
            ])
        })
        .collect();
    RgbaImage::from_fn(width, height, |x, _| column[x as usize])
}

pub struct PlacedLogo {
    pub image: RgbaImage,
    pub x: i64,
    pub y: i64,
}

/// Every raster layer of a card, already sized for its slot.
pub struct CardAssets {
    pub top: RgbaImage,
    pub bottom: RgbaImage,
    /// Circular photo including its ring.
    pub portrait: RgbaImage,
    pub sponsors: Vec<PlacedLogo>,
}

impl CardAssets {
    pub fn load(cfg: &CardConfig) -> Result<Self> {
        let width = cfg.canvas.width;
        let top = load_resized(&cfg.backgrounds.top, width, cfg.canvas.top_height)?;
        let bottom_height = cfg.canvas.bottom_height();
        let bottom = match &cfg.backgrounds.bottom {
            BottomSection::Image(path) => load_resized(path, width, bottom_height)?,
            BottomSection::Gradient { left, right } => {
                horizontal_gradient(width, bottom_height, *left, *right)
            }
        };

        let photo = open_image(&cfg.inputs.photo)?;
        let p = &cfg.portrait;
        let portrait = circular_portrait(&photo, p.diameter, p.outline_width, p.outline_color);

        let (sw, sh) = cfg.sponsors.size;
        let sponsors = cfg
            .sponsors
            .logos
            .iter()
            .map(|logo| {
                Ok(PlacedLogo {
                    image: load_resized(&logo.image, sw, sh)?,
                    x: logo.x,
                    y: logo.y,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            top,
            bottom,
            portrait,
            sponsors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_endpoints_and_midpoint() {
        let g = horizontal_gradient(101, 3, [0, 100, 200], [200, 100, 0]);
        assert_eq!(g.dimensions(), (101, 3));
        assert_eq!(g.get_pixel(0, 0).0, [0, 100, 200, 255]);
        assert_eq!(g.get_pixel(100, 2).0, [200, 100, 0, 255]);
        assert_eq!(g.get_pixel(50, 1).0, [100, 100, 100, 255]);
        // constant down each column
        assert_eq!(g.get_pixel(37, 0), g.get_pixel(37, 2));
    }

    #[test]
    fn single_column_gradient_uses_left() {
        let g = horizontal_gradient(1, 4, [1, 2, 3], [9, 9, 9]);
        assert!(g.pixels().all(|p| p.0 == [1, 2, 3, 255]));
    }

    #[test]
    fn missing_asset_reports_path() {
        match open_image("no/such/background.jpg") {
            Err(CardError::AssetLoad { path, .. }) => assert!(path.ends_with("background.jpg")),
            other => panic!("expected AssetLoad, got {:?}", other.map(|i| (i.width(), i.height()))),
        }
    }

    #[test]
    fn load_resized_stretches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(40, 10, Rgba([10, 20, 30, 255])).save(&path).unwrap();
        let img = load_resized(&path, 35, 17).unwrap();
        assert_eq!(img.dimensions(), (35, 17));
    }
}
