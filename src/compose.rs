//! Card layout and the end-to-end pipeline.
//!
//! Layers are drawn in a fixed order, each on top of the previous ones:
//! backgrounds, portrait, column titles, column entries, sponsor logos,
//! player name and archetype.

use std::{fs, path::Path};

use image::{buffer::ConvertBuffer, imageops, Rgba, RgbImage, RgbaImage};
use log::{debug, info, warn};

use crate::assets::CardAssets;
use crate::config::CardConfig;
use crate::decklist::{self, DecklistRecord};
use crate::error::{CardError, Result};
use crate::font::{load_font, LoadedFont};
use crate::text::{draw_text_with_outline, Align, TextStyle};

/// Pixel positions derived from a [`CardConfig`] and the portrait size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLayout {
    pub portrait_x: i64,
    pub portrait_y: i64,
    /// Right edge of the player name block.
    pub name_anchor: (i64, i64),
    /// Left edge of the archetype block.
    pub archetype_anchor: (i64, i64),
    pub mainboard_title: (i64, i64),
    pub sideboard_title: (i64, i64),
    /// y of the first entry in each column.
    pub entries_y: i64,
    pub entry_stride: i64,
}

impl CardLayout {
    /// `portrait_size` is the side of the finished portrait, ring included.
    pub fn new(cfg: &CardConfig, portrait_size: u32) -> Self {
        let width = cfg.canvas.width as i64;
        let top = cfg.canvas.top_height as i64;
        let size = portrait_size as i64;
        let portrait_x = (width - size).div_euclid(2);
        let portrait_y = (top - size).div_euclid(2);
        let text_y = portrait_y + size / 2 - cfg.header.raise;
        let title_y = top + cfg.columns.top_padding;
        Self {
            portrait_x,
            portrait_y,
            name_anchor: (portrait_x - cfg.header.gap, text_y),
            archetype_anchor: (portrait_x + size + cfg.header.gap, text_y),
            mainboard_title: (cfg.columns.mainboard_x, title_y),
            sideboard_title: (cfg.columns.sideboard_x, title_y),
            entries_y: title_y + cfg.columns.entries_offset,
            entry_stride: cfg.fonts.column_size as i64 + cfg.columns.entry_spacing,
        }
    }
}

/// Draw `deck` onto a fresh canvas using pre-loaded layers.
pub fn compose_card(
    cfg: &CardConfig,
    deck: &DecklistRecord,
    assets: &CardAssets,
    font: &LoadedFont,
) -> RgbaImage {
    let layout = CardLayout::new(cfg, assets.portrait.width());
    debug!("layout {layout:?}");

    let mut card = RgbaImage::from_pixel(cfg.canvas.width, cfg.canvas.height, Rgba([255, 255, 255, 255]));
    imageops::replace(&mut card, &assets.top, 0, 0);
    imageops::replace(&mut card, &assets.bottom, 0, cfg.canvas.top_height as i64);
    imageops::overlay(&mut card, &assets.portrait, layout.portrait_x, layout.portrait_y);

    let style = TextStyle {
        fill: cfg.text.fill_color,
        outline: cfg.text.outline_color,
        outline_width: cfg.text.outline_width,
        line_gap: cfg.text.line_gap,
        align: cfg.columns.align,
    };
    let title_face = font.face(cfg.fonts.column_title_size);
    let entry_face = font.face(cfg.fonts.column_size);
    let name_face = font.face(cfg.fonts.name_size);

    draw_text_with_outline(&mut card, layout.mainboard_title, &[&cfg.columns.mainboard_title], &title_face, &style);
    draw_text_with_outline(&mut card, layout.sideboard_title, &[&cfg.columns.sideboard_title], &title_face, &style);

    for (x, entries) in [
        (layout.mainboard_title.0, &deck.mainboard),
        (layout.sideboard_title.0, &deck.sideboard),
    ] {
        for (i, entry) in entries.iter().enumerate() {
            let y = layout.entries_y + i as i64 * layout.entry_stride;
            draw_text_with_outline(&mut card, (x, y), &[entry], &entry_face, &style);
        }
    }
    let bottom_edge = layout.entries_y
        + deck.mainboard.len().max(deck.sideboard.len()) as i64 * layout.entry_stride;
    if bottom_edge > cfg.canvas.height as i64 {
        debug!("decklist runs past the bottom edge ({bottom_edge}px > {}px)", cfg.canvas.height);
    }

    for logo in &assets.sponsors {
        imageops::overlay(&mut card, &logo.image, logo.x, logo.y);
    }

    // one word per line; a doubled space leaves an empty line
    let name_lines: Vec<&str> = deck.player_name.split(' ').collect();
    let archetype_lines: Vec<&str> = deck.deck_archetype.split(' ').collect();
    draw_text_with_outline(&mut card, layout.name_anchor, &name_lines, &name_face, &style.with_align(Align::Right));
    draw_text_with_outline(&mut card, layout.archetype_anchor, &archetype_lines, &name_face, &style.with_align(Align::Left));

    card
}

/// Parse the decklist, load every asset and compose the card.
///
/// The decklist is read first so a malformed one fails before any image work.
pub fn render_card(cfg: &CardConfig) -> Result<RgbaImage> {
    cfg.check()?;
    for w in cfg.validate() {
        warn!("config: {w}");
    }
    let deck = decklist::load(&cfg.inputs.decklist)?;
    info!(
        "{} / {}: {} mainboard, {} sideboard",
        deck.player_name,
        deck.deck_archetype,
        deck.mainboard.len(),
        deck.sideboard.len()
    );
    let assets = CardAssets::load(cfg)?;
    let font = load_font(&cfg.fonts.path);
    Ok(compose_card(cfg, &deck, &assets, &font))
}

/// Flatten to RGB and encode by extension, replacing any existing file.
pub fn write_card(card: &RgbaImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CardError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let rgb: RgbImage = card.convert();
    rgb.save(path).map_err(|source| CardError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Render per `cfg` and write to `cfg.output`.
pub fn create_player_card(cfg: &CardConfig) -> Result<()> {
    let card = render_card(cfg)?;
    write_card(&card, &cfg.output)?;
    info!("player card saved as {}", cfg.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{horizontal_gradient, PlacedLogo};

    #[test]
    fn default_layout_positions() {
        let cfg = CardConfig::default();
        let layout = CardLayout::new(&cfg, 275 + 2 * 5);
        assert_eq!((layout.portrait_x, layout.portrait_y), (357, 32));
        assert_eq!(layout.name_anchor, (317, 32 + 142 - 80));
        assert_eq!(layout.archetype_anchor, (357 + 285 + 40, 94));
        assert_eq!(layout.mainboard_title, (100, 400));
        assert_eq!(layout.sideboard_title, (600, 400));
        assert_eq!(layout.entries_y, 460);
        assert_eq!(layout.entry_stride, 40);
    }

    #[test]
    fn oversized_portrait_rounds_toward_negative() {
        let mut cfg = CardConfig::default();
        cfg.canvas.top_height = 100;
        let layout = CardLayout::new(&cfg, 151);
        assert_eq!(layout.portrait_y, -26);
    }

    fn small_config() -> CardConfig {
        let mut cfg = CardConfig::default();
        cfg.canvas.width = 300;
        cfg.canvas.height = 400;
        cfg.canvas.top_height = 100;
        cfg.portrait.diameter = 60;
        cfg.fonts.name_size = 16;
        cfg.fonts.column_title_size = 16;
        cfg.fonts.column_size = 8;
        cfg.columns.mainboard_x = 10;
        cfg.columns.sideboard_x = 160;
        cfg.sponsors.size = (40, 20);
        cfg
    }

    fn solid(w: u32, h: u32, c: [u8; 3]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([c[0], c[1], c[2], 255]))
    }

    #[test]
    fn composes_layers_in_order() {
        let cfg = small_config();
        let deck = decklist::parse_str("Alice\nBurn\nmainboard:\n4 Bolt\nsideboard:\n2 Smash\n").unwrap();
        let assets = CardAssets {
            top: solid(300, 100, [10, 10, 10]),
            bottom: horizontal_gradient(300, 300, [0, 0, 100], [0, 0, 200]),
            portrait: crate::portrait::make_circle(&solid(60, 60, [0, 200, 0]), 5, [200, 0, 0]),
            sponsors: vec![PlacedLogo { image: solid(40, 20, [250, 250, 0]), x: 250, y: 370 }],
        };
        let font = LoadedFont::Fallback { reason: "test".into() };
        let card = compose_card(&cfg, &deck, &assets, &font);
        assert_eq!(card.dimensions(), (300, 400));
        // top band corner, untouched by text or portrait
        assert_eq!(card.get_pixel(0, 0).0, [10, 10, 10, 255]);
        // gradient band starts at top_height
        assert_eq!(card.get_pixel(0, 399).0, [0, 0, 100, 255]);
        // portrait centre: (300-70)/2 + 35, (100-70)/2 + 35
        assert_eq!(card.get_pixel(150, 50).0, [0, 200, 0, 255]);
        // ring at the top of the portrait
        assert_eq!(card.get_pixel(150, 16).0, [200, 0, 0, 255]);
        // portrait corner keeps the background
        assert_eq!(card.get_pixel(116, 15).0, [10, 10, 10, 255]);
        // sponsor logo
        assert_eq!(card.get_pixel(260, 380).0, [250, 250, 0, 255]);
        // "Mainboard" title: 'M' has ink in its top-left font pixel
        assert_eq!(card.get_pixel(10, 150).0, [255, 255, 255, 255]);
    }

    #[test]
    fn name_block_ends_at_its_anchor() {
        let mut cfg = small_config();
        cfg.header.raise = 0;
        let deck = decklist::parse_str("Al\nBu\n").unwrap();
        let assets = CardAssets {
            top: solid(300, 100, [10, 10, 10]),
            bottom: solid(300, 300, [10, 10, 10]),
            portrait: RgbaImage::new(70, 70),
            sponsors: Vec::new(),
        };
        let font = LoadedFont::Fallback { reason: "test".into() };
        let card = compose_card(&cfg, &deck, &assets, &font);
        let layout = CardLayout::new(&cfg, 70);
        let bg = Rgba([10, 10, 10, 255]);
        let halo = cfg.text.outline_width as i64;
        let (nx, ny) = layout.name_anchor;
        // nothing inked right of the name anchor (plus halo) on the name rows
        for x in (nx + halo)..layout.portrait_x {
            for y in ny.max(0)..(ny + 20) {
                assert_eq!(*card.get_pixel(x as u32, y as u32), bg, "({x},{y})");
            }
        }
        // but something is inked just left of it
        assert!((ny.max(0)..ny + 20).any(|y| *card.get_pixel((nx - 1) as u32, y as u32) != bg));
    }

    #[test]
    fn doubled_space_leaves_an_empty_name_line() {
        let mut cfg = small_config();
        cfg.header.raise = 0;
        let deck = decklist::parse_str("Al  Bu\nBurn\n").unwrap();
        let assets = CardAssets {
            top: solid(300, 100, [10, 10, 10]),
            bottom: solid(300, 300, [10, 10, 10]),
            portrait: RgbaImage::new(70, 70),
            sponsors: Vec::new(),
        };
        let font = LoadedFont::Fallback { reason: "test".into() };
        let card = compose_card(&cfg, &deck, &assets, &font);
        let layout = CardLayout::new(&cfg, 70);
        let bg = Rgba([10, 10, 10, 255]);
        let (nx, ny) = layout.name_anchor;
        // name face: bitmap scale 2, 16px per line plus a 5px gap
        let stride = 16 + cfg.text.line_gap as i64;
        let halo = cfg.text.outline_width as i64;
        let inked = |y0: i64, y1: i64| {
            (y0..y1).any(|y| (0..nx + halo).any(|x| *card.get_pixel(x as u32, y as u32) != bg))
        };
        assert!(inked(ny, ny + 14));
        assert!(!inked(ny + 14 + halo, ny + 2 * stride - halo));
        assert!(inked(ny + 2 * stride, ny + 2 * stride + 14));
    }

    #[test]
    fn write_card_flattens_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("card.png");
        let mut card = solid(4, 3, [12, 34, 56]);
        card.put_pixel(3, 2, Rgba([200, 100, 0, 255]));
        write_card(&card, &path).unwrap();
        let back = image::open(&path).unwrap();
        assert_eq!(back.color(), image::ColorType::Rgb8);
        let back = back.to_rgb8();
        assert_eq!(back.dimensions(), (4, 3));
        assert_eq!(back.get_pixel(0, 0).0, [12, 34, 56]);
        assert_eq!(back.get_pixel(3, 2).0, [200, 100, 0]);
    }
}
