use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{CardError, Result};
use crate::text::Align;

/// 8-bit RGB triple, written `(r, g, b)` in RON.
pub type Rgb = [u8; 3];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Height of the photo/header band. The decklist band takes the rest.
    pub top_height: u32,
}
impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1400,
            top_height: 350,
        }
    }
}
impl CanvasConfig {
    pub fn bottom_height(&self) -> u32 {
        self.height.saturating_sub(self.top_height)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PortraitConfig {
    /// Diameter of the photo circle, excluding the ring.
    pub diameter: u32,
    pub outline_width: u32,
    pub outline_color: Rgb,
}
impl Default for PortraitConfig {
    fn default() -> Self {
        Self {
            diameter: 275,
            outline_width: 5,
            outline_color: [0, 0, 0],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    pub outline_width: u32,
    pub fill_color: Rgb,
    pub outline_color: Rgb,
    /// Extra pixels between stacked lines on top of the font size.
    pub line_gap: u32,
}
impl Default for TextConfig {
    fn default() -> Self {
        Self {
            outline_width: 2,
            fill_color: [255, 255, 255],
            outline_color: [0, 0, 0],
            line_gap: 5,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FontConfig {
    /// TrueType/OpenType file. When unreadable the built-in bitmap font is used.
    pub path: PathBuf,
    pub name_size: u32,
    pub column_title_size: u32,
    pub column_size: u32,
}
impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("verdana.ttf"),
            name_size: 74,
            column_title_size: 50,
            column_size: 30,
        }
    }
}

/// Placement of the player name / archetype blocks around the portrait.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HeaderConfig {
    /// Horizontal distance between the portrait edge and each text block.
    pub gap: i64,
    /// The text blocks start this far above the portrait's mid-height.
    pub raise: i64,
}
impl Default for HeaderConfig {
    fn default() -> Self {
        Self { gap: 40, raise: 80 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ColumnConfig {
    pub mainboard_x: i64,
    pub sideboard_x: i64,
    /// Column titles sit this far below the top of the decklist band.
    pub top_padding: i64,
    /// First entry sits this far below the column title.
    pub entries_offset: i64,
    /// Added to `fonts.column_size` to get the per-entry stride.
    pub entry_spacing: i64,
    pub mainboard_title: String,
    pub sideboard_title: String,
    pub align: Align,
}
impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            mainboard_x: 100,
            sideboard_x: 1000 / 2 + 100,
            top_padding: 50,
            entries_offset: 60,
            entry_spacing: 10,
            mainboard_title: "Mainboard".into(),
            sideboard_title: "Sideboard".into(),
            align: Align::Center,
        }
    }
}

/// How the decklist band is filled.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum BottomSection {
    /// Picture resized to exactly fill the band.
    Image(PathBuf),
    /// Horizontal blend from `left` at x = 0 to `right` at the last column.
    Gradient { left: Rgb, right: Rgb },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BackgroundConfig {
    pub top: PathBuf,
    pub bottom: BottomSection,
}
impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            top: PathBuf::from("background.jpg"),
            bottom: BottomSection::Image(PathBuf::from("bottom_background.jpg")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SponsorLogo {
    pub image: PathBuf,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SponsorConfig {
    /// Every logo is resized to this (width, height).
    pub size: (u32, u32),
    pub logos: Vec<SponsorLogo>,
}
impl Default for SponsorConfig {
    fn default() -> Self {
        // centred under the sideboard column, nudged right
        let x = (1000 / 2 + 100) - 350 / 2 + 120;
        Self {
            size: (350, 175),
            logos: vec![
                SponsorLogo {
                    image: PathBuf::from("sponsor_logo1.png"),
                    x,
                    y: 1400 - 250,
                },
                SponsorLogo {
                    image: PathBuf::from("sponsor_logo2.png"),
                    x,
                    y: 1400 - 450,
                },
            ],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub decklist: PathBuf,
    pub photo: PathBuf,
}
impl Default for InputConfig {
    fn default() -> Self {
        Self {
            decklist: PathBuf::from("decklist.txt"),
            photo: PathBuf::from("player.jpg"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CardConfig {
    pub canvas: CanvasConfig,
    pub portrait: PortraitConfig,
    pub text: TextConfig,
    pub fonts: FontConfig,
    pub header: HeaderConfig,
    pub columns: ColumnConfig,
    pub backgrounds: BackgroundConfig,
    pub sponsors: SponsorConfig,
    pub inputs: InputConfig,
    /// Existing files are overwritten. Format follows the extension.
    pub output: PathBuf,
}
impl Default for CardConfig {
    fn default() -> Self {
        Self {
            canvas: Default::default(),
            portrait: Default::default(),
            text: Default::default(),
            fonts: Default::default(),
            header: Default::default(),
            columns: Default::default(),
            backgrounds: Default::default(),
            sponsors: Default::default(),
            inputs: Default::default(),
            output: PathBuf::from("player_card.jpg"),
        }
    }
}

impl CardConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| CardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&data)
            .map_err(|e| CardError::Config(format!("{}: parse RON: {e}", path.display())))
    }

    /// Hard layout errors. The composer refuses to run when this fails.
    pub fn check(&self) -> Result<()> {
        let c = &self.canvas;
        if c.width == 0 || c.height == 0 {
            return Err(CardError::Config(format!(
                "canvas must be non-empty, got {}x{}",
                c.width, c.height
            )));
        }
        if c.top_height == 0 || c.top_height >= c.height {
            return Err(CardError::Config(format!(
                "canvas.top_height {} must be within 1..{}",
                c.top_height, c.height
            )));
        }
        if self.portrait.diameter == 0 {
            return Err(CardError::Config("portrait.diameter must be > 0".into()));
        }
        let (sw, sh) = self.sponsors.size;
        if !self.sponsors.logos.is_empty() && (sw == 0 || sh == 0) {
            return Err(CardError::Config(format!("sponsors.size {sw}x{sh} must be non-empty")));
        }
        Ok(())
    }

    /// Non-fatal oddities worth logging.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        let c = &self.canvas;
        if c.width as u64 * c.height as u64 > 40_000_000 {
            w.push(format!("very large canvas: {}x{}", c.width, c.height));
        }
        let ring = self.portrait.diameter + 2 * self.portrait.outline_width;
        if ring > c.top_height {
            w.push(format!(
                "portrait ({ring}px with ring) taller than top section ({}px); it will overlap the decklist",
                c.top_height
            ));
        }
        if ring > c.width {
            w.push(format!("portrait ({ring}px with ring) wider than canvas ({}px)", c.width));
        }
        for (label, x) in [
            ("columns.mainboard_x", self.columns.mainboard_x),
            ("columns.sideboard_x", self.columns.sideboard_x),
        ] {
            if x < 0 || x >= c.width as i64 {
                w.push(format!("{label} {x} outside canvas width {}", c.width));
            }
        }
        if self.columns.align == Align::Center {
            w.push("columns.align Center is rendered left-aligned".into());
        }
        for (label, size) in [
            ("fonts.name_size", self.fonts.name_size),
            ("fonts.column_title_size", self.fonts.column_title_size),
            ("fonts.column_size", self.fonts.column_size),
        ] {
            if size == 0 {
                w.push(format!("{label} is 0; text will not be visible"));
            }
        }
        if self.text.outline_width == 0 {
            w.push("text.outline_width is 0; text has no halo".into());
        }
        if self.text.outline_width > 10 {
            w.push(format!(
                "text.outline_width {} very large; outline cost grows with its square",
                self.text.outline_width
            ));
        }
        if self.sponsors.logos.len() > 2 {
            w.push(format!(
                "{} sponsor logos configured; layout is designed for at most 2",
                self.sponsors.logos.len()
            ));
        }
        let (sw, sh) = self.sponsors.size;
        for logo in &self.sponsors.logos {
            if logo.x < 0
                || logo.y < 0
                || logo.x + sw as i64 > c.width as i64
                || logo.y + sh as i64 > c.height as i64
            {
                w.push(format!(
                    "sponsor {} at ({}, {}) is partly off-canvas",
                    logo.image.display(),
                    logo.x,
                    logo.y
                ));
            }
        }
        w
    }
}
