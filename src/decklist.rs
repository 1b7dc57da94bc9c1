//! Decklist text format.
//!
//! ```text
//! Alice               <- player name (first non-empty line)
//! Burn                <- deck archetype (second non-empty line)
//! mainboard:
//! 20 Mountain         -> "20x Mountain"
//! 4 Lightning Bolt    -> "4x Lightning Bolt"
//! sideboard:
//! 3 Smash to Smithereens
//! ```
//!
//! Blank lines are ignored everywhere. Lines between the archetype and the
//! first section header are dropped without error. Quantities are not checked:
//! the first whitespace-separated token is treated as the count whatever it is.

use std::{fs, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CardError, Result};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DecklistRecord {
    pub player_name: String,
    pub deck_archetype: String,
    pub mainboard: Vec<String>,
    pub sideboard: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Mainboard,
    Sideboard,
}

impl Section {
    fn from_header(line: &str) -> Option<Self> {
        if line.eq_ignore_ascii_case("mainboard:") {
            Some(Section::Mainboard)
        } else if line.eq_ignore_ascii_case("sideboard:") {
            Some(Section::Sideboard)
        } else {
            None
        }
    }
}

/// Read and parse a decklist file.
pub fn load(path: impl AsRef<Path>) -> Result<DecklistRecord> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| CardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record = parse_str(&text)?;
    debug!(
        "decklist {}: {} mainboard / {} sideboard entries",
        path.display(),
        record.mainboard.len(),
        record.sideboard.len()
    );
    Ok(record)
}

pub fn parse_str(text: &str) -> Result<DecklistRecord> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.len() < 2 {
        return Err(CardError::MalformedDecklist { found: lines.len() });
    }

    let mut mainboard = Vec::new();
    let mut sideboard = Vec::new();
    let mut section = None;
    let mut preamble = 0usize;

    for line in &lines[2..] {
        if let Some(next) = Section::from_header(line) {
            section = Some(next);
            continue;
        }
        match section {
            Some(Section::Mainboard) => mainboard.push(format_entry(line)),
            Some(Section::Sideboard) => sideboard.push(format_entry(line)),
            None => preamble += 1,
        }
    }
    if preamble > 0 {
        debug!("dropped {preamble} line(s) before the first section header");
    }

    Ok(DecklistRecord {
        player_name: lines[0].to_string(),
        deck_archetype: lines[1].to_string(),
        mainboard,
        sideboard,
    })
}

/// `"4 Lightning Bolt"` -> `"4x Lightning Bolt"`; single tokens pass through.
pub fn format_entry(line: &str) -> String {
    match line.split_once(char::is_whitespace) {
        Some((count, name)) => format!("{count}x {}", name.trim_start()),
        None => line.to_string(),
    }
}
