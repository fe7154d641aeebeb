//! GIMP palette import: a line-oriented text format of `R G B [name]`
//! entries with a magic header and optional metadata lines.

use crate::style::Color;
use log::{debug, warn};

const MAGIC: &str = "GIMP Palette";

/// A named color set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    pub name: String,
    /// Suggested display column count, 0 when unspecified.
    pub columns: usize,
    pub colors: Vec<Color>,
}

impl Palette {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Parse palette text. Deliberately tolerant: a missing magic header
    /// is logged and skipped, malformed data lines are dropped, and the
    /// worst outcome is an empty palette.
    pub fn parse(input: &str) -> Palette {
        let mut palette = Palette::default();
        let mut lines = input.lines().peekable();

        match lines.peek() {
            Some(first) if first.trim() == MAGIC => {
                lines.next();
            }
            _ => warn!("palette file is missing the {:?} header", MAGIC),
        }

        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix("Name:") {
                palette.name = name.trim().to_string();
                continue;
            }
            if let Some(columns) = line.strip_prefix("Columns:") {
                palette.columns = columns.trim().parse().unwrap_or(0);
                continue;
            }
            if let Some(color) = parse_entry(line) {
                palette.colors.push(color);
            } else {
                debug!("skipping malformed palette line {:?}", line);
            }
        }
        palette
    }
}

/// One `R G B [name]` data line; fewer than 3 numeric channels is invalid.
fn parse_entry(line: &str) -> Option<Color> {
    let mut tokens = line.split_whitespace();
    let r: u8 = tokens.next()?.parse().ok()?;
    let g: u8 = tokens.next()?.parse().ok()?;
    let b: u8 = tokens.next()?.parse().ok()?;
    let name = tokens.collect::<Vec<_>>().join(" ");
    let mut color = Color::new(r, g, b, u8::MAX);
    if !name.is_empty() {
        color.name = Some(name);
    }
    Some(color)
}
