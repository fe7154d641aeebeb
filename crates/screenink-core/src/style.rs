//! Stroke, fill, dash and font properties applied to drawing elements.

use serde::{Deserialize, Serialize};

/// RGBA color with an optional display name.
///
/// The name is what palettes and on-screen feedback show; the channels are
/// what gets painted and exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r,
            g,
            b,
            a,
            name: None,
        }
    }

    pub fn named(r: u8, g: u8, b: u8, name: &str) -> Self {
        Self {
            r,
            g,
            b,
            a: 255,
            name: Some(name.to_string()),
        }
    }

    pub fn black() -> Self {
        Self::named(0, 0, 0, "Black")
    }

    pub fn white() -> Self {
        Self::named(255, 255, 255, "White")
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`, or one of the built-in
    /// color names. An unparseable string falls back to `default` with a
    /// logged diagnostic; this boundary never fails.
    pub fn parse_or(input: &str, default: Color) -> Color {
        match Self::parse(input) {
            Some(color) => color,
            None => {
                log::warn!(
                    "unparseable color {:?}, falling back to {}",
                    input,
                    default.display_name()
                );
                default
            }
        }
    }

    fn parse(input: &str) -> Option<Color> {
        let input = input.trim();
        if let Some(hex) = input.strip_prefix('#') {
            if !hex.is_ascii() {
                return None;
            }
            return match hex.len() {
                3 => {
                    let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                    let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                    let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                    Some(Color::new(r, g, b, 255))
                }
                6 | 8 => {
                    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                    let a = if hex.len() == 8 {
                        u8::from_str_radix(&hex[6..8], 16).ok()?
                    } else {
                        255
                    };
                    Some(Color::new(r, g, b, a))
                }
                _ => None,
            };
        }
        let (r, g, b) = match input.to_ascii_lowercase().as_str() {
            "black" => (0, 0, 0),
            "white" => (255, 255, 255),
            "red" => (255, 0, 0),
            "green" => (0, 128, 0),
            "blue" => (0, 0, 255),
            "yellow" => (255, 255, 0),
            "cyan" => (0, 255, 255),
            "magenta" => (255, 0, 255),
            "orange" => (255, 165, 0),
            "gray" | "grey" => (128, 128, 128),
            _ => return None,
        };
        let mut color = Color::new(r, g, b, 255);
        let mut name = input.to_string();
        if let Some(first) = name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        color.name = Some(name);
        Some(color)
    }

    /// Opaque hex form `#rrggbb` (alpha is emitted separately where needed).
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a 0..=1 fraction.
    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// The display name, or the hex form when unnamed.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.to_hex())
    }
}

/// Line cap at stroke endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

impl LineCap {
    pub fn svg_name(&self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

/// Line join at path corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
    Bevel,
}

impl LineJoin {
    pub fn svg_name(&self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

/// Fill rule for self-intersecting paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FillRule {
    pub fn svg_name(&self) -> &'static str {
        match self {
            FillRule::NonZero => "nonzero",
            FillRule::EvenOdd => "evenodd",
        }
    }
}

/// Dash pattern; `active` gates whether the on/off lengths apply at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashPattern {
    pub active: bool,
    pub on: f64,
    pub off: f64,
    pub offset: f64,
}

impl Default for DashPattern {
    fn default() -> Self {
        Self {
            active: false,
            on: 8.0,
            off: 8.0,
            offset: 0.0,
        }
    }
}

impl DashPattern {
    /// The segment lengths handed to a backend, empty when inactive.
    pub fn segments(&self) -> Vec<f64> {
        if self.active {
            vec![self.on, self.off]
        } else {
            Vec::new()
        }
    }
}

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn svg_name(&self) -> &'static str {
        match self {
            FontWeight::Light => "300",
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

/// Font style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn svg_name(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
            FontStyle::Oblique => "oblique",
        }
    }
}

/// Font description for text elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    /// Right-align the text against its anchor instead of left.
    pub right_aligned: bool,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            weight: FontWeight::default(),
            style: FontStyle::default(),
            right_aligned: false,
        }
    }
}

/// Style properties for a drawing element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    pub color: Color,
    pub line_width: f64,
    pub line_join: LineJoin,
    pub line_cap: LineCap,
    pub fill: bool,
    #[serde(default)]
    pub fill_rule: FillRule,
    #[serde(default)]
    pub dash: DashPattern,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            color: Color::black(),
            line_width: 3.0,
            line_join: LineJoin::default(),
            line_cap: LineCap::default(),
            fill: false,
            fill_rule: FillRule::default(),
            dash: DashPattern::default(),
        }
    }
}
