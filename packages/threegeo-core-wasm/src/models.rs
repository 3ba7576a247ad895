// Shared configuration and result types passed across the wasm boundary
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::console_warn;
use crate::error::ProjectionError;

/// Target surface for the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Sphere,
    Plane,
}

impl FromStr for Shape {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sphere" => Ok(Shape::Sphere),
            "plane" => Ok(Shape::Plane),
            other => Err(ProjectionError::InvalidShape(other.to_string())),
        }
    }
}

/// Axis convention of emitted sphere vertices.
///
/// `Geographic` keeps the north pole on +z. `YUp` reorders a vertex
/// `(x, y, z)` to `(y, z, x)`, the convention of Y-up WebGL scene graphs.
/// Plane vertices are `(x, y, 0)` in both frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frame {
    #[default]
    Geographic,
    YUp,
}

// Struct to represent a color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ColorValue", into = "ColorValue")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

// Wire representation: either a CSS-ish string or a 24-bit number (0xRRGGBB)
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Number(f64),
    Text(String),
}

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xffffff),
    ("red", 0xff0000),
    ("green", 0x008000),
    ("lime", 0x00ff00),
    ("blue", 0x0000ff),
    ("yellow", 0xffff00),
    ("cyan", 0x00ffff),
    ("magenta", 0xff00ff),
    ("orange", 0xffa500),
    ("gray", 0x808080),
    ("grey", 0x808080),
];

impl Color {
    pub const RED: Color = Color { r: 1.0, g: 0.0, b: 0.0 };

    pub fn from_hex(hex: u32) -> Self {
        Color {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Parse `#rrggbb`, `#rgb` or one of a handful of CSS color names.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(digits) = value.strip_prefix('#') {
            return match digits.len() {
                6 => u32::from_str_radix(digits, 16).ok().map(Color::from_hex),
                3 => {
                    let short = u32::from_str_radix(digits, 16).ok()?;
                    let (r, g, b) = ((short >> 8) & 0xf, (short >> 4) & 0xf, short & 0xf);
                    Some(Color::from_hex((r * 17) << 16 | (g * 17) << 8 | b * 17))
                }
                _ => None,
            };
        }

        let lower = value.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, hex)| Color::from_hex(*hex))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::RED
    }
}

impl From<ColorValue> for Color {
    fn from(value: ColorValue) -> Self {
        match value {
            ColorValue::Number(n) if n.is_finite() && n >= 0.0 => Color::from_hex(n as u32 & 0xffffff),
            ColorValue::Number(n) => {
                console_warn!("Ignoring invalid numeric color {}, using default", n);
                Color::default()
            }
            ColorValue::Text(text) => Color::parse(&text).unwrap_or_else(|| {
                console_warn!("Unrecognized color '{}', using default", text);
                Color::default()
            }),
        }
    }
}

impl From<Color> for ColorValue {
    fn from(color: Color) -> Self {
        ColorValue::Text(format!("#{:06x}", color.to_hex()))
    }
}

/// Per-call styling and plane sizing options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawOptions {
    pub color: Color,
    /// Plane width in render units, only read in plane mode
    pub width: Option<f64>,
    /// Plane height in render units, only read in plane mode
    pub height: Option<f64>,
    pub name: String,
    /// Point primitive size
    pub size: f64,
    pub frame: Frame,
    /// Feature ids skipped when a FeatureCollection is drawn onto a plane
    pub plane_excluded_ids: Vec<String>,
}

impl Default for DrawOptions {
    fn default() -> Self {
        DrawOptions {
            color: Color::default(),
            width: None,
            height: None,
            name: String::new(),
            size: 1.0,
            frame: Frame::default(),
            plane_excluded_ids: Vec::new(),
        }
    }
}

impl DrawOptions {
    pub fn from_json(json: &str) -> Result<Self, ProjectionError> {
        serde_json::from_str(json).map_err(|e| ProjectionError::InvalidOptions(e.to_string()))
    }

    // Missing dimensions deliberately turn into NaN coordinates
    pub(crate) fn plane_dimensions(&self) -> (f64, f64) {
        (self.width.unwrap_or(f64::NAN), self.height.unwrap_or(f64::NAN))
    }

    pub(crate) fn excludes_on_plane(&self, feature_id: Option<&str>) -> bool {
        match feature_id {
            Some(id) => self.plane_excluded_ids.iter().any(|excluded| excluded == id),
            None => false,
        }
    }
}

/// Counts of what a single draw call emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawSummary {
    pub geometries: usize,
    pub lines: usize,
    pub points: usize,
    pub vertices: usize,
}
