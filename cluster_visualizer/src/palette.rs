use cluster_data::ClusterId;

use crate::PlotError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}
impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const PINK: Color = Color::rgb(255, 192, 203);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
    pub fn named(name: &str) -> Option<Self> {
        let color = match name {
            "red" => Self::RED,
            "green" => Self::GREEN,
            "blue" => Self::BLUE,
            "black" => Self::BLACK,
            "orange" => Self::ORANGE,
            "pink" => Self::PINK,
            "white" => Self::rgb(255, 255, 255),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "purple" => Self::rgb(128, 0, 128),
            "brown" => Self::rgb(165, 42, 42),
            "cyan" => Self::rgb(0, 255, 255),
            "magenta" => Self::rgb(255, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            _ => return None,
        };
        Some(color)
    }
}
impl std::str::FromStr for Color {
    type Err = PlotError;

    /// Accepts a color name or `#rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(color) = Self::named(&s.to_lowercase()) {
            return Ok(color);
        }
        let invalid = || PlotError::InvalidArgument(format!("unknown color '{s}'"));
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}
impl TryFrom<String> for Color {
    type Error = PlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}
impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Marker {
    Circle,
    TriangleDown,
    TriangleUp,
    TriangleLeft,
    TriangleRight,
    Square,
    Diamond,
}
impl Marker {
    /// Outline in pixels around the marker center, y pointing down.
    pub fn outline(self, size: i32) -> Vec<(i32, i32)> {
        let s = size;
        match self {
            Marker::Circle => (0..12)
                .map(|i| {
                    let angle = i as f64 * std::f64::consts::TAU / 12.;
                    (
                        (s as f64 * angle.cos()).round() as i32,
                        (s as f64 * angle.sin()).round() as i32,
                    )
                })
                .collect(),
            Marker::TriangleDown => vec![(-s, -s), (s, -s), (0, s)],
            Marker::TriangleUp => vec![(-s, s), (s, s), (0, -s)],
            Marker::TriangleLeft => vec![(s, -s), (s, s), (-s, 0)],
            Marker::TriangleRight => vec![(-s, -s), (-s, s), (s, 0)],
            Marker::Square => vec![(-s, -s), (s, -s), (s, s), (-s, s)],
            Marker::Diamond => vec![(0, -s), (s, 0), (0, s), (-s, 0)],
        }
    }
}
impl std::str::FromStr for Marker {
    type Err = PlotError;

    /// Accepts the names used in config files as well as the usual one
    /// character codes (`o`, `v`, `^`, `<`, `>`, `s`, `D`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "o" | "circle" => Marker::Circle,
            "v" | "triangle-down" => Marker::TriangleDown,
            "^" | "triangle-up" => Marker::TriangleUp,
            "<" | "triangle-left" => Marker::TriangleLeft,
            ">" | "triangle-right" => Marker::TriangleRight,
            "s" | "square" => Marker::Square,
            "D" | "diamond" => Marker::Diamond,
            other => {
                return Err(PlotError::InvalidArgument(format!(
                    "unknown marker '{other}'"
                )))
            }
        })
    }
}

pub const DEFAULT_COLORS: [Color; 6] = [
    Color::RED,
    Color::GREEN,
    Color::BLUE,
    Color::BLACK,
    Color::ORANGE,
    Color::PINK,
];
pub const DEFAULT_MARKERS: [Marker; 6] = [
    Marker::Circle,
    Marker::TriangleDown,
    Marker::TriangleUp,
    Marker::Square,
    Marker::TriangleLeft,
    Marker::TriangleRight,
];

/// Style of `cluster`: cluster 1 gets the first entry, cluster 0 the last.
/// `palette` must not be empty.
pub fn pick<T: Copy>(palette: &[T], cluster: ClusterId) -> T {
    let position = (cluster.value() as i128 - 1).rem_euclid(palette.len() as i128);
    palette[position as usize]
}

#[test]
fn colors_parse_by_name_and_hex() {
    assert_eq!("red".parse::<Color>().unwrap(), Color::RED);
    assert_eq!("Orange".parse::<Color>().unwrap(), Color::ORANGE);
    assert_eq!("#00ff7f".parse::<Color>().unwrap(), Color::rgb(0, 255, 127));
    assert!("#00ff7".parse::<Color>().is_err());
    assert!("chartreuse-ish".parse::<Color>().is_err());
    assert_eq!(Color::PINK.to_string(), "#ffc0cb");
}
#[test]
fn markers_parse_short_codes() {
    let markers = "o,v,^,s,<,>"
        .split(',')
        .map(|m| m.parse::<Marker>().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(markers, DEFAULT_MARKERS);
    assert!("x".parse::<Marker>().is_err());
}
#[test]
fn palette_wraps_around() {
    let palette = [1, 2, 3];
    let styles = [1, 2, 3, 4, 0, -1, -2].map(|c| pick(&palette, ClusterId::new(c)));
    assert_eq!(styles, [1, 2, 3, 1, 3, 2, 1]);
}
