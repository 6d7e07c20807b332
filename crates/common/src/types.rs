use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Errors from converting raw channel lists into a [`Color`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("color needs 3 or 4 channels, got {0}")]
    ChannelCount(usize),
}

/// 8-bit RGBA color.
///
/// Serialized as `[r, g, b]` when opaque and `[r, g, b, a]` otherwise, so
/// configuration files can keep the short form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 255)
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Opaque grey with all three channels set to `level`.
    pub const fn grey(level: u8) -> Self {
        Self::rgb(level, level, level)
    }

    /// Grey from a floating level, rounded and clamped into 0..=255.
    pub fn grey_f(level: f64) -> Self {
        Self::grey(channel(level))
    }

    /// Multiply the color channels by `factor`, keeping alpha.
    pub fn scaled(self, factor: f64) -> Self {
        Self::rgba(
            channel(f64::from(self.red) * factor),
            channel(f64::from(self.green) * factor),
            channel(f64::from(self.blue) * factor),
            self.alpha,
        )
    }

    pub fn is_opaque(self) -> bool {
        self.alpha == 255
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

impl TryFrom<Vec<u8>> for Color {
    type Error = ColorError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
            other => Err(ColorError::ChannelCount(other.len())),
        }
    }
}

impl From<Color> for Vec<u8> {
    fn from(value: Color) -> Self {
        if value.is_opaque() {
            vec![value.red, value.green, value.blue]
        } else {
            vec![value.red, value.green, value.blue, value.alpha]
        }
    }
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// A point on the wire: `{"x": .., "y": ..}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Point> for DVec2 {
    fn from(value: Point) -> Self {
        DVec2::new(value.x, value.y)
    }
}

impl From<DVec2> for Point {
    fn from(value: DVec2) -> Self {
        Self::new(value.x, value.y)
    }
}

/// Line segment between two points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Line {
    pub p1: DVec2,
    pub p2: DVec2,
}

impl Line {
    pub const fn new(p1: DVec2, p2: DVec2) -> Self {
        Self { p1, p2 }
    }

    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }
}
