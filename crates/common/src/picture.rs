use image::{Rgba, RgbaImage};

use crate::Color;

/// RGBA image backed by an [`image::RgbaImage`].
///
/// Freshly created pictures are fully transparent. Writes outside the image
/// are dropped so rasterizers can clip lazily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    image: RgbaImage,
}

impl Picture {
    /// Largest width or height a picture is created with; larger requests are clamped.
    pub const MAX_SIDE: usize = 4096;

    pub fn new(width: usize, height: usize) -> Self {
        let side = |v: usize| v.min(Self::MAX_SIDE) as u32;
        Self {
            image: RgbaImage::new(side(width), side(height)),
        }
    }

    pub fn width(&self) -> usize {
        self.image.width() as usize
    }

    pub fn height(&self) -> usize {
        self.image.height() as usize
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    fn coords(&self, x: i64, y: i64) -> Option<(u32, u32)> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        (x < self.image.width() && y < self.image.height()).then_some((x, y))
    }

    /// Overwrite one pixel. Returns false if the pixel is outside the image.
    pub fn set(&mut self, x: i64, y: i64, color: Color) -> bool {
        let Some((x, y)) = self.coords(x, y) else {
            return false;
        };
        self.image.put_pixel(x, y, color.into());
        true
    }

    /// Source-over composite `color` onto one pixel.
    pub fn blend(&mut self, x: i64, y: i64, color: Color) -> bool {
        if color.is_opaque() {
            return self.set(x, y, color);
        }
        let Some(under) = self.get(x, y) else {
            return false;
        };
        let a = f64::from(color.alpha) / 255.0;
        let ua = f64::from(under.alpha) / 255.0;
        let out_a = a + ua * (1.0 - a);
        if out_a <= 0.0 {
            return self.set(x, y, Color::TRANSPARENT);
        }
        let mix = |top: u8, bottom: u8| {
            let v = (f64::from(top) * a + f64::from(bottom) * ua * (1.0 - a)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        let mixed = Color::rgba(
            mix(color.red, under.red),
            mix(color.green, under.green),
            mix(color.blue, under.blue),
            (out_a * 255.0).round() as u8,
        );
        self.set(x, y, mixed)
    }

    pub fn get(&self, x: i64, y: i64) -> Option<Color> {
        let (x, y) = self.coords(x, y)?;
        Some((*self.image.get_pixel(x, y)).into())
    }

    pub fn fill(&mut self, color: Color) {
        let px: Rgba<u8> = color.into();
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    /// Iterate the pixels of column `x` from top to bottom.
    pub fn column(&self, x: usize) -> impl Iterator<Item = Color> + '_ {
        (0..self.height()).filter_map(move |y| self.get(x as i64, y as i64))
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        Rgba([c.red, c.green, c.blue, c.alpha])
    }
}

impl From<Rgba<u8>> for Color {
    fn from(Rgba([r, g, b, a]): Rgba<u8>) -> Self {
        Color::rgba(r, g, b, a)
    }
}
