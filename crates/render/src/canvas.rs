use glam::DVec2;
use jyrobot_common::{Color, Picture};

/// Software raster target in world units.
///
/// Coordinates are multiplied by `scale` before rasterizing; pixel centres
/// sit at half-integer positions. Colors with alpha are composited.
#[derive(Debug, Clone)]
pub struct Canvas {
    picture: Picture,
    scale: f64,
}

impl Canvas {
    /// Canvas big enough for a `width` x `height` world at `scale`, up to
    /// [`Picture::MAX_SIDE`] pixels a side.
    pub fn new(width: f64, height: f64, scale: f64) -> Self {
        let px = |v: f64| (v * scale).ceil().max(1.0) as usize;
        Self {
            picture: Picture::new(px(width), px(height)),
            scale,
        }
    }

    pub fn picture(&self) -> &Picture {
        &self.picture
    }

    pub fn into_picture(self) -> Picture {
        self.picture
    }

    /// Paint every pixel, ignoring alpha compositing.
    pub fn fill(&mut self, color: Color) {
        self.picture.fill(color);
    }

    fn plot(&mut self, x: i64, y: i64, color: Color) {
        self.picture.blend(x, y, color);
    }

    /// Axis-aligned rectangle with its top-left corner at `origin`.
    pub fn rect(&mut self, origin: DVec2, size: DVec2, color: Color) {
        let corners = [
            origin,
            origin + DVec2::new(size.x, 0.0),
            origin + size,
            origin + DVec2::new(0.0, size.y),
        ];
        self.polygon(&corners, color);
    }

    /// Even-odd scanline fill of a closed polygon.
    pub fn polygon(&mut self, points: &[DVec2], color: Color) {
        if points.len() < 3 {
            return;
        }
        let pts: Vec<DVec2> = points.iter().map(|p| *p * self.scale).collect();
        let (min_y, max_y) = pts
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        let first_row = (min_y - 0.5).ceil().max(0.0) as i64;
        let last_row = (max_y - 0.5).floor().min(self.picture.height() as f64 - 1.0) as i64;
        let last_col = self.picture.width() as f64 - 1.0;
        let mut crossings = Vec::new();
        for row in first_row..=last_row {
            let y = row as f64 + 0.5;
            crossings.clear();
            for (k, a) in pts.iter().enumerate() {
                let b = pts[(k + 1) % pts.len()];
                if (a.y <= y && b.y > y) || (b.y <= y && a.y > y) {
                    crossings.push(a.x + (y - a.y) / (b.y - a.y) * (b.x - a.x));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().max(0.0) as i64;
                let end = (span[1] - 0.5).floor().min(last_col) as i64;
                if start > end {
                    continue;
                }
                for col in start..=end {
                    self.plot(col, row, color);
                }
            }
        }
    }

    /// Straight stroke of the given width, in pixels. Only the part that
    /// can touch the canvas is walked.
    pub fn line(&mut self, from: DVec2, to: DVec2, width: f64, color: Color) {
        let half = (width.max(1.0) / 2.0).max(0.5);
        let margin = DVec2::splat(half + 1.0);
        let size = DVec2::new(self.picture.width() as f64, self.picture.height() as f64);
        let Some((a, b)) = clip_segment(from * self.scale, to * self.scale, -margin, size + margin)
        else {
            return;
        };
        let steps = (a.distance(b) * 2.0).ceil().max(1.0) as usize;
        let mut last = None;
        for k in 0..=steps {
            let p = a.lerp(b, k as f64 / steps as f64);
            let lo = ((p.x - half).round() as i64, (p.y - half).round() as i64);
            let hi = ((p.x + half).round() as i64, (p.y + half).round() as i64);
            if last == Some((lo, hi)) {
                continue;
            }
            last = Some((lo, hi));
            for y in lo.1..hi.1.max(lo.1 + 1) {
                for x in lo.0..hi.0.max(lo.0 + 1) {
                    self.picture.set(x, y, color);
                }
            }
        }
    }

    /// Open polyline.
    pub fn polyline(&mut self, points: impl IntoIterator<Item = DVec2>, width: f64, color: Color) {
        let mut prev: Option<DVec2> = None;
        for p in points {
            if let Some(q) = prev {
                self.line(q, p, width, color);
            }
            prev = Some(p);
        }
    }

    /// Filled pie slice from `start` to `end` (radians).
    pub fn wedge(&mut self, centre: DVec2, radius: f64, start: f64, end: f64, color: Color) {
        const SEGMENTS: usize = 16;
        let mut points = Vec::with_capacity(SEGMENTS + 2);
        points.push(centre);
        for k in 0..=SEGMENTS {
            let a = start + (end - start) * k as f64 / SEGMENTS as f64;
            points.push(centre + DVec2::new(a.cos(), a.sin()) * radius);
        }
        self.polygon(&points, color);
    }

    /// Filled circle.
    pub fn ellipse(&mut self, centre: DVec2, radius: f64, color: Color) {
        let c = centre * self.scale;
        let r = radius * self.scale;
        let (w, h) = (self.picture.width() as i64, self.picture.height() as i64);
        let x0 = ((c.x - r).floor() as i64).max(0);
        let x1 = ((c.x + r).ceil() as i64).min(w - 1);
        let y0 = ((c.y - r).floor() as i64).max(0);
        let y1 = ((c.y + r).ceil() as i64).min(h - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = DVec2::new(x as f64 + 0.5, y as f64 + 0.5) - c;
                if d.length_squared() <= r * r {
                    self.plot(x, y, color);
                }
            }
        }
    }
}

/// Liang-Barsky clip of segment `a`-`b` to the box `lo`..`hi`.
fn clip_segment(a: DVec2, b: DVec2, lo: DVec2, hi: DVec2) -> Option<(DVec2, DVec2)> {
    let d = b - a;
    if !a.is_finite() || !d.is_finite() {
        return None;
    }
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-d.x, a.x - lo.x),
        (d.x, hi.x - a.x),
        (-d.y, a.y - lo.y),
        (d.y, hi.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t0 = t0.max(q / p);
        } else {
            t1 = t1.min(q / p);
        }
    }
    (t0 <= t1).then(|| (a + d * t0, a + d * t1))
}
