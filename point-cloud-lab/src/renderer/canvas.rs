/// Pixel-level drawing on an RGB frame
use super::glyphs::{GLYPH_HEIGHT, GLYPH_WIDTH, glyph};
use crate::point::ScreenPoint;
use image::{Rgb, RgbImage};

pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: [u8; 3]) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(background)),
        }
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    fn plot(&mut self, x: i32, y: i32, colour: [u8; 3]) {
        if x >= 0 && y >= 0 && (x as u32) < self.image.width() && (y as u32) < self.image.height() {
            self.image.put_pixel(x as u32, y as u32, Rgb(colour));
        }
    }

    /// Draw a segment `width` pixels thick, clipped to the frame.
    pub fn line(&mut self, from: ScreenPoint, to: ScreenPoint, width: u32, colour: [u8; 3]) {
        let Some((x0, y0, x1, y1)) = self.clip(from, to) else {
            return;
        };
        for offset in 0..width.max(1) as i32 {
            self.bresenham(x0 + offset, y0, x1 + offset, y1, colour);
            if offset > 0 {
                self.bresenham(x0, y0 + offset, x1, y1 + offset, colour);
            }
        }
    }

    fn bresenham(&mut self, mut x0: i32, mut y0: i32, x1: i32, y1: i32, colour: [u8; 3]) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x0, y0, colour);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Liang-Barsky clip against the frame rectangle. Done in f64 since
    /// projected points can sit billions of pixels away.
    fn clip(&self, from: ScreenPoint, to: ScreenPoint) -> Option<(i32, i32, i32, i32)> {
        let max_x = f64::from(self.image.width().checked_sub(1)?);
        let max_y = f64::from(self.image.height().checked_sub(1)?);
        let (fx, fy) = (f64::from(from.x), f64::from(from.y));
        let (dx, dy) = (f64::from(to.x) - fx, f64::from(to.y) - fy);

        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;
        for (p, q) in [(-dx, fx), (dx, max_x - fx), (-dy, fy), (dy, max_y - fy)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
            if t0 > t1 {
                return None;
            }
        }

        Some((
            (fx + t0 * dx).round() as i32,
            (fy + t0 * dy).round() as i32,
            (fx + t1 * dx).round() as i32,
            (fy + t1 * dy).round() as i32,
        ))
    }

    /// Whether a box of half-size `reach` around `(x, y)` touches the frame.
    fn touches_frame(&self, x: f32, y: f32, reach: f32) -> bool {
        x + reach >= 0.0
            && y + reach >= 0.0
            && x - reach < self.image.width() as f32
            && y - reach < self.image.height() as f32
    }

    /// Midpoint circle outline, drawn `thickness` pixels inwards. Rings that
    /// miss the frame entirely are skipped.
    pub fn ring(&mut self, center: ScreenPoint, radius: i32, thickness: i32, colour: [u8; 3]) {
        if !self.touches_frame(center.x, center.y, radius as f32 + 1.0) {
            return;
        }
        let (cx, cy) = (center.x.round() as i32, center.y.round() as i32);
        for r in (radius - thickness + 1).max(0)..=radius {
            let (mut x, mut y, mut err) = (r, 0, 1 - r);
            while x >= y {
                for (px, py) in [
                    (x, y),
                    (y, x),
                    (-y, x),
                    (-x, y),
                    (-x, -y),
                    (-y, -x),
                    (y, -x),
                    (x, -y),
                ] {
                    self.plot(cx + px, cy + py, colour);
                }
                y += 1;
                if err < 0 {
                    err += 2 * y + 1;
                } else {
                    x -= 1;
                    err += 2 * (y - x) + 1;
                }
            }
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`, each glyph pixel
    /// blown up to `scale × scale`.
    pub fn text(&mut self, x: i32, y: i32, text: &str, scale: i32, colour: [u8; 3]) {
        let advance = (GLYPH_WIDTH + 1) * scale;
        let extent = advance as f32 * text.chars().count() as f32 + (GLYPH_HEIGHT * scale) as f32;
        if !self.touches_frame(x as f32, y as f32, extent) {
            return;
        }
        for (i, c) in text.chars().enumerate() {
            let Some(rows) = glyph(c) else {
                continue;
            };
            let left = x + i as i32 * advance;
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            self.plot(left + col * scale + sx, y + row as i32 * scale + sy, colour);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: [u8; 3] = [0, 0, 0];
    const PAPER: [u8; 3] = [255, 255, 255];

    fn inked(canvas: Canvas) -> usize {
        canvas.into_image().pixels().filter(|p| p.0 == INK).count()
    }

    #[test]
    fn horizontal_line_covers_its_span() {
        let mut canvas = Canvas::new(20, 10, PAPER);
        canvas.line(ScreenPoint::new(2.0, 5.0), ScreenPoint::new(12.0, 5.0), 1, INK);
        let image = canvas.into_image();

        assert!((2..=12).all(|x| image.get_pixel(x, 5).0 == INK));
        assert_eq!(image.get_pixel(13, 5).0, PAPER);
    }

    #[test]
    fn far_off_segments_are_clipped() {
        let mut canvas = Canvas::new(50, 50, PAPER);
        canvas.line(ScreenPoint::new(-1e4, 25.0), ScreenPoint::new(1e4, 25.0), 1, INK);
        assert_eq!(inked(canvas), 50);

        let mut canvas = Canvas::new(50, 50, PAPER);
        canvas.line(ScreenPoint::new(-100.0, -10.0), ScreenPoint::new(100.0, -10.0), 1, INK);
        assert_eq!(inked(canvas), 0);
    }

    #[test]
    fn ring_is_hollow() {
        let mut canvas = Canvas::new(21, 21, PAPER);
        canvas.ring(ScreenPoint::new(10.0, 10.0), 3, 1, INK);
        let image = canvas.into_image();

        assert_eq!(image.get_pixel(13, 10).0, INK);
        assert_eq!(image.get_pixel(10, 7).0, INK);
        assert_eq!(image.get_pixel(10, 10).0, PAPER);
    }

    #[test]
    fn marks_far_off_the_frame_are_skipped() {
        let mut canvas = Canvas::new(30, 30, PAPER);
        canvas.ring(ScreenPoint::new(7.8e9, -3.9e9), 3, 2, INK);
        canvas.ring(ScreenPoint::new(-1e30, 15.0), 3, 2, INK);
        canvas.text(i32::MAX - 2, i32::MIN + 2, "XYZ", 2, INK);
        canvas.text(-40, 5, "X", 2, INK);
        assert_eq!(inked(canvas), 0);
    }

    #[test]
    fn ring_straddling_the_edge_is_drawn() {
        let mut canvas = Canvas::new(30, 30, PAPER);
        canvas.ring(ScreenPoint::new(-2.0, 15.0), 3, 1, INK);
        assert!(inked(canvas) > 0);
    }

    #[test]
    fn draws_known_glyphs_only() {
        let mut canvas = Canvas::new(40, 20, PAPER);
        canvas.text(1, 1, "Z?", 1, INK);
        // Z has 5 + 1 + 1 + 1 + 1 + 1 + 5 lit pixels
        assert_eq!(inked(canvas), 15);
    }
}
