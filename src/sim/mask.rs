//! Opacity bitmaps and integer rectangles for pixel-exact collision
//!
//! A `Rect` is a sprite's screen-space bounding box (top-left + size), and a
//! `Mask` marks which pixels inside it are solid. Two sprites collide when
//! their rects overlap and at least one solid pixel is shared.

use glam::Vec2;

/// Integer screen rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect of size `w`x`h` centered (to the nearest pixel) on `center`
    pub fn from_center(center: Vec2, w: u32, h: u32) -> Self {
        let (w, h) = (w as i32, h as i32);
        let cx = center.x.round() as i32;
        let cy = center.y.round() as i32;
        Self::new(cx - w / 2, cy - h / 2, w, h)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }

    /// Overlap test; rects that only share an edge do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.w > 0
            && self.h > 0
            && other.w > 0
            && other.h > 0
            && self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x as f32
            && p.x < (self.x + self.w) as f32
            && p.y >= self.y as f32
            && p.y < (self.y + self.h) as f32
    }
}

/// Row-major opacity bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Build a mask by sampling `solid(x, y)` at every pixel
    pub fn from_fn(width: u32, height: u32, mut solid: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(solid(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Solid disc filling a `diameter`x`diameter` square
    pub fn circle(diameter: u32) -> Self {
        let r = diameter as f32 / 2.0;
        Self::from_fn(diameter, diameter, |x, y| {
            let p = Vec2::new(x as f32 + 0.5 - r, y as f32 + 0.5 - r);
            p.length_squared() <= r * r
        })
    }

    /// Paddle art: a band of the orbit circle, `thickness` pixels deep.
    ///
    /// The sprite sits on the orbit below the board center, so the orbit
    /// center lies `orbit_radius` above the sprite center and the band curves
    /// with the boundary.
    pub fn arc_band(width: u32, height: u32, orbit_radius: f32, thickness: f32) -> Self {
        let half = Vec2::new(width as f32 / 2.0, height as f32 / 2.0);
        let orbit_center = Vec2::new(0.0, -orbit_radius);
        let half_thick = thickness / 2.0;
        Self::from_fn(width, height, |x, y| {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - half;
            ((p - orbit_center).length() - orbit_radius).abs() <= half_thick
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.bits[(y as u32 * self.width + x as u32) as usize]
    }

    /// Number of solid pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Rotate by `degrees`, counter-clockwise on screen for positive angles.
    ///
    /// The result grows to the bounding box of the rotated art; pixels are
    /// sampled nearest-neighbour from the source.
    pub fn rotated(&self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (w, h) = (self.width as f32, self.height as f32);
        let out_w = (w * cos.abs() + h * sin.abs()).round().max(1.0) as u32;
        let out_h = (w * sin.abs() + h * cos.abs()).round().max(1.0) as u32;
        let (src_cx, src_cy) = (w / 2.0, h / 2.0);
        let (dst_cx, dst_cy) = (out_w as f32 / 2.0, out_h as f32 / 2.0);

        Self::from_fn(out_w, out_h, |x, y| {
            let dx = x as f32 + 0.5 - dst_cx;
            let dy = y as f32 + 0.5 - dst_cy;
            // Inverse of the on-screen rotation (y axis points down)
            let sx = dx * cos - dy * sin + src_cx;
            let sy = dx * sin + dy * cos + src_cy;
            self.get(sx.floor() as i32, sy.floor() as i32)
        })
    }

    /// True if any solid pixel of `other`, placed at `offset` from this
    /// mask's top-left corner, lands on a solid pixel of this mask
    pub fn overlaps(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let (ox, oy) = offset;
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (ox + other.width as i32).min(self.width as i32);
        let y1 = (oy + other.height as i32).min(self.height as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x - ox, y - oy) {
                    return true;
                }
            }
        }
        false
    }
}
