// Drawing primitives over a softbuffer framebuffer (u32 per pixel, 0x00RRGGBB).
// Images arrive pre-scaled, so everything here is a 1:1 copy with blending.

use crate::loader::DecodedImage;

pub const BG_COLOR: u32 = 0x000000;

// 5x7 bitmap font covering ASCII 32..127. Each glyph is 5 columns x 7 rows
// packed into 5 bytes (one byte per column, LSB = top row).
#[rustfmt::skip]
static FONT_5X7: [[u8; 5]; 96] = [
    [0x00,0x00,0x00,0x00,0x00], [0x00,0x00,0x5F,0x00,0x00], [0x00,0x07,0x00,0x07,0x00], [0x14,0x7F,0x14,0x7F,0x14],
    [0x24,0x2A,0x7F,0x2A,0x12], [0x23,0x13,0x08,0x64,0x62], [0x36,0x49,0x55,0x22,0x50], [0x00,0x05,0x03,0x00,0x00],
    [0x00,0x1C,0x22,0x41,0x00], [0x00,0x41,0x22,0x1C,0x00], [0x14,0x08,0x3E,0x08,0x14], [0x08,0x08,0x3E,0x08,0x08],
    [0x00,0x50,0x30,0x00,0x00], [0x08,0x08,0x08,0x08,0x08], [0x00,0x60,0x60,0x00,0x00], [0x20,0x10,0x08,0x04,0x02],
    [0x3E,0x51,0x49,0x45,0x3E], [0x00,0x42,0x7F,0x40,0x00], [0x42,0x61,0x51,0x49,0x46], [0x21,0x41,0x45,0x4B,0x31],
    [0x18,0x14,0x12,0x7F,0x10], [0x27,0x45,0x45,0x45,0x39], [0x3C,0x4A,0x49,0x49,0x30], [0x01,0x71,0x09,0x05,0x03],
    [0x36,0x49,0x49,0x49,0x36], [0x06,0x49,0x49,0x29,0x1E], [0x00,0x36,0x36,0x00,0x00], [0x00,0x56,0x36,0x00,0x00],
    [0x08,0x14,0x22,0x41,0x00], [0x14,0x14,0x14,0x14,0x14], [0x00,0x41,0x22,0x14,0x08], [0x02,0x01,0x51,0x09,0x06],
    [0x3E,0x41,0x5D,0x55,0x1E], [0x7E,0x11,0x11,0x11,0x7E], [0x7F,0x49,0x49,0x49,0x36], [0x3E,0x41,0x41,0x41,0x22],
    [0x7F,0x41,0x41,0x22,0x1C], [0x7F,0x49,0x49,0x49,0x41], [0x7F,0x09,0x09,0x09,0x01], [0x3E,0x41,0x49,0x49,0x7A],
    [0x7F,0x08,0x08,0x08,0x7F], [0x00,0x41,0x7F,0x41,0x00], [0x20,0x40,0x41,0x3F,0x01], [0x7F,0x08,0x14,0x22,0x41],
    [0x7F,0x40,0x40,0x40,0x40], [0x7F,0x02,0x0C,0x02,0x7F], [0x7F,0x04,0x08,0x10,0x7F], [0x3E,0x41,0x41,0x41,0x3E],
    [0x7F,0x09,0x09,0x09,0x06], [0x3E,0x41,0x51,0x21,0x5E], [0x7F,0x09,0x19,0x29,0x46], [0x46,0x49,0x49,0x49,0x31],
    [0x01,0x01,0x7F,0x01,0x01], [0x3F,0x40,0x40,0x40,0x3F], [0x1F,0x20,0x40,0x20,0x1F], [0x3F,0x40,0x38,0x40,0x3F],
    [0x63,0x14,0x08,0x14,0x63], [0x07,0x08,0x70,0x08,0x07], [0x61,0x51,0x49,0x45,0x43], [0x00,0x7F,0x41,0x41,0x00],
    [0x02,0x04,0x08,0x10,0x20], [0x00,0x41,0x41,0x7F,0x00], [0x04,0x02,0x01,0x02,0x04], [0x40,0x40,0x40,0x40,0x40],
    [0x00,0x01,0x02,0x04,0x00], [0x20,0x54,0x54,0x54,0x78], [0x7F,0x48,0x44,0x44,0x38], [0x38,0x44,0x44,0x44,0x20],
    [0x38,0x44,0x44,0x48,0x7F], [0x38,0x54,0x54,0x54,0x18], [0x08,0x7E,0x09,0x01,0x02], [0x0C,0x52,0x52,0x52,0x3E],
    [0x7F,0x08,0x04,0x04,0x78], [0x00,0x44,0x7D,0x40,0x00], [0x20,0x40,0x44,0x3D,0x00], [0x7F,0x10,0x28,0x44,0x00],
    [0x00,0x41,0x7F,0x40,0x00], [0x7C,0x04,0x18,0x04,0x78], [0x7C,0x08,0x04,0x04,0x78], [0x38,0x44,0x44,0x44,0x38],
    [0x7C,0x14,0x14,0x14,0x08], [0x08,0x14,0x14,0x18,0x7C], [0x7C,0x08,0x04,0x04,0x08], [0x48,0x54,0x54,0x54,0x20],
    [0x04,0x3F,0x44,0x40,0x20], [0x3C,0x40,0x40,0x20,0x7C], [0x1C,0x20,0x40,0x20,0x1C], [0x3C,0x40,0x30,0x40,0x3C],
    [0x44,0x28,0x10,0x28,0x44], [0x0C,0x50,0x50,0x50,0x3C], [0x44,0x64,0x54,0x4C,0x44], [0x00,0x08,0x36,0x41,0x00],
    [0x00,0x00,0x7F,0x00,0x00], [0x00,0x41,0x36,0x08,0x00], [0x10,0x08,0x08,0x10,0x08], [0x00,0x00,0x00,0x00,0x00],
];

/// Pack RGB into softbuffer u32 format: 0x00RRGGBB.
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Unpack softbuffer u32 into (r, g, b).
pub fn unpack_rgb(v: u32) -> (u8, u8, u8) {
    ((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

fn blend(src: u8, dst: u8, a: u32) -> u8 {
    ((src as u32 * a + dst as u32 * (255 - a)) / 255) as u8
}

/// A rectangle in image or surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Overlap with `other`, or `None` when they do not touch.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.w as i32).min(other.x + other.w as i32);
        let y1 = (self.y + self.h as i32).min(other.y + other.h as i32);
        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(Rect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
        }
    }
}

/// Top-left corner that centers a `w` x `h` image on a `sw` x `sh` surface.
pub fn centered_origin(w: u32, h: u32, sw: u32, sh: u32) -> (i32, i32) {
    ((sw as i32 - w as i32) / 2, (sh as i32 - h as i32) / 2)
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

pub struct Canvas<'a> {
    pixels: &'a mut [u32],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    /// `pixels` must hold at least `width * height` entries.
    pub fn new(pixels: &'a mut [u32], width: u32, height: u32) -> Self {
        debug_assert!(pixels.len() >= (width * height) as usize);
        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn clear(&mut self, color: u32) {
        let len = (self.width * self.height) as usize;
        self.pixels[..len].fill(color);
    }

    /// Blend one pixel; out-of-bounds coordinates are ignored.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: (u8, u8, u8), a: u8) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let off = (y as u32 * self.width + x as u32) as usize;
        let a = a as u32;
        if a == 255 {
            self.pixels[off] = rgb(color.0, color.1, color.2);
        } else if a > 0 {
            let (dr, dg, db) = unpack_rgb(self.pixels[off]);
            self.pixels[off] = rgb(blend(color.0, dr, a), blend(color.1, dg, a), blend(color.2, db, a));
        }
    }

    /// Fill a rectangle with a color (with alpha blending).
    pub fn fill_rect(&mut self, rect: Rect, color: (u8, u8, u8), a: u8) {
        let Some(area) = rect.intersect(&self.bounds()) else { return };
        for y in area.y..area.y + area.h as i32 {
            for x in area.x..area.x + area.w as i32 {
                self.blend_pixel(x, y, color, a);
            }
        }
    }

    /// Copy `src` (a region of `img`) so its top-left lands at (dst_x, dst_y),
    /// scaling every source alpha by `alpha`. Parts outside the image or the
    /// surface are dropped.
    pub fn blit_region(&mut self, img: &DecodedImage, src: Rect, dst_x: i32, dst_y: i32, alpha: u8) {
        if alpha == 0 {
            return;
        }
        let Some(clipped) = src.intersect(&Rect::new(0, 0, img.width, img.height)) else { return };
        // Shift the destination by however much the source was clipped.
        let dst_x = dst_x + (clipped.x - src.x);
        let dst_y = dst_y + (clipped.y - src.y);
        let src = clipped;
        let dst = Rect::new(dst_x, dst_y, src.w, src.h);
        let Some(visible) = dst.intersect(&self.bounds()) else { return };

        let ga = alpha as u32;
        for vy in 0..visible.h {
            let dy = visible.y as u32 + vy;
            let sy = (src.y + (dy as i32 - dst_y)) as u32;
            let row = (dy * self.width) as usize;
            for vx in 0..visible.w {
                let dx = visible.x as u32 + vx;
                let sx = (src.x + (dx as i32 - dst_x)) as u32;
                let [r, g, b, sa] = img.pixel(sx, sy);
                let a = sa as u32 * ga / 255;
                let di = row + dx as usize;
                if a == 255 {
                    self.pixels[di] = rgb(r, g, b);
                } else if a > 0 {
                    let (dr, dg, db) = unpack_rgb(self.pixels[di]);
                    self.pixels[di] = rgb(blend(r, dr, a), blend(g, dg, a), blend(b, db, a));
                }
            }
        }
    }

    /// Draw the whole image with its top-left at (x, y).
    pub fn blit(&mut self, img: &DecodedImage, x: i32, y: i32, alpha: u8) {
        self.blit_region(img, Rect::new(0, 0, img.width, img.height), x, y, alpha);
    }

    /// Draw the whole image centered on the surface.
    pub fn blit_centered(&mut self, img: &DecodedImage, alpha: u8) {
        let (x, y) = centered_origin(img.width, img.height, self.width, self.height);
        self.blit(img, x, y, alpha);
    }

    fn draw_char(&mut self, ch: char, px: i32, py: i32, scale: u32, color: (u8, u8, u8), a: u8) {
        let idx = (ch as u32).wrapping_sub(32) as usize;
        if idx >= 96 {
            return;
        }
        let glyph = &FONT_5X7[idx];
        for col in 0..5u32 {
            let bits = glyph[col as usize];
            for row in 0..7u32 {
                if bits & (1 << row) != 0 {
                    let cell = Rect::new(
                        px + (col * scale) as i32,
                        py + (row * scale) as i32,
                        scale,
                        scale,
                    );
                    self.fill_rect(cell, color, a);
                }
            }
        }
    }

    /// Draw a string. Returns the x position after the last character.
    pub fn draw_text(&mut self, text: &str, px: i32, py: i32, scale: u32, color: (u8, u8, u8), a: u8) -> i32 {
        let mut x = px;
        for ch in text.chars() {
            self.draw_char(ch, x, py, scale, color, a);
            x += text_advance(scale);
        }
        x
    }
}

/// Horizontal advance of one glyph: 5 pixels plus 1 spacing.
pub fn text_advance(scale: u32) -> i32 {
    (6 * scale) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_clips_at_every_edge() {
        let mut buf = vec![0u32; 4 * 4];
        let mut canvas = Canvas::new(&mut buf, 4, 4);
        let img = DecodedImage::solid(3, 3, [255, 0, 0, 255]);

        canvas.blit(&img, -1, 2, 255);
        let red = rgb(255, 0, 0);
        assert_eq!(canvas.pixel(0, 2), red);
        assert_eq!(canvas.pixel(1, 3), red);
        assert_eq!(canvas.pixel(2, 2), 0);
        assert_eq!(canvas.pixel(0, 1), 0);
    }

    #[test]
    fn blit_region_maps_source_offsets() {
        let mut img = DecodedImage::solid(4, 1, [0, 0, 0, 255]);
        // Column 2 of the source is white.
        img.rgba_bytes[8..12].copy_from_slice(&[255, 255, 255, 255]);

        let mut buf = vec![0u32; 4];
        let mut canvas = Canvas::new(&mut buf, 4, 1);
        canvas.blit_region(&img, Rect::new(2, 0, 2, 1), 0, 0, 255);
        assert_eq!(canvas.pixel(0, 0), rgb(255, 255, 255));
        assert_eq!(canvas.pixel(1, 0), 0);
    }

    #[test]
    fn global_alpha_blends_over_background() {
        let mut buf = vec![0u32; 1];
        let mut canvas = Canvas::new(&mut buf, 1, 1);
        let img = DecodedImage::solid(1, 1, [255, 255, 255, 255]);
        canvas.blit(&img, 0, 0, 128);
        assert_eq!(canvas.pixel(0, 0), rgb(128, 128, 128));

        canvas.clear(BG_COLOR);
        canvas.blit(&img, 0, 0, 0);
        assert_eq!(canvas.pixel(0, 0), BG_COLOR);
    }

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(a.intersect(&Rect::new(5, -5, 10, 10)), Some(Rect::new(5, 0, 5, 5)));
        assert_eq!(a.intersect(&Rect::new(10, 0, 5, 5)), None);
    }

    #[test]
    fn text_draws_inside_bounds_only() {
        let mut buf = vec![0u32; 20 * 10];
        let mut canvas = Canvas::new(&mut buf, 20, 10);
        let end = canvas.draw_text("Hi", -3, 1, 1, (255, 255, 255), 255);
        assert_eq!(end, 9);
        assert!(buf.iter().any(|&p| p != 0));
    }
}
