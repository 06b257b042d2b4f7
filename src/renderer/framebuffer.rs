//! Software presentation surface
//!
//! A plain RGB pixel buffer that implements [`Renderer`]. Sprites are
//! registered by the host under their [`SpriteId`] and blitted with
//! nearest-neighbour scaling. Pixels matching the colour key are skipped.

use std::collections::HashMap;
use std::io::{self, Write};

use glam::IVec2;

use super::surface::{Renderer, Rgb, SpriteId, SpriteRef};

/// Host-supplied sprite pixels
#[derive(Debug, Clone)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb>,
    /// Pixels of this colour are transparent
    pub color_key: Option<Rgb>,
}

impl SpriteImage {
    /// Build an image by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgb) -> Self {
        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
            color_key: None,
        }
    }

    pub fn with_color_key(mut self, key: Rgb) -> Self {
        self.color_key = Some(key);
        self
    }

    #[inline]
    fn texel(&self, x: u32, y: u32) -> Option<Rgb> {
        let px = *self.pixels.get((y * self.width + x) as usize)?;
        if self.color_key == Some(px) { None } else { Some(px) }
    }
}

/// RGB framebuffer for software rendering
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
    sprites: HashMap<SpriteId, SpriteImage>,
    /// Draws skipped because the sprite was never registered
    missing: u64,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; (width * height) as usize],
            sprites: HashMap::new(),
            missing: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn register(&mut self, id: SpriteId, image: SpriteImage) {
        self.sprites.insert(id, image);
    }

    pub fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Number of draws that referenced an unregistered sprite
    pub fn missing_draws(&self) -> u64 {
        self.missing
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Raw RGB bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Write the frame as a binary PPM (P6)
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        out.write_all(self.as_bytes())?;
        out.flush()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            Some((y as u32 * self.width + x as u32) as usize)
        } else {
            None
        }
    }
}

impl Renderer for Framebuffer {
    fn fill_row(&mut self, row: i32, color: Rgb, width_px: i32) {
        if row < 0 || row as u32 >= self.height || width_px <= 0 {
            return;
        }
        let start = (row as u32 * self.width) as usize;
        let len = (width_px as u32).min(self.width) as usize;
        self.pixels[start..start + len].fill(color);
    }

    fn draw_scaled_sprite(&mut self, sprite: SpriteRef, origin: IVec2, size: IVec2) {
        if size.x <= 0 || size.y <= 0 {
            return;
        }
        let Some(image) = self.sprites.get(&sprite.id) else {
            self.missing += 1;
            log::trace!("sprite {:?} not registered", sprite.id);
            return;
        };
        if image.width == 0 || image.height == 0 {
            return;
        }

        // Clip the destination rectangle to the screen
        let x0 = origin.x.max(0);
        let y0 = origin.y.max(0);
        let x1 = origin.x.saturating_add(size.x).min(self.width as i32);
        let y1 = origin.y.saturating_add(size.y).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for y in y0..y1 {
            let sy = match sprite.band {
                Some(band) => band % image.height,
                None => ((y - origin.y) as i64 * image.height as i64 / size.y as i64) as u32,
            };
            let row_start = (y as u32 * self.width) as usize;
            for x in x0..x1 {
                let sx = ((x - origin.x) as i64 * image.width as i64 / size.x as i64) as u32;
                if let Some(px) = image.texel(sx, sy) {
                    self.pixels[row_start + x as usize] = px;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_row_clips() {
        let mut fb = Framebuffer::new(8, 4);
        fb.fill_row(2, Rgb::WHITE, 100);
        fb.fill_row(-1, Rgb::RED, 8);
        fb.fill_row(4, Rgb::RED, 8);
        assert!((0..8).all(|x| fb.get_pixel(x, 2) == Some(Rgb::WHITE)));
        assert!((0..8).all(|x| fb.get_pixel(x, 1) == Some(Rgb::BLACK)));
    }

    #[test]
    fn test_sprite_scales_and_keys() {
        let mut fb = Framebuffer::new(8, 8);
        // Left column opaque red, right column transparent
        let img = SpriteImage::from_fn(2, 1, |x, _| if x == 0 { Rgb::RED } else { Rgb::MAGENTA })
            .with_color_key(Rgb::MAGENTA);
        fb.register(SpriteId(7), img);
        fb.draw_scaled_sprite(SpriteId(7).into(), IVec2::new(2, 2), IVec2::new(4, 2));
        assert_eq!(fb.get_pixel(2, 2), Some(Rgb::RED));
        assert_eq!(fb.get_pixel(3, 3), Some(Rgb::RED));
        assert_eq!(fb.get_pixel(4, 2), Some(Rgb::BLACK));
        assert_eq!(fb.get_pixel(2, 4), Some(Rgb::BLACK));
    }

    #[test]
    fn test_banded_sprite_samples_one_row() {
        let mut fb = Framebuffer::new(4, 2);
        let img = SpriteImage::from_fn(1, 3, |_, y| Rgb::new(y as u8, 0, 0));
        fb.register(SpriteId(0), img);
        fb.draw_scaled_sprite(SpriteRef::band(SpriteId(0), 5), IVec2::new(0, 1), IVec2::new(4, 1));
        assert!((0..4).all(|x| fb.get_pixel(x, 1) == Some(Rgb::new(2, 0, 0))));
    }

    #[test]
    fn test_offscreen_and_missing_sprites() {
        let mut fb = Framebuffer::new(4, 4);
        fb.register(SpriteId(1), SpriteImage::from_fn(1, 1, |_, _| Rgb::WHITE));
        fb.draw_scaled_sprite(SpriteId(1).into(), IVec2::new(-10, -10), IVec2::new(5, 5));
        fb.draw_scaled_sprite(SpriteId(1).into(), IVec2::new(0, 0), IVec2::new(0, 3));
        assert!(fb.pixels().iter().all(|&p| p == Rgb::BLACK));
        fb.draw_scaled_sprite(SpriteId(9).into(), IVec2::ZERO, IVec2::ONE);
        assert_eq!(fb.missing_draws(), 1);
        // Partially visible
        fb.draw_scaled_sprite(SpriteId(1).into(), IVec2::new(-1, -1), IVec2::new(2, 2));
        assert_eq!(fb.get_pixel(0, 0), Some(Rgb::WHITE));
        assert_eq!(fb.get_pixel(1, 1), Some(Rgb::BLACK));
    }

    #[test]
    fn test_ppm_output() {
        let mut fb = Framebuffer::new(2, 1);
        fb.fill_row(0, Rgb::new(1, 2, 3), 2);
        let mut out = Vec::new();
        fb.write_ppm(&mut out).expect("write to vec");
        let header = b"P6\n2 1\n255\n";
        assert_eq!(&out[..header.len()], header);
        assert_eq!(&out[header.len()..], &[1, 2, 3, 1, 2, 3]);
    }
}
