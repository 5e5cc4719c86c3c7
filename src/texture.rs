//! Procedural 64x64 textures painted in code, so the demos ship no image files.

use image::{Rgb as Pixel, RgbImage};
use rand::Rng;

use crate::color::Rgb;

pub const TEXTURE_SIZE: u32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureKind {
    Roof,
    Wall,
    Grass,
}

/// A repeat-wrapped RGB texture.
#[derive(Clone, Debug)]
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    pub fn generate<R: Rng>(kind: TextureKind, rng: &mut R) -> Self {
        let (base, accent) = match kind {
            TextureKind::Roof => (0x8a4b32, 0x6e3b28),
            TextureKind::Wall => (0xe0d6c5, 0xd1c4b0),
            TextureKind::Grass => (0x4caf50, 0x388e3c),
        };
        let mut image = RgbImage::from_pixel(TEXTURE_SIZE, TEXTURE_SIZE, hex_pixel(base));
        let accent = hex_pixel(accent);

        match kind {
            // tile seams
            TextureKind::Roof => {
                for _ in 0..10 {
                    let x = rng.gen_range(0..TEXTURE_SIZE);
                    fill_rect(&mut image, x, 0, 4, TEXTURE_SIZE, accent);
                }
            }
            TextureKind::Wall | TextureKind::Grass => {
                let specks = if kind == TextureKind::Wall { 20 } else { 40 };
                for _ in 0..specks {
                    let x = rng.gen_range(0..TEXTURE_SIZE);
                    let y = rng.gen_range(0..TEXTURE_SIZE);
                    fill_rect(&mut image, x, y, 2, 2, accent);
                }
            }
        }

        Self { image }
    }

    /// Sample with repeat wrapping; `v = 0` is the bottom row.
    pub fn sample(&self, u: f32, v: f32) -> Rgb {
        let size = TEXTURE_SIZE as f32;
        let x = (u.rem_euclid(1.0) * size) as u32 % TEXTURE_SIZE;
        let y = ((1.0 - v.rem_euclid(1.0)) * size) as u32 % TEXTURE_SIZE;
        let [r, g, b] = self.image.get_pixel(x, y).0;
        Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Mean color, used when a surface is too small on screen to sample.
    pub fn average(&self) -> Rgb {
        let n = (TEXTURE_SIZE * TEXTURE_SIZE) as f32;
        let (r, g, b) = self.image.pixels().fold((0.0, 0.0, 0.0), |(r, g, b), p| {
            (r + p.0[0] as f32, g + p.0[1] as f32, b + p.0[2] as f32)
        });
        Rgb::new(r / n / 255.0, g / n / 255.0, b / n / 255.0)
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

/// The textures used by the village generators.
#[derive(Clone, Debug)]
pub struct TextureSet {
    pub roof: Texture,
    pub wall: Texture,
    pub grass: Texture,
}

impl TextureSet {
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        Self {
            roof: Texture::generate(TextureKind::Roof, rng),
            wall: Texture::generate(TextureKind::Wall, rng),
            grass: Texture::generate(TextureKind::Grass, rng),
        }
    }
}

fn hex_pixel(hex: u32) -> Pixel<u8> {
    Pixel([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8])
}

/// Fill a rectangle, clipped to the image.
fn fill_rect(image: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Pixel<u8>) {
    for py in y..(y + h).min(image.height()) {
        for px in x..(x + w).min(image.width()) {
            image.put_pixel(px, py, color);
        }
    }
}
