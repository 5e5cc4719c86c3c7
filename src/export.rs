use std::path::Path;

use glam::Vec3;
use image::{ImageBuffer, Rgb as Pixel, RgbImage};

use crate::color::Rgb;
use crate::error::Result;
use crate::render::raster::Framebuffer;
use crate::render::scene::TREE_COLOR;
use crate::terrain::SEA_LEVEL;
use crate::village::VillageWorld;
use crate::water::{WATER_COLOR, WATER_OPACITY};

const HOUSE_MARKER_COLOR: u32 = 0xc0392b;

/// Render a top-down map of the village terrain.
///
/// Each terrain vertex becomes a `scale` x `scale` block shaded by its vertex
/// normal. Ground below sea level is tinted with the water color, then trees
/// get a one pixel marker and houses a 3x3 one.
pub fn render_village_map(world: &VillageWorld, scale: usize) -> RgbImage {
    let terrain = &world.terrain;
    let scale = scale.max(1);
    let n = terrain.segments + 1;
    let side = (n * scale) as u32;
    let mut img: RgbImage = ImageBuffer::new(side, side);

    // Light from the northwest, elevated
    let light_dir = Vec3::new(-1.0, 2.0, -1.0).normalize();
    let normals = terrain.vertex_normals();
    let water = Rgb::from_hex(WATER_COLOR);

    for j in 0..n {
        for i in 0..n {
            let normal = *normals.get(i, j);
            let diffuse = normal.dot(light_dir).max(0.0);
            let ambient = 0.4;
            let shade = ambient + (1.0 - ambient) * diffuse;

            let mut color = terrain.colors.get(i, j).scale(shade);
            if *terrain.heights.get(i, j) < SEA_LEVEL {
                color = color.lerp(water, WATER_OPACITY);
            }
            let px = Pixel(color.clamped().to_rgb8());
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel((i * scale + dx) as u32, (j * scale + dy) as u32, px);
                }
            }
        }
    }

    let to_pixel = |x: f32, z: f32| -> (i64, i64) {
        let half = terrain.size / 2.0;
        let u = (x + half) / terrain.size;
        let v = (z + half) / terrain.size;
        let max = side as f32 - 1.0;
        ((u * max).round() as i64, (v * max).round() as i64)
    };

    let tree = Pixel(Rgb::from_hex(TREE_COLOR).scale(0.7).to_rgb8());
    for instance in &world.trees {
        let (x, y) = to_pixel(instance.position.x, instance.position.z);
        put_clipped(&mut img, x, y, tree);
    }

    let house = Pixel(Rgb::from_hex(HOUSE_MARKER_COLOR).to_rgb8());
    for instance in &world.houses.instances {
        let (x, y) = to_pixel(instance.position.x, instance.position.z);
        for dy in -1..=1 {
            for dx in -1..=1 {
                put_clipped(&mut img, x + dx, y + dy, house);
            }
        }
    }

    img
}

fn put_clipped(img: &mut RgbImage, x: i64, y: i64, px: Pixel<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, px);
    }
}

/// Export the top-down village map as a PNG.
pub fn export_village_map(world: &VillageWorld, path: &Path, scale: usize) -> Result<()> {
    render_village_map(world, scale).save(path)?;
    Ok(())
}

/// Save the current frame as an image; the format follows the extension.
pub fn save_screenshot(fb: &Framebuffer, path: &Path) -> Result<()> {
    fb.to_image().save(path)?;
    Ok(())
}
