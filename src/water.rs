//! Sea plane. The classic village uses a flat sheet; the hamlet animates it
//! with a few summed sine waves every frame.

use glam::Vec3;

use crate::color::Rgb;
use crate::mesh::Geometry;
use crate::terrain::SEA_LEVEL;

pub const WATER_COLOR: u32 = 0x22aaff;
pub const WATER_OPACITY: f32 = 0.6;

/// (direction x, direction z, wavelength, amplitude, speed)
const WAVES: [(f32, f32, f32, f32, f32); 2] = [
    (1.0, 0.3, 40.0, 0.25, 1.5),
    (-0.4, 1.0, 23.0, 0.15, 2.1),
];
const CHOP_AMPLITUDE: f32 = 0.08;

/// Wave displacement above sea level at (x, z) and time `t`.
pub fn wave_height(x: f32, z: f32, t: f32) -> f32 {
    let mut h = 0.0;
    for (dx, dz, wavelength, amplitude, speed) in WAVES {
        let len = (dx * dx + dz * dz).sqrt();
        let k = std::f32::consts::TAU / wavelength;
        let phase = (dx * x + dz * z) / len * k - speed * t;
        h += amplitude * phase.sin();
    }
    h + CHOP_AMPLITUDE * (x * 0.31 + t * 3.0).sin() * (z * 0.27 - t * 2.5).cos()
}

#[derive(Clone, Debug)]
pub struct Water {
    pub geometry: Geometry,
    pub color: Rgb,
    pub opacity: f32,
    pub animated: bool,
    /// Last time passed to `update`.
    pub time: f32,
}

impl Water {
    /// Two-triangle sheet at sea level.
    pub fn flat(size: f32) -> Self {
        Self::build(size, 1, false)
    }

    /// Subdivided sheet whose vertices follow `wave_height`.
    pub fn animated(size: f32, segments: u32) -> Self {
        let mut water = Self::build(size, segments, true);
        water.update(0.0);
        water
    }

    fn build(size: f32, segments: u32, animated: bool) -> Self {
        let geometry = Geometry::plane(size, size, segments).translate(Vec3::new(0.0, SEA_LEVEL, 0.0));
        Self {
            geometry,
            color: Rgb::from_hex(WATER_COLOR),
            opacity: WATER_OPACITY,
            animated,
            time: 0.0,
        }
    }

    /// Move the wave vertices to time `t`. Flat water ignores this.
    pub fn update(&mut self, t: f32) {
        self.time = t;
        if !self.animated {
            return;
        }
        for p in &mut self.geometry.positions {
            p.y = SEA_LEVEL + wave_height(p.x, p.z, t);
        }
    }
}
