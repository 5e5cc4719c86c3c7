//! Heightmap terrain for the village worlds.
//!
//! The ground is a square plane in XZ centred on the origin. Heights come from
//! two octaves of simplex noise with the middle of the map pressed flat for the
//! village site. Colors are picked per vertex from height bands.

use glam::Vec3;
use noise::{NoiseFn, Simplex};
use rand::Rng;
use rayon::prelude::*;

use crate::color::Rgb;
use crate::grid::Grid;
use crate::mesh::grid_triangles;

/// Water surface height.
pub const SEA_LEVEL: f32 = 2.5;
/// Plane subdivisions per side.
pub const DEFAULT_SEGMENTS: usize = 150;

const ZOOM: f64 = 0.005;
const BASE_AMPLITUDE: f64 = 30.0;
const DETAIL_AMPLITUDE: f64 = 5.0;
const DETAIL_FREQUENCY: f64 = 4.0;
const FLAT_RADIUS: f32 = 150.0;
const MIN_ELEVATION: f32 = -10.0;
const COLOR_JITTER: f32 = 0.05;

/// Elevation sampler.
pub struct Elevation {
    noise: Simplex,
}

impl Elevation {
    pub fn new(seed: u32) -> Self {
        Self { noise: Simplex::new(seed) }
    }

    /// Terrain height at world position (x, z).
    pub fn elevation(&self, x: f32, z: f32) -> f32 {
        let (xf, zf) = (x as f64, z as f64);
        let base = self.noise.get([xf * ZOOM, zf * ZOOM]) * BASE_AMPLITUDE;
        let detail = self.noise.get([
            xf * ZOOM * DETAIL_FREQUENCY,
            zf * ZOOM * DETAIL_FREQUENCY,
        ]) * DETAIL_AMPLITUDE;

        // press the centre toward half height for the village site
        let dist = (x * x + z * z).sqrt();
        let flatten = (1.0 - dist / FLAT_RADIUS).max(0.0);

        ((base + detail) as f32).max(MIN_ELEVATION) * (1.0 - flatten * 0.5)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Biome {
    Sand,
    #[default]
    Grass,
    Rock,
    Snow,
}

impl Biome {
    pub const ALL: [Biome; 4] = [Biome::Sand, Biome::Grass, Biome::Rock, Biome::Snow];

    pub fn from_height(y: f32) -> Self {
        if y < 3.0 {
            Biome::Sand
        } else if y < 30.0 {
            Biome::Grass
        } else if y < 60.0 {
            Biome::Rock
        } else {
            Biome::Snow
        }
    }

    pub fn color(self) -> Rgb {
        Rgb::from_hex(match self {
            Biome::Sand => 0xeebb88,
            Biome::Grass => 0x55aa55,
            Biome::Rock => 0x666666,
            Biome::Snow => 0xffffff,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Biome::Sand => "sand",
            Biome::Grass => "grass",
            Biome::Rock => "rock",
            Biome::Snow => "snow",
        }
    }
}

/// Vertex-colored heightfield mesh.
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    pub size: f32,
    pub segments: usize,
    pub heights: Grid<f32>,
    pub biomes: Grid<Biome>,
    pub colors: Grid<Rgb>,
    pub triangles: Vec<[u32; 3]>,
}

impl TerrainMesh {
    pub fn generate<R: Rng>(size: f32, segments: usize, elevation: &Elevation, rng: &mut R) -> Self {
        let segments = segments.max(1);
        let n = segments + 1;
        let step = size / segments as f32;
        let half = size / 2.0;

        let mut heights = Grid::new_with(n, n, 0.0f32);
        heights
            .as_mut_slice()
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, h)| {
                let x = -half + (idx % n) as f32 * step;
                let z = -half + (idx / n) as f32 * step;
                *h = elevation.elevation(x, z);
            });

        let mut biomes = Grid::new(n, n);
        let mut colors = Grid::new_with(n, n, Rgb::BLACK);
        for j in 0..n {
            for i in 0..n {
                let biome = Biome::from_height(*heights.get(i, j));
                let jitter = (rng.gen::<f32>() - 0.5) * COLOR_JITTER;
                biomes.set(i, j, biome);
                colors.set(i, j, biome.color().offset_hsl(0.0, 0.0, jitter));
            }
        }

        Self {
            size,
            segments,
            heights,
            biomes,
            colors,
            triangles: grid_triangles(segments),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.heights.len()
    }

    fn step(&self) -> f32 {
        self.size / self.segments as f32
    }

    /// World position of grid vertex (i, j).
    pub fn position(&self, i: usize, j: usize) -> Vec3 {
        let half = self.size / 2.0;
        let step = self.step();
        Vec3::new(-half + i as f32 * step, *self.heights.get(i, j), -half + j as f32 * step)
    }

    pub fn vertex(&self, index: u32) -> Vec3 {
        let n = self.segments + 1;
        let index = index as usize;
        self.position(index % n, index / n)
    }

    fn vertex_color(&self, index: u32) -> Rgb {
        self.colors.as_slice()[index as usize]
    }

    pub fn triangle(&self, t: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[t];
        [self.vertex(a), self.vertex(b), self.vertex(c)]
    }

    pub fn face_normal(&self, t: usize) -> Vec3 {
        let [a, b, c] = self.triangle(t);
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Mean of the three vertex colors, for flat shading.
    pub fn face_color(&self, t: usize) -> Rgb {
        let [a, b, c] = self.triangles[t];
        self.vertex_color(a)
            .add(self.vertex_color(b))
            .add(self.vertex_color(c))
            .scale(1.0 / 3.0)
    }

    /// Per-vertex normals, averaged from the adjacent faces.
    pub fn vertex_normals(&self) -> Grid<Vec3> {
        let n = self.segments + 1;
        let mut normals = Grid::new_with(n, n, Vec3::ZERO);
        for (t, tri) in self.triangles.iter().enumerate() {
            let [a, b, c] = self.triangle(t);
            // area-weighted
            let face = (b - a).cross(c - a);
            for &idx in tri {
                normals.as_mut_slice()[idx as usize] += face;
            }
        }
        for normal in normals.as_mut_slice() {
            let unit = normal.normalize_or_zero();
            *normal = if unit == Vec3::ZERO { Vec3::Y } else { unit };
        }
        normals
    }

    /// Height at a world position, bilinear between grid vertices.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let half = self.size / 2.0;
        let step = self.step();
        let fx = ((x + half) / step).clamp(0.0, self.segments as f32);
        let fz = ((z + half) / step).clamp(0.0, self.segments as f32);
        let i0 = (fx.floor() as usize).min(self.segments - 1);
        let j0 = (fz.floor() as usize).min(self.segments - 1);
        let tx = fx - i0 as f32;
        let tz = fz - j0 as f32;

        let h00 = *self.heights.get(i0, j0);
        let h10 = *self.heights.get(i0 + 1, j0);
        let h01 = *self.heights.get(i0, j0 + 1);
        let h11 = *self.heights.get(i0 + 1, j0 + 1);
        let top = h00 + (h10 - h00) * tx;
        let bottom = h01 + (h11 - h01) * tx;
        top + (bottom - top) * tz
    }

    /// Fraction of vertices in each biome, in `Biome::ALL` order.
    pub fn biome_fractions(&self) -> [f32; 4] {
        let mut counts = [0usize; 4];
        for &biome in self.biomes.as_slice() {
            counts[biome as usize] += 1;
        }
        let total = self.biomes.len().max(1) as f32;
        counts.map(|c| c as f32 / total)
    }

    pub fn height_range(&self) -> (f32, f32) {
        self.heights
            .as_slice()
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_biome_bands() {
        assert_eq!(Biome::from_height(-5.0), Biome::Sand);
        assert_eq!(Biome::from_height(2.99), Biome::Sand);
        assert_eq!(Biome::from_height(3.0), Biome::Grass);
        assert_eq!(Biome::from_height(29.9), Biome::Grass);
        assert_eq!(Biome::from_height(30.0), Biome::Rock);
        assert_eq!(Biome::from_height(60.0), Biome::Snow);
    }

    #[test]
    fn test_elevation_is_deterministic() {
        let a = Elevation::new(123);
        let b = Elevation::new(123);
        for &(x, z) in &[(0.0, 0.0), (120.5, -33.0), (-290.0, 290.0)] {
            assert_eq!(a.elevation(x, z), b.elevation(x, z));
        }
    }

    #[test]
    fn test_elevation_bounds() {
        let elevation = Elevation::new(7);
        // |base + detail| stays near 35, floor at -10, flattening only shrinks magnitude
        for i in 0..200 {
            let x = (i as f32 * 37.0) % 600.0 - 300.0;
            let z = (i as f32 * 91.0) % 600.0 - 300.0;
            let y = elevation.elevation(x, z);
            assert!(y >= MIN_ELEVATION - 1e-3, "y = {y}");
            assert!(y <= 40.0, "y = {y}");
        }
    }

    #[test]
    fn test_centre_is_flattened() {
        let elevation = Elevation::new(99);
        let noise = Simplex::new(99);
        let raw = (noise.get([0.0, 0.0]) * BASE_AMPLITUDE + noise.get([0.0, 0.0]) * DETAIL_AMPLITUDE)
            as f32;
        let expected = raw.max(MIN_ELEVATION) * 0.5;
        assert!((elevation.elevation(0.0, 0.0) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_mesh_layout() {
        let elevation = Elevation::new(5);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mesh = TerrainMesh::generate(600.0, 10, &elevation, &mut rng);
        assert_eq!(mesh.vertex_count(), 121);
        assert_eq!(mesh.triangles.len(), 200);

        let corner = mesh.position(0, 0);
        assert_eq!((corner.x, corner.z), (-300.0, -300.0));
        assert_eq!(corner.y, elevation.elevation(-300.0, -300.0));

        let far = mesh.position(10, 10);
        assert!((far.x - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_biomes_follow_heights() {
        let elevation = Elevation::new(11);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mesh = TerrainMesh::generate(600.0, 30, &elevation, &mut rng);
        for (i, j, &h) in mesh.heights.iter() {
            assert_eq!(*mesh.biomes.get(i, j), Biome::from_height(h));
        }
        let total: f32 = mesh.biome_fractions().iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_color_jitter_stays_small() {
        let elevation = Elevation::new(3);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mesh = TerrainMesh::generate(600.0, 20, &elevation, &mut rng);
        for (i, j, color) in mesh.colors.iter() {
            let base = mesh.biomes.get(i, j).color();
            let dl = (color.to_hsl().2 - base.to_hsl().2).abs();
            assert!(dl <= COLOR_JITTER / 2.0 + 1e-3);
        }
    }

    #[test]
    fn test_normals_face_up() {
        let elevation = Elevation::new(8);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mesh = TerrainMesh::generate(600.0, 20, &elevation, &mut rng);
        assert!(mesh.vertex_normals().as_slice().iter().all(|n| n.y > 0.0));
        assert!((0..mesh.triangles.len()).all(|t| mesh.face_normal(t).y > 0.0));
    }

    #[test]
    fn test_height_at_matches_vertices() {
        let elevation = Elevation::new(21);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mesh = TerrainMesh::generate(600.0, 12, &elevation, &mut rng);
        let p = mesh.position(4, 7);
        assert!((mesh.height_at(p.x, p.z) - p.y).abs() < 1e-3);
    }
}
