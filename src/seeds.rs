//! Seed management for village generation
//!
//! Every generation system gets its own seed derived from the master seed, so
//! changing how many trees are placed does not reshuffle the houses.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeds for all village generation systems.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Simplex noise for the heightmap
    pub terrain: u64,
    /// Per-vertex color jitter
    pub jitter: u64,
    /// Tree placement
    pub vegetation: u64,
    /// Cluster centres and house placement
    pub houses: u64,
    /// Cloud shapes and positions
    pub clouds: u64,
    /// Procedural roof/wall/grass textures
    pub textures: u64,
    /// Chimney smoke particles
    pub smoke: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            terrain: derive_seed(master, "terrain"),
            jitter: derive_seed(master, "jitter"),
            vegetation: derive_seed(master, "vegetation"),
            houses: derive_seed(master, "houses"),
            clouds: derive_seed(master, "clouds"),
            textures: derive_seed(master, "textures"),
            smoke: derive_seed(master, "smoke"),
        }
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: u64) -> WorldSeedsBuilder {
        WorldSeedsBuilder::new(master)
    }

    /// Seed for the simplex noise generator, which takes 32 bits.
    pub fn noise_seed(&self) -> u32 {
        (self.terrain ^ (self.terrain >> 32)) as u32
    }

    pub fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }
}

/// Builder for customizing individual seeds while deriving others from master
pub struct WorldSeedsBuilder {
    seeds: WorldSeeds,
}

impl WorldSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: WorldSeeds::from_master(master),
        }
    }

    /// Override the terrain seed
    pub fn terrain(mut self, seed: u64) -> Self {
        self.seeds.terrain = seed;
        self
    }

    /// Override the vegetation seed
    pub fn vegetation(mut self, seed: u64) -> Self {
        self.seeds.vegetation = seed;
        self
    }

    /// Override the houses seed
    pub fn houses(mut self, seed: u64) -> Self {
        self.seeds.houses = seed;
        self
    }

    /// Override the clouds seed
    pub fn clouds(mut self, seed: u64) -> Self {
        self.seeds.clouds = seed;
        self
    }

    pub fn build(self) -> WorldSeeds {
        self.seeds
    }
}

/// Derive a sub-seed from a master seed and a system name.
///
/// FNV-1a over the little-endian master and the name, then a splitmix64
/// finalizer. Fixed constants keep seeds stable across toolchains.
fn derive_seed(master: u64, system: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for &byte in master.to_le_bytes().iter().chain(system.as_bytes()) {
        h ^= byte as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    mix64(h)
}

fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, terrain: {}, jitter: {}, vegetation: {}, \
             houses: {}, clouds: {}, textures: {}, smoke: {} }}",
            self.master,
            self.terrain,
            self.jitter,
            self.vegetation,
            self.houses,
            self.clouds,
            self.textures,
            self.smoke,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        let a = WorldSeeds::from_master(123);
        let b = WorldSeeds::from_master(123);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_systems_get_different_seeds() {
        let seeds = WorldSeeds::from_master(123);
        assert_ne!(seeds.terrain, seeds.vegetation);
        assert_ne!(seeds.vegetation, seeds.houses);
        assert_ne!(seeds.houses, seeds.clouds);
    }

    #[test]
    fn test_builder_override() {
        let seeds = WorldSeeds::builder(123).houses(99).build();
        assert_eq!(seeds.houses, 99);
        assert_eq!(seeds.terrain, WorldSeeds::from_master(123).terrain);
    }

    #[test]
    fn test_derived_seeds_are_pinned() {
        // fixed values: a world seed must rebuild the same world on any toolchain
        assert_eq!(WorldSeeds::from_master(123).terrain, 17145117852536678699);
        assert_eq!(WorldSeeds::from_master(42).houses, 8571864685743105581);
    }
}
