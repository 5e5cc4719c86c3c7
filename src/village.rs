//! Procedural village worlds.
//!
//! Two generators share the terrain and placement code:
//! - `Classic`: flat sea, a day/night switch, drifting clouds.
//! - `Hamlet`: everything above plus animated waves, chimney smoke and a
//!   continuous sun cycle.

use rand::Rng;
use tracing::{debug, info};

use crate::config::WorldConfig;
use crate::lighting::{DayCycle, SkyState, TimeOfDay};
use crate::placement::{self, Cloud, HousePlacement, Instance};
use crate::seeds::WorldSeeds;
use crate::smoke::{SmokeSettings, SmokeSystem};
use crate::terrain::{Biome, Elevation, TerrainMesh, DEFAULT_SEGMENTS};
use crate::texture::TextureSet;
use crate::water::Water;

/// World time gained per animation frame.
pub const TIME_STEP: f32 = 0.005;
/// Clouds drift this far along +X every frame.
pub const CLOUD_DRIFT: f32 = 0.05;
/// Clouds past +CLOUD_WRAP reappear at -CLOUD_WRAP.
pub const CLOUD_WRAP: f32 = 300.0;
/// Simulation step for waves, smoke and the sun.
pub const FRAME_DT: f32 = 1.0 / 60.0;
/// Seeds handed out by `regenerate` are below this.
pub const REGENERATE_SEED_RANGE: u64 = 10_000;

const WATER_SEGMENTS: u32 = 64;
/// World time is slow (TIME_STEP per frame); waves run this much faster.
const WAVE_TIME_SCALE: f32 = 12.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VillageStyle {
    #[default]
    Classic,
    Hamlet,
}

impl std::str::FromStr for VillageStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(VillageStyle::Classic),
            "hamlet" => Ok(VillageStyle::Hamlet),
            other => Err(format!("unknown village style '{other}' (expected classic or hamlet)")),
        }
    }
}

/// Summary numbers for logs and the window title.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldStats {
    pub seed: u64,
    pub vertices: usize,
    pub trees: usize,
    pub houses: usize,
    pub clouds: usize,
    pub particles: usize,
    pub biome_fractions: [f32; 4],
    pub height_range: (f32, f32),
}

pub struct VillageWorld {
    pub config: WorldConfig,
    pub seeds: WorldSeeds,
    pub style: VillageStyle,
    pub elevation: Elevation,
    pub terrain: TerrainMesh,
    pub water: Water,
    pub trees: Vec<Instance>,
    pub houses: HousePlacement,
    pub clouds: Vec<Cloud>,
    pub textures: TextureSet,
    pub time_of_day: TimeOfDay,
    pub sky: SkyState,
    pub day_cycle: DayCycle,
    pub smoke: Option<SmokeSystem>,
    /// Accumulated world time.
    pub time: f32,
    frame_rng: rand_chacha::ChaCha8Rng,
}

/// Everything `generate_world` replaces.
struct Generated {
    terrain: TerrainMesh,
    water: Water,
    trees: Vec<Instance>,
    houses: HousePlacement,
    clouds: Vec<Cloud>,
    smoke: Option<SmokeSystem>,
}

fn generate(config: &WorldConfig, seeds: &WorldSeeds, elevation: &Elevation, style: VillageStyle) -> Generated {
    let size = config.world_size;
    info!(seed = seeds.master, size, style = ?style, "Generating world");

    info!("Generating terrain...");
    let mut jitter_rng = WorldSeeds::rng(seeds.jitter);
    let terrain = TerrainMesh::generate(size, DEFAULT_SEGMENTS, elevation, &mut jitter_rng);
    let (lo, hi) = terrain.height_range();
    debug!(vertices = terrain.vertex_count(), lo, hi, "Terrain ready");

    let water = match style {
        VillageStyle::Classic => Water::flat(size),
        VillageStyle::Hamlet => Water::animated(size, WATER_SEGMENTS),
    };

    info!("Placing trees...");
    let trees = placement::place_trees(config, elevation, &mut WorldSeeds::rng(seeds.vegetation));
    info!("Placing houses...");
    let houses = placement::place_houses(config, elevation, &mut WorldSeeds::rng(seeds.houses));
    let clouds = placement::place_clouds(&mut WorldSeeds::rng(seeds.clouds));

    let smoke = match style {
        VillageStyle::Classic => None,
        VillageStyle::Hamlet => Some(SmokeSystem::new(&houses.instances, SmokeSettings::default())),
    };

    info!(
        trees = trees.len(),
        tree_target = config.tree_count,
        houses = houses.instances.len(),
        house_target = config.house_count,
        clouds = clouds.len(),
        "World ready"
    );

    Generated {
        terrain,
        water,
        trees,
        houses,
        clouds,
        smoke,
    }
}

impl VillageWorld {
    pub fn new(config: WorldConfig, style: VillageStyle) -> Self {
        let seeds = WorldSeeds::from_master(config.seed);
        let elevation = Elevation::new(seeds.noise_seed());
        let textures = TextureSet::generate(&mut WorldSeeds::rng(seeds.textures));
        let day_cycle = DayCycle::default();
        let time_of_day = TimeOfDay::Day;
        let sky = match style {
            VillageStyle::Classic => SkyState::for_time(time_of_day),
            VillageStyle::Hamlet => day_cycle.sky(),
        };
        let generated = generate(&config, &seeds, &elevation, style);

        Self {
            frame_rng: WorldSeeds::rng(seeds.smoke),
            config,
            seeds,
            style,
            elevation,
            terrain: generated.terrain,
            water: generated.water,
            trees: generated.trees,
            houses: generated.houses,
            clouds: generated.clouds,
            textures,
            time_of_day,
            sky,
            day_cycle,
            smoke: generated.smoke,
            time: 0.0,
        }
    }

    /// Rebuild terrain, water and all instances from the current seeds.
    pub fn generate_world(&mut self) {
        let generated = generate(&self.config, &self.seeds, &self.elevation, self.style);
        self.terrain = generated.terrain;
        self.water = generated.water;
        self.trees = generated.trees;
        self.houses = generated.houses;
        self.clouds = generated.clouds;
        self.smoke = generated.smoke;
        self.frame_rng = WorldSeeds::rng(self.seeds.smoke);
    }

    /// Pick a fresh seed below `REGENERATE_SEED_RANGE` and rebuild.
    pub fn regenerate<R: Rng>(&mut self, rng: &mut R) -> u64 {
        let seed = rng.gen_range(0..REGENERATE_SEED_RANGE);
        self.reseed(seed);
        seed
    }

    /// Rebuild the world from an explicit seed.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.seeds = WorldSeeds::from_master(seed);
        self.elevation = Elevation::new(self.seeds.noise_seed());
        self.generate_world();
    }

    /// Flip between day and night. Returns the new label.
    pub fn toggle_time(&mut self) -> &'static str {
        match self.style {
            VillageStyle::Classic => {
                self.time_of_day = self.time_of_day.toggled();
                self.sky = SkyState::for_time(self.time_of_day);
            }
            VillageStyle::Hamlet => {
                self.day_cycle.skip_half();
                self.time_of_day = self.day_cycle.time_of_day();
                self.sky = self.day_cycle.sky();
            }
        }
        info!(time = self.time_of_day.label(), "Time of day changed");
        self.time_of_day.label()
    }

    /// Advance one animation frame.
    pub fn update(&mut self) {
        self.time += TIME_STEP;

        for cloud in &mut self.clouds {
            cloud.position.x += CLOUD_DRIFT;
            if cloud.position.x > CLOUD_WRAP {
                cloud.position.x = -CLOUD_WRAP;
            }
        }

        if self.style == VillageStyle::Hamlet {
            self.day_cycle.advance(FRAME_DT * 0.1);
            self.time_of_day = self.day_cycle.time_of_day();
            self.sky = self.day_cycle.sky();
            self.water.update(self.time * WAVE_TIME_SCALE);
            if let Some(smoke) = &mut self.smoke {
                smoke.update(FRAME_DT, &mut self.frame_rng);
            }
        }
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            seed: self.seeds.master,
            vertices: self.terrain.vertex_count(),
            trees: self.trees.len(),
            houses: self.houses.instances.len(),
            clouds: self.clouds.len(),
            particles: self.smoke.as_ref().map_or(0, |s| s.particle_count()),
            biome_fractions: self.terrain.biome_fractions(),
            height_range: self.terrain.height_range(),
        }
    }
}

impl std::fmt::Display for WorldStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "seed {} | {} vertices ({:.1}..{:.1}) | {} trees | {} houses | {} clouds",
            self.seed, self.vertices, self.height_range.0, self.height_range.1, self.trees, self.houses, self.clouds
        )?;
        if self.particles > 0 {
            write!(f, " | {} smoke", self.particles)?;
        }
        for (biome, fraction) in Biome::ALL.iter().zip(self.biome_fractions) {
            write!(f, " | {} {:.0}%", biome.name(), fraction * 100.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_config() -> WorldConfig {
        WorldConfig {
            seed: 123,
            world_size: 600.0,
            house_count: 40,
            tree_count: 100,
        }
    }

    #[test]
    fn test_world_generation_counts() {
        let world = VillageWorld::new(small_config(), VillageStyle::Classic);
        let stats = world.stats();
        assert_eq!(stats.vertices, (DEFAULT_SEGMENTS + 1) * (DEFAULT_SEGMENTS + 1));
        assert!(stats.trees <= 100);
        assert!(stats.houses <= 40);
        assert_eq!(stats.clouds, 30);
        assert!(world.smoke.is_none());
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = VillageWorld::new(small_config(), VillageStyle::Classic);
        let b = VillageWorld::new(small_config(), VillageStyle::Classic);
        assert_eq!(a.trees, b.trees);
        assert_eq!(a.houses.instances, b.houses.instances);
        assert_eq!(a.terrain.heights.as_slice(), b.terrain.heights.as_slice());
    }

    #[test]
    fn test_regenerate_changes_seed() {
        let mut world = VillageWorld::new(small_config(), VillageStyle::Classic);
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let seed = world.regenerate(&mut rng);
        assert!(seed < REGENERATE_SEED_RANGE);
        assert_eq!(world.config.seed, seed);
        assert_eq!(world.seeds, WorldSeeds::from_master(seed));

        // terrain comes from the new noise, not the old one
        let fresh = VillageWorld::new(WorldConfig { seed, ..small_config() }, VillageStyle::Classic);
        assert_eq!(world.terrain.heights.as_slice(), fresh.terrain.heights.as_slice());
        assert_eq!(world.elevation.elevation(37.0, -81.0), fresh.elevation.elevation(37.0, -81.0));
    }

    #[test]
    fn test_reseed_rebuilds_terrain() {
        let mut world = VillageWorld::new(small_config(), VillageStyle::Classic);
        let before = world.terrain.heights.as_slice().to_vec();
        world.reseed(4242);
        assert_ne!(world.terrain.heights.as_slice(), before.as_slice());
    }

    #[test]
    fn test_toggle_time_hamlet_skips_half_a_day() {
        let mut world = VillageWorld::new(small_config(), VillageStyle::Hamlet);
        assert_eq!(world.time_of_day, TimeOfDay::Day);
        let angle = world.day_cycle.angle;

        assert_eq!(world.toggle_time(), "Night");
        assert!((world.day_cycle.angle - (angle + std::f32::consts::PI)).abs() < 1e-4);
        assert_eq!(world.sky, world.day_cycle.sky());

        assert_eq!(world.toggle_time(), "Day");
        assert!((world.day_cycle.angle - angle).abs() < 1e-4);
        assert_eq!(world.sky, world.day_cycle.sky());
    }

    #[test]
    fn test_toggle_time_classic() {
        let mut world = VillageWorld::new(small_config(), VillageStyle::Classic);
        assert_eq!(world.toggle_time(), "Night");
        assert_eq!(world.sky, SkyState::night());
        assert_eq!(world.toggle_time(), "Day");
        assert_eq!(world.sky, SkyState::day());
    }

    #[test]
    fn test_clouds_drift_and_wrap() {
        let mut world = VillageWorld::new(small_config(), VillageStyle::Classic);
        world.clouds[0].position.x = CLOUD_WRAP - 0.01;
        let x1 = world.clouds[1].position.x;
        world.update();
        assert_eq!(world.clouds[0].position.x, -CLOUD_WRAP);
        if x1 + CLOUD_DRIFT <= CLOUD_WRAP {
            assert!((world.clouds[1].position.x - (x1 + CLOUD_DRIFT)).abs() < 1e-4);
        }
        assert!((world.time - TIME_STEP).abs() < 1e-7);
    }

    #[test]
    fn test_hamlet_animates() {
        let mut world = VillageWorld::new(small_config(), VillageStyle::Hamlet);
        assert!(world.water.animated);
        let before = world.water.geometry.positions[10].y;
        let angle = world.day_cycle.angle;
        for _ in 0..120 {
            world.update();
        }
        assert_ne!(world.water.geometry.positions[10].y, before);
        assert_ne!(world.day_cycle.angle, angle);
        if !world.houses.instances.is_empty() {
            assert!(world.stats().particles > 0);
        }
    }

    #[test]
    fn test_style_parse() {
        assert_eq!("hamlet".parse::<VillageStyle>(), Ok(VillageStyle::Hamlet));
        assert_eq!("Classic".parse::<VillageStyle>(), Ok(VillageStyle::Classic));
        assert!("castle".parse::<VillageStyle>().is_err());
    }
}
