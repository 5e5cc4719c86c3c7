//! Instance placement for trees, houses and clouds.
//!
//! Trees and houses use rejection sampling against height bands: draw a
//! candidate position, keep it if the terrain height there is acceptable, and
//! give up after a fixed number of attempts. Houses draw their candidates
//! around a handful of village centres so they form clusters.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Quat, Vec2, Vec3};
use rand::Rng;

use crate::config::WorldConfig;
use crate::terrain::Elevation;

/// Trees grow above the beach and below the tree line.
pub const TREE_HEIGHT_BAND: (f32, f32) = (3.5, 40.0);
/// Houses need dry, low ground.
pub const HOUSE_HEIGHT_BAND: (f32, f32) = (4.0, 20.0);

const TREE_ATTEMPTS_PER_TREE: usize = 3;
const HOUSE_ATTEMPTS_PER_HOUSE: usize = 5;
const CLUSTER_COUNT: usize = 5;
/// Cluster centres lie within this fraction of the world, centred.
const CLUSTER_SPREAD: f32 = 0.6;
/// Houses scatter within ±this around their cluster centre.
const CLUSTER_RADIUS: f32 = 50.0;

const CLOUD_COUNT: usize = 30;
const CLOUD_FIELD: f32 = 400.0;

/// One placed copy of a shared mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: Vec3,
    pub rotation_y: f32,
    pub scale: Vec3,
}

impl Instance {
    pub fn uniform(position: Vec3, rotation_y: f32, scale: f32) -> Self {
        Self {
            position,
            rotation_y,
            scale: Vec3::splat(scale),
        }
    }

    /// Scale, then rotate about Y, then translate.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_rotation_y(self.rotation_y),
            self.position,
        )
    }
}

fn in_band(y: f32, band: (f32, f32)) -> bool {
    y > band.0 && y < band.1
}

/// Scatter up to `config.tree_count` trees over the whole map.
pub fn place_trees<R: Rng>(config: &WorldConfig, elevation: &Elevation, rng: &mut R) -> Vec<Instance> {
    let count = config.tree_count;
    let size = config.world_size;
    let mut trees = Vec::with_capacity(count);

    for _ in 0..count * TREE_ATTEMPTS_PER_TREE {
        if trees.len() >= count {
            break;
        }
        let x = (rng.gen::<f32>() - 0.5) * size;
        let z = (rng.gen::<f32>() - 0.5) * size;
        let y = elevation.elevation(x, z);
        if !in_band(y, TREE_HEIGHT_BAND) {
            continue;
        }
        let scale = 0.5 + rng.gen::<f32>();
        let rotation = rng.gen::<f32>() * PI;
        trees.push(Instance::uniform(Vec3::new(x, y, z), rotation, scale));
    }

    trees
}

/// Houses placed around village centres.
#[derive(Clone, Debug, Default)]
pub struct HousePlacement {
    /// Village centres in XZ.
    pub clusters: Vec<Vec2>,
    /// Body and roof share each matrix.
    pub instances: Vec<Instance>,
}

pub fn place_houses<R: Rng>(config: &WorldConfig, elevation: &Elevation, rng: &mut R) -> HousePlacement {
    let count = config.house_count;
    let spread = config.world_size * CLUSTER_SPREAD;

    let clusters: Vec<Vec2> = (0..CLUSTER_COUNT)
        .map(|_| {
            Vec2::new(
                (rng.gen::<f32>() - 0.5) * spread,
                (rng.gen::<f32>() - 0.5) * spread,
            )
        })
        .collect();

    let mut instances = Vec::with_capacity(count);
    for _ in 0..count * HOUSE_ATTEMPTS_PER_HOUSE {
        if instances.len() >= count {
            break;
        }
        let centre = clusters[rng.gen_range(0..clusters.len())];
        let x = centre.x + (rng.gen::<f32>() - 0.5) * CLUSTER_RADIUS * 2.0;
        let z = centre.y + (rng.gen::<f32>() - 0.5) * CLUSTER_RADIUS * 2.0;
        let y = elevation.elevation(x, z);
        // no slope check, the band alone keeps houses off beaches and hills
        if !in_band(y, HOUSE_HEIGHT_BAND) {
            continue;
        }
        let rotation = rng.gen::<f32>() * TAU;
        let scale = 0.8 + rng.gen::<f32>() * 0.5;
        instances.push(Instance::uniform(Vec3::new(x, y, z), rotation, scale));
    }

    HousePlacement { clusters, instances }
}

/// A cloud is a loose clump of boxes.
#[derive(Clone, Debug)]
pub struct Cloud {
    pub position: Vec3,
    /// Box offsets and sizes relative to `position`.
    pub bits: Vec<CloudBit>,
}

#[derive(Clone, Copy, Debug)]
pub struct CloudBit {
    pub offset: Vec3,
    pub scale: Vec3,
}

impl Cloud {
    pub fn bit_matrix(&self, bit: &CloudBit) -> Mat4 {
        Mat4::from_scale_rotation_translation(bit.scale, Quat::IDENTITY, self.position + bit.offset)
    }
}

pub fn place_clouds<R: Rng>(rng: &mut R) -> Vec<Cloud> {
    (0..CLOUD_COUNT)
        .map(|_| {
            let bit_count = rng.gen_range(5..10);
            let bits = (0..bit_count)
                .map(|_| CloudBit {
                    offset: Vec3::new(
                        (rng.gen::<f32>() - 0.5) * 10.0,
                        (rng.gen::<f32>() - 0.5) * 2.0,
                        (rng.gen::<f32>() - 0.5) * 5.0,
                    ),
                    scale: Vec3::new(
                        4.0 + rng.gen::<f32>() * 4.0,
                        2.0 + rng.gen::<f32>() * 2.0,
                        4.0 + rng.gen::<f32>() * 4.0,
                    ),
                })
                .collect();
            let position = Vec3::new(
                (rng.gen::<f32>() - 0.5) * CLOUD_FIELD,
                60.0 + rng.gen::<f32>() * 30.0,
                (rng.gen::<f32>() - 0.5) * CLOUD_FIELD,
            );
            Cloud { position, bits }
        })
        .collect()
}
