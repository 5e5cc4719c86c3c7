//! Draws the demo worlds into a framebuffer.

use std::f32::consts::FRAC_PI_4;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::color::Rgb;
use crate::lighting::{Fog, SkyState};
use crate::mesh::Geometry;
use crate::race::{GameState, NeonRace, FLOOR_Y};
use crate::render::camera::Camera;
use crate::render::raster::{Fill, Framebuffer, Projector};
use crate::texture::Texture;
use crate::village::{VillageStyle, VillageWorld};

pub const TREE_COLOR: u32 = 0x2d6e32;
pub const CHIMNEY_COLOR: u32 = 0x7a4a3a;
const CLOUD_OPACITY: f32 = 0.8;
const SMOKE_COLOR: u32 = 0xbbbbbb;

/// Instances this foggy at their centre are skipped.
const FOG_CULL: f32 = 0.995;
/// Past this distance houses are drawn with their textures' mean color.
const TEXTURE_DETAIL_DISTANCE: f32 = 150.0;

/// Shared meshes for the village instances, built once.
pub struct VillageMeshes {
    pub tree: Geometry,
    pub house_body: Geometry,
    pub house_roof: Geometry,
    pub chimney: Geometry,
    pub cloud_bit: Geometry,
}

impl Default for VillageMeshes {
    fn default() -> Self {
        Self {
            tree: Geometry::cone(2.0, 8.0, 6).translate(Vec3::new(0.0, 4.0, 0.0)),
            house_body: Geometry::cuboid(4.0, 4.0, 4.0).translate(Vec3::new(0.0, 2.0, 0.0)),
            house_roof: Geometry::cone(3.5, 3.0, 4)
                .translate(Vec3::new(0.0, 5.5, 0.0))
                .rotate_y(FRAC_PI_4),
            chimney: Geometry::cuboid(0.6, 1.6, 0.6).translate(Vec3::new(1.0, 6.0, 0.0)),
            cloud_bit: Geometry::cuboid(1.0, 1.0, 1.0),
        }
    }
}

/// Camera the village viewer starts with.
pub fn village_camera(width: usize, height: usize) -> Camera {
    let mut camera = Camera::new(60.0, width as f32 / height as f32, 1.0, 1000.0);
    camera.position = Vec3::new(100.0, 100.0, 100.0);
    camera
}

/// Fixed chase camera behind the ship, looking down -Z.
pub fn race_camera(width: usize, height: usize) -> Camera {
    let mut camera = Camera::new(70.0, width as f32 / height as f32, 0.1, 1000.0);
    camera.position = Vec3::new(0.0, 3.0, 6.0);
    camera.target = Vec3::new(0.0, 3.0, 0.0);
    camera
}

fn projector_for(camera: &Camera, fb: &Framebuffer) -> Projector {
    Projector::new(camera.view(), camera.projection(), camera.near, fb.width, fb.height)
}

fn centroid(tri: &[Vec3; 3]) -> Vec3 {
    (tri[0] + tri[1] + tri[2]) / 3.0
}

fn normal_of(tri: &[Vec3; 3]) -> Vec3 {
    (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero()
}

/// Lit, fogged solid triangles for every face of `geometry` under `matrix`.
fn draw_lit_mesh(fb: &mut Framebuffer, p: &Projector, sky: &SkyState, geometry: &Geometry, matrix: &Mat4, albedo: Rgb) {
    let world = geometry.transformed(matrix);
    for t in 0..world.triangles.len() {
        let tri = world.triangle(t);
        let lit = sky.lighting.shade(albedo, normal_of(&tri));
        let color = sky.fog.apply(lit, p.view_distance(centroid(&tri)));
        fb.fill_triangle(p, tri, color);
    }
}

fn draw_textured_mesh(
    fb: &mut Framebuffer,
    p: &Projector,
    sky: &SkyState,
    geometry: &Geometry,
    matrix: &Mat4,
    texture: &Texture,
) {
    let world = geometry.transformed(matrix);
    for t in 0..world.triangles.len() {
        let tri = world.triangle(t);
        let fill = Fill::Textured {
            texture,
            light: sky.lighting.irradiance(normal_of(&tri)),
            fog: sky.fog.color(),
            fog_factor: sky.fog.factor(p.view_distance(centroid(&tri))),
        };
        fb.draw_triangle(p, tri, world.triangle_uvs(t), fill);
    }
}

fn visible(p: &Projector, fog: &Fog, position: Vec3, radius: f32) -> bool {
    let view = p.to_view(position);
    // behind the eye by more than the instance's size
    if view.z > radius {
        return false;
    }
    fog.factor((view.length() - radius).max(0.0)) < FOG_CULL
}

pub fn draw_village(world: &VillageWorld, meshes: &VillageMeshes, camera: &Camera, fb: &mut Framebuffer) {
    let sky = &world.sky;
    fb.clear(sky.background);
    let p = projector_for(camera, fb);

    // ground
    let terrain = &world.terrain;
    for t in 0..terrain.triangles.len() {
        let tri = terrain.triangle(t);
        let lit = sky.lighting.shade(terrain.face_color(t), terrain.face_normal(t));
        let color = sky.fog.apply(lit, p.view_distance(centroid(&tri)));
        fb.fill_triangle(&p, tri, color);
    }

    let tree_color = Rgb::from_hex(TREE_COLOR);
    for tree in &world.trees {
        if visible(&p, &sky.fog, tree.position, 8.0 * tree.scale.y) {
            draw_lit_mesh(fb, &p, sky, &meshes.tree, &tree.matrix(), tree_color);
        }
    }

    let chimney_color = Rgb::from_hex(CHIMNEY_COLOR);
    for house in &world.houses.instances {
        if !visible(&p, &sky.fog, house.position, 7.0 * house.scale.y) {
            continue;
        }
        let m = house.matrix();
        if p.view_distance(house.position) > TEXTURE_DETAIL_DISTANCE {
            draw_lit_mesh(fb, &p, sky, &meshes.house_body, &m, world.textures.wall.average());
            draw_lit_mesh(fb, &p, sky, &meshes.house_roof, &m, world.textures.roof.average());
        } else {
            draw_textured_mesh(fb, &p, sky, &meshes.house_body, &m, &world.textures.wall);
            draw_textured_mesh(fb, &p, sky, &meshes.house_roof, &m, &world.textures.roof);
        }
        if world.style == VillageStyle::Hamlet {
            draw_lit_mesh(fb, &p, sky, &meshes.chimney, &m, chimney_color);
        }
    }

    // translucent passes, back to front by layer
    let water = &world.water;
    for t in 0..water.geometry.triangles.len() {
        let tri = water.geometry.triangle(t);
        let lit = sky.lighting.shade(water.color, normal_of(&tri));
        let color = sky.fog.apply(lit, p.view_distance(centroid(&tri)));
        fb.draw_triangle(&p, tri, [Vec2::ZERO; 3], Fill::Blend { color, alpha: water.opacity });
    }

    for cloud in &world.clouds {
        if !visible(&p, &sky.fog, cloud.position, 12.0) {
            continue;
        }
        for bit in &cloud.bits {
            let box_world = meshes.cloud_bit.transformed(&cloud.bit_matrix(bit));
            for t in 0..box_world.triangles.len() {
                let tri = box_world.triangle(t);
                let color = sky.fog.apply(Rgb::WHITE, p.view_distance(centroid(&tri)));
                fb.draw_triangle(&p, tri, [Vec2::ZERO; 3], Fill::Blend { color, alpha: CLOUD_OPACITY });
            }
        }
    }

    if let Some(smoke) = &world.smoke {
        let smoke_color = Rgb::from_hex(SMOKE_COLOR).mul(sky.lighting.irradiance(Vec3::Y)).clamped();
        for particle in smoke.particles.iter() {
            let color = sky.fog.apply(smoke_color, p.view_distance(particle.position));
            fb.blend_point(&p, particle.position, particle.size, color, particle.alpha());
        }
    }
}

/// Meshes and colors for the race.
pub struct RaceMeshes {
    pub ship: Geometry,
    pub floor: Geometry,
}

impl Default for RaceMeshes {
    fn default() -> Self {
        Self {
            ship: Geometry::cone(0.5, 2.0, 4)
                .rotate_x(std::f32::consts::FRAC_PI_2)
                .rotate_y(FRAC_PI_4),
            floor: Geometry::plane(200.0, 200.0, 40).translate(Vec3::new(0.0, -0.6, 0.0)),
        }
    }
}

pub const GRID_CENTRE_COLOR: u32 = 0xff00ff;
pub const GRID_COLOR: u32 = 0x222222;
const FLOOR_COLOR: u32 = 0x110022;
const SHIP_BASE: u32 = 0x111111;
const SHIP_EMISSIVE: u32 = 0x00ffff;
const SHIP_EMISSIVE_INTENSITY: f32 = 0.8;
const OBSTACLE_EMISSIVE: u32 = 0xff3300;
const EXPLOSION_COLOR: u32 = 0xffaa33;

const GRID_SIZE: f32 = 200.0;
const GRID_DIVISIONS: usize = 50;
/// Long grid lines are split so fog can vary along them.
const GRID_SEGMENT: f32 = 10.0;

fn draw_fogged_line(fb: &mut Framebuffer, p: &Projector, fog: &Fog, from: Vec3, to: Vec3, color: Rgb) {
    let pieces = ((to - from).length() / GRID_SEGMENT).ceil().max(1.0) as usize;
    for i in 0..pieces {
        let a = from.lerp(to, i as f32 / pieces as f32);
        let b = from.lerp(to, (i + 1) as f32 / pieces as f32);
        let c = fog.apply(color, p.view_distance((a + b) * 0.5));
        fb.draw_line(p, a, b, c);
    }
}

pub fn draw_race(race: &NeonRace, meshes: &RaceMeshes, camera: &Camera, fb: &mut Framebuffer) {
    let sky = SkyState::neon();
    fb.clear(sky.background);
    let p = projector_for(camera, fb);

    let floor_color = Rgb::from_hex(FLOOR_COLOR);
    for t in 0..meshes.floor.triangles.len() {
        let tri = meshes.floor.triangle(t);
        let color = sky.fog.apply(floor_color, p.view_distance(centroid(&tri)));
        fb.fill_triangle(&p, tri, color);
    }

    // the grid scrolls with the world
    let half = GRID_SIZE / 2.0;
    let spacing = GRID_SIZE / GRID_DIVISIONS as f32;
    for i in 0..=GRID_DIVISIONS {
        let k = -half + i as f32 * spacing;
        let color = Rgb::from_hex(if i == GRID_DIVISIONS / 2 { GRID_CENTRE_COLOR } else { GRID_COLOR });
        let z = k + race.floor_z;
        draw_fogged_line(fb, &p, &sky.fog, Vec3::new(-half, FLOOR_Y, z), Vec3::new(half, FLOOR_Y, z), color);
        let (z0, z1) = (-half + race.floor_z, half + race.floor_z);
        draw_fogged_line(fb, &p, &sky.fog, Vec3::new(k, FLOOR_Y, z0), Vec3::new(k, FLOOR_Y, z1), color);
    }

    let obstacle_color = Rgb::from_hex(OBSTACLE_EMISSIVE);
    for obstacle in &race.obstacles {
        let geo = Geometry::cuboid(1.0, obstacle.height, 1.0).translate(obstacle.position());
        for t in 0..geo.triangles.len() {
            let tri = geo.triangle(t);
            let color = sky.fog.apply(obstacle_color, p.view_distance(centroid(&tri)));
            fb.fill_triangle(&p, tri, color);
        }
    }

    if race.player.visible {
        let player = &race.player;
        let m = Mat4::from_rotation_translation(
            Quat::from_euler(EulerRot::XYZ, 0.0, player.rotation_y, player.rotation_z),
            player.position(),
        );
        let ship = meshes.ship.transformed(&m);
        let emissive = Rgb::from_hex(SHIP_EMISSIVE).scale(SHIP_EMISSIVE_INTENSITY);
        let base = Rgb::from_hex(SHIP_BASE);
        for t in 0..ship.triangles.len() {
            let tri = ship.triangle(t);
            let lit = sky.lighting.shade(base, normal_of(&tri)).add(emissive).clamped();
            fb.fill_triangle(&p, tri, sky.fog.apply(lit, p.view_distance(centroid(&tri))));
        }
    }

    let particle_color = match race.state {
        GameState::GameOver { .. } => Rgb::from_hex(EXPLOSION_COLOR),
        _ => Rgb::from_hex(SHIP_EMISSIVE),
    };
    for particle in race.particles.iter() {
        let color = particle_color.lerp(Rgb::from_hex(GRID_CENTRE_COLOR), 1.0 - particle.life_fraction());
        fb.blend_point(&p, particle.position, particle.size, color, particle.alpha() * 2.0);
    }
}
