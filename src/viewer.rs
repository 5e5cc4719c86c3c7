use std::path::{Path, PathBuf};

use chrono::Local;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::config::WorldConfig;
use crate::error::Result;
use crate::export;
use crate::render::camera::OrbitControls;
use crate::render::raster::Framebuffer;
use crate::render::scene::{self, VillageMeshes};
use crate::village::{VillageStyle, VillageWorld};

pub const WINDOW_WIDTH: usize = 960;
pub const WINDOW_HEIGHT: usize = 600;
/// Scroll wheel units to radius factor.
const ZOOM_PER_SCROLL: f32 = 0.1;

fn title(world: &VillageWorld) -> String {
    format!(
        "Low-poly village [{}] - seed {} - N: day/night, R: regenerate, P: screenshot, Esc: exit",
        world.time_of_day.label(),
        world.seeds.master
    )
}

fn screenshot_path(dir: &Path) -> PathBuf {
    dir.join(format!("village_{}.png", Local::now().format("%Y%m%d_%H%M%S")))
}

/// Run the interactive village viewer.
/// Drag to orbit, scroll to zoom, N toggles day and night, R regenerates,
/// P saves a screenshot into `screenshot_dir`, Escape exits.
pub fn run_viewer(config: WorldConfig, style: VillageStyle, screenshot_dir: &Path) -> Result<()> {
    let mut world = VillageWorld::new(config, style);
    info!(seeds = %world.seeds, "World ready: {}", world.stats());

    let mut window = Window::new(
        &title(&world),
        WINDOW_WIDTH,
        WINDOW_HEIGHT,
        WindowOptions {
            resize: false,
            scale: minifb::Scale::X1,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(60);

    let meshes = VillageMeshes::default();
    let mut camera = scene::village_camera(WINDOW_WIDTH, WINDOW_HEIGHT);
    let mut controls = OrbitControls::from_position(camera.position, camera.target);
    let mut fb = Framebuffer::new(WINDOW_WIDTH, WINDOW_HEIGHT);
    // regenerate draws new seeds from here, independent of the world seed
    let mut regen_rng = ChaCha8Rng::seed_from_u64(rand::random());
    let mut last_mouse: Option<(f32, f32)> = None;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let mut title_dirty = false;

        if window.is_key_pressed(Key::N, KeyRepeat::No) {
            world.toggle_time();
            title_dirty = true;
        }

        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            let seed = world.regenerate(&mut regen_rng);
            info!(seed, "Regenerated: {}", world.stats());
            title_dirty = true;
        }

        // Orbit with left drag
        if window.get_mouse_down(MouseButton::Left) {
            if let Some((mx, my)) = window.get_mouse_pos(MouseMode::Pass) {
                if let Some((lx, ly)) = last_mouse {
                    controls.rotate(mx - lx, my - ly, WINDOW_HEIGHT as f32);
                }
                last_mouse = Some((mx, my));
            }
        } else {
            last_mouse = None;
        }

        if let Some((_, scroll_y)) = window.get_scroll_wheel() {
            if scroll_y != 0.0 {
                controls.zoom(1.0 - scroll_y.signum() * ZOOM_PER_SCROLL);
            }
        }

        controls.update();
        controls.apply(&mut camera);

        world.update();
        if world.style == VillageStyle::Hamlet {
            // the sun moves continuously; the label may flip on its own
            title_dirty = true;
        }

        scene::draw_village(&world, &meshes, &camera, &mut fb);

        if window.is_key_pressed(Key::P, KeyRepeat::No) {
            let path = screenshot_path(screenshot_dir);
            match export::save_screenshot(&fb, &path) {
                Ok(()) => info!(path = %path.display(), "Saved screenshot"),
                Err(e) => warn!(path = %path.display(), "Failed to save screenshot: {}", e),
            }
        }

        if title_dirty {
            window.set_title(&title(&world));
        }
        window.update_with_buffer(fb.pixels(), WINDOW_WIDTH, WINDOW_HEIGHT)?;
    }

    info!("Viewer closed");
    Ok(())
}

/// Render one frame from the starting camera without opening a window.
pub fn render_still(world: &VillageWorld, width: usize, height: usize) -> Framebuffer {
    let camera = scene::village_camera(width, height);
    let mut fb = Framebuffer::new(width, height);
    scene::draw_village(world, &VillageMeshes::default(), &camera, &mut fb);
    fb
}
