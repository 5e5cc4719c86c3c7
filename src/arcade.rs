use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::RaceTuning;
use crate::error::Result;
use crate::race::NeonRace;
use crate::render::raster::Framebuffer;
use crate::render::scene::{self, RaceMeshes};

pub const WINDOW_WIDTH: usize = 960;
pub const WINDOW_HEIGHT: usize = 600;

/// Horizontal pointer position mapped to -1 (left edge) .. 1 (right edge).
pub fn normalized_pointer_x(x: f32, width: usize) -> f32 {
    ((x / width.max(1) as f32) * 2.0 - 1.0).clamp(-1.0, 1.0)
}

/// Run the race in a window.
/// Space starts or restarts, the mouse steers, Escape exits.
pub fn run_arcade(tuning: RaceTuning, seed: Option<u64>) -> Result<()> {
    let seed = seed.unwrap_or_else(rand::random);
    info!(seed, "Starting neon race");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let delta = tuning.frame_delta;
    let mut race = NeonRace::new(tuning);

    let mut window = Window::new(
        &race.status_line(),
        WINDOW_WIDTH,
        WINDOW_HEIGHT,
        WindowOptions {
            resize: false,
            scale: minifb::Scale::X1,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(60);

    let meshes = RaceMeshes::default();
    let camera = scene::race_camera(WINDOW_WIDTH, WINDOW_HEIGHT);
    let mut fb = Framebuffer::new(WINDOW_WIDTH, WINDOW_HEIGHT);
    let mut status = race.status_line();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if window.is_key_pressed(Key::Space, KeyRepeat::No) {
            race.start();
        }

        if let Some((mx, _)) = window.get_mouse_pos(MouseMode::Clamp) {
            race.on_pointer_move(normalized_pointer_x(mx, WINDOW_WIDTH));
        }

        // fixed step, independent of the real frame time
        race.update(delta, &mut rng);
        scene::draw_race(&race, &meshes, &camera, &mut fb);

        let line = race.status_line();
        if line != status {
            window.set_title(&line);
            status = line;
        }
        window.update_with_buffer(fb.pixels(), WINDOW_WIDTH, WINDOW_HEIGHT)?;
    }

    info!(score = race.score_display(), "Race window closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_normalization() {
        assert_eq!(normalized_pointer_x(0.0, 800), -1.0);
        assert_eq!(normalized_pointer_x(400.0, 800), 0.0);
        assert_eq!(normalized_pointer_x(800.0, 800), 1.0);
        assert_eq!(normalized_pointer_x(2000.0, 800), 1.0);
    }
}
