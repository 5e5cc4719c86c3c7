//! Neon race: steer a ship left and right to dodge pillars that scroll toward you.
//!
//! The ship never moves forward. Obstacles and the floor grid slide toward
//! +Z by `speed * delta` each frame, and the speed keeps creeping up.

use glam::Vec3;
use rand::Rng;
use tracing::info;

use crate::config::RaceTuning;
use crate::particles::{Particle, ParticleForces, ParticlePool};

/// Ship hover height.
pub const PLAYER_Y: f32 = 0.5;
/// Engine point in ship-local space.
pub const ENGINE_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 1.0);
/// Floor grid sits just below the obstacles' bases.
pub const FLOOR_Y: f32 = -0.5;

const EXHAUST_PER_FRAME: usize = 2;
const EXHAUST_LIFETIME: f32 = 0.35;
const EXPLOSION_PARTICLES: usize = 120;
const EXPLOSION_LIFETIME: f32 = 1.2;
const MAX_PARTICLES: usize = 600;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameState {
    /// Waiting for the first start.
    Ready,
    Playing,
    GameOver { final_score: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub rotation_y: f32,
    pub rotation_z: f32,
    pub visible: bool,
}

impl Player {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, PLAYER_Y, 0.0)
    }
}

impl Default for Player {
    fn default() -> Self {
        Self {
            x: 0.0,
            rotation_y: 0.0,
            rotation_z: 0.0,
            visible: true,
        }
    }
}

/// A glowing pillar, 1 x `height` x 1, standing on the floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub z: f32,
    pub height: f32,
}

impl Obstacle {
    /// Centre height so the base rests at `FLOOR_Y`.
    pub fn y(&self) -> f32 {
        self.height / 2.0 + FLOOR_Y
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y(), self.z)
    }
}

pub struct NeonRace {
    pub tuning: RaceTuning,
    pub state: GameState,
    pub speed: f32,
    pub score: f32,
    /// Lateral position the ship is easing toward.
    pub target_x: f32,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    /// Scroll offset of the floor grid, in 0..floor_wrap.
    pub floor_z: f32,
    pub particles: ParticlePool,
}

impl NeonRace {
    pub fn new(tuning: RaceTuning) -> Self {
        Self {
            tuning,
            state: GameState::Ready,
            speed: 0.0,
            score: 0.0,
            target_x: 0.0,
            player: Player::default(),
            obstacles: Vec::new(),
            floor_z: 0.0,
            particles: ParticlePool::new(MAX_PARTICLES),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == GameState::Playing
    }

    /// Begin a run. Does nothing while a run is in progress.
    pub fn start(&mut self) -> bool {
        if self.is_playing() {
            return false;
        }
        self.state = GameState::Playing;
        self.score = 0.0;
        self.speed = self.tuning.start_speed;
        self.target_x = 0.0;
        self.player = Player::default();
        self.obstacles.clear();
        self.particles.clear();
        info!("Race started");
        true
    }

    /// Pointer moved; `normalized_x` is -1 at the left edge and 1 at the right.
    pub fn on_pointer_move(&mut self, normalized_x: f32) {
        if !self.is_playing() {
            return;
        }
        self.target_x = normalized_x.clamp(-1.0, 1.0) * self.tuning.lateral_range;
    }

    fn game_over<R: Rng>(&mut self, rng: &mut R) {
        let final_score = self.score_display();
        self.state = GameState::GameOver { final_score };
        self.player.visible = false;
        self.explode(rng);
        info!(final_score, "Game over");
    }

    fn spawn_obstacle<R: Rng>(&mut self, rng: &mut R) {
        let t = &self.tuning;
        let height = rng.gen_range(t.obstacle_height_min..t.obstacle_height_max);
        let x = (rng.gen::<f32>() - 0.5) * 2.0 * t.lateral_range;
        self.obstacles.push(Obstacle { x, z: t.spawn_z, height });
    }

    /// Chance an obstacle appears this frame.
    pub fn spawn_chance(&self) -> f32 {
        self.tuning.spawn_base_chance + self.speed * self.tuning.spawn_speed_chance
    }

    /// Advance one frame of `delta` seconds.
    pub fn update<R: Rng>(&mut self, delta: f32, rng: &mut R) {
        if !self.is_playing() {
            // let the explosion play out
            self.particles.step(delta, &ParticleForces::default());
            return;
        }

        self.speed += delta * self.tuning.acceleration;
        let step = self.speed * delta;
        self.score += step;

        self.steer();

        self.floor_z += step;
        if self.floor_z > self.tuning.floor_wrap {
            self.floor_z = 0.0;
        }

        if rng.gen::<f32>() < self.spawn_chance() {
            self.spawn_obstacle(rng);
        }

        let mut hit = false;
        for i in (0..self.obstacles.len()).rev() {
            let obstacle = &mut self.obstacles[i];
            obstacle.z += step;

            if obstacle.z > self.tuning.collision_z_min
                && obstacle.z < self.tuning.collision_z_max
                && (self.player.x - obstacle.x).abs() < self.tuning.collision_half_width
            {
                hit = true;
            }

            if obstacle.z > self.tuning.despawn_z {
                self.obstacles.remove(i);
            }
        }

        self.update_exhaust(delta, step, rng);

        if hit {
            self.game_over(rng);
        }
    }

    fn steer(&mut self) {
        let t = &self.tuning;
        self.player.x += (self.target_x - self.player.x) * t.steering_lerp;
        // bank toward the direction of travel
        let tilt = (self.player.x - self.target_x) * t.tilt_factor;
        self.player.rotation_z = tilt;
        self.player.rotation_y = -tilt * 0.5;
    }

    fn engine_position(&self) -> Vec3 {
        self.player.position() + ENGINE_OFFSET
    }

    fn update_exhaust<R: Rng>(&mut self, delta: f32, step: f32, rng: &mut R) {
        // exhaust is left behind in the scrolling world
        self.particles.offset(Vec3::new(0.0, 0.0, step));
        self.particles.step(delta, &ParticleForces::default());

        let engine = self.engine_position();
        for _ in 0..EXHAUST_PER_FRAME {
            let spread = Vec3::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5, 0.0) * 0.3;
            self.particles.spawn(Particle {
                position: engine + spread,
                velocity: Vec3::new(0.0, 0.0, 2.0) + spread,
                age: 0.0,
                lifetime: EXHAUST_LIFETIME,
                size: 0.25,
            });
        }
    }

    fn explode<R: Rng>(&mut self, rng: &mut R) {
        let origin = self.player.position();
        for _ in 0..EXPLOSION_PARTICLES {
            let dir = Vec3::new(
                rng.gen::<f32>() - 0.5,
                rng.gen::<f32>() - 0.5,
                rng.gen::<f32>() - 0.5,
            )
            .normalize_or_zero();
            let speed = 4.0 + rng.gen::<f32>() * 8.0;
            self.particles.spawn(Particle {
                position: origin,
                velocity: dir * speed,
                age: 0.0,
                lifetime: EXPLOSION_LIFETIME * (0.5 + rng.gen::<f32>() * 0.5),
                size: 0.3,
            });
        }
    }

    pub fn score_display(&self) -> u32 {
        self.score.floor().max(0.0) as u32
    }

    pub fn speed_display(&self) -> u32 {
        (self.speed * self.tuning.speed_display_factor).floor().max(0.0) as u32
    }

    /// One-line status for the window title.
    pub fn status_line(&self) -> String {
        match self.state {
            GameState::Ready => "NEON RACE - press Space to start".to_string(),
            GameState::Playing => format!(
                "NEON RACE - score {} - speed {} km/h",
                self.score_display(),
                self.speed_display()
            ),
            GameState::GameOver { final_score } => {
                format!("NEON RACE - crashed! final score {final_score} - Space to retry")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn playing() -> NeonRace {
        let mut race = NeonRace::new(RaceTuning::default());
        race.start();
        race
    }

    /// Tuning with no random spawns so tests control the obstacles.
    fn quiet_tuning() -> RaceTuning {
        RaceTuning {
            spawn_base_chance: 0.0,
            spawn_speed_chance: 0.0,
            ..RaceTuning::default()
        }
    }

    #[test]
    fn test_start_resets_state() {
        let mut race = NeonRace::new(RaceTuning::default());
        race.score = 99.0;
        race.obstacles.push(Obstacle { x: 0.0, z: -5.0, height: 2.0 });
        race.player.visible = false;
        assert!(race.start());
        assert_eq!(race.state, GameState::Playing);
        assert_eq!(race.speed, 40.0);
        assert_eq!(race.score, 0.0);
        assert!(race.obstacles.is_empty());
        assert!(race.player.visible);
        // ignored while already playing
        assert!(!race.start());
    }

    #[test]
    fn test_update_is_noop_before_start() {
        let mut race = NeonRace::new(RaceTuning::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        race.update(0.016, &mut rng);
        assert_eq!(race.score, 0.0);
        assert_eq!(race.speed, 0.0);
        assert!(race.obstacles.is_empty());
    }

    #[test]
    fn test_speed_and_score_progress() {
        let mut race = NeonRace::new(quiet_tuning());
        race.start();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        race.update(0.016, &mut rng);
        let expected_speed = 40.0 + 0.016 * 1.5;
        assert!((race.speed - expected_speed).abs() < 1e-5);
        assert!((race.score - expected_speed * 0.016).abs() < 1e-5);
        assert_eq!(race.speed_display(), 120);
    }

    #[test]
    fn test_pointer_sets_target_only_while_playing() {
        let mut race = NeonRace::new(RaceTuning::default());
        race.on_pointer_move(0.5);
        assert_eq!(race.target_x, 0.0);
        race.start();
        race.on_pointer_move(0.5);
        assert_eq!(race.target_x, 5.0);
        race.on_pointer_move(-3.0);
        assert_eq!(race.target_x, -10.0);
    }

    #[test]
    fn test_steering_eases_and_tilts() {
        let mut race = NeonRace::new(quiet_tuning());
        race.start();
        race.on_pointer_move(1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        race.update(0.016, &mut rng);
        assert!((race.player.x - 1.5).abs() < 1e-5);
        let tilt = (1.5 - 10.0) * 0.08;
        assert!((race.player.rotation_z - tilt).abs() < 1e-5);
        assert!((race.player.rotation_y + tilt * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_floor_wraps() {
        let mut race = NeonRace::new(quiet_tuning());
        race.start();
        race.floor_z = 9.9;
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        race.update(0.016, &mut rng);
        assert_eq!(race.floor_z, 0.0);
    }

    #[test]
    fn test_collision_ends_game() {
        let mut race = NeonRace::new(quiet_tuning());
        race.start();
        race.score = 123.7;
        race.obstacles.push(Obstacle { x: 0.5, z: 0.5, height: 2.0 });
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        race.update(0.016, &mut rng);
        assert!(matches!(race.state, GameState::GameOver { final_score: 124 }));
        assert!(!race.player.visible);
        assert!(race.particles.len() >= EXPLOSION_PARTICLES);
        race.on_pointer_move(1.0);
        assert_eq!(race.target_x, 0.0);
    }

    #[test]
    fn test_near_miss_is_not_a_hit() {
        let mut race = NeonRace::new(quiet_tuning());
        race.start();
        race.obstacles.push(Obstacle { x: 1.2, z: 0.5, height: 2.0 });
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        race.update(0.016, &mut rng);
        assert!(race.is_playing());
    }

    #[test]
    fn test_obstacles_behind_camera_are_removed() {
        let mut race = NeonRace::new(quiet_tuning());
        race.start();
        race.obstacles.push(Obstacle { x: 8.0, z: 9.9, height: 2.0 });
        race.obstacles.push(Obstacle { x: 8.0, z: -50.0, height: 2.0 });
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        race.update(0.016, &mut rng);
        assert_eq!(race.obstacles.len(), 1);
        assert!(race.obstacles[0].z < 0.0);
    }

    #[test]
    fn test_spawned_obstacles_follow_rules() {
        let tuning = RaceTuning {
            spawn_base_chance: 1.0,
            ..RaceTuning::default()
        };
        let mut race = NeonRace::new(tuning);
        race.start();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        race.update(0.016, &mut rng);
        assert_eq!(race.obstacles.len(), 1);
        let o = race.obstacles[0];
        assert!((1.0..4.0).contains(&o.height));
        assert!(o.x.abs() <= 10.0);
        // spawned this frame, then moved by one step
        assert!((o.z - (-100.0 + race.speed * 0.016)).abs() < 1e-4);
        assert!((o.y() - (o.height / 2.0 - 0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_exhaust_trails_behind_the_ship() {
        let mut race = NeonRace::new(quiet_tuning());
        race.start();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        race.update(0.016, &mut rng);

        assert_eq!(race.particles.len(), EXHAUST_PER_FRAME);
        let ship = race.player.position();
        for p in race.particles.iter() {
            // engine sits one unit behind the ship, toward the camera
            assert!((p.position.z - (ship.z + ENGINE_OFFSET.z)).abs() < 0.2);
            assert!((p.position.x - ship.x).abs() < 0.2);
            assert_eq!(p.lifetime, EXHAUST_LIFETIME);
        }
    }

    #[test]
    fn test_spawn_chance_grows_with_speed() {
        let mut race = playing();
        let slow = race.spawn_chance();
        race.speed = 200.0;
        assert!(race.spawn_chance() > slow);
        assert!((race.spawn_chance() - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_status_line() {
        let mut race = NeonRace::new(RaceTuning::default());
        assert!(race.status_line().contains("Space"));
        race.start();
        assert!(race.status_line().contains("score 0"));
    }
}
