//! Chimney smoke for the hamlet.

use glam::Vec3;
use rand::Rng;

use crate::particles::{Particle, ParticleForces, ParticlePool};
use crate::placement::Instance;

/// Chimney top in house-local space (the house mesh sits on y = 0).
pub const CHIMNEY_TOP: Vec3 = Vec3::new(1.0, 6.8, 0.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmokeEmitter {
    pub position: Vec3,
    /// Fractional particles owed from previous steps.
    accumulator: f32,
}

impl SmokeEmitter {
    pub fn at_house(house: &Instance) -> Self {
        Self {
            position: house.matrix().transform_point3(CHIMNEY_TOP),
            accumulator: 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SmokeSettings {
    /// Particles per second per chimney.
    pub rate: f32,
    pub lifetime: f32,
    pub rise_speed: f32,
    pub start_size: f32,
    pub max_emitters: usize,
    pub max_particles: usize,
    pub forces: ParticleForces,
}

impl Default for SmokeSettings {
    fn default() -> Self {
        Self {
            rate: 2.0,
            lifetime: 4.0,
            rise_speed: 2.0,
            start_size: 0.6,
            max_emitters: 60,
            max_particles: 800,
            forces: ParticleForces {
                acceleration: Vec3::new(0.0, 0.3, 0.0),
                wind: Vec3::new(0.8, 1.5, 0.3),
                drag: 0.4,
                growth: 0.7,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct SmokeSystem {
    pub settings: SmokeSettings,
    pub emitters: Vec<SmokeEmitter>,
    pub particles: ParticlePool,
}

impl SmokeSystem {
    /// One chimney each for the first `max_emitters` houses.
    pub fn new(houses: &[Instance], settings: SmokeSettings) -> Self {
        let emitters = houses
            .iter()
            .take(settings.max_emitters)
            .map(SmokeEmitter::at_house)
            .collect();
        let particles = ParticlePool::new(settings.max_particles);
        Self {
            settings,
            emitters,
            particles,
        }
    }

    pub fn update<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        self.particles.step(dt, &self.settings.forces);

        let s = &self.settings;
        for emitter in &mut self.emitters {
            emitter.accumulator += s.rate * dt;
            while emitter.accumulator >= 1.0 {
                emitter.accumulator -= 1.0;
                let jitter = Vec3::new(rng.gen::<f32>() - 0.5, 0.0, rng.gen::<f32>() - 0.5) * 0.3;
                let spawned = self.particles.spawn(Particle {
                    position: emitter.position + jitter,
                    velocity: Vec3::new(0.0, s.rise_speed, 0.0),
                    age: 0.0,
                    lifetime: s.lifetime * (0.8 + rng.gen::<f32>() * 0.4),
                    size: s.start_size,
                });
                if !spawned {
                    emitter.accumulator = 0.0;
                    break;
                }
            }
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }
}
