//! Simple CPU particle pool shared by chimney smoke and ship exhaust.

use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub age: f32,
    pub lifetime: f32,
    pub size: f32,
}

impl Particle {
    /// Remaining life as a fraction, 1 at birth and 0 at death.
    pub fn life_fraction(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }

    /// Fades linearly from `PEAK_ALPHA` to zero.
    pub fn alpha(&self) -> f32 {
        PEAK_ALPHA * self.life_fraction()
    }

    pub fn is_alive(&self) -> bool {
        self.age < self.lifetime
    }
}

pub const PEAK_ALPHA: f32 = 0.5;

/// Forces applied to every particle in a pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleForces {
    /// Constant acceleration (buoyancy for smoke).
    pub acceleration: Vec3,
    /// Velocity the particles relax toward.
    pub wind: Vec3,
    /// Fraction of the velocity gap to the wind closed per second.
    pub drag: f32,
    /// Size gained per second.
    pub growth: f32,
}

impl Default for ParticleForces {
    fn default() -> Self {
        Self {
            acceleration: Vec3::ZERO,
            wind: Vec3::ZERO,
            drag: 0.0,
            growth: 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a particle. Returns false when the pool is full.
    pub fn spawn(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= self.capacity {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Integrate one step and drop dead particles.
    pub fn step(&mut self, dt: f32, forces: &ParticleForces) {
        let relax = (forces.drag * dt).clamp(0.0, 1.0);
        for p in &mut self.particles {
            p.velocity += forces.acceleration * dt;
            p.velocity += (forces.wind - p.velocity) * relax;
            p.position += p.velocity * dt;
            p.size += forces.growth * dt;
            p.age += dt;
        }

        let mut i = 0;
        while i < self.particles.len() {
            if self.particles[i].is_alive() {
                i += 1;
            } else {
                self.particles.swap_remove(i);
            }
        }
    }

    /// Shift every particle, used when the world scrolls under them.
    pub fn offset(&mut self, delta: Vec3) {
        for p in &mut self.particles {
            p.position += delta;
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}
