// Cosmetic particles spawned from movement events

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Emission request queued by the feedback layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleRequest {
    pub origin: Vec2,
    pub count: u32,
    /// Unit direction of the cone center
    pub direction: Vec2,
    /// Half-angle of the cone in radians
    pub spread: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub lifetime_frames: u32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub frames_left: u32,
    pub lifetime_frames: u32,
    pub color: [f32; 4],
}

impl Particle {
    /// Remaining life in 0..=1, used for fading
    pub fn life(&self) -> f32 {
        if self.lifetime_frames == 0 {
            return 0.0;
        }
        self.frames_left as f32 / self.lifetime_frames as f32
    }
}

/// Simple pool of drag-slowed particles
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    max_particles: usize,
    drag: f32,
    rng: ChaCha8Rng,
}

impl ParticleSystem {
    pub fn new(max_particles: usize, seed: u64) -> Self {
        Self {
            particles: Vec::with_capacity(max_particles),
            max_particles,
            drag: 4.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn emit(&mut self, request: &ParticleRequest) {
        let base_angle = request.direction.y.atan2(request.direction.x);
        let (low, high) = if request.speed_min <= request.speed_max {
            (request.speed_min, request.speed_max)
        } else {
            (request.speed_max, request.speed_min)
        };

        for _ in 0..request.count {
            if self.particles.len() >= self.max_particles {
                log::trace!("Particle pool full, dropping the rest of the request");
                break;
            }
            let angle = if request.spread > 0.0 {
                base_angle + self.rng.random_range(-request.spread..=request.spread)
            } else {
                base_angle
            };
            let speed = if high > low {
                self.rng.random_range(low..=high)
            } else {
                low
            };
            self.particles.push(Particle {
                position: request.origin,
                velocity: Vec2::from_angle(angle) * speed,
                frames_left: request.lifetime_frames,
                lifetime_frames: request.lifetime_frames,
                color: request.color,
            });
        }
    }

    pub fn update(&mut self, dt: f32) {
        let damping = (1.0 - self.drag * dt).max(0.0);
        for particle in &mut self.particles {
            particle.position += particle.velocity * dt;
            particle.velocity *= damping;
            particle.frames_left = particle.frames_left.saturating_sub(1);
        }
        self.particles.retain(|p| p.frames_left > 0);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
