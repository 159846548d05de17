// Screen shake impulses
//
// Jitter comes from a seeded ChaCha stream so a replayed input sequence
// produces the same offsets.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct ScreenShake {
    intensity: f32,
    frames_total: u32,
    frames_left: u32,
    offset: Vec2,
    rng: ChaCha8Rng,
}

impl ScreenShake {
    pub fn new(seed: u64) -> Self {
        Self {
            intensity: 0.0,
            frames_total: 0,
            frames_left: 0,
            offset: Vec2::ZERO,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Start a shake. A weaker impulse never cuts a stronger one short.
    pub fn add_impulse(&mut self, intensity: f32, frames: u32) {
        if intensity <= 0.0 || frames == 0 {
            return;
        }
        if intensity >= self.current_intensity() {
            self.intensity = intensity;
            self.frames_total = frames;
            self.frames_left = frames;
        }
    }

    /// Intensity after linear decay
    pub fn current_intensity(&self) -> f32 {
        if self.frames_left == 0 || self.frames_total == 0 {
            return 0.0;
        }
        self.intensity * self.frames_left as f32 / self.frames_total as f32
    }

    /// One tick of decay; picks a new offset
    pub fn update(&mut self) {
        let amplitude = self.current_intensity();
        if amplitude <= 0.0 {
            self.offset = Vec2::ZERO;
            return;
        }
        self.offset = Vec2::new(
            self.rng.random_range(-1.0..=1.0),
            self.rng.random_range(-1.0..=1.0),
        ) * amplitude;
        self.frames_left -= 1;
    }

    /// Offset to add to the camera at render time
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn is_active(&self) -> bool {
        self.frames_left > 0
    }

    pub fn reset(&mut self) {
        self.frames_left = 0;
        self.offset = Vec2::ZERO;
    }
}
