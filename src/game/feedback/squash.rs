// Squash and stretch of the rendered sprite

use glam::Vec2;

use crate::core::math::smoothing_factor;

/// Visual scale that snaps to a target and relaxes back to (1, 1).
/// Never touches the collision box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquashStretch {
    scale: Vec2,
}

impl Default for SquashStretch {
    fn default() -> Self {
        Self { scale: Vec2::ONE }
    }
}

impl SquashStretch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump straight to a target scale
    pub fn punch(&mut self, target: [f32; 2]) {
        self.scale = Vec2::from(target);
    }

    /// Exponential return toward (1, 1)
    pub fn update(&mut self, dt: f32, return_speed: f32) {
        let t = smoothing_factor(return_speed, dt);
        self.scale = self.scale.lerp(Vec2::ONE, t);
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn reset(&mut self) {
        self.scale = Vec2::ONE;
    }
}
