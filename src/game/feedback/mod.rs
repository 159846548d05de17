// Cosmetic feedback layer
//
// Reacts to movement events with squash/stretch, particles and screen shake.
// Reads events only; nothing here writes back into the movement body.

pub mod particles;
pub mod shake;
pub mod squash;

pub use particles::{Particle, ParticleRequest, ParticleSystem};
pub use shake::ScreenShake;
pub use squash::SquashStretch;

use glam::Vec2;

use crate::engine::physics::SurfaceType;
use crate::game::movement::{FeedbackTuning, MovementEvent, MovementEventKind};

const MAX_PARTICLES: usize = 256;
const SHAKE_SEED: u64 = 0x5eed_cafe;
const PARTICLE_SEED: u64 = 0x0d05_7f11;

/// Half-angle of a dust puff
const DUST_SPREAD: f32 = 1.2;
const TRAIL_SPREAD: f32 = 0.35;
const DUST_COLOR: [f32; 4] = [0.85, 0.8, 0.7, 0.9];
const TRAIL_COLOR: [f32; 4] = [0.6, 0.85, 1.0, 0.8];

#[derive(Debug, Clone)]
pub struct FeedbackLayer {
    tuning: FeedbackTuning,
    squash: SquashStretch,
    shake: ScreenShake,
    particles: ParticleSystem,
    /// Requests made since the last `take_requests`, for external renderers
    requests: Vec<ParticleRequest>,
}

impl FeedbackLayer {
    pub fn new(tuning: FeedbackTuning) -> Self {
        Self {
            tuning,
            squash: SquashStretch::new(),
            shake: ScreenShake::new(SHAKE_SEED),
            particles: ParticleSystem::new(MAX_PARTICLES, PARTICLE_SEED),
            requests: Vec::new(),
        }
    }

    /// Live tuning edits apply to the next event
    pub fn set_tuning(&mut self, tuning: FeedbackTuning) {
        self.tuning = tuning;
    }

    pub fn tuning(&self) -> &FeedbackTuning {
        &self.tuning
    }

    pub fn on_event(&mut self, event: &MovementEvent) {
        let t = self.tuning;
        let feet = event.position;
        match event.kind {
            MovementEventKind::JumpLaunch => {
                self.squash.punch(t.jump_stretch);
                self.dust(feet, Vec2::NEG_Y, t.dust_count, event.surface);
            }
            MovementEventKind::WallJump => {
                self.squash.punch(t.wall_jump_stretch);
                let away = Vec2::new(-(event.wall_side as f32), -0.5).normalize_or_zero();
                self.dust(feet, away, t.dust_count, event.surface);
            }
            MovementEventKind::SoftLanding => {
                self.squash.punch(t.soft_land_squash);
                self.dust(feet, Vec2::NEG_Y, t.dust_count, event.surface);
            }
            MovementEventKind::HardLanding => {
                self.squash.punch(t.hard_land_squash);
                self.shake.add_impulse(t.hard_land_shake, t.hard_land_shake_frames);
                self.dust(feet, Vec2::NEG_Y, t.hard_land_dust_count, event.surface);
            }
            MovementEventKind::Bounce => {
                self.squash.punch(t.bounce_stretch);
                self.shake.add_impulse(t.bounce_shake, t.bounce_shake_frames);
                self.dust(feet, Vec2::NEG_Y, t.dust_count, event.surface);
            }
            MovementEventKind::DashStart => {
                self.squash.punch(t.dash_stretch);
                self.shake.add_impulse(t.dash_shake, t.dash_shake_frames);
                let behind = -event.velocity.normalize_or_zero();
                self.queue(ParticleRequest {
                    origin: feet,
                    count: t.dash_trail_count,
                    direction: behind,
                    spread: TRAIL_SPREAD,
                    speed_min: t.particle_speed_min,
                    speed_max: t.particle_speed_max,
                    lifetime_frames: t.particle_lifetime_frames,
                    color: TRAIL_COLOR,
                });
            }
            MovementEventKind::WallSlideStart => {
                self.squash.punch(t.wall_slide_squash);
            }
            MovementEventKind::TurnAround => {
                let back = if event.facing_right {
                    Vec2::new(-1.0, -0.3)
                } else {
                    Vec2::new(1.0, -0.3)
                };
                self.dust(feet, back.normalize(), t.dust_count, event.surface);
            }
            MovementEventKind::Crouch => {
                self.squash.punch(t.crouch_squash);
            }
            MovementEventKind::SlideStart => {
                self.squash.punch(t.slide_squash);
                self.dust(feet, Vec2::NEG_Y, t.dust_count, event.surface);
            }
            MovementEventKind::DashEnd => {}
        }
    }

    /// Per-tick relaxation and decay
    pub fn update(&mut self, dt: f32) {
        self.squash.update(dt, self.tuning.scale_return_speed);
        self.shake.update();
        self.particles.update(dt);
    }

    /// Visual scale for the sprite; the collision box is unaffected
    pub fn scale(&self) -> Vec2 {
        self.squash.scale()
    }

    /// Camera offset to apply at render time
    pub fn shake_offset(&self) -> Vec2 {
        self.shake.offset()
    }

    pub fn particles(&self) -> &[Particle] {
        self.particles.particles()
    }

    pub fn take_requests(&mut self) -> Vec<ParticleRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn reset(&mut self) {
        self.squash.reset();
        self.shake.reset();
        self.particles.clear();
        self.requests.clear();
    }

    fn dust(&mut self, origin: Vec2, direction: Vec2, count: u32, surface: SurfaceType) {
        if count == 0 {
            return;
        }
        let props = surface.props();
        let color = if surface == SurfaceType::Normal {
            DUST_COLOR
        } else {
            props.color
        };
        self.queue(ParticleRequest {
            origin,
            count,
            direction,
            spread: DUST_SPREAD,
            speed_min: self.tuning.particle_speed_min,
            speed_max: self.tuning.particle_speed_max,
            lifetime_frames: self.tuning.particle_lifetime_frames,
            color,
        });
    }

    fn queue(&mut self, request: ParticleRequest) {
        self.particles.emit(&request);
        self.requests.push(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::movement::BASE_FEEDBACK;

    fn event(kind: MovementEventKind) -> MovementEvent {
        MovementEvent {
            kind,
            position: Vec2::new(100.0, 200.0),
            velocity: Vec2::new(720.0, 0.0),
            facing_right: true,
            wall_side: 0,
            surface: SurfaceType::Normal,
        }
    }

    #[test]
    fn test_hard_landing_squashes_and_shakes() {
        let mut layer = FeedbackLayer::new(BASE_FEEDBACK);
        layer.on_event(&event(MovementEventKind::HardLanding));

        assert_eq!(layer.scale(), Vec2::from(BASE_FEEDBACK.hard_land_squash));
        layer.update(1.0 / 60.0);
        assert_ne!(layer.shake_offset(), Vec2::ZERO);
        assert_eq!(layer.particles().len(), BASE_FEEDBACK.hard_land_dust_count as usize);
    }

    #[test]
    fn test_dash_trail_points_behind() {
        let mut layer = FeedbackLayer::new(BASE_FEEDBACK);
        layer.on_event(&event(MovementEventKind::DashStart));
        let requests = layer.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].direction, Vec2::new(-1.0, 0.0));
        assert!(layer.take_requests().is_empty());
    }

    #[test]
    fn test_scale_returns_to_identity() {
        let mut layer = FeedbackLayer::new(BASE_FEEDBACK);
        layer.on_event(&event(MovementEventKind::JumpLaunch));
        for _ in 0..240 {
            layer.update(1.0 / 60.0);
        }
        assert!((layer.scale() - Vec2::ONE).length() < 1e-3);
        assert_eq!(layer.shake_offset(), Vec2::ZERO);
        assert!(layer.particles().is_empty());
    }

    #[test]
    fn test_surface_tints_dust() {
        let mut layer = FeedbackLayer::new(BASE_FEEDBACK);
        let mut landing = event(MovementEventKind::SoftLanding);
        landing.surface = SurfaceType::Icy;
        layer.on_event(&landing);
        let requests = layer.take_requests();
        assert_eq!(requests[0].color, SurfaceType::Icy.props().color);
    }
}
