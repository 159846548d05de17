// Movement body - authoritative position, velocity, collision box and timers

use glam::Vec2;

use super::params::MovementParams;
use super::state::{LandingType, LocomotionState};
use crate::core::Rect;
use crate::engine::physics::TileCollisionMap;

/// Integer frame countdowns, all decremented once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameTimers {
    pub coyote: u32,
    pub wall_coyote: u32,
    pub wall_jump_lockout: u32,
    pub wall_stick: u32,
    pub jump_buffer: u32,
    pub dash_cooldown: u32,
    pub hard_land_recovery: u32,
}

impl FrameTimers {
    /// Count every timer down by one. Coyote time only runs in the air.
    pub fn tick(&mut self, airborne: bool) {
        if airborne {
            self.coyote = self.coyote.saturating_sub(1);
        }
        self.wall_coyote = self.wall_coyote.saturating_sub(1);
        self.wall_jump_lockout = self.wall_jump_lockout.saturating_sub(1);
        self.wall_stick = self.wall_stick.saturating_sub(1);
        self.jump_buffer = self.jump_buffer.saturating_sub(1);
        self.dash_cooldown = self.dash_cooldown.saturating_sub(1);
        self.hard_land_recovery = self.hard_land_recovery.saturating_sub(1);
    }
}

/// Read-only view handed to rendering, camera, HUD and ability layers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub facing_right: bool,
    pub grounded: bool,
    pub state: LocomotionState,
    pub is_dashing: bool,
}

impl BodySnapshot {
    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }
}

/// A platformer body driven by the locomotion state machine.
///
/// Fields are only written by `step` and by the reset operations
/// (`spawn`, `respawn`, `teleport`).
#[derive(Debug, Clone, PartialEq)]
pub struct MovementBody {
    /// Top-left corner of the collision box
    pub(super) position: Vec2,
    pub(super) previous_position: Vec2,
    pub(super) velocity: Vec2,
    /// Current collision box size (short while crouched)
    pub(super) size: Vec2,
    pub(super) standing_size: Vec2,
    pub(super) facing_right: bool,
    pub(super) grounded: bool,
    pub(super) wall_side: i8,
    pub(super) state: LocomotionState,

    pub(super) timers: FrameTimers,
    pub(super) fall_duration_frames: u32,
    /// Side of the wall last slid on, used by wall coyote jumps
    pub(super) last_wall_side: i8,
    /// Side the wall-stick timer refers to
    pub(super) stick_side: i8,
    /// Current wall slide speed cap, eases from base toward grip
    pub(super) wall_slide_speed: f32,
    /// Jump cut is still allowed for the current rise
    pub(super) variable_jump_active: bool,

    pub(super) dash_available: bool,
    pub(super) is_dashing: bool,
    pub(super) is_in_dash_windup: bool,
    pub(super) dash_windup_remaining: u32,
    pub(super) dash_frames_remaining: u32,
    /// Velocity locked in when the dash was triggered
    pub(super) dash_velocity: Vec2,
    pub(super) dash_speed_boost_remaining: f32,

    pub(super) last_landing_type: Option<LandingType>,
    pub(super) params: MovementParams,
}

impl MovementBody {
    /// Create a body at `position` with the standing size from `params`
    pub fn spawn(position: Vec2, params: MovementParams, map: &TileCollisionMap) -> Self {
        let size = Vec2::new(params.body_width, params.body_height);
        Self::spawn_with_size(position, params, size, map)
    }

    fn spawn_with_size(
        position: Vec2,
        params: MovementParams,
        standing_size: Vec2,
        map: &TileCollisionMap,
    ) -> Self {
        let rect = Rect::from_position_size(position, standing_size);
        let grounded = map.ground_platform(&rect).is_some();
        let state = if grounded {
            LocomotionState::Idle
        } else {
            LocomotionState::Falling
        };

        Self {
            position,
            previous_position: position,
            velocity: Vec2::ZERO,
            size: standing_size,
            standing_size,
            facing_right: true,
            grounded,
            wall_side: 0,
            state,
            timers: FrameTimers::default(),
            fall_duration_frames: 0,
            last_wall_side: 0,
            stick_side: 0,
            wall_slide_speed: params.wall_slide_base_speed,
            variable_jump_active: false,
            dash_available: true,
            is_dashing: false,
            is_in_dash_windup: false,
            dash_windup_remaining: 0,
            dash_frames_remaining: 0,
            dash_velocity: Vec2::ZERO,
            dash_speed_boost_remaining: 0.0,
            last_landing_type: None,
            params,
        }
    }

    /// Reset to a fresh spawn at `position`, keeping params and equipment size
    pub fn respawn(&mut self, position: Vec2, map: &TileCollisionMap) {
        log::info!("Respawning body at ({:.1}, {:.1})", position.x, position.y);
        *self = Self::spawn_with_size(position, self.params, self.standing_size, map);
    }

    /// Reposition the body from outside the state machine. Velocity, timers
    /// and state are reset exactly like a respawn.
    pub fn teleport(&mut self, position: Vec2, map: &TileCollisionMap) {
        log::debug!("Teleporting body to ({:.1}, {:.1})", position.x, position.y);
        *self = Self::spawn_with_size(position, self.params, self.standing_size, map);
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn previous_position(&self) -> Vec2 {
        self.previous_position
    }

    /// Position blended between the last two ticks for rendering
    pub fn interpolated_position(&self, alpha: f32) -> Vec2 {
        self.previous_position.lerp(self.position, alpha.clamp(0.0, 1.0))
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Unscaled collision box size
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn standing_size(&self) -> Vec2 {
        self.standing_size
    }

    /// Change the standing box (equipment). The feet stay in place.
    pub fn set_standing_size(&mut self, size: Vec2) {
        let crouched = self.is_crouched();
        self.standing_size = size;
        let new_size = if crouched {
            Vec2::new(size.x, self.params.crouch_height.min(size.y))
        } else {
            size
        };
        self.position.y += self.size.y - new_size.y;
        self.size = new_size;
    }

    /// Collision box in world space
    pub fn rect(&self) -> Rect {
        Rect::from_position_size(self.position, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Bottom-center of the collision box
    pub fn feet(&self) -> Vec2 {
        Vec2::new(self.position.x + self.size.x * 0.5, self.position.y + self.size.y)
    }

    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Wall contact side: -1 left, 0 none, 1 right
    pub fn wall_side(&self) -> i8 {
        self.wall_side
    }

    pub fn state(&self) -> LocomotionState {
        self.state
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn timers(&self) -> &FrameTimers {
        &self.timers
    }

    pub fn fall_duration_frames(&self) -> u32 {
        self.fall_duration_frames
    }

    pub fn is_crouched(&self) -> bool {
        self.size.y < self.standing_size.y
    }

    pub fn is_dashing(&self) -> bool {
        self.is_dashing
    }

    pub fn is_in_dash_windup(&self) -> bool {
        self.is_in_dash_windup
    }

    pub fn dash_available(&self) -> bool {
        self.dash_available
    }

    pub fn dash_speed_boost_remaining(&self) -> f32 {
        self.dash_speed_boost_remaining
    }

    pub fn last_landing_type(&self) -> Option<LandingType> {
        self.last_landing_type
    }

    pub fn params(&self) -> &MovementParams {
        &self.params
    }

    /// Live tuning changes take effect on the next tick
    pub fn params_mut(&mut self) -> &mut MovementParams {
        &mut self.params
    }

    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            position: self.position,
            velocity: self.velocity,
            size: self.size,
            facing_right: self.facing_right,
            grounded: self.grounded,
            state: self.state,
            is_dashing: self.is_dashing,
        }
    }
}
