// Locomotion state machine - advances a body by one fixed tick
//
// Tick order: timers, intent, ordered transition guards, per-state velocity,
// swept integration through the collision map, post-move contact handling.

use glam::Vec2;

use super::body::{FrameTimers, MovementBody};
use super::events::{EventQueue, MovementEvent, MovementEventKind};
use super::params::MovementParams;
use super::state::{LandingType, LocomotionState as S};
use crate::core::math::{move_toward, sign};
use crate::core::Rect;
use crate::engine::input::{Action, InputSnapshot};
use crate::engine::physics::{MoveResult, SurfaceProps, SurfaceType, TileCollisionMap};

/// Turn-around events need at least this share of max run speed
const TURN_EVENT_SPEED_RATIO: f32 = 0.5;

/// World and input for one tick
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub map: &'a TileCollisionMap,
    pub input: &'a InputSnapshot,
    pub dt: f32,
    /// Product of the modifier gravity scales for this tick
    pub gravity_scale: f32,
}

impl<'a> StepContext<'a> {
    pub fn new(map: &'a TileCollisionMap, input: &'a InputSnapshot, dt: f32) -> Self {
        Self {
            map,
            input,
            dt,
            gravity_scale: 1.0,
        }
    }

    pub fn with_gravity_scale(mut self, gravity_scale: f32) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }
}

/// Input as the state machine reads it this tick
#[derive(Debug, Clone, Copy)]
struct Intent {
    /// Zeroed while wall-jump lockout or hard-landing recovery is active
    horizontal: f32,
    raw_horizontal: f32,
    vertical: f32,
    crouch: bool,
    fast_fall: bool,
    jump_pressed: bool,
    jump_released: bool,
    dash_pressed: bool,
}

/// Landing classification from the number of falling frames.
/// `None` is a silent landing.
pub fn classify_landing(fall_frames: u32, params: &MovementParams) -> Option<LandingType> {
    if fall_frames >= params.hard_land_threshold_frames {
        Some(LandingType::Hard)
    } else if fall_frames >= params.soft_land_threshold_frames {
        Some(LandingType::Soft)
    } else {
        None
    }
}

impl MovementBody {
    /// Advance one fixed tick. Transition events are appended to `events`.
    pub fn step(&mut self, ctx: &StepContext<'_>, events: &mut EventQueue) {
        // Params are re-read every tick so live edits apply immediately
        let p = self.params;
        let map = ctx.map;
        let dt = ctx.dt;

        self.previous_position = self.position;
        let start = self.timers;
        let was_grounded = self.grounded;
        let previous_state = self.state;
        self.timers.tick(!was_grounded);

        let mut intent = self.read_intent(ctx.input, &start);
        if intent.jump_pressed {
            self.timers.jump_buffer = p.jump_buffer_frames;
        }
        let mut jump_request = intent.jump_pressed || start.jump_buffer > 0;

        self.evaluate_guards(&p, &intent, &start, &mut jump_request, map, events);
        if self.timers.wall_jump_lockout > 0 {
            intent.horizontal = 0.0;
        }
        self.sync_crouch(map);
        self.update_facing(&p, &intent, events, map);

        let surface = if was_grounded {
            map.ground_surface(&self.rect())
        } else {
            SurfaceType::Normal
        };
        let props = surface.props();
        self.apply_state_velocity(&p, &intent, &props, ctx.gravity_scale, dt);

        // Integrate; the conveyor bias moves the body without entering velocity
        let mut delta = self.velocity * dt;
        if was_grounded {
            if let Some(conveyor) = props.conveyor_velocity {
                delta.x += conveyor * dt;
            }
        }
        let impact_speed = self.velocity.y;
        let result = map.resolve_move(self.rect(), &mut self.velocity, delta);
        self.position = result.position;
        if result.ceiling {
            self.variable_jump_active = false;
        }

        self.post_move(&p, &intent, &result, was_grounded, impact_speed, &mut jump_request, map, events);

        if self.state != previous_state {
            log::debug!("Locomotion {} -> {}", previous_state, self.state);
        }
        log::trace!(
            "{} pos=({:.2}, {:.2}) vel=({:.2}, {:.2})",
            self.state,
            self.position.x,
            self.position.y,
            self.velocity.x,
            self.velocity.y
        );
    }

    fn read_intent(&self, input: &InputSnapshot, start: &FrameTimers) -> Intent {
        let locked = start.wall_jump_lockout > 0
            || (self.state == S::HardLanding && start.hard_land_recovery > 0);
        let raw_horizontal = input.horizontal();

        Intent {
            horizontal: if locked { 0.0 } else { raw_horizontal },
            raw_horizontal,
            vertical: input.vertical(),
            crouch: input.is_held(Action::Crouch) || input.is_held(Action::Down),
            fast_fall: input.is_held(Action::Down),
            jump_pressed: input.is_pressed(Action::Jump),
            jump_released: input.is_released(Action::Jump),
            dash_pressed: input.is_pressed(Action::Dash),
        }
    }

    /// Ordered transition guards; the first match decides the state
    fn evaluate_guards(
        &mut self,
        p: &MovementParams,
        intent: &Intent,
        start: &FrameTimers,
        jump_request: &mut bool,
        map: &TileCollisionMap,
        events: &mut EventQueue,
    ) {
        // 1. Dash: continue, end, or start
        if self.is_dashing {
            if self.dash_windup_remaining > 0 || self.dash_frames_remaining > 0 {
                return;
            }
            self.end_dash(p, intent, map, events);
        } else if intent.dash_pressed && self.dash_available && start.dash_cooldown == 0 {
            self.start_dash(p, intent, map, events);
            return;
        }

        // 2. Hard landing lock; only a jump gets out early
        if self.state == S::HardLanding && start.hard_land_recovery > 0 && self.grounded {
            if *jump_request {
                self.launch_jump(p, jump_request, map, events);
            }
            return;
        }

        // 3. Ground or coyote jump
        if *jump_request
            && (self.grounded || start.coyote > 0)
            && (!self.is_crouched() || self.has_headroom(map))
        {
            self.launch_jump(p, jump_request, map, events);
            return;
        }

        // 4. Wall jump
        if *jump_request
            && !self.grounded
            && (self.state == S::WallSliding || start.wall_coyote > 0)
        {
            let side = if self.wall_side != 0 {
                self.wall_side
            } else {
                self.last_wall_side
            };
            if side != 0 {
                self.launch_wall_jump(p, side, jump_request, map, events);
                return;
            }
        }

        if self.grounded {
            // 5. Crouch slide
            if self.state == S::CrouchSliding {
                if !(intent.crouch && self.velocity.x.abs() >= p.slide_stop_speed) {
                    self.state = S::Crouching;
                }
                return;
            }
            if intent.crouch
                && self.velocity.x.abs() >= p.slide_min_speed
                && self.state.is_grounded()
                && !self.state.is_crouched()
            {
                let direction = if self.velocity.x != 0.0 {
                    sign(self.velocity.x)
                } else if self.facing_right {
                    1.0
                } else {
                    -1.0
                };
                self.velocity.x = direction * p.slide_initial_speed.max(self.velocity.x.abs());
                self.state = S::CrouchSliding;
                self.emit(events, MovementEventKind::SlideStart, map.ground_surface(&self.rect()));
                return;
            }

            // 6. Crouch, and stand up only with headroom
            if intent.crouch {
                if self.state != S::Crouching {
                    self.state = S::Crouching;
                    self.emit(events, MovementEventKind::Crouch, map.ground_surface(&self.rect()));
                }
                return;
            }
            if self.is_crouched() && !self.has_headroom(map) {
                self.state = S::Crouching;
                return;
            }

            // 9. Grounded fallthrough
            self.state = if intent.horizontal != 0.0 {
                S::Running
            } else {
                S::Idle
            };
            return;
        }

        // 7. Wall slide
        let toward_wall = self.wall_side != 0 && intent.horizontal == self.wall_side as f32;
        let stuck_out = start.wall_stick > 0 && self.wall_side == self.stick_side;
        if self.velocity.y >= 0.0 && toward_wall && !stuck_out {
            if self.state != S::WallSliding {
                self.wall_slide_speed = p.wall_slide_base_speed;
                self.state = S::WallSliding;
                self.emit(
                    events,
                    MovementEventKind::WallSlideStart,
                    map.wall_surface(&self.rect(), self.wall_side),
                );
            }
            self.last_wall_side = self.wall_side;
            return;
        }

        // 8. Airborne fallthrough
        let rising = self.velocity.y < 0.0;
        if !(rising && matches!(self.state, S::Jumping | S::WallJumping)) {
            self.state = S::Falling;
        }
    }

    fn start_dash(
        &mut self,
        p: &MovementParams,
        intent: &Intent,
        map: &TileCollisionMap,
        events: &mut EventQueue,
    ) {
        let mut direction = Vec2::new(intent.raw_horizontal, intent.vertical);
        if direction == Vec2::ZERO {
            direction.x = if self.facing_right { 1.0 } else { -1.0 };
        }
        let direction = direction.normalize();
        if direction.x != 0.0 {
            self.facing_right = direction.x > 0.0;
        }

        self.dash_velocity = direction * p.dash_speed;
        self.is_dashing = true;
        self.dash_available = false;
        self.dash_windup_remaining = p.dash_windup_frames;
        self.dash_frames_remaining = p.dash_duration_frames;
        self.is_in_dash_windup = p.dash_windup_frames > 0;
        self.timers.hard_land_recovery = 0;
        self.variable_jump_active = false;
        self.fall_duration_frames = 0;
        self.state = S::Dashing;

        log::debug!(
            "Dash started toward ({:.2}, {:.2})",
            direction.x,
            direction.y
        );
        let mut event = self.event(MovementEventKind::DashStart, map.ground_surface(&self.rect()));
        event.velocity = self.dash_velocity;
        events.push(event);
    }

    fn end_dash(
        &mut self,
        p: &MovementParams,
        intent: &Intent,
        map: &TileCollisionMap,
        events: &mut EventQueue,
    ) {
        self.is_dashing = false;
        self.is_in_dash_windup = false;
        self.timers.dash_cooldown = p.dash_cooldown_frames;
        self.dash_speed_boost_remaining = p.dash_end_boost;
        self.velocity = self
            .velocity
            .clamp_length_max(p.max_run_speed + p.dash_end_boost);

        self.state = if !self.grounded {
            S::Falling
        } else if intent.horizontal != 0.0 {
            S::Running
        } else {
            S::Idle
        };
        self.emit(events, MovementEventKind::DashEnd, map.ground_surface(&self.rect()));
    }

    fn launch_jump(
        &mut self,
        p: &MovementParams,
        jump_request: &mut bool,
        map: &TileCollisionMap,
        events: &mut EventQueue,
    ) {
        let surface = map.ground_surface(&self.rect());
        self.velocity.y = -p.jump_speed;
        self.state = S::Jumping;
        self.variable_jump_active = true;
        self.timers.jump_buffer = 0;
        self.timers.coyote = 0;
        self.timers.hard_land_recovery = 0;
        self.fall_duration_frames = 0;
        *jump_request = false;
        self.emit(events, MovementEventKind::JumpLaunch, surface);
    }

    fn launch_wall_jump(
        &mut self,
        p: &MovementParams,
        side: i8,
        jump_request: &mut bool,
        map: &TileCollisionMap,
        events: &mut EventQueue,
    ) {
        let surface = map.wall_surface(&self.rect(), side);
        self.velocity = Vec2::new(
            -(side as f32) * p.wall_jump_horizontal_speed,
            -p.wall_jump_vertical_speed,
        );
        self.facing_right = side < 0;
        self.timers.wall_jump_lockout = p.wall_jump_lockout_frames;
        self.timers.wall_stick = p.wall_stick_frames;
        self.timers.wall_coyote = 0;
        self.timers.jump_buffer = 0;
        self.stick_side = side;
        self.wall_slide_speed = p.wall_slide_base_speed;
        self.variable_jump_active = true;
        self.fall_duration_frames = 0;
        self.state = S::WallJumping;
        *jump_request = false;

        let mut event = self.event(MovementEventKind::WallJump, surface);
        event.wall_side = side;
        events.push(event);
    }

    /// Standing box fits at the current feet position
    fn has_headroom(&self, map: &TileCollisionMap) -> bool {
        let lift = self.standing_size.y - self.size.y;
        let standing = Rect::new(
            self.position.x,
            self.position.y - lift,
            self.standing_size.x,
            self.standing_size.y,
        );
        !map.overlaps_any(&standing)
    }

    /// Match the collision box to the state, keeping the feet in place
    fn sync_crouch(&mut self, map: &TileCollisionMap) {
        let want_crouch = self.state.is_crouched();
        if want_crouch && !self.is_crouched() {
            let height = self.params.crouch_height.min(self.standing_size.y);
            self.position.y += self.size.y - height;
            self.size.y = height;
        } else if !want_crouch && self.is_crouched() && self.has_headroom(map) {
            self.position.y -= self.standing_size.y - self.size.y;
            self.size = self.standing_size;
        }
    }

    fn update_facing(
        &mut self,
        p: &MovementParams,
        intent: &Intent,
        events: &mut EventQueue,
        map: &TileCollisionMap,
    ) {
        if self.is_dashing || intent.horizontal == 0.0 || self.state == S::WallSliding {
            return;
        }
        let right = intent.horizontal > 0.0;
        if right == self.facing_right {
            return;
        }
        self.facing_right = right;

        let reversing = self.velocity.x != 0.0 && sign(self.velocity.x) != intent.horizontal;
        if self.grounded
            && self.state == S::Running
            && reversing
            && self.velocity.x.abs() >= p.max_run_speed * TURN_EVENT_SPEED_RATIO
        {
            self.emit(events, MovementEventKind::TurnAround, map.ground_surface(&self.rect()));
        }
    }

    fn apply_state_velocity(
        &mut self,
        p: &MovementParams,
        intent: &Intent,
        surface: &SurfaceProps,
        gravity_scale: f32,
        dt: f32,
    ) {
        if self.state == S::Dashing {
            // Windup freezes, then the locked velocity ignores gravity and friction
            if self.dash_windup_remaining > 0 {
                self.dash_windup_remaining -= 1;
                self.is_in_dash_windup = true;
                self.velocity = Vec2::ZERO;
            } else {
                self.is_in_dash_windup = false;
                self.dash_frames_remaining = self.dash_frames_remaining.saturating_sub(1);
                self.velocity = self.dash_velocity;
            }
            return;
        }

        let drag = if self.grounded {
            surface.drag_multiplier.unwrap_or(1.0)
        } else {
            1.0
        };
        match self.state {
            S::CrouchSliding => {
                let friction = p.slide_friction * surface.friction_multiplier;
                self.velocity.x = move_toward(self.velocity.x, 0.0, friction * dt);
            }
            S::Crouching => {
                self.accelerate(p, intent.horizontal, p.crouch_speed * drag, surface, dt);
            }
            _ => {
                let max_speed = (p.max_run_speed + self.dash_speed_boost_remaining) * drag;
                self.accelerate(p, intent.horizontal, max_speed, surface, dt);
            }
        }
        self.dash_speed_boost_remaining =
            move_toward(self.dash_speed_boost_remaining, 0.0, p.dash_boost_decay * dt);

        // Variable jump height: one cut per rise
        if self.variable_jump_active {
            if self.velocity.y >= 0.0 {
                self.variable_jump_active = false;
            } else if intent.jump_released {
                self.velocity.y *= p.jump_cut_multiplier;
                self.variable_jump_active = false;
            }
        }

        if self.state == S::WallSliding {
            self.wall_slide_speed = move_toward(
                self.wall_slide_speed,
                p.wall_slide_grip_speed,
                p.wall_slide_acceleration * dt,
            );
            let gravity = p.fall_gravity * gravity_scale;
            self.velocity.y = (self.velocity.y + gravity * dt).min(self.wall_slide_speed);
        } else {
            self.apply_gravity(p, intent, gravity_scale, dt);
        }
    }

    /// Asymmetric horizontal acceleration. Reversal uses
    /// `deceleration * turn_multiplier`; ground friction scales deceleration.
    fn accelerate(
        &mut self,
        p: &MovementParams,
        input: f32,
        max_speed: f32,
        surface: &SurfaceProps,
        dt: f32,
    ) {
        let (control, friction) = if self.grounded {
            (1.0, surface.friction_multiplier)
        } else {
            (p.air_control, 1.0)
        };
        let vx = self.velocity.x;
        let target = input * max_speed;

        let rate = if input == 0.0 {
            p.deceleration * friction
        } else if vx != 0.0 && sign(vx) != sign(input) {
            p.deceleration * p.turn_multiplier * friction
        } else if vx.abs() > max_speed {
            p.deceleration * friction
        } else {
            p.acceleration
        };
        self.velocity.x = move_toward(vx, target, rate * control * dt);
    }

    fn apply_gravity(&mut self, p: &MovementParams, intent: &Intent, gravity_scale: f32, dt: f32) {
        let vy = self.velocity.y;
        let mut gravity = if vy < 0.0 {
            p.rise_gravity
        } else {
            p.fall_gravity
        };
        // Hang near the apex
        if vy.abs() < p.apex_speed_threshold {
            gravity *= p.apex_gravity_multiplier;
        }
        self.velocity.y += gravity * gravity_scale * dt;

        let max_fall = if intent.fast_fall && !self.grounded {
            p.max_fall_speed * p.fast_fall_multiplier
        } else {
            p.max_fall_speed
        };
        self.velocity.y = self.velocity.y.min(max_fall);
    }

    #[allow(clippy::too_many_arguments)]
    fn post_move(
        &mut self,
        p: &MovementParams,
        intent: &Intent,
        result: &MoveResult,
        was_grounded: bool,
        impact_speed: f32,
        jump_request: &mut bool,
        map: &TileCollisionMap,
        events: &mut EventQueue,
    ) {
        let rect = self.rect();
        self.grounded =
            result.grounded || (self.velocity.y >= 0.0 && map.ground_platform(&rect).is_some());
        self.wall_side = if map.is_touching_wall(&rect, 1) {
            1
        } else if map.is_touching_wall(&rect, -1) {
            -1
        } else {
            0
        };

        if self.grounded && !was_grounded {
            self.land(p, intent, impact_speed, jump_request, map, events);
        } else if !self.grounded && was_grounded && self.state.is_grounded() {
            // Walked off a ledge
            self.state = S::Falling;
        }

        if self.grounded {
            self.timers.coyote = p.coyote_frames;
            self.dash_available = true;
            self.fall_duration_frames = 0;
        } else if self.state == S::WallSliding && self.wall_side != 0 {
            self.timers.wall_coyote = p.wall_jump_coyote_frames;
            self.last_wall_side = self.wall_side;
            self.fall_duration_frames = 0;
        } else if self.velocity.y > 0.0 && !self.is_dashing {
            self.fall_duration_frames += 1;
        }
    }

    fn land(
        &mut self,
        p: &MovementParams,
        intent: &Intent,
        impact_speed: f32,
        jump_request: &mut bool,
        map: &TileCollisionMap,
        events: &mut EventQueue,
    ) {
        if self.is_dashing {
            return;
        }
        let surface = map.ground_surface(&self.rect());

        // Bouncy ground reflects the impact and skips classification
        if let Some(coefficient) = surface.props().bounce_coefficient {
            if impact_speed >= p.bounce_min_impact_speed {
                self.velocity.y = -impact_speed * coefficient;
                self.grounded = false;
                self.dash_available = true;
                self.variable_jump_active = false;
                self.fall_duration_frames = 0;
                self.state = S::Jumping;
                log::debug!("Bounced at {:.1} units/s", impact_speed);
                self.emit(events, MovementEventKind::Bounce, surface);
                return;
            }
        }

        let frames = self.fall_duration_frames;
        let landing = classify_landing(frames, p);
        self.last_landing_type = landing;
        match landing {
            Some(LandingType::Soft) => self.emit(events, MovementEventKind::SoftLanding, surface),
            Some(LandingType::Hard) => self.emit(events, MovementEventKind::HardLanding, surface),
            None => {}
        }

        // A buffered jump launches on the landing tick and skips any lock
        if *jump_request {
            self.launch_jump(p, jump_request, map, events);
            self.grounded = false;
            return;
        }

        if landing == Some(LandingType::Hard) {
            self.state = S::HardLanding;
            self.timers.hard_land_recovery = p.hard_land_recovery_frames;
            log::debug!("Hard landing after {} falling frames", frames);
        } else {
            self.state = if intent.horizontal != 0.0 {
                S::Running
            } else {
                S::Idle
            };
        }
    }

    fn event(&self, kind: MovementEventKind, surface: SurfaceType) -> MovementEvent {
        MovementEvent {
            kind,
            position: self.feet(),
            velocity: self.velocity,
            facing_right: self.facing_right,
            wall_side: self.wall_side,
            surface,
        }
    }

    fn emit(&self, events: &mut EventQueue, kind: MovementEventKind, surface: SurfaceType) {
        events.push(self.event(kind, surface));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::game_loop::FIXED_TIMESTEP;
    use crate::engine::physics::Platform;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const DT: f32 = FIXED_TIMESTEP;
    const FLOOR_Y: f32 = 200.0;

    fn params() -> MovementParams {
        MovementParams::default()
    }

    fn floor_with(surface: SurfaceType) -> TileCollisionMap {
        TileCollisionMap::new(vec![
            Platform::new(-1000.0, FLOOR_Y, 4000.0, 40.0).with_surface(surface)
        ])
    }

    fn floor() -> TileCollisionMap {
        floor_with(SurfaceType::Normal)
    }

    /// Body standing on the floor at x
    fn standing(map: &TileCollisionMap, x: f32) -> MovementBody {
        MovementBody::spawn(Vec2::new(x, FLOOR_Y - 40.0), params(), map)
    }

    /// Body whose feet are `gap` units above the floor
    fn above_floor(map: &TileCollisionMap, gap: f32) -> MovementBody {
        MovementBody::spawn(Vec2::new(100.0, FLOOR_Y - 40.0 - gap), params(), map)
    }

    fn tick(body: &mut MovementBody, map: &TileCollisionMap, input: InputSnapshot) -> EventQueue {
        let mut events = EventQueue::new();
        body.step(&StepContext::new(map, &input, DT), &mut events);
        events
    }

    fn none() -> InputSnapshot {
        InputSnapshot::new()
    }

    fn held(action: Action) -> InputSnapshot {
        InputSnapshot::new().with_held(action)
    }

    fn pressed(action: Action) -> InputSnapshot {
        InputSnapshot::new().with_pressed(action)
    }

    #[test]
    fn test_run_reaches_max_speed() {
        let map = floor();
        let mut body = standing(&map, 100.0);

        let mut reached_at = None;
        for i in 0..60 {
            tick(&mut body, &map, held(Action::Right));
            if reached_at.is_none() && (body.velocity().x - 300.0).abs() < 1e-3 {
                reached_at = Some(i);
            }
        }

        let reached_at = reached_at.expect("never reached max run speed");
        assert!(reached_at < 30, "took {} ticks", reached_at);
        assert_relative_eq!(body.velocity().x, 300.0, epsilon = 1e-3);
        assert_eq!(body.state(), S::Running);
        assert!(body.facing_right());
    }

    #[test]
    fn test_release_goes_idle() {
        let map = floor();
        let mut body = standing(&map, 100.0);
        for _ in 0..20 {
            tick(&mut body, &map, held(Action::Right));
        }
        for _ in 0..20 {
            tick(&mut body, &map, none());
        }
        assert_eq!(body.velocity().x, 0.0);
        assert_eq!(body.state(), S::Idle);
    }

    #[test]
    fn test_turn_multiplies_deceleration() {
        let map = floor();
        let mut body = standing(&map, 100.0);
        body.velocity.x = 200.0;
        body.state = S::Running;

        let events = tick(&mut body, &map, held(Action::Left));
        let expected = 200.0 - 2400.0 * 1.8 * DT;
        assert_relative_eq!(body.velocity().x, expected, epsilon = 1e-3);
        assert!(!body.facing_right());
        assert!(events.contains(MovementEventKind::TurnAround));
    }

    #[test]
    fn test_icy_slides_further() {
        let normal_map = floor();
        let icy_map = floor_with(SurfaceType::Icy);
        let mut normal = standing(&normal_map, 100.0);
        let mut icy = standing(&icy_map, 100.0);
        normal.velocity.x = 200.0;
        icy.velocity.x = 200.0;

        for _ in 0..10 {
            tick(&mut normal, &normal_map, none());
            tick(&mut icy, &icy_map, none());
        }

        assert_eq!(normal.velocity().x, 0.0);
        assert_relative_eq!(icy.velocity().x, 200.0 - 2400.0 * 0.1 * DT * 10.0, epsilon = 1e-2);
        assert!(icy.position().x > normal.position().x + 10.0);
    }

    #[test]
    fn test_sticky_caps_speed() {
        let map = floor_with(SurfaceType::Sticky);
        let mut body = standing(&map, 100.0);
        for _ in 0..60 {
            tick(&mut body, &map, held(Action::Right));
        }
        assert_relative_eq!(body.velocity().x, 300.0 * 0.6, epsilon = 1e-3);
    }

    #[test]
    fn test_conveyor_moves_without_velocity() {
        let map = floor_with(SurfaceType::Conveyor);
        let mut body = standing(&map, 100.0);
        for _ in 0..60 {
            tick(&mut body, &map, none());
        }
        assert_eq!(body.velocity().x, 0.0);
        assert_relative_eq!(body.position().x, 100.0 + 90.0, epsilon = 1e-2);
        assert!(body.is_grounded());
    }

    #[test]
    fn test_ground_jump() {
        let map = floor();
        let mut body = standing(&map, 100.0);
        let events = tick(&mut body, &map, pressed(Action::Jump));

        assert_eq!(body.state(), S::Jumping);
        assert_relative_eq!(body.velocity().y, -560.0 + 1400.0 * DT, epsilon = 1e-3);
        assert!(!body.is_grounded());
        assert!(events.contains(MovementEventKind::JumpLaunch));
    }

    #[test]
    fn test_jump_cut_on_release() {
        let map = floor();
        let mut held_body = standing(&map, 100.0);
        tick(&mut held_body, &map, pressed(Action::Jump));
        tick(&mut held_body, &map, held(Action::Jump));
        let mut cut_body = held_body.clone();

        tick(&mut held_body, &map, held(Action::Jump));
        let before = cut_body.velocity().y;
        tick(&mut cut_body, &map, InputSnapshot::new().with_released(Action::Jump));

        assert_relative_eq!(cut_body.velocity().y, before * 0.5 + 1400.0 * DT, epsilon = 1e-3);
        assert!(cut_body.velocity().y > held_body.velocity().y);

        // Only one cut per rise
        let after_cut = cut_body.velocity().y;
        tick(&mut cut_body, &map, InputSnapshot::new().with_released(Action::Jump));
        assert_relative_eq!(cut_body.velocity().y, after_cut + 1400.0 * DT, epsilon = 1e-3);
    }

    #[test]
    fn test_apex_turns_into_falling() {
        let map = floor();
        let mut body = standing(&map, 100.0);
        tick(&mut body, &map, pressed(Action::Jump));

        let mut saw_falling = false;
        for _ in 0..120 {
            tick(&mut body, &map, held(Action::Jump));
            if body.state() == S::Falling {
                assert!(body.velocity().y >= 0.0);
                saw_falling = true;
                break;
            }
            assert_eq!(body.state(), S::Jumping);
        }
        assert!(saw_falling);
    }

    #[test]
    fn test_coyote_window_is_exact() {
        let map = TileCollisionMap::new(vec![Platform::new(0.0, FLOOR_Y, 200.0, 40.0)]);
        let mut body = standing(&map, 150.0);
        body.velocity.x = 300.0;
        body.state = S::Running;

        let reference = {
            let mut b = body.clone();
            tick(&mut b, &map, held(Action::Right).with_pressed(Action::Jump));
            b.velocity().y
        };

        // Walk until the tick the body leaves the ledge
        let mut before_leaving = body.clone();
        for _ in 0..60 {
            before_leaving = body.clone();
            tick(&mut body, &map, held(Action::Right));
            if !body.is_grounded() {
                break;
            }
        }
        assert!(!body.is_grounded(), "body never left the ledge");

        // Jumping on the leaving tick itself
        let mut b = before_leaving.clone();
        tick(&mut b, &map, held(Action::Right).with_pressed(Action::Jump));
        assert_relative_eq!(b.velocity().y, reference, epsilon = 1e-4);

        let coyote = params().coyote_frames;
        for k in 1..=coyote + 1 {
            let mut b = body.clone();
            for _ in 1..k {
                tick(&mut b, &map, held(Action::Right));
            }
            tick(&mut b, &map, held(Action::Right).with_pressed(Action::Jump));
            if k <= coyote {
                assert_relative_eq!(b.velocity().y, reference, epsilon = 1e-4);
                assert_eq!(b.state(), S::Jumping, "k = {}", k);
            } else {
                assert!(b.velocity().y > 0.0, "jump honoured one tick too late");
                assert_eq!(b.state(), S::Falling);
            }
        }
    }

    #[test]
    fn test_buffered_jump_on_landing() {
        let map = floor();
        let mut body = above_floor(&map, 10.0);
        body.velocity.y = 300.0;

        tick(&mut body, &map, pressed(Action::Jump));
        assert!(!body.is_grounded());

        let events = tick(&mut body, &map, none());
        assert!(events.contains(MovementEventKind::JumpLaunch));
        assert_eq!(body.state(), S::Jumping);
        assert_relative_eq!(body.velocity().y, -560.0, epsilon = 1e-4);
    }

    #[test]
    fn test_stale_buffer_is_ignored() {
        let map = floor();
        let mut body = above_floor(&map, 80.0);

        tick(&mut body, &map, pressed(Action::Jump));
        let mut ticks = 1;
        while !body.is_grounded() && ticks < 120 {
            tick(&mut body, &map, none());
            ticks += 1;
        }
        assert!(ticks > params().jump_buffer_frames + 1);
        assert!(body.is_grounded());
        assert_ne!(body.state(), S::Jumping);
    }

    #[test]
    fn test_landing_classification() {
        let p = params();
        assert_eq!(classify_landing(0, &p), None);
        assert_eq!(classify_landing(11, &p), None);
        assert_eq!(classify_landing(12, &p), Some(LandingType::Soft));
        assert_eq!(classify_landing(34, &p), Some(LandingType::Soft));
        assert_eq!(classify_landing(35, &p), Some(LandingType::Hard));
        assert_eq!(classify_landing(400, &p), Some(LandingType::Hard));
    }

    fn land_after(fall_frames: u32, map: &TileCollisionMap) -> (MovementBody, EventQueue) {
        let mut body = above_floor(map, 2.0);
        body.velocity.y = 300.0;
        body.fall_duration_frames = fall_frames;
        let events = tick(&mut body, map, none());
        assert!(body.is_grounded());
        (body, events)
    }

    #[test]
    fn test_silent_and_soft_landing() {
        let map = floor();
        let (body, events) = land_after(5, &map);
        assert!(events.is_empty());
        assert_eq!(body.last_landing_type(), None);
        assert_eq!(body.state(), S::Idle);

        let (body, events) = land_after(20, &map);
        assert!(events.contains(MovementEventKind::SoftLanding));
        assert_eq!(body.last_landing_type(), Some(LandingType::Soft));
        assert_eq!(body.state(), S::Idle);
    }

    #[test]
    fn test_hard_landing_locks_input() {
        let map = floor();
        let (mut body, events) = land_after(40, &map);
        assert!(events.contains(MovementEventKind::HardLanding));
        assert_eq!(body.state(), S::HardLanding);
        assert_eq!(body.timers().hard_land_recovery, 12);
        assert_eq!(body.last_landing_type(), Some(LandingType::Hard));

        for _ in 0..12 {
            tick(&mut body, &map, held(Action::Right));
            assert_eq!(body.velocity().x, 0.0, "input must be ignored during recovery");
            assert_eq!(body.state(), S::HardLanding);
        }
        assert_eq!(body.timers().hard_land_recovery, 0);

        tick(&mut body, &map, held(Action::Right));
        assert!(body.velocity().x > 0.0);
        assert_eq!(body.state(), S::Running);
    }

    #[test]
    fn test_hard_landing_cancelled_by_jump() {
        let map = floor();
        let (mut body, _) = land_after(40, &map);
        tick(&mut body, &map, none());
        tick(&mut body, &map, pressed(Action::Jump));
        assert_eq!(body.state(), S::Jumping);
        assert_eq!(body.timers().hard_land_recovery, 0);
    }

    #[test]
    fn test_hard_landing_cancelled_by_dash() {
        let map = floor();
        let (mut body, _) = land_after(40, &map);
        let events = tick(&mut body, &map, pressed(Action::Dash));
        assert_eq!(body.state(), S::Dashing);
        assert!(events.contains(MovementEventKind::DashStart));
        assert_eq!(body.timers().hard_land_recovery, 0);
    }

    #[test]
    fn test_bouncy_reflects_impact() {
        let map = floor_with(SurfaceType::Bouncy);
        let mut body = above_floor(&map, 2.0);
        body.velocity.y = 300.0;
        body.fall_duration_frames = 40;
        let events = tick(&mut body, &map, none());
        let impact = 300.0 + 2200.0 * DT;

        assert!(events.contains(MovementEventKind::Bounce));
        assert!(!events.contains(MovementEventKind::HardLanding));
        assert_relative_eq!(body.velocity().y, -impact * 0.85, epsilon = 1e-3);
        assert_eq!(body.state(), S::Jumping);
        assert!(!body.is_grounded());
    }

    #[test]
    fn test_slow_bouncy_impact_lands() {
        let map = floor_with(SurfaceType::Bouncy);
        let mut body = above_floor(&map, 1.0);
        body.velocity.y = 60.0;
        let events = tick(&mut body, &map, none());
        assert!(body.is_grounded());
        assert!(!events.contains(MovementEventKind::Bounce));
        assert_eq!(body.velocity().y, 0.0);
    }

    /// Floor far below and a tall wall whose left face is at x = 300
    fn wall_map() -> TileCollisionMap {
        TileCollisionMap::new(vec![
            Platform::new(-1000.0, 2000.0, 4000.0, 40.0),
            Platform::new(300.0, -2000.0, 40.0, 4000.0),
        ])
    }

    fn sliding_body(map: &TileCollisionMap) -> MovementBody {
        let mut body = MovementBody::spawn(Vec2::new(276.0, 0.0), params(), map);
        body.velocity.y = 400.0;
        tick(&mut body, map, held(Action::Right));
        assert_eq!(body.wall_side(), 1);
        let events = tick(&mut body, map, held(Action::Right));
        assert!(events.contains(MovementEventKind::WallSlideStart));
        assert_eq!(body.state(), S::WallSliding);
        body
    }

    #[test]
    fn test_wall_slide_speed_eases_to_grip() {
        let map = wall_map();
        let mut body = sliding_body(&map);
        let p = params();

        let mut speeds = vec![body.velocity().y];
        for _ in 0..30 {
            tick(&mut body, &map, held(Action::Right));
            assert_eq!(body.state(), S::WallSliding);
            speeds.push(body.velocity().y);
        }

        assert!(speeds[0] <= p.wall_slide_base_speed);
        assert!(speeds[0] > p.wall_slide_grip_speed + 50.0);
        for pair in speeds.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-4, "descent speed increased: {:?}", pair);
        }
        let converged_at = speeds
            .iter()
            .position(|s| (s - p.wall_slide_grip_speed).abs() < 1e-3)
            .expect("never reached grip speed");
        assert!(converged_at > 5, "grip reached after {} ticks", converged_at);
    }

    #[test]
    fn test_no_wall_slide_while_rising() {
        let map = wall_map();
        let mut body = MovementBody::spawn(Vec2::new(276.0, 0.0), params(), &map);
        body.velocity.y = -300.0;
        body.state = S::Jumping;
        for _ in 0..3 {
            tick(&mut body, &map, held(Action::Right));
            assert_ne!(body.state(), S::WallSliding);
        }
    }

    #[test]
    fn test_wall_jump_pushes_away() {
        let map = wall_map();
        let mut body = sliding_body(&map);
        let events = tick(&mut body, &map, held(Action::Right).with_pressed(Action::Jump));

        assert!(events.contains(MovementEventKind::WallJump));
        assert_eq!(body.state(), S::WallJumping);
        assert!(body.velocity().x < 0.0);
        assert!(body.velocity().y < 0.0);
        assert!(!body.facing_right());
    }

    #[test]
    fn test_wall_jump_lockout_is_exact() {
        let map = wall_map();
        let mut body = sliding_body(&map);
        tick(&mut body, &map, pressed(Action::Jump));

        let mut steering = body.clone();
        let mut coasting = body.clone();
        let lockout = params().wall_jump_lockout_frames;

        for i in 0..lockout {
            tick(&mut steering, &map, held(Action::Right));
            tick(&mut coasting, &map, none());
            assert_eq!(
                steering.velocity().x,
                coasting.velocity().x,
                "input leaked through lockout on tick {}",
                i + 1
            );
        }

        tick(&mut steering, &map, held(Action::Right));
        tick(&mut coasting, &map, none());
        assert!(steering.velocity().x > coasting.velocity().x);
    }

    #[test]
    fn test_wall_coyote_jump() {
        let map = wall_map();
        let mut body = sliding_body(&map);

        tick(&mut body, &map, none());
        assert_eq!(body.state(), S::Falling);

        tick(&mut body, &map, pressed(Action::Jump));
        assert_eq!(body.state(), S::WallJumping);
        assert!(body.velocity().x < 0.0);
    }

    #[test]
    fn test_wall_stick_delays_reattach() {
        let map = wall_map();
        let mut body = MovementBody::spawn(Vec2::new(276.0, 0.0), params(), &map);
        body.velocity.y = 100.0;
        tick(&mut body, &map, none());
        body.timers.wall_stick = 3;
        body.stick_side = 1;

        for _ in 0..3 {
            tick(&mut body, &map, held(Action::Right));
            assert_eq!(body.state(), S::Falling);
        }
        tick(&mut body, &map, held(Action::Right));
        assert_eq!(body.state(), S::WallSliding);
    }

    fn air_body() -> (TileCollisionMap, MovementBody) {
        let map = TileCollisionMap::new(vec![Platform::new(-5000.0, 5000.0, 10000.0, 40.0)]);
        let body = MovementBody::spawn(Vec2::new(0.0, 0.0), params(), &map);
        (map, body)
    }

    #[test]
    fn test_dash_speed_is_constant() {
        let (map, mut body) = air_body();
        let p = params();

        let events = tick(&mut body, &map, held(Action::Right).with_pressed(Action::Dash));
        assert!(events.contains(MovementEventKind::DashStart));
        assert!(body.is_in_dash_windup());
        assert_eq!(body.velocity(), Vec2::ZERO);

        let mut active = 0;
        let mut ended = false;
        for _ in 0..40 {
            let events = tick(&mut body, &map, held(Action::Down));
            if events.contains(MovementEventKind::DashEnd) {
                ended = true;
                assert!(body.velocity().length() < p.dash_speed);
                break;
            }
            assert_eq!(body.state(), S::Dashing);
            if !body.is_in_dash_windup() {
                assert_relative_eq!(body.velocity().length(), p.dash_speed, epsilon = 1e-3);
                assert_eq!(body.velocity().y, 0.0, "gravity must not act during a dash");
                active += 1;
            }
        }
        assert!(ended);
        assert_eq!(active, p.dash_duration_frames);
        assert!(body.dash_speed_boost_remaining() > 0.0);
    }

    #[test]
    fn test_dash_uses_facing_without_input() {
        let (map, mut body) = air_body();
        body.facing_right = false;
        body.params_mut().dash_windup_frames = 0;
        tick(&mut body, &map, pressed(Action::Dash));
        assert_relative_eq!(body.velocity().x, -720.0, epsilon = 1e-3);
    }

    #[test]
    fn test_diagonal_dash_is_normalized() {
        let (map, mut body) = air_body();
        body.params_mut().dash_windup_frames = 0;
        let input = held(Action::Right).with_held(Action::Up).with_pressed(Action::Dash);
        tick(&mut body, &map, input);
        assert_relative_eq!(body.velocity().length(), 720.0, epsilon = 1e-3);
        assert!(body.velocity().x > 0.0 && body.velocity().y < 0.0);
    }

    #[test]
    fn test_dash_cooldown() {
        let map = floor();
        let mut body = standing(&map, 0.0);
        let cooldown = params().dash_cooldown_frames;

        tick(&mut body, &map, pressed(Action::Dash));
        let mut ended = false;
        for _ in 0..40 {
            if tick(&mut body, &map, none()).contains(MovementEventKind::DashEnd) {
                ended = true;
                break;
            }
        }
        assert!(ended);

        for i in 0..cooldown {
            let events = tick(&mut body, &map, pressed(Action::Dash));
            assert!(
                !events.contains(MovementEventKind::DashStart),
                "dash re-triggered {} ticks after the previous one ended",
                i + 1
            );
        }
        let events = tick(&mut body, &map, pressed(Action::Dash));
        assert!(events.contains(MovementEventKind::DashStart));
    }

    #[test]
    fn test_one_air_dash() {
        let (map, mut body) = air_body();
        body.params_mut().dash_cooldown_frames = 0;
        tick(&mut body, &map, pressed(Action::Dash));
        for _ in 0..20 {
            tick(&mut body, &map, none());
        }
        assert!(!body.is_dashing());
        assert!(!body.dash_available());

        let events = tick(&mut body, &map, pressed(Action::Dash));
        assert!(!events.contains(MovementEventKind::DashStart));
    }

    #[test]
    fn test_crouch_and_stand() {
        let map = floor();
        let mut body = standing(&map, 100.0);
        let feet = body.feet().y;

        let events = tick(&mut body, &map, held(Action::Crouch));
        assert!(events.contains(MovementEventKind::Crouch));
        assert_eq!(body.state(), S::Crouching);
        assert_eq!(body.size().y, params().crouch_height);
        assert_relative_eq!(body.feet().y, feet, epsilon = 1e-4);

        tick(&mut body, &map, none());
        assert_eq!(body.state(), S::Idle);
        assert_eq!(body.size().y, 40.0);
    }

    #[test]
    fn test_no_stand_without_headroom() {
        // Low ceiling spans x 200..400 with its underside 30 units above the floor
        let map = TileCollisionMap::new(vec![
            Platform::new(-1000.0, FLOOR_Y, 4000.0, 40.0),
            Platform::new(200.0, FLOOR_Y - 50.0, 200.0, 20.0),
        ]);
        let mut body = standing(&map, 100.0);
        let input = held(Action::Crouch).with_held(Action::Right);
        for _ in 0..120 {
            tick(&mut body, &map, input);
        }
        assert!(body.position().x > 200.0, "crouch walk did not reach the tunnel");

        tick(&mut body, &map, none());
        assert_eq!(body.state(), S::Crouching);
        assert!(body.is_crouched());

        tick(&mut body, &map, pressed(Action::Jump));
        assert_ne!(body.state(), S::Jumping, "jumping needs standing headroom");
        assert!(!map.overlaps_any(&body.rect()));
    }

    #[test]
    fn test_crouch_slide() {
        let map = floor();
        let mut body = standing(&map, 100.0);
        body.velocity.x = 300.0;
        body.state = S::Running;

        let events = tick(&mut body, &map, held(Action::Crouch));
        assert!(events.contains(MovementEventKind::SlideStart));
        assert_eq!(body.state(), S::CrouchSliding);
        assert!(body.is_crouched());

        let mut last = body.velocity().x;
        while body.state() == S::CrouchSliding {
            tick(&mut body, &map, held(Action::Crouch));
            assert!(body.velocity().x <= last);
            last = body.velocity().x;
        }
        assert_eq!(body.state(), S::Crouching);
        assert!(last < params().slide_stop_speed);
    }

    #[test]
    fn test_slide_release_returns_to_crouch() {
        let map = floor();
        let mut body = standing(&map, 100.0);
        body.velocity.x = 300.0;
        body.state = S::Running;
        tick(&mut body, &map, held(Action::Crouch));
        tick(&mut body, &map, none());
        assert_eq!(body.state(), S::Crouching);
    }

    #[test]
    fn test_walk_off_ledge_falls() {
        let map = TileCollisionMap::new(vec![Platform::new(0.0, FLOOR_Y, 200.0, 40.0)]);
        let mut body = standing(&map, 150.0);
        for _ in 0..30 {
            tick(&mut body, &map, held(Action::Right));
        }
        assert!(!body.is_grounded());
        assert_eq!(body.state(), S::Falling);
    }

    #[test]
    fn test_gravity_scale_zero_floats() {
        let (map, mut body) = air_body();
        let input = none();
        let ctx = StepContext::new(&map, &input, DT).with_gravity_scale(0.0);
        let mut events = EventQueue::new();
        for _ in 0..10 {
            body.step(&ctx, &mut events);
        }
        assert_eq!(body.velocity().y, 0.0);
        assert_eq!(body.position().y, 0.0);
    }

    #[test]
    fn test_apex_gravity_without_jump_held() {
        let (map, mut body) = air_body();
        let p = params();
        tick(&mut body, &map, none());
        assert_relative_eq!(
            body.velocity().y,
            p.fall_gravity * p.apex_gravity_multiplier * DT,
            epsilon = 1e-4
        );

        // Past the threshold full gravity applies again
        body.velocity.y = p.apex_speed_threshold + 10.0;
        let before = body.velocity().y;
        tick(&mut body, &map, none());
        assert_relative_eq!(body.velocity().y, before + p.fall_gravity * DT, epsilon = 1e-4);
    }

    #[test]
    fn test_respawn_matches_fresh_spawn() {
        let map = floor();
        let spawn = Vec2::new(100.0, FLOOR_Y - 40.0);
        let mut fresh = MovementBody::spawn(spawn, params(), &map);

        let mut used = MovementBody::spawn(Vec2::new(500.0, 0.0), params(), &map);
        for i in 0..90 {
            let input = match i % 30 {
                0 => pressed(Action::Jump),
                10 => pressed(Action::Dash),
                _ => held(Action::Left),
            };
            tick(&mut used, &map, input);
        }
        used.respawn(spawn, &map);
        assert_eq!(used, fresh);

        let script = [
            held(Action::Right),
            pressed(Action::Jump),
            held(Action::Jump),
            held(Action::Left),
            pressed(Action::Dash),
            none(),
        ];
        for i in 0..120 {
            let input = script[i % script.len()];
            tick(&mut fresh, &map, input);
            tick(&mut used, &map, input);
            assert_eq!(used, fresh, "diverged on tick {}", i);
        }
    }

    #[test]
    fn test_live_param_edit_applies_next_tick() {
        let map = floor();
        let mut body = standing(&map, 100.0);
        body.params_mut().jump_speed = 800.0;
        tick(&mut body, &map, pressed(Action::Jump));
        assert_relative_eq!(body.velocity().y, -800.0 + 1400.0 * DT, epsilon = 1e-3);
    }

    #[test]
    fn test_random_input_never_overlaps() {
        // Closed box with a few inner platforms of every surface
        let map = TileCollisionMap::new(vec![
            Platform::new(-40.0, 400.0, 880.0, 40.0),
            Platform::new(-40.0, -440.0, 880.0, 40.0),
            Platform::new(-40.0, -400.0, 40.0, 800.0),
            Platform::new(800.0, -400.0, 40.0, 800.0),
            Platform::new(100.0, 300.0, 120.0, 16.0).with_surface(SurfaceType::Icy),
            Platform::new(300.0, 260.0, 80.0, 140.0),
            Platform::new(450.0, 330.0, 100.0, 16.0).with_surface(SurfaceType::Bouncy),
            Platform::new(600.0, 200.0, 120.0, 16.0).with_surface(SurfaceType::Sticky),
            Platform::new(20.0, 380.0, 60.0, 20.0).with_surface(SurfaceType::Conveyor),
        ]);
        let mut body = MovementBody::spawn(Vec2::new(150.0, 100.0), params(), &map);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let actions = [
            Action::Left,
            Action::Right,
            Action::Up,
            Action::Down,
            Action::Crouch,
            Action::Jump,
            Action::Dash,
        ];

        let mut input = InputSnapshot::new();
        for i in 0..3000 {
            if i % 8 == 0 {
                input = InputSnapshot::new();
                for action in actions {
                    match rng.random_range(0..4) {
                        0 => input = input.with_held(action),
                        1 => input = input.with_pressed(action),
                        _ => {}
                    }
                }
            }
            tick(&mut body, &map, input);
            assert!(
                !map.overlaps_any(&body.rect()),
                "overlap on tick {} in state {} at {:?}",
                i,
                body.state(),
                body.position()
            );
        }
    }
}
