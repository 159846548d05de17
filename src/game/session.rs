// Player session - one room, one body, driven by the fixed-step loop
//
// Per tick: input snapshot, room modifiers, locomotion step, feedback,
// camera, out-of-bounds respawn. Rendering only reads the result.

use glam::{Mat4, Vec2};

use crate::engine::camera::Camera;
use crate::engine::game_loop::Simulation;
use crate::engine::input::InputManager;
use crate::game::feedback::FeedbackLayer;
use crate::game::movement::{
    BodySnapshot, EventQueue, LocomotionState, MovementBody, MovementParams, StepContext,
};
use crate::game::room::Room;

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderFrame {
    /// Interpolated top-left of the collision box
    pub position: Vec2,
    pub size: Vec2,
    /// Squash/stretch applied around the feet
    pub scale: Vec2,
    pub facing_right: bool,
    pub state: LocomotionState,
    pub camera_position: Vec2,
    pub view_proj: Mat4,
    pub alpha: f32,
}

pub struct PlayerSession {
    room: Room,
    body: MovementBody,
    feedback: FeedbackLayer,
    camera: Camera,
    input: InputManager,
    events: EventQueue,
    last_frame: Option<RenderFrame>,
    ticks: u64,
    respawns: u32,
}

impl PlayerSession {
    pub fn new(room: Room, params: MovementParams, viewport: Vec2) -> Self {
        let body = MovementBody::spawn(room.spawn(), params, room.map());
        let mut camera = Camera::new(body.center(), viewport.x, viewport.y);
        camera.set_bounds(Some(room.bounds()));
        camera.snap_to(body.center(), body.facing_right());

        log::info!("Session started in room '{}'", room.name());
        Self {
            room,
            body,
            feedback: FeedbackLayer::new(params.feedback),
            camera,
            input: InputManager::default(),
            events: EventQueue::new(),
            last_frame: None,
            ticks: 0,
            respawns: 0,
        }
    }

    /// Swap rooms between ticks. The body respawns at the new spawn point.
    pub fn load_room(&mut self, room: Room) {
        log::info!("Switching to room '{}'", room.name());
        self.room = room;
        self.body.respawn(self.room.spawn(), self.room.map());
        self.camera.set_bounds(Some(self.room.bounds()));
        self.camera.snap_to(self.body.center(), self.body.facing_right());
        self.feedback.reset();
        self.events.clear();
    }

    pub fn respawn(&mut self) {
        self.respawns += 1;
        self.body.respawn(self.room.spawn(), self.room.map());
        self.camera.snap_to(self.body.center(), self.body.facing_right());
    }

    /// Replace movement tuning; takes effect on the next tick
    pub fn set_params(&mut self, params: MovementParams) {
        *self.body.params_mut() = params;
        self.feedback.set_tuning(params.feedback);
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn body(&self) -> &MovementBody {
        &self.body
    }

    pub fn snapshot(&self) -> BodySnapshot {
        self.body.snapshot()
    }

    pub fn feedback(&self) -> &FeedbackLayer {
        &self.feedback
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn input(&self) -> &InputManager {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputManager {
        &mut self.input
    }

    pub fn last_frame(&self) -> Option<&RenderFrame> {
        self.last_frame.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn respawns(&self) -> u32 {
        self.respawns
    }
}

impl Simulation for PlayerSession {
    fn update(&mut self, dt: f32) {
        let input = self.input.snapshot();

        let effect = self.body.apply_modifiers(self.room.modifiers(), &input, dt);
        let ctx = StepContext::new(self.room.map(), &input, dt)
            .with_gravity_scale(effect.gravity_scale);
        self.body.step(&ctx, &mut self.events);

        for event in self.events.drain() {
            self.feedback.on_event(&event);
        }
        self.feedback.update(dt);

        self.camera
            .follow(self.body.center(), self.body.facing_right(), dt);

        if self.room.is_out_of_bounds(&self.body.rect()) {
            log::info!(
                "Body left room '{}' at ({:.1}, {:.1})",
                self.room.name(),
                self.body.position().x,
                self.body.position().y
            );
            self.respawn();
        }
        self.ticks += 1;
    }

    fn render(&mut self, alpha: f32) {
        let shake = self.feedback.shake_offset();
        self.last_frame = Some(RenderFrame {
            position: self.body.interpolated_position(alpha),
            size: self.body.size(),
            scale: self.feedback.scale(),
            facing_right: self.body.facing_right(),
            state: self.body.state(),
            camera_position: self.camera.render_position(shake),
            view_proj: self.camera.render_view_proj(shake),
            alpha,
        });
    }
}
