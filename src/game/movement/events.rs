// Movement events emitted by the state machine for cosmetic consumers

use glam::Vec2;

use crate::engine::physics::SurfaceType;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementEventKind {
    JumpLaunch,
    WallJump,
    SoftLanding,
    HardLanding,
    Bounce,
    DashStart,
    DashEnd,
    WallSlideStart,
    TurnAround,
    Crouch,
    SlideStart,
}

/// One transition worth reacting to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementEvent {
    pub kind: MovementEventKind,
    /// Bottom-center of the collision box when the event fired
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing_right: bool,
    /// Wall side for wall events, 0 otherwise
    pub wall_side: i8,
    /// Surface under the feet (or the touched wall)
    pub surface: SurfaceType,
}

/// Events produced during ticks, drained by the feedback layer
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<MovementEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: MovementEvent) {
        log::trace!("Movement event {:?}", event.kind);
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MovementEvent> {
        self.events.iter()
    }

    /// Check whether an event of this kind is queued
    pub fn contains(&self, kind: MovementEventKind) -> bool {
        self.events.iter().any(|e| e.kind == kind)
    }

    /// Take every queued event in emission order
    pub fn drain(&mut self) -> std::vec::Drain<'_, MovementEvent> {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
