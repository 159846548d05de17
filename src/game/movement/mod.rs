// Player movement core
//
// This module contains the deterministic platformer locomotion:
// - Tunable movement parameters and their RON loading
// - The movement body (position, velocity, collision box, frame timers)
// - The locomotion state machine run once per fixed tick
// - Transition events for cosmetic consumers
// - Optional per-room velocity modifiers

pub mod body;
pub mod controller;
pub mod events;
pub mod modifiers;
pub mod params;
pub mod state;

// Re-export commonly used types
pub use body::{BodySnapshot, FrameTimers, MovementBody};
pub use controller::{classify_landing, StepContext};
pub use events::{EventQueue, MovementEvent, MovementEventKind};
pub use modifiers::{
    apply_modifiers, Current, GravityWell, ModifierContext, ModifierEffect, VelocityModifier, Vine,
};
pub use params::{ConfigError, FeedbackTuning, MovementParams, BASE_FEEDBACK, BASE_PARAMS};
pub use state::{LandingType, LocomotionState};
