// Input handling system
//
// Keyboard events are mapped to logical actions and accumulated as raw key
// state. Once per fixed tick the manager turns that state into an immutable
// `InputSnapshot` with pressed / held / released edges.
//
// ## Architecture
//
// - `action`: Defines logical actions and default key bindings
// - `config`: Input configuration and remapping
// - `snapshot`: Raw key state and the per-tick snapshot
// - `manager`: Glue between winit events, bindings and snapshots
//
// ## Usage Example
//
// ```rust
// use rusted_leap::engine::input::{Action, InputManager};
//
// let mut input = InputManager::default();
//
// // In the event loop
// input.process_keyboard_event(&key_event);
//
// // At the start of each fixed tick
// let snapshot = input.snapshot();
// if snapshot.is_pressed(Action::Jump) {
//     // Jump edge this tick
// }
// ```

pub mod action;
pub mod config;
pub mod manager;
pub mod snapshot;

// Re-export commonly used types
pub use action::{Action, InputSource};
pub use config::InputConfig;
pub use manager::InputManager;
pub use snapshot::{ActionSet, InputSnapshot, InputState};
