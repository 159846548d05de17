// Input manager - turns winit key events into per-tick snapshots

use std::collections::HashSet;

use super::action::{Action, InputSource};
use super::config::InputConfig;
use super::snapshot::{InputSnapshot, InputState};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Coordinates key bindings and raw key state for the local player
pub struct InputManager {
    /// Key bindings
    config: InputConfig,

    /// Raw key state accumulated since the last snapshot
    state: InputState,

    /// Physical keys currently down, so an action bound to several keys
    /// stays held until the last of them goes up
    keys_down: HashSet<KeyCode>,

    /// Snapshot handed out for the current tick
    current: InputSnapshot,
}

impl InputManager {
    /// Create a new input manager with the given bindings
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            state: InputState::new(),
            keys_down: HashSet::new(),
            current: InputSnapshot::new(),
        }
    }

    /// Process a keyboard event from winit
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        // Only process physical key presses
        if let PhysicalKey::Code(key_code) = event.physical_key {
            self.process_key(key_code, event.state == ElementState::Pressed, event.repeat);
        }
    }

    /// Apply a raw key transition. Returns the bound action, if any.
    pub fn process_key(&mut self, key: KeyCode, pressed: bool, repeat: bool) -> Option<Action> {
        let action = self.config.get_action(InputSource::key(key))?;
        if pressed {
            if !repeat {
                self.keys_down.insert(key);
                self.state.press(action);
            }
        } else {
            self.keys_down.remove(&key);
            let still_down = self
                .keys_down
                .iter()
                .any(|&other| self.config.get_action(InputSource::key(other)) == Some(action));
            if !still_down {
                self.state.release(action);
            }
        }
        Some(action)
    }

    /// Compute edges for the next fixed tick.
    /// Call this exactly once per tick, before the simulation reads input.
    pub fn snapshot(&mut self) -> InputSnapshot {
        self.current = self.state.take_snapshot();
        self.current
    }

    /// Snapshot taken by the last `snapshot` call
    pub fn current(&self) -> &InputSnapshot {
        &self.current
    }

    /// Drop all held keys, e.g. when the window loses focus
    pub fn reset(&mut self) {
        log::debug!("Input state reset");
        self.state.reset();
        self.keys_down.clear();
        self.current = InputSnapshot::new();
    }

    /// Get the key bindings
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Get mutable key bindings
    pub fn config_mut(&mut self) -> &mut InputConfig {
        &mut self.config
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(InputConfig::with_defaults())
    }
}
