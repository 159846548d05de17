// Logical action definitions and default key mappings

use winit::keyboard::KeyCode;

/// Every logical action the movement core and its collaborators read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Directions
    Up,
    Down,
    Left,
    Right,

    // Movement
    Jump,
    Dash,
    Crouch,

    // Ability slots (read by layers above the movement core)
    Ability1,
    Ability2,
    Ability3,

    // Meta actions
    Pause,
    Menu,
}

impl Action {
    /// All actions, in declaration order
    pub const ALL: [Action; 12] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Jump,
        Action::Dash,
        Action::Crouch,
        Action::Ability1,
        Action::Ability2,
        Action::Ability3,
        Action::Pause,
        Action::Menu,
    ];
}

/// Represents a physical input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Keyboard(KeyCode),
    // Future: Add controller support
    // GamepadButton(gilrs::Button),
}

impl InputSource {
    /// Create a keyboard input source
    pub fn key(code: KeyCode) -> Self {
        Self::Keyboard(code)
    }
}

/// Default keyboard bindings: arrows and WASD for directions
pub fn default_bindings() -> Vec<(InputSource, Action)> {
    vec![
        // Directions
        (InputSource::key(KeyCode::ArrowUp), Action::Up),
        (InputSource::key(KeyCode::ArrowDown), Action::Down),
        (InputSource::key(KeyCode::ArrowLeft), Action::Left),
        (InputSource::key(KeyCode::ArrowRight), Action::Right),
        (InputSource::key(KeyCode::KeyW), Action::Up),
        (InputSource::key(KeyCode::KeyS), Action::Down),
        (InputSource::key(KeyCode::KeyA), Action::Left),
        (InputSource::key(KeyCode::KeyD), Action::Right),
        // Movement
        (InputSource::key(KeyCode::Space), Action::Jump),
        (InputSource::key(KeyCode::KeyZ), Action::Jump),
        (InputSource::key(KeyCode::ShiftLeft), Action::Dash),
        (InputSource::key(KeyCode::KeyX), Action::Dash),
        (InputSource::key(KeyCode::KeyC), Action::Crouch),
        // Abilities
        (InputSource::key(KeyCode::KeyJ), Action::Ability1),
        (InputSource::key(KeyCode::KeyK), Action::Ability2),
        (InputSource::key(KeyCode::KeyL), Action::Ability3),
    ]
}

/// Bindings that are always active regardless of remapping
pub fn global_bindings() -> Vec<(InputSource, Action)> {
    vec![
        (InputSource::key(KeyCode::Escape), Action::Menu),
        (InputSource::key(KeyCode::KeyP), Action::Pause),
    ]
}
