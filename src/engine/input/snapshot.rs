// Per-tick input snapshot and the raw key state it is derived from

use super::action::Action;

/// Compact set of actions, one bit per `Action`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet(u16);

impl ActionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    const fn bit(action: Action) -> u16 {
        1 << (action as u16)
    }

    pub fn insert(&mut self, action: Action) {
        self.0 |= Self::bit(action);
    }

    pub fn remove(&mut self, action: Action) {
        self.0 &= !Self::bit(action);
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0 & Self::bit(action) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Iterate the contained actions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(|a| self.contains(*a))
    }
}

/// Immutable view of the input for one fixed tick.
///
/// Edges are computed once when the snapshot is taken and stay stable for the
/// whole tick, no matter how many systems query it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    held: ActionSet,
    pressed: ActionSet,
    released: ActionSet,
}

impl InputSnapshot {
    /// Snapshot with nothing held
    pub fn new() -> Self {
        Self::default()
    }

    /// True on the tick an action went down
    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(action)
    }

    /// True while an action is down
    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(action)
    }

    /// True on the tick an action went up
    pub fn is_released(&self, action: Action) -> bool {
        self.released.contains(action)
    }

    /// Horizontal axis: -1 left, 0 none or both, 1 right
    pub fn horizontal(&self) -> f32 {
        let mut axis = 0.0;
        if self.is_held(Action::Left) {
            axis -= 1.0;
        }
        if self.is_held(Action::Right) {
            axis += 1.0;
        }
        axis
    }

    /// Vertical axis in world space (y grows downward): -1 up, 1 down
    pub fn vertical(&self) -> f32 {
        let mut axis = 0.0;
        if self.is_held(Action::Up) {
            axis -= 1.0;
        }
        if self.is_held(Action::Down) {
            axis += 1.0;
        }
        axis
    }

    /// True if nothing is held and no edge happened this tick
    pub fn is_idle(&self) -> bool {
        self.held.is_empty() && self.pressed.is_empty() && self.released.is_empty()
    }

    /// Mark an action as held without an edge
    pub fn with_held(mut self, action: Action) -> Self {
        self.held.insert(action);
        self
    }

    /// Mark an action as pressed this tick (and therefore held)
    pub fn with_pressed(mut self, action: Action) -> Self {
        self.pressed.insert(action);
        self.held.insert(action);
        self
    }

    /// Mark an action as released this tick
    pub fn with_released(mut self, action: Action) -> Self {
        self.released.insert(action);
        self.held.remove(action);
        self
    }
}

/// Raw key state accumulated between ticks.
///
/// Presses and releases are latched so a tap that starts and ends between two
/// snapshots still shows up as pressed (and released) on the next tick.
#[derive(Debug, Default)]
pub struct InputState {
    held: ActionSet,
    latched_pressed: ActionSet,
    latched_released: ActionSet,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action going down
    pub fn press(&mut self, action: Action) {
        if !self.held.contains(action) {
            self.held.insert(action);
            self.latched_pressed.insert(action);
        }
    }

    /// Register an action going up
    pub fn release(&mut self, action: Action) {
        if self.held.contains(action) {
            self.held.remove(action);
            self.latched_released.insert(action);
        }
    }

    /// Check the raw state of an action
    pub fn is_down(&self, action: Action) -> bool {
        self.held.contains(action)
    }

    /// Produce the snapshot for the next tick and clear the latches
    pub fn take_snapshot(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot {
            held: self.held,
            pressed: self.latched_pressed,
            released: self.latched_released,
        };
        self.latched_pressed.clear();
        self.latched_released.clear();
        snapshot
    }

    /// Drop every held key and latch (focus loss, room change)
    pub fn reset(&mut self) {
        self.held.clear();
        self.latched_pressed.clear();
        self.latched_released.clear();
    }
}
