// Locomotion states

/// The one active locomotion state of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LocomotionState {
    /// Standing still on ground
    #[default]
    Idle,
    /// Moving horizontally on ground
    Running,
    /// Ducking on ground, short collision box
    Crouching,
    /// Sliding along the ground after crouching at speed
    CrouchSliding,
    /// In the air, rising from a jump
    Jumping,
    /// In the air, not rising from a jump
    Falling,
    /// Pressed against a wall, descending slowly
    WallSliding,
    /// In the air, rising from a wall jump
    WallJumping,
    /// Locked-velocity burst
    Dashing,
    /// Recovering from a long fall
    HardLanding,
}

impl LocomotionState {
    /// States that only exist with ground under the feet
    pub fn is_grounded(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Running | Self::Crouching | Self::CrouchSliding | Self::HardLanding
        )
    }

    /// States that only exist in the air
    pub fn is_airborne(&self) -> bool {
        matches!(
            self,
            Self::Jumping | Self::Falling | Self::WallSliding | Self::WallJumping
        )
    }

    /// States that use the short collision box
    pub fn is_crouched(&self) -> bool {
        matches!(self, Self::Crouching | Self::CrouchSliding)
    }

    /// Name exposed to HUD, debug overlays and logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Running => "RUNNING",
            Self::Crouching => "CROUCHING",
            Self::CrouchSliding => "CROUCH_SLIDING",
            Self::Jumping => "JUMPING",
            Self::Falling => "FALLING",
            Self::WallSliding => "WALL_SLIDING",
            Self::WallJumping => "WALL_JUMPING",
            Self::Dashing => "DASHING",
            Self::HardLanding => "HARD_LANDING",
        }
    }

    /// Get the animation name for this state
    pub fn animation_name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "run",
            Self::Crouching => "crouch",
            Self::CrouchSliding => "slide",
            Self::Jumping => "jump",
            Self::Falling => "fall",
            Self::WallSliding => "wall_slide",
            Self::WallJumping => "wall_jump",
            Self::Dashing => "dash",
            Self::HardLanding => "land_hard",
        }
    }
}

impl std::fmt::Display for LocomotionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How the last landing was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandingType {
    Soft,
    Hard,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [LocomotionState; 10] = [
        LocomotionState::Idle,
        LocomotionState::Running,
        LocomotionState::Crouching,
        LocomotionState::CrouchSliding,
        LocomotionState::Jumping,
        LocomotionState::Falling,
        LocomotionState::WallSliding,
        LocomotionState::WallJumping,
        LocomotionState::Dashing,
        LocomotionState::HardLanding,
    ];

    #[test]
    fn test_default_is_idle() {
        assert_eq!(LocomotionState::default(), LocomotionState::Idle);
    }

    #[test]
    fn test_ground_and_air_are_disjoint() {
        for state in ALL {
            assert!(
                !(state.is_grounded() && state.is_airborne()),
                "{} is both grounded and airborne",
                state
            );
        }
        // Dashing happens on the ground and in the air
        assert!(!LocomotionState::Dashing.is_grounded());
        assert!(!LocomotionState::Dashing.is_airborne());
    }

    #[test]
    fn test_crouched_states() {
        assert!(LocomotionState::Crouching.is_crouched());
        assert!(LocomotionState::CrouchSliding.is_crouched());
        assert!(!LocomotionState::Running.is_crouched());
    }

    #[test]
    fn test_names_unique() {
        let mut names = std::collections::HashSet::new();
        let mut anims = std::collections::HashSet::new();
        for state in ALL {
            assert!(names.insert(state.name()));
            assert!(anims.insert(state.animation_name()));
        }
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(LocomotionState::WallSliding.to_string(), "WALL_SLIDING");
    }
}
