// Movement tuning - one flat record per body, loadable from RON
// Per-second values are multiplied by the fixed tick; *_frames values are tick counts

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Cosmetic tuning read by the feedback layer, never by physics
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeedbackTuning {
    // Squash / stretch targets as [x, y] scale
    pub jump_stretch: [f32; 2],
    pub wall_jump_stretch: [f32; 2],
    pub soft_land_squash: [f32; 2],
    pub hard_land_squash: [f32; 2],
    pub bounce_stretch: [f32; 2],
    pub dash_stretch: [f32; 2],
    pub wall_slide_squash: [f32; 2],
    pub crouch_squash: [f32; 2],
    pub slide_squash: [f32; 2],
    /// Exponential relax rate back to (1, 1) per second
    pub scale_return_speed: f32,

    // Screen shake
    pub hard_land_shake: f32,
    pub hard_land_shake_frames: u32,
    pub bounce_shake: f32,
    pub bounce_shake_frames: u32,
    pub dash_shake: f32,
    pub dash_shake_frames: u32,

    // Particles
    pub dust_count: u32,
    pub hard_land_dust_count: u32,
    pub dash_trail_count: u32,
    pub particle_speed_min: f32,
    pub particle_speed_max: f32,
    pub particle_lifetime_frames: u32,
}

/// Default cosmetic tuning
pub const BASE_FEEDBACK: FeedbackTuning = FeedbackTuning {
    jump_stretch: [0.8, 1.25],
    wall_jump_stretch: [0.85, 1.2],
    soft_land_squash: [1.2, 0.8],
    hard_land_squash: [1.4, 0.65],
    bounce_stretch: [0.75, 1.3],
    dash_stretch: [1.3, 0.8],
    wall_slide_squash: [0.9, 1.1],
    crouch_squash: [1.15, 0.85],
    slide_squash: [1.25, 0.75],
    scale_return_speed: 12.0,

    hard_land_shake: 6.0,
    hard_land_shake_frames: 12,
    bounce_shake: 3.0,
    bounce_shake_frames: 8,
    dash_shake: 2.0,
    dash_shake_frames: 6,

    dust_count: 5,
    hard_land_dust_count: 14,
    dash_trail_count: 8,
    particle_speed_min: 40.0,
    particle_speed_max: 140.0,
    particle_lifetime_frames: 20,
};

impl Default for FeedbackTuning {
    fn default() -> Self {
        BASE_FEEDBACK
    }
}

/// Every tunable of the locomotion state machine
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovementParams {
    // Body
    /// Standing collision box width
    pub body_width: f32,
    /// Standing collision box height
    pub body_height: f32,
    /// Collision box height while crouching or sliding
    pub crouch_height: f32,

    // Running
    pub max_run_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// Multiplies `deceleration` when input opposes the current velocity
    pub turn_multiplier: f32,
    /// Scales accel/decel while airborne (0.0 = none, 1.0 = full)
    pub air_control: f32,

    // Gravity
    pub rise_gravity: f32,
    pub fall_gravity: f32,
    pub apex_gravity_multiplier: f32,
    pub apex_speed_threshold: f32,
    pub max_fall_speed: f32,
    /// Fall speed cap multiplier while holding down
    pub fast_fall_multiplier: f32,

    // Jumping
    pub jump_speed: f32,
    pub jump_cut_multiplier: f32,
    pub coyote_frames: u32,
    pub jump_buffer_frames: u32,

    // Walls
    pub wall_slide_base_speed: f32,
    pub wall_slide_grip_speed: f32,
    pub wall_slide_acceleration: f32,
    pub wall_jump_horizontal_speed: f32,
    pub wall_jump_vertical_speed: f32,
    pub wall_jump_lockout_frames: u32,
    pub wall_stick_frames: u32,
    pub wall_jump_coyote_frames: u32,

    // Dash
    pub dash_speed: f32,
    pub dash_duration_frames: u32,
    pub dash_cooldown_frames: u32,
    /// Frames of frozen velocity before the dash moves
    pub dash_windup_frames: u32,
    /// Extra max run speed granted when a dash ends
    pub dash_end_boost: f32,
    /// How fast the exit boost decays (units/s per second)
    pub dash_boost_decay: f32,

    // Crouch / slide
    pub crouch_speed: f32,
    pub slide_initial_speed: f32,
    pub slide_friction: f32,
    pub slide_min_speed: f32,
    pub slide_stop_speed: f32,

    // Landing
    pub soft_land_threshold_frames: u32,
    pub hard_land_threshold_frames: u32,
    pub hard_land_recovery_frames: u32,
    /// Slower impacts on bouncy ground land normally
    pub bounce_min_impact_speed: f32,

    pub feedback: FeedbackTuning,
}

/// Default movement tuning
pub const BASE_PARAMS: MovementParams = MovementParams {
    body_width: 24.0,
    body_height: 40.0,
    crouch_height: 24.0,

    max_run_speed: 300.0,
    acceleration: 2000.0,
    deceleration: 2400.0,
    turn_multiplier: 1.8,
    air_control: 0.65,

    rise_gravity: 1400.0,
    fall_gravity: 2200.0,
    apex_gravity_multiplier: 0.5,
    apex_speed_threshold: 60.0,
    max_fall_speed: 900.0,
    fast_fall_multiplier: 1.4,

    jump_speed: 560.0,
    jump_cut_multiplier: 0.5,
    coyote_frames: 6,
    jump_buffer_frames: 6,

    wall_slide_base_speed: 220.0,
    wall_slide_grip_speed: 90.0,
    wall_slide_acceleration: 600.0,
    wall_jump_horizontal_speed: 320.0,
    wall_jump_vertical_speed: 520.0,
    wall_jump_lockout_frames: 10,
    wall_stick_frames: 8,
    wall_jump_coyote_frames: 6,

    dash_speed: 720.0,
    dash_duration_frames: 10,
    dash_cooldown_frames: 30,
    dash_windup_frames: 2,
    dash_end_boost: 80.0,
    dash_boost_decay: 400.0,

    crouch_speed: 90.0,
    slide_initial_speed: 420.0,
    slide_friction: 600.0,
    slide_min_speed: 210.0,
    slide_stop_speed: 60.0,

    soft_land_threshold_frames: 12,
    hard_land_threshold_frames: 35,
    hard_land_recovery_frames: 12,
    bounce_min_impact_speed: 150.0,

    feedback: BASE_FEEDBACK,
};

impl Default for MovementParams {
    fn default() -> Self {
        BASE_PARAMS
    }
}

/// Failure to load or validate tuning
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse movement params: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("{field} is out of range ({value})")]
    OutOfRange { field: &'static str, value: f32 },

    #[error("soft landing threshold ({soft}) exceeds hard landing threshold ({hard})")]
    LandingThresholds { soft: u32, hard: u32 },
}

impl MovementParams {
    /// Parse tuning from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let params: Self = ron::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Load tuning from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params = Self::from_ron_str(&text)?;
        log::info!("Loaded movement params from {}", path.display());
        Ok(params)
    }

    /// Range checks done by the configuration layer. The state machine
    /// itself trusts whatever values it is handed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("body_width", self.body_width),
            ("body_height", self.body_height),
            ("crouch_height", self.crouch_height),
            ("max_run_speed", self.max_run_speed),
            ("max_fall_speed", self.max_fall_speed),
            ("dash_speed", self.dash_speed),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        let non_negative = [
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("turn_multiplier", self.turn_multiplier),
            ("rise_gravity", self.rise_gravity),
            ("fall_gravity", self.fall_gravity),
            ("apex_gravity_multiplier", self.apex_gravity_multiplier),
            ("fast_fall_multiplier", self.fast_fall_multiplier),
            ("jump_speed", self.jump_speed),
            ("wall_slide_acceleration", self.wall_slide_acceleration),
            ("slide_friction", self.slide_friction),
            ("dash_boost_decay", self.dash_boost_decay),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        let unit = [
            ("air_control", self.air_control),
            ("jump_cut_multiplier", self.jump_cut_multiplier),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        if self.crouch_height > self.body_height {
            return Err(ConfigError::OutOfRange {
                field: "crouch_height",
                value: self.crouch_height,
            });
        }

        if self.soft_land_threshold_frames > self.hard_land_threshold_frames {
            return Err(ConfigError::LandingThresholds {
                soft: self.soft_land_threshold_frames,
                hard: self.hard_land_threshold_frames,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = MovementParams::default();
        assert_eq!(params.max_run_speed, 300.0);
        assert_eq!(params.hard_land_threshold_frames, 35);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let params = MovementParams::from_ron_str("(max_run_speed: 250.0, coyote_frames: 4)")
            .expect("partial params should parse");
        assert_eq!(params.max_run_speed, 250.0);
        assert_eq!(params.coyote_frames, 4);
        assert_eq!(params.jump_speed, BASE_PARAMS.jump_speed);
    }

    #[test]
    fn test_nested_feedback_tuning() {
        let params = MovementParams::from_ron_str(
            "(feedback: (jump_stretch: (0.7, 1.4), hard_land_shake: 9.0))",
        )
        .expect("nested tuning should parse");
        assert_eq!(params.feedback.jump_stretch, [0.7, 1.4]);
        assert_eq!(params.feedback.hard_land_shake, 9.0);
        assert_eq!(params.feedback.dust_count, BASE_FEEDBACK.dust_count);
    }

    #[test]
    fn test_parse_error() {
        let err = MovementParams::from_ron_str("(max_run_speed: fast)").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_negative_gravity_rejected() {
        let err = MovementParams::from_ron_str("(fall_gravity: -10.0)").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "fall_gravity",
                ..
            }
        ));
    }

    #[test]
    fn test_landing_thresholds_order() {
        let err = MovementParams::from_ron_str(
            "(soft_land_threshold_frames: 40, hard_land_threshold_frames: 35)",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::LandingThresholds { .. }));
    }

    #[test]
    fn test_shipped_params_file() {
        let params = MovementParams::from_ron_str(include_str!("../../../assets/movement.ron"))
            .expect("shipped movement.ron must be valid");
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = MovementParams::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
