// Surface material table
//
// Pure lookup from a platform's surface tag to the coefficients the movement
// controller applies during its ground step. Nothing here touches geometry.

use serde::Deserialize;

/// Material label attached to a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum SurfaceType {
    #[default]
    Normal,
    Icy,
    Bouncy,
    Sticky,
    Conveyor,
}

/// Coefficients consumed by the movement controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceProps {
    /// Multiplies ground deceleration (0.1 = ice, 4.0 = glue)
    pub friction_multiplier: f32,
    /// Fraction of impact speed reflected upward on landing
    pub bounce_coefficient: Option<f32>,
    /// Multiplies the top ground speed while standing on the surface
    pub drag_multiplier: Option<f32>,
    /// Horizontal drift in units/second added while grounded
    pub conveyor_velocity: Option<f32>,
    /// Debug/editor tint (RGBA)
    pub color: [f32; 4],
}

const NORMAL: SurfaceProps = SurfaceProps {
    friction_multiplier: 1.0,
    bounce_coefficient: None,
    drag_multiplier: None,
    conveyor_velocity: None,
    color: [0.45, 0.45, 0.5, 1.0],
};

const ICY: SurfaceProps = SurfaceProps {
    friction_multiplier: 0.1,
    bounce_coefficient: None,
    drag_multiplier: None,
    conveyor_velocity: None,
    color: [0.7, 0.9, 1.0, 1.0],
};

const BOUNCY: SurfaceProps = SurfaceProps {
    friction_multiplier: 1.0,
    bounce_coefficient: Some(0.85),
    drag_multiplier: None,
    conveyor_velocity: None,
    color: [1.0, 0.4, 0.8, 1.0],
};

const STICKY: SurfaceProps = SurfaceProps {
    friction_multiplier: 4.0,
    bounce_coefficient: None,
    drag_multiplier: Some(0.6),
    conveyor_velocity: None,
    color: [0.55, 0.8, 0.2, 1.0],
};

const CONVEYOR: SurfaceProps = SurfaceProps {
    friction_multiplier: 1.0,
    bounce_coefficient: None,
    drag_multiplier: None,
    conveyor_velocity: Some(90.0),
    color: [0.9, 0.65, 0.1, 1.0],
};

/// Look up the properties of a surface tag
pub const fn surface_props(surface: SurfaceType) -> SurfaceProps {
    match surface {
        SurfaceType::Normal => NORMAL,
        SurfaceType::Icy => ICY,
        SurfaceType::Bouncy => BOUNCY,
        SurfaceType::Sticky => STICKY,
        SurfaceType::Conveyor => CONVEYOR,
    }
}

impl SurfaceType {
    pub fn props(self) -> SurfaceProps {
        surface_props(self)
    }
}
