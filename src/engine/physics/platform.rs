use serde::Deserialize;

use super::surface::SurfaceType;
use crate::core::Rect;

/// Static solid rectangle owned by the collision map of the current room
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    #[serde(default)]
    pub surface: SurfaceType,
}

impl Platform {
    /// Create a plain platform
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            surface: SurfaceType::Normal,
        }
    }

    /// Tag this platform with a surface material
    pub fn with_surface(mut self, surface: SurfaceType) -> Self {
        self.surface = surface;
        self
    }
}
