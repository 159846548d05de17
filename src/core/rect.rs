// Axis-aligned rectangles in world space (y grows downward)

use glam::Vec2;
use serde::Deserialize;

/// Penetration below this is treated as touching, not overlapping
pub const CONTACT_EPSILON: f32 = 1e-3;

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from a top-left position and a size
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Copy of this rectangle moved by `delta`
    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Whether width and height are both strictly positive and finite
    pub fn is_valid(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// True if the horizontal spans overlap by more than the contact epsilon
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.right() - other.left() > CONTACT_EPSILON && other.right() - self.left() > CONTACT_EPSILON
    }

    /// True if the vertical spans overlap by more than the contact epsilon
    pub fn overlaps_y(&self, other: &Rect) -> bool {
        self.bottom() - other.top() > CONTACT_EPSILON && other.bottom() - self.top() > CONTACT_EPSILON
    }

    /// True if the rectangles share interior area (edge contact does not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }

    /// Width of the shared horizontal span, zero when disjoint
    pub fn horizontal_overlap(&self, other: &Rect) -> f32 {
        (self.right().min(other.right()) - self.left().max(other.left())).max(0.0)
    }
}
