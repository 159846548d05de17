// Follow camera and viewport system for 2D rendering (y grows downward)

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

use crate::core::math::{lerp, smoothing_factor};
use crate::core::Rect;

/// How the camera chases its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowSettings {
    /// Exponential smoothing rate toward the target (1/s)
    pub follow_rate: f32,
    /// Horizontal offset in the facing direction (world units)
    pub lookahead_distance: f32,
    /// Smoothing rate of the lookahead offset (1/s)
    pub lookahead_rate: f32,
    /// Constant vertical offset added to the target (negative looks up)
    pub vertical_offset: f32,
}

impl Default for FollowSettings {
    fn default() -> Self {
        Self {
            follow_rate: 8.0,
            lookahead_distance: 48.0,
            lookahead_rate: 3.0,
            vertical_offset: -24.0,
        }
    }
}

/// 2D follow camera
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera center in world space
    pub position: Vec2,
    /// Camera zoom level (1.0 = normal, 2.0 = zoomed in 2x)
    pub zoom: f32,
    /// Viewport width
    viewport_width: f32,
    /// Viewport height
    viewport_height: f32,
    /// World rectangle the view must stay inside
    bounds: Option<Rect>,
    settings: FollowSettings,
    /// Current eased lookahead offset
    lookahead: f32,
    /// View-projection matrix
    view_proj: Mat4,
}

impl Camera {
    /// Create a new camera
    pub fn new(position: Vec2, viewport_width: f32, viewport_height: f32) -> Self {
        let mut camera = Self {
            position,
            zoom: 1.0,
            viewport_width,
            viewport_height,
            bounds: None,
            settings: FollowSettings::default(),
            lookahead: 0.0,
            view_proj: Mat4::IDENTITY,
        };
        camera.update_view_proj();
        camera
    }

    /// Replace the follow settings
    pub fn with_settings(mut self, settings: FollowSettings) -> Self {
        self.settings = settings;
        self
    }

    fn half_extents(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height) / (2.0 * self.zoom)
    }

    fn projection_at(&self, center: Vec2) -> Mat4 {
        let half = self.half_extents();
        // Bottom of the screen is the larger y
        Mat4::orthographic_rh(
            center.x - half.x,
            center.x + half.x,
            center.y + half.y,
            center.y - half.y,
            -100.0, // Near plane
            100.0,  // Far plane
        )
    }

    /// Update the view-projection matrix
    fn update_view_proj(&mut self) {
        self.view_proj = self.projection_at(self.position);
    }

    /// Restrict the view to a world rectangle (usually the room)
    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds;
        self.position = self.clamp_to_bounds(self.position);
        self.update_view_proj();
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Clamp a candidate center so the view stays inside the bounds.
    /// A room smaller than the view is centred on that axis.
    pub fn clamp_to_bounds(&self, center: Vec2) -> Vec2 {
        let Some(bounds) = self.bounds else {
            return center;
        };
        let half = self.half_extents();
        let axis = |value: f32, min: f32, max: f32, half: f32| {
            if max - min <= half * 2.0 {
                (min + max) * 0.5
            } else {
                value.clamp(min + half, max - half)
            }
        };
        Vec2::new(
            axis(center.x, bounds.left(), bounds.right(), half.x),
            axis(center.y, bounds.top(), bounds.bottom(), half.y),
        )
    }

    /// Ease toward `target` (usually the body center) for one fixed step
    pub fn follow(&mut self, target: Vec2, facing_right: bool, dt: f32) {
        let wanted_lookahead = if facing_right {
            self.settings.lookahead_distance
        } else {
            -self.settings.lookahead_distance
        };
        self.lookahead = lerp(
            self.lookahead,
            wanted_lookahead,
            smoothing_factor(self.settings.lookahead_rate, dt),
        );

        let desired = target + Vec2::new(self.lookahead, self.settings.vertical_offset);
        let t = smoothing_factor(self.settings.follow_rate, dt);
        self.position = self.clamp_to_bounds(self.position.lerp(desired, t));
        self.update_view_proj();
    }

    /// Jump straight to the target with no easing (spawn, respawn, room entry)
    pub fn snap_to(&mut self, target: Vec2, facing_right: bool) {
        self.lookahead = if facing_right {
            self.settings.lookahead_distance
        } else {
            -self.settings.lookahead_distance
        };
        let desired = target + Vec2::new(self.lookahead, self.settings.vertical_offset);
        self.position = self.clamp_to_bounds(desired);
        self.update_view_proj();
    }

    /// Set camera position
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.update_view_proj();
    }

    /// Set camera zoom
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.max(0.1); // Prevent zoom from being too small
        self.position = self.clamp_to_bounds(self.position);
        self.update_view_proj();
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.position = self.clamp_to_bounds(self.position);
        self.update_view_proj();
    }

    /// Center used for drawing: the simulated position plus cosmetic shake
    pub fn render_position(&self, shake_offset: Vec2) -> Vec2 {
        self.position + shake_offset
    }

    /// Get the view-projection matrix
    pub fn view_proj_matrix(&self) -> Mat4 {
        self.view_proj
    }

    /// View-projection matrix with a render-time shake offset applied
    pub fn render_view_proj(&self, shake_offset: Vec2) -> Mat4 {
        self.projection_at(self.render_position(shake_offset))
    }

    /// Convert screen coordinates (pixels, origin top-left) to world coordinates
    pub fn screen_to_world(&self, screen_pos: Vec2) -> Vec2 {
        let viewport = Vec2::new(self.viewport_width, self.viewport_height);
        self.position + (screen_pos - viewport * 0.5) / self.zoom
    }

    /// Convert world coordinates to screen coordinates (pixels, origin top-left)
    pub fn world_to_screen(&self, world_pos: Vec2) -> Vec2 {
        let viewport = Vec2::new(self.viewport_width, self.viewport_height);
        (world_pos - self.position) * self.zoom + viewport * 0.5
    }

    /// Get the viewport bounds in world coordinates
    pub fn viewport_bounds(&self) -> Viewport {
        let half = self.half_extents();
        Viewport {
            min: self.position - half,
            max: self.position + half,
        }
    }
}

/// Viewport bounds in world coordinates
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub min: Vec2,
    pub max: Vec2,
}

impl Viewport {
    /// Check if a point is inside the viewport
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Check if a rectangle intersects the viewport
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        rect.right() >= self.min.x
            && rect.left() <= self.max.x
            && rect.bottom() >= self.min.y
            && rect.top() <= self.max.y
    }
}

/// Camera uniform for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Create a camera uniform including the render-time shake offset
    pub fn new(camera: &Camera, shake_offset: Vec2) -> Self {
        Self {
            view_proj: camera.render_view_proj(shake_offset).to_cols_array_2d(),
        }
    }
}
