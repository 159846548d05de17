// Tile collision map
//
// Holds the static platforms of the current room and answers overlap,
// movement resolution and contact queries for axis-aligned bodies.
// Material behaviour (friction, bounce, drift) is not applied here; the map
// only reports which platform was touched.

use glam::Vec2;

use super::platform::Platform;
use super::surface::SurfaceType;
use crate::core::{Rect, CONTACT_EPSILON};

/// Platforms this short or shorter are steps, not walls
pub const MIN_WALL_HEIGHT: f32 = 8.0;

/// How far below the feet a platform still counts as ground
pub const GROUND_PROBE_DISTANCE: f32 = 0.5;

/// Width of the side probe used for wall contact
const WALL_PROBE_WIDTH: f32 = 1.0;

/// Vertical inset of the wall probe so floors and ceilings are not walls
const WALL_PROBE_INSET: f32 = 2.0;

/// Upper bound on push-out passes for bodies already inside geometry
const MAX_DEPENETRATION_PASSES: usize = 4;

/// Outcome of moving a body through the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    /// Corrected top-left position of the body
    pub position: Vec2,
    /// The body was stopped by a floor this move
    pub grounded: bool,
    /// The body was stopped by a ceiling this move
    pub ceiling: bool,
    /// Side of a wall that blocked horizontal movement (-1 left, 1 right, 0 none)
    pub wall_hit: i8,
    /// The body started or ended inside geometry and was pushed out
    pub depenetrated: bool,
}

/// Static collision geometry for one room
#[derive(Debug, Clone, Default)]
pub struct TileCollisionMap {
    platforms: Vec<Platform>,
}

impl TileCollisionMap {
    /// Create a map from a platform list. Platforms must not overlap each other.
    pub fn new(platforms: Vec<Platform>) -> Self {
        log::debug!("Collision map built with {} platforms", platforms.len());
        Self { platforms }
    }

    /// All platforms in authoring order
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Check whether a rectangle overlaps any platform
    pub fn overlaps_any(&self, rect: &Rect) -> bool {
        self.platforms.iter().any(|p| rect.overlaps(&p.rect))
    }

    /// Move `body` by `delta`, horizontal pass first, then vertical.
    ///
    /// Each pass is swept against platforms that share the other axis' span,
    /// so a fast body stops at the first face in its path instead of
    /// tunnelling. A blocked axis has its velocity component zeroed.
    pub fn resolve_move(&self, body: Rect, velocity: &mut Vec2, delta: Vec2) -> MoveResult {
        let mut rect = body;
        let mut result = MoveResult {
            position: body.position(),
            grounded: false,
            ceiling: false,
            wall_hit: 0,
            depenetrated: false,
        };

        // Horizontal pass
        if delta.x != 0.0 {
            let (new_x, blocked) = self.sweep_x(&rect, delta.x);
            rect.x = new_x;
            if blocked {
                result.wall_hit = if delta.x > 0.0 { 1 } else { -1 };
                velocity.x = 0.0;
            }
        }

        // Vertical pass
        if delta.y != 0.0 {
            let (new_y, blocked) = self.sweep_y(&rect, delta.y);
            rect.y = new_y;
            if blocked {
                if delta.y > 0.0 {
                    result.grounded = true;
                } else {
                    result.ceiling = true;
                }
                velocity.y = 0.0;
            }
        }

        self.depenetrate(&mut rect, velocity, &mut result);

        result.position = rect.position();
        result
    }

    fn sweep_x(&self, rect: &Rect, dx: f32) -> (f32, bool) {
        let mut new_x = rect.x + dx;
        let mut blocked = false;

        for platform in &self.platforms {
            let p = &platform.rect;
            if !rect.overlaps_y(p) {
                continue;
            }

            if dx > 0.0 {
                if p.left() >= rect.right() - CONTACT_EPSILON {
                    let limit = p.left() - rect.width;
                    if limit < new_x {
                        new_x = limit;
                        blocked = true;
                    }
                }
            } else if p.right() <= rect.left() + CONTACT_EPSILON {
                let limit = p.right();
                if limit > new_x {
                    new_x = limit;
                    blocked = true;
                }
            }
        }

        (new_x, blocked)
    }

    fn sweep_y(&self, rect: &Rect, dy: f32) -> (f32, bool) {
        let mut new_y = rect.y + dy;
        let mut blocked = false;

        for platform in &self.platforms {
            let p = &platform.rect;
            if !rect.overlaps_x(p) {
                continue;
            }

            if dy > 0.0 {
                if p.top() >= rect.bottom() - CONTACT_EPSILON {
                    let limit = p.top() - rect.height;
                    if limit < new_y {
                        new_y = limit;
                        blocked = true;
                    }
                }
            } else if p.bottom() <= rect.top() + CONTACT_EPSILON {
                let limit = p.bottom();
                if limit > new_y {
                    new_y = limit;
                    blocked = true;
                }
            }
        }

        (new_y, blocked)
    }

    /// Push a body out of any platform it still overlaps.
    ///
    /// Each overlap is resolved along the axis of minimal penetration. When
    /// both axes penetrate equally the vertical axis wins, and an equal
    /// up/down choice pushes the body up.
    fn depenetrate(&self, rect: &mut Rect, velocity: &mut Vec2, result: &mut MoveResult) {
        for _ in 0..MAX_DEPENETRATION_PASSES {
            let mut moved = false;

            for platform in &self.platforms {
                let p = &platform.rect;
                if !rect.overlaps(p) {
                    continue;
                }

                let push_left = rect.right() - p.left();
                let push_right = p.right() - rect.left();
                let push_up = rect.bottom() - p.top();
                let push_down = p.bottom() - rect.top();

                let pen_x = push_left.min(push_right);
                let pen_y = push_up.min(push_down);

                if pen_y <= pen_x {
                    if push_up <= push_down {
                        rect.y = p.top() - rect.height;
                        result.grounded = true;
                        velocity.y = velocity.y.min(0.0);
                    } else {
                        rect.y = p.bottom();
                        result.ceiling = true;
                        velocity.y = velocity.y.max(0.0);
                    }
                } else {
                    if push_left <= push_right {
                        rect.x = p.left() - rect.width;
                        result.wall_hit = 1;
                    } else {
                        rect.x = p.right();
                        result.wall_hit = -1;
                    }
                    velocity.x = 0.0;
                }

                moved = true;
                result.depenetrated = true;
            }

            if !moved {
                return;
            }
        }

        log::warn!(
            "Body at ({:.1}, {:.1}) still overlaps geometry after {} push-out passes",
            rect.x,
            rect.y,
            MAX_DEPENETRATION_PASSES
        );
    }

    /// True if a thin probe on `side` (-1 left, 1 right) touches a wall
    pub fn is_touching_wall(&self, body: &Rect, side: i8) -> bool {
        self.wall_platform(body, side).is_some()
    }

    /// Platform acting as a wall on the given side, if any
    pub fn wall_platform(&self, body: &Rect, side: i8) -> Option<&Platform> {
        if side == 0 {
            return None;
        }

        let probe_x = if side > 0 {
            body.right()
        } else {
            body.left() - WALL_PROBE_WIDTH
        };
        let probe = Rect::new(
            probe_x,
            body.top() + WALL_PROBE_INSET,
            WALL_PROBE_WIDTH,
            (body.height - WALL_PROBE_INSET * 2.0).max(CONTACT_EPSILON * 2.0),
        );

        self.platforms
            .iter()
            .find(|p| p.rect.height > MIN_WALL_HEIGHT && probe.overlaps(&p.rect))
    }

    /// Platform directly beneath the body, preferring the widest contact
    pub fn ground_platform(&self, body: &Rect) -> Option<&Platform> {
        let feet = body.bottom();

        self.platforms
            .iter()
            .filter(|p| body.overlaps_x(&p.rect))
            .filter(|p| (p.rect.top() - feet).abs() <= GROUND_PROBE_DISTANCE)
            .max_by(|a, b| {
                body.horizontal_overlap(&a.rect)
                    .total_cmp(&body.horizontal_overlap(&b.rect))
            })
    }

    /// Surface under the body, `Normal` when airborne
    pub fn ground_surface(&self, body: &Rect) -> SurfaceType {
        self.ground_platform(body)
            .map(|p| p.surface)
            .unwrap_or_default()
    }

    /// Surface of the wall on `side`, `Normal` when there is none
    pub fn wall_surface(&self, body: &Rect, side: i8) -> SurfaceType {
        self.wall_platform(body, side)
            .map(|p| p.surface)
            .unwrap_or_default()
    }
}
