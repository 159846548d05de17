// Tile-based collision: static platforms, surface materials and movement resolution

pub mod collision;
pub mod platform;
pub mod surface;

pub use collision::{MoveResult, TileCollisionMap, GROUND_PROBE_DISTANCE, MIN_WALL_HEIGHT};
pub use platform::Platform;
pub use surface::{surface_props, SurfaceProps, SurfaceType};
