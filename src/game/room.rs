// Room data: platform geometry, spawn point and per-room modifiers
//
// Rooms are authored as RON files under assets/rooms/ and validated on load.
// A room is immutable once built; swapping rooms happens between ticks.

use std::path::{Path, PathBuf};

use glam::Vec2;
use ron::Options;
use serde::Deserialize;
use thiserror::Error;

use crate::core::Rect;
use crate::engine::physics::{Platform, TileCollisionMap};
use crate::game::movement::{Current, GravityWell, VelocityModifier, Vine};

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("failed to read room file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse room: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("platform {index} has zero or negative size: {rect:?}")]
    InvalidPlatform { index: usize, rect: Rect },

    #[error("room bounds are empty: {0:?}")]
    InvalidBounds(Rect),
}

/// Modifier entry as written in a room file
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub enum ModifierDef {
    Vine(Vine),
    GravityWell(GravityWell),
    Current(Current),
}

impl ModifierDef {
    pub fn build(self) -> Box<dyn VelocityModifier> {
        match self {
            Self::Vine(vine) => Box::new(vine),
            Self::GravityWell(well) => Box::new(well),
            Self::Current(current) => Box::new(current),
        }
    }
}

/// Room as written in a room file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoomDef {
    pub name: String,
    /// Leaving this area (sideways or below) respawns the player
    pub bounds: Rect,
    /// Top-left corner of the body at spawn
    pub spawn: Vec2,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub modifiers: Vec<ModifierDef>,
}

fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

#[derive(Debug)]
pub struct Room {
    name: String,
    bounds: Rect,
    spawn: Vec2,
    map: TileCollisionMap,
    modifiers: Vec<Box<dyn VelocityModifier>>,
}

impl Room {
    /// Validate a definition and build the collision map
    pub fn from_def(def: RoomDef) -> Result<Self, RoomError> {
        if !def.bounds.is_valid() {
            return Err(RoomError::InvalidBounds(def.bounds));
        }
        for (index, platform) in def.platforms.iter().enumerate() {
            if !platform.rect.is_valid() {
                return Err(RoomError::InvalidPlatform {
                    index,
                    rect: platform.rect,
                });
            }
        }
        for (i, a) in def.platforms.iter().enumerate() {
            for (j, b) in def.platforms.iter().enumerate().skip(i + 1) {
                if a.rect.overlaps(&b.rect) {
                    log::warn!(
                        "Room '{}': platforms {} and {} overlap; contact near the seam may jitter",
                        def.name,
                        i,
                        j
                    );
                }
            }
        }

        let modifiers: Vec<_> = def.modifiers.iter().map(|m| m.build()).collect();
        log::info!(
            "Room '{}' built: {} platforms, {} modifiers",
            def.name,
            def.platforms.len(),
            modifiers.len()
        );

        Ok(Self {
            name: def.name,
            bounds: def.bounds,
            spawn: def.spawn,
            map: TileCollisionMap::new(def.platforms),
            modifiers,
        })
    }

    pub fn from_ron_str(text: &str) -> Result<Self, RoomError> {
        let def: RoomDef = ron_options().from_str(text)?;
        Self::from_def(def)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RoomError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RoomError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loading room from {}", path.display());
        Self::from_ron_str(&text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn map(&self) -> &TileCollisionMap {
        &self.map
    }

    pub fn modifiers(&self) -> &[Box<dyn VelocityModifier>] {
        &self.modifiers
    }

    /// The body has left the playable area. Leaving through the top is allowed.
    pub fn is_out_of_bounds(&self, body: &Rect) -> bool {
        body.top() > self.bounds.bottom()
            || body.right() < self.bounds.left()
            || body.left() > self.bounds.right()
    }
}
