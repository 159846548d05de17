// Game layer: movement core, cosmetic feedback, rooms and the player session

pub mod feedback;
pub mod movement;
pub mod room;
pub mod session;
