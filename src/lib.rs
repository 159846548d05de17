//! Deterministic fixed-step movement core for a 2D precision platformer.
//!
//! `core` holds math and geometry, `engine` the fixed-step loop, input,
//! collision and camera, and `game` the locomotion state machine with its
//! cosmetic feedback, room data and the player session tying them together.

pub mod core;
pub mod engine;
pub mod game;
