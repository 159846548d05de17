// Engine modules: fixed-step loop, input, collision, camera

pub mod camera;
pub mod game_loop;
pub mod input;
pub mod physics;
