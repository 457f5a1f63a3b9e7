// Aura: top-down action game core. The binary in main.rs hosts it in a
// winit window; tests drive the headless Game directly.

pub mod config;
pub mod engine;
pub mod error;
pub mod game;
