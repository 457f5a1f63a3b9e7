// Engine module - reusable pieces that know nothing about Aura's actors
// (camera, input, traces, movement, render data)

pub mod camera;
pub mod components;
pub mod debug_overlay;
pub mod enhanced_input;
pub mod input;
pub mod mesh;
pub mod rotator;
pub mod systems;
pub mod trace;

// Re-export commonly used items
pub use components::*;
