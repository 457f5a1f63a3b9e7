// Core ECS components for the engine
// These are reusable across any game built with this engine

use bevy_ecs::prelude::*;
use glam::Vec3;

/// Position of an entity in 3D space
#[derive(Component, Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position }
    }
}

/// RGB color for rendering
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Random mid-saturation color, used to tell spawned enemies apart.
    pub fn random(rng: &mut impl rand::Rng) -> Self {
        Self {
            r: rng.gen_range(0.3..0.9),
            g: rng.gen_range(0.3..0.9),
            b: rng.gen_range(0.3..0.9),
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }
}

/// Velocity of an entity in 3D space (units per second)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub linear: Vec3,
}

/// Walking movement for pawns.
///
/// `add_movement_input` accumulates direction * scale for the current frame;
/// `character_movement_system` turns the accumulated input into `Velocity`
/// and clears it.
#[derive(Component, Debug, Clone, Copy)]
pub struct CharacterMovement {
    /// World units per second at full input.
    pub max_walk_speed: f32,
    pending_input: Vec3,
}

impl CharacterMovement {
    pub fn new(max_walk_speed: f32) -> Self {
        Self {
            max_walk_speed,
            pending_input: Vec3::ZERO,
        }
    }

    pub fn add_movement_input(&mut self, world_direction: Vec3, scale: f32) {
        self.pending_input += world_direction * scale;
    }

    pub fn pending_input(&self) -> Vec3 {
        self.pending_input
    }

    /// Return the accumulated input (clamped to unit length) and reset it.
    pub fn consume_input(&mut self) -> Vec3 {
        let input = self.pending_input.clamp_length_max(1.0);
        self.pending_input = Vec3::ZERO;
        input
    }
}

/// Render state of one mesh: whether it is written to the custom depth
/// buffer, and with which stencil value.
///
/// The renderer draws an outline around every mesh with `render_custom_depth`
/// set, colored by its stencil value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshRenderState {
    pub render_custom_depth: bool,
    pub custom_depth_stencil_value: u8,
}

impl MeshRenderState {
    pub fn set_render_custom_depth(&mut self, enabled: bool) {
        self.render_custom_depth = enabled;
    }

    pub fn set_custom_depth_stencil_value(&mut self, value: u8) {
        self.custom_depth_stencil_value = value;
    }
}

/// Box-shaped visual attached to an entity.
/// `offset` is relative to the entity's Transform.
#[derive(Debug, Clone, Copy)]
pub struct MeshShape {
    pub half_extents: Vec3,
    pub offset: Vec3,
}
