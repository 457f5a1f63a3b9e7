// Shared character pieces: the body mesh, the weapon mesh and the pawn
// components every walking character carries.

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::engine::components::{Color, MeshRenderState, MeshShape, Transform, Velocity};
use crate::engine::trace::{Collider, CollisionResponse, TraceChannel};

/// Body mesh of a character.
#[derive(Component, Debug, Clone, Copy)]
pub struct CharacterMesh {
    pub shape: MeshShape,
    pub render: MeshRenderState,
}

/// Weapon held by a character, drawn as its own mesh.
#[derive(Component, Debug, Clone, Copy)]
pub struct WeaponMesh {
    pub shape: MeshShape,
    pub render: MeshRenderState,
}

impl CharacterMesh {
    /// Upright box of the given radius and height, standing on the ground.
    pub fn upright(radius: f32, height: f32) -> Self {
        Self {
            shape: MeshShape {
                half_extents: Vec3::new(radius, height * 0.5, radius),
                offset: Vec3::new(0.0, height * 0.5, 0.0),
            },
            render: MeshRenderState::default(),
        }
    }

    /// Capsule-like collider matching the mesh. Ignores every channel until
    /// the owner opts in.
    pub fn collider(&self) -> Collider {
        Collider::cuboid(self.shape.half_extents).with_offset(self.shape.offset)
    }
}

impl WeaponMesh {
    /// Thin blade held at the character's right side.
    pub fn held_by(body: &CharacterMesh, length: f32) -> Self {
        let side = body.shape.half_extents.x + 0.15;
        Self {
            shape: MeshShape {
                half_extents: Vec3::new(0.08, length * 0.5, 0.08),
                offset: Vec3::new(side, body.shape.offset.y, 0.0),
            },
            render: MeshRenderState::default(),
        }
    }
}

/// Components every character spawns with.
#[derive(Bundle)]
pub struct CharacterBundle {
    pub transform: Transform,
    pub velocity: Velocity,
    pub color: Color,
    pub mesh: CharacterMesh,
    pub weapon: WeaponMesh,
    pub collider: Collider,
}

impl CharacterBundle {
    pub fn new(position: Vec3, color: Color, radius: f32, weapon_length: Option<f32>) -> Self {
        let mesh = CharacterMesh::upright(radius, radius * 3.6);
        let mut weapon = WeaponMesh::held_by(&mesh, weapon_length.unwrap_or(0.0));
        if weapon_length.is_none() {
            weapon.shape.half_extents = Vec3::ZERO;
        }
        Self {
            transform: Transform::from_position(position),
            velocity: Velocity::default(),
            color,
            collider: mesh.collider(),
            mesh,
            weapon,
        }
    }

    /// Let the cursor trace hit this character.
    pub fn block_visibility(mut self) -> Self {
        self.collider.set_response_to_channel(TraceChannel::Visibility, CollisionResponse::Block);
        self
    }
}

/// Walking pawn controlled by a player controller.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerCharacter {
    pub controller: Option<Entity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_collider_ignores_visibility_by_default() {
        let bundle = CharacterBundle::new(Vec3::ZERO, Color::rgb(1.0, 1.0, 1.0), 0.5, Some(1.2));
        assert_eq!(bundle.collider.response_to_channel(TraceChannel::Visibility), CollisionResponse::Ignore);

        let bundle = bundle.block_visibility();
        assert_eq!(bundle.collider.response_to_channel(TraceChannel::Visibility), CollisionResponse::Block);
    }

    #[test]
    fn test_weaponless_character_has_empty_weapon_shape() {
        let bundle = CharacterBundle::new(Vec3::ZERO, Color::rgb(1.0, 1.0, 1.0), 0.5, None);
        assert_eq!(bundle.weapon.shape.half_extents, Vec3::ZERO);
    }
}
