// Render extraction: walk the world once per frame and turn character
// meshes, weapons and the ground into box instances for the GPU.
//
// Meshes rendering custom depth also produce an outline instance: the same
// box grown by the outline width, colored by its stencil value.

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::engine::components::{Color, MeshRenderState, MeshShape, Transform};
use crate::engine::mesh::InstanceData;
use super::character::{CharacterMesh, WeaponMesh};
use super::interaction::{CUSTOM_DEPTH_BLUE, CUSTOM_DEPTH_RED, CUSTOM_DEPTH_TAN};
use super::{Ground, GROUND_THICKNESS};

const GROUND_COLOR: [f32; 4] = [0.16, 0.17, 0.2, 1.0];
const WEAPON_COLOR: [f32; 4] = [0.55, 0.5, 0.45, 1.0];

/// Outline color for a custom depth stencil value.
pub fn stencil_color(stencil: u8) -> Option<[f32; 4]> {
    match stencil {
        CUSTOM_DEPTH_RED => Some([0.9, 0.1, 0.1, 1.0]),
        CUSTOM_DEPTH_BLUE => Some([0.1, 0.3, 0.95, 1.0]),
        CUSTOM_DEPTH_TAN => Some([0.82, 0.7, 0.5, 1.0]),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct RenderBatches {
    pub boxes: Vec<InstanceData>,
    pub outlines: Vec<InstanceData>,
}

impl RenderBatches {
    fn push_mesh(&mut self, position: Vec3, shape: &MeshShape, render: &MeshRenderState, color: [f32; 4], outline_width: f32) {
        // Weaponless characters carry an empty weapon shape
        if shape.half_extents == Vec3::ZERO {
            return;
        }
        let center = position + shape.offset;
        self.boxes.push(InstanceData::new(center, shape.half_extents, color));

        if render.render_custom_depth {
            if let Some(outline) = stencil_color(render.custom_depth_stencil_value) {
                self.outlines.push(InstanceData::new(
                    center,
                    shape.half_extents + Vec3::splat(outline_width),
                    outline,
                ));
            }
        }
    }
}

pub fn extract_instances(world: &mut World, outline_width: f32) -> RenderBatches {
    let mut batches = RenderBatches::default();

    let mut grounds = world.query::<(&Transform, &Ground)>();
    for (transform, ground) in grounds.iter(world) {
        batches.boxes.push(InstanceData::new(
            transform.position,
            Vec3::new(ground.half_extent, GROUND_THICKNESS, ground.half_extent),
            GROUND_COLOR,
        ));
    }

    let mut characters = world.query::<(&Transform, &Color, &CharacterMesh, &WeaponMesh)>();
    for (transform, color, mesh, weapon) in characters.iter(world) {
        batches.push_mesh(transform.position, &mesh.shape, &mesh.render, color.to_array(), outline_width);
        batches.push_mesh(transform.position, &weapon.shape, &weapon.render, WEAPON_COLOR, outline_width);
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::enemy::{EnemyBundle, EnemyHighlight};
    use crate::game::interaction::Highlightable;

    #[test]
    fn test_only_highlighted_meshes_get_outlines() {
        let mut world = World::new();
        let armed = world
            .spawn(EnemyBundle::new("Spear", Vec3::ZERO, Color::rgb(0.2, 0.8, 0.2), 0.5, Some(1.5)))
            .id();
        world.spawn(EnemyBundle::new("Shaman", Vec3::X * 4.0, Color::rgb(0.2, 0.8, 0.2), 0.5, None));

        let batches = extract_instances(&mut world, 0.1);
        // Two bodies and one weapon
        assert_eq!(batches.boxes.len(), 3);
        assert!(batches.outlines.is_empty());

        let mut query = world.query::<EnemyHighlight>();
        query.get_mut(&mut world, armed).unwrap().highlight_actor();

        let batches = extract_instances(&mut world, 0.1);
        assert_eq!(batches.outlines.len(), 2);
        assert!(batches.outlines.iter().all(|o| o.color == [0.9, 0.1, 0.1, 1.0]));
    }

    #[test]
    fn test_unknown_stencil_has_no_outline_color() {
        assert!(stencil_color(0).is_none());
        assert!(stencil_color(CUSTOM_DEPTH_TAN).is_some());
    }
}
