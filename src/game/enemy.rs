// Enemy character: hoverable by the cursor, highlighted in red, and owning
// its own ability system component.

use bevy_ecs::prelude::*;
use bevy_ecs::query::QueryData;
use glam::Vec3;
use log::info;

use crate::engine::components::Color;
use super::ability_system::{AbilitySystemComponent, AttributeSet, ReplicationMode};
use super::character::{CharacterBundle, CharacterMesh, WeaponMesh};
use super::interaction::{Highlightable, CUSTOM_DEPTH_RED};

/// Marker for AI-controlled enemies.
#[derive(Component, Debug, Clone, Default)]
pub struct Enemy {
    pub name: String,
}

/// Set on an enemy once its begin-play has run.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct BegunPlay;

#[derive(Bundle)]
pub struct EnemyBundle {
    pub enemy: Enemy,
    pub character: CharacterBundle,
    pub ability_system: AbilitySystemComponent,
    pub attributes: AttributeSet,
}

impl EnemyBundle {
    pub fn new(name: impl Into<String>, position: Vec3, color: Color, radius: f32, weapon_length: Option<f32>) -> Self {
        // Mesh must block visibility for the cursor trace to find it
        let character = CharacterBundle::new(position, color, radius, weapon_length).block_visibility();

        let mut ability_system = AbilitySystemComponent::new();
        ability_system.set_is_replicated(true);
        // Minimal for AI controlled characters
        ability_system.set_replication_mode(ReplicationMode::Minimal);

        Self {
            enemy: Enemy { name: name.into() },
            character,
            ability_system,
            attributes: AttributeSet::default(),
        }
    }
}

/// The parts of an enemy the highlight touches.
#[derive(QueryData)]
#[query_data(mutable)]
pub struct EnemyHighlight {
    pub mesh: &'static mut CharacterMesh,
    pub weapon: &'static mut WeaponMesh,
    _enemy: &'static Enemy,
}

impl Highlightable for EnemyHighlightItem<'_> {
    fn highlight_actor(&mut self) {
        self.mesh.render.set_render_custom_depth(true);
        self.mesh.render.set_custom_depth_stencil_value(CUSTOM_DEPTH_RED);

        self.weapon.render.set_render_custom_depth(true);
        self.weapon.render.set_custom_depth_stencil_value(CUSTOM_DEPTH_RED);
    }

    fn unhighlight_actor(&mut self) {
        self.mesh.render.set_render_custom_depth(false);
        self.weapon.render.set_render_custom_depth(false);
    }
}

/// Begin-play for newly spawned enemies: the enemy is both owner and avatar
/// of its ability system.
pub fn enemy_begin_play_system(
    mut commands: Commands,
    mut enemies: Query<(Entity, &Enemy, &mut AbilitySystemComponent), Without<BegunPlay>>,
) {
    for (entity, enemy, mut ability_system) in enemies.iter_mut() {
        ability_system.init_ability_actor_info(entity, entity);
        commands.entity(entity).insert(BegunPlay);
        info!("enemy '{}' ({entity:?}) began play", enemy.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::trace::{Collider, CollisionResponse, TraceChannel};

    fn spawn_enemy(world: &mut World) -> Entity {
        world
            .spawn(EnemyBundle::new("Goblin", Vec3::ZERO, Color::rgb(0.4, 0.7, 0.3), 0.5, Some(1.0)))
            .id()
    }

    #[test]
    fn test_enemy_construction() {
        let mut world = World::new();
        let enemy = spawn_enemy(&mut world);

        let collider = world.get::<Collider>(enemy).unwrap();
        assert_eq!(collider.response_to_channel(TraceChannel::Visibility), CollisionResponse::Block);

        let asc = world.get::<AbilitySystemComponent>(enemy).unwrap();
        assert!(asc.replicated);
        assert_eq!(asc.replication_mode, ReplicationMode::Minimal);
        assert!(!asc.has_actor_info());
        assert!(world.get::<AttributeSet>(enemy).is_some());
    }

    #[test]
    fn test_highlight_sets_mesh_and_weapon_render_state() {
        let mut world = World::new();
        let enemy = spawn_enemy(&mut world);
        let mut query = world.query::<EnemyHighlight>();

        query.get_mut(&mut world, enemy).unwrap().highlight_actor();
        let mesh = world.get::<CharacterMesh>(enemy).unwrap().render;
        let weapon = world.get::<WeaponMesh>(enemy).unwrap().render;
        assert!(mesh.render_custom_depth && weapon.render_custom_depth);
        assert_eq!(mesh.custom_depth_stencil_value, CUSTOM_DEPTH_RED);
        assert_eq!(weapon.custom_depth_stencil_value, CUSTOM_DEPTH_RED);

        query.get_mut(&mut world, enemy).unwrap().unhighlight_actor();
        let mesh = world.get::<CharacterMesh>(enemy).unwrap().render;
        let weapon = world.get::<WeaponMesh>(enemy).unwrap().render;
        assert!(!mesh.render_custom_depth && !weapon.render_custom_depth);
        // Stencil value is left in place
        assert_eq!(mesh.custom_depth_stencil_value, CUSTOM_DEPTH_RED);
    }

    #[test]
    fn test_begin_play_inits_actor_info_once() {
        let mut world = World::new();
        let enemy = spawn_enemy(&mut world);
        let mut schedule = Schedule::default();
        schedule.add_systems(enemy_begin_play_system);

        schedule.run(&mut world);
        let asc = world.get::<AbilitySystemComponent>(enemy).unwrap();
        assert_eq!(asc.owner_actor(), Some(enemy));
        assert_eq!(asc.avatar_actor(), Some(enemy));
        assert!(world.get::<BegunPlay>(enemy).is_some());
    }

    #[test]
    fn test_non_enemy_does_not_match_highlight_query() {
        let mut world = World::new();
        let prop = world
            .spawn((
                CharacterMesh::upright(0.5, 1.0),
                WeaponMesh::held_by(&CharacterMesh::upright(0.5, 1.0), 1.0),
            ))
            .id();
        let mut query = world.query::<EnemyHighlight>();
        assert!(query.get_mut(&mut world, prop).is_err());
    }
}
