// Player state: per-player data that outlives the pawn, including the
// player's ability system component and attributes.

use bevy_ecs::prelude::*;
use log::info;

use super::ability_system::{AbilitySystemComponent, AbilitySystemLink, AttributeSet, ReplicationMode};
use super::character::PlayerCharacter;

/// Default rate (per second) at which the server pushes player state updates.
pub const DEFAULT_NET_UPDATE_FREQUENCY: f32 = 100.0;

#[derive(Component, Debug, Clone)]
pub struct PlayerState {
    pub player_name: String,
    /// How often the server will try to update clients, per second.
    pub net_update_frequency: f32,
}

#[derive(Bundle)]
pub struct PlayerStateBundle {
    pub state: PlayerState,
    pub ability_system: AbilitySystemComponent,
    pub attributes: AttributeSet,
}

impl PlayerStateBundle {
    pub fn new(player_name: impl Into<String>, net_update_frequency: f32) -> Self {
        let mut ability_system = AbilitySystemComponent::new();
        ability_system.set_is_replicated(true);
        // Mixed for player controlled characters
        ability_system.set_replication_mode(ReplicationMode::Mixed);

        Self {
            state: PlayerState {
                player_name: player_name.into(),
                net_update_frequency,
            },
            ability_system,
            attributes: AttributeSet::default(),
        }
    }
}

impl Default for PlayerStateBundle {
    fn default() -> Self {
        Self::new("Player", DEFAULT_NET_UPDATE_FREQUENCY)
    }
}

/// Wire a possessed player character to its player state: the character
/// links to the state's ability system, and the ability system gets the
/// state as owner and the character as avatar.
pub fn init_player_ability_actor_info(world: &mut World, player_state: Entity, character: Entity) -> bool {
    if world.get::<PlayerCharacter>(character).is_none() {
        return false;
    }
    let Some(mut ability_system) = world.get_mut::<AbilitySystemComponent>(player_state) else {
        return false;
    };
    ability_system.init_ability_actor_info(player_state, character);

    world.entity_mut(character).insert(AbilitySystemLink(player_state));
    info!("player character {character:?} linked to player state {player_state:?}");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ability_system::get_ability_system_component;

    #[test]
    fn test_player_state_construction() {
        let mut world = World::new();
        let state = world.spawn(PlayerStateBundle::default()).id();

        let asc = world.get::<AbilitySystemComponent>(state).unwrap();
        assert!(asc.replicated);
        assert_eq!(asc.replication_mode, ReplicationMode::Mixed);
        assert_eq!(world.get::<PlayerState>(state).unwrap().net_update_frequency, 100.0);
        assert!(world.get::<AttributeSet>(state).is_some());
    }

    #[test]
    fn test_possessed_character_uses_player_state_ability_system() {
        let mut world = World::new();
        let state = world.spawn(PlayerStateBundle::default()).id();
        let character = world.spawn(PlayerCharacter::default()).id();

        assert!(init_player_ability_actor_info(&mut world, state, character));

        let asc = get_ability_system_component(&world, character).unwrap();
        assert_eq!(asc.owner_actor(), Some(state));
        assert_eq!(asc.avatar_actor(), Some(character));
    }

    #[test]
    fn test_init_fails_without_ability_system() {
        let mut world = World::new();
        let not_a_state = world.spawn_empty().id();
        let character = world.spawn(PlayerCharacter::default()).id();
        assert!(!init_player_ability_actor_info(&mut world, not_a_state, character));
    }
}
