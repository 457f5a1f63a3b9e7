// Ability system wiring: who owns the ability system component, which actor
// it drives, and how much of its state is replicated.
//
// Ability execution and effect application are not part of this crate; the
// component only records its owner/avatar pair and replication settings so
// an ability module can be attached later.

use bevy_ecs::prelude::*;
use log::debug;

/// How much gameplay effect state is sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplicationMode {
    /// Everything to everyone. Single-player setups.
    #[default]
    Full,
    /// Full effects to the owning client, minimal to the rest. Player-controlled actors.
    Mixed,
    /// Minimal effects to everyone. AI-controlled actors.
    Minimal,
}

#[derive(Component, Debug, Clone, Default)]
pub struct AbilitySystemComponent {
    pub replicated: bool,
    pub replication_mode: ReplicationMode,
    /// Actor that logically owns the component (enemy, or the player state).
    owner_actor: Option<Entity>,
    /// Actor that represents the component in the world (the pawn).
    avatar_actor: Option<Entity>,
}

impl AbilitySystemComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_is_replicated(&mut self, replicated: bool) {
        self.replicated = replicated;
    }

    pub fn set_replication_mode(&mut self, mode: ReplicationMode) {
        self.replication_mode = mode;
    }

    pub fn init_ability_actor_info(&mut self, owner: Entity, avatar: Entity) {
        debug!("ability actor info: owner {owner:?}, avatar {avatar:?}");
        self.owner_actor = Some(owner);
        self.avatar_actor = Some(avatar);
    }

    pub fn owner_actor(&self) -> Option<Entity> {
        self.owner_actor
    }

    pub fn avatar_actor(&self) -> Option<Entity> {
        self.avatar_actor
    }

    pub fn has_actor_info(&self) -> bool {
        self.owner_actor.is_some() && self.avatar_actor.is_some()
    }
}

/// Vital attributes of a character.
///
/// Starts full; nothing in this crate applies damage or costs yet.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct AttributeSet {
    pub health: f32,
    pub max_health: f32,
    pub mana: f32,
    pub max_mana: f32,
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::new(100.0, 50.0)
    }
}

impl AttributeSet {
    pub fn new(max_health: f32, max_mana: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            mana: max_mana,
            max_mana,
        }
    }
}

/// Points a pawn at the entity holding its ability system component
/// (the player character's lives on its player state).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilitySystemLink(pub Entity);

/// Entity whose AbilitySystemComponent drives `actor`: the actor itself if
/// it owns one, otherwise the target of its AbilitySystemLink.
pub fn ability_system_owner(world: &World, actor: Entity) -> Option<Entity> {
    let entity = world.get_entity(actor).ok()?;
    if entity.contains::<AbilitySystemComponent>() {
        return Some(actor);
    }
    let AbilitySystemLink(holder) = *entity.get::<AbilitySystemLink>()?;
    world
        .get_entity(holder)
        .ok()
        .filter(|holder| holder.contains::<AbilitySystemComponent>())
        .map(|holder| holder.id())
}

pub fn get_ability_system_component(world: &World, actor: Entity) -> Option<&AbilitySystemComponent> {
    world.get::<AbilitySystemComponent>(ability_system_owner(world, actor)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_start_full() {
        let attributes = AttributeSet::new(80.0, 30.0);
        assert_eq!(attributes.health, attributes.max_health);
        assert_eq!(attributes.mana, attributes.max_mana);
        assert_eq!(AttributeSet::default().max_health, 100.0);
    }

    #[test]
    fn test_actor_info_recorded() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let avatar = world.spawn_empty().id();

        let mut asc = AbilitySystemComponent::new();
        assert!(!asc.has_actor_info());
        asc.init_ability_actor_info(owner, avatar);
        assert_eq!(asc.owner_actor(), Some(owner));
        assert_eq!(asc.avatar_actor(), Some(avatar));
    }

    #[test]
    fn test_lookup_follows_link() {
        let mut world = World::new();
        let mut asc = AbilitySystemComponent::new();
        asc.set_replication_mode(ReplicationMode::Mixed);
        let holder = world.spawn(asc).id();
        let pawn = world.spawn(AbilitySystemLink(holder)).id();
        let self_owned = world.spawn(AbilitySystemComponent::new()).id();
        let nothing = world.spawn_empty().id();

        assert_eq!(ability_system_owner(&world, pawn), Some(holder));
        assert_eq!(ability_system_owner(&world, self_owned), Some(self_owned));
        assert_eq!(ability_system_owner(&world, nothing), None);
        assert_eq!(
            get_ability_system_component(&world, pawn).map(|asc| asc.replication_mode),
            Some(ReplicationMode::Mixed)
        );

        world.despawn(holder);
        assert_eq!(ability_system_owner(&world, pawn), None);
    }
}
