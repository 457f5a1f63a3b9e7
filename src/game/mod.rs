// Aura gameplay: the actors, and the headless Game that owns the ECS world
// and frame schedule.
//
// Frame order (single-threaded, one schedule run per frame):
//   process_input  → Move bindings add movement input to the pawn
//   cursor_trace   → hover targets advance, highlight/unhighlight applied
//   character_movement → movement → bounds
//   camera_follow  → camera tracks the pawn
//   enemy_begin_play   → newly spawned enemies init their ability system

pub mod ability_system;
pub mod character;
pub mod enemy;
pub mod interaction;
pub mod player_controller;
pub mod player_state;
pub mod render;

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use glam::Vec3;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;
use crate::engine::camera::TopDownCamera;
use crate::engine::components::{CharacterMovement, Color, Transform};
use crate::engine::enhanced_input::{process_input_system, EnhancedInputSubsystem, InputComponent};
use crate::engine::input::InputState;
use crate::engine::systems::{bounds_system, character_movement_system, movement_system, ArenaBounds, FrameTime};
use crate::engine::trace::{Collider, CollisionResponse, TraceChannel};
use crate::error::GameError;
use ability_system::{ability_system_owner, AbilitySystemComponent, AttributeSet};
use character::{CharacterBundle, PlayerCharacter};
use enemy::{enemy_begin_play_system, Enemy, EnemyBundle};
use player_controller::{camera_follow_system, cursor_trace_system, PlayerController};
use player_state::PlayerStateBundle;

const PLAYER_RADIUS: f32 = 0.45;
const PLAYER_STAFF_LENGTH: f32 = 1.4;
pub(crate) const GROUND_THICKNESS: f32 = 0.05;

/// Flat arena floor. Blocks the cursor trace so pointing at empty ground
/// clears the hover.
#[derive(Component, Debug, Clone, Copy)]
pub struct Ground {
    pub half_extent: f32,
}

pub struct Game {
    pub world: World,
    schedule: Schedule,
    controller: Entity,
    player: Entity,
}

impl Game {
    /// Spawn the arena, enemies, player state, pawn and controller, then run
    /// the controller's begin-play, input setup and possession.
    pub fn new(config: &GameConfig) -> Result<Self, GameError> {
        let mut world = World::new();

        let arena = config.spawner.arena_half_extent;
        world.spawn((
            Ground { half_extent: arena },
            Transform::from_position(Vec3::new(0.0, -GROUND_THICKNESS, 0.0)),
            Collider::cuboid(Vec3::new(arena, GROUND_THICKNESS, arena))
                .with_response(TraceChannel::Visibility, CollisionResponse::Block),
        ));

        for enemy in &config.enemies {
            world.spawn(EnemyBundle::new(
                enemy.name.clone(),
                Vec3::from(enemy.position),
                Color::rgb(0.45, 0.62, 0.32),
                enemy.radius,
                enemy.weapon_length,
            ));
        }

        let mut rng = StdRng::seed_from_u64(config.spawner.seed);
        let spawn_extent = (arena - 1.0).max(0.0);
        for i in 0..config.spawner.extra_enemies {
            let position = Vec3::new(
                rng.gen_range(-spawn_extent..=spawn_extent),
                0.0,
                rng.gen_range(-spawn_extent..=spawn_extent),
            );
            let radius = rng.gen_range(0.35..0.6);
            let weapon_length = rng.gen_bool(0.6).then(|| rng.gen_range(0.5..1.8));
            world.spawn(EnemyBundle::new(
                format!("Goblin {}", i + 1),
                position,
                Color::random(&mut rng),
                radius,
                weapon_length,
            ));
        }

        let player_state = world
            .spawn(PlayerStateBundle::new(config.player.name.clone(), config.net.net_update_frequency))
            .id();
        let player = world
            .spawn((
                CharacterBundle::new(
                    config.player_start(),
                    Color::rgb(0.55, 0.35, 0.85),
                    PLAYER_RADIUS,
                    Some(PLAYER_STAFF_LENGTH),
                ),
                CharacterMovement::new(config.player.walk_speed),
                PlayerCharacter::default(),
            ))
            .id();

        let (context, move_action) = config.mapping_context()?;
        let control_yaw = config.player.control_yaw_degrees.to_radians();
        let controller = world
            .spawn((
                PlayerController::new(context, move_action, control_yaw).with_player_state(player_state),
                InputComponent::default(),
            ))
            .id();

        world.insert_resource(InputState::new());
        world.insert_resource(EnhancedInputSubsystem::default());
        world.insert_resource(TopDownCamera::new(
            config.camera.distance,
            config.camera.pitch_degrees.to_radians(),
            control_yaw,
        ));
        world.insert_resource(FrameTime::default());
        world.insert_resource(ArenaBounds {
            half_extents: Vec3::new(arena, 0.0, arena),
        });

        player_controller::begin_play(&mut world, controller)?;
        player_controller::setup_input_component(&mut world, controller)?;
        player_controller::possess(&mut world, controller, player)?;

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems(
            (
                process_input_system,
                cursor_trace_system,
                character_movement_system,
                movement_system,
                bounds_system,
                camera_follow_system,
                enemy_begin_play_system,
            )
                .chain(),
        );

        let enemy_count = world.query::<&Enemy>().iter(&world).count();
        info!("game ready: {enemy_count} enemies, player '{}'", config.player.name);

        Ok(Self {
            world,
            schedule,
            controller,
            player,
        })
    }

    /// Run one frame with this frame's input snapshot.
    pub fn tick(&mut self, delta_seconds: f32, input: &InputState) {
        self.world.insert_resource(input.clone());
        self.world.resource_mut::<FrameTime>().delta_seconds = delta_seconds;
        self.schedule.run(&mut self.world);
    }

    pub fn controller(&self) -> Entity {
        self.controller
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn player_controller(&self) -> Option<&PlayerController> {
        self.world.get::<PlayerController>(self.controller)
    }

    /// Enemy currently highlighted under the cursor.
    pub fn hovered_actor(&self) -> Option<Entity> {
        self.player_controller().and_then(PlayerController::hovered_actor)
    }

    pub fn hovered_enemy(&self) -> Option<(Entity, &Enemy)> {
        let entity = self.hovered_actor()?;
        Some((entity, self.world.get::<Enemy>(entity)?))
    }

    /// The player's ability system and attributes, found through the pawn.
    pub fn player_ability_system(&self) -> Option<(&AbilitySystemComponent, &AttributeSet)> {
        let owner = ability_system_owner(&self.world, self.player)?;
        Some((
            self.world.get::<AbilitySystemComponent>(owner)?,
            self.world.get::<AttributeSet>(owner)?,
        ))
    }

    pub fn camera(&self) -> &TopDownCamera {
        self.world.resource::<TopDownCamera>()
    }
}
