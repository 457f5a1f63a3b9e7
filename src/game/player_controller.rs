// Player controller: cursor hover tracking, mouse/input mode setup and the
// Move action.
//
// Lifecycle:
//   spawn PlayerController + InputComponent
//   → begin_play()             mapping context, cursor settings
//   → setup_input_component()  Move bound on Triggered
//   → possess(pawn)
//   → every frame: process_input_system, cursor_trace_system, camera_follow_system

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::engine::camera::TopDownCamera;
use crate::engine::components::{CharacterMovement, Transform};
use crate::engine::enhanced_input::{
    EnhancedInputSubsystem, InputAction, InputActionValue, InputComponent, InputMappingContext, TriggerEvent,
};
use crate::engine::input::InputState;
use crate::engine::rotator::Rotator;
use crate::engine::trace::{line_trace_single, Collider, HitResult, TraceChannel};
use crate::error::ControllerError;
use super::character::PlayerCharacter;
use super::enemy::EnemyHighlight;
use super::interaction::HoverTargets;
use super::player_state::init_player_ability_actor_info;

// ============================================================================
// CURSOR + INPUT MODE SETTINGS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseCursor {
    #[default]
    Default,
    Crosshairs,
    Hand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseLockMode {
    #[default]
    DoNotLock,
    LockOnCapture,
    LockAlways,
}

/// Which layers receive input: the game world, UI widgets, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    GameOnly,
    UiOnly,
    GameAndUi {
        lock_mouse: MouseLockMode,
        hide_cursor_during_capture: bool,
    },
}

// ============================================================================
// PLAYER CONTROLLER
// ============================================================================

#[derive(Component, Debug, Clone)]
pub struct PlayerController {
    pub replicates: bool,
    pub show_mouse_cursor: bool,
    pub default_mouse_cursor: MouseCursor,
    pub input_mode: InputMode,
    /// Only the yaw is used for movement.
    pub control_rotation: Rotator,
    pub mapping_context: Option<InputMappingContext>,
    pub move_action: Option<InputAction>,
    controlled_pawn: Option<Entity>,
    player_state: Option<Entity>,
    hover: HoverTargets<Entity>,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self {
            replicates: true,
            show_mouse_cursor: false,
            default_mouse_cursor: MouseCursor::Default,
            input_mode: InputMode::default(),
            control_rotation: Rotator::default(),
            mapping_context: None,
            move_action: None,
            controlled_pawn: None,
            player_state: None,
            hover: HoverTargets::default(),
        }
    }
}

impl PlayerController {
    pub fn new(mapping_context: InputMappingContext, move_action: InputAction, control_yaw: f32) -> Self {
        Self {
            control_rotation: Rotator::new(0.0, control_yaw, 0.0),
            mapping_context: Some(mapping_context),
            move_action: Some(move_action),
            ..Self::default()
        }
    }

    pub fn with_player_state(mut self, player_state: Entity) -> Self {
        self.player_state = Some(player_state);
        self
    }

    pub fn controlled_pawn(&self) -> Option<Entity> {
        self.controlled_pawn
    }

    pub fn player_state(&self) -> Option<Entity> {
        self.player_state
    }

    pub fn hover_targets(&self) -> &HoverTargets<Entity> {
        &self.hover
    }

    /// Highlightable actor currently under the cursor.
    pub fn hovered_actor(&self) -> Option<Entity> {
        self.hover.this_actor()
    }

    /// One frame of hover tracking against the cursor hit.
    ///
    /// A hit that is not blocking, or whose actor is not highlightable,
    /// leaves nothing hovered. Only entities matching `targets` are ever
    /// stored, so highlight calls always land on a valid target.
    pub fn cursor_trace(&mut self, hit: &HitResult, targets: &mut Query<EnemyHighlight>) {
        self.hover.retain(|entity| targets.contains(entity));

        let this_actor = if hit.blocking_hit {
            hit.get_actor().filter(|actor| targets.contains(*actor))
        } else {
            None
        };

        self.hover.advance(this_actor).for_each(|entity, op| {
            if let Ok(mut target) = targets.get_mut(entity) {
                debug!("{op:?} {entity:?}");
                op.apply(&mut target);
            }
        });
    }
}

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Register the controller's mapping context with the local input subsystem
/// and switch to a visible, unlocked cursor usable by both game and UI.
pub fn begin_play(world: &mut World, controller: Entity) -> Result<(), ControllerError> {
    let context = world
        .get::<PlayerController>(controller)
        .ok_or(ControllerError::MissingController(controller))?
        .mapping_context
        .clone()
        .ok_or(ControllerError::MissingMappingContext)?;

    let context_name = context.name.clone();
    world
        .get_resource_mut::<EnhancedInputSubsystem>()
        .ok_or(ControllerError::MissingInputSubsystem)?
        .add_mapping_context(context, 0);

    let mut pc = world
        .get_mut::<PlayerController>(controller)
        .ok_or(ControllerError::MissingController(controller))?;
    pc.show_mouse_cursor = true;
    pc.default_mouse_cursor = MouseCursor::Default;
    pc.input_mode = InputMode::GameAndUi {
        lock_mouse: MouseLockMode::DoNotLock,
        hide_cursor_during_capture: false,
    };

    info!("player controller {controller:?} began play with mapping context '{context_name}'");
    Ok(())
}

/// Bind the Move action to `move_pawn` on every Triggered event.
pub fn setup_input_component(world: &mut World, controller: Entity) -> Result<(), ControllerError> {
    let move_action = world
        .get::<PlayerController>(controller)
        .ok_or(ControllerError::MissingController(controller))?
        .move_action
        .clone()
        .ok_or(ControllerError::MissingMoveAction)?;

    world
        .get_mut::<InputComponent>(controller)
        .ok_or(ControllerError::MissingInputComponent)?
        .bind_action(&move_action, TriggerEvent::Triggered, move_pawn);
    Ok(())
}

/// Take control of `pawn`. If the controller has a player state, the pawn
/// becomes the avatar of the state's ability system.
pub fn possess(world: &mut World, controller: Entity, pawn: Entity) -> Result<(), ControllerError> {
    let mut pc = world
        .get_mut::<PlayerController>(controller)
        .ok_or(ControllerError::MissingController(controller))?;
    pc.controlled_pawn = Some(pawn);
    let player_state = pc.player_state;

    if let Some(mut character) = world.get_mut::<PlayerCharacter>(pawn) {
        character.controller = Some(controller);
    }
    if let Some(player_state) = player_state {
        init_player_ability_actor_info(world, player_state, pawn);
    }
    Ok(())
}

/// Move action handler. x = right, y = forward, each in [-1, 1].
pub fn move_pawn(world: &mut World, controller: Entity, value: InputActionValue) {
    let input_axis = value.axis2d();
    let Some(pc) = world.get::<PlayerController>(controller) else {
        return;
    };

    // Zero out pitch and roll
    let yaw_rotation = pc.control_rotation.yaw_only();
    let forward_direction = yaw_rotation.unit_axis_x();
    let right_direction = yaw_rotation.unit_axis_y();

    let Some(pawn) = pc.controlled_pawn else {
        return;
    };
    if let Some(mut movement) = world.get_mut::<CharacterMovement>(pawn) {
        movement.add_movement_input(forward_direction, input_axis.y);
        movement.add_movement_input(right_direction, input_axis.x);
    }
}

// ============================================================================
// SYSTEMS
// ============================================================================

/// Line trace under the cursor on the given channel.
/// No cursor (outside the window) or no camera ray means no hit.
pub fn get_hit_result_under_cursor(
    input: &InputState,
    camera: &TopDownCamera,
    colliders: &Query<(Entity, &Transform, &Collider)>,
    channel: TraceChannel,
) -> HitResult {
    let Some(cursor) = input.cursor() else {
        return HitResult::default();
    };
    let Some(ray) = camera.screen_ray(cursor, input.window_size) else {
        return HitResult::default();
    };
    line_trace_single(colliders.iter(), &ray, channel, camera.far)
}

/// Per-frame player tick: trace under the cursor and update highlights.
pub fn cursor_trace_system(
    input: Res<InputState>,
    camera: Res<TopDownCamera>,
    colliders: Query<(Entity, &Transform, &Collider)>,
    mut controllers: Query<&mut PlayerController>,
    mut targets: Query<EnemyHighlight>,
) {
    let hit = get_hit_result_under_cursor(&input, &camera, &colliders, TraceChannel::Visibility);
    for mut controller in controllers.iter_mut() {
        controller.cursor_trace(&hit, &mut targets);
    }
}

/// Keep the camera on the controlled pawn, facing along the control yaw.
pub fn camera_follow_system(
    input: Res<InputState>,
    mut camera: ResMut<TopDownCamera>,
    controllers: Query<&PlayerController>,
    transforms: Query<&Transform>,
) {
    let Some(controller) = controllers.iter().next() else {
        return;
    };
    let focus = controller
        .controlled_pawn
        .and_then(|pawn| transforms.get(pawn).ok())
        .map(|t| t.position)
        .unwrap_or(camera.target());

    camera.yaw = controller.control_rotation.yaw;
    camera.update(&input, focus);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::components::Velocity;
    use crate::engine::enhanced_input::InputValueType;
    use glam::{Vec2, Vec3};
    use std::f32::consts::FRAC_PI_2;

    fn move_setup() -> (InputMappingContext, InputAction) {
        let action = InputAction::new("Move", InputValueType::Axis2D);
        let mut context = InputMappingContext::new("AuraContext");
        context.map_key(&action, winit::keyboard::KeyCode::KeyW, Vec2::Y);
        (context, action)
    }

    #[test]
    fn test_controller_replicates_by_default() {
        assert!(PlayerController::default().replicates);
    }

    #[test]
    fn test_begin_play_requires_mapping_context() {
        let mut world = World::new();
        world.init_resource::<EnhancedInputSubsystem>();
        let controller = world.spawn(PlayerController::default()).id();
        assert_eq!(begin_play(&mut world, controller), Err(ControllerError::MissingMappingContext));
    }

    #[test]
    fn test_begin_play_requires_input_subsystem() {
        let mut world = World::new();
        let (context, action) = move_setup();
        let controller = world.spawn(PlayerController::new(context, action, 0.0)).id();
        assert_eq!(begin_play(&mut world, controller), Err(ControllerError::MissingInputSubsystem));
    }

    #[test]
    fn test_begin_play_configures_cursor_and_context() {
        let mut world = World::new();
        world.init_resource::<EnhancedInputSubsystem>();
        let (context, action) = move_setup();
        let controller = world.spawn(PlayerController::new(context, action, 0.0)).id();

        begin_play(&mut world, controller).unwrap();

        assert!(world.resource::<EnhancedInputSubsystem>().has_mapping_context("AuraContext"));
        let pc = world.get::<PlayerController>(controller).unwrap();
        assert!(pc.show_mouse_cursor);
        assert_eq!(pc.default_mouse_cursor, MouseCursor::Default);
        assert_eq!(
            pc.input_mode,
            InputMode::GameAndUi {
                lock_mouse: MouseLockMode::DoNotLock,
                hide_cursor_during_capture: false,
            }
        );
    }

    #[test]
    fn test_setup_input_requires_move_action() {
        let mut world = World::new();
        let controller = world.spawn((PlayerController::default(), InputComponent::default())).id();
        assert_eq!(setup_input_component(&mut world, controller), Err(ControllerError::MissingMoveAction));
        assert!(world.get::<InputComponent>(controller).unwrap().bindings().is_empty());
    }

    #[test]
    fn test_default_input_mode_is_game_only() {
        assert_eq!(PlayerController::default().input_mode, InputMode::GameOnly);
    }

    #[test]
    fn test_setup_input_requires_input_component() {
        let mut world = World::new();
        let (context, action) = move_setup();
        let controller = world.spawn(PlayerController::new(context, action, 0.0)).id();
        assert_eq!(setup_input_component(&mut world, controller), Err(ControllerError::MissingInputComponent));

        world.entity_mut(controller).insert(InputComponent::default());
        setup_input_component(&mut world, controller).unwrap();
        let bindings = world.get::<InputComponent>(controller).unwrap().bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].action, "Move");
        assert_eq!(bindings[0].trigger, TriggerEvent::Triggered);
    }

    #[test]
    fn test_move_uses_control_yaw_only() {
        let mut world = World::new();
        let (context, action) = move_setup();
        let mut pc = PlayerController::new(context, action, FRAC_PI_2);
        // Pitch must not tilt the movement plane
        pc.control_rotation.pitch = -0.7;
        let controller = world.spawn(pc).id();
        let pawn = world
            .spawn((PlayerCharacter::default(), Transform::default(), Velocity::default(), CharacterMovement::new(5.0)))
            .id();
        possess(&mut world, controller, pawn).unwrap();

        move_pawn(&mut world, controller, InputActionValue::Axis2D(Vec2::new(0.0, 1.0)));
        let pending = world.get::<CharacterMovement>(pawn).unwrap().pending_input();
        assert!((pending - Vec3::NEG_X).length() < 1e-5);

        move_pawn(&mut world, controller, InputActionValue::Axis2D(Vec2::new(1.0, 0.0)));
        let pending = world.get::<CharacterMovement>(pawn).unwrap().pending_input();
        assert!((pending - Vec3::new(-1.0, 0.0, -1.0)).length() < 1e-5);
        assert_eq!(world.get::<PlayerCharacter>(pawn).unwrap().controller, Some(controller));
    }

    #[test]
    fn test_move_without_pawn_is_noop() {
        let mut world = World::new();
        let (context, action) = move_setup();
        let controller = world.spawn(PlayerController::new(context, action, 0.0)).id();
        move_pawn(&mut world, controller, InputActionValue::Axis2D(Vec2::ONE));
        assert!(world.get::<PlayerController>(controller).unwrap().controlled_pawn().is_none());
    }

    #[test]
    fn test_no_cursor_means_no_hit() {
        let mut world = World::new();
        world.spawn((Transform::default(), Collider::sphere(100.0)));
        let mut input = InputState::new();
        input.window_size = (800, 600);
        let camera = TopDownCamera::default();

        let mut state = bevy_ecs::system::SystemState::<Query<(Entity, &Transform, &Collider)>>::new(&mut world);
        let colliders = state.get(&world);
        let hit = get_hit_result_under_cursor(&input, &camera, &colliders, TraceChannel::Visibility);
        assert_eq!(hit, HitResult::default());
    }
}
