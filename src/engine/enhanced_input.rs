// Action-based input layered over InputState.
//
// Flow per frame:
//   InputState (held keys) → EnhancedInputSubsystem::evaluate()
//     → mapping contexts in priority order → action values
//     → trigger events (Started / Triggered / Completed)
//     → InputComponent bindings → handler(world, owner, value)

use bevy_ecs::prelude::*;
use glam::Vec2;
use winit::keyboard::KeyCode;

use super::input::InputState;

// ============================================================================
// ACTIONS + VALUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputValueType {
    Digital,
    Axis2D,
}

/// A named gameplay action ("Move", "Interact", ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputAction {
    pub name: String,
    pub value_type: InputValueType,
}

impl InputAction {
    pub fn new(name: impl Into<String>, value_type: InputValueType) -> Self {
        Self { name: name.into(), value_type }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputActionValue {
    Digital(bool),
    Axis2D(Vec2),
}

impl InputActionValue {
    fn zero(value_type: InputValueType) -> Self {
        match value_type {
            InputValueType::Digital => InputActionValue::Digital(false),
            InputValueType::Axis2D => InputActionValue::Axis2D(Vec2::ZERO),
        }
    }

    /// Value as a 2D axis. A pressed digital action reads as (1, 0).
    pub fn axis2d(&self) -> Vec2 {
        match *self {
            InputActionValue::Digital(true) => Vec2::X,
            InputActionValue::Digital(false) => Vec2::ZERO,
            InputActionValue::Axis2D(v) => v,
        }
    }

    pub fn is_active(&self) -> bool {
        match *self {
            InputActionValue::Digital(pressed) => pressed,
            InputActionValue::Axis2D(v) => v != Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// First frame the action becomes active.
    Started,
    /// Every frame the action is active, including the first.
    Triggered,
    /// First frame the action is no longer active.
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredAction {
    pub action: String,
    pub trigger: TriggerEvent,
    pub value: InputActionValue,
}

// ============================================================================
// MAPPING CONTEXT
// ============================================================================

/// One key feeding one action. `axis` is the key's contribution to an
/// Axis2D action (W = (0, 1), A = (-1, 0), ...); digital actions ignore it.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMapping {
    pub key: KeyCode,
    pub action: String,
    pub axis: Vec2,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputMappingContext {
    pub name: String,
    pub actions: Vec<InputAction>,
    pub mappings: Vec<KeyMapping>,
}

impl InputMappingContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn add_action(&mut self, action: InputAction) {
        if !self.actions.iter().any(|a| a.name == action.name) {
            self.actions.push(action);
        }
    }

    pub fn map_key(&mut self, action: &InputAction, key: KeyCode, axis: Vec2) {
        self.add_action(action.clone());
        self.mappings.push(KeyMapping { key, action: action.name.clone(), axis });
    }
}

// ============================================================================
// SUBSYSTEM
// ============================================================================

/// Local player's input subsystem: the active mapping contexts and the
/// per-action state needed to emit Started / Completed.
#[derive(Resource, Debug, Default)]
pub struct EnhancedInputSubsystem {
    /// Sorted by priority, highest first.
    contexts: Vec<(i32, InputMappingContext)>,
    /// Actions that were active last frame, in evaluation order.
    active: Vec<(String, InputActionValue)>,
}

impl EnhancedInputSubsystem {
    /// Add a context, replacing any context with the same name.
    /// Higher priority contexts claim a key before lower ones.
    pub fn add_mapping_context(&mut self, context: InputMappingContext, priority: i32) {
        self.contexts.retain(|(_, c)| c.name != context.name);
        let at = self
            .contexts
            .iter()
            .position(|(p, _)| *p < priority)
            .unwrap_or(self.contexts.len());
        self.contexts.insert(at, (priority, context));
    }

    pub fn remove_mapping_context(&mut self, name: &str) -> bool {
        let before = self.contexts.len();
        self.contexts.retain(|(_, c)| c.name != name);
        self.contexts.len() != before
    }

    pub fn has_mapping_context(&self, name: &str) -> bool {
        self.contexts.iter().any(|(_, c)| c.name == name)
    }

    /// Evaluate all contexts against the held keys and return this frame's
    /// trigger events.
    pub fn evaluate(&mut self, input: &InputState) -> Vec<TriggeredAction> {
        let mut values: Vec<(String, InputActionValue)> = Vec::new();
        let mut claimed: Vec<KeyCode> = Vec::new();

        for (_, context) in &self.contexts {
            for action in &context.actions {
                if !values.iter().any(|(name, _)| *name == action.name) {
                    values.push((action.name.clone(), InputActionValue::zero(action.value_type)));
                }
            }

            let mut context_keys = Vec::new();
            for mapping in &context.mappings {
                if claimed.contains(&mapping.key) {
                    continue;
                }
                context_keys.push(mapping.key);
                if !input.is_key_held(mapping.key) {
                    continue;
                }
                if let Some((_, value)) = values.iter_mut().find(|(name, _)| *name == mapping.action) {
                    accumulate(value, mapping.axis);
                }
            }
            claimed.extend(context_keys);
        }

        let mut events = Vec::new();
        for (name, value) in &values {
            let was_active = self.active.iter().any(|(n, _)| n == name);
            if value.is_active() {
                if !was_active {
                    events.push(TriggeredAction { action: name.clone(), trigger: TriggerEvent::Started, value: *value });
                }
                events.push(TriggeredAction { action: name.clone(), trigger: TriggerEvent::Triggered, value: *value });
            } else if was_active {
                events.push(TriggeredAction { action: name.clone(), trigger: TriggerEvent::Completed, value: *value });
            }
        }

        // Actions of a removed context complete on the next evaluation
        for (name, last) in &self.active {
            if !values.iter().any(|(n, _)| n == name) {
                events.push(TriggeredAction {
                    action: name.clone(),
                    trigger: TriggerEvent::Completed,
                    value: InputActionValue::zero(match last {
                        InputActionValue::Digital(_) => InputValueType::Digital,
                        InputActionValue::Axis2D(_) => InputValueType::Axis2D,
                    }),
                });
            }
        }

        self.active = values.into_iter().filter(|(_, v)| v.is_active()).collect();
        events
    }
}

fn accumulate(value: &mut InputActionValue, axis: Vec2) {
    match value {
        InputActionValue::Digital(pressed) => *pressed = true,
        InputActionValue::Axis2D(v) => *v = (*v + axis).clamp(Vec2::NEG_ONE, Vec2::ONE),
    }
}

// ============================================================================
// INPUT COMPONENT
// ============================================================================

/// Called with the world, the entity owning the InputComponent and the action value.
pub type ActionHandler = fn(&mut World, Entity, InputActionValue);

#[derive(Clone)]
pub struct ActionBinding {
    pub action: String,
    pub trigger: TriggerEvent,
    pub handler: ActionHandler,
}

/// Per-owner list of action bindings.
#[derive(Component, Clone, Default)]
pub struct InputComponent {
    bindings: Vec<ActionBinding>,
}

impl InputComponent {
    pub fn bind_action(&mut self, action: &InputAction, trigger: TriggerEvent, handler: ActionHandler) {
        self.bindings.push(ActionBinding {
            action: action.name.clone(),
            trigger,
            handler,
        });
    }

    pub fn bindings(&self) -> &[ActionBinding] {
        &self.bindings
    }
}

/// Exclusive system: evaluate the subsystem and run every matching binding.
pub fn process_input_system(world: &mut World) {
    let Some(input) = world.get_resource::<InputState>().cloned() else {
        return;
    };
    let Some(events) = world
        .get_resource_mut::<EnhancedInputSubsystem>()
        .map(|mut subsystem| subsystem.evaluate(&input))
    else {
        return;
    };
    if events.is_empty() {
        return;
    }

    let mut calls: Vec<(ActionHandler, Entity, InputActionValue)> = Vec::new();
    let mut owners = world.query::<(Entity, &InputComponent)>();
    for (owner, component) in owners.iter(world) {
        for event in &events {
            for binding in component.bindings() {
                if binding.action == event.action && binding.trigger == event.trigger {
                    calls.push((binding.handler, owner, event.value));
                }
            }
        }
    }

    for (handler, owner, value) in calls {
        handler(world, owner, value);
    }
}

/// Parse winit key names as written in config files ("KeyW", "ArrowUp", "Space").
pub fn parse_key_code(name: &str) -> Option<KeyCode> {
    let key = match name {
        "KeyA" => KeyCode::KeyA,
        "KeyB" => KeyCode::KeyB,
        "KeyC" => KeyCode::KeyC,
        "KeyD" => KeyCode::KeyD,
        "KeyE" => KeyCode::KeyE,
        "KeyF" => KeyCode::KeyF,
        "KeyQ" => KeyCode::KeyQ,
        "KeyR" => KeyCode::KeyR,
        "KeyS" => KeyCode::KeyS,
        "KeyW" => KeyCode::KeyW,
        "KeyX" => KeyCode::KeyX,
        "KeyZ" => KeyCode::KeyZ,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        "Space" => KeyCode::Space,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ControlLeft" => KeyCode::ControlLeft,
        "Tab" => KeyCode::Tab,
        _ => return None,
    };
    Some(key)
}
