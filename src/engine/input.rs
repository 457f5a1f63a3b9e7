// Input state tracking for keyboard and mouse
// Abstracts winit events into a queryable per-frame snapshot

use std::collections::HashSet;
use bevy_ecs::prelude::*;
use glam::Vec2;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Resource, Debug, Clone, Default)]
pub struct InputState {
    // Keyboard
    keys_held: HashSet<KeyCode>,

    // Mouse, in physical pixels from the window's top-left corner
    pub mouse_position: (f32, f32),

    /// False once the cursor leaves the window; the cursor trace treats
    /// that as "nothing under the cursor".
    pub cursor_in_window: bool,

    // Scroll: accumulated vertical scroll this frame, reset in end_frame()
    pub scroll_delta: f32,

    pub window_size: (u32, u32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a winit WindowEvent into the input state.
    /// Call this once per event before the game's own event handling.
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press_key(key),
                        ElementState::Released => self.release_key(key),
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.set_cursor_position(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorEntered { .. } => {
                self.cursor_in_window = true;
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_in_window = false;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.scroll_delta += y;
            }
            WindowEvent::Resized(size) => {
                self.window_size = (size.width, size.height);
            }
            WindowEvent::Focused(false) => {
                // Key-up events are lost while unfocused
                self.keys_held.clear();
            }
            _ => {}
        }
    }

    /// Call once per frame after update() and render() have consumed input.
    /// Resets per-frame accumulators.
    pub fn end_frame(&mut self) {
        self.scroll_delta = 0.0;
    }

    pub fn press_key(&mut self, key: KeyCode) {
        self.keys_held.insert(key);
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    pub fn set_cursor_position(&mut self, x: f32, y: f32) {
        self.mouse_position = (x, y);
        self.cursor_in_window = true;
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Cursor position, or None while the cursor is outside the window.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor_in_window
            .then(|| Vec2::new(self.mouse_position.0, self.mouse_position.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_held_until_released() {
        let mut input = InputState::new();
        input.press_key(KeyCode::KeyW);
        assert!(input.is_key_held(KeyCode::KeyW));
        input.end_frame();
        assert!(input.is_key_held(KeyCode::KeyW));
        input.release_key(KeyCode::KeyW);
        assert!(!input.is_key_held(KeyCode::KeyW));
    }

    #[test]
    fn test_cursor_hidden_until_moved() {
        let mut input = InputState::new();
        assert_eq!(input.cursor(), None);
        input.set_cursor_position(10.0, 20.0);
        assert_eq!(input.cursor(), Some(Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_end_frame_resets_scroll_keeps_cursor() {
        let mut input = InputState::new();
        input.scroll_delta = 2.0;
        input.set_cursor_position(5.0, 5.0);
        input.end_frame();
        assert_eq!(input.scroll_delta, 0.0);
        assert_eq!(input.cursor(), Some(Vec2::new(5.0, 5.0)));
    }
}
