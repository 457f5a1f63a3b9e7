// Game configuration loaded from TOML.
//
// The embedded config/default.toml is used when no path is given; a file
// passed on the command line replaces it entirely.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::Deserialize;
use winit::keyboard::KeyCode;

use crate::engine::enhanced_input::{parse_key_code, InputAction, InputMappingContext, InputValueType};
use crate::error::ConfigError;

pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Name of the action bound to the player controller's move handler.
pub const MOVE_ACTION: &str = "Move";

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub player: PlayerConfig,
    #[serde(default)]
    pub enemies: Vec<EnemyConfig>,
    #[serde(default)]
    pub spawner: SpawnerConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub net: NetConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    pub distance: f32,
    /// Degrees above the horizon.
    pub pitch_degrees: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub walk_speed: f32,
    pub start: [f32; 3],
    /// Control rotation yaw in degrees; also the camera's yaw.
    #[serde(default)]
    pub control_yaw_degrees: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnemyConfig {
    pub name: String,
    pub position: [f32; 3],
    #[serde(default = "default_enemy_radius")]
    pub radius: f32,
    /// Weapon blade length; no weapon when absent.
    pub weapon_length: Option<f32>,
}

fn default_enemy_radius() -> f32 {
    0.5
}

/// Extra enemies scattered at random inside the arena.
#[derive(Debug, Clone, Deserialize)]
pub struct SpawnerConfig {
    pub extra_enemies: usize,
    pub seed: u64,
    pub arena_half_extent: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            extra_enemies: 0,
            seed: 42,
            arena_half_extent: 20.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub mapping_context: String,
    #[serde(rename = "move")]
    pub move_keys: Vec<AxisKeyConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AxisKeyConfig {
    pub key: String,
    /// Contribution to the Move axis: [right, forward].
    pub axis: [f32; 2],
}

/// Outline drawn around meshes rendering custom depth.
#[derive(Debug, Clone, Deserialize)]
pub struct HighlightConfig {
    /// World-space thickness of the outline shell.
    pub outline_width: f32,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self { outline_width: 0.06 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetConfig {
    pub net_update_frequency: f32,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            net_update_frequency: crate::game::player_state::DEFAULT_NET_UPDATE_FREQUENCY,
        }
    }
}

impl GameConfig {
    /// The config compiled into the binary.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid("window", "width and height must be non-zero"));
        }
        if self.camera.distance <= 0.0 {
            return Err(invalid("camera.distance", "must be positive"));
        }
        if !(0.0..=90.0).contains(&self.camera.pitch_degrees) {
            return Err(invalid("camera.pitch_degrees", "must be within 0..=90"));
        }
        if self.player.walk_speed <= 0.0 {
            return Err(invalid("player.walk_speed", "must be positive"));
        }
        if let Some(enemy) = self.enemies.iter().find(|e| e.radius <= 0.0) {
            return Err(invalid("enemies.radius", format!("enemy '{}' has a non-positive radius", enemy.name)));
        }
        if self.spawner.arena_half_extent <= 0.0 {
            return Err(invalid("spawner.arena_half_extent", "must be positive"));
        }
        if self.input.mapping_context.is_empty() {
            return Err(invalid("input.mapping_context", "must be named"));
        }
        if self.input.move_keys.is_empty() {
            return Err(invalid("input.move", "at least one key is required"));
        }
        if !(0.0..=1.0).contains(&self.highlight.outline_width) {
            return Err(invalid("highlight.outline_width", "must be within 0..=1"));
        }
        if self.net.net_update_frequency <= 0.0 {
            return Err(invalid("net.net_update_frequency", "must be positive"));
        }
        for mapping in &self.input.move_keys {
            parse_key(&mapping.key)?;
        }
        Ok(())
    }

    /// Build the player's mapping context and its Move action.
    pub fn mapping_context(&self) -> Result<(InputMappingContext, InputAction), ConfigError> {
        let move_action = InputAction::new(MOVE_ACTION, InputValueType::Axis2D);
        let mut context = InputMappingContext::new(self.input.mapping_context.clone());
        for mapping in &self.input.move_keys {
            context.map_key(&move_action, parse_key(&mapping.key)?, Vec2::from(mapping.axis));
        }
        Ok((context, move_action))
    }

    pub fn player_start(&self) -> Vec3 {
        Vec3::from(self.player.start)
    }
}

fn parse_key(name: &str) -> Result<KeyCode, ConfigError> {
    parse_key_code(name).ok_or_else(|| ConfigError::UnknownKey(name.to_string()))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::embedded().unwrap();
        assert_eq!(config.input.mapping_context, "AuraContext");
        assert!(config.highlight.outline_width > 0.0);
        assert_eq!(config.net.net_update_frequency, 100.0);
        assert!(!config.enemies.is_empty());

        let (context, action) = config.mapping_context().unwrap();
        assert_eq!(action.name, MOVE_ACTION);
        assert_eq!(context.mappings.len(), config.input.move_keys.len());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let content = DEFAULT_CONFIG.replace("\"KeyW\"", "\"KeyNope\"");
        match GameConfig::from_toml(&content) {
            Err(ConfigError::UnknownKey(key)) => assert_eq!(key, "KeyNope"),
            other => panic!("expected UnknownKey, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_walk_speed_rejected() {
        let content = DEFAULT_CONFIG.replace("walk_speed = 6.0", "walk_speed = 0.0");
        assert!(matches!(
            GameConfig::from_toml(&content),
            Err(ConfigError::Invalid { field: "player.walk_speed", .. })
        ));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert!(matches!(GameConfig::from_toml("[window"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GameConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
