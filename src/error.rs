// Error types for the config loader, the player controller, game setup
// and the window/GPU host.

use std::path::PathBuf;

/// Errors raised while loading or validating `GameConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed fine but makes no sense for the game.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("unknown key name `{0}` in input mapping")]
    UnknownKey(String),
}

/// Failures of the player controller's setup steps.
///
/// These are setup bugs (missing assets or wiring), not runtime conditions:
/// the game refuses to start instead of running without input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("player controller has no input mapping context assigned")]
    MissingMappingContext,

    #[error("player controller has no move action assigned")]
    MissingMoveAction,

    #[error("local player has no enhanced input subsystem")]
    MissingInputSubsystem,

    #[error("player controller has no input component")]
    MissingInputComponent,

    #[error("player controller entity {0:?} does not exist")]
    MissingController(bevy_ecs::entity::Entity),
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Controller(#[from] ControllerError),
}

/// Failures bringing up the window surface and GPU device.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create window surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no GPU adapter compatible with the window surface")]
    NoAdapter,

    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Anything that stops the host binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}
