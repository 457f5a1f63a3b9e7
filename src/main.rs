// Aura host: winit window, wgpu renderer, and the game loop.
//
// Controls:
//   WASD       move (relative to the camera yaw)
//   Mouse      hover enemies to highlight them
//   Wheel      zoom
//   F3         debug overlay
//   Escape     quit

mod renderer;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use glam::Vec3;
use log::{error, info, warn};
use winit::{
    event::{ElementState, Event as WinitEvent, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, CursorIcon, Window},
};

use aura::config::GameConfig;
use aura::engine::debug_overlay::{DebugStats, HoverMarker};
use aura::engine::input::InputState;
use aura::error::AppError;
use aura::game::player_controller::{InputMode, MouseCursor, MouseLockMode, PlayerController};
use aura::game::render::extract_instances;
use aura::game::Game;
use renderer::Renderer;

#[derive(Parser, Debug)]
#[command(name = "aura", about = "Top-down action game with cursor hover highlighting")]
struct Args {
    /// TOML config file; the built-in config is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

// ============================================================================
// FRAME TIMING
// ============================================================================

/// Frame times collected over one-second windows for the overlay.
struct FrameTimer {
    window_start: Instant,
    frames: u32,
    sum_ms: f32,
    min_ms: f32,
    max_ms: f32,
    fps: u32,
    avg_ms: f32,
    last_min_ms: f32,
    last_max_ms: f32,
}

impl FrameTimer {
    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            sum_ms: 0.0,
            min_ms: f32::MAX,
            max_ms: 0.0,
            fps: 0,
            avg_ms: 0.0,
            last_min_ms: 0.0,
            last_max_ms: 0.0,
        }
    }

    fn record(&mut self, dt: f32) {
        let ms = dt * 1000.0;
        self.frames += 1;
        self.sum_ms += ms;
        self.min_ms = self.min_ms.min(ms);
        self.max_ms = self.max_ms.max(ms);

        let now = Instant::now();
        if (now - self.window_start).as_secs_f32() >= 1.0 {
            self.fps = self.frames;
            self.avg_ms = self.sum_ms / self.frames as f32;
            self.last_min_ms = self.min_ms;
            self.last_max_ms = self.max_ms;
            self.frames = 0;
            self.sum_ms = 0.0;
            self.min_ms = f32::MAX;
            self.max_ms = 0.0;
            self.window_start = now;
        }
    }
}

// ============================================================================
// HOST HELPERS
// ============================================================================

/// Mirror the controller's cursor and input mode settings onto the window.
fn apply_cursor_settings(window: &Window, controller: &PlayerController) {
    window.set_cursor_visible(controller.show_mouse_cursor);
    window.set_cursor(match controller.default_mouse_cursor {
        MouseCursor::Default => CursorIcon::Default,
        MouseCursor::Crosshairs => CursorIcon::Crosshair,
        MouseCursor::Hand => CursorIcon::Pointer,
    });

    let grab = match controller.input_mode {
        InputMode::GameOnly
        | InputMode::GameAndUi {
            lock_mouse: MouseLockMode::LockAlways,
            ..
        } => CursorGrabMode::Confined,
        _ => CursorGrabMode::None,
    };
    if let Err(e) = window.set_cursor_grab(grab) {
        warn!("cursor grab {grab:?} not supported: {e}");
    }
}

fn debug_stats(game: &mut Game, timer: &FrameTimer, size: (u32, u32)) -> DebugStats {
    let entity_count = game.world.entities().len() as usize;
    let enemy_count = game
        .world
        .query::<&aura::game::enemy::Enemy>()
        .iter(&game.world)
        .count();
    let camera = game.camera();
    let target = camera.target();
    let (camera_distance, camera_zoom) = (camera.distance(), camera.zoom_fraction());

    let hovered = game.hovered_enemy().map(|(_, enemy)| enemy.name.clone());
    let (player_replication, player_health, player_mana) = match game.player_ability_system() {
        Some((asc, attributes)) => (
            format!("{:?} (replicated: {})", asc.replication_mode, asc.replicated),
            (attributes.health, attributes.max_health),
            (attributes.mana, attributes.max_mana),
        ),
        None => ("none".to_string(), (0.0, 0.0), (0.0, 0.0)),
    };

    DebugStats {
        fps: timer.fps,
        frame_time_avg_ms: timer.avg_ms,
        frame_time_min_ms: timer.last_min_ms,
        frame_time_max_ms: timer.last_max_ms,
        entity_count,
        enemy_count,
        draw_calls: 3,
        resolution: size,
        camera_target: (target.x, target.z),
        camera_distance,
        camera_zoom_pct: camera_zoom * 100.0,
        hovered,
        player_replication,
        player_health,
        player_mana,
    }
}

/// Screen-space ring around the hovered enemy.
fn hover_marker(game: &Game, size: (u32, u32), scale_factor: f32) -> Option<HoverMarker> {
    let (entity, _) = game.hovered_enemy()?;
    let transform = game.world.get::<aura::engine::components::Transform>(entity)?;
    let camera = game.camera();
    let center = camera.world_to_screen(transform.position, size)?;
    let edge = camera.world_to_screen(transform.position + Vec3::X, size)?;
    Some(HoverMarker {
        pos: egui::pos2(center.x / scale_factor, center.y / scale_factor),
        radius_px: ((edge - center).length() / scale_factor).max(8.0),
    })
}

// ============================================================================
// MAIN
// ============================================================================

fn run(args: Args) -> Result<(), AppError> {
    let config = match &args.config {
        Some(path) => {
            info!("loading config from {}", path.display());
            GameConfig::load(path)?
        }
        None => GameConfig::embedded()?,
    };

    let mut game = Game::new(&config)?;

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(config.window.width, config.window.height));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;
    if let Some(controller) = game.player_controller() {
        apply_cursor_settings(&window, controller);
    }

    let mut input = InputState::new();
    let size = renderer.size();
    input.window_size = (size.width, size.height);

    let mut timer = FrameTimer::new();
    let mut last_update = Instant::now();
    let outline_width = config.highlight.outline_width;

    event_loop.run(move |event, control_flow| {
        match event {
            WinitEvent::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => {
                if renderer.overlay.visible {
                    let _ = renderer.overlay.handle_window_event(&window, event);
                }
                input.process_event(event);

                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: PhysicalKey::Code(KeyCode::Escape),
                                ..
                            },
                        ..
                    } => control_flow.exit(),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: PhysicalKey::Code(KeyCode::F3),
                                repeat: false,
                                ..
                            },
                        ..
                    } => renderer.overlay.toggle(),
                    WindowEvent::Resized(physical_size) => {
                        renderer.resize(*physical_size);
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let dt = (now - last_update).as_secs_f32();
                        last_update = now;
                        timer.record(dt);

                        game.tick(dt, &input);
                        input.end_frame();

                        let size = renderer.size();
                        let size = (size.width, size.height);
                        let aspect = size.0 as f32 / size.1.max(1) as f32;
                        let view_proj = game.camera().view_projection(aspect);
                        let batches = extract_instances(&mut game.world, outline_width);

                        let (stats, hover) = if renderer.overlay.visible {
                            let scale_factor = window.scale_factor() as f32;
                            (
                                Some(debug_stats(&mut game, &timer, size)),
                                hover_marker(&game, size, scale_factor),
                            )
                        } else {
                            (None, None)
                        };

                        match renderer.render(&window, &batches, view_proj, stats.as_ref(), hover.as_ref()) {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                renderer.resize(renderer.size())
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                error!("GPU out of memory");
                                control_flow.exit();
                            }
                            Err(e) => warn!("surface error: {e:?}"),
                        }
                    }
                    _ => {}
                }
            }
            WinitEvent::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
