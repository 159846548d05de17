use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec2;
use log::{info, warn};
use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::EventLoop,
    keyboard::PhysicalKey,
    window::WindowBuilder,
};

use rusted_leap::engine::game_loop::GameLoop;
use rusted_leap::engine::input::Action;
use rusted_leap::game::movement::MovementParams;
use rusted_leap::game::room::Room;
use rusted_leap::game::session::PlayerSession;

const PARAMS_PATH: &str = "assets/movement.ron";
const DEFAULT_ROOM: &str = "assets/rooms/sandbox.ron";

/// Frames between window title refreshes
const TITLE_REFRESH_FRAMES: u64 = 30;

fn title_needs_refresh(frame_count: u64, state_changed: bool) -> bool {
    state_changed || frame_count % TITLE_REFRESH_FRAMES == 0
}

fn window_title(state: &str, fps: f32) -> String {
    format!("Rusted Leap - {} - {:.0} fps", state, fps)
}

fn load_params() -> MovementParams {
    if !Path::new(PARAMS_PATH).exists() {
        info!("No {} found, using built-in movement params", PARAMS_PATH);
        return MovementParams::default();
    }
    match MovementParams::load(PARAMS_PATH) {
        Ok(params) => params,
        Err(e) => {
            warn!("Ignoring {}: {}", PARAMS_PATH, e);
            MovementParams::default()
        }
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Starting Rusted Leap...");

    let room_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ROOM.to_string());
    let room = Room::load(&room_path).with_context(|| format!("loading room {}", room_path))?;
    let params = load_params();

    // Create event loop and window
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Rusted Leap")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
        .with_resizable(true)
        .build(&event_loop)?;

    info!("Window created successfully");

    let size = window.inner_size();
    let mut session = PlayerSession::new(
        room,
        params,
        Vec2::new(size.width as f32, size.height as f32),
    );
    let mut game_loop = GameLoop::new();
    let handle = game_loop.handle();
    let mut shown_state = "";

    // Main event loop
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Close requested, shutting down...");
                handle.stop();
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(physical_size),
                ..
            } => {
                session
                    .camera_mut()
                    .resize(physical_size.width as f32, physical_size.height as f32);
            }
            Event::WindowEvent {
                event: WindowEvent::Focused(false),
                ..
            } => {
                session.input_mut().reset();
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { event, .. },
                ..
            } => {
                let PhysicalKey::Code(key) = event.physical_key else {
                    return;
                };
                let pressed = event.state == ElementState::Pressed;
                let action = session.input_mut().process_key(key, pressed, event.repeat);
                if pressed && !event.repeat {
                    match action {
                        Some(Action::Pause) => game_loop.toggle_pause(),
                        Some(Action::Menu) => {
                            handle.stop();
                            elwt.exit();
                        }
                        _ => {}
                    }
                }
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                game_loop.run_frame(&mut session);

                let state = session.body().state_name();
                if title_needs_refresh(game_loop.frame_count(), state != shown_state) {
                    shown_state = state;
                    window.set_title(&window_title(state, game_loop.fps()));
                }
            }
            Event::AboutToWait => {
                // Request redraw on next frame
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
