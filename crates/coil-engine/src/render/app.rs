//! winit application running a [`Game`] in a window.
//!
//! Every `RedrawRequested` is one frame: the game polls input and runs
//! whatever ticks are due, the frame is recorded into a [`DrawList`] and the
//! [`QuadRenderer`] draws it. Keyboard events are forwarded as they arrive.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{WindowAttributes, WindowId};

use super::renderer::QuadRenderer;
use crate::canvas::DrawList;
use crate::game::Game;
use crate::input::Key;

/// Run `game` in a `width x height` window until it quits or the window is
/// closed.
///
/// # Errors
///
/// Fails when the event loop, the window or the renderer cannot be created,
/// or when a tick fails.
pub fn run_windowed(game: Game, title: &str, width: u32, height: u32) -> Result<(), anyhow::Error> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        state: AppState::Pending {
            game,
            title: title.to_owned(),
            width,
            height,
        },
        failure: None,
    };
    event_loop.run_app(&mut app)?;

    match app.failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Map a physical key to a game key.
pub fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyR => Key::R,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

// ---------------------------------------------------------------------------
// Internal state machine
// ---------------------------------------------------------------------------

/// winit 0.30 only allows window creation inside `resumed`, so the app waits
/// in `Pending` until then.
enum AppState {
    Pending {
        game: Game,
        title: String,
        width: u32,
        height: u32,
    },
    Running {
        game: Game,
        renderer: QuadRenderer,
        frame: DrawList,
    },
    Transitioning,
}

struct App {
    state: AppState,
    /// First fatal error; returned from `run_windowed` once the loop exits.
    failure: Option<anyhow::Error>,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!(error = %err, "exiting");
        self.failure.get_or_insert(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let (game, title, width, height) =
            match std::mem::replace(&mut self.state, AppState::Transitioning) {
                AppState::Pending {
                    game,
                    title,
                    width,
                    height,
                } => (game, title, width, height),
                running => {
                    self.state = running;
                    return;
                }
            };

        let attrs = WindowAttributes::default()
            .with_title(title)
            .with_resizable(false)
            .with_inner_size(winit::dpi::PhysicalSize::new(width, height));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        match pollster::block_on(QuadRenderer::new(window.clone())) {
            Ok(renderer) => {
                tracing::info!(width, height, "window created");
                window.request_redraw();
                self.state = AppState::Running {
                    game,
                    renderer,
                    frame: DrawList::new(),
                };
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let AppState::Running {
            game,
            renderer,
            frame,
        } = &mut self.state
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(ticks = game.tick_count(), "window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => renderer.resize(size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                let Some(key) = map_key(code) else {
                    return;
                };
                let result = match state {
                    ElementState::Pressed => game.key_down(key),
                    ElementState::Released => {
                        game.key_up(key);
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    return self.fail(event_loop, e.into());
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = game.update(Instant::now()) {
                    return self.fail(event_loop, e.into());
                }
                if game.should_quit() {
                    event_loop.exit();
                    return;
                }

                game.render(frame);
                match renderer.render(frame.frame()) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = renderer.window().inner_size();
                        renderer.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        return self.fail(event_loop, anyhow::anyhow!("GPU out of memory"));
                    }
                    Err(e) => tracing::warn!(error = %e, "surface error during render"),
                }
                renderer.window().request_redraw();
            }
            _ => {}
        }
    }
}
