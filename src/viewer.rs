//! Interactive window.
//!
//! Controls:
//! - left drag: orbit
//! - wheel: zoom
//! - `Space`: pause the rotation
//! - `R`: reseed
//! - `L`: reload the parameter file (if one was given)
//! - `Escape`: quit

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::error::{GalaxyError, ViewerError};
use crate::galaxy::Galaxy;
use crate::gpu::GpuState;
use crate::params::GalaxyParams;

/// Animation clock that can be paused.
struct Clock {
    last: Instant,
    elapsed: f32,
    paused: bool,
}

impl Clock {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            elapsed: 0.0,
            paused: false,
        }
    }

    fn tick(&mut self) -> f32 {
        let now = Instant::now();
        if !self.paused {
            self.elapsed += (now - self.last).as_secs_f32();
        }
        self.last = now;
        self.elapsed
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    galaxy: Galaxy,
    params_path: Option<PathBuf>,
    clock: Clock,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    error: Option<ViewerError>,
}

impl App {
    fn new(galaxy: Galaxy, params_path: Option<PathBuf>) -> Self {
        Self {
            window: None,
            gpu_state: None,
            galaxy,
            params_path,
            clock: Clock::new(),
            mouse_pressed: false,
            last_mouse_pos: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title("Spiral Galaxy")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());
        self.gpu_state = Some(pollster::block_on(GpuState::new(window, &self.galaxy))?);
        Ok(())
    }

    fn reload_params(&mut self) {
        let Some(path) = &self.params_path else {
            log::warn!("no parameter file to reload");
            return;
        };
        let result = GalaxyParams::load(path)
            .map_err(GalaxyError::from)
            .and_then(|params| self.galaxy.update_params(params));
        match result {
            Ok(regen) if regen.any() => log::info!("reloaded {}", path.display()),
            Ok(_) => log::info!("{} unchanged", path.display()),
            Err(e) => log::error!("failed to reload {}: {e}", path.display()),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Space => {
                self.clock.paused = !self.clock.paused;
                log::info!("rotation {}", if self.clock.paused { "paused" } else { "resumed" });
            }
            KeyCode::KeyR => {
                if let Err(e) = self.galaxy.reseed(rand::random::<u64>()) {
                    log::warn!("reseeded without a new density field: {e}");
                }
            }
            KeyCode::KeyL => self.reload_params(),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code),
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = position.x - last_x;
                        let dy = position.y - last_y;
                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.camera.orbit(dx as f32, dy as f32);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => {
                self.galaxy.poll();
                let time = self.clock.tick();
                if let Some(gpu_state) = &mut self.gpu_state {
                    match gpu_state.render(&self.galaxy, time) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => gpu_state.resize(winit::dpi::PhysicalSize {
                            width: gpu_state.config.width,
                            height: gpu_state.config.height,
                        }),
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => log::warn!("render error: {e:?}"),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Open a window and render the galaxy until it is closed.
///
/// `params_path` is remembered so `L` can reload it.
pub fn run(params: GalaxyParams, params_path: Option<PathBuf>) -> Result<(), ViewerError> {
    let galaxy = Galaxy::new(params)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(galaxy, params_path);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_clock_holds_time() {
        let mut clock = Clock::new();
        clock.paused = true;
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(clock.tick(), 0.0);
        clock.paused = false;
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(clock.tick() > 0.0);
    }
}
