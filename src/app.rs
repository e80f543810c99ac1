//! Window, event loop and the glue between input, state and the renderer.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::frame::FrameLoop;
use crate::gpu::GpuState;
use crate::panel::ParameterPanel;
use crate::state::{AppState, Change};

/// Open the window and render until it is closed.
///
/// Returns an error if the configuration is invalid or the window or GPU
/// cannot be brought up.
pub fn run(config: AppConfig) -> Result<(), AppError> {
    config.validate()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// What a mouse drag does to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Orbit,
    Pan,
}

impl DragMode {
    fn for_button(button: MouseButton) -> Option<Self> {
        match button {
            MouseButton::Left => Some(DragMode::Orbit),
            MouseButton::Right => Some(DragMode::Pan),
            _ => None,
        }
    }
}

/// Drag in progress: left button orbits, right button pans.
#[derive(Default)]
struct Drag {
    mode: Option<DragMode>,
    last: Option<PhysicalPosition<f64>>,
}

impl Drag {
    fn press(&mut self, mode: DragMode, pressed: bool) {
        if pressed {
            self.mode = Some(mode);
        } else if self.mode == Some(mode) {
            self.mode = None;
        }
        if self.mode.is_none() || pressed {
            self.last = None;
        }
    }
}

struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    state: Option<AppState>,
    gpu: Option<GpuState>,
    panel: ParameterPanel,
    frame_loop: FrameLoop,
    drag: Drag,
    /// Startup failure, reported once the event loop has exited.
    error: Option<AppError>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            window: None,
            state: None,
            gpu: None,
            panel: ParameterPanel::new(),
            frame_loop: FrameLoop::new(),
            drag: Drag::default(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let (width, height) = self.config.window_size();
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title())
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();

        let state = AppState::new(&self.config, size.width.max(1), size.height.max(1));
        let gpu = pollster::block_on(GpuState::new(window.clone(), &state))?;

        window.request_redraw();
        self.window = Some(window);
        self.state = Some(state);
        self.gpu = Some(gpu);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(state), Some(gpu)) = (&self.window, &mut self.state, &mut self.gpu)
        else {
            return;
        };

        gpu.egui.begin_frame(window);
        self.panel.show(&gpu.egui.ctx, state, self.frame_loop.stats());
        let overlay = gpu.egui.end_frame(window);

        let changes: Vec<Change> = self
            .panel
            .take_commands()
            .into_iter()
            .map(|command| state.apply(command))
            .collect();
        gpu.sync(state, &changes);
        gpu.set_overlay(overlay);

        match self.frame_loop.tick(gpu) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("skipped frame: {e}"),
        }

        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let consumed = match (&self.window, &mut self.gpu) {
            (Some(window), Some(gpu)) => gpu.egui.on_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let (Some(state), Some(gpu)) = (&mut self.state, &mut self.gpu) {
                    if state.resize(size.width, size.height) {
                        gpu.resize(size.width, size.height, state);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(mode) = DragMode::for_button(button) else {
                    return;
                };
                let over_panel = self.gpu.as_ref().is_some_and(|gpu| gpu.egui.wants_pointer());
                let pressed = state == ElementState::Pressed;
                if pressed && (consumed || over_panel) {
                    return;
                }
                self.drag.press(mode, pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let Some(mode) = self.drag.mode else {
                    return;
                };
                if let (Some(last), Some(state)) = (self.drag.last, &mut self.state) {
                    let dx = (position.x - last.x) as f32;
                    let dy = (position.y - last.y) as f32;
                    match mode {
                        DragMode::Orbit => state.orbit(dx, dy),
                        DragMode::Pan => state.pan(dx, dy),
                    }
                }
                self.drag.last = Some(position);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_pick_drag_mode() {
        assert_eq!(DragMode::for_button(MouseButton::Left), Some(DragMode::Orbit));
        assert_eq!(DragMode::for_button(MouseButton::Right), Some(DragMode::Pan));
        assert_eq!(DragMode::for_button(MouseButton::Middle), None);
    }

    #[test]
    fn test_release_ends_only_its_own_drag() {
        let mut drag = Drag::default();
        drag.press(DragMode::Pan, true);
        drag.last = Some(PhysicalPosition::new(10.0, 10.0));

        // Releasing the other button leaves the pan running.
        drag.press(DragMode::Orbit, false);
        assert_eq!(drag.mode, Some(DragMode::Pan));
        assert!(drag.last.is_some());

        drag.press(DragMode::Pan, false);
        assert_eq!(drag.mode, None);
        assert!(drag.last.is_none());
    }

    #[test]
    fn test_new_press_restarts_drag() {
        let mut drag = Drag::default();
        drag.press(DragMode::Orbit, true);
        drag.last = Some(PhysicalPosition::new(5.0, 5.0));

        drag.press(DragMode::Pan, true);
        assert_eq!(drag.mode, Some(DragMode::Pan));
        assert!(drag.last.is_none());
    }
}
