use std::error::Error;
use std::time::{Duration, Instant};

use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::graphics::{CpuRenderer, Renderer2d};
use crate::surface::SurfaceSize;
use crate::view_tree::{UiInput, ViewTree, hit_test_actions, paint};

pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

pub struct AppConfig {
    pub title: String,
    pub desired_size: PhysicalSize<u32>,
    pub clamp_to_monitor: bool,
    pub vsync: bool,
    pub frame_interval: Duration,
}

pub struct AppContext {
    pub window: Window,
    pub pixels: Pixels,
    pub surface_size: SurfaceSize,
}

#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub mouse_pos: Option<(u32, u32)>,
    pub mouse_down: bool,
    pub mouse_up: bool,
    pub keys_pressed: Vec<VirtualKeyCode>,
}

impl InputFrame {
    pub fn ui(&self) -> UiInput {
        UiInput {
            mouse_pos: self.mouse_pos,
            mouse_down: self.mouse_down,
            mouse_up: self.mouse_up,
        }
    }

    /// Clears the edge-triggered parts of the frame; the pointer position persists.
    fn end_frame(&mut self) {
        self.mouse_down = false;
        self.mouse_up = false;
        self.keys_pressed.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// A windowed app driven by `run_game`.
///
/// Every frame: build the view from state, hit test it against the frame's input, let the app
/// update state (advancing its timers by `dt`), rebuild the view, and paint it.
pub trait GameApp {
    type State;
    type Action: Clone;

    fn init_state(&mut self, ctx: &mut AppContext) -> Self::State;

    fn build_view(&self, state: &Self::State, size: SurfaceSize) -> ViewTree<Self::Action>;

    fn update_state(
        &mut self,
        state: &mut Self::State,
        input: &InputFrame,
        dt: Duration,
        actions: &[Self::Action],
    ) -> AppControl;

    fn render(&mut self, view: &ViewTree<Self::Action>, gfx: &mut dyn Renderer2d) {
        paint(view, gfx);
    }

    /// Called once before the event loop exits.
    fn shutdown(&mut self, _state: &mut Self::State) {}
}

pub fn run_game<G: GameApp + 'static>(config: AppConfig, mut game: G) -> Result<(), Box<dyn Error>>
where
    G::State: 'static,
{
    let event_loop = EventLoop::new();
    let monitor_size = if config.clamp_to_monitor {
        event_loop.primary_monitor().map(|m| m.size())
    } else {
        None
    };
    let initial_size = if let Some(monitor) = monitor_size {
        PhysicalSize::new(
            config.desired_size.width.min(monitor.width),
            config.desired_size.height.min(monitor.height),
        )
    } else {
        config.desired_size
    };
    let window = WindowBuilder::new()
        .with_title(config.title)
        .with_inner_size(initial_size)
        .build(&event_loop)?;

    let window_size = window.inner_size();
    let surface_size = SurfaceSize::new(window_size.width.max(1), window_size.height.max(1));
    let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
    let pixels = PixelsBuilder::new(surface_size.width, surface_size.height, surface_texture)
        .enable_vsync(config.vsync)
        .build()?;

    let mut ctx = AppContext {
        window,
        pixels,
        surface_size,
    };
    let mut state = game.init_state(&mut ctx);
    let mut input = InputFrame::default();
    let frame_interval = config.frame_interval.max(Duration::from_millis(1));
    let mut last_frame = Instant::now();
    let mut next_redraw = last_frame;
    let mut shut_down = false;

    log::debug!(
        "window opened at {}x{}",
        surface_size.width,
        surface_size.height
    );

    event_loop.run(move |event, _, control_flow| {
        let mut exit = false;

        match &event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => exit = true,
                WindowEvent::Resized(size) => {
                    if size.width > 0 && size.height > 0 {
                        ctx.surface_size = SurfaceSize::new(size.width, size.height);
                        if let Err(err) = ctx.pixels.resize_surface(size.width, size.height) {
                            log::warn!("surface resize failed: {err}");
                        }
                        if let Err(err) = ctx.pixels.resize_buffer(size.width, size.height) {
                            log::warn!("buffer resize failed: {err}");
                        }
                        ctx.window.request_redraw();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input.mouse_pos =
                        Some((position.x.max(0.0) as u32, position.y.max(0.0) as u32));
                }
                WindowEvent::CursorLeft { .. } => {
                    input.mouse_pos = None;
                }
                WindowEvent::MouseInput {
                    state: mouse_state,
                    button: MouseButton::Left,
                    ..
                } => match mouse_state {
                    ElementState::Pressed => input.mouse_down = true,
                    ElementState::Released => input.mouse_up = true,
                },
                WindowEvent::KeyboardInput { input: key, .. } => {
                    if key.state == ElementState::Pressed {
                        if let Some(code) = key.virtual_keycode {
                            input.keys_pressed.push(code);
                        }
                    }
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                let now = Instant::now();
                let dt = now.saturating_duration_since(last_frame);
                last_frame = now;

                let view_for_input = game.build_view(&state, ctx.surface_size);
                let actions = hit_test_actions(&view_for_input, input.ui());
                if game.update_state(&mut state, &input, dt, &actions) == AppControl::Exit {
                    exit = true;
                }
                input.end_frame();

                let view = game.build_view(&state, ctx.surface_size);
                let size = ctx.surface_size;
                let mut gfx = CpuRenderer::new(ctx.pixels.frame_mut(), size);
                gfx.begin_frame(size);
                game.render(&view, &mut gfx);
                if let Err(err) = ctx.pixels.render() {
                    log::error!("present failed: {err}");
                    exit = true;
                }
            }
            Event::MainEventsCleared => {
                let now = Instant::now();
                if now >= next_redraw {
                    ctx.window.request_redraw();
                    next_redraw = now + frame_interval;
                }
            }
            _ => {}
        }

        if exit {
            if !shut_down {
                shut_down = true;
                game.shutdown(&mut state);
            }
            *control_flow = ControlFlow::Exit;
        } else {
            *control_flow = ControlFlow::WaitUntil(next_redraw);
        }
    });
}
