use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, Window, WindowId};
use softbuffer::Surface;

use crate::config::Config;
use crate::loader::ImageSource;
use crate::ui::render::Canvas;
use crate::ui::state::Player;

pub mod idle;
pub mod render;
pub mod state;
pub mod transition;

const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

// ---------------------------------------------------------------------------
// Application handler (winit 0.30 style)
// ---------------------------------------------------------------------------

pub struct App<S: ImageSource> {
    pub player: Player<S>,
    config: Arc<Config>,
    pub window: Option<Arc<Window>>,
    pub context: Option<softbuffer::Context<Arc<Window>>>,
    pub surface: Option<Surface<Arc<Window>, Arc<Window>>>,
    surface_size: Option<(u32, u32)>,
    pub next_redraw: Option<Instant>,
    /// Set when the window or framebuffer could not be created.
    pub fatal: Option<String>,
}

impl<S: ImageSource> App<S> {
    pub fn new(player: Player<S>, config: Arc<Config>) -> Self {
        Self {
            player,
            config,
            window: None,
            context: None,
            surface: None,
            surface_size: None,
            next_redraw: None,
            fatal: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), String> {
        let mut attrs = Window::default_attributes().with_title("tv");
        attrs = if self.config.fullscreen {
            attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
        } else {
            attrs.with_inner_size(LogicalSize::new(1280u32, 720u32))
        };

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| format!("create window: {}", e))?,
        );
        window.set_cursor_visible(false);
        let context = softbuffer::Context::new(Arc::clone(&window))
            .map_err(|e| format!("create context: {}", e))?;
        let surface = Surface::new(&context, Arc::clone(&window))
            .map_err(|e| format!("create surface: {}", e))?;

        window.request_redraw();
        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);
        Ok(())
    }

    fn quit(&self, event_loop: &ActiveEventLoop, reason: &str) {
        log::info!("Exiting: {}", reason);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.as_ref() else { return };
        let Some(surface) = self.surface.as_mut() else { return };

        let PhysicalSize { width, height } = window.inner_size();
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            // Minimized; try again later.
            return;
        };
        if self.surface_size != Some((width, height)) {
            if let Err(e) = surface.resize(w, h) {
                self.fatal = Some(format!("resize surface: {}", e));
                event_loop.exit();
                return;
            }
            self.surface_size = Some((width, height));
        }

        match surface.buffer_mut() {
            Ok(mut buffer) => {
                let mut canvas = Canvas::new(&mut buffer, width, height);
                self.player.frame(&mut canvas, Instant::now());
                if let Err(e) = buffer.present() {
                    log::warn!("Present failed: {}", e);
                }
            }
            Err(e) => log::warn!("Framebuffer unavailable: {}", e),
        }
    }
}

impl<S: ImageSource> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.quit(event_loop, "window closed"),

            WindowEvent::Resized(_) => {
                if let Some(ref window) = self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let quit = match &event.logical_key {
                    Key::Named(NamedKey::Escape) => true,
                    Key::Character(s) => s.eq_ignore_ascii_case("q"),
                    _ => false,
                };
                if quit {
                    self.quit(event_loop, "key pressed");
                }
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if self.config.click_to_exit => self.quit(event_loop, "click"),

            WindowEvent::Touch(Touch {
                phase: TouchPhase::Started,
                ..
            }) if self.config.click_to_exit => self.quit(event_loop, "tap"),

            WindowEvent::RedrawRequested => {
                let started = Instant::now();
                self.redraw(event_loop);
                self.next_redraw = Some(started + FRAME_INTERVAL);
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(when) = self.next_redraw {
            if Instant::now() >= when {
                self.next_redraw = None;
                if let Some(ref window) = self.window {
                    window.request_redraw();
                }
                event_loop.set_control_flow(ControlFlow::Wait);
            } else {
                event_loop.set_control_flow(ControlFlow::WaitUntil(when));
            }
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        log::debug!("Stopping while {:?}", self.player.state());
        self.player.release();
    }
}
