//! Monaco Engine 2 demo
//!
//! Opens a window, loads the configured actors and renders them with the
//! Vulkan backend. Engine logs are forwarded to the `log` facade so
//! `RUST_LOG` controls verbosity.

use std::time::{Duration, Instant};

use monaco_engine::monaco::app::{AppConfig, EditorSession, UiOverlay};
use monaco_engine::monaco::log::{LogEntry, LogSeverity, Logger};
use monaco_engine::monaco::render::DeviceContext;
use monaco_engine::monaco::scene::Scene;
use monaco_engine::monaco::{Application, Engine, Result};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const WINDOW_TITLE: &str = "Monaco Engine 2";

/// Forwards engine log entries to the `log` crate
struct LogBridge;

impl Logger for LogBridge {
    fn log(&self, entry: &LogEntry) {
        let level = match entry.severity {
            LogSeverity::Trace => log::Level::Trace,
            LogSeverity::Debug => log::Level::Debug,
            LogSeverity::Info => log::Level::Info,
            LogSeverity::Warn => log::Level::Warn,
            LogSeverity::Error => log::Level::Error,
        };
        match (&entry.file, entry.line) {
            (Some(file), Some(line)) => {
                log::log!(target: &entry.source, level, "{} ({}:{})", entry.message, file, line)
            }
            _ => log::log!(target: &entry.source, level, "{}", entry.message),
        }
    }
}

/// Minimal overlay: frame statistics and the selected actor in the title bar
struct TitleBarStats {
    window: std::sync::Arc<Window>,
    last_update: Instant,
}

impl UiOverlay for TitleBarStats {
    fn compose(&mut self, session: &mut EditorSession, scene: &mut Scene) {
        if self.last_update.elapsed() < Duration::from_millis(500) {
            return;
        }
        self.last_update = Instant::now();

        if session.selected_actor.is_none() && !scene.is_empty() {
            session.select(0, scene.len());
        }
        let selected = session
            .selected_actor
            .and_then(|index| scene.actor(index))
            .map(|actor| actor.name().to_string())
            .unwrap_or_else(|| "none".to_string());

        if session.show_stats {
            self.window.set_title(&format!(
                "{} - {:.0} fps - frame {} - {} actors - selected: {}",
                WINDOW_TITLE, session.fps, session.frame_count, scene.len(), selected
            ));
        }
    }

    fn submit(&mut self, _device_context: &mut DeviceContext) -> Result<()> {
        Ok(())
    }

    fn shutdown(&mut self) {
        self.window.set_title(WINDOW_TITLE);
    }
}

struct Demo {
    config: AppConfig,
    window: Option<std::sync::Arc<Window>>,
    app: Option<Application>,
}

impl Demo {
    fn new(config: AppConfig) -> Self {
        Self { config, window: None, app: None }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> std::result::Result<(), String> {
        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = std::sync::Arc::new(
            event_loop.create_window(attrs).map_err(|e| format!("failed to create window: {e}"))?,
        );

        let mut app = Application::new(self.config.clone());
        app.init(window.as_ref()).map_err(|e| format!("initialization failed: {e}"))?;
        app.set_overlay(Box::new(TitleBarStats {
            window: window.clone(),
            last_update: Instant::now(),
        }));

        self.window = Some(window);
        self.app = Some(app);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut app) = self.app.take() {
            app.destroy();
        }
        self.window = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for Demo {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            log::error!("{e}");
            self.shutdown(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state: ElementState::Pressed, .. },
                ..
            } => match code {
                KeyCode::Escape => self.shutdown(event_loop),
                KeyCode::KeyV => {
                    if let Some(app) = self.app.as_mut() {
                        let vsync = !app.config().graphics.vsync;
                        app.set_vsync(vsync);
                        log::info!("vsync {}", if vsync { "on" } else { "off" });
                    }
                }
                _ => {}
            },
            WindowEvent::Resized(size) => {
                if let Some(app) = self.app.as_mut() {
                    if let Err(e) = app.resize(size.width, size.height) {
                        log::error!("resize failed: {e}");
                        self.shutdown(event_loop);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(app) = self.app.as_mut() {
                    if let Err(e) = app.tick() {
                        log::error!("frame failed: {e}");
                        self.shutdown(event_loop);
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Engine::set_logger(LogBridge);
    monaco_engine_renderer_vulkan::register();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("failed to create event loop: {e}");
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut demo = Demo::new(AppConfig::default());
    if let Err(e) = event_loop.run_app(&mut demo) {
        log::error!("event loop terminated with error: {e}");
    }
}
