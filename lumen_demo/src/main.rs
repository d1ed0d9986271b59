//! Lumen demo - clears the window and draws a single triangle
//!
//! Shaders are read from `LUMEN_SHADER_DIR` (default: this crate's
//! `shaders/` directory) and must be compiled to SPIR-V first.
//! Set `RUST_LOG=debug` to route engine logs through `env_logger`.

use ash::vk;
use lumen_engine::lumen::config::{RendererConfig, ShaderPaths};
use lumen_engine::lumen::device::Extent2D;
use lumen_engine::lumen::frame::{FrameOutcome, PresentationState, RenderLoop, WindowSurface};
use lumen_engine::lumen::log::LogCrateLogger;
use lumen_engine::lumen::{Engine, Result};
use lumen_engine_renderer_vulkan::VulkanRenderer;
use log::{error, info};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

fn framebuffer_size(window: &Window) -> Extent2D {
    let size = window.inner_size();
    Extent2D::new(size.width, size.height)
}

/// Resize-path view of the winit window
///
/// winit delivers events to the handler, so pumping here only waits.
struct DemoSurface<'a> {
    window: &'a Window,
}

impl WindowSurface for DemoSurface<'_> {
    fn framebuffer_size(&self) -> Extent2D {
        framebuffer_size(self.window)
    }

    fn pump_events(&mut self) {
        std::thread::sleep(Duration::from_millis(16));
    }
}

struct DemoApp {
    // Dropped before the window it renders to
    render_loop: RenderLoop<VulkanRenderer>,
    window: Option<Window>,
    config: RendererConfig,
    last_tick: Instant,
}

impl DemoApp {
    fn new(config: RendererConfig) -> Self {
        Self {
            render_loop: RenderLoop::new(),
            window: None,
            config,
            last_tick: Instant::now(),
        }
    }

    fn load(&mut self, window: &Window) -> Result<()> {
        let renderer = VulkanRenderer::new(window, framebuffer_size(window), self.config.clone())?;
        self.render_loop.on_load(renderer)?;

        if let Some(scheduler) = self.render_loop.scheduler_mut() {
            scheduler.add_draw_callback(
                |device: &ash::Device, command_buffer: vk::CommandBuffer, _dt: f64| -> Result<()> {
                    unsafe { device.cmd_draw(command_buffer, 3, 1, 0, 0) };
                    Ok(())
                },
            );
        }
        Ok(())
    }

    fn resize(&mut self) -> Result<()> {
        if let Some(window) = self.window.as_ref() {
            if framebuffer_size(window).is_degenerate() {
                // Frames are skipped until a usable size comes back
                return Ok(());
            }
            let mut surface = DemoSurface { window };
            if let Some(extent) = self.render_loop.on_resize(&mut surface)? {
                info!("Swapchain now {}x{}", extent.width, extent.height);
            }
        }
        Ok(())
    }

    fn tick(&mut self) -> Result<()> {
        if self.render_loop.scheduler().map_or(false, |scheduler| scheduler.is_shut_down()) {
            return Ok(());
        }
        let now = Instant::now();
        let delta_time = now.duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;

        self.render_loop.on_update(delta_time);
        let outcome = self.render_loop.on_render(delta_time)?;

        let stale = self
            .render_loop
            .scheduler()
            .map_or(false, |scheduler| scheduler.state() == PresentationState::Stale);
        if stale && outcome != FrameOutcome::Skipped {
            self.resize()?;
        }
        Ok(())
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.render_loop.shutdown() {
            error!("Shutdown failed: {}", e);
        }
        if let Some(scheduler) = self.render_loop.scheduler() {
            let stats = scheduler.stats();
            info!(
                "{} frames presented, {} skipped, {} swapchain rebuilds",
                stats.frames_presented, stats.frames_skipped, stats.swapchain_recreations
            );
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("Lumen")
            .with_inner_size(PhysicalSize::new(800, 600));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.load(&window) {
            error!("Renderer bring-up failed: {}", e);
            event_loop.exit();
            return;
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.exit(event_loop),
            WindowEvent::Resized(_) => {
                if let Err(e) = self.resize() {
                    error!("Swapchain rebuild failed: {}", e);
                    self.exit(event_loop);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.tick() {
                    error!("Frame failed: {}", e);
                    self.exit(event_loop);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
        Engine::set_logger(LogCrateLogger);
    }

    let shader_dir = std::env::var_os("LUMEN_SHADER_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("shaders"));

    let config = RendererConfig {
        app_name: "Lumen Demo".to_string(),
        shaders: ShaderPaths::new(shader_dir, "triangle"),
        clear_color: [0.02, 0.02, 0.05, 1.0],
        ..RendererConfig::default()
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = DemoApp::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
