//! App entrypoint for the rendering layer.
//!
//! This module owns:
//! - the winit application lifecycle + event loop
//! - creating the window
//! - delegating to an injected async state builder
//!
//! The runner is generic over a state type `S: AppState`. The default state
//! ([`PresentationState`]) drives a [`Presentation`] through a window-backed
//! [`EventSource`] and the wgpu [`Renderer`](crate::presentation::Renderer).
//!
//! Quitting (window close or Escape) marks the event source; the frame that observes it
//! still runs to completion before the loop exits. Startup failures (no window, no GPU,
//! no font) end the loop and are returned from the runner.

use std::{future::Future, pin::Pin, sync::Arc};

use anyhow::Context as _;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::presentation::{EventSource, Presentation, PresentationConfig, Step};
use crate::render::util::{DEFAULT_MAX_DT, FrameClock};
use crate::render::wgpu_renderer::WgpuRenderer;
use crate::script::Script;

/// Shown once at startup.
pub const DISCLAIMER: &str = "This is a simulation for entertainment and informational \
purposes only and is not a real medical tool.";

/// App-facing configuration for running the winit event loop.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Window title.
    pub title: String,
    /// Initial inner size, in physical pixels.
    pub inner_size: PhysicalSize<u32>,
    pub resizable: bool,
    /// ControlFlow for the event loop. `Poll` keeps the animation running.
    pub control_flow: ControlFlow,
    pub present_mode: wgpu::PresentMode,
    /// Upper bound for one frame's `dt`, in seconds.
    pub max_dt: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Hypnosis Simulation".to_string(),
            inner_size: PhysicalSize::new(1024, 600),
            resizable: false,
            control_flow: ControlFlow::Poll,
            present_mode: wgpu::PresentMode::AutoVsync,
            max_dt: DEFAULT_MAX_DT,
        }
    }
}

impl AppConfig {
    fn window_attributes(&self) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(self.title.as_str())
            .with_inner_size(self.inner_size)
            .with_resizable(self.resizable)
    }
}

/// What a state must implement to be driven by the app runner.
pub trait AppState: 'static {
    /// Handle window resize.
    fn resize(&mut self, new_size: PhysicalSize<u32>);

    /// Run one frame. `Step::Quit` ends the event loop.
    fn redraw(&mut self) -> anyhow::Result<Step>;

    /// Mark that the user asked to quit; the next `redraw` reports `Step::Quit`.
    fn request_quit(&mut self);

    /// Request a redraw on the underlying window (used for continuous animation).
    fn request_redraw(&self);
}

/// Window-backed [`EventSource`]: quit flag set from winit events plus a clamped clock.
#[derive(Debug, Clone, Default)]
pub struct WindowEvents {
    quit_requested: bool,
    clock: FrameClock,
}

impl WindowEvents {
    pub fn new(max_dt: f32) -> Self {
        Self {
            quit_requested: false,
            clock: FrameClock::new().with_max_dt(max_dt),
        }
    }

    #[inline]
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }
}

impl EventSource for WindowEvents {
    fn poll_quit_requested(&mut self) -> bool {
        self.quit_requested
    }

    fn elapsed_since_last_frame(&mut self) -> f32 {
        self.clock.tick()
    }
}

/// The default app state: the presentation, its window events and the GPU renderer.
pub struct PresentationState {
    events: WindowEvents,
    renderer: WgpuRenderer,
    presentation: Presentation,
}

impl PresentationState {
    pub async fn new(
        window: Arc<Window>,
        app: &AppConfig,
        config: PresentationConfig,
    ) -> anyhow::Result<Self> {
        let renderer = WgpuRenderer::new(window, app.present_mode, &config).await?;
        let presentation = Presentation::new(Arc::new(Script::session()), config);

        Ok(Self {
            // The clock starts after GPU bring-up so the first dt is small.
            events: WindowEvents::new(app.max_dt),
            renderer,
            presentation,
        })
    }
}

impl AppState for PresentationState {
    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.renderer.resize(new_size);
    }

    fn redraw(&mut self) -> anyhow::Result<Step> {
        self.presentation.frame(&mut self.events, &mut self.renderer)
    }

    fn request_quit(&mut self) {
        self.events.request_quit();
    }

    fn request_redraw(&self) {
        self.renderer.window().request_redraw();
    }
}

/// Run the presentation with an explicit window configuration.
pub fn run_with_config(config: AppConfig) -> anyhow::Result<()> {
    info!("{DISCLAIMER}");

    let state_config = config.clone();
    run_with_builder::<PresentationState, _, _>(config, move |window| async move {
        PresentationState::new(window, &state_config, PresentationConfig::default()).await
    })
}

/// Run the presentation using defaults.
pub fn run() -> anyhow::Result<()> {
    run_with_config(AppConfig::default())
}

/// Run the winit event loop with an injected async state builder.
///
/// Notes:
/// - The builder is called once when the app is resumed (after the window is created).
/// - The builder runs on the current thread using `pollster::block_on`.
/// - An error from window creation, the builder or a frame stops the loop and is
///   returned here.
pub fn run_with_builder<S, B, Fut>(config: AppConfig, builder: B) -> anyhow::Result<()>
where
    S: AppState,
    B: FnOnce(Arc<Window>) -> Fut + 'static,
    Fut: Future<Output = anyhow::Result<S>> + 'static,
{
    let event_loop = EventLoop::new().context("winit: failed to create EventLoop")?;
    event_loop.set_control_flow(config.control_flow);

    let mut app = App::<S>::new_with_builder(config, builder);
    event_loop
        .run_app(&mut app)
        .context("winit: run_app failed")?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Type-erased async builder for creating a state `S` from a created window.
///
/// The future is pinned and boxed so `pollster::block_on(...)` can drive it.
type BoxedStateBuilder<S> = Box<
    dyn FnOnce(Arc<Window>) -> Pin<Box<dyn Future<Output = anyhow::Result<S>> + 'static>> + 'static,
>;

/// Application state used by winit.
struct App<S: AppState> {
    config: AppConfig,
    builder: Option<BoxedStateBuilder<S>>,
    state: Option<S>,
    exiting: bool,
    error: Option<anyhow::Error>,
}

impl<S: AppState> App<S> {
    fn new_with_builder<B, Fut>(config: AppConfig, builder: B) -> Self
    where
        B: FnOnce(Arc<Window>) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<S>> + 'static,
    {
        Self {
            config,
            builder: Some(Box::new(|window| Box::pin(builder(window)))),
            state: None,
            exiting: false,
            error: None,
        }
    }

    /// Stop the loop, drop the state (window + GPU) and keep `err` for the caller.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.error.get_or_insert(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.exiting = true;
        self.state = None;
        event_loop.exit();
    }

    fn build_state(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = event_loop
            .create_window(self.config.window_attributes())
            .context("winit: failed to create window")?;

        let Some(builder) = self.builder.take() else {
            return Ok(());
        };
        let state = pollster::block_on(builder(Arc::new(window)))
            .context("failed to initialize the presentation")?;

        // Kick off rendering
        state.request_redraw();
        self.state = Some(state);
        Ok(())
    }

    /// Run one frame and act on its outcome.
    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match state.redraw() {
            Ok(Step::Continue) => state.request_redraw(),
            Ok(Step::Quit) => {
                info!("Quit requested; exiting");
                self.shutdown(event_loop);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    /// Record the quit and finish the frame that observes it right away.
    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_mut() {
            state.request_quit();
        }
        self.frame(event_loop);
    }
}

impl<S: AppState> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.builder.is_none() {
            return;
        }
        if let Err(err) = self.build_state(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.exiting || self.state.is_none() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested");
                self.quit(event_loop);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                info!("Escape pressed");
                self.quit(event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.resize(size);
                    state.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            WindowEvent::Destroyed => {
                warn!("Window destroyed before quit was requested");
                self.shutdown(event_loop);
            }
            _ => {}
        }
    }
}
