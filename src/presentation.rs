//! The presentation loop: one owned context, two animation models, two collaborators.
//!
//! Per frame:
//! 1. ask the [`EventSource`] whether quit was requested, and for `dt`
//! 2. advance the [`RotationModel`] and the [`LineSequencer`] with the same `dt`
//! 3. clear, draw the spiral points, draw the current line at its opacity
//! 4. present
//!
//! A quit request observed in step 1 still lets the current frame finish; the loop ends
//! afterwards.
//!
//! The window/GPU implementation of the collaborators lives in `render`; tests use
//! scripted fakes.

use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec2;

use crate::anim::{FadeTiming, LineSequencer, RotationModel};
use crate::scene::spiral::{SpiralParams, spiral_points};
use crate::scene::{Canvas, Rgba};
use crate::script::Script;

/// Draw sink for one frame.
///
/// Calls arrive in order `clear`, `draw_spiral_points`, `draw_text`, `present`.
pub trait Renderer {
    /// Current drawable size; the spiral is generated for it.
    fn canvas(&self) -> Canvas;

    fn clear(&mut self, background: Rgba);

    fn draw_spiral_points(&mut self, points: &[Vec2]);

    /// Draw `text` word-wrapped to `max_wrap_width` pixels, centered horizontally and
    /// anchored near the bottom of the canvas. `opacity` is in `[0, 255]`.
    fn draw_text(&mut self, text: &str, opacity: f32, max_wrap_width: f32);

    fn present(&mut self) -> anyhow::Result<()>;
}

/// Quit signal + frame clock.
pub trait EventSource {
    fn poll_quit_requested(&mut self) -> bool;

    /// Seconds since the previous call.
    fn elapsed_since_last_frame(&mut self) -> f32;
}

/// Whether the loop should keep going after a frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    Quit,
}

/// Presentation constants (look + layout). Fixed at compile time.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationConfig {
    pub background: Rgba,
    pub spiral_color: Rgba,
    pub text_color: Rgba,
    /// Side of the square drawn for each spiral point, in pixels.
    pub point_size_px: f32,
    pub spiral: SpiralParams,
    pub fade: FadeTiming,
    pub rotation_speed: f32,
    pub font_path: PathBuf,
    pub font_size_px: f32,
    /// Wrap width is `canvas.width - wrap_margin_px`.
    pub wrap_margin_px: f32,
    /// The text block's top edge sits this far above the canvas bottom.
    pub text_offset_from_bottom_px: f32,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            background: Rgba::from_srgb8(10, 10, 30),
            spiral_color: Rgba::WHITE,
            text_color: Rgba::from_srgb8(200, 220, 255),
            point_size_px: 2.0,
            spiral: SpiralParams::default(),
            fade: FadeTiming::default(),
            rotation_speed: crate::anim::rotation::ROTATION_SPEED,
            font_path: PathBuf::from("font.ttf"),
            font_size_px: 28.0,
            wrap_margin_px: 100.0,
            text_offset_from_bottom_px: 120.0,
        }
    }
}

impl PresentationConfig {
    #[inline]
    pub fn wrap_width(&self, canvas: Canvas) -> f32 {
        (canvas.width - self.wrap_margin_px).max(1.0)
    }
}

/// Owns all animation state for the running presentation.
#[derive(Debug, Clone)]
pub struct Presentation {
    config: PresentationConfig,
    rotation: RotationModel,
    lines: LineSequencer,
    // Reused between frames to avoid reallocating the point list.
    points: Vec<Vec2>,
}

impl Presentation {
    pub fn new(script: Arc<Script>, config: PresentationConfig) -> Self {
        Self {
            rotation: RotationModel::new(config.rotation_speed),
            lines: LineSequencer::with_timing(script, config.fade),
            points: Vec::new(),
            config,
        }
    }

    /// Advance both models by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.rotation.advance(dt);
        self.lines.advance(dt);
    }

    /// Issue the draw calls for the current state and present.
    pub fn draw<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> anyhow::Result<()> {
        let canvas = renderer.canvas();

        self.points.clear();
        self.points.extend(spiral_points(
            self.rotation.angle(),
            canvas,
            self.config.spiral,
        ));

        renderer.clear(self.config.background);
        renderer.draw_spiral_points(&self.points);
        renderer.draw_text(
            self.lines.current_line(),
            self.lines.opacity(),
            self.config.wrap_width(canvas),
        );
        renderer.present()
    }

    /// Run one full frame: poll, advance, draw, present.
    pub fn frame<E, R>(&mut self, events: &mut E, renderer: &mut R) -> anyhow::Result<Step>
    where
        E: EventSource + ?Sized,
        R: Renderer + ?Sized,
    {
        let quit = events.poll_quit_requested();
        let dt = events.elapsed_since_last_frame();

        self.advance(dt);
        self.draw(renderer)?;

        Ok(if quit { Step::Quit } else { Step::Continue })
    }

    /// Drive frames until quit is requested or presenting fails.
    pub fn run<E, R>(&mut self, events: &mut E, renderer: &mut R) -> anyhow::Result<()>
    where
        E: EventSource + ?Sized,
        R: Renderer + ?Sized,
    {
        while self.frame(events, renderer)? == Step::Continue {}
        Ok(())
    }

    #[inline]
    pub fn config(&self) -> &PresentationConfig {
        &self.config
    }

    #[inline]
    pub fn rotation(&self) -> &RotationModel {
        &self.rotation
    }

    #[inline]
    pub fn lines(&self) -> &LineSequencer {
        &self.lines
    }
}
