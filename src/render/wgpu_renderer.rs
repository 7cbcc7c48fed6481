//! [`Renderer`] implementation on top of wgpu.
//!
//! Draw calls only record what the frame should contain; `present()` turns the
//! recording into one batch, encodes a single render pass and presents it.
//!
//! Text is laid out (wrapped + tessellated) only when the line, the wrap width or the
//! canvas changes. Between changes the cached block is reused and only its alpha varies.

use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use log::{debug, warn};
use winit::window::Window;

use crate::anim::fade::MAX_OPACITY;
use crate::font::FontSystem;
use crate::font::text::{TextBlock, TextLayoutOptions, bottom_centered_origin, layout_wrapped_text};
use crate::presentation::{PresentationConfig, Renderer};
use crate::render::gpu::Gpu;
use crate::render::mesh_renderer::MeshRenderer;
use crate::render::primitives::{Batch2D, clear_color};
use crate::scene::spiral::points_to_mesh;
use crate::scene::{Canvas, Mesh2D, Rgba};

/// What a cached text block was laid out for.
#[derive(Debug, Clone, PartialEq)]
struct TextKey {
    text: String,
    max_width_px: f32,
}

/// A laid-out line of the script; `None` when layout failed (already logged).
struct CachedText {
    key: TextKey,
    block: Option<TextBlock>,
}

/// Everything recorded for the frame being built.
#[derive(Default)]
struct FrameRecording {
    background: Option<Rgba>,
    spiral: Mesh2D,
    text_opacity: f32,
    text_visible: bool,
}

pub struct WgpuRenderer {
    window: Arc<Window>,
    gpu: Gpu,
    meshes: MeshRenderer,
    font: FontSystem,

    spiral_color: Rgba,
    text_color: Rgba,
    point_size_px: f32,
    font_size_px: f32,
    text_offset_from_bottom_px: f32,

    frame: FrameRecording,
    text: Option<CachedText>,
    batch: Batch2D,
}

impl WgpuRenderer {
    /// Bring up the GPU and load the font. Any failure here is fatal for the app.
    pub async fn new(
        window: Arc<Window>,
        present_mode: wgpu::PresentMode,
        config: &PresentationConfig,
    ) -> anyhow::Result<Self> {
        use anyhow::Context as _;

        let font = FontSystem::from_file(&config.font_path)
            .with_context(|| missing_font_message(&config.font_path))?;

        let gpu = Gpu::new(window.clone(), present_mode).await?;
        let meshes = MeshRenderer::new(&gpu)?;

        Ok(Self {
            window,
            gpu,
            meshes,
            font,
            spiral_color: config.spiral_color,
            text_color: config.text_color,
            point_size_px: config.point_size_px,
            font_size_px: config.font_size_px,
            text_offset_from_bottom_px: config.text_offset_from_bottom_px,
            frame: FrameRecording::default(),
            text: None,
            batch: Batch2D::default(),
        })
    }

    /// Forward a window resize to the surface.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    #[inline]
    pub fn window(&self) -> &Window {
        &self.window
    }

    fn ensure_text_layout(&mut self, text: &str, max_width_px: f32) {
        let key = TextKey {
            text: text.to_string(),
            max_width_px,
        };
        if self.text.as_ref().is_some_and(|c| c.key == key) {
            return;
        }

        let opts = TextLayoutOptions {
            font_size_px: self.font_size_px,
            max_width_px,
            ..Default::default()
        };

        let block = self
            .font
            .face()
            .parse()
            .and_then(|face| layout_wrapped_text(&face, text, &opts));

        let block = match block {
            Ok(block) => {
                debug!(
                    "text: laid out {} line(s), {:.0}x{:.0} px",
                    block.lines.len(),
                    block.width_px,
                    block.height_px
                );
                Some(block)
            }
            Err(err) => {
                warn!("text: layout failed for {text:?}: {err}");
                None
            }
        };

        self.text = Some(CachedText { key, block });
    }

    /// Turn the recording into a batch (spiral first, text on top).
    fn build_batch(&mut self, canvas: Canvas) {
        self.batch.clear();
        self.batch
            .push_mesh(&self.frame.spiral, self.spiral_color, [0.0, 0.0]);

        if !self.frame.text_visible {
            return;
        }
        let Some(block) = self.text.as_ref().and_then(|c| c.block.as_ref()) else {
            return;
        };

        let origin =
            bottom_centered_origin(block.width_px, canvas, self.text_offset_from_bottom_px);
        let fill = self
            .text_color
            .with_alpha(self.frame.text_opacity / MAX_OPACITY);

        for line in &block.lines {
            self.batch.push_mesh(line, fill, origin);
        }
    }

    fn submit(&mut self, canvas: Canvas, background: Rgba) -> anyhow::Result<()> {
        // Acquire frame (handle recoverable surface errors).
        let (surface_texture, view) = match self.gpu.acquire_frame() {
            Ok(v) => v,
            Err(wgpu::SurfaceError::Outdated)
            | Err(wgpu::SurfaceError::Lost)
            | Err(wgpu::SurfaceError::Other) => {
                self.gpu.resize(self.gpu.size);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow::anyhow!("wgpu SurfaceError::OutOfMemory"));
            }
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.meshes
                .draw_batch(&self.gpu, &mut pass, canvas, &self.batch);
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        surface_texture.present();

        Ok(())
    }
}

fn missing_font_message(path: &Path) -> String {
    format!("font: {} must be present in the working directory", path.display())
}

impl Renderer for WgpuRenderer {
    fn canvas(&self) -> Canvas {
        Canvas::from_px(self.gpu.size.width, self.gpu.size.height)
    }

    fn clear(&mut self, background: Rgba) {
        self.frame.background = Some(background);
        self.frame.spiral.positions.clear();
        self.frame.spiral.indices.clear();
        self.frame.text_visible = false;
    }

    fn draw_spiral_points(&mut self, points: &[Vec2]) {
        self.frame.spiral = points_to_mesh(points, self.point_size_px);
    }

    fn draw_text(&mut self, text: &str, opacity: f32, max_wrap_width: f32) {
        self.ensure_text_layout(text, max_wrap_width);
        self.frame.text_opacity = opacity;
        self.frame.text_visible = opacity > 0.0;
    }

    fn present(&mut self) -> anyhow::Result<()> {
        let canvas = self.canvas();
        if !self.gpu.is_drawable() || canvas.is_degenerate() {
            return Ok(());
        }

        let background = self.frame.background.unwrap_or(Rgba::BLACK);
        self.build_batch(canvas);
        self.submit(canvas, background)
    }
}
