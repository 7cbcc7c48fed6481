//! Window, event loop and GPU side of the presentation.
//!
//! Entrypoint: `render::app::run()`.

pub mod app;

/// Common GPU types used across render submodules.
pub mod gpu;

/// Vertex/uniform layouts and the CPU-side draw batch.
pub mod primitives;

/// Frame timing.
pub mod util;

/// A batched solid-color mesh renderer.
pub mod mesh_renderer;

/// The wgpu-backed `presentation::Renderer`.
pub mod wgpu_renderer;
