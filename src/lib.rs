//! `trance` library crate root.
//!
//! A rotating Archimedean spiral with a slowly fading, cycling line of text underneath.
//!
//! The animation models (`anim`), the spiral geometry (`scene`) and the presentation loop
//! (`presentation`) know nothing about windows or GPUs; `render` plugs winit + wgpu in
//! behind the `Renderer` / `EventSource` traits.

pub mod anim;
pub mod font;
pub mod presentation;
pub mod render;
pub mod scene;
pub mod script;

/// Open the window and run the presentation until the user quits.
///
/// Note: This function does **not** initialize logging; callers decide their own setup.
pub fn run_app() -> anyhow::Result<()> {
    render::app::run()
}
