//! Thin binary wrapper around the library runner.
//!
//! Run:
//! - `cargo run` (expects `font.ttf` in the working directory)
//! - `RUST_LOG=debug cargo run` to follow line changes

fn main() -> anyhow::Result<()> {
    // Keep logging setup in the binary so the library remains unopinionated.
    env_logger::init();

    trance::run_app()
}
