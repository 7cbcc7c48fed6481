//! Frame-delta driven animation models.
//!
//! Two independent models are advanced once per frame with the same `dt`:
//! - [`RotationModel`]: accumulates the spiral's rotation angle.
//! - [`LineSequencer`]: fades script lines in, holds them, fades them out, and moves on.
//!
//! Neither model knows about windows, fonts or the GPU. The renderer only reads their
//! outputs (an angle, a line of text, an opacity).
//!
//! Usage sketch:
//! ```ignore
//! let mut rotation = RotationModel::default();
//! let mut lines = LineSequencer::new(script);
//! // per frame
//! let angle = rotation.advance(dt);
//! lines.advance(dt);
//! draw(angle, lines.current_line(), lines.opacity());
//! ```

pub mod fade;
pub mod rotation;

pub use fade::{FadePhase, FadeState, FadeStep, FadeTiming, LineSequencer};
pub use rotation::RotationModel;
