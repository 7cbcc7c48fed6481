//! Fade-in / hold / fade-out envelope for script lines.
//!
//! The envelope is a three-phase state machine driven only by frame deltas:
//! - `FadingIn`: opacity rises at `fade_rate` units/s until it reaches `max_opacity`.
//! - `Holding`: opacity stays at `max_opacity` until `hold_s` has strictly elapsed.
//! - `FadingOut`: opacity falls at `fade_rate` units/s until it reaches 0, at which
//!   point the line is finished and the next one starts fading in.
//!
//! `FadeState::step` is the pure transition function. `LineSequencer` wraps it with
//! a script and the current line index.
//!
//! Exactly one threshold check is performed per step. A very large `dt` can push
//! opacity far past a threshold, but it is clamped before the step returns, so callers
//! never observe a value outside `[0, max_opacity]`.

use std::sync::Arc;

use log::debug;

use crate::script::Script;

/// Opacity units gained or lost per second while fading.
pub const FADE_RATE: f32 = 80.0;

/// Seconds a line stays fully visible.
pub const HOLD_SECONDS: f32 = 4.0;

/// Fully visible (an 8-bit alpha value).
pub const MAX_OPACITY: f32 = 255.0;

/// Timing constants for the envelope.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FadeTiming {
    /// Opacity units per second.
    pub fade_rate: f32,
    /// Hold duration in seconds (compared with `>`).
    pub hold_s: f32,
    /// Opacity ceiling.
    pub max_opacity: f32,
}

impl Default for FadeTiming {
    fn default() -> Self {
        Self {
            fade_rate: FADE_RATE,
            hold_s: HOLD_SECONDS,
            max_opacity: MAX_OPACITY,
        }
    }
}

/// Which part of the envelope is active.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum FadePhase {
    #[default]
    FadingIn,
    Holding,
    FadingOut,
}

/// Envelope state: phase + opacity + time spent holding.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct FadeState {
    pub phase: FadePhase,
    /// In `[0, timing.max_opacity]` after every step.
    pub opacity: f32,
    /// Seconds accumulated while `Holding`. Reset when entering `Holding`.
    pub hold_timer: f32,
}

/// Result of one transition.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FadeStep {
    pub state: FadeState,
    /// True when this step completed a fade-out (the caller should move to the next line).
    pub line_finished: bool,
}

impl FadeState {
    /// The initial state: invisible, starting to fade in.
    pub const START: Self = Self {
        phase: FadePhase::FadingIn,
        opacity: 0.0,
        hold_timer: 0.0,
    };

    /// Advance the envelope by `dt` seconds.
    ///
    /// Non-finite or negative `dt` is treated as 0.
    pub fn step(self, dt: f32, timing: &FadeTiming) -> FadeStep {
        let dt = sanitize_dt(dt);
        let mut next = self;
        let mut line_finished = false;

        match self.phase {
            FadePhase::FadingIn => {
                next.opacity += timing.fade_rate * dt;
                if next.opacity >= timing.max_opacity {
                    next.opacity = timing.max_opacity;
                    next.hold_timer = 0.0;
                    next.phase = FadePhase::Holding;
                }
            }
            FadePhase::Holding => {
                next.hold_timer += dt;
                if next.hold_timer > timing.hold_s {
                    next.phase = FadePhase::FadingOut;
                }
            }
            FadePhase::FadingOut => {
                next.opacity -= timing.fade_rate * dt;
                if next.opacity <= 0.0 {
                    next.opacity = 0.0;
                    next.phase = FadePhase::FadingIn;
                    line_finished = true;
                }
            }
        }

        // Keep the range invariant even if the state was constructed by hand.
        next.opacity = next.opacity.clamp(0.0, timing.max_opacity);

        FadeStep {
            state: next,
            line_finished,
        }
    }
}

#[inline]
fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.max(0.0) } else { 0.0 }
}

/// Steps through a script forever, one faded line at a time.
#[derive(Debug, Clone)]
pub struct LineSequencer {
    script: Arc<Script>,
    index: usize,
    state: FadeState,
    timing: FadeTiming,
}

impl LineSequencer {
    pub fn new(script: Arc<Script>) -> Self {
        Self::with_timing(script, FadeTiming::default())
    }

    pub fn with_timing(script: Arc<Script>, timing: FadeTiming) -> Self {
        Self {
            script,
            index: 0,
            state: FadeState::START,
            timing,
        }
    }

    /// Start from an explicit envelope state (useful for resuming mid-line).
    pub fn with_state(mut self, state: FadeState) -> Self {
        self.state = state;
        self
    }

    /// Advance by one frame.
    pub fn advance(&mut self, dt: f32) {
        let step = self.state.step(dt, &self.timing);
        self.state = step.state;

        if step.line_finished {
            self.index = (self.index + 1) % self.script.len();
            debug!(
                "script: line {}/{} fading in",
                self.index + 1,
                self.script.len()
            );
        }
    }

    #[inline]
    pub fn current_line(&self) -> &str {
        self.script.line(self.index)
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.state.opacity
    }

    #[inline]
    pub fn phase(&self) -> FadePhase {
        self.state.phase
    }

    #[inline]
    pub fn state(&self) -> FadeState {
        self.state
    }

}
