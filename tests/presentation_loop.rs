//! Drives `Presentation` headlessly with a scripted event source and a recording renderer.

use std::sync::Arc;

use approx::assert_relative_eq;
use glam::Vec2;

use trance::anim::FadePhase;
use trance::presentation::{EventSource, Presentation, PresentationConfig, Renderer, Step};
use trance::scene::{Canvas, Rgba};
use trance::script::Script;

/// Constant frame time; asks to quit on the `quit_on`-th poll (1-based).
struct ScriptedEvents {
    dt: f32,
    quit_on: usize,
    polls: usize,
}

impl ScriptedEvents {
    fn new(dt: f32, quit_on: usize) -> Self {
        Self {
            dt,
            quit_on,
            polls: 0,
        }
    }
}

impl EventSource for ScriptedEvents {
    fn poll_quit_requested(&mut self) -> bool {
        self.polls += 1;
        self.polls >= self.quit_on
    }

    fn elapsed_since_last_frame(&mut self) -> f32 {
        self.dt
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Frame {
    background: Rgba,
    points: usize,
    text: String,
    opacity: f32,
    wrap: f32,
}

#[derive(Default)]
struct RecordingRenderer {
    canvas: Option<Canvas>,
    pending: Option<Frame>,
    frames: Vec<Frame>,
    fail_present: bool,
}

impl RecordingRenderer {
    fn with_canvas(canvas: Canvas) -> Self {
        Self {
            canvas: Some(canvas),
            ..Default::default()
        }
    }
}

impl Renderer for RecordingRenderer {
    fn canvas(&self) -> Canvas {
        self.canvas.unwrap_or(Canvas::new(1024.0, 600.0))
    }

    fn clear(&mut self, background: Rgba) {
        assert!(self.pending.is_none(), "clear called twice before present");
        self.pending = Some(Frame {
            background,
            points: 0,
            text: String::new(),
            opacity: -1.0,
            wrap: 0.0,
        });
    }

    fn draw_spiral_points(&mut self, points: &[Vec2]) {
        let frame = self.pending.as_mut().expect("spiral drawn before clear");
        frame.points = points.len();
    }

    fn draw_text(&mut self, text: &str, opacity: f32, max_wrap_width: f32) {
        let frame = self.pending.as_mut().expect("text drawn before clear");
        frame.text = text.to_string();
        frame.opacity = opacity;
        frame.wrap = max_wrap_width;
    }

    fn present(&mut self) -> anyhow::Result<()> {
        if self.fail_present {
            anyhow::bail!("surface lost for good");
        }
        let frame = self.pending.take().expect("present without clear");
        self.frames.push(frame);
        Ok(())
    }
}

fn session() -> Presentation {
    Presentation::new(Arc::new(Script::session()), PresentationConfig::default())
}

#[test]
fn quit_is_seen_but_the_frame_still_completes() {
    let mut p = session();
    let mut events = ScriptedEvents::new(1.0 / 60.0, 5);
    let mut renderer = RecordingRenderer::default();

    p.run(&mut events, &mut renderer).unwrap();

    assert_eq!(events.polls, 5);
    assert_eq!(renderer.frames.len(), 5);
    assert!(renderer.pending.is_none());
}

#[test]
fn quit_on_first_poll_still_draws_one_frame() {
    let mut p = session();
    let mut events = ScriptedEvents::new(0.016, 1);
    let mut renderer = RecordingRenderer::default();

    let step = p.frame(&mut events, &mut renderer).unwrap();

    assert_eq!(step, Step::Quit);
    assert_eq!(renderer.frames.len(), 1);
}

#[test]
fn every_frame_has_the_reference_look() {
    let mut p = session();
    let mut events = ScriptedEvents::new(0.1, 20);
    let mut renderer = RecordingRenderer::default();
    let config = PresentationConfig::default();

    p.run(&mut events, &mut renderer).unwrap();

    for frame in &renderer.frames {
        assert_eq!(frame.background, config.background);
        assert_eq!(frame.points, 480);
        assert_eq!(frame.wrap, 924.0);
    }
}

#[test]
fn rotation_follows_accumulated_time() {
    let mut p = session();
    let mut events = ScriptedEvents::new(0.1, 30);
    let mut renderer = RecordingRenderer::default();

    p.run(&mut events, &mut renderer).unwrap();

    // 30 frames * 0.1 s * 0.5 rad/s
    assert_relative_eq!(p.rotation().angle(), 1.5, max_relative = 1e-5);
}

#[test]
fn opacity_stays_in_range_over_a_long_run() {
    let mut p = session();
    // Ten simulated minutes at 60 fps.
    let mut events = ScriptedEvents::new(1.0 / 60.0, 36_000);
    let mut renderer = RecordingRenderer::default();

    p.run(&mut events, &mut renderer).unwrap();

    assert_eq!(renderer.frames.len(), 36_000);
    for frame in &renderer.frames {
        assert!(
            (0.0..=255.0).contains(&frame.opacity),
            "opacity {}",
            frame.opacity
        );
    }
}

#[test]
fn lines_are_shown_in_script_order() {
    let mut p = session();
    let mut events = ScriptedEvents::new(0.05, 20_000);
    let mut renderer = RecordingRenderer::default();

    p.run(&mut events, &mut renderer).unwrap();

    let mut shown: Vec<&str> = Vec::new();
    for frame in &renderer.frames {
        if shown.last() != Some(&frame.text.as_str()) {
            shown.push(frame.text.as_str());
        }
    }

    let script = Script::session();
    assert!(shown.len() > 3, "only {} line(s) shown", shown.len());
    for (i, text) in shown.iter().enumerate() {
        assert_eq!(*text, script.line(i));
    }
}

#[test]
fn a_new_line_starts_invisible() {
    let mut p = session();
    let mut events = ScriptedEvents::new(0.05, 2_000);
    let mut renderer = RecordingRenderer::default();

    p.run(&mut events, &mut renderer).unwrap();

    let mut changes = 0;
    for pair in renderer.frames.windows(2) {
        if pair[0].text != pair[1].text {
            changes += 1;
            // The old line was still fading out on the previous frame.
            assert!(pair[0].opacity > 0.0);
            // The frame that switched lines reports the fresh line at zero opacity.
            assert_eq!(pair[1].opacity, 0.0);
        }
    }
    assert!(changes >= 1);
}

#[test]
fn first_frame_is_fading_in() {
    let mut p = session();
    let mut events = ScriptedEvents::new(1.0, 1);
    let mut renderer = RecordingRenderer::default();

    p.run(&mut events, &mut renderer).unwrap();

    assert_eq!(p.lines().phase(), FadePhase::FadingIn);
    assert_eq!(p.lines().current_index(), 0);
    assert_relative_eq!(renderer.frames[0].opacity, 80.0);
}

#[test]
fn present_errors_end_the_loop() {
    let mut p = session();
    let mut events = ScriptedEvents::new(0.016, 100);
    let mut renderer = RecordingRenderer {
        fail_present: true,
        ..Default::default()
    };

    let err = p.run(&mut events, &mut renderer).unwrap_err();

    assert!(err.to_string().contains("surface lost"));
    assert_eq!(events.polls, 1);
}

#[test]
fn empty_canvas_draws_no_points() {
    let mut p = session();
    let mut events = ScriptedEvents::new(0.016, 3);
    let mut renderer = RecordingRenderer::with_canvas(Canvas::new(0.0, 0.0));

    p.run(&mut events, &mut renderer).unwrap();

    assert_eq!(renderer.frames.len(), 3);
    assert!(renderer.frames.iter().all(|f| f.points == 0));
    assert!(renderer.frames.iter().all(|f| f.wrap == 1.0));
}
