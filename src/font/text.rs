//! Wrapped text layout.
//!
//! Turns one string into a block of line meshes in pixel space:
//! - Greedy word wrap against a maximum width (advance-based measurement).
//! - Explicit `\n` forces a break.
//! - A single word wider than the limit gets a line of its own (it is not split).
//! - Lines are left-aligned inside the block; the block itself is positioned by the
//!   caller (see [`bottom_centered_origin`]).
//!
//! Mesh coordinates are relative to the block's top-left corner, +y down.
//! No shaping or kerning: one char is one glyph, the pen advances by the glyph's
//! advance width plus `letter_spacing_px`.

use crate::font::tessellate::{Affine2x3, TessellateOptions, append_mesh, tessellate_path_to_mesh};
use crate::font::{FontError, ParsedFace};
use crate::scene::{Canvas, Mesh2D};

/// Layout options for [`layout_wrapped_text`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayoutOptions {
    /// Font size in pixels (em size).
    pub font_size_px: f32,
    /// Lines are wrapped to fit within this width.
    pub max_width_px: f32,
    /// Extra spacing after each glyph.
    pub letter_spacing_px: f32,
    /// Curve tolerance in pixels.
    pub tolerance_px: f32,
}

impl Default for TextLayoutOptions {
    fn default() -> Self {
        Self {
            font_size_px: 28.0,
            max_width_px: 924.0,
            letter_spacing_px: 0.0,
            tolerance_px: 0.1,
        }
    }
}

/// One wrapped line before tessellation.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    pub width_px: f32,
}

/// Greedy word wrap.
///
/// `measure` returns the advance width of a string in pixels.
pub fn wrap_words<F>(text: &str, max_width_px: f32, mut measure: F) -> Vec<WrappedLine>
where
    F: FnMut(&str) -> f32,
{
    let space_w = measure(" ");
    let mut out = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_w = 0.0f32;

        for word in paragraph.split_whitespace() {
            let word_w = measure(word);

            if line.is_empty() {
                line.push_str(word);
                line_w = word_w;
                continue;
            }

            let candidate_w = line_w + space_w + word_w;
            if candidate_w <= max_width_px {
                line.push(' ');
                line.push_str(word);
                line_w = candidate_w;
            } else {
                out.push(WrappedLine {
                    text: std::mem::take(&mut line),
                    width_px: line_w,
                });
                line.push_str(word);
                line_w = word_w;
            }
        }

        if !line.is_empty() {
            out.push(WrappedLine {
                text: line,
                width_px: line_w,
            });
        }
    }

    out
}

/// A laid-out block of text.
#[derive(Debug, Clone, Default)]
pub struct TextBlock {
    /// One mesh per wrapped line, in block-local pixels.
    pub lines: Vec<Mesh2D>,
    /// Widest line.
    pub width_px: f32,
    /// `line_count * line_height_px`.
    pub height_px: f32,
    pub line_height_px: f32,
}

impl TextBlock {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(Mesh2D::is_empty)
    }
}

/// Lay out `text` into a wrapped block of glyph meshes.
pub fn layout_wrapped_text(
    face: &ParsedFace<'_>,
    text: &str,
    opts: &TextLayoutOptions,
) -> Result<TextBlock, FontError> {
    if opts.font_size_px.is_nan() || opts.font_size_px <= 0.0 {
        return Err(FontError::InvalidOptions(
            "font_size_px must be > 0".to_string(),
        ));
    }

    let scale = face.v_metrics.font_units_to_px_scale(opts.font_size_px);
    let measure = |s: &str| -> f32 {
        s.chars()
            .map(|ch| face.char_advance(ch) * scale + opts.letter_spacing_px)
            .sum()
    };

    let wrapped = wrap_words(text, opts.max_width_px, measure);

    let tess_opts = TessellateOptions {
        tolerance: opts.tolerance_px.max(0.01),
        ..Default::default()
    };
    let line_height_px = face.v_metrics.line_height() * scale;
    let ascent_px = face.v_metrics.ascender * scale;

    let mut block = TextBlock {
        lines: Vec::with_capacity(wrapped.len()),
        width_px: 0.0,
        height_px: line_height_px * wrapped.len() as f32,
        line_height_px,
    };

    for (i, line) in wrapped.iter().enumerate() {
        let baseline_y = ascent_px + i as f32 * line_height_px;
        let mut mesh = Mesh2D::default();
        let mut pen_x = 0.0f32;

        for ch in line.text.chars() {
            let glyph_id = face.glyph_id_for_char(ch);
            let adv_px = face.glyph_h_metrics(glyph_id).advance_width * scale;

            match face.glyph_outline_path(glyph_id) {
                Ok(outline) => {
                    let xf = Affine2x3::font_to_pixels(scale, pen_x, baseline_y);
                    let glyph_mesh = tessellate_path_to_mesh(&outline, xf, tess_opts)?;
                    append_mesh(&mut mesh, &glyph_mesh);
                }
                // Whitespace has no outline; still advance.
                Err(FontError::MissingGlyph { .. }) => {}
                Err(e) => return Err(e),
            }

            pen_x += adv_px + opts.letter_spacing_px;
        }

        block.width_px = block.width_px.max(line.width_px);
        block.lines.push(mesh);
    }

    Ok(block)
}

/// Top-left corner for a block of `block_width` pixels, centered horizontally and
/// starting `offset_from_bottom` pixels above the canvas bottom edge.
#[inline]
pub fn bottom_centered_origin(
    block_width: f32,
    canvas: Canvas,
    offset_from_bottom: f32,
) -> [f32; 2] {
    [
        (canvas.width - block_width) * 0.5,
        canvas.height - offset_from_bottom,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Monospace measure: 10 px per char.
    fn mono(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    fn texts(lines: &[WrappedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_words("Six... halfway there now.", 1000.0, mono);
        assert_eq!(texts(&lines), vec!["Six... halfway there now."]);
        assert_eq!(lines[0].width_px, 250.0);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        // "aaa bbb" is 70 px, adding " ccc" would make 110 px.
        let lines = wrap_words("aaa bbb ccc dd", 100.0, mono);
        assert_eq!(texts(&lines), vec!["aaa bbb", "ccc dd"]);
        assert_eq!(lines[0].width_px, 70.0);
        assert_eq!(lines[1].width_px, 60.0);
    }

    #[test]
    fn exact_fit_does_not_wrap() {
        let lines = wrap_words("aaaa bbbbb", 100.0, mono);
        assert_eq!(texts(&lines), vec!["aaaa bbbbb"]);
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let lines = wrap_words("a bbbbbbbbbbbbbbb c", 50.0, mono);
        assert_eq!(texts(&lines), vec!["a", "bbbbbbbbbbbbbbb", "c"]);
        assert_eq!(lines[1].width_px, 150.0);
    }

    #[test]
    fn collapses_runs_of_whitespace() {
        let lines = wrap_words("  one   two\tthree  ", 1000.0, mono);
        assert_eq!(texts(&lines), vec!["one two three"]);
    }

    #[test]
    fn newline_forces_a_break() {
        let lines = wrap_words("first\nsecond", 1000.0, mono);
        assert_eq!(texts(&lines), vec!["first", "second"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_words("", 100.0, mono).is_empty());
        assert!(wrap_words("   ", 100.0, mono).is_empty());
    }

    #[test]
    fn every_wrapped_line_fits_unless_it_is_one_word() {
        let text = "I will count from one to five. At the count of five, you will be fully awake, feeling calm, refreshed, and alert.";
        for max in [80.0, 150.0, 300.0, 924.0] {
            for line in wrap_words(text, max, mono) {
                assert!(
                    line.width_px <= max || !line.text.contains(' '),
                    "{:?} is {} px wide (max {max})",
                    line.text,
                    line.width_px
                );
            }
        }
    }

    #[test]
    fn block_is_centered_near_the_bottom() {
        let canvas = Canvas::new(1024.0, 600.0);
        assert_eq!(bottom_centered_origin(824.0, canvas, 120.0), [100.0, 480.0]);
        assert_eq!(bottom_centered_origin(1024.0, canvas, 120.0), [0.0, 480.0]);
    }
}
