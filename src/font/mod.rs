//! Font module root.
//!
//! Text is rendered as **vector glyph outlines**:
//! - Load one named font file (e.g. `font.ttf`) through `fontdb`.
//! - Parse the face with `ttf-parser` for metrics, glyph ids and outlines.
//! - Convert outlines to `lyon::path::Path` and tessellate into triangles (`tessellate`).
//! - Word-wrap and position lines of text (`text`).
//!
//! A missing or unreadable font file is an error at construction time; callers treat it
//! as fatal during startup.

pub mod tessellate;
pub mod text;

use std::path::Path as FsPath;
use std::sync::Arc;

use fontdb::Database;
use log::info;
use lyon::math::point;
use lyon::path::Path;

/// Basic vertical metrics needed for baseline alignment and line spacing.
///
/// Values are in **font units** (units-per-em).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FontVMetrics {
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
    pub line_gap: f32,
}

impl FontVMetrics {
    /// Distance between consecutive baselines, in font units.
    #[inline]
    pub fn line_height(&self) -> f32 {
        self.ascender - self.descender + self.line_gap
    }

    /// Scale factor mapping font units to pixels for a font size in pixels.
    #[inline]
    pub fn font_units_to_px_scale(&self, font_size_px: f32) -> f32 {
        font_size_px / self.units_per_em
    }
}

/// Horizontal metrics for one glyph, in font units.
#[derive(Debug, Copy, Clone, Default)]
pub struct GlyphHMetrics {
    pub advance_width: f32,
}

/// The loaded face: file bytes + face index + vertical metrics.
#[derive(Debug, Clone)]
pub struct ResolvedFace {
    pub family: String,
    pub bytes: Arc<[u8]>,
    pub index: u32,
    pub v_metrics: FontVMetrics,
}

impl ResolvedFace {
    /// Parse the face for glyph access. Cheap; borrow it for the duration of a layout.
    pub fn parse(&self) -> Result<ParsedFace<'_>, FontError> {
        let face =
            ttf_parser::Face::parse(&self.bytes, self.index).map_err(|_| FontError::ParseFailed)?;
        Ok(ParsedFace {
            face,
            v_metrics: self.v_metrics,
        })
    }
}

/// Errors produced by the font subsystem.
#[derive(thiserror::Error, Debug)]
pub enum FontError {
    #[error("failed to read font file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no usable font face in {0}")]
    NoFace(String),

    #[error("failed to parse font face")]
    ParseFailed,

    #[error("glyph outline not found for glyph id {glyph_id}")]
    MissingGlyph { glyph_id: u16 },

    #[error("tessellation failed: {0}")]
    Tessellation(String),

    #[error("invalid layout options: {0}")]
    InvalidOptions(String),
}

/// The one face used for all text.
pub struct FontSystem {
    face: ResolvedFace,
}

impl FontSystem {
    /// Load the font file at `path` and select its first face.
    pub fn from_file(path: impl AsRef<FsPath>) -> Result<Self, FontError> {
        let path = path.as_ref().to_path_buf();

        let mut db = Database::new();
        db.load_font_file(&path)
            .map_err(|source| FontError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;

        let (id, family) = db
            .faces()
            .next()
            .map(|f| {
                let family = f
                    .families
                    .first()
                    .map(|(name, _)| name.clone())
                    .unwrap_or_else(|| f.post_script_name.clone());
                (f.id, family)
            })
            .ok_or_else(|| FontError::NoFace(path.display().to_string()))?;

        let (bytes, index) = db
            .with_face_data(id, |data, index| (Arc::<[u8]>::from(data), index))
            .ok_or_else(|| FontError::NoFace(path.display().to_string()))?;

        let parsed = ttf_parser::Face::parse(&bytes, index).map_err(|_| FontError::ParseFailed)?;
        let v_metrics = v_metrics_of(&parsed);

        info!(
            "font: loaded {:?} from {} ({} face(s), {} units/em)",
            family,
            path.display(),
            db.len(),
            v_metrics.units_per_em
        );

        Ok(Self {
            face: ResolvedFace {
                family,
                bytes,
                index,
                v_metrics,
            },
        })
    }

    #[inline]
    pub fn face(&self) -> &ResolvedFace {
        &self.face
    }
}

fn v_metrics_of(face: &ttf_parser::Face<'_>) -> FontVMetrics {
    // Prefer OS/2 typographic metrics, fall back to hhea.
    FontVMetrics {
        units_per_em: face.units_per_em() as f32,
        ascender: face
            .typographic_ascender()
            .unwrap_or_else(|| face.ascender()) as f32,
        descender: face
            .typographic_descender()
            .unwrap_or_else(|| face.descender()) as f32,
        line_gap: face
            .typographic_line_gap()
            .unwrap_or_else(|| face.line_gap()) as f32,
    }
}

/// A parsed face borrowed from a [`ResolvedFace`].
pub struct ParsedFace<'a> {
    face: ttf_parser::Face<'a>,
    pub v_metrics: FontVMetrics,
}

impl ParsedFace<'_> {
    /// Glyph id for a character; falls back to `.notdef` (glyph 0) when the font lacks it.
    pub fn glyph_id_for_char(&self, ch: char) -> u16 {
        self.face.glyph_index(ch).map(|g| g.0).unwrap_or(0)
    }

    /// Advance width in font units. Missing metrics count as zero width.
    pub fn glyph_h_metrics(&self, glyph_id: u16) -> GlyphHMetrics {
        let adv = self
            .face
            .glyph_hor_advance(ttf_parser::GlyphId(glyph_id))
            .unwrap_or(0);
        GlyphHMetrics {
            advance_width: adv as f32,
        }
    }

    /// Advance width of a character in font units.
    #[inline]
    pub fn char_advance(&self, ch: char) -> f32 {
        self.glyph_h_metrics(self.glyph_id_for_char(ch)).advance_width
    }

    /// Extract a glyph outline as a lyon `Path`, in font units (y up).
    ///
    /// Glyphs without an outline (e.g. space) yield `FontError::MissingGlyph`.
    pub fn glyph_outline_path(&self, glyph_id: u16) -> Result<Path, FontError> {
        let mut builder = LyonOutlineBuilder::new();
        self.face
            .outline_glyph(ttf_parser::GlyphId(glyph_id), &mut builder)
            .ok_or(FontError::MissingGlyph { glyph_id })?;
        Ok(builder.build())
    }
}

/// Convert `ttf-parser` outline callbacks into a `lyon::path::Path`.
///
/// A glyph may contain multiple contours; `move_to` starts a new one.
struct LyonOutlineBuilder {
    builder: lyon::path::Builder,
    contour_open: bool,
}

impl LyonOutlineBuilder {
    fn new() -> Self {
        Self {
            builder: Path::builder(),
            contour_open: false,
        }
    }

    fn build(mut self) -> Path {
        if self.contour_open {
            self.builder.close();
            self.contour_open = false;
        }
        self.builder.build()
    }
}

impl ttf_parser::OutlineBuilder for LyonOutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        if self.contour_open {
            self.builder.close();
        }
        self.builder.begin(point(x, y));
        self.contour_open = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(point(x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quadratic_bezier_to(point(x1, y1), point(x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder
            .cubic_bezier_to(point(x1, y1), point(x2, y2), point(x, y));
    }

    fn close(&mut self) {
        if self.contour_open {
            self.builder.close();
            self.contour_open = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use ttf_parser::OutlineBuilder as _;

    use super::*;

    #[test]
    fn missing_font_file_is_a_read_error() {
        let err = FontSystem::from_file("definitely/not/here/font.ttf")
            .err()
            .expect("loading a missing file must fail");
        assert!(matches!(err, FontError::ReadFailed { .. }));
        assert!(err.to_string().contains("font.ttf"));
    }

    #[test]
    fn outline_builder_closes_every_contour() {
        let mut b = LyonOutlineBuilder::new();
        b.move_to(0.0, 0.0);
        b.line_to(10.0, 0.0);
        b.line_to(10.0, 10.0);
        // Second contour starts without an explicit close.
        b.move_to(20.0, 0.0);
        b.quad_to(25.0, 5.0, 30.0, 0.0);
        b.curve_to(30.0, 5.0, 25.0, 10.0, 20.0, 10.0);
        let path = b.build();

        let ends = path
            .iter()
            .filter(|e| matches!(e, lyon::path::Event::End { close: true, .. }))
            .count();
        assert_eq!(ends, 2);
    }

    #[test]
    fn line_height_includes_gap() {
        let m = FontVMetrics {
            units_per_em: 1000.0,
            ascender: 800.0,
            descender: -200.0,
            line_gap: 90.0,
        };
        assert_eq!(m.line_height(), 1090.0);
    }

    #[test]
    fn px_scale_follows_units_per_em() {
        let m = FontVMetrics {
            units_per_em: 2048.0,
            ascender: 1900.0,
            descender: -500.0,
            line_gap: 0.0,
        };
        assert_eq!(m.font_units_to_px_scale(28.0), 28.0 / 2048.0);
        assert_eq!(m.font_units_to_px_scale(2048.0), 1.0);
    }
}
