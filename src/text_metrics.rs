use crate::params::FontChoice;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::{Face, GlyphId};

static TEXT_ENGINE: Lazy<Mutex<TextEngine>> = Lazy::new(|| Mutex::new(TextEngine::new()));

/// Advance contributed by a glyph that cannot be resolved, as a fraction of
/// the font size. Keeps centering deterministic on hosts without fonts.
const FALLBACK_ADVANCE_EM: f32 = 0.56;

/// Font metrics scaled to a concrete pixel size. `descent` is positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledMetrics {
    pub ascent: f32,
    pub descent: f32,
}

impl ScaledMetrics {
    /// Natural line advance: ascent + descent.
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// One path segment of a glyph outline, in pixels, y-down, relative to the
/// glyph origin on the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    QuadTo(f32, f32, f32, f32),
    CurveTo(f32, f32, f32, f32, f32, f32),
    Close,
}

#[derive(Debug, Clone)]
pub struct GlyphOutline {
    /// Pen offset from the line start, in pixels.
    pub offset_x: f32,
    pub segments: Vec<PathSegment>,
}

/// Advance width of a single line at the given size. Falls back to an
/// estimate when the family (or a glyph) has no face, so the result is
/// always defined.
pub fn measure_line_width(text: &str, font_size: f32, font: &FontChoice) -> f32 {
    if text.is_empty() || font_size <= 0.0 {
        return 0.0;
    }
    let Ok(mut engine) = TEXT_ENGINE.lock() else {
        return estimate_width(text, font_size);
    };
    match engine.face_mut(font) {
        Some(face) => face.measure_width(text, font_size),
        None => estimate_width(text, font_size),
    }
}

/// Ascent/descent of the resolved face at the given size. None when no
/// matching system font exists.
pub fn font_metrics(font: &FontChoice, font_size: f32) -> Option<ScaledMetrics> {
    if font_size <= 0.0 {
        return None;
    }
    let mut engine = TEXT_ENGINE.lock().ok()?;
    let face = engine.face_mut(font)?;
    Some(face.metrics(font_size))
}

/// Scaled glyph outlines for one line of text, ready for path filling. None
/// when no matching system font exists.
pub fn outline_line(text: &str, font_size: f32, font: &FontChoice) -> Option<Vec<GlyphOutline>> {
    if font_size <= 0.0 {
        return None;
    }
    let mut engine = TEXT_ENGINE.lock().ok()?;
    let face = engine.face_mut(font)?;
    Some(face.outline(text, font_size))
}

fn estimate_width(text: &str, font_size: f32) -> f32 {
    let count = text.chars().filter(|c| *c != '\n').count();
    count as f32 * font_size * FALLBACK_ADVANCE_EM
}

/// The five allow-listed families map onto fontdb's generic families; the
/// dialog families have no fontconfig equivalent and borrow the nearest
/// generic. Named families (legacy endpoint) get a sans-serif fallback.
fn families_for(font: &FontChoice) -> Vec<Family<'_>> {
    match font {
        FontChoice::Serif => vec![Family::Serif],
        FontChoice::SansSerif | FontChoice::Dialog => vec![Family::SansSerif],
        FontChoice::Monospace | FontChoice::DialogInput => vec![Family::Monospace],
        FontChoice::Named(name) => vec![Family::Name(name), Family::SansSerif],
    }
}

struct TextEngine {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<LoadedFace>>,
}

impl TextEngine {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn face_mut(&mut self, font: &FontChoice) -> Option<&mut LoadedFace> {
        let key = font.css_name().to_ascii_lowercase();
        if !self.faces.contains_key(&key) {
            let loaded = self.load_face(font);
            self.faces.insert(key.clone(), loaded);
        }
        self.faces.get_mut(&key).and_then(|face| face.as_mut())
    }

    fn load_face(&mut self, font: &FontChoice) -> Option<LoadedFace> {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let families = families_for(font);
        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded: Option<LoadedFace> = None;
        self.db.with_face_data(id, |data, index| {
            loaded = LoadedFace::new(data.to_vec(), index);
        });
        loaded
    }
}

struct LoadedFace {
    _data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    face: Face<'static>,
    glyph_cache: HashMap<char, Option<u16>>,
    advance_cache: HashMap<u16, u16>,
}

impl LoadedFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let parsed = Face::parse(&data, index).ok()?;
        let units_per_em = parsed.units_per_em().max(1);
        let ascender = parsed.ascender();
        let descender = parsed.descender();
        // The face borrows `data`, which lives (and moves) with this struct
        // and is never mutated, so extending the lifetime is sound.
        let face = unsafe { std::mem::transmute::<Face<'_>, Face<'static>>(parsed) };
        Some(Self {
            _data: data,
            units_per_em,
            ascender,
            descender,
            face,
            glyph_cache: HashMap::new(),
            advance_cache: HashMap::new(),
        })
    }

    fn scale(&self, font_size: f32) -> f32 {
        font_size / self.units_per_em as f32
    }

    fn metrics(&self, font_size: f32) -> ScaledMetrics {
        let scale = self.scale(font_size);
        ScaledMetrics {
            ascent: self.ascender as f32 * scale,
            descent: -(self.descender as f32) * scale,
        }
    }

    fn glyph_index(&mut self, ch: char) -> Option<u16> {
        if let Some(cached) = self.glyph_cache.get(&ch) {
            return *cached;
        }
        let glyph = self.face.glyph_index(ch).map(|id| id.0);
        self.glyph_cache.insert(ch, glyph);
        glyph
    }

    fn advance(&mut self, glyph_id: u16) -> u16 {
        if let Some(cached) = self.advance_cache.get(&glyph_id) {
            return *cached;
        }
        let value = self.face.glyph_hor_advance(GlyphId(glyph_id)).unwrap_or(0);
        self.advance_cache.insert(glyph_id, value);
        value
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = self.scale(font_size);
        let fallback = font_size * FALLBACK_ADVANCE_EM;
        let mut width = 0.0f32;

        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = self.glyph_index(ch).map(|id| self.advance(id));
            match advance {
                Some(units) if units > 0 => width += units as f32 * scale,
                _ => width += fallback,
            }
        }
        width.max(0.0)
    }

    fn outline(&mut self, text: &str, font_size: f32) -> Vec<GlyphOutline> {
        let scale = self.scale(font_size);
        let fallback = font_size * FALLBACK_ADVANCE_EM;
        let mut pen = 0.0f32;
        let mut outlines = Vec::new();

        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let Some(glyph_id) = self.glyph_index(ch) else {
                pen += fallback;
                continue;
            };
            let mut sink = SegmentSink {
                scale,
                segments: Vec::new(),
            };
            // Whitespace glyphs have no outline; they still advance the pen.
            self.face.outline_glyph(GlyphId(glyph_id), &mut sink);
            if !sink.segments.is_empty() {
                outlines.push(GlyphOutline {
                    offset_x: pen,
                    segments: sink.segments,
                });
            }
            let units = self.advance(glyph_id);
            if units > 0 {
                pen += units as f32 * scale;
            } else {
                pen += fallback;
            }
        }
        outlines
    }
}

/// Collects ttf-parser outline callbacks as scaled, y-flipped segments.
struct SegmentSink {
    scale: f32,
    segments: Vec<PathSegment>,
}

impl ttf_parser::OutlineBuilder for SegmentSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.segments
            .push(PathSegment::MoveTo(x * self.scale, -y * self.scale));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.segments
            .push(PathSegment::LineTo(x * self.scale, -y * self.scale));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.segments.push(PathSegment::QuadTo(
            x1 * self.scale,
            -y1 * self.scale,
            x * self.scale,
            -y * self.scale,
        ));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.segments.push(PathSegment::CurveTo(
            x1 * self.scale,
            -y1 * self.scale,
            x2 * self.scale,
            -y2 * self.scale,
            x * self.scale,
            -y * self.scale,
        ));
    }

    fn close(&mut self) {
        self.segments.push(PathSegment::Close);
    }
}
