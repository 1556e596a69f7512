use crate::parser::ImageSpec;
use crate::text_metrics::ScaledMetrics;

/// Font size policy shared by both renderers: a fifth of the canvas height,
/// capped at 100.
pub fn base_font_size(height: u32) -> f32 {
    (height as f32 / 5.0).min(100.0)
}

/// Raster text is drawn on the scaled canvas, so the font scales with it.
pub fn raster_font_size(spec: &ImageSpec) -> f32 {
    base_font_size(spec.height) * spec.retina_scale as f32
}

/// Splits label text into lines. A trailing newline does not produce an
/// extra empty line; empty text still yields one line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() { vec![""] } else { lines }
}

/// Per-line vertical anchors for the SVG renderer. Lines are anchored at
/// their middle (`dominant-baseline: middle`), so a single line sits exactly
/// at half the canvas height.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorLayout {
    pub font_size: f32,
    pub line_height: f32,
    pub anchors: Vec<f32>,
}

pub fn vector_layout(spec: &ImageSpec, line_count: usize) -> VectorLayout {
    let font_size = base_font_size(spec.height);
    let line_height = font_size * 1.2;
    let start =
        (spec.height as f32 - line_height * line_count.saturating_sub(1) as f32) / 2.0;
    let anchors = (0..line_count.max(1))
        .map(|i| start + i as f32 * line_height)
        .collect();
    VectorLayout {
        font_size,
        line_height,
        anchors,
    }
}

/// Per-line baselines for the raster renderer, derived from the face's
/// natural line metric (ascent + descent) on the scaled canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayout {
    pub font_size: f32,
    pub line_height: f32,
    pub baselines: Vec<f32>,
}

pub fn raster_layout(spec: &ImageSpec, line_count: usize, metrics: &ScaledMetrics) -> RasterLayout {
    let font_size = raster_font_size(spec);
    let line_height = metrics.line_height();
    let canvas_height = spec.pixel_height() as f32;
    let start = (canvas_height - line_height * line_count.max(1) as f32) / 2.0 + metrics.ascent;
    let baselines = (0..line_count.max(1))
        .map(|i| start + i as f32 * line_height)
        .collect();
    RasterLayout {
        font_size,
        line_height,
        baselines,
    }
}

/// Each line is centered independently; lines of different widths do not
/// share a left edge.
pub fn centered_x(canvas_width: f32, line_width: f32) -> f32 {
    (canvas_width - line_width) / 2.0
}
