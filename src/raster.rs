use crate::error::{RenderError, RenderResult};
use crate::layout::{centered_x, raster_font_size, raster_layout, split_lines};
use crate::params::RenderRequest;
use crate::text_metrics::{self, GlyphOutline, PathSegment};
use std::io::Cursor;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

/// Renders the request to encoded raster bytes in the given codec format.
/// The canvas lives only inside this call; both the success and error paths
/// release it on return.
pub fn render_raster(
    request: &RenderRequest,
    format: image::ImageFormat,
) -> RenderResult<Vec<u8>> {
    let width = request.spec.pixel_width();
    let height = request.spec.pixel_height();
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        RenderError::encoding(format!("cannot allocate {width}x{height} canvas"))
    })?;

    pixmap.fill(parse_hex_color(&request.bg_color)?);
    draw_label(&mut pixmap, request)?;
    encode_pixmap(&pixmap, format)
}

/// Legacy entry point: the format is an arbitrary label resolved against
/// whatever the codec set can satisfy.
pub fn render_raster_labeled(request: &RenderRequest, label: &str) -> RenderResult<Vec<u8>> {
    let format = image::ImageFormat::from_extension(label.to_ascii_lowercase())
        .ok_or_else(|| RenderError::encoding(format!("no codec for format label {label:?}")))?;
    render_raster(request, format)
}

/// Lax hex semantics: the literal is parsed as one integer and masked to 24
/// bits, so `fff` means 0x000FFF rather than white. Literals that overflow a
/// 32-bit parse are a render-time error.
fn parse_hex_color(hex: &str) -> RenderResult<tiny_skia::Color> {
    let value = u32::from_str_radix(hex, 16)
        .map_err(|_| RenderError::encoding(format!("invalid color literal {hex:?}")))?;
    let value = value & 0x00FF_FFFF;
    let r = (value >> 16) as u8;
    let g = (value >> 8) as u8;
    let b = value as u8;
    Ok(tiny_skia::Color::from_rgba8(r, g, b, 255))
}

fn draw_label(pixmap: &mut Pixmap, request: &RenderRequest) -> RenderResult<()> {
    let spec = &request.spec;
    let font_size = raster_font_size(spec);
    let Some(metrics) = text_metrics::font_metrics(&request.font, font_size) else {
        log::warn!(
            "no system font face for {:?}; emitting background-only canvas",
            request.font.css_name()
        );
        return Ok(());
    };

    let lines = split_lines(&request.text);
    let placement = raster_layout(spec, lines.len(), &metrics);
    let mut paint = Paint::default();
    paint.set_color(parse_hex_color(&request.text_color)?);
    paint.anti_alias = true;

    let canvas_width = spec.pixel_width() as f32;
    for (line, baseline) in lines.iter().zip(&placement.baselines) {
        let line_width = text_metrics::measure_line_width(line, font_size, &request.font);
        let x = centered_x(canvas_width, line_width);
        let Some(glyphs) = text_metrics::outline_line(line, font_size, &request.font) else {
            continue;
        };
        let Some(path) = line_path(&glyphs, x, *baseline) else {
            continue;
        };
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
    Ok(())
}

/// One filled path per line; glyph segments arrive y-down and
/// baseline-relative, so they only need translating into place.
fn line_path(glyphs: &[GlyphOutline], origin_x: f32, baseline_y: f32) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for glyph in glyphs {
        let dx = origin_x + glyph.offset_x;
        for segment in &glyph.segments {
            match *segment {
                PathSegment::MoveTo(x, y) => builder.move_to(dx + x, baseline_y + y),
                PathSegment::LineTo(x, y) => builder.line_to(dx + x, baseline_y + y),
                PathSegment::QuadTo(x1, y1, x, y) => {
                    builder.quad_to(dx + x1, baseline_y + y1, dx + x, baseline_y + y)
                }
                PathSegment::CurveTo(x1, y1, x2, y2, x, y) => builder.cubic_to(
                    dx + x1,
                    baseline_y + y1,
                    dx + x2,
                    baseline_y + y2,
                    dx + x,
                    baseline_y + y,
                ),
                PathSegment::Close => builder.close(),
            }
        }
    }
    builder.finish()
}

fn encode_pixmap(pixmap: &Pixmap, format: image::ImageFormat) -> RenderResult<Vec<u8>> {
    let width = pixmap.width();
    let height = pixmap.height();
    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| RenderError::encoding("pixel buffer size mismatch"))?;
    // The jpeg codec rejects alpha channels.
    let dynamic = if format == image::ImageFormat::Jpeg {
        image::DynamicImage::ImageRgb8(image::DynamicImage::ImageRgba8(img).to_rgb8())
    } else {
        image::DynamicImage::ImageRgba8(img)
    };

    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, format)
        .map_err(|err| RenderError::encoding(format!("{format:?} encode failed: {err}")))?;
    Ok(cursor.into_inner())
}
