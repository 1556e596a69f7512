use crate::config::DefaultsConfig;
use crate::error::RenderResult;
use crate::params::{self, FontChoice, RawParams, RenderRequest};
use crate::parser;
use crate::raster;
use crate::svg;

/// Encoded image body plus the content type to serve it under.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Rich pipeline: full dimension grammar, table-driven format resolution,
/// renderer dispatch on the resolved format. Errors are returned to the
/// caller, which converts them into the diagnostic fallback image.
pub fn rich(raw: &RawParams<'_>, defaults: &DefaultsConfig) -> RenderResult<Rendered> {
    let (request, format) = params::resolve_request(raw, defaults)?;
    let bytes = match format.image_format() {
        Some(codec) => raster::render_raster(&request, codec)?,
        None => svg::render_svg(&request).into_bytes(),
    };
    Ok(Rendered {
        bytes,
        content_type: format.content_type().to_string(),
    })
}

/// Legacy pipeline: simple dimension grammar, raster only, any font name,
/// any format label the codec set can satisfy. Dimension errors are the
/// caller's to surface directly.
pub fn simple(raw: &RawParams<'_>, defaults: &DefaultsConfig) -> RenderResult<Rendered> {
    let spec = parser::parse_simple_dimensions(raw.dimensions)?;
    let font = match raw.font {
        Some(name) if !name.is_empty() => FontChoice::Named(name.to_string()),
        _ => FontChoice::Named(defaults.v1_font.clone()),
    };
    let request = RenderRequest {
        spec,
        bg_color: params::resolve_color(raw.bg_color, &defaults.bg_color),
        text_color: params::resolve_color(raw.text_color, &defaults.text_color),
        text: params::resolve_text(raw.text, &spec.size_label()),
        font,
    };

    let label = raw.format.unwrap_or("png");
    let bytes = raster::render_raster_labeled(&request, label)?;
    Ok(Rendered {
        bytes,
        content_type: format!("image/{}", label.to_ascii_lowercase()),
    })
}
