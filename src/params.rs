use crate::config::DefaultsConfig;
use crate::error::{RenderError, RenderResult};
use crate::parser::{ImageSpec, parse_dimensions};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// System font allow-list. `dialog` and `dialoginput` are legacy logical
/// family names kept for compatibility.
pub const SUPPORTED_FONTS: [&str; 5] =
    ["serif", "sans-serif", "monospace", "dialog", "dialoginput"];

static SUPPORTED_FORMATS: Lazy<HashMap<&'static str, OutputFormat>> = Lazy::new(|| {
    HashMap::from([
        ("png", OutputFormat::Png),
        ("jpg", OutputFormat::Jpeg),
        ("jpeg", OutputFormat::Jpeg),
        ("gif", OutputFormat::Gif),
        ("webp", OutputFormat::Webp),
        ("svg", OutputFormat::Svg),
    ])
});

static CSS_COLORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("black", "000000"),
        ("white", "FFFFFF"),
        ("red", "FF0000"),
        ("green", "008000"),
        ("blue", "0000FF"),
        ("yellow", "FFFF00"),
        ("purple", "800080"),
        ("gray", "808080"),
        ("orange", "FFA500"),
        ("pink", "FFC0CB"),
    ])
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Svg,
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Svg => "image/svg+xml",
        }
    }

    pub fn is_raster(&self) -> bool {
        !matches!(self, Self::Svg)
    }

    /// Codec identifier for raster encoding; `jpg` shares the jpeg codec.
    pub fn image_format(&self) -> Option<image::ImageFormat> {
        match self {
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Gif => Some(image::ImageFormat::Gif),
            Self::Webp => Some(image::ImageFormat::WebP),
            Self::Svg => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontChoice {
    Serif,
    SansSerif,
    Monospace,
    Dialog,
    DialogInput,
    /// Arbitrary family name, accepted only by the legacy endpoint.
    Named(String),
}

impl FontChoice {
    /// Family name as emitted into SVG `font-family`.
    pub fn css_name(&self) -> &str {
        match self {
            Self::Serif => "serif",
            Self::SansSerif => "sans-serif",
            Self::Monospace => "monospace",
            Self::Dialog => "dialog",
            Self::DialogInput => "dialoginput",
            Self::Named(name) => name,
        }
    }
}

/// Canonical rendering specification: everything both renderers need except
/// the output format, which picks the renderer itself.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub spec: ImageSpec,
    pub bg_color: String,
    pub text_color: String,
    pub text: String,
    pub font: FontChoice,
}

/// Raw string parameters as extracted by the routing layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawParams<'a> {
    pub dimensions: &'a str,
    pub bg_color: Option<&'a str>,
    pub text_color: Option<&'a str>,
    pub text: Option<&'a str>,
    pub font: Option<&'a str>,
    pub format: Option<&'a str>,
}

/// Resolves a color token to a bare hex string. CSS names win; otherwise all
/// non-hex characters are stripped and the remainder is used as-is (length is
/// deliberately not re-validated); an empty result falls back to the default.
pub fn resolve_color(input: Option<&str>, default: &str) -> String {
    let Some(raw) = input else {
        return default.to_string();
    };
    if let Some(hex) = CSS_COLORS.get(raw.to_ascii_lowercase().as_str()) {
        return (*hex).to_string();
    }
    let cleaned: String = raw.chars().filter(char::is_ascii_hexdigit).collect();
    if cleaned.is_empty() {
        default.to_string()
    } else {
        cleaned
    }
}

/// Resolves a font token against the allow-list; anything else falls back to
/// sans-serif. Never fails.
pub fn resolve_font(input: &str) -> FontChoice {
    match input.to_ascii_lowercase().as_str() {
        "serif" => FontChoice::Serif,
        "sans-serif" => FontChoice::SansSerif,
        "monospace" => FontChoice::Monospace,
        "dialog" => FontChoice::Dialog,
        "dialoginput" => FontChoice::DialogInput,
        _ => FontChoice::SansSerif,
    }
}

pub fn resolve_format(input: &str) -> RenderResult<OutputFormat> {
    SUPPORTED_FORMATS
        .get(input.to_ascii_lowercase().as_str())
        .copied()
        .ok_or_else(|| RenderError::UnsupportedFormat(input.to_string()))
}

/// Decodes the text placeholders (`+` and `%20` to space, `\n` marker to a
/// real newline); absent or empty input yields the default.
pub fn resolve_text(input: Option<&str>, default: &str) -> String {
    match input {
        Some(text) if !text.is_empty() => text
            .replace('+', " ")
            .replace("\\n", "\n")
            .replace("%20", " "),
        _ => default.to_string(),
    }
}

/// Full validation pass for the rich endpoint: raw strings in, canonical
/// request plus output format out.
pub fn resolve_request(
    raw: &RawParams<'_>,
    defaults: &DefaultsConfig,
) -> RenderResult<(RenderRequest, OutputFormat)> {
    let spec = parse_dimensions(raw.dimensions)?;
    let format = resolve_format(raw.format.unwrap_or("png"))?;
    let bg_color = resolve_color(raw.bg_color, &defaults.bg_color);
    let text_color = resolve_color(raw.text_color, &defaults.text_color);
    let font = resolve_font(raw.font.unwrap_or(&defaults.v2_font));
    let text = resolve_text(raw.text, &spec.size_label());

    Ok((
        RenderRequest {
            spec,
            bg_color,
            text_color,
            text,
            font,
        },
        format,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultsConfig;

    #[test]
    fn css_names_resolve_case_insensitively() {
        assert_eq!(resolve_color(Some("red"), "dddddd"), "FF0000");
        assert_eq!(resolve_color(Some("RED"), "dddddd"), "FF0000");
        assert_eq!(resolve_color(Some("Pink"), "dddddd"), "FFC0CB");
    }

    #[test]
    fn hex_tokens_are_stripped_not_length_checked() {
        assert_eq!(resolve_color(Some("#ff0000"), "dddddd"), "ff0000");
        assert_eq!(resolve_color(Some("a1b2c3"), "dddddd"), "a1b2c3");
        // Laxness preserved: short and long results pass through untouched.
        assert_eq!(resolve_color(Some("fff"), "dddddd"), "fff");
        assert_eq!(resolve_color(Some("#ff00ff00"), "dddddd"), "ff00ff00");
    }

    #[test]
    fn unresolvable_colors_fall_back_to_default() {
        assert_eq!(resolve_color(Some("zz"), "dddddd"), "dddddd");
        assert_eq!(resolve_color(Some(""), "999999"), "999999");
        assert_eq!(resolve_color(None, "999999"), "999999");
    }

    #[test]
    fn fonts_fall_back_to_sans_serif() {
        assert_eq!(resolve_font("monospace"), FontChoice::Monospace);
        assert_eq!(resolve_font("SERIF"), FontChoice::Serif);
        assert_eq!(resolve_font("dialoginput"), FontChoice::DialogInput);
        assert_eq!(resolve_font("comic sans"), FontChoice::SansSerif);
        assert_eq!(resolve_font(""), FontChoice::SansSerif);
    }

    #[test]
    fn formats_map_to_content_types() {
        assert_eq!(resolve_format("png").unwrap().content_type(), "image/png");
        assert_eq!(resolve_format("jpg").unwrap(), OutputFormat::Jpeg);
        assert_eq!(resolve_format("JPEG").unwrap(), OutputFormat::Jpeg);
        assert_eq!(
            resolve_format("svg").unwrap().content_type(),
            "image/svg+xml"
        );
        assert!(matches!(
            resolve_format("bmp"),
            Err(RenderError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn text_placeholders_decode() {
        assert_eq!(resolve_text(Some("a+b\\nc%20d"), "x"), "a b\nc d");
        assert_eq!(resolve_text(Some("Hello\\nWorld"), "x"), "Hello\nWorld");
        assert_eq!(resolve_text(None, "300x150"), "300x150");
        assert_eq!(resolve_text(Some(""), "300x150"), "300x150");
    }

    #[test]
    fn resolve_request_produces_canonical_spec() {
        let defaults = DefaultsConfig::default();
        let raw = RawParams {
            dimensions: "600x400@2x",
            bg_color: Some("blue"),
            text_color: None,
            text: Some("Hi+there"),
            font: Some("monospace"),
            format: Some("svg"),
        };
        let (request, format) = resolve_request(&raw, &defaults).unwrap();
        assert_eq!(request.spec.pixel_width(), 1200);
        assert_eq!(request.bg_color, "0000FF");
        assert_eq!(request.text_color, "999999");
        assert_eq!(request.text, "Hi there");
        assert_eq!(request.font, FontChoice::Monospace);
        assert_eq!(format, OutputFormat::Svg);
    }

    #[test]
    fn resolve_request_defaults_text_to_size_label() {
        let defaults = DefaultsConfig::default();
        let raw = RawParams {
            dimensions: "300x150",
            ..RawParams::default()
        };
        let (request, format) = resolve_request(&raw, &defaults).unwrap();
        assert_eq!(request.text, "300x150");
        assert_eq!(format, OutputFormat::Png);
    }
}
