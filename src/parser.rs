use crate::error::{RenderError, RenderResult};
use once_cell::sync::Lazy;
use regex::Regex;

pub const MIN_DIMENSION: u32 = 10;
pub const MAX_DIMENSION: u32 = 4000;

static DIMENSIONS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:x(\d+))?(?:@(\d)x)?$").unwrap());

/// Canonical canvas description produced by dimension parsing. Immutable;
/// built fresh per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSpec {
    pub width: u32,
    pub height: u32,
    pub retina_scale: u32,
}

impl ImageSpec {
    /// Physical raster width (`width * retina_scale`). Vector output ignores
    /// the scale.
    pub fn pixel_width(&self) -> u32 {
        self.width * self.retina_scale
    }

    pub fn pixel_height(&self) -> u32 {
        self.height * self.retina_scale
    }

    /// The `"{width}x{height}"` label used as default text.
    pub fn size_label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Parses the rich grammar `DIGITS ('x' DIGITS)? ('@' DIGIT 'x')?`, e.g.
/// `300`, `300x150`, `640x480@2x`. Height defaults to width, retina scale
/// defaults to 1 and must be 1, 2 or 3.
pub fn parse_dimensions(token: &str) -> RenderResult<ImageSpec> {
    let captures = DIMENSIONS_RE
        .captures(token)
        .ok_or_else(|| RenderError::InvalidDimensionFormat(token.to_string()))?;

    let width = parse_component(&captures[1]);
    let height = captures
        .get(2)
        .map(|m| parse_component(m.as_str()))
        .unwrap_or(width);
    let retina_scale = captures
        .get(3)
        .map(|m| parse_component(m.as_str()))
        .unwrap_or(1);

    if !(1..=3).contains(&retina_scale) {
        return Err(RenderError::InvalidDimensionFormat(token.to_string()));
    }

    check_bounds(width, height)?;
    Ok(ImageSpec {
        width: width as u32,
        height: height as u32,
        retina_scale: retina_scale as u32,
    })
}

/// Parses the simple grammar `DIGITS ('x' DIGITS)?` used by the legacy
/// endpoint. No retina suffix.
pub fn parse_simple_dimensions(token: &str) -> RenderResult<ImageSpec> {
    let mut parts = token.splitn(2, 'x');
    let width_part = parts.next().unwrap_or("");
    let height_part = parts.next();

    let width = parse_digits(width_part)
        .ok_or_else(|| RenderError::InvalidDimensionFormat(token.to_string()))?;
    let height = match height_part {
        Some(part) => parse_digits(part)
            .ok_or_else(|| RenderError::InvalidDimensionFormat(token.to_string()))?,
        None => width,
    };

    check_bounds(width, height)?;
    Ok(ImageSpec {
        width: width as u32,
        height: height as u32,
        retina_scale: 1,
    })
}

fn check_bounds(width: u64, height: u64) -> RenderResult<()> {
    let min = MIN_DIMENSION as u64;
    let max = MAX_DIMENSION as u64;
    if width < min || height < min || width > max || height > max {
        return Err(RenderError::DimensionOutOfRange { width, height });
    }
    Ok(())
}

// Digit runs longer than u64 saturate; they are over MAX_DIMENSION either way.
fn parse_component(digits: &str) -> u64 {
    digits.parse::<u64>().unwrap_or(u64::MAX)
}

fn parse_digits(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(parse_component(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_width_only() {
        let spec = parse_dimensions("300").unwrap();
        assert_eq!(
            spec,
            ImageSpec {
                width: 300,
                height: 300,
                retina_scale: 1
            }
        );
    }

    #[test]
    fn parses_width_height() {
        let spec = parse_dimensions("300x150").unwrap();
        assert_eq!(spec.width, 300);
        assert_eq!(spec.height, 150);
        assert_eq!(spec.retina_scale, 1);
    }

    #[test]
    fn parses_retina_suffix() {
        let spec = parse_dimensions("300x150@2x").unwrap();
        assert_eq!(spec.retina_scale, 2);
        assert_eq!(spec.pixel_width(), 600);
        assert_eq!(spec.pixel_height(), 300);

        let spec = parse_dimensions("640@3x").unwrap();
        assert_eq!((spec.width, spec.height, spec.retina_scale), (640, 640, 3));
    }

    #[test]
    fn rejects_malformed_tokens() {
        for token in ["abcxdef", "300x", "x150", "300x150@", "300x150@2", ""] {
            assert!(
                matches!(
                    parse_dimensions(token),
                    Err(RenderError::InvalidDimensionFormat(_))
                ),
                "token {token:?} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_retina_scale_outside_allowed_set() {
        assert!(matches!(
            parse_dimensions("300x150@5x"),
            Err(RenderError::InvalidDimensionFormat(_))
        ));
        assert!(matches!(
            parse_dimensions("300x150@0x"),
            Err(RenderError::InvalidDimensionFormat(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_dimensions() {
        assert!(matches!(
            parse_dimensions("5x5"),
            Err(RenderError::DimensionOutOfRange { width: 5, height: 5 })
        ));
        assert!(matches!(
            parse_dimensions("4001"),
            Err(RenderError::DimensionOutOfRange { .. })
        ));
        // A digit run too long for u64 still lands in the range error.
        assert!(matches!(
            parse_dimensions("99999999999999999999x100"),
            Err(RenderError::DimensionOutOfRange { .. })
        ));
    }

    #[test]
    fn accepts_full_bounds() {
        assert!(parse_dimensions("10x10").is_ok());
        assert!(parse_dimensions("4000x4000").is_ok());
    }

    #[test]
    fn simple_grammar_has_no_retina_suffix() {
        assert_eq!(
            parse_simple_dimensions("200x100").unwrap(),
            ImageSpec {
                width: 200,
                height: 100,
                retina_scale: 1
            }
        );
        assert_eq!(parse_simple_dimensions("200").unwrap().height, 200);
        assert!(matches!(
            parse_simple_dimensions("200x100@2x"),
            Err(RenderError::InvalidDimensionFormat(_))
        ));
        assert!(matches!(
            parse_simple_dimensions("9x9"),
            Err(RenderError::DimensionOutOfRange { .. })
        ));
    }
}
