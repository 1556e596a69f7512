use crate::error::RenderResult;
use crate::params::{FontChoice, RenderRequest};
use crate::parser::ImageSpec;
use crate::raster;

pub const FALLBACK_WIDTH: u32 = 400;
pub const FALLBACK_HEIGHT: u32 = 200;

const FALLBACK_TEXT: &str = "Error Occurred\nPlease check the documentation";

/// Fixed diagnostic raster returned in place of an error on the rich
/// endpoint: 400x200, white background, red text, always PNG no matter what
/// format the request asked for.
pub fn diagnostic_image() -> RenderResult<Vec<u8>> {
    let request = RenderRequest {
        spec: ImageSpec {
            width: FALLBACK_WIDTH,
            height: FALLBACK_HEIGHT,
            retina_scale: 1,
        },
        bg_color: "FFFFFF".to_string(),
        text_color: "FF0000".to_string(),
        text: FALLBACK_TEXT.to_string(),
        font: FontChoice::SansSerif,
    };
    raster::render_raster(&request, image::ImageFormat::Png)
}
