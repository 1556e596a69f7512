use crate::layout::{split_lines, vector_layout};
use crate::params::RenderRequest;

/// Renders the request as a standalone SVG document. Retina scale is ignored
/// here; SVG is resolution-independent, so the root keeps the unscaled size
/// and a matching viewBox.
pub fn render_svg(request: &RenderRequest) -> String {
    let spec = &request.spec;
    let lines = split_lines(&request.text);
    let layout = vector_layout(spec, lines.len());

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = spec.width,
        h = spec.height,
    ));

    svg.push_str(&format!(
        "  <rect width=\"100%\" height=\"100%\" fill=\"#{}\"/>\n",
        request.bg_color
    ));

    for (line, anchor) in lines.iter().zip(&layout.anchors) {
        svg.push_str(&format!(
            "  <text x=\"50%\" y=\"{anchor:.1}\" font-family=\"{}\" font-size=\"{:.1}px\" fill=\"#{}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>\n",
            request.font.css_name(),
            layout.font_size,
            request.text_color,
            escape_xml(line),
        ));
    }

    svg.push_str("</svg>");
    svg
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
