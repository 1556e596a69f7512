use crate::config::{Config, DefaultsConfig};
use crate::fallback;
use crate::params::RawParams;
use crate::pipeline::{self, Rendered};
use tiny_http::Method;

const DEFAULT_IMAGE_TEXT: &str = "Default Image";

/// Everything the transport needs to answer a request. Kept separate from
/// tiny_http types so routing is testable without sockets.
#[derive(Debug, Clone)]
pub struct RouteResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl RouteResponse {
    fn ok(rendered: Rendered) -> Self {
        Self {
            status: 200,
            content_type: rendered.content_type,
            body: rendered.bytes,
        }
    }

    fn text(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "text/plain".to_string(),
            body: message.as_bytes().to_vec(),
        }
    }

    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html".to_string(),
            body: body.into_bytes(),
        }
    }
}

/// Blocking request loop. Each request is handled to completion before the
/// next is read; the core itself holds no cross-request state.
pub fn serve(config: &Config) -> anyhow::Result<()> {
    let server = tiny_http::Server::http(config.server.bind.as_str())
        .map_err(|err| anyhow::anyhow!("failed to bind {}: {err}", config.server.bind))?;
    log::info!("listening on http://{}", config.server.bind);

    for request in server.incoming_requests() {
        let response = if request.method() == &Method::Get {
            route(request.url(), config)
        } else {
            RouteResponse::text(405, "Method Not Allowed")
        };
        log::debug!(
            "{} {} -> {}",
            request.method(),
            request.url(),
            response.status
        );
        respond(request, response);
    }
    Ok(())
}

fn respond(request: tiny_http::Request, route_response: RouteResponse) {
    let RouteResponse {
        status,
        content_type,
        body,
    } = route_response;
    let mut response = tiny_http::Response::from_data(body).with_status_code(status);
    if let Ok(header) =
        tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
    {
        response.add_header(header);
    }
    if let Err(err) = request.respond(response) {
        log::warn!("client went away before the response was written: {err}");
    }
}

/// Dispatches a GET request URL to the v1 or v2 surface.
pub fn route(url: &str, config: &Config) -> RouteResponse {
    let (path, query_str) = url.split_once('?').unwrap_or((url, ""));
    let query = parse_query(query_str);

    match path {
        "/generate-image" => v1_generate(&query, &config.defaults),
        "/api/v2" | "/api/v2/" => RouteResponse::html(documentation_html()),
        _ => match path.strip_prefix("/api/v2/generate") {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                let segments: Vec<String> = rest
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(percent_decode)
                    .collect();
                if segments.is_empty() {
                    v2_default(&config.defaults)
                } else {
                    v2_generate(&segments, &query, &config.defaults)
                }
            }
            _ => RouteResponse::text(404, "Not Found"),
        },
    }
}

/// Legacy policy: dimension problems come back as a plain-text 400, anything
/// else as a 500. No diagnostic image.
fn v1_generate(query: &[(String, String)], defaults: &DefaultsConfig) -> RouteResponse {
    let Some(size) = query_value(query, "size") else {
        return RouteResponse::text(400, "Missing required parameter: size");
    };
    let raw = RawParams {
        dimensions: size,
        bg_color: query_value(query, "bgColor"),
        text_color: query_value(query, "textColor"),
        text: query_value(query, "text"),
        font: query_value(query, "font"),
        format: query_value(query, "format"),
    };
    match pipeline::simple(&raw, defaults) {
        Ok(rendered) => RouteResponse::ok(rendered),
        Err(err) if err.is_client_error() => RouteResponse::text(400, &err.to_string()),
        Err(err) => {
            log::error!("legacy image generation failed: {err}");
            RouteResponse::text(500, "Failed to generate image")
        }
    }
}

/// Rich policy: every failure is logged and answered 200 with the fixed
/// diagnostic PNG.
fn v2_generate(
    segments: &[String],
    query: &[(String, String)],
    defaults: &DefaultsConfig,
) -> RouteResponse {
    let (dimensions, bg_color, text_color, format): (&str, Option<&str>, Option<&str>, Option<&str>) =
        match segments {
            [dims] => (dims.as_str(), None, None, None),
            [dims, fmt] => (dims.as_str(), None, None, Some(fmt.as_str())),
            [dims, bg, fg] => match fg.rsplit_once('.') {
                Some((fg, fmt)) => (dims.as_str(), Some(bg.as_str()), Some(fg), Some(fmt)),
                None => (dims.as_str(), Some(bg.as_str()), Some(fg.as_str()), None),
            },
            [dims, bg, fg, fmt] => (
                dims.as_str(),
                Some(bg.as_str()),
                Some(fg.as_str()),
                Some(fmt.as_str()),
            ),
            _ => return RouteResponse::text(404, "Not Found"),
        };

    let raw = RawParams {
        dimensions,
        bg_color,
        text_color,
        text: query_value(query, "text"),
        font: query_value(query, "font"),
        format,
    };
    rich_response(&raw, defaults)
}

fn v2_default(defaults: &DefaultsConfig) -> RouteResponse {
    let dimensions = format!("{}x{}", defaults.width, defaults.height);
    let raw = RawParams {
        dimensions: &dimensions,
        text: Some(DEFAULT_IMAGE_TEXT),
        ..RawParams::default()
    };
    rich_response(&raw, defaults)
}

fn rich_response(raw: &RawParams<'_>, defaults: &DefaultsConfig) -> RouteResponse {
    match pipeline::rich(raw, defaults) {
        Ok(rendered) => RouteResponse::ok(rendered),
        Err(err) => {
            log::error!("image generation failed, serving diagnostic image: {err}");
            match fallback::diagnostic_image() {
                Ok(bytes) => RouteResponse {
                    status: 200,
                    content_type: "image/png".to_string(),
                    body: bytes,
                },
                Err(fallback_err) => {
                    log::error!("failed to render diagnostic image: {fallback_err}");
                    RouteResponse {
                        status: 200,
                        content_type: "image/png".to_string(),
                        body: Vec::new(),
                    }
                }
            }
        }
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (percent_decode(key), percent_decode(value)),
            None => (percent_decode(pair), String::new()),
        })
        .collect()
}

fn query_value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

/// Decodes %XX escapes. `+` is left alone; the text resolver owns the
/// plus-to-space convention.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]))
        {
            out.push(hi * 16 + lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn documentation_html() -> String {
    r#"<!DOCTYPE html>
<html>
<head>
    <title>Placeholder Image API Documentation</title>
    <style>
        body { font-family: sans-serif; line-height: 1.6; max-width: 800px; margin: 0 auto; padding: 20px; }
        code { background: #f4f4f4; padding: 2px 5px; border-radius: 3px; }
        .example { margin: 10px 0; padding: 10px; background: #f8f9fa; border-radius: 5px; }
    </style>
</head>
<body>
    <h1>Placeholder Image API Documentation</h1>
    <h2>Basic Usage</h2>
    <div class="example">
        <code>/api/v2/generate/600x400</code> - Creates a 600x400 image
    </div>
    <h2>Supported Features</h2>
    <ul>
        <li>Formats: PNG (default), SVG, JPEG, GIF, WebP</li>
        <li>System Fonts: serif, sans-serif, monospace, dialog</li>
        <li>Retina Support: @2x, @3x</li>
        <li>Custom Colors: Hex codes or color names</li>
    </ul>
    <h2>Routes</h2>
    <div class="example"><code>/api/v2/generate/{dimensions}</code></div>
    <div class="example"><code>/api/v2/generate/{dimensions}/{format}</code></div>
    <div class="example"><code>/api/v2/generate/{dimensions}/{bgColor}/{textColor}</code></div>
    <div class="example"><code>/api/v2/generate/{dimensions}/{bgColor}/{textColor}/{format}</code></div>
    <div class="example"><code>/api/v2/generate/{dimensions}/{bgColor}/{textColor}.{format}</code></div>
    <h2>Query Parameters</h2>
    <div class="example"><code>?text=Hello+World</code> - custom label (use \n for line breaks)</div>
    <div class="example"><code>?font=monospace</code> - one of the system fonts</div>
    <h2>Example</h2>
    <div class="example">
        <img src="/api/v2/generate/300x150" alt="Example Image">
        <p><code>/api/v2/generate/300x150</code></p>
    </div>
</body>
</html>
"#
    .to_string()
}
