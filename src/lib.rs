#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod fallback;
pub mod layout;
pub mod params;
pub mod parser;
pub mod pipeline;
pub mod raster;
pub mod server;
pub mod svg;
pub mod text_metrics;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, DefaultsConfig, load_config};
pub use error::{RenderError, RenderResult};
pub use params::{FontChoice, OutputFormat, RawParams, RenderRequest};
pub use parser::{ImageSpec, parse_dimensions, parse_simple_dimensions};
pub use svg::render_svg;
