use crate::config::load_config;
use crate::params::RawParams;
use crate::pipeline;
use crate::server;
use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "placepix", version, about = "Placeholder image generator (raster + SVG)")]
pub struct Args {
    /// Size token, e.g. 300, 300x150 or 640x480@2x. Renders once and exits;
    /// omit to run the HTTP server.
    #[arg(short = 's', long = "size")]
    pub size: Option<String>,

    /// Output file. Required for raster formats; SVG defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Background color (hex or CSS name)
    #[arg(long = "bg")]
    pub bg_color: Option<String>,

    /// Text color (hex or CSS name)
    #[arg(long = "color")]
    pub text_color: Option<String>,

    /// Label text; defaults to the resolved size
    #[arg(short = 't', long = "text")]
    pub text: Option<String>,

    /// Font family from the allow-list
    #[arg(long = "font")]
    pub font: Option<String>,

    /// Output format (png/jpg/jpeg/gif/webp/svg); inferred from the output
    /// extension when omitted
    #[arg(short = 'f', long = "format")]
    pub format: Option<String>,

    /// Bind address for server mode
    #[arg(short = 'b', long = "bind")]
    pub bind: Option<String>,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind.clone() {
        config.server.bind = bind;
    }

    let Some(size) = args.size.as_deref() else {
        return server::serve(&config);
    };

    let format = resolve_cli_format(&args);
    let raw = RawParams {
        dimensions: size,
        bg_color: args.bg_color.as_deref(),
        text_color: args.text_color.as_deref(),
        text: args.text.as_deref(),
        font: args.font.as_deref(),
        format: format.as_deref(),
    };
    let rendered = pipeline::rich(&raw, &config.defaults)?;
    write_output(
        &rendered.bytes,
        args.output.as_deref(),
        &rendered.content_type,
    )
}

fn resolve_cli_format(args: &Args) -> Option<String> {
    if args.format.is_some() {
        return args.format.clone();
    }
    args.output
        .as_ref()?
        .extension()?
        .to_str()
        .map(str::to_string)
}

fn write_output(bytes: &[u8], output: Option<&Path>, content_type: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, bytes)?;
            Ok(())
        }
        None if content_type == "image/svg+xml" => {
            io::stdout().write_all(bytes)?;
            Ok(())
        }
        None => Err(anyhow::anyhow!("Output path required for raster output")),
    }
}
