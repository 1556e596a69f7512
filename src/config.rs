use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Fallback values applied when a request omits a parameter. Dimension
/// bounds and the lookup tables are fixed and intentionally not configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub width: u32,
    pub height: u32,
    pub bg_color: String,
    pub text_color: String,
    /// Default family for the legacy endpoint (any family name allowed).
    pub v1_font: String,
    /// Default family for the rich endpoint (allow-listed).
    pub v2_font: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 150,
            bg_color: "dddddd".to_string(),
            text_color: "999999".to_string(),
            v1_font: "Lato".to_string(),
            v2_font: "sans-serif".to_string(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&contents)?;
    Ok(config)
}
