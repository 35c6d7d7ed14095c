use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "CODERQUEST_CONFIG";

/// Runtime settings from `coderquest.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub content_dir: PathBuf,
    pub save_path: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            content_dir: PathBuf::from("content"),
            save_path: default_save_path(),
            log_file: PathBuf::from("coderquest.log"),
            log_level: "info".to_string(),
        }
    }
}

fn default_save_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("coderquest"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("save.json")
}

pub fn parse_config(src: &str) -> Result<Config> {
    Ok(toml::from_str(src)?)
}

/// Reads `path` if given, else `coderquest.toml` in the working directory
/// when present, else the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let local = PathBuf::from("coderquest.toml");
            if !local.exists() {
                return Ok(Config::default());
            }
            local
        }
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Config path from the first CLI argument, then `CODERQUEST_CONFIG`.
pub fn config_path_from_env() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .map(PathBuf::from)
}
