//! Centralized configuration loading from config.toml.
//!
//! Values come from config.toml with environment variable overrides; the CLI
//! in [`crate::config`] sits on top of both.
//!
//! Loading happens before tracing is installed (CLI defaults read it), so the
//! outcome is recorded on [`CentralConfig`] and reported by
//! [`log_config_source`] once a subscriber exists.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

mod defaults {
    pub const LOG_LEVEL: &str = "info";
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 55555;
    pub const STATIC_ROOT: &str = ".";
    pub const ENGINE_PATH: &str = "../player/leiserchess";
}

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    /// File the values came from; `None` means built-in defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
    /// Problems met while loading
    #[serde(skip)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommonConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory the GUI files are served from
    #[serde(default = "default_static_root")]
    pub static_root: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_root: default_static_root(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    /// Engine executable
    #[serde(default = "default_engine_path")]
    pub path: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: default_engine_path(),
            args: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    defaults::LOG_LEVEL.into()
}
fn default_host() -> String {
    defaults::HOST.into()
}
fn default_port() -> u16 {
    defaults::PORT
}
fn default_static_root() -> String {
    defaults::STATIC_ROOT.into()
}
fn default_engine_path() -> String {
    defaults::ENGINE_PATH.into()
}

/// Standard locations to search for config.toml
const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from web/)
];

/// Load the central configuration from config.toml.
pub fn load_config() -> CentralConfig {
    let mut warnings = Vec::new();

    if let Ok(path) = std::env::var("LEISERCHESS_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            return load_from_path(&path);
        }
        warnings.push(format!(
            "LEISERCHESS_CONFIG={} not found, searching defaults",
            path.display()
        ));
    }

    let mut config = CONFIG_SEARCH_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
        .map(|path| load_from_path(&path))
        .unwrap_or_default();
    warnings.append(&mut config.warnings);
    config.warnings = warnings;
    config
}

fn load_from_path(path: &Path) -> CentralConfig {
    let failed = |what: &str, e: &dyn std::fmt::Display| CentralConfig {
        warnings: vec![format!(
            "Failed to {} {}: {}, using defaults",
            what,
            path.display(),
            e
        )],
        ..CentralConfig::default()
    };

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str::<CentralConfig>(&content) {
            Ok(config) => CentralConfig {
                source: Some(path.to_path_buf()),
                ..config
            },
            Err(e) => failed("parse", &e),
        },
        Err(e) => failed("read", &e),
    }
}

/// Report where the configuration came from. Call after tracing is set up.
pub fn log_config_source() {
    report(&CONFIG);
}

fn report(config: &CentralConfig) {
    for warning in &config.warnings {
        warn!("{}", warning);
    }
    match &config.source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => info!("No usable config.toml, using built-in defaults"),
    }
}

static CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

pub fn get_log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| CONFIG.common.log_level.clone())
}

pub fn get_host() -> String {
    std::env::var("WEB_HOST").unwrap_or_else(|_| CONFIG.web.host.clone())
}

pub fn get_port() -> u16 {
    std::env::var("WEB_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CONFIG.web.port)
}

pub fn get_static_root() -> String {
    std::env::var("WEB_STATIC_ROOT").unwrap_or_else(|_| CONFIG.web.static_root.clone())
}

pub fn get_engine_path() -> String {
    std::env::var("ENGINE_PATH").unwrap_or_else(|_| CONFIG.engine.path.clone())
}

pub fn get_engine_args() -> Vec<String> {
    CONFIG.engine.args.clone()
}
