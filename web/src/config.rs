//! Command-line configuration for the web server.
//!
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::central_config::{
    get_engine_args, get_engine_path, get_host, get_log_level, get_port, get_static_root,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "web")]
#[command(about = "Leiserchess web GUI server")]
#[command(
    long_about = "Serves the Leiserchess browser GUI and forwards its move requests to a
long-running engine process over the UCI line protocol.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Address to bind
    #[arg(long, default_value_t = get_host())]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value_t = get_port())]
    pub port: u16,

    /// Directory the GUI files are served from
    #[arg(long, default_value_t = get_static_root())]
    pub static_root: String,

    /// Engine executable
    #[arg(long = "engine", default_value_t = get_engine_path())]
    pub engine_path: String,

    /// Extra argument for the engine executable (repeatable)
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = get_log_level())]
    pub log_level: String,
}

impl Config {
    /// Parse the command line, filling engine arguments from config.toml when
    /// none were given.
    pub fn load() -> Self {
        let mut config = Self::parse();
        if config.engine_args.is_empty() {
            config.engine_args = get_engine_args();
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine_path.is_empty() {
            return Err(anyhow!("engine path cannot be empty"));
        }

        if self.port == 0 {
            return Err(anyhow!("port must be greater than 0"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            host: "127.0.0.1".into(),
            port: 55555,
            static_root: ".".into(),
            engine_path: "../player/leiserchess".into(),
            engine_args: Vec::new(),
            log_level: "info".into(),
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_engine_path() {
        let mut cfg = base_config();
        cfg.engine_path.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("engine path"));
    }

    #[test]
    fn validate_rejects_zero_port() {
        let mut cfg = base_config();
        cfg.port = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "loud".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn cli_flags_override_defaults() {
        let cfg = Config::try_parse_from([
            "web",
            "--port",
            "9000",
            "--engine",
            "/usr/local/bin/leiserchess",
            "--engine-arg",
            "--depth=4",
        ])
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.engine_path, "/usr/local/bin/leiserchess");
        assert_eq!(cfg.engine_args, vec!["--depth=4"]);
    }

    #[test]
    fn addr_joins_host_and_port() {
        assert_eq!(base_config().addr(), "127.0.0.1:55555");
    }
}
