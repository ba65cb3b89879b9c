use anyhow::{Context, Result};
use std::env;

use crate::responder::{LogMode, ResponseOptions};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub responder: ResponderConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Env-driven switches for the error responder. Unset or unparsable values
/// are treated as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponderConfig {
    pub log: bool,
    pub debug: bool,
    pub camel_case: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
            },
            responder: ResponderConfig::from_env(),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ResponderConfig {
    pub fn from_env() -> Self {
        Self {
            log: flag("ERROR_LOG"),
            debug: flag("ERROR_DEBUG"),
            camel_case: flag("ERROR_CAMEL_CASE"),
        }
    }
}

impl From<&ResponderConfig> for ResponseOptions {
    fn from(config: &ResponderConfig) -> Self {
        ResponseOptions {
            log: LogMode::from(config.log),
            debug: config.debug,
            camel_case: config.camel_case,
        }
    }
}

fn flag(name: &str) -> bool {
    env::var(name)
        .ok()
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_address() {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            responder: ResponderConfig::default(),
        };

        assert_eq!(config.server_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("1"));
        assert!(parse_flag("on"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("maybe"));
    }

    #[test]
    fn test_responder_config_into_options() {
        let config = ResponderConfig {
            log: true,
            debug: false,
            camel_case: true,
        };
        let options = ResponseOptions::from(&config);
        assert!(matches!(options.log, LogMode::DefaultLogger));
        assert!(!options.debug);
        assert!(options.camel_case);
    }
}
