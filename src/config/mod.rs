use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
  /// Log file path, if not set, logs will be printed to stderr
  pub file: Option<String>,
  /// Log level, default is "info"
  #[serde(default = "default_log_level")]
  pub level: String,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      file: None,
      level: default_log_level(),
    }
  }
}

/// zsetcli configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
  /// Server address (Redis protocol)
  #[serde(default = "default_server_addr")]
  pub server_addr: String,

  /// Log configuration
  #[serde(default)]
  pub log: LogConfig,
}

fn default_server_addr() -> String {
  "127.0.0.1:6379".to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      server_addr: default_server_addr(),
      log: LogConfig::default(),
    }
  }
}

impl Config {
  /// Parse configuration from TOML text
  pub fn from_toml(text: &str) -> anyhow::Result<Self> {
    toml::from_str(text).context("invalid configuration")
  }

  /// Load configuration from TOML file
  pub fn from_file(path: &str) -> anyhow::Result<Self> {
    let config_str = fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file '{}'", path))?;

    Self::from_toml(&config_str).with_context(|| format!("Failed to parse config file '{}'", path))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_config() {
    let config_str = r#"
server_addr = "10.0.0.5:6380"

[log]
file = "/tmp/zsetcli.log"
level = "debug"
"#;

    let config = Config::from_toml(config_str).unwrap();
    assert_eq!(config.server_addr, "10.0.0.5:6380");
    assert_eq!(config.log.file.as_deref(), Some("/tmp/zsetcli.log"));
    assert_eq!(config.log.level, "debug");
  }

  #[test]
  fn test_default_config() {
    let config = Config::from_toml("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.server_addr, "127.0.0.1:6379");
    assert_eq!(config.log.level, "info");
    assert!(config.log.file.is_none());
  }

  #[test]
  fn test_partial_log_section() {
    let config = Config::from_toml("[log]\nfile = \"out.log\"\n").unwrap();
    assert_eq!(config.log.level, "info");
  }

  #[test]
  fn test_from_file() {
    let path = std::env::temp_dir().join(format!("zsetcli-config-{}.toml", std::process::id()));
    fs::write(&path, "server_addr = \"127.0.0.1:7000\"\n").unwrap();

    let config = Config::from_file(path.to_str().unwrap()).unwrap();
    assert_eq!(config.server_addr, "127.0.0.1:7000");

    fs::remove_file(&path).unwrap();
    assert!(Config::from_file(path.to_str().unwrap()).is_err());
  }

  #[test]
  fn test_invalid_config() {
    assert!(Config::from_toml("server_addr = 5").is_err());
  }
}
