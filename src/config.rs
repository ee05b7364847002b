//! Configuration loader and validator for the link bot.
//!
//! Settings come from an optional YAML file, then environment variables
//! override whatever the file set.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_PORT: u16 = 8080;

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_DATABASE_URL_FALLBACK: &str = "MONGO_URI";
pub const ENV_PORT: &str = "PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub telegram: Telegram,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub replies: Replies,
}

/// Telegram bot settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Telegram {
    #[serde(default)]
    pub bot_token: String,
}

/// Link store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Database {
    #[serde(default)]
    pub url: String,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Server {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Reply texts sent back to the chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Replies {
    #[serde(default = "default_saved_reply")]
    pub saved: String,
    #[serde(default = "default_missing_link_reply")]
    pub missing_link: String,
}

impl Default for Replies {
    fn default() -> Self {
        Self {
            saved: default_saved_reply(),
            missing_link: default_missing_link_reply(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_saved_reply() -> String {
    "Message and 3D model link received and saved successfully!".to_string()
}

fn default_missing_link_reply() -> String {
    "Please send a link that starts with http:// or https:// for the 3D model.".to_string()
}

/// Load configuration from YAML and the process environment, then validate.
/// - If `path` is None, `config.yaml` is read when it exists and skipped otherwise.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load`] with an injectable environment lookup.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match path {
        Some(path) => parse(&fs::read_to_string(path)?)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                parse(&fs::read_to_string(default_path)?)?
            } else {
                Config::default()
            }
        }
    };
    apply_env(&mut cfg, lookup)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn parse(content: &str) -> Result<Config, ConfigError> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

fn apply_env<F>(cfg: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = non_empty(ENV_BOT_TOKEN) {
        cfg.telegram.bot_token = token;
    }
    if let Some(url) = non_empty(ENV_DATABASE_URL).or_else(|| non_empty(ENV_DATABASE_URL_FALLBACK)) {
        cfg.database.url = url;
    }
    if let Some(port) = non_empty(ENV_PORT) {
        cfg.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            key: ENV_PORT,
            value: port,
        })?;
    }
    Ok(())
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.telegram.bot_token.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "telegram.bot_token (TELEGRAM_BOT_TOKEN) must be non-empty",
        ));
    }
    if cfg.database.url.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "database.url (DATABASE_URL) must be non-empty",
        ));
    }
    if cfg.replies.saved.trim().is_empty() {
        return Err(ConfigError::Invalid("replies.saved must be non-empty"));
    }
    if cfg.replies.missing_link.trim().is_empty() {
        return Err(ConfigError::Invalid("replies.missing_link must be non-empty"));
    }
    Ok(())
}

/// Example YAML config.
pub fn example() -> &'static str {
    r#"telegram:
  bot_token: "YOUR_TELEGRAM_BOT_TOKEN"

database:
  url: "sqlite://./data/links.db"

server:
  port: 8080

replies:
  saved: "Message and 3D model link received and saved successfully!"
  missing_link: "Please send a link that starts with http:// or https:// for the 3D model."
"#
}
