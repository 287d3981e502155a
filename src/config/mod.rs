//! Configuration management for hearsay.
//!
//! Configuration is read from `~/.config/hearsay/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! Environment variables override the client identification settings.

pub mod http;
pub mod speech;

pub use http::HttpConfig;
pub use speech::SpeechConfig;

use crate::resolver::ResolverConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub resolver: ResolverConfig,
    pub speech: SpeechConfig,
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// An explicit path must exist. The default file is created with
    /// comments when missing. Missing fields use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let config_path = Self::default_config_path()?;
                if config_path.exists() {
                    Self::load_from(&config_path)?
                } else {
                    Self::create_default_config(&config_path)?;
                    Self::default()
                }
            }
        };

        config.http.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file without applying environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/hearsay/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("hearsay").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# hearsay configuration

[http]
user_agent = "hearsay/0.1.0"

# Per-request timeout in seconds
timeout_secs = 10

# Client identification header. The value can also come from the
# HEARSAY_CLIENT_ID environment variable.
client_id_header = "X-Client-Id"
# client_id = "my-app"

[resolver]
base_url = "https://www.reddit.com"

# Read the post link from the share link's redirect first
follow_redirects = true

# Subreddit listings searched for a share id when everything else failed
search_listings = ["new", "hot"]
listing_limit = 100

# Relays used to fetch share pages, tried in order.
# mode is "raw" (body is the page) or "json_contents" (JSON with a
# `contents` field). An empty prefix fetches the page directly.
[[resolver.relays]]
name = "direct"
prefix = ""
mode = "raw"

[[resolver.relays]]
name = "allorigins raw"
prefix = "https://api.allorigins.win/raw?url="
mode = "raw"

[[resolver.relays]]
name = "allorigins get"
prefix = "https://api.allorigins.win/get?url="
mode = "json_contents"

[[resolver.relays]]
name = "corsproxy"
prefix = "https://corsproxy.io/?"
mode = "raw"

[speech]
# Program run once per sentence. When unset, the first of espeak-ng,
# espeak, say and spd-say found on PATH is used.
# command = "espeak-ng"
args = []
# voice = "en-us"
# rate = 175
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
