//! Command-line and config-file settings.
//!
//! Flags (or their `PARLEY_*` environment variables) win over the TOML file,
//! which wins over built-in defaults.

use clap::Parser;
use parley_client::ClientConfig;
use parley_core::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_ROOM, Endpoint, EndpointError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "parley", version, about = "Translated chat in the terminal")]
pub struct Args {
    /// TOML file with defaults for the options below.
    #[arg(long, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Chat server host.
    #[arg(long, env = "PARLEY_HOST")]
    pub host: Option<String>,

    /// Chat server port.
    #[arg(long, env = "PARLEY_PORT")]
    pub port: Option<u16>,

    /// Room to join.
    #[arg(long, env = "PARLEY_ROOM")]
    pub room: Option<String>,

    /// Use wss:// and https://.
    #[arg(long, env = "PARLEY_SECURE")]
    pub secure: bool,

    /// Language messages are translated into.
    #[arg(long = "lang", env = "PARLEY_LANG")]
    pub target_lang: Option<String>,
}

/// Contents of the optional config file.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub room: Option<String>,
    pub secure: Option<bool>,
    pub target_lang: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Args {
    /// Merge flags, file and defaults into a client config.
    pub fn resolve(&self) -> Result<ClientConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        self.merge(file)
    }

    fn merge(&self, file: FileConfig) -> Result<ClientConfig, ConfigError> {
        let endpoint = Endpoint::new(
            self.host
                .clone()
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            self.port.or(file.port).unwrap_or(DEFAULT_PORT),
            self.room
                .clone()
                .or(file.room)
                .unwrap_or_else(|| DEFAULT_ROOM.to_string()),
            self.secure || file.secure.unwrap_or(false),
        )?;

        let mut config = ClientConfig::new(endpoint);
        if let Some(lang) = self.target_lang.clone().or(file.target_lang) {
            config = config.with_target_lang(lang);
        }
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}
