use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "tool-config.yml not found. Checked:\n\
        - HAINFRA_CONFIG_PATH\n\
        - current directory: tool-config.local.yml, tool-config.yml, tool-config.yaml\n\
        - parent directory: same names\n\
        - ~/.config/hainfra/tool-config.yml"
    )]
    ConfigFileNotFound,

    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("missing required config key: {0}")]
    MissingKey(&'static str),

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
