//! Error types shared by the checks, the Elasticsearch client and the config loader

use thiserror::Error;

/// Errors surfaced by `Check::run`
#[derive(Debug, Error)]
pub enum CheckError {
    /// Client construction failed during init; the check stays disabled
    #[error("no {0} client configured")]
    NoClient(&'static str),
}

/// Errors from building or using the Elasticsearch REST client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid elasticsearch url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported url scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors while loading the agent configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not find config directory")]
    NoConfigDir,

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}
