// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for clarabot
//!
//! Degraded analysis conditions (unparseable colors, empty text, unreachable
//! contrast targets) are not errors. These variants cover configuration and
//! the network collaborators only.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClarabotError>;

#[derive(Error, Debug)]
pub enum ClarabotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Fetch(String),

    #[error("Remote rewrite error: {0}")]
    Remote(String),
}
