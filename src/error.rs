#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PmError {
    #[error("invalid {kind} '{id}': {msg}")]
    InvalidRecord {
        kind: &'static str,
        id: String,
        msg: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config key '{0}'")]
    InvalidConfigKey(String),

    #[error("invalid config value for '{key}': {msg}")]
    InvalidConfigValue { key: String, msg: String },

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("{0}")]
    Other(String),
}

impl PmError {
    pub(crate) fn invalid(kind: &'static str, id: &str, msg: impl Into<String>) -> Self {
        Self::InvalidRecord {
            kind,
            id: id.to_owned(),
            msg: msg.into(),
        }
    }
}
