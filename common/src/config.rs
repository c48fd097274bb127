//! Mail submission credentials, loaded from a local JSON file.
//!
//! The file shape matches `config/email_credentials.json`:
//! `{ "sender_email": ..., "smtp_url": ..., "smtp_port": ..., "password": ... }`

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access mail configuration file '{path}': {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed mail configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Credentials for the authenticated mail-submission channel.
#[derive(Clone, Debug, Deserialize)]
pub struct MailConfig {
    pub sender_email: String,
    pub smtp_url: String,
    pub smtp_port: u16,
    pub password: String,
}

impl MailConfig {
    pub const DEFAULT_PATH: &'static str = "config/email_credentials.json";

    /// Reads and parses the credentials file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw: String = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}
