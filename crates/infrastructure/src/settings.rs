//! User settings.
//!
//! Read from the platform-specific config directory:
//! - Linux: ~/.config/relay/settings.json
//! - macOS: ~/Library/Application Support/relay/settings.json
//! - Windows: %APPDATA%/relay/settings.json
//!
//! Every field is optional in the file. `RELAY_*` environment variables
//! override the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::fs;
use url::Url;

use crate::serialization::{SerializationError, from_json_bytes};

/// Default address of the proxy collaborator.
pub const DEFAULT_PROXY_URL: &str = "http://localhost:5000";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error while reading the settings file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// A configured base URL does not parse.
    #[error("invalid {field} '{value}': {source}")]
    InvalidUrl {
        /// Settings field holding the URL.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Parser error.
        source: url::ParseError,
    },
}

/// On-disk shape; everything optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    proxy_url: Option<String>,
    backend_url: Option<String>,
    data_dir: Option<PathBuf>,
    user_id: Option<String>,
    access_token: Option<String>,
    collection_id: Option<String>,
}

impl SettingsFile {
    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("RELAY_PROXY_URL") {
            self.proxy_url = Some(v);
        }
        if let Some(v) = var("RELAY_BACKEND_URL") {
            self.backend_url = Some(v);
        }
        if let Some(v) = var("RELAY_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = var("RELAY_USER_ID") {
            self.user_id = Some(v);
        }
        if let Some(v) = var("RELAY_ACCESS_TOKEN") {
            self.access_token = Some(v);
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    /// Base address of the proxy; requests go to `{proxy_url}/proxy`.
    pub proxy_url: Url,
    /// History/collections backend. `None` keeps records in local files.
    pub backend_url: Option<Url>,
    /// Directory for environments and offline records.
    pub data_dir: PathBuf,
    /// Signed-in user, if any.
    pub user_id: Option<String>,
    /// Bearer credential for the backend.
    pub access_token: Option<String>,
    /// Collection new requests are also filed under.
    pub collection_id: Option<String>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            backend_url: None,
            data_dir: default_data_dir(),
            user_id: None,
            access_token: None,
            collection_id: None,
        }
    }
}

impl RelaySettings {
    /// Returns the default settings file path, if a config directory exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("relay").join("settings.json"))
    }

    /// Loads settings from `path` (or the default path) and the process
    /// environment.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a URL is
    /// invalid.
    pub async fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with_env(path, |name| std::env::var(name).ok()).await
    }

    /// Same as [`Self::load`] with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a URL is
    /// invalid.
    pub async fn load_with_env(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);

        let mut file = SettingsFile::default();
        if let Some(path) = path
            && fs::try_exists(&path).await?
        {
            tracing::debug!(path = %path.display(), "loading settings");
            file = from_json_bytes(&fs::read(&path).await?)?;
        }
        file.apply_env(env);

        Self::from_file(file)
    }

    fn from_file(file: SettingsFile) -> Result<Self, SettingsError> {
        let proxy_url = match file.proxy_url {
            Some(value) => parse_url("proxy_url", value)?,
            None => default_proxy_url(),
        };
        let backend_url = file
            .backend_url
            .map(|value| parse_url("backend_url", value))
            .transpose()?;

        Ok(Self {
            proxy_url,
            backend_url,
            data_dir: file.data_dir.unwrap_or_else(default_data_dir),
            user_id: file.user_id,
            access_token: file.access_token,
            collection_id: file.collection_id,
        })
    }
}

fn parse_url(field: &'static str, value: String) -> Result<Url, SettingsError> {
    Url::parse(value.trim()).map_err(|source| SettingsError::InvalidUrl {
        field,
        value,
        source,
    })
}

fn default_proxy_url() -> Url {
    Url::parse(DEFAULT_PROXY_URL).unwrap_or_else(|_| unreachable!("DEFAULT_PROXY_URL parses"))
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from(".relay"), |p| p.join("relay"))
}
