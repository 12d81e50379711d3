use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Top-level CLI configuration, read from `adwolf.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct AdwolfConfig {
    #[serde(default)]
    pub api: ApiConfig,
}

/// Backend connection settings.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the AdWolf backend, no trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_env: default_token_env(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_token_env() -> String {
    "ADWOLF_TOKEN".to_string()
}

impl AdwolfConfig {
    /// Loads the config file. A missing file falls back to defaults; a
    /// present but unparseable one is an error.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(toml::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file found; using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(anyhow::anyhow!(
                "Failed to read config file '{}': {}",
                path.display(),
                err
            )),
        }
    }
}
