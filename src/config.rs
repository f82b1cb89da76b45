use crate::ads::types::OAuthClient;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_PREFIX: &str = "google-ads-reporter";
const CONFIG_FILE: &str = "config.toml";
const TOKEN_FILE: &str = "google_ads_token.json";

const API_HOST: &str = "https://googleads.googleapis.com";
pub const DEFAULT_API_VERSION: &str = "v19";

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub google_ads: GoogleAdsConfig,

    /// Directory holding the config file and the persisted credential
    #[serde(skip)]
    pub dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GoogleAdsConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub developer_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Values copied from `.env.example` templates start with `your_` and count as unset.
fn is_set(value: &str) -> bool {
    !value.trim().is_empty() && !value.starts_with("your_")
}

impl GoogleAdsConfig {
    /// OAuth client registration needed for the interactive flow
    pub fn oauth_client(&self) -> Result<OAuthClient> {
        if !is_set(&self.client_id) || !is_set(&self.client_secret) {
            return Err(AppError::Config(
                "GOOGLE_ADS_CLIENT_ID and GOOGLE_ADS_CLIENT_SECRET must be set".to_string(),
            ));
        }

        Ok(OAuthClient {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            auth_uri: GOOGLE_AUTH_URL.to_string(),
            token_uri: GOOGLE_TOKEN_URL.to_string(),
        })
    }

    pub fn developer_token(&self) -> Result<&str> {
        match is_set(&self.developer_token) {
            true => Ok(&self.developer_token),
            false => Err(AppError::Config(
                "GOOGLE_ADS_DEVELOPER_TOKEN must be set".to_string(),
            )),
        }
    }

    pub fn login_customer_id(&self) -> Option<&str> {
        self.login_customer_id.as_deref().filter(|id| is_set(id))
    }

    pub fn api_base_url(&self) -> String {
        if let Some(base_url) = self.base_url.as_deref().filter(|url| is_set(url)) {
            return base_url.trim_end_matches('/').to_string();
        }

        let version = self
            .api_version
            .as_deref()
            .filter(|v| is_set(v))
            .unwrap_or(DEFAULT_API_VERSION);
        format!("{}/{}", API_HOST, version)
    }

    /// Override file values with `GOOGLE_ADS_*` variables returned by `lookup`
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(v) = non_empty("GOOGLE_ADS_CLIENT_ID") {
            self.client_id = v;
        }
        if let Some(v) = non_empty("GOOGLE_ADS_CLIENT_SECRET") {
            self.client_secret = v;
        }
        if let Some(v) = non_empty("GOOGLE_ADS_DEVELOPER_TOKEN") {
            self.developer_token = v;
        }
        if let Some(v) = non_empty("GOOGLE_ADS_LOGIN_CUSTOMER_ID") {
            self.login_customer_id = Some(v);
        }
        if let Some(v) = non_empty("GOOGLE_ADS_API_VERSION") {
            self.api_version = Some(v);
        }
        if let Some(v) = non_empty("GOOGLE_ADS_BASE_URL") {
            self.base_url = Some(v);
        }
    }
}

impl Config {
    /// Load configuration from `config.toml` (optional) and the environment.
    ///
    /// Missing values are not an error here; they are reported when an
    /// operation actually needs them.
    pub fn load(dir_override: Option<&Path>) -> Result<Self> {
        let dir = Self::config_dir(dir_override)?;
        let config_path = dir.join(CONFIG_FILE);

        let mut config = match config_path.exists() {
            true => Self::from_file(&config_path)?,
            false => Config::default(),
        };

        config.google_ads.apply_env(|name| std::env::var(name).ok());
        config.dir = dir;

        Ok(config)
    }

    /// Parse a config file without applying environment overrides
    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str::<Config>(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config directory, honouring an explicit override
    pub fn config_dir(dir_override: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = dir_override {
            return Ok(dir.to_path_buf());
        }

        Self::xdg_dirs()
            .get_config_home()
            .ok_or_else(|| AppError::Config("Failed to determine config directory".to_string()))
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Where the OAuth2 credential is persisted
    pub fn token_file(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}
