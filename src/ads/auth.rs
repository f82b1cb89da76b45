use super::types::{Credential, CredentialState, OAuthClient, TokenGrant};
use crate::config::GoogleAdsConfig;
use crate::error::{AppError, Result};
use crate::models::normalize_customer_id;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

pub const ADWORDS_SCOPE: &str = "https://www.googleapis.com/auth/adwords";

const DEVELOPER_TOKEN_HEADER: &str = "developer-token";
const LOGIN_CUSTOMER_ID_HEADER: &str = "login-customer-id";

/// Token endpoint and interactive consent, supplied by a platform adapter
#[async_trait]
pub trait OAuthFlow {
    /// Run the browser consent flow and exchange the code for a credential
    async fn authorize(&self, client: &OAuthClient, scopes: &[&str]) -> Result<Credential>;

    /// Exchange the credential's refresh token for a new access token
    async fn refresh(&self, credential: &Credential) -> Result<TokenGrant>;
}

/// Owns the persisted Google Ads credential and builds request headers
pub struct CredentialStore<F> {
    config: GoogleAdsConfig,
    token_path: PathBuf,
    flow: F,
}

impl<F> CredentialStore<F>
where
    F: OAuthFlow + Sync,
{
    pub fn new(config: GoogleAdsConfig, token_path: PathBuf, flow: F) -> Self {
        Self {
            config,
            token_path,
            flow,
        }
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Get a valid credential, refreshing or re-authorizing as needed
    #[instrument(name = "Getting Google Ads credentials", skip_all)]
    pub async fn get_credentials(&self) -> Result<Credential> {
        let now = Utc::now();

        let credential = match CredentialState::classify(self.load(), now) {
            CredentialState::Valid(credential) => {
                debug!("Using cached Google Ads credentials");
                return Ok(credential);
            }
            CredentialState::Expired(credential) => self.refresh(credential).await?,
            CredentialState::NoCredential => None,
        };

        let credential = match credential {
            Some(credential) => credential,
            None => {
                let client = self.config.oauth_client()?;
                info!("Starting OAuth2 authorization flow");
                let credential = self.flow.authorize(&client, &[ADWORDS_SCOPE]).await?;
                info!("OAuth2 authorization completed");
                credential
            }
        };

        self.save(&credential);

        Ok(credential)
    }

    /// Refresh an expired credential, or `None` if the token endpoint rejected
    /// it. Any other failure, such as the endpoint being unreachable, is an error.
    async fn refresh(&self, mut credential: Credential) -> Result<Option<Credential>> {
        debug!("Access token expired, refreshing...");

        match self.flow.refresh(&credential).await {
            Ok(grant) => {
                credential.apply_grant(grant, Utc::now());
                info!("Credentials successfully refreshed");
                Ok(Some(credential))
            }
            Err(AppError::Refresh(e)) => {
                warn!(error = %e, "Token refresh rejected, re-authorizing");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Build headers for a Google Ads REST request
    pub fn get_headers(&self, credential: &Credential) -> Result<HeaderMap> {
        let developer_token = self.config.developer_token()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", credential.access_token))?,
        );
        headers.insert(DEVELOPER_TOKEN_HEADER, header_value(developer_token)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(login_customer_id) = self.config.login_customer_id() {
            headers.insert(
                LOGIN_CUSTOMER_ID_HEADER,
                header_value(&normalize_customer_id(login_customer_id))?,
            );
        }

        Ok(headers)
    }

    /// Delete the persisted credential, forcing re-authorization on next use
    #[instrument(name = "Clearing Google Ads credentials", skip_all)]
    pub fn clear_credentials(&self) -> Result<()> {
        match fs::remove_file(&self.token_path) {
            Ok(()) => {
                info!(path = ?self.token_path, "Credentials cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No Google Ads credentials to clear");
                Ok(())
            }
            Err(e) => Err(AppError::Auth(format!(
                "Failed to delete credentials file: {}",
                e
            ))),
        }
    }

    /// Load the persisted credential; unreadable files count as absent
    fn load(&self) -> Option<Credential> {
        let contents = match fs::read_to_string(&self.token_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cached credentials found");
                return None;
            }
            Err(e) => {
                warn!(path = ?self.token_path, error = %e, "Error reading existing credentials");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(credential) => {
                debug!(path = ?self.token_path, "Loaded existing credentials");
                Some(credential)
            }
            Err(e) => {
                warn!(path = ?self.token_path, error = %e, "Error parsing existing credentials");
                None
            }
        }
    }

    /// Best-effort save; failures are logged and otherwise ignored
    fn save(&self, credential: &Credential) {
        if let Err(e) = write_credential(&self.token_path, credential) {
            warn!(path = ?self.token_path, error = %e, "Could not save credentials");
        } else {
            debug!(path = ?self.token_path, "Saved credentials");
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Auth(format!("Invalid header value: {}", e)))
}

/// Write to a sibling temp file and rename it over the target, so an
/// interrupted write never clobbers the previous credential.
fn write_credential(path: &Path, credential: &Credential) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = serde_json::to_string_pretty(credential)?;
    let tmp_path = path.with_extension("json.tmp");

    // Owner-only permissions from the start
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o600)
        .open(&tmp_path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;

    fs::rename(&tmp_path, path)?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod mocks {
    use super::*;
    use crate::ads::types::test_helpers::{mock_credential, mock_now};
    use chrono::Duration;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub(crate) struct MockOAuthFlow {
        /// Grant returned by `refresh`; `None` simulates a rejected refresh token
        pub refresh_grant: Option<TokenGrant>,
        pub authorize_fails: bool,
        /// Make `refresh` fail as if the token endpoint were unreachable
        pub refresh_unreachable: bool,
        pub refresh_calls: Arc<Mutex<usize>>,
        pub authorize_calls: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl MockOAuthFlow {
        pub(crate) fn refresh_count(&self) -> usize {
            *self.refresh_calls.lock().unwrap()
        }

        pub(crate) fn authorize_count(&self) -> usize {
            self.authorize_calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl OAuthFlow for MockOAuthFlow {
        async fn authorize(&self, client: &OAuthClient, scopes: &[&str]) -> Result<Credential> {
            self.authorize_calls
                .lock()
                .unwrap()
                .push(scopes.iter().map(|s| s.to_string()).collect());

            if self.authorize_fails {
                return Err(AppError::Auth("user cancelled".to_string()));
            }

            let mut credential = mock_credential(
                "authorized-token",
                Some("authorized-refresh"),
                Some(Utc::now() + Duration::hours(1)),
            );
            credential.client_id = client.client_id.clone();
            Ok(credential)
        }

        async fn refresh(&self, _credential: &Credential) -> Result<TokenGrant> {
            *self.refresh_calls.lock().unwrap() += 1;
            if self.refresh_unreachable {
                return Err(AppError::Auth("connection refused".to_string()));
            }
            self.refresh_grant
                .clone()
                .ok_or_else(|| AppError::Refresh("invalid_grant".to_string()))
        }
    }

    pub(crate) fn expired_credential() -> Credential {
        mock_credential("stale-token", Some("refresh"), Some(mock_now()))
    }
}
