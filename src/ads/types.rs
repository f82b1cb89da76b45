use crate::config::{GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL};
use crate::models::Row;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Refresh this long before the recorded expiry
const EXPIRY_BUFFER_SECS: i64 = 300;

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// OAuth client registration (an "installed application" in Google Cloud)
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

/// Persisted OAuth2 credential.
///
/// Field names match the authorized-user JSON written by Google's auth
/// libraries, so existing token files load as-is.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Credential {
    #[serde(rename = "token", alias = "access_token")]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub scopes: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URL.to_string()
}

impl Credential {
    /// Build a credential from a token grant issued to `client`
    pub fn from_grant(
        client: &OAuthClient,
        scopes: BTreeSet<String>,
        grant: TokenGrant,
        now: DateTime<Utc>,
    ) -> Self {
        let mut credential = Credential {
            access_token: String::new(),
            refresh_token: None,
            token_uri: client.token_uri.clone(),
            auth_uri: client.auth_uri.clone(),
            client_id: client.client_id.clone(),
            client_secret: client.client_secret.clone(),
            scopes,
            expiry: None,
        };
        credential.apply_grant(grant, now);
        credential
    }

    pub fn oauth_client(&self) -> OAuthClient {
        OAuthClient {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            auth_uri: self.auth_uri.clone(),
            token_uri: self.token_uri.clone(),
        }
    }

    /// Expired once within the refresh buffer of `expiry`; no expiry means never
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|expiry| expiry <= now + Duration::seconds(EXPIRY_BUFFER_SECS))
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && !self.is_expired_at(now)
    }

    /// Replace the access token and expiry in place.
    ///
    /// The refresh token is only replaced when the endpoint rotated it.
    pub fn apply_grant(&mut self, grant: TokenGrant, now: DateTime<Utc>) {
        let expires_in = grant.expires_in_secs.unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        self.access_token = grant.access_token;
        self.expiry = Some(now + Duration::seconds(expires_in));
        if let Some(refresh_token) = grant.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
    }
}

/// Token endpoint response, reduced to what the credential keeps
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in_secs: Option<i64>,
}

/// Where a loaded credential stands before any network call
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialState {
    NoCredential,
    Expired(Credential),
    Valid(Credential),
}

impl CredentialState {
    pub fn classify(credential: Option<Credential>, now: DateTime<Utc>) -> Self {
        match credential {
            Some(c) if c.is_valid_at(now) => CredentialState::Valid(c),
            Some(c) if c.refresh_token.as_deref().is_some_and(|t| !t.is_empty()) => {
                CredentialState::Expired(c)
            }
            _ => CredentialState::NoCredential,
        }
    }
}

// https://developers.google.com/google-ads/api/rest/reference/rest/latest/customers/listAccessibleCustomers
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListAccessibleCustomersResponse {
    #[serde(default)]
    pub(super) resource_names: Vec<String>,
}

// https://developers.google.com/google-ads/api/rest/reference/rest/latest/customers.googleAds/search
#[derive(Debug, Serialize)]
pub(super) struct SearchRequest<'a> {
    pub(super) query: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    #[serde(default)]
    pub(super) results: Vec<Row>,
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;
    use chrono::TimeZone;

    pub(crate) use crate::ads::auth::ADWORDS_SCOPE;

    pub(crate) fn mock_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
    }

    pub(crate) fn mock_client() -> OAuthClient {
        OAuthClient {
            client_id: "client.apps.googleusercontent.com".to_string(),
            client_secret: "secret".to_string(),
            auth_uri: GOOGLE_AUTH_URL.to_string(),
            token_uri: GOOGLE_TOKEN_URL.to_string(),
        }
    }

    pub(crate) fn mock_credential(
        access_token: &str,
        refresh_token: Option<&str>,
        expiry: Option<DateTime<Utc>>,
    ) -> Credential {
        let client = mock_client();
        Credential {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.map(str::to_string),
            token_uri: client.token_uri,
            auth_uri: client.auth_uri,
            client_id: client.client_id,
            client_secret: client.client_secret,
            scopes: BTreeSet::from([ADWORDS_SCOPE.to_string()]),
            expiry,
        }
    }
}
