use crate::ads::{CredentialStore, OAuthFlow};
use crate::error::Result;
use dialoguer::Confirm;
use tracing::info;

fn confirm_reset() -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt("Delete stored Google Ads credentials and re-authorize?")
        .default(false)
        .interact()?)
}

/// Obtain credentials, optionally discarding the stored ones first, and
/// check that request headers can be built from them.
pub async fn execute<F>(store: &CredentialStore<F>, reset: bool, assume_yes: bool) -> Result<()>
where
    F: OAuthFlow + Sync,
{
    if reset {
        if !assume_yes && !confirm_reset()? {
            info!("Reset cancelled");
            return Ok(());
        }
        store.clear_credentials()?;
    }

    let credential = store.get_credentials().await?;
    store.get_headers(&credential)?;

    info!(path = ?store.token_path(), "Google Ads authentication verified");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ads::auth::mocks::MockOAuthFlow;
    use crate::ads::types::test_helpers::mock_credential;
    use crate::config::GoogleAdsConfig;
    use chrono::{Duration, Utc};
    use std::fs;

    fn mock_store(dir: &tempfile::TempDir, flow: MockOAuthFlow) -> CredentialStore<MockOAuthFlow> {
        let config = GoogleAdsConfig {
            client_id: "client.apps.googleusercontent.com".to_string(),
            client_secret: "secret".to_string(),
            developer_token: "dev-token".to_string(),
            ..Default::default()
        };
        CredentialStore::new(config, dir.path().join("google_ads_token.json"), flow)
    }

    fn seed_valid_credential(store: &CredentialStore<MockOAuthFlow>) {
        let credential = mock_credential(
            "cached-token",
            Some("refresh"),
            Some(Utc::now() + Duration::hours(1)),
        );
        fs::write(
            store.token_path(),
            serde_json::to_string(&credential).unwrap(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_auth_reuses_valid_credential() {
        let dir = tempfile::tempdir().unwrap();
        let flow = MockOAuthFlow::default();
        let store = mock_store(&dir, flow.clone());
        seed_valid_credential(&store);

        execute(&store, false, false).await.unwrap();

        assert_eq!(flow.authorize_count(), 0);
    }

    #[tokio::test]
    async fn test_auth_reset_reauthorizes() {
        let dir = tempfile::tempdir().unwrap();
        let flow = MockOAuthFlow::default();
        let store = mock_store(&dir, flow.clone());
        seed_valid_credential(&store);

        execute(&store, true, true).await.unwrap();

        assert_eq!(flow.authorize_count(), 1);
        let saved = fs::read_to_string(store.token_path()).unwrap();
        assert!(saved.contains("authorized-token"));
    }

    #[tokio::test]
    async fn test_auth_propagates_flow_failure() {
        let dir = tempfile::tempdir().unwrap();
        let flow = MockOAuthFlow {
            authorize_fails: true,
            ..Default::default()
        };
        let store = mock_store(&dir, flow);

        assert!(execute(&store, false, false).await.is_err());
        assert!(!store.token_path().exists());
    }
}
