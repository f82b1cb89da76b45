use super::AdsOperations;
use super::auth::{CredentialStore, OAuthFlow};
use super::types::{ListAccessibleCustomersResponse, SearchRequest, SearchResponse};
use crate::error::Result;
use crate::models::{Account, AccountsEnvelope, QueryResultEnvelope, normalize_customer_id};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, instrument};

pub struct GoogleAdsClient<F> {
    client: Client,
    credentials: CredentialStore<F>,
    api_base_url: String,
}

impl<F> GoogleAdsClient<F>
where
    F: OAuthFlow + Send + Sync,
{
    pub fn new(credentials: CredentialStore<F>, api_base_url: String) -> Self {
        Self {
            client: Client::new(),
            credentials,
            api_base_url,
        }
    }
}

#[async_trait]
impl<F> AdsOperations for GoogleAdsClient<F>
where
    F: OAuthFlow + Send + Sync,
{
    #[instrument(name = "Listing accessible accounts", skip_all)]
    async fn list_accounts(&self) -> Result<AccountsEnvelope> {
        let credential = self.credentials.get_credentials().await?;
        let headers = self.credentials.get_headers(&credential)?;

        let url = format!("{}/customers:listAccessibleCustomers", self.api_base_url);

        let response = match self.client.get(&url).headers(headers).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Error listing accounts");
                return Ok(AccountsEnvelope::failure(e.to_string(), None));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Ok(AccountsEnvelope::failure(
                format!("API Error: {}", body),
                Some(status.as_u16()),
            ));
        }

        let data: ListAccessibleCustomersResponse = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, "Error decoding accounts response");
                return Ok(AccountsEnvelope::failure(e.to_string(), None));
            }
        };

        let accounts = data
            .resource_names
            .iter()
            .map(|name| Account::from_resource_name(name))
            .collect();

        Ok(AccountsEnvelope::success(accounts))
    }

    #[instrument(name = "Executing GAQL query", skip_all, fields(customer_id))]
    async fn search(&self, customer_id: &str, query: &str) -> Result<QueryResultEnvelope> {
        let credential = self.credentials.get_credentials().await?;
        let headers = self.credentials.get_headers(&credential)?;

        let customer_id = normalize_customer_id(customer_id);
        tracing::Span::current().record("customer_id", customer_id.as_str());

        let url = format!(
            "{}/customers/{}/googleAds:search",
            self.api_base_url, customer_id
        );

        let response = match self
            .client
            .post(&url)
            .headers(headers)
            .json(&SearchRequest { query })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Error executing GAQL query");
                return Ok(QueryResultEnvelope::failure(
                    &customer_id,
                    query,
                    e.to_string(),
                    None,
                ));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Ok(QueryResultEnvelope::failure(
                &customer_id,
                query,
                format!("API Error: {}", body),
                Some(status.as_u16()),
            ));
        }

        let data: SearchResponse = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, "Error decoding search response");
                return Ok(QueryResultEnvelope::failure(
                    &customer_id,
                    query,
                    e.to_string(),
                    None,
                ));
            }
        };

        Ok(QueryResultEnvelope::success(
            &customer_id,
            query,
            data.results,
        ))
    }
}
