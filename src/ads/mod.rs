pub mod auth;
mod client;
mod flow;
pub mod queries;
pub mod types;

pub use auth::{CredentialStore, OAuthFlow};
pub use client::GoogleAdsClient;
pub use flow::InstalledAppFlow;

use crate::error::Result;
use crate::models::{AccountsEnvelope, QueryResultEnvelope};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};

/// Currency assumed when the account's own cannot be determined
pub const DEFAULT_CURRENCY: &str = "USD";

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Read-only Google Ads operations.
///
/// Remote failures come back as envelopes with `success == false`; only
/// configuration and authorization problems are `Err`.
#[async_trait]
pub trait AdsOperations {
    async fn list_accounts(&self) -> Result<AccountsEnvelope>;

    async fn search(&self, customer_id: &str, query: &str) -> Result<QueryResultEnvelope>;

    async fn campaign_performance(
        &self,
        customer_id: &str,
        days: u32,
    ) -> Result<QueryResultEnvelope> {
        self.search(customer_id, &queries::campaign_performance(days, today()))
            .await
    }

    async fn ad_performance(&self, customer_id: &str, days: u32) -> Result<QueryResultEnvelope> {
        self.search(customer_id, &queries::ad_performance(days, today()))
            .await
    }

    /// The account's currency code, or `None` if it could not be read
    async fn account_currency(&self, customer_id: &str) -> Result<Option<String>> {
        let result = self
            .search(customer_id, queries::ACCOUNT_CURRENCY_QUERY)
            .await?;

        let currency = result
            .results
            .first()
            .filter(|_| result.success)
            .and_then(|row| row.get("customer"))
            .and_then(|customer| {
                customer
                    .get("currencyCode")
                    .or_else(|| customer.get("currency_code"))
            })
            .and_then(|code| code.as_str())
            .map(str::to_string);

        Ok(currency)
    }
}
