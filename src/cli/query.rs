use super::output::{OutputFormat, save_results};
use crate::ads::{AdsOperations, DEFAULT_CURRENCY, queries};
use crate::error::{AppError, Result};
use chrono::Local;
use clap::Args;
use std::path::Path;
use tracing::{debug, info};

#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Google Ads customer ID, with or without dashes
    #[arg(long, required_unless_present = "list_samples")]
    pub customer_id: Option<String>,

    /// GAQL query to execute
    #[arg(long, conflicts_with = "sample", required_unless_present_any = ["sample", "list_samples"])]
    pub query: Option<String>,

    /// Name of a built-in sample query
    #[arg(long)]
    pub sample: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// List the built-in sample queries and exit
    #[arg(long)]
    pub list_samples: bool,
}

pub fn list_samples() -> String {
    let mut lines = vec!["Available sample queries:".to_string()];
    for (name, query) in queries::SAMPLES {
        lines.push(String::new());
        lines.push(format!("{}:", name));
        lines.push(query.trim().to_string());
    }
    lines.join("\n")
}

impl QueryArgs {
    fn resolve_query(&self) -> Result<String> {
        if let Some(query) = &self.query {
            return Ok(query.clone());
        }

        let name = self
            .sample
            .as_deref()
            .ok_or_else(|| AppError::Config("Either --query or --sample is required".to_string()))?;

        queries::sample(name).map(str::to_string).ok_or_else(|| {
            let available: Vec<&str> = queries::SAMPLES.iter().map(|(name, _)| *name).collect();
            AppError::Config(format!(
                "Unknown sample query '{}'. Available: {}",
                name,
                available.join(", ")
            ))
        })
    }

    /// Run the query and return the rendered output
    pub async fn execute<C>(&self, client: &C, output_dir: Option<&Path>) -> Result<String>
    where
        C: AdsOperations + Sync,
    {
        if self.list_samples {
            return Ok(list_samples());
        }

        let customer_id = self
            .customer_id
            .as_deref()
            .ok_or_else(|| AppError::Config("--customer-id is required".to_string()))?;
        let query = self.resolve_query()?;
        debug!(query = %query, "Resolved GAQL query");

        let data = client.search(customer_id, &query).await?;
        info!(count = data.total_results, "Query completed");

        let currency = match self.format {
            OutputFormat::Table => client
                .account_currency(customer_id)
                .await?
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            _ => DEFAULT_CURRENCY.to_string(),
        };
        let rendered = self.format.render(&data, &currency)?;

        if let Some(dir) = output_dir {
            save_results(dir, "query_results", &data, self.format, &rendered, Local::now())?;
        }

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ads::mocks::MockAdsClient;
    use crate::models::envelope::test_helpers::mock_envelope;
    use serde_json::json;

    fn args(format: OutputFormat) -> QueryArgs {
        QueryArgs {
            customer_id: Some("123-456-7890".to_string()),
            sample: Some("campaigns".to_string()),
            format,
            ..Default::default()
        }
    }

    fn mock_client() -> MockAdsClient {
        MockAdsClient {
            responses: vec![
                mock_envelope(vec![json!({
                    "campaign": {"name": "Brand"},
                    "metrics": {"costMicros": "2500000"}
                })]),
                mock_envelope(vec![json!({"customer": {"currencyCode": "GBP"}})]),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_list_samples_names_every_sample() {
        let listing = list_samples();

        for (name, _) in queries::SAMPLES {
            assert!(listing.contains(&format!("{}:", name)));
        }
    }

    #[test]
    fn test_resolve_query_rejects_unknown_sample() {
        let args = QueryArgs {
            sample: Some("nope".to_string()),
            ..Default::default()
        };

        let err = args.resolve_query().unwrap_err();
        assert!(err.to_string().contains("Unknown sample query 'nope'"));
    }

    #[tokio::test]
    async fn test_table_uses_account_currency() {
        let client = mock_client();

        let rendered = args(OutputFormat::Table).execute(&client, None).await.unwrap();

        assert!(rendered.contains("2.50 GBP"));
        let queries = client.queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].0, "123-456-7890");
        assert_eq!(queries[0].1, queries::sample("campaigns").unwrap());
    }

    #[tokio::test]
    async fn test_csv_skips_currency_lookup_and_saves() {
        let client = mock_client();
        let dir = tempfile::tempdir().unwrap();

        let rendered = args(OutputFormat::Csv)
            .execute(&client, Some(dir.path()))
            .await
            .unwrap();

        assert_eq!(rendered, "campaign.name,metrics.costMicros\nBrand,2.5\n");
        assert_eq!(client.queries.lock().unwrap().len(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_failed_query_renders_error() {
        let client = MockAdsClient {
            responses: vec![crate::models::QueryResultEnvelope::failure(
                "1234567890",
                "SELECT",
                "API Error: bad query",
                Some(400),
            )],
            ..Default::default()
        };

        let rendered = args(OutputFormat::Table).execute(&client, None).await.unwrap();

        assert_eq!(rendered, "Error: API Error: bad query");
    }
}
