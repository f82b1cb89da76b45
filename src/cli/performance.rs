use super::output::{OutputFormat, save_results};
use crate::ads::{AdsOperations, DEFAULT_CURRENCY};
use crate::error::Result;
use crate::models::normalize_customer_id;
use crate::report::create_summary_report;
use chrono::Local;
use clap::{Args, ValueEnum};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportType {
    #[default]
    Campaign,
    Ad,
}

impl ReportType {
    fn name(&self) -> &'static str {
        match self {
            ReportType::Campaign => "campaign",
            ReportType::Ad => "ad",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PerformanceArgs {
    /// Google Ads customer ID, with or without dashes
    #[arg(long)]
    pub customer_id: String,

    #[arg(long = "type", value_enum, default_value_t = ReportType::Campaign)]
    pub report_type: ReportType,

    /// Look-back window in days
    #[arg(long, default_value_t = 30)]
    pub days: u32,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl PerformanceArgs {
    /// Fetch the performance report; table output is followed by a summary
    pub async fn execute<C>(&self, client: &C, output_dir: Option<&Path>) -> Result<String>
    where
        C: AdsOperations + Sync,
    {
        let data = match self.report_type {
            ReportType::Campaign => {
                client
                    .campaign_performance(&self.customer_id, self.days)
                    .await?
            }
            ReportType::Ad => client.ad_performance(&self.customer_id, self.days).await?,
        };
        info!(
            report = self.report_type.name(),
            count = data.total_results,
            "Performance report fetched"
        );

        let rendered = match self.format {
            OutputFormat::Table => {
                let currency = client
                    .account_currency(&self.customer_id)
                    .await?
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
                let table = self.format.render(&data, &currency)?;
                let summary =
                    create_summary_report(&data, self.report_type.name(), &currency, Local::now());
                format!("{}\n\n{}", table, summary)
            }
            format => format.render(&data, DEFAULT_CURRENCY)?,
        };

        if let Some(dir) = output_dir {
            let prefix = format!(
                "{}_performance_{}_{}days",
                self.report_type.name(),
                normalize_customer_id(&self.customer_id),
                self.days
            );
            save_results(dir, &prefix, &data, self.format, &rendered, Local::now())?;
        }

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ads::mocks::MockAdsClient;
    use crate::models::envelope::test_helpers::{mock_campaign_rows, mock_envelope};
    use serde_json::json;

    fn args(report_type: ReportType, format: OutputFormat) -> PerformanceArgs {
        PerformanceArgs {
            customer_id: "1234567890".to_string(),
            report_type,
            days: 7,
            format,
        }
    }

    #[tokio::test]
    async fn test_campaign_table_includes_summary() {
        let client = MockAdsClient {
            responses: vec![
                mock_envelope(mock_campaign_rows()),
                mock_envelope(vec![json!({"customer": {"currencyCode": "EUR"}})]),
            ],
            ..Default::default()
        };

        let rendered = args(ReportType::Campaign, OutputFormat::Table)
            .execute(&client, None)
            .await
            .unwrap();

        assert!(rendered.starts_with("Results for Customer ID: 1234567890"));
        assert!(rendered.contains("Campaign Performance Summary"));
        assert!(rendered.contains("  Total Cost: 70.00 EUR"));
        let queries = client.queries.lock().unwrap();
        assert!(queries[0].1.contains("LAST_7_DAYS"));
        assert!(queries[0].1.contains("FROM campaign"));
    }

    #[tokio::test]
    async fn test_ad_json_has_no_summary() {
        let client = MockAdsClient {
            responses: vec![mock_envelope(vec![json!({"adGroupAd": {"status": "ENABLED"}})])],
            ..Default::default()
        };

        let rendered = args(ReportType::Ad, OutputFormat::Json)
            .execute(&client, None)
            .await
            .unwrap();

        assert!(!rendered.contains("Performance Summary"));
        let queries = client.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].1.contains("FROM ad_group_ad"));
    }
}
