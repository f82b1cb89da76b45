use super::output::save_json;
use crate::ads::{AdsOperations, DEFAULT_CURRENCY};
use crate::error::{AppError, Result};
use crate::models::normalize_customer_id;
use crate::report::optimize::{OptimizationTargets, analyze_campaign_performance, format_analysis};
use chrono::Local;
use clap::Args;
use std::path::Path;

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    /// Google Ads customer ID, with or without dashes
    #[arg(long)]
    pub customer_id: String,

    /// Target return on ad spend, in conversions per currency unit
    #[arg(long)]
    pub target_roas: Option<f64>,

    /// Target click-through rate in percent
    #[arg(long)]
    pub target_ctr: Option<f64>,

    /// Look-back window in days
    #[arg(long, default_value_t = 30)]
    pub days: u32,
}

impl OptimizeArgs {
    /// Analyze campaign performance and return the recommendations
    pub async fn execute<C>(&self, client: &C, output_dir: Option<&Path>) -> Result<String>
    where
        C: AdsOperations + Sync,
    {
        let data = client
            .campaign_performance(&self.customer_id, self.days)
            .await?;
        if !data.success {
            return Err(AppError::GoogleAds(
                data.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        let targets = OptimizationTargets {
            roas: self.target_roas,
            ctr: self.target_ctr,
        };
        let analysis = analyze_campaign_performance(&data.results, targets);

        if let Some(dir) = output_dir {
            let prefix = format!(
                "optimization_analysis_{}_{}days",
                normalize_customer_id(&self.customer_id),
                self.days
            );
            save_json(dir, &prefix, &analysis, Local::now())?;
        }

        let currency = client
            .account_currency(&self.customer_id)
            .await?
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        Ok(format_analysis(&analysis, &currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ads::mocks::MockAdsClient;
    use crate::models::QueryResultEnvelope;
    use crate::models::envelope::test_helpers::{mock_campaign_rows, mock_envelope};

    fn args() -> OptimizeArgs {
        OptimizeArgs {
            customer_id: "1234567890".to_string(),
            target_roas: Some(0.5),
            target_ctr: None,
            days: 30,
        }
    }

    #[tokio::test]
    async fn test_optimize_reports_recommendations() {
        let client = MockAdsClient {
            responses: vec![mock_envelope(mock_campaign_rows())],
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();

        let rendered = args().execute(&client, Some(dir.path())).await.unwrap();

        assert!(rendered.contains("  1. ROAS below target (0.08 vs 0.50)"));
        assert!(rendered.contains("Underperforming Campaigns:\n  - Brand\n  - Generic"));
        let saved: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].starts_with("optimization_analysis_1234567890_30days_"));
    }

    #[tokio::test]
    async fn test_optimize_fails_on_remote_error() {
        let client = MockAdsClient {
            responses: vec![QueryResultEnvelope::failure(
                "1234567890",
                "SELECT",
                "API Error: quota",
                Some(429),
            )],
            ..Default::default()
        };

        let err = args().execute(&client, None).await.unwrap_err();

        assert!(matches!(err, AppError::GoogleAds(ref msg) if msg == "API Error: quota"));
    }
}
