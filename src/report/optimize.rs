use super::fields::format_currency;
use super::summary::{PerformanceTotals, RowMetrics};
use crate::models::Row;
use serde::Serialize;
use serde_json::Value;

/// Below this CTR or conversion rate (percent) a generic note is added
const LOW_RATE_PERCENT: f64 = 2.0;

/// ROAS a campaign must beat to count as a high performer when no target is set
const DEFAULT_HIGH_ROAS: f64 = 3.0;

/// Campaigns under this fraction of the target ROAS are flagged
const LOW_PERFORMER_FRACTION: f64 = 0.5;

const MAX_NAMED_CAMPAIGNS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OptimizationTargets {
    pub roas: Option<f64>,
    /// Percent, e.g. `2.5` for 2.5%
    pub ctr: Option<f64>,
}

impl OptimizationTargets {
    // A zero target means no target
    fn roas(&self) -> Option<f64> {
        self.roas.filter(|t| *t != 0.0)
    }

    fn ctr(&self) -> Option<f64> {
        self.ctr.filter(|t| *t != 0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentMetrics {
    pub roas: f64,
    pub ctr: f64,
    pub conversion_rate: f64,
    pub total_cost_micros: i64,
    pub total_conversions: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptimizationAnalysis {
    pub current_metrics: CurrentMetrics,
    pub recommendations: Vec<String>,
    pub low_performers: Vec<String>,
    pub high_performers: Vec<String>,
}

/// Conversions per currency unit spent
fn roas(conversions: f64, cost_micros: i64) -> f64 {
    match cost_micros {
        0 => 0.0,
        cost => conversions * 1_000_000.0 / cost as f64,
    }
}

fn campaign_name(row: &Row) -> String {
    row.get("campaign")
        .and_then(|campaign| campaign.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string()
}

/// Read-only analysis of campaign rows against optional targets.
pub fn analyze_campaign_performance(
    results: &[Row],
    targets: OptimizationTargets,
) -> OptimizationAnalysis {
    if results.is_empty() {
        return OptimizationAnalysis {
            recommendations: vec!["No campaign data available for analysis".to_string()],
            ..Default::default()
        };
    }

    let totals = PerformanceTotals::from_rows(results);
    let current = CurrentMetrics {
        roas: roas(totals.conversions, totals.cost_micros),
        ctr: totals.ctr(),
        conversion_rate: totals.conversion_rate(),
        total_cost_micros: totals.cost_micros,
        total_conversions: totals.conversions,
    };

    let mut recommendations = Vec::new();

    if let Some(target) = targets.roas() {
        if current.roas < target {
            recommendations.push(format!(
                "ROAS below target ({:.2} vs {:.2})",
                current.roas, target
            ));
            recommendations.push("   - Consider pausing low-performing campaigns".to_string());
            recommendations.push("   - Increase bids on high-converting keywords".to_string());
            recommendations.push("   - Review and improve ad copy".to_string());
        } else {
            recommendations.push(format!(
                "ROAS above target ({:.2} vs {:.2})",
                current.roas, target
            ));
            recommendations.push("   - Consider increasing budget for top performers".to_string());
        }
    }

    if let Some(target) = targets.ctr() {
        if current.ctr < target {
            recommendations.push(format!(
                "CTR below target ({:.2}% vs {:.2}%)",
                current.ctr, target
            ));
            recommendations.push("   - Improve ad headlines and descriptions".to_string());
            recommendations.push("   - Add more relevant keywords".to_string());
            recommendations.push("   - Use ad extensions".to_string());
        }
    }

    if current.ctr < LOW_RATE_PERCENT {
        recommendations.push("Low CTR detected - improve ad relevance".to_string());
    }
    if current.conversion_rate < LOW_RATE_PERCENT {
        recommendations.push("Low conversion rate - optimize landing pages".to_string());
    }

    let mut low_performers = Vec::new();
    let mut high_performers = Vec::new();

    for row in results {
        let metrics = RowMetrics::from_row(row);
        if metrics.cost_micros <= 0 {
            continue;
        }

        let campaign_roas = roas(metrics.conversions, metrics.cost_micros);
        match targets.roas() {
            Some(target) if campaign_roas < target * LOW_PERFORMER_FRACTION => {
                low_performers.push(campaign_name(row))
            }
            target if campaign_roas > target.unwrap_or(DEFAULT_HIGH_ROAS) => {
                high_performers.push(campaign_name(row))
            }
            _ => {}
        }
    }

    if !low_performers.is_empty() {
        recommendations.push(format!(
            "Consider pausing low performers: {}",
            named(&low_performers)
        ));
    }
    if !high_performers.is_empty() {
        recommendations.push(format!(
            "Scale up high performers: {}",
            named(&high_performers)
        ));
    }

    OptimizationAnalysis {
        current_metrics: current,
        recommendations,
        low_performers,
        high_performers,
    }
}

fn named(campaigns: &[String]) -> String {
    campaigns
        .iter()
        .take(MAX_NAMED_CAMPAIGNS)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Human-readable rendering of an analysis
pub fn format_analysis(analysis: &OptimizationAnalysis, currency_code: &str) -> String {
    let metrics = &analysis.current_metrics;

    let mut lines = vec![
        "Current Performance Metrics:".to_string(),
        format!("  ROAS: {:.2}", metrics.roas),
        format!("  CTR: {:.2}%", metrics.ctr),
        format!("  Conversion Rate: {:.2}%", metrics.conversion_rate),
        format!(
            "  Total Cost: {}",
            format_currency(metrics.total_cost_micros, currency_code)
        ),
        format!("  Total Conversions: {:.2}", metrics.total_conversions),
        String::new(),
        "Optimization Recommendations:".to_string(),
    ];
    lines.extend(
        analysis
            .recommendations
            .iter()
            .enumerate()
            .map(|(i, rec)| format!("  {}. {}", i + 1, rec)),
    );

    if !analysis.high_performers.is_empty() {
        lines.push(String::new());
        lines.push("Top Performing Campaigns:".to_string());
        lines.extend(analysis.high_performers.iter().take(5).map(|c| format!("  + {}", c)));
    }
    if !analysis.low_performers.is_empty() {
        lines.push(String::new());
        lines.push("Underperforming Campaigns:".to_string());
        lines.extend(analysis.low_performers.iter().take(5).map(|c| format!("  - {}", c)));
    }

    lines.join("\n")
}
