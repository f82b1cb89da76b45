use super::fields::format_currency;
use crate::models::{QueryResultEnvelope, Row};
use chrono::{DateTime, Local};
use serde_json::Value;

/// Metric totals accumulated across result rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceTotals {
    pub impressions: i64,
    pub clicks: i64,
    pub cost_micros: i64,
    pub conversions: f64,
}

impl PerformanceTotals {
    pub fn from_rows(rows: &[Row]) -> Self {
        rows.iter()
            .map(RowMetrics::from_row)
            .fold(Self::default(), |mut totals, row| {
                totals.impressions += row.impressions;
                totals.clicks += row.clicks;
                totals.cost_micros += row.cost_micros;
                totals.conversions += row.conversions;
                totals
            })
    }

    /// Click-through rate in percent
    pub fn ctr(&self) -> f64 {
        match self.impressions {
            0 => 0.0,
            n => self.clicks as f64 / n as f64 * 100.0,
        }
    }

    /// Average cost per click in micros
    pub fn cpc_micros(&self) -> f64 {
        match self.clicks {
            0 => 0.0,
            n => self.cost_micros as f64 / n as f64,
        }
    }

    /// Conversions per click in percent
    pub fn conversion_rate(&self) -> f64 {
        match self.clicks {
            0 => 0.0,
            n => self.conversions / n as f64 * 100.0,
        }
    }
}

/// The `metrics` block of one row. Missing or unparseable values count as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct RowMetrics {
    pub(super) impressions: i64,
    pub(super) clicks: i64,
    pub(super) cost_micros: i64,
    pub(super) conversions: f64,
}

impl RowMetrics {
    pub(super) fn from_row(row: &Row) -> Self {
        let metrics = row.get("metrics").and_then(Value::as_object);
        let metric = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| metrics.and_then(|m| m.get(*key)))
                .and_then(number)
                .unwrap_or(0.0)
        };

        RowMetrics {
            impressions: metric(&["impressions"]) as i64,
            clicks: metric(&["clicks"]) as i64,
            cost_micros: metric(&["costMicros", "cost_micros"]) as i64,
            conversions: metric(&["conversions"]),
        }
    }
}

/// The REST API encodes int64 metrics as strings and doubles as numbers
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `1234567` renders as `"1,234,567"`
fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Capitalise the first letter of every word: `"ad group"` becomes `"Ad Group"`
fn title_case(s: &str) -> String {
    let mut previous_is_letter = false;
    s.chars()
        .map(|c| {
            let mapped = match previous_is_letter {
                true => c.to_lowercase().collect::<String>(),
                false => c.to_uppercase().collect::<String>(),
            };
            previous_is_letter = c.is_alphabetic();
            mapped
        })
        .collect()
}

/// Fixed-layout performance summary for a report type such as `campaign` or `ad`.
pub fn create_summary_report(
    data: &QueryResultEnvelope,
    report_type: &str,
    currency_code: &str,
    generated_at: DateTime<Local>,
) -> String {
    if !data.success {
        return format!(
            "Error generating {} report: {}",
            report_type,
            data.error.as_deref().unwrap_or("Unknown error")
        );
    }
    if data.results.is_empty() {
        return format!("No {} data found.", report_type);
    }

    let totals = PerformanceTotals::from_rows(&data.results);
    let customer_id = match data.customer_id.is_empty() {
        true => "Unknown",
        false => data.customer_id.as_str(),
    };

    [
        format!("{} Performance Summary", title_case(report_type)),
        "=".repeat(50),
        format!("Customer ID: {}", customer_id),
        format!("Total {}s: {}", report_type, data.results.len()),
        String::new(),
        "Overall Metrics:".to_string(),
        format!("  Total Impressions: {}", group_thousands(totals.impressions)),
        format!("  Total Clicks: {}", group_thousands(totals.clicks)),
        format!(
            "  Total Cost: {}",
            format_currency(totals.cost_micros, currency_code)
        ),
        format!("  Total Conversions: {:.2}", totals.conversions),
        String::new(),
        "Average Metrics:".to_string(),
        format!("  CTR: {:.2}%", totals.ctr()),
        format!(
            "  CPC: {}",
            format_currency(totals.cpc_micros() as i64, currency_code)
        ),
        format!("  Conversion Rate: {:.2}%", totals.conversion_rate()),
        String::new(),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
    ]
    .join("\n")
}
