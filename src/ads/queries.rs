//! Canned GAQL queries. Queries are opaque strings; nothing here validates them.

use chrono::{Days, NaiveDate};

pub const ACCOUNT_CURRENCY_QUERY: &str = "
    SELECT
        customer.id,
        customer.currency_code
    FROM customer
    LIMIT 1
";

/// Date filter covering the `days` complete days before `today`.
///
/// `DURING` only accepts a fixed set of literals; other windows become an
/// explicit `BETWEEN` range.
fn date_filter(days: u32, today: NaiveDate) -> String {
    match days {
        7 | 14 | 30 => format!("segments.date DURING LAST_{}_DAYS", days),
        _ => {
            let start = today - Days::new(u64::from(days.max(1)));
            let end = today - Days::new(1);
            format!(
                "segments.date BETWEEN '{}' AND '{}'",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            )
        }
    }
}

pub fn campaign_performance(days: u32, today: NaiveDate) -> String {
    let date_filter = date_filter(days, today);
    format!(
        "
    SELECT
        campaign.id,
        campaign.name,
        campaign.status,
        metrics.impressions,
        metrics.clicks,
        metrics.cost_micros,
        metrics.conversions,
        metrics.average_cpc
    FROM campaign
    WHERE {date_filter}
    ORDER BY metrics.cost_micros DESC
    LIMIT 50
"
    )
}

pub fn ad_performance(days: u32, today: NaiveDate) -> String {
    let date_filter = date_filter(days, today);
    format!(
        "
    SELECT
        ad_group_ad.ad.id,
        ad_group_ad.ad.name,
        ad_group_ad.status,
        campaign.name,
        ad_group.name,
        metrics.impressions,
        metrics.clicks,
        metrics.cost_micros,
        metrics.conversions
    FROM ad_group_ad
    WHERE {date_filter}
    ORDER BY metrics.impressions DESC
    LIMIT 50
"
    )
}

/// Named example queries offered by `query --sample`
pub const SAMPLES: &[(&str, &str)] = &[
    (
        "campaigns",
        "
    SELECT
        campaign.id,
        campaign.name,
        campaign.status,
        metrics.impressions,
        metrics.clicks,
        metrics.cost_micros
    FROM campaign
    WHERE segments.date DURING LAST_30_DAYS
    ORDER BY metrics.cost_micros DESC
    LIMIT 10
",
    ),
    (
        "keywords",
        "
    SELECT
        keyword.text,
        keyword.match_type,
        metrics.impressions,
        metrics.clicks,
        metrics.cost_micros,
        metrics.conversions
    FROM keyword_view
    WHERE segments.date DURING LAST_30_DAYS
    ORDER BY metrics.clicks DESC
    LIMIT 20
",
    ),
    (
        "ads",
        "
    SELECT
        ad_group_ad.ad.id,
        ad_group_ad.ad.name,
        campaign.name,
        ad_group.name,
        metrics.impressions,
        metrics.clicks,
        metrics.conversions
    FROM ad_group_ad
    WHERE segments.date DURING LAST_30_DAYS
    AND metrics.impressions > 100
    ORDER BY metrics.clicks DESC
    LIMIT 15
",
    ),
    (
        "account_info",
        "
    SELECT
        customer.id,
        customer.currency_code,
        customer.time_zone,
        customer.descriptive_name
    FROM customer
    LIMIT 1
",
    ),
];

pub fn sample(name: &str) -> Option<&'static str> {
    SAMPLES
        .iter()
        .find(|(sample_name, _)| *sample_name == name)
        .map(|(_, query)| *query)
}
