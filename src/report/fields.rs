use crate::models::Row;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

/// Scale of a micros amount: 1,000,000 micros per currency unit
const MICROS_SCALE: u32 = 6;

/// Flatten the first row's keys into dotted field paths.
///
/// Only the first row is inspected: later rows with extra keys are truncated
/// to this schema and rows missing a field render it as empty.
pub fn extract_fields(results: &[Row]) -> Vec<String> {
    let Some(first) = results.first() else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    for (key, value) in first {
        match value {
            Value::Object(nested) => {
                fields.extend(nested.keys().map(|subkey| format!("{}.{}", key, subkey)))
            }
            _ => fields.push(key.clone()),
        }
    }
    fields
}

/// Resolve `parent.child` or a top-level key to its display string.
/// Missing fields resolve to an empty string.
pub fn get_field_value(row: &Row, field: &str) -> String {
    let value = match field.split_once('.') {
        Some((parent, child)) => row
            .get(parent)
            .and_then(Value::as_object)
            .and_then(|nested| nested.get(child)),
        None => row.get(field),
    };

    value.map(display_value).unwrap_or_default()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `2_500_000` micros in `"EUR"` renders as `"2.50 EUR"`. Half cents round
/// away from zero.
pub fn format_currency(micros: i64, currency_code: &str) -> String {
    let amount = Decimal::new(micros, MICROS_SCALE)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2} {}", amount, currency_code)
}

/// `0.0256` renders as `"2.56%"`
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

// The REST API reports metrics in camelCase, GAQL field lists in snake_case
fn is_cost_field(field: &str) -> bool {
    field.contains("cost_micros") || field.contains("costMicros")
}

fn is_ctr_field(field: &str) -> bool {
    field.contains("ctr")
}

fn is_ascii_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Whole micros amount, if the value is nothing but digits
fn parse_micros(value: &str) -> Option<i64> {
    is_ascii_digits(value).then(|| value.parse().ok()).flatten()
}

/// Unsigned decimal ratio such as `0.05`
fn is_ratio(value: &str) -> bool {
    is_ascii_digits(&value.replace('.', ""))
}

/// Value as shown in table output: currency and percent suffixes applied
pub(super) fn table_value(field: &str, value: String, currency_code: &str) -> String {
    if is_cost_field(field) {
        if let Some(micros) = parse_micros(&value) {
            return format_currency(micros, currency_code);
        }
    } else if is_ctr_field(field) && is_ratio(&value) {
        if let Ok(ratio) = value.parse::<f64>() {
            return format_percentage(ratio);
        }
    }
    value
}

/// Value as written to CSV: converted, but left as a bare exact decimal
/// (`2`, `1.5`), not a float string such as `2.0`.
pub(super) fn csv_value(field: &str, value: String) -> String {
    if is_cost_field(field) {
        if let Some(micros) = parse_micros(&value) {
            return Decimal::new(micros, MICROS_SCALE).normalize().to_string();
        }
    } else if is_ctr_field(field) && is_ratio(&value) {
        if let Ok(ratio) = Decimal::from_str(&value) {
            return (ratio * Decimal::ONE_HUNDRED).normalize().to_string();
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::envelope::test_helpers::mock_row;
    use serde_json::json;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0, "USD"), "0.00 USD");
        assert_eq!(format_currency(1_500_000, "EUR"), "1.50 EUR");
        assert_eq!(format_currency(2_000_000, "USD"), "2.00 USD");
        assert_eq!(format_currency(123_456_789, "GBP"), "123.46 GBP");
        assert_eq!(format_currency(4_999, "USD"), "0.00 USD");
    }

    #[test]
    fn test_format_currency_rounds_half_cents_up() {
        assert_eq!(format_currency(5_000, "USD"), "0.01 USD");
        assert_eq!(format_currency(15_000, "USD"), "0.02 USD");
        assert_eq!(format_currency(25_000, "USD"), "0.03 USD");
        assert_eq!(format_currency(2_345_000, "USD"), "2.35 USD");
        assert_eq!(format_currency(-5_000, "USD"), "-0.01 USD");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.0256), "2.56%");
        assert_eq!(format_percentage(0.05), "5.00%");
        assert_eq!(format_percentage(0.0), "0.00%");
    }

    #[test]
    fn test_extract_fields_flattens_nested_objects() {
        let rows = vec![mock_row(json!({
            "campaign": {"name": "A"},
            "metrics": {"cost_micros": "2000000", "ctr": "0.05"}
        }))];

        assert_eq!(
            extract_fields(&rows),
            vec!["campaign.name", "metrics.cost_micros", "metrics.ctr"]
        );
    }

    #[test]
    fn test_extract_fields_keeps_scalars_and_uses_first_row_only() {
        let rows = vec![
            mock_row(json!({"resourceName": "customers/1", "campaign": {"id": "7"}})),
            mock_row(json!({"campaign": {"id": "8", "name": "ignored"}, "extra": 1})),
        ];

        assert_eq!(extract_fields(&rows), vec!["resourceName", "campaign.id"]);
        assert!(extract_fields(&[]).is_empty());
    }

    #[test]
    fn test_get_field_value() {
        let row = mock_row(json!({
            "campaign": {"name": "Brand", "id": 42, "active": true, "budget": null},
            "metrics": {"ctr": 0.05},
            "flat": "value",
            "scalar_parent": "x"
        }));

        assert_eq!(get_field_value(&row, "campaign.name"), "Brand");
        assert_eq!(get_field_value(&row, "campaign.id"), "42");
        assert_eq!(get_field_value(&row, "campaign.active"), "true");
        assert_eq!(get_field_value(&row, "campaign.budget"), "");
        assert_eq!(get_field_value(&row, "metrics.ctr"), "0.05");
        assert_eq!(get_field_value(&row, "flat"), "value");
        assert_eq!(get_field_value(&row, "campaign.missing"), "");
        assert_eq!(get_field_value(&row, "missing"), "");
        assert_eq!(get_field_value(&row, "scalar_parent.child"), "");
    }

    #[test]
    fn test_get_field_value_splits_on_first_dot() {
        let row = mock_row(json!({"ad_group_ad": {"ad.id": "9"}}));
        assert_eq!(get_field_value(&row, "ad_group_ad.ad.id"), "9");
    }

    #[test]
    fn test_table_value_transforms() {
        assert_eq!(
            table_value("metrics.cost_micros", "2000000".to_string(), "USD"),
            "2.00 USD"
        );
        assert_eq!(
            table_value("metrics.costMicros", "0".to_string(), "EUR"),
            "0.00 EUR"
        );
        assert_eq!(table_value("metrics.ctr", "0.05".to_string(), "USD"), "5.00%");
        // Not purely digits: left alone
        assert_eq!(
            table_value("metrics.cost_micros", "-5".to_string(), "USD"),
            "-5"
        );
        assert_eq!(table_value("metrics.ctr", "".to_string(), "USD"), "");
        assert_eq!(table_value("metrics.ctr", "1.2.3".to_string(), "USD"), "1.2.3");
        assert_eq!(table_value("campaign.name", "100".to_string(), "USD"), "100");
    }

    #[test]
    fn test_csv_value_transforms() {
        assert_eq!(csv_value("metrics.cost_micros", "2000000".to_string()), "2");
        assert_eq!(csv_value("metrics.cost_micros", "1500000".to_string()), "1.5");
        assert_eq!(csv_value("metrics.ctr", "0.05".to_string()), "5");
        assert_eq!(csv_value("metrics.ctr", "0.0256".to_string()), "2.56");
        assert_eq!(csv_value("campaign.name", "Brand".to_string()), "Brand");
    }
}
