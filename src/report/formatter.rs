use super::fields::{csv_value, extract_fields, get_field_value, table_value};
use crate::error::{AppError, Result};
use crate::models::{AccountsEnvelope, QueryResultEnvelope};
use serde::Serialize;

const UNKNOWN_ERROR: &str = "Unknown error";

fn error_message(error: &Option<String>) -> &str {
    error.as_deref().unwrap_or(UNKNOWN_ERROR)
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Render query results as an aligned text table.
pub fn format_as_table(data: &QueryResultEnvelope, currency_code: &str) -> String {
    if !data.success {
        return format!("Error: {}", error_message(&data.error));
    }
    if data.results.is_empty() {
        return "No results found.".to_string();
    }

    let fields = extract_fields(&data.results);

    let rows: Vec<Vec<String>> = data
        .results
        .iter()
        .map(|row| {
            fields
                .iter()
                .map(|field| table_value(field, get_field_value(row, field), currency_code))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .fold(field.chars().count(), usize::max)
        })
        .collect();

    let customer_id = match data.customer_id.is_empty() {
        true => "Unknown",
        false => data.customer_id.as_str(),
    };
    let header = join_padded(&fields, &widths);

    let mut lines = Vec::with_capacity(rows.len() + 6);
    lines.push(format!("Results for Customer ID: {}", customer_id));
    lines.push("=".repeat(80));
    lines.push(header.clone());
    lines.push("-".repeat(header.chars().count()));
    lines.extend(rows.iter().map(|row| join_padded(row, &widths)));
    lines.push(String::new());
    lines.push(format!("Total results: {}", data.results.len()));

    lines.join("\n")
}

/// Render query results as CSV with unit conversions but no unit suffixes.
///
/// Failure and empty sentinels differ from the table ones and are not CSV-escaped.
pub fn format_as_csv(data: &QueryResultEnvelope) -> Result<String> {
    if !data.success {
        return Ok(format!("Error,{}", error_message(&data.error)));
    }
    if data.results.is_empty() {
        return Ok("No results found".to_string());
    }

    let fields = extract_fields(&data.results);

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);

    writer.write_record(&fields)?;
    for row in &data.results {
        writer.write_record(
            fields
                .iter()
                .map(|field| csv_value(field, get_field_value(row, field))),
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Other(anyhow::anyhow!("Failed to get CSV data: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Other(anyhow::anyhow!("Invalid UTF-8: {}", e)))
}

/// Pretty JSON with two-space indentation
pub fn format_as_json<T: Serialize>(data: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub fn format_accounts_list(data: &AccountsEnvelope) -> String {
    if !data.success {
        return format!("Error: {}", error_message(&data.error));
    }
    if data.accounts.is_empty() {
        return "No accessible accounts found.".to_string();
    }

    let mut lines = vec![
        "Accessible Google Ads Accounts:".to_string(),
        "=".repeat(50),
    ];
    for (i, account) in data.accounts.iter().enumerate() {
        lines.push(format!("{}. Account ID: {}", i + 1, account.customer_id));
    }
    lines.push(String::new());
    lines.push(format!("Total accounts: {}", data.accounts.len()));

    lines.join("\n")
}
