use crate::error::Result;
use crate::models::QueryResultEnvelope;
use crate::report::{format_as_csv, format_as_json, format_as_table};
use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table with currency and percent formatting
    #[default]
    Table,
    /// CSV with converted but unsuffixed numbers
    Csv,
    /// The raw result envelope as pretty JSON
    Json,
}

impl OutputFormat {
    pub fn render(&self, data: &QueryResultEnvelope, currency_code: &str) -> Result<String> {
        match self {
            OutputFormat::Table => Ok(format_as_table(data, currency_code)),
            OutputFormat::Csv => format_as_csv(data),
            OutputFormat::Json => format_as_json(data),
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Table => "txt",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Save the raw envelope as JSON plus the rendered output when it isn't JSON
/// already. Files are named `<prefix>_<YYYYmmdd_HHMMSS>.<ext>`.
pub fn save_results(
    dir: &Path,
    prefix: &str,
    data: &QueryResultEnvelope,
    format: OutputFormat,
    rendered: &str,
    timestamp: DateTime<Local>,
) -> Result<Vec<PathBuf>> {
    let mut saved = vec![save_json(dir, prefix, data, timestamp)?];

    if format != OutputFormat::Json {
        let path = dir.join(format!("{}.{}", stem(prefix, timestamp), format.extension()));
        fs::write(&path, rendered)?;
        info!(path = ?path, "Saved formatted results");
        saved.push(path);
    }

    Ok(saved)
}

/// Save any serializable value as `<prefix>_<YYYYmmdd_HHMMSS>.json`
pub fn save_json<T: Serialize>(
    dir: &Path,
    prefix: &str,
    value: &T,
    timestamp: DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(format!("{}.json", stem(prefix, timestamp)));
    fs::write(&path, format_as_json(value)?)?;
    info!(path = ?path, "Saved raw results");

    Ok(path)
}

fn stem(prefix: &str, timestamp: DateTime<Local>) -> String {
    format!("{}_{}", prefix, timestamp.format("%Y%m%d_%H%M%S"))
}
