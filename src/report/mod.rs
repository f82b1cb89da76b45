mod fields;
mod formatter;
pub mod optimize;
mod summary;

pub use formatter::{format_accounts_list, format_as_csv, format_as_json, format_as_table};
pub use summary::create_summary_report;
