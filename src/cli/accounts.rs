use super::output::save_json;
use crate::ads::AdsOperations;
use crate::error::Result;
use crate::report::format_accounts_list;
use chrono::Local;
use std::path::Path;

/// List the accounts the authorized user can access
pub async fn execute<C>(client: &C, output_dir: Option<&Path>) -> Result<String>
where
    C: AdsOperations + Sync,
{
    let accounts = client.list_accounts().await?;

    if let Some(dir) = output_dir {
        save_json(dir, "accounts", &accounts, Local::now())?;
    }

    Ok(format_accounts_list(&accounts))
}
