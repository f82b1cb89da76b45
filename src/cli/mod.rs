mod accounts;
mod auth;
mod optimize;
mod output;
mod performance;
mod query;
mod show;

use crate::ads::{CredentialStore, GoogleAdsClient, InstalledAppFlow};
use crate::config::Config;
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use optimize::OptimizeArgs;
use performance::PerformanceArgs;
use query::QueryArgs;
use show::ShowResource;

#[derive(Parser, Debug)]
#[command(name = "google-ads-reporter")]
#[command(about = "Query and report on Google Ads accounts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding config.toml and the stored credentials
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Also save raw and formatted results under this directory
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authorize access to Google Ads and verify the stored credentials
    Auth {
        /// Delete stored credentials and authorize again
        #[arg(long)]
        reset: bool,

        /// Skip the confirmation prompt for --reset
        #[arg(long, short)]
        yes: bool,
    },
    /// List accessible customer accounts
    Accounts,
    /// Run a GAQL query or a built-in sample
    Query(QueryArgs),
    /// Campaign or ad performance for a recent window
    Performance(PerformanceArgs),
    /// Recommendations from campaign performance
    Optimize(OptimizeArgs),
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
}

fn credential_store(config: &Config) -> Result<CredentialStore<InstalledAppFlow>> {
    Ok(CredentialStore::new(
        config.google_ads.clone(),
        config.token_file(),
        InstalledAppFlow::new()?,
    ))
}

fn ads_client(config: &Config) -> Result<GoogleAdsClient<InstalledAppFlow>> {
    Ok(GoogleAdsClient::new(
        credential_store(config)?,
        config.google_ads.api_base_url(),
    ))
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        let config = Config::load(self.config_dir.as_deref())?;
        let output_dir = self.output_dir.as_deref();

        let rendered = match &self.command {
            Commands::Auth { reset, yes } => {
                return auth::execute(&credential_store(&config)?, *reset, *yes).await;
            }
            Commands::Show { resource } => return resource.execute(&config),
            Commands::Query(args) if args.list_samples => query::list_samples(),
            Commands::Accounts => accounts::execute(&ads_client(&config)?, output_dir).await?,
            Commands::Query(args) => args.execute(&ads_client(&config)?, output_dir).await?,
            Commands::Performance(args) => {
                args.execute(&ads_client(&config)?, output_dir).await?
            }
            Commands::Optimize(args) => args.execute(&ads_client(&config)?, output_dir).await?,
        };

        println!("{}", rendered);

        Ok(())
    }
}
