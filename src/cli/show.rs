use crate::config::Config;
use crate::error::Result;
use clap::Subcommand;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ShowResource {
    /// Show configuration and credential paths
    Paths,
}

impl ShowResource {
    pub fn execute(&self, config: &Config) -> Result<()> {
        match self {
            ShowResource::Paths => show_paths(config),
        }
    }
}

fn show_paths(config: &Config) -> Result<()> {
    info!(path = ?config.config_file(), "Config path");
    info!(path = ?config.token_file(), "Credentials path");

    Ok(())
}
