//! Command line surface of the console

pub mod batches;
pub mod certificates;
pub mod templates;

use clap::{Args, Parser, Subcommand};

use crate::app::ConsoleApp;
use crate::config::Config;
use crate::numbering::CertificateNumberConfig;
use crate::validation::ValidationErrors;

#[derive(Debug, Parser)]
#[command(name = "graduation_console", version, about = "Graduation batches and certificates")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Graduation batches
    #[command(subcommand)]
    Batches(batches::BatchCommand),
    /// Issued certificates
    #[command(subcommand)]
    Certificates(certificates::CertificateCommand),
    /// Certificate templates
    #[command(subcommand)]
    Templates(templates::TemplateCommand),
}

/// Certificate numbering flags; anything left out uses the default
#[derive(Debug, Clone, Default, Args)]
pub struct NumberingArgs {
    #[arg(long)]
    pub prefix: Option<String>,
    #[arg(long)]
    pub certificate_type: Option<String>,
    /// Omit to continue after the last issued number
    #[arg(long)]
    pub starting_number: Option<u64>,
    #[arg(long)]
    pub padding: Option<usize>,
}

impl NumberingArgs {
    pub fn to_config(&self) -> Result<CertificateNumberConfig, ValidationErrors> {
        CertificateNumberConfig::from_user_input(
            self.prefix.as_deref(),
            self.certificate_type.as_deref(),
            self.starting_number,
            self.padding,
        )
    }
}

pub async fn run(app: &ConsoleApp, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Batches(cmd) => batches::run(app, cmd).await,
        Command::Certificates(cmd) => certificates::run(app, cmd).await,
        Command::Templates(cmd) => templates::run(app, cmd).await,
    }
}
