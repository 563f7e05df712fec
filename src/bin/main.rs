use clap::Parser;
use std::process::ExitCode;

use graduation_console::GraduationError;
use graduation_console::validation::ValidationErrors;
use graduation_console::cli::{self, Cli};
use graduation_console::{app, utils::tracing::init_standard_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_standard_tracing(env!("CARGO_CRATE_NAME"), &cli.config.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let app = app::create_app(&cli.config)?;
    cli::run(&app, cli.command).await
}

/// Field errors go one per line so the operator can fix them in one pass.
fn report(err: &anyhow::Error) {
    let errors = match err.downcast_ref::<GraduationError>() {
        Some(GraduationError::Validation(errors)) => Some(errors),
        _ => err.downcast_ref::<ValidationErrors>(),
    };
    match errors {
        Some(errors) => {
            eprintln!("error: invalid input");
            for (field, messages) in errors.fields() {
                for message in messages {
                    eprintln!("  {field}: {message}");
                }
            }
        }
        None => {
            tracing::debug!("{err:?}");
            eprintln!("error: {err:#}");
        }
    }
}
