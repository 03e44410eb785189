//! presentos CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use presentos_core::tracing::{TracingConfig, init_tracing};

use presentos_client::cli::{Cli, Command, GoalsAction};
use presentos_client::config::ClientConfig;
use presentos_client::error::{ClientError, ClientResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };

    match cli.command {
        Some(Command::Login {
            client_id,
            client_secret,
            credentials_file,
            force,
        }) => {
            presentos_client::commands::login::run(
                client_id,
                client_secret,
                credentials_file,
                force,
                &config,
            )
            .await
        }
        Some(Command::Logout) => presentos_client::commands::logout::run(&config).await,
        Some(Command::Goals { action }) => match action {
            GoalsAction::List => presentos_client::commands::goals::list(&config).await,
            GoalsAction::Create {
                name,
                description,
                avatar,
            } => {
                presentos_client::commands::goals::create(name, description, avatar, &config).await
            }
        },
        Some(Command::Schedule {
            goal,
            prompt,
            personality,
        }) => presentos_client::commands::schedule::run(goal, prompt, personality, &config).await,
        Some(Command::Status) => presentos_client::commands::status::run(&config).await,
        Some(Command::Dashboard) | None => presentos_client::commands::dashboard::run(&config).await,
    }
}
