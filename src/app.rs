use std::process::ExitCode;

use tracing::{error, info};

use crate::domain::error::{AppError, Result};
use crate::infrastructure::bootstrap::{build_use_case, init_tracing};
use crate::infrastructure::config::{AppConfig, RunMode};
use crate::interfaces::{http, oneshot};

pub fn run() -> ExitCode {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            init_tracing("info");
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_filter);

    let outcome = actix_web::rt::System::new().block_on(serve(config));
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "csvbridge exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    let use_case = build_use_case(&config)?;

    match config.mode {
        RunMode::Server => {
            info!(mode = "server", "Starting csvbridge");
            http::start_server(use_case, &config.server)?
                .await
                .map_err(AppError::from)
        }
        RunMode::Oneshot => {
            info!(mode = "oneshot", "Reading request from stdin");
            oneshot::run_once(&use_case, tokio::io::stdin(), tokio::io::stdout()).await
        }
    }
}
