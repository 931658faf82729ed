mod cli;
mod infra;
mod interview;
mod routes;
mod server;

use spectrum_screen::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
