mod cli;
mod demo;
mod infra;
mod predict;
mod routes;
mod server;

use eyecare_risk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
