mod batch;
mod cli;
mod demo;
mod infra;
mod interview;
mod routes;
mod server;

use loan_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
