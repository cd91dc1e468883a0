mod cli;
mod infra;
mod routes;
mod server;

use le_marche::error::AppError;
use le_marche::reference::ReferenceError;

/// Parse the command line and run it. Returns the process exit code.
pub async fn run() -> Result<i32, AppError> {
    cli::run().await
}

/// Missing reference data is a fatal precondition; everything else is a plain failure.
pub fn exit_code(err: &AppError) -> i32 {
    match err {
        AppError::Reference(ReferenceError::ReferenceDataMissing(_)) => 2,
        _ => 1,
    }
}
