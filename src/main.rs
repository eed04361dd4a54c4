use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match rxcheck_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Startup failed: {e}");
            eprintln!("rxcheck: {e}");
            ExitCode::FAILURE
        }
    }
}
