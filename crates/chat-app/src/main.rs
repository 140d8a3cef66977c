use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the variables may already be exported.
    let _ = dotenvy::dotenv();
    paperwhisperer::app::init_tracing();

    match paperwhisperer::app::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "paperwhisperer stopped");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
