use clap::Parser;
use podium::app::{App, load_config};
use podium::cli::Args;
use podium::logging::setup_logging;
use std::process::ExitCode;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Load config and setup logging before App::new() so startup logs are never silently dropped
    let config = load_config().expect("Failed to load config");
    setup_logging(&config, args.tracing);

    // Log application startup context
    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = if cfg!(debug_assertions) {
            "development"
        } else {
            "production"
        },
        "starting podium"
    );

    let app = App::new(config)
        .await
        .expect("Failed to initialize application");

    app.run().await
}
