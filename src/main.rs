//! HTTP service for the Promotion Allocation Engine.

use std::path::PathBuf;

use clap::Parser;
use promotion_engine::api::{AppState, create_router};
use promotion_engine::config::ConfigLoader;
use promotion_engine::telemetry;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "promotion-engine",
    about = "Serve the promotion allocation engine over HTTP",
    version
)]
struct Cli {
    /// Scale configuration directory
    #[arg(long, env = "PROMOTION_ENGINE_CONFIG_DIR", default_value = "./config/conraiss")]
    config_dir: PathBuf,
    /// Host to bind the HTTP server to
    #[arg(long, env = "PROMOTION_ENGINE_HOST", default_value = "127.0.0.1")]
    host: String,
    /// Port to bind the HTTP server to
    #[arg(long, env = "PROMOTION_ENGINE_PORT", default_value_t = 3000)]
    port: u16,
    /// Default log filter when RUST_LOG is not set
    #[arg(long, env = "PROMOTION_ENGINE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    let config = ConfigLoader::load(&cli.config_dir)?;
    info!(
        config_dir = %cli.config_dir.display(),
        scale = %config.scale().code,
        version = %config.scale().version,
        salary_tables = config.config().salary_tables().len(),
        cycles = config.config().vacancies().len(),
        "Configuration loaded"
    );

    let app = create_router(AppState::new(config));
    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Promotion engine listening");

    axum::serve(listener, app).await?;
    Ok(())
}
