use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use askd::cli::{Cli, EnvFile};
use askd::engine::router::QueryRouter;
use askd::generator::huggingface::HuggingFaceClient;
use askd::server;

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before parsing so its values act as environment fallbacks.
    let env_file = EnvFile::load();

    let config = Cli::parse().into_config();
    init_logging(config.debug);

    env_file.log();

    info!("askd v{} starting", env!("CARGO_PKG_VERSION"));
    if config.generation.credential.is_none() {
        warn!("HUGGING_FACE_API_KEY is not set; text generation requests will fail");
    }

    let generator = Arc::new(HuggingFaceClient::new(&config.generation)?);
    info!(endpoint = generator.endpoint(), "text generation endpoint");

    let engine = Arc::new(QueryRouter::with_generator(generator));
    server::serve(&config, engine).await
}
