use std::error::Error;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file.
    // Fails if .env file not found, not readable or invalid.
    dotenvy::dotenv()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,kb_ai_backend=info"))
        .unwrap();

    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("starting kb-ai-backend");

    api::start().await?;

    Ok(())
}
