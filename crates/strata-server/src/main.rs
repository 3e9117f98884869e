//! # Strata Server
//!
//! Serves the user API over a Postgres (or in-memory) store with a Redis
//! (or in-memory, or disabled) cache in front of it.

use strata_config::ConfigLoader;
use strata_server::{app::AppBuilder, startup::init_logging};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ConfigLoader::from_default_location() {
        Ok(loader) => loader.get().await,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.observability);

    info!("Starting {}...", config.app.name);
    info!("Version: {}", config.app.version);

    if let Err(e) = AppBuilder::new().with_config(config).run().await {
        error!("Application error: {:#}", e);
        std::process::exit(1);
    }
}
