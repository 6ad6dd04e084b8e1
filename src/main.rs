use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use elixir::api;
use elixir::config::{self, AppConfig};
use elixir::core_state::CoreState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Elixir starting v{}", config::APP_VERSION);

    let app_config = AppConfig::from_env()?;
    let bind = app_config.bind;

    let core = Arc::new(CoreState::new(app_config));
    let router = api::api_router(core);

    api::server::serve(bind, router).await?;

    Ok(())
}
