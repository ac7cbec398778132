//! slidepdf-server binary.

use anyhow::{Context, Result};
use slidepdf_server::config::{AppConfig, ConfigError};
use slidepdf_server::{app_routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.server.log_level.as_str()),
    )
    .init();

    config
        .validate()
        .map_err(ConfigError::from)
        .context("Invalid configuration")?;
    let addr = config.server.socket_addr()?;

    let state = AppState::new(&config);
    state
        .dirs
        .ensure()
        .await
        .context("Failed to create working directories")?;

    log::info!(
        "Layout mode {}, uploads in {}, outputs in {}",
        config.render.mode,
        state.dirs.upload_dir().display(),
        state.dirs.output_dir().display()
    );

    let app = app_routes(state, config.server.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
