//! Service configuration
//!
//! Loaded from environment variables with the `SLIDEPDF` prefix; nested
//! values are separated by a double underscore. A `.env` file in the working
//! directory is read first when present.
//!
//! ```no_run
//! use slidepdf_server::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod render;
mod server;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use render::RenderConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

const ENV_PREFIX: &str = "SLIDEPDF";

/// Root service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Listener address, logging, and request limits
    #[serde(default)]
    pub server: ServerConfig,

    /// Working directories
    #[serde(default)]
    pub storage: StorageConfig,

    /// Layout of generated pages
    #[serde(default)]
    pub render: RenderConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// - `SLIDEPDF__SERVER__PORT=9000` -> `server.port = 9000`
    /// - `SLIDEPDF__STORAGE__OUTPUT_DIR=/srv/pdf` -> `storage.output_dir`
    /// - `SLIDEPDF__RENDER__MODE=text` -> `render.mode`
    ///
    /// Every key has a default, so an empty environment is valid.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(None)
    }

    /// Load from an explicit variable map instead of the process
    /// environment.
    pub fn from_source(source: Option<config::Map<String, String>>) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(source),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}
