//! HTTP service converting uploaded PowerPoint decks to PDF.
//!
//! `POST /convert` stores an upload and converts it, `GET /pdf/{filename}`
//! serves the result, and `DELETE /cleanup` is a maintenance hook.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod storage;

use crate::config::AppConfig;
use crate::storage::WorkDirs;
use slidepdf_render::Converter;
use std::sync::Arc;

pub use routes::app_routes;

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub dirs: Arc<WorkDirs>,
    pub converter: Arc<Converter>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let dirs = WorkDirs::new(&config.storage);
        let converter = Converter::new(config.render.convert_options(dirs.temp_dir()));
        Self {
            dirs: Arc::new(dirs),
            converter: Arc::new(converter),
        }
    }
}
