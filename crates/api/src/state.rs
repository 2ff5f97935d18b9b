use std::sync::Arc;

use handlebars::Handlebars;

use atelier_core::storage::Storage;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: atelier_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Upload root for images and brochures.
    pub storage: Arc<Storage>,
    /// Registered print-sheet templates.
    pub templates: Arc<Handlebars<'static>>,
}
