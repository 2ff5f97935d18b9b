//! Route definitions for the project sheet outputs.
//!
//! These live at the root (not under `/api/v1`): they are browser-facing
//! documents, not JSON payloads.

use axum::routing::get;
use axum::Router;

use crate::handlers::sheet;
use crate::state::AppState;

/// ```text
/// GET /projects/{id}/print  -> self-contained printable HTML sheet
/// GET /projects/{id}/pdf    -> A4 PDF download
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects/{id}/print", get(sheet::print_sheet))
        .route("/projects/{id}/pdf", get(sheet::download_pdf))
}
