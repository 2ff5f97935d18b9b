//! Route definitions for the public site payloads.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{contact, site};
use crate::state::AppState;

/// Routes mounted at `/site`.
///
/// ```text
/// GET  /projects       -> list_projects (?category=&page=)
/// GET  /projects/{id}  -> show_project (+ related)
/// GET  /home           -> home payload
/// GET  /about          -> about payload
/// POST /contact        -> contact form submission
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(site::list_projects))
        .route("/projects/{id}", get(site::show_project))
        .route("/home", get(site::home))
        .route("/about", get(site::about))
        .route("/contact", post(contact::submit))
}
