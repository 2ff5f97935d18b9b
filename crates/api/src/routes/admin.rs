//! Route definitions for the admin back-office resources.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{category, contact, project, sponsor};
use crate::state::AppState;

/// Routes mounted at `/admin/categories`.
///
/// ```text
/// GET    /            -> list (paginated, ?search=)
/// POST   /            -> create (multipart)
/// GET    /{id}        -> get_by_id (modal edit)
/// PUT    /{id}        -> update (multipart)
/// DELETE /{id}        -> delete (refused while projects reference it)
/// DELETE /{id}/image  -> delete_image
/// ```
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(category::list).post(category::create))
        .route(
            "/{id}",
            get(category::get_by_id)
                .put(category::update)
                .delete(category::delete),
        )
        .route("/{id}/image", delete(category::delete_image))
}

/// Routes mounted at `/admin/projects`.
///
/// ```text
/// GET    /                      -> list (paginated)
/// POST   /                      -> create (multipart, main image required)
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update (multipart)
/// DELETE /{id}                  -> delete
/// POST   /{id}/gallery          -> add_gallery_image (multipart)
/// DELETE /{id}/gallery/{index}  -> delete_gallery_image
/// ```
pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/gallery", post(project::add_gallery_image))
        .route(
            "/{id}/gallery/{index}",
            delete(project::delete_gallery_image),
        )
}

/// Routes mounted at `/admin/sponsors`.
///
/// ```text
/// GET    /      -> list
/// POST   /      -> create (multipart, logo required)
/// GET    /{id}  -> get_by_id
/// PUT    /{id}  -> update (multipart)
/// DELETE /{id}  -> delete
/// ```
pub fn sponsor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(sponsor::list).post(sponsor::create))
        .route(
            "/{id}",
            get(sponsor::get_by_id)
                .put(sponsor::update)
                .delete(sponsor::delete),
        )
}

/// Routes mounted at `/admin/contact-messages`.
pub fn contact_message_routes() -> Router<AppState> {
    Router::new().route("/", get(contact::list))
}
