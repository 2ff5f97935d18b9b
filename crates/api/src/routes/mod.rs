pub mod admin;
pub mod health;
pub mod sheet;
pub mod site;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin/categories                      list, create
/// /admin/categories/{id}                 get, update, delete
/// /admin/categories/{id}/image           delete image
///
/// /admin/projects                        list, create
/// /admin/projects/{id}                   get, update, delete
/// /admin/projects/{id}/gallery           append gallery entry
/// /admin/projects/{id}/gallery/{index}   delete gallery entry
///
/// /admin/sponsors                        list, create
/// /admin/sponsors/{id}                   get, update, delete
///
/// /admin/contact-messages                list
///
/// /site/projects                         public listing (category filter)
/// /site/projects/{id}                    public detail + related
/// /site/home                             home payload
/// /site/about                            about payload
/// /site/contact                          contact form submission
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/admin/categories", admin::category_routes())
        .nest("/admin/projects", admin::project_routes())
        .nest("/admin/sponsors", admin::sponsor_routes())
        .nest("/admin/contact-messages", admin::contact_message_routes())
        .nest("/site", site::router())
}
