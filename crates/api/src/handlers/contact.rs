//! Contact form submission and the admin-side message listing.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use atelier_core::pagination::{clamp_page, offset, CONTACT_MESSAGES_PER_PAGE};
use atelier_core::validation::{self, FieldErrors};
use atelier_db::models::contact_message::{ContactForm, ContactMessage, CreateContactMessage};
use atelier_db::repositories::ContactMessageRepo;

use crate::error::{AppError, AppResult};
use crate::response::Page;
use crate::state::AppState;

/// POST /api/v1/site/contact
pub async fn submit(
    State(state): State<AppState>,
    Json(input): Json<ContactForm>,
) -> AppResult<(StatusCode, Json<ContactMessage>)> {
    let mut errors = FieldErrors::new();

    let name = validation::required(&mut errors, "name", input.name.as_deref())
        .unwrap_or_default()
        .trim()
        .to_string();
    validation::max_len(&mut errors, "name", &name, 255);

    let email = validation::required(&mut errors, "email", input.email.as_deref())
        .unwrap_or_default()
        .trim()
        .to_string();
    if !email.is_empty() {
        validation::email(&mut errors, "email", &email);
        validation::max_len(&mut errors, "email", &email, 255);
    }

    let message = validation::required(&mut errors, "message", input.message.as_deref())
        .unwrap_or_default()
        .trim()
        .to_string();
    validation::max_len(&mut errors, "message", &message, 5000);

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let created = ContactMessageRepo::create(
        &state.pool,
        &CreateContactMessage {
            name,
            email,
            message,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
}

/// GET /api/v1/admin/contact-messages
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Page<ContactMessage>>> {
    let page = clamp_page(params.page);

    let total = ContactMessageRepo::count_all(&state.pool).await?;
    let items = ContactMessageRepo::list_page(
        &state.pool,
        CONTACT_MESSAGES_PER_PAGE,
        offset(page, CONTACT_MESSAGES_PER_PAGE),
    )
    .await?;

    Ok(Json(Page::new(items, page, CONTACT_MESSAGES_PER_PAGE, total)))
}
