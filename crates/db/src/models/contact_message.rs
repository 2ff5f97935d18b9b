//! Contact message entity model and DTO.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A message submitted through the public contact form.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactMessage {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: Timestamp,
}

/// Raw contact form submission (JSON body, validated by the handler).
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// Validated input for storing a contact message.
#[derive(Debug, Clone)]
pub struct CreateContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}
