//! Category entity model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A category row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub image_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Category fields embedded into project payloads.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryRef {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub color: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
}

/// A category plus its active-project count, for the home payload.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithCount {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub image_path: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub projects_count: i64,
}

/// Validated input for creating a category. The slug is derived from the
/// name by the handler before insert.
#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub image_path: Option<String>,
}

/// Validated input for updating a category.
///
/// `image_path` is only applied when `Some` (a new upload); clearing the
/// image goes through `CategoryRepo::clear_image`.
#[derive(Debug, Clone)]
pub struct UpdateCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub image_path: Option<String>,
}
