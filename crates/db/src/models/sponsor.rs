//! Sponsor entity model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A sponsor row from the `sponsors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sponsor {
    pub id: DbId,
    pub name: String,
    pub url: Option<String>,
    pub logo_path: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Validated input for creating a sponsor (logo already stored).
#[derive(Debug, Clone)]
pub struct CreateSponsor {
    pub name: String,
    pub url: Option<String>,
    pub logo_path: String,
    pub is_active: bool,
}

/// Validated input for updating a sponsor. `logo_path` is only applied
/// when `Some` (a new upload).
#[derive(Debug, Clone)]
pub struct UpdateSponsor {
    pub name: String,
    pub url: Option<String>,
    pub logo_path: Option<String>,
    pub is_active: bool,
}
