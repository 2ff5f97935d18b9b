//! Project entity model and DTOs.

use atelier_core::ids::parse_loose_id_array;
use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::models::category::CategoryRef;

/// Publishable project status.
pub const STATUS_ACTIVE: &str = "active";

/// Hidden-from-public project status.
pub const STATUS_INACTIVE: &str = "inactive";

/// A stored gallery entry: a full-resolution image and its derived
/// thumbnail, tracked together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub full: String,
    pub thumb: String,
}

/// An institutional partner with an optional link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionalPartner {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A project row from the `projects` table.
///
/// `category_ids` stays a raw JSON value: legacy writers stored ids as both
/// numbers and numeric strings, and readers must accept either encoding
/// (see `atelier_core::ids`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub category_ids: serde_json::Value,
    pub location: Option<String>,
    pub year: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
    pub description: String,
    pub achievement_status: Option<String>,
    pub surface_area: Option<String>,
    pub client_name: Option<String>,
    pub delegated_client_name: Option<String>,
    pub project_cost: Option<String>,
    pub duration_months: Option<i32>,
    pub status: String,
    pub sort_order: i32,
    pub image_path: Option<String>,
    pub gallery_images: Json<Vec<GalleryImage>>,
    pub pdf_path: Option<String>,
    pub partners: Json<Vec<String>>,
    pub institutional_partners: Json<Vec<InstitutionalPartner>>,
    pub sponsors: Json<Vec<String>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Category ids normalized to integers, both JSON encodings accepted.
    pub fn category_id_list(&self) -> Vec<DbId> {
        parse_loose_id_array(&self.category_ids)
    }
}

/// A project with its category references resolved for display.
#[derive(Debug, Serialize)]
pub struct ProjectWithCategories {
    #[serde(flatten)]
    pub project: Project,
    pub categories: Vec<CategoryRef>,
}

/// Validated input for creating a project (files already stored).
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub title: String,
    pub category_ids: Vec<DbId>,
    pub location: Option<String>,
    pub year: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
    pub description: String,
    pub achievement_status: Option<String>,
    pub surface_area: Option<String>,
    pub client_name: Option<String>,
    pub delegated_client_name: Option<String>,
    pub project_cost: Option<String>,
    pub duration_months: Option<i32>,
    pub status: String,
    pub sort_order: i32,
    pub image_path: String,
    pub gallery_images: Vec<GalleryImage>,
    pub pdf_path: Option<String>,
    pub partners: Vec<String>,
    pub institutional_partners: Vec<InstitutionalPartner>,
    pub sponsors: Vec<String>,
}

/// Validated input for updating a project. Only `Some` fields are applied;
/// file-backed fields become `Some` when a replacement was uploaded.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub category_ids: Option<Vec<DbId>>,
    pub location: Option<String>,
    pub year: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
    pub description: Option<String>,
    pub achievement_status: Option<String>,
    pub surface_area: Option<String>,
    pub client_name: Option<String>,
    pub delegated_client_name: Option<String>,
    pub project_cost: Option<String>,
    pub duration_months: Option<i32>,
    pub status: Option<String>,
    pub sort_order: Option<i32>,
    pub image_path: Option<String>,
    pub gallery_images: Option<Vec<GalleryImage>>,
    pub pdf_path: Option<String>,
    pub partners: Option<Vec<String>>,
    pub institutional_partners: Option<Vec<InstitutionalPartner>>,
    pub sponsors: Option<Vec<String>>,
}
