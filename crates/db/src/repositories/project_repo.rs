//! Repository for the `projects` table.
//!
//! Category membership queries match the loosely-typed `category_ids`
//! array under both of its element encodings (`7` and `"7"`); see
//! `atelier_core::ids` for the client-side counterpart.

use sqlx::types::Json;
use sqlx::PgPool;

use atelier_core::ids::jsonb_text_encodings_all;
use atelier_core::types::DbId;

use crate::models::project::{CreateProject, GalleryImage, Project, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, category_ids, location, year, start_year, end_year, description, \
                       achievement_status, surface_area, client_name, delegated_client_name, \
                       project_cost, duration_months, status, sort_order, image_path, \
                       gallery_images, pdf_path, partners, institutional_partners, sponsors, \
                       created_at, updated_at";

/// `category_ids` membership test for the id bound at `$bind`, accepting
/// both JSON element encodings.
fn member_clause(bind: &str) -> String {
    format!(
        "EXISTS (SELECT 1 FROM jsonb_array_elements(category_ids) AS elem \
         WHERE elem::text = {bind}::text OR elem::text = '\"' || {bind}::text || '\"')"
    )
}

/// Provides CRUD and listing operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row. `category_ids` is
    /// written as a JSON number array (the canonical encoding for new rows).
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (
                title, category_ids, location, year, start_year, end_year, description,
                achievement_status, surface_area, client_name, delegated_client_name,
                project_cost, duration_months, status, sort_order, image_path,
                gallery_images, pdf_path, partners, institutional_partners, sponsors
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                     $17, $18, $19, $20, $21)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.title)
            .bind(Json(&input.category_ids))
            .bind(&input.location)
            .bind(&input.year)
            .bind(&input.start_year)
            .bind(&input.end_year)
            .bind(&input.description)
            .bind(&input.achievement_status)
            .bind(&input.surface_area)
            .bind(&input.client_name)
            .bind(&input.delegated_client_name)
            .bind(&input.project_cost)
            .bind(input.duration_months)
            .bind(&input.status)
            .bind(input.sort_order)
            .bind(&input.image_path)
            .bind(Json(&input.gallery_images))
            .bind(&input.pdf_path)
            .bind(Json(&input.partners))
            .bind(Json(&input.institutional_partners))
            .bind(Json(&input.sponsors))
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of the admin listing, newest first.
    pub async fn list_page(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total project count (admin listing).
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT count(*) FROM projects")
            .fetch_one(pool)
            .await
    }

    /// One page of the public listing: active projects in display order,
    /// optionally restricted to one category.
    pub async fn list_active_page(
        pool: &PgPool,
        category_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = match category_id {
            Some(_) => format!(
                "SELECT {COLUMNS} FROM projects
                 WHERE status = 'active' AND {member}
                 ORDER BY sort_order, created_at DESC
                 LIMIT $1 OFFSET $2",
                member = member_clause("$3")
            ),
            None => format!(
                "SELECT {COLUMNS} FROM projects
                 WHERE status = 'active'
                 ORDER BY sort_order, created_at DESC
                 LIMIT $1 OFFSET $2"
            ),
        };

        let mut q = sqlx::query_as::<_, Project>(&query).bind(limit).bind(offset);
        if let Some(id) = category_id {
            q = q.bind(id);
        }
        q.fetch_all(pool).await
    }

    /// Total rows behind [`Self::list_active_page`].
    pub async fn count_active(
        pool: &PgPool,
        category_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        let query = match category_id {
            Some(_) => format!(
                "SELECT count(*) FROM projects WHERE status = 'active' AND {member}",
                member = member_clause("$1")
            ),
            None => "SELECT count(*) FROM projects WHERE status = 'active'".to_string(),
        };

        let mut q = sqlx::query_scalar(&query);
        if let Some(id) = category_id {
            q = q.bind(id);
        }
        q.fetch_one(pool).await
    }

    /// Most recent active projects (home payload).
    pub async fn list_recent_active(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE status = 'active'
             ORDER BY created_at DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Active projects sharing at least one category with `category_ids`,
    /// excluding `exclude_id`, newest first.
    pub async fn list_related(
        pool: &PgPool,
        exclude_id: DbId,
        category_ids: &[DbId],
        limit: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE status = 'active'
               AND id <> $1
               AND EXISTS (
                   SELECT 1 FROM jsonb_array_elements(category_ids) AS elem
                   WHERE elem::text = ANY($2)
               )
             ORDER BY created_at DESC
             LIMIT $3"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(exclude_id)
            .bind(jsonb_text_encodings_all(category_ids))
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// How many projects (any status) reference a category. Guards category
    /// deletion.
    pub async fn count_referencing_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT count(*) FROM projects WHERE {member}",
            member = member_clause("$1")
        );
        sqlx::query_scalar(&query)
            .bind(category_id)
            .fetch_one(pool)
            .await
    }

    /// Partial update. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                title = COALESCE($2, title),
                category_ids = COALESCE($3, category_ids),
                location = COALESCE($4, location),
                year = COALESCE($5, year),
                start_year = COALESCE($6, start_year),
                end_year = COALESCE($7, end_year),
                description = COALESCE($8, description),
                achievement_status = COALESCE($9, achievement_status),
                surface_area = COALESCE($10, surface_area),
                client_name = COALESCE($11, client_name),
                delegated_client_name = COALESCE($12, delegated_client_name),
                project_cost = COALESCE($13, project_cost),
                duration_months = COALESCE($14, duration_months),
                status = COALESCE($15, status),
                sort_order = COALESCE($16, sort_order),
                image_path = COALESCE($17, image_path),
                gallery_images = COALESCE($18, gallery_images),
                pdf_path = COALESCE($19, pdf_path),
                partners = COALESCE($20, partners),
                institutional_partners = COALESCE($21, institutional_partners),
                sponsors = COALESCE($22, sponsors)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.category_ids.as_ref().map(Json))
            .bind(&input.location)
            .bind(&input.year)
            .bind(&input.start_year)
            .bind(&input.end_year)
            .bind(&input.description)
            .bind(&input.achievement_status)
            .bind(&input.surface_area)
            .bind(&input.client_name)
            .bind(&input.delegated_client_name)
            .bind(&input.project_cost)
            .bind(input.duration_months)
            .bind(&input.status)
            .bind(input.sort_order)
            .bind(&input.image_path)
            .bind(input.gallery_images.as_ref().map(Json))
            .bind(&input.pdf_path)
            .bind(input.partners.as_ref().map(Json))
            .bind(input.institutional_partners.as_ref().map(Json))
            .bind(input.sponsors.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Replace the gallery array wholesale (append / index-delete flows).
    pub async fn set_gallery(
        pool: &PgPool,
        id: DbId,
        gallery: &[GalleryImage],
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET gallery_images = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(Json(gallery))
            .fetch_optional(pool)
            .await
    }

    /// Delete a project by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
