//! Repository for the `categories` table.

use sqlx::PgPool;

use atelier_core::types::DbId;

use crate::models::category::{
    Category, CategoryRef, CategoryWithCount, CreateCategory, UpdateCategory,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, slug, description, color, sort_order, is_active, image_path, created_at, updated_at";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, slug, description, color, sort_order, is_active, image_path)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(&input.color)
            .bind(input.sort_order)
            .bind(input.is_active)
            .bind(&input.image_path)
            .fetch_one(pool)
            .await
    }

    /// Find a category by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the public listing filter: match by slug first, then by
    /// exact name.
    pub async fn find_by_slug_or_name(
        pool: &PgPool,
        term: &str,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE slug = $1 OR name = $1
             ORDER BY (slug = $1) DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(term)
            .fetch_optional(pool)
            .await
    }

    /// One page of the admin listing, ordered by sort order then name,
    /// optionally filtered by a case-insensitive search over name and
    /// description.
    pub async fn search_page(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE $1::text IS NULL OR name ILIKE $1 OR description ILIKE $1
             ORDER BY sort_order, name
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(search.map(like_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total rows matching the admin listing filter.
    pub async fn count_search(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT count(*) FROM categories
             WHERE $1::text IS NULL OR name ILIKE $1 OR description ILIKE $1",
        )
        .bind(search.map(like_pattern))
        .fetch_one(pool)
        .await
    }

    /// Active categories in display order (public filter bar, admin forms).
    pub async fn list_active_ordered(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories WHERE is_active ORDER BY sort_order, name"
        );
        sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
    }

    /// Active categories with their active-project counts, for the home
    /// payload. Membership accepts both JSON encodings of the id.
    pub async fn list_active_with_counts(
        pool: &PgPool,
    ) -> Result<Vec<CategoryWithCount>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS},
                (SELECT count(*) FROM projects p
                 WHERE p.status = 'active' AND EXISTS (
                     SELECT 1 FROM jsonb_array_elements(p.category_ids) AS elem
                     WHERE elem::text = categories.id::text
                        OR elem::text = '\"' || categories.id::text || '\"'
                 )) AS projects_count
             FROM categories
             WHERE is_active
             ORDER BY sort_order, name"
        );
        sqlx::query_as::<_, CategoryWithCount>(&query)
            .fetch_all(pool)
            .await
    }

    /// Batched lookup for embedding category refs into project payloads.
    /// Results follow the order of `ids`.
    pub async fn find_refs_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<CategoryRef>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, CategoryRef>(
            "SELECT id, name, slug, color, description, image_path
             FROM categories
             WHERE id = ANY($1)
             ORDER BY array_position($1, id)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Whether another category already uses `name` (case-sensitive, as
    /// enforced by `uq_categories_name`).
    pub async fn name_exists(
        pool: &PgPool,
        name: &str,
        exclude: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM categories
                 WHERE name = $1 AND ($2::bigint IS NULL OR id <> $2)
             )",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(pool)
        .await
    }

    /// Whether another category already uses `slug`.
    pub async fn slug_exists(
        pool: &PgPool,
        slug: &str,
        exclude: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM categories
                 WHERE slug = $1 AND ($2::bigint IS NULL OR id <> $2)
             )",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(pool)
        .await
    }

    /// Full-form update. `image_path` is only applied when `Some`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = $2,
                slug = $3,
                description = $4,
                color = $5,
                sort_order = $6,
                is_active = $7,
                image_path = COALESCE($8, image_path)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(&input.color)
            .bind(input.sort_order)
            .bind(input.is_active)
            .bind(&input.image_path)
            .fetch_optional(pool)
            .await
    }

    /// Null out the image path after its file has been removed.
    pub async fn clear_image(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET image_path = NULL WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn like_pattern(term: &str) -> String {
    format!("%{term}%")
}
