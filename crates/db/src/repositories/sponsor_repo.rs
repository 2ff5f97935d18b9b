//! Repository for the `sponsors` table.

use sqlx::PgPool;

use atelier_core::types::DbId;

use crate::models::sponsor::{CreateSponsor, Sponsor, UpdateSponsor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, url, logo_path, is_active, created_at, updated_at";

/// Provides CRUD operations for sponsors.
pub struct SponsorRepo;

impl SponsorRepo {
    /// Insert a new sponsor, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSponsor) -> Result<Sponsor, sqlx::Error> {
        let query = format!(
            "INSERT INTO sponsors (name, url, logo_path, is_active)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sponsor>(&query)
            .bind(&input.name)
            .bind(&input.url)
            .bind(&input.logo_path)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a sponsor by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Sponsor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sponsors WHERE id = $1");
        sqlx::query_as::<_, Sponsor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All sponsors, ordered by name (admin listing).
    pub async fn list_ordered(pool: &PgPool) -> Result<Vec<Sponsor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sponsors ORDER BY name");
        sqlx::query_as::<_, Sponsor>(&query).fetch_all(pool).await
    }

    /// Active sponsors, ordered by name (public pages).
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Sponsor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sponsors WHERE is_active ORDER BY name");
        sqlx::query_as::<_, Sponsor>(&query).fetch_all(pool).await
    }

    /// Full-form update. `logo_path` is only applied when `Some`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSponsor,
    ) -> Result<Option<Sponsor>, sqlx::Error> {
        let query = format!(
            "UPDATE sponsors SET
                name = $2,
                url = $3,
                logo_path = COALESCE($4, logo_path),
                is_active = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sponsor>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.url)
            .bind(&input.logo_path)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a sponsor by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sponsors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
