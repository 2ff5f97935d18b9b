//! Repository for the `contact_messages` table.

use sqlx::PgPool;

use crate::models::contact_message::{ContactMessage, CreateContactMessage};

const COLUMNS: &str = "id, name, email, message, created_at";

/// Provides storage for public contact form submissions.
pub struct ContactMessageRepo;

impl ContactMessageRepo {
    /// Insert a new message, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateContactMessage,
    ) -> Result<ContactMessage, sqlx::Error> {
        let query = format!(
            "INSERT INTO contact_messages (name, email, message)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactMessage>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// One page of messages, newest first (admin listing).
    pub async fn list_page(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContactMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contact_messages
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ContactMessage>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total message count.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT count(*) FROM contact_messages")
            .fetch_one(pool)
            .await
    }
}
