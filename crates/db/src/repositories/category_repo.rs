//! Repository for `categories` and their relation memberships.

use catalog_core::category::CategoryId;
use sqlx::PgPool;

use crate::models::category::CategoryRow;

const COLUMNS: &str = "id, name, created_at, updated_at";

/// Category rows plus the `category_relations` membership tables.
///
/// Relations are addressed by their key (`seasons`, `species`).
pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn find_by_id(
        pool: &PgPool,
        id: CategoryId,
    ) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Exact match; callers pass the normalized (uppercase) name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE name = $1");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Insert a category. A duplicate name violates `uq_categories_name`.
    pub async fn create(pool: &PgPool, name: &str) -> Result<CategoryRow, sqlx::Error> {
        let query = format!("INSERT INTO categories (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn relation_exists(pool: &PgPool, relation: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM category_relations WHERE name = $1)",
        )
        .bind(relation)
        .fetch_one(pool)
        .await
    }

    pub async fn relation_contains(
        pool: &PgPool,
        relation: &str,
        category_id: CategoryId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM category_relation_members m
                JOIN category_relations r ON r.id = m.relation_id
                WHERE r.name = $1 AND m.category_id = $2
             )",
        )
        .bind(relation)
        .bind(category_id)
        .fetch_one(pool)
        .await
    }

    /// Add a member. Returns `false` when the relation does not exist.
    pub async fn add_member(
        pool: &PgPool,
        relation: &str,
        category_id: CategoryId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO category_relation_members (relation_id, category_id)
             SELECT r.id, $2 FROM category_relations r WHERE r.name = $1",
        )
        .bind(relation)
        .bind(category_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Members of a relation in registration order.
    pub async fn list_members(
        pool: &PgPool,
        relation: &str,
    ) -> Result<Vec<CategoryRow>, sqlx::Error> {
        sqlx::query_as::<_, CategoryRow>(
            "SELECT c.id, c.name, c.created_at, c.updated_at
             FROM category_relation_members m
             JOIN category_relations r ON r.id = m.relation_id
             JOIN categories c ON c.id = m.category_id
             WHERE r.name = $1
             ORDER BY m.id ASC",
        )
        .bind(relation)
        .fetch_all(pool)
        .await
    }
}
