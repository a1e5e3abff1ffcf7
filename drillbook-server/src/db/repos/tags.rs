//! Category / sub-category repository
//!
//! One implementation for both tag tables, selected by [`TagKind`]:
//! - save: INSERT ... RETURNING or UPDATE ... RETURNING
//! - name lookup: case-insensitive, served by the `LOWER(name)` index

use std::marker::PhantomData;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};

use crate::models::{TagDraft, TagKind};
use crate::db::DbError;

/// Tag record from database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<K> {
    pub id: i64,
    pub name: String,
    pub description: String,
    kind: PhantomData<K>,
}

impl<K> Tag<K> {
    pub fn new(id: i64, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            kind: PhantomData,
        }
    }
}

impl<'r, K: TagKind> FromRow<'r, PgRow> for Tag<K> {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self::new(
            row.try_get::<i64, _>("id")?,
            row.try_get::<String, _>("name")?,
            row.try_get::<String, _>("description")?,
        ))
    }
}

/// Tag repository
pub struct TagRepo<'a, K> {
    pool: &'a PgPool,
    kind: PhantomData<K>,
}

impl<'a, K: TagKind> TagRepo<'a, K> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            kind: PhantomData,
        }
    }

    /// Insert when `draft.id` is absent, update otherwise.
    ///
    /// Updating an unknown id is `DbError::NotFound`.
    pub async fn save(&self, draft: &TagDraft) -> Result<Tag<K>, DbError> {
        match draft.id {
            None => {
                let sql = format!(
                    "INSERT INTO {} (name, description) VALUES ($1, $2) \
                     RETURNING id, name, description",
                    K::TABLE
                );
                let tag = sqlx::query_as::<_, Tag<K>>(&sql)
                    .bind(draft.name.as_str())
                    .bind(draft.description.as_str())
                    .fetch_one(self.pool)
                    .await?;
                tracing::debug!(resource = K::RESOURCE, id = tag.id, "inserted");
                Ok(tag)
            }
            Some(id) => {
                let sql = format!(
                    "UPDATE {} SET name = $2, description = $3 WHERE id = $1 \
                     RETURNING id, name, description",
                    K::TABLE
                );
                let tag = sqlx::query_as::<_, Tag<K>>(&sql)
                    .bind(id)
                    .bind(draft.name.as_str())
                    .bind(draft.description.as_str())
                    .fetch_optional(self.pool)
                    .await?
                    .ok_or_else(|| DbError::not_found(K::RESOURCE, id))?;
                tracing::debug!(resource = K::RESOURCE, id, "updated");
                Ok(tag)
            }
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Tag<K>>, DbError> {
        let sql = format!("SELECT id, name, description FROM {} WHERE id = $1", K::TABLE);
        Ok(sqlx::query_as::<_, Tag<K>>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Case-insensitive name lookup.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Tag<K>>, DbError> {
        let sql = format!(
            "SELECT id, name, description FROM {} WHERE LOWER(name) = LOWER($1)",
            K::TABLE
        );
        Ok(sqlx::query_as::<_, Tag<K>>(&sql)
            .bind(name)
            .fetch_optional(self.pool)
            .await?)
    }

    pub async fn find_all(&self) -> Result<Vec<Tag<K>>, DbError> {
        let sql = format!("SELECT id, name, description FROM {} ORDER BY id", K::TABLE);
        Ok(sqlx::query_as::<_, Tag<K>>(&sql).fetch_all(self.pool).await?)
    }

    /// Tags whose id is in `ids`; unknown ids are skipped.
    pub async fn find_all_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag<K>>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, name, description FROM {} WHERE id = ANY($1) ORDER BY id",
            K::TABLE
        );
        Ok(sqlx::query_as::<_, Tag<K>>(&sql)
            .bind(ids)
            .fetch_all(self.pool)
            .await?)
    }

    /// Delete by id. Returns whether a row existed; deleting nothing is not an error.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool, DbError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", K::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
