//! Category / sub-category service

use sqlx::PgPool;

use crate::db::{DbError, Tag, TagRepo};
use crate::models::{TagDraft, TagKind};
use super::ServiceError;

/// Tag service, instantiated once per [`TagKind`]
pub struct TagService<'a, K> {
    repo: TagRepo<'a, K>,
}

impl<'a, K: TagKind> TagService<'a, K> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self {
            repo: TagRepo::new(pool),
        }
    }

    /// Insert or update; store rejections become `ServiceError::Insert`.
    pub async fn save(&self, draft: TagDraft) -> Result<Tag<K>, ServiceError> {
        self.repo.save(&draft).await.map_err(ServiceError::from_write)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Tag<K>>, DbError> {
        self.repo.find_by_id(id).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Tag<K>>, DbError> {
        self.repo.find_by_name(name).await
    }

    pub async fn find_all(&self) -> Result<Vec<Tag<K>>, DbError> {
        self.repo.find_all().await
    }

    pub async fn find_all_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag<K>>, DbError> {
        self.repo.find_all_by_ids(ids).await
    }

    /// Idempotent: deleting an unknown id succeeds.
    pub async fn delete_by_id(&self, id: i64) -> Result<(), DbError> {
        let existed = self.repo.delete_by_id(id).await?;
        tracing::debug!(resource = K::RESOURCE, id, existed, "deleted");
        Ok(())
    }
}
