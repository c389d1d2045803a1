use std::sync::Arc;

use crate::{
    api::error,
    configs::RedisCache,
    modules::user::{repository::UserRepository, schema::UserEntity},
};

/// Read-through Redis cache in front of the user directory.
///
/// Display names are needed on every broadcast, so lookups by id go through
/// `user:{id}` first. Writes that change a cached row evict it.
#[derive(Clone)]
pub struct CachedUserRepository<R>
where
    R: UserRepository + Send + Sync,
{
    inner: Arc<R>,
    cache: Arc<RedisCache>,
    ttl: u64,
}

impl<R> CachedUserRepository<R>
where
    R: UserRepository + Send + Sync,
{
    pub fn new(inner: Arc<R>, cache: Arc<RedisCache>, ttl: u64) -> Self {
        Self { inner, cache, ttl }
    }

    fn key(id: i64) -> String {
        format!("user:{id}")
    }
}

#[async_trait::async_trait]
impl<R> UserRepository for CachedUserRepository<R>
where
    R: UserRepository + Send + Sync,
{
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError> {
        let key = Self::key(id);
        match self.cache.get::<UserEntity>(&key).await {
            Ok(Some(user)) => return Ok(Some(user)),
            Ok(None) => {}
            Err(e) => log::warn!("User cache read failed for {}: {}", id, e),
        }

        let user = self.inner.find_by_id(id).await?;
        if let Some(user) = &user {
            if let Err(e) = self.cache.set(&key, user, self.ttl).await {
                log::warn!("User cache write failed for {}: {}", id, e);
            }
        }
        Ok(user)
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<UserEntity>, error::SystemError> {
        self.inner.find_many(ids).await
    }

    async fn increment_likes_count(&self, id: i64) -> Result<(), error::SystemError> {
        self.inner.increment_likes_count(id).await?;
        if let Err(e) = self.cache.delete(&Self::key(id)).await {
            log::warn!("User cache eviction failed for {}: {}", id, e);
        }
        Ok(())
    }
}
