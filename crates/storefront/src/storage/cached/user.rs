//! Cached user repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use storefront_core::cache::{user_key, users_all_key, Cache};
use storefront_core::commerce::{NewUser, User, UserPatch};
use storefront_core::storage::{Result, UserRepository};

use super::{invalidate, read_through, refresh};

/// Cache-aside decorator for user storage.
///
/// Same discipline as the product decorator: store write first, then a
/// best-effort cache fan-out (`users:all` dropped, `user:<id>` refreshed or
/// dropped).
pub struct CachedUserRepository<R>
where
    R: UserRepository,
{
    inner: Arc<R>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl<R> CachedUserRepository<R>
where
    R: UserRepository,
{
    /// Creates a new cached user repository.
    pub fn new(inner: Arc<R>, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl<R> UserRepository for CachedUserRepository<R>
where
    R: UserRepository + 'static,
{
    async fn list_users(&self) -> Result<Vec<User>> {
        let key = users_all_key();
        let users = read_through(self.cache.as_ref(), &key, self.ttl, || async {
            self.inner.list_users().await.map(Some)
        })
        .await?;
        Ok(users.unwrap_or_default())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let key = user_key(id);
        read_through(self.cache.as_ref(), &key, self.ttl, || async {
            self.inner.get_user(id).await
        })
        .await
    }

    async fn create_user(&self, new: &NewUser) -> Result<User> {
        let user = self.inner.create_user(new).await?;

        invalidate(self.cache.as_ref(), &users_all_key()).await;
        refresh(self.cache.as_ref(), &user_key(user.id), &user, self.ttl).await;

        tracing::debug!(user_id = user.id, "User created");
        Ok(user)
    }

    async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<User> {
        let updated = self.inner.update_user(id, patch).await?;

        invalidate(self.cache.as_ref(), &users_all_key()).await;
        refresh(self.cache.as_ref(), &user_key(id), &updated, self.ttl).await;

        tracing::debug!(user_id = id, "User updated");
        Ok(updated)
    }

    async fn delete_user(&self, id: i64) -> Result<User> {
        let deleted = self.inner.delete_user(id).await?;

        invalidate(self.cache.as_ref(), &users_all_key()).await;
        invalidate(self.cache.as_ref(), &user_key(id)).await;

        tracing::debug!(user_id = id, "User deleted");
        Ok(deleted)
    }
}
