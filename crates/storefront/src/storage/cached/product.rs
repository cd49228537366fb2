//! Cached product repository decorator.
//!
//! Wraps a `ProductRepository` with the cache-aside pattern. Product reads
//! are the hottest path in the system, so both the single-product key and
//! the list keys (`products:all`, `products:category:<id>`) are cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use storefront_core::cache::{
    product_key, products_category_key, products_list_key, Cache,
};
use storefront_core::commerce::{NewProduct, Product, ProductPatch};
use storefront_core::storage::{ProductRepository, RepositoryError, Result};

use super::{invalidate, read_through, refresh};

/// Cache-aside decorator for product storage.
///
/// Mutations follow a strict order: the underlying repository write must
/// succeed before any cache key is touched, so a failed write leaves the
/// cache untouched. The fan-out itself is best effort and never fails the
/// request.
pub struct CachedProductRepository<R>
where
    R: ProductRepository,
{
    inner: Arc<R>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl<R> CachedProductRepository<R>
where
    R: ProductRepository,
{
    /// Creates a new cached product repository.
    pub fn new(inner: Arc<R>, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    /// Deletes the list keys a change to `category_id` could have staled:
    /// the unfiltered listing, plus the category listing when present.
    async fn invalidate_lists(&self, category_id: Option<i64>) {
        invalidate(self.cache.as_ref(), &products_list_key(None)).await;
        if let Some(category_id) = category_id {
            invalidate(self.cache.as_ref(), &products_category_key(category_id)).await;
        }
    }
}

#[async_trait]
impl<R> ProductRepository for CachedProductRepository<R>
where
    R: ProductRepository + 'static,
{
    async fn list_products(&self, category_id: Option<i64>) -> Result<Vec<Product>> {
        let key = products_list_key(category_id);
        let products = read_through(self.cache.as_ref(), &key, self.ttl, || async {
            self.inner.list_products(category_id).await.map(Some)
        })
        .await?;
        Ok(products.unwrap_or_default())
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let key = product_key(id);
        read_through(self.cache.as_ref(), &key, self.ttl, || async {
            self.inner.get_product(id).await
        })
        .await
    }

    async fn create_product(&self, new: &NewProduct) -> Result<Product> {
        let product = self.inner.create_product(new).await?;

        self.invalidate_lists(product.category_id).await;
        refresh(self.cache.as_ref(), &product_key(product.id), &product, self.ttl).await;

        tracing::debug!(product_id = product.id, "Product created");
        Ok(product)
    }

    async fn update_product(&self, id: i64, patch: &ProductPatch) -> Result<Product> {
        // The pre-image is needed to know which category listing to drop.
        let before = self
            .inner
            .get_product(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Product", id))?;

        let updated = self.inner.update_product(id, patch).await?;

        self.invalidate_lists(before.category_id).await;
        if updated.category_id != before.category_id {
            if let Some(category_id) = updated.category_id {
                invalidate(self.cache.as_ref(), &products_category_key(category_id)).await;
            }
        }
        refresh(self.cache.as_ref(), &product_key(id), &updated, self.ttl).await;

        tracing::debug!(product_id = id, "Product updated");
        Ok(updated)
    }

    async fn delete_product(&self, id: i64) -> Result<Product> {
        let deleted = self.inner.delete_product(id).await?;

        invalidate(self.cache.as_ref(), &product_key(id)).await;
        self.invalidate_lists(deleted.category_id).await;

        tracing::debug!(product_id = id, "Product deleted");
        Ok(deleted)
    }
}
