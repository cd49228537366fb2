//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use storefront_core::commerce::{
    Category, CategoryPatch, NewCategory, NewOrder, NewProduct, NewUser, Order, OrderItem,
    Product, ProductPatch, User, UserPatch,
};
use storefront_core::storage::{
    CategoryRepository, OrderRepository, ProductRepository, RepositoryError, Result,
    UserRepository,
};

/// In-memory storage backend.
///
/// HashMaps behind `Arc<RwLock<_>>`; ids are assigned from per-entity
/// monotonic counters. Data lives as long as the process. The default
/// backend for development and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<RwLock<HashMap<i64, User>>>,
    categories: Arc<RwLock<HashMap<i64, Category>>>,
    products: Arc<RwLock<HashMap<i64, Product>>>,
    orders: Arc<RwLock<HashMap<i64, Order>>>,
    next_user_id: Arc<AtomicI64>,
    next_category_id: Arc<AtomicI64>,
    next_product_id: Arc<AtomicI64>,
    next_order_id: Arc<AtomicI64>,
    next_order_item_id: Arc<AtomicI64>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(counter: &AtomicI64) -> i64 {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Newest-first ordering, matching the SQL backends' `ORDER BY id DESC`.
fn sorted_desc<T: Clone>(map: &HashMap<i64, T>) -> Vec<T> {
    let mut ids: Vec<i64> = map.keys().copied().collect();
    ids.sort_unstable_by(|a, b| b.cmp(a));
    ids.iter().map(|id| map[id].clone()).collect()
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn list_users(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(sorted_desc(&users))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn create_user(&self, new: &NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new.email) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: new.email.clone(),
            });
        }
        let id = Self::next_id(&self.next_user_id);
        let user = User::new(id, new.clone());
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<User> {
        let mut users = self.users.write().await;
        if let Some(email) = &patch.email {
            if users.values().any(|u| u.id != id && &u.email == email) {
                return Err(RepositoryError::AlreadyExists {
                    entity_type: "User",
                    id: email.clone(),
                });
            }
        }
        let user = users
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("User", id))?;
        user.apply(patch);
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> Result<User> {
        let mut users = self.users.write().await;
        users
            .remove(&id)
            .ok_or_else(|| RepositoryError::not_found("User", id))
    }
}

#[async_trait]
impl CategoryRepository for InMemoryRepository {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories = self.categories.read().await;
        Ok(sorted_desc(&categories))
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.get(&id).cloned())
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn create_category(&self, new: &NewCategory) -> Result<Category> {
        let mut categories = self.categories.write().await;
        if categories.values().any(|c| c.slug == new.slug) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Category",
                id: new.slug.clone(),
            });
        }
        let id = Self::next_id(&self.next_category_id);
        let category = Category::new(id, new.clone());
        categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: i64, patch: &CategoryPatch) -> Result<Category> {
        let mut categories = self.categories.write().await;
        if let Some(slug) = &patch.slug {
            if categories.values().any(|c| c.id != id && &c.slug == slug) {
                return Err(RepositoryError::AlreadyExists {
                    entity_type: "Category",
                    id: slug.clone(),
                });
            }
        }
        let category = categories
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("Category", id))?;
        category.apply(patch);
        Ok(category.clone())
    }

    async fn delete_category(&self, id: i64) -> Result<Category> {
        let category = {
            let mut categories = self.categories.write().await;
            categories
                .remove(&id)
                .ok_or_else(|| RepositoryError::not_found("Category", id))?
        };

        // Orphan the category's products rather than deleting them.
        let mut products = self.products.write().await;
        for product in products.values_mut() {
            if product.category_id == Some(id) {
                product.category_id = None;
            }
        }

        Ok(category)
    }
}

#[async_trait]
impl ProductRepository for InMemoryRepository {
    async fn list_products(&self, category_id: Option<i64>) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let mut all = sorted_desc(&products);
        if let Some(category_id) = category_id {
            all.retain(|p| p.category_id == Some(category_id));
        }
        Ok(all)
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn create_product(&self, new: &NewProduct) -> Result<Product> {
        if let Some(category_id) = new.category_id {
            let categories = self.categories.read().await;
            if !categories.contains_key(&category_id) {
                return Err(RepositoryError::not_found("Category", category_id));
            }
        }
        let mut products = self.products.write().await;
        let id = Self::next_id(&self.next_product_id);
        let product = Product::new(id, new.clone());
        products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i64, patch: &ProductPatch) -> Result<Product> {
        if let Some(category_id) = patch.category_id {
            let categories = self.categories.read().await;
            if !categories.contains_key(&category_id) {
                return Err(RepositoryError::not_found("Category", category_id));
            }
        }
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("Product", id))?;
        product.apply(patch);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: i64) -> Result<Product> {
        let mut products = self.products.write().await;
        products
            .remove(&id)
            .ok_or_else(|| RepositoryError::not_found("Product", id))
    }
}

#[async_trait]
impl OrderRepository for InMemoryRepository {
    async fn list_orders(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(sorted_desc(&orders))
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn list_orders_by_user(&self, user_id: i64) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all = sorted_desc(&orders);
        all.retain(|o| o.user_id == user_id);
        Ok(all)
    }

    async fn create_order(&self, new: &NewOrder) -> Result<Order> {
        if new.items.is_empty() {
            return Err(RepositoryError::InvalidData(
                "order must contain at least one item".to_string(),
            ));
        }

        {
            let users = self.users.read().await;
            if !users.contains_key(&new.user_id) {
                return Err(RepositoryError::not_found("User", new.user_id));
            }
        }

        let order_id = Self::next_id(&self.next_order_id);
        let mut items = Vec::with_capacity(new.items.len());
        {
            let products = self.products.read().await;
            for item in &new.items {
                if item.quantity == 0 {
                    return Err(RepositoryError::InvalidData(
                        "quantity must be positive".to_string(),
                    ));
                }
                let product = products
                    .get(&item.product_id)
                    .ok_or_else(|| RepositoryError::not_found("Product", item.product_id))?;
                // Snapshot the unit price at creation time.
                items.push(OrderItem::new(
                    Self::next_id(&self.next_order_item_id),
                    order_id,
                    product.id,
                    item.quantity,
                    product.price,
                ));
            }
        }

        let order = Order::new(order_id, new.user_id, items);
        let mut orders = self.orders.write().await;
        orders.insert(order_id, order.clone());
        Ok(order)
    }

    async fn update_order_status(&self, id: i64, status: &str) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("Order", id))?;
        order.status = status.to_string();
        order.updated_at = chrono::Utc::now();
        Ok(order.clone())
    }

    async fn delete_order(&self, id: i64) -> Result<Order> {
        let mut orders = self.orders.write().await;
        orders
            .remove(&id)
            .ok_or_else(|| RepositoryError::not_found("Order", id))
    }
}
