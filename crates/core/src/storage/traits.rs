use async_trait::async_trait;

use crate::commerce::{
    Category, CategoryPatch, NewCategory, NewOrder, NewProduct, NewUser, Order, Product,
    ProductPatch, User, UserPatch,
};

use super::Result;

/// Repository for user operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Lists all users, newest first.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Gets a user by id.
    async fn get_user(&self, id: i64) -> Result<Option<User>>;

    /// Creates a user and returns it with its assigned id.
    async fn create_user(&self, new: &NewUser) -> Result<User>;

    /// Applies a partial update and returns the updated user.
    async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<User>;

    /// Deletes a user and returns the deleted row.
    async fn delete_user(&self, id: i64) -> Result<User>;
}

/// Repository for category operations.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Lists all categories, newest first.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Gets a category by id.
    async fn get_category(&self, id: i64) -> Result<Option<Category>>;

    /// Gets a category by its unique slug.
    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// Creates a category and returns it with its assigned id.
    async fn create_category(&self, new: &NewCategory) -> Result<Category>;

    /// Applies a partial update and returns the updated category.
    async fn update_category(&self, id: i64, patch: &CategoryPatch) -> Result<Category>;

    /// Deletes a category and returns the deleted row. Products referencing
    /// it keep existing with their category reference cleared.
    async fn delete_category(&self, id: i64) -> Result<Category>;
}

/// Repository for product operations.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Lists products, newest first, optionally restricted to one category.
    async fn list_products(&self, category_id: Option<i64>) -> Result<Vec<Product>>;

    /// Gets a product by id.
    async fn get_product(&self, id: i64) -> Result<Option<Product>>;

    /// Creates a product and returns it with its assigned id.
    async fn create_product(&self, new: &NewProduct) -> Result<Product>;

    /// Applies a partial update and returns the updated product.
    async fn update_product(&self, id: i64, patch: &ProductPatch) -> Result<Product>;

    /// Deletes a product and returns the deleted row.
    async fn delete_product(&self, id: i64) -> Result<Product>;
}

/// Repository for order operations.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Lists all orders, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    /// Gets an order by id, including its items.
    async fn get_order(&self, id: i64) -> Result<Option<Order>>;

    /// Lists the orders of one user, newest first.
    async fn list_orders_by_user(&self, user_id: i64) -> Result<Vec<Order>>;

    /// Creates an order: validates the user and every referenced product,
    /// snapshots unit prices, and computes the total.
    async fn create_order(&self, new: &NewOrder) -> Result<Order>;

    /// Replaces the status label and returns the updated order.
    async fn update_order_status(&self, id: i64, status: &str) -> Result<Order>;

    /// Deletes an order (and its items) and returns the deleted row.
    async fn delete_order(&self, id: i64) -> Result<Order>;
}
