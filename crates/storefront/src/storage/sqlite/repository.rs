//! SQLite repository implementation.
//!
//! Implements the repository traits from `storefront_core::storage` over a
//! single async connection. Timestamps are stored as RFC 3339 text. Partial
//! updates are read-modify-write: the row is loaded, the patch applied via
//! the domain type, and the full row written back inside one closure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_rusqlite::Connection;

use storefront_core::commerce::{
    Category, CategoryPatch, NewCategory, NewOrder, NewProduct, NewUser, Order, OrderItem,
    Product, ProductPatch, User, UserPatch,
};
use storefront_core::storage::{
    CategoryRepository, OrderRepository, ProductRepository, RepositoryError, Result,
    UserRepository,
};

use super::error::{map_call_error, map_query_error, wrap_err};
use super::schema;

/// Outcome of a closure that may miss a referenced row.
enum WriteOutcome<T> {
    Done(T),
    Missing(&'static str, i64),
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

fn parse_ts(value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: parse_ts(row.get(3)?)?,
        updated_at: parse_ts(row.get(4)?)?,
    })
}

fn row_to_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        created_at: parse_ts(row.get(3)?)?,
        updated_at: parse_ts(row.get(4)?)?,
    })
}

fn row_to_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        stock: row.get(4)?,
        category_id: row.get(5)?,
        created_at: parse_ts(row.get(6)?)?,
        updated_at: parse_ts(row.get(7)?)?,
    })
}

fn row_to_order_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderItem> {
    Ok(OrderItem {
        id: row.get(0)?,
        order_id: row.get(1)?,
        product_id: row.get(2)?,
        quantity: row.get(3)?,
        unit_price: row.get(4)?,
    })
}

/// Builds an order from its row, loading its items.
fn load_order(conn: &rusqlite::Connection, row: &rusqlite::Row<'_>) -> rusqlite::Result<Order> {
    let id: i64 = row.get(0)?;
    let mut stmt = conn.prepare(schema::SELECT_ORDER_ITEMS)?;
    let items = stmt
        .query_map([id], row_to_order_item)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Order {
        id,
        user_id: row.get(1)?,
        status: row.get(2)?,
        total: row.get(3)?,
        items,
        created_at: parse_ts(row.get(4)?)?,
        updated_at: parse_ts(row.get(5)?)?,
    })
}

/// SQLite-based repository.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Opens (creating if needed) a file-based database and its schema.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;
        Self::init_schema(&conn).await?;
        Ok(Self { conn })
    }

    /// Opens an in-memory database; data is lost on drop. For tests.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;
        Self::init_schema(&conn).await?;
        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn query_rows<T, F>(&self, sql: &'static str, mapper: F) -> Result<Vec<T>>
    where
        T: Send + 'static,
        F: Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map([], |row| mapper(row))
                    .map_err(wrap_err)?
                    .collect::<rusqlite::Result<Vec<T>>>()
                    .map_err(wrap_err)?;
                Ok(rows)
            })
            .await
            .map_err(map_query_error)
    }

    async fn query_row_by_id<T, F>(&self, sql: &'static str, id: i64, mapper: F) -> Result<Option<T>>
    where
        T: Send + 'static,
        F: Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
                match stmt.query_row([id], |row| mapper(row)) {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(map_query_error)
    }
}

// ============================================================================
// UserRepository
// ============================================================================

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn list_users(&self) -> Result<Vec<User>> {
        self.query_rows(schema::SELECT_USERS, row_to_user).await
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.query_row_by_id(schema::SELECT_USER_BY_ID, id, row_to_user)
            .await
    }

    async fn create_user(&self, new: &NewUser) -> Result<User> {
        let new = new.clone();
        let email = new.email.clone();
        self.conn
            .call(move |conn| {
                let now = Utc::now();
                conn.execute(
                    schema::INSERT_USER,
                    rusqlite::params![new.name, new.email, format_ts(&now), format_ts(&now)],
                )
                .map_err(wrap_err)?;
                let id = conn.last_insert_rowid();
                Ok(User {
                    id,
                    name: new.name,
                    email: new.email,
                    created_at: now,
                    updated_at: now,
                })
            })
            .await
            .map_err(|e| map_call_error(e, "User", email))
    }

    async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<User> {
        let patch = patch.clone();
        let conflict_id = patch.email.clone().unwrap_or_else(|| id.to_string());
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_USER_BY_ID).map_err(wrap_err)?;
                let mut user = match stmt.query_row([id], row_to_user) {
                    Ok(user) => user,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(wrap_err(e)),
                };
                user.apply(&patch);
                conn.execute(
                    schema::UPDATE_USER,
                    rusqlite::params![id, user.name, user.email, format_ts(&user.updated_at)],
                )
                .map_err(wrap_err)?;
                Ok(Some(user))
            })
            .await
            .map_err(|e| map_call_error(e, "User", conflict_id))?
            .ok_or_else(|| RepositoryError::not_found("User", id))
    }

    async fn delete_user(&self, id: i64) -> Result<User> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_USER_BY_ID).map_err(wrap_err)?;
                let user = match stmt.query_row([id], row_to_user) {
                    Ok(user) => user,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(wrap_err(e)),
                };
                conn.execute(schema::DELETE_USER, [id]).map_err(wrap_err)?;
                Ok(Some(user))
            })
            .await
            .map_err(map_query_error)?
            .ok_or_else(|| RepositoryError::not_found("User", id))
    }
}

// ============================================================================
// CategoryRepository
// ============================================================================

#[async_trait]
impl CategoryRepository for SqliteRepository {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.query_rows(schema::SELECT_CATEGORIES, row_to_category)
            .await
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        self.query_row_by_id(schema::SELECT_CATEGORY_BY_ID, id, row_to_category)
            .await
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let slug = slug.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_CATEGORY_BY_SLUG)
                    .map_err(wrap_err)?;
                match stmt.query_row([&slug], row_to_category) {
                    Ok(category) => Ok(Some(category)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(map_query_error)
    }

    async fn create_category(&self, new: &NewCategory) -> Result<Category> {
        let new = new.clone();
        let slug = new.slug.clone();
        self.conn
            .call(move |conn| {
                let now = Utc::now();
                conn.execute(
                    schema::INSERT_CATEGORY,
                    rusqlite::params![new.name, new.slug, format_ts(&now), format_ts(&now)],
                )
                .map_err(wrap_err)?;
                let id = conn.last_insert_rowid();
                Ok(Category {
                    id,
                    name: new.name,
                    slug: new.slug,
                    created_at: now,
                    updated_at: now,
                })
            })
            .await
            .map_err(|e| map_call_error(e, "Category", slug))
    }

    async fn update_category(&self, id: i64, patch: &CategoryPatch) -> Result<Category> {
        let patch = patch.clone();
        let conflict_id = patch.slug.clone().unwrap_or_else(|| id.to_string());
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_CATEGORY_BY_ID)
                    .map_err(wrap_err)?;
                let mut category = match stmt.query_row([id], row_to_category) {
                    Ok(category) => category,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(wrap_err(e)),
                };
                category.apply(&patch);
                conn.execute(
                    schema::UPDATE_CATEGORY,
                    rusqlite::params![
                        id,
                        category.name,
                        category.slug,
                        format_ts(&category.updated_at)
                    ],
                )
                .map_err(wrap_err)?;
                Ok(Some(category))
            })
            .await
            .map_err(|e| map_call_error(e, "Category", conflict_id))?
            .ok_or_else(|| RepositoryError::not_found("Category", id))
    }

    async fn delete_category(&self, id: i64) -> Result<Category> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let category = {
                    let mut stmt = tx
                        .prepare(schema::SELECT_CATEGORY_BY_ID)
                        .map_err(wrap_err)?;
                    match stmt.query_row([id], row_to_category) {
                        Ok(category) => category,
                        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                        Err(e) => return Err(wrap_err(e)),
                    }
                };
                tx.execute(schema::ORPHAN_CATEGORY_PRODUCTS, [id])
                    .map_err(wrap_err)?;
                tx.execute(schema::DELETE_CATEGORY, [id]).map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(Some(category))
            })
            .await
            .map_err(map_query_error)?
            .ok_or_else(|| RepositoryError::not_found("Category", id))
    }
}

// ============================================================================
// ProductRepository
// ============================================================================

#[async_trait]
impl ProductRepository for SqliteRepository {
    async fn list_products(&self, category_id: Option<i64>) -> Result<Vec<Product>> {
        match category_id {
            None => self.query_rows(schema::SELECT_PRODUCTS, row_to_product).await,
            Some(category_id) => self
                .conn
                .call(move |conn| {
                    let mut stmt = conn
                        .prepare(schema::SELECT_PRODUCTS_BY_CATEGORY)
                        .map_err(wrap_err)?;
                    let rows = stmt
                        .query_map([category_id], row_to_product)
                        .map_err(wrap_err)?
                        .collect::<rusqlite::Result<Vec<_>>>()
                        .map_err(wrap_err)?;
                    Ok(rows)
                })
                .await
                .map_err(map_query_error),
        }
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        self.query_row_by_id(schema::SELECT_PRODUCT_BY_ID, id, row_to_product)
            .await
    }

    async fn create_product(&self, new: &NewProduct) -> Result<Product> {
        let new = new.clone();
        let outcome = self
            .conn
            .call(move |conn| {
                if let Some(category_id) = new.category_id {
                    if !category_exists(conn, category_id).map_err(wrap_err)? {
                        return Ok(WriteOutcome::Missing("Category", category_id));
                    }
                }
                let now = Utc::now();
                conn.execute(
                    schema::INSERT_PRODUCT,
                    rusqlite::params![
                        new.name,
                        new.description,
                        new.price,
                        new.stock,
                        new.category_id,
                        format_ts(&now),
                        format_ts(&now)
                    ],
                )
                .map_err(wrap_err)?;
                let id = conn.last_insert_rowid();
                Ok(WriteOutcome::Done(Product {
                    id,
                    name: new.name,
                    description: new.description,
                    price: new.price,
                    stock: new.stock,
                    category_id: new.category_id,
                    created_at: now,
                    updated_at: now,
                }))
            })
            .await
            .map_err(map_query_error)?;

        match outcome {
            WriteOutcome::Done(product) => Ok(product),
            WriteOutcome::Missing(entity, id) => Err(RepositoryError::not_found(entity, id)),
        }
    }

    async fn update_product(&self, id: i64, patch: &ProductPatch) -> Result<Product> {
        let patch = patch.clone();
        let outcome = self
            .conn
            .call(move |conn| {
                if let Some(category_id) = patch.category_id {
                    if !category_exists(conn, category_id).map_err(wrap_err)? {
                        return Ok(WriteOutcome::Missing("Category", category_id));
                    }
                }
                let mut stmt = conn
                    .prepare(schema::SELECT_PRODUCT_BY_ID)
                    .map_err(wrap_err)?;
                let mut product = match stmt.query_row([id], row_to_product) {
                    Ok(product) => product,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        return Ok(WriteOutcome::Missing("Product", id));
                    }
                    Err(e) => return Err(wrap_err(e)),
                };
                product.apply(&patch);
                conn.execute(
                    schema::UPDATE_PRODUCT,
                    rusqlite::params![
                        id,
                        product.name,
                        product.description,
                        product.price,
                        product.stock,
                        product.category_id,
                        format_ts(&product.updated_at)
                    ],
                )
                .map_err(wrap_err)?;
                Ok(WriteOutcome::Done(product))
            })
            .await
            .map_err(map_query_error)?;

        match outcome {
            WriteOutcome::Done(product) => Ok(product),
            WriteOutcome::Missing(entity, id) => Err(RepositoryError::not_found(entity, id)),
        }
    }

    async fn delete_product(&self, id: i64) -> Result<Product> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_PRODUCT_BY_ID)
                    .map_err(wrap_err)?;
                let product = match stmt.query_row([id], row_to_product) {
                    Ok(product) => product,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(wrap_err(e)),
                };
                conn.execute(schema::DELETE_PRODUCT, [id]).map_err(wrap_err)?;
                Ok(Some(product))
            })
            .await
            .map_err(map_query_error)?
            .ok_or_else(|| RepositoryError::not_found("Product", id))
    }
}

fn category_exists(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM categories WHERE id = ?1")?;
    stmt.exists([id])
}

// ============================================================================
// OrderRepository
// ============================================================================

#[async_trait]
impl OrderRepository for SqliteRepository {
    async fn list_orders(&self) -> Result<Vec<Order>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(schema::SELECT_ORDERS).map_err(wrap_err)?;
                let mut rows = stmt.query([]).map_err(wrap_err)?;
                let mut orders = Vec::new();
                while let Some(row) = rows.next().map_err(wrap_err)? {
                    orders.push(load_order(conn, row).map_err(wrap_err)?);
                }
                Ok(orders)
            })
            .await
            .map_err(map_query_error)
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_ORDER_BY_ID).map_err(wrap_err)?;
                let mut rows = stmt.query([id]).map_err(wrap_err)?;
                match rows.next().map_err(wrap_err)? {
                    Some(row) => Ok(Some(load_order(conn, row).map_err(wrap_err)?)),
                    None => Ok(None),
                }
            })
            .await
            .map_err(map_query_error)
    }

    async fn list_orders_by_user(&self, user_id: i64) -> Result<Vec<Order>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_ORDERS_BY_USER)
                    .map_err(wrap_err)?;
                let mut rows = stmt.query([user_id]).map_err(wrap_err)?;
                let mut orders = Vec::new();
                while let Some(row) = rows.next().map_err(wrap_err)? {
                    orders.push(load_order(conn, row).map_err(wrap_err)?);
                }
                Ok(orders)
            })
            .await
            .map_err(map_query_error)
    }

    async fn create_order(&self, new: &NewOrder) -> Result<Order> {
        if new.items.is_empty() {
            return Err(RepositoryError::InvalidData(
                "order must contain at least one item".to_string(),
            ));
        }
        if new.items.iter().any(|item| item.quantity == 0) {
            return Err(RepositoryError::InvalidData(
                "quantity must be positive".to_string(),
            ));
        }

        let new = new.clone();
        let outcome = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;

                let user_exists = {
                    let mut stmt = tx
                        .prepare("SELECT 1 FROM users WHERE id = ?1")
                        .map_err(wrap_err)?;
                    stmt.exists([new.user_id]).map_err(wrap_err)?
                };
                if !user_exists {
                    return Ok(WriteOutcome::Missing("User", new.user_id));
                }

                // Snapshot current prices and derive the total.
                let mut priced = Vec::with_capacity(new.items.len());
                for item in &new.items {
                    let price: f64 = {
                        let mut stmt = tx
                            .prepare("SELECT price FROM products WHERE id = ?1")
                            .map_err(wrap_err)?;
                        match stmt.query_row([item.product_id], |row| row.get(0)) {
                            Ok(price) => price,
                            Err(rusqlite::Error::QueryReturnedNoRows) => {
                                return Ok(WriteOutcome::Missing("Product", item.product_id));
                            }
                            Err(e) => return Err(wrap_err(e)),
                        }
                    };
                    priced.push((item.product_id, item.quantity, price));
                }
                let total: f64 = priced
                    .iter()
                    .map(|(_, quantity, price)| price * f64::from(*quantity))
                    .sum();

                let now = Utc::now();
                tx.execute(
                    schema::INSERT_ORDER,
                    rusqlite::params![new.user_id, "pending", total, format_ts(&now), format_ts(&now)],
                )
                .map_err(wrap_err)?;
                let order_id = tx.last_insert_rowid();

                let mut items = Vec::with_capacity(priced.len());
                for (product_id, quantity, price) in priced {
                    tx.execute(
                        schema::INSERT_ORDER_ITEM,
                        rusqlite::params![order_id, product_id, quantity, price],
                    )
                    .map_err(wrap_err)?;
                    items.push(OrderItem {
                        id: tx.last_insert_rowid(),
                        order_id,
                        product_id,
                        quantity,
                        unit_price: price,
                    });
                }

                tx.commit().map_err(wrap_err)?;
                Ok(WriteOutcome::Done(Order {
                    id: order_id,
                    user_id: new.user_id,
                    status: "pending".to_string(),
                    total,
                    items,
                    created_at: now,
                    updated_at: now,
                }))
            })
            .await
            .map_err(map_query_error)?;

        match outcome {
            WriteOutcome::Done(order) => Ok(order),
            WriteOutcome::Missing(entity, id) => Err(RepositoryError::not_found(entity, id)),
        }
    }

    async fn update_order_status(&self, id: i64, status: &str) -> Result<Order> {
        let status = status.to_string();
        self.conn
            .call(move |conn| {
                let now = Utc::now();
                let changed = conn
                    .execute(
                        schema::UPDATE_ORDER_STATUS,
                        rusqlite::params![id, status, format_ts(&now)],
                    )
                    .map_err(wrap_err)?;
                if changed == 0 {
                    return Ok(None);
                }
                let mut stmt = conn.prepare(schema::SELECT_ORDER_BY_ID).map_err(wrap_err)?;
                let mut rows = stmt.query([id]).map_err(wrap_err)?;
                match rows.next().map_err(wrap_err)? {
                    Some(row) => Ok(Some(load_order(conn, row).map_err(wrap_err)?)),
                    None => Ok(None),
                }
            })
            .await
            .map_err(map_query_error)?
            .ok_or_else(|| RepositoryError::not_found("Order", id))
    }

    async fn delete_order(&self, id: i64) -> Result<Order> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let order = {
                    let mut stmt = tx.prepare(schema::SELECT_ORDER_BY_ID).map_err(wrap_err)?;
                    let mut rows = stmt.query([id]).map_err(wrap_err)?;
                    match rows.next().map_err(wrap_err)? {
                        Some(row) => load_order(&tx, row).map_err(wrap_err)?,
                        None => return Ok(None),
                    }
                };
                tx.execute(schema::DELETE_ORDER_ITEMS, [id]).map_err(wrap_err)?;
                tx.execute(schema::DELETE_ORDER, [id]).map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(Some(order))
            })
            .await
            .map_err(map_query_error)?
            .ok_or_else(|| RepositoryError::not_found("Order", id))
    }
}
