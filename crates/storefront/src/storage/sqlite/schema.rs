//! SQL statements for the SQLite backend.

/// Schema creation; idempotent so it can run on every startup.
pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT,
    price       REAL NOT NULL,
    stock       INTEGER NOT NULL,
    category_id INTEGER REFERENCES categories(id),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    status      TEXT NOT NULL,
    total       REAL NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS order_items (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id    INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    product_id  INTEGER NOT NULL,
    quantity    INTEGER NOT NULL,
    unit_price  REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id);
CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);
CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);
";

pub const SELECT_USERS: &str =
    "SELECT id, name, email, created_at, updated_at FROM users ORDER BY id DESC";
pub const SELECT_USER_BY_ID: &str =
    "SELECT id, name, email, created_at, updated_at FROM users WHERE id = ?1";
pub const INSERT_USER: &str =
    "INSERT INTO users (name, email, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)";
pub const UPDATE_USER: &str =
    "UPDATE users SET name = ?2, email = ?3, updated_at = ?4 WHERE id = ?1";
pub const DELETE_USER: &str = "DELETE FROM users WHERE id = ?1";

pub const SELECT_CATEGORIES: &str =
    "SELECT id, name, slug, created_at, updated_at FROM categories ORDER BY id DESC";
pub const SELECT_CATEGORY_BY_ID: &str =
    "SELECT id, name, slug, created_at, updated_at FROM categories WHERE id = ?1";
pub const SELECT_CATEGORY_BY_SLUG: &str =
    "SELECT id, name, slug, created_at, updated_at FROM categories WHERE slug = ?1";
pub const INSERT_CATEGORY: &str =
    "INSERT INTO categories (name, slug, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)";
pub const UPDATE_CATEGORY: &str =
    "UPDATE categories SET name = ?2, slug = ?3, updated_at = ?4 WHERE id = ?1";
pub const DELETE_CATEGORY: &str = "DELETE FROM categories WHERE id = ?1";
pub const ORPHAN_CATEGORY_PRODUCTS: &str =
    "UPDATE products SET category_id = NULL WHERE category_id = ?1";

pub const SELECT_PRODUCTS: &str = "SELECT id, name, description, price, stock, category_id, \
     created_at, updated_at FROM products ORDER BY id DESC";
pub const SELECT_PRODUCTS_BY_CATEGORY: &str =
    "SELECT id, name, description, price, stock, category_id, created_at, updated_at \
     FROM products WHERE category_id = ?1 ORDER BY id DESC";
pub const SELECT_PRODUCT_BY_ID: &str =
    "SELECT id, name, description, price, stock, category_id, created_at, updated_at \
     FROM products WHERE id = ?1";
pub const INSERT_PRODUCT: &str =
    "INSERT INTO products (name, description, price, stock, category_id, created_at, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
pub const UPDATE_PRODUCT: &str =
    "UPDATE products SET name = ?2, description = ?3, price = ?4, stock = ?5, category_id = ?6, \
     updated_at = ?7 WHERE id = ?1";
pub const DELETE_PRODUCT: &str = "DELETE FROM products WHERE id = ?1";

pub const SELECT_ORDERS: &str =
    "SELECT id, user_id, status, total, created_at, updated_at FROM orders ORDER BY id DESC";
pub const SELECT_ORDERS_BY_USER: &str =
    "SELECT id, user_id, status, total, created_at, updated_at FROM orders \
     WHERE user_id = ?1 ORDER BY id DESC";
pub const SELECT_ORDER_BY_ID: &str =
    "SELECT id, user_id, status, total, created_at, updated_at FROM orders WHERE id = ?1";
pub const SELECT_ORDER_ITEMS: &str =
    "SELECT id, order_id, product_id, quantity, unit_price FROM order_items \
     WHERE order_id = ?1 ORDER BY id";
pub const INSERT_ORDER: &str =
    "INSERT INTO orders (user_id, status, total, created_at, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5)";
pub const INSERT_ORDER_ITEM: &str =
    "INSERT INTO order_items (order_id, product_id, quantity, unit_price) \
     VALUES (?1, ?2, ?3, ?4)";
pub const UPDATE_ORDER_STATUS: &str =
    "UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1";
pub const DELETE_ORDER_ITEMS: &str = "DELETE FROM order_items WHERE order_id = ?1";
pub const DELETE_ORDER: &str = "DELETE FROM orders WHERE id = ?1";
