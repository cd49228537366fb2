use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a user from a write payload with a store-assigned id.
    pub fn new(id: i64, new: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: new.name,
            email: new.email,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the provided fields of a patch and bumps `updated_at`.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        self.updated_at = Utc::now();
    }
}

/// Write payload for creating a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Partial update for a user; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A product grouping with a unique URL slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Creates a category from a write payload with a store-assigned id.
    pub fn new(id: i64, new: NewCategory) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: new.name,
            slug: new.slug,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the provided fields of a patch and bumps `updated_at`.
    pub fn apply(&mut self, patch: &CategoryPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(slug) = &patch.slug {
            self.slug = slug.clone();
        }
        self.updated_at = Utc::now();
    }
}

/// Write payload for creating a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
}

/// Partial update for a category; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// A sellable item, optionally assigned to a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Unit price; never negative.
    pub price: f64,
    /// Units on hand.
    pub stock: u32,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product from a write payload with a store-assigned id.
    pub fn new(id: i64, new: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: new.name,
            description: new.description,
            price: new.price,
            stock: new.stock,
            category_id: new.category_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the provided fields of a patch and bumps `updated_at`.
    pub fn apply(&mut self, patch: &ProductPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = Some(category_id);
        }
        self.updated_at = Utc::now();
    }
}

/// Write payload for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, alias = "categoryId")]
    pub category_id: Option<i64>,
}

/// Partial update for a product; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
    #[serde(default, alias = "categoryId")]
    pub category_id: Option<i64>,
}

/// A line item within an order.
///
/// `unit_price` is captured when the order is created and never changes,
/// regardless of later product price updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub unit_price: f64,
}

impl OrderItem {
    pub fn new(id: i64, order_id: i64, product_id: i64, quantity: u32, unit_price: f64) -> Self {
        Self {
            id,
            order_id,
            product_id,
            quantity,
            unit_price,
        }
    }

    /// Line total for this item.
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// A customer order with one or more line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    /// Free-text state label; new orders start as `"pending"`.
    pub status: String,
    /// Sum of the item subtotals, computed at creation time.
    pub total: f64,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a pending order from already-priced items, deriving the total.
    pub fn new(id: i64, user_id: i64, items: Vec<OrderItem>) -> Self {
        let now = Utc::now();
        let total = items.iter().map(OrderItem::subtotal).sum();
        Self {
            id,
            user_id,
            status: "pending".to_string(),
            total,
            items,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Write payload for creating an order. Prices are not accepted from the
/// caller; the data store snapshots them from the current product rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    #[serde(alias = "userId")]
    pub user_id: i64,
    pub items: Vec<NewOrderItem>,
}

/// A requested line item: which product, and how many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    #[serde(alias = "productId")]
    pub product_id: i64,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total_is_sum_of_item_subtotals() {
        let items = vec![
            OrderItem::new(1, 1, 10, 2, 1500.0),
            OrderItem::new(2, 1, 11, 1, 49.5),
        ];
        let order = Order::new(1, 7, items);

        assert_eq!(order.total, 3049.5);
        assert_eq!(order.status, "pending");
        assert_eq!(order.user_id, 7);
    }

    #[test]
    fn test_order_with_no_items_has_zero_total() {
        let order = Order::new(1, 1, Vec::new());
        assert_eq!(order.total, 0.0);
    }

    #[test]
    fn test_product_apply_updates_only_provided_fields() {
        let mut product = Product::new(
            1,
            NewProduct {
                name: "Laptop".to_string(),
                description: Some("Thin".to_string()),
                price: 1500.0,
                stock: 3,
                category_id: Some(2),
            },
        );

        product.apply(&ProductPatch {
            price: Some(1400.0),
            ..Default::default()
        });

        assert_eq!(product.price, 1400.0);
        assert_eq!(product.name, "Laptop");
        assert_eq!(product.stock, 3);
        assert_eq!(product.category_id, Some(2));
    }

    #[test]
    fn test_product_apply_can_move_category() {
        let mut product = Product::new(
            1,
            NewProduct {
                name: "Laptop".to_string(),
                description: None,
                price: 1500.0,
                stock: 0,
                category_id: Some(1),
            },
        );

        product.apply(&ProductPatch {
            category_id: Some(2),
            ..Default::default()
        });

        assert_eq!(product.category_id, Some(2));
    }

    #[test]
    fn test_user_apply() {
        let mut user = User::new(
            1,
            NewUser {
                name: "John".to_string(),
                email: "john@example.com".to_string(),
            },
        );

        user.apply(&UserPatch {
            email: Some("john.doe@example.com".to_string()),
            ..Default::default()
        });

        assert_eq!(user.name, "John");
        assert_eq!(user.email, "john.doe@example.com");
    }

    #[test]
    fn test_item_subtotal() {
        let item = OrderItem::new(1, 1, 5, 3, 9.99);
        assert!((item.subtotal() - 29.97).abs() < 1e-9);
    }
}
