//! GraphQL API.
//!
//! Implements the GraphQL transport with async-graphql: Query and Mutation
//! resolvers over the same repository trait objects the REST handlers use,
//! so cacheable reads always go through the cache-aside decorators.
//!
//! Endpoints:
//! - POST /graphql - execute queries/mutations
//! - GET /graphql/playground - GraphiQL playground

use async_graphql::{
    Context, EmptySubscription, InputObject, Object, Result as GqlResult, Schema, SimpleObject,
    ID,
};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    response::{Html, IntoResponse},
    Extension,
};

use storefront_core::commerce::{
    Category, CategoryPatch, NewCategory, NewOrder, NewOrderItem, NewProduct, NewUser, Order,
    OrderItem, Product, ProductPatch, User, UserPatch,
};
use storefront_core::storage::RepositoryError;

use crate::state::AppState;

// ============================================================================
// GRAPHQL TYPES
// ============================================================================

/// GraphQL user object.
#[derive(Debug, Clone, SimpleObject)]
pub struct GqlUser {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for GqlUser {
    fn from(u: User) -> Self {
        Self {
            id: ID(u.id.to_string()),
            name: u.name,
            email: u.email,
            created_at: u.created_at.to_rfc3339(),
            updated_at: u.updated_at.to_rfc3339(),
        }
    }
}

/// GraphQL category object.
#[derive(Debug, Clone, SimpleObject)]
pub struct GqlCategory {
    pub id: ID,
    pub name: String,
    pub slug: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Category> for GqlCategory {
    fn from(c: Category) -> Self {
        Self {
            id: ID(c.id.to_string()),
            name: c.name,
            slug: c.slug,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// GraphQL product object.
#[derive(Debug, Clone, SimpleObject)]
pub struct GqlProduct {
    pub id: ID,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: u32,
    pub category_id: Option<ID>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for GqlProduct {
    fn from(p: Product) -> Self {
        Self {
            id: ID(p.id.to_string()),
            name: p.name,
            description: p.description,
            price: p.price,
            stock: p.stock,
            category_id: p.category_id.map(|id| ID(id.to_string())),
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// GraphQL order item object.
#[derive(Debug, Clone, SimpleObject)]
pub struct GqlOrderItem {
    pub id: ID,
    pub product_id: ID,
    pub quantity: u32,
    pub unit_price: f64,
}

impl From<OrderItem> for GqlOrderItem {
    fn from(i: OrderItem) -> Self {
        Self {
            id: ID(i.id.to_string()),
            product_id: ID(i.product_id.to_string()),
            quantity: i.quantity,
            unit_price: i.unit_price,
        }
    }
}

/// GraphQL order object.
#[derive(Debug, Clone, SimpleObject)]
pub struct GqlOrder {
    pub id: ID,
    pub user_id: ID,
    pub status: String,
    pub total: f64,
    pub items: Vec<GqlOrderItem>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for GqlOrder {
    fn from(o: Order) -> Self {
        Self {
            id: ID(o.id.to_string()),
            user_id: ID(o.user_id.to_string()),
            status: o.status,
            total: o.total,
            items: o.items.into_iter().map(Into::into).collect(),
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// INPUT TYPES
// ============================================================================

/// Input for creating a user.
#[derive(Debug, Clone, InputObject)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
}

/// Input for updating a user.
#[derive(Debug, Clone, InputObject)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Input for creating a category.
#[derive(Debug, Clone, InputObject)]
pub struct CreateCategoryInput {
    pub name: String,
    pub slug: String,
}

/// Input for updating a category.
#[derive(Debug, Clone, InputObject)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// Input for creating a product.
#[derive(Debug, Clone, InputObject)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[graphql(default)]
    pub stock: u32,
    pub category_id: Option<ID>,
}

/// Input for updating a product.
#[derive(Debug, Clone, InputObject)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
    pub category_id: Option<ID>,
}

/// Input for one order line.
#[derive(Debug, Clone, InputObject)]
pub struct OrderItemInput {
    pub product_id: ID,
    pub quantity: u32,
}

/// Input for creating an order.
#[derive(Debug, Clone, InputObject)]
pub struct CreateOrderInput {
    pub user_id: ID,
    pub items: Vec<OrderItemInput>,
}

fn parse_id(id: &ID, field: &str) -> GqlResult<i64> {
    id.0.parse::<i64>()
        .map_err(|_| async_graphql::Error::new(format!("Invalid {field}")))
}

fn parse_opt_id(id: Option<&ID>, field: &str) -> GqlResult<Option<i64>> {
    id.map(|id| parse_id(id, field)).transpose()
}

fn gql_err(err: RepositoryError) -> async_graphql::Error {
    async_graphql::Error::new(err.to_string())
}

// ============================================================================
// QUERY ROOT
// ============================================================================

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// List all users.
    async fn users(&self, ctx: &Context<'_>) -> GqlResult<Vec<GqlUser>> {
        let state = ctx.data::<AppState>()?;
        let users = state.user_repo.list_users().await.map_err(gql_err)?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Get a user by ID.
    async fn user(&self, ctx: &Context<'_>, id: ID) -> GqlResult<Option<GqlUser>> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "id")?;
        let user = state.user_repo.get_user(id).await.map_err(gql_err)?;
        Ok(user.map(Into::into))
    }

    /// List all categories.
    async fn categories(&self, ctx: &Context<'_>) -> GqlResult<Vec<GqlCategory>> {
        let state = ctx.data::<AppState>()?;
        let categories = state
            .category_repo
            .list_categories()
            .await
            .map_err(gql_err)?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// Get a category by ID.
    async fn category(&self, ctx: &Context<'_>, id: ID) -> GqlResult<Option<GqlCategory>> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "id")?;
        let category = state.category_repo.get_category(id).await.map_err(gql_err)?;
        Ok(category.map(Into::into))
    }

    /// Get a category by slug.
    async fn category_by_slug(
        &self,
        ctx: &Context<'_>,
        slug: String,
    ) -> GqlResult<Option<GqlCategory>> {
        let state = ctx.data::<AppState>()?;
        let category = state
            .category_repo
            .get_category_by_slug(&slug)
            .await
            .map_err(gql_err)?;
        Ok(category.map(Into::into))
    }

    /// List products, optionally restricted to one category.
    async fn products(
        &self,
        ctx: &Context<'_>,
        category_id: Option<ID>,
    ) -> GqlResult<Vec<GqlProduct>> {
        let state = ctx.data::<AppState>()?;
        let category_id = parse_opt_id(category_id.as_ref(), "categoryId")?;
        let products = state
            .product_repo
            .list_products(category_id)
            .await
            .map_err(gql_err)?;
        Ok(products.into_iter().map(Into::into).collect())
    }

    /// Get a product by ID.
    async fn product(&self, ctx: &Context<'_>, id: ID) -> GqlResult<Option<GqlProduct>> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "id")?;
        let product = state.product_repo.get_product(id).await.map_err(gql_err)?;
        Ok(product.map(Into::into))
    }

    /// List all orders.
    async fn orders(&self, ctx: &Context<'_>) -> GqlResult<Vec<GqlOrder>> {
        let state = ctx.data::<AppState>()?;
        let orders = state.order_repo.list_orders().await.map_err(gql_err)?;
        Ok(orders.into_iter().map(Into::into).collect())
    }

    /// Get an order by ID.
    async fn order(&self, ctx: &Context<'_>, id: ID) -> GqlResult<Option<GqlOrder>> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "id")?;
        let order = state.order_repo.get_order(id).await.map_err(gql_err)?;
        Ok(order.map(Into::into))
    }

    /// List the orders of one user.
    async fn orders_by_user(&self, ctx: &Context<'_>, user_id: ID) -> GqlResult<Vec<GqlOrder>> {
        let state = ctx.data::<AppState>()?;
        let user_id = parse_id(&user_id, "userId")?;
        let orders = state
            .order_repo
            .list_orders_by_user(user_id)
            .await
            .map_err(gql_err)?;
        Ok(orders.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// MUTATION ROOT
// ============================================================================

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a new user.
    async fn create_user(&self, ctx: &Context<'_>, input: CreateUserInput) -> GqlResult<GqlUser> {
        let state = ctx.data::<AppState>()?;
        let new = NewUser {
            name: input.name,
            email: input.email,
        };
        let user = state.user_repo.create_user(&new).await.map_err(gql_err)?;
        Ok(user.into())
    }

    /// Update an existing user.
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateUserInput,
    ) -> GqlResult<GqlUser> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "id")?;
        let patch = UserPatch {
            name: input.name,
            email: input.email,
        };
        let user = state
            .user_repo
            .update_user(id, &patch)
            .await
            .map_err(gql_err)?;
        Ok(user.into())
    }

    /// Delete a user.
    async fn delete_user(&self, ctx: &Context<'_>, id: ID) -> GqlResult<GqlUser> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "id")?;
        let user = state.user_repo.delete_user(id).await.map_err(gql_err)?;
        Ok(user.into())
    }

    /// Create a new category.
    async fn create_category(
        &self,
        ctx: &Context<'_>,
        input: CreateCategoryInput,
    ) -> GqlResult<GqlCategory> {
        let state = ctx.data::<AppState>()?;
        let new = NewCategory {
            name: input.name,
            slug: input.slug,
        };
        let category = state
            .category_repo
            .create_category(&new)
            .await
            .map_err(gql_err)?;
        Ok(category.into())
    }

    /// Update an existing category.
    async fn update_category(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateCategoryInput,
    ) -> GqlResult<GqlCategory> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "id")?;
        let patch = CategoryPatch {
            name: input.name,
            slug: input.slug,
        };
        let category = state
            .category_repo
            .update_category(id, &patch)
            .await
            .map_err(gql_err)?;
        Ok(category.into())
    }

    /// Delete a category.
    async fn delete_category(&self, ctx: &Context<'_>, id: ID) -> GqlResult<GqlCategory> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "id")?;
        let category = state
            .category_repo
            .delete_category(id)
            .await
            .map_err(gql_err)?;
        Ok(category.into())
    }

    /// Create a new product.
    async fn create_product(
        &self,
        ctx: &Context<'_>,
        input: CreateProductInput,
    ) -> GqlResult<GqlProduct> {
        let state = ctx.data::<AppState>()?;
        if input.price < 0.0 || !input.price.is_finite() {
            return Err(async_graphql::Error::new("price must be non-negative"));
        }
        let new = NewProduct {
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
            category_id: parse_opt_id(input.category_id.as_ref(), "categoryId")?,
        };
        let product = state
            .product_repo
            .create_product(&new)
            .await
            .map_err(gql_err)?;
        Ok(product.into())
    }

    /// Update an existing product.
    async fn update_product(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateProductInput,
    ) -> GqlResult<GqlProduct> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "id")?;
        if let Some(price) = input.price {
            if price < 0.0 || !price.is_finite() {
                return Err(async_graphql::Error::new("price must be non-negative"));
            }
        }
        let patch = ProductPatch {
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
            category_id: parse_opt_id(input.category_id.as_ref(), "categoryId")?,
        };
        let product = state
            .product_repo
            .update_product(id, &patch)
            .await
            .map_err(gql_err)?;
        Ok(product.into())
    }

    /// Delete a product.
    async fn delete_product(&self, ctx: &Context<'_>, id: ID) -> GqlResult<GqlProduct> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "id")?;
        let product = state
            .product_repo
            .delete_product(id)
            .await
            .map_err(gql_err)?;
        Ok(product.into())
    }

    /// Create a new order from product references and quantities.
    async fn create_order(
        &self,
        ctx: &Context<'_>,
        input: CreateOrderInput,
    ) -> GqlResult<GqlOrder> {
        let state = ctx.data::<AppState>()?;
        let items = input
            .items
            .iter()
            .map(|item| {
                Ok(NewOrderItem {
                    product_id: parse_id(&item.product_id, "productId")?,
                    quantity: item.quantity,
                })
            })
            .collect::<GqlResult<Vec<_>>>()?;
        let new = NewOrder {
            user_id: parse_id(&input.user_id, "userId")?,
            items,
        };
        let order = state.order_repo.create_order(&new).await.map_err(gql_err)?;
        Ok(order.into())
    }

    /// Replace an order's status label.
    async fn update_order_status(
        &self,
        ctx: &Context<'_>,
        id: ID,
        status: String,
    ) -> GqlResult<GqlOrder> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "id")?;
        let order = state
            .order_repo
            .update_order_status(id, &status)
            .await
            .map_err(gql_err)?;
        Ok(order.into())
    }

    /// Delete an order.
    async fn delete_order(&self, ctx: &Context<'_>, id: ID) -> GqlResult<GqlOrder> {
        let state = ctx.data::<AppState>()?;
        let id = parse_id(&id, "id")?;
        let order = state.order_repo.delete_order(id).await.map_err(gql_err)?;
        Ok(order.into())
    }
}

// ============================================================================
// SCHEMA & HANDLERS
// ============================================================================

/// The GraphQL schema type.
pub type StorefrontSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Create the GraphQL schema with the application state attached.
pub fn create_schema(state: AppState) -> StorefrontSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state)
        .finish()
}

/// Handler for GraphQL requests.
pub async fn graphql_handler(
    Extension(schema): Extension<StorefrontSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

/// Handler for the GraphiQL playground.
pub async fn graphiql_handler() -> impl IntoResponse {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gql_product_from_domain() {
        let product = Product::new(
            7,
            NewProduct {
                name: "Laptop".to_string(),
                description: Some("Thin".to_string()),
                price: 1500.0,
                stock: 3,
                category_id: Some(1),
            },
        );

        let gql: GqlProduct = product.into();
        assert_eq!(gql.id, ID("7".to_string()));
        assert_eq!(gql.price, 1500.0);
        assert_eq!(gql.category_id, Some(ID("1".to_string())));
    }

    #[test]
    fn test_gql_order_from_domain() {
        let order = Order::new(3, 7, vec![OrderItem::new(1, 3, 9, 2, 10.0)]);

        let gql: GqlOrder = order.into();
        assert_eq!(gql.id, ID("3".to_string()));
        assert_eq!(gql.user_id, ID("7".to_string()));
        assert_eq!(gql.total, 20.0);
        assert_eq!(gql.items.len(), 1);
        assert_eq!(gql.items[0].unit_price, 10.0);
    }

    #[test]
    fn test_parse_id_rejects_non_numeric() {
        assert!(parse_id(&ID("7".to_string()), "id").is_ok());
        assert!(parse_id(&ID("not-a-number".to_string()), "id").is_err());
    }

    #[cfg(feature = "inmemory")]
    #[tokio::test]
    async fn test_schema_executes_queries_end_to_end() {
        let state = AppState::for_tests();
        let schema = create_schema(state.clone());

        let response = schema
            .execute(r#"mutation { createUser(input: {name: "John", email: "john@example.com"}) { id name } }"#)
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let response = schema.execute("{ users { name email } }").await;
        assert!(response.errors.is_empty());
        let data = response.data.into_json().unwrap();
        assert_eq!(data["users"][0]["name"], "John");
    }

    #[cfg(feature = "inmemory")]
    #[tokio::test]
    async fn test_schema_surfaces_not_found_as_null() {
        let state = AppState::for_tests();
        let schema = create_schema(state);

        let response = schema.execute(r#"{ user(id: "42") { name } }"#).await;
        assert!(response.errors.is_empty());
        let data = response.data.into_json().unwrap();
        assert!(data["user"].is_null());
    }
}
