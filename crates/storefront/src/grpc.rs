//! gRPC service implementation.
//!
//! Implements the services defined in `proto/storefront.proto`. Each service
//! delegates to the same repository trait objects as the REST handlers, so
//! the transports stay in parity and cacheable reads go through the
//! cache-aside decorators here too.

use tonic::{Request, Response, Status};

use storefront_core::commerce::{
    Category, CategoryPatch, NewCategory, NewOrder, NewOrderItem, NewProduct, NewUser, Order,
    Product, ProductPatch, User, UserPatch,
};
use storefront_core::storage::RepositoryError;

use crate::state::AppState;

// Include the generated protobuf code.
pub mod proto {
    tonic::include_proto!("storefront");
}

use proto::category_service_server::{CategoryService, CategoryServiceServer};
use proto::order_service_server::{OrderService, OrderServiceServer};
use proto::product_service_server::{ProductService, ProductServiceServer};
use proto::user_service_server::{UserService, UserServiceServer};

// ============================================================================
// CONVERSION HELPERS
// ============================================================================

fn status_from(err: RepositoryError) -> Status {
    match &err {
        RepositoryError::NotFound { .. } => Status::not_found(err.to_string()),
        RepositoryError::AlreadyExists { .. } => Status::already_exists(err.to_string()),
        RepositoryError::ConnectionFailed(_) => Status::unavailable(err.to_string()),
        RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => {
            Status::internal(err.to_string())
        }
        RepositoryError::InvalidData(_) => Status::invalid_argument(err.to_string()),
    }
}

fn user_to_proto(user: &User) -> proto::UserResponse {
    proto::UserResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        created_at: user.created_at.to_rfc3339(),
        updated_at: user.updated_at.to_rfc3339(),
    }
}

fn category_to_proto(category: &Category) -> proto::CategoryResponse {
    proto::CategoryResponse {
        id: category.id,
        name: category.name.clone(),
        slug: category.slug.clone(),
        created_at: category.created_at.to_rfc3339(),
        updated_at: category.updated_at.to_rfc3339(),
    }
}

fn product_to_proto(product: &Product) -> proto::ProductResponse {
    proto::ProductResponse {
        id: product.id,
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price,
        stock: product.stock,
        category_id: product.category_id,
        created_at: product.created_at.to_rfc3339(),
        updated_at: product.updated_at.to_rfc3339(),
    }
}

fn order_to_proto(order: &Order) -> proto::OrderResponse {
    proto::OrderResponse {
        id: order.id,
        user_id: order.user_id,
        status: order.status.clone(),
        total: order.total,
        items: order
            .items
            .iter()
            .map(|item| proto::OrderItemResponse {
                id: item.id,
                order_id: item.order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect(),
        created_at: order.created_at.to_rfc3339(),
        updated_at: order.updated_at.to_rfc3339(),
    }
}

// ============================================================================
// USER SERVICE
// ============================================================================

pub struct UserGrpcService {
    state: AppState,
}

#[tonic::async_trait]
impl UserService for UserGrpcService {
    async fn list_users(
        &self,
        _request: Request<proto::ListUsersRequest>,
    ) -> Result<Response<proto::UserListResponse>, Status> {
        let users = self
            .state
            .user_repo
            .list_users()
            .await
            .map_err(status_from)?;
        Ok(Response::new(proto::UserListResponse {
            users: users.iter().map(user_to_proto).collect(),
        }))
    }

    async fn get_user(
        &self,
        request: Request<proto::GetUserRequest>,
    ) -> Result<Response<proto::UserResponse>, Status> {
        let req = request.into_inner();
        let user = self
            .state
            .user_repo
            .get_user(req.id)
            .await
            .map_err(status_from)?
            .ok_or_else(|| Status::not_found(format!("User not found: {}", req.id)))?;
        Ok(Response::new(user_to_proto(&user)))
    }

    async fn create_user(
        &self,
        request: Request<proto::CreateUserRequest>,
    ) -> Result<Response<proto::UserResponse>, Status> {
        let req = request.into_inner();
        let new = NewUser {
            name: req.name,
            email: req.email,
        };
        let user = self
            .state
            .user_repo
            .create_user(&new)
            .await
            .map_err(status_from)?;
        Ok(Response::new(user_to_proto(&user)))
    }

    async fn update_user(
        &self,
        request: Request<proto::UpdateUserRequest>,
    ) -> Result<Response<proto::UserResponse>, Status> {
        let req = request.into_inner();
        let patch = UserPatch {
            name: req.name,
            email: req.email,
        };
        let user = self
            .state
            .user_repo
            .update_user(req.id, &patch)
            .await
            .map_err(status_from)?;
        Ok(Response::new(user_to_proto(&user)))
    }

    async fn delete_user(
        &self,
        request: Request<proto::DeleteUserRequest>,
    ) -> Result<Response<proto::UserResponse>, Status> {
        let req = request.into_inner();
        let user = self
            .state
            .user_repo
            .delete_user(req.id)
            .await
            .map_err(status_from)?;
        Ok(Response::new(user_to_proto(&user)))
    }
}

// ============================================================================
// CATEGORY SERVICE
// ============================================================================

pub struct CategoryGrpcService {
    state: AppState,
}

#[tonic::async_trait]
impl CategoryService for CategoryGrpcService {
    async fn list_categories(
        &self,
        _request: Request<proto::ListCategoriesRequest>,
    ) -> Result<Response<proto::CategoryListResponse>, Status> {
        let categories = self
            .state
            .category_repo
            .list_categories()
            .await
            .map_err(status_from)?;
        Ok(Response::new(proto::CategoryListResponse {
            categories: categories.iter().map(category_to_proto).collect(),
        }))
    }

    async fn get_category(
        &self,
        request: Request<proto::GetCategoryRequest>,
    ) -> Result<Response<proto::CategoryResponse>, Status> {
        let req = request.into_inner();
        let category = self
            .state
            .category_repo
            .get_category(req.id)
            .await
            .map_err(status_from)?
            .ok_or_else(|| Status::not_found(format!("Category not found: {}", req.id)))?;
        Ok(Response::new(category_to_proto(&category)))
    }

    async fn get_category_by_slug(
        &self,
        request: Request<proto::GetCategoryBySlugRequest>,
    ) -> Result<Response<proto::CategoryResponse>, Status> {
        let req = request.into_inner();
        let category = self
            .state
            .category_repo
            .get_category_by_slug(&req.slug)
            .await
            .map_err(status_from)?
            .ok_or_else(|| Status::not_found(format!("Category not found: {}", req.slug)))?;
        Ok(Response::new(category_to_proto(&category)))
    }

    async fn create_category(
        &self,
        request: Request<proto::CreateCategoryRequest>,
    ) -> Result<Response<proto::CategoryResponse>, Status> {
        let req = request.into_inner();
        let new = NewCategory {
            name: req.name,
            slug: req.slug,
        };
        let category = self
            .state
            .category_repo
            .create_category(&new)
            .await
            .map_err(status_from)?;
        Ok(Response::new(category_to_proto(&category)))
    }

    async fn update_category(
        &self,
        request: Request<proto::UpdateCategoryRequest>,
    ) -> Result<Response<proto::CategoryResponse>, Status> {
        let req = request.into_inner();
        let patch = CategoryPatch {
            name: req.name,
            slug: req.slug,
        };
        let category = self
            .state
            .category_repo
            .update_category(req.id, &patch)
            .await
            .map_err(status_from)?;
        Ok(Response::new(category_to_proto(&category)))
    }

    async fn delete_category(
        &self,
        request: Request<proto::DeleteCategoryRequest>,
    ) -> Result<Response<proto::CategoryResponse>, Status> {
        let req = request.into_inner();
        let category = self
            .state
            .category_repo
            .delete_category(req.id)
            .await
            .map_err(status_from)?;
        Ok(Response::new(category_to_proto(&category)))
    }
}

// ============================================================================
// PRODUCT SERVICE
// ============================================================================

pub struct ProductGrpcService {
    state: AppState,
}

#[tonic::async_trait]
impl ProductService for ProductGrpcService {
    async fn list_products(
        &self,
        request: Request<proto::ListProductsRequest>,
    ) -> Result<Response<proto::ProductListResponse>, Status> {
        let req = request.into_inner();
        let products = self
            .state
            .product_repo
            .list_products(req.category_id)
            .await
            .map_err(status_from)?;
        Ok(Response::new(proto::ProductListResponse {
            products: products.iter().map(product_to_proto).collect(),
        }))
    }

    async fn get_product(
        &self,
        request: Request<proto::GetProductRequest>,
    ) -> Result<Response<proto::ProductResponse>, Status> {
        let req = request.into_inner();
        let product = self
            .state
            .product_repo
            .get_product(req.id)
            .await
            .map_err(status_from)?
            .ok_or_else(|| Status::not_found(format!("Product not found: {}", req.id)))?;
        Ok(Response::new(product_to_proto(&product)))
    }

    async fn create_product(
        &self,
        request: Request<proto::CreateProductRequest>,
    ) -> Result<Response<proto::ProductResponse>, Status> {
        let req = request.into_inner();
        if req.price < 0.0 || !req.price.is_finite() {
            return Err(Status::invalid_argument("price must be non-negative"));
        }
        let new = NewProduct {
            name: req.name,
            description: req.description,
            price: req.price,
            stock: req.stock,
            category_id: req.category_id,
        };
        let product = self
            .state
            .product_repo
            .create_product(&new)
            .await
            .map_err(status_from)?;
        Ok(Response::new(product_to_proto(&product)))
    }

    async fn update_product(
        &self,
        request: Request<proto::UpdateProductRequest>,
    ) -> Result<Response<proto::ProductResponse>, Status> {
        let req = request.into_inner();
        if let Some(price) = req.price {
            if price < 0.0 || !price.is_finite() {
                return Err(Status::invalid_argument("price must be non-negative"));
            }
        }
        let patch = ProductPatch {
            name: req.name,
            description: req.description,
            price: req.price,
            stock: req.stock,
            category_id: req.category_id,
        };
        let product = self
            .state
            .product_repo
            .update_product(req.id, &patch)
            .await
            .map_err(status_from)?;
        Ok(Response::new(product_to_proto(&product)))
    }

    async fn delete_product(
        &self,
        request: Request<proto::DeleteProductRequest>,
    ) -> Result<Response<proto::ProductResponse>, Status> {
        let req = request.into_inner();
        let product = self
            .state
            .product_repo
            .delete_product(req.id)
            .await
            .map_err(status_from)?;
        Ok(Response::new(product_to_proto(&product)))
    }
}

// ============================================================================
// ORDER SERVICE
// ============================================================================

pub struct OrderGrpcService {
    state: AppState,
}

#[tonic::async_trait]
impl OrderService for OrderGrpcService {
    async fn list_orders(
        &self,
        _request: Request<proto::ListOrdersRequest>,
    ) -> Result<Response<proto::OrderListResponse>, Status> {
        let orders = self
            .state
            .order_repo
            .list_orders()
            .await
            .map_err(status_from)?;
        Ok(Response::new(proto::OrderListResponse {
            orders: orders.iter().map(order_to_proto).collect(),
        }))
    }

    async fn get_order(
        &self,
        request: Request<proto::GetOrderRequest>,
    ) -> Result<Response<proto::OrderResponse>, Status> {
        let req = request.into_inner();
        let order = self
            .state
            .order_repo
            .get_order(req.id)
            .await
            .map_err(status_from)?
            .ok_or_else(|| Status::not_found(format!("Order not found: {}", req.id)))?;
        Ok(Response::new(order_to_proto(&order)))
    }

    async fn list_orders_by_user(
        &self,
        request: Request<proto::ListOrdersByUserRequest>,
    ) -> Result<Response<proto::OrderListResponse>, Status> {
        let req = request.into_inner();
        let orders = self
            .state
            .order_repo
            .list_orders_by_user(req.user_id)
            .await
            .map_err(status_from)?;
        Ok(Response::new(proto::OrderListResponse {
            orders: orders.iter().map(order_to_proto).collect(),
        }))
    }

    async fn create_order(
        &self,
        request: Request<proto::CreateOrderRequest>,
    ) -> Result<Response<proto::OrderResponse>, Status> {
        let req = request.into_inner();
        let new = NewOrder {
            user_id: req.user_id,
            items: req
                .items
                .into_iter()
                .map(|item| NewOrderItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
        };
        let order = self
            .state
            .order_repo
            .create_order(&new)
            .await
            .map_err(status_from)?;
        Ok(Response::new(order_to_proto(&order)))
    }

    async fn update_order_status(
        &self,
        request: Request<proto::UpdateOrderStatusRequest>,
    ) -> Result<Response<proto::OrderResponse>, Status> {
        let req = request.into_inner();
        if req.status.trim().is_empty() {
            return Err(Status::invalid_argument("status must not be empty"));
        }
        let order = self
            .state
            .order_repo
            .update_order_status(req.id, &req.status)
            .await
            .map_err(status_from)?;
        Ok(Response::new(order_to_proto(&order)))
    }

    async fn delete_order(
        &self,
        request: Request<proto::DeleteOrderRequest>,
    ) -> Result<Response<proto::OrderResponse>, Status> {
        let req = request.into_inner();
        let order = self
            .state
            .order_repo
            .delete_order(req.id)
            .await
            .map_err(status_from)?;
        Ok(Response::new(order_to_proto(&order)))
    }
}

// ============================================================================
// SERVER ASSEMBLY
// ============================================================================

/// Builds the gRPC server with all four services registered.
pub fn server(state: AppState) -> tonic::transport::server::Router {
    tonic::transport::Server::builder()
        .add_service(UserServiceServer::new(UserGrpcService {
            state: state.clone(),
        }))
        .add_service(CategoryServiceServer::new(CategoryGrpcService {
            state: state.clone(),
        }))
        .add_service(ProductServiceServer::new(ProductGrpcService {
            state: state.clone(),
        }))
        .add_service(OrderServiceServer::new(OrderGrpcService { state }))
}
