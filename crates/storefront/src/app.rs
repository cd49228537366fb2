use std::time::Duration;

use axum::{
    http::{header, Method},
    routing::{get, patch, post},
    Extension, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    graphql,
    handlers::{
        cache_admin::{
            cache_delete_entry, cache_flush, cache_get_entry, cache_keys, cache_set_entry,
            cache_status, cache_test,
        },
        categories::{
            create_category, delete_category, get_category, get_category_by_slug, list_categories,
            update_category,
        },
        health::health,
        orders::{
            create_order, delete_order, get_order, list_orders, list_orders_by_user,
            update_order_status,
        },
        products::{create_product, delete_product, get_product, list_products, update_product},
        users::{create_user, delete_user, get_user, list_users, update_user},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        // User routes
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        // Category routes
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/categories/slug/{slug}", get(get_category_by_slug))
        // Product routes
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        // Order routes
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order).delete(delete_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/orders/user/{user_id}", get(list_orders_by_user))
        // Cache diagnostics
        .route("/cache/status", get(cache_status))
        .route("/cache/test", post(cache_test))
        .route("/cache/keys", get(cache_keys))
        .route("/cache/entry", post(cache_set_entry))
        .route(
            "/cache/entry/{key}",
            get(cache_get_entry).delete(cache_delete_entry),
        )
        .route("/cache/flush", post(cache_flush))
        .layer(cors);

    let schema = graphql::create_schema(state.clone());

    Router::new()
        .route("/health", get(health))
        .route("/graphql", post(graphql::graphql_handler))
        .route("/graphql/playground", get(graphql::graphiql_handler))
        .nest("/api", api_routes)
        .layer(Extension(schema))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .with_state(state)
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_app(AppState::for_tests());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_users_empty() {
        let app = create_app(AppState::for_tests());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json, json!([]));
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let app = create_app(AppState::for_tests());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/users",
                json!({"name": "John", "email": "john@example.com"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let user = response_json(response).await;
        assert_eq!(user["name"], "John");
        assert_eq!(user["email"], "john@example.com");

        let user_id = user["id"].as_i64().unwrap();
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/users/{user_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_nonexistent_user() {
        let app = create_app(AppState::for_tests());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/users/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_user_lifecycle() {
        let app = create_app(AppState::for_tests());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/users",
                json!({"name": "Jane", "email": "jane@example.com"}),
            ))
            .await
            .unwrap();
        let user = response_json(response).await;
        let user_id = user["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/users/{user_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/users/{user_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_category_slug_conflicts() {
        let app = create_app(AppState::for_tests());

        let payload = json!({"name": "Electronics", "slug": "electronics"});
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/categories", payload.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(json_request("POST", "/api/categories", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let app = create_app(AppState::for_tests());

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/products",
                json!({"name": "Laptop", "price": -1.0}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    /// The end-to-end catalog scenario: category -> product -> filtered
    /// listing -> price update visible on the single-product read -> delete
    /// empties the listing again.
    #[tokio::test]
    async fn test_catalog_scenario() {
        let app = create_app(AppState::for_tests());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/categories",
                json!({"name": "Electronics", "slug": "electronics"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let category = response_json(response).await;
        let category_id = category["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/products",
                json!({"name": "Laptop", "price": 1500.0, "categoryId": category_id}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let product = response_json(response).await;
        let product_id = product["id"].as_i64().unwrap();

        // The filtered listing contains the laptop (and populates the cache).
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/products?categoryId={category_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let listing = response_json(response).await;
        assert_eq!(listing.as_array().unwrap().len(), 1);
        assert_eq!(listing[0]["name"], "Laptop");

        // Update the price; the single-product read must reflect it at once.
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/products/{product_id}"),
                json!({"price": 1400.0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/products/{product_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let fetched = response_json(response).await;
        assert_eq!(fetched["price"], 1400.0);

        // So must the (invalidated) filtered listing.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/products?categoryId={category_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let listing = response_json(response).await;
        assert_eq!(listing[0]["price"], 1400.0);

        // Delete; the listing re-populates as empty.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/products/{product_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/products?categoryId={category_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let listing = response_json(response).await;
        assert_eq!(listing, json!([]));
    }

    #[tokio::test]
    async fn test_order_flow() {
        let app = create_app(AppState::for_tests());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/users",
                json!({"name": "John", "email": "john@example.com"}),
            ))
            .await
            .unwrap();
        let user_id = response_json(response).await["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/products",
                json!({"name": "Mug", "price": 10.0, "stock": 5}),
            ))
            .await
            .unwrap();
        let product_id = response_json(response).await["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/orders",
                json!({"userId": user_id, "items": [{"productId": product_id, "quantity": 3}]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let order = response_json(response).await;
        assert_eq!(order["total"], 30.0);
        assert_eq!(order["status"], "pending");
        let order_id = order["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/orders/{order_id}/status"),
                json!({"status": "shipped"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await["status"], "shipped");

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/orders/user/{user_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let orders = response_json(response).await;
        assert_eq!(orders.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cache_status_endpoint() {
        let app = create_app(AppState::for_tests());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cache/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["live"], true);
        assert_eq!(json["backend"], "memory");
    }

    #[tokio::test]
    async fn test_cache_entry_roundtrip_and_flush() {
        let app = create_app(AppState::for_tests());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/cache/entry",
                json!({"key": "demo:1", "value": {"hello": "world"}}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/cache/entry/demo:1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["exists"], true);
        assert_eq!(json["value"]["hello"], "world");

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/cache/flush", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cache/entry/demo:1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = response_json(response).await;
        assert_eq!(json["exists"], false);
    }

    #[tokio::test]
    async fn test_graphql_endpoint() {
        let app = create_app(AppState::for_tests());

        let response = app
            .oneshot(json_request(
                "POST",
                "/graphql",
                json!({"query": "{ products { id name } }"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["data"]["products"], json!([]));
    }
}
