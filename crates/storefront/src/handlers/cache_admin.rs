//! Cache diagnostics endpoints.
//!
//! Operational surface for inspecting and poking the cache directly: report
//! liveness, list keys, get/set/delete a single entry, and flush everything.
//! None of this is used by the entity services.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{cache::probe::probe_liveness, handlers::AppError, state::AppState};

/// Query parameters for key listing.
#[derive(Debug, Deserialize)]
pub struct KeysQuery {
    pub pattern: Option<String>,
}

/// Body for the set-then-get round-trip test.
#[derive(Debug, Deserialize)]
pub struct TestPayload {
    pub key: Option<String>,
    pub value: Option<String>,
}

/// Body for setting a single entry.
#[derive(Debug, Deserialize)]
pub struct SetEntryPayload {
    pub key: String,
    pub value: serde_json::Value,
    pub ttl_seconds: Option<u64>,
}

/// GET /api/cache/status - liveness probe, backend label, and key census.
pub async fn cache_status(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let live = probe_liveness(state.cache.as_ref()).await;
    let keys = state.cache.list_keys("*").await.unwrap_or_default();

    let message = if live {
        format!("Cache is live ({} backend)", state.cache_backend)
    } else {
        "Cache round-trip failed".to_string()
    };

    Ok(Json(json!({
        "live": live,
        "backend": state.cache_backend,
        "total_keys": keys.len(),
        "keys": keys,
        "message": message,
    })))
}

/// POST /api/cache/test - set a value, read it back, report the match.
pub async fn cache_test(
    State(state): State<AppState>,
    Json(payload): Json<TestPayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = payload.key.unwrap_or_else(|| "test:key".to_string());
    let value = payload
        .value
        .unwrap_or_else(|| format!("test-value-{}", uuid::Uuid::new_v4()));

    state
        .cache
        .set(&key, value.as_bytes(), Some(std::time::Duration::from_secs(60)))
        .await?;
    let retrieved = state.cache.get(&key).await?;
    let matches = retrieved.as_deref() == Some(value.as_bytes());

    Ok(Json(json!({
        "key": key,
        "value": value,
        "match": matches,
        "message": if matches {
            "Cache test passed: value stored and retrieved correctly"
        } else {
            "Cache test failed: value mismatch"
        },
    })))
}

/// GET /api/cache/keys?pattern=... - list keys matching a glob pattern.
pub async fn cache_keys(
    State(state): State<AppState>,
    Query(query): Query<KeysQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let pattern = query.pattern.unwrap_or_else(|| "*".to_string());
    let keys = state.cache.list_keys(&pattern).await?;

    Ok(Json(json!({
        "pattern": pattern,
        "count": keys.len(),
        "keys": keys,
    })))
}

/// GET /api/cache/entry/{key} - read a single entry.
pub async fn cache_get_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let value = state.cache.get(&key).await?;
    let exists = value.is_some();

    // Cached values are JSON; fall back to a lossy string for anything else.
    let rendered = value.map(|bytes| {
        serde_json::from_slice::<serde_json::Value>(&bytes)
            .unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    });

    Ok(Json(json!({
        "key": key,
        "exists": exists,
        "value": rendered,
        "message": if exists { "Key found" } else { "Key not found" },
    })))
}

/// POST /api/cache/entry - write a single entry.
pub async fn cache_set_entry(
    State(state): State<AppState>,
    Json(payload): Json<SetEntryPayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ttl = std::time::Duration::from_secs(payload.ttl_seconds.unwrap_or(3600));
    let bytes = serde_json::to_vec(&payload.value)?;

    state.cache.set(&payload.key, &bytes, Some(ttl)).await?;
    let verified = state.cache.get(&payload.key).await?.is_some();

    Ok(Json(json!({
        "key": payload.key,
        "ttl_seconds": ttl.as_secs(),
        "verified": verified,
        "message": "Value set successfully",
    })))
}

/// DELETE /api/cache/entry/{key} - drop a single entry.
pub async fn cache_delete_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let existed = state.cache.get(&key).await?.is_some();
    state.cache.delete(&key).await?;

    Ok(Json(json!({
        "key": key,
        "existed": existed,
        "message": if existed { "Key deleted" } else { "Key did not exist" },
    })))
}

/// POST /api/cache/flush - clear every entry.
pub async fn cache_flush(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.cache.clear().await?;
    tracing::info!("Cache flushed");

    Ok(Json(json!({
        "success": true,
        "message": "All cache entries cleared",
    })))
}
