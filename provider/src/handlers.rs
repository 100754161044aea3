//! Per-route request handlers for the user API and the provider-state
//! endpoint.
//!
//! Handlers are total: every failure path is a status code with a
//! `{"detail": ...}` body, and nothing escapes the router/handler boundary
//! except a response value. The permissive field extraction goes through
//! `serde_json::Value` so each malformed-field case gets its own message
//! instead of a blanket deserialization error.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};

use crate::engine::{HttpRequest, HttpResponse, APPLICATION_JSON};
use crate::router::{self, Route};
use crate::state::{self, StateAction};
use crate::store::SharedStore;

/// Routes the request and runs the selected handler.
pub async fn dispatch(store: &SharedStore, request: &HttpRequest) -> HttpResponse {
    match router::route(&request.method, &request.path) {
        Route::GetUser => get_user(store, &request.path).await,
        Route::CreateUser => create_user(store, request.body.as_deref()).await,
        Route::DeleteUser => delete_user(store, &request.path).await,
        Route::ProviderState => change_provider_state(store, request.body.as_deref()).await,
        Route::NotFound => {
            tracing::warn!(method = %request.method, path = %request.path, "unknown route");
            detail(StatusCode::NOT_FOUND, "Not found")
        }
    }
}

async fn get_user(store: &SharedStore, path: &str) -> HttpResponse {
    let Some(id) = router::parse_user_id(path) else {
        return detail(StatusCode::BAD_REQUEST, "Invalid user ID");
    };

    let store = store.read().await;
    match store.find(id) {
        Some(user) => serialize(StatusCode::OK, user),
        None => {
            tracing::info!(id, "user not found");
            detail(StatusCode::NOT_FOUND, "User not found")
        }
    }
}

async fn create_user(store: &SharedStore, body: Option<&[u8]>) -> HttpResponse {
    let Some(body) = non_empty(body) else {
        return detail(StatusCode::BAD_REQUEST, "Missing request body");
    };
    let Ok(payload) = serde_json::from_slice::<Value>(body) else {
        return detail(StatusCode::BAD_REQUEST, "Invalid JSON");
    };
    let name = match payload.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name,
        _ => return detail(StatusCode::BAD_REQUEST, "Missing or invalid name field"),
    };

    // Ids restart from 1000 and step with the current length. Not
    // collision-safe once deletions have happened; the contract fixtures
    // depend on this numbering.
    let mut store = store.write().await;
    let new_id = 1000 + store.len() as i64;
    if store.add(new_id, name).is_err() {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user");
    }
    tracing::info!(id = new_id, name, "user created");

    match store.find(new_id) {
        Some(user) => serialize(StatusCode::CREATED, user),
        None => detail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user"),
    }
}

async fn delete_user(store: &SharedStore, path: &str) -> HttpResponse {
    let Some(id) = router::parse_user_id(path) else {
        return detail(StatusCode::BAD_REQUEST, "Invalid user ID");
    };

    if store.write().await.remove(id).is_err() {
        tracing::info!(id, "user not found for deletion");
        return detail(StatusCode::NOT_FOUND, "User not found");
    }

    tracing::info!(id, "user deleted");
    HttpResponse {
        status: StatusCode::NO_CONTENT,
        body: String::new(),
        content_type: APPLICATION_JSON,
    }
}

async fn change_provider_state(store: &SharedStore, body: Option<&[u8]>) -> HttpResponse {
    let Some(body) = non_empty(body) else {
        return detail(StatusCode::BAD_REQUEST, "Missing request body");
    };
    let Ok(payload) = serde_json::from_slice::<Value>(body) else {
        return detail(StatusCode::BAD_REQUEST, "Invalid JSON");
    };

    let state = payload.get("state").and_then(Value::as_str).unwrap_or("");
    let Some(action) = payload.get("action").and_then(Value::as_str) else {
        return detail(StatusCode::BAD_REQUEST, "Missing or invalid action field");
    };
    let Some(action) = StateAction::parse(action) else {
        tracing::warn!(action, "unknown provider-state action");
        return detail(StatusCode::BAD_REQUEST, "Unknown action");
    };

    // An interaction may declare no precondition; the store stays untouched.
    if state.is_empty() {
        tracing::debug!("empty provider state, no setup needed");
        return success();
    }

    let params = payload.get("params").and_then(Value::as_object);
    state::apply(store, state, action, params).await;
    success()
}

fn non_empty(body: Option<&[u8]>) -> Option<&[u8]> {
    body.filter(|body| !body.is_empty())
}

fn serialize<T: Serialize>(status: StatusCode, value: &T) -> HttpResponse {
    match serde_json::to_string(value) {
        Ok(body) => HttpResponse {
            status,
            body,
            content_type: APPLICATION_JSON,
        },
        Err(err) => {
            tracing::warn!(%err, "failed to serialize response body");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn detail(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse {
        status,
        body: json!({ "detail": message }).to_string(),
        content_type: APPLICATION_JSON,
    }
}

fn success() -> HttpResponse {
    HttpResponse {
        status: StatusCode::OK,
        body: json!({ "result": "success" }).to_string(),
        content_type: APPLICATION_JSON,
    }
}
