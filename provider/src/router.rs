//! Maps an incoming method + path onto a handler.

use axum::http::Method;

/// Path the verifier posts state-change directives to.
pub const PROVIDER_STATE_PATH: &str = "/__pact/provider-state";

/// The handler selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    GetUser,
    CreateUser,
    DeleteUser,
    ProviderState,
    NotFound,
}

/// Pure routing table. Unknown method/path combinations fall through to
/// `NotFound`; id validation is left to the handler.
pub fn route(method: &Method, path: &str) -> Route {
    if *method == Method::GET && path.starts_with("/users/") {
        Route::GetUser
    } else if *method == Method::POST && path == "/users" {
        Route::CreateUser
    } else if *method == Method::DELETE && path.starts_with("/users/") {
        Route::DeleteUser
    } else if *method == Method::POST && path == PROVIDER_STATE_PATH {
        Route::ProviderState
    } else {
        Route::NotFound
    }
}

/// Extracts the numeric id from a path like `/users/123`.
///
/// The substring after the final `/` must be non-empty and all decimal
/// digits; anything else is invalid.
pub fn parse_user_id(path: &str) -> Option<i64> {
    let (_, id) = path.rsplit_once('/')?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}
