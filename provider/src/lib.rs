//! Provider half of a contract-testing demo pair: a small user API plus a
//! state-change endpoint an external verifier uses to prepare and clean the
//! store between replayed interactions.
//!
//! # Overview
//! - `store`: bounded, insertion-ordered user store shared behind a lock.
//! - `state`: provider-state directives (setup/teardown) applied to it.
//! - `router`: pure method + path to handler mapping.
//! - `handlers`: per-route logic; every failure is a status code.
//! - `engine`: per-connection request assembly and response transmission.
//!
//! `app()` wires a fresh store into a single fallback route, so the engine
//! sees every request and tests get an isolated store per instance.

pub mod engine;
pub mod handlers;
pub mod router;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

pub use engine::{EngineError, HttpRequest, HttpResponse, RequestAssembler};
pub use router::{parse_user_id, route, Route, PROVIDER_STATE_PATH};
pub use state::{StateAction, USER_DOES_NOT_EXIST, USER_EXISTS};
pub use store::{SharedStore, StoreError, User, UserStore, MAX_USERS};

/// Builds the provider app with its own empty store.
pub fn app() -> Router {
    let store: SharedStore = Arc::new(RwLock::new(UserStore::new()));
    Router::new().fallback(engine::handle).with_state(store)
}

/// Serves the provider on `listener` until the task is dropped.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}
