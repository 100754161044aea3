//! Provider-state directives: the out-of-band commands a verifier uses to
//! prepare or clean the store between interactions.
//!
//! # Design
//! Setup is deliberately permissive. Unknown state names, missing or
//! malformed params, and store misses all degrade to logged no-ops, because
//! the verifier replaying a contract must never be blocked by a state
//! mismatch it cannot control. The only hard rejection, an unrecognized
//! `action`, happens at the HTTP boundary before anything reaches
//! [`apply`], so `apply` itself is total.

use serde_json::{Map, Value};

use crate::store::SharedStore;

/// State name whose setup inserts a user described by `params`.
pub const USER_EXISTS: &str = "the user exists";

/// State name whose setup removes the user named by `params`.
pub const USER_DOES_NOT_EXIST: &str = "the user doesn't exist";

/// What a directive asks the provider to do with the named state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    Setup,
    Teardown,
}

impl StateAction {
    /// Maps the wire string onto an action; anything else is unknown.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "setup" => Some(StateAction::Setup),
            "teardown" => Some(StateAction::Teardown),
            _ => None,
        }
    }
}

/// Applies a provider-state directive to the store. Never fails.
pub async fn apply(
    store: &SharedStore,
    state: &str,
    action: StateAction,
    params: Option<&Map<String, Value>>,
) {
    match action {
        StateAction::Setup => setup(store, state, params).await,
        StateAction::Teardown => {
            // Teardown clears everything, whatever the state name was.
            tracing::debug!(state, "tearing down provider state");
            store.write().await.clear();
        }
    }
}

async fn setup(store: &SharedStore, state: &str, params: Option<&Map<String, Value>>) {
    tracing::info!(state, "setting up provider state");

    match state {
        USER_EXISTS => {
            let id = param_i64(params, "id");
            let name = params
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty());

            match (id, name) {
                (Some(id), Some(name)) => {
                    if let Err(err) = store.write().await.add(id, name) {
                        tracing::warn!(id, %err, "user not added for state");
                    } else {
                        tracing::info!(id, name, "added user for state");
                    }
                }
                _ => tracing::warn!(state, "missing or invalid id/name params"),
            }
        }
        USER_DOES_NOT_EXIST => match param_i64(params, "id") {
            Some(id) => {
                // A miss already satisfies the state.
                if store.write().await.remove(id).is_ok() {
                    tracing::info!(id, "removed user for state");
                }
            }
            None => tracing::warn!(state, "missing or invalid id param"),
        },
        other => tracing::debug!(state = other, "no setup needed for state"),
    }
}

fn param_i64(params: Option<&Map<String, Value>>, key: &str) -> Option<i64> {
    params
        .and_then(|p| p.get(key))
        .and_then(Value::as_i64)
        .filter(|id| *id > 0)
}
