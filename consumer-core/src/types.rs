//! Domain DTOs for the user API.
//!
//! # Design
//! These types mirror the provider's schema but are defined independently,
//! so the consumer side never links against server internals. Integration
//! tests catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user record returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub created_on: String,
}

/// Request payload for creating a new user. The server assigns the id and
/// the creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
}

/// A provider-state directive for the verification endpoint.
///
/// `state` names the precondition ("" means the interaction declares
/// none), `action` is `"setup"` or `"teardown"` on the wire, and `params`
/// carries state-specific arguments — omitted from the JSON entirely when
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStateChange {
    #[serde(default)]
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    pub action: String,
}

impl ProviderStateChange {
    pub fn setup(state: &str, params: Option<Map<String, Value>>) -> Self {
        Self {
            state: state.to_string(),
            params,
            action: "setup".to_string(),
        }
    }

    pub fn teardown(state: &str) -> Self {
        Self {
            state: state.to_string(),
            params: None,
            action: "teardown".to_string(),
        }
    }
}

/// Acknowledgement body from the provider-state endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChangeResult {
    pub result: String,
}
