//! Stateless HTTP request builder and response parser for the user API.
//!
//! # Design
//! `UserClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip, keeping
//! the core deterministic and free of I/O dependencies.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateUser, ProviderStateChange, StateChangeResult, User};

/// Path the provider exposes for state-change directives.
pub const PROVIDER_STATE_PATH: &str = "/__pact/provider-state";

/// Synchronous, stateless client for the user API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct UserClient {
    base_url: String,
}

impl UserClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_get_user(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/users/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_user(&self, input: &CreateUser) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/users", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_delete_user(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/users/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_state_change(&self, change: &ProviderStateChange) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(change)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{PROVIDER_STATE_PATH}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_create_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        check_status(&response, 201)?;
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_delete_user(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)?;
        Ok(())
    }

    pub fn parse_state_change(&self, response: HttpResponse) -> Result<StateChangeResult, ApiError> {
        check_status(&response, 200)?;
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
