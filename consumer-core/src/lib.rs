//! Consumer-side client core for the user API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and
//! testable.
//!
//! # Design
//! - `UserClient` is stateless — it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Types use owned `String` / `Vec` fields; nothing borrows from the
//!   transport.
//! - DTOs are defined independently from the provider crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::{UserClient, PROVIDER_STATE_PATH};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateUser, ProviderStateChange, StateChangeResult, User};
