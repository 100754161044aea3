//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! client core builds `HttpRequest` values and parses `HttpResponse` values
//! without ever touching the network — the caller (host) executes the
//! actual I/O. This keeps the core deterministic and easy to test.
//!
//! All fields use owned types (`String`, `Vec`) so values carry no
//! lifetime ties to the core.

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Built by `UserClient::build_*` methods. The caller is responsible for
/// executing this request against the network and returning the
/// corresponding `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Constructed by the caller after executing an `HttpRequest`, then passed
/// to `UserClient::parse_*` methods for deserialization.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
