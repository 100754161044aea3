//! Request-assembly engine: turns the transport's chunk-by-chunk delivery
//! of a request into one unified request value, dispatches it, and
//! transmits exactly one response per connection.
//!
//! # Design
//! hyper hands the request body to us as a sequence of frames. The engine
//! owns an explicit per-connection state machine ([`RequestAssembler`])
//! rather than leaning on a framework collector: a request starts
//! `Bodyless` or `AwaitingBody` depending on its method, each non-empty
//! chunk appends to the accumulation buffer, and a zero-length chunk marks
//! end-of-body. `into_request` consumes the assembler, so the accumulation
//! buffer is released exactly once no matter which handler path runs.
//! Engine-local failures (a broken body stream, a protocol violation)
//! produce a generic 500 for that connection only and never reach handler
//! code.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use thiserror::Error;

use crate::handlers;
use crate::store::SharedStore;

pub(crate) const APPLICATION_JSON: &str = "application/json";

/// A complete request as handlers see it: method, path, and the fully
/// accumulated body (`None` for bodyless methods).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Vec<u8>>,
}

/// What a handler produces; the engine copies it into the transport
/// response. No streaming — the body is a single buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
    pub content_type: &'static str,
}

/// Violations of the chunk-delivery protocol, local to the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A non-empty chunk arrived for a method that carries no body.
    #[error("body chunk on a bodyless request")]
    UnexpectedBody,

    /// A chunk arrived after the end-of-body signal.
    #[error("body chunk after end of body")]
    TrailingData,

    /// The request completed before the end-of-body signal.
    #[error("request body incomplete")]
    IncompleteBody,

    /// The transport failed while delivering a chunk.
    #[error("failed to read request body")]
    Transport,
}

enum Assembly {
    Bodyless,
    AwaitingBody(Vec<u8>),
    Done(Vec<u8>),
}

/// Per-connection accumulation state machine.
///
/// Owned exclusively by its connection. `new` classifies the method:
/// POST/PUT-class requests start in `AwaitingBody`, everything else is
/// `Bodyless` and ready immediately.
pub struct RequestAssembler {
    method: Method,
    path: String,
    state: Assembly,
}

impl RequestAssembler {
    pub fn new(method: Method, path: &str) -> Self {
        let state = if method == Method::POST || method == Method::PUT {
            Assembly::AwaitingBody(Vec::new())
        } else {
            Assembly::Bodyless
        };
        Self {
            method,
            path: path.to_owned(),
            state,
        }
    }

    /// Whether the connection should keep delivering body chunks.
    pub fn awaiting_body(&self) -> bool {
        matches!(self.state, Assembly::AwaitingBody(_))
    }

    /// Feeds one chunk. A zero-length chunk signals end-of-body.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), EngineError> {
        match &mut self.state {
            Assembly::AwaitingBody(buf) => {
                if chunk.is_empty() {
                    self.state = Assembly::Done(std::mem::take(buf));
                } else {
                    buf.extend_from_slice(chunk);
                }
                Ok(())
            }
            Assembly::Bodyless if chunk.is_empty() => Ok(()),
            Assembly::Bodyless => Err(EngineError::UnexpectedBody),
            Assembly::Done(_) => Err(EngineError::TrailingData),
        }
    }

    /// Consumes the assembler into the unified request, releasing the
    /// accumulation buffer to the request value.
    pub fn into_request(self) -> Result<HttpRequest, EngineError> {
        let body = match self.state {
            Assembly::Bodyless => None,
            Assembly::Done(buf) => Some(buf),
            Assembly::AwaitingBody(_) => return Err(EngineError::IncompleteBody),
        };
        Ok(HttpRequest {
            method: self.method,
            path: self.path,
            body,
        })
    }
}

/// Entry point for every connection: assemble, dispatch, transmit.
pub(crate) async fn handle(State(store): State<SharedStore>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    tracing::debug!(method = %parts.method, path = parts.uri.path(), "new request");

    let mut assembler = RequestAssembler::new(parts.method, parts.uri.path());
    if assembler.awaiting_body() {
        if let Err(err) = accumulate(&mut assembler, body).await {
            tracing::warn!(%err, "request dropped");
            return engine_failure();
        }
    }

    let request = match assembler.into_request() {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(%err, "request dropped");
            return engine_failure();
        }
    };
    tracing::debug!(
        method = %request.method,
        path = %request.path,
        bytes = request.body.as_ref().map_or(0, Vec::len),
        "request complete"
    );

    transmit(handlers::dispatch(&store, &request).await)
}

/// Drains the body stream into the assembler, then signals end-of-body
/// with the terminal zero-length chunk.
async fn accumulate(assembler: &mut RequestAssembler, mut body: Body) -> Result<(), EngineError> {
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|_| EngineError::Transport)?;
        if let Ok(data) = frame.into_data() {
            if !data.is_empty() {
                assembler.push(&data)?;
            }
        }
    }
    assembler.push(&[])
}

/// Copies the handler's response into a transport response.
fn transmit(reply: HttpResponse) -> Response {
    match Response::builder()
        .status(reply.status)
        .header(header::CONTENT_TYPE, reply.content_type)
        .body(Body::from(reply.body))
    {
        Ok(response) => response,
        Err(_) => engine_failure(),
    }
}

/// Default response when the engine itself fails; handlers never see the
/// connection in this case.
fn engine_failure() -> Response {
    let mut response = Response::new(Body::from("Internal Server Error"));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}
