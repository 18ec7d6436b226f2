//! Path and method routing for the inbound HTTP surface.

use mentor_host::{HandlerResponse, RequestHandler};
use providers::CompletionProvider;
use shared::api::{GENERATE_PATH, LEGACY_PATH};
use std::io::Read;
use tiny_http::Method;

/// Largest request body accepted; a form submission with a long history is
/// far below this.
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Generate,
    Legacy,
    MethodNotAllowed,
    NotFound,
}

pub fn route(method: &Method, url: &str) -> Route {
    let path = url.split('?').next().unwrap_or(url).trim_end_matches('/');
    let target = match path {
        GENERATE_PATH => Route::Generate,
        LEGACY_PATH => Route::Legacy,
        _ => return Route::NotFound,
    };
    if *method == Method::Post {
        target
    } else {
        Route::MethodNotAllowed
    }
}

pub async fn dispatch<P: CompletionProvider>(
    handler: &RequestHandler<P>,
    method: &Method,
    url: &str,
    body: &[u8],
) -> HandlerResponse {
    match route(method, url) {
        Route::Generate => handler.handle(body).await,
        Route::Legacy => handler.handle_legacy(body).await,
        Route::MethodNotAllowed => error_response(405, "Method not allowed"),
        Route::NotFound => error_response(404, "Not found"),
    }
}

/// Read at most `MAX_BODY_BYTES` from the request. Anything longer is
/// rejected with 413 without reading the rest.
pub fn read_body(reader: impl Read) -> Result<Vec<u8>, HandlerResponse> {
    let mut body = Vec::new();
    if let Err(e) = reader.take(MAX_BODY_BYTES + 1).read_to_end(&mut body) {
        tracing::warn!(error = %e, "failed to read request body");
        return Err(error_response(400, "Invalid message format"));
    }
    if body.len() as u64 > MAX_BODY_BYTES {
        tracing::warn!(limit = MAX_BODY_BYTES, "request body too large");
        return Err(error_response(413, "Request body too large"));
    }
    Ok(body)
}

fn error_response(status: u16, message: &str) -> HandlerResponse {
    HandlerResponse {
        status,
        body: serde_json::json!({ "error": message }),
    }
}
