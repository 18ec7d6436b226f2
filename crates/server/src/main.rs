mod routes;

use anyhow::{anyhow, Result};
use mentor_host::{HandlerResponse, RequestHandler};
use providers::OpenAIClient;
use shared::settings::ServerSettings;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;
use tiny_http::{Header, Request, Response, Server, StatusCode};
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = ServerSettings::from_env();
    if settings.upstream.api_key.is_empty() {
        // Not fatal: requests will fail with the provider's auth error.
        tracing::warn!("OPENAI_API_KEY is not set");
    }
    tracing::info!(upstream = ?settings.upstream, "loaded settings");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let handler = Arc::new(RequestHandler::from_settings(&settings.upstream));
    let json_header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .map_err(|_| anyhow!("invalid content-type header"))?;

    let server = Server::http(&settings.bind_addr)
        .map_err(|e| anyhow!("failed to bind {}: {}", settings.bind_addr, e))?;
    tracing::info!(addr = %settings.bind_addr, "mentor server listening");

    let rt = runtime.handle().clone();
    for request in server.incoming_requests() {
        let handler = Arc::clone(&handler);
        let json_header = json_header.clone();
        let request_rt = rt.clone();
        rt.spawn_blocking(move || serve(&request_rt, &handler, request, json_header));
    }
    Ok(())
}

/// Read, dispatch and answer one request on a blocking-pool thread.
fn serve(
    rt: &Handle,
    handler: &RequestHandler<OpenAIClient>,
    mut request: Request,
    json_header: Header,
) {
    let started = Instant::now();
    let method = request.method().clone();
    let url = request.url().to_string();

    let response = match routes::read_body(request.as_reader()) {
        Ok(body) => rt.block_on(routes::dispatch(handler, &method, &url, &body)),
        Err(rejected) => rejected,
    };

    let status = response.status;
    let success = response.is_success();
    if let Err(e) = request.respond(to_http(response, json_header)) {
        tracing::warn!(error = %e, "failed to write response");
    }
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if success {
        tracing::info!(%method, %url, status, elapsed_ms, "request served");
    } else {
        tracing::warn!(%method, %url, status, elapsed_ms, "request failed");
    }
}

fn to_http(response: HandlerResponse, json_header: Header) -> Response<Cursor<Vec<u8>>> {
    let bytes = serde_json::to_vec(&response.body)
        .unwrap_or_else(|_| br#"{"error":"Internal server error"}"#.to_vec());
    Response::from_data(bytes)
        .with_status_code(StatusCode(response.status))
        .with_header(json_header)
}
