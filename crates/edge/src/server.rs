// ABOUTME: HTTP front for the edge extractor built on axum.
// ABOUTME: Every method and path reaches the same handler; outcomes map to status, content type and body.

use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    Router,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::client::Client;
use crate::error::EdgeError;
use crate::request::PriceRequest;
use crate::result::Extraction;

/// Content type of raw passthrough responses.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

impl IntoResponse for Extraction {
    fn into_response(self) -> Response {
        match self {
            Extraction::Raw(html) => ([(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], html).into_response(),
            Extraction::Price(payload) => Json(payload).into_response(),
            Extraction::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
        }
    }
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        (self.status(), self.code.public_message()).into_response()
    }
}

/// Build the router. There are no routes: the fallback handles everything.
pub fn router(client: Arc<Client>) -> Router {
    Router::new().fallback(handle_request).with_state(client)
}

async fn handle_request(
    State(client): State<Arc<Client>>,
    method: Method,
    RawQuery(query): RawQuery,
) -> Response {
    let req = PriceRequest::from_query(query.as_deref());

    match client.handle(&req).await {
        Ok(extraction) => {
            info!(
                %method,
                url = req.url.as_deref().unwrap_or_default(),
                selector = %req.selector,
                outcome = extraction.kind(),
                "request handled"
            );
            extraction.into_response()
        }
        Err(err) => {
            warn!(%method, status = err.status().as_u16(), error = %err, "request failed");
            err.into_response()
        }
    }
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, client: Client) -> anyhow::Result<()> {
    let app = router(Arc::new(client));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
