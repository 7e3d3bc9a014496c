use axum::body::{Body, Bytes};
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;

pub mod api;
pub mod routes;

use routes::HttpResponse;

pub fn run_server(bind_addr: &str) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(bind_addr))
}

async fn serve(bind_addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    log::info!("roguesim server listening on http://{bind_addr}");
    axum::serve(listener, router()).await
}

/// Every request goes through [routes::route_request]; axum only handles transport.
pub fn router() -> Router {
    Router::new().fallback(handle_request)
}

async fn handle_request(method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let response = match std::str::from_utf8(&body) {
        Ok(body) => routes::route_request(method.as_str(), path, body),
        Err(err) => routes::error_response(
            400,
            "Bad Request",
            &format!("Invalid request body: {err}"),
        ),
    };
    log::info!("{} {} -> {}", method, uri.path(), response.status_code);
    response.into_response()
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, self.content_type)
            .body(Body::from(self.body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}
